mod common;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use common::{init_logging, request, resource, FakeFetcher, PanickingFetcher};
use fetch_core::{Component, ProgressEstimate, StateError};
use fetch_engine::{EngineError, FetchWorker};

fn estimate(total_ms: u64, steps: u32) -> ProgressEstimate {
    ProgressEstimate::new(Duration::from_millis(total_ms), steps).unwrap()
}

fn wait_done(worker: &FetchWorker, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if worker.current_snapshot().done {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn completes_with_resource() {
    init_logging();
    let fetcher = FakeFetcher::returning(Duration::from_millis(30), resource("X"));
    let worker = FetchWorker::new(fetcher.clone(), estimate(500, 5));

    worker.start(request("X")).unwrap();
    assert!(wait_done(&worker, Duration::from_secs(2)));

    let snapshot = worker.current_snapshot();
    assert!(!snapshot.errored);
    assert_eq!(snapshot.result, Some(resource("X")));
    assert_eq!(fetcher.calls(), 1);
}

#[test]
fn failure_is_published_as_state() {
    init_logging();
    let fetcher = FakeFetcher::failing(Duration::from_millis(10), "connection refused");
    let worker = FetchWorker::new(fetcher, estimate(500, 5));

    worker.start(request("X")).unwrap();
    assert!(wait_done(&worker, Duration::from_secs(2)));

    let snapshot = worker.current_snapshot();
    assert!(snapshot.errored);
    assert_eq!(snapshot.error_message.as_deref(), Some("connection refused"));
    assert_eq!(snapshot.result, None);
}

#[test]
fn panicking_collaborator_becomes_failure() {
    init_logging();
    let worker = FetchWorker::new(Arc::new(PanickingFetcher), estimate(500, 5));

    worker.start(request("X")).unwrap();
    assert!(wait_done(&worker, Duration::from_secs(2)));

    let snapshot = worker.current_snapshot();
    assert!(snapshot.errored);
    assert_eq!(snapshot.error_message.as_deref(), Some("remote fetch panicked"));
}

#[test]
fn starting_twice_is_rejected() {
    init_logging();
    let fetcher = FakeFetcher::returning(Duration::from_millis(10), resource("X"));
    let worker = FetchWorker::new(fetcher.clone(), estimate(500, 5));

    worker.start(request("X")).unwrap();
    let err = worker.start(request("X")).unwrap_err();
    assert!(matches!(
        err,
        EngineError::State(StateError::AlreadyStarted {
            component: Component::Worker
        })
    ));

    assert!(wait_done(&worker, Duration::from_secs(2)));
    assert_eq!(fetcher.calls(), 1);
}

#[test]
fn heuristic_progress_is_monotonic_and_marks_over_estimate() {
    init_logging();
    let fetcher = FakeFetcher::returning(Duration::from_millis(400), resource("X"));
    let worker = FetchWorker::new(fetcher, estimate(100, 4));
    worker.start(request("X")).unwrap();

    let mut last = 0;
    let deadline = Instant::now() + Duration::from_millis(250);
    while Instant::now() < deadline {
        let snapshot = worker.current_snapshot();
        assert!(snapshot.progress >= last);
        last = snapshot.progress;
        thread::sleep(Duration::from_millis(5));
    }

    let snapshot = worker.current_snapshot();
    assert_eq!(snapshot.progress, 4);
    assert!(snapshot.timed_out);
    assert!(!snapshot.done);
}

#[test]
fn concurrent_readers_never_see_done_with_a_stale_message() {
    init_logging();
    let fetcher = FakeFetcher::returning(Duration::from_millis(60), resource("X"));
    let worker = Arc::new(FetchWorker::new(fetcher, estimate(40, 20)));
    worker.start(request("X")).unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let worker = Arc::clone(&worker);
            thread::spawn(move || {
                let deadline = Instant::now() + Duration::from_secs(2);
                while Instant::now() < deadline {
                    let snapshot = worker.current_snapshot();
                    if snapshot.done {
                        assert!(snapshot.message.starts_with("Fetched X"), "{}", snapshot.message);
                        assert!(snapshot.result.is_some());
                        return true;
                    }
                    assert!(!snapshot.message.starts_with("Fetched"));
                    assert!(snapshot.result.is_none());
                }
                false
            })
        })
        .collect();

    for reader in readers {
        assert!(reader.join().unwrap());
    }
}

#[test]
fn abandon_cancels_collaborator() {
    init_logging();
    let fetcher = FakeFetcher::returning(Duration::from_secs(5), resource("X"));
    let worker = FetchWorker::new(fetcher.clone(), estimate(1_000, 10));
    worker.start(request("X")).unwrap();

    thread::sleep(Duration::from_millis(30));
    worker.abandon();
    assert!(worker.cancel_token().is_cancelled());
    assert!(worker.current_snapshot().timed_out);

    assert!(wait_done(&worker, Duration::from_secs(1)));
    assert!(fetcher.saw_cancel());
    assert!(worker.current_snapshot().errored);
}
