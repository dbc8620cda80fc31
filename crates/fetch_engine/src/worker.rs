use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use fetch_core::{Component, FetchRequest, ProgressEstimate, StateError, WorkerState};
use fetch_logging::{fetch_debug, fetch_info, fetch_warn};
use tokio_util::sync::CancellationToken;

use crate::snapshot::SnapshotCell;
use crate::{EngineError, RemoteFetcher};

const PANIC_MESSAGE: &str = "remote fetch panicked";

/// Runs one blocking remote fetch off the UI thread and publishes progress.
///
/// Failures never cross the thread boundary as panics or errors; they are
/// published as `errored` state and picked up by whoever polls
/// [`FetchWorker::current_snapshot`].
pub struct FetchWorker {
    fetcher: Arc<dyn RemoteFetcher>,
    estimate: ProgressEstimate,
    state: Arc<SnapshotCell>,
    cancel: CancellationToken,
    started: AtomicBool,
}

impl FetchWorker {
    pub fn new(fetcher: Arc<dyn RemoteFetcher>, estimate: ProgressEstimate) -> Self {
        Self {
            fetcher,
            estimate,
            state: Arc::new(SnapshotCell::new(WorkerState::initial("Waiting to start"))),
            cancel: CancellationToken::new(),
            started: AtomicBool::new(false),
        }
    }

    /// Starts the fetch and the progress pacer on their own threads.
    ///
    /// May be called once per worker.
    pub fn start(&self, request: FetchRequest) -> Result<(), EngineError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(StateError::AlreadyStarted {
                component: Component::Worker,
            }
            .into());
        }

        fetch_info!(
            "Worker starting fetch {} (estimate {:?} in {} steps)",
            request,
            self.estimate.total(),
            self.estimate.steps()
        );
        self.state
            .publish(|state| state.advance(0, format!("Fetching {}...", request.id())));

        self.launch(request, Self::spawn_pacer)
    }

    /// Spawns the fetch thread, then the pacer. If either spawn fails the
    /// worker is abandoned, so nothing keeps running without an observer.
    fn launch(
        &self,
        request: FetchRequest,
        pacer: impl FnOnce(&Self, String) -> Result<(), EngineError>,
    ) -> Result<(), EngineError> {
        let id = request.id().to_string();
        let spawned = self.spawn_fetch(request).and_then(|()| pacer(self, id));
        if let Err(err) = &spawned {
            fetch_warn!("Worker could not start: {}", err);
            self.abandon();
        }
        spawned
    }

    pub fn current_snapshot(&self) -> Arc<WorkerState> {
        self.state.load()
    }

    /// Gives up on the fetch: cancels the collaborator and marks the state timed out.
    ///
    /// The fetch thread is not joined; whatever it eventually publishes has no observer.
    pub fn abandon(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        fetch_warn!("Worker abandoned before the remote fetch returned");
        self.cancel.cancel();
        self.state.publish(WorkerState::mark_timed_out);
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    fn spawn_fetch(&self, request: FetchRequest) -> Result<(), EngineError> {
        let fetcher = Arc::clone(&self.fetcher);
        let state = Arc::clone(&self.state);
        let cancel = self.cancel.clone();

        thread::Builder::new()
            .name(format!("fetch-{}", request.id()))
            .spawn(move || {
                let started = Instant::now();
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    fetcher.fetch(&request, &cancel)
                }));
                let elapsed = started.elapsed();

                let failed = format!("Fetch of {} failed", request.id());
                let published = match result {
                    Ok(Ok(resource)) => {
                        let message = format!("Fetched {} ({} bytes)", request.id(), resource.len());
                        state.publish(|next| next.complete(resource, message))
                    }
                    Ok(Err(err)) => {
                        fetch_warn!("Fetch {} failed: {}", request, err);
                        state.publish(|next| next.fail(err.message, failed))
                    }
                    Err(_) => {
                        fetch_warn!("Fetch {} panicked", request);
                        state.publish(|next| next.fail(PANIC_MESSAGE, failed))
                    }
                };

                if cancel.is_cancelled() {
                    fetch_debug!(
                        "Abandoned fetch {} returned after {:?}; result discarded",
                        request,
                        elapsed
                    );
                } else if published {
                    fetch_info!("Fetch {} finished after {:?}", request, elapsed);
                }
            })
            .map(|_| ())
            .map_err(|source| EngineError::Spawn {
                name: "fetch",
                source,
            })
    }

    fn spawn_pacer(&self, id: String) -> Result<(), EngineError> {
        let state = Arc::clone(&self.state);
        let cancel = self.cancel.clone();
        let estimate = self.estimate;

        thread::Builder::new()
            .name(format!("pacer-{id}"))
            .spawn(move || {
                let step_interval = estimate.step_interval();
                let started = Instant::now();
                let mut step = 0u32;
                loop {
                    step += 1;
                    let wake = started + step_interval * step;
                    thread::sleep(wake.saturating_duration_since(Instant::now()));

                    if cancel.is_cancelled() || state.load().done {
                        break;
                    }
                    if step >= estimate.steps() {
                        state.publish(|next| {
                            next.advance(step, format!("Fetching {id}... taking longer than expected"));
                            next.mark_timed_out();
                        });
                        break;
                    }
                    state.publish(|next| {
                        next.advance(step, format!("Fetching {id}... ({step}/{})", estimate.steps()));
                    });
                }
            })
            .map(|_| ())
            .map_err(|source| EngineError::Spawn {
                name: "pacer",
                source,
            })
    }
}
