use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use fetch_logging::fetch_trace;

use crate::EngineError;

type UiTask = Box<dyn FnOnce() + Send + 'static>;

/// Cloneable handle for posting work onto the UI thread.
#[derive(Clone)]
pub struct UiHandle {
    tx: mpsc::Sender<UiTask>,
    ui_thread: ThreadId,
}

impl UiHandle {
    pub fn post(&self, task: impl FnOnce() + Send + 'static) -> Result<(), EngineError> {
        self.tx
            .send(Box::new(task))
            .map_err(|_| EngineError::UiClosed)
    }

    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.ui_thread
    }
}

/// Single-threaded task loop. The thread that creates it is the UI thread;
/// every posted task runs there, in posting order.
pub struct UiLoop {
    rx: mpsc::Receiver<UiTask>,
}

impl UiLoop {
    pub fn new() -> (Self, UiHandle) {
        let (tx, rx) = mpsc::channel();
        let handle = UiHandle {
            tx,
            ui_thread: thread::current().id(),
        };
        (Self { rx }, handle)
    }

    /// Runs every task already queued without waiting. Returns how many ran.
    pub fn pump(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Runs tasks as they arrive until `done` holds or `timeout` elapses.
    /// Returns the final value of `done`.
    pub fn run_until(&self, timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if done() {
                return true;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return done();
            }
            match self.rx.recv_timeout(remaining) {
                Ok(task) => task(),
                Err(mpsc::RecvTimeoutError::Timeout) => return done(),
                Err(mpsc::RecvTimeoutError::Disconnected) => return done(),
            }
        }
    }
}

/// Background thread posting `on_tick` to the UI thread at a fixed cadence.
///
/// Tick `n` is posted at `start + n * interval`, so delays in one tick do not
/// push later ticks back.
pub(crate) struct Ticker {
    stopped: Arc<AtomicBool>,
}

impl Ticker {
    pub(crate) fn spawn(
        name: String,
        interval: Duration,
        ui: UiHandle,
        on_tick: impl Fn() + Send + Sync + 'static,
    ) -> Result<Self, EngineError> {
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);
        let on_tick = Arc::new(on_tick);

        thread::Builder::new()
            .name(name)
            .spawn(move || {
                let started = Instant::now();
                let mut tick = 0u32;
                loop {
                    tick = tick.saturating_add(1);
                    let wake = started + interval * tick;
                    thread::sleep(wake.saturating_duration_since(Instant::now()));
                    if flag.load(Ordering::SeqCst) {
                        break;
                    }
                    let on_tick = Arc::clone(&on_tick);
                    if ui.post(move || (*on_tick)()).is_err() {
                        break;
                    }
                }
                fetch_trace!("Ticker exiting after {} ticks", tick);
            })
            .map_err(|source| EngineError::Spawn {
                name: "ticker",
                source,
            })?;

        Ok(Self { stopped })
    }

    pub(crate) fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
