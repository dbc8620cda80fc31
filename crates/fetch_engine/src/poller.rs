use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use fetch_core::{update, Effect, Msg, Outcome, PollConfig, PollPhase, PollState, Resource, StateError};
use fetch_logging::{fetch_debug, fetch_error, fetch_info, fetch_warn};

use crate::ui::Ticker;
use crate::{EngineError, FetchWorker, StatusDisplay, UiHandle};

type SuccessAction = Box<dyn FnOnce(Resource) + Send>;
type FailureAction = Box<dyn FnOnce(String) + Send>;
type TimeoutAction = Box<dyn FnOnce() + Send>;

/// The three terminal callbacks of one invocation. Consumed by [`TerminalActions::fire`].
pub struct TerminalActions {
    on_success: SuccessAction,
    on_failure: FailureAction,
    on_timeout: TimeoutAction,
}

impl TerminalActions {
    pub fn new(
        on_success: impl FnOnce(Resource) + Send + 'static,
        on_failure: impl FnOnce(String) + Send + 'static,
        on_timeout: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            on_success: Box::new(on_success),
            on_failure: Box::new(on_failure),
            on_timeout: Box::new(on_timeout),
        }
    }

    pub fn fire(self, outcome: Outcome) {
        match outcome {
            Outcome::Completed(resource) => (self.on_success)(resource),
            Outcome::Failed(message) => (self.on_failure)(message),
            Outcome::TimedOut => (self.on_timeout)(),
        }
    }
}

/// Drives a [`PollState`] from UI-thread ticks and executes its effects.
///
/// Cloning yields another handle to the same poller.
#[derive(Clone)]
pub struct ProgressPoller {
    inner: Arc<Mutex<PollerInner>>,
    ui: UiHandle,
    label: String,
}

struct PollerInner {
    state: PollState,
    worker: Option<Arc<FetchWorker>>,
    status: Box<dyn StatusDisplay>,
    actions: Option<TerminalActions>,
    ticker: Option<Ticker>,
}

impl ProgressPoller {
    pub fn new(
        label: impl Into<String>,
        config: PollConfig,
        worker: Arc<FetchWorker>,
        status: Box<dyn StatusDisplay>,
        actions: TerminalActions,
        ui: UiHandle,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(PollerInner {
                state: PollState::new(config),
                worker: Some(worker),
                status,
                actions: Some(actions),
                ticker: None,
            })),
            ui,
            label: label.into(),
        }
    }

    /// Idle -> Running: starts the status display and the tick timer.
    ///
    /// The state transition is committed before this returns, so a second call
    /// fails even before the first tick has run. If the timer cannot be set up
    /// the poller stays Idle and the status display is never started.
    pub fn start(&self) -> Result<(), EngineError> {
        let mut guard = lock(&self.inner);
        let mut next = guard.state.clone();
        let effects = next.start()?;
        let config = *next.config();

        let inner = Arc::clone(&self.inner);
        let ticker = Ticker::spawn(
            format!("poll-{}", self.label),
            config.interval(),
            self.ui.clone(),
            move || dispatch(&inner, PollerInner::tick),
        )?;

        let inner = Arc::clone(&self.inner);
        self.ui.post(move || {
            let mut guard = lock(&inner);
            // Stopped before the display came up: nothing to show.
            if guard.state.phase() == PollPhase::Running {
                let delivery = guard.apply(effects);
                debug_assert!(delivery.is_none());
            }
        })?;

        guard.state = next;
        guard.ticker = Some(ticker);

        fetch_info!(
            "Poller {} running every {:?}, ceiling {:?}",
            self.label,
            config.interval(),
            config.ceiling()
        );
        Ok(())
    }

    /// Stops the poller. Idempotent and safe from a terminal action.
    ///
    /// A running poller ends as timed out: the timeout action fires on the UI
    /// thread and the worker is abandoned. Once an outcome was delivered this
    /// does nothing.
    pub fn stop(&self) {
        if self.ui.is_ui_thread() {
            dispatch(&self.inner, PollerInner::stop);
            return;
        }
        let inner = Arc::clone(&self.inner);
        if let Err(err) = self.ui.post(move || dispatch(&inner, PollerInner::stop)) {
            fetch_warn!("Poller {} stopped without a UI loop: {}", self.label, err);
            lock(&self.inner).shut_down();
        }
    }

    /// Ends a running poller as timed out, on the UI thread.
    pub fn cancel(&self) -> Result<(), EngineError> {
        let inner = Arc::clone(&self.inner);
        self.ui.post(move || dispatch(&inner, |inner| inner.handle(Msg::Cancel)))
    }

    pub fn phase(&self) -> PollPhase {
        lock(&self.inner).state.phase()
    }

    pub fn ticks(&self) -> u32 {
        lock(&self.inner).state.ticks()
    }
}

impl PollerInner {
    fn tick(&mut self) -> Option<(TerminalActions, Outcome)> {
        let snapshot = self.worker.as_ref()?.current_snapshot();
        self.handle(Msg::Tick(snapshot))
    }

    fn stop(&mut self) -> Option<(TerminalActions, Outcome)> {
        let effects = self.state.stop();
        if effects.is_empty() {
            self.halt_ticker();
        }
        self.apply(effects)
    }

    /// Tears down without delivering; used when the UI loop is gone and no
    /// action could run anyway.
    fn shut_down(&mut self) {
        let _ = self.state.stop();
        self.halt_ticker();
        if let Some(worker) = self.worker.take() {
            worker.abandon();
        }
    }

    fn handle(&mut self, msg: Msg) -> Option<(TerminalActions, Outcome)> {
        let (state, effects) = update(self.state.clone(), msg);
        self.state = state;
        fetch_logging::set_poll_tick(self.state.ticks());
        self.apply(effects)
    }

    /// Executes effects in order. A delivery is handed back rather than run,
    /// so the terminal action executes after the lock is released.
    fn apply(&mut self, effects: Vec<Effect>) -> Option<(TerminalActions, Outcome)> {
        let mut delivery = None;
        for effect in effects {
            match effect {
                Effect::StartStatus => {
                    let message = self
                        .worker
                        .as_ref()
                        .map(|worker| worker.current_snapshot().message.clone())
                        .unwrap_or_default();
                    self.status.start(&message);
                }
                Effect::ShowStatus(message) => self.status.set_message(&message),
                Effect::StopTimer => self.halt_ticker(),
                Effect::StopStatus => self.status.stop(),
                Effect::Deliver(outcome) => {
                    self.release_worker(&outcome);
                    match self.actions.take() {
                        Some(actions) => delivery = Some((actions, outcome)),
                        None => {
                            fetch_error!("{}; dropping {} outcome", StateError::AlreadyFired, outcome.label());
                            debug_assert!(false, "terminal action fired twice");
                        }
                    }
                }
            }
        }
        delivery
    }

    fn halt_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
    }

    fn release_worker(&mut self, outcome: &Outcome) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        if matches!(outcome, Outcome::TimedOut) {
            let snapshot = worker.current_snapshot();
            fetch_warn!(
                "Timed out after {} ticks (worker progress {}); abandoning fetch",
                self.state.ticks(),
                snapshot.progress
            );
            worker.abandon();
        } else {
            fetch_debug!("Releasing worker after {} ticks", self.state.ticks());
        }
    }
}

/// Runs one step against the poller state. A delivery is fired only after
/// the lock is released.
fn dispatch(
    inner: &Mutex<PollerInner>,
    step: impl FnOnce(&mut PollerInner) -> Option<(TerminalActions, Outcome)>,
) {
    let delivery = step(&mut lock(inner));
    if let Some((actions, outcome)) = delivery {
        fetch_info!("Delivering {} outcome", outcome.label());
        actions.fire(outcome);
    }
}

fn lock(inner: &Mutex<PollerInner>) -> MutexGuard<'_, PollerInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
