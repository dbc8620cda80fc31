use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use fetch_core::{FetchRequest, PollConfig, PollPhase, ProgressEstimate};
use fetch_logging::{fetch_error, fetch_info};

use crate::{
    EngineError, FetchWorker, ProgressPoller, RemoteFetcher, StatusDisplay, TerminalActions,
    UiHandle,
};

pub type TaskId = u64;

/// Entry point for bounded fetches.
///
/// Every [`TaskCoordinator::execute`] builds a fresh worker and poller; nothing
/// is shared between invocations except the collaborator and the UI handle.
pub struct TaskCoordinator {
    ui: UiHandle,
    fetcher: Arc<dyn RemoteFetcher>,
    estimate: Option<ProgressEstimate>,
    next_id: AtomicU64,
}

impl TaskCoordinator {
    pub fn new(ui: UiHandle, fetcher: Arc<dyn RemoteFetcher>) -> Self {
        Self {
            ui,
            fetcher,
            estimate: None,
            next_id: AtomicU64::new(1),
        }
    }

    /// Overrides the worker's progress schedule. By default the worker expects
    /// the call to take the whole poll ceiling.
    pub fn with_estimate(mut self, estimate: ProgressEstimate) -> Self {
        self.estimate = Some(estimate);
        self
    }

    /// Starts a fetch and returns without waiting for it.
    ///
    /// Once this returns `Ok`, exactly one of the three terminal actions runs,
    /// once, on the UI thread. On timeout the worker is abandoned and its
    /// collaborator cancelled; a late result is never delivered.
    pub fn execute(
        &self,
        request: FetchRequest,
        config: PollConfig,
        status: Box<dyn StatusDisplay>,
        actions: TerminalActions,
    ) -> Result<TaskHandle, EngineError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let estimate = self
            .estimate
            .unwrap_or_else(|| ProgressEstimate::matching(&config));

        fetch_info!(
            "Task {} fetching {} (interval {:?}, max ticks {})",
            id,
            request,
            config.interval(),
            config.max_ticks()
        );

        let worker = Arc::new(FetchWorker::new(Arc::clone(&self.fetcher), estimate));
        worker.start(request)?;

        let poller = ProgressPoller::new(
            id.to_string(),
            config,
            Arc::clone(&worker),
            status,
            actions,
            self.ui.clone(),
        );
        if let Err(err) = poller.start() {
            fetch_error!("Task {} could not start its poller: {}", id, err);
            poller.stop();
            worker.abandon();
            return Err(err);
        }

        Ok(TaskHandle { id, poller })
    }
}

/// Caller-side view of one running invocation.
#[derive(Clone)]
pub struct TaskHandle {
    id: TaskId,
    poller: ProgressPoller,
}

impl TaskHandle {
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Ends the invocation early; resolved as a timeout if still running.
    pub fn cancel(&self) -> Result<(), EngineError> {
        fetch_info!("Task {} cancel requested", self.id);
        self.poller.cancel()
    }

    pub fn phase(&self) -> PollPhase {
        self.poller.phase()
    }

    pub fn ticks(&self) -> u32 {
        self.poller.ticks()
    }

    pub fn is_finished(&self) -> bool {
        self.phase().is_terminal()
    }
}
