//! Fetch engine: worker threads, UI context, poller driver and coordinator.
mod coordinator;
mod fetch;
mod filename;
mod persist;
mod poller;
mod snapshot;
mod status;
mod types;
mod ui;
mod worker;

pub use coordinator::{TaskCoordinator, TaskHandle, TaskId};
pub use fetch::{FetchSettings, ReqwestFetcher, RemoteFetcher};
pub use filename::deterministic_filename;
pub use persist::{ensure_output_dir, PersistError, ResourceWriter};
pub use poller::{ProgressPoller, TerminalActions};
pub use status::StatusDisplay;
pub use tokio_util::sync::CancellationToken;
pub use types::{EngineError, FailureKind, RemoteFetchError};
pub use ui::{UiHandle, UiLoop};
pub use worker::FetchWorker;
