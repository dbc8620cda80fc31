//! Fetch core: pure data model and the progress poller state machine.
mod config;
mod effect;
mod error;
mod msg;
mod request;
mod state;
mod update;

pub use config::{PollConfig, ProgressEstimate};
pub use effect::{Effect, Outcome};
pub use error::{Component, ConfigError, RequestError, StateError};
pub use msg::Msg;
pub use request::{FetchRequest, SearchMode};
pub use state::{Resource, WorkerState};
pub use update::{update, PollPhase, PollState};
