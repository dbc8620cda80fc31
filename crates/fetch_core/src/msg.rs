use std::sync::Arc;

use crate::WorkerState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Timer tick carrying the latest published worker snapshot.
    Tick(Arc<WorkerState>),
    /// Caller gave up early; resolved the same way as a timeout.
    Cancel,
}
