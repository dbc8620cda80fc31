use crate::Resource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Begin the status display lifecycle.
    StartStatus,
    /// Show the worker's latest message on the status display.
    ShowStatus(String),
    /// Stop the periodic timer; no tick may be handled after this.
    StopTimer,
    /// End the status display lifecycle.
    StopStatus,
    /// Run the single terminal action for this invocation.
    Deliver(Outcome),
}

/// The three mutually exclusive ways an invocation can end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed(Resource),
    Failed(String),
    TimedOut,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Completed(_) => "completed",
            Outcome::Failed(_) => "failed",
            Outcome::TimedOut => "timed out",
        }
    }
}
