use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Worker,
    Poller,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Worker => write!(f, "fetch worker"),
            Component::Poller => write!(f, "progress poller"),
        }
    }
}

/// Programming errors: lifecycle misuse of a worker, poller or coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("{component} was already started")]
    AlreadyStarted { component: Component },
    #[error("a terminal action was already fired for this invocation")]
    AlreadyFired,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("poll interval must be greater than zero")]
    ZeroInterval,
    #[error("max ticks must be greater than zero")]
    ZeroTicks,
    #[error("progress estimate must have a non-zero duration and step count")]
    EmptyEstimate,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("fetch request id must not be blank")]
    BlankId,
}
