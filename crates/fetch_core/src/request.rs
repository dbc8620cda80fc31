use std::fmt;

use crate::RequestError;

/// How the remote service should resolve the request id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchMode {
    /// The id names a single image entry.
    ById,
    /// The id is a patient id; the latest image for that patient is wanted.
    ByPatient,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::ById => write!(f, "id"),
            SearchMode::ByPatient => write!(f, "patient"),
        }
    }
}

/// Immutable query key for one fetch invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    id: String,
    mode: SearchMode,
}

impl FetchRequest {
    pub fn new(id: impl Into<String>, mode: SearchMode) -> Result<Self, RequestError> {
        let id = id.into().trim().to_string();
        if id.is_empty() {
            return Err(RequestError::BlankId);
        }
        Ok(Self { id, mode })
    }

    pub fn by_id(id: impl Into<String>) -> Result<Self, RequestError> {
        Self::new(id, SearchMode::ById)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }
}

impl fmt::Display for FetchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.mode, self.id)
    }
}
