use bytes::Bytes;

/// A fetched artifact, e.g. an encoded image or schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Resource {
    pub fn new(id: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            id: id.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Progress published by a fetch worker.
///
/// Published as a whole; readers always see one complete value. `done` and
/// `timed_out` are sticky: the mutators below never clear them, and once
/// `done` is set the progress, message and result are frozen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkerState {
    pub progress: u32,
    pub message: String,
    pub done: bool,
    pub timed_out: bool,
    pub result: Option<Resource>,
    pub errored: bool,
    pub error_message: Option<String>,
}

impl WorkerState {
    pub fn initial(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    /// Moves the heuristic counter forward. Ignored once done; never moves backward.
    pub fn advance(&mut self, progress: u32, message: impl Into<String>) {
        if self.done {
            return;
        }
        self.progress = self.progress.max(progress);
        self.message = message.into();
    }

    /// Records a successful fetch. Returns false if the state was already done.
    pub fn complete(&mut self, resource: Resource, message: impl Into<String>) -> bool {
        if self.done {
            return false;
        }
        self.result = Some(resource);
        self.message = message.into();
        self.done = true;
        true
    }

    /// Records a failed fetch. Returns false if the state was already done.
    pub fn fail(&mut self, error_message: impl Into<String>, message: impl Into<String>) -> bool {
        if self.done {
            return false;
        }
        self.errored = true;
        self.error_message = Some(error_message.into());
        self.message = message.into();
        self.done = true;
        true
    }

    pub fn mark_timed_out(&mut self) {
        self.timed_out = true;
    }
}
