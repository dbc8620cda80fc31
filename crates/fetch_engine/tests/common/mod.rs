#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use fetch_core::{FetchRequest, Resource};
use fetch_engine::{
    CancellationToken, FailureKind, RemoteFetchError, RemoteFetcher, StatusDisplay,
    TerminalActions,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(fetch_logging::initialize_for_tests);
}

/// Collaborator that sleeps for `delay`, then replies with a canned result.
pub struct FakeFetcher {
    delay: Duration,
    reply: Result<Resource, RemoteFetchError>,
    honour_cancel: bool,
    calls: AtomicU32,
    saw_cancel: AtomicBool,
    returned: AtomicBool,
}

impl FakeFetcher {
    pub fn returning(delay: Duration, resource: Resource) -> Arc<Self> {
        Self::build(delay, Ok(resource), true)
    }

    pub fn failing(delay: Duration, message: &str) -> Arc<Self> {
        Self::build(
            delay,
            Err(RemoteFetchError::new(FailureKind::Network, message)),
            true,
        )
    }

    /// Like `returning`, but keeps sleeping through cancellation.
    pub fn stubborn(delay: Duration, resource: Resource) -> Arc<Self> {
        Self::build(delay, Ok(resource), false)
    }

    fn build(
        delay: Duration,
        reply: Result<Resource, RemoteFetchError>,
        honour_cancel: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            delay,
            reply,
            honour_cancel,
            calls: AtomicU32::new(0),
            saw_cancel: AtomicBool::new(false),
            returned: AtomicBool::new(false),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn saw_cancel(&self) -> bool {
        self.saw_cancel.load(Ordering::SeqCst)
    }

    pub fn returned(&self) -> bool {
        self.returned.load(Ordering::SeqCst)
    }
}

impl RemoteFetcher for FakeFetcher {
    fn fetch(
        &self,
        _request: &FetchRequest,
        cancel: &CancellationToken,
    ) -> Result<Resource, RemoteFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let deadline = Instant::now() + self.delay;
        while Instant::now() < deadline {
            if cancel.is_cancelled() {
                self.saw_cancel.store(true, Ordering::SeqCst);
                if self.honour_cancel {
                    self.returned.store(true, Ordering::SeqCst);
                    return Err(RemoteFetchError::cancelled());
                }
            }
            thread::sleep(Duration::from_millis(5));
        }
        self.returned.store(true, Ordering::SeqCst);
        self.reply.clone()
    }
}

pub struct PanickingFetcher;

impl RemoteFetcher for PanickingFetcher {
    fn fetch(
        &self,
        _request: &FetchRequest,
        _cancel: &CancellationToken,
    ) -> Result<Resource, RemoteFetchError> {
        panic!("collaborator blew up");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusEvent {
    Started(String),
    Message(String),
    Stopped,
}

#[derive(Clone, Default)]
pub struct RecordingStatus {
    events: Arc<Mutex<Vec<StatusEvent>>>,
}

impl RecordingStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed(&self) -> Box<dyn StatusDisplay> {
        Box::new(self.clone())
    }

    pub fn events(&self) -> Vec<StatusEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl StatusDisplay for RecordingStatus {
    fn start(&mut self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(StatusEvent::Started(message.to_string()));
    }

    fn set_message(&mut self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(StatusEvent::Message(message.to_string()));
    }

    fn stop(&mut self) {
        self.events.lock().unwrap().push(StatusEvent::Stopped);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fired {
    Success(Resource),
    Failure(String),
    Timeout,
}

#[derive(Debug, Clone)]
pub struct Firing {
    pub fired: Fired,
    pub thread: ThreadId,
    pub at: Instant,
}

/// Records every terminal action, with the thread it ran on.
#[derive(Clone, Default)]
pub struct Recorder {
    firings: Arc<Mutex<Vec<Firing>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actions(&self) -> TerminalActions {
        let success = self.clone();
        let failure = self.clone();
        let timeout = self.clone();
        TerminalActions::new(
            move |resource| success.push(Fired::Success(resource)),
            move |message| failure.push(Fired::Failure(message)),
            move || timeout.push(Fired::Timeout),
        )
    }

    fn push(&self, fired: Fired) {
        self.firings.lock().unwrap().push(Firing {
            fired,
            thread: thread::current().id(),
            at: Instant::now(),
        });
    }

    pub fn count(&self) -> usize {
        self.firings.lock().unwrap().len()
    }

    pub fn firings(&self) -> Vec<Firing> {
        self.firings.lock().unwrap().clone()
    }

    pub fn fired(&self) -> Vec<Fired> {
        self.firings().into_iter().map(|f| f.fired).collect()
    }
}

pub fn resource(id: &str) -> Resource {
    Resource::new(id, format!("bytes of {id}").into_bytes())
}

pub fn request(id: &str) -> FetchRequest {
    FetchRequest::by_id(id).unwrap()
}
