/// Sink for the status line shown while a fetch is in flight.
///
/// Owned by the poller and only ever called on the UI thread: `start` once,
/// `set_message` once per tick, `stop` once at termination.
pub trait StatusDisplay: Send {
    fn start(&mut self, message: &str);
    fn set_message(&mut self, message: &str);
    fn stop(&mut self);
}
