#![deny(missing_docs)]
//! Shared logging utilities for the fetch coordinator workspace.
//!
//! This crate provides the `fetch_*` logging macros used across the codebase,
//! a per-thread poll tick tag for correlating log lines with poller ticks,
//! and a minimal test initializer for the global logger.

use std::cell::Cell;

thread_local! {
    /// Thread-local storage for the tick the poller on this thread last ran.
    static POLL_TICK: Cell<u32> = const { Cell::new(0) };
}

/// Records the poller tick currently executing on this thread.
/// The poller calls this on the UI thread before handling each tick.
pub fn set_poll_tick(tick: u32) {
    POLL_TICK.with(|v| v.set(tick));
}

/// Retrieves the poller tick last recorded on this thread.
/// Returns 0 on threads that never ran a poller tick.
pub fn poll_tick() -> u32 {
    POLL_TICK.with(|v| v.get())
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! fetch_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! fetch_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! fetch_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! fetch_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! fetch_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}

#[cfg(test)]
mod tests {
    use super::{poll_tick, set_poll_tick};

    #[test]
    fn poll_tick_is_per_thread() {
        set_poll_tick(7);
        assert_eq!(poll_tick(), 7);

        let other = std::thread::spawn(poll_tick).join().unwrap();
        assert_eq!(other, 0);
    }
}
