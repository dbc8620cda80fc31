//! Logger setup for the binary.
//!
//! Terminal output goes to stderr so it never interleaves with the saved
//! image path printed on stdout. The status line is redrawn in place on the
//! same stream, so log lines simply scroll it.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};

use super::cli::LogTarget;

const LEVEL: LevelFilter = LevelFilter::Info;

/// Installs the global logger for `target`.
///
/// A log file that cannot be created is reported on stderr and skipped; the
/// fetch goes ahead with whatever sinks remain.
pub fn initialize(target: LogTarget, log_file: &Path) {
    let config = fetch_config();
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();

    if target.logs_to_terminal() {
        loggers.push(TermLogger::new(
            LEVEL,
            config.clone(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ));
    }
    if target.logs_to_file() {
        match File::create(log_file) {
            Ok(file) => loggers.push(WriteLogger::new(LEVEL, config, file)),
            Err(err) => eprintln!("Warning: no log file at {}: {err}", log_file.display()),
        }
    }

    if loggers.is_empty() {
        return;
    }
    // Already installed (tests, repeated runs in one process): keep the first.
    let _ = CombinedLogger::init(loggers);
}

/// Thread names carry the fetch id (`fetch-17`, `pacer-17`, `poll-3`) and
/// are shown on debug and trace lines.
fn fetch_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Debug)
        .set_target_level(LevelFilter::Error)
        .build()
}
