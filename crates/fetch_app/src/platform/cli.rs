use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Fetch one image from the records service, waiting a bounded time.
#[derive(Debug, Parser)]
#[command(name = "fetch_app", version)]
pub struct Cli {
    /// Image entry id, or a patient id with --patient.
    pub id: String,

    /// Treat the id as a patient id and fetch that patient's latest image.
    #[arg(long)]
    pub patient: bool,

    /// RON settings file.
    #[arg(long, default_value = ".fetch_settings.ron")]
    pub settings: PathBuf,

    /// Write the effective settings back to the settings file before fetching.
    #[arg(long)]
    pub write_settings: bool,

    /// Image service root, e.g. http://records.local:8080/api.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Directory the fetched image is saved to.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Poll interval in milliseconds.
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Longest expected fetch in milliseconds; bounds the wait.
    #[arg(long)]
    pub max_estimation_ms: Option<u64>,

    /// Where log lines go.
    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    /// Log file used by --log file and --log both. Truncated on each run.
    #[arg(long, default_value = "fetch.log")]
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    /// Stderr only, below the status line.
    Terminal,
    /// The log file only.
    File,
    /// Stderr and the log file.
    Both,
}

impl LogTarget {
    pub fn logs_to_terminal(self) -> bool {
        matches!(self, LogTarget::Terminal | LogTarget::Both)
    }

    pub fn logs_to_file(self) -> bool {
        matches!(self, LogTarget::File | LogTarget::Both)
    }
}
