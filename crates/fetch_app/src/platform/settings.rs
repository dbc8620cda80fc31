use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fetch_core::{ConfigError, PollConfig};
use fetch_engine::{FetchSettings, PersistError, ResourceWriter};
use fetch_logging::{fetch_info, fetch_warn};
use serde::{Deserialize, Serialize};

use super::cli::Cli;

/// User-editable settings, stored as RON.
///
/// `delay_millis` is the poll interval; `max_estimation_millis / delay_millis`
/// gives the number of ticks before the fetch is reported as timed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppSettings {
    pub base_url: String,
    pub delay_millis: u64,
    pub max_estimation_millis: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_bytes: u64,
    pub output_dir: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            base_url: fetch.base_url,
            delay_millis: 300,
            max_estimation_millis: 60_000,
            connect_timeout_secs: fetch.connect_timeout.as_secs(),
            request_timeout_secs: fetch.request_timeout.as_secs(),
            max_bytes: fetch.max_bytes,
            output_dir: PathBuf::from("viewer"),
        }
    }
}

impl AppSettings {
    pub(crate) fn apply_cli(&mut self, cli: &Cli) {
        if let Some(base_url) = &cli.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(output) = &cli.output {
            self.output_dir = output.clone();
        }
        if let Some(delay) = cli.delay_ms {
            self.delay_millis = delay;
        }
        if let Some(max_estimation) = cli.max_estimation_ms {
            self.max_estimation_millis = max_estimation;
        }
    }

    pub(crate) fn poll_config(&self) -> Result<PollConfig, ConfigError> {
        PollConfig::from_estimate(self.max_estimation_millis, self.delay_millis)
    }

    pub(crate) fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_bytes,
            ..FetchSettings::default()
        }
    }
}

/// Loads settings from `path`, falling back to defaults when the file is
/// missing or unusable.
pub(crate) fn load_settings(path: &Path) -> AppSettings {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            fetch_info!("No settings at {:?}; using defaults", path);
            return AppSettings::default();
        }
        Err(err) => {
            fetch_warn!("Failed to read settings from {:?}: {}", path, err);
            return AppSettings::default();
        }
    };

    match ron::from_str(&content) {
        Ok(settings) => {
            fetch_info!("Loaded settings from {:?}", path);
            settings
        }
        Err(err) => {
            fetch_warn!("Failed to parse settings from {:?}: {}", path, err);
            AppSettings::default()
        }
    }
}

pub(crate) fn save_settings(path: &Path, settings: &AppSettings) -> Result<PathBuf, PersistError> {
    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(settings, pretty)
        .map_err(|err| PersistError::Io(std::io::Error::other(err.to_string())))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(".fetch_settings.ron");
    ResourceWriter::new(dir).write(filename, content.as_bytes())
}
