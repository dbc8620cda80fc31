use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex, PoisonError};

use fetch_engine::{ResourceWriter, TerminalActions};
use fetch_logging::{fetch_error, fetch_info, fetch_warn};

/// What the user was shown when the fetch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AppOutcome {
    Saved(PathBuf),
    SaveFailed(String),
    Failed(String),
    TimedOut,
}

impl AppOutcome {
    pub(crate) fn exit_code(&self) -> ExitCode {
        match self {
            AppOutcome::Saved(_) => ExitCode::SUCCESS,
            AppOutcome::SaveFailed(_) | AppOutcome::Failed(_) => ExitCode::from(1),
            AppOutcome::TimedOut => ExitCode::from(2),
        }
    }
}

pub(crate) type OutcomeSlot = Arc<Mutex<Option<AppOutcome>>>;

pub(crate) fn take_outcome(slot: &OutcomeSlot) -> Option<AppOutcome> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}

pub(crate) fn has_outcome(slot: &OutcomeSlot) -> bool {
    slot.lock().unwrap_or_else(PoisonError::into_inner).is_some()
}

fn record(slot: &OutcomeSlot, outcome: AppOutcome) {
    *slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(outcome);
}

/// Success saves the image and prints where it went; failure and timeout
/// print distinct notices.
pub(crate) fn terminal_actions(writer: ResourceWriter, slot: OutcomeSlot) -> TerminalActions {
    let on_success = {
        let slot = Arc::clone(&slot);
        move |resource: fetch_core::Resource| {
            let outcome = match writer.save(&resource) {
                Ok(path) => {
                    fetch_info!("Saved {} ({} bytes) to {:?}", resource.id, resource.len(), path);
                    println!("Image {} saved to {}", resource.id, path.display());
                    AppOutcome::Saved(path)
                }
                Err(err) => {
                    fetch_error!("Could not save {}: {}", resource.id, err);
                    eprintln!("Image {} was fetched but could not be saved: {err}", resource.id);
                    AppOutcome::SaveFailed(err.to_string())
                }
            };
            record(&slot, outcome);
        }
    };

    let on_failure = {
        let slot = Arc::clone(&slot);
        move |message: String| {
            eprintln!("Warning: could not fetch the image: {message}");
            record(&slot, AppOutcome::Failed(message));
        }
    };

    let on_timeout = move || {
        fetch_warn!("Fetch timed out");
        eprintln!("Timed out: the image service did not answer in time. Please try again later.");
        record(&slot, AppOutcome::TimedOut);
    };

    TerminalActions::new(on_success, on_failure, on_timeout)
}
