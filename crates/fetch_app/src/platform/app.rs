use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use fetch_core::{FetchRequest, SearchMode};
use fetch_engine::{ReqwestFetcher, ResourceWriter, TaskCoordinator, UiLoop};
use fetch_logging::{fetch_info, fetch_warn};

use super::actions::{has_outcome, take_outcome, terminal_actions, OutcomeSlot};
use super::cli::Cli;
use super::logging;
use super::settings::{load_settings, save_settings};
use super::status::TerminalStatus;

/// Extra time the main loop waits past the poll ceiling before giving up on
/// a terminal action ever arriving.
const DELIVERY_GRACE: Duration = Duration::from_secs(2);

pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::initialize(cli.log, &cli.log_file);
    fetch_info!("Starting fetch_app");

    let mut settings = load_settings(&cli.settings);
    settings.apply_cli(&cli);
    if cli.write_settings {
        let path = save_settings(&cli.settings, &settings)
            .with_context(|| format!("writing settings to {}", cli.settings.display()))?;
        fetch_info!("Settings written to {:?}", path);
    }

    let mode = if cli.patient {
        SearchMode::ByPatient
    } else {
        SearchMode::ById
    };
    let request = FetchRequest::new(cli.id.as_str(), mode).context("invalid request")?;
    let config = settings
        .poll_config()
        .context("invalid delay or estimation settings")?;

    // Created here, so the main thread is the UI thread.
    let (ui_loop, ui) = UiLoop::new();
    let fetcher = Arc::new(ReqwestFetcher::new(settings.fetch_settings()));
    let coordinator = TaskCoordinator::new(ui, fetcher);

    let slot = OutcomeSlot::default();
    let actions = terminal_actions(
        ResourceWriter::new(settings.output_dir.clone()),
        Arc::clone(&slot),
    );
    let task = coordinator
        .execute(
            request,
            config,
            Box::new(TerminalStatus::stderr()),
            actions,
        )
        .context("could not start the fetch")?;

    let finished = ui_loop.run_until(config.ceiling() + DELIVERY_GRACE, || has_outcome(&slot));
    if !finished {
        fetch_warn!("Task {} produced no outcome in time", task.id());
        return Err(anyhow!("no outcome was delivered for task {}", task.id()));
    }

    let outcome = take_outcome(&slot).ok_or_else(|| anyhow!("outcome vanished"))?;
    fetch_info!("Task {} finished: {:?}", task.id(), outcome);
    Ok(outcome.exit_code())
}
