// Forbid accidental stdout/stderr writes in the *library* portion of the TUI.
// The terminal is owned by the UI; diagnostics go to the log file.
#![deny(clippy::print_stdout, clippy::print_stderr)]

use std::fs::OpenOptions;
use std::sync::Arc;

use color_eyre::eyre::WrapErr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;
use warden_core::BackendClient;
use warden_core::ConsoleConfig;
use warden_core::HttpBackend;
use warden_core::config::ConfigLoader;

mod app;
mod app_event;
mod app_event_sender;
mod cli;
mod key_hint;
mod lookup_pane;
mod overlays;
mod query_form;
mod record_view;
mod references;
#[cfg(test)]
mod test_support;
mod toast;
mod tui;

pub use cli::Cli;

const LOG_FILE_NAME: &str = "warden-tui.log";
const DEFAULT_LOG_FILTER: &str = "warden_core=info,warden_tui=info";

pub async fn run_main(cli: Cli) -> color_eyre::Result<()> {
    let config = ConfigLoader::new()
        .with_overrides(cli.config_overrides())
        .load()
        .wrap_err("failed to load configuration")?;

    let _log_guard = init_logging(&config)?;
    tracing::info!("starting console against {}", config.base_url);

    let client: Arc<dyn BackendClient> = Arc::new(
        HttpBackend::new(&config.base_url).wrap_err("invalid backend base URL")?,
    );

    let mut app = app::App::new(&config, client, cli.initial_key());
    let mut terminal = tui::init().wrap_err("failed to initialise terminal")?;
    let result = app.run(&mut terminal).await;
    tui::restore().wrap_err("failed to restore terminal")?;
    result
}

/// Route tracing to `{log_dir}/warden-tui.log`. Returns `None` when no log
/// directory is configured, in which case events are discarded.
fn init_logging(config: &ConsoleConfig) -> color_eyre::Result<Option<WorkerGuard>> {
    let Some(log_dir) = &config.log_dir else {
        return Ok(None);
    };
    std::fs::create_dir_all(log_dir)
        .wrap_err_with(|| format!("failed to create log directory {}", log_dir.display()))?;
    let log_path = log_dir.join(LOG_FILE_NAME);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .wrap_err_with(|| format!("failed to open {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(false)
        .with_ansi(false)
        .with_filter(env_filter);
    let _ = tracing_subscriber::registry().with(file_layer).try_init();
    Ok(Some(guard))
}
