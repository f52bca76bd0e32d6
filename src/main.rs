//! Binary entry point that glues the SQLite-backed report store to the TUI:
//! load settings, start logging, open the database, then drive the Ratatui
//! event loop until the user exits.
use solar_kit_sizer::config::{self, AppConfig};
use solar_kit_sizer::{logging, run_app, App, ReportStore};
use tracing::info;

/// Returning a `Result` bubbles fatal start-up problems (an unreadable config,
/// a database that cannot be created) to the terminal instead of crashing
/// silently.
fn main() -> anyhow::Result<()> {
    // Logging comes up first so config warnings reach the log file.
    let data_dir = config::default_data_dir()?;
    config::ensure_data_dir(&data_dir)?;
    logging::init(&config::log_path_in(&data_dir))?;
    let config = AppConfig::load_from(&data_dir)?;

    let store = ReportStore::open(&config.database_path())?;
    store.initialize()?;
    info!(database = %config.database_path().display(), "report store ready");

    let mut app = App::new(store, config)?;
    run_app(&mut app)
}
