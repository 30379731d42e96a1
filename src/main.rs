mod codec;
mod db;
mod error;
mod form;
mod models;
mod run;
mod settings;
mod ui;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use settings::Settings;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let dirs = ProjectDirs::from("com", "expensetracker", "ExpenseTracker")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    let data_dir = dirs.data_dir();
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    let settings = Settings::load(dirs.config_dir()).context("Failed to load settings")?;
    init_logging(data_dir, &settings.log_level)?;

    let db_path = settings.database_path(data_dir);
    let mut db = db::Database::open(&db_path)?;

    let result = match args.len() {
        1 => run::as_tui(&mut db),
        _ => run::as_cli(&args, &mut db),
    };
    finish(result, db.close())
}

/// The run error wins over a close error; the close error is still logged.
fn finish(result: Result<()>, closed: error::Result<()>) -> Result<()> {
    match (result, closed) {
        (Ok(()), closed) => Ok(closed?),
        (Err(err), Err(close_err)) => {
            tracing::error!(%close_err, "failed to close database after error");
            Err(err)
        }
        (Err(err), Ok(())) => Err(err),
    }
}

/// Logs go to a file so they never draw over the terminal UI.
fn init_logging(data_dir: &Path, level: &str) -> Result<()> {
    let path = data_dir.join("expensetracker.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))?;
    let filter = EnvFilter::try_new(level)
        .with_context(|| format!("Invalid log_level: {level}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
