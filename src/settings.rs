//! Application settings, layered from defaults, an optional `settings.toml` in
//! the platform config directory and `EXPENSETRACKER_*` environment variables.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub(crate) const ENV_PREFIX: &str = "EXPENSETRACKER";

#[derive(Debug, Deserialize)]
pub(crate) struct Settings {
    /// Database file. Defaults to `expenses.db` in the data directory.
    pub(crate) database: Option<PathBuf>,
    /// `tracing` filter directive, e.g. `debug` or `expensetracker=trace`.
    pub(crate) log_level: String,
}

impl Settings {
    pub(crate) fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        Self::builder(config_dir)?
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()
    }

    fn builder(
        config_dir: &Path,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("log_level", "info")?
            .add_source(File::from(config_dir.join("settings.toml")).required(false)))
    }

    pub(crate) fn database_path(&self, data_dir: &Path) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| data_dir.join("expenses.db"))
    }
}
