//! Logging bootstrap
//!
//! The library only emits `tracing` events (targets `wsmodel::storage` and
//! `wsmodel::model`); installing a subscriber is up to the application.
//! [`init`] installs a plain `fmt` subscriber at the configured level.

use wsmodel_core::{Error, Result, StorageConfig};

/// Install a global `fmt` subscriber at `config.log_level`
///
/// # Errors
///
/// `Config` if the level is invalid or a global subscriber is already set.
pub fn init(config: &StorageConfig) -> Result<()> {
    let level = parse_level(&config.log_level)?;
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Config(format!("Failed to install log subscriber: {}", e)))
}

fn parse_level(level: &str) -> Result<tracing::Level> {
    level
        .parse()
        .map_err(|_| Error::Config(format!("Invalid log_level '{}'", level)))
}
