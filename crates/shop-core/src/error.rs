//! Error types for the shell.

use shop_data::FetchError;
use shop_router::RouteError;
use thiserror::Error;

/// Errors that can occur assembling the shell.
#[derive(Error, Debug)]
pub enum ShellError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Reading a config file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Route table is invalid.
    #[error("Route table error: {0}")]
    Route(#[from] RouteError),

    /// Transport could not be created.
    #[error("Transport error: {0}")]
    Fetch(#[from] FetchError),

    /// Logging could not be initialized.
    #[error("Telemetry error: {0}")]
    Telemetry(String),
}
