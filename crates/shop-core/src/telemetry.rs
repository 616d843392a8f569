//! Logging setup.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::ShellError;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Human,
    Json,
}

/// Default filter when `RUST_LOG` is unset.
fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("info,shop_data=debug,shop_auth=debug,shop_router=debug,shop_core=debug")
    } else {
        EnvFilter::new("info")
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over `verbose`.
///
/// Fails if a subscriber is already installed.
pub fn init_tracing(format: LogFormat, verbose: bool) -> Result<(), ShellError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match format {
        LogFormat::Human => builder.with_target(verbose).try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| ShellError::Telemetry(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names() {
        assert_eq!(serde_json::to_string(&LogFormat::Json).unwrap(), "\"json\"");
        assert_eq!(LogFormat::default(), LogFormat::Human);
    }

    #[test]
    fn test_second_init_fails() {
        let _ = init_tracing(LogFormat::Human, false);
        assert!(matches!(
            init_tracing(LogFormat::Json, true),
            Err(ShellError::Telemetry(_))
        ));
    }
}
