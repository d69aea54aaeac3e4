use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single line output.
    #[default]
    Compact,
    /// Structured JSON for log shippers.
    Json,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(AppError::Configuration(format!(
                "unknown log format {other}, expected compact or json"
            ))),
        }
    }
}

pub fn init(log_level: &str, format: LogFormat) -> Result<(), AppError> {
    let filter = EnvFilter::try_new(log_level)
        .map_err(|err| AppError::Configuration(format!("invalid LOG_LEVEL: {err}")))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|err| AppError::Internal(format!("failed to install log subscriber: {err}")))
}
