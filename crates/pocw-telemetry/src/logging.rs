//! Structured console/JSON logging built on `tracing-subscriber`.

use crate::{TelemetryConfig, TelemetryError};
use tracing_subscriber::EnvFilter;

/// Guard returned by `init_logging`. Dropping it is a no-op; it exists so
/// callers hold something for the life of the process, matching the
/// teacher's guard-based shutdown convention.
pub struct LoggingGuard {
    _initialized: bool,
}

/// Initialize the global `tracing` subscriber from `TelemetryConfig`.
pub fn init_logging(config: &TelemetryConfig) -> Result<LoggingGuard, TelemetryError> {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if config.json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };

    // A subscriber may already be installed (e.g. in tests); that is not
    // a fatal condition for the caller.
    if let Err(e) = result {
        tracing::debug!("tracing subscriber already initialized: {e}");
    }

    tracing::info!(service = %config.service_name, "structured logging initialized");
    Ok(LoggingGuard { _initialized: true })
}

/// Log a task-lifecycle event with standard fields.
#[macro_export]
macro_rules! log_task_event {
    ($level:ident, $msg:expr, $task_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            task_id = %$task_id,
            $($($field)*,)?
            $msg
        )
    };
}
