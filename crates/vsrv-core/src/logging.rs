//! Tracing setup and structured operation logging.

use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter directive when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "vsrv=info";

/// Install the global tracing subscriber.
///
/// JSON output when `LOG_FORMAT=json`, coloured human output otherwise.
/// Calling this twice is harmless; the second call is ignored.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let result = if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .try_init()
    };

    if result.is_err() {
        warn!("Tracing subscriber already installed");
    }
}

/// Logs the lifecycle of one operation on one subject with consistent fields.
#[derive(Debug, Clone)]
pub struct OperationLogger {
    operation: String,
    subject: String,
}

impl OperationLogger {
    /// Create a logger for `operation` (e.g. "clip_cut") on `subject` (e.g. a video id).
    pub fn new(operation: &str, subject: impl Into<String>) -> Self {
        Self {
            operation: operation.to_string(),
            subject: subject.into(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            operation = %self.operation,
            subject = %self.subject,
            "Operation started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            operation = %self.operation,
            subject = %self.subject,
            "Operation progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            operation = %self.operation,
            subject = %self.subject,
            "Operation warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            operation = %self.operation,
            subject = %self.subject,
            "Operation error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            operation = %self.operation,
            subject = %self.subject,
            "Operation completed: {}", message
        );
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_logger_fields() {
        let logger = OperationLogger::new("clip_cut", "abc");
        assert_eq!(logger.operation(), "clip_cut");
        assert_eq!(logger.subject(), "abc");
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        init_tracing();
    }
}
