//! Log events in transit from the gateway to the client.

use chrono::{DateTime, Utc};

use crate::error::Error;

/// What a decoded event represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEventKind {
    /// A decoded log line.
    Log,
    /// A source-level failure report.
    Error,
}

/// One decoded log line (or source error) on its way to the client.
///
/// Ephemeral: exists only in transit, never persisted.
#[derive(Debug, Clone)]
pub struct LogEvent {
    /// Event kind.
    pub kind: LogEventKind,
    /// Raw line text, or the error message for [`LogEventKind::Error`].
    pub data: String,
    /// Wall-clock receipt time, not the engine's embedded timestamp.
    pub timestamp: DateTime<Utc>,
    /// Originating container name.
    pub container_name: String,
}

impl LogEvent {
    /// Build a log-line event stamped with the current time.
    pub fn line(container_name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            kind: LogEventKind::Log,
            data: data.into(),
            timestamp: Utc::now(),
            container_name: container_name.into(),
        }
    }

    /// Build a source-error event stamped with the current time.
    pub fn error(container_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: LogEventKind::Error,
            data: message.into(),
            timestamp: Utc::now(),
            container_name: container_name.into(),
        }
    }

    /// Surface a mid-stream failure to the client, using the wording the
    /// frontend renders inline.
    pub fn from_source_error(container_name: impl Into<String>, error: &Error) -> Self {
        Self::error(container_name, format!("Log stream error: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_failure_keeps_the_client_facing_wording() {
        let event = LogEvent::from_source_error("web-1", &Error::Source("broken pipe".into()));
        assert_eq!(event.kind, LogEventKind::Error);
        assert_eq!(event.data, "Log stream error: broken pipe");
        assert_eq!(event.container_name, "web-1");
    }
}
