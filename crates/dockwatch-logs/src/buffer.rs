//! Append-only in-memory log buffer with search and export.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use dockwatch_core::LogEvent;

/// Severity guessed from line content.
///
/// Log lines carry no structured level, so this scans for the usual
/// keywords and falls back to [`LogLevel::Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    /// Line mentions `err`/`error`.
    Error,
    /// Line mentions `warn`/`warning`.
    Warn,
    /// Line mentions `info`.
    Info,
    /// Line mentions `debug`.
    Debug,
    /// No level keyword found.
    Default,
}

impl LogLevel {
    /// Classify a line by scanning for level keywords, first match wins.
    pub fn classify(line: &str) -> Self {
        let lower = line.to_lowercase();
        if lower.contains("err") {
            Self::Error
        } else if lower.contains("warn") {
            Self::Warn
        } else if lower.contains("info") {
            Self::Info
        } else if lower.contains("debug") {
            Self::Debug
        } else {
            Self::Default
        }
    }
}

/// One buffered log line.
#[derive(Debug, Clone)]
pub struct BufferedLine {
    /// Line text.
    pub data: String,
    /// Receipt time.
    pub timestamp: DateTime<Utc>,
    /// Originating container name.
    pub container_name: String,
    /// Guessed severity.
    pub level: LogLevel,
}

/// Append-only buffer of received log lines.
///
/// Unbounded by default; an optional capacity evicts the oldest line once
/// full so a long-running view cannot grow without limit.
#[derive(Debug, Default)]
pub struct LogBuffer {
    lines: VecDeque<BufferedLine>,
    capacity: Option<usize>,
}

impl LogBuffer {
    /// Create an unbounded buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer that keeps at most `capacity` lines.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity: Some(capacity),
        }
    }

    /// Append an event, evicting the oldest line when at capacity.
    pub fn push(&mut self, event: LogEvent) {
        if let Some(capacity) = self.capacity {
            if self.lines.len() >= capacity {
                self.lines.pop_front();
            }
        }

        self.lines.push_back(BufferedLine {
            level: LogLevel::classify(&event.data),
            data: event.data,
            timestamp: event.timestamp,
            container_name: event.container_name,
        });
    }

    /// Number of buffered lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the buffer holds no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Iterate over buffered lines in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &BufferedLine> {
        self.lines.iter()
    }

    /// Lines whose text contains `term`, case-insensitively.
    ///
    /// An empty term matches every line.
    pub fn search(&self, term: &str) -> Vec<&BufferedLine> {
        let term = term.to_lowercase();
        self.lines
            .iter()
            .filter(|line| line.data.to_lowercase().contains(&term))
            .collect()
    }

    /// Render the whole buffer as `[timestamp] text` lines for download.
    pub fn export(&self) -> String {
        self.lines
            .iter()
            .map(|line| format!("[{}] {}", line.timestamp.to_rfc3339(), line.data))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Drop every buffered line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
