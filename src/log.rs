/*
 * KeyHashRust v1.0.0
 * Copyright (c) 2026 Tiash H Kabir / @MrCarb0n.
 * Licensed under the MIT License.
 */

//! Diagnostic log stream the reporter writes to.
//!
//! A record carries a severity, a tag and a message, plus an optional failure
//! rendered as context. [`crate::ui::Ui`] prints records to the console and
//! [`MemoryLog`] keeps them for inspection.

use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Debug,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Debug => "D",
            Severity::Warn => "W",
            Severity::Error => "E",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub severity: Severity,
    pub tag: String,
    pub message: String,
    /// Failure attached to an error record, including its source chain.
    pub cause: Option<String>,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}: {}", self.severity, self.tag, self.message)?;
        if let Some(cause) = &self.cause {
            write!(f, " ({})", cause)?;
        }
        Ok(())
    }
}

pub trait LogSink {
    fn write(&self, record: LogRecord);

    fn debug(&self, tag: &str, message: &str) {
        self.write(LogRecord {
            severity: Severity::Debug,
            tag: tag.to_string(),
            message: message.to_string(),
            cause: None,
        });
    }

    fn warn(&self, tag: &str, message: &str) {
        self.write(LogRecord {
            severity: Severity::Warn,
            tag: tag.to_string(),
            message: message.to_string(),
            cause: None,
        });
    }

    fn error_with(&self, tag: &str, message: &str, cause: &dyn std::error::Error) {
        self.write(LogRecord {
            severity: Severity::Error,
            tag: tag.to_string(),
            message: message.to_string(),
            cause: Some(render_chain(cause)),
        });
    }
}

/// `outer: inner: innermost`. A source whose text its parent already shows
/// is not repeated.
pub fn render_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut parent = out.clone();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !parent.contains(&text) {
            out.push_str(": ");
            out.push_str(&text);
        }
        parent = text;
        source = inner.source();
    }
    out
}

#[derive(Debug, Default)]
pub struct MemoryLog {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }

    pub fn with_severity(&self, severity: Severity) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.severity == severity)
            .collect()
    }
}

impl LogSink for MemoryLog {
    fn write(&self, record: LogRecord) {
        if let Ok(mut g) = self.records.lock() {
            g.push(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyHashError;
    use std::io;

    #[test]
    fn memory_log_keeps_order() {
        let log = MemoryLog::new();
        log.debug("KeyHash", "first");
        log.warn("KeyHash", "second");
        let records = log.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "first");
        assert_eq!(records[1].severity, Severity::Warn);
        assert_eq!(log.with_severity(Severity::Debug).len(), 1);
    }

    #[test]
    fn error_records_show_wrapped_cause_once() {
        let log = MemoryLog::new();
        let err = KeyHashError::Io(io::Error::new(io::ErrorKind::NotFound, "gone"));
        log.error_with("KeyHash", "Failed", &err);
        let record = &log.records()[0];
        assert_eq!(record.cause.as_deref(), Some("I/O Error: gone"));
        assert_eq!(record.to_string(), "E/KeyHash: Failed (I/O Error: gone)");
    }

    #[derive(Debug)]
    struct Lookup(io::Error);

    impl fmt::Display for Lookup {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("package lookup failed")
        }
    }

    impl std::error::Error for Lookup {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn hidden_sources_are_appended() {
        let err = Lookup(io::Error::new(io::ErrorKind::Other, "binder died"));
        assert_eq!(render_chain(&err), "package lookup failed: binder died");
    }
}
