//! Append-only event log capability.
//!
//! Every render decision is recorded as one event: an operation name plus
//! `key=value` details. The file-backed log writes one line per event:
//!
//! ```text
//! 2026-10-19T09:41:07.512Z include file=inc/steg.md resolved=/work/inc/steg.md status=ok
//! ```

use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};

/// A single `key=value` detail attached to an event.
pub type Field<'a> = (&'a str, String);

/// Sink for render events.
pub trait EventLog {
    /// Record one event.
    fn record(&self, event: &str, fields: &[Field<'_>]);

    /// Surface a recoverable problem to the user and record it.
    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
        self.record("warning", &[("message", message.to_string())]);
    }
}

/// Render a list of strings as a JSON array for a log detail.
pub fn json_list<T: AsRef<str>>(items: &[T]) -> String {
    let items: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
    serde_json::to_string(&items).unwrap_or_else(|_| "[]".to_string())
}

/// Format one log line (without the trailing newline).
pub fn format_line(timestamp: &str, event: &str, fields: &[Field<'_>]) -> String {
    let mut line = format!("{timestamp} {event}");
    for (key, value) in fields {
        line.push(' ');
        line.push_str(key);
        line.push('=');
        line.push_str(value);
    }
    line
}

// ---------------------------------------------------------------------------
// FileEventLog
// ---------------------------------------------------------------------------

/// Appends events to a log file, one line each.
#[derive(Debug, Clone)]
pub struct FileEventLog {
    path: PathBuf,
}

impl FileEventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }
}

impl EventLog for FileEventLog {
    fn record(&self, event: &str, fields: &[Field<'_>]) {
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let line = format_line(&timestamp, event, fields);
        tracing::trace!(%line, "event");

        if let Err(e) = self.append(&line) {
            tracing::debug!(path = %self.path.display(), error = %e, "event log write failed");
        }
    }
}

// ---------------------------------------------------------------------------
// NullEventLog
// ---------------------------------------------------------------------------

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEventLog;

impl EventLog for NullEventLog {
    fn record(&self, _event: &str, _fields: &[Field<'_>]) {}
}

// ---------------------------------------------------------------------------
// MemoryEventLog
// ---------------------------------------------------------------------------

/// A captured event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedEvent {
    pub event: String,
    pub fields: Vec<(String, String)>,
}

impl LoggedEvent {
    /// Value of a detail field, if present.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Keeps events in memory, for tests.
#[derive(Debug, Default)]
pub struct MemoryEventLog {
    events: RefCell<Vec<LoggedEvent>>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LoggedEvent> {
        self.events.borrow().clone()
    }

    /// All events with the given name, in recording order.
    pub fn named(&self, event: &str) -> Vec<LoggedEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.event == event)
            .cloned()
            .collect()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.named("warning")
            .iter()
            .filter_map(|e| e.field("message").map(String::from))
            .collect()
    }
}

impl EventLog for MemoryEventLog {
    fn record(&self, event: &str, fields: &[Field<'_>]) {
        self.events.borrow_mut().push(LoggedEvent {
            event: event.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_format() {
        let line = format_line(
            "2026-01-01T00:00:00.000Z",
            "include",
            &[("file", "inc/a.md".into()), ("status", "ok".into())],
        );
        assert_eq!(line, "2026-01-01T00:00:00.000Z include file=inc/a.md status=ok");
        assert_eq!(format_line("t", "start", &[]), "t start");
    }

    #[test]
    fn json_list_renders_array() {
        assert_eq!(json_list(&["steg", "execon"]), r#"["steg","execon"]"#);
        assert_eq!(json_list::<String>(&[]), "[]");
    }

    #[test]
    fn memory_log_captures_warnings() {
        let log = MemoryEventLog::new();
        log.record("concept_index", &[("status", "built".into())]);
        log.warn("Include file not found: inc/ghost.md");

        assert_eq!(log.events().len(), 2);
        assert_eq!(log.warnings(), vec!["Include file not found: inc/ghost.md"]);
        assert_eq!(log.named("concept_index")[0].field("status"), Some("built"));
    }

    #[test]
    fn file_log_appends_lines() {
        let path = std::env::temp_dir().join(format!("sg-log-test-{}.log", uuid::Uuid::now_v7()));
        let log = FileEventLog::new(&path);
        log.record("start", &[]);
        log.record("output", &[("bytes", "42".into())]);

        let content = std::fs::read_to_string(&path).expect("read log");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" start"));
        assert!(lines[1].ends_with(" output bytes=42"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn file_log_write_failure_is_silent() {
        let log = FileEventLog::new("/nonexistent-dir-for-storygen/storygen.log");
        log.record("start", &[]);
    }
}
