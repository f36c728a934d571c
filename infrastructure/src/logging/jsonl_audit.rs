//! JSONL file writer for audit events.
//!
//! Each [`AuditEvent`] becomes one JSON line: the payload's fields plus
//! `type`, `timestamp` and the `run` the event belongs to. The file is opened
//! in append mode so one audit log can span many validation runs.

use citeguard_application::{AuditEvent, AuditLogger};
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Append-only JSONL audit logger.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Every line is flushed as it is
/// written, and again on `Drop`.
pub struct JsonlAuditLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
    run: String,
}

impl JsonlAuditLogger {
    /// Open (or create) the log at `path`, tagging lines with `run`.
    ///
    /// Parent directories are created as needed.
    pub fn open(path: impl AsRef<Path>, run: impl Into<String>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
            run: run.into(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(&self, event: AuditEvent) -> Value {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let mut map = match event.payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        map.insert("type".to_string(), Value::from(event.event_type));
        map.insert("timestamp".to_string(), Value::from(timestamp));
        map.insert("run".to_string(), Value::from(self.run.as_str()));
        Value::Object(map)
    }
}

impl AuditLogger for JsonlAuditLogger {
    fn log(&self, event: AuditEvent) {
        let record = self.record(event);
        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock()
            && let Err(e) = writeln!(writer, "{}", line).and_then(|_| writer.flush())
        {
            warn!("Could not write audit log {}: {}", self.path.display(), e);
        }
    }
}

impl Drop for JsonlAuditLogger {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_line_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit/citeguard.jsonl");
        let logger = JsonlAuditLogger::open(&path, "job-1").unwrap();

        logger.log(AuditEvent::new(
            "parse_fallback",
            json!({"agent": "panel-2", "tier": "tier2", "error": "no SCORE"}),
        ));
        logger.log(AuditEvent::new(
            "job_failed",
            json!({"reason": "citation c2 failed", "unresolved": ["c2"]}),
        ));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["type"], "parse_fallback");
        assert_eq!(lines[0]["agent"], "panel-2");
        assert_eq!(lines[0]["run"], "job-1");
        assert!(lines[0]["timestamp"].as_str().unwrap().ends_with('Z'));
        assert_eq!(lines[1]["type"], "job_failed");
        assert_eq!(lines[1]["unresolved"][0], "c2");
    }

    #[test]
    fn test_appends_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        for run in ["first", "second"] {
            let logger = JsonlAuditLogger::open(&path, run).unwrap();
            logger.log(AuditEvent::new("agent_failed", json!({"agent": "panel-1"})));
        }

        let runs: Vec<_> = read_lines(&path)
            .iter()
            .map(|v| v["run"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(runs, vec!["first", "second"]);
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let logger = JsonlAuditLogger::open(&path, "r").unwrap();

        logger.log(AuditEvent::new("note", json!("drained")));
        drop(logger);

        let lines = read_lines(&path);
        assert_eq!(lines[0]["type"], "note");
        assert_eq!(lines[0]["data"], "drained");
    }

    #[test]
    fn test_unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "").unwrap();

        assert!(JsonlAuditLogger::open(blocker.join("audit.jsonl"), "r").is_err());
    }
}
