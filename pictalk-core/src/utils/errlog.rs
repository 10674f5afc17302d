//! Append-only error log next to the tracing output.

use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use chrono::Local;

pub fn format_entry(error: &dyn Display, context: &str) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{}] {}: {}\n", timestamp, context, error)
}

/// Append `[timestamp] context: error` to `log_path` and emit it as a tracing event.
/// A failure to write the file is itself only logged.
pub fn log_error(log_path: &Path, error: &dyn Display, context: &str) {
    let entry = format_entry(error, context);

    let written = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .and_then(|mut f| f.write_all(entry.as_bytes()));
    if let Err(e) = written {
        tracing::warn!("Failed to write to log file {}: {}", log_path.display(), e);
    }

    tracing::error!(context = %context, "{}", error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_error_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("error.log");

        log_error(&path, &"disk full", "upload");
        log_error(&path, &std::io::Error::other("boom"), "chat");

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('['));
        assert!(lines[0].ends_with("] upload: disk full"));
        assert!(lines[1].ends_with("] chat: boom"));
    }

    #[test]
    fn test_log_error_unwritable_path_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        log_error(&dir.path().join("missing").join("error.log"), &"x", "ctx");
    }
}
