//! Append-only row sink for evaluation logs.
//!
//! The sink enforces no schema. Callers own the column order.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Error during persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("failed to open log {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to append row: {0}")]
    Write(#[from] std::io::Error),

    #[error("failed to encode row: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Destination for ordered rows. No update, no delete.
pub trait RowSink: Send {
    fn append_row(&mut self, values: &[String]) -> Result<(), PersistenceError>;
}

/// One JSON array per line, appended to a file.
#[derive(Debug)]
pub struct JsonlRowSink {
    path: PathBuf,
    file: File,
}

impl JsonlRowSink {
    /// Open `path` for appending, creating it and its parent directory if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| PersistenceError::Open {
                path: path.clone(),
                source,
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| PersistenceError::Open {
                path: path.clone(),
                source,
            })?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RowSink for JsonlRowSink {
    fn append_row(&mut self, values: &[String]) -> Result<(), PersistenceError> {
        let mut line = serde_json::to_string(values)?;
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        debug!(path = %self.path.display(), columns = values.len(), "row appended");
        Ok(())
    }
}

/// In-memory sink.
#[derive(Debug, Default, Clone)]
pub struct MemoryRowSink {
    pub rows: Vec<Vec<String>>,
}

impl RowSink for MemoryRowSink {
    fn append_row(&mut self, values: &[String]) -> Result<(), PersistenceError> {
        self.rows.push(values.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jsonl_appends_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("evaluations.jsonl");

        let mut sink = JsonlRowSink::open(&path).unwrap();
        sink.append_row(&["a".into(), "b".into()]).unwrap();
        drop(sink);

        let mut sink = JsonlRowSink::open(&path).unwrap();
        sink.append_row(&["c, with comma".into()]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let row: Vec<String> = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(row, vec!["c, with comma".to_string()]);
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemoryRowSink::default();
        sink.append_row(&["x".into()]).unwrap();
        sink.append_row(&[]).unwrap();
        assert_eq!(sink.rows.len(), 2);
        assert!(sink.rows[1].is_empty());
    }
}
