//! Persistence of the raw question-bank text.
//!
//! Only the raw text is stored; the knowledge base is always recompiled from
//! it, so a restored session parses exactly what the operator supplied.

use crate::error::{AssistError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Key-value style store for the raw question-bank text.
pub trait TextStore: Send + Sync {
    /// Previously saved text, or an empty string when nothing was saved.
    fn load(&self) -> Result<String>;

    fn save(&self, text: &str) -> Result<()>;
}

/// In-process store; contents are lost with the process.
#[derive(Debug, Default)]
pub struct MemoryTextStore {
    text: Mutex<String>,
}

impl MemoryTextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Mutex::new(text.into()),
        }
    }
}

impl TextStore for MemoryTextStore {
    fn load(&self) -> Result<String> {
        Ok(self
            .text
            .lock()
            .map(|t| t.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone()))
    }

    fn save(&self, text: &str) -> Result<()> {
        let mut guard = self
            .text
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = text.to_string();
        Ok(())
    }
}

/// Store backed by a single UTF-8 file.
#[derive(Debug, Clone)]
pub struct FileTextStore {
    path: PathBuf,
}

impl FileTextStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> AssistError {
        AssistError::Store {
            path: self.path.clone(),
            source,
        }
    }
}

impl TextStore for FileTextStore {
    fn load(&self) -> Result<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No persisted question bank");
                Ok(String::new())
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        std::fs::write(&self.path, text).map_err(|e| self.io_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryTextStore::new();
        assert_eq!(store.load().unwrap(), "");
        store.save("1）q\n答案：【A】").unwrap();
        assert_eq!(store.load().unwrap(), "1）q\n答案：【A】");
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTextStore::new(dir.path().join("bank.txt"));
        assert_eq!(store.load().unwrap(), "");
    }

    #[test]
    fn test_file_store_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTextStore::new(dir.path().join("nested/dir/bank.txt"));

        store.save("### 1. q\n**答案：** B\n---").unwrap();
        assert_eq!(store.load().unwrap(), "### 1. q\n**答案：** B\n---");
    }

    #[test]
    fn test_file_store_read_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be read as a file
        let store = FileTextStore::new(dir.path());
        assert!(matches!(store.load(), Err(AssistError::Store { .. })));
    }
}
