//! Knowledge ingestion: operator-supplied text and restored sessions.

use crate::config::AssistConfig;
use crate::error::Result;
use crate::parser::{parse_report, ParseReport};
use crate::store::{FileTextStore, MemoryTextStore, TextStore};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Compiles question-bank text and keeps the raw text persisted.
pub struct KnowledgeLoader {
    store: Arc<dyn TextStore>,
}

impl KnowledgeLoader {
    pub fn new(store: Arc<dyn TextStore>) -> Self {
        Self { store }
    }

    /// Loader over the store named by `config.store_path`, or an in-memory
    /// store when none is configured.
    pub fn from_config(config: &AssistConfig) -> Self {
        let store: Arc<dyn TextStore> = match &config.store_path {
            Some(path) => {
                let store = FileTextStore::new(path);
                debug!(path = %store.path().display(), "Question bank persisted to file");
                Arc::new(store)
            }
            None => Arc::new(MemoryTextStore::new()),
        };
        Self::new(store)
    }

    /// Compile operator-supplied text and persist it.
    ///
    /// Blank input is ignored: nothing is parsed or saved and `None` is
    /// returned, so an accidental empty submit never wipes a saved bank.
    /// Text that compiles to zero entries is still saved; the report's count
    /// tells the operator nothing was recognised.
    pub fn ingest(&self, raw: &str) -> Result<Option<ParseReport>> {
        if raw.trim().is_empty() {
            return Ok(None);
        }

        let report = parse_report(raw);
        self.store.save(raw)?;

        if report.is_empty() {
            warn!("Question bank text produced no entries");
        } else {
            info!(
                entries = report.count(),
                format = %report.format,
                "Question bank loaded"
            );
        }

        Ok(Some(report))
    }

    /// Recompile the text saved by a previous session, if any.
    pub fn restore(&self) -> Result<Option<ParseReport>> {
        let raw = self.store.load()?;
        if raw.trim().is_empty() {
            return Ok(None);
        }

        let report = parse_report(&raw);
        info!(
            entries = report.count(),
            format = %report.format,
            "Question bank restored"
        );
        Ok(Some(report))
    }

    /// Raw text currently persisted (empty when none).
    pub fn persisted_text(&self) -> Result<String> {
        self.store.load()
    }
}
