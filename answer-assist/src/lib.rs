//! Question-bank compilation and live answer assistance.
//!
//! This crate turns operator-supplied question-bank text into a
//! [`KnowledgeBase`] and watches a rendering surface for questions it knows.
//! The pipeline is:
//!
//! 1. **Parse** - structured (markdown-like) text first, legacy numbered text
//!    as a fallback
//! 2. **Normalize** - punctuation- and whitespace-insensitive comparison keys
//! 3. **Detect** - debounced change notifications, duplicate suppression and
//!    a single in-flight processing pass
//! 4. **Act** - operator confirmation, then a rate-limited answer application
//!
//! # Architecture
//!
//! ```text
//! raw text ──► parser ──► KnowledgeBase ─────────────┐
//!    │                                               ▼
//!    └──► TextStore          change ──► DetectionController ──► ActionSink
//!                            notifications      │
//!                                               ▼
//!                                       QuestionSource
//! ```
//!
//! # Example
//!
//! ```ignore
//! use answer_assist::{spawn_detection, AssistConfig, KnowledgeLoader, MemoryTextStore};
//!
//! let loader = KnowledgeLoader::new(Arc::new(MemoryTextStore::new()));
//! let knowledge = loader
//!     .ingest(&bank_text)?
//!     .map(|report| report.knowledge)
//!     .unwrap_or_default();
//!
//! let (handle, task) = spawn_detection(&config, Arc::new(knowledge), surface, sink);
//! handle.start_deferred();
//! // on every surface mutation:
//! handle.notify()?;
//! ```

pub mod config;
pub mod detection;
pub mod error;
pub mod loader;
pub mod matcher;
pub mod normalize;
pub mod parser;
pub mod rate_limit;
pub mod store;
pub mod surface;
pub mod telemetry;

pub use config::AssistConfig;
pub use detection::{
    spawn_detection, ActionOutcome, DetectionController, DetectionHandle, DetectionPhase,
    DetectionStats, PassOutcome,
};
pub use error::{AssistError, ConfigError, Result};
pub use kb_types::{AnswerKey, AnswerKeyError, KnowledgeBase, KnowledgeEntry, SourceFormat};
pub use loader::KnowledgeLoader;
pub use matcher::{find_match, MatchHit};
pub use normalize::normalize;
pub use parser::{parse, parse_legacy, parse_report, parse_structured, ParseReport};
pub use rate_limit::RateLimiter;
pub use store::{FileTextStore, MemoryTextStore, TextStore};
pub use surface::{
    plan_selection, ActionSink, Decision, MatchRequest, QuestionSource, RenderedOption,
};

/// Default quiet period before a burst of surface changes is processed (milliseconds).
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

/// Default minimum time between two applied answers (milliseconds).
pub const DEFAULT_MIN_ANSWER_INTERVAL_MS: u64 = 800;

/// Default hold-off after a confirmation step (milliseconds).
pub const DEFAULT_RESUME_DELAY_MS: u64 = 800;

/// Default delay before a deferred start begins observing (milliseconds).
pub const DEFAULT_START_DELAY_MS: u64 = 1200;
