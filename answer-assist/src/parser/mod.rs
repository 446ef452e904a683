//! Knowledge-base parsing
//!
//! Two independent source grammars compile raw question-bank text into a
//! [`KnowledgeBase`]:
//!
//! ```text
//! raw text
//!    │
//!    ▼
//! ┌──────────────────────────────┐
//! │  structured (### N. … / ---) │── ≥1 entry ──► KnowledgeBase (structured)
//! └──────────────────────────────┘
//!    │ no entries
//!    ▼
//! ┌──────────────────────────────┐
//! │  legacy (N） … 答案：【X】)   │── ≥1 entry ──► KnowledgeBase (legacy)
//! └──────────────────────────────┘
//!    │ no entries
//!    ▼
//! empty KnowledgeBase
//! ```
//!
//! Dispatch is order-based, not content-sniffed: when any structured block
//! yields an entry, the structured result is returned and the legacy grammar
//! is never consulted, even for input that mixes both formats.
//!
//! Both grammars are total. Unrecognised input produces no entries; it is
//! never an error.

mod legacy;
mod structured;

pub use legacy::parse_legacy;
pub use structured::parse_structured;

use kb_types::{KnowledgeBase, SourceFormat};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Option letters accepted in answers and option lines.
const LETTER_CLASS: &str = "A-D";

/// Bracketed answer shared by both grammars: `答案：【AC】`.
static BRACKETED_ANSWER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"答案[：:]【([{}√×]+)】", LETTER_CLASS)).unwrap()
});

/// Result of compiling raw text: the knowledge base and the grammar that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseReport {
    pub knowledge: KnowledgeBase,
    pub format: SourceFormat,
}

impl ParseReport {
    /// Number of compiled entries (zero for unrecognised input).
    pub fn count(&self) -> usize {
        self.knowledge.len()
    }

    pub fn is_empty(&self) -> bool {
        self.knowledge.is_empty()
    }
}

/// Compile raw text into a knowledge base.
///
/// Never fails: input neither grammar recognises yields an empty knowledge base.
pub fn parse(raw: &str) -> KnowledgeBase {
    parse_report(raw).knowledge
}

/// Compile raw text and report which grammar produced the entries.
pub fn parse_report(raw: &str) -> ParseReport {
    let (knowledge, format) = if let Some(kb) = parse_structured(raw) {
        (kb, SourceFormat::Structured)
    } else if let Some(kb) = parse_legacy(raw) {
        (kb, SourceFormat::Legacy)
    } else {
        (KnowledgeBase::new(), SourceFormat::None)
    };

    debug!(entries = knowledge.len(), format = %format, "Parsed knowledge base");

    ParseReport { knowledge, format }
}

/// Find a bracketed `答案：【…】` answer in `text`, returning the raw symbols.
fn find_bracketed_answer(text: &str) -> Option<&str> {
    BRACKETED_ANSWER_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
