//! Knowledge-base types - foundation data structures
//!
//! This crate contains the pure data structures shared by every part of the
//! answer-assist system: answer keys, knowledge entries and the ordered
//! knowledge base they are compiled into.
//!
//! ## Contents
//!
//! - `AnswerKey`: tagged answer encoding, resolved once at parse time
//! - `KnowledgeEntry`: one question/answer pair
//! - `KnowledgeBase`: ordered, key-unique mapping from question text to answer
//! - `SourceFormat`: which source grammar produced a knowledge base
//!
//! ## Rules
//!
//! 1. **NO PARSING OR MATCHING** - only data structures and their accessors
//! 2. **NO WORKSPACE DEPENDENCIES** - this crate sits at the bottom of the graph
//! 3. **SERIALIZABLE** - all types support serde

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Symbol for a "true" judgment answer.
pub const JUDGMENT_TRUE: char = '√';

/// Symbol for a "false" judgment answer.
pub const JUDGMENT_FALSE: char = '×';

// ============================================================================
// ANSWER KEY
// ============================================================================

/// Errors raised when answer symbol text cannot be resolved to an [`AnswerKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerKeyError {
    #[error("answer text is empty")]
    Empty,

    #[error("unsupported answer symbol '{0}'")]
    UnsupportedSymbol(char),

    #[error("answer mixes judgment symbols and option letters: '{0}'")]
    Mixed(String),

    #[error("answer contains both true and false judgments")]
    ConflictingJudgment,
}

/// Canonical encoding of a correct answer.
///
/// Selections keep their letters in ascending order with duplicates collapsed,
/// so `"CA"` and `"AC"` resolve to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnswerKey {
    /// True/false question (`√` / `×`).
    Judgment(bool),
    /// Single or multiple choice, letters in canonical order.
    Selection(BTreeSet<char>),
}

impl AnswerKey {
    /// Resolve a run of answer symbols (separators already stripped).
    pub fn from_symbols(symbols: &str) -> Result<Self, AnswerKeyError> {
        let mut letters = BTreeSet::new();
        let mut judgment: Option<bool> = None;

        for c in symbols.chars() {
            match c {
                JUDGMENT_TRUE | JUDGMENT_FALSE => {
                    let value = c == JUDGMENT_TRUE;
                    match judgment {
                        Some(existing) if existing != value => {
                            return Err(AnswerKeyError::ConflictingJudgment)
                        }
                        _ => judgment = Some(value),
                    }
                }
                c if c.is_ascii_uppercase() => {
                    letters.insert(c);
                }
                other => return Err(AnswerKeyError::UnsupportedSymbol(other)),
            }
        }

        match (judgment, letters.is_empty()) {
            (Some(_), false) => Err(AnswerKeyError::Mixed(symbols.to_string())),
            (Some(value), true) => Ok(AnswerKey::Judgment(value)),
            (None, false) => Ok(AnswerKey::Selection(letters)),
            (None, true) => Err(AnswerKeyError::Empty),
        }
    }

    /// Build a selection from letters; returns `None` when no letter is given.
    pub fn selection<I: IntoIterator<Item = char>>(letters: I) -> Option<Self> {
        let letters: BTreeSet<char> = letters.into_iter().collect();
        if letters.is_empty() {
            None
        } else {
            Some(AnswerKey::Selection(letters))
        }
    }

    /// Option letters in canonical order (empty for judgments).
    pub fn letters(&self) -> Vec<char> {
        match self {
            AnswerKey::Judgment(_) => Vec::new(),
            AnswerKey::Selection(letters) => letters.iter().copied().collect(),
        }
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerKey::Judgment(true) => write!(f, "{}", JUDGMENT_TRUE),
            AnswerKey::Judgment(false) => write!(f, "{}", JUDGMENT_FALSE),
            AnswerKey::Selection(letters) => {
                for letter in letters {
                    write!(f, "{}", letter)?;
                }
                Ok(())
            }
        }
    }
}

impl FromStr for AnswerKey {
    type Err = AnswerKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_symbols(s.trim())
    }
}

// ============================================================================
// KNOWLEDGE ENTRIES
// ============================================================================

/// One compiled question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Cleaned question text; multiple-choice stems carry their option texts.
    pub question_text: String,
    /// Resolved answer.
    pub answer_key: AnswerKey,
}

impl KnowledgeEntry {
    pub fn new(question_text: impl Into<String>, answer_key: AnswerKey) -> Self {
        Self {
            question_text: question_text.into(),
            answer_key,
        }
    }
}

/// Which source grammar produced a knowledge base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// Markdown-like blocks separated by `---`.
    Structured,
    /// Numbered line format with bracketed answers.
    Legacy,
    /// Neither grammar produced an entry.
    None,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Structured => "structured",
            SourceFormat::Legacy => "legacy",
            SourceFormat::None => "none",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// KNOWLEDGE BASE
// ============================================================================

/// Ordered mapping from question text to answer key.
///
/// Keys are unique and insertion order is preserved; it is the tie-break order
/// used by matching. Re-inserting an existing question replaces its answer but
/// keeps the original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<KnowledgeEntry>", into = "Vec<KnowledgeEntry>")]
pub struct KnowledgeBase {
    entries: Vec<KnowledgeEntry>,
    index: HashMap<String, usize>,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an entry. Returns the previous answer, if any.
    pub fn insert(
        &mut self,
        question_text: impl Into<String>,
        answer_key: AnswerKey,
    ) -> Option<AnswerKey> {
        let question_text = question_text.into();
        if let Some(&pos) = self.index.get(&question_text) {
            return Some(std::mem::replace(&mut self.entries[pos].answer_key, answer_key));
        }
        self.index.insert(question_text.clone(), self.entries.len());
        self.entries.push(KnowledgeEntry::new(question_text, answer_key));
        None
    }

    pub fn get(&self, question_text: &str) -> Option<&AnswerKey> {
        self.index
            .get(question_text)
            .map(|&pos| &self.entries[pos].answer_key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &KnowledgeEntry> {
        self.entries.iter()
    }

    /// Question texts in insertion order.
    pub fn questions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.question_text.as_str())
    }

    /// One display line per entry, `"<answer> <question>"`, for operator panels.
    pub fn listing(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| format!("{} {}", e.answer_key, e.question_text))
            .collect()
    }
}

impl From<Vec<KnowledgeEntry>> for KnowledgeBase {
    fn from(entries: Vec<KnowledgeEntry>) -> Self {
        entries.into_iter().collect()
    }
}

impl From<KnowledgeBase> for Vec<KnowledgeEntry> {
    fn from(kb: KnowledgeBase) -> Self {
        kb.entries
    }
}

impl FromIterator<KnowledgeEntry> for KnowledgeBase {
    fn from_iter<I: IntoIterator<Item = KnowledgeEntry>>(iter: I) -> Self {
        let mut kb = KnowledgeBase::new();
        for entry in iter {
            kb.insert(entry.question_text, entry.answer_key);
        }
        kb
    }
}

impl<'a> IntoIterator for &'a KnowledgeBase {
    type Item = &'a KnowledgeEntry;
    type IntoIter = std::slice::Iter<'a, KnowledgeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(s: &str) -> AnswerKey {
        AnswerKey::from_symbols(s).unwrap()
    }

    #[test]
    fn test_answer_key_judgments() {
        assert_eq!(sel("√"), AnswerKey::Judgment(true));
        assert_eq!(sel("×"), AnswerKey::Judgment(false));
        assert_eq!(sel("√√"), AnswerKey::Judgment(true));
        assert_eq!(
            AnswerKey::from_symbols("√×"),
            Err(AnswerKeyError::ConflictingJudgment)
        );
    }

    #[test]
    fn test_answer_key_selection_is_canonical() {
        assert_eq!(sel("CA"), sel("AC"));
        assert_eq!(sel("CA").to_string(), "AC");
        assert_eq!(sel("BB").to_string(), "B");
        assert_eq!(sel("ABD").letters(), vec!['A', 'B', 'D']);
    }

    #[test]
    fn test_answer_key_rejects_bad_input() {
        assert_eq!(AnswerKey::from_symbols(""), Err(AnswerKeyError::Empty));
        assert_eq!(
            AnswerKey::from_symbols("A√"),
            Err(AnswerKeyError::Mixed("A√".to_string()))
        );
        assert_eq!(
            AnswerKey::from_symbols("a"),
            Err(AnswerKeyError::UnsupportedSymbol('a'))
        );
        assert!(AnswerKey::selection(Vec::new()).is_none());
    }

    #[test]
    fn test_answer_key_display_and_parse() {
        assert_eq!(AnswerKey::Judgment(true).to_string(), "√");
        assert_eq!(AnswerKey::Judgment(false).to_string(), "×");
        assert_eq!(" AC ".parse::<AnswerKey>().unwrap(), sel("AC"));
    }

    #[test]
    fn test_knowledge_base_preserves_insertion_order() {
        let mut kb = KnowledgeBase::new();
        kb.insert("second question", sel("B"));
        kb.insert("first question", sel("A"));
        let questions: Vec<&str> = kb.questions().collect();
        assert_eq!(questions, vec!["second question", "first question"]);
    }

    #[test]
    fn test_knowledge_base_overwrite_keeps_position() {
        let mut kb = KnowledgeBase::new();
        kb.insert("q1", sel("A"));
        kb.insert("q2", sel("B"));
        let previous = kb.insert("q1", sel("C"));

        assert_eq!(previous, Some(sel("A")));
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.get("q1"), Some(&sel("C")));
        assert_eq!(kb.questions().next(), Some("q1"));
    }

    #[test]
    fn test_listing() {
        let kb: KnowledgeBase = vec![
            KnowledgeEntry::new("Sky is blue", AnswerKey::Judgment(true)),
            KnowledgeEntry::new("Pick two", sel("BD")),
        ]
        .into();
        assert_eq!(kb.listing(), vec!["√ Sky is blue", "BD Pick two"]);
    }

    #[test]
    fn test_serde_roundtrip_rebuilds_index() {
        let mut kb = KnowledgeBase::new();
        kb.insert("q1", sel("AC"));
        kb.insert("q2", AnswerKey::Judgment(false));

        let json = serde_json::to_string(&kb).unwrap();
        let back: KnowledgeBase = serde_json::from_str(&json).unwrap();

        assert_eq!(back, kb);
        assert_eq!(back.get("q2"), Some(&AnswerKey::Judgment(false)));
    }
}
