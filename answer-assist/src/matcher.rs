//! Containment matcher
//!
//! Finds the knowledge-base entry for a live question. Both sides are
//! normalized, then an entry matches when either normalized string contains
//! the other:
//!
//! - live text usually carries extra chrome (numbering, instructions, options)
//!   around the stem, so `live ⊇ entry` is the common case;
//! - knowledge-base stems may embed option text the live rendering lacks, so
//!   `entry ⊇ live` is accepted as well.
//!
//! The first entry in insertion order wins. There is no scoring: short,
//! generic stems can match unrelated live text.

use crate::normalize::normalize;
use kb_types::{AnswerKey, KnowledgeBase};
use serde::Serialize;

/// A knowledge-base entry selected for a live question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchHit<'a> {
    /// Question text as stored in the knowledge base.
    pub question: &'a str,
    pub answer: &'a AnswerKey,
}

/// Find the first entry in a containment relationship with `live_text`.
///
/// Empty comparison forms never match. This departs from plain containment in
/// one degenerate case: an entry that normalizes to the empty string is a
/// substring of every live text and would otherwise be returned for any
/// question, ahead of every later entry. An empty live text is rejected for
/// the same reason.
pub fn find_match<'a>(live_text: &str, kb: &'a KnowledgeBase) -> Option<MatchHit<'a>> {
    let live = normalize(live_text);
    if live.is_empty() {
        return None;
    }

    kb.iter()
        .find(|entry| {
            let stored = normalize(&entry.question_text);
            !stored.is_empty() && (live.contains(&stored) || stored.contains(&live))
        })
        .map(|entry| MatchHit {
            question: &entry.question_text,
            answer: &entry.answer_key,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use kb_types::KnowledgeEntry;

    fn kb(entries: &[(&str, &str)]) -> KnowledgeBase {
        entries
            .iter()
            .map(|(q, a)| KnowledgeEntry::new(*q, AnswerKey::from_symbols(a).unwrap()))
            .collect()
    }

    #[test]
    fn test_live_text_contains_entry() {
        let kb = parse("1）2+2等于几\nA. 3\nB. 4\n答案：【B】");
        let hit = find_match("2+2等于几 A.3 B.4", &kb).unwrap();
        assert_eq!(hit.question, "2+2等于几");
        assert_eq!(hit.answer.to_string(), "B");
    }

    #[test]
    fn test_entry_contains_live_text() {
        let kb = kb(&[("What is the capital of France? Paris Rome", "A")]);
        let hit = find_match("capital of France", &kb).unwrap();
        assert_eq!(hit.answer.to_string(), "A");
    }

    #[test]
    fn test_match_ignores_case_spacing_and_brackets() {
        let kb = kb(&[("Rust (the language) is memory safe", "√")]);
        assert!(find_match("3. RUST the language IS memory-safe", &kb).is_none());
        assert!(find_match("3、 rust【the language】 is memory safe", &kb).is_some());
    }

    #[test]
    fn test_first_inserted_entry_wins() {
        let kb = kb(&[("primes", "A"), ("which are primes", "C")]);
        let hit = find_match("Which are primes: 2 3 5", &kb).unwrap();
        assert_eq!(hit.question, "primes");
        assert_eq!(hit.answer.to_string(), "A");
    }

    #[test]
    fn test_no_match() {
        let kb = kb(&[("completely different", "A")]);
        assert!(find_match("unseen question", &kb).is_none());
        assert!(find_match("anything", &KnowledgeBase::new()).is_none());
    }

    #[test]
    fn test_empty_forms_never_match() {
        let kb = kb(&[("()", "A"), ("real question", "B")]);
        assert!(find_match(" . ", &kb).is_none());
        let hit = find_match("a real question here", &kb).unwrap();
        assert_eq!(hit.question, "real question");
    }
}
