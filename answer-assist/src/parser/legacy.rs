//! Legacy numbered-line question-bank grammar.
//!
//! ```text
//! 12）【单选】【难度：易】
//! 下列哪个是质数
//! A. 4
//! B. 5
//! 答案：【B】
//! ```
//!
//! A line starting with `<digits>）` opens a question, following lines extend
//! the stem until the bracketed answer line. Option lines and `【…】` tag
//! lines are skipped.

use super::{find_bracketed_answer, LETTER_CLASS};
use kb_types::{AnswerKey, KnowledgeBase};
use regex::Regex;
use std::sync::LazyLock;

static QUESTION_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[）)]").unwrap());

static SKIPPED_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^[{}]\.|【[^】]+】", LETTER_CLASS)).unwrap());

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"【[^】]+】").unwrap());

static NUMBER_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[）)]\s*").unwrap());

static WHITESPACE_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Question being accumulated line by line.
#[derive(Debug, Default)]
struct PendingQuestion {
    stem: String,
    answer: Option<AnswerKey>,
    in_question: bool,
}

impl PendingQuestion {
    fn open(line: &str) -> Self {
        Self {
            stem: line.to_string(),
            answer: None,
            in_question: true,
        }
    }

    /// Take the completed `(stem, answer)` pair, if both are present.
    fn take_complete(&mut self) -> Option<(String, AnswerKey)> {
        if self.stem.is_empty() {
            return None;
        }
        let answer = self.answer.take()?;
        Some((std::mem::take(&mut self.stem), answer))
    }
}

/// Parse the legacy grammar. Returns `None` when no question yields an entry.
pub fn parse_legacy(raw: &str) -> Option<KnowledgeBase> {
    let mut committed: Vec<(String, AnswerKey)> = Vec::new();
    let mut current = PendingQuestion::default();

    for line in raw.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if QUESTION_START_RE.is_match(line) {
            committed.extend(current.take_complete());
            current = PendingQuestion::open(line);
            continue;
        }

        if let Some(symbols) = find_bracketed_answer(line) {
            // An unresolvable answer still closes the stem.
            current.answer = AnswerKey::from_symbols(symbols).ok();
            current.in_question = false;
            continue;
        }

        if SKIPPED_LINE_RE.is_match(line) {
            continue;
        }

        if current.in_question && !current.stem.is_empty() {
            current.stem.push(' ');
            current.stem.push_str(line);
        }
    }
    committed.extend(current.take_complete());

    let mut kb = KnowledgeBase::new();
    for (stem, answer) in committed {
        let question = clean_question(&stem);
        if !question.is_empty() {
            kb.insert(question, answer);
        }
    }

    if kb.is_empty() {
        None
    } else {
        Some(kb)
    }
}

/// Strip tags, the number prefix and backticks; collapse whitespace.
fn clean_question(stem: &str) -> String {
    let without_tags = TAG_RE.replace_all(stem, "");
    let without_prefix = NUMBER_PREFIX_RE.replace(&without_tags, "");
    let without_ticks = without_prefix.replace('`', "");
    WHITESPACE_RUN_RE
        .replace_all(&without_ticks, " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> AnswerKey {
        AnswerKey::from_symbols(s).unwrap()
    }

    #[test]
    fn test_multiline_stem_and_tags() {
        let raw = "12）【单选】【难度：易】\n下列哪个\n是质数\nA. 4\nB. 5\n答案：【B】";
        let kb = parse_legacy(raw).unwrap();
        assert_eq!(kb.get("下列哪个 是质数"), Some(&key("B")));
    }

    #[test]
    fn test_lines_after_answer_are_not_appended() {
        let raw = "1) stem\n答案：【A】\nexplanation line\n2) next\n答案：【√】";
        let kb = parse_legacy(raw).unwrap();
        let questions: Vec<&str> = kb.questions().collect();
        assert_eq!(questions, vec!["stem", "next"]);
        assert_eq!(kb.get("next"), Some(&AnswerKey::Judgment(true)));
    }

    #[test]
    fn test_question_without_answer_is_discarded() {
        let raw = "1）no answer\n2）has answer\n答案：【C】";
        let kb = parse_legacy(raw).unwrap();
        assert_eq!(kb.len(), 1);
        assert_eq!(kb.get("has answer"), Some(&key("C")));
    }

    #[test]
    fn test_multi_select_answer_is_canonical() {
        let kb = parse_legacy("3）pick two\n答案：【CA】").unwrap();
        assert_eq!(kb.get("pick two"), Some(&key("AC")));
    }

    #[test]
    fn test_cleaning_backticks_and_whitespace() {
        let raw = "4）  what does   `let x = 1;`\n  mean\n答案：【×】";
        let kb = parse_legacy(raw).unwrap();
        assert_eq!(
            kb.get("what does let x = 1; mean"),
            Some(&AnswerKey::Judgment(false))
        );
    }

    #[test]
    fn test_question_only_tags_is_dropped() {
        assert!(parse_legacy("5）【判断】\n答案：【√】").is_none());
    }

    #[test]
    fn test_lines_before_first_question_are_ignored() {
        let raw = "Chapter one\nIntro text\n1）real stem\n答案：【D】";
        let kb = parse_legacy(raw).unwrap();
        assert_eq!(kb.len(), 1);
        assert!(kb.get("real stem").is_some());
    }

    #[test]
    fn test_no_questions() {
        assert!(parse_legacy("").is_none());
        assert!(parse_legacy("答案：【A】").is_none());
    }
}
