//! Structured (markdown-like) question-bank grammar.
//!
//! ```text
//! ### 3. Which of these are primes?
//! **答案：** A、C
//! A. 2
//! B. 4
//! C. 5
//! ---
//! ```
//!
//! Blocks are separated by `---`. A block needs a numbered `###` heading and a
//! resolvable answer; option lines are appended to the question text so that
//! rendered questions (which show their options) match by containment.

use super::{find_bracketed_answer, LETTER_CLASS};
use kb_types::{AnswerKey, KnowledgeBase, JUDGMENT_FALSE, JUDGMENT_TRUE};
use regex::Regex;
use std::sync::LazyLock;

const BLOCK_SEPARATOR: &str = "---";

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*###[ \t]+(\d+)\.[ \t]+(.*)$").unwrap());

/// `**答案：** A、C`. Captures the first non-blank text after the label, which
/// may sit on the following line.
static EMPHASIZED_ANSWER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*答案[：:]\*\*\s*([^\n]*)").unwrap());

static ANSWER_SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s、，,·]+").unwrap());

static OPTION_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^([{}])\.\s+(.*)$", LETTER_CLASS)).unwrap());

/// Parse the structured grammar. Returns `None` when no block yields an entry.
pub fn parse_structured(raw: &str) -> Option<KnowledgeBase> {
    let mut kb = KnowledgeBase::new();

    for block in raw
        .split(BLOCK_SEPARATOR)
        .map(str::trim)
        .filter(|b| !b.is_empty())
    {
        if let Some((question, answer)) = parse_block(block) {
            kb.insert(question, answer);
        }
    }

    if kb.is_empty() {
        None
    } else {
        Some(kb)
    }
}

/// One block → `(question with options, answer)`, or `None` when the block
/// has no heading or no resolvable answer.
fn parse_block(block: &str) -> Option<(String, AnswerKey)> {
    let heading = HEADING_RE.captures(block)?;
    let stem = heading.get(2)?.as_str().trim();

    let answer = block_answer(block)?;

    let options: Vec<&str> = block
        .lines()
        .map(str::trim)
        .filter_map(|line| OPTION_LINE_RE.captures(line))
        .filter_map(|caps| caps.get(2))
        .map(|m| m.as_str().trim())
        .collect();

    let question = if options.is_empty() {
        stem.to_string()
    } else {
        format!("{} {}", stem, options.join(" "))
    };

    let question = question.trim();
    if question.is_empty() {
        return None;
    }

    Some((question.to_string(), answer))
}

/// Emphasized answer label first, bracketed answer as a fallback.
fn block_answer(block: &str) -> Option<AnswerKey> {
    let emphasized = EMPHASIZED_ANSWER_RE
        .captures(block)
        .and_then(|caps| caps.get(1))
        .and_then(|m| leading_symbols(m.as_str()))
        .and_then(|symbols| AnswerKey::from_symbols(&symbols).ok());

    emphasized.or_else(|| {
        find_bracketed_answer(block).and_then(|symbols| AnswerKey::from_symbols(symbols).ok())
    })
}

fn is_answer_symbol(c: char) -> bool {
    matches!(c, 'A'..='D' | JUDGMENT_TRUE | JUDGMENT_FALSE)
}

/// Answer symbols at the start of `text`, separators removed.
///
/// Groups are separated by `、` `，` `,` `·` or blanks. A group counts only
/// when it stands alone: followed by the end of the text, a separator, or a
/// character that is neither an ASCII letter, a digit nor `.`. Scanning stops
/// at the first group that runs into other text, so `A Correct choice` yields
/// `A` and an option line such as `A. 3` yields nothing.
fn leading_symbols(text: &str) -> Option<String> {
    let mut symbols = String::new();

    for group in ANSWER_SEPARATOR_RE.split(text.trim()) {
        let run_end = group
            .char_indices()
            .find(|(_, c)| !is_answer_symbol(*c))
            .map_or(group.len(), |(i, _)| i);
        let (run, rest) = group.split_at(run_end);

        let standalone = rest
            .chars()
            .next()
            .map_or(true, |c| !(c.is_ascii_alphanumeric() || c == '.'));
        if run.is_empty() || !standalone {
            break;
        }

        symbols.push_str(run);
        if !rest.is_empty() {
            break;
        }
    }

    (!symbols.is_empty()).then_some(symbols)
}
