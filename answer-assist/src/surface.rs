//! External collaborators of the detection loop.
//!
//! The assistant never touches a rendering surface directly. It reads the
//! current question through [`QuestionSource`], and hands matches to an
//! [`ActionSink`] that confirms with an operator and applies the answer.
//! [`plan_selection`] maps an answer key onto rendered options for sinks that
//! need to decide which controls to activate.

use crate::error::Result;
use async_trait::async_trait;
use kb_types::AnswerKey;
use serde::{Deserialize, Serialize};

/// Option content marking the "true" choice of a judgment question.
pub const JUDGMENT_TRUE_LABEL: &str = "正确";

/// Option content marking the "false" choice of a judgment question.
pub const JUDGMENT_FALSE_LABEL: &str = "错误";

/// Reads the question currently shown on the observed surface.
pub trait QuestionSource: Send + Sync {
    /// Current question text, or `None` while no question is rendered.
    fn current_question_text(&self) -> Option<String>;
}

impl<F> QuestionSource for F
where
    F: Fn() -> Option<String> + Send + Sync,
{
    fn current_question_text(&self) -> Option<String> {
        self()
    }
}

/// Operator decision on a presented match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Confirm,
    Cancel,
}

/// A match handed to the confirmation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRequest {
    /// Question text as read from the surface.
    pub live_text: String,
    /// Knowledge-base question that matched.
    pub matched_question: String,
    pub answer: AnswerKey,
}

/// Confirmation and answer application.
#[async_trait]
pub trait ActionSink: Send + Sync {
    /// Show the match to the operator and wait for a decision.
    async fn present_match(&self, request: &MatchRequest) -> Result<Decision>;

    /// Apply a confirmed answer to the surface.
    fn apply_answer(&self, answer: &AnswerKey) -> Result<()>;
}

/// A rendered answer option as seen by an action sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedOption {
    /// Full option text, e.g. `"A. 2"` or `"正确"`.
    pub text: String,
    /// Whether the option is already selected.
    pub checked: bool,
}

impl RenderedOption {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            checked: false,
        }
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }
}

/// Indices of the options to activate for `answer`.
///
/// - Judgment: the first unchecked option whose text contains `正确` (true)
///   or `错误` (false).
/// - Selection: for each letter in order, the first unchecked option whose
///   trimmed text starts with that letter.
///
/// An empty result means nothing on the surface can be activated.
pub fn plan_selection(answer: &AnswerKey, options: &[RenderedOption]) -> Vec<usize> {
    match answer {
        AnswerKey::Judgment(value) => {
            let label = if *value {
                JUDGMENT_TRUE_LABEL
            } else {
                JUDGMENT_FALSE_LABEL
            };
            options
                .iter()
                .position(|o| !o.checked && o.text.contains(label))
                .into_iter()
                .collect()
        }
        AnswerKey::Selection(letters) => letters
            .iter()
            .filter_map(|letter| {
                options
                    .iter()
                    .position(|o| !o.checked && o.text.trim_start().starts_with(*letter))
            })
            .collect(),
    }
}
