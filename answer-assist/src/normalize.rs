//! Text normalization for question matching
//!
//! Maps question text to a canonical comparison form:
//! - All whitespace removed
//! - ASCII and full-width brackets removed
//! - Full-width comma, enumeration comma and dollar sign removed
//! - Periods and backticks removed
//! - Lowercase conversion
//!
//! The same function is applied to knowledge-base questions and to live
//! question text, so comparisons are symmetric.

/// Characters dropped from the comparison form (whitespace is handled separately).
const STRIPPED_CHARS: &[char] = &[
    '(', ')', '[', ']', '（', '）', '【', '】', '，', '、', '$', '.', '`',
];

/// Normalize question text for containment matching.
///
/// # Examples
///
/// ```
/// use answer_assist::normalize::normalize;
///
/// assert_eq!(normalize("A (1)"), "a1");
/// assert_eq!(normalize("【单选】 `x.y`"), "单选xy");
/// ```
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && !STRIPPED_CHARS.contains(c))
        .collect();
    stripped.to_lowercase()
}
