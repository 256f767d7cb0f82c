//! Formatting helpers for values on their way into a record.
//!
//! Ring numbers, scheme codes and species codes are often kept in other
//! systems without the padding EURING requires. These helpers produce the
//! exact text the exchange code expects.

use crate::field_type::{FieldIssue, IssueKind};

/// Width of the identification number field.
pub const IDENTIFICATION_WIDTH: usize = 10;

/// Ring number in upper case with everything but letters and digits removed.
///
/// ```
/// use euring::export::identification_display_format;
///
/// assert_eq!(identification_display_format("ab.12-3"), "AB123");
/// ```
#[must_use]
pub fn identification_display_format(value: &str) -> String {
    value
        .to_uppercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// Ring number as written in a record: display format, dot-padded to ten
/// characters in front of the rightmost digits, or cut to ten characters.
///
/// ```
/// use euring::export::identification_export_format;
///
/// assert_eq!(identification_export_format("AB123"), "AB.....123");
/// ```
#[must_use]
pub fn identification_export_format(value: &str) -> String {
    let text = identification_display_format(value);
    if text.len() > IDENTIFICATION_WIDTH {
        return text[..IDENTIFICATION_WIDTH].to_string();
    }
    pad_identification(&text, IDENTIFICATION_WIDTH)
}

/// Insert padding dots into a ring number so it is `width` characters long.
///
/// Existing dots are dropped first. The dots go immediately before the
/// rightmost run of digits, or in front when there are no digits. Longer
/// values are returned without dots.
#[must_use]
pub fn pad_identification(value: &str, width: usize) -> String {
    let chars: Vec<char> = value.chars().filter(|&c| c != '.').collect();
    if chars.len() >= width {
        return chars.into_iter().collect();
    }
    let dots = width - chars.len();
    let end_of_digits = chars
        .iter()
        .rposition(char::is_ascii_digit)
        .map_or(0, |i| i + 1);
    let insert_at = chars[..end_of_digits]
        .iter()
        .rposition(|c| !c.is_ascii_digit())
        .map_or(0, |i| i + 1);
    let mut padded = String::with_capacity(width);
    padded.extend(&chars[..insert_at]);
    padded.extend(std::iter::repeat('.').take(dots));
    padded.extend(&chars[insert_at..]);
    padded
}

/// Scheme code as written in a record: upper case, at most three characters,
/// right-justified with spaces.
///
/// ```
/// use euring::export::scheme_export_format;
///
/// assert_eq!(scheme_export_format("gb"), " GB");
/// ```
#[must_use]
pub fn scheme_export_format(value: &str) -> String {
    let upper: String = value.to_uppercase().chars().take(3).collect();
    format!("{upper:>3}")
}

/// Species code as written in a record: five digits, zero-padded. An empty
/// value becomes `00000`.
///
/// # Errors
///
/// Returns a [`FieldIssue`] when the value is not a number or has more than
/// five digits.
pub fn species_export_format(value: &str) -> Result<String, FieldIssue> {
    let value = value.trim();
    if value.is_empty() {
        return Ok("00000".to_string());
    }
    if !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldIssue::new(
            IssueKind::Type,
            format!("Invalid EURING species code \"{value}\"."),
        ));
    }
    if value.len() > 5 {
        return Err(FieldIssue::new(
            IssueKind::Length,
            format!("EURING species code \"{value}\" is too long."),
        ));
    }
    Ok(format!("{value:0>5}"))
}
