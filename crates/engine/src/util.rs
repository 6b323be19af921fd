//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Normalize a user-facing name: NFKC, trimmed, inner whitespace collapsed.
pub(crate) fn normalize_name_display(value: &str, label: &str) -> ResultEngine<String> {
    let normalized: String = value.nfkc().collect();
    let collapsed = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(EngineError::InvalidField(format!(
            "{label} must not be empty"
        )));
    }
    Ok(collapsed)
}

/// Case-insensitive lookup key for a display name.
pub(crate) fn normalize_name_key(display: &str) -> String {
    display.to_lowercase()
}

/// Trim an optional text field, mapping whitespace-only input to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Format integer cents as a decimal string with two fraction digits.
pub(crate) fn format_minor(amount_minor: i64) -> String {
    let sign = if amount_minor < 0 { "-" } else { "" };
    let abs = amount_minor.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_normalization_collapses_whitespace() {
        let name = normalize_name_display("  Daily   groceries ", "category").unwrap();
        assert_eq!(name, "Daily groceries");
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(normalize_name_display("   ", "category").is_err());
    }

    #[test]
    fn minor_formatting_keeps_two_digits() {
        assert_eq!(format_minor(123_45), "123.45");
        assert_eq!(format_minor(5), "0.05");
        assert_eq!(format_minor(-70_000), "-700.00");
        assert_eq!(format_minor(0), "0.00");
    }
}
