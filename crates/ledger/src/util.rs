//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the store enforces consistent invariants.

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{LedgerError, ResultLedger};

/// Trim a required text field and reject empties with a labeled error.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultLedger<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidName(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Dedupe key for user-facing names: NFKD with combining marks stripped,
/// lowercased, non-alphanumeric runs collapsed to single spaces.
///
/// Returns `None` when nothing alphanumeric survives.
pub(crate) fn normalize_name_key(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut out = String::new();
    let mut prev_space = false;
    for ch in trimmed.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch.is_alphanumeric() {
            for lower in ch.to_lowercase() {
                out.push(lower);
            }
            prev_space = false;
        } else if !out.is_empty() && !prev_space {
            out.push(' ');
            prev_space = true;
        }
    }
    let normalized = out.trim();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized.to_string())
    }
}

/// Validate a day-of-month used for recurring schedules.
pub(crate) fn validate_recurring_day(day: Option<u32>) -> ResultLedger<()> {
    if let Some(day) = day
        && !(1..=31).contains(&day)
    {
        return Err(LedgerError::InvalidDate(format!(
            "invalid recurring day: {day}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_name_key_folds_case_and_accents() {
        assert_eq!(normalize_name_key("Água"), Some("agua".to_string()));
        assert_eq!(
            normalize_name_key("  Fixed   Income "),
            Some("fixed income".to_string())
        );
        assert_eq!(normalize_name_key("CARTÃO de Crédito"), normalize_name_key("cartao DE credito"));
        assert_eq!(normalize_name_key("  "), None);
        assert_eq!(normalize_name_key("***"), None);
    }

    #[test]
    fn recurring_day_bounds() {
        assert!(validate_recurring_day(None).is_ok());
        assert!(validate_recurring_day(Some(1)).is_ok());
        assert!(validate_recurring_day(Some(31)).is_ok());
        assert!(validate_recurring_day(Some(0)).is_err());
        assert!(validate_recurring_day(Some(32)).is_err());
    }
}
