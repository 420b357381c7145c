//! Shared form field checks
//!
//! Messages match what site visitors see next to the offending input.

use crate::models::FormErrors;

/// Message for a missing required value
pub const REQUIRED_MESSAGE: &str = "Обязательное поле.";

/// Message for a value that is too long
pub fn max_length_message(max: usize, actual: usize) -> String {
    format!(
        "Убедитесь, что это значение содержит не более {} символов (сейчас {}).",
        max, actual
    )
}

/// Record an error when `value` is empty. Returns whether the value is present.
pub fn require(errors: &mut FormErrors, field: &str, value: &str) -> bool {
    if value.is_empty() {
        errors.add(field, REQUIRED_MESSAGE);
        false
    } else {
        true
    }
}

/// Record an error when `value` has more than `max` characters.
pub fn limit_length(errors: &mut FormErrors, field: &str, value: &str, max: usize) -> bool {
    let length = value.chars().count();
    if length > max {
        errors.add(field, max_length_message(max, length));
        false
    } else {
        true
    }
}
