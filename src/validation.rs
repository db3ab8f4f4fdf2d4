//! Shared validation primitives for financial records.
//!
//! Each entity module builds its `New*` type by calling these checks in a
//! fixed declared order, so the same bad input always produces the same
//! first-error message. The message is surfaced to the user verbatim via
//! [Error::Validation] and no write is attempted.

use crate::Error;

/// The upper ceiling applied to every currency amount.
///
/// Guards against overflow and display issues for arbitrarily large inputs.
pub const MAX_CURRENCY_AMOUNT: f64 = 999_999_999.99;

/// Trim `value` and require a non-empty result of at most `max_chars`
/// characters.
pub fn required_text(value: &str, field: &str, max_chars: usize) -> Result<String, Error> {
    let value = value.trim();

    if value.is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
    }

    if value.chars().count() > max_chars {
        return Err(Error::Validation(format!(
            "{field} must be less than {max_chars} characters"
        )));
    }

    Ok(value.to_owned())
}

/// Trim `value` and bound its length, mapping an empty result to `None`.
pub fn optional_text(
    value: Option<&str>,
    field: &str,
    max_chars: usize,
) -> Result<Option<String>, Error> {
    let Some(value) = value else {
        return Ok(None);
    };

    let value = value.trim();

    if value.is_empty() {
        return Ok(None);
    }

    if value.chars().count() > max_chars {
        return Err(Error::Validation(format!(
            "{field} must be less than {max_chars} characters"
        )));
    }

    Ok(Some(value.to_owned()))
}

/// Require a strictly positive currency amount below [MAX_CURRENCY_AMOUNT].
///
/// An amount of exactly zero is rejected.
pub fn positive_amount(value: f64, field: &str) -> Result<f64, Error> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::Validation(format!("{field} must be positive")));
    }

    if value > MAX_CURRENCY_AMOUNT {
        return Err(Error::Validation("Amount is too large".to_owned()));
    }

    Ok(value)
}

/// Require a currency amount of at least zero and below [MAX_CURRENCY_AMOUNT].
///
/// An amount of exactly zero is accepted.
pub fn non_negative_amount(value: f64, field: &str) -> Result<f64, Error> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::Validation(format!("{field} cannot be negative")));
    }

    if value > MAX_CURRENCY_AMOUNT {
        return Err(Error::Validation("Amount is too large".to_owned()));
    }

    Ok(value)
}

/// Require a finite percentage in the inclusive range 0..=100.
pub fn percentage(value: f64, field: &str) -> Result<f64, Error> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(Error::Validation(format!(
            "{field} must be between 0 and 100"
        )));
    }

    Ok(value)
}

/// Require a string of the form `#RRGGBB`.
pub fn hex_color(value: &str) -> Result<String, Error> {
    let value = value.trim();
    let mut chars = value.chars();

    let is_valid = chars.next() == Some('#')
        && value.chars().count() == 7
        && chars.all(|c| c.is_ascii_hexdigit());

    if is_valid {
        Ok(value.to_owned())
    } else {
        Err(Error::Validation("Please select a valid color".to_owned()))
    }
}

/// Require an integer in the inclusive range `min..=max`.
pub fn int_in_range(value: i64, field: &str, min: i64, max: i64) -> Result<i64, Error> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(Error::Validation(format!(
            "{field} must be between {min} and {max}"
        )))
    }
}

#[cfg(test)]
mod validation_tests {
    use crate::Error;

    use super::{
        MAX_CURRENCY_AMOUNT, hex_color, int_in_range, non_negative_amount, optional_text,
        percentage, positive_amount, required_text,
    };

    #[test]
    fn required_text_trims_whitespace() {
        let result = required_text("  Groceries \n", "Name", 50);

        assert_eq!(result, Ok("Groceries".to_owned()));
    }

    #[test]
    fn required_text_rejects_empty_string() {
        let result = required_text(" \t ", "Name", 50);

        assert_eq!(result, Err(Error::Validation("Name is required".to_owned())));
    }

    #[test]
    fn required_text_rejects_overlong_string() {
        let result = required_text(&"a".repeat(51), "Name", 50);

        assert_eq!(
            result,
            Err(Error::Validation(
                "Name must be less than 50 characters".to_owned()
            ))
        );
    }

    #[test]
    fn optional_text_maps_empty_to_none() {
        assert_eq!(optional_text(Some("  "), "Notes", 1000), Ok(None));
        assert_eq!(optional_text(None, "Notes", 1000), Ok(None));
    }

    #[test]
    fn positive_amount_rejects_zero() {
        let result = positive_amount(0.0, "Amount");

        assert_eq!(
            result,
            Err(Error::Validation("Amount must be positive".to_owned()))
        );
    }

    #[test]
    fn positive_amount_rejects_negative() {
        assert!(positive_amount(-0.01, "Amount").is_err());
    }

    #[test]
    fn positive_amount_accepts_fractional_cents() {
        assert_eq!(positive_amount(0.01, "Amount"), Ok(0.01));
    }

    #[test]
    fn positive_amount_rejects_amount_over_ceiling() {
        let result = positive_amount(MAX_CURRENCY_AMOUNT + 0.01, "Amount");

        assert_eq!(
            result,
            Err(Error::Validation("Amount is too large".to_owned()))
        );
    }

    #[test]
    fn non_negative_amount_accepts_zero() {
        assert_eq!(non_negative_amount(0.0, "Current amount"), Ok(0.0));
    }

    #[test]
    fn non_negative_amount_rejects_negative() {
        let result = non_negative_amount(-1.0, "Current amount");

        assert_eq!(
            result,
            Err(Error::Validation(
                "Current amount cannot be negative".to_owned()
            ))
        );
    }

    #[test]
    fn percentage_bounds_are_inclusive() {
        assert_eq!(percentage(0.0, "Interest rate"), Ok(0.0));
        assert_eq!(percentage(100.0, "Interest rate"), Ok(100.0));
        assert_eq!(
            percentage(100.5, "Interest rate"),
            Err(Error::Validation(
                "Interest rate must be between 0 and 100".to_owned()
            ))
        );
        assert!(percentage(-0.5, "Interest rate").is_err());
    }

    #[test]
    fn hex_color_accepts_six_hex_digits() {
        assert_eq!(hex_color("#10b981"), Ok("#10b981".to_owned()));
        assert_eq!(hex_color("#FFFFFF"), Ok("#FFFFFF".to_owned()));
    }

    #[test]
    fn hex_color_rejects_malformed_strings() {
        for input in ["10b981", "#10b98", "#10b9811", "#10b98g", ""] {
            assert!(hex_color(input).is_err(), "expected {input:?} to be rejected");
        }
    }

    #[test]
    fn int_in_range_bounds_are_inclusive() {
        assert_eq!(int_in_range(1, "Month", 1, 12), Ok(1));
        assert_eq!(int_in_range(12, "Month", 1, 12), Ok(12));
        assert!(int_in_range(0, "Month", 1, 12).is_err());
        assert!(int_in_range(13, "Month", 1, 12).is_err());
    }
}
