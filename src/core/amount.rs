//! Money input handling for decimal(15,2) columns.
//!
//! Amount fields accept digits and a single decimal point. While typing, input
//! is clamped to 13 integer digits and 2 fractional digits ([`sanitize_amount`]);
//! on submit the text is parsed strictly ([`parse_amount`]). Every amount in the
//! crate is a [`Decimal`], never a float.

use crate::errors::{Error, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Integer digits allowed by the backend column
pub const MAX_INTEGER_DIGITS: usize = 13;

/// Fractional digits allowed by the backend column
pub const MAX_FRACTION_DIGITS: usize = 2;

/// Clamps raw keystroke input to the decimal(15,2) shape.
///
/// Drops every character that is not a digit, keeps only the first decimal
/// point, and truncates (never rounds) the integer and fractional parts.
/// Applying it twice gives the same result as applying it once.
#[must_use]
pub fn sanitize_amount(input: &str) -> String {
    let mut integer = String::new();
    let mut fraction = String::new();
    let mut seen_point = false;

    for c in input.chars() {
        match c {
            '0'..='9' if seen_point => {
                if fraction.len() < MAX_FRACTION_DIGITS {
                    fraction.push(c);
                }
            }
            '0'..='9' => {
                if integer.len() < MAX_INTEGER_DIGITS {
                    integer.push(c);
                }
            }
            '.' => seen_point = true,
            _ => {}
        }
    }

    if seen_point {
        format!("{integer}.{fraction}")
    } else {
        integer
    }
}

/// Parses a submitted amount. The text must already be in decimal(15,2) shape.
///
/// # Errors
/// Returns [`Error::InvalidAmount`] for empty input, stray characters, or
/// too many digits on either side of the point.
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let trimmed = input.trim();
    let invalid = || Error::InvalidAmount {
        input: input.to_string(),
    };

    let (integer, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));
    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if !all_digits(integer)
        || !all_digits(fraction)
        || integer.len() > MAX_INTEGER_DIGITS
        || fraction.len() > MAX_FRACTION_DIGITS
        || (integer.is_empty() && fraction.is_empty())
    {
        return Err(invalid());
    }

    let normalized = format!(
        "{}.{}",
        if integer.is_empty() { "0" } else { integer },
        if fraction.is_empty() { "0" } else { fraction }
    );
    Decimal::from_str(&normalized).map_err(|_| invalid())
}

/// Renders an amount with exactly two decimals, truncating extra precision.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let mut value = amount.round_dp_with_strategy(
        u32::try_from(MAX_FRACTION_DIGITS).unwrap_or(2),
        RoundingStrategy::ToZero,
    );
    value.rescale(2);
    value.to_string()
}

/// Display symbol for an ISO currency code.
#[must_use]
pub fn currency_symbol(code: &str) -> String {
    match code.trim().to_ascii_uppercase().as_str() {
        "" | "USD" => "$".to_string(),
        "INR" => "₹".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "JPY" => "¥".to_string(),
        other => format!("{other} "),
    }
}

/// Formats an amount for messages, e.g. `$10,000.00`.
#[must_use]
pub fn format_currency(amount: Decimal, currency_code: &str) -> String {
    let plain = format_amount(amount.abs());
    let (integer, fraction) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{}{grouped}.{fraction}", currency_symbol(currency_code))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sanitize_amount_clamps_fraction() {
        assert_eq!(sanitize_amount("1000.005"), "1000.00");
        assert_eq!(sanitize_amount("12.3456"), "12.34");
    }

    #[test]
    fn test_sanitize_amount_clamps_integer_digits() {
        assert_eq!(sanitize_amount("123456789012345"), "1234567890123");
        assert_eq!(sanitize_amount("123456789012345.67"), "1234567890123.67");
    }

    #[test]
    fn test_sanitize_amount_strips_noise() {
        assert_eq!(sanitize_amount("$1,250.5"), "1250.5");
        assert_eq!(sanitize_amount("1.2.3"), "1.23");
        assert_eq!(sanitize_amount("-40"), "40");
        assert_eq!(sanitize_amount("abc"), "");
        assert_eq!(sanitize_amount("7."), "7.");
    }

    #[test]
    fn test_sanitize_amount_is_idempotent() {
        let inputs = [
            "1000.005",
            "..1",
            "99999999999999999.999",
            "1e5",
            " 12 . 3 4 5 ",
            "0000.10",
            "",
            ".",
            "12,345,678.901",
        ];
        for input in inputs {
            let once = sanitize_amount(input);
            assert_eq!(sanitize_amount(&once), once, "input {input:?}");
            assert!(once.split('.').next().unwrap().len() <= MAX_INTEGER_DIGITS);
            assert!(once.split('.').nth(1).map_or(0, str::len) <= MAX_FRACTION_DIGITS);
        }
    }

    proptest! {
        #[test]
        fn prop_sanitize_amount_is_idempotent_and_bounded(input in any::<String>()) {
            let once = sanitize_amount(&input);
            prop_assert_eq!(&sanitize_amount(&once), &once);
            let (integer, fraction) = once.split_once('.').unwrap_or((once.as_str(), ""));
            prop_assert!(integer.len() <= MAX_INTEGER_DIGITS);
            prop_assert!(fraction.len() <= MAX_FRACTION_DIGITS);
            prop_assert!(once.chars().all(|c| c.is_ascii_digit() || c == '.'));
        }

        #[test]
        fn prop_sanitized_amount_with_digits_parses(input in "[0-9.,$ -]{1,40}") {
            let once = sanitize_amount(&input);
            if once.chars().any(|c| c.is_ascii_digit()) {
                prop_assert!(parse_amount(&once).is_ok(), "{:?} -> {:?}", input, once);
            }
        }
    }

    #[test]
    fn test_parse_amount_accepts_valid_shapes() {
        assert_eq!(parse_amount("1000.00").unwrap(), Decimal::new(100_000, 2));
        assert_eq!(parse_amount("15000").unwrap(), Decimal::new(15000, 0));
        assert_eq!(parse_amount(".5").unwrap(), Decimal::new(5, 1));
        assert_eq!(parse_amount("7.").unwrap(), Decimal::new(7, 0));
        assert_eq!(
            parse_amount("9999999999999.99").unwrap(),
            Decimal::from_str("9999999999999.99").unwrap()
        );
    }

    #[test]
    fn test_parse_amount_rejects_bad_shapes() {
        for input in ["", ".", "1.234", "12a", "-5", "12345678901234", "1.2.3"] {
            assert!(
                matches!(parse_amount(input), Err(Error::InvalidAmount { .. })),
                "input {input:?}"
            );
        }
    }

    #[test]
    fn test_format_amount_two_decimals() {
        assert_eq!(format_amount(Decimal::new(1000, 0)), "1000.00");
        assert_eq!(format_amount(Decimal::new(12345, 3)), "12.34");
        assert_eq!(format_amount(Decimal::new(-25, 1)), "-2.50");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(Decimal::new(10000, 0), "USD"), "$10,000.00");
        assert_eq!(format_currency(Decimal::new(999, 0), "INR"), "₹999.00");
        assert_eq!(
            format_currency(Decimal::new(1_234_567_891, 2), "EUR"),
            "€12,345,678.91"
        );
        assert_eq!(format_currency(Decimal::new(-50, 0), "GBP"), "-£50.00");
        assert_eq!(format_currency(Decimal::new(5, 0), "CHF"), "CHF 5.00");
    }
}
