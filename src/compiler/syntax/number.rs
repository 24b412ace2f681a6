use std::fmt::{self, Display};

use thiserror::Error;

use crate::constants::common::MAX_SAFE_INTEGER;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base {
    Binary,
    Octal,
    Decimal,
    Hexadecimal,
}

impl Base {
    /// Splits a literal into its base and the digits after the prefix.
    #[must_use]
    pub fn detect(literal: &str) -> (Base, &str) {
        if let Some(digits) = literal.strip_prefix('#') {
            (Base::Hexadecimal, digits)
        } else if let Some(digits) = literal.strip_prefix('b') {
            (Base::Binary, digits)
        } else if let Some(digits) = literal.strip_prefix('o') {
            (Base::Octal, digits)
        } else {
            (Base::Decimal, literal)
        }
    }

    #[must_use]
    pub fn radix(self) -> u32 {
        match self {
            Base::Binary => 2,
            Base::Octal => 8,
            Base::Decimal => 10,
            Base::Hexadecimal => 16,
        }
    }
}

impl Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Base::Binary => "binary",
            Base::Octal => "octal",
            Base::Decimal => "decimal",
            Base::Hexadecimal => "hexadecimal",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberError {
    #[error("Expected at least one {0} digit")]
    Empty(Base),
    #[error("A number cannot have more than one decimal point")]
    MultipleDecimalPoints,
    #[error("'{digit}' is not a valid {base} digit")]
    IllegalDigit { digit: char, base: Base },
    #[error("The number exceeds the safe integer range")]
    Unsafe,
}

/// Parses a number token: optional base prefix, then integral digits and
/// an optional fraction, each read in that base.
///
/// # Errors
/// Missing digits, a second decimal point, a digit outside the base, or a
/// value too large to be represented exactly.
pub fn parse_number(literal: &str) -> Result<f64, NumberError> {
    let (base, digits) = Base::detect(literal);
    let mut parts = digits.split('.');
    let integral = parts.next().unwrap_or_default();
    let fractional = parts.next().unwrap_or_default();
    if parts.next().is_some() {
        return Err(NumberError::MultipleDecimalPoints);
    }
    if integral.is_empty() && fractional.is_empty() {
        return Err(NumberError::Empty(base));
    }

    let integral_value = parse_digits(integral, base)?;
    let fractional_value = parse_digits(fractional, base)?;
    let value = if fractional.is_empty() {
        integral_value
    } else {
        let count = i32::try_from(fractional.chars().count()).map_err(|_| NumberError::Unsafe)?;
        integral_value + fractional_value / 10f64.powi(count)
    };

    // overlong fractions overflow both terms, giving NaN
    if !value.is_finite() || value > MAX_SAFE_INTEGER {
        return Err(NumberError::Unsafe);
    }
    Ok(value)
}

fn parse_digits(digits: &str, base: Base) -> Result<f64, NumberError> {
    digits.chars().try_fold(0f64, |value, c| {
        let digit = c.to_digit(base.radix()).ok_or(NumberError::IllegalDigit { digit: c, base })?;
        Ok(value * f64::from(base.radix()) + f64::from(digit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_numbers() {
        assert_eq!(parse_number("7"), Ok(7.0));
        assert_eq!(parse_number("12.5"), Ok(12.5));
        assert_eq!(parse_number("0.25"), Ok(0.25));
    }

    #[test]
    fn prefixed_numbers() {
        assert_eq!(parse_number("#ff"), Ok(255.0));
        assert_eq!(parse_number("b101"), Ok(5.0));
        assert_eq!(parse_number("o17"), Ok(15.0));
    }

    #[test]
    fn fraction_is_scaled_by_its_digit_count() {
        // the fraction is read in the literal's base, then scaled decimally
        assert_eq!(parse_number("b1.1"), Ok(1.1));
    }

    #[test]
    fn malformed_numbers() {
        assert_eq!(
            parse_number("1.2.3"),
            Err(NumberError::MultipleDecimalPoints)
        );
        assert_eq!(
            parse_number("b102"),
            Err(NumberError::IllegalDigit {
                digit: '2',
                base: Base::Binary
            })
        );
        assert_eq!(
            parse_number("12ab"),
            Err(NumberError::IllegalDigit {
                digit: 'a',
                base: Base::Decimal
            })
        );
        assert_eq!(parse_number("#"), Err(NumberError::Empty(Base::Hexadecimal)));
        assert_eq!(parse_number("9007199254740993"), Err(NumberError::Unsafe));
        assert_eq!(parse_number("9007199254740991"), Ok(MAX_SAFE_INTEGER));
    }

    #[test]
    fn overlong_literals_are_unsafe() {
        let fraction = format!("0.{}", "9".repeat(400));
        assert_eq!(parse_number(&fraction), Err(NumberError::Unsafe));
        assert_eq!(parse_number(&"1".repeat(400)), Err(NumberError::Unsafe));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            NumberError::IllegalDigit {
                digit: '9',
                base: Base::Octal
            }
            .to_string(),
            "'9' is not a valid octal digit"
        );
    }
}
