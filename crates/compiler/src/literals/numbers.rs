// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

use num_bigint::BigInt;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Numeric literal values, sized the way the literal's suffix (or magnitude) asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Integer(i32),
    Long(i64),
    BigInteger(BigInt),
    Float(f32),
    Double(f64),
    /// Arbitrary precision decimal, kept as its normalized text.
    BigDecimal(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumberError {
    #[error("invalid numeric literal: {0}")]
    Malformed(String),
    #[error("numeric literal out of range: {0}")]
    OutOfRange(String),
}

impl Number {
    /// Flip the sign, moving to a wider type when the negation does not fit.
    pub fn negate(&self) -> Number {
        match self {
            Number::Integer(v) => v
                .checked_neg()
                .map_or_else(|| Number::Long(-i64::from(*v)), Number::Integer),
            Number::Long(v) => v
                .checked_neg()
                .map_or_else(|| Number::BigInteger(-BigInt::from(*v)), Number::Long),
            Number::BigInteger(v) => Number::BigInteger(-v),
            Number::Float(v) => Number::Float(-v),
            Number::Double(v) => Number::Double(-v),
            Number::BigDecimal(text) => match text.strip_prefix('-') {
                Some(positive) => Number::BigDecimal(positive.to_string()),
                None => Number::BigDecimal(format!("-{text}")),
            },
        }
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Number::Integer(v) => write!(f, "{v}"),
            Number::Long(v) => write!(f, "{v}"),
            Number::BigInteger(v) => write!(f, "{v}"),
            Number::Float(v) => write!(f, "{v:?}"),
            Number::Double(v) => write!(f, "{v:?}"),
            Number::BigDecimal(v) => write!(f, "{v}"),
        }
    }
}

/// Parse an integer literal: underscores, `0x`/`0b`/leading-zero octal radixes, and the
/// `i`, `l` and `g` suffixes. Unsuffixed values take the narrowest type that holds them.
pub fn parse_integer(text: &str) -> Result<Number, NumberError> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let (negative, body) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };

    let (body, suffix) = match body.chars().last() {
        Some(c @ ('i' | 'I' | 'l' | 'L' | 'g' | 'G')) => {
            (&body[..body.len() - 1], Some(c.to_ascii_lowercase()))
        }
        _ => (body, None),
    };

    let (radix, digits) = if is_hex(body) {
        (16, &body[2..])
    } else if let Some(d) = body.strip_prefix("0b").or_else(|| body.strip_prefix("0B")) {
        (2, d)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, &body[1..])
    } else {
        (10, body)
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(NumberError::Malformed(text.to_string()));
    }
    let magnitude = BigInt::parse_bytes(digits.as_bytes(), radix)
        .ok_or_else(|| NumberError::Malformed(text.to_string()))?;
    let value = if negative { -magnitude } else { magnitude };

    let out_of_range = || NumberError::OutOfRange(text.to_string());
    match suffix {
        Some('i') => i32::try_from(&value).map(Number::Integer).map_err(|_| out_of_range()),
        Some('l') => i64::try_from(&value).map(Number::Long).map_err(|_| out_of_range()),
        Some('g') => Ok(Number::BigInteger(value)),
        _ => {
            if let Ok(v) = i32::try_from(&value) {
                Ok(Number::Integer(v))
            } else if let Ok(v) = i64::try_from(&value) {
                Ok(Number::Long(v))
            } else {
                Ok(Number::BigInteger(value))
            }
        }
    }
}

fn is_hex(body: &str) -> bool {
    body.starts_with("0x") || body.starts_with("0X")
}

/// Parse a floating point literal. `f` gives a float, `d` a double; `g` or no suffix keeps
/// the exact decimal.
pub fn parse_decimal(text: &str) -> Result<Number, NumberError> {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    let malformed = || NumberError::Malformed(text.to_string());

    let (body, suffix) = match cleaned.chars().last() {
        Some(c @ ('f' | 'F' | 'd' | 'D' | 'g' | 'G')) => {
            (&cleaned[..cleaned.len() - 1], Some(c.to_ascii_lowercase()))
        }
        _ => (cleaned.as_str(), None),
    };

    let parsed: f64 = body.parse().map_err(|_| malformed())?;
    match suffix {
        Some('f') => Ok(Number::Float(body.parse().map_err(|_| malformed())?)),
        Some('d') => Ok(Number::Double(parsed)),
        _ => Ok(Number::BigDecimal(normalize_decimal(body))),
    }
}

fn normalize_decimal(body: &str) -> String {
    let body = body.strip_prefix('+').unwrap_or(body);
    match body.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => {
            let exponent = exponent.strip_prefix('+').unwrap_or(exponent);
            format!("{mantissa}E{exponent}")
        }
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("42", Number::Integer(42))]
    #[test_case("1_000", Number::Integer(1000))]
    #[test_case("0x1F", Number::Integer(31))]
    #[test_case("0b101", Number::Integer(5))]
    #[test_case("017", Number::Integer(15))]
    #[test_case("0", Number::Integer(0))]
    #[test_case("42L", Number::Long(42))]
    #[test_case("42i", Number::Integer(42))]
    #[test_case("42G", Number::BigInteger(BigInt::from(42)))]
    #[test_case("2147483648", Number::Long(2147483648))]
    #[test_case("9223372036854775808", Number::BigInteger(BigInt::from(9223372036854775808u64)))]
    #[test_case("-2147483648", Number::Integer(i32::MIN))]
    #[test_case("-9223372036854775808", Number::Long(i64::MIN))]
    #[test_case("-5", Number::Integer(-5))]
    #[test_case("0xFFl", Number::Long(255))]
    fn test_parse_integer(text: &str, expected: Number) {
        assert_eq!(parse_integer(text).unwrap(), expected);
    }

    #[test]
    fn test_big_integer_beyond_128_bits() {
        let text = "340282366920938463463374607431768211456";
        let Number::BigInteger(value) = parse_integer(&format!("{text}G")).unwrap() else {
            panic!("expected a big integer");
        };
        assert_eq!(value.to_string(), text);
        assert_eq!(
            parse_integer("-1234567890123456789012345678901234567890").unwrap().to_string(),
            "-1234567890123456789012345678901234567890"
        );
        assert_eq!(
            parse_integer("0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF").unwrap().to_string(),
            "87112285931760246646623899502532662132735"
        );
    }

    #[test]
    fn test_hex_digits_are_not_suffixes() {
        // Hex digits that look like decimal suffixes are digits.
        assert_eq!(parse_integer("0xAB").unwrap(), Number::Integer(0xAB));
    }

    #[test]
    fn test_integer_errors() {
        assert!(matches!(parse_integer("0x"), Err(NumberError::Malformed(_))));
        assert!(matches!(parse_integer("99999999999i"), Err(NumberError::OutOfRange(_))));
        assert!(matches!(parse_integer("12z"), Err(NumberError::Malformed(_))));
    }

    #[test_case("1.5", Number::BigDecimal("1.5".into()))]
    #[test_case("1.50", Number::BigDecimal("1.50".into()))]
    #[test_case("1_000.25", Number::BigDecimal("1000.25".into()))]
    #[test_case("1e3", Number::BigDecimal("1E3".into()))]
    #[test_case("1.5f", Number::Float(1.5))]
    #[test_case("2.25d", Number::Double(2.25))]
    #[test_case("3.0g", Number::BigDecimal("3.0".into()))]
    fn test_parse_decimal(text: &str, expected: Number) {
        assert_eq!(parse_decimal(text).unwrap(), expected);
    }

    #[test]
    fn test_negate() {
        assert_eq!(Number::Integer(3).negate(), Number::Integer(-3));
        assert_eq!(Number::Integer(i32::MIN).negate(), Number::Long(2147483648));
        assert_eq!(
            Number::Long(i64::MIN).negate(),
            Number::BigInteger(-BigInt::from(i64::MIN))
        );
        assert_eq!(Number::BigDecimal("1.5".into()).negate(), Number::BigDecimal("-1.5".into()));
        assert_eq!(Number::BigDecimal("-1.5".into()).negate(), Number::BigDecimal("1.5".into()));
        assert_eq!(Number::Double(2.0).negate(), Number::Double(-2.0));
    }
}
