//! Field value coercion to `f64`

use crate::error::CoercionError;
use crate::metric::FieldValue;

/// Coerce a field value to a float
///
/// - integers and floats convert directly
/// - booleans become `1.0` / `0.0`
/// - strings are parsed as hexadecimal integers when they carry a `0x`
///   prefix, otherwise as decimal floats
///
/// # Errors
///
/// Returns a `CoercionError` when a string is neither a valid hex integer
/// nor a valid float.
pub fn to_float(value: &FieldValue) -> Result<f64, CoercionError> {
    match value {
        FieldValue::Int(i) => Ok(*i as f64),
        FieldValue::Uint(u) => Ok(*u as f64),
        FieldValue::Float(f) => Ok(*f),
        FieldValue::Bool(true) => Ok(1.0),
        FieldValue::Bool(false) => Ok(0.0),
        FieldValue::String(s) if is_hexadecimal(s) => parse_hexadecimal(s),
        FieldValue::String(s) => s.parse::<f64>().map_err(|_| CoercionError::InvalidNumber {
            value: s.clone(),
        }),
    }
}

/// Whether the string has a hex prefix (`0x` / `0X`, optionally signed)
pub fn is_hexadecimal(value: &str) -> bool {
    let unsigned = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value);
    value.len() >= 3 && (unsigned.starts_with("0x") || unsigned.starts_with("0X"))
}

/// Parse a hex integer of any length and widen it to `f64`
///
/// The result is rounded once, to nearest with ties to even, whatever the
/// number of digits.
///
/// # Errors
///
/// Returns `CoercionError::InvalidHex` if there are no digits or a digit is
/// not hexadecimal.
pub fn parse_hexadecimal(value: &str) -> Result<f64, CoercionError> {
    let invalid = || CoercionError::InvalidHex {
        value: value.to_string(),
    };

    let (negative, unsigned) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let digits = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))
        .ok_or_else(invalid)?;
    if digits.is_empty() {
        return Err(invalid());
    }

    let nibbles = digits
        .chars()
        .map(|c| c.to_digit(16).map(|d| d as u8))
        .collect::<Option<Vec<u8>>>()
        .ok_or_else(invalid)?;
    let first = nibbles.iter().position(|&d| d != 0).unwrap_or(nibbles.len());

    let magnitude = widen_nibbles(&nibbles[first..]);
    Ok(if negative { -magnitude } else { magnitude })
}

/// Round big-endian hex digits (no leading zeros) to the nearest `f64`
///
/// Up to 32 digits fit in a `u128` and are cast directly. Longer inputs keep
/// their leading 16 digits (at least 61 significant bits) and fold every
/// later non-zero digit into the lowest bit, so the single cast below can
/// still tell an exact tie from a value just past it.
fn widen_nibbles(nibbles: &[u8]) -> f64 {
    if nibbles.len() <= 32 {
        let n = nibbles
            .iter()
            .fold(0u128, |acc, &d| (acc << 4) | u128::from(d));
        return n as f64;
    }

    let (head, tail) = nibbles.split_at(16);
    let mut top = head.iter().fold(0u64, |acc, &d| (acc << 4) | u64::from(d));
    if tail.iter().any(|&d| d != 0) {
        top |= 1;
    }

    let shift = 4 * tail.len();
    if shift > 1023 {
        return f64::INFINITY;
    }
    // Exact power of two; the product only rounds on overflow to infinity.
    top as f64 * f64::from_bits(((1023 + shift) as u64) << 52)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_types() {
        assert_eq!(to_float(&FieldValue::Int(-7)), Ok(-7.0));
        assert_eq!(to_float(&FieldValue::Uint(42)), Ok(42.0));
        assert_eq!(to_float(&FieldValue::Float(1.25)), Ok(1.25));
    }

    #[test]
    fn test_booleans() {
        assert_eq!(to_float(&FieldValue::Bool(true)), Ok(1.0));
        assert_eq!(to_float(&FieldValue::Bool(false)), Ok(0.0));
    }

    #[test]
    fn test_decimal_strings() {
        assert_eq!(to_float(&FieldValue::from("3.5")), Ok(3.5));
        assert_eq!(to_float(&FieldValue::from("-1e3")), Ok(-1000.0));
    }

    #[test]
    fn test_hex_strings() {
        assert_eq!(to_float(&FieldValue::from("0xFF")), Ok(255.0));
        assert_eq!(to_float(&FieldValue::from("0Xff")), Ok(255.0));
        assert_eq!(to_float(&FieldValue::from("-0x10")), Ok(-16.0));
        assert_eq!(to_float(&FieldValue::from("+0x1")), Ok(1.0));
    }

    #[test]
    fn test_hex_wider_than_u128() {
        // 2^132
        let value = format!("0x1{}", "0".repeat(33));
        assert_eq!(to_float(&FieldValue::from(value)), Ok(2f64.powi(132)));
    }

    #[test]
    fn test_hex_wide_value_rounds_once() {
        // 2^132 + 2^79 + 1: just above the halfway point between two floats
        let above = format!("0x1{}8{}1", "0".repeat(13), "0".repeat(18));
        assert_eq!(
            parse_hexadecimal(&above),
            Ok(2f64.powi(132) + 2f64.powi(80))
        );

        // 2^132 + 2^79: exactly halfway, ties to even
        let tie = format!("0x1{}8{}", "0".repeat(13), "0".repeat(19));
        assert_eq!(parse_hexadecimal(&tie), Ok(2f64.powi(132)));

        // 2^132 + 2^80 - 1: just below the upper neighbour
        let below = format!("0x1{}{}", "0".repeat(13), "f".repeat(20));
        assert_eq!(
            parse_hexadecimal(&below),
            Ok(2f64.powi(132) + 2f64.powi(80))
        );
    }

    #[test]
    fn test_hex_leading_zeros_and_overflow() {
        let padded = format!("0x{}ff", "0".repeat(40));
        assert_eq!(parse_hexadecimal(&padded), Ok(255.0));
        assert_eq!(parse_hexadecimal("0x0"), Ok(0.0));

        let huge = format!("-0x1{}", "0".repeat(300));
        assert_eq!(parse_hexadecimal(&huge), Ok(f64::NEG_INFINITY));
    }

    #[test]
    fn test_is_hexadecimal() {
        assert!(is_hexadecimal("0x1"));
        assert!(is_hexadecimal("-0x"));
        assert!(!is_hexadecimal("0x"));
        assert!(!is_hexadecimal("12"));
        assert!(!is_hexadecimal("x12"));
    }

    #[test]
    fn test_invalid_strings() {
        assert_eq!(
            to_float(&FieldValue::from("warm")),
            Err(CoercionError::InvalidNumber {
                value: "warm".to_string()
            })
        );
        assert_eq!(
            to_float(&FieldValue::from("0xZZ")),
            Err(CoercionError::InvalidHex {
                value: "0xZZ".to_string()
            })
        );
        assert!(to_float(&FieldValue::from("-0x")).is_err());
        assert!(to_float(&FieldValue::from("")).is_err());
    }
}
