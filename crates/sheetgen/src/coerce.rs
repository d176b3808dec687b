//! Numeric coercion of raw cell text

use std::num::ParseIntError;

/// A raw cell value after coercion
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoercedValue<'a> {
    Integer(i64),
    Float(f64),
    Text(&'a str),
}

/// Coerce raw text to a number where it is plainly one.
///
/// Only ASCII digits become an integer; digits with a single `.` become a
/// float (`".5"` and `"5."` included). Everything else, signs and the empty
/// string included, stays text. The error case is an all-digit value that
/// overflows `i64`; callers keep the text.
pub fn coerce(text: &str) -> Result<CoercedValue<'_>, ParseIntError> {
    if text.is_empty() {
        return Ok(CoercedValue::Text(text));
    }

    if text.bytes().all(|b| b.is_ascii_digit()) {
        return text.parse::<i64>().map(CoercedValue::Integer);
    }

    let mut dots = 0;
    let mut digits = 0;
    for b in text.bytes() {
        match b {
            b'.' => dots += 1,
            b'0'..=b'9' => digits += 1,
            _ => return Ok(CoercedValue::Text(text)),
        }
    }

    if dots == 1 && digits > 0 {
        if let Ok(value) = text.parse::<f64>() {
            return Ok(CoercedValue::Float(value));
        }
    }
    Ok(CoercedValue::Text(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers() {
        assert_eq!(coerce("42"), Ok(CoercedValue::Integer(42)));
        assert_eq!(coerce("007"), Ok(CoercedValue::Integer(7)));
        assert_eq!(coerce("0"), Ok(CoercedValue::Integer(0)));
    }

    #[test]
    fn test_floats() {
        assert_eq!(coerce("3.14"), Ok(CoercedValue::Float(3.14)));
        assert_eq!(coerce(".5"), Ok(CoercedValue::Float(0.5)));
        assert_eq!(coerce("5."), Ok(CoercedValue::Float(5.0)));
    }

    #[test]
    fn test_text_stays_text() {
        for text in ["", "3.14.15", ".", "-5", "+5", "1e3", " 42", "4 2", "12a", "١٢"] {
            assert_eq!(coerce(text), Ok(CoercedValue::Text(text)), "{:?}", text);
        }
    }

    #[test]
    fn test_integer_overflow_is_error() {
        assert!(coerce("99999999999999999999").is_err());
        assert_eq!(
            coerce("9223372036854775807"),
            Ok(CoercedValue::Integer(i64::MAX))
        );
    }
}
