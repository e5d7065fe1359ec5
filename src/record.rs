//! Tokenizing one `<key>;<value>` line.

use memchr::memchr;
use thiserror::Error;

pub const DELIMITER: u8 = b';';

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record<'a> {
    pub key: &'a [u8],
    pub value: f64,
}

/// Why a line did not produce a record. These are never fatal; the line is
/// counted and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Malformed {
    #[error("empty line")]
    Empty,
    #[error("missing `;` delimiter")]
    MissingDelimiter,
    #[error("empty key")]
    EmptyKey,
    #[error("value is not a number")]
    InvalidValue,
    #[error("value is not finite")]
    NonFinite,
}

/// Splits `line` on its first delimiter and parses the value.
///
/// `line` must not include its `\n`. A single trailing `\r` is ignored.
pub fn parse(line: &[u8]) -> Result<Record<'_>, Malformed> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    if line.is_empty() {
        return Err(Malformed::Empty);
    }
    let split = memchr(DELIMITER, line).ok_or(Malformed::MissingDelimiter)?;
    let (key, value) = (&line[..split], &line[split + 1..]);
    if key.is_empty() {
        return Err(Malformed::EmptyKey);
    }
    let value: f64 = lexical_core::parse(value).map_err(|_| Malformed::InvalidValue)?;
    if !value.is_finite() {
        return Err(Malformed::NonFinite);
    }
    Ok(Record { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_and_value() {
        let record = parse(b"Paris;10.0").unwrap();
        assert_eq!(record.key, b"Paris");
        assert_eq!(record.value, 10.0);
    }

    #[test]
    fn parses_negative_and_integral_values() {
        assert_eq!(parse(b"Oslo;-3.2").unwrap().value, -3.2);
        assert_eq!(parse(b"Oslo;7").unwrap().value, 7.0);
    }

    #[test]
    fn keeps_spaces_in_key() {
        assert_eq!(parse(b"New York;1.5").unwrap().key, b"New York");
    }

    #[test]
    fn strips_carriage_return() {
        let record = parse(b"Lima;15.5\r").unwrap();
        assert_eq!(record.value, 15.5);
    }

    #[test]
    fn long_keys_are_not_truncated() {
        let key = "K".repeat(300);
        let line = format!("{key};1.0");
        assert_eq!(parse(line.as_bytes()).unwrap().key, key.as_bytes());
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!(parse(b""), Err(Malformed::Empty));
        assert_eq!(parse(b"garbage"), Err(Malformed::MissingDelimiter));
        assert_eq!(parse(b";1.0"), Err(Malformed::EmptyKey));
        assert_eq!(parse(b"Paris;"), Err(Malformed::InvalidValue));
        assert_eq!(parse(b"Paris;abc"), Err(Malformed::InvalidValue));
        assert_eq!(parse(b"Paris;1;2"), Err(Malformed::InvalidValue));
    }

    #[test]
    fn rejects_non_finite_values() {
        for text in [&b"X;inf"[..], b"X;-inf", b"X;NaN", b"X;1e400"] {
            assert!(parse(text).is_err(), "{:?}", String::from_utf8_lossy(text));
        }
    }
}
