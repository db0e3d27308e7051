//! Permissive scalar conversions used by the value coercer.
//!
//! Scalars convert into each other freely: unparsable text becomes the zero
//! value rather than an error. Only composite values (sequences, mappings)
//! are rejected when a scalar is expected.

use crate::error::BindError;
use crate::value::Value;

const TRUTHY: &[&str] = &["1", "t", "true", "y", "yes", "on"];

/// Render a value as text.
///
/// Null is the empty string. Empty sequences and mappings are also empty;
/// non-empty ones render as compact JSON.
pub fn to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Int(i) => i.to_string(),
        Value::Uint(u) => u.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => s.clone(),
        Value::List(items) if items.is_empty() => String::new(),
        Value::Map(map) if map.is_empty() => String::new(),
        Value::List(_) | Value::Map(_) => value.to_json().to_string(),
    }
}

/// Truthiness of a string: case-insensitive `1`, `t`, `true`, `y`, `yes`, `on`.
/// Anything else, including garbage, is false.
pub fn parse_bool_flag(s: &str) -> bool {
    let s = s.trim();
    TRUTHY.iter().any(|t| s.eq_ignore_ascii_case(t))
}

pub fn to_bool(value: &Value) -> Result<bool, BindError> {
    Ok(match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Uint(u) => *u != 0,
        Value::Float(f) => *f != 0.0,
        Value::String(s) => parse_bool_flag(s),
        other => return Err(mismatch("bool", other)),
    })
}

pub fn to_i64(value: &Value) -> Result<i64, BindError> {
    Ok(match value {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Int(i) => *i,
        Value::Uint(u) => i64::try_from(*u).unwrap_or(0),
        Value::Float(f) => *f as i64,
        Value::String(s) => parse_int(s).and_then(|i| i64::try_from(i).ok()).unwrap_or(0),
        other => return Err(mismatch("integer", other)),
    })
}

pub fn to_u64(value: &Value) -> Result<u64, BindError> {
    Ok(match value {
        Value::Null => 0,
        Value::Bool(b) => u64::from(*b),
        Value::Int(i) => u64::try_from(*i).unwrap_or(0),
        Value::Uint(u) => *u,
        Value::Float(f) if *f > 0.0 => *f as u64,
        Value::Float(_) => 0,
        Value::String(s) => parse_int(s).and_then(|i| u64::try_from(i).ok()).unwrap_or(0),
        other => return Err(mismatch("unsigned integer", other)),
    })
}

pub fn to_f64(value: &Value) -> Result<f64, BindError> {
    Ok(match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Int(i) => *i as f64,
        Value::Uint(u) => *u as f64,
        Value::Float(f) => *f,
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        other => return Err(mismatch("float", other)),
    })
}

fn mismatch(expected: &'static str, actual: &Value) -> BindError {
    BindError::TypeMismatch {
        expected,
        actual: actual.kind(),
    }
}

/// Parse an integer literal: optional sign, `0x`/`0o`/`0b` prefix, `_`
/// separators, and a trailing all-zero fraction (`"56.00"`).
///
/// A leading `0` followed by more digits is octal (`"010"` is 8).
fn parse_int(s: &str) -> Option<i128> {
    let s = s.trim();
    let (negative, s) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };
    let s = match s.split_once('.') {
        Some((whole, frac)) if !frac.is_empty() && frac.bytes().all(|b| b == b'0') => whole,
        Some(_) => return None,
        None => s,
    };

    let (radix, digits) = match s.get(..2) {
        Some("0x") | Some("0X") => (16, &s[2..]),
        Some("0o") | Some("0O") => (8, &s[2..]),
        Some("0b") | Some("0B") => (2, &s[2..]),
        _ if s.len() > 1 && s.starts_with('0') => (8, &s[1..]),
        _ => (10, s),
    };
    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    if digits.is_empty() {
        return None;
    }

    let magnitude = u64::from_str_radix(&digits, radix).ok()? as i128;
    let signed = if negative { -magnitude } else { magnitude };
    if signed < i64::MIN as i128 || signed > u64::MAX as i128 {
        return None;
    }
    Some(signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_string_scalars() {
        assert_eq!(to_string(&Value::Null), "");
        assert_eq!(to_string(&Value::Bool(true)), "true");
        assert_eq!(to_string(&Value::Int(-7)), "-7");
        assert_eq!(to_string(&Value::Float(56.0)), "56");
        assert_eq!(to_string(&Value::Float(0.25)), "0.25");
        assert_eq!(to_string(&Value::from("中国")), "中国");
    }

    #[test]
    fn test_to_string_composites() {
        assert_eq!(to_string(&Value::List(vec![])), "");
        assert_eq!(to_string(&Value::from(json!({}))), "");
        assert_eq!(to_string(&Value::from(json!({"a": 1}))), r#"{"a":1}"#);
        assert_eq!(to_string(&Value::from(json!(["x"]))), r#"["x"]"#);
    }

    #[test]
    fn test_bool_rules() {
        for s in ["1", "t", "TRUE", "Yes", "on", " y "] {
            assert!(parse_bool_flag(s), "{} should be truthy", s);
        }
        for s in ["", "0", "false", "no", "off", "maybe"] {
            assert!(!parse_bool_flag(s), "{} should be falsy", s);
        }
        assert!(to_bool(&Value::Int(2)).unwrap());
        assert!(!to_bool(&Value::Float(0.0)).unwrap());
        assert!(to_bool(&Value::List(vec![])).is_err());
    }

    #[test]
    fn test_integer_parsing() {
        assert_eq!(to_i64(&Value::from("56")).unwrap(), 56);
        assert_eq!(to_i64(&Value::from("-0x1f")).unwrap(), -31);
        assert_eq!(to_i64(&Value::from("0b101")).unwrap(), 5);
        assert_eq!(to_i64(&Value::from("1_000")).unwrap(), 1000);
        assert_eq!(to_i64(&Value::from("56.00")).unwrap(), 56);
        assert_eq!(to_i64(&Value::from("056")).unwrap(), 46);
        assert_eq!(to_i64(&Value::from("010")).unwrap(), 8);
        assert_eq!(to_i64(&Value::from("-0_17")).unwrap(), -15);
        assert_eq!(to_i64(&Value::from("0")).unwrap(), 0);
        assert_eq!(to_i64(&Value::from("09")).unwrap(), 0);
        assert_eq!(to_i64(&Value::from("56.5")).unwrap(), 0);
        assert_eq!(to_i64(&Value::from("abc")).unwrap(), 0);
        assert_eq!(to_i64(&Value::Float(9.9)).unwrap(), 9);
        assert_eq!(to_i64(&Value::Bool(true)).unwrap(), 1);
    }

    #[test]
    fn test_integer_overflow_falls_back_to_zero() {
        assert_eq!(to_i64(&Value::from("99999999999999999999")).unwrap(), 0);
        assert_eq!(to_i64(&Value::from("18446744073709551615")).unwrap(), 0);
        assert_eq!(to_u64(&Value::from("18446744073709551615")).unwrap(), u64::MAX);
        // numbers and strings agree on out-of-range input
        assert_eq!(to_i64(&Value::Uint(u64::MAX)).unwrap(), 0);
        assert_eq!(to_i64(&Value::from(json!(9223372036854775808u64))).unwrap(), 0);
    }

    #[test]
    fn test_unsigned_rejects_negative() {
        assert_eq!(to_u64(&Value::Int(-1)).unwrap(), 0);
        assert_eq!(to_u64(&Value::Float(-2.5)).unwrap(), 0);
        assert_eq!(to_u64(&Value::from("-3")).unwrap(), 0);
        assert_eq!(to_u64(&Value::from("42")).unwrap(), 42);
    }

    #[test]
    fn test_float_parsing() {
        assert_eq!(to_f64(&Value::from(" 3.5 ")).unwrap(), 3.5);
        assert_eq!(to_f64(&Value::Int(2)).unwrap(), 2.0);
        assert_eq!(to_f64(&Value::from("x")).unwrap(), 0.0);
        assert!(matches!(
            to_f64(&Value::from(json!({"a": 1}))),
            Err(BindError::TypeMismatch { expected: "float", actual: "mapping" })
        ));
    }
}
