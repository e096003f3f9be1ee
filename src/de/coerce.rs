//! Value coercion applied after a query has been decoded.

use crate::config::Config;
use crate::value::Value;

/// Applies number and boolean coercion to a parsed value.
///
/// Sequences and indexed maps are coerced element by element. `Null` is
/// never coerced.
pub fn coerce(value: Value, config: &Config) -> Value {
    if !config.parse_numbers && !config.parse_booleans {
        return value;
    }
    match value {
        Value::String(s) => coerce_str(s, config),
        Value::Array(values) => {
            Value::Array(values.into_iter().map(|v| coerce(v, config)).collect())
        }
        Value::Indexed(map) => Value::Indexed(
            map.into_iter()
                .map(|(k, v)| (k, coerce(v, config)))
                .collect(),
        ),
        other => other,
    }
}

fn coerce_str(s: String, config: &Config) -> Value {
    if config.parse_numbers {
        if let Some(n) = parse_number(&s) {
            return Value::Number(n);
        }
    }
    if config.parse_booleans {
        if s.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if s.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
    }
    Value::String(s)
}

/// Parses a numeric string, ignoring surrounding whitespace.
///
/// Returns `None` for blank strings and for anything that is not a number.
pub fn parse_number(s: &str) -> Option<f64> {
    let n = to_number(s);
    if s.trim().is_empty() || n.is_nan() {
        None
    } else {
        Some(n)
    }
}

/// Converts a string to a number the way JavaScript's `Number(string)` does:
/// blank strings are `0`, `0x`/`0o`/`0b` prefixes are honoured, `Infinity`
/// is spelled out, and anything else that is not a decimal literal is `NaN`.
pub fn to_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &s[2..];
        if digits.is_empty() {
            return f64::NAN;
        }
        return digits.chars().try_fold(0f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * radix as f64 + d as f64)
        })
        .unwrap_or(f64::NAN);
    }

    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    if unsigned == "Infinity" {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    // `f64::from_str` also accepts `inf` and `nan`, which are not numbers here
    let is_decimal_literal = !unsigned.starts_with(['+', '-'])
        && unsigned
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !is_decimal_literal {
        return f64::NAN;
    }
    unsigned
        .parse::<f64>()
        .map(|n| if s.starts_with('-') { -n } else { n })
        .unwrap_or(f64::NAN)
}
