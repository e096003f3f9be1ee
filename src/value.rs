//! The structured side of the codec.

use std::borrow::Cow;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An ordered mapping from query keys to their parsed values.
///
/// Keys are unique. Repeated keys in the input are merged according to the
/// active [`ArrayFormat`](crate::ArrayFormat).
pub type ParsedQuery = IndexMap<String, Value>;

/// A single parsed query value.
///
/// - `Null`: a bare key with no `=` (e.g. `flag` in `flag&a=1`)
/// - `String`: the (decoded) text of a value
/// - `Number` / `Bool`: produced by value coercion when enabled
/// - `Array`: a key with multiple values
/// - `Indexed`: positional values from the `index` array format, keyed by
///   the index text, before the keys are sorted into an `Array`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Indexed(IndexMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(values) => Some(values),
            _ => None,
        }
    }

    /// `true` for the empty string only.
    pub(crate) fn is_empty_string(&self) -> bool {
        matches!(self, Value::String(s) if s.is_empty())
    }

    /// The text written into a query string for this value, or `None` for
    /// `Null`.
    ///
    /// Numbers are formatted the way JavaScript prints them, so integral
    /// values have no fraction. Nested sequences are joined with `,`.
    pub fn to_query_string(&self) -> Option<Cow<'_, str>> {
        match self {
            Value::Null => None,
            Value::String(s) => Some(Cow::Borrowed(s)),
            Value::Bool(true) => Some(Cow::Borrowed("true")),
            Value::Bool(false) => Some(Cow::Borrowed("false")),
            Value::Number(n) => Some(Cow::Owned(format_number(*n))),
            Value::Array(values) => Some(Cow::Owned(join_values(values.iter()))),
            Value::Indexed(map) => Some(Cow::Owned(join_values(map.values()))),
        }
    }
}

fn join_values<'a>(values: impl Iterator<Item = &'a Value>) -> String {
    values
        .map(|v| v.to_query_string().unwrap_or_default())
        .collect::<Vec<_>>()
        .join(",")
}

/// Formats a number the way `String(number)` does in JavaScript.
///
/// The shortest round-tripping digits come from `ryu` and are laid out
/// positionally for decimal exponents in `-7..21`, in `e+`/`e-` form
/// otherwise.
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_owned();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    if n == 0.0 {
        return "0".to_owned();
    }
    // exactly representable integers
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        let mut buffer = itoa::Buffer::new();
        return buffer.format(n as i64).to_owned();
    }

    let mut buffer = ryu::Buffer::new();
    let shortest = buffer.format_finite(n.abs());
    let (mantissa, exponent) = match shortest.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (shortest, 0),
    };
    let (integral, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    // value = 0.<digits> * 10^point
    let all = format!("{integral}{fraction}");
    let trimmed = all.trim_start_matches('0');
    let point = integral.len() as i32 + exponent - (all.len() - trimmed.len()) as i32;
    let digits = trimmed.trim_end_matches('0');
    let len = digits.len() as i32;

    let mut out = String::with_capacity(digits.len() + 8);
    if n < 0.0 {
        out.push('-');
    }
    if len <= point && point <= 21 {
        out.push_str(digits);
        out.extend(std::iter::repeat_n('0', (point - len) as usize));
    } else if 0 < point && point <= 21 {
        let (head, tail) = digits.split_at(point as usize);
        out.push_str(head);
        out.push('.');
        out.push_str(tail);
    } else if -6 < point && point <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat_n('0', (-point) as usize));
        out.push_str(digits);
    } else {
        let (first, rest) = digits.split_at(1);
        out.push_str(first);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        let exponent = point - 1;
        out.push(if exponent < 0 { '-' } else { '+' });
        out.push_str(itoa::Buffer::new().format(exponent.unsigned_abs()));
    }
    out
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_query_string() {
            Some(s) => f.write_str(&s),
            None => f.write_str("null"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(values: [T; N]) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}
