//! Per-format decoding of a single `key=value` pair into the result map.
//!
//! Each [`ArrayFormat`] maps to one plain function. The parser looks the
//! function up once and then feeds it every pair of the query string. Keys
//! arrive percent-decoded. Values are decoded too, except for the formats
//! that join several values in one field: those decode each piece after
//! splitting on the separator.

use indexmap::map::Entry;

use crate::config::{ArrayFormat, Config};
use crate::value::{ParsedQuery, Value};

use super::decode::decode_component;

/// Merges one `(key, value)` pair into `acc`. A `None` value is a bare key.
pub type Decoder = fn(&Config, String, Option<String>, &mut ParsedQuery);

pub const fn decoder_for(format: ArrayFormat) -> Decoder {
    match format {
        ArrayFormat::None => decode_repeated,
        ArrayFormat::Index => decode_index,
        ArrayFormat::Bracket => decode_bracket,
        ArrayFormat::ColonListSeparator => decode_colon_list,
        ArrayFormat::Comma | ArrayFormat::Separator => decode_separated,
        ArrayFormat::BracketSeparator => decode_bracket_separated,
    }
}

fn decode(value: &str, config: &Config) -> String {
    if config.decode {
        decode_component(value).into_owned()
    } else {
        value.to_owned()
    }
}

/// Splits a trailing `[<digits>]` off `key`, returning the base key and the
/// index text. The digits may be empty.
fn strip_index(key: &str) -> Option<(&str, &str)> {
    let inner = key.strip_suffix(']')?;
    let open = inner.rfind('[')?;
    let index = &inner[open + 1..];
    if index.bytes().all(|b| b.is_ascii_digit()) {
        Some((&inner[..open], index))
    } else {
        None
    }
}

/// Appends `value` to the sequence under `key`, creating it if needed.
fn push_value(acc: &mut ParsedQuery, key: String, value: Value) {
    match acc.entry(key) {
        Entry::Vacant(v) => {
            v.insert(Value::Array(vec![value]));
        }
        Entry::Occupied(mut o) => match o.get_mut() {
            Value::Array(values) => values.push(value),
            existing => {
                let first = std::mem::replace(existing, Value::Null);
                *existing = Value::Array(vec![first, value]);
            }
        },
    }
}

fn decode_repeated(_: &Config, key: String, value: Option<String>, acc: &mut ParsedQuery) {
    let value = Value::from(value);
    match acc.entry(key) {
        Entry::Vacant(v) => {
            v.insert(value);
        }
        Entry::Occupied(mut o) => match o.get_mut() {
            Value::Array(values) => values.push(value),
            existing => {
                let first = std::mem::replace(existing, Value::Null);
                *existing = Value::Array(vec![first, value]);
            }
        },
    }
}

fn decode_index(_: &Config, key: String, value: Option<String>, acc: &mut ParsedQuery) {
    let parsed = strip_index(&key).map(|(base, index)| (base.to_owned(), index.to_owned()));
    let Some((base, index)) = parsed else {
        acc.insert(key, Value::from(value));
        return;
    };
    let node = acc.entry(base).or_insert(Value::Null);
    if !matches!(node, Value::Indexed(_)) {
        *node = Value::Indexed(Default::default());
    }
    if let Value::Indexed(map) = node {
        map.insert(index, Value::from(value));
    }
}

fn decode_suffixed(suffix: &str, key: String, value: Option<String>, acc: &mut ParsedQuery) {
    match key.strip_suffix(suffix).map(str::to_owned) {
        Some(base) => push_value(acc, base, Value::from(value)),
        None => {
            acc.insert(key, Value::from(value));
        }
    }
}

fn decode_bracket(_: &Config, key: String, value: Option<String>, acc: &mut ParsedQuery) {
    decode_suffixed("[]", key, value, acc);
}

fn decode_colon_list(_: &Config, key: String, value: Option<String>, acc: &mut ParsedQuery) {
    decode_suffixed(":list", key, value, acc);
}

fn decode_separated(config: &Config, key: String, value: Option<String>, acc: &mut ParsedQuery) {
    let separator = config.separator;
    let value = match value {
        None => Value::Null,
        Some(raw) if raw.contains(separator) => Value::Array(
            raw.split(separator)
                .map(|item| Value::String(decode(item, config)))
                .collect(),
        ),
        Some(raw) => {
            // the separator may itself be percent-encoded, in which case the
            // pieces of the decoded value are decoded once more
            let decoded = decode(&raw, config);
            if decoded.contains(separator) {
                Value::Array(
                    decoded
                        .split(separator)
                        .map(|item| Value::String(decode(item, config)))
                        .collect(),
                )
            } else {
                Value::String(decoded)
            }
        }
    };
    acc.insert(key, value);
}

fn decode_bracket_separated(
    config: &Config,
    key: String,
    value: Option<String>,
    acc: &mut ParsedQuery,
) {
    let Some(base) = key.strip_suffix("[]").map(str::to_owned) else {
        let value = match value {
            Some(v) if !v.is_empty() => Value::String(decode(&v, config)),
            other => Value::from(other),
        };
        acc.insert(key, value);
        return;
    };

    let items: Vec<Value> = match value {
        None => Vec::new(),
        Some(v) => v
            .split(config.separator)
            .map(|item| Value::String(decode(item, config)))
            .collect(),
    };
    match acc.entry(base) {
        Entry::Vacant(v) => {
            v.insert(Value::Array(items));
        }
        Entry::Occupied(mut o) => match o.get_mut() {
            Value::Array(values) => values.extend(items),
            existing => {
                let first = std::mem::replace(existing, Value::Null);
                let mut values = vec![first];
                values.extend(items);
                *existing = Value::Array(values);
            }
        },
    }
}
