//! Per-format encoding of the elements of a multi-valued key.
//!
//! The encoder of a format is a step function folded over the elements of
//! a sequence. The accumulator holds the `key=value` fragments emitted so
//! far. The stringifier joins them with `&`.

use crate::config::{ArrayFormat, Config};
use crate::value::Value;

use super::encode_if;

/// One fold step: `value` is `None` for a null element.
type Step = fn(&Config, &str, Vec<String>, Option<&str>) -> Vec<String>;

const fn step_for(format: ArrayFormat) -> Step {
    match format {
        ArrayFormat::None => encode_repeated,
        ArrayFormat::Index => encode_index,
        ArrayFormat::Bracket => encode_bracket,
        ArrayFormat::ColonListSeparator => encode_colon_list,
        ArrayFormat::Comma | ArrayFormat::Separator => encode_separated,
        ArrayFormat::BracketSeparator => encode_bracket_separated,
    }
}

/// Encodes the elements of a sequence under `key` into query fragments.
pub fn encode_values<'a>(
    config: &Config,
    key: &str,
    values: impl IntoIterator<Item = &'a Value>,
) -> Vec<String> {
    let step = step_for(config.array_format);
    values.into_iter().fold(Vec::new(), |acc, value| {
        if (config.skip_null && value.is_null())
            || (config.skip_empty_string && value.is_empty_string())
        {
            return acc;
        }
        let text = value.to_query_string();
        step(config, key, acc, text.as_deref())
    })
}

fn encode_repeated(config: &Config, key: &str, mut acc: Vec<String>, value: Option<&str>) -> Vec<String> {
    let key = encode_if(key, config);
    acc.push(match value {
        None => key.into_owned(),
        Some(value) => format!("{key}={}", encode_if(value, config)),
    });
    acc
}

fn encode_index(config: &Config, key: &str, mut acc: Vec<String>, value: Option<&str>) -> Vec<String> {
    let mut buffer = itoa::Buffer::new();
    let index = buffer.format(acc.len());
    let key = encode_if(key, config);
    acc.push(match value {
        None => format!("{key}[{index}]"),
        Some(value) => format!(
            "{key}[{}]={}",
            encode_if(index, config),
            encode_if(value, config)
        ),
    });
    acc
}

fn encode_suffixed(
    suffix: &str,
    config: &Config,
    key: &str,
    mut acc: Vec<String>,
    value: Option<&str>,
) -> Vec<String> {
    let key = encode_if(key, config);
    acc.push(match value {
        None => format!("{key}{suffix}"),
        Some(value) => format!("{key}{suffix}={}", encode_if(value, config)),
    });
    acc
}

fn encode_bracket(config: &Config, key: &str, acc: Vec<String>, value: Option<&str>) -> Vec<String> {
    encode_suffixed("[]", config, key, acc, value)
}

fn encode_colon_list(config: &Config, key: &str, acc: Vec<String>, value: Option<&str>) -> Vec<String> {
    encode_suffixed(":list", config, key, acc, value)
}

/// Appends to the single joined field, starting it with `key` and
/// `key_value_separator` on the first element. Null becomes an empty string.
fn encode_joined(
    key_value_separator: &str,
    config: &Config,
    key: &str,
    mut acc: Vec<String>,
    value: Option<&str>,
) -> Vec<String> {
    let value = encode_if(value.unwrap_or_default(), config);
    match acc.first_mut() {
        None => acc.push(format!(
            "{}{key_value_separator}{value}",
            encode_if(key, config)
        )),
        Some(field) => {
            field.push(config.separator);
            field.push_str(&value);
        }
    }
    acc
}

fn encode_separated(config: &Config, key: &str, acc: Vec<String>, value: Option<&str>) -> Vec<String> {
    encode_joined("=", config, key, acc, value)
}

fn encode_bracket_separated(
    config: &Config,
    key: &str,
    acc: Vec<String>,
    value: Option<&str>,
) -> Vec<String> {
    encode_joined("[]=", config, key, acc, value)
}
