//! Serialization support for query strings.

mod array;
pub(crate) mod encode;

use std::borrow::Cow;
use std::io::Write;

use crate::config::{ArrayFormat, Config};
use crate::error::Result;
use crate::value::{ParsedQuery, Value};

use encode::encode_component;

/// Percent-encodes `value` when encoding is enabled.
pub(crate) fn encode_if<'a>(value: &'a str, config: &Config) -> Cow<'a, str> {
    if config.encode {
        encode_component(value, config.strict)
    } else {
        Cow::Borrowed(value)
    }
}

pub fn stringify<W: Write>(query: &ParsedQuery, config: &Config, writer: W) -> Result<()> {
    let mut serializer = QsSerializer::new(writer, config);

    let mut entries: Vec<(&String, &Value)> = query
        .iter()
        .filter(|(_, value)| {
            !((config.skip_null && value.is_null())
                || (config.skip_empty_string && value.is_empty_string()))
        })
        .collect();
    if config.sort.is_sorted() {
        entries.sort_by(|(a, _), (b, _)| config.sort.compare(a, b));
    }

    for (key, value) in entries {
        serializer.serialize_entry(key, value)?;
    }
    Ok(())
}

/// A writer of `&`-separated query fragments.
///
/// Each key is turned into one fragment (which may itself contain several
/// `&`-joined pairs for multi-valued keys). Empty fragments are dropped.
struct QsSerializer<'c, W: Write> {
    writer: W,
    first_kv: bool,
    config: &'c Config,
}

impl<'c, W: Write> QsSerializer<'c, W> {
    fn new(writer: W, config: &'c Config) -> Self {
        Self {
            writer,
            first_kv: true,
            config,
        }
    }

    fn write_fragment(&mut self, fragment: &str) -> Result<()> {
        if fragment.is_empty() {
            return Ok(());
        }
        if self.first_kv {
            self.first_kv = false;
        } else {
            self.writer.write_all(b"&")?;
        }
        self.writer.write_all(fragment.as_bytes())?;
        Ok(())
    }

    fn serialize_entry(&mut self, key: &str, value: &Value) -> Result<()> {
        let config = self.config;
        match value {
            Value::Null => {
                let key = encode_if(key, config);
                self.write_fragment(&key)
            }
            Value::Array(values) => self.serialize_seq(key, values.iter(), values.is_empty()),
            Value::Indexed(map) => self.serialize_seq(key, map.values(), map.is_empty()),
            scalar => {
                let text = scalar.to_query_string().unwrap_or_default();
                let fragment = format!("{}={}", encode_if(key, config), encode_if(&text, config));
                self.write_fragment(&fragment)
            }
        }
    }

    fn serialize_seq<'v>(
        &mut self,
        key: &str,
        values: impl Iterator<Item = &'v Value>,
        is_empty: bool,
    ) -> Result<()> {
        let config = self.config;
        if is_empty && config.array_format == ArrayFormat::BracketSeparator {
            let fragment = format!("{}[]", encode_if(key, config));
            return self.write_fragment(&fragment);
        }
        let fragments = array::encode_values(config, key, values);
        self.write_fragment(&fragments.join("&"))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Sort;
    use pretty_assertions::assert_eq;

    fn to_string(query: &ParsedQuery, config: Config) -> String {
        let mut buffer = Vec::new();
        stringify(query, &config, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    fn query(entries: Vec<(&str, Value)>) -> ParsedQuery {
        entries
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect()
    }

    #[test]
    fn sorts_keys_by_default() {
        let q = query(vec![("b", 2i64.into()), ("a", 1i64.into())]);
        assert_eq!(to_string(&q, Config::new()), "a=1&b=2");
        assert_eq!(to_string(&q, Config::new().sort(Sort::Unsorted)), "b=2&a=1");
    }

    #[test]
    fn null_is_a_bare_key() {
        let q = query(vec![("a", Value::Null), ("b", "".into())]);
        assert_eq!(to_string(&q, Config::new()), "a&b=");
        assert_eq!(to_string(&q, Config::new().skip_null(true)), "b=");
        assert_eq!(to_string(&q, Config::new().skip_empty_string(true)), "a");
    }

    #[test]
    fn empty_sequences() {
        let q = query(vec![("a", Value::Array(vec![])), ("b", "x".into())]);
        assert_eq!(to_string(&q, Config::new()), "b=x");
        assert_eq!(
            to_string(&q, Config::new().array_format(ArrayFormat::BracketSeparator)),
            "a[]&b=x"
        );
    }

    #[test]
    fn encoding_can_be_disabled() {
        let q = query(vec![("a b", "c&d".into())]);
        assert_eq!(to_string(&q, Config::new()), "a%20b=c%26d");
        assert_eq!(to_string(&q, Config::new().encode(false)), "a b=c&d");
    }

    #[test]
    fn non_string_scalars() {
        let q = query(vec![("n", 1.5.into()), ("t", true.into())]);
        assert_eq!(to_string(&q, Config::new()), "n=1.5&t=true");
    }
}
