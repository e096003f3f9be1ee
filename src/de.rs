//! Parsing support for query strings.
//!
//! Parsing happens in a single pass over the `&`-separated segments:
//!
//! 1. the input is trimmed and one leading `?`, `#` or `&` is dropped
//! 2. each segment is split on its first `=`; a segment without `=` is a
//!    bare key with a `Null` value (as opposed to `key=`, which is an
//!    empty string)
//! 3. the key (and, for most formats, the value) is percent-decoded and the
//!    pair is handed to the decoder of the active [`ArrayFormat`]
//! 4. values are coerced to numbers or booleans when enabled
//! 5. keys are sorted, and `index`-format maps are flattened into
//!    sequences, unless sorting is disabled
//!
//! [`ArrayFormat`]: crate::ArrayFormat

mod array;
mod coerce;
pub(crate) mod decode;

pub use coerce::{parse_number, to_number};

use std::borrow::Cow;
use std::cmp::Ordering;

use crate::config::{Config, Sort};
use crate::value::{ParsedQuery, Value};

use decode::decode_component;

pub fn parse(query: Option<&str>, config: &Config) -> ParsedQuery {
    let mut output = ParsedQuery::default();
    let Some(query) = query else {
        return output;
    };

    let query = query.trim();
    let query = query
        .strip_prefix(['?', '#', '&'])
        .unwrap_or(query);
    if query.is_empty() {
        return output;
    }

    let decoder = array::decoder_for(config.array_format);
    let decode_values = !config.array_format.joins_values();

    for segment in query.split('&').filter(|s| !s.is_empty()) {
        // form encoding uses `+` for spaces
        let segment: Cow<'_, str> = if config.decode && segment.contains('+') {
            Cow::Owned(segment.replace('+', " "))
        } else {
            Cow::Borrowed(segment)
        };

        let (key, value) = match segment.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (&*segment, None),
        };

        let key = decode_if(key, config.decode);
        let value = value.map(|v| {
            if decode_values {
                decode_if(v, config.decode)
            } else {
                v.to_owned()
            }
        });
        decoder(config, key, value, &mut output);
    }

    for value in output.values_mut() {
        let raw = std::mem::replace(value, Value::Null);
        *value = coerce::coerce(raw, config);
    }

    if config.sort.is_sorted() {
        sort_query(output, config.sort)
    } else {
        output
    }
}

fn decode_if(input: &str, decode: bool) -> String {
    if decode {
        decode_component(input).into_owned()
    } else {
        input.to_owned()
    }
}

/// Sorts the keys of a parsed query and flattens positional maps.
fn sort_query(mut query: ParsedQuery, sort: Sort) -> ParsedQuery {
    query.sort_by(|a, _, b, _| sort.compare(a, b));
    for value in query.values_mut() {
        if let Value::Indexed(map) = value {
            let map = std::mem::take(map);
            *value = Value::Array(flatten_indexed(map));
        }
    }
    query
}

/// Orders positional entries by their numeric index and drops the indices.
///
/// Keys are first put in string order and then stably ordered by number, so
/// keys with equal numeric value (`1` and `01`) stay in string order. An
/// empty index counts as `0`.
fn flatten_indexed(map: indexmap::IndexMap<String, Value>) -> Vec<Value> {
    let mut entries: Vec<(String, Value)> = map.into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    entries.sort_by(|(a, _), (b, _)| {
        index_number(a)
            .partial_cmp(&index_number(b))
            .unwrap_or(Ordering::Equal)
    });
    entries.into_iter().map(|(_, v)| v).collect()
}

fn index_number(index: &str) -> f64 {
    coerce::to_number(index)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::ArrayFormat;
    use pretty_assertions::assert_eq;

    fn keys(query: &ParsedQuery) -> Vec<&str> {
        query.keys().map(String::as_str).collect()
    }

    #[test]
    fn parse_empty() {
        let config = Config::new();
        assert_eq!(parse(Some(""), &config), ParsedQuery::default());
        assert_eq!(parse(Some("  ?  "), &config), ParsedQuery::default());
        assert_eq!(parse(None, &config), ParsedQuery::default());
        assert_eq!(parse(Some("&&&"), &config), ParsedQuery::default());
    }

    #[test]
    fn parse_strips_one_leading_marker() {
        let config = Config::new();
        assert_eq!(keys(&parse(Some("?a=1"), &config)), ["a"]);
        assert_eq!(keys(&parse(Some("#a=1"), &config)), ["a"]);
        assert_eq!(keys(&parse(Some("??a=1"), &config)), ["?a"]);
    }

    #[test]
    fn parse_bare_key_and_empty_value() {
        let parsed = parse(Some("a&b="), &Config::new());
        assert_eq!(parsed["a"], Value::Null);
        assert_eq!(parsed["b"], Value::from(""));
    }

    #[test]
    fn parse_splits_on_first_equals() {
        let parsed = parse(Some("a=b=c"), &Config::new());
        assert_eq!(parsed["a"], Value::from("b=c"));
    }

    #[test]
    fn parse_plus_is_space_only_when_decoding() {
        let parsed = parse(Some("a+b=c+d"), &Config::new());
        assert_eq!(parsed["a b"], Value::from("c d"));

        let parsed = parse(Some("a+b=c%20d"), &Config::new().decode(false));
        assert_eq!(parsed["a+b"], Value::from("c%20d"));
    }

    #[test]
    fn parse_keeps_insertion_order_when_unsorted() {
        let parsed = parse(Some("c=1&a=2&b=3"), &Config::new().sort(Sort::Unsorted));
        assert_eq!(keys(&parsed), ["c", "a", "b"]);

        let parsed = parse(Some("c=1&a=2&b=3"), &Config::new());
        assert_eq!(keys(&parsed), ["a", "b", "c"]);
    }

    #[test]
    fn parse_custom_sort() {
        let config = Config::new().sort(Sort::Custom(|a, b| b.cmp(a)));
        let parsed = parse(Some("a=1&c=2&b=3"), &config);
        assert_eq!(keys(&parsed), ["c", "b", "a"]);
    }

    #[test]
    fn parse_index_is_flattened_when_sorted() {
        let config = Config::new().array_format(ArrayFormat::Index);
        let parsed = parse(Some("a[10]=z&a[2]=y&a[1]=x"), &config);
        assert_eq!(parsed["a"], Value::from(vec!["x", "y", "z"]));

        let parsed = parse(Some("a[1]=x&a[0]=y"), &config.sort(Sort::Unsorted));
        let Value::Indexed(map) = &parsed["a"] else {
            panic!("expected indexed value");
        };
        assert_eq!(map.keys().collect::<Vec<_>>(), ["1", "0"]);
    }

    #[test]
    fn parse_coerces_inside_sequences() {
        let config = Config::new().parse_numbers(true).parse_booleans(true);
        let parsed = parse(Some("a=1&a=true&b=x&c"), &config);
        assert_eq!(
            parsed["a"],
            Value::Array(vec![Value::Number(1.0), Value::Bool(true)])
        );
        assert_eq!(parsed["b"], Value::from("x"));
        assert_eq!(parsed["c"], Value::Null);
    }

    #[test]
    fn parse_malformed_escape_keeps_raw_value() {
        let parsed = parse(Some("a=%FF&b=%E2%9C%93"), &Config::new());
        assert_eq!(parsed["a"], Value::from("%FF"));
        assert_eq!(parsed["b"], Value::from("✓"));
    }
}
