//! A query-backed state store.
//!
//! [`QueryState`] keeps a set of [`SearchParams`] and hands the serialized
//! parameters to a [`Push`] sink after every change. [`UrlState`] wires two
//! such stores (one for the query, one for the fragment) to a URL model and
//! a [`History`].
//!
//! Values are read and written through a [`Codec`]. Transforms that fail
//! are logged (when `debug` is enabled) and the affected value is kept
//! raw as a [`Parsed::Raw`]. They never abort the surrounding operation.

mod params;
mod url_state;

pub use params::SearchParams;
pub use url_state::{History, UrlParts, UrlPush, UrlState};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::de::decode::try_decode_component;
use crate::de::to_number;
use crate::error::{Error, Result};
use crate::ser::encode::encode_component;
use crate::value::Value;

/// Receives the serialized parameters after each change.
pub trait Push {
    fn push(&mut self, serialized: &str);
}

impl<F: FnMut(&str)> Push for F {
    fn push(&mut self, serialized: &str) {
        self(serialized)
    }
}

/// The transforms applied by the typed setters and getters of
/// [`QueryState`].
///
/// The defaults use JSON for structured values and percent-encoding for
/// strings.
pub trait Codec {
    fn encode(&self, value: &str) -> Result<String> {
        Ok(encode_component(value, false).into_owned())
    }

    fn decode(&self, value: &str) -> Result<String> {
        Ok(try_decode_component(value)?.into_owned())
    }

    fn stringify<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn parse<T: DeserializeOwned>(&self, value: &str) -> Result<T> {
        Ok(serde_json::from_str(value)?)
    }
}

/// The default [`Codec`].
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {}

/// Parses an RFC 3339 timestamp, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (taken
/// as UTC) or a bare `YYYY-MM-DD` date (UTC midnight).
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.with_timezone(&Utc));
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(datetime.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
        .ok_or_else(|| Error::DateTime(value.to_owned()))
}

/// A value read by one of the parsing getters of [`QueryState`].
///
/// A value the codec could not parse is kept as the string it was parsed
/// from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Parsed<T> {
    Value(T),
    Raw(String),
}

impl<T> Parsed<T> {
    /// The parsed value, if parsing succeeded.
    pub fn ok(self) -> Option<T> {
        match self {
            Parsed::Value(value) => Some(value),
            Parsed::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&str> {
        match self {
            Parsed::Value(_) => None,
            Parsed::Raw(raw) => Some(raw),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Parsed::Raw(_))
    }
}

/// A store of query parameters that reports each change to a [`Push`].
///
/// ```
/// use qs_url::QueryState;
///
/// let mut pushed = Vec::new();
/// let mut state = QueryState::new("?page=2", |s: &str| pushed.push(s.to_owned()));
/// state.set("tag", "rust");
/// assert_eq!(state.get_number("page", None), [2.0]);
/// drop(state);
/// assert_eq!(pushed, ["page=2&tag=rust"]);
/// ```
#[derive(Debug)]
pub struct QueryState<P, C = JsonCodec> {
    params: SearchParams,
    push: P,
    codec: C,
    debug: bool,
}

impl<P: Push> QueryState<P> {
    pub fn new(query: &str, push: P) -> Self {
        Self::with_codec(query, push, JsonCodec)
    }
}

impl<P: Push, C: Codec> QueryState<P, C> {
    pub fn with_codec(query: &str, push: P, codec: C) -> Self {
        Self {
            params: SearchParams::parse(query),
            push,
            codec,
            debug: false,
        }
    }

    /// Logs failed transforms when enabled.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// The parameters in their serialized form.
    pub fn value(&self) -> String {
        self.params.to_string()
    }

    /// The parameters as a map; the last value of a repeated key wins.
    pub fn entries(&self) -> IndexMap<String, String> {
        self.params.to_map()
    }

    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    pub fn has(&self, key: &str) -> bool {
        self.params.has(key)
    }

    pub fn remove(&mut self, key: &str) {
        self.params.delete(key);
        self.flush();
    }

    /// Appends `value` under `key` and pushes. Missing and empty values are
    /// ignored, and nothing is pushed for them.
    pub fn set<'a>(&mut self, key: &str, value: impl Into<Option<&'a str>>) {
        if self.include(key, value.into()) {
            self.flush();
        }
    }

    /// Appends every entry, then pushes once if any entry was given.
    ///
    /// Sequences append one parameter per element.
    pub fn record<I, K, V>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut any = false;
        for (key, value) in entries {
            any = true;
            match value.into() {
                Value::Array(values) => {
                    for value in &values {
                        self.include(key.as_ref(), value.to_query_string().as_deref());
                    }
                }
                value => {
                    self.include(key.as_ref(), value.to_query_string().as_deref());
                }
            }
        }
        if any {
            self.flush();
        }
    }

    /// Stringifies and then encodes `value` before setting it.
    pub fn set_encoded<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let Some(stringified) = self.recover(self.codec.stringify(value)) else {
            return;
        };
        let encoded = self
            .recover(self.codec.encode(&stringified))
            .unwrap_or(stringified);
        self.set(key, encoded.as_str());
    }

    pub fn set_stringified<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        if let Some(stringified) = self.recover(self.codec.stringify(value)) {
            self.set(key, stringified.as_str());
        }
    }

    /// All values of `key`, or the fallback when the key is absent.
    ///
    /// Empty values are left out.
    pub fn get(&self, key: &str, fallback: Option<&str>) -> Vec<String> {
        self.resolve(
            key,
            |value| Some(value.to_owned()),
            fallback.map(str::to_owned),
        )
        .into_iter()
        .filter(|value| !value.is_empty())
        .collect()
    }

    /// Values of `key` parsed by the codec. A value that fails to parse is
    /// returned as [`Parsed::Raw`].
    pub fn get_parsed<T: DeserializeOwned>(
        &self,
        key: &str,
        fallback: Option<T>,
    ) -> Vec<Parsed<T>> {
        self.resolve(
            key,
            |value| Some(self.parse_or_raw(value.to_owned())),
            fallback.map(Parsed::Value),
        )
    }

    /// Values of `key` decoded and then parsed by the codec. A value that
    /// fails to decode is parsed as it is, and one that fails to parse is
    /// returned as [`Parsed::Raw`].
    pub fn get_decoded<T: DeserializeOwned>(
        &self,
        key: &str,
        fallback: Option<T>,
    ) -> Vec<Parsed<T>> {
        self.resolve(
            key,
            |value| {
                let decoded = self
                    .recover(self.codec.decode(value))
                    .unwrap_or_else(|| value.to_owned());
                Some(self.parse_or_raw(decoded))
            },
            fallback.map(Parsed::Value),
        )
    }

    /// Values of `key` as numbers. An empty value is `0`, an invalid one is
    /// NaN.
    pub fn get_number(&self, key: &str, fallback: Option<f64>) -> Vec<f64> {
        self.resolve(key, |value| Some(to_number(value)), fallback)
    }

    /// Values of `key` as booleans: any non-empty value is `true`.
    pub fn get_boolean(&self, key: &str, fallback: Option<bool>) -> Vec<bool> {
        self.resolve(key, |value| Some(!value.is_empty()), fallback)
    }

    pub fn get_datetime(
        &self,
        key: &str,
        fallback: Option<DateTime<Utc>>,
    ) -> Vec<Parsed<DateTime<Utc>>> {
        self.resolve(
            key,
            |value| {
                Some(match self.recover(parse_datetime(value)) {
                    Some(datetime) => Parsed::Value(datetime),
                    None => Parsed::Raw(value.to_owned()),
                })
            },
            fallback.map(Parsed::Value),
        )
    }

    /// Values of `key` as milliseconds since the Unix epoch. Values that are
    /// not dates are dropped.
    pub fn get_timestamp(&self, key: &str, fallback: Option<i64>) -> Vec<i64> {
        self.resolve(
            key,
            |value| {
                self.recover(parse_datetime(value))
                    .map(|datetime| datetime.timestamp_millis())
            },
            fallback,
        )
    }

    fn resolve<T>(
        &self,
        key: &str,
        transform: impl Fn(&str) -> Option<T>,
        fallback: Option<T>,
    ) -> Vec<T> {
        let values = self.params.get_all(key);
        if values.is_empty() {
            fallback.into_iter().collect()
        } else {
            values.into_iter().filter_map(transform).collect()
        }
    }

    fn parse_or_raw<T: DeserializeOwned>(&self, value: String) -> Parsed<T> {
        match self.recover(self.codec.parse(&value)) {
            Some(parsed) => Parsed::Value(parsed),
            None => Parsed::Raw(value),
        }
    }

    /// Returns whether the value was appended.
    fn include(&mut self, key: &str, value: Option<&str>) -> bool {
        match value {
            Some(value) if !value.is_empty() => {
                self.params.append(key, value);
                true
            }
            _ => false,
        }
    }

    fn flush(&mut self) {
        let value = self.value();
        tracing::trace!(%value, "pushing query state");
        self.push.push(&value);
    }

    fn recover<T>(&self, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                if self.debug {
                    tracing::error!(%err, "query state transform failed");
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn store(query: &str) -> QueryState<impl FnMut(&str)> {
        QueryState::new(query, |_: &str| {})
    }

    #[test]
    fn set_ignores_empty_values() {
        let mut pushed = Vec::new();
        let mut state = QueryState::new("", |s: &str| pushed.push(s.to_owned()));
        state.set("a", "1");
        state.set("b", "");
        state.set("c", None::<&str>);
        state.set("a", "2");
        assert_eq!(state.value(), "a=1&a=2");
        drop(state);
        assert_eq!(pushed, ["a=1", "a=1&a=2"]);
    }

    #[test]
    fn record_pushes_once() {
        let mut count = 0;
        let mut state = QueryState::new("", |_: &str| count += 1);
        state.record([("tags", Value::from(vec!["x", "", "y"])), ("q", Value::from("a b"))]);
        assert_eq!(state.value(), "tags=x&tags=y&q=a+b");
        state.record(Vec::<(&str, Value)>::new());
        drop(state);
        assert_eq!(count, 1);
    }

    #[test]
    fn get_with_fallback() {
        let state = store("a=1&a=&a=3");
        assert_eq!(state.get("a", None), ["1", "3"]);
        assert_eq!(state.get("b", Some("x")), ["x"]);
        assert_eq!(state.get("b", Some("")), Vec::<String>::new());
        assert!(state.get("b", None).is_empty());
    }

    #[test]
    fn numbers_and_booleans() {
        let state = store("n=1.5&n=&n=abc&b=0&b=");
        let numbers = state.get_number("n", None);
        assert_eq!(numbers[..2], [1.5, 0.0]);
        assert!(numbers[2].is_nan());
        assert_eq!(state.get_boolean("b", None), [true, false]);
        assert_eq!(state.get_number("missing", Some(7.0)), [7.0]);
    }

    #[test]
    fn json_values() {
        let mut state = store("");
        state.set_stringified("filter", &vec![1, 2]);
        state.set_encoded("user", &serde_json::json!({ "name": "a b" }));
        state.set("broken", "{nope");

        assert_eq!(
            state.get_parsed::<Vec<u8>>("filter", None),
            [Parsed::Value(vec![1u8, 2])]
        );
        assert_eq!(
            state.get_decoded::<serde_json::Value>("user", None),
            [Parsed::Value(serde_json::json!({ "name": "a b" }))]
        );
        assert_eq!(
            state.get_parsed::<serde_json::Value>("broken", None),
            [Parsed::Raw("{nope".to_owned())]
        );
        assert_eq!(
            state.get_parsed("missing", Some(3u8)),
            [Parsed::Value(3u8)]
        );
    }

    #[test]
    fn dates() {
        let state = store("d=2024-03-01&d=2024-03-01T12:30:00Z&d=2024-03-01T12:30:00&d=nope");
        let midnight = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let noon = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(
            state.get_datetime("d", None),
            [
                Parsed::Value(midnight),
                Parsed::Value(noon),
                Parsed::Value(noon),
                Parsed::Raw("nope".to_owned()),
            ]
        );
        assert_eq!(
            state.get_timestamp("d", None),
            [midnight.timestamp_millis(), noon.timestamp_millis(), noon.timestamp_millis()]
        );
    }

    #[test]
    fn datetime_with_offset() {
        let parsed = parse_datetime("2024-03-01T14:30:00+02:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap());
        assert!(matches!(parse_datetime("03/01/2024"), Err(Error::DateTime(_))));
    }

    #[test]
    fn entries_keep_the_last_value() {
        let state = store("a=x,y&b=1&a=z,w");
        let entries = state.entries();
        assert_eq!(entries.keys().collect::<Vec<_>>(), ["a", "b"]);
        assert_eq!(entries["a"], "z,w");
        assert_eq!(state.get("a", None), ["x,y", "z,w"]);
    }

    #[test]
    fn remove_pushes() {
        let mut pushed = Vec::new();
        let mut state = QueryState::new("a=1&b=2", |s: &str| pushed.push(s.to_owned()));
        assert!(state.has("a"));
        state.remove("a");
        assert!(!state.has("a"));
        assert_eq!(state.entries().len(), 1);
        drop(state);
        assert_eq!(pushed, ["b=2"]);
    }
}
