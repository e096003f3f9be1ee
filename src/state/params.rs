use std::fmt;

use indexmap::IndexMap;

use crate::de::decode::decode_form;
use crate::ser::encode::encode_form;

/// An ordered multimap of query parameters using
/// `application/x-www-form-urlencoded` rules, as the `URLSearchParams` type
/// on the web does.
///
/// ```
/// use qs_url::SearchParams;
///
/// let mut params = SearchParams::parse("?q=a+b&tag=x&tag=y");
/// assert_eq!(params.get("q"), Some("a b"));
/// assert_eq!(params.get_all("tag"), ["x", "y"]);
///
/// params.append("page", "2");
/// params.delete("tag");
/// assert_eq!(params.to_string(), "q=a+b&page=2");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchParams {
    pairs: Vec<(String, String)>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a query, with or without its leading `?`.
    ///
    /// A pair without `=` gets an empty value.
    pub fn parse(input: &str) -> Self {
        let input = input.strip_prefix('?').unwrap_or(input);
        let pairs = input
            .split('&')
            .filter(|s| !s.is_empty())
            .map(|pair| {
                let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
                (decode_form(name).into_owned(), decode_form(value).into_owned())
            })
            .collect();
        Self { pairs }
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// The first value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn has(&self, name: &str) -> bool {
        self.pairs.iter().any(|(n, _)| n == name)
    }

    /// Removes every pair named `name`.
    pub fn delete(&mut self, name: &str) {
        self.pairs.retain(|(n, _)| n != name);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Collapses the pairs into a map; later values win.
    pub fn to_map(&self) -> IndexMap<String, String> {
        self.pairs.iter().cloned().collect()
    }
}

impl fmt::Display for SearchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (name, value)) in self.pairs.iter().enumerate() {
            if idx > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", encode_form(name), encode_form(value))?;
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SearchParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
