//! Splitting URLs into base, query and fragment, and putting them back
//! together.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{Config, Sort};
use crate::de::decode::decode_component;
use crate::error::Result;
use crate::ser::encode::encode_fragment;
use crate::utils::split_on_first;
use crate::value::{ParsedQuery, Value};

/// A URL split into its base, parsed query and optional fragment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedUrl {
    /// Everything before the query and fragment.
    pub url: String,
    pub query: ParsedQuery,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fragment_identifier: Option<String>,
}

impl ParsedUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// Chooses the query entries kept by [`pick`](crate::pick) and dropped by
/// [`exclude`](crate::exclude).
pub enum Filter {
    /// Keep the listed keys.
    Keys(Vec<String>),
    /// Keep the entries for which the predicate returns `true`.
    Predicate(Box<dyn Fn(&str, &Value) -> bool>),
}

impl Filter {
    pub fn keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::Keys(keys.into_iter().map(Into::into).collect())
    }

    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&str, &Value) -> bool + 'static,
    {
        Filter::Predicate(Box::new(predicate))
    }

    pub fn matches(&self, key: &str, value: &Value) -> bool {
        match self {
            Filter::Keys(keys) => keys.iter().any(|k| k == key),
            Filter::Predicate(predicate) => predicate(key, value),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Keys(keys) => f.debug_tuple("Keys").field(keys).finish(),
            Filter::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Filter {
    fn from(keys: [S; N]) -> Self {
        Filter::keys(keys)
    }
}

impl From<Vec<String>> for Filter {
    fn from(keys: Vec<String>) -> Self {
        Filter::Keys(keys)
    }
}

fn remove_hash(input: &str) -> &str {
    split_on_first(input, '#').0
}

/// The `#`-prefixed fragment of `url`, or an empty string.
fn get_hash(url: &str) -> &str {
    url.find('#').map_or("", |start| &url[start..])
}

/// Returns the query part of a URL: the text after the first `?` and
/// before the first `#`.
pub fn extract(url: &str) -> &str {
    let url = remove_hash(url);
    url.split_once('?').map_or("", |(_, query)| query)
}

pub fn parse_url(url: &str, config: &Config) -> ParsedUrl {
    let (base, hash) = split_on_first(url, '#');
    let fragment_identifier = match hash {
        Some(hash) if config.parses_fragment_identifier() && !hash.is_empty() => {
            Some(if config.decode {
                decode_component(hash).into_owned()
            } else {
                hash.to_owned()
            })
        }
        _ => None,
    };

    ParsedUrl {
        url: split_on_first(base, '?').0.to_owned(),
        query: config.parse(extract(url)),
        fragment_identifier,
    }
}

pub fn stringify_url(parsed: &ParsedUrl, config: &Config) -> Result<String> {
    let url = split_on_first(remove_hash(&parsed.url), '?').0;

    // the query already embedded in `url` is merged under the explicit one
    let mut query = Config::new().sort(Sort::Unsorted).parse(extract(&parsed.url));
    for (key, value) in &parsed.query {
        query.insert(key.clone(), value.clone());
    }

    let query_string = config.stringify(&query)?;

    let hash = match &parsed.fragment_identifier {
        Some(fragment) if config.encodes_fragment_identifier() => encode_fragment(fragment),
        Some(fragment) => format!("#{fragment}"),
        None => get_hash(&parsed.url).to_owned(),
    };

    let mut output = String::with_capacity(url.len() + query_string.len() + hash.len() + 1);
    output.push_str(url);
    if !query_string.is_empty() {
        output.push('?');
        output.push_str(&query_string);
    }
    output.push_str(&hash);
    Ok(output)
}

/// Keeps the query entries matching `filter`.
///
/// Unless `config` says otherwise, the fragment is parsed and written back
/// as it was decoded, without percent-encoding it again.
pub fn pick(url: &str, filter: &Filter, config: &Config) -> Result<String> {
    filter_url(url, config, |key, value| filter.matches(key, value))
}

/// Drops the query entries matching `filter`.
pub fn exclude(url: &str, filter: &Filter, config: &Config) -> Result<String> {
    filter_url(url, config, |key, value| !filter.matches(key, value))
}

fn filter_url(url: &str, config: &Config, keep: impl Fn(&str, &Value) -> bool) -> Result<String> {
    let config = config.fragment_defaults(true, false);
    let ParsedUrl {
        url,
        query,
        fragment_identifier,
    } = config.parse_url(url);

    let query: ParsedQuery = query
        .into_iter()
        .filter(|(key, value)| keep(key, value))
        .collect();

    config.stringify_url(&ParsedUrl {
        url,
        query,
        fragment_identifier,
    })
}
