//! Query string parsing and stringifying, with URL composition
//!
//! Query strings have no formal definition for multi-valued keys, and
//! different servers and frameworks write sequences in different ways. This
//! library parses a query string into an ordered [`ParsedQuery`] and writes
//! one back, with the sequence syntax chosen by an [`ArrayFormat`]:
//!
//! | format                 | `{a: ["1", "2"]}`     |
//! |------------------------|-----------------------|
//! | `None` (the default)   | `a=1&a=2`             |
//! | `Index`                | `a[0]=1&a[1]=2`       |
//! | `Bracket`              | `a[]=1&a[]=2`         |
//! | `ColonListSeparator`   | `a:list=1&a:list=2`   |
//! | `Comma`                | `a=1,2`               |
//! | `Separator`            | `a=1|2` (with `|`)    |
//! | `BracketSeparator`     | `a[]=1|2` (with `|`)  |
//!
//! Values are left as strings unless number or boolean coercion is
//! enabled on the [`Config`]. A key without `=` parses to [`Value::Null`].
//!
//! On top of the codec sit helpers to split a URL into base, query and
//! fragment ([`parse_url`]), merge a query back into a URL
//! ([`stringify_url`]) and filter the query of a URL ([`pick`],
//! [`exclude`]).
//!
//! Finally, [`QueryState`] and [`UrlState`] provide a small state store
//! backed by the query (or fragment) of a URL.
//!
//! ## Usage
//!
//! ```
//! use qs_url::{ArrayFormat, Config, Value};
//!
//! let query = qs_url::parse("?b=2&a=1&a=x%20y&flag");
//! assert_eq!(query["a"], Value::from(vec!["1", "x y"]));
//! assert_eq!(query["flag"], Value::Null);
//! assert_eq!(query.keys().collect::<Vec<_>>(), ["a", "b", "flag"]);
//!
//! let config = Config::new()
//!     .array_format(ArrayFormat::Comma)
//!     .parse_numbers(true);
//! let query = config.parse("ids=1,2,3&page=3");
//! assert_eq!(query["ids"], Value::from(vec![1.0, 2.0, 3.0]));
//! assert_eq!(query["page"], Value::Number(3.0));
//! assert_eq!(config.stringify(&query).unwrap(), "ids=1,2,3&page=3");
//! ```
//!
//! Working with URLs:
//!
//! ```
//! use qs_url::{Config, Filter};
//!
//! let parsed = Config::new()
//!     .parse_fragment_identifier(true)
//!     .parse_url("https://x.test/p?a=1#frag");
//! assert_eq!(parsed.url, "https://x.test/p");
//! assert_eq!(parsed.fragment_identifier.as_deref(), Some("frag"));
//!
//! let url = qs_url::pick("https://x.test?a=1&b=2", &Filter::from(["a"])).unwrap();
//! assert_eq!(url, "https://x.test?a=1");
//! ```

mod compose;
mod config;
mod de;
mod error;
mod ser;
mod state;
mod utils;
mod value;

#[doc(inline)]
pub use compose::{Filter, ParsedUrl, extract};
#[doc(inline)]
pub use config::{ArrayFormat, Config, Options, Sort};
#[doc(inline)]
pub use de::parse_number;
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use state::{
    Codec, History, JsonCodec, Parsed, Push, QueryState, SearchParams, UrlParts, UrlPush,
    UrlState, parse_datetime,
};
#[doc(inline)]
pub use value::{ParsedQuery, Value};

/// Parses a query string with the default [`Config`].
///
/// A leading `?`, `#` or `&` is ignored. `None` and blank input give an
/// empty mapping.
pub fn parse<'a>(query: impl Into<Option<&'a str>>) -> ParsedQuery {
    Config::new().parse(query)
}

/// Stringifies a query with the default [`Config`].
///
/// ```
/// use qs_url::{ParsedQuery, Value};
///
/// let mut query = ParsedQuery::new();
/// query.insert("b".into(), Value::from(2i64));
/// query.insert("a".into(), Value::from(1i64));
/// assert_eq!(qs_url::stringify(&query).unwrap(), "a=1&b=2");
/// ```
pub fn stringify(query: &ParsedQuery) -> Result<String> {
    Config::new().stringify(query)
}

/// Splits a URL into its base, query and fragment with the default
/// [`Config`]. The fragment is only kept when
/// [`Config::parse_fragment_identifier`] is enabled.
pub fn parse_url(url: &str) -> ParsedUrl {
    Config::new().parse_url(url)
}

/// Writes a [`ParsedUrl`] back out with the default [`Config`].
///
/// Entries already present in the query of `url` are kept in place and
/// overridden by those in `query`.
pub fn stringify_url(url: &ParsedUrl) -> Result<String> {
    Config::new().stringify_url(url)
}

/// Keeps the query entries of `url` matched by `filter`.
pub fn pick(url: &str, filter: &Filter) -> Result<String> {
    Config::new().pick(url, filter)
}

/// Drops the query entries of `url` matched by `filter`.
pub fn exclude(url: &str, filter: &Filter) -> Result<String> {
    Config::new().exclude(url, filter)
}
