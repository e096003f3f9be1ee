use std::cmp::Ordering;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::compose::{self, Filter, ParsedUrl};
use crate::error::{Error, Result};
use crate::value::ParsedQuery;

/// Configuration for parsing and stringifying query strings.
///
/// `Config` is a small `Copy` value built with chained methods, starting
/// from [`Config::new`]. The defaults are:
///
/// - `decode = true`, `encode = true`, `strict = true`
/// - `sort = Sort::Lexicographic`
/// - `array_format = ArrayFormat::None`, separator `,`
/// - `parse_numbers`, `parse_booleans`, `parse_fragment_identifier`,
///   `skip_null` and `skip_empty_string` all `false`
///
/// ```
/// use qs_url::{ArrayFormat, Config};
///
/// let config = Config::new().array_format(ArrayFormat::Bracket);
/// let query = config.parse("a[]=1&a[]=2&b=3");
/// assert_eq!(config.stringify(&query).unwrap(), "a[]=1&a[]=2&b=3");
/// ```
///
/// The separator used by the `comma`, `separator` and `bracket-separator`
/// formats must be a single character. This is checked when it is set, so a
/// `Config` can never carry an invalid separator into a parse or stringify:
///
/// ```
/// use qs_url::Config;
///
/// assert!(Config::new().array_format_separator("|").is_ok());
/// assert!(Config::new().array_format_separator("||").is_err());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub(crate) decode: bool,
    pub(crate) encode: bool,
    pub(crate) strict: bool,
    pub(crate) sort: Sort,
    pub(crate) array_format: ArrayFormat,
    pub(crate) separator: char,
    pub(crate) parse_numbers: bool,
    pub(crate) parse_booleans: bool,
    // `None` until set, so URL filters can apply their own defaults
    parse_fragment_identifier: Option<bool>,
    pub(crate) skip_null: bool,
    pub(crate) skip_empty_string: bool,
    encode_fragment_identifier: Option<bool>,
}

/// How a multi-valued key is written to, and read from, a query string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrayFormat {
    /// Repeat the key: `a=1&a=2`.
    #[default]
    None,
    /// Positional keys: `a[0]=1&a[1]=2`.
    Index,
    /// Empty brackets: `a[]=1&a[]=2`.
    Bracket,
    /// Colon suffix: `a:list=1&a:list=2`.
    ColonListSeparator,
    /// A single field joined by the separator: `a=1,2`.
    Comma,
    /// Same as `Comma`, conventionally used with a custom separator: `a=1|2`.
    Separator,
    /// Empty brackets and a joined field: `a[]=1,2`.
    BracketSeparator,
}

impl ArrayFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            ArrayFormat::None => "none",
            ArrayFormat::Index => "index",
            ArrayFormat::Bracket => "bracket",
            ArrayFormat::ColonListSeparator => "colon-list-separator",
            ArrayFormat::Comma => "comma",
            ArrayFormat::Separator => "separator",
            ArrayFormat::BracketSeparator => "bracket-separator",
        }
    }

    /// Formats that pack several values into one field. Their values are
    /// percent-decoded by the array decoder after splitting, not before.
    pub(crate) const fn joins_values(self) -> bool {
        matches!(
            self,
            ArrayFormat::Comma | ArrayFormat::Separator | ArrayFormat::BracketSeparator
        )
    }
}

impl fmt::Display for ArrayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArrayFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "none" => ArrayFormat::None,
            "index" => ArrayFormat::Index,
            "bracket" => ArrayFormat::Bracket,
            "colon-list-separator" => ArrayFormat::ColonListSeparator,
            "comma" => ArrayFormat::Comma,
            "separator" => ArrayFormat::Separator,
            "bracket-separator" => ArrayFormat::BracketSeparator,
            other => return Err(Error::UnknownArrayFormat(other.to_owned())),
        })
    }
}

/// Key ordering applied by `parse` and `stringify`.
#[derive(Clone, Copy, Debug, Default)]
pub enum Sort {
    /// Keep insertion order.
    Unsorted,
    /// Sort keys by their natural string order.
    #[default]
    Lexicographic,
    /// Sort keys with a custom comparator.
    Custom(fn(&str, &str) -> Ordering),
}

impl Sort {
    pub(crate) fn is_sorted(self) -> bool {
        !matches!(self, Sort::Unsorted)
    }

    pub(crate) fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            Sort::Unsorted => Ordering::Equal,
            Sort::Lexicographic => a.cmp(b),
            Sort::Custom(cmp) => cmp(a, b),
        }
    }
}

impl From<bool> for Sort {
    fn from(sort: bool) -> Self {
        if sort {
            Sort::Lexicographic
        } else {
            Sort::Unsorted
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub const fn new() -> Self {
        Self {
            decode: true,
            encode: true,
            strict: true,
            sort: Sort::Lexicographic,
            array_format: ArrayFormat::None,
            separator: ',',
            parse_numbers: false,
            parse_booleans: false,
            parse_fragment_identifier: None,
            skip_null: false,
            skip_empty_string: false,
            encode_fragment_identifier: None,
        }
    }

    /// Percent-decode keys and values while parsing. Also turns `+` into a
    /// space. Default is `true`.
    pub const fn decode(mut self, decode: bool) -> Self {
        self.decode = decode;
        self
    }

    /// Percent-encode keys and values while stringifying. Default is `true`.
    pub const fn encode(mut self, encode: bool) -> Self {
        self.encode = encode;
        self
    }

    /// When encoding, additionally escape `!`, `'`, `(`, `)` and `*`.
    /// Default is `true`.
    pub const fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub const fn sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub const fn array_format(mut self, array_format: ArrayFormat) -> Self {
        self.array_format = array_format;
        self
    }

    /// Sets the separator for the joined array formats.
    ///
    /// Fails with [`Error::InvalidSeparator`] unless `separator` is exactly
    /// one character from the Basic Multilingual Plane.
    pub fn array_format_separator(mut self, separator: &str) -> Result<Self> {
        // one UTF-16 code unit, so characters outside the BMP are rejected
        match separator.chars().next() {
            Some(c) if separator.encode_utf16().count() == 1 => {
                self.separator = c;
                Ok(self)
            }
            _ => Err(Error::invalid_separator(separator)),
        }
    }

    pub const fn separator(&self) -> char {
        self.separator
    }

    /// Convert numeric values to [`Value::Number`](crate::Value::Number)
    /// while parsing.
    pub const fn parse_numbers(mut self, parse_numbers: bool) -> Self {
        self.parse_numbers = parse_numbers;
        self
    }

    /// Convert `true`/`false` (any case) to [`Value::Bool`](crate::Value::Bool)
    /// while parsing.
    pub const fn parse_booleans(mut self, parse_booleans: bool) -> Self {
        self.parse_booleans = parse_booleans;
        self
    }

    /// Return the URL fragment as `fragment_identifier` from `parse_url`.
    pub const fn parse_fragment_identifier(mut self, parse_fragment_identifier: bool) -> Self {
        self.parse_fragment_identifier = Some(parse_fragment_identifier);
        self
    }

    pub(crate) const fn parses_fragment_identifier(&self) -> bool {
        match self.parse_fragment_identifier {
            Some(parse) => parse,
            None => false,
        }
    }

    pub const fn skip_null(mut self, skip_null: bool) -> Self {
        self.skip_null = skip_null;
        self
    }

    pub const fn skip_empty_string(mut self, skip_empty_string: bool) -> Self {
        self.skip_empty_string = skip_empty_string;
        self
    }

    /// Whether `stringify_url` percent-encodes an explicit fragment
    /// identifier. When disabled the fragment is written as `#` followed by
    /// the raw text. Default is `true`.
    pub const fn encode_fragment_identifier(mut self, encode_fragment_identifier: bool) -> Self {
        self.encode_fragment_identifier = Some(encode_fragment_identifier);
        self
    }

    pub(crate) const fn encodes_fragment_identifier(&self) -> bool {
        match self.encode_fragment_identifier {
            Some(encode) => encode,
            None => true,
        }
    }

    /// Fills in the fragment settings that were never set explicitly.
    pub(crate) const fn fragment_defaults(mut self, parse: bool, encode: bool) -> Self {
        if self.parse_fragment_identifier.is_none() {
            self.parse_fragment_identifier = Some(parse);
        }
        if self.encode_fragment_identifier.is_none() {
            self.encode_fragment_identifier = Some(encode);
        }
        self
    }

    /// Parses a query string using this `Config`.
    ///
    /// `None` is accepted and yields an empty mapping.
    pub fn parse<'a>(&self, query: impl Into<Option<&'a str>>) -> ParsedQuery {
        crate::de::parse(query.into(), self)
    }

    /// Stringifies a parsed query using this `Config`.
    pub fn stringify(&self, query: &ParsedQuery) -> Result<String> {
        // initialize the buffer with 128 bytes
        // this is a guess based on what `serde_json` does
        let mut buffer = Vec::with_capacity(128);
        self.stringify_to_writer(query, &mut buffer)?;
        String::from_utf8(buffer).map_err(Error::from)
    }

    /// Stringifies a parsed query into a writer using this `Config`.
    pub fn stringify_to_writer<W: Write>(&self, query: &ParsedQuery, writer: &mut W) -> Result<()> {
        crate::ser::stringify(query, self, writer)
    }

    pub fn parse_url(&self, url: &str) -> ParsedUrl {
        compose::parse_url(url, self)
    }

    pub fn stringify_url(&self, url: &ParsedUrl) -> Result<String> {
        compose::stringify_url(url, self)
    }

    pub fn pick(&self, url: &str, filter: &Filter) -> Result<String> {
        compose::pick(url, filter, self)
    }

    pub fn exclude(&self, url: &str, filter: &Filter) -> Result<String> {
        compose::exclude(url, filter, self)
    }
}

/// Dynamic configuration, with every field optional.
///
/// Field names follow the camelCase option names used on the web
/// (`arrayFormat`, `skipNull`, ...). Missing fields take the [`Config`]
/// defaults; converting validates the separator.
///
/// ```
/// use qs_url::{Config, Options};
///
/// let options: Options = serde_json::from_str(
///     r#"{ "arrayFormat": "separator", "arrayFormatSeparator": "|" }"#,
/// ).unwrap();
/// let config = Config::try_from(options).unwrap();
/// assert_eq!(config.separator(), '|');
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    pub decode: Option<bool>,
    pub encode: Option<bool>,
    pub strict: Option<bool>,
    pub sort: Option<bool>,
    pub array_format: Option<ArrayFormat>,
    pub array_format_separator: Option<String>,
    pub parse_numbers: Option<bool>,
    pub parse_booleans: Option<bool>,
    pub parse_fragment_identifier: Option<bool>,
    pub skip_null: Option<bool>,
    pub skip_empty_string: Option<bool>,
    pub encode_fragment_identifier: Option<bool>,
}

impl TryFrom<Options> for Config {
    type Error = Error;

    fn try_from(options: Options) -> Result<Self> {
        let defaults = Config::new();
        let mut config = Config {
            decode: options.decode.unwrap_or(defaults.decode),
            encode: options.encode.unwrap_or(defaults.encode),
            strict: options.strict.unwrap_or(defaults.strict),
            sort: options.sort.map_or(defaults.sort, Sort::from),
            array_format: options.array_format.unwrap_or(defaults.array_format),
            parse_numbers: options.parse_numbers.unwrap_or(defaults.parse_numbers),
            parse_booleans: options.parse_booleans.unwrap_or(defaults.parse_booleans),
            parse_fragment_identifier: options.parse_fragment_identifier,
            skip_null: options.skip_null.unwrap_or(defaults.skip_null),
            skip_empty_string: options.skip_empty_string.unwrap_or(defaults.skip_empty_string),
            encode_fragment_identifier: options.encode_fragment_identifier,
            ..defaults
        };
        if let Some(separator) = options.array_format_separator {
            config = config.array_format_separator(&separator)?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn separator_must_be_one_char() {
        assert_eq!(
            Config::new().array_format_separator(";").unwrap().separator(),
            ';'
        );
        assert_eq!(
            Config::new().array_format_separator("é").unwrap().separator(),
            'é'
        );
        for bad in ["", ",,", "ab", "😀"] {
            let err = Config::new().array_format_separator(bad).unwrap_err();
            assert!(matches!(err, Error::InvalidSeparator(ref s) if s == bad));
        }
    }

    #[test]
    fn array_format_names() {
        for format in [
            ArrayFormat::None,
            ArrayFormat::Index,
            ArrayFormat::Bracket,
            ArrayFormat::ColonListSeparator,
            ArrayFormat::Comma,
            ArrayFormat::Separator,
            ArrayFormat::BracketSeparator,
        ] {
            assert_eq!(format.as_str().parse::<ArrayFormat>().unwrap(), format);
            let json = serde_json::to_string(&format).unwrap();
            assert_eq!(json, format!("\"{format}\""));
        }
        assert!(matches!(
            "brackets".parse::<ArrayFormat>(),
            Err(Error::UnknownArrayFormat(_))
        ));
    }

    #[test]
    fn options_merge_over_defaults() {
        let options: Options =
            serde_json::from_str(r#"{"sort": false, "parseNumbers": true, "arrayFormat": "index"}"#)
                .unwrap();
        let config = Config::try_from(options).unwrap();
        assert!(!config.sort.is_sorted());
        assert!(config.parse_numbers);
        assert!(config.decode);
        assert_eq!(config.array_format, ArrayFormat::Index);
        assert_eq!(config.separator, ',');
    }

    #[test]
    fn options_reject_bad_separator() {
        let options = Options {
            array_format_separator: Some(",;".into()),
            ..Default::default()
        };
        assert!(matches!(
            Config::try_from(options),
            Err(Error::InvalidSeparator(_))
        ));
    }
}
