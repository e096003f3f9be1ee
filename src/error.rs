use std::io;
use std::str;
use std::string;

use thiserror::Error;

/// Errors surfaced by the codec and the query state store.
///
/// Only configuration problems and failures of the underlying writer are
/// returned from [`parse`](crate::parse) and [`stringify`](crate::stringify).
/// Malformed input never fails: individual values fall back to their raw text.
#[derive(Debug, Error)]
pub enum Error {
    /// The array format separator was not exactly one character.
    #[error("arrayFormatSeparator must be single character string, got {0:?}")]
    InvalidSeparator(String),

    #[error("unknown array format `{0}`")]
    UnknownArrayFormat(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Utf8(#[from] str::Utf8Error),

    #[error(transparent)]
    FromUtf8(#[from] string::FromUtf8Error),

    #[error("json transform failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid date-time `{0}`")]
    DateTime(String),

    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Generate the configuration error for a bad array format separator.
    pub fn invalid_separator<T: Into<String>>(separator: T) -> Self {
        Error::InvalidSeparator(separator.into())
    }

    pub fn custom<T: std::fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
