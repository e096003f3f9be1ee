use url::Url;

use crate::error::Result;

use super::{Codec, JsonCodec, Push, QueryState};

/// Records the new location after the URL model changes.
pub trait History {
    fn replace_state(&mut self, href: &str);
}

impl<F: FnMut(&str)> History for F {
    fn replace_state(&mut self, href: &str) {
        self(href)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Part {
    Query,
    Fragment,
}

/// Writes a serialized [`QueryState`] back into one part of a
/// [`UrlState`]'s model and records the result.
#[derive(Debug)]
pub struct UrlPush<'a, H> {
    model: &'a mut Url,
    history: &'a mut H,
    part: Part,
}

impl<H: History> Push for UrlPush<'_, H> {
    fn push(&mut self, serialized: &str) {
        let serialized = Some(serialized).filter(|s| !s.is_empty());
        match self.part {
            Part::Query => self.model.set_query(serialized),
            Part::Fragment => self.model.set_fragment(serialized),
        }
        tracing::trace!(href = self.model.as_str(), "replacing history state");
        self.history.replace_state(self.model.as_str());
    }
}

/// A URL whose query and fragment are each used as a [`QueryState`].
///
/// ```
/// use qs_url::UrlState;
///
/// let mut visited = Vec::new();
/// let mut state = UrlState::new("https://app.example.com/a/b?page=1", |href: &str| {
///     visited.push(href.to_owned())
/// })?;
/// state.search().set("sort", "asc");
/// state.hash().set("tab", "info");
/// assert_eq!(state.url().href(), "https://app.example.com/a/b?page=1&sort=asc#tab=info");
/// drop(state);
/// assert_eq!(visited.len(), 2);
/// # Ok::<(), qs_url::Error>(())
/// ```
#[derive(Debug)]
pub struct UrlState<H, C = JsonCodec> {
    model: Url,
    history: H,
    codec: C,
    debug: bool,
}

impl<H: History> UrlState<H> {
    pub fn new(href: &str, history: H) -> Result<Self> {
        Self::with_codec(href, history, JsonCodec)
    }
}

impl<H: History, C: Codec + Clone> UrlState<H, C> {
    pub fn with_codec(href: &str, history: H, codec: C) -> Result<Self> {
        Ok(Self {
            model: Url::parse(href)?,
            history,
            codec,
            debug: false,
        })
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn url(&self) -> UrlParts<'_> {
        UrlParts::new(&self.model)
    }

    /// The query parameters of the URL.
    pub fn search(&mut self) -> QueryState<UrlPush<'_, H>, C> {
        let query = self.model.query().unwrap_or_default().to_owned();
        self.state(query, Part::Query)
    }

    /// The fragment of the URL, read as query parameters.
    pub fn hash(&mut self) -> QueryState<UrlPush<'_, H>, C> {
        let fragment = self.model.fragment().unwrap_or_default().to_owned();
        self.state(fragment, Part::Fragment)
    }

    fn state(&mut self, input: String, part: Part) -> QueryState<UrlPush<'_, H>, C> {
        let push = UrlPush {
            model: &mut self.model,
            history: &mut self.history,
            part,
        };
        QueryState::with_codec(&input, push, self.codec.clone()).debug(self.debug)
    }
}

/// Read-only accessors over the parts of a URL.
#[derive(Clone, Copy, Debug)]
pub struct UrlParts<'a> {
    url: &'a Url,
}

impl<'a> UrlParts<'a> {
    pub fn new(url: &'a Url) -> Self {
        Self { url }
    }

    fn labels(&self) -> Vec<&'a str> {
        self.url.host_str().unwrap_or_default().split('.').collect()
    }

    /// The scheme without its trailing `:`.
    pub fn scheme(&self) -> &'a str {
        self.url.scheme()
    }

    pub fn host(&self) -> &'a str {
        self.url.host_str().unwrap_or_default()
    }

    /// Every host label before the domain.
    pub fn subdomain(&self) -> Vec<&'a str> {
        let mut labels = self.labels();
        labels.truncate(labels.len().saturating_sub(2));
        labels
    }

    /// The second-to-last host label.
    pub fn domain(&self) -> Option<&'a str> {
        let labels = self.labels();
        labels.len().checked_sub(2).map(|idx| labels[idx])
    }

    /// The last host label.
    pub fn tld(&self) -> Option<&'a str> {
        self.labels().last().copied()
    }

    /// The explicit port; `None` for the scheme's default.
    pub fn port(&self) -> Option<u16> {
        self.url.port()
    }

    pub fn path(&self) -> &'a str {
        self.url.path()
    }

    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    /// The fragment without its leading `#`.
    pub fn fragment(&self) -> &'a str {
        self.url.fragment().unwrap_or_default()
    }

    /// The query with its leading `?`, or an empty string.
    pub fn query(&self) -> String {
        match self.url.query() {
            Some(query) if !query.is_empty() => format!("?{query}"),
            _ => String::new(),
        }
    }

    pub fn href(&self) -> &'a str {
        self.url.as_str()
    }

    /// The non-empty segments of the path.
    pub fn directories(&self) -> Vec<&'a str> {
        self.url.path().split('/').filter(|s| !s.is_empty()).collect()
    }
}
