use std::borrow::Cow;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// The set of characters escaped by `encodeURIComponent`.
///
/// Everything except ASCII alphanumerics and `-_.!~*'()` is escaped.
const COMPONENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Strict encoding additionally escapes `!'()*`, which RFC 3986 reserves as
/// sub-delimiters.
const STRICT_SET: &AsciiSet = &COMPONENT_SET
    .add(b'!')
    .add(b'\'')
    .add(b'(')
    .add(b')')
    .add(b'*');

/// As defined in https://url.spec.whatwg.org/#fragment-percent-encode-set
///
/// C0 controls, SPACE, U+0022 ("), U+003C (<), U+003E (>) and U+0060 (`).
const FRAGMENT_SET: &AsciiSet = &percent_encoding::CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`');

/// As defined in https://url.spec.whatwg.org/#application-x-www-form-urlencoded-percent-encode-set
///
/// The application/x-www-form-urlencoded percent-encode set contains all code points, except the ASCII alphanumeric,
/// U+002A (*), U+002D (-), U+002E (.), and U+005F (_).
///
/// Spaces are left alone here and later replaced with `+`.
const FORM_URLENCODED_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b' ')
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_');

/// Percent-encodes a key or value.
///
/// The function returns a `Cow` to avoid allocations when no encoding is needed.
pub fn encode_component(value: &str, strict: bool) -> Cow<'_, str> {
    let set = if strict { STRICT_SET } else { COMPONENT_SET };
    Cow::from(utf8_percent_encode(value, set))
}

/// Percent-encodes a fragment identifier as the `hash` setter of a URL does,
/// dropping a single leading `#`. Returns the `#`-prefixed hash, or an empty
/// string when there is no fragment left.
pub fn encode_fragment(fragment: &str) -> String {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    if fragment.is_empty() {
        return String::new();
    }
    format!("#{}", utf8_percent_encode(fragment, FRAGMENT_SET))
}

/// Encodes `application/x-www-form-urlencoded` text: spaces become `+`.
pub fn encode_form(value: &str) -> Cow<'_, str> {
    match Cow::from(utf8_percent_encode(value, FORM_URLENCODED_SET)) {
        Cow::Borrowed(s) => crate::utils::replace_space(s),
        Cow::Owned(s) => Cow::Owned(crate::utils::replace_space(&s).into_owned()),
    }
}
