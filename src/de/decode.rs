use std::borrow::Cow;
use std::str::Utf8Error;

use percent_encoding::percent_decode_str;

#[inline(always)]
fn char_to_digit(c: u8) -> Option<u32> {
    char::from(c).to_digit(16)
}

/// Percent-decodes a single key or value.
///
/// Returns an error if the decoded bytes are not valid UTF-8. Incomplete or
/// non-hex escapes such as `%G1` are left as they are.
pub fn try_decode_component(input: &str) -> Result<Cow<'_, str>, Utf8Error> {
    percent_decode_str(input).decode_utf8()
}

/// Percent-decodes a component, falling back to the raw input when the
/// result would not be valid UTF-8.
///
/// This is the decoding used by the query codec: one malformed parameter
/// must not prevent the rest of the query from parsing.
pub fn decode_component(input: &str) -> Cow<'_, str> {
    match try_decode_component(input) {
        Ok(decoded) => decoded,
        Err(err) => {
            tracing::debug!(input, %err, "percent-decoding failed, keeping the raw value");
            Cow::Borrowed(input)
        }
    }
}

/// Decodes `application/x-www-form-urlencoded` text, applying the following:
/// - Replaces `+` with a space
/// - Decodes percent-encoded characters
/// - Converts the result to a UTF-8 string, replacing invalid sequences
///
/// Invalid percent escapes are kept verbatim.
pub fn decode_form(input: &str) -> Cow<'_, str> {
    let bytes = input.as_bytes();
    if !bytes.iter().any(|&b| b == b'+' || b == b'%') {
        return Cow::Borrowed(input);
    }

    let mut decoded = Vec::with_capacity(bytes.len());
    let mut idx = 0;

    while idx < bytes.len() {
        match bytes[idx] {
            b'+' => {
                decoded.push(b' ');
                idx += 1;
            }
            b'%' => {
                let hex = bytes
                    .get(idx + 1)
                    .and_then(|&h| char_to_digit(h))
                    .zip(bytes.get(idx + 2).and_then(|&l| char_to_digit(l)));
                match hex {
                    Some((h, l)) => {
                        decoded.push(h as u8 * 0x10 + l as u8);
                        idx += 3;
                    }
                    None => {
                        // not a valid escape, keep the `%` as is
                        decoded.push(b'%');
                        idx += 1;
                    }
                }
            }
            b => {
                decoded.push(b);
                idx += 1;
            }
        }
    }

    Cow::Owned(String::from_utf8_lossy(&decoded).into_owned())
}
