use std::borrow::Cow;

/// Replaces every space with `+`, borrowing when there is none.
pub fn replace_space(input: &str) -> Cow<'_, str> {
    match input.as_bytes().iter().position(|&b| b == b' ') {
        None => Cow::Borrowed(input),
        Some(first_position) => {
            let mut replaced = String::with_capacity(input.len());
            replaced.push_str(&input[..first_position]);
            for c in input[first_position..].chars() {
                replaced.push(if c == ' ' { '+' } else { c });
            }
            Cow::Owned(replaced)
        }
    }
}

/// Splits `input` at the first `separator`, returning the text before it and
/// the text after it (if the separator was found).
pub fn split_on_first(input: &str, separator: char) -> (&str, Option<&str>) {
    match input.split_once(separator) {
        Some((before, after)) => (before, Some(after)),
        None => (input, None),
    }
}
