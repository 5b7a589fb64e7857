use std::borrow::Cow;

/// HTML-entity-encodes `&`, `<`, `>`, both quote characters, and the non-breaking space.
///
/// Encoding is not idempotent: encoding `&amp;` again yields `&amp;amp;`.
pub fn encode_entities(text: &str) -> Cow<'_, str> {
    encode_with(text, |ch| match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        '\u{a0}' => Some("&nbsp;"),
        _ => None,
    })
}

/// Escapes just enough for a double-quoted attribute value.
pub(crate) fn encode_attribute(value: &str) -> Cow<'_, str> {
    encode_with(value, |ch| match ch {
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    })
}

fn encode_with<F>(text: &str, replacement: F) -> Cow<'_, str>
where
    F: Fn(char) -> Option<&'static str>,
{
    let Some(first) = text.char_indices().find(|(_, ch)| replacement(*ch).is_some()) else {
        return Cow::Borrowed(text);
    };
    let mut out = String::with_capacity(text.len() + 16);
    out.push_str(&text[..first.0]);
    for ch in text[first.0..].chars() {
        match replacement(ch) {
            Some(entity) => out.push_str(entity),
            None => out.push(ch),
        }
    }
    Cow::Owned(out)
}
