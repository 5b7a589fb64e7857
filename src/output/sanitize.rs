use fancy_regex::Regex;
use lazy_static::lazy_static;
use std::borrow::Cow;

lazy_static! {
    static ref SCHEME: Regex = Regex::new(r"^([A-Za-z][A-Za-z0-9+.\-]*):").unwrap();
}

const SAFE_SCHEMES: &[&str] = &["http", "https", "ftp"];

pub(crate) fn strip_nul(text: &str) -> Cow<'_, str> {
    if memchr::memchr(0, text.as_bytes()).is_none() {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.replace('\0', ""))
    }
}

/// Whether a link target is relative, or uses one of a few known-harmless schemes.
///
/// Browsers ignore tabs and newlines inside a scheme, and leading whitespace before it, so `java\tscript:` has to be
/// seen as `javascript:`.
pub(crate) fn is_safe_url(url: &str) -> bool {
    let cleaned: String = url
        .trim_start()
        .chars()
        .filter(|ch| !matches!(ch, '\t' | '\n' | '\r' | '\0'))
        .collect();
    match SCHEME.captures(&cleaned) {
        Ok(None) => true,
        Ok(Some(captures)) => captures
            .get(1)
            .is_some_and(|scheme| SAFE_SCHEMES.iter().any(|safe| scheme.as_str().eq_ignore_ascii_case(safe))),
        Err(err) => {
            tracing::debug!("treating {url:?} as unsafe: {err}");
            false
        }
    }
}

/// The attributes of `tag` that survive sanitizing, with NULs removed from their values.
pub(crate) fn kept_attribute(tag: &str, name: &str, value: &str) -> Option<String> {
    let name = name.to_ascii_lowercase();
    match (tag, name.as_str()) {
        ("a", "href") if is_safe_url(value) => Some(strip_nul(value).into_owned()),
        ("a", "name") | ("img", "src") => Some(strip_nul(value).into_owned()),
        _ => None,
    }
}
