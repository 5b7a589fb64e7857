use crate::dom::encode_entities;
use crate::error::{Error, Result};
use fancy_regex::{Captures, Regex};
use lazy_static::lazy_static;

lazy_static! {
    static ref BOLD_ITALIC: Regex = Regex::new(r"(?<![*\w])\*\*\*(?!\*)(.+?)(?<!\*)\*\*\*(?![*\w])").unwrap();
    static ref BOLD: Regex = Regex::new(r"(?<![*\w])\*\*(?!\*)(.+?)(?<!\*)\*\*(?![*\w])").unwrap();
    static ref ITALIC_STAR: Regex = Regex::new(r"(?<![*\w])\*(?![*\s])(.+?)(?<![*\s])\*(?![*\w])").unwrap();
    static ref ITALIC_UNDERSCORE: Regex = Regex::new(r"(?<![_\w])_(?![_\s])(.+?)(?<![_\s])_(?![_\w])").unwrap();
    static ref CODE: Regex = Regex::new(r"(?<!`)`(?!`)(.+?)(?<!`)`(?!`)").unwrap();
    static ref LINK: Regex = Regex::new(r"\[([^\]]+)\]\(([\w\-.~:/?#@!$&+,;=%]+)\)").unwrap();
}

/// Rewrites the inline Markdown in one line of text into HTML markup.
///
/// The substitutions run in a fixed order (bold italics, bold, italics, code, links), each over the output of the one
/// before. Text outside of those spans is left as it is, so any HTML already in the line passes through.
pub(crate) fn style_inline(text: &str) -> Result<String> {
    let text = replace_all(&BOLD_ITALIC, text, |caps| format!("<strong><em>{}</em></strong>", group(caps, 1)))?;
    let text = replace_all(&BOLD, &text, |caps| format!("<strong>{}</strong>", group(caps, 1)))?;
    let text = replace_all(&ITALIC_STAR, &text, |caps| format!("<em>{}</em>", group(caps, 1)))?;
    let text = replace_all(&ITALIC_UNDERSCORE, &text, |caps| format!("<em>{}</em>", group(caps, 1)))?;
    let text = replace_all(&CODE, &text, |caps| format!("<code>{}</code>", code_span(group(caps, 1))))?;
    replace_all(&LINK, &text, |caps| {
        format!("<a href=\"{}\">{}</a>", group(caps, 2), group(caps, 1))
    })
}

/// Entity-encodes a code span, and turns a single leading or trailing space into a non-breaking one so it survives.
fn code_span(content: &str) -> String {
    let encoded = encode_entities(content);
    let (lead, rest) = match encoded.strip_prefix(' ') {
        Some(rest) => ("&nbsp;", rest),
        None => ("", &*encoded),
    };
    let (rest, trail) = match rest.strip_suffix(' ') {
        Some(rest) => (rest, "&nbsp;"),
        None => (rest, ""),
    };
    format!("{lead}{rest}{trail}")
}

fn group<'t>(caps: &Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map_or("", |m| m.as_str())
}

fn replace_all<F>(regex: &Regex, text: &str, replacement: F) -> Result<String>
where
    F: Fn(&Captures) -> String,
{
    let mut result = String::with_capacity(text.len() + 16);
    let mut last = 0;
    for caps in regex.captures_iter(text) {
        let caps = caps.map_err(|e| Error::InvalidInput(format!("couldn't apply inline style: {e}")))?;
        let Some(whole) = caps.get(0) else {
            continue;
        };
        result.push_str(&text[last..whole.start()]);
        result.push_str(&replacement(&caps));
        last = whole.end();
    }
    result.push_str(&text[last..]);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(input: &str, expect: &str) {
        assert_eq!(style_inline(input).unwrap(), expect, "for {input:?}");
    }

    #[test]
    fn plain() {
        check("nothing to see", "nothing to see");
    }

    #[test]
    fn emphasis() {
        check("***all***", "<strong><em>all</em></strong>");
        check("a **bold** move", "a <strong>bold</strong> move");
        check("an *italic* and _another_", "an <em>italic</em> and <em>another</em>");
    }

    #[test]
    fn emphasis_guards() {
        check("2 * 3 * 4", "2 * 3 * 4");
        check("snake_case_name", "snake_case_name");
        check("a**b**c", "a**b**c");
        check("****", "****");
    }

    #[test]
    fn code() {
        check("run `ls -l` now", "run <code>ls -l</code> now");
        check("`a < b`", "<code>a &lt; b</code>");
        check("` padded `", "<code>&nbsp;padded&nbsp;</code>");
        check("``not code``", "``not code``");
    }

    #[test]
    fn links() {
        check(
            "see [the docs](https://example.com/a?b=c#d)",
            "see <a href=\"https://example.com/a?b=c#d\">the docs</a>",
        );
        check("[bad](javascript:alert(1))", "[bad](javascript:alert(1))");
    }

    #[test]
    fn combined() {
        check("**[x](/y)** and `z`", "<strong><a href=\"/y\">x</a></strong> and <code>z</code>");
    }
}
