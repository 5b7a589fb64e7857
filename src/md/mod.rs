//! A line-oriented Markdown dialect, compiled into a [`Document`].
//!
//! Each line (or run of lines) is matched against the block forms in priority order: headings, rules (or frontmatter,
//! if nothing has been written yet), fenced code, lists, blockquotes, and finally paragraphs. This is not CommonMark.

mod blocks;
mod inlines;
mod lists;

use crate::dom::Document;
use crate::error::Result;

/// Compiles Markdown into a new document. Blocks go into the `<body>`; frontmatter goes into the `<head>` as `<meta>`
/// elements.
///
/// ```
/// use markq::output::WriterOptions;
///
/// let doc = markq::md::compile("# Hello\n\nworld").unwrap();
/// let html = doc.body().children(true).unwrap().render(&WriterOptions::default()).unwrap();
/// assert_eq!(html, "<h1>Hello</h1>\n<p>world</p>\n");
/// ```
pub fn compile(markdown: &str) -> Result<Document> {
    let doc = blocks::BlockCompiler::new(markdown).compile()?;
    tracing::debug!("compiled markdown into {} nodes", doc.node_count());
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::WriterOptions;
    use crate::util::utils_for_test::*;
    use indoc::indoc;

    fn body_html(markdown: &str) -> String {
        let doc = compile(markdown).unwrap();
        let body = doc.body().children(true).unwrap();
        body.render(&WriterOptions::default()).unwrap()
    }

    #[test]
    fn empty_input() {
        let doc = compile("").unwrap();
        assert_eq!(doc.node_count(), 3);
        assert_eq!(body_html("\n  \n"), "");
    }

    #[test]
    fn headings_and_paragraphs() {
        let md = indoc! {"
            # Title

            Some *text*.
            ###### Small
            ####### not a heading
        "};
        assert_eq!(
            body_html(md),
            indoc! {"
                <h1>Title</h1>
                <p>Some <em>text</em>.</p>
                <h6>Small</h6>
                <p>####### not a heading</p>
            "}
        );
    }

    #[test]
    fn checklist() {
        let md = indoc! {"
            [x] Checked
            [ ] Not checked
            [] Not checked
        "};
        assert_eq!(
            body_html(md),
            indoc! {r#"
                <ul class="checklist">
                  <li><input type="checkbox" checked>Checked</li>
                  <li><input type="checkbox">Not checked</li>
                  <li><input type="checkbox">Not checked</li>
                </ul>
            "#}
        );
    }

    #[test]
    fn numeric_renumbering() {
        let doc = compile("1. First\n2. Second\n4. Fourth\n").unwrap();
        let items = doc.select("ol li");
        assert_eq!(items.len(), 3);
        assert_eq!(
            items.get_attribute("value").unwrap().into_vec(),
            vec![None, None, Some("4".to_string())]
        );
    }

    #[test]
    fn frontmatter() {
        let md = indoc! {"
            ---
            title: Hello there
            author :  Someone

            just a note
            ---
        "};
        let doc = compile(md).unwrap();
        assert!(doc.body().children(true).unwrap().is_empty());
        let metas = doc.select("head meta");
        assert_eq!(
            metas.get_attribute("name").unwrap().into_vec(),
            vec![Some("title".to_string()), Some("author".to_string()), None]
        );
        assert_eq!(
            metas.get_attribute("content").unwrap().into_vec(),
            vec![
                Some("Hello there".to_string()),
                Some("Someone".to_string()),
                Some("just a note".to_string())
            ]
        );
    }

    #[test]
    fn rule_after_content() {
        assert_eq!(body_html("para\n---\nmore"), "<p>para</p>\n<hr>\n<p>more</p>\n");
    }

    #[test]
    fn fenced_code() {
        let md = indoc! {"
            ```rust
            fn main() {}
              if a < b {}
            ```
            after
        "};
        let doc = compile(md).unwrap();
        let code = doc.select("pre code");
        assert_eq!(get_only(code.text().unwrap()), "fn main() {}\n  if a < b {}");
        assert_eq!(get_only(code.classname().unwrap()), "language-rust");
        assert_eq!(get_only(doc.select("p").text().unwrap()), "after");
    }

    #[test]
    fn fenced_code_is_not_styled() {
        let doc = compile("```\n**not bold**\n# not a heading\n```").unwrap();
        assert!(doc.select("pre strong").is_empty());
        assert!(doc.select("h1").is_empty());
        assert_eq!(get_only(doc.select("code").classname().unwrap()), "");
    }

    #[test]
    fn unclosed_fence_runs_to_end() {
        let doc = compile("```\none\ntwo").unwrap();
        assert_eq!(get_only(doc.select("code").text().unwrap()), "one\ntwo");
    }

    #[test]
    fn lone_list_item_is_a_paragraph() {
        assert_eq!(body_html("* alone"), "<p>* alone</p>\n");
    }

    #[test]
    fn nested_list() {
        let md = indoc! {"
            * a
              1. b
              2. c
            * d
        "};
        assert_eq!(
            body_html(md),
            indoc! {"
                <ul>
                  <li>a
                    <ol>
                      <li>b</li>
                      <li>c</li>
                    </ol>
                  </li>
                  <li>d</li>
                </ul>
            "}
        );
    }

    #[test]
    fn blockquote_is_not_styled() {
        let doc = compile("> **not bold**\n>second\n\nafter").unwrap();
        let quote = doc.select("blockquote");
        assert_eq!(get_only(quote.text().unwrap()), "**not bold**\nsecond");
        assert!(doc.select("blockquote strong").is_empty());
        assert_eq!(doc.select("p").len(), 1);
    }
}
