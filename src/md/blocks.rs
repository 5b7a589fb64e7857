use crate::dom::Document;
use crate::error::{Error, Result};
use crate::md::inlines::style_inline;
use crate::md::lists::{build_list, ListRecord};
use crate::select::{AppendOptions, Content, Elements};
use fancy_regex::{Captures, Regex};
use lazy_static::lazy_static;
use std::collections::VecDeque;

lazy_static! {
    static ref HEADING: Regex = Regex::new(r"^(#{1,6})\s+(.*?)\s*$").unwrap();
    static ref RULE: Regex = Regex::new(r"^---\s*$").unwrap();
    static ref FENCE_OPEN: Regex = Regex::new(r"^\s*```\s*([\w+#.\-]*)\s*$").unwrap();
    static ref FENCE_CLOSE: Regex = Regex::new(r"^\s*```\s*$").unwrap();
    static ref LIST_ITEM: Regex =
        Regex::new(r"^(\s*)([*+]|\d+\.|[a-z]+\.|[A-Z]+\.|\[[ xX]?\])\s+(.*?)\s*$").unwrap();
    static ref QUOTE: Regex = Regex::new(r"^\s*>\s?(.*)$").unwrap();
    static ref FRONTMATTER_ENTRY: Regex = Regex::new(r"^\s*([\w\-]+)\s*:\s*(.*?)\s*$").unwrap();
}

/// Consumes Markdown lines from the front of a queue, adding one block to the document per step.
pub(crate) struct BlockCompiler {
    doc: Document,
    body: Elements,
    lines: VecDeque<String>,
}

impl BlockCompiler {
    pub(crate) fn new(markdown: &str) -> Self {
        let doc = Document::new();
        let body = doc.body();
        Self {
            doc,
            body,
            lines: markdown.lines().map(str::to_string).collect(),
        }
    }

    pub(crate) fn compile(mut self) -> Result<Document> {
        while let Some(line) = self.lines.pop_front() {
            if line.trim().is_empty() {
                continue;
            }
            self.block(line)?;
        }
        Ok(self.doc)
    }

    fn block(&mut self, line: String) -> Result<()> {
        if let Some(caps) = captures(&HEADING, &line)? {
            let level = group(&caps, 1).len();
            tracing::trace!("h{level}: {line:?}");
            let heading = self.body.append_new(&format!("h{level}"))?;
            return append_styled(&heading, group(&caps, 2));
        }
        if matches(&RULE, &line)? {
            return if self.body.children(true)?.is_empty() {
                tracing::trace!("frontmatter");
                self.frontmatter()
            } else {
                tracing::trace!("rule");
                self.body.append_new("hr").map(|_| ())
            };
        }
        if let Some(caps) = captures(&FENCE_OPEN, &line)? {
            let language = group(&caps, 1).to_string();
            tracing::trace!("fenced code ({language:?})");
            return self.fence(&language);
        }
        if let Some(first) = list_record(&line)? {
            let mut run = VecDeque::from([first]);
            while let Some(next) = self.lines.front() {
                let Some(record) = list_record(next)? else {
                    break;
                };
                run.push_back(record);
                self.lines.pop_front();
            }
            if run.len() > 1 {
                tracing::trace!("list of {} items", run.len());
                while !run.is_empty() {
                    build_list(&self.body, &mut run)?;
                }
                return Ok(());
            }
            tracing::trace!("lone list item, as paragraph: {line:?}");
        } else if let Some(caps) = captures(&QUOTE, &line)? {
            let mut quoted = vec![group(&caps, 1).to_string()];
            while let Some(next) = self.lines.front() {
                let quoted_line = match captures(&QUOTE, next)? {
                    Some(caps) => group(&caps, 1).to_string(),
                    None => break,
                };
                quoted.push(quoted_line);
                self.lines.pop_front();
            }
            tracing::trace!("blockquote of {} lines", quoted.len());
            let quote = self.body.append_new("blockquote")?;
            quote.append(Content::Text(&quoted.join("\n")), AppendOptions::default())?;
            return Ok(());
        }
        tracing::trace!("paragraph: {line:?}");
        let paragraph = self.body.append_new("p")?;
        append_styled(&paragraph, line.trim())
    }

    /// Reads `key: value` lines up to the closing rule into `<meta>` elements in the head.
    fn frontmatter(&mut self) -> Result<()> {
        let head = self.doc.head();
        while let Some(line) = self.lines.pop_front() {
            if matches(&RULE, &line)? {
                break;
            }
            if line.trim().is_empty() {
                continue;
            }
            let meta = head.append_new("meta")?;
            match captures(&FRONTMATTER_ENTRY, &line)? {
                Some(caps) => {
                    meta.set_attribute("name", group(&caps, 1))?;
                    meta.set_attribute("content", group(&caps, 2))?;
                }
                None => {
                    meta.set_attribute("content", line.trim())?;
                }
            }
        }
        Ok(())
    }

    fn fence(&mut self, language: &str) -> Result<()> {
        let mut code_lines = Vec::new();
        while let Some(line) = self.lines.pop_front() {
            if matches(&FENCE_CLOSE, &line)? {
                break;
            }
            code_lines.push(line.trim_end().to_string());
        }
        let code = self.body.append_new("pre")?.append_new("code")?;
        if !language.is_empty() {
            code.set_attribute("class", &format!("language-{language}"))?;
        }
        code.append(Content::Text(&code_lines.join("\n")), AppendOptions::default())?;
        Ok(())
    }
}

fn list_record(line: &str) -> Result<Option<ListRecord>> {
    Ok(captures(&LIST_ITEM, line)?.map(|caps| ListRecord {
        indent: indent_width(group(&caps, 1)),
        marker: group(&caps, 2).to_string(),
        text: group(&caps, 3).to_string(),
    }))
}

/// Tabs count as four columns.
fn indent_width(whitespace: &str) -> usize {
    whitespace.chars().map(|ch| if ch == '\t' { 4 } else { 1 }).sum()
}

fn append_styled(target: &Elements, text: &str) -> Result<()> {
    let styled = style_inline(text)?;
    target.append(Content::Text(&styled), AppendOptions::markup())?;
    Ok(())
}

fn matches(regex: &Regex, line: &str) -> Result<bool> {
    regex.is_match(line).map_err(regex_error)
}

fn captures<'t>(regex: &Regex, line: &'t str) -> Result<Option<Captures<'t>>> {
    regex.captures(line).map_err(regex_error)
}

fn group<'t>(caps: &Captures<'t>, index: usize) -> &'t str {
    caps.get(index).map_or("", |m| m.as_str())
}

fn regex_error(err: fancy_regex::Error) -> Error {
    Error::InvalidInput(format!("couldn't match markdown line: {err}"))
}
