use crate::dom::{encode_attribute, encode_entities, ElementData, NodeData, NodeId, Tree};
use crate::error::Result;
use crate::output::sanitize::{kept_attribute, strip_nul};
use crate::output::tag_info::{is_raw_text, tag_info};
use crate::output::WriterOptions;
use crate::util::output::Output;
use std::borrow::Cow;
use std::collections::HashSet;

/// Renders nodes (each with its own tag) one after another.
pub(crate) fn render_nodes(tree: &Tree, nodes: &[NodeId], options: &WriterOptions) -> Result<String> {
    let writer = HtmlWriter::new(tree, options);
    let mut out = if options.reformat {
        Output::pretty(&options.indent)
    } else {
        Output::plain()
    };
    for &id in nodes {
        writer.write_node(&mut out, id, false)?;
    }
    if options.reformat {
        out.break_line();
    }
    Ok(out.finish())
}

struct HtmlWriter<'a> {
    tree: &'a Tree,
    options: &'a WriterOptions,
    strip: HashSet<String>,
    allowed: Option<HashSet<String>>,
    sanitize: bool,
}

enum Disposition {
    Write,
    Strip,
    Unwrap,
}

impl<'a> HtmlWriter<'a> {
    fn new(tree: &'a Tree, options: &'a WriterOptions) -> Self {
        let lowercase = |tags: &std::collections::BTreeSet<String>| -> HashSet<String> {
            tags.iter().map(|t| t.to_ascii_lowercase()).collect()
        };
        Self {
            tree,
            options,
            strip: lowercase(&options.strip_tags),
            allowed: options.allowed_tags.as_ref().map(lowercase),
            sanitize: options.is_sanitizing(),
        }
    }

    fn disposition(&self, tag: &str) -> Disposition {
        if self.strip.contains(tag) {
            Disposition::Strip
        } else if self.allowed.as_ref().is_some_and(|allowed| !allowed.contains(tag)) {
            Disposition::Unwrap
        } else {
            Disposition::Write
        }
    }

    fn write_node(&self, out: &mut Output, id: NodeId, raw_text: bool) -> Result<()> {
        match self.tree.data(id)? {
            NodeData::Text(text) => {
                self.write_text(out, text, raw_text);
                Ok(())
            }
            NodeData::Element(elem) => self.write_element(out, id, elem),
        }
    }

    fn write_element(&self, out: &mut Output, id: NodeId, elem: &ElementData) -> Result<()> {
        let tag = elem.tag_lowercase();
        match self.disposition(&tag) {
            Disposition::Strip => return Ok(()),
            Disposition::Unwrap => return self.write_children(out, id, false),
            Disposition::Write => {}
        }

        let info = tag_info(&tag);
        if info.break_before_open {
            out.break_line();
        }
        self.write_open_tag(out, elem, &tag, info.void);
        if info.void {
            if info.break_after_close {
                out.break_line();
            }
            return Ok(());
        }

        if tag == "pre" {
            return self.write_pre(out, id, elem, info.break_after_close);
        }

        let nested_list = tag == "li" && self.has_child_tag(id, &["ul", "ol"])?;
        let indented = info.break_before_content || nested_list;
        if indented {
            out.indent();
        }
        if info.break_before_content {
            out.break_line();
        }
        self.write_children(out, id, is_raw_text(&tag))?;
        if indented {
            out.dedent();
        }
        if info.break_after_content || nested_list {
            out.break_line();
        }
        self.write_close_tag(out, elem);
        if info.break_after_close {
            out.break_line();
        }
        Ok(())
    }

    /// Everything inside a `<pre>` is written verbatim. If it wraps a `<code>`, the two open tags share a line and the
    /// code starts on the next one.
    fn write_pre(&self, out: &mut Output, id: NodeId, pre: &ElementData, break_after: bool) -> Result<()> {
        let was_pre = out.is_pre_mode();
        out.set_pre_mode(true);
        let code = self.first_element_child(id)?.filter(|(_, child)| {
            child.has_tag("code") && matches!(self.disposition("code"), Disposition::Write)
        });
        for &child in self.tree.children(id)? {
            match code {
                Some((code_id, code_elem)) if code_id == child => {
                    self.write_open_tag(out, code_elem, "code", false);
                    if self.options.reformat {
                        out.write_char('\n');
                    }
                    self.write_children(out, code_id, false)?;
                    if self.options.reformat && !out.at_line_start() {
                        out.write_char('\n');
                    }
                    self.write_close_tag(out, code_elem);
                }
                _ => self.write_node(out, child, false)?,
            }
        }
        self.write_close_tag(out, pre);
        out.set_pre_mode(was_pre);
        if break_after {
            out.break_line();
        }
        Ok(())
    }

    fn write_children(&self, out: &mut Output, id: NodeId, raw_text: bool) -> Result<()> {
        for &child in self.tree.children(id)? {
            self.write_node(out, child, raw_text)?;
        }
        Ok(())
    }

    fn write_text(&self, out: &mut Output, text: &str, raw_text: bool) {
        let text = if self.sanitize { strip_nul(text) } else { Cow::Borrowed(text) };
        if self.options.encode_entities && !raw_text {
            out.write_str(&encode_entities(&text));
        } else {
            out.write_str(&text);
        }
    }

    fn write_open_tag(&self, out: &mut Output, elem: &ElementData, tag: &str, void: bool) {
        out.write_char('<');
        out.write_str(elem.tag());
        if self.sanitize {
            for (name, value) in elem.attributes() {
                if let Some(kept) = kept_attribute(tag, name, value) {
                    self.write_attribute(out, name, &kept);
                }
            }
        } else {
            for (name, value) in elem.attributes() {
                if value.is_empty() || (tag == "input" && value.eq_ignore_ascii_case("checked")) {
                    self.write_bare_attribute(out, name);
                } else {
                    self.write_attribute(out, name, value);
                }
            }
        }
        if void && self.options.xhtml {
            out.write_str(" />");
        } else {
            out.write_char('>');
        }
    }

    fn write_attribute(&self, out: &mut Output, name: &str, value: &str) {
        out.write_char(' ');
        out.write_str(name);
        out.write_str("=\"");
        out.write_str(&encode_attribute(value));
        out.write_char('"');
    }

    fn write_bare_attribute(&self, out: &mut Output, name: &str) {
        if self.options.xhtml {
            self.write_attribute(out, name, name);
        } else {
            out.write_char(' ');
            out.write_str(name);
        }
    }

    fn write_close_tag(&self, out: &mut Output, elem: &ElementData) {
        out.write_str("</");
        out.write_str(elem.tag());
        out.write_char('>');
    }

    fn has_child_tag(&self, id: NodeId, tags: &[&str]) -> Result<bool> {
        for &child in self.tree.children(id)? {
            if let NodeData::Element(elem) = self.tree.data(child)? {
                if tags.iter().any(|t| elem.has_tag(t)) {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    fn first_element_child(&self, id: NodeId) -> Result<Option<(NodeId, &'a ElementData)>> {
        for &child in self.tree.children(id)? {
            if let NodeData::Element(elem) = self.tree.data(child)? {
                return Ok(Some((child, elem)));
            }
        }
        Ok(None)
    }
}
