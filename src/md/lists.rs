use crate::error::Result;
use crate::md::inlines::style_inline;
use crate::select::{AppendOptions, Content, Elements};
use fancy_regex::Regex;
use lazy_static::lazy_static;
use std::collections::VecDeque;

/// One line of a list run: how far it's indented, its marker (`*`, `3.`, `iv.`, `[x]`, ...) and the text after it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ListRecord {
    pub indent: usize,
    pub marker: String,
    pub text: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ListKind {
    Unordered,
    Numeric,
    RomanLower,
    RomanUpper,
    AlphaLower,
    AlphaUpper,
    Checklist,
}

lazy_static! {
    /// Checked in order; the first match decides. Roman numerals come before the letters they're spelled with.
    static ref MARKER_KINDS: Vec<(Regex, ListKind)> = vec![
        (Regex::new(r"^[*+]$").unwrap(), ListKind::Unordered),
        (Regex::new(r"^\d+\.$").unwrap(), ListKind::Numeric),
        (Regex::new(r"^[ivxlcdm]+\.$").unwrap(), ListKind::RomanLower),
        (Regex::new(r"^[IVXLCDM]+\.$").unwrap(), ListKind::RomanUpper),
        (Regex::new(r"^[a-z]+\.$").unwrap(), ListKind::AlphaLower),
        (Regex::new(r"^[A-Z]+\.$").unwrap(), ListKind::AlphaUpper),
        (Regex::new(r"^\[.*\]$").unwrap(), ListKind::Checklist),
    ];
}

impl ListKind {
    pub(crate) fn of(marker: &str) -> Self {
        MARKER_KINDS
            .iter()
            .find(|(regex, _)| regex.is_match(marker).unwrap_or(false))
            .map_or(ListKind::Unordered, |(_, kind)| *kind)
    }

    fn tag(self) -> &'static str {
        match self {
            ListKind::Unordered | ListKind::Checklist => "ul",
            _ => "ol",
        }
    }

    fn type_attribute(self) -> Option<&'static str> {
        match self {
            ListKind::RomanLower => Some("i"),
            ListKind::RomanUpper => Some("I"),
            ListKind::AlphaLower => Some("a"),
            ListKind::AlphaUpper => Some("A"),
            _ => None,
        }
    }
}

/// Builds the run at the front of `records` into a list appended to `parent`.
///
/// The first record's indent is this list's level. Deeper records become a nested list inside the item before them;
/// a shallower one ends this list and is left at the front of `records` for the caller.
pub(crate) fn build_list(parent: &Elements, records: &mut VecDeque<ListRecord>) -> Result<()> {
    let Some(first) = records.front() else {
        return Ok(());
    };
    let indent = first.indent;
    let kind = ListKind::of(&first.marker);
    tracing::trace!("building {kind:?} list at indent {indent}");

    let list = parent.append_new(kind.tag())?;
    if let Some(list_type) = kind.type_attribute() {
        list.set_attribute("type", list_type)?;
    }
    if kind == ListKind::Checklist {
        list.set_attribute("class", "checklist")?;
    }

    let mut last_item: Option<Elements> = None;
    let mut position = 0;
    while let Some(record) = records.pop_front() {
        if record.indent > indent {
            records.push_front(record);
            let nest_in = last_item.as_ref().unwrap_or(&list);
            build_list(nest_in, records)?;
            continue;
        }
        if record.indent < indent {
            records.push_front(record);
            break;
        }
        position += 1;
        let item = list.append_new("li")?;
        match kind {
            ListKind::Numeric => {
                if let Ok(number) = record.marker.trim_end_matches('.').parse::<usize>() {
                    if number != position {
                        item.set_attribute("value", &number.to_string())?;
                    }
                }
            }
            ListKind::Checklist => {
                let checkbox = item.append_new("input")?;
                checkbox.set_attribute("type", "checkbox")?;
                if is_checked(&record.marker) {
                    checkbox.set_attribute("checked", "checked")?;
                }
            }
            _ => {}
        }
        let styled = style_inline(&record.text)?;
        item.append(Content::Text(&styled), AppendOptions::markup())?;
        last_item = Some(item);
    }
    Ok(())
}

fn is_checked(marker: &str) -> bool {
    let inside = marker.strip_prefix('[').and_then(|m| m.strip_suffix(']')).unwrap_or("");
    !inside.trim().is_empty()
}
