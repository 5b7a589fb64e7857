/// Layout facts about a tag, used when reformatting.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct TagInfo {
    /// Never has content or a closing tag.
    pub void: bool,
    pub break_before_open: bool,
    /// Also indents the contents one level.
    pub break_before_content: bool,
    pub break_after_content: bool,
    pub break_after_close: bool,
}

impl TagInfo {
    const BLOCK: Self = Self {
        void: false,
        break_before_open: true,
        break_before_content: true,
        break_after_content: true,
        break_after_close: true,
    };

    /// On its own line, but with its contents inline: `<p>text</p>`.
    const LEAF_BLOCK: Self = Self {
        void: false,
        break_before_open: true,
        break_before_content: false,
        break_after_content: false,
        break_after_close: true,
    };

    const INLINE: Self = Self {
        void: false,
        break_before_open: false,
        break_before_content: false,
        break_after_content: false,
        break_after_close: false,
    };

    const VOID_BLOCK: Self = Self {
        void: true,
        ..Self::LEAF_BLOCK
    };

    const VOID_INLINE: Self = Self {
        void: true,
        ..Self::INLINE
    };

    const LINE_BREAK: Self = Self {
        void: true,
        break_after_close: true,
        ..Self::INLINE
    };
}

/// Looks up a lowercase tag name. Tags we don't know are laid out as blocks.
pub(crate) fn tag_info(tag: &str) -> TagInfo {
    match tag {
        "html" | "head" | "body" | "div" | "ul" | "ol" | "blockquote" | "table" | "thead" | "tbody" | "tfoot" | "tr"
        | "section" | "article" | "nav" | "header" | "footer" | "main" | "aside" | "dl" | "form" | "figure"
        | "select" => TagInfo::BLOCK,

        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "title" | "pre" | "td" | "th" | "dt" | "dd"
        | "option" | "caption" | "figcaption" | "address" | "script" | "style" => TagInfo::LEAF_BLOCK,

        "a" | "abbr" | "b" | "bdi" | "bdo" | "cite" | "code" | "data" | "del" | "dfn" | "em" | "i" | "ins" | "kbd"
        | "label" | "mark" | "q" | "s" | "samp" | "small" | "span" | "strong" | "sub" | "sup" | "time" | "u"
        | "var" | "button" | "textarea" | "output" => TagInfo::INLINE,

        "meta" | "link" | "hr" | "base" => TagInfo::VOID_BLOCK,

        "img" | "input" | "wbr" | "source" | "track" | "col" | "area" | "embed" | "param" => TagInfo::VOID_INLINE,

        "br" => TagInfo::LINE_BREAK,

        _ => TagInfo::BLOCK,
    }
}

/// Elements whose text is written as-is, without entity encoding.
pub(crate) fn is_raw_text(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}
