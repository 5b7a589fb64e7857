/// A line-oriented text sink that knows about indentation.
///
/// Text is held one line at a time. Indentation is added lazily, when the first character of a line is written, so
/// that nothing needs to know the indentation ahead of time. Line breaks requested through [`Output::break_line`] are
/// soft: a break at the start of a line does nothing, so several of them in a row collapse into one. Lines that end up
/// holding nothing but whitespace are dropped.
///
/// All of that is suspended in `pre` mode: text (newlines included) is written exactly as given, and soft breaks are
/// ignored. An `Output` built with [`Output::plain`] is in `pre` mode permanently.
pub struct Output {
    written: String,
    line: String,
    indent: String,
    depth: usize,
    pre_mode: bool,
    always_pre: bool,
}

impl Output {
    pub fn pretty(indent: &str) -> Self {
        Self {
            written: String::with_capacity(256), // just a guess
            line: String::new(),
            indent: indent.to_string(),
            depth: 0,
            pre_mode: false,
            always_pre: false,
        }
    }

    /// An output that writes everything verbatim.
    pub fn plain() -> Self {
        Self {
            pre_mode: true,
            always_pre: true,
            ..Self::pretty("")
        }
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn set_pre_mode(&mut self, pre_mode: bool) {
        self.pre_mode = pre_mode || self.always_pre;
    }

    pub fn is_pre_mode(&self) -> bool {
        self.pre_mode
    }

    pub fn at_line_start(&self) -> bool {
        self.line.is_empty()
    }

    /// Ends the current line, unless it's empty.
    pub fn break_line(&mut self) {
        if !self.pre_mode && !self.line.is_empty() {
            self.end_line();
        }
    }

    pub fn write_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.write_char(ch);
        }
    }

    pub fn write_char(&mut self, ch: char) {
        if ch == '\n' {
            self.end_line();
            return;
        }
        if self.line.is_empty() && !self.pre_mode {
            for _ in 0..self.depth {
                self.line.push_str(&self.indent);
            }
        }
        self.line.push(ch);
    }

    /// Everything written so far, including a final line that hasn't been ended.
    pub fn finish(mut self) -> String {
        self.written.push_str(&self.line);
        self.written
    }

    fn end_line(&mut self) {
        if self.pre_mode || !self.line.trim().is_empty() {
            self.written.push_str(&self.line);
            self.written.push('\n');
        }
        self.line.clear();
    }
}
