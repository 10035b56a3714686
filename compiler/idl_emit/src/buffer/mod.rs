//! Line buffer with indentation tracking and deferred markers.
//!
//! Lines are recorded with the depth in effect when they were written and
//! rendered only in [`LineBuffer::finish`], so a [`Marker`] can be filled
//! after later lines exist.

use crate::emitter::{Emitter, StringEmitter};
use crate::INDENT_WIDTH;

/// Handle to a placeholder line.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Marker(usize);

#[derive(Clone, Debug)]
enum Line {
    Text { depth: usize, text: String },
    Blank,
    Marker { depth: usize, id: usize },
}

/// Indentation-aware builder for one generated file.
#[derive(Clone, Debug, Default)]
pub struct LineBuffer {
    lines: Vec<Line>,
    depth: usize,
    /// Substitution per marker, `None` until filled.
    fills: Vec<Option<Vec<String>>>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current indentation depth.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether nothing but blank lines and markers has been written.
    pub fn is_empty(&self) -> bool {
        !self.lines.iter().any(|line| matches!(line, Line::Text { .. }))
    }

    /// Write one line at the current depth. An empty line is a blank line.
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref().trim_end();
        if text.is_empty() {
            self.lines.push(Line::Blank);
        } else {
            self.lines.push(Line::Text {
                depth: self.depth,
                text: text.to_string(),
            });
        }
        self
    }

    /// Write several lines at the current depth.
    pub fn lines<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.line(line);
        }
        self
    }

    /// Write a blank line, collapsing runs and skipping one right after an
    /// opening brace.
    pub fn blank(&mut self) -> &mut Self {
        match self.lines.last() {
            None | Some(Line::Blank) => {}
            Some(Line::Text { text, .. }) if text.ends_with('{') => {}
            Some(_) => self.lines.push(Line::Blank),
        }
        self
    }

    pub fn indent(&mut self) -> &mut Self {
        self.depth += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self
    }

    /// `header` / `{` / body one level deeper / `}`, with the opening brace on
    /// its own line (declarations and methods).
    pub fn block<R>(&mut self, header: impl AsRef<str>, body: impl FnOnce(&mut Self) -> R) -> R {
        self.line(header);
        self.braced("{", "}", body)
    }

    /// `header {` / body / `}` (control structures).
    pub fn inline_block<R>(
        &mut self,
        header: impl AsRef<str>,
        body: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let open = format!("{} {{", header.as_ref());
        self.braced(&open, "}", body)
    }

    /// `open` / body one level deeper / `close`.
    pub fn braced<R>(
        &mut self,
        open: impl AsRef<str>,
        close: impl AsRef<str>,
        body: impl FnOnce(&mut Self) -> R,
    ) -> R {
        self.line(open);
        self.indent();
        let result = body(self);
        self.trim_trailing_blank();
        self.dedent();
        self.line(close);
        result
    }

    /// Reserve a placeholder at the current depth.
    pub fn marker(&mut self) -> Marker {
        let id = self.fills.len();
        self.fills.push(None);
        self.lines.push(Line::Marker {
            depth: self.depth,
            id,
        });
        Marker(id)
    }

    /// Set the lines a marker expands to. A non-empty expansion is followed
    /// by a blank line; an empty one leaves no trace.
    pub fn fill<I, S>(&mut self, marker: Marker, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(slot) = self.fills.get_mut(marker.0) {
            *slot = Some(lines.into_iter().map(Into::into).collect());
        }
    }

    /// Render to text with a single trailing newline.
    pub fn finish(self) -> String {
        let mut out = StringEmitter::with_capacity(self.lines.len() * 32);
        let mut pending_blank = false;
        let mut started = false;

        for line in &self.lines {
            match line {
                Line::Blank => pending_blank = started,
                Line::Text { depth, text } => {
                    write_line(&mut out, &mut pending_blank, *depth, text);
                    started = true;
                }
                Line::Marker { depth, id } => {
                    let Some(Some(fill)) = self.fills.get(*id) else {
                        continue;
                    };
                    if fill.is_empty() {
                        continue;
                    }
                    for text in fill {
                        write_line(&mut out, &mut pending_blank, *depth, text);
                    }
                    started = true;
                    pending_blank = true;
                }
            }
        }

        out.trim_trailing_blank_lines();
        out.ensure_trailing_newline();
        out.output()
    }

    fn trim_trailing_blank(&mut self) {
        while matches!(self.lines.last(), Some(Line::Blank)) {
            self.lines.pop();
        }
    }
}

fn write_line(out: &mut StringEmitter, pending_blank: &mut bool, depth: usize, text: &str) {
    // Never a blank line right before a closing brace.
    if std::mem::take(pending_blank) && !text.starts_with('}') {
        out.emit_newline();
    }
    out.emit_indent(depth * INDENT_WIDTH);
    out.emit(text);
    out.emit_newline();
}
