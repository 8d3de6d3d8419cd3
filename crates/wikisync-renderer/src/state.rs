//! Capture state kept by the renderer between start and end events.

use std::borrow::Cow;

use pulldown_cmark::Alignment;

/// Fenced or indented code collected until its end event.
#[derive(Default)]
pub(crate) struct CodeCapture {
    pending: Option<(Option<String>, String)>,
}

impl CodeCapture {
    pub(crate) fn start(&mut self, language: Option<String>) {
        self.pending = Some((language, String::new()));
    }

    pub(crate) fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        if let Some((_, body)) = &mut self.pending {
            body.push_str(text);
        }
    }

    /// Finish the block, returning its language and body without the
    /// newline the parser leaves before the closing fence.
    pub(crate) fn finish(&mut self) -> Option<(Option<String>, String)> {
        let (language, mut body) = self.pending.take()?;
        if body.ends_with('\n') {
            body.pop();
        }
        Some((language, body))
    }
}

/// Image whose alt text is still being collected.
pub(crate) struct PendingImage {
    pub(crate) src: String,
    pub(crate) title: String,
    pub(crate) alt: String,
}

/// Alt text capture for the image currently open.
#[derive(Default)]
pub(crate) struct ImageCapture {
    pending: Option<PendingImage>,
}

impl ImageCapture {
    pub(crate) fn start(&mut self, src: String, title: String) {
        self.pending = Some(PendingImage {
            src,
            title,
            alt: String::new(),
        });
    }

    pub(crate) fn is_active(&self) -> bool {
        self.pending.is_some()
    }

    pub(crate) fn push_alt(&mut self, text: &str) {
        if let Some(image) = &mut self.pending {
            image.alt.push_str(text);
        }
    }

    pub(crate) fn finish(&mut self) -> Option<PendingImage> {
        self.pending.take()
    }
}

/// Position inside the table being rendered.
#[derive(Default)]
pub(crate) struct TableState {
    alignments: Vec<Alignment>,
    in_head: bool,
    column: usize,
}

impl TableState {
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        *self = Self {
            alignments,
            ..Self::default()
        };
    }

    /// Enter a row; `head` marks the header row.
    pub(crate) fn start_row(&mut self, head: bool) {
        self.in_head = head;
        self.column = 0;
    }

    pub(crate) fn end_head(&mut self) {
        self.in_head = false;
    }

    /// Opening tag for the next cell, with its column alignment.
    pub(crate) fn open_cell(&self) -> String {
        let align = match self.alignments.get(self.column) {
            Some(Alignment::Left) => "left",
            Some(Alignment::Center) => "center",
            Some(Alignment::Right) => "right",
            Some(Alignment::None) | None => return format!("<{}>", self.cell_tag()),
        };
        format!(r#"<{} style="text-align:{align}">"#, self.cell_tag())
    }

    /// Closing tag for the current cell; moves to the next column.
    pub(crate) fn close_cell(&mut self) -> &'static str {
        self.column += 1;
        if self.in_head { "</th>" } else { "</td>" }
    }

    fn cell_tag(&self) -> &'static str {
        if self.in_head { "th" } else { "td" }
    }
}

/// Escape the characters that are special in XHTML text and attribute
/// values.
///
/// Borrows the input when nothing needs escaping.
#[must_use]
pub fn escape_xml(s: &str) -> Cow<'_, str> {
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }
    let mut escaped = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
