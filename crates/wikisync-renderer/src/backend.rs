//! Render backend trait for format-specific rendering.
//!
//! The generic [`MarkdownRenderer`](crate::MarkdownRenderer) handles shared
//! elements (paragraphs, tables, lists, inline formatting) and delegates the
//! elements whose markup differs per target format to a backend.

use std::fmt;

use pulldown_cmark::BlockQuoteKind;

/// Kind of a callout panel.
///
/// Parsed from `::: <kind>` callout openers and mapped from GitHub-style
/// alerts (`> [!NOTE]`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Info,
    Note,
    Warning,
    Tip,
}

impl PanelKind {
    /// Parse a callout kind name (case-insensitive).
    ///
    /// Returns `None` for names that are not a supported panel kind.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "info" => Some(Self::Info),
            "note" => Some(Self::Note),
            "warning" => Some(Self::Warning),
            "tip" => Some(Self::Tip),
            _ => None,
        }
    }

    /// Macro name used in storage markup.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Note => "note",
            Self::Warning => "warning",
            Self::Tip => "tip",
        }
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<BlockQuoteKind> for PanelKind {
    fn from(kind: BlockQuoteKind) -> Self {
        match kind {
            BlockQuoteKind::Note => Self::Note,
            BlockQuoteKind::Tip => Self::Tip,
            BlockQuoteKind::Important => Self::Info,
            BlockQuoteKind::Warning | BlockQuoteKind::Caution => Self::Warning,
        }
    }
}

/// Backend trait for format-specific rendering operations.
pub trait RenderBackend {
    /// Render a code block.
    ///
    /// `content` is the verbatim code body without the trailing newline.
    fn code_block(lang: Option<&str>, content: &str, out: &mut String);

    /// Render the opening of a panel, with an optional title.
    fn panel_start(kind: PanelKind, title: Option<&str>, out: &mut String);

    /// Render the closing of a panel.
    fn panel_end(kind: PanelKind, out: &mut String);

    /// Render blockquote start tag.
    fn blockquote_start(out: &mut String) {
        out.push_str("<blockquote>");
    }

    /// Render blockquote end tag.
    fn blockquote_end(out: &mut String) {
        out.push_str("</blockquote>");
    }

    /// Render an image.
    fn image(src: &str, alt: &str, title: &str, out: &mut String);

    /// Render a heading opening tag.
    fn heading_start(level: u8, out: &mut String) {
        out.push_str(&format!("<h{level}>"));
    }

    /// Render a heading closing tag.
    fn heading_end(level: u8, out: &mut String) {
        out.push_str(&format!("</h{level}>"));
    }

    /// Render a hard break.
    fn hard_break(out: &mut String) {
        out.push_str("<br>");
    }

    /// Render a horizontal rule.
    fn horizontal_rule(out: &mut String) {
        out.push_str("<hr>");
    }

    /// Render a task list marker.
    fn task_list_marker(checked: bool, out: &mut String) {
        out.push_str(if checked { "[x] " } else { "[ ] " });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_kind_parse() {
        assert_eq!(PanelKind::parse("info"), Some(PanelKind::Info));
        assert_eq!(PanelKind::parse("NOTE"), Some(PanelKind::Note));
        assert_eq!(PanelKind::parse("Warning"), Some(PanelKind::Warning));
        assert_eq!(PanelKind::parse("tip"), Some(PanelKind::Tip));
        assert_eq!(PanelKind::parse("danger"), None);
        assert_eq!(PanelKind::parse(""), None);
    }

    #[test]
    fn test_panel_kind_from_alert() {
        assert_eq!(PanelKind::from(BlockQuoteKind::Note), PanelKind::Note);
        assert_eq!(PanelKind::from(BlockQuoteKind::Important), PanelKind::Info);
        assert_eq!(PanelKind::from(BlockQuoteKind::Caution), PanelKind::Warning);
    }
}
