//! Confluence storage format backend.
//!
//! Produces Confluence XHTML storage format for the REST API.

use std::fmt::Write;

use crate::backend::{PanelKind, RenderBackend};
use crate::state::escape_xml;

/// Glyph written for a checked task list item.
pub const CHECKED_GLYPH: &str = "\u{2611}";

/// Glyph written for an unchecked task list item.
pub const UNCHECKED_GLYPH: &str = "\u{2610}";

/// Confluence storage render backend.
///
/// Produces Confluence XHTML storage format with:
/// - `ac:structured-macro` code macros with CDATA bodies
/// - `info`/`note`/`warning`/`tip` panel macros
/// - `ac:image` with `ri:attachment` (local files) or `ri:url` (external)
/// - Bold-emphasized level-1 headings
/// - Self-closing `<br />` and `<hr />`
pub struct StorageBackend;

impl RenderBackend for StorageBackend {
    fn code_block(lang: Option<&str>, content: &str, out: &mut String) {
        out.push_str(r#"<ac:structured-macro ac:name="code" ac:schema-version="1">"#);
        if let Some(lang) = lang {
            write!(
                out,
                r#"<ac:parameter ac:name="language">{}</ac:parameter>"#,
                escape_xml(lang)
            )
            .unwrap();
        }
        out.push_str(r#"<ac:parameter ac:name="linenumbers">true</ac:parameter>"#);
        // CDATA content is not escaped; a literal `]]>` is split across sections
        write!(
            out,
            r"<ac:plain-text-body><![CDATA[{}]]></ac:plain-text-body>",
            content.replace("]]>", "]]]]><![CDATA[>")
        )
        .unwrap();
        out.push_str("</ac:structured-macro>");
    }

    fn panel_start(kind: PanelKind, title: Option<&str>, out: &mut String) {
        write!(
            out,
            r#"<ac:structured-macro ac:name="{kind}" ac:schema-version="1">"#
        )
        .unwrap();
        if let Some(title) = title {
            write!(
                out,
                r#"<ac:parameter ac:name="title">{}</ac:parameter>"#,
                escape_xml(title)
            )
            .unwrap();
        }
        out.push_str("<ac:rich-text-body>");
    }

    fn panel_end(_kind: PanelKind, out: &mut String) {
        out.push_str("</ac:rich-text-body></ac:structured-macro>");
    }

    fn image(src: &str, _alt: &str, _title: &str, out: &mut String) {
        let is_external = src.starts_with("http://") || src.starts_with("https://");
        let inner = if is_external {
            format!(r#"ri:url ri:value="{}""#, escape_xml(src))
        } else {
            format!(
                r#"ri:attachment ri:filename="{}""#,
                escape_xml(attachment_filename(src))
            )
        };
        write!(out, "<ac:image><{inner} /></ac:image>").unwrap();
    }

    fn heading_start(level: u8, out: &mut String) {
        write!(out, "<h{level}>").unwrap();
        if level == 1 {
            out.push_str("<strong>");
        }
    }

    fn heading_end(level: u8, out: &mut String) {
        if level == 1 {
            out.push_str("</strong>");
        }
        write!(out, "</h{level}>").unwrap();
    }

    fn hard_break(out: &mut String) {
        out.push_str("<br />");
    }

    fn horizontal_rule(out: &mut String) {
        out.push_str("<hr />");
    }

    fn task_list_marker(checked: bool, out: &mut String) {
        out.push_str(if checked { CHECKED_GLYPH } else { UNCHECKED_GLYPH });
        out.push(' ');
    }
}

/// Base filename of a local image reference, without query or fragment.
fn attachment_filename(src: &str) -> &str {
    let path = src.split(['?', '#']).next().unwrap_or(src);
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}
