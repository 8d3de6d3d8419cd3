//! Document to storage markup conversion.

use pulldown_cmark::{BrokenLink, Parser};

use crate::backend::RenderBackend;
use crate::blocks::{Block, split_blocks};
use crate::error::ConversionError;
use crate::references::LinkReferences;
use crate::renderer::MarkdownRenderer;
use crate::storage::StorageBackend;

/// Converts markdown documents to Confluence storage markup.
///
/// Conversion is pure: the same input always produces byte-identical output.
#[derive(Clone, Copy, Debug)]
pub struct Converter {
    gfm: bool,
}

impl Converter {
    /// Create a converter with GitHub Flavored Markdown enabled.
    #[must_use]
    pub fn new() -> Self {
        Self { gfm: true }
    }

    /// Enable or disable GitHub Flavored Markdown (tables, task lists,
    /// strikethrough, alerts) for the markdown between extracted blocks.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Convert a document to storage markup.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::UnclosedCallout`] if a callout has no
    /// closing `:::` line.
    pub fn convert(&self, raw: &str) -> Result<String, ConversionError> {
        let blocks = split_blocks(raw, 1)?;
        let mut references = LinkReferences::default();
        self.collect_references(&blocks, &mut references)?;

        let mut out = String::with_capacity(raw.len() * 2);
        self.convert_blocks(blocks, &references, &mut out)?;
        Ok(out)
    }

    fn collect_references(
        &self,
        blocks: &[Block],
        references: &mut LinkReferences,
    ) -> Result<(), ConversionError> {
        let options = self.renderer().parser_options();
        for block in blocks {
            match block {
                Block::Markdown(markdown) => references.collect(markdown, options),
                Block::Callout {
                    body, body_line, ..
                } => self.collect_references(&split_blocks(body, *body_line)?, references)?,
                Block::Code { .. } => {}
            }
        }
        Ok(())
    }

    fn convert_blocks(
        &self,
        blocks: Vec<Block>,
        references: &LinkReferences,
        out: &mut String,
    ) -> Result<(), ConversionError> {
        for block in blocks {
            match block {
                Block::Markdown(markdown) => {
                    let mut renderer = self.renderer();
                    let options = renderer.parser_options();
                    let html = if references.is_empty() {
                        renderer.render(Parser::new_ext(&markdown, options))
                    } else {
                        let parser = Parser::new_with_broken_link_callback(
                            &markdown,
                            options,
                            Some(|link: BrokenLink<'_>| {
                                references.resolve(&link.reference)
                            }),
                        );
                        renderer.render(parser)
                    };
                    out.push_str(&html);
                }
                Block::Code { language, body } => {
                    StorageBackend::code_block(language.as_deref(), &body, out);
                }
                Block::Callout {
                    kind,
                    title,
                    body,
                    body_line,
                } => {
                    StorageBackend::panel_start(kind, title.as_deref(), out);
                    self.convert_blocks(split_blocks(&body, body_line)?, references, out)?;
                    StorageBackend::panel_end(kind, out);
                }
            }
        }
        Ok(())
    }

    fn renderer(&self) -> MarkdownRenderer<StorageBackend> {
        MarkdownRenderer::new().with_gfm(self.gfm)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert a document with the default [`Converter`].
///
/// # Errors
///
/// Returns [`ConversionError::UnclosedCallout`] if a callout has no closing
/// `:::` line.
pub fn convert(raw: &str) -> Result<String, ConversionError> {
    Converter::new().convert(raw)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::PanelKind;

    #[test]
    fn test_empty_document() {
        assert_eq!(convert("").unwrap(), "");
        assert_eq!(convert("\n\n").unwrap(), "");
    }

    #[test]
    fn test_code_fence_not_parsed_as_markdown() {
        let out = convert("```md\n# not a heading\n**raw**\n```").unwrap();
        assert_eq!(
            out,
            concat!(
                r#"<ac:structured-macro ac:name="code" ac:schema-version="1">"#,
                r#"<ac:parameter ac:name="language">md</ac:parameter>"#,
                r#"<ac:parameter ac:name="linenumbers">true</ac:parameter>"#,
                "<ac:plain-text-body><![CDATA[# not a heading\n**raw**]]></ac:plain-text-body>",
                "</ac:structured-macro>"
            )
        );
    }

    #[test]
    fn test_callout_body_is_converted() {
        let out = convert("::: tip Heads up\nUse **bold**\n:::").unwrap();
        assert_eq!(
            out,
            concat!(
                r#"<ac:structured-macro ac:name="tip" ac:schema-version="1">"#,
                r#"<ac:parameter ac:name="title">Heads up</ac:parameter>"#,
                "<ac:rich-text-body><p>Use <strong>bold</strong></p></ac:rich-text-body>",
                "</ac:structured-macro>"
            )
        );
    }

    #[test]
    fn test_nested_callouts() {
        let out = convert("::: note\nOuter\n::: warning\nInner\n:::\n:::").unwrap();
        assert_eq!(
            out,
            concat!(
                r#"<ac:structured-macro ac:name="note" ac:schema-version="1"><ac:rich-text-body>"#,
                "<p>Outer</p>",
                r#"<ac:structured-macro ac:name="warning" ac:schema-version="1"><ac:rich-text-body>"#,
                "<p>Inner</p>",
                "</ac:rich-text-body></ac:structured-macro>",
                "</ac:rich-text-body></ac:structured-macro>"
            )
        );
    }

    #[test]
    fn test_unclosed_nested_callout_reports_outer_opener() {
        let err = convert("# Doc\n::: info\n::: tip\nInner\n:::").unwrap_err();
        assert_eq!(
            err,
            ConversionError::UnclosedCallout {
                kind: PanelKind::Info,
                line: 2,
            }
        );
    }

    #[test]
    fn test_markdown_around_blocks() {
        let out = convert("Before\n\n```\nx\n```\n\nAfter").unwrap();
        assert!(out.starts_with("<p>Before</p><ac:structured-macro"));
        assert!(out.ends_with("</ac:structured-macro><p>After</p>"));
    }

    #[test]
    fn test_reference_link_defined_after_fence() {
        let doc = "See [docs][d].\n\n```\nx\n```\n\n[d]: https://example.com/docs\n";
        let out = convert(doc).unwrap();
        assert!(out.starts_with(r#"<p>See <a href="https://example.com/docs">docs</a>.</p>"#));
    }

    #[test]
    fn test_reference_link_inside_callout() {
        let doc = "::: note\nRead the [guide].\n:::\n\n[Guide]: https://example.com/g\n";
        let out = convert(doc).unwrap();
        assert!(out.contains(r#"<a href="https://example.com/g">guide</a>"#));
    }

    #[test]
    fn test_unknown_reference_stays_text() {
        let out = convert("See [docs][missing].\n\n```\nx\n```").unwrap();
        assert!(out.starts_with("<p>See [docs][missing].</p>"));
    }

    #[test]
    fn test_gfm_disabled_leaves_task_markers() {
        let out = Converter::new()
            .with_gfm(false)
            .convert("- [x] done")
            .unwrap();
        assert_eq!(out, "<ul><li>[x] done</li></ul>");
    }
}
