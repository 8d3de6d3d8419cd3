//! Event-driven markdown renderer.
//!
//! Walks the `pulldown-cmark` event stream and writes XHTML, handing code
//! blocks, panels, images and a few other elements to a [`RenderBackend`].

use std::fmt::Write;
use std::marker::PhantomData;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::backend::{PanelKind, RenderBackend};
use crate::state::{CodeCapture, ImageCapture, TableState, escape_xml};

/// Markdown renderer generic over the output backend.
pub struct MarkdownRenderer<B: RenderBackend> {
    output: String,
    code: CodeCapture,
    image: ImageCapture,
    table: TableState,
    gfm: bool,
    /// Open blockquotes; `Some` for GFM alerts rendered as panels.
    quotes: Vec<Option<PanelKind>>,
    _backend: PhantomData<B>,
}

impl<B: RenderBackend> MarkdownRenderer<B> {
    /// Create a new renderer with GFM enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(1024),
            code: CodeCapture::default(),
            image: ImageCapture::default(),
            table: TableState::default(),
            gfm: true,
            quotes: Vec::new(),
            _backend: PhantomData,
        }
    }

    /// Enable or disable GitHub Flavored Markdown: tables, strikethrough,
    /// task lists and `> [!NOTE]` alerts.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Parser options matching the GFM setting.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if !self.gfm {
            return Options::empty();
        }
        Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_GFM
    }

    /// Parse and render markdown text.
    pub fn render_markdown(&mut self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, self.parser_options());
        self.render(parser)
    }

    /// Render an event stream and return the produced markup.
    pub fn render<'a, I>(&mut self, events: I) -> String
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            match event {
                Event::Start(tag) => self.start_tag(tag),
                Event::End(tag) => self.end_tag(tag),
                // Raw HTML is not guaranteed to be well-formed XHTML
                Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                    self.text(&text);
                }
                Event::Code(code) if self.image.is_active() => self.image.push_alt(&code),
                Event::Code(code) => {
                    write!(self.output, "<code>{}</code>", escape_xml(&code)).unwrap();
                }
                Event::SoftBreak => self.text("\n"),
                Event::HardBreak => B::hard_break(&mut self.output),
                Event::Rule => B::horizontal_rule(&mut self.output),
                Event::TaskListMarker(checked) => B::task_list_marker(checked, &mut self.output),
                Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {}
            }
        }
        std::mem::take(&mut self.output)
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => B::heading_start(heading_number(level), &mut self.output),
            Tag::BlockQuote(Some(alert)) => {
                let kind = PanelKind::from(alert);
                self.quotes.push(Some(kind));
                B::panel_start(kind, None, &mut self.output);
            }
            Tag::BlockQuote(None) => {
                self.quotes.push(None);
                B::blockquote_start(&mut self.output);
            }
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
                self.code
                    .start(info.split_whitespace().next().map(ToOwned::to_owned));
            }
            Tag::CodeBlock(CodeBlockKind::Indented) => self.code.start(None),
            Tag::List(Some(1)) => self.output.push_str("<ol>"),
            Tag::List(Some(start)) => write!(self.output, r#"<ol start="{start}">"#).unwrap(),
            Tag::List(None) => self.output.push_str("<ul>"),
            Tag::Item => self.output.push_str("<li>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_row(true);
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row(false);
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let open = self.table.open_cell();
                self.output.push_str(&open);
            }
            Tag::Emphasis => self.output.push_str("<em>"),
            Tag::Strong => self.output.push_str("<strong>"),
            Tag::Strikethrough => self.output.push_str("<s>"),
            Tag::Superscript => self.output.push_str("<sup>"),
            Tag::Subscript => self.output.push_str("<sub>"),
            Tag::Link { dest_url, .. } => {
                write!(self.output, r#"<a href="{}">"#, escape_xml(&dest_url)).unwrap();
            }
            Tag::Image {
                dest_url, title, ..
            } => self.image.start(dest_url.into_string(), title.into_string()),
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(level) => B::heading_end(heading_number(level), &mut self.output),
            TagEnd::BlockQuote(_) => match self.quotes.pop().flatten() {
                Some(kind) => B::panel_end(kind, &mut self.output),
                None => B::blockquote_end(&mut self.output),
            },
            TagEnd::CodeBlock => {
                if let Some((language, body)) = self.code.finish() {
                    B::code_block(language.as_deref(), &body, &mut self.output);
                }
            }
            TagEnd::List(true) => self.output.push_str("</ol>"),
            TagEnd::List(false) => self.output.push_str("</ul>"),
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.table.end_head();
                self.output.push_str("</tr></thead><tbody>");
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                let close = self.table.close_cell();
                self.output.push_str(close);
            }
            TagEnd::Emphasis => self.output.push_str("</em>"),
            TagEnd::Strong => self.output.push_str("</strong>"),
            TagEnd::Strikethrough => self.output.push_str("</s>"),
            TagEnd::Superscript => self.output.push_str("</sup>"),
            TagEnd::Subscript => self.output.push_str("</sub>"),
            TagEnd::Link => self.output.push_str("</a>"),
            TagEnd::Image => {
                if let Some(image) = self.image.finish() {
                    B::image(&image.src, &image.alt, &image.title, &mut self.output);
                }
            }
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_alt(text);
        } else {
            self.output.push_str(&escape_xml(text));
        }
    }
}

impl<B: RenderBackend> Default for MarkdownRenderer<B> {
    fn default() -> Self {
        Self::new()
    }
}

fn heading_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
