//! Markdown to Confluence storage format conversion.
//!
//! [`Converter`] turns a document written in a constrained markdown dialect
//! into Confluence XHTML storage markup. Conversion runs in two passes:
//!
//! 1. Top-level fenced code blocks and `:::` callouts are extracted line by
//!    line, so neither is ever seen by the markdown parser.
//! 2. The markdown between them is rendered by the generic
//!    [`MarkdownRenderer`] through a [`RenderBackend`]. [`StorageBackend`]
//!    produces the storage format; callout bodies are converted on their own.
//!
//! # Example
//!
//! ```
//! use wikisync_renderer::Converter;
//!
//! let markup = Converter::new().convert("# Hello\n\n- [x] done").unwrap();
//! assert!(markup.starts_with("<h1><strong>Hello</strong></h1>"));
//! assert!(markup.contains("\u{2611} done"));
//! ```

mod backend;
mod blocks;
mod converter;
mod error;
mod fence;
mod references;
mod renderer;
mod state;
mod storage;

pub use backend::{PanelKind, RenderBackend};
pub use converter::{Converter, convert};
pub use error::ConversionError;
pub use renderer::MarkdownRenderer;
pub use state::escape_xml;
pub use storage::{CHECKED_GLYPH, StorageBackend, UNCHECKED_GLYPH};
