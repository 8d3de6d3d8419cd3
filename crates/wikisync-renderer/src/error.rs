//! Error types for markup conversion.

use crate::backend::PanelKind;

/// Errors that can occur while converting a document.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConversionError {
    /// A callout opener has no matching `:::` closer.
    #[error("unclosed `::: {kind}` callout opened at line {line}")]
    UnclosedCallout { kind: PanelKind, line: usize },
}
