//! Error types for synchronization.

use std::path::PathBuf;

use wikisync_confluence::ConfluenceError;
use wikisync_renderer::ConversionError;

/// Filename that does not describe a page hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    /// Fewer `_`-separated segments than the configured minimum.
    #[error("'{filename}' has {found} segment(s), at least {required} required")]
    Malformed {
        /// Offending filename.
        filename: String,
        /// Segments found.
        found: usize,
        /// Minimum depth.
        required: usize,
    },

    /// A segment between two separators is empty (e.g. `a__b`).
    #[error("'{filename}' has an empty segment at position {position}")]
    EmptySegment {
        /// Offending filename.
        filename: String,
        /// 1-based segment position.
        position: usize,
    },

    /// The leaf title is also an ancestor title of a document in the run.
    #[error("'{filename}' maps to page '{title}', which is also an ancestor page in this run")]
    LeafIsAncestor {
        /// Offending filename.
        filename: String,
        /// Clashing title.
        title: String,
    },

    /// Another document in the run already maps to the same leaf title.
    #[error("'{filename}' maps to page '{title}', already used by '{first}'")]
    DuplicateLeaf {
        /// Offending filename.
        filename: String,
        /// Clashing title.
        title: String,
        /// Filename that claimed the title first.
        first: String,
    },
}

/// Error during synchronization.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Filename does not describe a hierarchy.
    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    /// Document content could not be converted.
    #[error("failed to convert {}", path.display())]
    Conversion {
        /// Document path.
        path: PathBuf,
        /// Conversion error.
        #[source]
        source: ConversionError,
    },

    /// File system error.
    #[error("failed to read {}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Confluence request failed.
    #[error(transparent)]
    Backend(#[from] ConfluenceError),

    /// Worker pool could not be created.
    #[error("failed to create worker pool")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl SyncError {
    /// Whether the run must stop regardless of the failure policy.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Backend(err) => err.is_fatal(),
            Self::Pool(_) => true,
            Self::Hierarchy(_) | Self::Conversion { .. } | Self::Io { .. } => false,
        }
    }
}

/// Render an error with its chain of sources, separated by `: `.
pub(crate) fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use wikisync_confluence::Operation;
    use wikisync_renderer::PanelKind;

    use super::*;

    #[test]
    fn test_error_chain() {
        let err = SyncError::Conversion {
            path: PathBuf::from("a_b.md"),
            source: ConversionError::UnclosedCallout {
                kind: PanelKind::Info,
                line: 3,
            },
        };
        assert_eq!(
            error_chain(&err),
            "failed to convert a_b.md: unclosed `::: info` callout opened at line 3"
        );
    }

    #[test]
    fn test_backend_chain_includes_context() {
        let err = SyncError::from(
            ConfluenceError::Authentication { status: 401 }.context(Operation::Resolve, "DOCS", "Guide"),
        );
        assert!(err.is_fatal());
        assert_eq!(
            error_chain(&err),
            "failed to resolve page 'Guide' in space DOCS: authentication rejected (HTTP 401)"
        );
    }

    #[test]
    fn test_document_errors_are_not_fatal() {
        let err = SyncError::Io {
            path: PathBuf::from("x.md"),
            source: std::io::Error::other("denied"),
        };
        assert!(!err.is_fatal());
    }
}
