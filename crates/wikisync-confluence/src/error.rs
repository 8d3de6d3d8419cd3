//! Error types for Confluence operations.

use std::fmt;

use crate::types::PageId;

/// Operation a failure happened in, carried by [`ConfluenceError::Context`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Looking up a page by title.
    Resolve,
    /// Creating a new page.
    Create,
    /// Writing a new version of an existing page.
    Update,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Resolve => "resolve",
            Self::Create => "create",
            Self::Update => "update",
        })
    }
}

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// Transport failure or gateway error; the backend cannot be reached.
    #[error("Confluence unavailable: {0}")]
    Unavailable(String),

    /// Credentials were rejected.
    #[error("authentication rejected (HTTP {status})")]
    Authentication {
        /// HTTP status code (401 or 403).
        status: u16,
    },

    /// The page version changed between read and write.
    #[error("page '{title}' ({id}) was modified concurrently; version {version} is stale")]
    StaleVersion {
        /// Page ID.
        id: PageId,
        /// Page title.
        title: String,
        /// Version the write was based on.
        version: u32,
    },

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),

    /// Failure annotated with the page it concerned.
    #[error("failed to {operation} page '{title}' in space {space}")]
    Context {
        /// Operation that failed.
        operation: Operation,
        /// Page title.
        title: String,
        /// Space key.
        space: String,
        /// Underlying error.
        #[source]
        source: Box<ConfluenceError>,
    },
}

impl ConfluenceError {
    /// Whether this error must abort the whole run.
    ///
    /// Unreachable backends, rejected credentials and stale versions affect
    /// every remaining write, so they are never handled per document.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Unavailable(_) | Self::Authentication { .. } | Self::StaleVersion { .. } => true,
            Self::Http { .. } | Self::Json(_) => false,
            Self::Context { source, .. } => source.is_fatal(),
        }
    }

    /// Attach page context to an error.
    #[must_use]
    pub fn context(self, operation: Operation, space: &str, title: &str) -> Self {
        Self::Context {
            operation,
            title: title.to_owned(),
            space: space.to_owned(),
            source: Box::new(self),
        }
    }
}
