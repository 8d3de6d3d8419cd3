//! Idempotent, version-aware page upserts.
//!
//! Every upsert performs exactly one resolver read and at most one write:
//!
//! - no page with the title: create it at version 1
//! - stored body byte-identical to the new body: no write
//! - stored body differs: write `version + 1` based on the version just read
//!
//! A conflicting write surfaces as [`ConfluenceError::StaleVersion`] and is
//! never retried.

use tracing::{debug, info};

use crate::api::ContentApi;
use crate::error::{ConfluenceError, Operation};
use crate::resolver::PageResolver;
use crate::types::{NewPage, PageId, PageUpdate};

/// What an upsert did to the remote page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertAction {
    /// Page did not exist and was created.
    Created,
    /// Page content changed; version moved from `from` to `to`.
    Updated { from: u32, to: u32 },
    /// Stored content was identical; nothing was written.
    Unchanged,
}

/// Result of an upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// ID of the created or existing page.
    pub id: PageId,
    /// Action taken.
    pub action: UpsertAction,
}

impl UpsertOutcome {
    /// Whether a write was issued.
    #[must_use]
    pub fn is_write(&self) -> bool {
        !matches!(self.action, UpsertAction::Unchanged)
    }
}

/// Creates or updates pages keyed by `(space, title)`.
pub struct PageUpserter<'a, A: ContentApi + ?Sized> {
    api: &'a A,
    version_message: Option<String>,
}

impl<'a, A: ContentApi + ?Sized> PageUpserter<'a, A> {
    /// Create an upserter over a content API.
    #[must_use]
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            version_message: None,
        }
    }

    /// Attach a message to every version written by an update.
    #[must_use]
    pub fn with_version_message(mut self, message: Option<String>) -> Self {
        self.version_message = message;
        self
    }

    /// Ensure a page titled `title` exists in `space` with `content`.
    ///
    /// `parent` becomes the page's ancestor on create and on update.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::Context`] wrapping the failed read or
    /// write; a concurrent modification wraps
    /// [`ConfluenceError::StaleVersion`].
    pub fn upsert(
        &self,
        space: &str,
        title: &str,
        content: &str,
        parent: Option<&PageId>,
    ) -> Result<UpsertOutcome, ConfluenceError> {
        let existing = PageResolver::new(self.api).resolve(space, title)?;

        let Some(existing) = existing else {
            let page = self
                .api
                .create_page(&NewPage {
                    space,
                    title,
                    content,
                    parent,
                })
                .map_err(|e| e.context(Operation::Create, space, title))?;
            return Ok(UpsertOutcome {
                id: page.id,
                action: UpsertAction::Created,
            });
        };

        if existing.content == content {
            debug!(space, title, page_id = %existing.id, "Content unchanged, skipping write");
            return Ok(UpsertOutcome {
                id: existing.id,
                action: UpsertAction::Unchanged,
            });
        }

        self.api
            .update_page(&PageUpdate {
                id: &existing.id,
                title,
                content,
                version: existing.version,
                parent,
                message: self.version_message.as_deref(),
            })
            .map_err(|e| e.context(Operation::Update, space, title))?;

        let to = existing.version + 1;
        info!(space, title, page_id = %existing.id, version = to, "Page updated");
        Ok(UpsertOutcome {
            id: existing.id,
            action: UpsertAction::Updated {
                from: existing.version,
                to,
            },
        })
    }
}
