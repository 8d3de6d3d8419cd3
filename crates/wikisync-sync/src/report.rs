//! Per-document and per-run synchronization results.

use std::path::PathBuf;

use wikisync_confluence::{PageId, UpsertAction};

use crate::error::SyncError;

/// Final state of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentStatus {
    /// Leaf page is in sync.
    Synced {
        /// ID of the document's page.
        leaf_id: PageId,
        /// What the leaf upsert did.
        action: UpsertAction,
        /// Writes issued for this document, ancestors created or updated on
        /// its behalf included.
        writes: usize,
    },
    /// Document was not processed and no backend call was made.
    Skipped {
        /// Why the document was skipped.
        reason: String,
    },
    /// Processing failed.
    Failed {
        /// Error with its chain of causes.
        error: String,
    },
    /// The run stopped before the document was reached.
    NotAttempted,
}

/// Result for one document.
#[derive(Debug, Clone)]
pub struct DocumentReport {
    /// Source file.
    pub path: PathBuf,
    /// Page titles derived from the filename, empty when skipped.
    pub titles: Vec<String>,
    /// Final state.
    pub status: DocumentStatus,
}

/// Result of a synchronization run.
#[derive(Debug, Default)]
pub struct SyncReport {
    /// One entry per discovered document, in discovery order.
    pub documents: Vec<DocumentReport>,
    /// Pages created (ancestors and leaves).
    pub created: usize,
    /// Pages updated (ancestors and leaves).
    pub updated: usize,
    /// Pages left untouched because their content was identical.
    pub unchanged: usize,
    /// Error that stopped the run early, if any.
    pub abort: Option<SyncError>,
}

impl SyncReport {
    /// Record a page action in the counters.
    pub(crate) fn count(&mut self, action: UpsertAction) {
        match action {
            UpsertAction::Created => self.created += 1,
            UpsertAction::Updated { .. } => self.updated += 1,
            UpsertAction::Unchanged => self.unchanged += 1,
        }
    }

    /// Number of documents whose leaf page is in sync.
    #[must_use]
    pub fn synced(&self) -> usize {
        self.count_status(|s| matches!(s, DocumentStatus::Synced { .. }))
    }

    /// Number of skipped documents.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count_status(|s| matches!(s, DocumentStatus::Skipped { .. }))
    }

    /// Number of failed documents.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count_status(|s| matches!(s, DocumentStatus::Failed { .. }))
    }

    /// Number of documents not reached because the run stopped.
    #[must_use]
    pub fn not_attempted(&self) -> usize {
        self.count_status(|s| matches!(s, DocumentStatus::NotAttempted))
    }

    /// Whether every document was synced or skipped and the run completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.abort.is_none() && self.failed() == 0
    }

    /// Turn an aborted run into its error.
    ///
    /// # Errors
    ///
    /// Returns the error that stopped the run.
    pub fn into_result(mut self) -> Result<Self, SyncError> {
        match self.abort.take() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    fn count_status(&self, predicate: impl Fn(&DocumentStatus) -> bool) -> usize {
        self.documents
            .iter()
            .filter(|doc| predicate(&doc.status))
            .count()
    }
}
