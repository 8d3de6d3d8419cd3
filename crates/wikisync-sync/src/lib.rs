//! Hierarchical document synchronization for wikisync.
//!
//! Turns a directory of documents into a Confluence page tree:
//!
//! - [`Scanner`] finds documents under the source directory
//! - [`HierarchyParser`] derives page titles from each filename
//! - [`Synchronizer`] upserts ancestor pages, then converts and upserts every
//!   document as a leaf page, and reports the outcome per document
//!
//! The synchronizer works against any [`ContentApi`](wikisync_confluence::ContentApi),
//! so the same run can target the REST client or a dry-run wrapper.

mod error;
mod hierarchy;
mod orchestrator;
mod report;
mod scanner;

pub use error::{HierarchyError, SyncError};
pub use hierarchy::{HierarchyChain, HierarchyParser};
pub use orchestrator::{FailurePolicy, Synchronizer};
pub use report::{DocumentReport, DocumentStatus, SyncReport};
pub use scanner::Scanner;
