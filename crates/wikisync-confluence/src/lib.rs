//! Confluence integration for wikisync.
//!
//! This crate provides the remote half of synchronization:
//! - [`ConfluenceClient`]: REST API client with HTTP Basic authentication
//! - [`ContentApi`]: page operations the upsert protocol is written against
//! - [`PageResolver`]: `(space, title)` to current page state
//! - [`PageUpserter`]: idempotent, version-aware create-or-update
//! - [`DryRunApi`]: forwards reads and records writes without sending them
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::time::Duration;
//! use wikisync_confluence::{ConfluenceClient, PageUpserter};
//!
//! let client = ConfluenceClient::new(
//!     "https://example.atlassian.net/wiki",
//!     "bot@example.com",
//!     "api-token",
//!     Duration::from_secs(30),
//! );
//! let outcome = PageUpserter::new(&client).upsert("DOCS", "Guide", "<p>Hello</p>", None)?;
//! println!("{} -> {:?}", outcome.id, outcome.action);
//! # Ok(())
//! # }
//! ```

mod api;
mod auth;
mod client;
mod dry_run;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod resolver;
mod types;
mod upsert;

pub use api::ContentApi;
pub use client::ConfluenceClient;
pub use dry_run::DryRunApi;
pub use error::{ConfluenceError, Operation};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockContentApi, MockFailure};
pub use resolver::{PageResolver, ResolvedPage};
pub use types::{Body, NewPage, Page, PageId, PageUpdate, SearchResults, Storage, Version};
pub use upsert::{PageUpserter, UpsertAction, UpsertOutcome};
