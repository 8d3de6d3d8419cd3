//! Content API seam between the upsert protocol and the REST client.

use crate::error::ConfluenceError;
use crate::types::{NewPage, Page, PageId, PageUpdate};

/// Page operations the resolver and upserter are built on.
///
/// Implemented by [`ConfluenceClient`](crate::ConfluenceClient) for the real
/// REST API and by [`DryRunApi`](crate::DryRunApi), which forwards reads and
/// only records writes.
pub trait ContentApi: Send + Sync {
    /// Find pages by exact title in a space, with version and storage body
    /// expanded.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn find_pages(&self, space: &str, title: &str) -> Result<Vec<Page>, ConfluenceError>;

    /// Get a page by ID with version and storage body expanded.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn get_page(&self, id: &PageId) -> Result<Page, ConfluenceError>;

    /// Create a page at version 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    fn create_page(&self, page: &NewPage<'_>) -> Result<Page, ConfluenceError>;

    /// Write a new version of an existing page.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::StaleVersion`] if `update.version` is no
    /// longer the current version, or another error if the request fails.
    fn update_page(&self, update: &PageUpdate<'_>) -> Result<Page, ConfluenceError>;
}
