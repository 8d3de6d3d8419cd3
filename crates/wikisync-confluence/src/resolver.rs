//! Title-to-page resolution.

use tracing::warn;

use crate::api::ContentApi;
use crate::error::{ConfluenceError, Operation};
use crate::types::PageId;

/// Current state of an existing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPage {
    /// Page ID.
    pub id: PageId,
    /// Current version number.
    pub version: u32,
    /// Current storage format body.
    pub content: String,
}

/// Looks up pages by `(space, title)`.
pub struct PageResolver<'a, A: ContentApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: ContentApi + ?Sized> PageResolver<'a, A> {
    /// Create a resolver over a content API.
    #[must_use]
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Resolve a page by exact title within a space.
    ///
    /// Returns `Ok(None)` when no page has that title. When several pages
    /// match, the first one is used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfluenceError::Context`] wrapping the API failure.
    pub fn resolve(&self, space: &str, title: &str) -> Result<Option<ResolvedPage>, ConfluenceError> {
        self.lookup(space, title)
            .map_err(|e| e.context(Operation::Resolve, space, title))
    }

    fn lookup(&self, space: &str, title: &str) -> Result<Option<ResolvedPage>, ConfluenceError> {
        let mut pages = self.api.find_pages(space, title)?;
        if pages.len() > 1 {
            warn!(
                space,
                title,
                count = pages.len(),
                "Multiple pages share a title, using the first"
            );
        }
        if pages.is_empty() {
            return Ok(None);
        }
        let page = pages.swap_remove(0);

        if let Some(content) = page.storage() {
            return Ok(Some(ResolvedPage {
                content: content.to_owned(),
                id: page.id,
                version: page.version.number,
            }));
        }

        // Search responses may omit the body; fetch it by ID
        let page = self.api.get_page(&page.id)?;
        Ok(Some(ResolvedPage {
            content: page.storage().unwrap_or_default().to_owned(),
            id: page.id,
            version: page.version.number,
        }))
    }
}
