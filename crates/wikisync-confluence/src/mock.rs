//! In-memory content API for testing.
//!
//! Provides [`MockContentApi`] for unit testing without a Confluence server.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::api::ContentApi;
use crate::error::ConfluenceError;
use crate::types::{Body, NewPage, Page, PageId, PageUpdate, Storage, Version};

/// Failure injected for a page title.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Lookups fail as if the server were unreachable.
    Unavailable,
    /// Lookups fail with 401.
    Authentication,
    /// Lookups fail with the given HTTP status.
    Http(u16),
    /// Updates are rejected as stale.
    Conflict,
}

impl MockFailure {
    fn lookup_error(self) -> Option<ConfluenceError> {
        match self {
            Self::Unavailable => Some(ConfluenceError::Unavailable(
                "connection refused".to_owned(),
            )),
            Self::Authentication => Some(ConfluenceError::Authentication { status: 401 }),
            Self::Http(status) => Some(ConfluenceError::Http {
                status,
                body: "injected failure".to_owned(),
            }),
            Self::Conflict => None,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredPage {
    space: String,
    page: Page,
    parent: Option<PageId>,
}

/// Mock content API for testing.
///
/// Stores pages in memory with real optimistic versioning: an update based
/// on anything but the current version is rejected as stale. Counts reads
/// (`find_pages`, `get_page`) and accepted writes (`create_page`,
/// `update_page`).
///
/// # Example
///
/// ```ignore
/// use wikisync_confluence::{MockContentApi, PageUpserter};
///
/// let api = MockContentApi::new().with_page("DOCS", "Guide", "<p>Hi</p>");
/// PageUpserter::new(&api).upsert("DOCS", "Guide", "<p>Hi</p>", None)?;
/// assert_eq!(api.writes(), 0);
/// ```
#[derive(Debug, Default)]
pub struct MockContentApi {
    pages: RwLock<Vec<StoredPage>>,
    failures: RwLock<HashMap<String, MockFailure>>,
    omit_search_bodies: bool,
    next_id: AtomicUsize,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MockContentApi {
    /// Create a new empty mock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an existing page at version 1.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_page(self, space: &str, title: &str, content: &str) -> Self {
        let id = self.allocate_id();
        self.pages.write().unwrap().push(StoredPage {
            space: space.to_owned(),
            page: build_page(id, title, content, 1, None),
            parent: None,
        });
        self
    }

    /// Inject a failure for every request concerning `title`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, title: &str, failure: MockFailure) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(title.to_owned(), failure);
        self
    }

    /// Return search results without storage bodies.
    #[must_use]
    pub fn without_search_bodies(mut self) -> Self {
        self.omit_search_bodies = true;
        self
    }

    /// Number of read requests served.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of writes accepted.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current state of a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn page(&self, space: &str, title: &str) -> Option<Page> {
        self.pages
            .read()
            .unwrap()
            .iter()
            .find(|stored| stored.space == space && stored.page.title == title)
            .map(|stored| stored.page.clone())
    }

    /// Ancestor of a page.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn parent_of(&self, id: &PageId) -> Option<PageId> {
        self.pages
            .read()
            .unwrap()
            .iter()
            .find(|stored| &stored.page.id == id)
            .and_then(|stored| stored.parent.clone())
    }

    /// Number of stored pages.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.read().unwrap().len()
    }

    fn allocate_id(&self) -> PageId {
        PageId::new((1000 + self.next_id.fetch_add(1, Ordering::SeqCst)).to_string())
    }

    fn failure(&self, title: &str) -> Option<MockFailure> {
        self.failures.read().unwrap().get(title).copied()
    }
}

fn build_page(id: PageId, title: &str, content: &str, version: u32, message: Option<&str>) -> Page {
    Page {
        id,
        title: title.to_owned(),
        version: Version {
            number: version,
            message: message.map(ToOwned::to_owned),
        },
        body: Some(Body {
            storage: Some(Storage {
                value: content.to_owned(),
                representation: "storage".to_owned(),
            }),
        }),
    }
}

impl ContentApi for MockContentApi {
    fn find_pages(&self, space: &str, title: &str) -> Result<Vec<Page>, ConfluenceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failure(title).and_then(MockFailure::lookup_error) {
            return Err(err);
        }

        let pages = self.pages.read().unwrap();
        Ok(pages
            .iter()
            .filter(|stored| stored.space == space && stored.page.title == title)
            .map(|stored| {
                let mut page = stored.page.clone();
                if self.omit_search_bodies {
                    page.body = None;
                }
                page
            })
            .collect())
    }

    fn get_page(&self, id: &PageId) -> Result<Page, ConfluenceError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.pages
            .read()
            .unwrap()
            .iter()
            .find(|stored| &stored.page.id == id)
            .map(|stored| stored.page.clone())
            .ok_or_else(|| ConfluenceError::Http {
                status: 404,
                body: format!("no page {id}"),
            })
    }

    fn create_page(&self, new: &NewPage<'_>) -> Result<Page, ConfluenceError> {
        let id = self.allocate_id();
        let page = build_page(id, new.title, new.content, 1, None);
        self.pages.write().unwrap().push(StoredPage {
            space: new.space.to_owned(),
            page: page.clone(),
            parent: new.parent.cloned(),
        });
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(page)
    }

    fn update_page(&self, update: &PageUpdate<'_>) -> Result<Page, ConfluenceError> {
        let stale = || ConfluenceError::StaleVersion {
            id: update.id.clone(),
            title: update.title.to_owned(),
            version: update.version,
        };
        if self.failure(update.title) == Some(MockFailure::Conflict) {
            return Err(stale());
        }

        let mut pages = self.pages.write().unwrap();
        let stored = pages
            .iter_mut()
            .find(|stored| &stored.page.id == update.id)
            .ok_or_else(|| ConfluenceError::Http {
                status: 404,
                body: format!("no page {}", update.id),
            })?;
        if stored.page.version.number != update.version {
            return Err(stale());
        }

        stored.page = build_page(
            update.id.clone(),
            update.title,
            update.content,
            update.version + 1,
            update.message,
        );
        if let Some(parent) = update.parent {
            stored.parent = Some(parent.clone());
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(stored.page.clone())
    }
}
