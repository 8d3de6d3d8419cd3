//! Read-only content API decorator for dry runs.

use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::info;

use crate::api::ContentApi;
use crate::error::ConfluenceError;
use crate::types::{Body, NewPage, Page, PageId, PageUpdate, Storage, Version};

/// Prefix of the IDs handed out for pages that would be created.
const DRY_RUN_ID_PREFIX: &str = "dry-run-";

/// Forwards reads to the wrapped API and only logs writes.
///
/// Creates return a page with a synthetic ID so that children of a page
/// that does not exist yet can still be planned.
pub struct DryRunApi<A> {
    inner: A,
    next_id: AtomicUsize,
    planned_writes: AtomicUsize,
}

impl<A: ContentApi> DryRunApi<A> {
    /// Wrap a content API.
    #[must_use]
    pub fn new(inner: A) -> Self {
        Self {
            inner,
            next_id: AtomicUsize::new(1),
            planned_writes: AtomicUsize::new(0),
        }
    }

    /// Number of writes that were skipped.
    #[must_use]
    pub fn planned_writes(&self) -> usize {
        self.planned_writes.load(Ordering::SeqCst)
    }

    /// Get the wrapped API.
    #[must_use]
    pub fn inner(&self) -> &A {
        &self.inner
    }
}

fn planned_page(id: PageId, title: &str, content: &str, version: u32) -> Page {
    Page {
        id,
        title: title.to_owned(),
        version: Version {
            number: version,
            message: None,
        },
        body: Some(Body {
            storage: Some(Storage {
                value: content.to_owned(),
                representation: "storage".to_owned(),
            }),
        }),
    }
}

impl<A: ContentApi> ContentApi for DryRunApi<A> {
    fn find_pages(&self, space: &str, title: &str) -> Result<Vec<Page>, ConfluenceError> {
        self.inner.find_pages(space, title)
    }

    fn get_page(&self, id: &PageId) -> Result<Page, ConfluenceError> {
        self.inner.get_page(id)
    }

    fn create_page(&self, page: &NewPage<'_>) -> Result<Page, ConfluenceError> {
        let id = PageId::new(format!(
            "{DRY_RUN_ID_PREFIX}{}",
            self.next_id.fetch_add(1, Ordering::SeqCst)
        ));
        let parent = page.parent.map_or_else(|| "-".to_owned(), ToString::to_string);
        info!(
            "[dry-run] Would create page '{}' in space {} under {}",
            page.title, page.space, parent
        );
        self.planned_writes.fetch_add(1, Ordering::SeqCst);
        Ok(planned_page(id, page.title, page.content, 1))
    }

    fn update_page(&self, update: &PageUpdate<'_>) -> Result<Page, ConfluenceError> {
        info!(
            "[dry-run] Would update page '{}' ({}) from version {} to {}",
            update.title,
            update.id,
            update.version,
            update.version + 1
        );
        self.planned_writes.fetch_add(1, Ordering::SeqCst);
        Ok(planned_page(
            update.id.clone(),
            update.title,
            update.content,
            update.version + 1,
        ))
    }
}
