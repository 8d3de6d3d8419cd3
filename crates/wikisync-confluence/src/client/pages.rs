//! Page operations for Confluence API.

use serde_json::json;
use tracing::{debug, info};

use super::{ConfluenceClient, read_body, unavailable};
use crate::api::ContentApi;
use crate::error::ConfluenceError;
use crate::types::{NewPage, Page, PageId, PageUpdate, SearchResults};

/// Fields expanded on every page read.
const PAGE_EXPAND: &str = "version,body.storage";

impl ContentApi for ConfluenceClient {
    fn find_pages(&self, space: &str, title: &str) -> Result<Vec<Page>, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        debug!(space, title, "Searching page by title");

        let response = self
            .agent
            .get(&url)
            .query("spaceKey", space)
            .query("title", title)
            .query("type", "page")
            .query("expand", PAGE_EXPAND)
            .header("Authorization", self.auth.header())
            .header("Accept", "application/json")
            .call()
            .map_err(unavailable)?;

        let results: SearchResults = serde_json::from_str(&read_body(response)?)?;
        Ok(results.results)
    }

    fn get_page(&self, id: &PageId) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), id);

        debug!(page_id = %id, "Getting page");

        let response = self
            .agent
            .get(&url)
            .query("expand", PAGE_EXPAND)
            .header("Authorization", self.auth.header())
            .header("Accept", "application/json")
            .call()
            .map_err(unavailable)?;

        Ok(serde_json::from_str(&read_body(response)?)?)
    }

    fn create_page(&self, page: &NewPage<'_>) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        let mut payload = json!({
            "type": "page",
            "title": page.title,
            "space": {"key": page.space},
            "body": {
                "storage": {
                    "value": page.content,
                    "representation": "storage"
                }
            }
        });

        if let Some(parent) = page.parent {
            payload["ancestors"] = json!([{"id": parent}]);
        }

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .post(&url)
            .header("Authorization", self.auth.header())
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])
            .map_err(unavailable)?;

        let created: Page = serde_json::from_str(&read_body(response)?)?;
        info!(
            "Created page '{}' ({}) in space {}",
            created.title, created.id, page.space
        );
        Ok(created)
    }

    fn update_page(&self, update: &PageUpdate<'_>) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), update.id);

        let mut payload = json!({
            "type": "page",
            "title": update.title,
            "body": {
                "storage": {
                    "value": update.content,
                    "representation": "storage"
                }
            },
            "version": {"number": update.version + 1}
        });

        if let Some(msg) = update.message {
            payload["version"]["message"] = json!(msg);
        }
        if let Some(parent) = update.parent {
            payload["ancestors"] = json!([{"id": parent}]);
        }

        info!(
            "Updating page {} from version {} to {}",
            update.id,
            update.version,
            update.version + 1
        );

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .put(&url)
            .header("Authorization", self.auth.header())
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])
            .map_err(unavailable)?;

        let body = read_body(response).map_err(|err| conflict_as_stale(err, update))?;

        let page: Page = serde_json::from_str(&body)?;
        info!("Updated page {} to version {}", update.id, page.version.number);
        Ok(page)
    }
}

/// An update rejected with 409 was based on an outdated version.
fn conflict_as_stale(err: ConfluenceError, update: &PageUpdate<'_>) -> ConfluenceError {
    match err {
        ConfluenceError::Http { status: 409, .. } => ConfluenceError::StaleVersion {
            id: update.id.clone(),
            title: update.title.to_owned(),
            version: update.version,
        },
        other => other,
    }
}
