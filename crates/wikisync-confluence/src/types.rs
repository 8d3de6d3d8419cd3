//! Confluence content types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend-assigned page identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    /// Create a page ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The ID as sent to the REST API.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Confluence page.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Page {
    /// Page ID.
    pub id: PageId,
    /// Page title.
    pub title: String,
    /// Version information.
    pub version: Version,
    /// Page body content (present when expanded).
    #[serde(default)]
    pub body: Option<Body>,
}

impl Page {
    /// Storage format body, if it was expanded in the response.
    #[must_use]
    pub fn storage(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| body.storage.as_ref())
            .map(|storage| storage.value.as_str())
    }
}

/// Page version.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Version {
    /// Version number.
    pub number: u32,
    /// Version message/comment.
    #[serde(default)]
    pub message: Option<String>,
}

/// Page body content.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Body {
    /// Storage format content.
    #[serde(default)]
    pub storage: Option<Storage>,
}

/// Storage format representation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Storage {
    /// XHTML content in Confluence storage format.
    pub value: String,
    /// Content representation (always "storage").
    pub representation: String,
}

/// Content search response.
#[derive(Debug, Deserialize)]
pub struct SearchResults {
    /// Matching pages.
    pub results: Vec<Page>,
    /// Number of results in this response.
    #[serde(default)]
    pub size: usize,
}

/// Page to create.
#[derive(Debug, Clone, Copy)]
pub struct NewPage<'a> {
    /// Space key.
    pub space: &'a str,
    /// Page title.
    pub title: &'a str,
    /// Storage format body.
    pub content: &'a str,
    /// Parent page, if any.
    pub parent: Option<&'a PageId>,
}

/// New version of an existing page.
#[derive(Debug, Clone, Copy)]
pub struct PageUpdate<'a> {
    /// Page ID.
    pub id: &'a PageId,
    /// Page title.
    pub title: &'a str,
    /// Storage format body.
    pub content: &'a str,
    /// Version the update is based on; the page is written as `version + 1`.
    pub version: u32,
    /// Parent page, if any.
    pub parent: Option<&'a PageId>,
    /// Version message.
    pub message: Option<&'a str>,
}
