//! HTTP Basic authentication for Confluence Cloud API tokens.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;

/// HTTP Basic credentials (username + API token).
pub(crate) struct BasicAuth {
    header: String,
}

impl BasicAuth {
    pub(crate) fn new(username: &str, api_token: &str) -> Self {
        let encoded = BASE64_STANDARD.encode(format!("{username}:{api_token}"));
        Self {
            header: format!("Basic {encoded}"),
        }
    }

    /// Value of the `Authorization` header.
    pub(crate) fn header(&self) -> &str {
        &self.header
    }
}
