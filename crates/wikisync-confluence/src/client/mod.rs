//! Confluence REST API client.
//!
//! Provides a sync HTTP client for the Confluence REST API (`/rest/api`)
//! with HTTP Basic authentication (username + API token).

mod pages;

use std::time::Duration;

use ureq::Agent;
use wikisync_config::ConfluenceConfig;

use crate::auth::BasicAuth;
use crate::error::ConfluenceError;

/// Confluence REST API client.
pub struct ConfluenceClient {
    agent: Agent,
    base_url: String,
    auth: BasicAuth,
}

impl ConfluenceClient {
    /// Create client from explicit values.
    ///
    /// # Arguments
    /// * `base_url` - Confluence base URL (trailing slash is ignored)
    /// * `username` - account name for Basic authentication
    /// * `api_token` - API token used as the password
    /// * `timeout` - overall timeout applied to every request
    #[must_use]
    pub fn new(base_url: &str, username: &str, api_token: &str, timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth: BasicAuth::new(username, api_token),
        }
    }

    /// Create client from the `[confluence]` configuration section.
    #[must_use]
    pub fn from_config(config: &ConfluenceConfig) -> Self {
        Self::new(
            &config.base_url,
            &config.username,
            &config.api_token,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Get the API base URL.
    fn api_url(&self) -> String {
        format!("{}/rest/api", self.base_url)
    }
}

/// Map a transport failure (connection refused, DNS, timeout).
fn unavailable(err: ureq::Error) -> ConfluenceError {
    ConfluenceError::Unavailable(err.to_string())
}

/// Read the response body, mapping error statuses.
fn read_body(response: ureq::http::Response<ureq::Body>) -> Result<String, ConfluenceError> {
    let status = response.status().as_u16();
    let body = response.into_body().read_to_string();
    if status < 400 {
        return body.map_err(unavailable);
    }
    let body = body.unwrap_or_else(|_| "(unable to read error body)".to_owned());
    Err(status_error(status, body))
}

/// Error for a response status from 400 up.
///
/// 401/403 are authentication failures and gateway errors mean the backend
/// is unreachable; anything else is returned with its body.
fn status_error(status: u16, body: String) -> ConfluenceError {
    match status {
        401 | 403 => ConfluenceError::Authentication { status },
        502..=504 => ConfluenceError::Unavailable(format!("HTTP {status}")),
        _ => ConfluenceError::Http { status, body },
    }
}
