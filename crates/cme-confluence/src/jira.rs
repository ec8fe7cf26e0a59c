//! Jira REST API client.

use tracing::info;

use crate::auth::Auth;
use crate::error::ConfluenceError;
use crate::http::RestClient;
use crate::source::IssueTracker;
use crate::types::IssueRecord;

/// Jira REST API v2 client.
pub struct JiraClient {
    http: RestClient,
}

impl JiraClient {
    /// Create client for the Jira instance at `base_url`.
    pub fn new(base_url: &str, auth: Auth) -> Self {
        Self {
            http: RestClient::new(base_url, auth),
        }
    }
}

impl IssueTracker for JiraClient {
    fn issue(&self, key: &str) -> Result<IssueRecord, ConfluenceError> {
        info!("Getting issue {}", key);
        self.http.get_json(
            &format!("/rest/api/2/issue/{key}"),
            &[("fields", "summary,description,status")],
        )
    }
}
