//! User operations for Confluence API.

use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::source::UserLookup;
use crate::types::UserRecord;

impl ConfluenceClient {
    /// Get user details by account ID, username or user key.
    pub(crate) fn get_user(&self, lookup: &UserLookup) -> Result<UserRecord, ConfluenceError> {
        info!("Getting user {}", lookup);

        let (param, value) = match lookup {
            UserLookup::AccountId(id) => ("accountId", id),
            UserLookup::Username(name) => ("username", name),
            UserLookup::UserKey(key) => ("key", key),
        };
        self.api_get("/user", &[(param, value.as_str())])
    }
}
