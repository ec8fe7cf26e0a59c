//! Space operations for Confluence API.

use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{Paged, SpaceRecord};

impl ConfluenceClient {
    /// Get space by key with its homepage.
    pub(crate) fn get_space(&self, space_key: &str) -> Result<SpaceRecord, ConfluenceError> {
        info!("Getting space {}", space_key);
        self.api_get(
            &format!("/space/{space_key}"),
            &[("expand", "homepage,description.plain")],
        )
    }

    /// List one page of global, current spaces.
    pub(crate) fn get_spaces(
        &self,
        start: usize,
        limit: usize,
    ) -> Result<Paged<SpaceRecord>, ConfluenceError> {
        info!("Listing spaces (start={})", start);

        let start = start.to_string();
        let limit = limit.to_string();
        self.api_get(
            "/space",
            &[
                ("type", "global"),
                ("status", "current"),
                ("start", start.as_str()),
                ("limit", limit.as_str()),
                ("expand", "homepage,description.plain"),
            ],
        )
    }
}
