//! Page operations for Confluence API.

use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{PageRecord, Paged};

/// Expansions needed to convert a page.
const PAGE_EXPAND: &str =
    "body.view,body.export_view,body.editor2,metadata.labels,metadata.properties,ancestors,version";

impl ConfluenceClient {
    /// Get page by ID with bodies and metadata expanded.
    pub(crate) fn get_page(&self, page_id: u64) -> Result<PageRecord, ConfluenceError> {
        info!("Getting page {}", page_id);
        self.api_get(&format!("/content/{page_id}"), &[("expand", PAGE_EXPAND)])
    }

    /// Get page by space key and title.
    ///
    /// Returns a 404 [`ConfluenceError::HttpResponse`] when nothing matches.
    pub(crate) fn get_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<PageRecord, ConfluenceError> {
        info!("Looking up page '{}' in space {}", title, space_key);

        let response: Paged<PageRecord> = self.api_get(
            "/content",
            &[
                ("type", "page"),
                ("spaceKey", space_key),
                ("title", title),
                ("expand", "version"),
            ],
        )?;

        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ConfluenceError::HttpResponse {
                status: 404,
                body: format!("No page titled '{title}' in space {space_key}"),
            })
    }
}
