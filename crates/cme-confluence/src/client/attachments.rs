//! Attachment operations for Confluence API.

use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{AttachmentRecord, Paged};

impl ConfluenceClient {
    /// List one page of attachments on a page.
    pub(crate) fn get_attachments(
        &self,
        page_id: u64,
        start: usize,
        limit: usize,
    ) -> Result<Paged<AttachmentRecord>, ConfluenceError> {
        info!("Getting attachments for page {} (start={})", page_id, start);

        let start = start.to_string();
        let limit = limit.to_string();
        self.api_get(
            &format!("/content/{page_id}/child/attachment"),
            &[
                ("start", start.as_str()),
                ("limit", limit.as_str()),
                ("expand", "container.ancestors,version"),
            ],
        )
    }
}
