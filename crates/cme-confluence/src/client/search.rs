//! CQL search for Confluence API.

use tracing::info;

use super::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::types::{Paged, SearchResult};

impl ConfluenceClient {
    /// Run one page of a CQL query.
    pub(crate) fn search_cql(
        &self,
        cql: &str,
        start: usize,
        limit: usize,
    ) -> Result<Paged<SearchResult>, ConfluenceError> {
        info!("Searching '{}' (start={}, limit={})", cql, start, limit);

        let start = start.to_string();
        let limit = limit.to_string();
        self.api_get(
            "/search",
            &[("cql", cql), ("start", start.as_str()), ("limit", limit.as_str())],
        )
    }
}
