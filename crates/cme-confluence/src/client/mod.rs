//! Confluence REST API client.
//!
//! Provides a sync, read-only HTTP client for the Confluence REST API v1
//! (Cloud and Server/Data Center) with Basic or Bearer authentication.

mod attachments;
mod pages;
mod search;
mod spaces;
mod users;

use tracing::info;

use crate::auth::Auth;
use crate::error::ConfluenceError;
use crate::http::RestClient;
use crate::source::{ContentSource, UserLookup};
use crate::types::{
    AttachmentRecord, PageRecord, Paged, SearchResult, SpaceRecord, UserRecord,
};

/// API prefix below the instance base URL.
const API_PREFIX: &str = "/rest/api";

/// Confluence REST API client.
pub struct ConfluenceClient {
    http: RestClient,
}

impl ConfluenceClient {
    /// Create client for the instance at `base_url`.
    ///
    /// # Arguments
    /// * `base_url` - Confluence base URL (`https://example.atlassian.net/wiki`)
    /// * `auth` - credentials attached to every request
    pub fn new(base_url: &str, auth: Auth) -> Self {
        Self {
            http: RestClient::new(base_url, auth),
        }
    }

    /// Instance base URL without trailing slash.
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// GET an API path below `/rest/api`.
    fn api_get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ConfluenceError> {
        self.http.get_json(&format!("{API_PREFIX}{path}"), query)
    }

    /// Download attachment data.
    pub(crate) fn download_attachment(
        &self,
        download_link: &str,
    ) -> Result<Vec<u8>, ConfluenceError> {
        info!("Downloading {}", download_link);
        self.http.get_bytes(download_link)
    }
}

impl ContentSource for ConfluenceClient {
    fn page(&self, page_id: u64) -> Result<PageRecord, ConfluenceError> {
        self.get_page(page_id)
    }

    fn page_by_title(&self, space_key: &str, title: &str) -> Result<PageRecord, ConfluenceError> {
        self.get_page_by_title(space_key, title)
    }

    fn attachments(
        &self,
        page_id: u64,
        start: usize,
        limit: usize,
    ) -> Result<Paged<AttachmentRecord>, ConfluenceError> {
        self.get_attachments(page_id, start, limit)
    }

    fn space(&self, space_key: &str) -> Result<SpaceRecord, ConfluenceError> {
        self.get_space(space_key)
    }

    fn spaces(&self, start: usize, limit: usize) -> Result<Paged<SpaceRecord>, ConfluenceError> {
        self.get_spaces(start, limit)
    }

    fn user(&self, lookup: &UserLookup) -> Result<UserRecord, ConfluenceError> {
        self.get_user(lookup)
    }

    fn search(
        &self,
        cql: &str,
        start: usize,
        limit: usize,
    ) -> Result<Paged<SearchResult>, ConfluenceError> {
        self.search_cql(cql, start, limit)
    }

    fn download(&self, download_link: &str) -> Result<Vec<u8>, ConfluenceError> {
        self.download_attachment(download_link)
    }
}
