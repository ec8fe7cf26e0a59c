//! Shared blocking HTTP plumbing for the REST clients.

use std::io::Read;
use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::de::DeserializeOwned;
use ureq::Agent;

use crate::auth::Auth;
use crate::error::ConfluenceError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Characters escaped in query values (RFC 3986 unreserved set kept).
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Authenticated agent bound to one base URL.
pub(crate) struct RestClient {
    agent: Agent,
    base_url: String,
    auth: Auth,
}

impl RestClient {
    pub(crate) fn new(base_url: &str, auth: Auth) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
            auth,
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `{base_url}{path}?{query}` and decode the JSON body.
    pub(crate) fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ConfluenceError> {
        let url = build_url(&self.base_url, path, query);
        let response = self.get(&url, "application/json")?;
        Ok(response.into_body().read_json()?)
    }

    /// GET `{base_url}{path}` and return the raw body.
    pub(crate) fn get_bytes(&self, path: &str) -> Result<Vec<u8>, ConfluenceError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.get(&url, "*/*")?;
        let mut data = Vec::new();
        response.into_body().into_reader().read_to_end(&mut data)?;
        Ok(data)
    }

    fn get(
        &self,
        url: &str,
        accept: &str,
    ) -> Result<ureq::http::Response<ureq::Body>, ConfluenceError> {
        let mut request = self.agent.get(url).header("Accept", accept);
        if let Some(header) = self.auth.header() {
            request = request.header("Authorization", &header);
        }

        let response = request.call()?;
        let status = response.status().as_u16();

        if status >= 400 {
            let error_body = response
                .into_body()
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ConfluenceError::HttpResponse {
                status,
                body: error_body,
            });
        }

        Ok(response)
    }
}

/// Join base URL, path and percent-encoded query parameters.
fn build_url(base_url: &str, path: &str, query: &[(&str, &str)]) -> String {
    let mut url = format!("{base_url}{path}");
    for (i, (key, value)) in query.iter().enumerate() {
        url.push(if i == 0 { '?' } else { '&' });
        url.push_str(key);
        url.push('=');
        url.extend(utf8_percent_encode(value, QUERY_VALUE));
    }
    url
}
