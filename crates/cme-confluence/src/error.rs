//! Error types for Confluence and Jira integration.

/// Error from Confluence or Jira API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// I/O error.
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

impl ConfluenceError {
    /// HTTP status code of the response, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpResponse { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server reported that the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        let err = ConfluenceError::HttpResponse {
            status: 404,
            body: "No content found".to_owned(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_other_status_is_not_not_found() {
        let err = ConfluenceError::HttpResponse {
            status: 403,
            body: String::new(),
        };
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "HTTP error: 403 - ");
    }

    #[test]
    fn test_io_error_has_no_status() {
        let err = ConfluenceError::from(std::io::Error::other("boom"));
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
    }
}
