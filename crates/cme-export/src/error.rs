//! Error types for export operations.

use cme_confluence::ConfluenceError;

/// Error during conversion or export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Upstream API error.
    #[error(transparent)]
    Confluence(#[from] ConfluenceError),

    /// I/O error while writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Record carried an ID that is not numeric.
    #[error("Invalid page ID: {0}")]
    InvalidId(String),

    /// Page could not be fetched earlier in this run.
    #[error("Page {0} is not accessible")]
    PageInaccessible(u64),

    /// Page URL matched neither supported form.
    #[error("Could not parse page URL {0}")]
    InvalidUrl(String),

    /// CQL query rejected by the server.
    #[error("Invalid CQL query: {0}")]
    InvalidQuery(String),

    /// Reference failed to resolve earlier in this run.
    #[error("Unresolved reference: {0}")]
    Unresolved(String),

    /// Issue reference without a configured issue tracker.
    #[error("No issue tracker configured")]
    NoIssueTracker,

    /// Metadata document failed validation.
    #[error("Invalid metadata: {0}")]
    Metadata(String),

    /// YAML serialization error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
