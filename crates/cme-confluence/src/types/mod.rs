//! Raw REST API records.
//!
//! Only fields the exporter reads are declared. Serde ignores unknown fields,
//! and every field defaults so partial expansions deserialize cleanly.

mod attachment;
mod issue;
mod page;
mod space;
mod user;

pub use attachment::{AttachmentExtensions, AttachmentRecord, ContainerRecord};
pub use issue::{IssueFields, IssueRecord, IssueStatus};
pub use page::{
    BodyRecord, ContentRef, Expandable, LabelRecord, Labels, LinksRecord, PageMetadataRecord,
    PageRecord, Representation,
};
pub use space::{HomepageRef, PlainText, SpaceDescription, SpaceRecord};
pub use user::{UserRecord, VersionRecord};

use serde::Deserialize;

/// Paged collection response.
#[derive(Debug, Clone, Deserialize)]
pub struct Paged<T> {
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    /// Number of items on this page.
    #[serde(default)]
    pub size: usize,
    /// Total number of matching items (search endpoints only).
    #[serde(rename = "totalSize", default)]
    pub total_size: Option<usize>,
}

impl<T> Paged<T> {
    /// Build a page of results with an optional declared total.
    pub fn new(results: Vec<T>, total_size: Option<usize>) -> Self {
        Self {
            size: results.len(),
            results,
            total_size,
        }
    }
}

/// Single CQL search hit.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchResult {
    /// Matched content, absent for non-content hits (spaces, users).
    pub content: Option<ContentRef>,
}
