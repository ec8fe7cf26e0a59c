//! Confluence attachment types.

use serde::Deserialize;

use super::{ContentRef, Expandable, LinksRecord, VersionRecord};

/// Confluence attachment as returned by `content/{id}/child/attachment`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttachmentRecord {
    /// Attachment ID (`att123`).
    pub id: String,
    /// Attachment title/filename.
    pub title: String,
    /// File details.
    pub extensions: AttachmentExtensions,
    /// Owning page with its ancestors.
    pub container: ContainerRecord,
    /// Version information.
    pub version: Option<VersionRecord>,
    /// Links to unexpanded fields.
    #[serde(rename = "_expandable")]
    pub expandable: Expandable,
    /// Hypermedia links, including the download link.
    #[serde(rename = "_links")]
    pub links: LinksRecord,
}

/// Attachment file details.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttachmentExtensions {
    /// Size in bytes.
    pub file_size: u64,
    /// Media type (`image/png`).
    pub media_type: String,
    /// Human readable media type.
    pub media_type_description: String,
    /// Content-addressed file identifier.
    pub file_id: String,
    /// Media collection name.
    pub collection_name: String,
    /// Upload comment.
    pub comment: String,
}

/// Page owning an attachment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContainerRecord {
    /// Page ID.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Ancestors of the page.
    pub ancestors: Vec<ContentRef>,
}
