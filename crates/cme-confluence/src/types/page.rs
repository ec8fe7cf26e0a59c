//! Confluence page types.

use serde::Deserialize;

use super::VersionRecord;

/// Confluence page as returned by `content/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageRecord {
    /// Page ID.
    pub id: String,
    /// Content type (`page`, `blogpost`).
    #[serde(rename = "type")]
    pub content_type: String,
    /// Content status (`current`, `draft`, ...).
    pub status: String,
    /// Page title.
    pub title: String,
    /// Rendered bodies.
    pub body: BodyRecord,
    /// Labels and properties.
    pub metadata: PageMetadataRecord,
    /// Ancestors, from the space root down to the immediate parent.
    pub ancestors: Vec<ContentRef>,
    /// Version information.
    pub version: Option<VersionRecord>,
    /// Links to unexpanded fields.
    #[serde(rename = "_expandable")]
    pub expandable: Expandable,
    /// Hypermedia links.
    #[serde(rename = "_links")]
    pub links: LinksRecord,
}

/// Page body representations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BodyRecord {
    /// Rendered view HTML.
    pub view: Representation,
    /// Export view HTML (macros fully expanded).
    pub export_view: Representation,
    /// Editor storage markup.
    pub editor2: Representation,
}

/// Single body representation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Representation {
    /// Markup.
    pub value: String,
}

/// Page metadata expansion.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageMetadataRecord {
    /// Page labels.
    pub labels: Labels,
}

/// Label collection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Labels {
    /// Labels.
    pub results: Vec<LabelRecord>,
}

/// Page label.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LabelRecord {
    /// Label ID.
    pub id: String,
    /// Label name.
    pub name: String,
    /// Label prefix (`global`, `my`, `team`).
    pub prefix: String,
}

/// Reference to another piece of content.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContentRef {
    /// Content ID.
    pub id: String,
    /// Content type.
    #[serde(rename = "type")]
    pub content_type: String,
    /// Content title.
    pub title: String,
}

/// Unexpanded field links.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Expandable {
    /// Space API path (`/rest/api/space/KEY`).
    pub space: String,
}

impl Expandable {
    /// Space key taken from the last segment of the space link.
    pub fn space_key(&self) -> &str {
        self.space.rsplit('/').next().unwrap_or_default()
    }
}

/// Hypermedia links.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LinksRecord {
    /// Web UI link.
    pub webui: String,
    /// Download link (attachments only).
    pub download: String,
}
