//! Confluence space types.

use serde::Deserialize;

/// Confluence space as returned by `space/{key}?expand=homepage`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpaceRecord {
    /// Space key.
    pub key: String,
    /// Space name.
    pub name: String,
    /// Space type (`global`, `personal`).
    #[serde(rename = "type")]
    pub space_type: String,
    /// Space description.
    pub description: SpaceDescription,
    /// Space homepage.
    pub homepage: Option<HomepageRef>,
}

/// Space description expansion.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpaceDescription {
    /// Plain-text description.
    pub plain: PlainText,
}

/// Plain-text value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlainText {
    /// Text.
    pub value: String,
}

/// Homepage reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HomepageRef {
    /// Homepage ID.
    pub id: String,
    /// Homepage title.
    pub title: String,
}
