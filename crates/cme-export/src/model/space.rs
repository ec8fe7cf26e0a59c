use cme_confluence::types::SpaceRecord;

/// Wiki space.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Space {
    pub key: String,
    pub name: String,
    pub space_type: String,
    /// Plain-text description.
    pub description: String,
    /// Homepage ID, absent for empty spaces and placeholders.
    pub homepage: Option<u64>,
}

impl Space {
    pub fn from_record(record: SpaceRecord) -> Self {
        Self {
            key: record.key,
            name: record.name,
            space_type: record.space_type,
            description: record.description.plain.value,
            homepage: record.homepage.and_then(|h| h.id.parse().ok()),
        }
    }
}
