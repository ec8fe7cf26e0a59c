//! Jira issue types.

use serde::Deserialize;

/// Jira issue as returned by `rest/api/2/issue/{key}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IssueRecord {
    /// Issue key (`PROJ-1`).
    pub key: String,
    /// Issue fields.
    pub fields: IssueFields,
}

/// Subset of issue fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IssueFields {
    /// One-line summary.
    pub summary: String,
    /// Wiki-markup description.
    pub description: Option<String>,
    /// Workflow status.
    pub status: IssueStatus,
}

/// Issue workflow status.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IssueStatus {
    /// Status name (`In Progress`).
    pub name: String,
}
