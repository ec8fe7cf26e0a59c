//! Confluence user and version types.

use serde::Deserialize;

/// Confluence user.
///
/// Cloud instances fill `account_id`, Server/Data Center instances fill
/// `username` and `user_key`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserRecord {
    /// Cloud account ID.
    pub account_id: String,
    /// Server username.
    pub username: String,
    /// Server user key.
    pub user_key: String,
    /// Display name.
    pub display_name: String,
    /// Public name.
    pub public_name: String,
    /// Email address (empty unless visible).
    pub email: String,
}

/// Content version.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VersionRecord {
    /// Version number.
    pub number: u32,
    /// Author of this version.
    pub by: UserRecord,
    /// ISO-8601 timestamp.
    pub when: String,
    /// Human readable timestamp (`Jan 05, 2024`).
    pub friendly_when: String,
}
