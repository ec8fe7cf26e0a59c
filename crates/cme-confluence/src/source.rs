//! Content source abstractions.
//!
//! The exporter talks to Confluence and Jira only through these traits so
//! conversion and export can run against [`MockSource`](crate::MockSource)
//! in tests.

use std::fmt;

use crate::error::ConfluenceError;
use crate::types::{
    AttachmentRecord, IssueRecord, PageRecord, Paged, SearchResult, SpaceRecord, UserRecord,
};

/// Key used to look up a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserLookup {
    /// Cloud account ID.
    AccountId(String),
    /// Server username.
    Username(String),
    /// Server user key.
    UserKey(String),
}

impl fmt::Display for UserLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccountId(id) => write!(f, "accountId={id}"),
            Self::Username(name) => write!(f, "username={name}"),
            Self::UserKey(key) => write!(f, "key={key}"),
        }
    }
}

/// Read access to wiki content.
pub trait ContentSource {
    /// Fetch a page with bodies, labels, properties and ancestors expanded.
    fn page(&self, page_id: u64) -> Result<PageRecord, ConfluenceError>;

    /// Find a page by space key and exact title.
    fn page_by_title(&self, space_key: &str, title: &str) -> Result<PageRecord, ConfluenceError>;

    /// List one page of attachments of a page.
    fn attachments(
        &self,
        page_id: u64,
        start: usize,
        limit: usize,
    ) -> Result<Paged<AttachmentRecord>, ConfluenceError>;

    /// Fetch a space with its homepage.
    fn space(&self, space_key: &str) -> Result<SpaceRecord, ConfluenceError>;

    /// List one page of global, current spaces.
    fn spaces(&self, start: usize, limit: usize) -> Result<Paged<SpaceRecord>, ConfluenceError>;

    /// Fetch user details.
    fn user(&self, lookup: &UserLookup) -> Result<UserRecord, ConfluenceError>;

    /// Run one page of a CQL search.
    fn search(
        &self,
        cql: &str,
        start: usize,
        limit: usize,
    ) -> Result<Paged<SearchResult>, ConfluenceError>;

    /// Download attachment data from its download link.
    fn download(&self, download_link: &str) -> Result<Vec<u8>, ConfluenceError>;
}

/// Read access to issues.
pub trait IssueTracker {
    /// Fetch an issue by key.
    fn issue(&self, key: &str) -> Result<IssueRecord, ConfluenceError>;
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_user_lookup_display() {
        assert_eq!(UserLookup::AccountId("557058:abc".to_owned()).to_string(), "accountId=557058:abc");
        assert_eq!(UserLookup::Username("jdoe".to_owned()).to_string(), "username=jdoe");
        assert_eq!(UserLookup::UserKey("8a7f".to_owned()).to_string(), "key=8a7f");
    }
}
