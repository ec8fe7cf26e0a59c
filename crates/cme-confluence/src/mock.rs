//! In-memory content source for testing.
//!
//! Provides [`MockSource`] and [`MockIssueTracker`] for unit testing without
//! network access, plus record constructors for building fixtures.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::ConfluenceError;
use crate::source::{ContentSource, IssueTracker, UserLookup};
use crate::types::{
    AttachmentRecord, ContentRef, HomepageRef, IssueRecord, PageRecord, Paged, SearchResult,
    SpaceRecord, UserRecord,
};

fn not_found(what: &str) -> ConfluenceError {
    ConfluenceError::HttpResponse {
        status: 404,
        body: format!("{what} not found"),
    }
}

/// Return `items[start..start + limit]` as a page.
fn slice<T: Clone>(items: &[T], start: usize, limit: usize, total: Option<usize>) -> Paged<T> {
    let end = items.len().min(start.saturating_add(limit));
    let results = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();
    Paged::new(results, total)
}

/// Shared log of source calls, kept across clones.
#[derive(Debug, Clone, Default)]
struct CallLog(Rc<RefCell<Vec<String>>>);

impl CallLog {
    fn record(&self, call: String) {
        self.0.borrow_mut().push(call);
    }

    fn count(&self, call: &str) -> usize {
        self.0.borrow().iter().filter(|c| *c == call).count()
    }
}

/// Mock content source for testing.
///
/// Stores records in memory. Use the builder methods to configure the mock
/// with test data. Clones share the call log, so a test can keep a clone and
/// assert how often the registry hit the source.
///
/// # Example
///
/// ```ignore
/// use cme_confluence::MockSource;
/// use cme_confluence::mock::page_record;
///
/// let source = MockSource::new().with_page(page_record(1, "Home", "DOCS"));
/// let spy = source.clone();
/// // ... hand `source` to the registry ...
/// assert_eq!(spy.calls("page:1"), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    pages: HashMap<u64, PageRecord>,
    page_errors: HashMap<u64, u16>,
    attachments: HashMap<u64, Vec<AttachmentRecord>>,
    spaces: Vec<SpaceRecord>,
    users: HashMap<UserLookup, UserRecord>,
    searches: HashMap<String, Vec<SearchResult>>,
    search_errors: HashMap<String, u16>,
    downloads: HashMap<String, Vec<u8>>,
    calls: CallLog,
}

impl MockSource {
    /// Create a new empty mock source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a page. The ID is parsed from the record.
    #[must_use]
    pub fn with_page(mut self, page: PageRecord) -> Self {
        let id = page.id.parse().unwrap_or_default();
        self.pages.insert(id, page);
        self
    }

    /// Make fetching a page fail with the given HTTP status.
    #[must_use]
    pub fn with_page_error(mut self, page_id: u64, status: u16) -> Self {
        self.page_errors.insert(page_id, status);
        self
    }

    /// Attach an attachment to a page.
    #[must_use]
    pub fn with_attachment(mut self, page_id: u64, attachment: AttachmentRecord) -> Self {
        self.attachments.entry(page_id).or_default().push(attachment);
        self
    }

    /// Add a space.
    #[must_use]
    pub fn with_space(mut self, space: SpaceRecord) -> Self {
        self.spaces.push(space);
        self
    }

    /// Add a user reachable through `lookup`.
    #[must_use]
    pub fn with_user(mut self, lookup: UserLookup, user: UserRecord) -> Self {
        self.users.insert(lookup, user);
        self
    }

    /// Register the page IDs a CQL query returns.
    #[must_use]
    pub fn with_search(self, cql: &str, page_ids: &[u64]) -> Self {
        let results = page_ids
            .iter()
            .map(|id| SearchResult {
                content: Some(ContentRef {
                    id: id.to_string(),
                    content_type: "page".to_owned(),
                    title: String::new(),
                }),
            })
            .collect();
        self.with_search_results(cql, results)
    }

    /// Register raw search hits for a CQL query.
    #[must_use]
    pub fn with_search_results(mut self, cql: &str, results: Vec<SearchResult>) -> Self {
        self.searches.insert(cql.to_owned(), results);
        self
    }

    /// Make a CQL query fail with the given HTTP status.
    #[must_use]
    pub fn with_search_error(mut self, cql: &str, status: u16) -> Self {
        self.search_errors.insert(cql.to_owned(), status);
        self
    }

    /// Serve `data` for a download link.
    #[must_use]
    pub fn with_download(mut self, download_link: &str, data: impl Into<Vec<u8>>) -> Self {
        self.downloads.insert(download_link.to_owned(), data.into());
        self
    }

    /// Number of times `call` was made (`page:1`, `space:DOCS`, `user:username=jdoe`,
    /// `attachments:1`, `search:<cql>`, `download:<link>`, `spaces`).
    pub fn calls(&self, call: &str) -> usize {
        self.calls.count(call)
    }
}

impl ContentSource for MockSource {
    fn page(&self, page_id: u64) -> Result<PageRecord, ConfluenceError> {
        self.calls.record(format!("page:{page_id}"));
        if let Some(status) = self.page_errors.get(&page_id) {
            return Err(ConfluenceError::HttpResponse {
                status: *status,
                body: "Injected failure".to_owned(),
            });
        }
        self.pages
            .get(&page_id)
            .cloned()
            .ok_or_else(|| not_found(&format!("Page {page_id}")))
    }

    fn page_by_title(&self, space_key: &str, title: &str) -> Result<PageRecord, ConfluenceError> {
        self.calls.record(format!("title:{space_key}/{title}"));
        self.pages
            .values()
            .find(|p| p.title == title && p.expandable.space_key() == space_key)
            .cloned()
            .ok_or_else(|| not_found(&format!("Page '{title}'")))
    }

    fn attachments(
        &self,
        page_id: u64,
        start: usize,
        limit: usize,
    ) -> Result<Paged<AttachmentRecord>, ConfluenceError> {
        self.calls.record(format!("attachments:{page_id}"));
        let items = self.attachments.get(&page_id).map_or(&[][..], Vec::as_slice);
        Ok(slice(items, start, limit, None))
    }

    fn space(&self, space_key: &str) -> Result<SpaceRecord, ConfluenceError> {
        self.calls.record(format!("space:{space_key}"));
        self.spaces
            .iter()
            .find(|s| s.key == space_key)
            .cloned()
            .ok_or_else(|| not_found(&format!("Space {space_key}")))
    }

    fn spaces(&self, start: usize, limit: usize) -> Result<Paged<SpaceRecord>, ConfluenceError> {
        self.calls.record("spaces".to_owned());
        Ok(slice(&self.spaces, start, limit, None))
    }

    fn user(&self, lookup: &UserLookup) -> Result<UserRecord, ConfluenceError> {
        self.calls.record(format!("user:{lookup}"));
        self.users
            .get(lookup)
            .cloned()
            .ok_or_else(|| not_found(&format!("User {lookup}")))
    }

    fn search(
        &self,
        cql: &str,
        start: usize,
        limit: usize,
    ) -> Result<Paged<SearchResult>, ConfluenceError> {
        self.calls.record(format!("search:{cql}"));
        if let Some(status) = self.search_errors.get(cql) {
            return Err(ConfluenceError::HttpResponse {
                status: *status,
                body: "Injected failure".to_owned(),
            });
        }
        let items = self.searches.get(cql).map_or(&[][..], Vec::as_slice);
        Ok(slice(items, start, limit, Some(items.len())))
    }

    fn download(&self, download_link: &str) -> Result<Vec<u8>, ConfluenceError> {
        self.calls.record(format!("download:{download_link}"));
        self.downloads
            .get(download_link)
            .cloned()
            .ok_or_else(|| not_found(download_link))
    }
}

/// Mock issue tracker for testing.
#[derive(Debug, Clone, Default)]
pub struct MockIssueTracker {
    issues: HashMap<String, IssueRecord>,
    calls: CallLog,
}

impl MockIssueTracker {
    /// Create a new empty mock tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an issue with the given summary.
    #[must_use]
    pub fn with_issue(mut self, key: &str, summary: &str) -> Self {
        let mut issue = IssueRecord {
            key: key.to_owned(),
            ..IssueRecord::default()
        };
        summary.clone_into(&mut issue.fields.summary);
        self.issues.insert(key.to_owned(), issue);
        self
    }

    /// Number of times `key` was fetched.
    pub fn calls(&self, key: &str) -> usize {
        self.calls.count(key)
    }
}

impl IssueTracker for MockIssueTracker {
    fn issue(&self, key: &str) -> Result<IssueRecord, ConfluenceError> {
        self.calls.record(key.to_owned());
        self.issues
            .get(key)
            .cloned()
            .ok_or_else(|| not_found(&format!("Issue {key}")))
    }
}

/// Page record in `space_key` with empty bodies.
pub fn page_record(id: u64, title: &str, space_key: &str) -> PageRecord {
    let mut page = PageRecord {
        id: id.to_string(),
        content_type: "page".to_owned(),
        status: "current".to_owned(),
        title: title.to_owned(),
        ..PageRecord::default()
    };
    page.expandable.space = format!("/rest/api/space/{space_key}");
    page
}

/// Attachment record with a file ID and media type.
pub fn attachment_record(id: &str, title: &str, file_id: &str, media_type: &str) -> AttachmentRecord {
    let mut attachment = AttachmentRecord {
        id: id.to_owned(),
        title: title.to_owned(),
        ..AttachmentRecord::default()
    };
    file_id.clone_into(&mut attachment.extensions.file_id);
    media_type.clone_into(&mut attachment.extensions.media_type);
    attachment.links.download = format!("/download/attachments/{id}/{title}");
    attachment
}

/// Space record with a homepage.
pub fn space_record(key: &str, name: &str, homepage_id: u64) -> SpaceRecord {
    SpaceRecord {
        key: key.to_owned(),
        name: name.to_owned(),
        space_type: "global".to_owned(),
        homepage: Some(HomepageRef {
            id: homepage_id.to_string(),
            title: String::new(),
        }),
        ..SpaceRecord::default()
    }
}

/// User record with a display name.
pub fn user_record(username: &str, display_name: &str) -> UserRecord {
    UserRecord {
        username: username.to_owned(),
        display_name: display_name.to_owned(),
        ..UserRecord::default()
    }
}
