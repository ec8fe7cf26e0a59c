//! Reference registry.
//!
//! Resolves page, user, space and issue references to model entities. Every
//! identifier is fetched at most once per run; results stay cached until the
//! registry is dropped. Failed page fetches are cached as placeholders, other
//! failed lookups as misses reported with [`ExportError::Unresolved`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use cme_confluence::{ContentSource, IssueTracker, UserLookup};
use tracing::{debug, info, warn};

use crate::error::ExportError;
use crate::model::{Attachment, JiraIssue, Page, PageLocator, Space, User, parse_id};

/// Attachments requested per call.
const ATTACHMENT_PAGE_SIZE: usize = 50;

/// Search hits requested per call when collecting descendants.
const DESCENDANT_PAGE_SIZE: usize = 100;

/// Spaces requested per call when listing all spaces.
const SPACE_PAGE_SIZE: usize = 50;

/// Something a page body can point at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Reference {
    Page(u64),
    User(UserLookup),
    Space(String),
    Issue(String),
}

/// Resolved reference.
#[derive(Debug, Clone)]
pub enum Entity {
    Page(Rc<Page>),
    User(Rc<User>),
    Space(Rc<Space>),
    Issue(Rc<JiraIssue>),
}

/// Memoizing resolver over a content source and an optional issue tracker.
pub struct Registry {
    source: Box<dyn ContentSource>,
    issues: Option<Box<dyn IssueTracker>>,
    pages: RefCell<HashMap<u64, Rc<Page>>>,
    spaces: RefCell<HashMap<String, Option<Rc<Space>>>>,
    users: RefCell<HashMap<UserLookup, Option<Rc<User>>>>,
    issue_cache: RefCell<HashMap<String, Option<Rc<JiraIssue>>>>,
}

impl Registry {
    pub fn new(source: Box<dyn ContentSource>) -> Self {
        Self {
            source,
            issues: None,
            pages: RefCell::new(HashMap::new()),
            spaces: RefCell::new(HashMap::new()),
            users: RefCell::new(HashMap::new()),
            issue_cache: RefCell::new(HashMap::new()),
        }
    }

    /// Enable issue resolution.
    #[must_use]
    pub fn with_issue_tracker(mut self, tracker: Box<dyn IssueTracker>) -> Self {
        self.issues = Some(tracker);
        self
    }

    /// Underlying content source, for uncached calls such as downloads.
    pub fn source(&self) -> &dyn ContentSource {
        self.source.as_ref()
    }

    /// Resolve any reference.
    ///
    /// Page references never fail; see [`Self::page`].
    pub fn resolve(&self, reference: &Reference) -> Result<Entity, ExportError> {
        Ok(match reference {
            Reference::Page(id) => Entity::Page(self.page(*id)),
            Reference::User(lookup) => Entity::User(self.user(lookup)?),
            Reference::Space(key) => Entity::Space(self.space(key)?),
            Reference::Issue(key) => Entity::Issue(self.issue(key)?),
        })
    }

    /// Page referenced from another page.
    ///
    /// Fetch failures are logged and cached as an inaccessible placeholder.
    pub fn page(&self, page_id: u64) -> Rc<Page> {
        if let Some(page) = self.cached_page(page_id) {
            return page;
        }

        match self.build_page(page_id) {
            Ok(page) => self.cache_page(page),
            Err(e) => {
                warn!("Could not access page with ID {}: {}", page_id, e);
                self.cache_page(Page::inaccessible(page_id))
            }
        }
    }

    /// Page being exported.
    ///
    /// Unlike [`Self::page`], fetch failures propagate. A placeholder cached
    /// by an earlier reference is reported as [`ExportError::PageInaccessible`].
    pub fn fetch_page(&self, page_id: u64) -> Result<Rc<Page>, ExportError> {
        if let Some(page) = self.cached_page(page_id) {
            if page.is_accessible() {
                return Ok(page);
            }
            return Err(ExportError::PageInaccessible(page_id));
        }

        match self.build_page(page_id) {
            Ok(page) => Ok(self.cache_page(page)),
            Err(e) => {
                self.cache_page(Page::inaccessible(page_id));
                Err(e)
            }
        }
    }

    /// Resolve a page ID or URL to a page ID.
    pub fn locate(&self, locator: &PageLocator) -> Result<u64, ExportError> {
        match locator {
            PageLocator::Id(id) => Ok(*id),
            PageLocator::Title { space_key, title } => {
                let record = self.source.page_by_title(space_key, title)?;
                parse_id(&record.id)
            }
        }
    }

    pub fn user(&self, lookup: &UserLookup) -> Result<Rc<User>, ExportError> {
        if let Some(cached) = self.users.borrow().get(lookup) {
            debug!("User cache hit: {}", lookup);
            return cached
                .as_ref()
                .map(Rc::clone)
                .ok_or_else(|| ExportError::Unresolved(lookup.to_string()));
        }

        let result = self.source.user(lookup).map(|r| Rc::new(User::from_record(r)));
        let entry = result.as_ref().ok().map(Rc::clone);
        self.users.borrow_mut().insert(lookup.clone(), entry);
        Ok(result?)
    }

    /// Space by key. The empty key resolves to an empty space without a fetch.
    pub fn space(&self, space_key: &str) -> Result<Rc<Space>, ExportError> {
        if let Some(cached) = self.spaces.borrow().get(space_key) {
            debug!("Space cache hit: {}", space_key);
            return cached
                .as_ref()
                .map(Rc::clone)
                .ok_or_else(|| ExportError::Unresolved(format!("space {space_key}")));
        }

        if space_key.is_empty() {
            return Ok(self.cache_space(space_key, Space::default()));
        }

        match self.source.space(space_key) {
            Ok(record) => Ok(self.cache_space(space_key, Space::from_record(record))),
            Err(e) => {
                warn!("Could not access space {}: {}", space_key, e);
                self.spaces.borrow_mut().insert(space_key.to_owned(), None);
                Err(e.into())
            }
        }
    }

    pub fn issue(&self, key: &str) -> Result<Rc<JiraIssue>, ExportError> {
        let tracker = self.issues.as_ref().ok_or(ExportError::NoIssueTracker)?;

        if let Some(cached) = self.issue_cache.borrow().get(key) {
            return cached
                .as_ref()
                .map(Rc::clone)
                .ok_or_else(|| ExportError::Unresolved(key.to_owned()));
        }

        let result = tracker
            .issue(key)
            .map(|r| Rc::new(JiraIssue::from_record(r)));
        let entry = result.as_ref().ok().map(Rc::clone);
        self.issue_cache.borrow_mut().insert(key.to_owned(), entry);
        Ok(result?)
    }

    /// IDs of all pages below `page_id`.
    ///
    /// A page that no longer exists has no descendants.
    pub fn descendants(&self, page_id: u64) -> Result<Vec<u64>, ExportError> {
        let cql = format!("ancestor={page_id} AND type=page");
        let mut ids = Vec::new();
        let mut start = 0;
        let mut total = DESCENDANT_PAGE_SIZE;

        while start < total {
            let response = match self.source.search(&cql, start, DESCENDANT_PAGE_SIZE) {
                Ok(response) => response,
                Err(e) if e.is_not_found() => {
                    warn!(
                        "Content with ID {} not found when fetching descendants",
                        page_id
                    );
                    return Ok(Vec::new());
                }
                Err(e) => return Err(e.into()),
            };

            for result in &response.results {
                if let Some(content) = &result.content {
                    ids.push(parse_id(&content.id)?);
                }
            }

            total = response.total_size.unwrap_or(0);
            if response.size == 0 {
                break;
            }
            start += response.size;
        }

        info!("Found {} descendants of page {}", ids.len(), page_id);
        Ok(ids)
    }

    /// Homepage followed by all its descendants.
    pub fn space_pages(&self, space_key: &str) -> Result<Vec<u64>, ExportError> {
        let space = self.space(space_key)?;
        let Some(homepage) = space.homepage else {
            warn!("Space {} has no homepage", space_key);
            return Ok(Vec::new());
        };

        let mut ids = vec![homepage];
        ids.extend(self.descendants(homepage)?);
        Ok(ids)
    }

    /// All global, current spaces.
    pub fn all_spaces(&self) -> Result<Vec<Rc<Space>>, ExportError> {
        let mut spaces = Vec::new();
        let mut start = 0;

        loop {
            let response = self.source.spaces(start, SPACE_PAGE_SIZE)?;
            for record in response.results {
                let key = record.key.clone();
                spaces.push(self.cache_space(&key, Space::from_record(record)));
            }
            if response.size < SPACE_PAGE_SIZE {
                break;
            }
            start += response.size;
        }

        info!("Found {} spaces", spaces.len());
        Ok(spaces)
    }

    fn cached_page(&self, page_id: u64) -> Option<Rc<Page>> {
        let page = self.pages.borrow().get(&page_id).map(Rc::clone);
        if page.is_some() {
            debug!("Page cache hit: {}", page_id);
        }
        page
    }

    fn cache_page(&self, page: Page) -> Rc<Page> {
        let page = Rc::new(page);
        self.pages.borrow_mut().insert(page.id, Rc::clone(&page));
        page
    }

    fn cache_space(&self, key: &str, space: Space) -> Rc<Space> {
        let space = Rc::new(space);
        self.spaces
            .borrow_mut()
            .insert(key.to_owned(), Some(Rc::clone(&space)));
        space
    }

    /// Fetch a page with its attachments and space.
    fn build_page(&self, page_id: u64) -> Result<Page, ExportError> {
        let record = self.source.page(page_id)?;
        let space = self.space(record.expandable.space_key())?;
        let attachments = self.attachments(page_id)?;
        Page::from_record(record, attachments, space)
    }

    /// All attachments of a page, paged until a short page is returned.
    fn attachments(&self, page_id: u64) -> Result<Vec<Attachment>, ExportError> {
        let mut attachments = Vec::new();
        let mut start = 0;

        loop {
            let response = self
                .source
                .attachments(page_id, start, ATTACHMENT_PAGE_SIZE)?;
            let size = response.size;

            for record in response.results {
                let space = self.space(record.expandable.space_key())?;
                attachments.push(Attachment::from_record(record, space)?);
            }

            if size < ATTACHMENT_PAGE_SIZE {
                break;
            }
            start += size;
        }

        Ok(attachments)
    }
}
