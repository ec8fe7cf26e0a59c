use std::rc::Rc;
use std::sync::LazyLock;

use cme_confluence::types::PageRecord;
use percent_encoding::percent_decode_str;
use regex::Regex;

use super::{Attachment, Label, Space, Version, parse_id};
use crate::error::ExportError;
use crate::util::escape_html;

/// Title of the placeholder returned for pages that could not be fetched.
pub const INACCESSIBLE_TITLE: &str = "[Error: Page not accessible]";

static PAGE_ID_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/wiki/.+?/pages/(\d+)").unwrap());

static SPACE_TITLE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/([^/]+?)/([^/]+)$").unwrap());

/// Wiki page with its rendered bodies and attachments.
#[derive(Debug, Clone)]
pub struct Page {
    pub id: u64,
    pub title: String,
    pub content_type: String,
    pub status: String,
    pub space: Rc<Space>,
    /// Rendered view HTML.
    pub body: String,
    /// Export view HTML, with macros such as the TOC fully expanded.
    pub body_export: String,
    /// Editor storage markup.
    pub editor2: String,
    pub labels: Vec<Label>,
    pub attachments: Vec<Attachment>,
    /// Ancestor IDs from the first page below the space root down to the
    /// immediate parent.
    pub ancestors: Vec<u64>,
    pub version: Option<Version>,
    accessible: bool,
}

impl Page {
    pub fn from_record(
        record: PageRecord,
        attachments: Vec<Attachment>,
        space: Rc<Space>,
    ) -> Result<Self, ExportError> {
        let ancestors = record
            .ancestors
            .iter()
            .skip(1)
            .map(|a| parse_id(&a.id))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id: parse_id(&record.id)?,
            title: record.title,
            content_type: record.content_type,
            status: record.status,
            space,
            body: record.body.view.value,
            body_export: record.body.export_view.value,
            editor2: record.body.editor2.value,
            labels: record
                .metadata
                .labels
                .results
                .into_iter()
                .map(Label::from_record)
                .collect(),
            attachments,
            ancestors,
            version: record.version.map(Version::from_record),
            accessible: true,
        })
    }

    /// Placeholder for a page that could not be fetched.
    pub fn inaccessible(id: u64) -> Self {
        Self {
            id,
            title: INACCESSIBLE_TITLE.to_owned(),
            content_type: String::new(),
            status: String::new(),
            space: Rc::new(Space::default()),
            body: String::new(),
            body_export: String::new(),
            editor2: String::new(),
            labels: Vec::new(),
            attachments: Vec::new(),
            ancestors: Vec::new(),
            version: None,
            accessible: false,
        }
    }

    /// Whether this page was fetched successfully.
    pub fn is_accessible(&self) -> bool {
        self.accessible
    }

    /// View HTML, optionally prefixed with the title as a heading.
    pub fn html(&self, include_title: bool) -> String {
        if include_title {
            format!("<h1>{}</h1>{}", escape_html(&self.title), self.body)
        } else {
            self.body.clone()
        }
    }

    /// First attachment whose ID contains `id`.
    ///
    /// Links carry bare numeric IDs while attachment IDs are prefixed (`att123`).
    pub fn attachment_by_id(&self, id: &str) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.id.contains(id))
    }

    pub fn attachment_by_file_id(&self, file_id: &str) -> Option<&Attachment> {
        self.attachments.iter().find(|a| a.file_id == file_id)
    }

    /// All attachments with the given title.
    pub fn attachments_by_title(&self, title: &str) -> Vec<&Attachment> {
        self.attachments.iter().filter(|a| a.title == title).collect()
    }
}

/// How a page was identified on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLocator {
    Id(u64),
    Title { space_key: String, title: String },
}

impl PageLocator {
    /// Parse a numeric page ID or a page URL.
    ///
    /// Supported URL forms are `.../wiki/spaces/KEY/pages/123/...` and
    /// `https://host/KEY/Page+Title`.
    pub fn parse(input: &str) -> Result<Self, ExportError> {
        let input = input.trim();
        if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) {
            return parse_id(input).map(Self::Id);
        }

        let path = url_path(input);
        let path = path.trim_end_matches('/');

        if let Some(caps) = PAGE_ID_PATH.captures(path) {
            return parse_id(&caps[1]).map(Self::Id);
        }

        if let Some(caps) = SPACE_TITLE_PATH.captures(path) {
            return Ok(Self::Title {
                space_key: unquote_plus(&caps[1]),
                title: unquote_plus(&caps[2]),
            });
        }

        Err(ExportError::InvalidUrl(input.to_owned()))
    }
}

/// Path component of a URL (without scheme, host, query and fragment).
fn url_path(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = rest.find('/').map_or("", |i| &rest[i..]);
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}

/// Decode a URL path segment where `+` stands for a space.
fn unquote_plus(segment: &str) -> String {
    let spaced = segment.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}
