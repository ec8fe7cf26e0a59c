//! Export path templating and href generation.

use std::collections::HashMap;
use std::sync::LazyLock;

use cme_config::{ExportConfig, HrefStyle};
use regex::{Captures, Regex};

use crate::model::{Attachment, Page, Space};
use crate::registry::Registry;
use crate::util::relative_path;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(\w+)\}").unwrap());

/// Names Windows refuses as file stems.
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Page and attachment path templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplates {
    pub page: String,
    pub attachment: String,
}

impl PathTemplates {
    pub fn from_config(config: &ExportConfig) -> Self {
        Self {
            page: config.page_path.clone(),
            attachment: config.attachment_path.clone(),
        }
    }

    /// Export path of a page, relative to the output root.
    pub fn page_path(&self, page: &Page, registry: &Registry) -> String {
        let mut vars = location_vars(&page.space, &page.ancestors, registry);
        vars.insert("page_id", page.id.to_string());
        vars.insert("page_title", sanitize_filename(&page.title));
        render(&self.page, &vars)
    }

    /// Export path of an attachment, relative to the output root.
    pub fn attachment_path(&self, attachment: &Attachment, registry: &Registry) -> String {
        let mut vars = location_vars(&attachment.space, &attachment.ancestors, registry);
        vars.insert("attachment_id", attachment.id.clone());
        vars.insert("attachment_title", sanitize_filename(&attachment.title));
        vars.insert("attachment_file_id", sanitize_filename(&attachment.file_id));
        vars.insert("attachment_extension", attachment.extension());
        render(&self.attachment, &vars)
    }
}

/// Variables shared by pages and attachments.
fn location_vars(
    space: &Space,
    ancestors: &[u64],
    registry: &Registry,
) -> HashMap<&'static str, String> {
    let homepage_title = space
        .homepage
        .map(|id| sanitize_filename(&registry.page(id).title))
        .unwrap_or_default();

    let ancestor_titles = ancestors
        .iter()
        .map(|id| sanitize_filename(&registry.page(*id).title))
        .collect::<Vec<_>>()
        .join("/");

    let ancestor_ids = ancestors
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join("/");

    HashMap::from([
        ("space_key", sanitize_filename(&space.key)),
        ("space_name", sanitize_filename(&space.name)),
        (
            "homepage_id",
            space.homepage.map(|id| id.to_string()).unwrap_or_default(),
        ),
        ("homepage_title", homepage_title),
        ("ancestor_ids", ancestor_ids),
        ("ancestor_titles", ancestor_titles),
    ])
}

/// Substitute `{name}` placeholders. Unknown names are kept verbatim and
/// empty path segments are dropped.
fn render(template: &str, vars: &HashMap<&'static str, String>) -> String {
    let substituted = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        vars.get(&caps[1])
            .cloned()
            .unwrap_or_else(|| caps[0].to_owned())
    });

    substituted
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Make a title safe to use as a single path segment.
///
/// Characters invalid on common file systems become `_`, trailing dots and
/// spaces are removed and reserved device names get a `_` suffix.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim().trim_end_matches(['.', ' ']);

    let stem = trimmed.split('.').next().unwrap_or_default();
    if RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(stem)) {
        return format!("{trimmed}_");
    }

    trimmed.to_owned()
}

/// Href from the page at `from_path` to `target`, spaces encoded as `%20`.
pub fn href(from_path: &str, target: &str, style: HrefStyle) -> String {
    let href = match style {
        HrefStyle::Absolute => format!("/{}", target.trim_start_matches('/')),
        HrefStyle::Relative => relative_path(from_path, target),
    };
    href.replace(' ', "%20")
}
