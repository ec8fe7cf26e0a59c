//! Confluence view HTML to Markdown conversion.
//!
//! A page body is parsed once and converted by recursive descent. Each
//! element's children are converted first and joined with collapsed
//! newlines; `div` and `span` elements are routed through the macro
//! dispatch table, everything else follows Markdown defaults compatible
//! with common HTML-to-Markdown converters (ATX headings, `-` bullets,
//! GFM tables and alerts).
//!
//! # Example
//!
//! ```ignore
//! let markdown = Converter::new(&page, &registry, &config, &paths).markdown();
//! ```

mod context;
mod dispatch;
mod elements;
mod links;
mod macros;
mod table;

pub use context::Context;
pub use dispatch::{Handler, Route};

use std::sync::LazyLock;

use cme_config::ExportConfig;
use regex::Regex;
use scraper::Html;

use crate::front_matter::FrontMatter;
use crate::model::Page;
use crate::path::PathTemplates;
use crate::registry::Registry;

static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static BLANK_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[ \t]+$").unwrap());

/// Converts one page to Markdown.
///
/// Page properties found in the body are collected while converting and
/// rendered as front matter afterwards.
pub struct Converter<'a> {
    page: &'a Page,
    registry: &'a Registry,
    config: &'a ExportConfig,
    paths: &'a PathTemplates,
    /// Export path of the page, base for relative hrefs.
    page_path: String,
    front_matter: FrontMatter,
}

impl<'a> Converter<'a> {
    pub fn new(
        page: &'a Page,
        registry: &'a Registry,
        config: &'a ExportConfig,
        paths: &'a PathTemplates,
    ) -> Self {
        Self {
            page,
            registry,
            config,
            paths,
            page_path: paths.page_path(page, registry),
            front_matter: FrontMatter::new(config.front_matter_indent),
        }
    }

    /// Export path the hrefs are relative to.
    pub fn page_path(&self) -> &str {
        &self.page_path
    }

    /// Full Markdown document: front matter, breadcrumbs and body.
    pub fn markdown(mut self) -> String {
        let page = self.page;
        let body = self.convert_body(&page.html(self.config.include_document_title));

        let tags: Vec<String> = page.labels.iter().map(|l| format!("#{}", l.name)).collect();
        self.front_matter.set_property("tags", tags);

        let mut markdown = format!("{}\n", self.front_matter.render());
        if self.config.page_breadcrumbs {
            markdown.push_str(&self.breadcrumbs());
            markdown.push('\n');
        }
        markdown.push_str(&body);
        markdown.push('\n');
        markdown
    }

    /// Properties collected so far.
    pub fn front_matter(&self) -> &FrontMatter {
        &self.front_matter
    }

    /// Convert an HTML fragment and normalize the result.
    pub fn convert_body(&mut self, html: &str) -> String {
        normalize(&self.convert_fragment(html))
    }

    /// Convert an HTML fragment without final normalization.
    pub(crate) fn convert_fragment(&mut self, html: &str) -> String {
        let doc = Html::parse_fragment(html);
        self.convert_children(doc.root_element(), Context::default())
    }

    /// Ancestor page links joined by ` > `.
    fn breadcrumbs(&self) -> String {
        let links: Vec<String> = self
            .page
            .ancestors
            .iter()
            .map(|id| self.page_link(*id))
            .collect();
        format!("{}\n", links.join(" > "))
    }
}

/// Trim the document, blank whitespace-only lines and collapse runs of
/// empty lines.
pub fn normalize(markdown: &str) -> String {
    let blanked = BLANK_LINE.replace_all(markdown, "");
    let collapsed = EXCESS_NEWLINES.replace_all(&blanked, "\n\n");
    collapsed.trim().to_owned()
}


#[cfg(test)]
mod tests {
    use cme_confluence::mock::page_record;
    use cme_confluence::types::{ContentRef, LabelRecord};
    use pretty_assertions::assert_eq;

    use super::test_support::*;
    use super::*;

    fn registry_with(record: cme_confluence::types::PageRecord) -> Registry {
        Registry::new(Box::new(docs_source().with_page(record)))
    }

    fn markdown(registry: &Registry, page_id: u64, config: &ExportConfig) -> String {
        let page = registry.page(page_id);
        let paths = PathTemplates::from_config(config);
        Converter::new(&page, registry, config, &paths).markdown()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("\n\na\n\n\n\nb\n  \nc\n\n"), "a\n\nb\n\nc");
    }

    #[test]
    fn test_document_without_properties() {
        let mut record = page_record(3, "Plain", "DOCS");
        record.body.view.value = "<p>Hello</p>".to_owned();
        let registry = registry_with(record);
        let mut config = config();
        config.page_breadcrumbs = false;

        assert_eq!(markdown(&registry, 3, &config), "\n# Plain\n\nHello\n");
    }

    #[test]
    fn test_document_with_labels_and_breadcrumbs() {
        let mut record = page_record(3, "Setup", "DOCS");
        record.body.view.value = "<p>Steps</p>".to_owned();
        record.ancestors = ["1", "2"]
            .iter()
            .map(|id| ContentRef {
                id: (*id).to_owned(),
                ..ContentRef::default()
            })
            .collect();
        record.metadata.labels.results = vec![LabelRecord {
            id: "9".to_owned(),
            name: "howto".to_owned(),
            prefix: "global".to_owned(),
        }];
        let registry = registry_with(record);
        let mut config = config();
        config.include_document_title = false;

        let md = markdown(&registry, 3, &config);
        assert!(md.starts_with("---\ntags:\n  - "));
        assert!(md.contains("#howto"));
        assert!(md.ends_with("---\n\n[Guide](../Guide.md)\n\nSteps\n"));
    }

    #[test]
    fn test_properties_become_front_matter() {
        let mut record = page_record(3, "Spec", "DOCS");
        record.body.view.value = concat!(
            r#"<div data-macro-name="details"><table><tbody>"#,
            "<tr><th>Owner</th><td>Alice</td></tr>",
            "</tbody></table></div><p>Body</p>"
        )
        .to_owned();
        let registry = registry_with(record);
        let mut config = config();
        config.page_breadcrumbs = false;
        config.include_document_title = false;

        assert_eq!(
            markdown(&registry, 3, &config),
            "---\nOwner: Alice\n---\n\nBody\n"
        );
    }

    #[test]
    fn test_conversion_is_repeatable() {
        let mut record = page_record(3, "Links", "DOCS");
        record.body.view.value = concat!(
            r#"<p>See <a data-linked-resource-type="page" data-linked-resource-id="2">g</a></p>"#,
            r#"<div data-macro-name="details"><table><tr><td>k</td><td>v</td></tr></table></div>"#,
        )
        .to_owned();
        let registry = registry_with(record);
        let config = config();

        let first = markdown(&registry, 3, &config);
        let second = markdown(&registry, 3, &config);
        assert_eq!(first, second);
    }
}
