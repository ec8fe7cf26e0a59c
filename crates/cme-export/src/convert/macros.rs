//! Confluence macro handlers.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use super::context::Context;
use super::dispatch::Handler;
use super::elements::quote_lines;
use super::table::{escape_cell, render_table};
use super::{Converter, normalize};
use crate::error::ExportError;

static DIAGRAM_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\|diagramName=(.+?)\|").unwrap());

static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static TOC: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.toc-macro").unwrap());
static JIRA_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.jira-table").unwrap());
static ISSUE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.jira-issue-key").unwrap());
static FILENAME_HEADER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th.filename-column").unwrap());
static MODIFIED_HEADER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th.modified-column").unwrap());
static COLUMN_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("div.cell").unwrap());
static EXPAND_SUMMARY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.expand-control-text").unwrap());
static EXPAND_CONTENT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.expand-content").unwrap());

const DEFAULT_EXPAND_SUMMARY: &str = "Click here to expand...";

impl Converter<'_> {
    pub(super) fn handle(&mut self, handler: Handler, el: ElementRef<'_>, ctx: Context) -> String {
        match handler {
            Handler::Alert => self.alert(el, ctx),
            Handler::PageProperties => self.page_properties(el),
            Handler::Drawio => self.drawio(el),
            Handler::HiddenContent => self.hidden_content(el, ctx),
            Handler::Toc => self.export_view_macro(el, ctx, &TOC, "TOC"),
            Handler::JiraTable => self.export_view_macro(el, ctx, &JIRA_TABLE, "Jira table"),
            Handler::Attachments => self.attachments_table(el),
            Handler::ExpandContainer => self.expand_container(el, ctx),
            Handler::ColumnLayout => self.column_layout(el, ctx),
            Handler::JiraIssue => self.jira_issue(el, ctx),
        }
    }

    /// Info panels become GitHub alerts.
    fn alert(&mut self, el: ElementRef<'_>, ctx: Context) -> String {
        let kind = match el.value().attr("data-macro-name") {
            Some("info") => "IMPORTANT",
            Some("tip") => "TIP",
            Some("note") => "WARNING",
            Some("warning") => "CAUTION",
            _ => "NOTE",
        };

        let text = self.convert_children(el, ctx);
        let text = text.trim();
        if ctx.inline {
            return format!(" {text} ");
        }
        format!("\n> [!{kind}]\n{}\n", quote_lines(text))
    }

    /// Two-cell rows of a page properties macro go to the front matter; the
    /// macro itself renders nothing.
    fn page_properties(&mut self, el: ElementRef<'_>) -> String {
        let mut properties = Vec::new();

        for row in el.select(&ROW) {
            let cells: Vec<ElementRef<'_>> = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| matches!(cell.value().name(), "th" | "td"))
                .collect();
            let [label, value] = cells.as_slice() else {
                continue;
            };

            let key: String = label.text().map(str::trim).collect();
            let value = normalize(&self.convert_children(*value, Context::default()));
            properties.push((key, value));
        }

        self.front_matter.set_properties(properties);
        String::new()
    }

    /// draw.io diagram: preview image linking to the diagram source.
    fn drawio(&self, el: ElementRef<'_>) -> String {
        let markup = el.html();
        let Some(caps) = DIAGRAM_NAME.captures(&markup) else {
            return String::new();
        };
        let name = &caps[1];

        let page = self.page;
        let sources = page.attachments_by_title(name);
        let previews = page.attachments_by_title(&format!("{name}.png"));

        let (Some(source), Some(preview)) = (sources.first(), previews.first()) else {
            warn!("Drawio diagram {} not found on page {}", name, page.id);
            return format!("\n<!-- Drawio diagram `{name}` not found -->\n\n");
        };

        format!(
            "\n[![{name}]({})]({})\n\n",
            self.attachment_href(preview),
            self.attachment_href(source)
        )
    }

    /// Content excluded from Scroll exports stays in the file as a comment.
    fn hidden_content(&mut self, el: ElementRef<'_>, ctx: Context) -> String {
        let text = self.convert_children(el, ctx);
        let text = text.trim();
        if text.is_empty() {
            return String::new();
        }
        format!("\n<!--\n\n{text}\n\n-->\n")
    }

    /// Macros rendered server-side only in the export view (TOC, Jira
    /// tables). Exactly one match is converted in place of `el`.
    fn export_view_macro(
        &mut self,
        el: ElementRef<'_>,
        ctx: Context,
        selector: &Selector,
        what: &str,
    ) -> String {
        let page = self.page;
        let export_view = Html::parse_fragment(&page.body_export);
        let mut found = export_view.select(selector);

        match (found.next(), found.next()) {
            (Some(rendered), None) => self.convert_div(rendered, ctx),
            (None, _) => {
                warn!("Could not find {} macro on page {}; keeping content", what, page.id);
                self.convert_children(el, ctx)
            }
            (Some(_), Some(_)) => {
                warn!(
                    "Multiple {} macros on page {} are not supported; keeping content",
                    what, page.id
                );
                self.convert_children(el, ctx)
            }
        }
    }

    /// Attachments macro: table of every page attachment.
    fn attachments_table(&self, el: ElementRef<'_>) -> String {
        let header = |selector: &Selector, default: &str| {
            el.select(selector)
                .next()
                .map_or_else(|| default.to_owned(), |th| th.text().collect::<String>().trim().to_owned())
        };

        let mut rows = vec![vec![
            header(&FILENAME_HEADER, "File"),
            header(&MODIFIED_HEADER, "Modified"),
        ]];

        let page = self.page;
        for attachment in &page.attachments {
            let version = &attachment.version;
            rows.push(vec![
                escape_cell(&format!(
                    "[{}]({})",
                    attachment.title,
                    self.attachment_href(attachment)
                )),
                escape_cell(&format!(
                    "{} by {}",
                    version.friendly_when,
                    version.by.clean_name()
                )),
            ]);
        }

        render_table(&rows)
    }

    /// Multi-column layouts flatten into a one-row table.
    fn column_layout(&mut self, el: ElementRef<'_>, ctx: Context) -> String {
        let cells: Vec<ElementRef<'_>> = el.select(&COLUMN_CELL).collect();
        if cells.len() < 2 {
            return self.convert_div(el, ctx);
        }

        let cell_ctx = ctx.enter("td");
        let row: Vec<String> = cells
            .into_iter()
            .map(|cell| escape_cell(&self.convert_element(cell, cell_ctx)))
            .collect();
        render_table(&[row])
    }

    fn expand_container(&mut self, el: ElementRef<'_>, ctx: Context) -> String {
        let summary = el.select(&EXPAND_SUMMARY).next().map_or_else(
            || DEFAULT_EXPAND_SUMMARY.to_owned(),
            |s| s.text().collect::<String>().trim().to_owned(),
        );

        let content = match el.select(&EXPAND_CONTENT).next() {
            Some(content) => self.convert_element(content, ctx),
            None => String::new(),
        };

        format!(
            "\n<details>\n<summary>{summary}</summary>\n\n{}\n\n</details>\n\n",
            content.trim()
        )
    }

    /// Single issue reference: `[[KEY] summary](href)`.
    fn jira_issue(&mut self, el: ElementRef<'_>, ctx: Context) -> String {
        let link = el.select(&ISSUE_LINK).next();

        let Some(key) = el.value().attr("data-jira-key").filter(|k| !k.is_empty()) else {
            return match link {
                Some(link) => self.convert_link(link, ctx),
                None => self.convert_children(el, ctx),
            };
        };
        let Some(link) = link else {
            return self.convert_children(el, ctx);
        };
        let target = link.value().attr("href").unwrap_or_default();

        match self.registry.issue(key) {
            Ok(issue) => format!("[[{}] {}]({target})", issue.key, issue.summary),
            Err(ExportError::NoIssueTracker) => {
                debug!("No issue tracker configured for {}", key);
                format!("[[{key}]]({target})")
            }
            Err(e) => {
                warn!("Could not resolve issue {}: {}", key, e);
                format!("[[{key}]]({target})")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use cme_confluence::MockIssueTracker;
    use cme_confluence::mock::{attachment_record, page_record, user_record};
    use cme_confluence::types::VersionRecord;
    use cme_config::ExportConfig;
    use pretty_assertions::assert_eq;

    use super::super::test_support::{convert, convert_raw, docs_source};
    use super::*;
    use crate::path::PathTemplates;
    use crate::registry::Registry;

    fn registry_with(record: cme_confluence::types::PageRecord) -> Registry {
        Registry::new(Box::new(docs_source().with_page(record)))
    }

    fn properties(html: &str) -> (String, crate::front_matter::FrontMatter) {
        let registry = Registry::new(Box::new(docs_source()));
        let page = registry.page(1);
        let config = ExportConfig::default();
        let paths = PathTemplates::from_config(&config);
        let mut converter = Converter::new(&page, &registry, &config, &paths);
        let output = converter.convert_fragment(html);
        (output, converter.front_matter().clone())
    }

    #[test]
    fn test_warning_alert() {
        let registry = Registry::new(Box::new(docs_source()));
        assert_eq!(
            convert_raw(
                &registry,
                1,
                r#"<div data-macro-name="warning"><p>careful</p></div>"#
            ),
            "\n> [!CAUTION]\n> careful\n"
        );
    }

    #[test]
    fn test_alert_kinds() {
        let registry = Registry::new(Box::new(docs_source()));
        for (name, kind) in [
            ("info", "IMPORTANT"),
            ("panel", "NOTE"),
            ("tip", "TIP"),
            ("note", "WARNING"),
        ] {
            let html = format!(r#"<div data-macro-name="{name}"><p>a</p><p>b</p></div>"#);
            assert_eq!(
                convert(&registry, 1, &html),
                format!("> [!{kind}]\n> a\n>\n> b")
            );
        }
    }

    #[test]
    fn test_page_properties() {
        let (output, front_matter) = properties(concat!(
            r#"<div data-macro-name="details"><table><tbody>"#,
            "<tr><th> Owner </th><td><p>Alice</p></td></tr>",
            "<tr><th>Due Date</th><td><strong>Friday</strong></td></tr>",
            "</tbody></table></div>"
        ));
        assert_eq!(output, "");
        assert_eq!(front_matter.render(), "---\nDue_Date: '**Friday**'\nOwner: Alice\n---\n");
    }

    #[test]
    fn test_page_properties_skip_rows_without_two_cells() {
        let (_, front_matter) = properties(concat!(
            r#"<div data-macro-name="details"><table>"#,
            "<tr><th>Only</th></tr>",
            "<tr><th>A</th><td>1</td><td>2</td></tr>",
            "<tr><th>Kept</th><td>yes</td></tr>",
            "</table></div>"
        ));
        assert_eq!(front_matter.render(), "---\nKept: yes\n---\n");
    }

    #[test]
    fn test_page_properties_ignore_empty_values() {
        let (_, front_matter) = properties(
            r#"<div data-macro-name="details"><table><tr><th>Empty</th><td> </td></tr></table></div>"#,
        );
        assert!(front_matter.is_empty());
    }

    #[test]
    fn test_drawio_without_attachments() {
        let registry = Registry::new(Box::new(docs_source()));
        let html = r#"<div data-macro-name="drawio"><script>var params = "|diagramName=Foo|width=400|";</script></div>"#;
        assert_eq!(
            convert(&registry, 1, html),
            "<!-- Drawio diagram `Foo` not found -->"
        );
    }

    #[test]
    fn test_drawio_with_attachments() {
        let mut source = attachment_record("att1", "Foo", "d-1", "application/vnd.jgraph.mxfile");
        source.extensions.comment = "draw.io diagram".to_owned();
        source.expandable.space = "/rest/api/space/DOCS".to_owned();
        let mut preview = attachment_record("att2", "Foo.png", "d-2", "image/png");
        preview.extensions.comment = "draw.io preview".to_owned();
        preview.expandable.space = "/rest/api/space/DOCS".to_owned();

        let registry = Registry::new(Box::new(
            docs_source()
                .with_page(page_record(3, "Diagrams", "DOCS"))
                .with_attachment(3, source)
                .with_attachment(3, preview),
        ));
        let html = r#"<div data-macro-name="drawio">|diagramName=Foo|</div>"#;
        assert_eq!(
            convert(&registry, 3, html),
            "[![Foo](../attachments/d-2.drawio.png)](../attachments/d-1.drawio)"
        );
    }

    #[test]
    fn test_drawio_without_name() {
        let registry = Registry::new(Box::new(docs_source()));
        assert_eq!(
            convert_raw(&registry, 1, r#"<div data-macro-name="drawio"></div>"#),
            ""
        );
    }

    #[test]
    fn test_hidden_content() {
        let registry = Registry::new(Box::new(docs_source()));
        assert_eq!(
            convert(
                &registry,
                1,
                r#"<div data-macro-name="scroll-ignore"><p>internal</p></div>"#
            ),
            "<!--\n\ninternal\n\n-->"
        );
    }

    #[test]
    fn test_toc_from_export_view() {
        let mut record = page_record(3, "Toc", "DOCS");
        record.body.export_view.value = concat!(
            r##"<div class="toc-macro"><ul><li><a href="#Toc-Intro">Intro</a></li></ul></div>"##,
            "<h1>Intro</h1>"
        )
        .to_owned();
        let registry = registry_with(record);

        assert_eq!(
            convert(&registry, 3, r#"<div data-macro-name="toc"></div><h1>Intro</h1>"#),
            "- [Intro](#intro)\n\n# Intro"
        );
    }

    #[test]
    fn test_toc_requires_single_match() {
        let mut record = page_record(3, "Toc", "DOCS");
        record.body.export_view.value =
            r#"<div class="toc-macro">one</div><div class="toc-macro">two</div>"#.to_owned();
        let registry = registry_with(record);

        assert_eq!(
            convert(&registry, 3, r#"<div data-macro-name="toc">placeholder</div>"#),
            "placeholder"
        );
        assert_eq!(
            convert(&registry, 1, r#"<div data-macro-name="toc">placeholder</div>"#),
            "placeholder"
        );
    }

    #[test]
    fn test_jira_table_from_export_view() {
        let mut record = page_record(3, "Issues", "DOCS");
        record.body.export_view.value = concat!(
            r#"<div class="jira-table"><table><tr><th>Key</th></tr>"#,
            "<tr><td>PROJ-1</td></tr></table></div>"
        )
        .to_owned();
        let registry = registry_with(record);

        assert_eq!(
            convert(&registry, 3, r#"<div data-macro-name="jira">loading</div>"#),
            "| Key |\n| --- |\n| PROJ-1 |"
        );
    }

    #[test]
    fn test_attachments_macro() {
        let mut record = attachment_record("att5", "notes.txt", "n-1", "text/plain");
        record.expandable.space = "/rest/api/space/DOCS".to_owned();
        record.version = Some(VersionRecord {
            number: 2,
            by: user_record("bob", "Bob (Deactivated)"),
            when: "2024-01-02T03:04:05Z".to_owned(),
            friendly_when: "Jan 02, 2024".to_owned(),
        });
        let registry = Registry::new(Box::new(
            docs_source()
                .with_page(page_record(3, "Files", "DOCS"))
                .with_attachment(3, record),
        ));

        let html = r#"<div data-macro-name="attachments"><table><tr><th class="filename-column">Name</th></tr></table></div>"#;
        assert_eq!(
            convert(&registry, 3, html),
            "| Name | Modified |\n| --- | --- |\n| [notes.txt](../attachments/n-1.txt) | Jan 02, 2024 by Bob |"
        );
    }

    #[test]
    fn test_column_layout() {
        let registry = Registry::new(Box::new(docs_source()));
        let html = concat!(
            r#"<div class="columnLayout two-equal">"#,
            r#"<div class="cell normal"><div class="innerCell"><p>Left</p></div></div>"#,
            r#"<div class="cell normal"><div class="innerCell"><p>Right</p></div></div>"#,
            "</div>"
        );
        assert_eq!(convert(&registry, 1, html), "| Left | Right |\n| --- | --- |");
    }

    #[test]
    fn test_single_column_layout_is_plain() {
        let registry = Registry::new(Box::new(docs_source()));
        let html = r#"<div class="columnLayout single"><div class="cell"><p>Only</p></div></div>"#;
        assert_eq!(convert(&registry, 1, html), "Only");
    }

    #[test]
    fn test_expand_container() {
        let registry = Registry::new(Box::new(docs_source()));
        let html = concat!(
            r#"<div class="expand-container">"#,
            r#"<div class="expand-control"><span class="expand-control-text">More</span></div>"#,
            r#"<div class="expand-content"><p>Hidden text</p></div>"#,
            "</div>"
        );
        assert_eq!(
            convert(&registry, 1, html),
            "<details>\n<summary>More</summary>\n\nHidden text\n\n</details>"
        );
    }

    #[test]
    fn test_expand_container_default_summary() {
        let registry = Registry::new(Box::new(docs_source()));
        let html = r#"<div class="expand-container"><div class="expand-content">x</div></div>"#;
        assert!(convert(&registry, 1, html).contains("<summary>Click here to expand...</summary>"));
    }

    #[test]
    fn test_jira_issue() {
        let tracker = MockIssueTracker::new().with_issue("PROJ-7", "Fix login");
        let registry =
            Registry::new(Box::new(docs_source())).with_issue_tracker(Box::new(tracker));
        let html = concat!(
            r#"<p><span data-macro-name="jira" data-jira-key="PROJ-7">"#,
            r#"<a class="jira-issue-key" href="https://jira.example.com/browse/PROJ-7">PROJ-7</a>"#,
            "</span></p>"
        );
        assert_eq!(
            convert(&registry, 1, html),
            "[[PROJ-7] Fix login](https://jira.example.com/browse/PROJ-7)"
        );
    }

    #[test]
    fn test_jira_issue_unresolved() {
        let registry = Registry::new(Box::new(docs_source()));
        let html = concat!(
            r#"<p><span data-macro-name="jira" data-jira-key="PROJ-7">"#,
            r#"<a class="jira-issue-key" href="https://jira.example.com/browse/PROJ-7">PROJ-7</a>"#,
            "</span></p>"
        );
        assert_eq!(
            convert(&registry, 1, html),
            "[[PROJ-7]](https://jira.example.com/browse/PROJ-7)"
        );
    }

    #[test]
    fn test_jira_issue_without_key_or_link() {
        let registry = Registry::new(Box::new(docs_source()));
        assert_eq!(
            convert(
                &registry,
                1,
                r#"<p><span data-macro-name="jira"><a class="jira-issue-key" href="https://j/x">X-1</a></span></p>"#
            ),
            "[X-1](https://j/x)"
        );
        assert_eq!(
            convert(
                &registry,
                1,
                r#"<p><span data-macro-name="jira" data-jira-key="X-1">X-1 text</span></p>"#
            ),
            "X-1 text"
        );
    }
}
