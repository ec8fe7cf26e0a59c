//! Macro dispatch table.
//!
//! Maps Confluence macro names and layout classes to conversion handlers.
//! Built once per process and consulted for every `div` and `span`.

use std::collections::HashMap;
use std::sync::LazyLock;

use scraper::node::Element;

/// Conversion handler selected for an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Alert,
    PageProperties,
    Drawio,
    HiddenContent,
    Toc,
    JiraTable,
    Attachments,
    ExpandContainer,
    ColumnLayout,
    JiraIssue,
}

/// Dispatch decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Macro is configured to be dropped.
    Ignore,
    Handle(Handler),
    /// Default element rule.
    Default,
}

struct DispatchTable {
    div_macros: HashMap<&'static str, Handler>,
    div_classes: Vec<(&'static str, Handler)>,
    span_macros: HashMap<&'static str, Handler>,
}

static TABLE: LazyLock<DispatchTable> = LazyLock::new(|| DispatchTable {
    div_macros: HashMap::from([
        ("info", Handler::Alert),
        ("panel", Handler::Alert),
        ("tip", Handler::Alert),
        ("note", Handler::Alert),
        ("warning", Handler::Alert),
        ("details", Handler::PageProperties),
        ("drawio", Handler::Drawio),
        ("scroll-ignore", Handler::HiddenContent),
        ("toc", Handler::Toc),
        ("jira", Handler::JiraTable),
        ("attachments", Handler::Attachments),
    ]),
    div_classes: vec![
        ("expand-container", Handler::ExpandContainer),
        ("columnLayout", Handler::ColumnLayout),
    ],
    span_macros: HashMap::from([("jira", Handler::JiraIssue)]),
});

/// Route a `div`: macro name first, then layout class.
pub fn route_div(el: &Element, ignored: &[String]) -> Route {
    if let Some(name) = el.attr("data-macro-name") {
        if ignored.iter().any(|m| m == name) {
            return Route::Ignore;
        }
        if let Some(handler) = TABLE.div_macros.get(name) {
            return Route::Handle(*handler);
        }
    }

    TABLE
        .div_classes
        .iter()
        .find(|(class, _)| el.classes().any(|c| c == *class))
        .map_or(Route::Default, |(_, handler)| Route::Handle(*handler))
}

pub fn route_span(el: &Element) -> Route {
    el.attr("data-macro-name")
        .and_then(|name| TABLE.span_macros.get(name))
        .map_or(Route::Default, |handler| Route::Handle(*handler))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use scraper::{Html, Selector};

    use super::*;

    fn route(html: &str, ignored: &[&str]) -> Route {
        let doc = Html::parse_fragment(html);
        let selector = Selector::parse("div, span").unwrap();
        let el = doc.select(&selector).next().unwrap();
        let ignored: Vec<String> = ignored.iter().map(|s| (*s).to_owned()).collect();
        if el.value().name() == "span" {
            route_span(el.value())
        } else {
            route_div(el.value(), &ignored)
        }
    }

    #[test]
    fn test_alert_macros() {
        for name in ["info", "panel", "tip", "note", "warning"] {
            assert_eq!(
                route(&format!(r#"<div data-macro-name="{name}"></div>"#), &[]),
                Route::Handle(Handler::Alert)
            );
        }
    }

    #[test]
    fn test_ignored_macro_wins() {
        assert_eq!(
            route(r#"<div data-macro-name="toc"></div>"#, &["toc"]),
            Route::Ignore
        );
    }

    #[test]
    fn test_macro_before_class() {
        assert_eq!(
            route(
                r#"<div data-macro-name="drawio" class="columnLayout"></div>"#,
                &[]
            ),
            Route::Handle(Handler::Drawio)
        );
    }

    #[test]
    fn test_unknown_macro_falls_back_to_class() {
        assert_eq!(
            route(
                r#"<div data-macro-name="chart" class="wrapper expand-container"></div>"#,
                &[]
            ),
            Route::Handle(Handler::ExpandContainer)
        );
    }

    #[test]
    fn test_class_token_must_match_exactly() {
        assert_eq!(
            route(r#"<div class="columnLayoutish"></div>"#, &[]),
            Route::Default
        );
    }

    #[test]
    fn test_span_jira() {
        assert_eq!(
            route(r#"<span data-macro-name="jira"></span>"#, &[]),
            Route::Handle(Handler::JiraIssue)
        );
        assert_eq!(
            route(r#"<span data-macro-name="status"></span>"#, &[]),
            Route::Default
        );
    }

    #[test]
    fn test_jira_div_is_table() {
        assert_eq!(
            route(r#"<div data-macro-name="jira"></div>"#, &[]),
            Route::Handle(Handler::JiraTable)
        );
    }
}
