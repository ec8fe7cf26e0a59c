//! Tree walk and default element rules.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Node};

use super::Converter;
use super::context::{Context, is_block, is_heading, trims_neighbours};
use super::dispatch::{Route, route_div, route_span};

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\t \r\n]+").unwrap());
static BRUSH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"brush:\s*([^;]+)").unwrap());

impl Converter<'_> {
    /// Convert the children of `el` and join them.
    ///
    /// `ctx` is the context `el` itself sits in. Whitespace-only text next
    /// to block boundaries is dropped, and outside `pre` the newlines where
    /// two children meet collapse to at most two.
    pub(super) fn convert_children(&mut self, el: ElementRef<'_>, ctx: Context) -> String {
        let name = el.value().name();
        let inner = ctx.enter(name);
        let trims_inside = is_block(name);
        let mut parts = Vec::new();

        for child in el.children() {
            let part = match child.value() {
                Node::Text(text) => {
                    let after_block = child
                        .prev_sibling()
                        .and_then(ElementRef::wrap)
                        .is_some_and(|e| trims_neighbours(e.value().name()));
                    let before_block = child
                        .next_sibling()
                        .and_then(ElementRef::wrap)
                        .is_some_and(|e| trims_neighbours(e.value().name()));
                    let first = child.prev_sibling().is_none();
                    let last = child.next_sibling().is_none();

                    if text.trim().is_empty()
                        && ((trims_inside && (first || last)) || after_block || before_block)
                    {
                        continue;
                    }

                    convert_text(
                        text,
                        inner,
                        after_block || (trims_inside && first),
                        before_block || (trims_inside && last),
                    )
                }
                Node::Element(_) => match ElementRef::wrap(child) {
                    Some(child) => self.convert_element(child, inner),
                    None => continue,
                },
                _ => continue,
            };

            if !part.is_empty() {
                parts.push(part);
            }
        }

        if inner.preformatted {
            parts.concat()
        } else {
            join_collapsed(&parts)
        }
    }

    /// Convert one element sitting in `ctx`.
    pub(super) fn convert_element(&mut self, el: ElementRef<'_>, ctx: Context) -> String {
        let name = el.value().name();
        match name {
            "div" => match route_div(el.value(), &self.config.macros_to_ignore) {
                Route::Ignore => String::new(),
                Route::Handle(handler) => self.handle(handler, el, ctx),
                Route::Default => self.convert_div(el, ctx),
            },
            "span" => match route_span(el.value()) {
                Route::Handle(handler) => self.handle(handler, el, ctx),
                Route::Ignore | Route::Default => self.convert_children(el, ctx),
            },
            "a" => self.convert_link(el, ctx),
            "img" => self.convert_image(el),
            "table" => self.convert_table(el, ctx),
            "li" => self.convert_list_item(el, ctx),
            "ul" | "ol" => self.convert_list(el, ctx),
            "pre" => self.convert_pre(el, ctx),
            "time" => match el.value().attr("datetime") {
                Some(datetime) => datetime.to_owned(),
                None => self.convert_children(el, ctx),
            },
            "sub" => format!("<sub>{}</sub>", self.convert_children(el, ctx)),
            "sup" => {
                let text = self.convert_children(el, ctx);
                if el.prev_sibling().is_none() {
                    format!("[^{text}]:")
                } else {
                    format!("[^{text}]")
                }
            }
            "p" => paragraph(&self.convert_children(el, ctx), ctx),
            "article" | "section" | "dl" => block(&self.convert_children(el, ctx), ctx),
            "dt" => definition_term(&self.convert_children(el, ctx), ctx),
            "dd" => definition(&self.convert_children(el, ctx), ctx),
            "blockquote" => blockquote(&self.convert_children(el, ctx), ctx),
            "b" | "strong" => inline_markup(&self.convert_children(el, ctx), "**", ctx),
            "em" | "i" => inline_markup(&self.convert_children(el, ctx), "*", ctx),
            "del" | "s" | "strike" => inline_markup(&self.convert_children(el, ctx), "~~", ctx),
            "code" | "kbd" | "samp" => {
                let text = self.convert_children(el, ctx);
                if ctx.preformatted {
                    text
                } else {
                    inline_markup(&text, "`", ctx)
                }
            }
            "br" => {
                if ctx.inline {
                    "\n".to_owned()
                } else {
                    "  \n".to_owned()
                }
            }
            "hr" => "\n\n---\n\n".to_owned(),
            "script" | "style" | "head" | "title" => String::new(),
            name if is_heading(name) => {
                let level = name[1..].parse().unwrap_or(1);
                heading(&self.convert_children(el, ctx), level, ctx)
            }
            _ => self.convert_children(el, ctx),
        }
    }

    /// Default `div` rule.
    pub(super) fn convert_div(&mut self, el: ElementRef<'_>, ctx: Context) -> String {
        block(&self.convert_children(el, ctx), ctx)
    }

    fn convert_list(&mut self, el: ElementRef<'_>, ctx: Context) -> String {
        let text = self.convert_children(el, ctx);
        if ctx.list_item {
            return format!("\n{}", text.trim_end());
        }

        let before_paragraph =
            next_content_sibling(el).is_some_and(|name| name != "ul" && name != "ol");
        format!("\n\n{text}{}", if before_paragraph { "\n" } else { "" })
    }

    fn convert_list_item(&mut self, el: ElementRef<'_>, ctx: Context) -> String {
        let text = self.convert_children(el, ctx);
        let item = list_item(el, &text);

        if el.value().attr("data-inline-task-id").is_some() {
            let marker = if has_class(el, "checked") {
                "- [x] "
            } else {
                "- [ ] "
            };
            return item.replacen("- ", marker, 1);
        }
        item
    }

    fn convert_pre(&mut self, el: ElementRef<'_>, ctx: Context) -> String {
        let text = self.convert_children(el, ctx);
        if text.is_empty() {
            return String::new();
        }

        let language = el
            .value()
            .attr("data-syntaxhighlighter-params")
            .and_then(|params| BRUSH.captures(params))
            .map(|caps| caps[1].trim().to_owned())
            .unwrap_or_default();
        format!("\n\n```{language}\n{text}\n```\n\n")
    }
}

pub(super) fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

/// Text node rule: collapse whitespace outside `pre`, escape outside code,
/// trim towards adjacent block boundaries.
fn convert_text(text: &str, ctx: Context, trim_start: bool, trim_end: bool) -> String {
    let mut text = if ctx.preformatted {
        text.to_owned()
    } else {
        WHITESPACE.replace_all(text, " ").into_owned()
    };
    if !ctx.code {
        text = escape(&text);
    }

    let mut trimmed = text.as_str();
    if trim_start {
        trimmed = trimmed.trim_start_matches([' ', '\t', '\r', '\n']);
    }
    if trim_end {
        trimmed = trimmed.trim_end();
    }
    trimmed.to_owned()
}

fn escape(text: &str) -> String {
    text.replace('*', r"\*").replace('_', r"\_")
}

/// Concatenate converted children, merging the newlines where a child ending
/// in newlines meets one starting with newlines (at most two survive).
fn join_collapsed(parts: &[String]) -> String {
    let mut out = String::new();
    let mut prev_trailing = 0;

    for part in parts {
        let rest = part.trim_start_matches('\n');
        let mut leading = part.len() - rest.len();
        let content = rest.trim_end_matches('\n');
        let trailing = rest.len() - content.len();

        if prev_trailing > 0 && leading > 0 {
            out.truncate(out.len() - prev_trailing);
            leading = leading.max(prev_trailing).min(2);
        }

        out.push_str(&"\n".repeat(leading));
        out.push_str(content);
        out.push_str(&"\n".repeat(trailing));
        prev_trailing = trailing;
    }

    out
}

/// Name of the next sibling element, `""` for non-blank text.
fn next_content_sibling<'b>(el: ElementRef<'b>) -> Option<&'b str> {
    for sibling in el.next_siblings() {
        match sibling.value() {
            Node::Element(element) => return Some(element.name()),
            Node::Text(text) if !text.trim().is_empty() => return Some(""),
            _ => {}
        }
    }
    None
}

/// Split leading and trailing single spaces off inline content.
pub(super) fn chomp(text: &str) -> (&'static str, &'static str, &str) {
    let prefix = if text.starts_with(' ') { " " } else { "" };
    let suffix = if text.ends_with(' ') { " " } else { "" };
    (prefix, suffix, text.trim())
}

fn inline_markup(text: &str, markup: &str, ctx: Context) -> String {
    if ctx.code {
        return text.to_owned();
    }
    let (prefix, suffix, text) = chomp(text);
    if text.is_empty() {
        return String::new();
    }
    format!("{prefix}{markup}{text}{markup}{suffix}")
}

fn paragraph(text: &str, ctx: Context) -> String {
    let text = text.trim_matches([' ', '\t', '\r', '\n']);
    if ctx.inline {
        return format!(" {text} ");
    }
    if text.is_empty() {
        String::new()
    } else {
        format!("\n\n{text}\n\n")
    }
}

pub(super) fn block(text: &str, ctx: Context) -> String {
    let text = text.trim();
    if ctx.inline {
        return format!(" {text} ");
    }
    if text.is_empty() {
        String::new()
    } else {
        format!("\n\n{text}\n\n")
    }
}

fn heading(text: &str, level: usize, ctx: Context) -> String {
    if ctx.inline {
        return text.to_owned();
    }
    let text = WHITESPACE.replace_all(text.trim(), " ");
    if text.is_empty() {
        return String::new();
    }
    format!("\n\n{} {text}\n\n", "#".repeat(level.clamp(1, 6)))
}

fn blockquote(text: &str, ctx: Context) -> String {
    let text = text.trim_matches([' ', '\t', '\r', '\n']);
    if ctx.inline {
        return format!(" {text} ");
    }
    if text.is_empty() {
        return "\n".to_owned();
    }
    format!("\n{}\n\n", quote_lines(text))
}

/// Prefix every line with `> ` (bare `>` for empty lines).
pub(super) fn quote_lines(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                ">".to_owned()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Bullet the first line and indent the rest by the bullet width.
fn list_item(el: ElementRef<'_>, text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return "\n".to_owned();
    }

    let bullet = match el.parent().and_then(ElementRef::wrap) {
        Some(parent) if parent.value().name() == "ol" => {
            let start = parent
                .value()
                .attr("start")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(1);
            let position = el
                .prev_siblings()
                .filter_map(ElementRef::wrap)
                .filter(|e| e.value().name() == "li")
                .count();
            format!("{}. ", start + position)
        }
        _ => "- ".to_owned(),
    };

    format!("{}\n", indent_continuation(text, &bullet, bullet.len()))
}

/// Put `marker` before the first line and indent the other non-empty lines
/// by `width` spaces.
fn indent_continuation(text: &str, marker: &str, width: usize) -> String {
    let indent = " ".repeat(width);
    let mut out = String::with_capacity(text.len() + marker.len());
    for (i, line) in text.split('\n').enumerate() {
        if i == 0 {
            out.push_str(marker);
            out.push_str(line);
        } else {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(&indent);
                out.push_str(line);
            }
        }
    }
    out
}

fn definition_term(text: &str, ctx: Context) -> String {
    let text = WHITESPACE.replace_all(text.trim(), " ");
    if ctx.inline {
        return format!(" {text} ");
    }
    if text.is_empty() {
        return "\n".to_owned();
    }
    format!("\n\n{text}\n")
}

fn definition(text: &str, ctx: Context) -> String {
    let text = text.trim();
    if ctx.inline {
        return format!(" {text} ");
    }
    if text.is_empty() {
        return "\n".to_owned();
    }
    format!("{}\n", indent_continuation(text, ":   ", 4))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::test_support::{convert, convert_raw, docs_source};
    use super::*;
    use crate::registry::Registry;

    fn md(html: &str) -> String {
        let registry = Registry::new(Box::new(docs_source()));
        convert(&registry, 1, html)
    }

    fn raw(html: &str) -> String {
        let registry = Registry::new(Box::new(docs_source()));
        convert_raw(&registry, 1, html)
    }

    #[test]
    fn test_join_collapsed() {
        let parts = vec!["a\n\n".to_owned(), "\n\n\nb".to_owned(), "c\n".to_owned()];
        assert_eq!(join_collapsed(&parts), "a\n\nbc\n");
    }

    #[test]
    fn test_paragraphs() {
        assert_eq!(md("<p>One</p>\n<p>Two</p>"), "One\n\nTwo");
    }

    #[test]
    fn test_whitespace_collapsed_and_escaped() {
        assert_eq!(md("<p>a   b\n c_d *e*</p>"), r"a b c\_d \*e\*");
    }

    #[test]
    fn test_headings() {
        assert_eq!(md("<h2> Setup \n guide </h2><p>x</p>"), "## Setup guide\n\nx");
    }

    #[test]
    fn test_inline_formatting() {
        assert_eq!(
            md("<p><strong>bold </strong>and <em>it</em> <del>old</del> <code>a_b</code></p>"),
            "**bold** and *it* ~~old~~ `a_b`"
        );
    }

    #[test]
    fn test_empty_emphasis_dropped() {
        assert_eq!(md("<p>a <strong></strong>b</p>"), "a b");
        assert_eq!(md("<p>a<em> </em>b</p>"), "ab");
    }

    #[test]
    fn test_code_block_with_language() {
        assert_eq!(
            md(r#"<pre data-syntaxhighlighter-params="brush: java; gutter: false">int a_b = 1;
return *a;</pre>"#),
            "```java\nint a_b = 1;\nreturn *a;\n```"
        );
    }

    #[test]
    fn test_empty_code_block() {
        assert_eq!(raw("<pre></pre>"), "");
    }

    #[test]
    fn test_unordered_list() {
        assert_eq!(md("<ul><li>one</li><li>two</li></ul>"), "- one\n- two");
    }

    #[test]
    fn test_ordered_list_with_start() {
        assert_eq!(
            md(r#"<ol start="3"><li>c</li><li>d</li></ol>"#),
            "3. c\n4. d"
        );
    }

    #[test]
    fn test_nested_list() {
        assert_eq!(
            md("<ul><li>parent<ul><li>child</li></ul></li><li>next</li></ul>"),
            "- parent\n  - child\n- next"
        );
    }

    #[test]
    fn test_list_followed_by_paragraph() {
        assert_eq!(md("<ul><li>a</li></ul><p>after</p>"), "- a\n\nafter");
    }

    #[test]
    fn test_task_list_checked_once() {
        let html = concat!(
            r#"<ul class="inline-task-list">"#,
            r#"<li data-inline-task-id="1" class="checked">done - really</li>"#,
            r#"<li data-inline-task-id="2">open</li>"#,
            "</ul>"
        );
        assert_eq!(md(html), "- [x] done - really\n- [ ] open");
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(
            md("<blockquote><p>one</p><p>two</p></blockquote>"),
            "> one\n>\n> two"
        );
    }

    #[test]
    fn test_line_break_and_rule() {
        assert_eq!(md("<p>a<br/>b</p><hr/><p>c</p>"), "a  \nb\n\n---\n\nc");
    }

    #[test]
    fn test_superscript_footnotes() {
        assert_eq!(raw("<sup>1</sup>"), "[^1]:");
        assert_eq!(raw("<p>text<sup>1</sup></p>"), "\n\ntext[^1]\n\n");
    }

    #[test]
    fn test_subscript() {
        assert_eq!(md("<p>H<sub>2</sub>O</p>"), "H<sub>2</sub>O");
    }

    #[test]
    fn test_time_prefers_datetime() {
        assert_eq!(
            md(r#"<p><time datetime="2024-05-01">May 1</time> <time>today</time></p>"#),
            "2024-05-01 today"
        );
    }

    #[test]
    fn test_ignored_elements() {
        assert_eq!(
            md("<style>p { color: red }</style><script>x()</script><p>kept</p>"),
            "kept"
        );
    }

    #[test]
    fn test_unknown_tags_transparent() {
        assert_eq!(md("<p><custom-tag>inner</custom-tag> text</p>"), "inner text");
    }

    #[test]
    fn test_definition_list() {
        assert_eq!(
            md("<dl><dt>Term</dt><dd>Meaning</dd></dl>"),
            "Term\n:   Meaning"
        );
    }

    #[test]
    fn test_plain_span_is_transparent() {
        assert_eq!(md(r#"<p><span class="x">a</span>b</p>"#), "ab");
    }

    #[test]
    fn test_ignored_macro() {
        assert_eq!(
            md(r#"<div data-macro-name="qc-read-and-understood-signature-box"><p>sign</p></div><p>after</p>"#),
            "after"
        );
    }
}
