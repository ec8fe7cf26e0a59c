//! Links, mentions and images.

use std::sync::LazyLock;

use cme_confluence::UserLookup;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use super::Converter;
use super::context::Context;
use super::elements::{chomp, has_class};
use crate::model::{Attachment, clean_user_name};
use crate::path::href;
use crate::util::slugify;

static PAGE_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"/wiki/.+?/pages/(\d+)").unwrap());
static ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

impl Converter<'_> {
    pub(super) fn convert_link(&mut self, el: ElementRef<'_>, ctx: Context) -> String {
        self.link(el, ctx, true)
    }

    /// Link rules in priority order. `allow_fallback` limits the editor
    /// lookup for create-page links to one level.
    fn link(&mut self, el: ElementRef<'_>, ctx: Context, allow_fallback: bool) -> String {
        let attrs = el.value();

        if has_class(el, "user-mention") {
            return self.user_mention(el, ctx);
        }

        let target = attrs.attr("href").unwrap_or_default();
        if target.contains("createpage.action") || has_class(el, "createlink") {
            return self.create_link(el, ctx, allow_fallback);
        }

        let resource_type = attrs.attr("data-linked-resource-type").unwrap_or_default();
        if resource_type.contains("page") {
            let page_id = attrs
                .attr("data-linked-resource-id")
                .filter(|id| !id.is_empty() && *id != "null")
                .and_then(|id| id.parse().ok());
            if let Some(page_id) = page_id {
                return self.page_link(page_id);
            }
        }

        if resource_type.contains("attachment") {
            return self.attachment_link(el, ctx);
        }

        if let Some(page_id) = PAGE_URL
            .captures(target)
            .and_then(|caps| caps[1].parse().ok())
        {
            return self.page_link(page_id);
        }

        if target.starts_with('#') {
            let text = self.convert_children(el, ctx);
            let anchor = slugify(&el.text().collect::<String>());
            return format!("[{}](#{anchor})", text.trim());
        }

        self.default_link(el, ctx)
    }

    /// `[title](href)` for a page, resolved through the registry.
    pub(super) fn page_link(&self, page_id: u64) -> String {
        let page = self.registry.page(page_id);
        let path = self.paths.page_path(&page, self.registry);
        format!(
            "[{}]({})",
            page.title,
            href(&self.page_path, &path, self.config.page_href)
        )
    }

    pub(super) fn attachment_href(&self, attachment: &Attachment) -> String {
        let path = self.paths.attachment_path(attachment, self.registry);
        href(&self.page_path, &path, self.config.attachment_href)
    }

    fn attachment_link(&mut self, el: ElementRef<'_>, ctx: Context) -> String {
        let attrs = el.value();
        let page = self.page;

        let attachment = match attrs.attr("data-media-id").filter(|id| !id.is_empty()) {
            Some(file_id) => page.attachment_by_file_id(file_id),
            None => attrs
                .attr("data-linked-resource-id")
                .filter(|id| !id.is_empty())
                .and_then(|id| page.attachment_by_id(id)),
        };

        match attachment {
            Some(attachment) => format!(
                "[{}]({})",
                attachment.title,
                self.attachment_href(attachment)
            ),
            None => {
                warn!("Linked attachment not found on page {}", page.id);
                self.default_link(el, ctx)
            }
        }
    }

    fn user_mention(&mut self, el: ElementRef<'_>, ctx: Context) -> String {
        let attrs = el.value();
        let non_empty = |name: &str| attrs.attr(name).filter(|v| !v.is_empty());

        let lookup = non_empty("data-account-id")
            .map(|id| UserLookup::AccountId(id.to_owned()))
            .or_else(|| non_empty("data-username").map(|n| UserLookup::Username(n.to_owned())))
            .or_else(|| non_empty("data-user-key").map(|k| UserLookup::UserKey(k.to_owned())));

        if let Some(lookup) = lookup {
            match self.registry.user(&lookup) {
                Ok(user) => return user.clean_name().to_owned(),
                Err(e) => warn!("Could not resolve mentioned user {}: {}", lookup, e),
            }
        }

        let text = self.convert_children(el, ctx);
        clean_user_name(&text).to_owned()
    }

    /// Link to a page that did not exist when the view was rendered. The
    /// editor markup may still carry a resolvable link with the same text.
    fn create_link(&mut self, el: ElementRef<'_>, ctx: Context, allow_fallback: bool) -> String {
        let label: String = el.text().collect();
        let label = label.trim();

        if allow_fallback && !label.is_empty() {
            let page = self.page;
            let editor = Html::parse_fragment(&page.editor2);
            if let Some(fallback) = editor
                .select(&ANCHOR)
                .find(|a| a.text().collect::<String>().trim() == label)
            {
                return self.link(fallback, ctx, false);
            }
        }

        format!("[[{}]]", self.convert_children(el, ctx).trim())
    }

    /// Plain `[text](href "title")` link.
    pub(super) fn default_link(&mut self, el: ElementRef<'_>, ctx: Context) -> String {
        let converted = self.convert_children(el, ctx);
        if ctx.code {
            return converted;
        }

        let (prefix, suffix, text) = chomp(&converted);
        if text.is_empty() {
            return String::new();
        }

        let target = el.value().attr("href").unwrap_or_default();
        if target.is_empty() {
            return text.to_owned();
        }

        let title = el.value().attr("title").unwrap_or_default();
        if title.is_empty() && text.replace(r"\_", "_") == target {
            return format!("<{target}>");
        }

        format!("{prefix}[{text}]({target}{}){suffix}", title_part(title))
    }

    /// Attachment image. Images without a media ID are dropped.
    pub(super) fn convert_image(&self, el: ElementRef<'_>) -> String {
        let Some(file_id) = el.value().attr("data-media-id").filter(|id| !id.is_empty()) else {
            return String::new();
        };

        let page = self.page;
        let Some(attachment) = page.attachment_by_file_id(file_id) else {
            warn!(
                "Attachment with file id {} not found on page {}",
                file_id, page.id
            );
            return format!("<!-- Attachment with file id `{file_id}` not found -->");
        };

        let src = self.attachment_href(attachment);
        image(el, &src)
    }
}

/// `![alt](src "title")`. Headings and table cells keep their images.
fn image(el: ElementRef<'_>, src: &str) -> String {
    let alt = el.value().attr("alt").unwrap_or_default();
    let title = el.value().attr("title").unwrap_or_default();
    format!("![{alt}]({src}{})", title_part(title))
}

fn title_part(title: &str) -> String {
    if title.is_empty() {
        String::new()
    } else {
        format!(r#" "{}""#, title.replace('"', r#"\""#))
    }
}
