/// Traversal state derived from the ancestors of the element being converted.
///
/// Passed by value down the recursion; entering an element yields a new
/// context for its children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Context {
    /// Inside a heading or table cell; block elements render on one line.
    pub inline: bool,
    /// Inside `pre`; whitespace is kept verbatim.
    pub preformatted: bool,
    /// Inside `pre`, `code`, `kbd` or `samp`; no escaping or inline markup.
    pub code: bool,
    /// Inside a list item; nested lists attach to the item.
    pub list_item: bool,
}

impl Context {
    /// Context for the children of `tag`.
    #[must_use]
    pub fn enter(self, tag: &str) -> Self {
        let mut next = self;
        match tag {
            "pre" => {
                next.preformatted = true;
                next.code = true;
            }
            "code" | "kbd" | "samp" => next.code = true,
            "td" | "th" => next.inline = true,
            "li" => next.list_item = true,
            tag if is_heading(tag) => next.inline = true,
            _ => {}
        }
        next
    }
}

pub fn is_heading(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Block elements trim whitespace at their inner boundaries.
pub fn is_block(tag: &str) -> bool {
    is_heading(tag)
        || matches!(
            tag,
            "p" | "blockquote"
                | "article"
                | "div"
                | "section"
                | "ol"
                | "ul"
                | "li"
                | "dl"
                | "dt"
                | "dd"
                | "table"
                | "thead"
                | "tbody"
                | "tfoot"
                | "tr"
                | "td"
                | "th"
        )
}

/// Elements that trim whitespace of adjacent text.
pub fn trims_neighbours(tag: &str) -> bool {
    is_block(tag) || tag == "pre"
}
