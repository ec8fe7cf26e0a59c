//! Shared string helpers.

/// Compute a relative path from one exported file to another.
///
/// Both paths are relative to the export root and use `/` separators. The
/// last segment of `from` is the referring document, so the base directory
/// is everything before it.
pub fn relative_path(from: &str, to: &str) -> String {
    let from_segs: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_segs: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let from_dir = if from.ends_with('/') || from_segs.is_empty() {
        &from_segs[..]
    } else {
        &from_segs[..from_segs.len() - 1]
    };

    let common = from_dir
        .iter()
        .zip(&to_segs)
        .take_while(|(a, b)| a == b)
        .count();

    let ups = from_dir.len() - common;
    let remaining = &to_segs[common..];

    let result = format!("{}{}", "../".repeat(ups), remaining.join("/"));
    if result.is_empty() {
        "./".to_owned()
    } else {
        result
    }
}

/// Anchor slug for heading text: lowercase words joined by `-`.
///
/// Words are split at whitespace, `-` and `_`; other punctuation is dropped.
pub fn slugify(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Turn arbitrary text into a front-matter key.
///
/// Runs of characters other than letters, digits, `-` and `_` become a
/// single underscore. Case is preserved.
pub fn sanitize_key(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_sep = false;

    for c in text.trim().chars() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            if pending_sep && !result.is_empty() {
                result.push('_');
            }
            result.push(c);
            pending_sep = false;
        } else {
            pending_sep = true;
        }
    }

    result
}

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    s.chars().fold(String::with_capacity(s.len()), |mut out, c| {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
        out
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_relative_path_sibling_file() {
        assert_eq!(
            relative_path("DOCS/Home/Guide.md", "DOCS/Home/FAQ.md"),
            "FAQ.md"
        );
    }

    #[test]
    fn test_relative_path_to_attachment() {
        assert_eq!(
            relative_path("DOCS/Home/Guide/Setup.md", "DOCS/attachments/abc.png"),
            "../../attachments/abc.png"
        );
    }

    #[test]
    fn test_relative_path_into_child_directory() {
        assert_eq!(
            relative_path("DOCS/Home/Guide.md", "DOCS/Home/Guide/Setup.md"),
            "Guide/Setup.md"
        );
    }

    #[test]
    fn test_relative_path_root_file() {
        assert_eq!(relative_path("index.md", "DOCS/a.md"), "DOCS/a.md");
    }

    #[test]
    fn test_relative_path_same_file() {
        assert_eq!(relative_path("DOCS/a.md", "DOCS/a.md"), "a.md");
    }

    #[test]
    fn test_relative_path_both_empty() {
        assert_eq!(relative_path("", ""), "./");
    }

    #[test]
    fn test_slugify_heading_text() {
        assert_eq!(slugify("Release Notes 2.1"), "release-notes-21");
        assert_eq!(slugify("Q&A: Known issues"), "qa-known-issues");
        assert_eq!(slugify(" -- Setup__guide -- "), "setup-guide");
        assert_eq!(slugify("Größe"), "größe");
        assert_eq!(slugify("?!"), "");
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("Owner"), "Owner");
        assert_eq!(sanitize_key("Due Date"), "Due_Date");
        assert_eq!(sanitize_key(" Status: (current) "), "Status_current");
        assert_eq!(sanitize_key("tags"), "tags");
        assert_eq!(sanitize_key("?!"), "");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("R&D <draft>"), "R&amp;D &lt;draft&gt;");
        assert_eq!(escape_html(r#"Bob's "plan""#), "Bob&#39;s &quot;plan&quot;");
    }
}
