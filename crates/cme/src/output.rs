//! Terminal reporting for export runs.

use cme_export::ExportSummary;
use console::{Style, Term};

/// Line colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Plain,
    Heading,
    Success,
    Warning,
    Failure,
}

impl Tone {
    fn style(self) -> Option<Style> {
        match self {
            Self::Plain => None,
            Self::Heading => Some(Style::new().cyan().bold()),
            Self::Success => Some(Style::new().green()),
            Self::Warning => Some(Style::new().yellow()),
            Self::Failure => Some(Style::new().red()),
        }
    }
}

/// Writes progress and results to stderr, leaving stdout clean.
pub(crate) struct Output {
    term: Term,
}

impl Output {
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    pub(crate) fn heading(&self, msg: &str) {
        self.line(Tone::Heading, msg);
    }

    pub(crate) fn info(&self, msg: &str) {
        self.line(Tone::Plain, msg);
    }

    pub(crate) fn error(&self, msg: &str) {
        self.line(Tone::Failure, msg);
    }

    /// Print a block of detail lines under the first one as its title.
    pub(crate) fn details(&self, lines: &[String]) {
        let mut lines = lines.iter();
        if let Some(title) = lines.next() {
            self.heading(title);
        }
        for line in lines {
            self.info(line);
        }
    }

    /// Print run totals followed by the pages that failed.
    pub(crate) fn summary(&self, summary: &ExportSummary) {
        for (tone, line) in summary_lines(summary) {
            self.line(tone, &line);
        }
    }

    fn line(&self, tone: Tone, msg: &str) {
        let text = match tone.style() {
            Some(style) => style.apply_to(msg).to_string(),
            None => msg.to_owned(),
        };
        // A closed stderr is not worth failing the export for.
        let _ = self.term.write_line(&text);
    }
}

fn summary_lines(summary: &ExportSummary) -> Vec<(Tone, String)> {
    let mut lines = vec![(
        Tone::Success,
        format!(
            "Exported {} page(s) and {} attachment(s)",
            summary.exported, summary.attachments
        ),
    )];

    if summary.skipped > 0 {
        lines.push((
            Tone::Plain,
            format!("{} page(s) already present, kept as is", summary.skipped),
        ));
    }

    if summary.blocked_attachments > 0 {
        lines.push((
            Tone::Plain,
            format!(
                "{} attachment(s) held back by the extension filter",
                summary.blocked_attachments
            ),
        ));
    }

    if !summary.failed.is_empty() {
        lines.push((
            Tone::Warning,
            format!("Failed pages ({}):", summary.failed.len()),
        ));
        lines.extend(
            summary
                .failed
                .iter()
                .map(|(page_id, reason)| (Tone::Plain, format!("  - {page_id}: {reason}"))),
        );
    }

    lines
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_summary_of_clean_run() {
        let summary = ExportSummary {
            exported: 4,
            attachments: 2,
            ..ExportSummary::default()
        };
        assert_eq!(
            summary_lines(&summary),
            vec![(
                Tone::Success,
                "Exported 4 page(s) and 2 attachment(s)".to_owned()
            )]
        );
    }

    #[test]
    fn test_summary_lists_skipped_blocked_and_failed() {
        let summary = ExportSummary {
            exported: 1,
            skipped: 2,
            failed: vec![(42, "Page 42 is not accessible".to_owned())],
            attachments: 0,
            blocked_attachments: 3,
        };
        assert_eq!(
            summary_lines(&summary),
            vec![
                (
                    Tone::Success,
                    "Exported 1 page(s) and 0 attachment(s)".to_owned()
                ),
                (
                    Tone::Plain,
                    "2 page(s) already present, kept as is".to_owned()
                ),
                (
                    Tone::Plain,
                    "3 attachment(s) held back by the extension filter".to_owned()
                ),
                (Tone::Warning, "Failed pages (1):".to_owned()),
                (
                    Tone::Plain,
                    "  - 42: Page 42 is not accessible".to_owned()
                ),
            ]
        );
    }
}
