//! `cme search` command implementation.

use std::path::Path;

use clap::Args;
use cme_export::SearchOptions;

use super::{OutputArgs, Session};
use crate::error::CliError;
use crate::output::Output;

/// Number of matched page IDs echoed before exporting.
const PREVIEW_COUNT: usize = 3;

/// Arguments for the search command.
#[derive(Args)]
pub(crate) struct SearchArgs {
    /// CQL query; criteria below are combined with it using AND.
    query: Option<String>,

    #[command(flatten)]
    output: OutputArgs,

    /// Restrict to a space key.
    #[arg(long)]
    space: Option<String>,

    /// Title contains.
    #[arg(long)]
    title: Option<String>,

    /// Page label.
    #[arg(long)]
    label: Option<String>,

    /// Content contains.
    #[arg(long)]
    content: Option<String>,

    /// Page author.
    #[arg(long)]
    author: Option<String>,

    /// Maximum number of pages.
    #[arg(long, default_value_t = 100)]
    limit: usize,
}

impl SearchArgs {
    pub(crate) fn execute(self, config_path: Option<&Path>, output: &Output) -> Result<(), CliError> {
        let session = Session::open(config_path, &self.output.settings())?;
        let cql = self.options().build_cql();
        output.heading(&format!("CQL query: {cql}"));

        session.export(output, |exporter| {
            let (results, summary) = exporter.export_search(&cql, self.limit)?;
            output.info(&format!(
                "Found {} page(s) ({} hits)",
                results.page_ids.len(),
                results.total_size
            ));
            for page_id in results.page_ids.iter().take(PREVIEW_COUNT) {
                output.info(&format!("  - {page_id}"));
            }
            Ok(summary)
        })
    }

    fn options(&self) -> SearchOptions {
        SearchOptions {
            query: self.query.clone(),
            space: self.space.clone(),
            title: self.title.clone(),
            label: self.label.clone(),
            content: self.content.clone(),
            author: self.author.clone(),
        }
    }
}
