//! `cme page` and `cme page-with-descendants` command implementations.

use std::path::Path;

use clap::Args;

use super::{OutputArgs, Session};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the page commands.
#[derive(Args)]
pub(crate) struct PageArgs {
    /// Page ID or URL.
    page: String,

    #[command(flatten)]
    output: OutputArgs,
}

impl PageArgs {
    /// Export the page.
    pub(crate) fn execute(self, config_path: Option<&Path>, output: &Output) -> Result<(), CliError> {
        let session = Session::open(config_path, &self.output.settings())?;
        let page_id = session.locate(&self.page)?;
        session.export(output, |exporter| exporter.export_page(page_id))
    }

    /// Export the page and every page below it.
    pub(crate) fn execute_with_descendants(
        self,
        config_path: Option<&Path>,
        output: &Output,
    ) -> Result<(), CliError> {
        let session = Session::open(config_path, &self.output.settings())?;
        let page_id = session.locate(&self.page)?;
        session.export(output, |exporter| exporter.export_page_with_descendants(page_id))
    }
}
