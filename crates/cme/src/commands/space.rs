//! `cme space` command implementation.

use std::path::Path;

use clap::Args;

use super::{OutputArgs, Session};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the space command.
#[derive(Args)]
pub(crate) struct SpaceArgs {
    /// Space key.
    space_key: String,

    #[command(flatten)]
    output: OutputArgs,
}

impl SpaceArgs {
    pub(crate) fn execute(self, config_path: Option<&Path>, output: &Output) -> Result<(), CliError> {
        let session = Session::open(config_path, &self.output.settings())?;
        output.heading(&format!("Space {}", self.space_key));
        session.export(output, |exporter| exporter.export_space(&self.space_key))
    }
}
