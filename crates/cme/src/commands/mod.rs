//! CLI command implementations.

mod metadata;
mod page;
mod search;
mod space;

pub(crate) use metadata::{
    AttachmentDetailsArgs, PageAncestorsArgs, PageMetadataArgs, SpaceDetailsArgs,
};
pub(crate) use page::PageArgs;
pub(crate) use search::SearchArgs;
pub(crate) use space::SpaceArgs;

use std::path::{Path, PathBuf};

use clap::Args;
use cme_config::{ApiConfig, CliSettings, Config};
use cme_confluence::{Auth, ConfluenceClient, JiraClient};
use cme_export::{ExportError, ExportSummary, Exporter, FsSink, PageLocator, Registry};

use crate::error::CliError;
use crate::output::Output;

/// Output directory argument shared by all export commands.
#[derive(Args)]
pub(crate) struct OutputArgs {
    /// Directory to write to (overrides config).
    output_path: Option<PathBuf>,

    /// Omit the breadcrumb line above each page.
    #[arg(long)]
    no_breadcrumbs: bool,
}

impl OutputArgs {
    fn settings(&self) -> CliSettings {
        CliSettings {
            output_path: self.output_path.clone(),
            page_breadcrumbs: self.no_breadcrumbs.then_some(false),
        }
    }
}

/// Loaded configuration and a registry connected to Confluence.
struct Session {
    config: Config,
    registry: Registry,
}

impl Session {
    fn open(config_path: Option<&Path>, settings: &CliSettings) -> Result<Self, CliError> {
        let config = Config::load(config_path, Some(settings))?;

        let confluence = config.require_confluence()?;
        tracing::info!(url = %confluence.url, "Connecting to Confluence");
        let client = ConfluenceClient::new(&confluence.url, auth(confluence));
        let mut registry = Registry::new(Box::new(client));

        if let Some(jira) = config.jira()? {
            registry = registry.with_issue_tracker(Box::new(JiraClient::new(&jira.url, auth(jira))));
        }

        Ok(Self { config, registry })
    }

    /// Page ID for a page ID or URL argument.
    fn locate(&self, page: &str) -> Result<u64, CliError> {
        let locator = PageLocator::parse(page)?;
        Ok(self.registry.locate(&locator)?)
    }

    /// Run an export and report its summary.
    fn export(
        &self,
        output: &Output,
        run: impl FnOnce(&Exporter<'_>) -> Result<ExportSummary, ExportError>,
    ) -> Result<(), CliError> {
        let export = &self.config.export;
        output.info(&format!("Exporting to {}", export.output_path.display()));

        let sink = FsSink::new(&export.output_path);
        let exporter = Exporter::new(&self.registry, export, &sink);
        let summary = run(&exporter)?;
        report(output, &summary)
    }
}

fn auth(api: &ApiConfig) -> Auth {
    Auth::from_credentials(&api.username, &api.api_token, &api.pat)
}

fn report(output: &Output, summary: &ExportSummary) -> Result<(), CliError> {
    output.summary(summary);
    if summary.failed.is_empty() {
        Ok(())
    } else {
        Err(CliError::Incomplete {
            count: summary.failed.len(),
        })
    }
}

/// `cme all-spaces`.
pub(crate) fn export_all_spaces(
    args: &OutputArgs,
    config_path: Option<&Path>,
    output: &Output,
) -> Result<(), CliError> {
    let session = Session::open(config_path, &args.settings())?;
    session.export(output, |exporter| exporter.export_all_spaces())
}
