//! CME CLI - Confluence to Markdown exporter.
//!
//! Provides commands for:
//! - `page`: Export a single page
//! - `page-with-descendants`: Export a page and everything below it
//! - `space`: Export a whole space
//! - `all-spaces`: Export every global space
//! - `search`: Export the pages matched by a CQL search
//! - `space-details`, `page-ancestors`, `attachment-details`, `page-metadata`:
//!   Inspect metadata without exporting

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{
    AttachmentDetailsArgs, OutputArgs, PageAncestorsArgs, PageArgs, PageMetadataArgs, SearchArgs,
    SpaceArgs, SpaceDetailsArgs,
};
use output::Output;

/// CME - Export Confluence pages to Markdown.
#[derive(Parser)]
#[command(name = "cme", version, about)]
struct Cli {
    /// Path to configuration file (default: auto-discover cme.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a single page by ID or URL.
    Page(PageArgs),
    /// Export a page and all its descendants.
    PageWithDescendants(PageArgs),
    /// Export all pages of a space.
    Space(SpaceArgs),
    /// Export all global spaces.
    AllSpaces(OutputArgs),
    /// Export pages matched by a CQL search.
    Search(SearchArgs),
    /// Show name, description and homepage of a space.
    SpaceDetails(SpaceDetailsArgs),
    /// List the ancestors of a page, root first.
    PageAncestors(PageAncestorsArgs),
    /// Show details of a page's attachments.
    AttachmentDetails(AttachmentDetailsArgs),
    /// Compile the metadata of a page into a JSON or YAML document.
    PageMetadata(PageMetadataArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Page(args) => args.execute(config, &output),
        Commands::PageWithDescendants(args) => args.execute_with_descendants(config, &output),
        Commands::Space(args) => args.execute(config, &output),
        Commands::AllSpaces(args) => commands::export_all_spaces(&args, config, &output),
        Commands::Search(args) => args.execute(config, &output),
        Commands::SpaceDetails(args) => args.execute(config, &output),
        Commands::PageAncestors(args) => args.execute(config, &output),
        Commands::AttachmentDetails(args) => args.execute(config, &output),
        Commands::PageMetadata(args) => args.execute(config, &output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_page_with_global_flags() {
        let cli = Cli::try_parse_from(["cme", "page", "123", "out", "-v", "--config", "cme.toml"])
            .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("cme.toml")));
        assert!(matches!(cli.command, Commands::Page(_)));
    }

    #[test]
    fn test_parse_search_criteria() {
        let cli = Cli::try_parse_from([
            "cme", "search", "--space", "DOCS", "--label", "howto", "--limit", "10",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Search(_)));
    }

    #[test]
    fn test_parse_all_spaces_without_output() {
        let cli = Cli::try_parse_from(["cme", "all-spaces"]).unwrap();

        assert!(matches!(cli.command, Commands::AllSpaces(_)));
    }

    #[test]
    fn test_parse_space_details() {
        let cli = Cli::try_parse_from(["cme", "space-details", "DOCS"]).unwrap();

        assert!(matches!(cli.command, Commands::SpaceDetails(_)));
        assert!(Cli::try_parse_from(["cme", "space-details"]).is_err());
    }

    #[test]
    fn test_parse_page_ancestors_from_url() {
        let cli = Cli::try_parse_from([
            "cme",
            "page-ancestors",
            "https://example.atlassian.net/wiki/spaces/DOCS/pages/123/Guide",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::PageAncestors(_)));
    }

    #[test]
    fn test_parse_attachment_details_with_optional_id() {
        let cli = Cli::try_parse_from(["cme", "attachment-details", "123", "att456"]).unwrap();
        assert!(matches!(cli.command, Commands::AttachmentDetails(_)));

        let cli = Cli::try_parse_from(["cme", "attachment-details", "123"]).unwrap();
        assert!(matches!(cli.command, Commands::AttachmentDetails(_)));
    }

    #[test]
    fn test_parse_page_metadata_options() {
        let cli = Cli::try_parse_from([
            "cme",
            "page-metadata",
            "123",
            "out",
            "--format",
            "yaml",
            "--filter",
            "--prepend-to",
            "out/Guide.md",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::PageMetadata(_)));

        assert!(Cli::try_parse_from(["cme", "page-metadata", "123", "--format", "xml"]).is_err());
    }

    #[test]
    fn test_page_requires_target() {
        assert!(Cli::try_parse_from(["cme", "page"]).is_err());
    }
}
