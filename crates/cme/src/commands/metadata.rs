//! Metadata inspection commands: `space-details`, `page-ancestors`,
//! `attachment-details` and `page-metadata`.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use cme_config::{CliSettings, MetadataFormat};
use cme_export::metadata::{self, Metadata};
use cme_export::{MetadataEnricher, MetadataSource, RegistryMetadata};
use serde_json::Value;

use super::Session;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for `space-details`.
#[derive(Args)]
pub(crate) struct SpaceDetailsArgs {
    /// Space key.
    space_key: String,
}

impl SpaceDetailsArgs {
    pub(crate) fn execute(self, config_path: Option<&Path>, output: &Output) -> Result<(), CliError> {
        let session = Session::open(config_path, &CliSettings::default())?;
        let source = RegistryMetadata::new(&session.registry);
        let details = source.space_details(&self.space_key)?;
        output.details(&space_lines(&self.space_key, &details));
        Ok(())
    }
}

/// Arguments for `page-ancestors`.
#[derive(Args)]
pub(crate) struct PageAncestorsArgs {
    /// Page ID or URL.
    page: String,
}

impl PageAncestorsArgs {
    pub(crate) fn execute(self, config_path: Option<&Path>, output: &Output) -> Result<(), CliError> {
        let session = Session::open(config_path, &CliSettings::default())?;
        let page_id = session.locate(&self.page)?;
        let ancestors = RegistryMetadata::new(&session.registry).ancestors(page_id)?;
        output.details(&ancestor_lines(page_id, &ancestors));
        Ok(())
    }
}

/// Arguments for `attachment-details`.
#[derive(Args)]
pub(crate) struct AttachmentDetailsArgs {
    /// Page ID or URL the attachment belongs to.
    page: String,

    /// Attachment ID, with or without the `att` prefix. Lists every
    /// attachment of the page when omitted.
    attachment_id: Option<String>,
}

impl AttachmentDetailsArgs {
    pub(crate) fn execute(self, config_path: Option<&Path>, output: &Output) -> Result<(), CliError> {
        let session = Session::open(config_path, &CliSettings::default())?;
        let page_id = session.locate(&self.page)?;
        let attachments = RegistryMetadata::new(&session.registry).attachments(page_id)?;

        let selected = select_attachments(&attachments, self.attachment_id.as_deref());
        if selected.is_empty() {
            return Err(CliError::NotFound(match &self.attachment_id {
                Some(id) => format!("attachment {id} on page {page_id}"),
                None => format!("attachments on page {page_id}"),
            }));
        }

        for attachment in selected {
            output.details(&attachment_lines(attachment));
        }
        Ok(())
    }
}

/// Serialization of the `page-metadata` document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl From<DocumentFormat> for MetadataFormat {
    fn from(format: DocumentFormat) -> Self {
        match format {
            DocumentFormat::Json => Self::Json,
            DocumentFormat::Yaml => Self::Yaml,
        }
    }
}

/// Arguments for `page-metadata`.
#[derive(Args)]
pub(crate) struct PageMetadataArgs {
    /// Page ID or URL.
    page: String,

    /// Directory for the metadata document (overrides config).
    output_path: Option<PathBuf>,

    /// Document format.
    #[arg(long, value_enum, default_value_t = DocumentFormat::Json)]
    format: DocumentFormat,

    /// Keep only the knowledge-base fields.
    #[arg(long)]
    filter: bool,

    /// Also prefix this Markdown file with the metadata block.
    #[arg(long, value_name = "FILE")]
    prepend_to: Option<PathBuf>,
}

impl PageMetadataArgs {
    pub(crate) fn execute(self, config_path: Option<&Path>, output: &Output) -> Result<(), CliError> {
        let settings = CliSettings {
            output_path: self.output_path.clone(),
            ..CliSettings::default()
        };
        let session = Session::open(config_path, &settings)?;
        let page_id = session.locate(&self.page)?;
        let filter = self.filter || session.config.export.metadata_filter;
        let format = MetadataFormat::from(self.format);

        let source = RegistryMetadata::new(&session.registry);
        let compiled = source.compile_metadata(page_id)?;
        output.details(&metadata_summary_lines(page_id, &compiled));

        let document = metadata::compile(&compiled, format, filter)?;
        let target = session
            .config
            .export
            .output_path
            .join(metadata_filename(page_id, self.format));
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, document)?;
        output.info(&format!("Metadata saved to {}", target.display()));

        if let Some(markdown) = &self.prepend_to {
            let content = std::fs::read_to_string(markdown)?;
            let enriched =
                MetadataEnricher::new(&source).enrich_page(page_id, &content, format, filter)?;
            std::fs::write(markdown, enriched)?;
            output.info(&format!("Metadata prepended to {}", markdown.display()));
        }
        Ok(())
    }
}

fn metadata_filename(page_id: u64, format: DocumentFormat) -> String {
    format!("page_{page_id}_metadata.{}", format.extension())
}

fn text<'v>(value: &'v Value, key: &str) -> Option<&'v str> {
    value.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn space_lines(space_key: &str, details: &Metadata) -> Vec<String> {
    let details = Value::Object(details.clone());
    vec![
        format!("Space details for {space_key}:"),
        format!("  Name: {}", text(&details, "name").unwrap_or("N/A")),
        format!(
            "  Description: {}",
            text(&details, "description").unwrap_or("No description")
        ),
        format!("  Homepage: {}", text(&details, "homepage").unwrap_or("N/A")),
    ]
}

fn ancestor_lines(page_id: u64, ancestors: &[Value]) -> Vec<String> {
    let mut lines = vec![format!("Ancestors for page {page_id}:")];
    if ancestors.is_empty() {
        lines.push("  (none)".to_owned());
    }
    lines.extend(ancestors.iter().enumerate().map(|(index, ancestor)| {
        format!(
            "  {}. ID: {}, Title: {}",
            index + 1,
            text(ancestor, "id").unwrap_or_default(),
            text(ancestor, "title").unwrap_or_default()
        )
    }));
    lines
}

/// Attachments whose ID contains `wanted`, or all of them.
fn select_attachments<'a>(attachments: &'a [Value], wanted: Option<&str>) -> Vec<&'a Value> {
    attachments
        .iter()
        .filter(|attachment| match wanted {
            Some(wanted) => text(attachment, "id").is_some_and(|id| id.contains(wanted)),
            None => true,
        })
        .collect()
}

fn attachment_lines(attachment: &Value) -> Vec<String> {
    let version = attachment
        .pointer("/version/number")
        .and_then(Value::as_u64)
        .unwrap_or_default();
    vec![
        format!(
            "Details for attachment {}:",
            text(attachment, "id").unwrap_or_default()
        ),
        format!("  Title: {}", text(attachment, "title").unwrap_or_default()),
        format!(
            "  File size: {} bytes",
            attachment
                .get("fileSize")
                .and_then(Value::as_u64)
                .unwrap_or_default()
        ),
        format!(
            "  Media type: {}",
            text(attachment, "mediaType").unwrap_or_default()
        ),
        format!("  Version: {version}"),
    ]
}

fn metadata_summary_lines(page_id: u64, compiled: &Metadata) -> Vec<String> {
    let count = |key: &str| compiled.get(key).and_then(Value::as_array).map_or(0, Vec::len);
    let space_key = compiled
        .get("space")
        .and_then(|space| text(space, "key"))
        .unwrap_or("N/A");
    vec![
        format!("Metadata for page {page_id}:"),
        format!(
            "  Title: {}",
            compiled.get("title").and_then(Value::as_str).unwrap_or_default()
        ),
        format!("  Space: {space_key}"),
        format!("  Ancestors: {}", count("ancestors")),
        format!("  Attachments: {}", count("attachments")),
    ]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Metadata {
        match value {
            Value::Object(map) => map,
            _ => Metadata::new(),
        }
    }

    #[test]
    fn test_space_lines() {
        let details = object(json!({
            "key": "DOCS",
            "name": "Documentation",
            "description": "",
            "homepage": "65537",
        }));
        assert_eq!(
            space_lines("DOCS", &details),
            vec![
                "Space details for DOCS:",
                "  Name: Documentation",
                "  Description: No description",
                "  Homepage: 65537",
            ]
        );
    }

    #[test]
    fn test_space_lines_without_homepage() {
        let details = object(json!({"key": "EMPTY", "name": "Empty", "homepage": null}));
        assert_eq!(space_lines("EMPTY", &details)[3], "  Homepage: N/A");
    }

    #[test]
    fn test_ancestor_lines_numbered_from_root() {
        let ancestors = vec![
            json!({"id": "10", "title": "Handbook", "type": "page"}),
            json!({"id": "11", "title": "Onboarding", "type": "page"}),
        ];
        assert_eq!(
            ancestor_lines(12, &ancestors),
            vec![
                "Ancestors for page 12:",
                "  1. ID: 10, Title: Handbook",
                "  2. ID: 11, Title: Onboarding",
            ]
        );
        assert_eq!(ancestor_lines(1, &[])[1], "  (none)");
    }

    #[test]
    fn test_select_attachments_by_partial_id() {
        let attachments = vec![
            json!({"id": "att1001", "title": "diagram.png"}),
            json!({"id": "att2002", "title": "notes.txt"}),
        ];

        let selected = select_attachments(&attachments, Some("2002"));
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0]["title"], json!("notes.txt"));

        assert_eq!(select_attachments(&attachments, None).len(), 2);
        assert!(select_attachments(&attachments, Some("att9")).is_empty());
    }

    #[test]
    fn test_attachment_lines() {
        let attachment = json!({
            "id": "att1001",
            "title": "diagram.png",
            "mediaType": "image/png",
            "fileSize": 2048,
            "version": {"number": 3},
        });
        assert_eq!(
            attachment_lines(&attachment),
            vec![
                "Details for attachment att1001:",
                "  Title: diagram.png",
                "  File size: 2048 bytes",
                "  Media type: image/png",
                "  Version: 3",
            ]
        );
    }

    #[test]
    fn test_metadata_summary_lines() {
        let compiled = object(json!({
            "id": "12",
            "title": "Onboarding checklist",
            "space": {"key": "HR", "name": "People"},
            "ancestors": [{"id": "10"}, {"id": "11"}],
            "attachments": [],
        }));
        assert_eq!(
            metadata_summary_lines(12, &compiled),
            vec![
                "Metadata for page 12:",
                "  Title: Onboarding checklist",
                "  Space: HR",
                "  Ancestors: 2",
                "  Attachments: 0",
            ]
        );
    }

    #[test]
    fn test_metadata_filename() {
        assert_eq!(metadata_filename(42, DocumentFormat::Json), "page_42_metadata.json");
        assert_eq!(metadata_filename(42, DocumentFormat::Yaml), "page_42_metadata.yaml");
        assert_eq!(MetadataFormat::from(DocumentFormat::Yaml), MetadataFormat::Yaml);
    }
}
