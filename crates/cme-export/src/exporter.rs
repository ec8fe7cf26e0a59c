//! Export orchestration.
//!
//! The [`Exporter`] converts pages, writes them through an [`OutputSink`]
//! and exports the attachments each page references. Batch operations log
//! and count per-page failures instead of aborting.

use std::path::Path;

use cme_config::{ExportConfig, MetadataFormat};
use tracing::{debug, info, warn};

use crate::attachment_filter::AttachmentFilter;
use crate::convert::Converter;
use crate::error::ExportError;
use crate::metadata::{MetadataEnricher, RegistryMetadata};
use crate::model::{Attachment, Page};
use crate::path::PathTemplates;
use crate::registry::Registry;
use crate::search::{self, SearchResults};
use crate::sink::OutputSink;

/// Counts of an export run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Pages written.
    pub exported: usize,
    /// Pages whose file already existed.
    pub skipped: usize,
    /// Pages that could not be exported, with the reason.
    pub failed: Vec<(u64, String)>,
    /// Attachments written.
    pub attachments: usize,
    /// Referenced attachments held back by the extension filter.
    pub blocked_attachments: usize,
}

impl ExportSummary {
    fn merge(&mut self, other: Self) {
        self.exported += other.exported;
        self.skipped += other.skipped;
        self.failed.extend(other.failed);
        self.attachments += other.attachments;
        self.blocked_attachments += other.blocked_attachments;
    }
}

/// Exports pages and their attachments.
pub struct Exporter<'a> {
    registry: &'a Registry,
    config: &'a ExportConfig,
    sink: &'a dyn OutputSink,
    filter: AttachmentFilter,
    paths: PathTemplates,
}

impl<'a> Exporter<'a> {
    pub fn new(registry: &'a Registry, config: &'a ExportConfig, sink: &'a dyn OutputSink) -> Self {
        Self {
            registry,
            config,
            sink,
            filter: AttachmentFilter::new(&config.attachments),
            paths: PathTemplates::from_config(config),
        }
    }

    /// Export one page with its referenced attachments.
    ///
    /// Fetch errors of the page itself are returned.
    pub fn export_page(&self, page_id: u64) -> Result<ExportSummary, ExportError> {
        let page = self.registry.fetch_page(page_id)?;
        let converter = Converter::new(&page, self.registry, self.config, &self.paths);
        let page_path = converter.page_path().to_owned();
        let markdown = converter.markdown();

        let mut summary = ExportSummary::default();
        if self.sink.write(Path::new(&page_path), markdown.as_bytes())? {
            info!("Exported page {} to {}", page_id, page_path);
            summary.exported += 1;
        } else {
            debug!("Page {} already exported at {}", page_id, page_path);
            summary.skipped += 1;
        }

        self.export_metadata(&page, &page_path)?;
        self.export_attachments(&page, &mut summary)?;
        Ok(summary)
    }

    /// Export pages in order; failures are logged and counted.
    pub fn export_pages(&self, page_ids: &[u64]) -> ExportSummary {
        let mut summary = ExportSummary::default();
        for (index, page_id) in page_ids.iter().enumerate() {
            debug!("Exporting page {} ({}/{})", page_id, index + 1, page_ids.len());
            match self.export_page(*page_id) {
                Ok(page_summary) => summary.merge(page_summary),
                Err(e) => {
                    warn!("Failed to export page {}: {}", page_id, e);
                    summary.failed.push((*page_id, e.to_string()));
                }
            }
        }
        summary
    }

    pub fn export_page_with_descendants(&self, page_id: u64) -> Result<ExportSummary, ExportError> {
        let mut ids = vec![page_id];
        ids.extend(self.registry.descendants(page_id)?);
        Ok(self.export_pages(&ids))
    }

    /// Export the homepage of a space and everything below it.
    pub fn export_space(&self, space_key: &str) -> Result<ExportSummary, ExportError> {
        let ids = self.registry.space_pages(space_key)?;
        info!("Exporting {} pages of space {}", ids.len(), space_key);
        Ok(self.export_pages(&ids))
    }

    pub fn export_all_spaces(&self) -> Result<ExportSummary, ExportError> {
        let mut summary = ExportSummary::default();
        for space in self.registry.all_spaces()? {
            summary.merge(self.export_space(&space.key)?);
        }
        Ok(summary)
    }

    /// Export the pages matched by a CQL query.
    pub fn export_search(
        &self,
        cql: &str,
        limit: usize,
    ) -> Result<(SearchResults, ExportSummary), ExportError> {
        let results = search::search(self.registry, cql, limit)?;
        let summary = self.export_pages(&results.page_ids);
        Ok((results, summary))
    }

    /// Write the metadata sidecar next to the page file.
    fn export_metadata(&self, page: &Page, page_path: &str) -> Result<(), ExportError> {
        let extension = match self.config.metadata {
            MetadataFormat::None => return Ok(()),
            MetadataFormat::Yaml => "meta.yaml",
            MetadataFormat::Json => "meta.json",
        };

        let source = RegistryMetadata::new(self.registry);
        let compiled = MetadataEnricher::new(&source).compile_page(
            page.id,
            self.config.metadata,
            self.config.metadata_filter,
        )?;

        let path = Path::new(page_path).with_extension(extension);
        self.sink.write(&path, compiled.as_bytes())?;
        Ok(())
    }

    /// Export the attachments the page references and count them in
    /// `summary`.
    fn export_attachments(
        &self,
        page: &Page,
        summary: &mut ExportSummary,
    ) -> Result<(), ExportError> {
        let (allowed, blocked) = self.filter.partition(referenced_attachments(page));
        if !blocked.is_empty() {
            info!(
                "Skipping {} blocked attachment(s) of page {}",
                blocked.len(),
                page.id
            );
        }
        summary.blocked_attachments += blocked.len();

        for attachment in allowed {
            let path = self.paths.attachment_path(attachment, self.registry);
            let path = Path::new(&path);
            if self.sink.exists(path) {
                debug!("Attachment {} already exported", attachment.title);
                continue;
            }

            let data = match self.registry.source().download(&attachment.download_link) {
                Ok(data) => data,
                Err(e) => {
                    warn!("Could not download attachment {}: {}", attachment.title, e);
                    continue;
                }
            };

            if self.sink.write(path, &data)? {
                summary.attachments += 1;
            }
        }

        Ok(())
    }
}

/// Attachments a page refers to: drawio sources named in the body, drawio
/// previews named in the export view and files whose ID appears in the body.
fn referenced_attachments(page: &Page) -> impl Iterator<Item = &Attachment> {
    page.attachments.iter().filter(|attachment| {
        let filename = attachment.filename();
        if filename.ends_with(".drawio")
            && page.body.contains(&format!("diagramName={}", attachment.title))
        {
            return true;
        }
        if filename.ends_with(".drawio.png")
            && page.body_export.contains(&attachment.title.replace(' ', "%20"))
        {
            return true;
        }
        !attachment.file_id.is_empty() && page.body.contains(&attachment.file_id)
    })
}
