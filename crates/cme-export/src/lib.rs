//! Confluence to Markdown export.
//!
//! This crate turns Confluence pages into Markdown files:
//! - [`Registry`]: cached, lazily resolved pages, spaces, users and issues
//! - [`Converter`]: view HTML to Markdown with front matter
//! - [`Exporter`]: writes pages and referenced attachments to an [`OutputSink`]
//! - [`search()`]: CQL page search
//!
//! # Example
//!
//! ```ignore
//! use cme_export::{Exporter, FsSink, Registry};
//!
//! let registry = Registry::new(Box::new(client));
//! let sink = FsSink::new(&config.export.output_path);
//! let summary = Exporter::new(&registry, &config.export, &sink).export_space("DOCS")?;
//! println!("Exported {} pages", summary.exported);
//! ```

mod util;

// Document model
pub mod model;
pub use model::{Attachment, JiraIssue, Label, Page, PageLocator, Space, User, Version};

// Reference resolution
pub mod registry;
pub use registry::{Entity, Reference, Registry};

// Conversion
pub mod convert;
pub use convert::Converter;
pub mod front_matter;
pub use front_matter::{FrontMatter, PropertyValue};
pub mod path;
pub use path::PathTemplates;

// Export
pub mod attachment_filter;
pub use attachment_filter::AttachmentFilter;
pub mod exporter;
pub use exporter::{ExportSummary, Exporter};
pub mod metadata;
pub use metadata::{MetadataEnricher, MetadataSource, RegistryMetadata};
pub mod search;
pub use search::{SearchOptions, SearchResults, search};
pub mod sink;
pub use sink::{FsSink, OutputSink};

// Errors
mod error;
pub use error::ExportError;
