//! CLI error types.

use cme_config::ConfigError;
use cme_export::ExportError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Export(#[from] ExportError),

    #[error("{count} page(s) failed to export")]
    Incomplete { count: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No {0} found")]
    NotFound(String),
}
