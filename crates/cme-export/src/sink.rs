//! Output sinks for exported files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ExportError;

/// Destination of exported files.
pub trait OutputSink {
    /// Write `data` at `path`, relative to the sink root.
    ///
    /// Existing files are left untouched. Returns whether the file was
    /// written.
    fn write(&self, path: &Path, data: &[u8]) -> Result<bool, ExportError>;

    /// Whether a file already exists at `path`.
    fn exists(&self, path: &Path) -> bool;
}

/// Writes below a root directory.
#[derive(Debug, Clone)]
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl OutputSink for FsSink {
    fn write(&self, path: &Path, data: &[u8]) -> Result<bool, ExportError> {
        let target = self.root.join(path);
        if target.exists() {
            debug!("Skipping existing file {}", target.display());
            return Ok(false);
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, data)?;
        Ok(true)
    }

    fn exists(&self, path: &Path) -> bool {
        self.root.join(path).exists()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let sink = FsSink::new(dir.path());

        let written = sink.write(Path::new("Docs/Home/Guide.md"), b"# Guide\n").unwrap();

        assert!(written);
        assert_eq!(
            fs::read_to_string(dir.path().join("Docs/Home/Guide.md")).unwrap(),
            "# Guide\n"
        );
    }

    #[test]
    fn test_existing_file_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let sink = FsSink::new(dir.path());
        sink.write(Path::new("a.md"), b"first").unwrap();

        let written = sink.write(Path::new("a.md"), b"second").unwrap();

        assert!(!written);
        assert!(sink.exists(Path::new("a.md")));
        assert_eq!(fs::read_to_string(dir.path().join("a.md")).unwrap(), "first");
    }
}
