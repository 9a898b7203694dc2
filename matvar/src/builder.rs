//! Configuration for new MAT files.
//!
//! # Example
//!
//! ```no_run
//! use matvar::{Compression, Writer};
//!
//! let mut writer = Writer::builder()
//!     .header("simulation output")
//!     .compression(Compression::Zlib)
//!     .create("results.mat")?;
//! writer.write("t", matvar::Variable::from(0.5))?;
//! writer.close()?;
//! # Ok::<(), matvar::Error>(())
//! ```

use std::path::Path;

use matvar_format::{Compression, FileVersion, FormatError, MatFile};

use crate::error::{Error, Result};
use crate::writer::Writer;

/// Builder for [`Writer`].
///
/// Defaults: the library's descriptive header text, [`FileVersion::Mat5`]
/// and no compression.
#[derive(Debug, Clone, Default)]
pub struct WriterBuilder {
    header: Option<String>,
    version: FileVersion,
    compression: Compression,
}

impl WriterBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the descriptive header text (at most 116 bytes are kept).
    pub fn header(mut self, text: impl Into<String>) -> Self {
        self.header = Some(text.into());
        self
    }

    /// Set the on-disk format version.
    pub fn version(mut self, version: FileVersion) -> Self {
        self.version = version;
        self
    }

    /// Set the compression used by [`Writer::write`].
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Create (or truncate) the file at `path` and return a writer for it.
    ///
    /// # Errors
    ///
    /// - [`Error::CreateFailed`] if the file cannot be created
    /// - [`Error::Format`] if the version is not supported
    pub fn create(self, path: impl AsRef<Path>) -> Result<Writer> {
        let path = path.as_ref();

        // Validate path is writable (parent directory exists)
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(Error::create_failed(format!(
                    "parent directory does not exist: {}",
                    parent.display()
                )));
            }
        }

        let file = MatFile::create(path, self.header.as_deref(), self.version).map_err(|e| match e {
            FormatError::Io(e) => Error::create_failed(format!("{}: {}", path.display(), e)),
            other => Error::Format(other),
        })?;
        Ok(Writer::new(file, self.compression))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parent_dir() {
        let result = WriterBuilder::new().create("/nonexistent/dir/out.mat");
        assert!(matches!(result, Err(Error::CreateFailed { .. })));
    }

    #[test]
    fn test_v73_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = WriterBuilder::new()
            .version(FileVersion::Mat73)
            .create(dir.path().join("out.mat"));
        assert!(matches!(
            result,
            Err(Error::Format(FormatError::UnsupportedVersion { .. }))
        ));
    }
}
