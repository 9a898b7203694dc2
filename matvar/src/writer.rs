//! MAT file writing.
//!
//! `Writer` is obtained from [`Writer::create`] or
//! [`WriterBuilder::create`](crate::WriterBuilder::create) and appends
//! named variables to a new file.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use matvar_format::{Compression, FormatError, MatFile};

use crate::builder::WriterBuilder;
use crate::error::{Error, Result};
use crate::variable::Variable;

/// A MAT file opened for writing.
///
/// Each variable is written as soon as [`write`](Self::write) is called.
/// The file is closed on [`close`](Self::close) or, best-effort, on drop.
///
/// # Thread Safety
///
/// Like [`Reader`](crate::Reader), `Writer` is `!Send + !Sync`.
///
/// # Example
///
/// ```no_run
/// use matvar::{Variable, Writer};
///
/// let mut writer = Writer::create("out.mat")?;
/// writer.write("greeting", Variable::from("hello"))?;
/// writer.close()?;
/// # Ok::<(), matvar::Error>(())
/// ```
#[derive(Debug)]
pub struct Writer {
    /// The open file; `None` once closed.
    file: Option<MatFile>,

    /// Path to the file (for error messages).
    path: PathBuf,

    /// Compression used by `write`.
    compression: Compression,

    /// Count of variables written.
    count: usize,

    /// Marker to make Writer !Send and !Sync.
    _not_send_sync: PhantomData<*const ()>,
}

impl Writer {
    pub(crate) fn new(file: MatFile, compression: Compression) -> Self {
        Writer {
            path: file.path().to_path_buf(),
            file: Some(file),
            compression,
            count: 0,
            _not_send_sync: PhantomData,
        }
    }

    /// Create (or truncate) a MAT file with default settings.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        WriterBuilder::new().create(path)
    }

    /// Start configuring a new file.
    pub fn builder() -> WriterBuilder {
        WriterBuilder::new()
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Compression applied by [`write`](Self::write).
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Number of variables written so far.
    pub fn variable_count(&self) -> usize {
        self.count
    }

    /// Write `value` under `name` with the default compression.
    ///
    /// The variable is consumed: its record is renamed and persisted.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidName`] if `name` is empty, longer than 63 bytes,
    ///   contains NUL or was already written
    /// - [`Error::NotInstantiated`] if `value` is empty
    /// - [`Error::Io`] if writing fails
    pub fn write(&mut self, name: &str, value: Variable) -> Result<()> {
        self.write_with(name, value, self.compression)
    }

    /// Write `value` under `name` with explicit compression.
    pub fn write_with(&mut self, name: &str, value: Variable, compression: Compression) -> Result<()> {
        let file = self.file.as_mut().ok_or(Error::Format(FormatError::Closed))?;
        let mut record = value.into_record().ok_or(Error::NotInstantiated)?;
        record.set_name(name);
        file.write(&record, compression)?;
        self.count += 1;
        Ok(())
    }

    /// Close the file, flushing all data.
    ///
    /// The file is also closed when the `Writer` is dropped, but calling
    /// `close()` explicitly lets you handle errors.
    pub fn close(mut self) -> Result<()> {
        self.do_close()
    }

    fn do_close(&mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            file.close()?;
            debug!(
                "writer closed {} ({} variables)",
                self.path.display(),
                self.count
            );
        }
        Ok(())
    }
}

impl Drop for Writer {
    fn drop(&mut self) {
        if let Err(e) = self.do_close() {
            warn!("failed to close {}: {}", self.path.display(), e);
        }
    }
}
