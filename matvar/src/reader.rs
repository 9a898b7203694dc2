//! MAT file reading.
//!
//! # Example
//!
//! ```no_run
//! use matvar::Reader;
//!
//! let reader = Reader::open("data.mat")?;
//! for info in reader.variables() {
//!     println!("{}: {} {:?}", info.name, info.class, info.dims);
//! }
//! # Ok::<(), matvar::Error>(())
//! ```

use std::marker::PhantomData;
use std::path::Path;

use log::debug;
use matvar_format::{Access, ClassType, FormatError, MatFile, RecordInfo};

use crate::error::{Error, Result};
use crate::variable::Variable;

/// Metadata of a top-level variable, read without loading its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableInfo {
    /// Variable name.
    pub name: String,
    /// Array class.
    pub class: ClassType,
    /// Dimensions.
    pub dims: Vec<usize>,
    /// Whether the variable has an imaginary part.
    pub complex: bool,
    /// Whether the logical flag is set.
    pub logical: bool,
    /// Whether the variable is stored compressed.
    pub compressed: bool,
}

impl From<&RecordInfo> for VariableInfo {
    fn from(info: &RecordInfo) -> Self {
        VariableInfo {
            name: info.name.clone(),
            class: info.class,
            dims: info.dims.clone(),
            complex: info.complex,
            logical: info.logical,
            compressed: info.compressed,
        }
    }
}

/// A MAT file opened for reading.
///
/// The file is indexed once on open; lookups by name then touch only the
/// requested record. The file is closed when the `Reader` is dropped.
///
/// # Thread Safety
///
/// `Reader` is `!Send` and `!Sync`. Open one reader per thread.
#[derive(Debug)]
pub struct Reader {
    file: MatFile,

    /// Marker to make Reader !Send and !Sync.
    _not_send_sync: PhantomData<*const ()>,
}

impl Reader {
    /// Open a MAT file for reading.
    ///
    /// # Errors
    ///
    /// - [`Error::OpenFailed`] if the file doesn't exist or isn't readable
    /// - [`Error::Format`] if it isn't a Level 5 MAT file, including v7.3
    ///   (HDF5) files which are reported as unsupported
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = MatFile::open(path, Access::ReadOnly).map_err(|e| match e {
            FormatError::Io(_) => Error::open_failed(path, e),
            other => Error::Format(other),
        })?;

        debug!("reader opened {}", path.display());
        Ok(Reader {
            file,
            _not_send_sync: PhantomData,
        })
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Descriptive text from the file header.
    pub fn header(&self) -> &str {
        self.file.header_text()
    }

    /// Whether a top-level variable named `name` exists.
    pub fn has_variable(&self, name: &str) -> bool {
        self.file.read_info(name).is_some()
    }

    /// Names of all top-level variables, in file order.
    pub fn variable_names(&self) -> Vec<&str> {
        self.file.names().collect()
    }

    /// Metadata of every top-level variable, in file order.
    pub fn variables(&self) -> Vec<VariableInfo> {
        self.file.infos().map(VariableInfo::from).collect()
    }

    /// Metadata of one variable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoSuchVariable`] if there is no such variable.
    pub fn info(&self, name: &str) -> Result<VariableInfo> {
        self.file
            .read_info(name)
            .map(VariableInfo::from)
            .ok_or_else(|| Error::NoSuchVariable {
                name: name.to_string(),
            })
    }

    /// Load a variable.
    ///
    /// # Errors
    ///
    /// - [`Error::NoSuchVariable`] if there is no such variable
    /// - [`Error::Format`] if the record cannot be decoded
    pub fn read(&self, name: &str) -> Result<Variable> {
        self.file
            .read(name)?
            .map(Variable::from_record)
            .ok_or_else(|| Error::NoSuchVariable {
                name: name.to_string(),
            })
    }

    /// Close the file.
    pub fn close(self) -> Result<()> {
        Ok(self.file.close()?)
    }
}
