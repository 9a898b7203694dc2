//! Error types for MAT variable operations.
//!
//! This module provides the [`Error`] enum covering every failure mode of
//! the variable, container and file types, along with a convenient
//! [`Result`] type alias. Errors fall into two kinds, see [`ErrorKind`].

use std::io;
use std::path::PathBuf;

use matvar_format::FormatError;
use thiserror::Error;

/// Result type alias for matvar operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The two broad categories of failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Misuse or bad state: out-of-bounds index, missing variable or field,
    /// creation or open failure.
    Usage,
    /// A value cannot be viewed as the requested type.
    Cast,
}

/// Errors that can occur during matvar operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The variable holds no record.
    #[error("Variable is not instantiated")]
    NotInstantiated,

    /// The record cannot be converted to the requested type.
    #[error("Cannot convert to {target}: {reason}")]
    Cast {
        /// Name of the requested type.
        target: &'static str,
        /// Why the record does not qualify.
        reason: String,
    },

    /// An index is past the end of a container.
    #[error("Index {index} out of bounds for {len} elements")]
    OutOfBounds {
        /// Requested linear index.
        index: usize,
        /// Number of elements in the container.
        len: usize,
    },

    /// An N-dimensional index does not fit the container's shape.
    #[error("Subscript {subs:?} out of bounds for dimensions {dims:?}")]
    SubscriptOutOfBounds {
        /// Requested subscript.
        subs: Vec<usize>,
        /// Container dimensions.
        dims: Vec<usize>,
    },

    /// A cell slot has never been assigned.
    #[error("No element at index {index}")]
    NoSuchElement {
        /// Linear index of the slot.
        index: usize,
    },

    /// A struct field is unknown or unassigned at the given index.
    #[error("No field '{field}' at index {index}")]
    NoSuchField {
        /// Field name.
        field: String,
        /// Linear element index.
        index: usize,
    },

    /// The file has no top-level variable with this name.
    #[error("No such variable: '{name}'")]
    NoSuchVariable {
        /// Variable name.
        name: String,
    },

    /// A MAT file could not be opened for reading.
    #[error("Failed to open MAT file {path}: {source}")]
    OpenFailed {
        /// Path to the file.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: FormatError,
    },

    /// A record, container or file could not be created.
    #[error("Creation failed: {reason}")]
    CreateFailed {
        /// Description of the failure.
        reason: String,
    },

    /// A variable name is empty, too long, contains NUL or is already used.
    #[error("Invalid variable name '{name}': {reason}")]
    InvalidName {
        /// Offending name.
        name: String,
        /// Description of the problem.
        reason: &'static str,
    },

    /// I/O error from the underlying file system.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error from the MAT codec.
    #[error(transparent)]
    Format(FormatError),
}

impl Error {
    /// Create a Cast error.
    pub fn cast(target: &'static str, reason: impl Into<String>) -> Self {
        Self::Cast {
            target,
            reason: reason.into(),
        }
    }

    /// Create a CreateFailed error.
    pub fn create_failed(reason: impl ToString) -> Self {
        Self::CreateFailed {
            reason: reason.to_string(),
        }
    }

    /// Create an OpenFailed error for the given path.
    pub fn open_failed(path: impl Into<PathBuf>, source: FormatError) -> Self {
        Self::OpenFailed {
            path: path.into(),
            source,
        }
    }

    /// Create an InvalidName error.
    pub fn invalid_name(name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason,
        }
    }

    /// Which of the two kinds this error belongs to.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Error::NotInstantiated | Error::Cast { .. } => ErrorKind::Cast,
            _ => ErrorKind::Usage,
        }
    }

    /// Check if this is a conversion error.
    pub const fn is_cast(&self) -> bool {
        matches!(self.kind(), ErrorKind::Cast)
    }

    /// Check if this is an out-of-bounds error.
    pub const fn is_out_of_bounds(&self) -> bool {
        matches!(self, Error::OutOfBounds { .. } | Error::SubscriptOutOfBounds { .. })
    }
}

impl From<FormatError> for Error {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::Io(e) => Error::Io(e),
            FormatError::InvalidName(name) => Error::invalid_name(name, "must be 1-63 bytes without NUL"),
            FormatError::DuplicateVariable(name) => Error::invalid_name(name, "already written"),
            FormatError::IndexOutOfRange { index, len } => Error::OutOfBounds { index, len },
            other => Error::Format(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::cast("Array1<f64>", "record is complex");
        assert_eq!(err.to_string(), "Cannot convert to Array1<f64>: record is complex");

        let err = Error::OutOfBounds { index: 6, len: 6 };
        assert_eq!(err.to_string(), "Index 6 out of bounds for 6 elements");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Error::NotInstantiated.kind(), ErrorKind::Cast);
        assert_eq!(Error::cast("String", "x").kind(), ErrorKind::Cast);
        assert_eq!(Error::NoSuchVariable { name: "a".into() }.kind(), ErrorKind::Usage);
        assert_eq!(Error::create_failed("nope").kind(), ErrorKind::Usage);
        assert!(Error::OutOfBounds { index: 1, len: 1 }.is_out_of_bounds());
    }

    #[test]
    fn test_from_format_error() {
        let err: Error = FormatError::DuplicateVariable("x".into()).into();
        assert!(matches!(err, Error::InvalidName { .. }));

        let err: Error = FormatError::IndexOutOfRange { index: 3, len: 2 }.into();
        assert!(matches!(err, Error::OutOfBounds { index: 3, len: 2 }));

        let err: Error = FormatError::ReadOnly.into();
        assert!(matches!(err, Error::Format(FormatError::ReadOnly)));
    }
}
