//! Error types for MAT record and file operations.

use std::io;

use thiserror::Error;

/// Result type alias for format operations.
pub type Result<T> = std::result::Result<T, FormatError>;

/// Errors raised by the record model and the Level 5 codec.
#[derive(Error, Debug)]
pub enum FormatError {
    /// I/O error from the underlying file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The 128-byte file header is missing or malformed.
    #[error("Invalid MAT header: {reason}")]
    InvalidHeader {
        /// Description of the header problem.
        reason: String,
    },

    /// The file uses a MAT version this crate cannot handle.
    #[error("Unsupported MAT file version: {version}")]
    UnsupportedVersion {
        /// Human-readable version description.
        version: String,
    },

    /// Ran out of bytes while decoding an element.
    #[error("Unexpected end of data: need {expected} bytes, have {available}")]
    UnexpectedEof {
        /// Number of bytes required.
        expected: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// An element tag carries a data type code we do not know.
    #[error("Unknown data type code: {0}")]
    UnknownDataType(u32),

    /// An array carries a class code we do not know.
    #[error("Unknown class code: {0}")]
    UnknownClass(u8),

    /// The class is recognised but cannot be represented as a record.
    #[error("Unsupported class: {0}")]
    UnsupportedClass(String),

    /// A data element appeared where another kind was expected.
    #[error("Malformed element: {reason}")]
    Malformed {
        /// Description of the problem.
        reason: String,
    },

    /// Dimensions and payload length disagree, or the rank is invalid.
    #[error("Invalid shape {dims:?}: {reason}")]
    InvalidShape {
        /// The offending dimensions.
        dims: Vec<usize>,
        /// Description of the problem.
        reason: String,
    },

    /// A linear index or subscript lies outside the array.
    #[error("Index {index} out of range for {len} elements")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// Number of addressable elements.
        len: usize,
    },

    /// A record operation was applied to a record of the wrong class.
    #[error("Operation requires a {expected} record, found {found}")]
    WrongClass {
        /// Class the operation needs.
        expected: &'static str,
        /// Class of the record.
        found: String,
    },

    /// The named field does not exist in the struct record.
    #[error("No field named '{0}'")]
    NoSuchField(String),

    /// A struct field name is empty, too long, contains NUL or repeats.
    #[error("Invalid field name '{name}': {reason}")]
    InvalidFieldName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A variable name is empty or contains NUL.
    #[error("Invalid variable name '{0}'")]
    InvalidName(String),

    /// A top-level record with this name was already written to the file.
    #[error("Variable '{0}' already written to this file")]
    DuplicateVariable(String),

    /// The file context was opened read-only.
    #[error("File is opened read-only")]
    ReadOnly,

    /// The file context has already been closed.
    #[error("File has been closed")]
    Closed,

    /// zlib compression failed.
    #[error("Compression failed: {0}")]
    Compression(String),

    /// zlib decompression failed.
    #[error("Decompression failed: {0}")]
    Decompression(String),
}

impl FormatError {
    /// Create an InvalidHeader error.
    pub fn invalid_header(reason: impl Into<String>) -> Self {
        Self::InvalidHeader { reason: reason.into() }
    }

    /// Create a Malformed error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed { reason: reason.into() }
    }

    /// Create an InvalidShape error.
    pub fn invalid_shape(dims: &[usize], reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            dims: dims.to_vec(),
            reason: reason.into(),
        }
    }

    /// Create a WrongClass error.
    pub fn wrong_class(expected: &'static str, found: impl ToString) -> Self {
        Self::WrongClass {
            expected,
            found: found.to_string(),
        }
    }

    /// Create an UnexpectedEof error.
    pub const fn eof(expected: usize, available: usize) -> Self {
        Self::UnexpectedEof { expected, available }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FormatError::eof(16, 4);
        assert_eq!(err.to_string(), "Unexpected end of data: need 16 bytes, have 4");

        let err = FormatError::invalid_shape(&[2, 3], "expected 6 elements, got 5");
        assert!(err.to_string().contains("[2, 3]"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: FormatError = io_err.into();
        assert!(matches!(err, FormatError::Io(_)));
    }
}
