//! # matvar-format
//!
//! Record model and Level 5 binary codec for MATLAB MAT files.
//!
//! This crate is the low-level layer underneath `matvar`. It knows the
//! on-disk layout (128-byte header, tagged data elements, `miMATRIX`
//! arrays and `miCOMPRESSED` zlib streams) and exposes the contents as an
//! owned [`Record`] tree. It has no opinion about numeric array types.
//!
//! ## Example
//!
//! ```no_run
//! use matvar_format::{Access, Compression, FileVersion, MatFile, Record, Result};
//!
//! fn main() -> Result<()> {
//!     let mut file = MatFile::create("out.mat", None, FileVersion::Mat5)?;
//!     let mut record = Record::double(vec![1, 3], vec![1.0, 2.0, 3.0])?;
//!     record.set_name("x");
//!     file.write(&record, Compression::Zlib)?;
//!     file.close()?;
//!
//!     let file = MatFile::open("out.mat", Access::ReadOnly)?;
//!     for info in file.infos() {
//!         println!("{} {:?} {}", info.name, info.dims, info.class);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Supported classes
//!
//! Numeric (double, single and the eight integer classes, real or
//! complex, optionally logical), char, cell and struct arrays. Sparse,
//! object, function handle and opaque records are skipped when a file is
//! indexed. MAT v7.3 (HDF5) files are rejected.

#![deny(missing_docs)]

mod decode;
mod encode;
mod endian;
mod error;
mod file;
mod record;
pub mod subscript;
mod types;

pub use decode::RecordInfo;
pub use endian::Endian;
pub use error::{FormatError, Result};
pub use file::{Access, Compression, FileVersion, MatFile, HEADER_LEN, HEADER_TEXT_LEN};
pub use record::{validate_name, CharData, NumericData, Payload, Record, MAX_NAME_LEN};
pub use subscript::{calc_single_subscript, calc_subscripts, checked_element_count, element_count};
pub use types::{ClassType, DataType};
