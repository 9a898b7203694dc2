//! # matvar
//!
//! Safe, owning value types for reading and writing MATLAB MAT files.
//!
//! MAT files hold named, typed, N-dimensional records: numeric arrays,
//! text, cell arrays and struct arrays. `matvar` maps them onto a few
//! value types and converts numeric data to and from `ndarray`.
//!
//! ## Quick Start
//!
//! ### Writing
//!
//! ```no_run
//! use matvar::{Cell, Result, Struct, Variable, Writer};
//! use ndarray::array;
//!
//! fn main() -> Result<()> {
//!     let mut writer = Writer::create("out.mat")?;
//!
//!     writer.write("greeting", Variable::from("hello"))?;
//!     writer.write("m", Variable::from(&array![[1.0, 2.0], [3.0, 4.0]]))?;
//!
//!     let mut cell = Cell::new(&[1, 2], true)?;
//!     cell.set(0, Variable::from("first"))?;
//!     writer.write("c", cell.into_variable())?;
//!
//!     let mut s = Struct::new(&[1, 1], &["rate"])?;
//!     s.set("rate", 0, Variable::from(44100.0))?;
//!     writer.write("cfg", s.into_variable())?;
//!
//!     writer.close()
//! }
//! ```
//!
//! ### Reading
//!
//! ```no_run
//! use matvar::{Reader, Result};
//! use ndarray::Array2;
//!
//! fn main() -> Result<()> {
//!     let reader = Reader::open("out.mat")?;
//!     if reader.has_variable("greeting") {
//!         println!("{}", reader.read("greeting")?.to_text()?);
//!     }
//!     let m: Array2<f64> = (&reader.read("m")?).try_into()?;
//!     println!("{:?}", m.shape());
//!
//!     let cfg = reader.read("cfg")?.into_struct()?;
//!     println!("rate = {}", cfg.get("rate", 0)?.to_scalar()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Ownership
//!
//! A [`Variable`] owns its record and moves into whatever stores it:
//! [`Cell::set`], [`Struct::set`] and [`Writer::write`] all take it by
//! value. Container lookups return a [`VarRef`] borrowed from the
//! container; call [`VarRef::to_variable`] for an owned copy.
//!
//! ## Indexing
//!
//! Linear indices and subscripts are 0-based and column-major, matching
//! MATLAB's memory layout: in a 2×3 cell, subscript `[1, 2]` is linear
//! index 5.
//!
//! ## Thread Safety
//!
//! [`Reader`] and [`Writer`] are `!Send + !Sync`. Value types are plain
//! owned data.

#![deny(missing_docs)]

// Modules
mod builder;
mod cell;
mod error;
mod reader;
mod structure;
mod variable;
mod writer;

// Public exports
pub use builder::WriterBuilder;
pub use cell::Cell;
pub use error::{Error, ErrorKind, Result};
pub use reader::{Reader, VariableInfo};
pub use structure::Struct;
pub use variable::{VarRef, Variable};
pub use writer::Writer;

pub use matvar_format::{ClassType, Compression, DataType, FileVersion, FormatError, Record};

pub use ndarray;
