//! In-memory MAT records.
//!
//! A [`Record`] is one named, typed, shaped unit of MAT data. Cell and
//! struct records own their children, so a record tree has exactly one
//! owner at every level and is released with it.

use crate::error::{FormatError, Result};
use crate::subscript::{checked_element_count, element_count};
use crate::types::{ClassType, DataType};

/// Longest name MATLAB accepts for variables and struct fields.
pub const MAX_NAME_LEN: usize = 63;

/// Typed numeric storage, one vector per numeric class.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum NumericData {
    Double(Vec<f64>),
    Single(Vec<f32>),
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
}

macro_rules! for_each_numeric {
    ($data:expr, $v:ident => $body:expr) => {
        match $data {
            NumericData::Double($v) => $body,
            NumericData::Single($v) => $body,
            NumericData::Int8($v) => $body,
            NumericData::UInt8($v) => $body,
            NumericData::Int16($v) => $body,
            NumericData::UInt16($v) => $body,
            NumericData::Int32($v) => $body,
            NumericData::UInt32($v) => $body,
            NumericData::Int64($v) => $body,
            NumericData::UInt64($v) => $body,
        }
    };
}

impl NumericData {
    /// Number of elements.
    pub fn len(&self) -> usize {
        for_each_numeric!(self, v => v.len())
    }

    /// Check if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element data type of the storage.
    pub const fn data_type(&self) -> DataType {
        match self {
            NumericData::Double(_) => DataType::Double,
            NumericData::Single(_) => DataType::Single,
            NumericData::Int8(_) => DataType::Int8,
            NumericData::UInt8(_) => DataType::UInt8,
            NumericData::Int16(_) => DataType::Int16,
            NumericData::UInt16(_) => DataType::UInt16,
            NumericData::Int32(_) => DataType::Int32,
            NumericData::UInt32(_) => DataType::UInt32,
            NumericData::Int64(_) => DataType::Int64,
            NumericData::UInt64(_) => DataType::UInt64,
        }
    }

    /// Array class matching the storage.
    pub const fn class(&self) -> ClassType {
        match self {
            NumericData::Double(_) => ClassType::Double,
            NumericData::Single(_) => ClassType::Single,
            NumericData::Int8(_) => ClassType::Int8,
            NumericData::UInt8(_) => ClassType::UInt8,
            NumericData::Int16(_) => ClassType::Int16,
            NumericData::UInt16(_) => ClassType::UInt16,
            NumericData::Int32(_) => ClassType::Int32,
            NumericData::UInt32(_) => ClassType::UInt32,
            NumericData::Int64(_) => ClassType::Int64,
            NumericData::UInt64(_) => ClassType::UInt64,
        }
    }

    /// Borrow the data if it is stored as `f64`.
    pub fn as_f64(&self) -> Option<&[f64]> {
        match self {
            NumericData::Double(v) => Some(v),
            _ => None,
        }
    }

    /// Widen every element to `f64` (lossy for large 64-bit integers).
    pub fn to_f64_vec(&self) -> Vec<f64> {
        for_each_numeric!(self, v => v.iter().map(|&x| x as f64).collect())
    }

    /// Convert to the storage of a numeric `class`.
    ///
    /// MATLAB may store an array with a narrower element type than its
    /// class (a double array of small integers as `miUINT8`); this widens
    /// such data back. Returns `None` for non-numeric classes.
    pub fn cast(self, class: ClassType) -> Option<NumericData> {
        if self.class() == class {
            return Some(self);
        }
        macro_rules! cast_into {
            ($variant:ident, $ty:ty) => {
                for_each_numeric!(&self, v => NumericData::$variant(v.iter().map(|&x| x as $ty).collect()))
            };
        }
        let data = match class {
            ClassType::Double => cast_into!(Double, f64),
            ClassType::Single => cast_into!(Single, f32),
            ClassType::Int8 => cast_into!(Int8, i8),
            ClassType::UInt8 => cast_into!(UInt8, u8),
            ClassType::Int16 => cast_into!(Int16, i16),
            ClassType::UInt16 => cast_into!(UInt16, u16),
            ClassType::Int32 => cast_into!(Int32, i32),
            ClassType::UInt32 => cast_into!(UInt32, u32),
            ClassType::Int64 => cast_into!(Int64, i64),
            ClassType::UInt64 => cast_into!(UInt64, u64),
            _ => return None,
        };
        Some(data)
    }
}

/// Character storage. Dimensions count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharData {
    /// One byte per character (miUINT8).
    UInt8(Vec<u8>),
    /// UTF-8 encoded text (miUTF8).
    Utf8(Vec<u8>),
    /// UTF-16 code units (miUTF16), as MATLAB itself writes text.
    Utf16(Vec<u16>),
}

impl CharData {
    /// Element data type of the storage.
    pub const fn data_type(&self) -> DataType {
        match self {
            CharData::UInt8(_) => DataType::UInt8,
            CharData::Utf8(_) => DataType::Utf8,
            CharData::Utf16(_) => DataType::Utf16,
        }
    }

    /// Number of stored code units.
    pub fn len(&self) -> usize {
        match self {
            CharData::UInt8(v) | CharData::Utf8(v) => v.len(),
            CharData::Utf16(v) => v.len(),
        }
    }

    /// Check if no code units are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Class-specific content of a record.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Numeric array with an optional imaginary part.
    Numeric {
        /// Real part, column-major.
        real: NumericData,
        /// Imaginary part, same type and length as `real`.
        imag: Option<NumericData>,
    },
    /// Character array.
    Char(CharData),
    /// Cell array slots, column-major. `None` marks a slot never assigned.
    Cell(Vec<Option<Record>>),
    /// Struct array.
    Struct {
        /// Field names in declaration order.
        fields: Vec<String>,
        /// Field values, `element * fields.len() + field`.
        slots: Vec<Option<Record>>,
    },
}

/// One MAT record: a name, a shape and a typed payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    name: String,
    dims: Vec<usize>,
    logical: bool,
    global: bool,
    payload: Payload,
}

/// Check the rank and return the element count.
fn check_shape(dims: &[usize]) -> Result<usize> {
    if dims.len() < 2 {
        return Err(FormatError::invalid_shape(dims, "rank must be at least 2"));
    }
    checked_element_count(dims)
}

fn check_len(dims: &[usize], len: usize) -> Result<()> {
    let expected = check_shape(dims)?;
    if expected != len {
        return Err(FormatError::invalid_shape(
            dims,
            format!("expected {} elements, got {}", expected, len),
        ));
    }
    Ok(())
}

fn unset_slots(dims: &[usize], len: usize) -> Result<Vec<Option<Record>>> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(len)
        .map_err(|_| FormatError::invalid_shape(dims, format!("cannot allocate {} slots", len)))?;
    slots.resize(len, None);
    Ok(slots)
}

/// Validate a variable or field name.
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('\0') || name.len() > MAX_NAME_LEN {
        return Err(FormatError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl Record {
    /// Create a real numeric record.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::InvalidShape`] if the rank is below 2 or the
    /// element count differs from `dims`.
    pub fn numeric(dims: Vec<usize>, real: NumericData) -> Result<Self> {
        check_len(&dims, real.len())?;
        Ok(Record {
            name: String::new(),
            dims,
            logical: false,
            global: false,
            payload: Payload::Numeric { real, imag: None },
        })
    }

    /// Create a complex numeric record.
    pub fn complex(dims: Vec<usize>, real: NumericData, imag: NumericData) -> Result<Self> {
        if real.data_type() != imag.data_type() {
            return Err(FormatError::malformed(format!(
                "real part is {}, imaginary part is {}",
                real.data_type(),
                imag.data_type()
            )));
        }
        check_len(&dims, real.len())?;
        check_len(&dims, imag.len())?;
        Ok(Record {
            name: String::new(),
            dims,
            logical: false,
            global: false,
            payload: Payload::Numeric {
                real,
                imag: Some(imag),
            },
        })
    }

    /// Create a double-precision record from column-major data.
    pub fn double(dims: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        Self::numeric(dims, NumericData::Double(data))
    }

    /// Create a `rows`×`cols` double record whose element `(r, c)` is
    /// `f(r, c)`.
    ///
    /// The data is generated in column-major order, so the element count
    /// always matches the dims.
    ///
    /// # Panics
    ///
    /// Panics if `rows * cols` overflows `usize`.
    pub fn double_from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let len = rows
            .checked_mul(cols)
            .unwrap_or_else(|| panic!("{}x{} element count overflows", rows, cols));
        let mut data = Vec::with_capacity(len);
        for c in 0..cols {
            for r in 0..rows {
                data.push(f(r, c));
            }
        }
        Record {
            name: String::new(),
            dims: vec![rows, cols],
            logical: false,
            global: false,
            payload: Payload::Numeric {
                real: NumericData::Double(data),
                imag: None,
            },
        }
    }

    /// The 0x0 double used as a placeholder in containers.
    pub fn empty() -> Self {
        Record {
            name: String::new(),
            dims: vec![0, 0],
            logical: false,
            global: false,
            payload: Payload::Numeric {
                real: NumericData::Double(Vec::new()),
                imag: None,
            },
        }
    }

    /// Create a 1xN char row holding `text` as one byte per character.
    pub fn text(text: &str) -> Self {
        let bytes = text.as_bytes().to_vec();
        Record {
            name: String::new(),
            dims: vec![1, bytes.len()],
            logical: false,
            global: false,
            payload: Payload::Char(CharData::UInt8(bytes)),
        }
    }

    /// Create a char record with explicit storage.
    pub fn chars(dims: Vec<usize>, data: CharData) -> Result<Self> {
        check_shape(&dims)?;
        if !matches!(data, CharData::Utf8(_)) {
            check_len(&dims, data.len())?;
        }
        Ok(Record {
            name: String::new(),
            dims,
            logical: false,
            global: false,
            payload: Payload::Char(data),
        })
    }

    /// Create a cell record whose slots are all unassigned.
    pub fn cell(dims: Vec<usize>) -> Result<Self> {
        let len = check_shape(&dims)?;
        let slots = unset_slots(&dims, len)?;
        Ok(Record {
            name: String::new(),
            dims,
            logical: false,
            global: false,
            payload: Payload::Cell(slots),
        })
    }

    /// Create a struct record with the given field names and no values.
    ///
    /// # Errors
    ///
    /// - [`FormatError::InvalidShape`] if the rank is below 2 or the slot
    ///   count overflows
    /// - [`FormatError::InvalidFieldName`] for empty, over-long, NUL-bearing
    ///   or repeated names
    pub fn structure<S: AsRef<str>>(dims: Vec<usize>, fields: &[S]) -> Result<Self> {
        let numel = check_shape(&dims)?;

        let mut names: Vec<String> = Vec::with_capacity(fields.len());
        for field in fields {
            let field = field.as_ref();
            let reason = if field.is_empty() {
                Some("empty")
            } else if field.contains('\0') {
                Some("contains NUL")
            } else if field.len() > MAX_NAME_LEN {
                Some("longer than 63 bytes")
            } else if names.iter().any(|n| n == field) {
                Some("duplicate")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(FormatError::InvalidFieldName {
                    name: field.to_string(),
                    reason,
                });
            }
            names.push(field.to_string());
        }

        let len = numel
            .checked_mul(names.len())
            .ok_or_else(|| FormatError::invalid_shape(&dims, "slot count overflows"))?;
        let slots = unset_slots(&dims, len)?;
        Ok(Record {
            name: String::new(),
            dims,
            logical: false,
            global: false,
            payload: Payload::Struct {
                fields: names,
                slots,
            },
        })
    }

    /// Assemble a record from decoded parts.
    pub(crate) fn from_parts(
        name: String,
        dims: Vec<usize>,
        logical: bool,
        global: bool,
        payload: Payload,
    ) -> Self {
        Record {
            name,
            dims,
            logical,
            global,
            payload,
        }
    }

    /// Record name (empty for records nested in containers).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the record.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Array class.
    pub fn class(&self) -> ClassType {
        match &self.payload {
            Payload::Numeric { real, .. } => real.class(),
            Payload::Char(_) => ClassType::Char,
            Payload::Cell(_) => ClassType::Cell,
            Payload::Struct { .. } => ClassType::Struct,
        }
    }

    /// Element data type.
    pub fn data_type(&self) -> DataType {
        match &self.payload {
            Payload::Numeric { real, .. } => real.data_type(),
            Payload::Char(chars) => chars.data_type(),
            Payload::Cell(_) => DataType::Cell,
            Payload::Struct { .. } => DataType::Struct,
        }
    }

    /// Dimensions.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Number of elements.
    pub fn numel(&self) -> usize {
        // Every constructor validates the product.
        element_count(&self.dims).unwrap_or(0)
    }

    /// Check if the record has an imaginary part.
    pub fn is_complex(&self) -> bool {
        matches!(&self.payload, Payload::Numeric { imag: Some(_), .. })
    }

    /// Check if the logical flag is set.
    pub fn is_logical(&self) -> bool {
        self.logical
    }

    /// Set the logical flag. Only meaningful on real numeric records.
    pub fn set_logical(&mut self, logical: bool) {
        self.logical = logical;
    }

    /// Check if the global flag is set.
    pub fn is_global(&self) -> bool {
        self.global
    }

    /// Class-specific payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Numeric parts, if this is a numeric record.
    pub fn numeric_data(&self) -> Option<(&NumericData, Option<&NumericData>)> {
        match &self.payload {
            Payload::Numeric { real, imag } => Some((real, imag.as_ref())),
            _ => None,
        }
    }

    /// Character storage, if this is a char record.
    pub fn char_data(&self) -> Option<&CharData> {
        match &self.payload {
            Payload::Char(chars) => Some(chars),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Cell access
    // ------------------------------------------------------------------

    fn cell_slots_mut(&mut self) -> Result<&mut Vec<Option<Record>>> {
        let class = self.class();
        match &mut self.payload {
            Payload::Cell(slots) => Ok(slots),
            _ => Err(FormatError::wrong_class("cell", class)),
        }
    }

    /// All cell slots in column-major order.
    pub fn cell_slots(&self) -> Result<&[Option<Record>]> {
        match &self.payload {
            Payload::Cell(slots) => Ok(slots),
            _ => Err(FormatError::wrong_class("cell", self.class())),
        }
    }

    /// Borrow the record in a cell slot; `Ok(None)` if it was never set.
    pub fn cell_get(&self, index: usize) -> Result<Option<&Record>> {
        let slots = self.cell_slots()?;
        slots
            .get(index)
            .map(Option::as_ref)
            .ok_or(FormatError::IndexOutOfRange {
                index,
                len: slots.len(),
            })
    }

    /// Store a record in a cell slot, returning the one it displaced.
    pub fn cell_set(&mut self, index: usize, value: Record) -> Result<Option<Record>> {
        let slots = self.cell_slots_mut()?;
        let len = slots.len();
        let slot = slots
            .get_mut(index)
            .ok_or(FormatError::IndexOutOfRange { index, len })?;
        Ok(slot.replace(value))
    }

    /// Remove and return the record in a cell slot.
    pub fn cell_take(&mut self, index: usize) -> Result<Option<Record>> {
        let slots = self.cell_slots_mut()?;
        let len = slots.len();
        let slot = slots
            .get_mut(index)
            .ok_or(FormatError::IndexOutOfRange { index, len })?;
        Ok(slot.take())
    }

    // ------------------------------------------------------------------
    // Struct access
    // ------------------------------------------------------------------

    /// Field names, if this is a struct record.
    pub fn field_names(&self) -> Result<&[String]> {
        match &self.payload {
            Payload::Struct { fields, .. } => Ok(fields),
            _ => Err(FormatError::wrong_class("struct", self.class())),
        }
    }

    /// Position of `name` in the field list (exact, case-sensitive).
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.field_names()
            .ok()?
            .iter()
            .position(|field| field == name)
    }

    fn struct_slot(&self, name: &str, index: usize) -> Result<usize> {
        let nfields = self.field_names()?.len();
        let len = self.numel();
        if index >= len {
            return Err(FormatError::IndexOutOfRange { index, len });
        }
        let field = self
            .field_index(name)
            .ok_or_else(|| FormatError::NoSuchField(name.to_string()))?;
        Ok(index * nfields + field)
    }

    /// Borrow a struct field value; `Ok(None)` if it was never set.
    pub fn field_get(&self, name: &str, index: usize) -> Result<Option<&Record>> {
        let slot = self.struct_slot(name, index)?;
        match &self.payload {
            Payload::Struct { slots, .. } => Ok(slots[slot].as_ref()),
            _ => Err(FormatError::wrong_class("struct", self.class())),
        }
    }

    /// Store a struct field value, returning the one it displaced.
    pub fn field_set(&mut self, name: &str, index: usize, value: Record) -> Result<Option<Record>> {
        let slot = self.struct_slot(name, index)?;
        let class = self.class();
        match &mut self.payload {
            Payload::Struct { slots, .. } => Ok(slots[slot].replace(value)),
            _ => Err(FormatError::wrong_class("struct", class)),
        }
    }

    /// Remove and return a struct field value.
    pub fn field_take(&mut self, name: &str, index: usize) -> Result<Option<Record>> {
        let slot = self.struct_slot(name, index)?;
        let class = self.class();
        match &mut self.payload {
            Payload::Struct { slots, .. } => Ok(slots[slot].take()),
            _ => Err(FormatError::wrong_class("struct", class)),
        }
    }
}
