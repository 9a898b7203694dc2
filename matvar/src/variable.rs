//! Owning and borrowed variable handles.
//!
//! [`Variable`] owns one record and moves between the places that hold it:
//! a file, a cell slot, a struct slot. [`VarRef`] is a borrow of a record
//! that lives inside a container; it converts and inspects like a
//! `Variable` but cannot outlive or be stored into anything.

use ndarray::{Array1, Array2, ShapeBuilder};

use matvar_format::{CharData, ClassType, DataType, NumericData, Record};

use crate::cell::Cell;
use crate::error::{Error, Result};
use crate::structure::Struct;

/// An owned MAT variable.
///
/// A `Variable` is either instantiated (it owns a record) or empty. Every
/// conversion on an empty variable fails with [`Error::NotInstantiated`].
///
/// # Example
///
/// ```
/// use matvar::Variable;
/// use ndarray::array;
///
/// let v = Variable::from(&array![1.0, 2.0, 3.0]);
/// assert_eq!(v.dims(), &[1, 3]);
/// assert_eq!(v.to_array1()?, array![1.0, 2.0, 3.0]);
/// # Ok::<(), matvar::Error>(())
/// ```
#[derive(Debug, Default, PartialEq)]
pub struct Variable {
    record: Option<Record>,
}

/// A borrowed view of a record held by a [`Cell`] or [`Struct`].
#[derive(Debug, Clone, Copy)]
pub struct VarRef<'a> {
    record: &'a Record,
}

impl Variable {
    /// Create an empty, uninstantiated variable.
    pub const fn empty() -> Self {
        Variable { record: None }
    }

    /// Take ownership of a record. The record is not validated.
    pub const fn from_record(record: Record) -> Self {
        Variable {
            record: Some(record),
        }
    }

    /// Create an n×1 column vector.
    pub fn column(data: &Array1<f64>) -> Self {
        Variable::from_record(Record::double_from_fn(data.len(), 1, |r, _| data[r]))
    }

    /// Create an N-dimensional double array from column-major data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CreateFailed`] if `dims` has fewer than two entries
    /// or its product differs from `data.len()`.
    pub fn from_shape_vec(dims: Vec<usize>, data: Vec<f64>) -> Result<Self> {
        Record::double(dims, data)
            .map(Variable::from_record)
            .map_err(Error::create_failed)
    }

    /// The owned record, if any.
    pub fn record(&self) -> Option<&Record> {
        self.record.as_ref()
    }

    /// Give up the owned record.
    pub fn into_record(self) -> Option<Record> {
        self.record
    }

    /// Borrow as a [`VarRef`], if instantiated.
    pub fn as_var_ref(&self) -> Option<VarRef<'_>> {
        self.record.as_ref().map(VarRef::new)
    }

    fn view(&self) -> Result<VarRef<'_>> {
        self.as_var_ref().ok_or(Error::NotInstantiated)
    }

    /// Whether the variable owns a record.
    pub fn is_instantiated(&self) -> bool {
        self.record.is_some()
    }

    /// Record name, or `""` when nested or uninstantiated.
    pub fn name(&self) -> &str {
        self.record.as_ref().map_or("", Record::name)
    }

    /// Array class; [`ClassType::Empty`] when uninstantiated.
    pub fn class(&self) -> ClassType {
        self.record.as_ref().map_or(ClassType::Empty, Record::class)
    }

    /// Storage data type of the payload.
    pub fn data_type(&self) -> Option<DataType> {
        self.record.as_ref().map(Record::data_type)
    }

    /// Dimensions; empty when uninstantiated.
    pub fn dims(&self) -> &[usize] {
        match &self.record {
            Some(record) => record.dims(),
            None => &[],
        }
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.dims().len()
    }

    /// Number of elements.
    pub fn numel(&self) -> usize {
        self.record.as_ref().map_or(0, Record::numel)
    }

    /// Whether the record has an imaginary part.
    pub fn is_complex(&self) -> bool {
        self.record.as_ref().map_or(false, Record::is_complex)
    }

    /// True when uninstantiated or when the record has no elements.
    pub fn is_empty(&self) -> bool {
        self.numel() == 0
    }

    /// Copy a real double scalar.
    pub fn to_scalar(&self) -> Result<f64> {
        self.view()?.to_scalar()
    }

    /// Copy a real double vector (1×n or n×1).
    pub fn to_array1(&self) -> Result<Array1<f64>> {
        self.view()?.to_array1()
    }

    /// Copy a real double matrix.
    pub fn to_array2(&self) -> Result<Array2<f64>> {
        self.view()?.to_array2()
    }

    /// Copy a char row or column as text, stopping at the first NUL.
    pub fn to_text(&self) -> Result<String> {
        self.view()?.to_text()
    }

    /// Reinterpret as a cell array.
    pub fn into_cell(self) -> Result<Cell> {
        Cell::try_from(self)
    }

    /// Reinterpret as a struct array.
    pub fn into_struct(self) -> Result<Struct> {
        Struct::try_from(self)
    }
}

impl<'a> VarRef<'a> {
    pub(crate) const fn new(record: &'a Record) -> Self {
        VarRef { record }
    }

    /// The borrowed record.
    pub const fn record(&self) -> &'a Record {
        self.record
    }

    /// Deep-copy into an owned [`Variable`].
    pub fn to_variable(&self) -> Variable {
        Variable::from_record(self.record.clone())
    }

    /// Array class.
    pub fn class(&self) -> ClassType {
        self.record.class()
    }

    /// Storage data type of the payload.
    pub fn data_type(&self) -> DataType {
        self.record.data_type()
    }

    /// Dimensions.
    pub fn dims(&self) -> &'a [usize] {
        self.record.dims()
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.record.rank()
    }

    /// Number of elements.
    pub fn numel(&self) -> usize {
        self.record.numel()
    }

    /// Whether the record has an imaginary part.
    pub fn is_complex(&self) -> bool {
        self.record.is_complex()
    }

    /// Whether the record has no elements.
    pub fn is_empty(&self) -> bool {
        self.numel() == 0
    }

    /// Copy a real double scalar.
    pub fn to_scalar(&self) -> Result<f64> {
        let data = real_doubles(self.record, "f64")?;
        match data {
            [value] => Ok(*value),
            _ => Err(Error::cast("f64", format!("record has {} elements", data.len()))),
        }
    }

    /// Copy a real double vector (1×n or n×1).
    pub fn to_array1(&self) -> Result<Array1<f64>> {
        const TARGET: &str = "Array1<f64>";
        let data = real_doubles(self.record, TARGET)?;
        check_rank2(self.record, TARGET)?;
        if !has_unit_dim(self.record.dims()) {
            return Err(Error::cast(
                TARGET,
                format!("dimensions {:?} are not a vector", self.record.dims()),
            ));
        }
        Ok(Array1::from_vec(data.to_vec()))
    }

    /// Copy a real double matrix, keeping its row and column extents.
    pub fn to_array2(&self) -> Result<Array2<f64>> {
        const TARGET: &str = "Array2<f64>";
        let data = real_doubles(self.record, TARGET)?;
        check_rank2(self.record, TARGET)?;
        let (rows, cols) = (self.record.dims()[0], self.record.dims()[1]);

        // Stored column-major.
        Array2::from_shape_vec((rows, cols).f(), data.to_vec())
            .map_err(|e| Error::cast(TARGET, format!("shape error: {}", e)))
    }

    /// Copy a char row or column as text, stopping at the first NUL.
    ///
    /// Only byte-oriented storage (`UInt8` or `Utf8`) converts. Bytes that
    /// are not valid UTF-8 are read as Latin-1.
    pub fn to_text(&self) -> Result<String> {
        const TARGET: &str = "String";
        let chars = self.record.char_data().ok_or_else(|| {
            Error::cast(TARGET, format!("record class is {}", self.record.class()))
        })?;
        if self.record.is_complex() {
            return Err(Error::cast(TARGET, "record is complex"));
        }
        check_rank2(self.record, TARGET)?;
        if !has_unit_dim(self.record.dims()) {
            return Err(Error::cast(
                TARGET,
                format!("dimensions {:?} are not a single row or column", self.record.dims()),
            ));
        }

        let bytes = match chars {
            CharData::UInt8(bytes) | CharData::Utf8(bytes) => bytes,
            CharData::Utf16(_) => {
                return Err(Error::cast(TARGET, "UTF-16 char storage is not supported"))
            }
        };
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let bytes = bytes[..end].to_vec();
        Ok(String::from_utf8(bytes)
            .unwrap_or_else(|e| e.into_bytes().into_iter().map(char::from).collect()))
    }
}

fn real_doubles<'r>(record: &'r Record, target: &'static str) -> Result<&'r [f64]> {
    let (real, imag) = record
        .numeric_data()
        .ok_or_else(|| Error::cast(target, format!("record class is {}", record.class())))?;
    if imag.is_some() {
        return Err(Error::cast(target, "record is complex"));
    }
    match real {
        NumericData::Double(data) if record.class() == ClassType::Double => Ok(data.as_slice()),
        other => Err(Error::cast(
            target,
            format!("record holds {} data", other.data_type()),
        )),
    }
}

fn check_rank2(record: &Record, target: &'static str) -> Result<()> {
    if record.rank() != 2 {
        return Err(Error::cast(target, format!("record has rank {}", record.rank())));
    }
    Ok(())
}

fn has_unit_dim(dims: &[usize]) -> bool {
    dims.len() == 2 && (dims[0] == 1 || dims[1] == 1)
}

impl From<Record> for Variable {
    fn from(record: Record) -> Self {
        Variable::from_record(record)
    }
}

impl<'a> From<&'a Record> for VarRef<'a> {
    fn from(record: &'a Record) -> Self {
        VarRef::new(record)
    }
}

impl From<f64> for Variable {
    fn from(value: f64) -> Self {
        Variable::from_record(Record::double_from_fn(1, 1, |_, _| value))
    }
}

/// Builds a 1×n row vector. Use [`Variable::column`] for n×1.
impl From<&Array1<f64>> for Variable {
    fn from(data: &Array1<f64>) -> Self {
        Variable::from_record(Record::double_from_fn(1, data.len(), |_, c| data[c]))
    }
}

impl From<&Array2<f64>> for Variable {
    fn from(data: &Array2<f64>) -> Self {
        let (rows, cols) = data.dim();
        Variable::from_record(Record::double_from_fn(rows, cols, |r, c| data[[r, c]]))
    }
}

impl From<&str> for Variable {
    fn from(text: &str) -> Self {
        Variable::from_record(Record::text(text))
    }
}

impl From<String> for Variable {
    fn from(text: String) -> Self {
        Variable::from(text.as_str())
    }
}

macro_rules! impl_try_from_view {
    ($($target:ty => $method:ident),* $(,)?) => {
        $(
            impl TryFrom<&Variable> for $target {
                type Error = Error;

                fn try_from(value: &Variable) -> Result<Self> {
                    value.$method()
                }
            }

            impl TryFrom<VarRef<'_>> for $target {
                type Error = Error;

                fn try_from(value: VarRef<'_>) -> Result<Self> {
                    value.$method()
                }
            }
        )*
    };
}

impl_try_from_view! {
    f64 => to_scalar,
    Array1<f64> => to_array1,
    Array2<f64> => to_array2,
    String => to_text,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use ndarray::array;

    #[test]
    fn test_row_and_column_vectors() {
        let data = array![1.0, 2.0, 3.0];
        assert_eq!(Variable::from(&data).dims(), &[1, 3]);
        assert_eq!(Variable::column(&data).dims(), &[3, 1]);
        assert_eq!(Variable::column(&data).to_array1().unwrap(), data);
    }

    #[test]
    fn test_matrix_is_column_major() {
        let m = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let v = Variable::from(&m);
        assert_eq!(v.dims(), &[2, 3]);
        let (real, _) = v.record().unwrap().numeric_data().unwrap();
        assert_eq!(real.as_f64(), Some(&[1.0, 4.0, 2.0, 5.0, 3.0, 6.0][..]));
        assert_eq!(v.to_array2().unwrap(), m);
    }

    #[test]
    fn test_empty_variable() {
        let v = Variable::empty();
        assert!(!v.is_instantiated());
        assert!(v.is_empty());
        assert_eq!(v.class(), ClassType::Empty);
        assert_eq!(v.rank(), 0);
        assert!(matches!(v.to_array1(), Err(Error::NotInstantiated)));
        assert!(matches!(v.to_text(), Err(Error::NotInstantiated)));
    }

    #[test]
    fn test_matrix_is_not_a_vector() {
        let v = Variable::from(&array![[1.0, 2.0], [3.0, 4.0]]);
        let err = v.to_array1().unwrap_err();
        assert!(err.is_cast());
    }

    #[test]
    fn test_text_stops_at_nul() {
        let record = Record::chars(vec![1, 4], CharData::UInt8(b"ab\0c".to_vec())).unwrap();
        assert_eq!(Variable::from_record(record).to_text().unwrap(), "ab");
    }

    #[test]
    fn test_text_latin1_fallback() {
        let record = Record::chars(vec![1, 2], CharData::UInt8(vec![b'a', 0xE9])).unwrap();
        assert_eq!(Variable::from_record(record).to_text().unwrap(), "a\u{e9}");
    }

    #[test]
    fn test_utf16_text_rejected() {
        let record = Record::chars(vec![1, 2], CharData::Utf16(vec![104, 105])).unwrap();
        assert!(Variable::from_record(record).to_text().unwrap_err().is_cast());
    }

    #[test]
    fn test_single_is_not_double() {
        let record = Record::numeric(vec![1, 2], NumericData::Single(vec![1.0, 2.0])).unwrap();
        assert!(Variable::from_record(record).to_array1().unwrap_err().is_cast());
    }

    #[test]
    fn test_scalar() {
        assert_eq!(Variable::from(2.5).to_scalar().unwrap(), 2.5);
        let v = Variable::from(&array![1.0, 2.0]);
        assert!(v.to_scalar().unwrap_err().is_cast());
    }

    #[test]
    fn test_from_shape_vec() {
        let v = Variable::from_shape_vec(vec![2, 2, 2], vec![0.0; 8]).unwrap();
        assert_eq!(v.rank(), 3);
        assert!(v.to_array2().unwrap_err().is_cast());

        let err = Variable::from_shape_vec(vec![4], vec![0.0; 4]).unwrap_err();
        assert!(matches!(err, Error::CreateFailed { .. }));
        let err = Variable::from_shape_vec(vec![2, 2], vec![0.0; 3]).unwrap_err();
        assert!(matches!(err, Error::CreateFailed { .. }));
    }

    #[test]
    fn test_from_shape_vec_overflow() {
        let err = Variable::from_shape_vec(vec![1 << 40, 1 << 40], Vec::new()).unwrap_err();
        assert!(matches!(err, Error::CreateFailed { .. }));
    }

    #[test]
    fn test_complex_does_not_convert() {
        let record = Record::complex(
            vec![1, 2],
            NumericData::Double(vec![1.0, 2.0]),
            NumericData::Double(vec![0.5, -0.5]),
        )
        .unwrap();
        let v = Variable::from_record(record);
        assert!(v.is_complex());

        for err in [
            v.to_array1().unwrap_err(),
            v.to_array2().unwrap_err(),
            v.to_scalar().unwrap_err(),
        ] {
            assert!(matches!(err, Error::Cast { .. }));
            assert_eq!(err.kind(), ErrorKind::Cast);
        }

        let scalar = Record::complex(
            vec![1, 1],
            NumericData::Double(vec![1.0]),
            NumericData::Double(vec![2.0]),
        )
        .unwrap();
        let err = Variable::from_record(scalar).to_scalar().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Cast);
    }
}
