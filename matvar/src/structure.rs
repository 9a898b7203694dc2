//! Struct arrays.

use matvar_format::{calc_single_subscript, ClassType, FormatError, Record};

use crate::error::{Error, Result};
use crate::variable::{VarRef, Variable};

/// A fixed-shape array of records sharing one set of named fields.
///
/// Field names are fixed at construction and matched exactly
/// (case-sensitive). Every element carries every field.
///
/// # Example
///
/// ```
/// use matvar::{Struct, Variable};
///
/// let mut s = Struct::new(&[1, 1], &["name", "score"])?;
/// s.set("name", 0, Variable::from("ada"))?;
/// s.set("score", 0, Variable::from(97.5))?;
/// assert!(s.has_field("score"));
/// assert_eq!(s.get("name", 0)?.to_text()?, "ada");
/// # Ok::<(), matvar::Error>(())
/// ```
#[derive(Debug, PartialEq)]
pub struct Struct {
    record: Record,
}

impl Struct {
    /// Create a struct array with the given shape and field names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CreateFailed`] if `dims` has fewer than two entries
    /// or too many elements, or a field name is empty, contains NUL, is longer than 63 bytes or
    /// repeats an earlier name.
    pub fn new<S: AsRef<str>>(dims: &[usize], fields: &[S]) -> Result<Self> {
        let record = Record::structure(dims.to_vec(), fields).map_err(Error::create_failed)?;
        Ok(Struct { record })
    }

    /// Field names in declaration order.
    pub fn fields(&self) -> &[String] {
        self.record.field_names().unwrap_or(&[])
    }

    /// Number of fields.
    pub fn nfields(&self) -> usize {
        self.fields().len()
    }

    /// Whether `name` is one of the fields (exact match).
    pub fn has_field(&self, name: &str) -> bool {
        self.record.field_index(name).is_some()
    }

    /// Number of elements.
    pub fn nelems(&self) -> usize {
        self.record.numel()
    }

    /// Number of dimensions.
    pub fn ndims(&self) -> usize {
        self.record.rank()
    }

    /// Dimensions.
    pub fn dims(&self) -> &[usize] {
        self.record.dims()
    }

    fn linear_index(&self, subs: &[usize]) -> Result<usize> {
        calc_single_subscript(self.dims(), subs).map_err(|_| Error::SubscriptOutOfBounds {
            subs: subs.to_vec(),
            dims: self.dims().to_vec(),
        })
    }

    /// Store `value` in `field` of element `index`.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfBounds`] if `index >= self.nelems()`
    /// - [`Error::NoSuchField`] if `field` is not one of the fields
    /// - [`Error::NotInstantiated`] if `value` is empty
    pub fn set(&mut self, field: &str, index: usize, value: Variable) -> Result<()> {
        self.replace(field, index, value).map(|_| ())
    }

    /// Store `value` in `field` of the element at an N-dimensional subscript.
    pub fn set_at(&mut self, field: &str, subs: &[usize], value: Variable) -> Result<()> {
        let index = self.linear_index(subs)?;
        self.set(field, index, value)
    }

    /// Store `value` and return the previous occupant of the slot.
    pub fn replace(&mut self, field: &str, index: usize, value: Variable) -> Result<Option<Variable>> {
        if index >= self.nelems() {
            return Err(Error::OutOfBounds {
                index,
                len: self.nelems(),
            });
        }
        if !self.has_field(field) {
            return Err(Error::NoSuchField {
                field: field.to_string(),
                index,
            });
        }
        let mut record = value.into_record().ok_or(Error::NotInstantiated)?;
        record.set_name("");
        let previous = self
            .record
            .field_set(field, index, record)
            .map_err(|e| field_error(e, field, index))?;
        Ok(previous.map(Variable::from_record))
    }

    /// Borrow the value of `field` in element `index`.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfBounds`] if `index >= self.nelems()`
    /// - [`Error::NoSuchField`] if `field` is unknown or was never assigned
    ///   for this element
    pub fn get(&self, field: &str, index: usize) -> Result<VarRef<'_>> {
        self.record
            .field_get(field, index)
            .map_err(|e| field_error(e, field, index))?
            .map(VarRef::new)
            .ok_or_else(|| Error::NoSuchField {
                field: field.to_string(),
                index,
            })
    }

    /// Borrow the value of `field` in the element at an N-dimensional subscript.
    pub fn get_at(&self, field: &str, subs: &[usize]) -> Result<VarRef<'_>> {
        let index = self.linear_index(subs)?;
        self.get(field, index)
    }

    /// Give up the struct as a variable.
    pub fn into_variable(self) -> Variable {
        Variable::from_record(self.record)
    }
}

fn field_error(err: FormatError, field: &str, index: usize) -> Error {
    match err {
        FormatError::NoSuchField(_) => Error::NoSuchField {
            field: field.to_string(),
            index,
        },
        other => other.into(),
    }
}

impl TryFrom<Variable> for Struct {
    type Error = Error;

    fn try_from(value: Variable) -> Result<Self> {
        let record = value.into_record().ok_or(Error::NotInstantiated)?;
        if record.class() != ClassType::Struct {
            return Err(Error::cast("Struct", format!("record class is {}", record.class())));
        }
        Ok(Struct { record })
    }
}

impl From<Struct> for Variable {
    fn from(s: Struct) -> Self {
        s.into_variable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;

    #[test]
    fn test_new_validates_fields() {
        assert!(Struct::new(&[1, 1], &["a", "b"]).is_ok());
        assert!(Struct::new::<&str>(&[1, 1], &[]).is_ok());
        for bad in [vec!["a", "a"], vec![""], vec!["a\0b"]] {
            assert!(matches!(
                Struct::new(&[1, 1], &bad),
                Err(Error::CreateFailed { .. })
            ));
        }
        let long = "f".repeat(64);
        assert!(Struct::new(&[1, 1], &[long]).is_err());
        assert!(Struct::new(&[2], &["a"]).is_err());
    }

    #[test]
    fn test_has_field_is_case_sensitive() {
        let s = Struct::new(&[1, 1], &["Alpha"]).unwrap();
        assert!(s.has_field("Alpha"));
        assert!(!s.has_field("alpha"));
    }

    #[test]
    fn test_set_and_get() {
        let mut s = Struct::new(&[1, 2], &["x", "y"]).unwrap();
        s.set("x", 1, Variable::from(5.0)).unwrap();
        assert_eq!(s.get("x", 1).unwrap().to_scalar().unwrap(), 5.0);
        assert!(matches!(s.get("y", 1), Err(Error::NoSuchField { .. })));
        assert!(matches!(s.get("x", 0), Err(Error::NoSuchField { .. })));
    }

    #[test]
    fn test_unknown_field() {
        let mut s = Struct::new(&[1, 1], &["x"]).unwrap();
        let err = s.set("z", 0, Variable::from(1.0)).unwrap_err();
        assert!(matches!(err, Error::NoSuchField { ref field, index: 0 } if field == "z"));
        assert!(matches!(s.get("z", 0), Err(Error::NoSuchField { .. })));
    }

    #[test]
    fn test_bounds_checked_before_field() {
        let mut s = Struct::new(&[1, 2], &["x"]).unwrap();
        let err = s.set("nope", 2, Variable::from(1.0)).unwrap_err();
        assert!(matches!(err, Error::OutOfBounds { index: 2, len: 2 }));
        assert!(s.get("x", 7).unwrap_err().is_out_of_bounds());
    }

    #[test]
    fn test_subscripts() {
        let mut s = Struct::new(&[2, 2], &["v"]).unwrap();
        s.set_at("v", &[0, 1], Variable::from(9.0)).unwrap();
        assert_eq!(s.get("v", 2).unwrap().to_scalar().unwrap(), 9.0);
        assert!(s.get_at("v", &[2, 0]).unwrap_err().is_out_of_bounds());
    }

    #[test]
    fn test_try_from_cell_fails() {
        let cell = Cell::new(&[1, 1], true).unwrap();
        let err = Struct::try_from(cell.into_variable()).unwrap_err();
        assert!(err.is_cast());
    }

    #[test]
    fn test_imported_fields_are_canonical() {
        let s = Struct::new(&[1, 1], &["b", "a"]).unwrap();
        let s = s.into_variable().into_struct().unwrap();
        assert_eq!(s.fields(), ["b", "a"]);
        assert_eq!(s.nfields(), 2);
    }
}
