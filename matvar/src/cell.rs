//! Cell arrays.

use matvar_format::{calc_single_subscript, ClassType, Record};

use crate::error::{Error, Result};
use crate::variable::{VarRef, Variable};

/// A fixed-shape array of variables, indexed column-major from 0.
///
/// Slots start out unassigned unless the cell is created with `fill`.
/// When a cell is written to a file, unassigned slots are stored as empty
/// 0×0 doubles.
///
/// # Example
///
/// ```
/// use matvar::{Cell, Variable};
///
/// let mut cell = Cell::new(&[2, 3], false)?;
/// cell.set_at(&[1, 2], Variable::from("last"))?;
/// assert_eq!(cell.get(5)?.to_text()?, "last");
/// # Ok::<(), matvar::Error>(())
/// ```
#[derive(Debug, PartialEq)]
pub struct Cell {
    record: Record,
}

impl Cell {
    /// Create a cell array with the given shape.
    ///
    /// With `fill`, every slot holds an empty 0×0 double placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CreateFailed`] if `dims` has fewer than two entries
    /// or the element count overflows.
    pub fn new(dims: &[usize], fill: bool) -> Result<Self> {
        let mut record = Record::cell(dims.to_vec()).map_err(Error::create_failed)?;
        if fill {
            for index in 0..record.numel() {
                record.cell_set(index, Record::empty())?;
            }
        }
        Ok(Cell { record })
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

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.nelems() {
            return Err(Error::OutOfBounds {
                index,
                len: self.nelems(),
            });
        }
        Ok(())
    }

    fn linear_index(&self, subs: &[usize]) -> Result<usize> {
        calc_single_subscript(self.dims(), subs).map_err(|_| Error::SubscriptOutOfBounds {
            subs: subs.to_vec(),
            dims: self.dims().to_vec(),
        })
    }

    /// Store `value` at a linear index.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfBounds`] if `index >= self.nelems()`
    /// - [`Error::NotInstantiated`] if `value` is empty
    pub fn set(&mut self, index: usize, value: Variable) -> Result<()> {
        self.replace(index, value).map(|_| ())
    }

    /// Store `value` at an N-dimensional subscript.
    pub fn set_at(&mut self, subs: &[usize], value: Variable) -> Result<()> {
        let index = self.linear_index(subs)?;
        self.set(index, value)
    }

    /// Store `value` at a linear index and return the previous occupant.
    pub fn replace(&mut self, index: usize, value: Variable) -> Result<Option<Variable>> {
        self.check_index(index)?;
        let mut record = value.into_record().ok_or(Error::NotInstantiated)?;
        record.set_name("");
        let previous = self.record.cell_set(index, record)?;
        Ok(previous.map(Variable::from_record))
    }

    /// Remove and return the value at a linear index, leaving the slot unset.
    pub fn take(&mut self, index: usize) -> Result<Option<Variable>> {
        self.check_index(index)?;
        Ok(self.record.cell_take(index)?.map(Variable::from_record))
    }

    /// Borrow the value at a linear index.
    ///
    /// # Errors
    ///
    /// - [`Error::OutOfBounds`] if `index >= self.nelems()`
    /// - [`Error::NoSuchElement`] if the slot was never assigned
    pub fn get(&self, index: usize) -> Result<VarRef<'_>> {
        self.check_index(index)?;
        self.record
            .cell_get(index)?
            .map(VarRef::new)
            .ok_or(Error::NoSuchElement { index })
    }

    /// Borrow the value at an N-dimensional subscript.
    pub fn get_at(&self, subs: &[usize]) -> Result<VarRef<'_>> {
        let index = self.linear_index(subs)?;
        self.get(index)
    }

    /// Iterate over the slots in column-major order; `None` marks an unset slot.
    pub fn iter(&self) -> impl Iterator<Item = Option<VarRef<'_>>> + '_ {
        self.record
            .cell_slots()
            .unwrap_or(&[])
            .iter()
            .map(|slot| slot.as_ref().map(VarRef::new))
    }

    /// Give up the cell as a variable.
    pub fn into_variable(self) -> Variable {
        Variable::from_record(self.record)
    }
}

impl TryFrom<Variable> for Cell {
    type Error = Error;

    fn try_from(value: Variable) -> Result<Self> {
        let record = value.into_record().ok_or(Error::NotInstantiated)?;
        if record.class() != ClassType::Cell {
            return Err(Error::cast("Cell", format!("record class is {}", record.class())));
        }
        Ok(Cell { record })
    }
}

impl From<Cell> for Variable {
    fn from(cell: Cell) -> Self {
        cell.into_variable()
    }
}
