//! Subscript flattening in MATLAB's column-major convention.
//!
//! Subscripts here are 0-based: for dims `[2, 3]` the subscript `[1, 2]`
//! addresses linear index `1 + 2 * 2 = 5`.

use crate::error::{FormatError, Result};

/// Number of elements described by `dims`, or `None` if the product
/// overflows `usize`.
pub fn element_count(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |count, &dim| count.checked_mul(dim))
}

/// Like [`element_count`], reporting overflow as an error.
///
/// # Errors
///
/// Returns [`FormatError::InvalidShape`] if the product overflows `usize`.
pub fn checked_element_count(dims: &[usize]) -> Result<usize> {
    element_count(dims).ok_or_else(|| FormatError::invalid_shape(dims, "element count overflows"))
}

/// Flatten an N-dimensional subscript into a linear index.
///
/// # Errors
///
/// - [`FormatError::InvalidShape`] if `subs` and `dims` differ in length or
///   the element count overflows
/// - [`FormatError::IndexOutOfRange`] if any subscript exceeds its dimension
pub fn calc_single_subscript(dims: &[usize], subs: &[usize]) -> Result<usize> {
    checked_element_count(dims)?;
    if subs.len() != dims.len() {
        return Err(FormatError::invalid_shape(
            dims,
            format!("subscript has rank {}, array has rank {}", subs.len(), dims.len()),
        ));
    }

    let mut index = 0;
    let mut stride = 1;
    for (&sub, &dim) in subs.iter().zip(dims) {
        if sub >= dim {
            return Err(FormatError::IndexOutOfRange { index: sub, len: dim });
        }
        index += sub * stride;
        stride *= dim;
    }

    Ok(index)
}

/// Expand a linear index into an N-dimensional subscript.
///
/// # Errors
///
/// - [`FormatError::InvalidShape`] if the element count overflows
/// - [`FormatError::IndexOutOfRange`] if `index` is past the last element
pub fn calc_subscripts(dims: &[usize], index: usize) -> Result<Vec<usize>> {
    let len = checked_element_count(dims)?;
    if index >= len {
        return Err(FormatError::IndexOutOfRange { index, len });
    }

    let mut rest = index;
    let subs = dims
        .iter()
        .map(|&dim| {
            let sub = rest % dim;
            rest /= dim;
            sub
        })
        .collect();

    Ok(subs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_major() {
        let dims = [2, 3];
        assert_eq!(calc_single_subscript(&dims, &[0, 0]).unwrap(), 0);
        assert_eq!(calc_single_subscript(&dims, &[1, 0]).unwrap(), 1);
        assert_eq!(calc_single_subscript(&dims, &[0, 1]).unwrap(), 2);
        assert_eq!(calc_single_subscript(&dims, &[1, 2]).unwrap(), 5);
    }

    #[test]
    fn test_three_dims() {
        let dims = [2, 3, 4];
        assert_eq!(calc_single_subscript(&dims, &[1, 2, 3]).unwrap(), 23);
        assert_eq!(calc_subscripts(&dims, 23).unwrap(), vec![1, 2, 3]);
        assert_eq!(calc_subscripts(&dims, 7).unwrap(), vec![1, 0, 1]);
    }

    #[test]
    fn test_inverse() {
        let dims = [3, 2, 2];
        for index in 0..checked_element_count(&dims).unwrap() {
            let subs = calc_subscripts(&dims, index).unwrap();
            assert_eq!(calc_single_subscript(&dims, &subs).unwrap(), index);
        }
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            calc_single_subscript(&[2, 3], &[2, 0]),
            Err(FormatError::IndexOutOfRange { index: 2, len: 2 })
        ));
        assert!(matches!(
            calc_single_subscript(&[2, 3], &[0, 0, 0]),
            Err(FormatError::InvalidShape { .. })
        ));
        assert!(calc_subscripts(&[2, 3], 6).is_err());
    }

    #[test]
    fn test_element_count_overflow() {
        assert_eq!(element_count(&[2, 3, 4]), Some(24));
        assert_eq!(element_count(&[0, usize::MAX]), Some(0));
        assert_eq!(element_count(&[1 << 40, 1 << 40]), None);
        assert!(matches!(
            checked_element_count(&[1 << 40, 1 << 40]),
            Err(FormatError::InvalidShape { .. })
        ));
        assert!(matches!(
            calc_single_subscript(&[1 << 40, 1 << 40], &[1, 1]),
            Err(FormatError::InvalidShape { .. })
        ));
        assert!(calc_subscripts(&[1 << 40, 1 << 40], 0).is_err());
    }
}
