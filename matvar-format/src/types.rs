//! Class and data type tags.
//!
//! Every MAT record carries two tags: the array class (`mx*` codes), which
//! says what the record *is*, and the element data type (`mi*` codes),
//! which says how its payload is stored. A double array may be stored on
//! disk as `miUINT8` when its values fit, so the two do not always agree.

use std::fmt;

/// Array class of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ClassType {
    /// No class (zero-byte placeholder elements).
    Empty = 0,
    /// Cell array.
    Cell = 1,
    /// Struct array.
    Struct = 2,
    /// MATLAB object.
    Object = 3,
    /// Character array.
    Char = 4,
    /// Sparse matrix.
    Sparse = 5,
    /// Double-precision floating point.
    Double = 6,
    /// Single-precision floating point.
    Single = 7,
    /// Signed 8-bit integer.
    Int8 = 8,
    /// Unsigned 8-bit integer.
    UInt8 = 9,
    /// Signed 16-bit integer.
    Int16 = 10,
    /// Unsigned 16-bit integer.
    UInt16 = 11,
    /// Signed 32-bit integer.
    Int32 = 12,
    /// Unsigned 32-bit integer.
    UInt32 = 13,
    /// Signed 64-bit integer.
    Int64 = 14,
    /// Unsigned 64-bit integer.
    UInt64 = 15,
    /// Function handle.
    Function = 16,
    /// Opaque (class objects saved by newer MATLAB releases).
    Opaque = 17,
}

impl ClassType {
    /// Map a raw `mx*` class code to a `ClassType`.
    pub fn from_raw(value: u8) -> Option<Self> {
        let class = match value {
            0 => ClassType::Empty,
            1 => ClassType::Cell,
            2 => ClassType::Struct,
            3 => ClassType::Object,
            4 => ClassType::Char,
            5 => ClassType::Sparse,
            6 => ClassType::Double,
            7 => ClassType::Single,
            8 => ClassType::Int8,
            9 => ClassType::UInt8,
            10 => ClassType::Int16,
            11 => ClassType::UInt16,
            12 => ClassType::Int32,
            13 => ClassType::UInt32,
            14 => ClassType::Int64,
            15 => ClassType::UInt64,
            16 => ClassType::Function,
            17 => ClassType::Opaque,
            _ => return None,
        };
        Some(class)
    }

    /// Raw `mx*` class code.
    pub const fn to_raw(self) -> u8 {
        self as u8
    }

    /// Check if this is one of the numeric classes.
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            ClassType::Double
                | ClassType::Single
                | ClassType::Int8
                | ClassType::UInt8
                | ClassType::Int16
                | ClassType::UInt16
                | ClassType::Int32
                | ClassType::UInt32
                | ClassType::Int64
                | ClassType::UInt64
        )
    }

    /// Data type a numeric class is held in once loaded.
    pub const fn native_data_type(&self) -> Option<DataType> {
        let dt = match self {
            ClassType::Double => DataType::Double,
            ClassType::Single => DataType::Single,
            ClassType::Int8 => DataType::Int8,
            ClassType::UInt8 => DataType::UInt8,
            ClassType::Int16 => DataType::Int16,
            ClassType::UInt16 => DataType::UInt16,
            ClassType::Int32 => DataType::Int32,
            ClassType::UInt32 => DataType::UInt32,
            ClassType::Int64 => DataType::Int64,
            ClassType::UInt64 => DataType::UInt64,
            ClassType::Cell => DataType::Cell,
            ClassType::Struct => DataType::Struct,
            _ => return None,
        };
        Some(dt)
    }
}

impl fmt::Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ClassType::Empty => "empty",
            ClassType::Cell => "cell",
            ClassType::Struct => "struct",
            ClassType::Object => "object",
            ClassType::Char => "char",
            ClassType::Sparse => "sparse",
            ClassType::Double => "double",
            ClassType::Single => "single",
            ClassType::Int8 => "int8",
            ClassType::UInt8 => "uint8",
            ClassType::Int16 => "int16",
            ClassType::UInt16 => "uint16",
            ClassType::Int32 => "int32",
            ClassType::UInt32 => "uint32",
            ClassType::Int64 => "int64",
            ClassType::UInt64 => "uint64",
            ClassType::Function => "function_handle",
            ClassType::Opaque => "opaque",
        };
        f.write_str(name)
    }
}

/// Element data type of a record or data element.
///
/// `Cell` and `Struct` never appear in a file; they tag container records
/// in memory so that every record has a (class, data type) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum DataType {
    /// 8-bit signed integer (miINT8)
    Int8 = 1,
    /// 8-bit unsigned integer (miUINT8)
    UInt8 = 2,
    /// 16-bit signed integer (miINT16)
    Int16 = 3,
    /// 16-bit unsigned integer (miUINT16)
    UInt16 = 4,
    /// 32-bit signed integer (miINT32)
    Int32 = 5,
    /// 32-bit unsigned integer (miUINT32)
    UInt32 = 6,
    /// 32-bit IEEE float (miSINGLE)
    Single = 7,
    /// 64-bit IEEE float (miDOUBLE)
    Double = 9,
    /// 64-bit signed integer (miINT64)
    Int64 = 12,
    /// 64-bit unsigned integer (miUINT64)
    UInt64 = 13,
    /// Nested array (miMATRIX)
    Matrix = 14,
    /// zlib-compressed element (miCOMPRESSED)
    Compressed = 15,
    /// UTF-8 text (miUTF8)
    Utf8 = 16,
    /// UTF-16 text (miUTF16)
    Utf16 = 17,
    /// UTF-32 text (miUTF32)
    Utf32 = 18,
    /// In-memory tag for cell records
    Cell = 21,
    /// In-memory tag for struct records
    Struct = 22,
}

impl DataType {
    /// Map a raw `mi*` code to a `DataType`.
    pub fn from_raw(value: u32) -> Option<Self> {
        let dt = match value {
            1 => DataType::Int8,
            2 => DataType::UInt8,
            3 => DataType::Int16,
            4 => DataType::UInt16,
            5 => DataType::Int32,
            6 => DataType::UInt32,
            7 => DataType::Single,
            9 => DataType::Double,
            12 => DataType::Int64,
            13 => DataType::UInt64,
            14 => DataType::Matrix,
            15 => DataType::Compressed,
            16 => DataType::Utf8,
            17 => DataType::Utf16,
            18 => DataType::Utf32,
            21 => DataType::Cell,
            22 => DataType::Struct,
            _ => return None,
        };
        Some(dt)
    }

    /// Raw `mi*` code.
    pub const fn to_raw(self) -> u32 {
        self as u32
    }

    /// Size in bytes of one element, or 0 for non-scalar tags.
    pub const fn size_bytes(&self) -> usize {
        match self {
            DataType::Int8 | DataType::UInt8 | DataType::Utf8 => 1,
            DataType::Int16 | DataType::UInt16 | DataType::Utf16 => 2,
            DataType::Int32 | DataType::UInt32 | DataType::Single | DataType::Utf32 => 4,
            DataType::Double | DataType::Int64 | DataType::UInt64 => 8,
            DataType::Matrix | DataType::Compressed | DataType::Cell | DataType::Struct => 0,
        }
    }

    /// Check if this tag describes plain numeric elements.
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            DataType::Int8
                | DataType::UInt8
                | DataType::Int16
                | DataType::UInt16
                | DataType::Int32
                | DataType::UInt32
                | DataType::Single
                | DataType::Double
                | DataType::Int64
                | DataType::UInt64
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int8 => "int8",
            DataType::UInt8 => "uint8",
            DataType::Int16 => "int16",
            DataType::UInt16 => "uint16",
            DataType::Int32 => "int32",
            DataType::UInt32 => "uint32",
            DataType::Single => "single",
            DataType::Double => "double",
            DataType::Int64 => "int64",
            DataType::UInt64 => "uint64",
            DataType::Matrix => "matrix",
            DataType::Compressed => "compressed",
            DataType::Utf8 => "utf8",
            DataType::Utf16 => "utf16",
            DataType::Utf32 => "utf32",
            DataType::Cell => "cell",
            DataType::Struct => "struct",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw() {
        assert_eq!(ClassType::from_raw(6), Some(ClassType::Double));
        assert_eq!(ClassType::from_raw(1), Some(ClassType::Cell));
        assert_eq!(ClassType::from_raw(99), None);

        assert_eq!(DataType::from_raw(9), Some(DataType::Double));
        assert_eq!(DataType::from_raw(15), Some(DataType::Compressed));
        assert_eq!(DataType::from_raw(8), None);
    }

    #[test]
    fn test_size_bytes() {
        assert_eq!(DataType::Double.size_bytes(), 8);
        assert_eq!(DataType::Utf16.size_bytes(), 2);
        assert_eq!(DataType::Matrix.size_bytes(), 0);
    }

    #[test]
    fn test_native_data_type() {
        assert_eq!(ClassType::Double.native_data_type(), Some(DataType::Double));
        assert_eq!(ClassType::Struct.native_data_type(), Some(DataType::Struct));
        assert_eq!(ClassType::Char.native_data_type(), None);
        assert!(ClassType::Int16.is_numeric());
        assert!(!ClassType::Char.is_numeric());
    }

    #[test]
    fn test_display() {
        assert_eq!(ClassType::Double.to_string(), "double");
        assert_eq!(ClassType::Function.to_string(), "function_handle");
        assert_eq!(DataType::Utf8.to_string(), "utf8");
    }
}
