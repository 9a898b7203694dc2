//! Byte order of a MAT file.
//!
//! The header's two-byte indicator reads `IM` in files written on
//! little-endian machines and `MI` on big-endian ones. Files are always
//! written little-endian; both orders are read.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Byte order used by every data element in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    /// Least significant byte first.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

macro_rules! endian_reader {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Read a `", stringify!($ty), "` from the start of `buf`.")]
            pub fn $name(self, buf: &[u8]) -> $ty {
                match self {
                    Endian::Little => LittleEndian::$name(buf),
                    Endian::Big => BigEndian::$name(buf),
                }
            }
        )*
    };
}

impl Endian {
    /// Detect the byte order from the indicator at header bytes 126..128.
    pub fn from_indicator(bytes: [u8; 2]) -> Option<Self> {
        match &bytes {
            b"IM" => Some(Endian::Little),
            b"MI" => Some(Endian::Big),
            _ => None,
        }
    }

    /// Indicator bytes written to the header.
    pub const fn indicator(self) -> [u8; 2] {
        match self {
            Endian::Little => *b"IM",
            Endian::Big => *b"MI",
        }
    }

    endian_reader! {
        read_u16 => u16,
        read_i16 => i16,
        read_u32 => u32,
        read_i32 => i32,
        read_u64 => u64,
        read_i64 => i64,
        read_f32 => f32,
        read_f64 => f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator() {
        assert_eq!(Endian::from_indicator(*b"IM"), Some(Endian::Little));
        assert_eq!(Endian::from_indicator(*b"MI"), Some(Endian::Big));
        assert_eq!(Endian::from_indicator(*b"XX"), None);
        assert_eq!(Endian::Little.indicator(), *b"IM");
    }

    #[test]
    fn test_read() {
        let bytes = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(Endian::Little.read_u32(&bytes), 0x0403_0201);
        assert_eq!(Endian::Big.read_u32(&bytes), 0x0102_0304);
        assert_eq!(Endian::Big.read_u16(&bytes), 0x0102);
    }
}
