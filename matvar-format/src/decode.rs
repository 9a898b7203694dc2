//! Decoding of Level 5 data elements into records.

use std::io::Read;

use crate::endian::Endian;
use crate::error::{FormatError, Result};
use crate::record::{CharData, NumericData, Payload, Record};
use crate::subscript::checked_element_count;
use crate::types::{ClassType, DataType};

/// Size of a full element tag.
pub(crate) const TAG_LEN: usize = 8;

pub(crate) const FLAG_COMPLEX: u32 = 0x0800;
pub(crate) const FLAG_GLOBAL: u32 = 0x0400;
pub(crate) const FLAG_LOGICAL: u32 = 0x0200;

/// A data element: its raw type code and payload bytes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Element<'a> {
    pub data_type: u32,
    pub bytes: &'a [u8],
}

impl Element<'_> {
    fn kind(&self) -> Result<DataType> {
        DataType::from_raw(self.data_type).ok_or(FormatError::UnknownDataType(self.data_type))
    }

    fn expect(&self, what: &str, allowed: &[DataType]) -> Result<DataType> {
        let kind = self.kind()?;
        if !allowed.contains(&kind) {
            return Err(FormatError::malformed(format!(
                "{} stored as {}, expected one of {:?}",
                what, kind, allowed
            )));
        }
        Ok(kind)
    }
}

/// Sequential reader over the subelements of an element.
pub(crate) struct ElementCursor<'a> {
    data: &'a [u8],
    pos: usize,
    endian: Endian,
}

impl<'a> ElementCursor<'a> {
    pub fn new(data: &'a [u8], endian: Endian) -> Self {
        ElementCursor { data, pos: 0, endian }
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Bytes left after the cursor.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self.pos + len;
        if end > self.data.len() {
            return Err(FormatError::eof(end, self.data.len()));
        }
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Read the next tagged element, honouring the small-element form.
    pub fn next_element(&mut self) -> Result<Element<'a>> {
        let word = self.endian.read_u32(self.take(4)?);
        let small_len = (word >> 16) as usize;

        if small_len != 0 {
            if small_len > 4 {
                return Err(FormatError::malformed(format!(
                    "small element claims {} bytes",
                    small_len
                )));
            }
            let packed = self.take(4)?;
            return Ok(Element {
                data_type: word & 0xFFFF,
                bytes: &packed[..small_len],
            });
        }

        let len = self.endian.read_u32(self.take(4)?) as usize;
        let bytes = self.take(len)?;
        let padding = (8 - len % 8) % 8;
        // The final element of a stream may omit its padding.
        let padding = padding.min(self.data.len() - self.pos);
        self.pos += padding;

        Ok(Element {
            data_type: word,
            bytes,
        })
    }
}

/// Metadata of a record, readable without its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordInfo {
    /// Record name.
    pub name: String,
    /// Array class.
    pub class: ClassType,
    /// Dimensions.
    pub dims: Vec<usize>,
    /// Whether the record has an imaginary part.
    pub complex: bool,
    /// Whether the logical flag is set.
    pub logical: bool,
    /// Whether the record is stored as a compressed element.
    pub compressed: bool,
}

struct Header<'a> {
    info: RecordInfo,
    global: bool,
    cursor: ElementCursor<'a>,
}

fn read_header(content: &[u8], endian: Endian) -> Result<Header<'_>> {
    let mut cursor = ElementCursor::new(content, endian);

    let flags = cursor.next_element()?;
    flags.expect("array flags", &[DataType::UInt32])?;
    if flags.bytes.len() < 4 {
        return Err(FormatError::malformed("array flags shorter than 4 bytes"));
    }
    let word = endian.read_u32(flags.bytes);
    let raw_class = (word & 0xFF) as u8;
    let class = ClassType::from_raw(raw_class).ok_or(FormatError::UnknownClass(raw_class))?;

    let dims_elem = cursor.next_element()?;
    dims_elem.expect("dimensions", &[DataType::Int32])?;
    let dims = dims_elem
        .bytes
        .chunks_exact(4)
        .map(|chunk| {
            let dim = endian.read_i32(chunk);
            usize::try_from(dim).map_err(|_| FormatError::malformed(format!("negative dimension {}", dim)))
        })
        .collect::<Result<Vec<_>>>()?;

    let name_elem = cursor.next_element()?;
    name_elem.expect("array name", &[DataType::Int8, DataType::UInt8])?;
    let name = String::from_utf8_lossy(name_elem.bytes)
        .trim_end_matches('\0')
        .to_string();

    Ok(Header {
        info: RecordInfo {
            name,
            class,
            dims,
            complex: word & FLAG_COMPLEX != 0,
            logical: word & FLAG_LOGICAL != 0,
            compressed: false,
        },
        global: word & FLAG_GLOBAL != 0,
        cursor,
    })
}

/// Decode only the header of `miMATRIX` content.
pub(crate) fn decode_info(content: &[u8], endian: Endian) -> Result<RecordInfo> {
    if content.is_empty() {
        return Ok(empty_info());
    }
    read_header(content, endian).map(|header| header.info)
}

fn empty_info() -> RecordInfo {
    RecordInfo {
        name: String::new(),
        class: ClassType::Double,
        dims: vec![0, 0],
        complex: false,
        logical: false,
        compressed: false,
    }
}

/// Decode the content of an `miMATRIX` element (the bytes after its tag).
pub(crate) fn decode_matrix(content: &[u8], endian: Endian) -> Result<Record> {
    if content.is_empty() {
        return Ok(Record::empty());
    }

    let Header {
        info,
        global,
        mut cursor,
    } = read_header(content, endian)?;
    if info.dims.len() < 2 {
        return Err(FormatError::invalid_shape(&info.dims, "rank must be at least 2"));
    }
    let numel = checked_element_count(&info.dims)?;

    let payload = match info.class {
        class if class.is_numeric() => {
            let real = read_numeric(cursor.next_element()?, class, endian)?;
            let imag = if info.complex {
                Some(read_numeric(cursor.next_element()?, class, endian)?)
            } else {
                None
            };
            check_count(&info.dims, numel, real.len())?;
            if let Some(imag) = &imag {
                check_count(&info.dims, numel, imag.len())?;
            }
            Payload::Numeric { real, imag }
        }
        ClassType::Char => {
            let chars = if cursor.is_at_end() {
                CharData::UInt8(Vec::new())
            } else {
                read_chars(cursor.next_element()?, endian)?
            };
            if !matches!(chars, CharData::Utf8(_)) {
                check_count(&info.dims, numel, chars.len())?;
            }
            Payload::Char(chars)
        }
        ClassType::Cell => {
            check_slot_count(&info.dims, numel, &cursor)?;
            let mut slots = Vec::with_capacity(numel);
            for _ in 0..numel {
                slots.push(Some(read_nested(&mut cursor, endian)?));
            }
            Payload::Cell(slots)
        }
        ClassType::Struct => {
            let len_elem = cursor.next_element()?;
            len_elem.expect("field name length", &[DataType::Int32])?;
            if len_elem.bytes.len() < 4 {
                return Err(FormatError::malformed("field name length shorter than 4 bytes"));
            }
            let name_len = endian.read_i32(len_elem.bytes);
            let name_len = usize::try_from(name_len)
                .ok()
                .filter(|&len| len > 0)
                .ok_or_else(|| FormatError::malformed(format!("field name length {}", name_len)))?;

            let names_elem = cursor.next_element()?;
            names_elem.expect("field names", &[DataType::Int8, DataType::UInt8])?;
            let fields: Vec<String> = names_elem
                .bytes
                .chunks(name_len)
                .map(|chunk| {
                    let end = chunk.iter().position(|&b| b == 0).unwrap_or(chunk.len());
                    String::from_utf8_lossy(&chunk[..end]).into_owned()
                })
                .collect();

            let count = numel
                .checked_mul(fields.len())
                .ok_or_else(|| FormatError::invalid_shape(&info.dims, "slot count overflows"))?;
            check_slot_count(&info.dims, count, &cursor)?;
            let mut slots = Vec::with_capacity(count);
            for _ in 0..count {
                slots.push(Some(read_nested(&mut cursor, endian)?));
            }
            Payload::Struct { fields, slots }
        }
        other => return Err(FormatError::UnsupportedClass(other.to_string())),
    };

    Ok(Record::from_parts(
        info.name,
        info.dims,
        info.logical,
        global,
        payload,
    ))
}

fn read_nested(cursor: &mut ElementCursor<'_>, endian: Endian) -> Result<Record> {
    let element = cursor.next_element()?;
    element.expect("nested array", &[DataType::Matrix])?;
    decode_matrix(element.bytes, endian)
}

/// Every nested element needs at least a tag, so a container cannot hold
/// more slots than its remaining bytes allow.
fn check_slot_count(dims: &[usize], count: usize, cursor: &ElementCursor<'_>) -> Result<()> {
    let room = cursor.remaining() / TAG_LEN;
    if count > room {
        return Err(FormatError::invalid_shape(
            dims,
            format!("{} slots do not fit in {} bytes", count, cursor.remaining()),
        ));
    }
    Ok(())
}

fn check_count(dims: &[usize], expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(FormatError::invalid_shape(
            dims,
            format!("expected {} elements, found {}", expected, actual),
        ));
    }
    Ok(())
}

/// Decode a numeric element and widen it to the storage of `class`.
fn read_numeric(element: Element<'_>, class: ClassType, endian: Endian) -> Result<NumericData> {
    let kind = element.kind()?;
    let stored = decode_numeric(kind, element.bytes, endian)?;
    stored
        .cast(class)
        .ok_or_else(|| FormatError::UnsupportedClass(class.to_string()))
}

fn decode_numeric(kind: DataType, bytes: &[u8], endian: Endian) -> Result<NumericData> {
    let size = kind.size_bytes();
    if !kind.is_numeric() || size == 0 {
        return Err(FormatError::malformed(format!("{} is not a numeric element type", kind)));
    }
    if bytes.len() % size != 0 {
        return Err(FormatError::malformed(format!(
            "{} bytes is not a whole number of {} elements",
            bytes.len(),
            kind
        )));
    }

    let chunks = bytes.chunks_exact(size);
    let data = match kind {
        DataType::Int8 => NumericData::Int8(bytes.iter().map(|&b| b as i8).collect()),
        DataType::UInt8 => NumericData::UInt8(bytes.to_vec()),
        DataType::Int16 => NumericData::Int16(chunks.map(|c| endian.read_i16(c)).collect()),
        DataType::UInt16 => NumericData::UInt16(chunks.map(|c| endian.read_u16(c)).collect()),
        DataType::Int32 => NumericData::Int32(chunks.map(|c| endian.read_i32(c)).collect()),
        DataType::UInt32 => NumericData::UInt32(chunks.map(|c| endian.read_u32(c)).collect()),
        DataType::Int64 => NumericData::Int64(chunks.map(|c| endian.read_i64(c)).collect()),
        DataType::UInt64 => NumericData::UInt64(chunks.map(|c| endian.read_u64(c)).collect()),
        DataType::Single => NumericData::Single(chunks.map(|c| endian.read_f32(c)).collect()),
        DataType::Double => NumericData::Double(chunks.map(|c| endian.read_f64(c)).collect()),
        _ => unreachable!("non-numeric types rejected above"),
    };
    Ok(data)
}

fn read_chars(element: Element<'_>, endian: Endian) -> Result<CharData> {
    let kind = element.expect(
        "char data",
        &[
            DataType::UInt8,
            DataType::Int8,
            DataType::Utf8,
            DataType::UInt16,
            DataType::Utf16,
        ],
    )?;

    let chars = match kind {
        DataType::UInt8 | DataType::Int8 => CharData::UInt8(element.bytes.to_vec()),
        DataType::Utf8 => CharData::Utf8(element.bytes.to_vec()),
        _ => {
            if element.bytes.len() % 2 != 0 {
                return Err(FormatError::malformed("odd byte count in UTF-16 char data"));
            }
            CharData::Utf16(
                element
                    .bytes
                    .chunks_exact(2)
                    .map(|c| endian.read_u16(c))
                    .collect(),
            )
        }
    };
    Ok(chars)
}

/// Inflate a zlib stream, stopping after `limit` bytes when given.
pub(crate) fn inflate(compressed: &[u8], limit: Option<u64>) -> Result<Vec<u8>> {
    let decoder = flate2::read::ZlibDecoder::new(compressed);
    let mut inflated = Vec::new();
    let result = match limit {
        Some(limit) => decoder.take(limit).read_to_end(&mut inflated),
        None => {
            let mut decoder = decoder;
            decoder.read_to_end(&mut inflated)
        }
    };
    result.map_err(|e| FormatError::Decompression(e.to_string()))?;
    Ok(inflated)
}
