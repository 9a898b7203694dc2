//! Encoding of records as Level 5 data elements (always little-endian).

use std::io::Write;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};

use crate::decode::{FLAG_COMPLEX, FLAG_GLOBAL, FLAG_LOGICAL};
use crate::error::{FormatError, Result};
use crate::record::{CharData, NumericData, Payload, Record};
use crate::types::DataType;

fn pad_to(out: &mut Vec<u8>, align: usize) {
    let rem = out.len() % align;
    if rem != 0 {
        out.resize(out.len() + align - rem, 0);
    }
}

/// Write one tagged element, using the small form for 1..=4 byte payloads.
fn write_element(out: &mut Vec<u8>, data_type: DataType, data: &[u8]) -> Result<()> {
    if !data.is_empty() && data.len() <= 4 {
        out.write_u32::<LittleEndian>(((data.len() as u32) << 16) | data_type.to_raw())?;
        out.extend_from_slice(data);
        pad_to(out, 8);
        return Ok(());
    }

    let len = u32::try_from(data.len())
        .map_err(|_| FormatError::malformed(format!("element of {} bytes is too large", data.len())))?;
    out.write_u32::<LittleEndian>(data_type.to_raw())?;
    out.write_u32::<LittleEndian>(len)?;
    out.extend_from_slice(data);
    pad_to(out, 8);
    Ok(())
}

fn numeric_bytes(data: &NumericData) -> Vec<u8> {
    let mut buf = vec![0u8; data.len() * data.data_type().size_bytes()];
    match data {
        NumericData::Double(v) => LittleEndian::write_f64_into(v, &mut buf),
        NumericData::Single(v) => LittleEndian::write_f32_into(v, &mut buf),
        NumericData::Int8(v) => {
            for (dst, &src) in buf.iter_mut().zip(v) {
                *dst = src as u8;
            }
        }
        NumericData::UInt8(v) => buf.copy_from_slice(v),
        NumericData::Int16(v) => LittleEndian::write_i16_into(v, &mut buf),
        NumericData::UInt16(v) => LittleEndian::write_u16_into(v, &mut buf),
        NumericData::Int32(v) => LittleEndian::write_i32_into(v, &mut buf),
        NumericData::UInt32(v) => LittleEndian::write_u32_into(v, &mut buf),
        NumericData::Int64(v) => LittleEndian::write_i64_into(v, &mut buf),
        NumericData::UInt64(v) => LittleEndian::write_u64_into(v, &mut buf),
    }
    buf
}

/// Length of each padded field name slot in a struct record.
fn field_name_len(fields: &[String]) -> usize {
    let longest = fields.iter().map(String::len).max().unwrap_or(0);
    ((longest + 1).max(32) + 7) / 8 * 8
}

/// Append a complete `miMATRIX` element for `record` under `name`.
///
/// Records nested in cells and structs are written with an empty name.
/// Unassigned container slots are written as empty 0x0 doubles, so a
/// persisted container is never partially filled.
pub(crate) fn encode_matrix(record: &Record, name: &str, out: &mut Vec<u8>) -> Result<()> {
    let tag_pos = out.len();
    out.write_u32::<LittleEndian>(DataType::Matrix.to_raw())?;
    out.write_u32::<LittleEndian>(0)?;
    let content_start = out.len();

    let mut flags = u32::from(record.class().to_raw());
    if record.is_complex() {
        flags |= FLAG_COMPLEX;
    }
    if record.is_global() {
        flags |= FLAG_GLOBAL;
    }
    if record.is_logical() {
        flags |= FLAG_LOGICAL;
    }
    let mut flag_bytes = [0u8; 8];
    LittleEndian::write_u32(&mut flag_bytes[..4], flags);
    write_element(out, DataType::UInt32, &flag_bytes)?;

    let mut dim_bytes = Vec::with_capacity(record.rank() * 4);
    for &dim in record.dims() {
        let dim = i32::try_from(dim)
            .map_err(|_| FormatError::invalid_shape(record.dims(), "dimension exceeds i32"))?;
        dim_bytes.write_i32::<LittleEndian>(dim)?;
    }
    write_element(out, DataType::Int32, &dim_bytes)?;
    write_element(out, DataType::Int8, name.as_bytes())?;

    match record.payload() {
        Payload::Numeric { real, imag } => {
            write_element(out, real.data_type(), &numeric_bytes(real))?;
            if let Some(imag) = imag {
                write_element(out, imag.data_type(), &numeric_bytes(imag))?;
            }
        }
        Payload::Char(chars) => match chars {
            CharData::UInt8(bytes) => write_element(out, DataType::UInt8, bytes)?,
            CharData::Utf8(bytes) => write_element(out, DataType::Utf8, bytes)?,
            CharData::Utf16(units) => {
                let mut buf = vec![0u8; units.len() * 2];
                LittleEndian::write_u16_into(units, &mut buf);
                write_element(out, DataType::Utf16, &buf)?;
            }
        },
        Payload::Cell(slots) => {
            let placeholder = Record::empty();
            for slot in slots {
                encode_matrix(slot.as_ref().unwrap_or(&placeholder), "", out)?;
            }
        }
        Payload::Struct { fields, slots } => {
            let len = field_name_len(fields);
            let mut len_bytes = [0u8; 4];
            LittleEndian::write_i32(&mut len_bytes, len as i32);
            write_element(out, DataType::Int32, &len_bytes)?;

            let mut names = vec![0u8; len * fields.len()];
            for (chunk, field) in names.chunks_mut(len).zip(fields) {
                chunk[..field.len()].copy_from_slice(field.as_bytes());
            }
            write_element(out, DataType::Int8, &names)?;

            let placeholder = Record::empty();
            for slot in slots {
                encode_matrix(slot.as_ref().unwrap_or(&placeholder), "", out)?;
            }
        }
    }

    let content_len = u32::try_from(out.len() - content_start)
        .map_err(|_| FormatError::malformed("record larger than 4 GiB"))?;
    LittleEndian::write_u32(&mut out[tag_pos + 4..tag_pos + 8], content_len);
    Ok(())
}

/// Wrap an encoded `miMATRIX` element in an `miCOMPRESSED` element.
pub(crate) fn compress_element(element: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut encoder =
        flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::new(level));
    encoder
        .write_all(element)
        .map_err(|e| FormatError::Compression(e.to_string()))?;
    let compressed = encoder
        .finish()
        .map_err(|e| FormatError::Compression(e.to_string()))?;

    let len = u32::try_from(compressed.len())
        .map_err(|_| FormatError::Compression("compressed record larger than 4 GiB".to_string()))?;
    let mut out = Vec::with_capacity(compressed.len() + 8);
    out.write_u32::<LittleEndian>(DataType::Compressed.to_raw())?;
    out.write_u32::<LittleEndian>(len)?;
    out.extend_from_slice(&compressed);
    Ok(out)
}
