//! MAT file contexts.
//!
//! A [`MatFile`] owns one open file. Opening scans the top-level data
//! elements once and indexes their names, so lookups by name do not
//! touch the payloads.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::decode::{decode_info, decode_matrix, inflate, RecordInfo};
use crate::encode::{compress_element, encode_matrix};
use crate::endian::Endian;
use crate::error::{FormatError, Result};
use crate::record::{validate_name, Record};
use crate::types::DataType;

/// Size of the fixed file header.
pub const HEADER_LEN: usize = 128;

/// Bytes of descriptive text at the start of the header.
pub const HEADER_TEXT_LEN: usize = 116;

/// Inflated bytes read when probing a compressed record's metadata.
const INFO_PROBE_LEN: u64 = 1024;

/// A sink whose length can be cut back after a failed append.
trait SetLen {
    fn set_len(&mut self, len: u64) -> io::Result<()>;
}

impl SetLen for File {
    fn set_len(&mut self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }
}

/// Append `element` at the end of `sink` and return its offset.
///
/// On failure the sink is cut back to its previous length, so a later
/// append never lands behind a partial element.
fn append_element<W: Write + Seek + SetLen>(sink: &mut W, element: &[u8]) -> io::Result<u64> {
    let offset = sink.seek(SeekFrom::End(0))?;
    if let Err(e) = sink.write_all(element).and_then(|()| sink.flush()) {
        if let Err(rollback) = sink.set_len(offset) {
            warn!("could not drop partial element at offset {}: {}", offset, rollback);
        }
        return Err(e);
    }
    Ok(offset)
}

/// On-disk MAT format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileVersion {
    /// Level 5 (MATLAB 5 through 7).
    #[default]
    Mat5,
    /// HDF5-based MATLAB 7.3 files. Recognised, not supported.
    Mat73,
}

impl FileVersion {
    const fn header_code(self) -> u16 {
        match self {
            FileVersion::Mat5 => 0x0100,
            FileVersion::Mat73 => 0x0200,
        }
    }
}

/// Compression applied to a record when it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Store the `miMATRIX` element as is.
    #[default]
    None,
    /// Wrap the element in a zlib stream (`miCOMPRESSED`).
    Zlib,
}

/// Access mode for [`MatFile::open`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Read records only.
    ReadOnly,
    /// Read records and append new ones.
    ReadWrite,
}

#[derive(Debug, Clone)]
struct Entry {
    offset: u64,
    len: u64,
    compressed: bool,
    info: RecordInfo,
}

/// An open MAT file.
#[derive(Debug)]
pub struct MatFile {
    file: File,
    path: PathBuf,
    access: Access,
    endian: Endian,
    header: String,
    entries: Vec<Entry>,
}

fn default_header() -> String {
    format!(
        "MATLAB 5.0 MAT-file, Platform: {}, Created by: matvar-format v{}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    )
}

fn header_bytes(text: &str, version: FileVersion, endian: Endian) -> [u8; HEADER_LEN] {
    let mut header = [b' '; HEADER_LEN];

    let mut end = text.len().min(HEADER_TEXT_LEN);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    header[..end].copy_from_slice(&text.as_bytes()[..end]);

    header[HEADER_TEXT_LEN..HEADER_TEXT_LEN + 8].fill(0);
    header[124..126].copy_from_slice(&version.header_code().to_le_bytes());
    header[126..128].copy_from_slice(&endian.indicator());
    header
}

impl MatFile {
    /// Create (or truncate) a MAT file and write its header.
    ///
    /// `header` replaces the default descriptive text; it is cut to 116 bytes.
    ///
    /// # Errors
    ///
    /// - [`FormatError::UnsupportedVersion`] for [`FileVersion::Mat73`]
    /// - [`FormatError::Io`] if the file cannot be created
    pub fn create(path: impl AsRef<Path>, header: Option<&str>, version: FileVersion) -> Result<Self> {
        let path = path.as_ref();
        if version != FileVersion::Mat5 {
            return Err(FormatError::UnsupportedVersion {
                version: format!("{:?}", version),
            });
        }

        let text = header.map(str::to_string).unwrap_or_else(default_header);
        let endian = Endian::Little;

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.write_all(&header_bytes(&text, version, endian))?;
        file.flush()?;

        debug!("created MAT file {}", path.display());

        Ok(MatFile {
            file,
            path: path.to_path_buf(),
            access: Access::ReadWrite,
            endian,
            header: text.trim_end().to_string(),
            entries: Vec::new(),
        })
    }

    /// Open an existing MAT file and index its top-level records.
    ///
    /// # Errors
    ///
    /// - [`FormatError::Io`] if the file cannot be opened or read
    /// - [`FormatError::InvalidHeader`] if it is not a Level 5 MAT file
    /// - [`FormatError::UnsupportedVersion`] for v7.3 (HDF5) files
    pub fn open(path: impl AsRef<Path>, access: Access) -> Result<Self> {
        let path = path.as_ref();
        let mut file = OpenOptions::new()
            .read(true)
            .write(access == Access::ReadWrite)
            .open(path)?;

        let mut header = [0u8; HEADER_LEN];
        file.read_exact(&mut header).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                FormatError::invalid_header("file shorter than 128 bytes")
            } else {
                FormatError::Io(e)
            }
        })?;

        let endian = Endian::from_indicator([header[126], header[127]])
            .ok_or_else(|| FormatError::invalid_header("missing endian indicator"))?;
        let version = endian.read_u16(&header[124..126]);
        match version {
            0x0100 => {}
            0x0200 => {
                return Err(FormatError::UnsupportedVersion {
                    version: "7.3 (HDF5)".to_string(),
                })
            }
            other => {
                return Err(FormatError::UnsupportedVersion {
                    version: format!("0x{:04x}", other),
                })
            }
        }

        let text = String::from_utf8_lossy(&header[..HEADER_TEXT_LEN])
            .trim_end_matches(|c: char| c == ' ' || c == '\0')
            .to_string();

        let mut mat = MatFile {
            file,
            path: path.to_path_buf(),
            access,
            endian,
            header: text,
            entries: Vec::new(),
        };
        mat.scan()?;

        debug!(
            "opened MAT file {} ({} records)",
            path.display(),
            mat.entries.len()
        );
        Ok(mat)
    }

    /// Walk the top-level element tags and index each record's metadata.
    fn scan(&mut self) -> Result<()> {
        let file_len = self.file.metadata()?.len();
        let mut offset = HEADER_LEN as u64;

        while offset + 8 <= file_len {
            self.file.seek(SeekFrom::Start(offset))?;
            let mut tag = [0u8; 8];
            self.file.read_exact(&mut tag)?;
            let data_type = self.endian.read_u32(&tag[..4]);
            let len = u64::from(self.endian.read_u32(&tag[4..]));

            if offset + 8 + len > file_len {
                warn!(
                    "{}: truncated element at offset {}, ignoring the rest of the file",
                    self.path.display(),
                    offset
                );
                break;
            }

            let compressed = data_type == DataType::Compressed.to_raw();
            let entry_offset = offset;
            offset += 8 + len;
            if !compressed {
                offset += (8 - len % 8) % 8;
            }

            if !compressed && data_type != DataType::Matrix.to_raw() {
                warn!(
                    "{}: skipping top-level element of type {} at offset {}",
                    self.path.display(),
                    data_type,
                    entry_offset
                );
                continue;
            }

            match self.probe(entry_offset, len, compressed) {
                Ok(info) => self.entries.push(Entry {
                    offset: entry_offset,
                    len,
                    compressed,
                    info,
                }),
                Err(e) => warn!(
                    "{}: skipping unreadable record at offset {}: {}",
                    self.path.display(),
                    entry_offset,
                    e
                ),
            }
        }

        Ok(())
    }

    fn read_payload(&self, offset: u64, len: u64, limit: Option<u64>) -> Result<Vec<u8>> {
        let want = limit.map_or(len, |limit| limit.min(len));
        let mut file = &self.file;
        file.seek(SeekFrom::Start(offset + 8))?;
        let mut buf = Vec::with_capacity(want as usize);
        file.take(want).read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Metadata of the element at `offset`, reading as little as possible.
    fn probe(&self, offset: u64, len: u64, compressed: bool) -> Result<RecordInfo> {
        if compressed {
            let raw = self.read_payload(offset, len, None)?;
            let prefix = inflate(&raw, Some(INFO_PROBE_LEN))?;
            let info = match self.info_from_element(&prefix) {
                Err(FormatError::UnexpectedEof { .. }) => {
                    self.info_from_element(&inflate(&raw, None)?)
                }
                other => other,
            }?;
            return Ok(RecordInfo {
                compressed: true,
                ..info
            });
        }

        let prefix = self.read_payload(offset, len, Some(INFO_PROBE_LEN))?;
        match decode_info(&prefix, self.endian) {
            Err(FormatError::UnexpectedEof { .. }) if len > INFO_PROBE_LEN => {
                decode_info(&self.read_payload(offset, len, None)?, self.endian)
            }
            other => other,
        }
    }

    /// Parse an inflated stream, which starts with its own `miMATRIX` tag.
    fn info_from_element(&self, element: &[u8]) -> Result<RecordInfo> {
        if element.len() < 8 {
            return Err(FormatError::eof(8, element.len()));
        }
        let data_type = self.endian.read_u32(&element[..4]);
        if data_type != DataType::Matrix.to_raw() {
            return Err(FormatError::malformed(format!(
                "compressed element holds type {}",
                data_type
            )));
        }
        let len = self.endian.read_u32(&element[4..8]) as usize;
        let end = (8 + len).min(element.len());
        decode_info(&element[8..end], self.endian)
    }

    fn matrix_from_element(&self, element: &[u8]) -> Result<Record> {
        if element.len() < 8 {
            return Err(FormatError::eof(8, element.len()));
        }
        let len = self.endian.read_u32(&element[4..8]) as usize;
        if 8 + len > element.len() {
            return Err(FormatError::eof(8 + len, element.len()));
        }
        decode_matrix(&element[8..8 + len], self.endian)
    }

    /// Path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Descriptive header text, without trailing padding.
    pub fn header_text(&self) -> &str {
        &self.header
    }

    /// Byte order of the file.
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Access mode the file was opened with.
    pub fn access(&self) -> Access {
        self.access
    }

    /// Names of the top-level records, in file order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.info.name.as_str())
    }

    /// Metadata of every top-level record, in file order.
    pub fn infos(&self) -> impl Iterator<Item = &RecordInfo> {
        self.entries.iter().map(|entry| &entry.info)
    }

    /// Metadata of the named record without loading its payload.
    pub fn read_info(&self, name: &str) -> Option<&RecordInfo> {
        self.find(name).map(|entry| &entry.info)
    }

    fn find(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.info.name == name)
    }

    /// Load the named record. Returns `Ok(None)` if there is no such record.
    pub fn read(&self, name: &str) -> Result<Option<Record>> {
        let Some(entry) = self.find(name) else {
            return Ok(None);
        };

        let payload = self.read_payload(entry.offset, entry.len, None)?;
        let record = if entry.compressed {
            self.matrix_from_element(&inflate(&payload, None)?)?
        } else {
            decode_matrix(&payload, self.endian)?
        };

        debug!("read '{}' from {}", name, self.path.display());
        Ok(Some(record))
    }

    /// Append `record` under its own name.
    ///
    /// # Errors
    ///
    /// - [`FormatError::ReadOnly`] if the file was opened read-only
    /// - [`FormatError::InvalidName`] for an empty, over-long or NUL-bearing name
    /// - [`FormatError::DuplicateVariable`] if the name is already in the file
    pub fn write(&mut self, record: &Record, compression: Compression) -> Result<()> {
        if self.access == Access::ReadOnly {
            return Err(FormatError::ReadOnly);
        }
        let name = record.name();
        validate_name(name)?;
        if self.find(name).is_some() {
            return Err(FormatError::DuplicateVariable(name.to_string()));
        }

        let mut element = Vec::new();
        encode_matrix(record, name, &mut element)?;
        let element = match compression {
            Compression::None => element,
            Compression::Zlib => compress_element(&element, flate2::Compression::default().level())?,
        };

        let offset = append_element(&mut self.file, &element)?;

        debug!(
            "wrote '{}' ({} bytes, {:?}) to {}",
            name,
            element.len(),
            compression,
            self.path.display()
        );

        self.entries.push(Entry {
            offset,
            len: (element.len() - 8) as u64,
            compressed: compression == Compression::Zlib,
            info: RecordInfo {
                name: name.to_string(),
                class: record.class(),
                dims: record.dims().to_vec(),
                complex: record.is_complex(),
                logical: record.is_logical(),
                compressed: compression == Compression::Zlib,
            },
        });
        Ok(())
    }

    /// Flush and close the file, reporting any error.
    pub fn close(mut self) -> Result<()> {
        self.file.flush()?;
        if self.access == Access::ReadWrite {
            self.file.sync_all()?;
        }
        debug!("closed MAT file {}", self.path.display());
        Ok(())
    }
}
