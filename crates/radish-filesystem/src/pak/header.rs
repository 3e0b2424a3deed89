//! Pak header codec
//!
//! All integers are little-endian. Strings use a 7-bit variable-length byte
//! count followed by UTF-8 bytes.
//!
//! ```text
//! u32  signature
//! i32  version
//! i32  revision
//! u16  partition_count
//! u32  entry_count
//! entry_count × {
//!     string path
//!     u16    partition
//!     u32    offset
//!     u32    length
//!     u32    crc
//!     u32    flags
//! }
//! ```
//!
//! A header whose signature or version does not match is returned as-is
//! without touching the entry table bytes, so callers can report it through
//! [`PakHeader::is_valid`].

use crate::pak::entry::{EntryFlags, PakEntry};
use crate::pak::error::{PakError, PakResult};
use crate::pak::table::{EntryTable, OpenMode};
use binrw::{BinRead, BinResult, BinWrite, Endian};
use std::io::{Read, Seek, SeekFrom, Write};

/// Header signature ("KAPR" read little-endian)
pub const PAK_SIGNATURE: u32 = 1380991307;

/// Current header format version
pub const PAK_VERSION: i32 = 100;

/// Longest logical path the codec accepts, in bytes
const MAX_PATH_BYTES: u32 = 64 * 1024;

/// In-memory pak header and entry table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PakHeader {
    signature: u32,
    version: i32,
    /// Number of partitions; during a build this is the partition being filled
    pub partition_count: i32,
    /// Incremented on every build or update
    pub revision: i32,
    /// Entries keyed by logical path
    pub entries: EntryTable,
}

impl Default for PakHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl PakHeader {
    /// Create an empty, valid header with a mutable entry table
    pub fn new() -> Self {
        Self {
            signature: PAK_SIGNATURE,
            version: PAK_VERSION,
            partition_count: 0,
            revision: 0,
            entries: EntryTable::new(),
        }
    }

    /// Sentinel header that never validates
    pub fn invalid() -> Self {
        Self {
            signature: 0,
            version: 0,
            partition_count: 0,
            revision: 0,
            entries: EntryTable::with_mode(OpenMode::Read),
        }
    }

    /// Signature as read from disk
    pub fn signature(&self) -> u32 {
        self.signature
    }

    /// Version as read from disk
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Check signature and version
    pub fn is_valid(&self) -> bool {
        self.signature == PAK_SIGNATURE && self.version == PAK_VERSION
    }

    /// Decode a header, freezing the entry table unless opened for build
    pub fn read<R: Read + Seek>(reader: &mut R, mode: OpenMode) -> PakResult<Self> {
        Ok(Self::read_options(reader, Endian::Little, mode)?)
    }

    /// Encode the header with the current format constants
    pub fn write<W: Write + Seek>(&self, writer: &mut W) -> PakResult<()> {
        // Catch overflow before anything reaches the writer
        wire_u16(self.partition_count)?;
        for entry in &self.entries {
            wire_u16(entry.partition)?;
        }
        self.write_options(writer, Endian::Little, ())?;
        Ok(())
    }

    /// Encode the header into a new buffer
    pub fn to_bytes(&self) -> PakResult<Vec<u8>> {
        let mut buffer = std::io::Cursor::new(Vec::new());
        self.write(&mut buffer)?;
        Ok(buffer.into_inner())
    }
}

impl BinRead for PakHeader {
    type Args<'a> = OpenMode;

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        _endian: Endian,
        mode: Self::Args<'_>,
    ) -> BinResult<Self> {
        let signature = u32::read_le(reader)?;
        let version = i32::read_le(reader)?;
        let revision = i32::read_le(reader)?;
        let partition_count = i32::from(u16::read_le(reader)?);

        let mut header = Self {
            signature,
            version,
            partition_count,
            revision,
            entries: EntryTable::with_mode(mode),
        };

        if !header.is_valid() {
            return Ok(header);
        }

        let entry_count = u32::read_le(reader)?;
        let mut entries = EntryTable::new();
        for _ in 0..entry_count {
            let pos = reader.stream_position()?;
            let path = read_prefixed_string(reader)?;
            let entry = PakEntry {
                path,
                partition: i32::from(u16::read_le(reader)?),
                offset: u32::read_le(reader)?,
                length: u32::read_le(reader)?,
                crc: u32::read_le(reader)?,
                flags: EntryFlags::read_le(reader)?,
            };

            if entries.contains(&entry.path) {
                return Err(binrw::Error::Custom {
                    pos,
                    err: Box::new(PakError::InvalidFormat(format!(
                        "duplicate entry {}",
                        entry.path
                    ))),
                });
            }
            entries
                .insert(entry)
                .map_err(|err| binrw::Error::Custom {
                    pos,
                    err: Box::new(err),
                })?;
        }

        header.entries = match mode {
            OpenMode::Read => entries.freeze(),
            OpenMode::Build => entries,
        };
        Ok(header)
    }
}

impl BinWrite for PakHeader {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        _endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        // Constants are written rather than the fields read from disk
        PAK_SIGNATURE.write_le(writer)?;
        PAK_VERSION.write_le(writer)?;
        self.revision.write_le(writer)?;
        to_wire_u16(writer, self.partition_count)?.write_le(writer)?;

        let entry_count = u32::try_from(self.entries.len()).map_err(|_| custom_error(
            writer,
            PakError::InvalidFormat(format!("too many entries: {}", self.entries.len())),
        ))?;
        entry_count.write_le(writer)?;

        for entry in &self.entries {
            write_prefixed_string(writer, &entry.path)?;
            to_wire_u16(writer, entry.partition)?.write_le(writer)?;
            entry.offset.write_le(writer)?;
            entry.length.write_le(writer)?;
            entry.crc.write_le(writer)?;
            entry.flags.write_le(writer)?;
        }
        Ok(())
    }
}

/// Trailer locating the header inside a single-file pak
///
/// Single-file paks store `[payloads][header][trailer]`; the trailer is the
/// last [`PakTrailer::SIZE`] bytes of the file.
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq)]
#[brw(little)]
pub struct PakTrailer {
    /// Offset of the encoded header from the start of the file
    pub header_offset: u64,
    /// Copy of [`PAK_SIGNATURE`]
    pub signature: u32,
}

impl PakTrailer {
    /// Encoded trailer size in bytes
    pub const SIZE: u64 = 12;

    /// Trailer for a header written at `header_offset`
    pub fn new(header_offset: u64) -> Self {
        Self {
            header_offset,
            signature: PAK_SIGNATURE,
        }
    }

    /// Encoded trailer bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE as usize] {
        let mut bytes = [0u8; Self::SIZE as usize];
        bytes[..8].copy_from_slice(&self.header_offset.to_le_bytes());
        bytes[8..].copy_from_slice(&self.signature.to_le_bytes());
        bytes
    }

    /// Read the trailer at the end of `reader`
    ///
    /// Returns `None` when the stream is too short or the signature does not
    /// match.
    pub fn locate<R: Read + Seek>(reader: &mut R) -> PakResult<Option<Self>> {
        let len = reader.seek(SeekFrom::End(0))?;
        if len < Self::SIZE {
            return Ok(None);
        }
        reader.seek(SeekFrom::Start(len - Self::SIZE))?;
        let trailer = Self::read(reader)?;
        if trailer.signature != PAK_SIGNATURE || trailer.header_offset > len - Self::SIZE {
            return Ok(None);
        }
        Ok(Some(trailer))
    }
}

fn wire_u16(value: i32) -> PakResult<u16> {
    u16::try_from(value).map_err(|_| PakError::PartitionOverflow(value))
}

fn to_wire_u16<W: Seek>(writer: &mut W, value: i32) -> BinResult<u16> {
    wire_u16(value).map_err(|err| custom_error(writer, err))
}

fn custom_error<S: Seek>(stream: &mut S, err: PakError) -> binrw::Error {
    binrw::Error::Custom {
        pos: stream.stream_position().unwrap_or(0),
        err: Box::new(err),
    }
}

/// Read a string with a 7-bit variable-length byte count
pub fn read_prefixed_string<R: Read + Seek>(reader: &mut R) -> BinResult<String> {
    let pos = reader.stream_position()?;
    let mut len: u32 = 0;
    let mut shift = 0;
    loop {
        let byte = u8::read_le(reader)?;
        len |= u32::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
        if shift >= 35 {
            return Err(binrw::Error::Custom {
                pos,
                err: Box::new(PakError::InvalidFormat(
                    "string length prefix too long".to_string(),
                )),
            });
        }
    }

    if len > MAX_PATH_BYTES {
        return Err(binrw::Error::Custom {
            pos,
            err: Box::new(PakError::InvalidFormat(format!(
                "string length {len} exceeds {MAX_PATH_BYTES}"
            ))),
        });
    }

    let mut bytes = vec![0u8; len as usize];
    reader.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|e| binrw::Error::Custom {
        pos,
        err: Box::new(PakError::InvalidFormat(format!("path is not UTF-8: {e}"))),
    })
}

/// Write a string with a 7-bit variable-length byte count
pub fn write_prefixed_string<W: Write + Seek>(writer: &mut W, value: &str) -> BinResult<()> {
    let bytes = value.as_bytes();
    let mut len = u32::try_from(bytes.len())
        .ok()
        .filter(|len| *len <= MAX_PATH_BYTES)
        .ok_or_else(|| {
            custom_error(
                writer,
                PakError::InvalidFormat(format!("path too long: {} bytes", bytes.len())),
            )
        })?;

    while len >= 0x80 {
        writer.write_all(&[(len as u8) | 0x80])?;
        len >>= 7;
    }
    writer.write_all(&[len as u8])?;
    writer.write_all(bytes)?;
    Ok(())
}
