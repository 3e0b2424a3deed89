//! Partition file naming and append-only partition writes

use crate::pak::error::PakResult;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Extension shared by header and partition files
pub const FILE_EXTENSION: &str = "rpk";

/// Stem suffix of a multi-part header file
pub const MULTI_PART_SUFFIX: &str = "_dir";

/// Header file of a pak: `{name}_dir.rpk` or `{name}.rpk`
pub fn header_path(dir: &Path, name: &str, multi_part: bool) -> PathBuf {
    if multi_part {
        dir.join(format!("{name}{MULTI_PART_SUFFIX}.{FILE_EXTENSION}"))
    } else {
        dir.join(format!("{name}.{FILE_EXTENSION}"))
    }
}

/// Partition file of a pak: `{name}_{NNN}.rpk`, or the header file itself
/// for single-file paks
pub fn partition_path(dir: &Path, name: &str, partition: i32, multi_part: bool) -> PathBuf {
    if multi_part {
        dir.join(format!(
            "{name}_{}.{FILE_EXTENSION}",
            partition_file_number(partition)
        ))
    } else {
        dir.join(format!("{name}.{FILE_EXTENSION}"))
    }
}

/// Zero-padded three digit partition number
pub fn partition_file_number(partition: i32) -> String {
    format!("{partition:03}")
}

/// Start offset for the next payload given the current end of the partition
///
/// Nothing is added at the start of a partition. Elsewhere the position
/// advances by `position % alignment`, which is not a round-up to a multiple
/// of `alignment`; existing paks depend on these exact offsets.
pub fn aligned_offset(position: u64, alignment: u32) -> u64 {
    if position == 0 || alignment == 0 {
        return position;
    }
    position + position % u64::from(alignment)
}

/// Append-only writer over one partition file
pub struct PartitionWriter {
    file: File,
    path: PathBuf,
    position: u64,
}

impl PartitionWriter {
    /// Open or create a partition file positioned at its end
    pub fn open_append(path: impl AsRef<Path>) -> PakResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;
        let position = file.seek(SeekFrom::End(0))?;
        Ok(Self {
            file,
            path,
            position,
        })
    }

    /// Path of the partition file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current write position
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Move to the aligned start of the next payload and return it
    ///
    /// The gap is filled with zeros once the payload is written.
    pub fn align(&mut self, alignment: u32) -> PakResult<u64> {
        let target = aligned_offset(self.position, alignment);
        if target != self.position {
            self.position = self.file.seek(SeekFrom::Start(target))?;
        }
        Ok(self.position)
    }

    /// Copy all of `source` to the partition, returning the bytes written
    pub fn append<R: Read>(&mut self, source: &mut R) -> PakResult<u64> {
        let written = io::copy(source, &mut self.file)?;
        self.position += written;
        Ok(written)
    }

    /// Write raw bytes to the partition
    pub fn write_bytes(&mut self, bytes: &[u8]) -> PakResult<()> {
        self.file.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    /// Flush buffered data and release the file handle
    pub fn finish(mut self) -> PakResult<u64> {
        self.file.flush()?;
        Ok(self.position)
    }
}

/// Cut a partition file back to `len` bytes
pub fn truncate_partition(path: &Path, len: u64) -> PakResult<()> {
    let file = OpenOptions::new().write(true).open(path)?;
    file.set_len(len)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_naming() {
        let dir = Path::new("paks");
        assert_eq!(header_path(dir, "data", true), dir.join("data_dir.rpk"));
        assert_eq!(header_path(dir, "data", false), dir.join("data.rpk"));
        assert_eq!(partition_path(dir, "data", 0, true), dir.join("data_000.rpk"));
        assert_eq!(partition_path(dir, "data", 12, true), dir.join("data_012.rpk"));
        assert_eq!(partition_path(dir, "data", 1234, true), dir.join("data_1234.rpk"));
        assert_eq!(partition_path(dir, "data", 5, false), dir.join("data.rpk"));
    }

    #[test]
    fn test_aligned_offset_adds_remainder() {
        assert_eq!(aligned_offset(0, 4096), 0);
        assert_eq!(aligned_offset(500, 256), 744);
        assert_eq!(aligned_offset(512, 256), 512);
        assert_eq!(aligned_offset(100, 4096), 200);
        assert_eq!(aligned_offset(100, 1), 100);
    }

    #[test]
    fn test_append_with_alignment_gap() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data_000.rpk");

        let mut writer = PartitionWriter::open_append(&path).unwrap();
        assert_eq!(writer.position(), 0);
        assert_eq!(writer.align(256).unwrap(), 0);
        writer.append(&mut &[1u8; 500][..]).unwrap();
        writer.finish().unwrap();

        let mut writer = PartitionWriter::open_append(&path).unwrap();
        assert_eq!(writer.position(), 500);
        assert_eq!(writer.align(256).unwrap(), 744);
        writer.append(&mut &[2u8; 10][..]).unwrap();
        assert_eq!(writer.finish().unwrap(), 754);

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 754);
        assert!(bytes[500..744].iter().all(|b| *b == 0));
        assert!(bytes[744..].iter().all(|b| *b == 2));
    }

    #[test]
    fn test_truncate_partition() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.rpk");
        std::fs::write(&path, [7u8; 64]).unwrap();

        truncate_partition(&path, 16).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 16);
    }
}
