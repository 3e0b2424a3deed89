//! Opening paks and reading their entries

use crate::pak::entry::PakEntry;
use crate::pak::error::PakResult;
use crate::pak::header::{PakHeader, PakTrailer};
use crate::pak::partition::{self, MULTI_PART_SUFFIX};
use crate::pak::substream::Substream;
use crate::pak::table::OpenMode;
use crate::path::{directory_name, file_stem, trim_suffix};
use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An opened pak archive
///
/// Holds the decoded header only. Each [`PakFile::open_read`] opens its own
/// handle on the owning partition, released when the returned stream drops.
#[derive(Debug, Clone)]
pub struct PakFile {
    header: PakHeader,
    directory: PathBuf,
    name: String,
    multi_part: bool,
    header_offset: Option<u64>,
}

impl PakFile {
    /// Open the pak whose header file is `path`
    ///
    /// A file ending in a valid [`PakTrailer`] is a single-file pak.
    /// Otherwise a `_dir` file stem selects a multi-part pak. A header that
    /// fails validation is kept and reported through [`PakFile::is_valid`];
    /// such a pak has no entries.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode) -> PakResult<Self> {
        let path = path.as_ref();
        let has_trailer = PakTrailer::locate(&mut BufReader::new(File::open(path)?))?.is_some();
        let multi_part = !has_trailer && file_stem(path).ends_with(MULTI_PART_SUFFIX);
        Self::open_with_layout(path, multi_part, mode)
    }

    /// Open a pak with an explicit layout
    pub fn open_with_layout(path: &Path, multi_part: bool, mode: OpenMode) -> PakResult<Self> {
        let stem = file_stem(path);
        let name = if multi_part {
            trim_suffix(&stem, MULTI_PART_SUFFIX).to_string()
        } else {
            stem
        };

        let mut reader = BufReader::new(File::open(path)?);
        let (header, header_offset) = if multi_part {
            (PakHeader::read(&mut reader, mode)?, None)
        } else {
            match PakTrailer::locate(&mut reader)? {
                Some(trailer) => {
                    reader.seek(SeekFrom::Start(trailer.header_offset))?;
                    (
                        PakHeader::read(&mut reader, mode)?,
                        Some(trailer.header_offset),
                    )
                }
                None => (PakHeader::invalid(), None),
            }
        };

        if header.is_valid() {
            debug!(
                "Opened pak {} (revision {}, {} entries, {} partitions)",
                name,
                header.revision,
                header.entries.len(),
                header.partition_count
            );
        } else {
            warn!("Pak header invalid: {}", path.display());
        }

        Ok(Self {
            header,
            directory: directory_name(path),
            name,
            multi_part,
            header_offset,
        })
    }

    /// Decoded header
    pub fn header(&self) -> &PakHeader {
        &self.header
    }

    /// Take the header, e.g. to continue building
    pub fn into_header(self) -> PakHeader {
        self.header
    }

    /// Base name of the pak files
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding the pak files
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Whether header and payload live in separate files
    pub fn is_multi_part(&self) -> bool {
        self.multi_part
    }

    /// Whether the header passed signature and version checks
    pub fn is_valid(&self) -> bool {
        self.header.is_valid()
    }

    /// Position of the header inside a single-file pak
    pub(crate) fn header_offset(&self) -> Option<u64> {
        self.header_offset
    }

    /// Case-insensitive presence check
    pub fn has_file(&self, path: &str) -> bool {
        self.header.entries.contains(path)
    }

    /// Entry record for a logical path
    pub fn entry(&self, path: &str) -> Option<&PakEntry> {
        self.header.entries.get(path)
    }

    /// Open a bounded stream over one entry
    ///
    /// Returns `Ok(None)` when the path is not in the pak.
    pub fn open_read(&self, path: &str) -> PakResult<Option<Substream<File>>> {
        let Some(entry) = self.header.entries.get(path) else {
            return Ok(None);
        };

        let partition_path = self.partition_path(entry.partition);
        let file = File::open(&partition_path)?;
        let stream = Substream::new(file, u64::from(entry.offset), u64::from(entry.length))?;
        Ok(Some(stream))
    }

    /// Read one entry fully into memory
    pub fn read(&self, path: &str) -> PakResult<Option<Vec<u8>>> {
        match self.open_read(path)? {
            Some(mut stream) => Ok(Some(stream.read_remaining()?)),
            None => Ok(None),
        }
    }

    /// File holding a partition of this pak
    pub fn partition_path(&self, partition: i32) -> PathBuf {
        partition::partition_path(&self.directory, &self.name, partition, self.multi_part)
    }

    /// Logical paths in the pak
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.header.entries.paths()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.header.entries.len()
    }

    /// Check if the pak has no entries
    pub fn is_empty(&self) -> bool {
        self.header.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a PakFile {
    type Item = &'a str;
    type IntoIter = Box<dyn Iterator<Item = &'a str> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.paths())
    }
}
