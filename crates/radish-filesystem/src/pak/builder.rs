//! Incremental pak builder
//!
//! A build walks the given sources in order, hashes each one and appends the
//! ones whose CRC changed to the partition currently being filled. Unchanged
//! sources cost one hash pass and no writes. The header is rewritten at the
//! end of every build.
//!
//! Updating an existing multi-part pak always starts a fresh partition, so a
//! patch only ships the new partition file plus the header. If nothing was
//! written the reserved partition is released again.
//!
//! # Example
//!
//! ```rust,no_run
//! use radish_filesystem::pak::{BuildOptions, PakSource, build_pak_file};
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sources = vec![
//!     PakSource::new("textures/grass.png", "content/textures/grass.png"),
//!     PakSource::new("maps/level01.bin", "content/maps/level01.bin"),
//! ];
//! let report = build_pak_file("data", Path::new("build"), true, sources, &BuildOptions::default())?;
//! println!("revision {} wrote {} files", report.revision, report.updated);
//! # Ok(())
//! # }
//! ```

use crate::pak::error::{PakError, PakResult};
use crate::pak::file::PakFile;
use crate::pak::header::{PakHeader, PakTrailer};
use crate::pak::partition::{self, PartitionWriter};
use crate::pak::table::OpenMode;
use crate::path::normalize_logical_path;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default payload alignment in bytes
pub const DEFAULT_ALIGNMENT: u32 = 4096;

/// Default soft size limit of a partition in bytes (200 MiB)
pub const DEFAULT_TARGET_PARTITION_SIZE: u64 = 209_715_200;

const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Advanced settings for a pak build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Alignment applied to payload start offsets after the first one in a
    /// partition
    pub alignment: u32,
    /// Size after which the next payload goes to a new partition
    ///
    /// Checked after each write, so one large payload can push a partition
    /// past this size.
    pub target_partition_size: u64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            alignment: DEFAULT_ALIGNMENT,
            target_partition_size: DEFAULT_TARGET_PARTITION_SIZE,
        }
    }
}

impl BuildOptions {
    /// Set the payload alignment
    #[must_use]
    pub const fn with_alignment(mut self, alignment: u32) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set the target partition size
    #[must_use]
    pub const fn with_target_partition_size(mut self, size: u64) -> Self {
        self.target_partition_size = size;
        self
    }

    /// Reject options that cannot produce a pak
    pub fn validate(&self) -> PakResult<()> {
        if self.alignment == 0 {
            return Err(PakError::InvalidOptions(
                "alignment must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// A file to pack and the logical path it is stored under
///
/// Logical paths are stored lower-case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SourceSpec", into = "SourceSpec")]
pub struct PakSource {
    pak_path: String,
    absolute_path: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct SourceSpec {
    path: String,
    source: PathBuf,
}

impl From<SourceSpec> for PakSource {
    fn from(raw: SourceSpec) -> Self {
        Self::new(raw.path, raw.source)
    }
}

impl From<PakSource> for SourceSpec {
    fn from(source: PakSource) -> Self {
        Self {
            path: source.pak_path,
            source: source.absolute_path,
        }
    }
}

impl PakSource {
    /// Pair a logical path with the file providing its bytes
    pub fn new(pak_path: impl AsRef<str>, absolute_path: impl Into<PathBuf>) -> Self {
        Self {
            pak_path: normalize_logical_path(pak_path.as_ref()),
            absolute_path: absolute_path.into(),
        }
    }

    /// Logical path inside the pak
    pub fn pak_path(&self) -> &str {
        &self.pak_path
    }

    /// File on disk providing the bytes
    pub fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }
}

/// Outcome of a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    /// Header file that was written
    pub header_path: PathBuf,
    /// Revision stored in the header
    pub revision: i32,
    /// Partition count stored in the header
    pub partition_count: i32,
    /// Sources written to a partition
    pub updated: usize,
    /// Sources skipped on CRC match
    pub skipped: usize,
    /// Whether an existing pak was updated
    pub was_update: bool,
}

/// Build a new pak or update an existing one in place
///
/// * `name` - base name of the pak files
/// * `dir` - directory holding the pak files
/// * `multi_part` - write `{name}_dir.rpk` plus numbered partitions instead of
///   a single `{name}.rpk`
/// * `sources` - files to pack, written in order
///
/// Fails with [`PakError::InvalidHeader`] before writing anything if an
/// existing header does not validate. I/O errors are returned as-is and can
/// leave appended partition data that no header references. The previous
/// header stays readable until the first payload is written.
pub fn build_pak_file<I>(
    name: &str,
    dir: &Path,
    multi_part: bool,
    sources: I,
    options: &BuildOptions,
) -> PakResult<BuildReport>
where
    I: IntoIterator<Item = PakSource>,
{
    options.validate()?;

    let header_path = partition::header_path(dir, name, multi_part);
    info!("Packing {}", header_path.display());

    let (mut header, mut stale_header_offset, is_updating) = if header_path.exists() {
        info!("Updating existing pak contents");
        let pak = PakFile::open_with_layout(&header_path, multi_part, OpenMode::Build)?;
        let header_offset = pak.header_offset();
        let mut header = pak.into_header();
        header.partition_count += 1;
        (header, header_offset, true)
    } else {
        (PakHeader::new(), None, false)
    };

    if !header.is_valid() {
        return Err(PakError::InvalidHeader { path: header_path });
    }

    header.revision = header.revision.wrapping_add(1);

    let mut updated = 0;
    let mut skipped = 0;
    for source in sources {
        let (crc, length) = checksum_file(source.absolute_path())?;

        let entry = header.entries.get_or_create(source.pak_path())?;
        if entry.is_assigned() && entry.crc == crc {
            debug!("Skipping {} due to crc match", source.pak_path());
            skipped += 1;
            continue;
        }

        let current = header.partition_count;
        info!("Packing {} to partition {}", source.pak_path(), current);

        // Payloads of a single-file pak overwrite the old header and trailer
        if let Some(offset) = stale_header_offset.take() {
            partition::truncate_partition(&header_path, offset)?;
        }

        let mut writer =
            PartitionWriter::open_append(partition::partition_path(dir, name, current, multi_part))?;
        let offset = writer.align(options.alignment)?;
        let offset = u32::try_from(offset).map_err(|_| PakError::OffsetOverflow {
            path: source.pak_path().to_string(),
            value: offset,
        })?;
        u32::try_from(length).map_err(|_| PakError::OffsetOverflow {
            path: source.pak_path().to_string(),
            value: length,
        })?;

        let mut file = File::open(source.absolute_path())?;
        let written = writer.append(&mut file)?;
        if written != length {
            warn!(
                "{} changed while packing ({} bytes hashed, {} written)",
                source.absolute_path().display(),
                length,
                written
            );
        }
        let end = writer.finish()?;

        entry.partition = current;
        entry.crc = crc;
        entry.offset = offset;
        entry.length = u32::try_from(written).map_err(|_| PakError::OffsetOverflow {
            path: source.pak_path().to_string(),
            value: written,
        })?;

        if end > options.target_partition_size {
            debug!(
                "Partition {} reached {} bytes, starting partition {}",
                current,
                end,
                current + 1
            );
            header.partition_count += 1;
        }
        updated += 1;
    }

    if updated == 0 && is_updating {
        header.partition_count -= 1;
    }

    if multi_part {
        let mut writer = BufWriter::new(File::create(&header_path)?);
        header.write(&mut writer)?;
        writer.flush()?;
    } else {
        if let Some(offset) = stale_header_offset {
            partition::truncate_partition(&header_path, offset)?;
        }
        write_single_file_header(&header_path, &header)?;
    }

    info!(
        "Wrote {} (revision {}, {} updated, {} unchanged)",
        header_path.display(),
        header.revision,
        updated,
        skipped
    );

    Ok(BuildReport {
        header_path,
        revision: header.revision,
        partition_count: header.partition_count,
        updated,
        skipped,
        was_update: is_updating,
    })
}

/// Append header and trailer after the payloads of a single-file pak
fn write_single_file_header(path: &Path, header: &PakHeader) -> PakResult<()> {
    let bytes = header.to_bytes()?;
    let mut writer = PartitionWriter::open_append(path)?;
    let trailer = PakTrailer::new(writer.position());
    writer.write_bytes(&bytes)?;
    writer.write_bytes(&trailer.to_bytes())?;
    writer.finish()?;
    Ok(())
}

/// CRC-32 and length of a file's current contents
pub fn checksum_file(path: &Path) -> PakResult<(u32, u64)> {
    let mut reader = BufReader::with_capacity(HASH_BUFFER_SIZE, File::open(path)?);
    let mut hasher = crc32fast::Hasher::new();
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
    let mut length = 0u64;
    loop {
        let read = reader.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
        length += read as u64;
    }
    Ok((hasher.finalize(), length))
}

/// Declarative description of a pak build
///
/// ```json
/// {
///   "name": "data",
///   "multi_part": true,
///   "options": { "alignment": 4096 },
///   "sources": [
///     { "path": "textures/grass.png", "source": "textures/grass.png" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildManifest {
    /// Base name of the pak files
    pub name: String,
    /// Write a multi-part pak
    #[serde(default = "default_multi_part")]
    pub multi_part: bool,
    /// Build options
    #[serde(default)]
    pub options: BuildOptions,
    /// Files to pack
    pub sources: Vec<PakSource>,
}

const fn default_multi_part() -> bool {
    true
}

impl BuildManifest {
    /// Parse a manifest from JSON
    pub fn from_json(json: &str) -> PakResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a manifest file, resolving relative sources against its directory
    pub fn load(path: impl AsRef<Path>) -> PakResult<Self> {
        let path = path.as_ref();
        let mut manifest = Self::from_json(&std::fs::read_to_string(path)?)?;
        let base = crate::path::directory_name(path);
        for source in &mut manifest.sources {
            if source.absolute_path.is_relative() {
                source.absolute_path = base.join(&source.absolute_path);
            }
        }
        Ok(manifest)
    }

    /// Run the build into `dir`
    pub fn build(&self, dir: &Path) -> PakResult<BuildReport> {
        build_pak_file(
            &self.name,
            dir,
            self.multi_part,
            self.sources.iter().cloned(),
            &self.options,
        )
    }
}
