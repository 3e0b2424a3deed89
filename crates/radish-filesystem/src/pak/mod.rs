//! Resource pak archives
//!
//! A pak maps case-insensitive logical paths to byte ranges in one or more
//! partition files. Paks are built incrementally: every build hashes its
//! sources and only appends the ones whose CRC-32 changed since the last
//! build, so updates ship as new partition files plus a rewritten header.
//!
//! # Layouts
//!
//! ```text
//! Multi-part:   {name}_dir.rpk     header
//!               {name}_000.rpk     partition 0
//!               {name}_001.rpk     partition 1 ...
//!
//! Single-file:  {name}.rpk         [payloads][header][trailer]
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use radish_filesystem::pak::{BuildOptions, OpenMode, PakFile, PakSource, build_pak_file};
//! use std::io::Read;
//! use std::path::Path;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! build_pak_file(
//!     "data",
//!     Path::new("build"),
//!     true,
//!     vec![PakSource::new("config/game.xml", "content/config/game.xml")],
//!     &BuildOptions::default(),
//! )?;
//!
//! let pak = PakFile::open("build/data_dir.rpk", OpenMode::Read)?;
//! if let Some(mut stream) = pak.open_read("Config/Game.xml")? {
//!     let mut text = String::new();
//!     stream.read_to_string(&mut text)?;
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod entry;
mod error;
mod file;
mod header;
mod partition;
mod substream;
mod table;

pub use builder::{
    BuildManifest, BuildOptions, BuildReport, DEFAULT_ALIGNMENT, DEFAULT_TARGET_PARTITION_SIZE,
    PakSource, build_pak_file, checksum_file,
};
pub use entry::{EntryFlags, PakEntry};
pub use error::{PakError, PakResult};
pub use file::PakFile;
pub use header::{
    PAK_SIGNATURE, PAK_VERSION, PakHeader, PakTrailer, read_prefixed_string,
    write_prefixed_string,
};
pub use partition::{
    FILE_EXTENSION, MULTI_PART_SUFFIX, PartitionWriter, aligned_offset, header_path,
    partition_file_number, partition_path, truncate_partition,
};
pub use substream::Substream;
pub use table::{EntryTable, OpenMode};
