//! Resource pak archives and resource loading for the Radish game framework
//!
#![allow(clippy::cast_possible_truncation)] // Wire formats use fixed-width fields
#![allow(clippy::cast_possible_wrap)] // Partition indices are i32 in memory, u16 on disk
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! This crate packs game content into `.rpk` archives and serves it back to
//! the game through mounted resource providers.
//!
//! # Modules
//!
//! - **Pak**: incremental, CRC-checked archive builder and bounded-stream
//!   reader over size-limited partition files
//! - **Resource**: provider stack (paks and loose directories), resource
//!   manager and typed loader registry
//! - **Path**: path helpers shared by both
//!
//! # Example
//!
//! ```rust,no_run
//! use radish_filesystem::pak::{BuildOptions, PakSource, build_pak_file};
//! use radish_filesystem::resource::{ResourceManager, ResourceManagerOptions, ResourceLoadContext, ResourceResult};
//! use std::path::Path;
//!
//! fn load_text(ctx: &mut ResourceLoadContext<'_>) -> ResourceResult<String> {
//!     let bytes = ctx.read_to_end()?;
//!     String::from_utf8(bytes).map_err(|e| ctx.error(e.to_string()))
//! }
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! build_pak_file(
//!     "data",
//!     Path::new("build"),
//!     true,
//!     vec![PakSource::new("readme.txt", "content/readme.txt")],
//!     &BuildOptions::default(),
//! )?;
//!
//! let mut resources = ResourceManager::new(ResourceManagerOptions::new("build"));
//! resources.mount_pak("data_dir.rpk")?;
//! resources.loaders_mut().register::<String, _>(load_text)?;
//! let readme: String = resources.load("readme.txt")?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod pak;
pub mod path;
pub mod resource;

pub use pak::{BuildOptions, OpenMode, PakError, PakFile, PakResult, PakSource, build_pak_file};
pub use resource::{ResourceError, ResourceManager, ResourceManagerOptions, ResourceResult};
