//! Resource lookup across mounted paks and directories
//!
//! A [`ResourceManager`] owns an ordered stack of [`ResourceProvider`]s and a
//! [`LoaderRegistry`] mapping resource types to the loaders that decode them.

mod error;
mod loader;
mod manager;
mod provider;

pub use error::{ResourceError, ResourceResult};
pub use loader::{LoaderRegistry, ResourceLoadContext, ResourceLoader};
pub use manager::{ResourceManager, ResourceManagerOptions};
pub use provider::{DirectoryProvider, ReadSeek, ResourceProvider, ResourceStream};
