//! Mounting providers and loading resources through them

use crate::pak::{OpenMode, PakError, PakFile};
use crate::resource::error::{ResourceError, ResourceResult};
use crate::resource::loader::{LoaderRegistry, ResourceLoadContext};
use crate::resource::provider::{ResourceProvider, ResourceStream};
use serde::{Deserialize, Serialize};
use std::any::type_name;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where game data lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceManagerOptions {
    /// Directory holding paks and loose resources
    pub base_resources_path: PathBuf,
    /// Directory holding source content, if resources can be rebuilt
    #[serde(default)]
    pub source_content_path: Option<PathBuf>,
}

impl ResourceManagerOptions {
    /// Options rooted at `base_resources_path`
    pub fn new(base_resources_path: impl Into<PathBuf>) -> Self {
        Self {
            base_resources_path: base_resources_path.into(),
            source_content_path: None,
        }
    }

    /// Set the source content directory
    #[must_use]
    pub fn with_source_content_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_content_path = Some(path.into());
        self
    }
}

/// Mounted resource providers and the loaders that decode their bytes
///
/// Lookups go from the most recently mounted provider to the first, so a
/// patch pak mounted after the base pak shadows its entries.
pub struct ResourceManager {
    options: ResourceManagerOptions,
    providers: Vec<Box<dyn ResourceProvider>>,
    loaders: LoaderRegistry,
}

impl ResourceManager {
    /// Create a manager with no providers and no loaders
    pub fn new(options: ResourceManagerOptions) -> Self {
        Self::with_loaders(options, LoaderRegistry::new())
    }

    /// Create a manager using an existing loader registry
    pub fn with_loaders(options: ResourceManagerOptions, loaders: LoaderRegistry) -> Self {
        Self {
            options,
            providers: Vec::new(),
            loaders,
        }
    }

    /// Directory holding paks and loose resources
    pub fn base_path(&self) -> &Path {
        &self.options.base_resources_path
    }

    /// Directory holding source content
    pub fn source_content_path(&self) -> Option<&Path> {
        self.options.source_content_path.as_deref()
    }

    /// Mount a provider above all existing ones
    pub fn mount(&mut self, provider: impl ResourceProvider + 'static) {
        info!("Mounting {}", provider.name());
        self.providers.push(Box::new(provider));
    }

    /// Open and mount a pak header file relative to the base path
    pub fn mount_pak(&mut self, header_file: impl AsRef<Path>) -> ResourceResult<()> {
        let path = self.base_path().join(header_file);
        let pak = PakFile::open(&path, OpenMode::Read)?;
        if !pak.is_valid() {
            return Err(PakError::InvalidHeader { path }.into());
        }
        self.mount(pak);
        Ok(())
    }

    /// Mounted providers, first mounted first
    pub fn providers(&self) -> impl Iterator<Item = &dyn ResourceProvider> {
        self.providers.iter().map(|p| &**p)
    }

    /// Loader registry
    pub fn loaders(&self) -> &LoaderRegistry {
        &self.loaders
    }

    /// Loader registry, for registering loaders
    pub fn loaders_mut(&mut self) -> &mut LoaderRegistry {
        &mut self.loaders
    }

    /// Check whether any provider has `path`
    pub fn has_file(&self, path: &str) -> bool {
        self.providers.iter().rev().any(|p| p.has_file(path))
    }

    /// Open `path` from the topmost provider that has it
    pub fn open_read(&self, path: &str) -> ResourceResult<Option<ResourceStream>> {
        for provider in self.providers.iter().rev() {
            if let Some(stream) = provider.open_read(path)? {
                debug!("Opened {} from {}", path, provider.name());
                return Ok(Some(stream));
            }
        }
        Ok(None)
    }

    /// Open `path` and decode it with the loader registered for `T`
    pub fn load<T: 'static>(&self, path: &str) -> ResourceResult<T> {
        let loader = self
            .loaders
            .get::<T>()
            .ok_or(ResourceError::NoLoader(type_name::<T>()))?;

        let Some(stream) = self.open_read(path)? else {
            warn!("Resource {} not found in any mounted provider", path);
            return Err(ResourceError::NotFound(path.to_string()));
        };

        let mut ctx = ResourceLoadContext::new(path, stream);
        loader.load(&mut ctx)
    }
}

impl std::fmt::Debug for ResourceManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceManager")
            .field("options", &self.options)
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("loaders", &self.loaders)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resource::provider::DirectoryProvider;
    use std::io::Read;
    use tempfile::TempDir;

    fn text(ctx: &mut ResourceLoadContext<'_>) -> ResourceResult<String> {
        let bytes = ctx.read_to_end()?;
        String::from_utf8(bytes).map_err(|e| ctx.error(e.to_string()))
    }

    fn directory(temp: &TempDir, name: &str, files: &[(&str, &str)]) -> DirectoryProvider {
        let root = temp.path().join(name);
        std::fs::create_dir_all(&root).unwrap();
        for (path, contents) in files {
            std::fs::write(root.join(path), contents).unwrap();
        }
        DirectoryProvider::new(root)
    }

    #[test]
    fn test_options_from_json() {
        let options: ResourceManagerOptions =
            serde_json::from_str(r#"{ "base_resources_path": "data" }"#).unwrap();
        assert_eq!(options, ResourceManagerOptions::new("data"));

        let options = options.with_source_content_path("content");
        let manager = ResourceManager::new(options);
        assert_eq!(manager.base_path(), Path::new("data"));
        assert_eq!(manager.source_content_path(), Some(Path::new("content")));
    }

    #[test]
    fn test_latest_mount_wins() {
        let temp = TempDir::new().unwrap();
        let mut manager = ResourceManager::new(ResourceManagerOptions::new(temp.path()));
        manager.mount(directory(&temp, "base", &[("a.txt", "base"), ("b.txt", "only base")]));
        manager.mount(directory(&temp, "patch", &[("a.txt", "patch")]));

        let mut contents = String::new();
        manager
            .open_read("a.txt")
            .unwrap()
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "patch");
        assert!(manager.has_file("b.txt"));
        assert!(!manager.has_file("c.txt"));
        assert!(manager.open_read("c.txt").unwrap().is_none());
        assert_eq!(manager.providers().count(), 2);
    }

    #[test]
    fn test_load_with_registered_loader() {
        let temp = TempDir::new().unwrap();
        let mut manager = ResourceManager::new(ResourceManagerOptions::new(temp.path()));
        manager.mount(directory(&temp, "base", &[("hello.txt", "hi there")]));
        manager.loaders_mut().register::<String, _>(text).unwrap();

        assert_eq!(manager.load::<String>("hello.txt").unwrap(), "hi there");
        assert!(matches!(
            manager.load::<String>("missing.txt"),
            Err(ResourceError::NotFound(_))
        ));
        assert!(matches!(
            manager.load::<u32>("hello.txt"),
            Err(ResourceError::NoLoader(_))
        ));
    }

    #[test]
    fn test_mount_invalid_pak_fails() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("bad_dir.rpk"), [0u8; 16]).unwrap();

        let mut manager = ResourceManager::new(ResourceManagerOptions::new(temp.path()));
        assert!(matches!(
            manager.mount_pak("bad_dir.rpk"),
            Err(ResourceError::Pak(PakError::InvalidHeader { .. }))
        ));
        assert!(matches!(
            manager.mount_pak("absent_dir.rpk"),
            Err(ResourceError::Pak(PakError::Io(_)))
        ));
        assert_eq!(manager.providers().count(), 0);
    }
}
