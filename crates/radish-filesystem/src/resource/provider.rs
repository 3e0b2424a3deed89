//! Sources that resources can be read from

use crate::pak::PakFile;
use crate::resource::error::ResourceResult;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Component, Path, PathBuf};

/// Readable, seekable resource stream
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// Boxed stream handed out by providers
pub type ResourceStream = Box<dyn ReadSeek>;

/// A location resources can be read from, such as a pak or a directory
pub trait ResourceProvider {
    /// Name used in log output
    fn name(&self) -> &str;

    /// Check whether `path` can be served
    fn has_file(&self, path: &str) -> bool;

    /// Open `path`, returning `Ok(None)` when it is not present
    fn open_read(&self, path: &str) -> ResourceResult<Option<ResourceStream>>;
}

impl ResourceProvider for PakFile {
    fn name(&self) -> &str {
        PakFile::name(self)
    }

    fn has_file(&self, path: &str) -> bool {
        PakFile::has_file(self, path)
    }

    fn open_read(&self, path: &str) -> ResourceResult<Option<ResourceStream>> {
        Ok(PakFile::open_read(self, path)?.map(|s| Box::new(s) as ResourceStream))
    }
}

/// Serves loose files below a root directory
///
/// Used during development, before content is packed. Paths that would
/// escape the root are treated as absent.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
    name: String,
}

impl DirectoryProvider {
    /// Serve files below `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root.display().to_string();
        Self { root, name }
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        contained.then(|| self.root.join(relative))
    }
}

impl ResourceProvider for DirectoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_file(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|p| p.is_file())
    }

    fn open_read(&self, path: &str) -> ResourceResult<Option<ResourceStream>> {
        match self.resolve(path) {
            Some(full) if full.is_file() => Ok(Some(Box::new(File::open(full)?))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_provider_serves_files() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("maps")).unwrap();
        std::fs::write(temp.path().join("maps/level.bin"), b"level").unwrap();

        let provider = DirectoryProvider::new(temp.path());
        assert!(provider.has_file("maps/level.bin"));
        assert!(!provider.has_file("maps"));
        assert!(!provider.has_file("maps/other.bin"));

        let mut text = String::new();
        provider
            .open_read("maps/level.bin")
            .unwrap()
            .unwrap()
            .read_to_string(&mut text)
            .unwrap();
        assert_eq!(text, "level");
        assert!(provider.open_read("maps/other.bin").unwrap().is_none());
    }

    #[test]
    fn test_directory_provider_stays_in_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("root");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(temp.path().join("secret.txt"), b"x").unwrap();

        let provider = DirectoryProvider::new(&root);
        assert!(!provider.has_file("../secret.txt"));
        assert!(provider.open_read("../secret.txt").unwrap().is_none());
    }
}
