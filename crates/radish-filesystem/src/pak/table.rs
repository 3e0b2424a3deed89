//! Case-insensitive table of pak entries

use crate::pak::entry::PakEntry;
use crate::pak::error::{PakError, PakResult};
use crate::path::normalize_logical_path;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// How a pak is being opened
///
/// Selects whether the loaded entry table accepts mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpenMode {
    /// Read-only access, the entry table is frozen
    #[default]
    Read,
    /// Open for an incremental build, the entry table is mutable
    Build,
}

/// Entry table keyed by case-folded logical path
///
/// Keys are stored folded so iteration is deterministic and lookups ignore
/// case; each [`PakEntry`] keeps the path as it was added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryTable {
    entries: BTreeMap<String, PakEntry>,
    frozen: bool,
}

impl EntryTable {
    /// Create an empty mutable table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table in the given mode
    pub fn with_mode(mode: OpenMode) -> Self {
        Self {
            entries: BTreeMap::new(),
            frozen: mode == OpenMode::Read,
        }
    }

    /// Whether mutation is rejected
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Freeze the table against further mutation
    #[must_use]
    pub fn freeze(mut self) -> Self {
        self.frozen = true;
        self
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive presence check
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(&normalize_logical_path(path))
    }

    /// Case-insensitive lookup
    pub fn get(&self, path: &str) -> Option<&PakEntry> {
        self.entries.get(&normalize_logical_path(path))
    }

    /// Mutable lookup, fails on a frozen table
    pub fn get_mut(&mut self, path: &str) -> PakResult<Option<&mut PakEntry>> {
        self.ensure_mutable()?;
        Ok(self.entries.get_mut(&normalize_logical_path(path)))
    }

    /// Insert or replace an entry, keyed by its own path
    pub fn insert(&mut self, entry: PakEntry) -> PakResult<Option<PakEntry>> {
        self.ensure_mutable()?;
        Ok(self
            .entries
            .insert(normalize_logical_path(&entry.path), entry))
    }

    /// Return the entry for `path`, creating an unassigned one if absent
    pub fn get_or_create(&mut self, path: &str) -> PakResult<&mut PakEntry> {
        self.ensure_mutable()?;
        Ok(match self.entries.entry(normalize_logical_path(path)) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(PakEntry::new(path)),
        })
    }

    /// Iterate over entries in key order
    pub fn iter(&self) -> impl Iterator<Item = &PakEntry> {
        self.entries.values()
    }

    /// Iterate over logical paths as they were added
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|e| e.path.as_str())
    }

    fn ensure_mutable(&self) -> PakResult<()> {
        if self.frozen {
            return Err(PakError::ReadOnly);
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a EntryTable {
    type Item = &'a PakEntry;
    type IntoIter = std::collections::btree_map::Values<'a, String, PakEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let mut table = EntryTable::new();
        table
            .insert(PakEntry::new("Textures/Grass.png"))
            .expect("insert should succeed");

        assert!(table.contains("textures/grass.png"));
        assert!(table.contains("TEXTURES/GRASS.PNG"));
        assert_eq!(
            table.get("textures/GRASS.png").map(|e| e.path.as_str()),
            Some("Textures/Grass.png")
        );
        assert!(!table.contains("textures/dirt.png"));
    }

    #[test]
    fn test_insert_replaces_case_variant() {
        let mut table = EntryTable::new();
        table.insert(PakEntry::new("a.txt")).unwrap();
        let previous = table.insert(PakEntry::new("A.TXT")).unwrap();

        assert!(previous.is_some());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_get_or_create_starts_unassigned() {
        let mut table = EntryTable::new();
        let entry = table.get_or_create("new.bin").unwrap();
        assert_eq!(entry.partition, PakEntry::UNASSIGNED);
        assert!(!entry.is_assigned());

        entry.partition = 2;
        assert_eq!(table.get_or_create("NEW.BIN").unwrap().partition, 2);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_frozen_table_rejects_mutation() {
        let mut table = EntryTable::with_mode(OpenMode::Read);
        assert!(table.is_frozen());
        assert!(matches!(
            table.insert(PakEntry::new("a.txt")),
            Err(PakError::ReadOnly)
        ));
        assert!(matches!(
            table.get_or_create("a.txt"),
            Err(PakError::ReadOnly)
        ));
        assert!(matches!(table.get_mut("a.txt"), Err(PakError::ReadOnly)));
        assert!(table.is_empty());
    }

    #[test]
    fn test_freeze_keeps_entries() {
        let mut table = EntryTable::with_mode(OpenMode::Build);
        table.insert(PakEntry::new("a.txt")).unwrap();
        let table = table.freeze();

        assert!(table.is_frozen());
        assert_eq!(table.paths().collect::<Vec<_>>(), vec!["a.txt"]);
    }
}
