//! Entry records for logical paths stored in a pak

use binrw::{BinRead, BinWrite};

/// Per-entry flag bits
///
/// No bits are defined yet; the field is carried through the header so
/// later format revisions can use it without a version bump.
#[derive(BinRead, BinWrite, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[brw(little)]
pub struct EntryFlags {
    /// Raw flag value
    pub value: u32,
}

impl EntryFlags {
    /// No flags set
    pub const NONE: u32 = 0;

    /// Create flags from a raw value
    pub const fn new(value: u32) -> Self {
        Self { value }
    }

    /// Check if a flag is set
    pub const fn has(&self, flag: u32) -> bool {
        (self.value & flag) != 0
    }

    /// Set a flag
    pub fn set(&mut self, flag: u32) {
        self.value |= flag;
    }

    /// Clear a flag
    pub fn clear(&mut self, flag: u32) {
        self.value &= !flag;
    }
}

/// Location and checksum of one logical path inside a pak
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PakEntry {
    /// Logical path as it was first added
    pub path: String,
    /// Partition holding the bytes, `-1` until the entry is first written
    pub partition: i32,
    /// Byte offset within the partition file
    pub offset: u32,
    /// Byte length of the payload
    pub length: u32,
    /// CRC-32 of the source file when it was last written
    pub crc: u32,
    /// Reserved flag bits
    pub flags: EntryFlags,
}

impl PakEntry {
    /// Partition value of an entry that has not been written yet
    pub const UNASSIGNED: i32 = -1;

    /// Create an unassigned entry for a logical path
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            partition: Self::UNASSIGNED,
            offset: 0,
            length: 0,
            crc: 0,
            flags: EntryFlags::default(),
        }
    }

    /// Whether the entry has been written to a partition
    pub const fn is_assigned(&self) -> bool {
        self.partition >= 0
    }

    /// End of the payload within its partition
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.length)
    }
}
