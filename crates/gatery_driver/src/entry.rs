//! A single flattened memory-map entry.
//!
//! Grounded on `MemoryMapEntry` (`MemoryMapEntry.h`): one register or
//! register-group description, with its children (if any) referenced by a
//! contiguous window into the same flat array rather than a nested tree,
//! so the whole map can be serialized and walked without pointer-chasing.

use serde::{Deserialize, Serialize};

/// Bit set in [`MemoryMapEntry::flags`] when the entry can be read.
pub const READABLE: u8 = 0b01;
/// Bit set in [`MemoryMapEntry::flags`] when the entry can be written.
pub const WRITEABLE: u8 = 0b10;

/// One entry in a flattened memory map: an address, a bit width, access
/// flags, documentation strings, and a window into the entry array
/// describing its children (an empty window for a leaf register).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMapEntry {
    /// The entry's byte address, relative to whatever base the caller maps
    /// this memory map onto.
    pub address: u64,
    /// The entry's width in bits.
    pub width: u64,
    /// [`READABLE`]/[`WRITEABLE`] bits describing how the entry may be
    /// accessed.
    pub flags: u8,
    /// The entry's short identifier, e.g. `"status"`.
    pub name: String,
    /// A one-line description, e.g. for a generated header comment.
    pub short_desc: String,
    /// A longer, multi-sentence description.
    pub long_desc: String,
    /// The index of this entry's first child in the owning [`crate::MemoryMap`]'s
    /// flat array.
    pub children_start: u32,
    /// The number of children this entry has.
    pub children_count: u32,
}

impl MemoryMapEntry {
    /// `true` if [`READABLE`] is set.
    pub fn readable(&self) -> bool {
        self.flags & READABLE != 0
    }

    /// `true` if [`WRITEABLE`] is set.
    pub fn writeable(&self) -> bool {
        self.flags & WRITEABLE != 0
    }
}
