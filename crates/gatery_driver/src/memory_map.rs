//! A flattened register map and the handle type used to navigate it.
//!
//! Grounded on `MemoryMap`/`MemoryMapEntryHandle` (`MemoryMap.h`): the
//! original is a pointer-plus-index handle into a `const` array living
//! somewhere else (usually `constexpr` generated tables); this port owns
//! the array itself since the auxiliary-file writer builds maps at
//! runtime rather than at compile time. Child lookup is still the same
//! two operations as the original: `[index]` bounds-checked against
//! `children_count`, and `["name"]` a linear scan of the children window.

use crate::entry::MemoryMapEntry;
use crate::error::{DriverError, DriverResult};

/// A flattened memory map: every entry in one contiguous array, with the
/// root entry at index `0`.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryMap {
    entries: Vec<MemoryMapEntry>,
}

impl MemoryMap {
    /// Wraps an already-flattened entry array. `entries[0]` is the root.
    ///
    /// # Panics
    ///
    /// Panics if `entries` is empty.
    pub fn new(entries: Vec<MemoryMapEntry>) -> Self {
        assert!(!entries.is_empty(), "a memory map must have at least a root entry");
        Self { entries }
    }

    /// A handle rooted at the top-level entry (index `0`).
    pub fn root(&self) -> MemoryMapEntryHandle<'_> {
        MemoryMapEntryHandle { map: self, index: 0 }
    }

    /// The raw entry at `index`, with no bounds or window checking.
    pub fn entry(&self, index: usize) -> &MemoryMapEntry {
        &self.entries[index]
    }

    /// The number of entries in the flattened array.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the map holds no entries beyond (impossible, since `new`
    /// requires a root) — kept for the usual `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A handle to one entry in a [`MemoryMap`], with its children window
/// resolved for indexed or by-name lookup.
#[derive(Debug, Clone, Copy)]
pub struct MemoryMapEntryHandle<'a> {
    map: &'a MemoryMap,
    index: usize,
}

impl<'a> MemoryMapEntryHandle<'a> {
    /// The underlying entry this handle points to.
    pub fn entry(&self) -> &'a MemoryMapEntry {
        self.map.entry(self.index)
    }

    /// The entry's address.
    pub fn address(&self) -> u64 {
        self.entry().address
    }

    /// The entry's bit width.
    pub fn width(&self) -> u64 {
        self.entry().width
    }

    /// `true` if the entry is readable.
    pub fn readable(&self) -> bool {
        self.entry().readable()
    }

    /// `true` if the entry is writeable.
    pub fn writeable(&self) -> bool {
        self.entry().writeable()
    }

    /// The entry's name.
    pub fn name(&self) -> &'a str {
        &self.entry().name
    }

    /// The entry's short description.
    pub fn short_desc(&self) -> &'a str {
        &self.entry().short_desc
    }

    /// The entry's long description.
    pub fn long_desc(&self) -> &'a str {
        &self.entry().long_desc
    }

    /// The number of direct children this entry has.
    pub fn len(&self) -> usize {
        self.entry().children_count as usize
    }

    /// `true` if the entry has no children.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `idx`-th direct child, bounds-checked against `children_count`.
    pub fn child(&self, idx: usize) -> DriverResult<MemoryMapEntryHandle<'a>> {
        let entry = self.entry();
        if idx >= entry.children_count as usize {
            return Err(DriverError::index_out_of_range(idx, entry.children_count));
        }
        Ok(MemoryMapEntryHandle {
            map: self.map,
            index: entry.children_start as usize + idx,
        })
    }

    /// The direct child named `name`, found by a linear scan of the
    /// children window.
    pub fn child_by_name(&self, name: &str) -> DriverResult<MemoryMapEntryHandle<'a>> {
        let entry = self.entry();
        for idx in 0..entry.children_count as usize {
            let candidate = entry.children_start as usize + idx;
            if self.map.entry(candidate).name == name {
                return Ok(MemoryMapEntryHandle { map: self.map, index: candidate });
            }
        }
        Err(DriverError::no_such_child(name))
    }

    /// An iterator over every direct child of this entry.
    pub fn children(&self) -> impl Iterator<Item = MemoryMapEntryHandle<'a>> + 'a {
        let map = self.map;
        let start = self.entry().children_start as usize;
        let count = self.entry().children_count as usize;
        (0..count).map(move |idx| MemoryMapEntryHandle { map, index: start + idx })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{READABLE, WRITEABLE};

    fn leaf(name: &str, address: u64, flags: u8) -> MemoryMapEntry {
        MemoryMapEntry {
            address,
            width: 32,
            flags,
            name: name.to_string(),
            short_desc: String::new(),
            long_desc: String::new(),
            children_start: 0,
            children_count: 0,
        }
    }

    fn build_map() -> MemoryMap {
        // root -> [status (ro), control (rw)]
        let entries = vec![
            MemoryMapEntry {
                address: 0,
                width: 0,
                flags: 0,
                name: "root".to_string(),
                short_desc: String::new(),
                long_desc: String::new(),
                children_start: 1,
                children_count: 2,
            },
            leaf("status", 0x00, READABLE),
            leaf("control", 0x04, READABLE | WRITEABLE),
        ];
        MemoryMap::new(entries)
    }

    #[test]
    fn indexed_child_lookup() {
        let map = build_map();
        let root = map.root();
        assert_eq!(root.len(), 2);
        let status = root.child(0).unwrap();
        assert_eq!(status.name(), "status");
        assert!(status.readable());
        assert!(!status.writeable());
    }

    #[test]
    fn named_child_lookup() {
        let map = build_map();
        let root = map.root();
        let control = root.child_by_name("control").unwrap();
        assert_eq!(control.address(), 0x04);
        assert!(control.writeable());
    }

    #[test]
    fn out_of_range_index_errors() {
        let map = build_map();
        let root = map.root();
        assert!(matches!(root.child(5), Err(DriverError::IndexOutOfRange { index: 5, children: 2 })));
    }

    #[test]
    fn unknown_name_errors() {
        let map = build_map();
        let root = map.root();
        assert!(matches!(root.child_by_name("missing"), Err(DriverError::NoSuchChild { .. })));
    }

    #[test]
    fn children_iterator_visits_all_in_order() {
        let map = build_map();
        let names: Vec<&str> = map.root().children().map(|c| c.name()).collect();
        assert_eq!(names, vec!["status", "control"]);
    }

    #[test]
    fn leaf_has_no_children() {
        let map = build_map();
        let status = map.root().child(0).unwrap();
        assert!(status.is_empty());
    }
}
