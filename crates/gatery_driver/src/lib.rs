//! Memory-map descriptor: a flattened register/register-group
//! description a host-side driver can walk without depending on the rest
//! of this toolchain, grounded on `MemoryMapEntry`/`MemoryMap` (`MemoryMapEntry.h`,
//! `MemoryMap.h`).

#![warn(missing_docs)]

pub mod entry;
pub mod error;
pub mod memory_map;

pub use entry::{MemoryMapEntry, READABLE, WRITEABLE};
pub use error::{DriverError, DriverResult};
pub use memory_map::{MemoryMap, MemoryMapEntryHandle};
