//! The `SynthesisTool` trait and the vendor-neutral default implementation.
//!
//! Grounded on `SynthesisTool`/`DefaultSynthesisTool` (`SynthesisTool.h`,
//! `SynthesisTool.cpp`): register, signal, and memory attributes are
//! resolved through three independent small projections rather than one
//! catch-all, each falling back to [`add_user_defined_attributes`] for
//! anything it doesn't recognize itself. The simplified HLIM model here
//! carries one [`Attributes`] bag rather than the original's three
//! distinct `RegisterAttributes`/`SignalAttributes`/`MemoryAttributes`
//! types, so the three trait methods differ only in which node kind the
//! caller applies them to, not in the shape of data they consume.

use std::collections::BTreeMap;

use gatery_hlim::group::Attributes;

/// Attribute name to attribute value, resolved and vendor-filtered.
pub type ResolvedAttributes = BTreeMap<String, String>;

/// Resolves per-node-kind attribute bags into a vendor-filtered, flattened
/// map, and writes the auxiliary files a synthesis flow needs alongside the
/// exported VHDL.
pub trait SynthesisTool {
    /// The vendor tags this tool recognizes, e.g. `["all"]` for the
    /// default adapter or `["xilinx", "all"]` for a vendor-specific one.
    fn vendors(&self) -> &[String];

    /// Resolves attributes declared on a register-kind node group.
    fn resolve_register_attributes(&self, attribs: &Attributes) -> ResolvedAttributes {
        let mut resolved = ResolvedAttributes::new();
        add_user_defined_attributes(self.vendors(), attribs, &mut resolved);
        resolved
    }

    /// Resolves attributes declared on a signal-kind node group.
    fn resolve_signal_attributes(&self, attribs: &Attributes) -> ResolvedAttributes {
        let mut resolved = ResolvedAttributes::new();
        add_user_defined_attributes(self.vendors(), attribs, &mut resolved);
        resolved
    }

    /// Resolves attributes declared on a memory-kind node group.
    fn resolve_memory_attributes(&self, attribs: &Attributes) -> ResolvedAttributes {
        let mut resolved = ResolvedAttributes::new();
        add_user_defined_attributes(self.vendors(), attribs, &mut resolved);
        resolved
    }
}

/// The shared tail of every `resolve_*_attributes` method: passes through
/// vendor-agnostic user-defined attributes unconditionally, and
/// vendor-specific ones filtered against `vendors`.
pub fn add_user_defined_attributes(vendors: &[String], attribs: &Attributes, resolved: &mut ResolvedAttributes) {
    for (key, value) in &attribs.user_defined {
        resolved.insert(key.clone(), value.clone());
    }
    for vendor in vendors {
        if let Some(per_vendor) = attribs.vendor_specific.get(vendor) {
            for (key, value) in per_vendor {
                resolved.insert(key.clone(), value.clone());
            }
        }
    }
}

/// The vendor-neutral adapter: advertises `{"all"}` and adds no
/// category-specific resolution beyond the shared user-defined pass-through.
pub struct DefaultSynthesisTool {
    vendors: Vec<String>,
}

impl DefaultSynthesisTool {
    /// Creates the default adapter, recognizing only the `"all"` vendor tag.
    pub fn new() -> Self {
        Self { vendors: vec!["all".to_string()] }
    }
}

impl Default for DefaultSynthesisTool {
    fn default() -> Self {
        Self::new()
    }
}

impl SynthesisTool for DefaultSynthesisTool {
    fn vendors(&self) -> &[String] {
        &self.vendors
    }
}
