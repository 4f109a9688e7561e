//! Node groups: named regions of the graph that the block/entity builder
//! turns into entities, blocks, or processes.

use std::collections::BTreeMap;

use gatery_common::Ident;
use serde::{Deserialize, Serialize};

use crate::ids::NodeGroupId;
use crate::node::NodePort;

/// What kind of AST construct a node group wants to become.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupKind {
    /// Becomes its own VHDL entity.
    Entity,
    /// A plain sub-region; becomes a block or is folded into a process
    /// depending on its contents (see the block/entity builder).
    Area,
    /// A "special functional unit" — treated identically to `Entity` for
    /// instantiation purposes.
    Sfu,
    /// Transparent to grouping: its nodes are treated as though they
    /// belonged directly to the parent group.
    Transparent,
}

/// A path-based timing exception or user-defined attribute, attached to a
/// pair of signal endpoints for the synthesis-tool adapter to resolve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathAttribute {
    /// The starting endpoint of the path.
    pub start: NodePort,
    /// The ending endpoint of the path.
    pub end: NodePort,
    /// The kind of exception or attribute to emit.
    pub kind: PathAttributeKind,
}

/// The kind of path-level attribute carried by a [`PathAttribute`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PathAttributeKind {
    /// Marks the path as a timing false path.
    FalsePath,
    /// Marks the path as a multi-cycle path of the given cycle count.
    MultiCycle(u32),
    /// A vendor-specific templated attribute string. `$src` and `$end` are
    /// substituted with the resolved start/end identifiers at emit time.
    UserDefined(String),
}

/// User-defined and path-level attributes attached to a node group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attributes {
    /// Free-form vendor attributes, e.g. `"black_box" -> "yes"`.
    pub user_defined: BTreeMap<String, String>,
    /// Vendor strings for which `user_defined` applies; empty means "all
    /// vendors" for every entry in `user_defined`.
    pub vendor_specific: BTreeMap<String, BTreeMap<String, String>>,
    /// Timing exceptions and path-level attributes declared on this group.
    pub path_attributes: Vec<PathAttribute>,
}

/// A named region of the HLIM graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeGroup {
    /// The unique ID of this group.
    pub id: NodeGroupId,
    /// The group's desired name.
    pub name: Ident,
    /// An optional comment, surfaced in the entity/block comment banner.
    pub comment: Option<String>,
    /// What this group should become during block/entity building.
    pub kind: GroupKind,
    /// The parent group, `None` for the circuit's root group.
    pub parent: Option<NodeGroupId>,
    /// Child groups, in declaration order.
    pub children: Vec<NodeGroupId>,
    /// Nodes owned directly by this group (not by a child group).
    pub nodes: Vec<crate::ids::NodeId>,
    /// Vendor and timing attributes declared on this group.
    pub attributes: Attributes,
    /// `true` if this entity should be emitted to its own file when writing
    /// in file-per-partition mode.
    pub partition: bool,
    /// `true` if a partitioned entity should additionally be referenced via
    /// a `COMPONENT` declaration (no inline architecture) rather than a
    /// direct `entity work.<name>(impl)` instantiation.
    pub partition_as_component: bool,
}

impl NodeGroup {
    /// `true` if this group's kind instantiates as a sub-entity rather than
    /// folding into the parent's blocks/processes.
    pub fn is_entity_like(&self) -> bool {
        matches!(self.kind, GroupKind::Entity | GroupKind::Sfu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatery_common::Interner;

    fn group(kind: GroupKind) -> NodeGroup {
        let interner = Interner::new();
        NodeGroup {
            id: NodeGroupId::from_raw(0),
            name: interner.get_or_intern("g"),
            comment: None,
            kind,
            parent: None,
            children: Vec::new(),
            nodes: Vec::new(),
            attributes: Attributes::default(),
            partition: false,
            partition_as_component: false,
        }
    }

    #[test]
    fn entity_and_sfu_are_entity_like() {
        assert!(group(GroupKind::Entity).is_entity_like());
        assert!(group(GroupKind::Sfu).is_entity_like());
    }

    #[test]
    fn area_and_transparent_are_not_entity_like() {
        assert!(!group(GroupKind::Area).is_entity_like());
        assert!(!group(GroupKind::Transparent).is_entity_like());
    }
}
