//! The high-level intermediate model (HLIM): the finalized, read-only
//! circuit graph consumed by the VHDL back-end.
//!
//! Everything in this crate describes *input*: a directed graph of nodes
//! and node groups that the frontend DSL and simulator hand off once
//! elaboration is complete. The back-end (`gatery_vhdl`) never mutates a
//! [`Circuit`]; it only decorates it through its own side-tables.

#![warn(missing_docs)]

pub mod arena;
pub mod circuit;
pub mod clock;
pub mod group;
pub mod ids;
pub mod node;
pub mod types;

pub use circuit::Circuit;
pub use clock::{Clock, ResetType};
pub use group::{Attributes, GroupKind, NodeGroup, PathAttribute, PathAttributeKind};
pub use ids::{ClockId, NodeGroupId, NodeId};
pub use node::{LogicOp, Node, NodeKind, NodePort, PinDirection};
pub use types::ConnectionType;
