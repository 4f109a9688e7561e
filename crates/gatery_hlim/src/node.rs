//! HLIM nodes: the elementary operations, pins, registers, and other leaves
//! of the circuit graph.

use gatery_common::{Ident, LogicVec};
use serde::{Deserialize, Serialize};

use crate::clock::ClockId;
use crate::ids::{NodeGroupId, NodeId};
use crate::types::ConnectionType;

/// A reference to one output port of a node — the unit a consumer drives from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodePort {
    /// The producing node.
    pub node: NodeId,
    /// The index of the output port on that node.
    pub port: u32,
}

impl NodePort {
    /// Shorthand constructor.
    pub fn new(node: NodeId, port: u32) -> Self {
        Self { node, port }
    }
}

/// Direction of an I/O pin node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinDirection {
    /// Value flows from the outside world into the circuit.
    Input,
    /// Value flows from the circuit to the outside world.
    Output,
}

/// Elementary combinational operations. This is deliberately a closed,
/// coarse-grained set: the graph is treated as opaque except for what the
/// back-end must recurse through to render an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicOp {
    /// Bitwise AND of two operands.
    And,
    /// Bitwise OR of two operands.
    Or,
    /// Bitwise XOR of two operands.
    Xor,
    /// Bitwise NOT of one operand.
    Not,
    /// Two's-complement addition.
    Add,
    /// Two's-complement subtraction.
    Sub,
    /// Unsigned multiplication.
    Mul,
    /// Equality comparison, produces a `Bool` output.
    Eq,
    /// Unsigned less-than comparison, produces a `Bool` output.
    Lt,
    /// Selects between two operands based on a boolean selector (operand 0).
    Mux,
    /// Concatenates operands, most-significant operand first.
    Concat,
    /// Extracts `width` bits starting at `offset` from operand 0.
    Slice {
        /// Bit offset of the slice's least-significant bit.
        offset: usize,
        /// Width of the slice in bits.
        width: usize,
    },
    /// Passes its single operand through unchanged (width/type adapters).
    Rewire,
}

/// What a node *is* — the discriminant the back-end switches on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeKind {
    /// A combinational operation over its input ports.
    Logic(LogicOp),
    /// An external I/O pin.
    Pin {
        /// Data direction.
        direction: PinDirection,
        /// `true` if this pin exists only for testbench stimulus/assertions
        /// and must never appear in a synthesizable export.
        simulation_only: bool,
    },
    /// A named pass-through wire, used to carry a human-chosen name through
    /// the graph (`findNearestDesiredName` walks through these).
    Signal {
        /// The name the user gave this wire, if any.
        desired_name: Option<Ident>,
    },
    /// A clocked storage element.
    Register {
        /// The clock domain this register is sensitive to.
        clock: ClockId,
        /// The value driven into the register on reset, if any. `None`
        /// means the reset branch leaves the register unassigned.
        reset_value: Option<LogicVec>,
    },
    /// A memory array.
    Memory {
        /// Width of one memory word, in bits.
        word_width: usize,
        /// Number of addressable words.
        depth: usize,
    },
    /// A read or write port attached to a [`NodeKind::Memory`].
    MemoryPort {
        /// The memory node this port accesses.
        memory: NodeId,
        /// `true` for a write port, `false` for a read port.
        is_write: bool,
        /// The clock domain this port is synchronized to, if any
        /// (asynchronous read ports carry `None`).
        clock: Option<ClockId>,
    },
    /// An opaque external black-box instantiation (a library primitive or
    /// hand-written VHDL component the graph does not model further).
    External {
        /// The name of the external entity/component to instantiate.
        entity_name: Ident,
        /// Declared input port names, in order.
        input_names: Vec<Ident>,
        /// Declared output port names, in order.
        output_names: Vec<Ident>,
    },
    /// A compile-time constant driver.
    Const(LogicVec),
}

/// One node in the HLIM graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// The unique ID of this node.
    pub id: NodeId,
    /// What the node computes or represents.
    pub kind: NodeKind,
    /// The node group that owns this node.
    pub group: NodeGroupId,
    /// One slot per input port; `None` means unconnected (only legal for
    /// ports the node kind declares optional, e.g. a register with no
    /// explicit input yet during incremental construction upstream).
    pub inputs: Vec<Option<NodePort>>,
    /// The connection type of each output port, in order.
    pub output_types: Vec<ConnectionType>,
    /// The node's base name, used as a naming fallback when no signal node
    /// carries a more specific desired name.
    pub name: Option<Ident>,
    /// A free-form comment attached at graph-construction time, surfaced in
    /// VHDL comment banners where applicable.
    pub comment: Option<String>,
}

impl Node {
    /// `true` if this node is a register (clock-referencing, for the
    /// combinational-vs-clocked process decision).
    pub fn is_register(&self) -> bool {
        matches!(self.kind, NodeKind::Register { .. })
    }

    /// `true` if this node is a clocked memory port.
    pub fn is_clocked_memory_port(&self) -> bool {
        matches!(self.kind, NodeKind::MemoryPort { clock: Some(_), .. })
    }

    /// The clock this node is sensitive to, if any.
    pub fn clock(&self) -> Option<ClockId> {
        match &self.kind {
            NodeKind::Register { clock, .. } => Some(*clock),
            NodeKind::MemoryPort { clock, .. } => *clock,
            _ => None,
        }
    }
}
