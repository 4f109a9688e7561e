//! Process building: bucketing nodes into combinational and clocked
//! processes, and formatting their bodies as VHDL expressions.

use std::collections::HashMap;

use gatery_common::{Interner, LogicVec};
use gatery_hlim::{Circuit, ClockId, LogicOp, NodeId, NodeKind, NodePort, ResetType};

use crate::error::{VhdlError, VhdlResult};

/// The clock/reset configuration of a clocked process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterConfig {
    /// The clock this process is sensitive to.
    pub clock: ClockId,
    /// `true` if the clock's reset policy carries a reset signal.
    pub has_reset_signal: bool,
}

/// Whether a process is combinational or clocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessKind {
    /// Sensitive to every signal the classifier found as an input.
    Combinational,
    /// Sensitive only to `(clock, reset?)`.
    Clocked(RegisterConfig),
}

/// A single assignment emitted inside a process body: `target <= expr;`.
#[derive(Debug, Clone)]
pub struct Assignment {
    /// The local signal (or register output) being assigned.
    pub target: NodePort,
    /// The formatted right-hand-side expression.
    pub expression: String,
    /// `true` if this assignment belongs to the reset branch of a clocked
    /// process rather than the normal-operation branch.
    pub is_reset_branch: bool,
}

/// A built process: a name, a kind, and the assignments its body contains.
#[derive(Debug, Clone)]
pub struct Process {
    /// The allocated process name.
    pub name: String,
    /// Combinational or clocked, with register configuration if clocked.
    pub kind: ProcessKind,
    /// Nodes folded into this process (for bookkeeping/diagnostics).
    pub nodes: Vec<NodeId>,
    /// The assignments forming the process body, in emission order.
    pub assignments: Vec<Assignment>,
}

/// The rendering context an expression is formatted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprContext {
    /// A VHDL `boolean` expression (`true`/`false`), used in `if` conditions.
    Bool,
    /// A single-bit `STD_LOGIC` expression (`'1'`/`'0'`).
    StdLogic,
    /// A `STD_LOGIC_VECTOR`/`UNSIGNED` expression.
    Vector,
}

/// Resolves a node port to an already-declared signal name, or `None` if it
/// has not been named yet and must be inlined as an expression.
pub trait DeclaredBoundary {
    /// Returns the declared name for `port`, if any.
    fn resolve(&self, port: NodePort) -> Option<String>;
}

impl DeclaredBoundary for HashMap<NodePort, String> {
    fn resolve(&self, port: NodePort) -> Option<String> {
        self.get(&port).cloned()
    }
}

/// Decides whether a node set should become a clocked or combinational
/// process, per the first clock/register-referencing node found.
pub fn register_config_for(circuit: &Circuit, nodes: &[NodeId]) -> Option<RegisterConfig> {
    for &id in nodes {
        if let Some(clock_id) = circuit.node(id).clock() {
            let clock = circuit.clock(clock_id);
            return Some(RegisterConfig {
                clock: clock_id,
                has_reset_signal: clock.reset_type.has_reset_signal(),
            });
        }
    }
    None
}

/// Renders the literal for a constant value under the given context.
pub(crate) fn format_literal(value: &LogicVec, ctx: ExprContext) -> String {
    match ctx {
        ExprContext::Bool => {
            if value.is_all_one() {
                "true".to_string()
            } else {
                "false".to_string()
            }
        }
        ExprContext::StdLogic => {
            if value.is_all_one() {
                "'1'".to_string()
            } else {
                "'0'".to_string()
            }
        }
        ExprContext::Vector => format!("\"{value}\""),
    }
}

/// Formats `port` as a VHDL expression in the given context, recursing into
/// drivers until it reaches a leaf already resolvable via `boundary`.
///
/// Expression unfolding always terminates: a register output, entity port,
/// or any other already-declared signal is a leaf regardless of how deep
/// the recursion has gone, which is what makes formatting safe over a
/// cyclic HLIM graph (registers are the declared boundary that breaks the
/// cycle).
pub fn format_expression(
    circuit: &Circuit,
    port: NodePort,
    ctx: ExprContext,
    boundary: &dyn DeclaredBoundary,
) -> VhdlResult<String> {
    if let Some(name) = boundary.resolve(port) {
        return Ok(name);
    }
    format_node_expression(circuit, port, ctx, boundary)
}

/// Formats the expression a node's own output *computes*, bypassing the
/// `boundary` lookup for `port` itself (used to render the right-hand side
/// of an assignment to a signal that `boundary` already declares — looking
/// `port` up there first would just return the signal's own name).
pub fn format_node_expression(
    circuit: &Circuit,
    port: NodePort,
    ctx: ExprContext,
    boundary: &dyn DeclaredBoundary,
) -> VhdlResult<String> {
    let node = circuit.node(port.node);
    match &node.kind {
        NodeKind::Const(value) => Ok(format_literal(value, ctx)),
        NodeKind::Signal { .. } | NodeKind::Logic(LogicOp::Rewire) => match node.inputs.first().copied().flatten() {
            Some(driver) => format_expression(circuit, driver, ctx, boundary),
            None => Err(VhdlError::lookup("signal node has no driver and no declared name")),
        },
        NodeKind::Logic(op) => format_logic_expression(circuit, node, *op, ctx, boundary),
        NodeKind::Pin { .. } => Err(VhdlError::lookup(format!("pin {:?} has no declared signal name", port))),
        NodeKind::Register { .. } => Err(VhdlError::lookup(format!("register output {port:?} has no declared signal name"))),
        NodeKind::Memory { .. } | NodeKind::MemoryPort { .. } | NodeKind::External { .. } => {
            Err(VhdlError::unsupported(format!("{:?} cannot be inlined as an expression", node.kind)))
        }
    }
}

fn operand(
    circuit: &Circuit,
    node: &gatery_hlim::Node,
    index: usize,
    ctx: ExprContext,
    boundary: &dyn DeclaredBoundary,
) -> VhdlResult<String> {
    let driver = node
        .inputs
        .get(index)
        .copied()
        .flatten()
        .ok_or_else(|| VhdlError::design(format!("operand {index} missing on node {:?}", node.id)))?;
    format_expression(circuit, driver, ctx, boundary)
}

fn format_logic_expression(
    circuit: &Circuit,
    node: &gatery_hlim::Node,
    op: LogicOp,
    ctx: ExprContext,
    boundary: &dyn DeclaredBoundary,
) -> VhdlResult<String> {
    match op {
        LogicOp::And => Ok(format!(
            "({} and {})",
            operand(circuit, node, 0, ctx, boundary)?,
            operand(circuit, node, 1, ctx, boundary)?
        )),
        LogicOp::Or => Ok(format!(
            "({} or {})",
            operand(circuit, node, 0, ctx, boundary)?,
            operand(circuit, node, 1, ctx, boundary)?
        )),
        LogicOp::Xor => Ok(format!(
            "({} xor {})",
            operand(circuit, node, 0, ctx, boundary)?,
            operand(circuit, node, 1, ctx, boundary)?
        )),
        LogicOp::Not => Ok(format!("(not {})", operand(circuit, node, 0, ctx, boundary)?)),
        LogicOp::Add => Ok(format!(
            "({} + {})",
            operand(circuit, node, 0, ExprContext::Vector, boundary)?,
            operand(circuit, node, 1, ExprContext::Vector, boundary)?
        )),
        LogicOp::Sub => Ok(format!(
            "({} - {})",
            operand(circuit, node, 0, ExprContext::Vector, boundary)?,
            operand(circuit, node, 1, ExprContext::Vector, boundary)?
        )),
        LogicOp::Mul => Ok(format!(
            "({} * {})",
            operand(circuit, node, 0, ExprContext::Vector, boundary)?,
            operand(circuit, node, 1, ExprContext::Vector, boundary)?
        )),
        LogicOp::Eq => Ok(format!(
            "({} = {})",
            operand(circuit, node, 0, ExprContext::Vector, boundary)?,
            operand(circuit, node, 1, ExprContext::Vector, boundary)?
        )),
        LogicOp::Lt => Ok(format!(
            "({} < {})",
            operand(circuit, node, 0, ExprContext::Vector, boundary)?,
            operand(circuit, node, 1, ExprContext::Vector, boundary)?
        )),
        LogicOp::Mux => Ok(format!(
            "({} when {} = '1' else {})",
            operand(circuit, node, 1, ctx, boundary)?,
            operand(circuit, node, 0, ExprContext::StdLogic, boundary)?,
            operand(circuit, node, 2, ctx, boundary)?
        )),
        LogicOp::Concat => {
            let mut parts = Vec::new();
            for i in 0..node.inputs.len() {
                parts.push(operand(circuit, node, i, ExprContext::Vector, boundary)?);
            }
            Ok(format!("({})", parts.join(" & ")))
        }
        LogicOp::Slice { offset, width } => {
            let inner = operand(circuit, node, 0, ExprContext::Vector, boundary)?;
            Ok(format!("{inner}({} downto {offset})", offset + width - 1))
        }
        LogicOp::Rewire => unreachable!("handled before dispatch"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatery_hlim::arena::Arena;
    use gatery_hlim::group::{Attributes, GroupKind, NodeGroup};
    use gatery_hlim::{Clock, ConnectionType, Node, NodeGroupId};

    fn bool_node(id_hint: u32, kind: NodeKind, inputs: Vec<Option<NodePort>>) -> Node {
        Node {
            id: NodeId::from_raw(id_hint),
            kind,
            group: NodeGroupId::from_raw(0),
            inputs,
            output_types: vec![ConnectionType::Bool],
            name: None,
            comment: None,
        }
    }

    fn trivial_circuit(nodes: Arena<NodeId, Node>, clocks: Arena<ClockId, Clock>) -> Circuit {
        let interner = Interner::new();
        let mut groups: Arena<NodeGroupId, NodeGroup> = Arena::new();
        let root = groups.alloc(NodeGroup {
            id: NodeGroupId::from_raw(0),
            name: interner.get_or_intern("top"),
            comment: None,
            kind: GroupKind::Entity,
            parent: None,
            children: Vec::new(),
            nodes: Vec::new(),
            attributes: Attributes::default(),
            partition: false,
            partition_as_component: false,
        });
        Circuit::new(nodes, groups, clocks, root)
    }

    #[test]
    fn and_of_two_declared_signals() {
        let mut nodes = Arena::new();
        let a = nodes.alloc(bool_node(0, NodeKind::Const(LogicVec::all_one(1)), Vec::new()));
        let b = nodes.alloc(bool_node(0, NodeKind::Const(LogicVec::all_zero(1)), Vec::new()));
        let and_node = nodes.alloc(bool_node(
            0,
            NodeKind::Logic(LogicOp::And),
            vec![Some(NodePort::new(a, 0)), Some(NodePort::new(b, 0))],
        ));
        let circuit = trivial_circuit(nodes, Arena::new());
        let boundary: HashMap<NodePort, String> = HashMap::new();
        let expr = format_expression(&circuit, NodePort::new(and_node, 0), ExprContext::StdLogic, &boundary).unwrap();
        assert_eq!(expr, "('1' and '0')");
    }

    #[test]
    fn leaf_stops_at_declared_boundary() {
        let mut nodes = Arena::new();
        let reg = nodes.alloc(bool_node(
            0,
            NodeKind::Register {
                clock: ClockId::from_raw(0),
                reset_value: None,
            },
            vec![None],
        ));
        let circuit = trivial_circuit(nodes, Arena::new());
        let mut boundary = HashMap::new();
        boundary.insert(NodePort::new(reg, 0), "r_out_x".to_string());
        let expr = format_expression(&circuit, NodePort::new(reg, 0), ExprContext::StdLogic, &boundary).unwrap();
        assert_eq!(expr, "r_out_x");
    }

    #[test]
    fn unregistered_register_output_is_a_lookup_error() {
        let mut nodes = Arena::new();
        let reg = nodes.alloc(bool_node(
            0,
            NodeKind::Register {
                clock: ClockId::from_raw(0),
                reset_value: None,
            },
            vec![None],
        ));
        let circuit = trivial_circuit(nodes, Arena::new());
        let boundary: HashMap<NodePort, String> = HashMap::new();
        let err = format_expression(&circuit, NodePort::new(reg, 0), ExprContext::StdLogic, &boundary);
        assert!(matches!(err, Err(VhdlError::Lookup(_))));
    }

    #[test]
    fn register_makes_process_clocked() {
        let mut nodes = Arena::new();
        let reg = nodes.alloc(bool_node(
            0,
            NodeKind::Register {
                clock: ClockId::from_raw(0),
                reset_value: None,
            },
            vec![None],
        ));
        let interner = Interner::new();
        let mut clocks = Arena::new();
        clocks.alloc(Clock {
            id: ClockId::from_raw(0),
            name: interner.get_or_intern("clk"),
            frequency: gatery_common::Frequency::new(1.0e8),
            reset_type: ResetType::Asynchronous,
            reset_name: None,
        });
        let circuit = trivial_circuit(nodes, clocks);
        let config = register_config_for(&circuit, &[reg]).unwrap();
        assert_eq!(config.clock, ClockId::from_raw(0));
        assert!(config.has_reset_signal);
    }

    #[test]
    fn no_clock_nodes_means_combinational() {
        let mut nodes = Arena::new();
        let c = nodes.alloc(bool_node(0, NodeKind::Const(LogicVec::all_zero(1)), Vec::new()));
        let circuit = trivial_circuit(nodes, Arena::new());
        assert!(register_config_for(&circuit, &[c]).is_none());
    }

    #[test]
    fn slice_renders_downto_range() {
        let mut nodes = Arena::new();
        let v = nodes.alloc(Node {
            id: NodeId::from_raw(0),
            kind: NodeKind::Const(LogicVec::from_u64(0xAB, 8)),
            group: NodeGroupId::from_raw(0),
            inputs: Vec::new(),
            output_types: vec![ConnectionType::BitVec { width: 8 }],
            name: None,
            comment: None,
        });
        let slice = nodes.alloc(Node {
            id: NodeId::from_raw(0),
            kind: NodeKind::Logic(LogicOp::Slice { offset: 2, width: 4 }),
            group: NodeGroupId::from_raw(0),
            inputs: vec![Some(NodePort::new(v, 0))],
            output_types: vec![ConnectionType::BitVec { width: 4 }],
            name: None,
            comment: None,
        });
        let circuit = trivial_circuit(nodes, Arena::new());
        let boundary: HashMap<NodePort, String> = HashMap::new();
        let expr = format_expression(&circuit, NodePort::new(slice, 0), ExprContext::Vector, &boundary).unwrap();
        assert!(expr.ends_with("(5 downto 2)"));
    }
}
