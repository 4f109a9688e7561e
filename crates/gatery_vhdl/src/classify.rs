//! Signal classification: partitioning a grouping's edges into local,
//! input, and output signal sets.

use std::collections::{BTreeSet, HashSet};

use gatery_common::Ident;
use gatery_hlim::{Circuit, ClockId, LogicOp, NodeId, NodeKind, NodePort};

use crate::error::{VhdlError, VhdlResult};

/// The four disjoint signal sets plus clock/pin tracking produced by
/// classifying a set of owned nodes.
#[derive(Debug, Clone, Default)]
pub struct SignalSets {
    /// Signals produced and fully consumed within the owned node set.
    pub local: BTreeSet<NodePort>,
    /// Signals driven from outside the owned node set.
    pub inputs: BTreeSet<NodePort>,
    /// Signals produced inside the owned node set and consumed outside it.
    pub outputs: BTreeSet<NodePort>,
    /// I/O pin nodes found within the owned node set.
    pub io_pins: BTreeSet<NodeId>,
    /// Clocks referenced by any clock-sensitive node in the owned node set.
    pub input_clocks: BTreeSet<ClockId>,
}

impl SignalSets {
    /// Asserts the `local`/`inputs`/`outputs` sets are pairwise disjoint.
    pub fn verify_disjoint(&self) -> VhdlResult<()> {
        if !self.local.is_disjoint(&self.inputs) {
            return Err(VhdlError::design("local and input signal sets overlap"));
        }
        if !self.local.is_disjoint(&self.outputs) {
            return Err(VhdlError::design("local and output signal sets overlap"));
        }
        if !self.inputs.is_disjoint(&self.outputs) {
            return Err(VhdlError::design("input and output signal sets overlap"));
        }
        Ok(())
    }

    /// `true` if `port`'s producer lies outside the owned set (it would be
    /// classified as an input).
    pub fn is_produced_externally(&self, port: NodePort) -> bool {
        self.inputs.contains(&port)
    }

    /// `true` if `port` has at least one consumer outside the owned set
    /// (it would be classified as an output).
    pub fn is_consumed_externally(&self, port: NodePort) -> bool {
        self.outputs.contains(&port)
    }
}

/// Classifies every edge touching `owned` into local/input/output signals,
/// and collects clocks and I/O pins referenced within it.
///
/// `owned` is the caller-determined node set whose nodes are directly
/// processified or declared here — a grouping's own nodes, stopping at
/// instantiated sub-entities, or a transitively gathered set when folding an
/// area's entire sub-hierarchy into one process (`processifyNodes(...,
/// recursive=true)`).
///
/// `visible` is the wider set used only for the escape/driver test: it
/// additionally includes the nodes of any sub-entity instantiated directly
/// inside this grouping. A port consumed by, or driving from, a node inside
/// an instantiated child is wired through that child's port map, not
/// promoted to this grouping's own entity port — so it must not count as
/// escaping. `visible` is always a superset of `owned`.
pub fn classify_nodes(circuit: &Circuit, owned: &HashSet<NodeId>, visible: &HashSet<NodeId>) -> SignalSets {
    let mut sets = SignalSets::default();

    for &node_id in owned {
        let node = circuit.node(node_id);

        if matches!(node.kind, NodeKind::Pin { .. }) {
            // Pins are entity ports in their own right, declared and named
            // separately from regular signals; they never appear in the
            // local/input/output signal sets themselves.
            sets.io_pins.insert(node_id);
            continue;
        }
        if let Some(clock) = node.clock() {
            sets.input_clocks.insert(clock);
        }

        for input in node.inputs.iter().flatten() {
            if !visible.contains(&input.node) {
                sets.inputs.insert(*input);
            }
        }

        for port_idx in 0..node.output_types.len() as u32 {
            let producer = NodePort::new(node_id, port_idx);
            let escapes = circuit
                .consumers(producer)
                .iter()
                .any(|consumer| !visible.contains(&consumer.node));
            if escapes {
                sets.outputs.insert(producer);
            } else {
                sets.local.insert(producer);
            }
        }
    }

    sets
}

/// Walks the driver chain through named `Signal` nodes to find a
/// human-chosen name for `port`. Falls back to the producing node's base
/// name, and finally to `"unnamed"`.
pub fn find_nearest_desired_name(circuit: &Circuit, interner: &gatery_common::Interner, port: NodePort) -> String {
    let mut current = port;
    loop {
        let node = circuit.node(current.node);
        match &node.kind {
            NodeKind::Signal { desired_name: Some(name) } => return resolve(interner, *name),
            NodeKind::Signal { desired_name: None } | NodeKind::Logic(LogicOp::Rewire) => {
                match node.inputs.first().copied().flatten() {
                    Some(driver) => {
                        current = driver;
                        continue;
                    }
                    None => break,
                }
            }
            _ => break,
        }
    }

    let node = circuit.node(port.node);
    match node.name {
        Some(name) => resolve(interner, name),
        None => "unnamed".to_string(),
    }
}

fn resolve(interner: &gatery_common::Interner, ident: Ident) -> String {
    interner.resolve(ident).to_string()
}

/// The inferred direction of an I/O pin, from the perspective of the
/// grouping that owns `owned`: `Out` if something inside drives it, `In`
/// if something inside reads it, `InOut` if both.
pub fn pin_direction(circuit: &Circuit, pin: NodeId, owned: &HashSet<NodeId>) -> PinDirection {
    let node = circuit.node(pin);
    let driven_in = node.inputs.iter().flatten().any(|driver| owned.contains(&driver.node));
    let driven_out = circuit
        .consumers(NodePort::new(pin, 0))
        .iter()
        .any(|consumer| owned.contains(&consumer.node));
    match (driven_in, driven_out) {
        (true, true) => PinDirection::InOut,
        (true, false) => PinDirection::Out,
        (false, true) => PinDirection::In,
        (false, false) => PinDirection::In,
    }
}

/// The inferred port direction of an I/O pin, from the perspective of the
/// grouping that declares it: `In` if only driven inward, `Out` if only
/// driven outward, `InOut` if both.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinDirection {
    /// Driven into the circuit from the outside world.
    In,
    /// Driven out of the circuit to the outside world.
    Out,
    /// Driven both ways.
    InOut,
}
