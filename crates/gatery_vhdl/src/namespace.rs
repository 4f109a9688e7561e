//! The namespace scope tree: per-scope identifier allocation with
//! case-insensitive uniqueness and reserved-word avoidance.

use std::collections::{HashMap, HashSet};

use gatery_hlim::{ClockId, NodeId, NodePort};

use crate::error::{VhdlError, VhdlResult};
use crate::formatter::{CodeFormatter, SignalKind};

/// Opaque handle to one [`NamespaceScope`] held by a [`Namespaces`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

/// VHDL-93 reserved words the default formatter seeds every root scope with.
pub const RESERVED_WORDS: &[&str] = &[
    "ABS", "ACCESS", "AFTER", "ALIAS", "ALL", "AND", "ARCHITECTURE", "ARRAY", "ASSERT",
    "ATTRIBUTE", "BEGIN", "BLOCK", "BODY", "BUFFER", "BUS", "CASE", "COMPONENT", "CONFIGURATION",
    "CONSTANT", "DISCONNECT", "DOWNTO", "ELSE", "ELSIF", "END", "ENTITY", "EXIT", "FILE", "FOR",
    "FUNCTION", "GENERATE", "GENERIC", "GROUP", "GUARDED", "IF", "IMPURE", "IN", "INERTIAL",
    "INOUT", "IS", "LABEL", "LIBRARY", "LINKAGE", "LITERAL", "LOOP", "MAP", "MOD", "NAND", "NEW",
    "NEXT", "NOR", "NOT", "NULL", "OF", "ON", "OPEN", "OR", "OTHERS", "OUT", "PACKAGE", "PORT",
    "POSTPONED", "PROCEDURE", "PROCESS", "PURE", "RANGE", "RECORD", "REGISTER", "REM", "REPORT",
    "RETURN", "ROL", "ROR", "SELECT", "SEVERITY", "SHARED", "SIGNAL", "SLA", "SLL", "SRA", "SRL",
    "SUBTYPE", "THEN", "TO", "TRANSPORT", "TYPE", "UNAFFECTED", "UNITS", "UNTIL", "USE",
    "VARIABLE", "WAIT", "WHEN", "WHILE", "WITH", "XNOR", "XOR",
];

#[derive(Debug, Default)]
struct NamespaceScope {
    parent: Option<ScopeId>,
    names_in_use: HashSet<String>,
    node_port_names: HashMap<NodePort, String>,
    clock_names: HashMap<ClockId, String>,
    reset_names: HashMap<ClockId, String>,
    pin_names: HashMap<NodeId, String>,
    storage_names: HashMap<NodeId, String>,
}

/// Owns every [`NamespaceScope`] created during AST construction, arena-style
/// so scopes can hold plain index back-pointers to their parent instead of
/// owning references.
#[derive(Debug, Default)]
pub struct Namespaces {
    scopes: Vec<NamespaceScope>,
}

impl Namespaces {
    /// Creates the namespace arena with a single root scope seeded with the
    /// target language's reserved words.
    pub fn new() -> (Self, ScopeId) {
        let mut namespaces = Namespaces { scopes: Vec::new() };
        let root = namespaces.push_scope(None);
        for word in RESERVED_WORDS {
            namespaces.scope_mut(root).names_in_use.insert(word.to_uppercase());
        }
        (namespaces, root)
    }

    /// Creates a new child scope under `parent`.
    pub fn new_child(&mut self, parent: ScopeId) -> ScopeId {
        self.push_scope(Some(parent))
    }

    fn push_scope(&mut self, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(NamespaceScope {
            parent,
            ..Default::default()
        });
        id
    }

    fn scope(&self, id: ScopeId) -> &NamespaceScope {
        &self.scopes[id.0 as usize]
    }

    fn scope_mut(&mut self, id: ScopeId) -> &mut NamespaceScope {
        &mut self.scopes[id.0 as usize]
    }

    fn is_name_in_use(&self, scope: ScopeId, upper: &str) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            if self.scope(id).names_in_use.contains(upper) {
                return true;
            }
            current = self.scope(id).parent;
        }
        false
    }

    fn allocate_candidate(&mut self, scope: ScopeId, candidate: impl Fn(u32) -> String) -> String {
        let mut attempt = 0;
        loop {
            let name = candidate(attempt);
            let upper = name.to_uppercase();
            if !self.is_name_in_use(scope, &upper) {
                self.scope_mut(scope).names_in_use.insert(upper);
                return name;
            }
            attempt += 1;
        }
    }

    /// Allocates a name for a node port, recording it for later lookup by
    /// [`Namespaces::get_node_port_name`].
    ///
    /// # Panics
    ///
    /// Panics if `port` was already allocated in this exact scope.
    pub fn allocate_node_port_name(
        &mut self,
        scope: ScopeId,
        formatter: &dyn CodeFormatter,
        port: NodePort,
        desired_name: &str,
        kind: SignalKind,
    ) -> String {
        assert!(
            !self.scope(scope).node_port_names.contains_key(&port),
            "node port allocated twice in the same scope"
        );
        let name = self.allocate_candidate(scope, |attempt| formatter.signal_name(desired_name, kind, attempt));
        self.scope_mut(scope).node_port_names.insert(port, name.clone());
        name
    }

    /// Allocates a name for an internal storage signal not tied to a node
    /// port (e.g. a process-local variable).
    pub fn allocate_storage_name(
        &mut self,
        scope: ScopeId,
        formatter: &dyn CodeFormatter,
        node: NodeId,
        desired_name: &str,
        kind: SignalKind,
    ) -> String {
        assert!(
            !self.scope(scope).storage_names.contains_key(&node),
            "storage signal allocated twice in the same scope"
        );
        let name = self.allocate_candidate(scope, |attempt| formatter.signal_name(desired_name, kind, attempt));
        self.scope_mut(scope).storage_names.insert(node, name.clone());
        name
    }

    /// Allocates a clock name.
    pub fn allocate_clock_name(
        &mut self,
        scope: ScopeId,
        formatter: &dyn CodeFormatter,
        clock: ClockId,
        desired_name: &str,
    ) -> String {
        assert!(
            !self.scope(scope).clock_names.contains_key(&clock),
            "clock allocated twice in the same scope"
        );
        let name = self.allocate_candidate(scope, |attempt| formatter.clock_name(desired_name, attempt));
        self.scope_mut(scope).clock_names.insert(clock, name.clone());
        name
    }

    /// Allocates a clock's reset signal name.
    pub fn allocate_reset_name(
        &mut self,
        scope: ScopeId,
        formatter: &dyn CodeFormatter,
        clock: ClockId,
        desired_name: &str,
    ) -> String {
        assert!(
            !self.scope(scope).reset_names.contains_key(&clock),
            "reset signal allocated twice in the same scope"
        );
        let name = self.allocate_candidate(scope, |attempt| formatter.clock_name(desired_name, attempt));
        self.scope_mut(scope).reset_names.insert(clock, name.clone());
        name
    }

    /// Looks up a clock's allocated reset signal name.
    pub fn get_reset_name(&self, scope: ScopeId, clock: ClockId) -> VhdlResult<&str> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(name) = self.scope(id).reset_names.get(&clock) {
                return Ok(name);
            }
            current = self.scope(id).parent;
        }
        Err(VhdlError::lookup(format!("no reset name allocated for clock {clock:?}")))
    }

    /// Allocates an I/O pin name.
    pub fn allocate_pin_name(
        &mut self,
        scope: ScopeId,
        formatter: &dyn CodeFormatter,
        pin: NodeId,
        desired_name: &str,
    ) -> String {
        assert!(
            !self.scope(scope).pin_names.contains_key(&pin),
            "pin allocated twice in the same scope"
        );
        let name = self.allocate_candidate(scope, |attempt| formatter.io_pin_name(desired_name, attempt));
        self.scope_mut(scope).pin_names.insert(pin, name.clone());
        name
    }

    /// Allocates an opaque package name (no back-lookup mapping is kept).
    pub fn allocate_package_name(&mut self, scope: ScopeId, formatter: &dyn CodeFormatter, desired_name: &str) -> String {
        self.allocate_candidate(scope, |attempt| formatter.package_name(desired_name, attempt))
    }

    /// Allocates an opaque entity name.
    pub fn allocate_entity_name(&mut self, scope: ScopeId, formatter: &dyn CodeFormatter, desired_name: &str) -> String {
        self.allocate_candidate(scope, |attempt| formatter.entity_name(desired_name, attempt))
    }

    /// Allocates an opaque block name.
    pub fn allocate_block_name(&mut self, scope: ScopeId, formatter: &dyn CodeFormatter, desired_name: &str) -> String {
        self.allocate_candidate(scope, |attempt| formatter.block_name(desired_name, attempt))
    }

    /// Allocates an opaque process name.
    pub fn allocate_process_name(
        &mut self,
        scope: ScopeId,
        formatter: &dyn CodeFormatter,
        desired_name: &str,
        clocked: bool,
    ) -> String {
        self.allocate_candidate(scope, |attempt| formatter.process_name(desired_name, clocked, attempt))
    }

    /// Allocates an opaque instance name.
    pub fn allocate_instance_name(&mut self, scope: ScopeId, formatter: &dyn CodeFormatter, desired_name: &str) -> String {
        self.allocate_candidate(scope, |attempt| formatter.instance_name(desired_name, attempt))
    }

    /// Looks up a node port's allocated name, walking the scope chain.
    pub fn get_node_port_name(&self, scope: ScopeId, port: NodePort) -> VhdlResult<&str> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(name) = self.scope(id).node_port_names.get(&port) {
                return Ok(name);
            }
            current = self.scope(id).parent;
        }
        Err(VhdlError::lookup(format!("no name allocated for node port {port:?}")))
    }

    /// Looks up an internal storage signal's allocated name.
    pub fn get_storage_name(&self, scope: ScopeId, node: NodeId) -> VhdlResult<&str> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(name) = self.scope(id).storage_names.get(&node) {
                return Ok(name);
            }
            current = self.scope(id).parent;
        }
        Err(VhdlError::lookup(format!("no name allocated for storage signal {node:?}")))
    }

    /// Looks up a clock's allocated name.
    pub fn get_clock_name(&self, scope: ScopeId, clock: ClockId) -> VhdlResult<&str> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(name) = self.scope(id).clock_names.get(&clock) {
                return Ok(name);
            }
            current = self.scope(id).parent;
        }
        Err(VhdlError::lookup(format!("no name allocated for clock {clock:?}")))
    }

    /// Looks up an I/O pin's allocated name.
    pub fn get_pin_name(&self, scope: ScopeId, pin: NodeId) -> VhdlResult<&str> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(name) = self.scope(id).pin_names.get(&pin) {
                return Ok(name);
            }
            current = self.scope(id).parent;
        }
        Err(VhdlError::lookup(format!("no name allocated for pin {pin:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::DefaultCodeFormatting;
    use gatery_hlim::NodeId;

    #[test]
    fn collision_gets_suffixed() {
        let (mut ns, root) = Namespaces::new();
        let f = DefaultCodeFormatting::new();
        let a = ns.allocate_node_port_name(
            root,
            &f,
            NodePort::new(NodeId::from_raw(0), 0),
            "x",
            SignalKind::LocalSignal,
        );
        let b = ns.allocate_node_port_name(
            root,
            &f,
            NodePort::new(NodeId::from_raw(1), 0),
            "x",
            SignalKind::LocalSignal,
        );
        assert_eq!(a, "s_x");
        assert_eq!(b, "s_x_2");
    }

    #[test]
    fn case_insensitive_collision() {
        let (mut ns, root) = Namespaces::new();
        let f = DefaultCodeFormatting::new();
        ns.allocate_clock_name(root, &f, ClockId::from_raw(0), "CLK");
        let second = ns.allocate_clock_name(root, &f, ClockId::from_raw(1), "clk");
        assert_eq!(second, "clk_2");
    }

    #[test]
    fn reserved_word_is_avoided() {
        let (mut ns, root) = Namespaces::new();
        let f = DefaultCodeFormatting::new();
        let name = ns.allocate_entity_name(root, &f, "process");
        assert_eq!(name, "process_2");
    }

    #[test]
    fn child_scope_sees_parent_reservations() {
        let (mut ns, root) = Namespaces::new();
        let child = ns.new_child(root);
        let f = DefaultCodeFormatting::new();
        ns.allocate_entity_name(root, &f, "top");
        let name = ns.allocate_block_name(child, &f, "top");
        assert_eq!(name, "top_2");
    }

    #[test]
    fn sibling_scopes_do_not_collide() {
        let (mut ns, root) = Namespaces::new();
        let child_a = ns.new_child(root);
        let child_b = ns.new_child(root);
        let f = DefaultCodeFormatting::new();
        let a = ns.allocate_block_name(child_a, &f, "b");
        let b = ns.allocate_block_name(child_b, &f, "b");
        assert_eq!(a, "b");
        assert_eq!(b, "b");
    }

    #[test]
    fn allocate_then_lookup_round_trips() {
        let (mut ns, root) = Namespaces::new();
        let f = DefaultCodeFormatting::new();
        let port = NodePort::new(NodeId::from_raw(5), 0);
        let allocated = ns.allocate_node_port_name(root, &f, port, "foo", SignalKind::EntityOutput);
        let looked_up = ns.get_node_port_name(root, port).unwrap();
        assert_eq!(allocated, looked_up);
    }

    #[test]
    fn lookup_failure_is_fatal() {
        let (ns, root) = Namespaces::new();
        let err = ns.get_node_port_name(root, NodePort::new(NodeId::from_raw(0), 0));
        assert!(err.is_err());
    }

    #[test]
    #[should_panic(expected = "allocated twice")]
    fn duplicate_allocation_panics() {
        let (mut ns, root) = Namespaces::new();
        let f = DefaultCodeFormatting::new();
        let port = NodePort::new(NodeId::from_raw(0), 0);
        ns.allocate_node_port_name(root, &f, port, "x", SignalKind::LocalSignal);
        ns.allocate_node_port_name(root, &f, port, "x", SignalKind::LocalSignal);
    }
}
