//! The AST root and writer: runs the entity/block builder over the
//! whole circuit, allocates every name the builder leaves unallocated, and
//! drives the three `writeVHDL` output modes.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use gatery_common::Interner;
use gatery_hlim::{Circuit, ClockId, ConnectionType, NodeId, NodeKind, NodePort, ResetType};

use crate::classify::{find_nearest_desired_name, pin_direction, PinDirection};
use crate::error::{VhdlError, VhdlResult};
use crate::formatter::{CodeFormatter, SignalKind};
use crate::grouping::{self, collect_owned_nodes, ConcurrentStmtKind, Entity, Grouping};
use crate::namespace::{Namespaces, ScopeId};
use crate::package::Package;
use crate::process::{format_expression, format_literal, format_node_expression, DeclaredBoundary, ExprContext, Process, ProcessKind};

/// How `write_vhdl` lays entities and packages out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Every package and entity concatenated into one file.
    SingleFile,
    /// One file per package/entity, named `<identifier><extension>`.
    FilePerEntity,
    /// Partitioned entities get their own file; everything else inlines into
    /// its nearest partitioned ancestor's file (the root counts as one).
    FilePerPartition,
}

/// An external node's entity/port names, resolved once while the interner
/// was still in scope so rendering never needs one.
#[derive(Debug, Clone)]
struct ExternalInfo {
    entity_name: String,
    input_names: Vec<String>,
    output_names: Vec<String>,
}

/// The AST root: owns every entity and package built from one circuit, and
/// the namespace arena that named them. Holds no [`Interner`] — every
/// identifier needing one was resolved to a plain `String` in [`Ast::convert`].
pub struct Ast {
    circuit: Circuit,
    entities: Vec<Entity>,
    packages: Vec<Package>,
    namespaces: Namespaces,
    root_scope: ScopeId,
    formatter: Box<dyn CodeFormatter>,
    clock_names: HashMap<ClockId, String>,
    reset_names: HashMap<ClockId, String>,
    external_info: HashMap<NodeId, ExternalInfo>,
}

impl Ast {
    /// Builds the full AST from `circuit`'s root node group: the entity
    /// tree, every port/signal/pin/clock/reset name, and the fixed helper
    /// package.
    pub fn convert(circuit: &Circuit, interner: &Interner, formatter: Box<dyn CodeFormatter>) -> VhdlResult<Self> {
        let (mut namespaces, root_scope) = Namespaces::new();

        let mut entities = Vec::new();
        let root_index = grouping::build_entity(
            circuit,
            interner,
            formatter.as_ref(),
            &mut namespaces,
            root_scope,
            &mut entities,
            None,
            circuit.root_group(),
        )?;
        debug_assert_eq!(root_index, 0, "the root entity must be built first and occupy index 0");

        for entity in &mut entities {
            allocate_grouping_names(&mut entity.grouping, circuit, interner, formatter.as_ref(), &mut namespaces);
        }

        let mut clock_names = HashMap::new();
        let mut reset_names = HashMap::new();
        for (clock_id, clock) in circuit.clocks() {
            let desired = interner.resolve(clock.name).to_string();
            let name = namespaces.allocate_clock_name(root_scope, formatter.as_ref(), clock_id, &desired);
            clock_names.insert(clock_id, name);

            if clock.reset_type.has_reset_signal() {
                let reset_desired = match clock.reset_name {
                    Some(ident) => interner.resolve(ident).to_string(),
                    None => format!("{desired}_reset"),
                };
                let reset_name = namespaces.allocate_reset_name(root_scope, formatter.as_ref(), clock_id, &reset_desired);
                reset_names.insert(clock_id, reset_name);
            }
        }

        let mut external_info = HashMap::new();
        for (node_id, node) in circuit.nodes() {
            if let NodeKind::External {
                entity_name,
                input_names,
                output_names,
            } = &node.kind
            {
                external_info.insert(
                    node_id,
                    ExternalInfo {
                        entity_name: interner.resolve(*entity_name).to_string(),
                        input_names: input_names.iter().map(|n| interner.resolve(*n).to_string()).collect(),
                        output_names: output_names.iter().map(|n| interner.resolve(*n).to_string()).collect(),
                    },
                );
            }
        }

        let helper = crate::package::HelperPackage::build(&mut namespaces, root_scope, formatter.as_ref());
        let packages = vec![Package::Helper(helper)];

        Ok(Self {
            circuit: circuit.clone(),
            entities,
            packages,
            namespaces,
            root_scope,
            formatter,
            clock_names,
            reset_names,
            external_info,
        })
    }

    /// The root entity's index (always `0`).
    pub fn root_index(&self) -> usize {
        0
    }

    /// Appends a user-supplied package (e.g. an [`crate::package::InterfacePackage`]).
    pub fn push_package(&mut self, package: Package) {
        self.packages.push(package);
    }

    /// The namespace scope every package/clock/reset name was allocated
    /// against, for callers building additional packages.
    pub fn root_scope(&self) -> ScopeId {
        self.root_scope
    }

    /// Mutable access to the namespace arena, for callers allocating names
    /// that must not collide with anything this AST already named.
    pub fn namespaces_mut(&mut self) -> &mut Namespaces {
        &mut self.namespaces
    }

    /// Read-only access to the namespace arena, for callers resolving
    /// already-allocated clock, reset, pin, or signal names (e.g. a
    /// testbench recorder reusing the design's own signal names).
    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    /// The circuit this AST was built from.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// The root entity's grouping: its namespace scope, I/O pins, and
    /// referenced clocks, for callers that need the design's outermost
    /// interface (e.g. a testbench wrapping `entity work.<root>(impl)`).
    pub fn root_entity(&self) -> &Entity {
        &self.entities[self.root_index()]
    }

    /// The allocated name of a clock, resolved once at AST build time.
    pub fn clock_name(&self, clock: ClockId) -> VhdlResult<&str> {
        self.clock_names
            .get(&clock)
            .map(String::as_str)
            .ok_or_else(|| VhdlError::lookup(format!("clock {clock:?} has no allocated name")))
    }

    /// The allocated name of a clock's reset signal, if it has one.
    pub fn reset_name(&self, clock: ClockId) -> Option<&str> {
        self.reset_names.get(&clock).map(String::as_str)
    }

    /// The code formatter this AST was built with.
    pub fn formatter(&self) -> &dyn CodeFormatter {
        self.formatter.as_ref()
    }

    /// Every entity in the AST, in build order (index 0 is always the
    /// root). Lets callers outside this crate (e.g. the synthesis-tool
    /// adapter, resolving a path attribute's declaration scope) walk the
    /// entity tree without reimplementing `build_entity`'s traversal.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// The entity whose source HLIM group is `group`, if any. Entities are
    /// built one per [`gatery_hlim::GroupKind::Entity`]/`Sfu` node group, so
    /// this is a linear scan rather than a reverse index — fine for the
    /// shallow entity trees this back-end targets.
    pub fn entity_for_group(&self, group: gatery_hlim::NodeGroupId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.grouping.source_group == group)
    }

    /// Every package in the AST, in the order they render and write to
    /// disk (helper package first, then any pushed via [`Ast::push_package`]).
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    fn collect_sub_entity_indices(grouping: &Grouping, out: &mut Vec<usize>) {
        for stmt in &grouping.statements {
            match &stmt.kind {
                ConcurrentStmtKind::EntityInstantiation { entity_index, .. } => out.push(*entity_index),
                ConcurrentStmtKind::Block(block) => Self::collect_sub_entity_indices(block, out),
                _ => {}
            }
        }
    }

    fn postorder_visit(&self, index: usize, visited: &mut [bool], order: &mut Vec<usize>) {
        if visited[index] {
            return;
        }
        visited[index] = true;
        let mut callees = Vec::new();
        Self::collect_sub_entity_indices(&self.entities[index].grouping, &mut callees);
        for callee in callees {
            self.postorder_visit(callee, visited, order);
        }
        order.push(index);
    }

    /// Entities in dependency order: callees before callers, root last.
    pub fn dependency_order(&self) -> Vec<usize> {
        let mut visited = vec![false; self.entities.len()];
        let mut order = Vec::with_capacity(self.entities.len());
        self.postorder_visit(self.root_index(), &mut visited, &mut order);
        order
    }

    fn partition_owner(&self, mut index: usize) -> usize {
        loop {
            if self.entities[index].is_partition || self.entities[index].parent.is_none() {
                return index;
            }
            index = self.entities[index].parent.expect("loop guarded by parent.is_none() above");
        }
    }

    /// Renders every package and, in dependency order, every entity into one
    /// string (the single-file mode's content).
    pub fn render_single_file(&self) -> VhdlResult<String> {
        let mut out = String::new();
        out.push_str(self.formatter.file_header());
        out.push('\n');
        out.push_str("LIBRARY ieee;\nUSE ieee.std_logic_1164.ALL;\nUSE ieee.numeric_std.all;\n");
        for package in &self.packages {
            let _ = writeln!(out, "USE work.{}.all;", package.name());
        }
        out.push('\n');
        for package in &self.packages {
            out.push_str(&package.render(self.formatter.as_ref()));
            out.push('\n');
        }
        for index in self.dependency_order() {
            out.push_str(&self.render_entity(index)?);
            out.push('\n');
        }
        Ok(out)
    }

    /// Writes VHDL to `destination` under the given mode, using
    /// rewrite-if-changed semantics: a file is only touched if its rendered
    /// bytes differ from what is already on disk.
    pub fn write_vhdl(&self, destination: &Path, mode: WriteMode) -> VhdlResult<()> {
        fs::create_dir_all(destination).map_err(|e| VhdlError::io(destination, e))?;
        match mode {
            WriteMode::SingleFile => {
                let content = self.render_single_file()?;
                let path = destination.join(format!("design{}", self.formatter.filename_extension()));
                write_if_changed(&path, &content)?;
            }
            WriteMode::FilePerEntity => {
                self.write_packages(destination)?;
                for index in 0..self.entities.len() {
                    let name = self.entities[index].grouping.name.clone();
                    let path = file_path(destination, &name, self.formatter.filename_extension());
                    write_if_changed(&path, &self.render_entity_file(index)?)?;
                }
            }
            WriteMode::FilePerPartition => {
                self.write_packages(destination)?;
                let order = self.dependency_order();
                let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
                for index in order {
                    let owner = self.partition_owner(index);
                    match groups.iter_mut().find(|(o, _)| *o == owner) {
                        Some((_, members)) => members.push(index),
                        None => groups.push((owner, vec![index])),
                    }
                }
                for (owner, members) in groups {
                    let mut content = String::new();
                    content.push_str(self.formatter.file_header());
                    content.push_str("\nLIBRARY ieee;\nUSE ieee.std_logic_1164.ALL;\nUSE ieee.numeric_std.all;\n");
                    for package in &self.packages {
                        let _ = writeln!(content, "USE work.{}.all;", package.name());
                    }
                    for index in members {
                        content.push('\n');
                        content.push_str(&self.render_entity(index)?);
                    }
                    let name = self.entities[owner].grouping.name.clone();
                    let path = file_path(destination, &name, self.formatter.filename_extension());
                    write_if_changed(&path, &content)?;
                }
            }
        }
        Ok(())
    }

    fn write_packages(&self, destination: &Path) -> VhdlResult<()> {
        for package in &self.packages {
            let path = file_path(destination, package.name(), self.formatter.filename_extension());
            let mut content = String::new();
            content.push_str(self.formatter.file_header());
            content.push('\n');
            content.push_str(&package.render(self.formatter.as_ref()));
            write_if_changed(&path, &content)?;
        }
        Ok(())
    }

    fn render_entity_file(&self, index: usize) -> VhdlResult<String> {
        let mut out = String::new();
        out.push_str(self.formatter.file_header());
        out.push_str("\nLIBRARY ieee;\nUSE ieee.std_logic_1164.ALL;\nUSE ieee.numeric_std.all;\n");
        for package in &self.packages {
            let _ = writeln!(out, "USE work.{}.all;", package.name());
        }
        out.push('\n');
        out.push_str(&self.render_entity(index)?);
        Ok(out)
    }

    fn port_connection_type(&self, port: NodePort) -> ConnectionType {
        self.circuit.node(port.node).output_types[port.port as usize]
    }

    fn expr_context(connection_type: ConnectionType) -> ExprContext {
        match connection_type {
            ConnectionType::Bool => ExprContext::StdLogic,
            ConnectionType::BitVec { .. } => ExprContext::Vector,
        }
    }

    /// Builds the `name : DIRECTION type` lines for an entity's port clause:
    /// clock/reset ports first, then entity-to-entity inputs/outputs
    /// (`UNSIGNED`), then true I/O pins (`STD_LOGIC_VECTOR`).
    fn build_port_lines(&self, grouping: &Grouping) -> VhdlResult<Vec<String>> {
        let mut lines = Vec::new();

        for &clock_id in &grouping.input_clocks {
            let name = self
                .clock_names
                .get(&clock_id)
                .ok_or_else(|| VhdlError::lookup(format!("clock {clock_id:?} has no allocated name")))?;
            lines.push(format!("{name} : IN STD_LOGIC"));
            if self.circuit.clock(clock_id).reset_type.has_reset_signal() {
                let reset = self
                    .reset_names
                    .get(&clock_id)
                    .ok_or_else(|| VhdlError::lookup(format!("clock {clock_id:?} has no allocated reset name")))?;
                lines.push(format!("{reset} : IN STD_LOGIC"));
            }
        }

        for &port in &grouping.inputs {
            let name = self.namespaces.get_node_port_name(grouping.scope, port)?;
            let mut type_str = String::new();
            self.formatter.format_connection_type(&mut type_str, self.port_connection_type(port), false);
            lines.push(format!("{name} : IN {type_str}"));
        }
        for &port in &grouping.outputs {
            let name = self.namespaces.get_node_port_name(grouping.scope, port)?;
            let mut type_str = String::new();
            self.formatter.format_connection_type(&mut type_str, self.port_connection_type(port), false);
            lines.push(format!("{name} : OUT {type_str}"));
        }

        let owned = collect_owned_nodes(&self.circuit, grouping.source_group);
        for &pin in &grouping.io_pins {
            let name = self.namespaces.get_pin_name(grouping.scope, pin)?;
            let connection_type = self.circuit.node(pin).output_types.first().copied().unwrap_or(ConnectionType::Bool);
            let mut type_str = String::new();
            self.formatter.format_connection_type(&mut type_str, connection_type, true);
            let dir = match pin_direction(&self.circuit, pin, &owned) {
                PinDirection::In => "IN",
                PinDirection::Out => "OUT",
                PinDirection::InOut => "INOUT",
            };
            lines.push(format!("{name} : {dir} {type_str}"));
        }

        Ok(lines)
    }

    fn render_signal_decls(&self, out: &mut String, grouping: &Grouping) -> VhdlResult<()> {
        let ind = self.formatter.indentation();
        for &port in &grouping.local_signals {
            let name = self.namespaces.get_node_port_name(grouping.scope, port)?;
            let mut type_str = String::new();
            self.formatter.format_connection_type(&mut type_str, self.port_connection_type(port), false);
            let _ = writeln!(out, "{ind}SIGNAL {name} : {type_str};");
        }
        Ok(())
    }

    fn collect_component_indices(&self, grouping: &Grouping, out: &mut Vec<usize>) {
        for stmt in &grouping.statements {
            match &stmt.kind {
                ConcurrentStmtKind::EntityInstantiation { entity_index, .. } => {
                    if self.entities[*entity_index].partition_as_component {
                        out.push(*entity_index);
                    }
                }
                ConcurrentStmtKind::Block(block) => self.collect_component_indices(block, out),
                _ => {}
            }
        }
    }

    fn render_component_declaration(&self, entity_index: usize) -> VhdlResult<String> {
        let grouping = &self.entities[entity_index].grouping;
        let port_lines = self.build_port_lines(grouping)?;
        let ind = self.formatter.indentation();
        let mut out = String::new();
        let _ = writeln!(out, "{ind}COMPONENT {} IS", grouping.name);
        if !port_lines.is_empty() {
            let _ = writeln!(out, "{ind}{ind}PORT (");
            let last = port_lines.len() - 1;
            for (i, line) in port_lines.iter().enumerate() {
                let sep = if i == last { "" } else { ";" };
                let _ = writeln!(out, "{ind}{ind}{ind}{line}{sep}");
            }
            let _ = writeln!(out, "{ind}{ind});");
        }
        let _ = writeln!(out, "{ind}END COMPONENT;");
        Ok(out)
    }

    fn render_entity(&self, index: usize) -> VhdlResult<String> {
        let entity = &self.entities[index];
        let grouping = &entity.grouping;
        let mut out = String::new();

        if let Some(comment) = &grouping.comment {
            self.formatter.format_entity_comment(&mut out, &grouping.name, comment);
        }

        let port_lines = self.build_port_lines(grouping)?;
        let ind = self.formatter.indentation();

        let _ = writeln!(out, "ENTITY {} IS", grouping.name);
        if !port_lines.is_empty() {
            let _ = writeln!(out, "{ind}PORT (");
            let last = port_lines.len() - 1;
            for (i, line) in port_lines.iter().enumerate() {
                let sep = if i == last { "" } else { ";" };
                let _ = writeln!(out, "{ind}{ind}{line}{sep}");
            }
            let _ = writeln!(out, "{ind});");
        }
        let _ = writeln!(out, "END ENTITY {};", grouping.name);
        out.push('\n');

        let mut component_indices = Vec::new();
        self.collect_component_indices(grouping, &mut component_indices);
        component_indices.sort_unstable();
        component_indices.dedup();

        let _ = writeln!(out, "ARCHITECTURE impl OF {} IS", grouping.name);
        for comp_index in component_indices {
            out.push_str(&self.render_component_declaration(comp_index)?);
        }
        self.render_signal_decls(&mut out, grouping)?;
        let _ = writeln!(out, "BEGIN");
        self.render_grouping_body(&mut out, grouping, 1)?;
        let _ = writeln!(out, "END ARCHITECTURE impl;");

        Ok(out)
    }

    fn render_grouping_body(&self, out: &mut String, grouping: &Grouping, depth: usize) -> VhdlResult<()> {
        let pad = self.formatter.indentation().repeat(depth);
        for stmt in &grouping.statements {
            match &stmt.kind {
                ConcurrentStmtKind::Process(process) => self.render_process(out, grouping, process, depth)?,
                ConcurrentStmtKind::Block(block) => {
                    if let Some(comment) = &block.comment {
                        self.formatter.format_block_comment(out, &block.name, comment);
                    }
                    let _ = writeln!(out, "{pad}{}: BLOCK", block.name);
                    self.render_signal_decls(out, block)?;
                    let _ = writeln!(out, "{pad}BEGIN");
                    self.render_grouping_body(out, block, depth + 1)?;
                    let _ = writeln!(out, "{pad}END BLOCK {};", block.name);
                }
                ConcurrentStmtKind::EntityInstantiation {
                    entity_index,
                    instance_name,
                    ..
                } => self.render_entity_instantiation(out, grouping, *entity_index, instance_name, &pad)?,
                ConcurrentStmtKind::ExternalInstantiation { node, instance_name, .. } => {
                    self.render_external_instantiation(out, grouping, *node, instance_name, &pad)?
                }
            }
        }
        Ok(())
    }

    fn render_process(&self, out: &mut String, grouping: &Grouping, process: &Process, depth: usize) -> VhdlResult<()> {
        let pad = self.formatter.indentation().repeat(depth);
        let body_pad = self.formatter.indentation().repeat(depth + 1);
        let boundary = ScopeBoundary {
            namespaces: &self.namespaces,
            scope: grouping.scope,
        };

        match &process.kind {
            ProcessKind::Combinational => {
                let _ = writeln!(out, "{pad}{}: PROCESS (ALL)", process.name);
                let _ = writeln!(out, "{pad}BEGIN");
                for &node_id in &process.nodes {
                    self.render_assignment(out, grouping, node_id, &boundary, &body_pad)?;
                }
                let _ = writeln!(out, "{pad}END PROCESS {};", process.name);
            }
            ProcessKind::Clocked(config) => {
                let clock_name = self
                    .clock_names
                    .get(&config.clock)
                    .ok_or_else(|| VhdlError::lookup(format!("clock {:?} has no allocated name", config.clock)))?
                    .clone();
                let clock = self.circuit.clock(config.clock);
                let is_async = matches!(clock.reset_type, ResetType::Asynchronous);

                let sensitivity = if config.has_reset_signal && is_async {
                    let reset_name = self
                        .reset_names
                        .get(&config.clock)
                        .ok_or_else(|| VhdlError::lookup(format!("clock {:?} has no allocated reset name", config.clock)))?;
                    format!("{clock_name}, {reset_name}")
                } else {
                    clock_name.clone()
                };
                let _ = writeln!(out, "{pad}{}: PROCESS ({sensitivity})", process.name);
                let _ = writeln!(out, "{pad}BEGIN");

                if config.has_reset_signal && is_async {
                    let reset_name = self.reset_names.get(&config.clock).expect("checked above").clone();
                    let inner_pad = self.formatter.indentation().repeat(depth + 2);
                    let _ = writeln!(out, "{body_pad}IF {reset_name} = '1' THEN");
                    for &node_id in &process.nodes {
                        self.render_reset_branch(out, grouping, node_id, &inner_pad)?;
                    }
                    let _ = writeln!(out, "{body_pad}ELSIF rising_edge({clock_name}) THEN");
                    for &node_id in &process.nodes {
                        self.render_assignment(out, grouping, node_id, &boundary, &inner_pad)?;
                    }
                    let _ = writeln!(out, "{body_pad}END IF;");
                } else if config.has_reset_signal {
                    let reset_name = self.reset_names.get(&config.clock).expect("checked above").clone();
                    let inner_pad = self.formatter.indentation().repeat(depth + 2);
                    let innermost_pad = self.formatter.indentation().repeat(depth + 3);
                    let _ = writeln!(out, "{body_pad}IF rising_edge({clock_name}) THEN");
                    let _ = writeln!(out, "{inner_pad}IF {reset_name} = '1' THEN");
                    for &node_id in &process.nodes {
                        self.render_reset_branch(out, grouping, node_id, &innermost_pad)?;
                    }
                    let _ = writeln!(out, "{inner_pad}ELSE");
                    for &node_id in &process.nodes {
                        self.render_assignment(out, grouping, node_id, &boundary, &innermost_pad)?;
                    }
                    let _ = writeln!(out, "{inner_pad}END IF;");
                    let _ = writeln!(out, "{body_pad}END IF;");
                } else {
                    let inner_pad = self.formatter.indentation().repeat(depth + 2);
                    let _ = writeln!(out, "{body_pad}IF rising_edge({clock_name}) THEN");
                    for &node_id in &process.nodes {
                        self.render_assignment(out, grouping, node_id, &boundary, &inner_pad)?;
                    }
                    let _ = writeln!(out, "{body_pad}END IF;");
                }

                let _ = writeln!(out, "{pad}END PROCESS {};", process.name);
            }
        }
        Ok(())
    }

    /// Renders `target <= expr;` for a node's own defining logic. A node
    /// with no name allocated in this scope (its value escapes into a
    /// nested block's own assignment instead) contributes nothing here.
    ///
    /// I/O pins are named in the separate `pin_names` map, not
    /// `node_port_names`, and an input pin has no driver of its own to
    /// render, so they are handled before the general node-port path.
    fn render_assignment(
        &self,
        out: &mut String,
        grouping: &Grouping,
        node_id: NodeId,
        boundary: &dyn DeclaredBoundary,
        pad: &str,
    ) -> VhdlResult<()> {
        let node = self.circuit.node(node_id);
        let port = NodePort::new(node_id, 0);

        if matches!(node.kind, NodeKind::Pin { .. }) {
            let driver = match node.inputs.first().copied().flatten() {
                Some(driver) => driver,
                None => return Ok(()),
            };
            let name = match self.namespaces.get_pin_name(grouping.scope, node_id) {
                Ok(n) => n.to_string(),
                Err(_) => return Ok(()),
            };
            let ctx = Self::expr_context(self.port_connection_type(port));
            let expr = format_expression(&self.circuit, driver, ctx, boundary)?;
            let _ = writeln!(out, "{pad}{name} <= {expr};");
            return Ok(());
        }

        let name = match self.namespaces.get_node_port_name(grouping.scope, port) {
            Ok(n) => n.to_string(),
            Err(_) => return Ok(()),
        };
        let ctx = Self::expr_context(self.port_connection_type(port));

        let expr = if node.is_register() {
            let driver = node
                .inputs
                .first()
                .copied()
                .flatten()
                .ok_or_else(|| VhdlError::design(format!("register {node_id:?} has no input driver")))?;
            format_expression(&self.circuit, driver, ctx, boundary)?
        } else {
            format_node_expression(&self.circuit, port, ctx, boundary)?
        };

        let _ = writeln!(out, "{pad}{name} <= {expr};");
        Ok(())
    }

    /// Renders the reset-branch assignment for a register with a declared
    /// reset value. A register with `reset_value: None` is left unassigned
    /// in the reset branch.
    fn render_reset_branch(&self, out: &mut String, grouping: &Grouping, node_id: NodeId, pad: &str) -> VhdlResult<()> {
        let node = self.circuit.node(node_id);
        let reset_value = match &node.kind {
            NodeKind::Register { reset_value, .. } => reset_value,
            _ => return Ok(()),
        };
        let value = match reset_value {
            Some(v) => v,
            None => return Ok(()),
        };
        let port = NodePort::new(node_id, 0);
        let name = match self.namespaces.get_node_port_name(grouping.scope, port) {
            Ok(n) => n.to_string(),
            Err(_) => return Ok(()),
        };
        let ctx = Self::expr_context(self.port_connection_type(port));
        let literal = format_literal(value, ctx);
        let _ = writeln!(out, "{pad}{name} <= {literal};");
        Ok(())
    }

    fn render_port_map(&self, out: &mut String, pad: &str, label: &str, entity_ref: &str, port_maps: &[String]) {
        if port_maps.is_empty() {
            let _ = writeln!(out, "{pad}{label}: {entity_ref};");
            return;
        }
        let ind = self.formatter.indentation();
        let _ = writeln!(out, "{pad}{label}: {entity_ref}");
        let _ = writeln!(out, "{pad}{ind}PORT MAP (");
        let inner_pad = format!("{pad}{ind}{ind}");
        let last = port_maps.len() - 1;
        for (i, line) in port_maps.iter().enumerate() {
            let sep = if i == last { "" } else { "," };
            let _ = writeln!(out, "{inner_pad}{line}{sep}");
        }
        let _ = writeln!(out, "{pad}{ind});");
    }

    fn render_entity_instantiation(
        &self,
        out: &mut String,
        grouping: &Grouping,
        entity_index: usize,
        instance_name: &str,
        pad: &str,
    ) -> VhdlResult<()> {
        let boundary = ScopeBoundary {
            namespaces: &self.namespaces,
            scope: grouping.scope,
        };
        let target = &self.entities[entity_index];
        let target_grouping = &target.grouping;
        let mut port_maps = Vec::new();

        for &port in &target_grouping.inputs {
            let port_name = self.namespaces.get_node_port_name(target_grouping.scope, port)?;
            let ctx = Self::expr_context(self.port_connection_type(port));
            let expr = format_expression(&self.circuit, port, ctx, &boundary)?;
            port_maps.push(format!("{port_name} => {expr}"));
        }
        for &port in &target_grouping.outputs {
            let port_name = self.namespaces.get_node_port_name(target_grouping.scope, port)?;
            if let Ok(driving_name) = self.namespaces.get_node_port_name(grouping.scope, port) {
                port_maps.push(format!("{port_name} => {driving_name}"));
            }
        }
        for &clock_id in &target_grouping.input_clocks {
            let port_name = self
                .clock_names
                .get(&clock_id)
                .ok_or_else(|| VhdlError::lookup(format!("clock {clock_id:?} has no allocated name")))?;
            port_maps.push(format!("{port_name} => {port_name}"));
            if self.circuit.clock(clock_id).reset_type.has_reset_signal() {
                let reset_name = self
                    .reset_names
                    .get(&clock_id)
                    .ok_or_else(|| VhdlError::lookup(format!("clock {clock_id:?} has no allocated reset name")))?;
                port_maps.push(format!("{reset_name} => {reset_name}"));
            }
        }
        for &pin in &target_grouping.io_pins {
            let port_name = self.namespaces.get_pin_name(target_grouping.scope, pin)?;
            if let Ok(name) = self.namespaces.get_pin_name(grouping.scope, pin) {
                port_maps.push(format!("{port_name} => {name}"));
            }
        }

        let entity_ref = if target.partition_as_component {
            target_grouping.name.clone()
        } else {
            format!("entity work.{}(impl)", target_grouping.name)
        };
        self.render_port_map(out, pad, instance_name, &entity_ref, &port_maps);
        Ok(())
    }

    fn render_external_instantiation(
        &self,
        out: &mut String,
        grouping: &Grouping,
        node_id: NodeId,
        instance_name: &str,
        pad: &str,
    ) -> VhdlResult<()> {
        let boundary = ScopeBoundary {
            namespaces: &self.namespaces,
            scope: grouping.scope,
        };
        let node = self.circuit.node(node_id);
        let info = self
            .external_info
            .get(&node_id)
            .ok_or_else(|| VhdlError::design(format!("external node {node_id:?} has no resolved name")))?;

        let mut port_maps = Vec::new();
        for (i, port_name) in info.input_names.iter().enumerate() {
            if let Some(driver) = node.inputs.get(i).copied().flatten() {
                let ctx = Self::expr_context(self.port_connection_type(driver));
                let expr = format_expression(&self.circuit, driver, ctx, &boundary)?;
                port_maps.push(format!("{port_name} => {expr}"));
            }
        }
        for (i, port_name) in info.output_names.iter().enumerate() {
            let port = NodePort::new(node_id, i as u32);
            if let Ok(name) = self.namespaces.get_node_port_name(grouping.scope, port) {
                port_maps.push(format!("{port_name} => {name}"));
            }
        }

        let entity_ref = format!("entity work.{}(impl)", info.entity_name);
        self.render_port_map(out, pad, instance_name, &entity_ref, &port_maps);
        Ok(())
    }
}

/// Allocates names for every port, local signal, and pin a `Grouping`
/// declares, recursing into nested blocks. Must run after the whole entity
/// tree is built: `grouping::build_entity` only classifies signal *sets*, it
/// never allocates display names for them.
fn allocate_grouping_names(
    grouping: &mut Grouping,
    circuit: &Circuit,
    interner: &Interner,
    formatter: &dyn CodeFormatter,
    namespaces: &mut Namespaces,
) {
    for &port in &grouping.inputs {
        let desired = find_nearest_desired_name(circuit, interner, port);
        namespaces.allocate_node_port_name(grouping.scope, formatter, port, &desired, SignalKind::EntityInput);
    }
    for &port in &grouping.outputs {
        let desired = find_nearest_desired_name(circuit, interner, port);
        namespaces.allocate_node_port_name(grouping.scope, formatter, port, &desired, SignalKind::EntityOutput);
    }
    for &port in &grouping.local_signals {
        let desired = find_nearest_desired_name(circuit, interner, port);
        let kind = if circuit.node(port.node).is_register() {
            SignalKind::RegisterOutput
        } else {
            SignalKind::LocalSignal
        };
        namespaces.allocate_node_port_name(grouping.scope, formatter, port, &desired, kind);
    }
    for &pin in &grouping.io_pins {
        let desired = match circuit.node(pin).name {
            Some(name) => interner.resolve(name).to_string(),
            None => "unnamed".to_string(),
        };
        namespaces.allocate_pin_name(grouping.scope, formatter, pin, &desired);
    }

    for stmt in &mut grouping.statements {
        if let ConcurrentStmtKind::Block(block) = &mut stmt.kind {
            allocate_grouping_names(block, circuit, interner, formatter, namespaces);
        }
    }
}

/// Resolves a node port's declared name by live namespace lookup, covering
/// any already-named signal regardless of which nested block declared it.
struct ScopeBoundary<'a> {
    namespaces: &'a Namespaces,
    scope: ScopeId,
}

impl DeclaredBoundary for ScopeBoundary<'_> {
    fn resolve(&self, port: NodePort) -> Option<String> {
        self.namespaces
            .get_node_port_name(self.scope, port)
            .ok()
            .or_else(|| self.namespaces.get_pin_name(self.scope, port.node).ok())
            .map(String::from)
    }
}

fn file_path(destination: &Path, name: &str, extension: &str) -> PathBuf {
    destination.join(format!("{name}{extension}"))
}

fn write_if_changed(path: &Path, content: &str) -> VhdlResult<()> {
    if let Ok(existing) = fs::read(path) {
        if existing == content.as_bytes() {
            return Ok(());
        }
    }
    fs::write(path, content).map_err(|e| VhdlError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::DefaultCodeFormatting;
    use gatery_common::{Frequency, LogicVec};
    use gatery_hlim::arena::Arena;
    use gatery_hlim::group::{Attributes, GroupKind, NodeGroup};
    use gatery_hlim::{Clock, Node, NodeGroupId, PinDirection as HlimPinDirection};

    fn formatter() -> Box<dyn CodeFormatter> {
        Box::new(DefaultCodeFormatting::new())
    }

    #[test]
    fn passthrough_entity_renders_io_pins_as_std_logic_vector() {
        let interner = Interner::new();
        let mut nodes: Arena<NodeId, Node> = Arena::new();
        let root_id = NodeGroupId::from_raw(0);
        let in_pin = nodes.alloc(Node {
            id: NodeId::from_raw(0),
            kind: NodeKind::Pin {
                direction: HlimPinDirection::Input,
                simulation_only: false,
            },
            group: root_id,
            inputs: Vec::new(),
            output_types: vec![ConnectionType::BitVec { width: 4 }],
            name: Some(interner.get_or_intern("in")),
            comment: None,
        });
        let out_pin = nodes.alloc(Node {
            id: NodeId::from_raw(0),
            kind: NodeKind::Pin {
                direction: HlimPinDirection::Output,
                simulation_only: false,
            },
            group: root_id,
            inputs: vec![Some(NodePort::new(in_pin, 0))],
            output_types: vec![ConnectionType::BitVec { width: 4 }],
            name: Some(interner.get_or_intern("out")),
            comment: None,
        });
        let mut groups = Arena::new();
        let root = groups.alloc(NodeGroup {
            id: root_id,
            name: interner.get_or_intern("top"),
            comment: None,
            kind: GroupKind::Entity,
            parent: None,
            children: Vec::new(),
            nodes: vec![in_pin, out_pin],
            attributes: Attributes::default(),
            partition: false,
            partition_as_component: false,
        });
        let circuit = Circuit::new(nodes, groups, Arena::new(), root);

        let ast = Ast::convert(&circuit, &interner, formatter()).unwrap();
        let text = ast.render_single_file().unwrap();
        assert!(text.contains("ENTITY top IS"));
        assert!(text.contains("STD_LOGIC_VECTOR(3 downto 0)"));
        assert!(text.contains("END ENTITY top;"));
        assert!(text.contains("out <= in;"));
    }

    #[test]
    fn registered_output_gets_clocked_process_with_async_reset() {
        let interner = Interner::new();
        let mut nodes: Arena<NodeId, Node> = Arena::new();
        let mut clocks: Arena<ClockId, Clock> = Arena::new();
        let clock_id = clocks.alloc(Clock {
            id: ClockId::from_raw(0),
            name: interner.get_or_intern("clk"),
            frequency: Frequency::new(1.0e8),
            reset_type: ResetType::Asynchronous,
            reset_name: None,
        });
        let root_id = NodeGroupId::from_raw(0);
        let in_pin = nodes.alloc(Node {
            id: NodeId::from_raw(0),
            kind: NodeKind::Pin {
                direction: HlimPinDirection::Input,
                simulation_only: false,
            },
            group: root_id,
            inputs: Vec::new(),
            output_types: vec![ConnectionType::Bool],
            name: Some(interner.get_or_intern("d")),
            comment: None,
        });
        let reg = nodes.alloc(Node {
            id: NodeId::from_raw(0),
            kind: NodeKind::Register {
                clock: clock_id,
                reset_value: Some(LogicVec::all_zero(1)),
            },
            group: root_id,
            inputs: vec![Some(NodePort::new(in_pin, 0))],
            output_types: vec![ConnectionType::Bool],
            name: Some(interner.get_or_intern("q")),
            comment: None,
        });
        let out_pin = nodes.alloc(Node {
            id: NodeId::from_raw(0),
            kind: NodeKind::Pin {
                direction: HlimPinDirection::Output,
                simulation_only: false,
            },
            group: root_id,
            inputs: vec![Some(NodePort::new(reg, 0))],
            output_types: vec![ConnectionType::Bool],
            name: Some(interner.get_or_intern("q_out")),
            comment: None,
        });
        let mut groups = Arena::new();
        let root = groups.alloc(NodeGroup {
            id: root_id,
            name: interner.get_or_intern("top"),
            comment: None,
            kind: GroupKind::Entity,
            parent: None,
            children: Vec::new(),
            nodes: vec![in_pin, reg, out_pin],
            attributes: Attributes::default(),
            partition: false,
            partition_as_component: false,
        });
        let circuit = Circuit::new(nodes, groups, clocks, root);

        let ast = Ast::convert(&circuit, &interner, formatter()).unwrap();
        let text = ast.render_single_file().unwrap();
        assert!(text.contains("PROCESS (clk, "));
        assert!(text.contains("= '1' THEN"));
        assert!(text.contains("rising_edge(clk)"));
        assert!(text.contains("r_out_q <= "));
        assert!(text.contains("q_out <= r_out_q;"));
    }

    #[test]
    fn write_single_file_is_idempotent_on_disk() {
        let interner = Interner::new();
        let mut nodes: Arena<NodeId, Node> = Arena::new();
        let root_id = NodeGroupId::from_raw(0);
        let pin = nodes.alloc(Node {
            id: NodeId::from_raw(0),
            kind: NodeKind::Pin {
                direction: HlimPinDirection::Output,
                simulation_only: false,
            },
            group: root_id,
            inputs: vec![None],
            output_types: vec![ConnectionType::Bool],
            name: Some(interner.get_or_intern("p")),
            comment: None,
        });
        let mut groups = Arena::new();
        let root = groups.alloc(NodeGroup {
            id: root_id,
            name: interner.get_or_intern("top"),
            comment: None,
            kind: GroupKind::Entity,
            parent: None,
            children: Vec::new(),
            nodes: vec![pin],
            attributes: Attributes::default(),
            partition: false,
            partition_as_component: false,
        });
        let circuit = Circuit::new(nodes, groups, Arena::new(), root);
        let ast = Ast::convert(&circuit, &interner, formatter()).unwrap();

        let dir = std::env::temp_dir().join(format!("gatery_vhdl_ast_test_{}", std::process::id()));
        ast.write_vhdl(&dir, WriteMode::SingleFile).unwrap();
        let path = dir.join("design.vhd");
        let first = fs::read_to_string(&path).unwrap();
        ast.write_vhdl(&dir, WriteMode::SingleFile).unwrap();
        let second = fs::read_to_string(&path).unwrap();
        assert_eq!(first, second);
        let _ = fs::remove_dir_all(&dir);
    }
}
