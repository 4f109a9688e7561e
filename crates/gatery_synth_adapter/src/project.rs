//! Writes the VHDL project script: the list of source files in dependency
//! order, followed by the constraints and clocks filenames if present.
//!
//! Grounded on `SynthesisTool::writeVhdlProjectScript`/`sourceFiles`
//! (`SynthesisTool.cpp`): packages first (they declare types everything
//! else depends on), then entities in [`Ast::dependency_order`] (callees
//! before callers), then the constraints and clocks filenames if the
//! caller requested those files.

use std::io::Write as _;

use gatery_vhdl::Ast;

use crate::error::{SynthAdapterError, SynthAdapterResult};

/// Every source filename `write_vhdl` would produce in `FilePerEntity`
/// mode, in the order a project script should compile them: packages
/// first, then entities in dependency order (callees before callers).
pub fn source_files(ast: &Ast) -> Vec<String> {
    let ext = ast.formatter().filename_extension();
    let mut files = Vec::new();
    for package in ast.packages() {
        files.push(format!("{}{ext}", package.name()));
    }
    for index in ast.dependency_order() {
        files.push(format!("{}{ext}", ast.entities()[index].grouping.name));
    }
    files
}

/// Renders the project script body, listing `source_files(ast)` and
/// optionally the constraints/clocks filenames.
pub fn render_project_script(ast: &Ast, constraints_file: Option<&str>, clocks_file: Option<&str>) -> String {
    let mut out = String::new();
    out.push_str("# List of source files in dependency order:\n");
    for file in source_files(ast) {
        out.push_str(&file);
        out.push('\n');
    }
    out.push_str("# List of constraints:\n");
    if let Some(file) = constraints_file {
        out.push_str(file);
        out.push('\n');
    }
    out.push_str("# List of clocks:\n");
    if let Some(file) = clocks_file {
        out.push_str(file);
        out.push('\n');
    }
    out
}

/// Writes the rendered project script to `path`.
pub fn write_vhdl_project_script(
    ast: &Ast,
    constraints_file: Option<&str>,
    clocks_file: Option<&str>,
    path: &std::path::Path,
) -> SynthAdapterResult<()> {
    let content = render_project_script(ast, constraints_file, clocks_file);
    let mut file = std::fs::File::create(path).map_err(|e| SynthAdapterError::io(path, e))?;
    file.write_all(content.as_bytes()).map_err(|e| SynthAdapterError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatery_common::Interner;
    use gatery_hlim::arena::Arena;
    use gatery_hlim::group::{Attributes, GroupKind, NodeGroup};
    use gatery_hlim::{Circuit, Clock, ClockId, Node, NodeGroupId, NodeId};
    use gatery_vhdl::DefaultCodeFormatting;

    fn build_trivial_ast() -> Ast {
        let interner = Interner::new();
        let nodes: Arena<NodeId, Node> = Arena::new();
        let clocks: Arena<ClockId, Clock> = Arena::new();
        let root_id = NodeGroupId::from_raw(0);
        let mut groups: Arena<NodeGroupId, NodeGroup> = Arena::new();
        groups.alloc(NodeGroup {
            id: root_id,
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
        let circuit = Circuit::new(nodes, groups, clocks, root_id);
        Ast::convert(&circuit, &interner, Box::new(DefaultCodeFormatting::new())).unwrap()
    }

    #[test]
    fn lists_root_entity_last() {
        let ast = build_trivial_ast();
        let files = source_files(&ast);
        assert!(files.last().unwrap().starts_with("top"));
    }

    #[test]
    fn renders_optional_constraints_and_clocks_lines() {
        let ast = build_trivial_ast();
        let rendered = render_project_script(&ast, Some("design.constraints"), Some("design.clocks"));
        assert!(rendered.contains("design.constraints"));
        assert!(rendered.contains("design.clocks"));
    }

    #[test]
    fn omits_optional_filenames_when_absent() {
        let ast = build_trivial_ast();
        let rendered = render_project_script(&ast, None, None);
        assert!(rendered.ends_with("# List of clocks:\n"));
    }
}
