//! Writes the clocks file: one line per clock, giving its period in
//! nanoseconds.
//!
//! Grounded on `SynthesisTool::writeClocksFile` (`SynthesisTool.cpp`), which
//! computes `ns = denominator * 1e9 / numerator` from the clock's rational
//! frequency and formats it to three decimal places. [`gatery_common::Frequency`]
//! stores a plain `f64` in Hz rather than a rational, so the period here is
//! `1e9 / hz()` — the same quantity, computed the other way round.

use std::io::Write as _;

use gatery_vhdl::Ast;

use crate::error::{SynthAdapterError, SynthAdapterResult};

/// Renders the clocks file body, one `clock: <name> period <ns> ns` line
/// per clock declared in the circuit.
pub fn render_clocks(ast: &Ast) -> SynthAdapterResult<String> {
    let mut out = String::new();
    out.push_str("# List of clocks:\n");
    for (clock_id, clock) in ast.circuit().clocks() {
        let name = ast.clock_name(clock_id)?;
        let period_ns = 1.0e9 / clock.frequency.hz();
        out.push_str(&format!("clock: {name} period {period_ns:.3} ns\n"));
    }
    Ok(out)
}

/// Writes the rendered clocks file to `path`.
pub fn write_clocks_file(ast: &Ast, path: &std::path::Path) -> SynthAdapterResult<()> {
    let content = render_clocks(ast)?;
    let mut file = std::fs::File::create(path).map_err(|e| SynthAdapterError::io(path, e))?;
    file.write_all(content.as_bytes()).map_err(|e| SynthAdapterError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatery_common::{Frequency, Interner};
    use gatery_hlim::arena::Arena;
    use gatery_hlim::group::{Attributes, GroupKind, NodeGroup};
    use gatery_hlim::{Circuit, Clock, ClockId, Node, NodeGroupId, NodeId, ResetType};
    use gatery_vhdl::DefaultCodeFormatting;

    fn build_ast_with_clock() -> Ast {
        let interner = Interner::new();
        let nodes: Arena<NodeId, Node> = Arena::new();
        let root_id = NodeGroupId::from_raw(0);

        let mut clocks: Arena<ClockId, Clock> = Arena::new();
        clocks.alloc(Clock {
            id: ClockId::from_raw(0),
            name: interner.get_or_intern("clk"),
            frequency: Frequency::new(100_000_000.0),
            reset_type: ResetType::Synchronous,
            reset_name: Some(interner.get_or_intern("reset")),
        });

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
    fn renders_period_in_nanoseconds() {
        let ast = build_ast_with_clock();
        let rendered = render_clocks(&ast).unwrap();
        assert!(rendered.starts_with("# List of clocks:\n"));
        assert!(rendered.contains("period 10.000 ns"));
    }
}
