//! Loads a serialized [`Circuit`] together with the string table its
//! [`Ident`]s were interned from.
//!
//! `Circuit` itself only carries `Ident(u32)` handles (the crate's own
//! test fixtures build a [`gatery_common::Interner`] alongside the circuit
//! for the same reason); a standalone JSON fixture has to carry the strings
//! too so a fresh process can rebuild an `Interner` that assigns the same
//! keys. `Interner::get_or_intern` assigns keys in first-seen order, so
//! replaying `strings` through a new interner in the order it was recorded
//! reproduces the exact `Ident` values the circuit was built with.

use std::path::Path;

use gatery_common::Interner;
use gatery_hlim::Circuit;
use serde::Deserialize;

use crate::error::CliError;

/// The on-disk shape of a circuit fixture: a [`Circuit`] plus the ordered
/// list of strings its identifiers were interned from.
#[derive(Debug, Deserialize)]
struct CircuitFixture {
    circuit: Circuit,
    strings: Vec<String>,
}

/// Reads a circuit fixture from `path`, returning the circuit and an
/// [`Interner`] whose `Ident` keys line up with the ones the circuit was
/// built against.
pub fn load_circuit(path: &Path) -> Result<(Circuit, Interner), CliError> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let fixture: CircuitFixture = serde_json::from_str(&content)
        .map_err(|e| CliError::Fixture(format!("{}: {e}", path.display())))?;

    let interner = Interner::new();
    for s in &fixture.strings {
        interner.get_or_intern(s);
    }

    Ok((fixture.circuit, interner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatery_hlim::arena::Arena;
    use gatery_hlim::{Attributes, Clock, ClockId, Node, NodeGroup, NodeGroupId, NodeId, NodeKind};

    #[test]
    fn round_trips_through_json() {
        let interner = Interner::new();
        let name = interner.get_or_intern("top");

        let mut groups: Arena<NodeGroupId, NodeGroup> = Arena::new();
        let root = groups.alloc(NodeGroup {
            id: NodeGroupId::from_raw(0),
            name,
            comment: None,
            kind: gatery_hlim::GroupKind::Entity,
            parent: None,
            children: Vec::new(),
            nodes: Vec::new(),
            attributes: Attributes::default(),
            partition: false,
            partition_as_component: false,
        });

        let mut nodes: Arena<NodeId, Node> = Arena::new();
        nodes.alloc(Node {
            id: NodeId::from_raw(0),
            kind: NodeKind::Signal { desired_name: Some(name) },
            group: root,
            inputs: Vec::new(),
            output_types: Vec::new(),
            name: Some(name),
            comment: None,
        });

        let clocks: Arena<ClockId, Clock> = Arena::new();
        let circuit = Circuit::new(nodes, groups, clocks, root);

        let fixture = serde_json::json!({
            "circuit": circuit,
            "strings": ["top"],
        });
        let tmp = std::env::temp_dir().join("gatery_cli_fixture_roundtrip.json");
        std::fs::write(&tmp, fixture.to_string()).unwrap();

        let (loaded, loaded_interner) = load_circuit(&tmp).unwrap();
        assert_eq!(loaded.root_group(), root);
        assert_eq!(loaded_interner.get_or_intern("top"), name);

        std::fs::remove_file(&tmp).ok();
    }

    #[test]
    fn missing_file_errors() {
        let err = load_circuit(Path::new("/nonexistent/circuit.json")).unwrap_err();
        assert!(matches!(err, CliError::Io { .. }));
    }
}
