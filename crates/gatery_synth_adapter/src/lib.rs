//! Synthesis-tool adapter: resolves per-node attributes against a
//! vendor list and writes the auxiliary files a synthesis flow expects
//! alongside the exported VHDL — constraints, clocks, and a project script
//! listing source files in dependency order.
//!
//! Grounded on `SynthesisTool`/`DefaultSynthesisTool` (`SynthesisTool.h`,
//! `SynthesisTool.cpp`).

#![warn(missing_docs)]

pub mod adapter;
pub mod clocks;
pub mod constraints;
pub mod error;
pub mod paths;
pub mod project;

pub use adapter::{add_user_defined_attributes, DefaultSynthesisTool, ResolvedAttributes, SynthesisTool};
pub use clocks::{render_clocks, write_clocks_file};
pub use constraints::{render_constraints, write_constraint_file};
pub use error::{SynthAdapterError, SynthAdapterResult};
pub use paths::{has_enclosing_entity, resolve_identifier};
pub use project::{render_project_script, source_files, write_vhdl_project_script};
