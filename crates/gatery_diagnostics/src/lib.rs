//! Structured diagnostics: a severity, a primary message, zero or more
//! labelled locations, and optional suggested fixes, uniformly rendering a
//! failure from any crate in the workspace.
//!
//! Every error kind in this workspace is reportable through a
//! `From<&SomeError> for Diagnostic` impl living with that error type
//! (`gatery_vhdl::VhdlError`, `gatery_testbench::TestbenchError`,
//! `gatery_synth_adapter::SynthAdapterError`, `gatery_config::ConfigError`,
//! `gatery_driver::DriverError`), so the CLI can render any failure
//! uniformly without this crate depending back on any of them. Diagnostics
//! never replace `Result`-based propagation — they are the rendering of an
//! already-propagated error at the one place (the CLI) that owns a
//! terminal.
//!
//! Unlike a compiler front-end's diagnostics, this back-end has no
//! source-text database to point spans into, so labels carry a plain
//! [`label::Location`] string rather than a byte range into a registered
//! file. The sink is also a plain trait rather than a thread-safe
//! structure, since this back-end runs single-threaded and synchronously
//! per export (see [`sink::DiagnosticSink`]).

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod label;
pub mod renderer;
pub mod severity;
pub mod sink;
pub mod suggested_fix;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use label::{Label, LabelStyle, Location};
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::{DiagnosticSink, VecDiagnosticSink};
pub use suggested_fix::{Replacement, SuggestedFix};
