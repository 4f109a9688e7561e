//! `gatery testbench` — replays a recorded simulation trace through
//! [`gatery_testbench::TestbenchRecorder`] and writes the rendered
//! testbench entity to disk.

use gatery_common::{LogicVec, Rational};
use gatery_config::CliOverrides;
use gatery_hlim::{ClockId, NodeId};
use gatery_testbench::TestbenchRecorder;
use gatery_vhdl::{Ast, DefaultCodeFormatting};
use serde::Deserialize;

use crate::error::{CliError, CliResult};
use crate::fixture::load_circuit;
use crate::GlobalArgs;
use crate::TestbenchArgs;

/// One recorded simulation event, in the order it was observed.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TraceEvent {
    /// A new simulation tick boundary.
    NewTick {
        /// Numerator of the absolute simulation time.
        numerator: i64,
        /// Denominator of the absolute simulation time.
        denominator: i64,
    },
    /// A clock edge.
    Clock {
        /// Raw index of the clock.
        clock: u32,
        /// `true` for a rising edge, `false` for falling.
        rising_edge: bool,
    },
    /// A stimulus pin override.
    PinOverride {
        /// Raw index of the pin node.
        pin: u32,
        /// The value driven, as a binary (`"01XZ"`-style) string.
        value: String,
    },
    /// An expected value on an observed pin.
    Assert {
        /// Raw index of the pin node.
        pin: u32,
        /// The expected value, as a binary (`"01XZ"`-style) string.
        value: String,
    },
    /// The start of a named simulation phase.
    AnnotationStart {
        /// Identifier for the phase, matched by a later `AnnotationEnd`.
        id: String,
        /// Free-form description, folded into the generated comment.
        #[serde(default)]
        desc: String,
    },
    /// The end of a named simulation phase.
    AnnotationEnd {
        /// Identifier matching the corresponding `AnnotationStart`.
        id: String,
    },
}

/// Runs the `gatery testbench` command. Returns the process exit code on
/// success.
pub fn run(args: &TestbenchArgs, global: &GlobalArgs) -> CliResult<i32> {
    let project_dir = args
        .config
        .clone()
        .unwrap_or_else(|| std::env::current_dir().expect("current directory is accessible"));
    let config = gatery_config::load(&project_dir, &CliOverrides::default())?;

    let (circuit, interner) = load_circuit(&args.circuit)?;
    let ast = Ast::convert(&circuit, &interner, Box::new(DefaultCodeFormatting::new()))?;

    let content = std::fs::read_to_string(&args.trace).map_err(|source| CliError::Io {
        path: args.trace.clone(),
        source,
    })?;
    let events: Vec<TraceEvent> = serde_json::from_str(&content)
        .map_err(|e| CliError::Fixture(format!("{}: {e}", args.trace.display())))?;

    let name = config
        .testbench
        .name
        .clone()
        .unwrap_or_else(|| format!("{}_tb", ast.entities()[ast.root_index()].grouping.name));
    let mut recorder = TestbenchRecorder::new(&ast, name)?;

    for event in &events {
        match event {
            TraceEvent::NewTick { numerator, denominator } => {
                recorder.on_new_tick(Rational::new(*numerator, *denominator))?;
            }
            TraceEvent::Clock { clock, rising_edge } => {
                recorder.on_clock(ClockId::from_raw(*clock), *rising_edge)?;
            }
            TraceEvent::PinOverride { pin, value } => {
                let value = parse_logic_vec(value)?;
                recorder.on_pin_override(NodeId::from_raw(*pin), &value)?;
            }
            TraceEvent::Assert { pin, value } => {
                let value = parse_logic_vec(value)?;
                recorder.on_assert(NodeId::from_raw(*pin), &value)?;
            }
            TraceEvent::AnnotationStart { id, desc } => {
                recorder.on_annotation_start(Rational::from_int(0), id, desc);
            }
            TraceEvent::AnnotationEnd { id } => {
                recorder.on_annotation_end(Rational::from_int(0), id);
            }
        }
    }

    let output_path = config.testbench.output_path.clone().unwrap_or_else(|| {
        config.export.destination.join("testbench.vhd")
    });
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| CliError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let rendered = recorder.finish();
    std::fs::write(&output_path, rendered).map_err(|source| CliError::Io {
        path: output_path.clone(),
        source,
    })?;

    if !global.quiet {
        eprintln!("     Wrote {}", output_path.display());
    }

    Ok(0)
}

fn parse_logic_vec(raw: &str) -> Result<LogicVec, CliError> {
    if let Some(hex) = raw.strip_prefix("0x") {
        LogicVec::from_hex_str(hex).ok_or_else(|| CliError::Fixture(format!("invalid hex literal: {raw}")))
    } else {
        LogicVec::from_binary_str(raw).ok_or_else(|| CliError::Fixture(format!("invalid binary literal: {raw}")))
    }
}
