//! `gatery export` — renders a finalized circuit to VHDL, then (per the
//! loaded [`gatery_config::SynthesisConfig`]) the synthesis adapter's
//! auxiliary files alongside it.

use gatery_config::{CliOverrides, WriteModeConfig};
use gatery_synth_adapter::{DefaultSynthesisTool, SynthesisTool};
use gatery_vhdl::{Ast, DefaultCodeFormatting, WriteMode};

use crate::error::CliResult;
use crate::fixture::load_circuit;
use crate::ExportArgs;
use crate::GlobalArgs;

/// Runs the `gatery export` command. Returns the process exit code on
/// success.
pub fn run(args: &ExportArgs, global: &GlobalArgs) -> CliResult<i32> {
    let project_dir = args
        .config
        .clone()
        .unwrap_or_else(|| std::env::current_dir().expect("current directory is accessible"));
    let overrides = CliOverrides {
        destination: args.destination.clone(),
        entity_name: None,
    };
    let config = gatery_config::load(&project_dir, &overrides)?;

    let (circuit, interner) = load_circuit(&args.circuit)?;
    let ast = Ast::convert(&circuit, &interner, Box::new(DefaultCodeFormatting::new()))?;

    let write_mode = match config.export.write_mode {
        WriteModeConfig::SingleFile => WriteMode::SingleFile,
        WriteModeConfig::FilePerEntity => WriteMode::FilePerEntity,
        WriteModeConfig::FilePerPartition => WriteMode::FilePerPartition,
    };

    ast.write_vhdl(&config.export.destination, write_mode)?;
    if !global.quiet {
        eprintln!(
            "     Exported {} ({write_mode:?})",
            config.export.destination.display()
        );
    }

    let tool = DefaultSynthesisTool::new();
    let vendors = tool.vendors().to_vec();

    let mut constraints_file = None;
    if config.synthesis.write_constraints {
        let path = config.export.destination.join("constraints.xdc");
        gatery_synth_adapter::write_constraint_file(&ast, &vendors, &path)?;
        constraints_file = Some("constraints.xdc".to_string());
        if !global.quiet {
            eprintln!("     Wrote {}", path.display());
        }
    }

    let mut clocks_file = None;
    if config.synthesis.write_clocks {
        let path = config.export.destination.join("clocks.sdc");
        gatery_synth_adapter::write_clocks_file(&ast, &path)?;
        clocks_file = Some("clocks.sdc".to_string());
        if !global.quiet {
            eprintln!("     Wrote {}", path.display());
        }
    }

    if config.synthesis.write_project_script {
        let path = config.export.destination.join("project.prj");
        gatery_synth_adapter::write_vhdl_project_script(
            &ast,
            constraints_file.as_deref(),
            clocks_file.as_deref(),
            &path,
        )?;
        if !global.quiet {
            eprintln!("     Wrote {}", path.display());
        }
    }

    if global.verbose {
        eprintln!("     Entities emitted: {}", ast.entities().len());
    }

    Ok(0)
}
