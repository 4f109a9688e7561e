//! Gatery CLI — the command-line front-end for the VHDL back-end.
//!
//! Provides `gatery export` for rendering a finalized circuit to VHDL,
//! `gatery testbench` for replaying a recorded simulation trace into a
//! self-checking testbench entity, and `gatery init` for scaffolding a new
//! `gatery.toml`.

#![warn(missing_docs)]

mod error;
mod export;
mod fixture;
mod init;
mod testbench;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use gatery_diagnostics::{DiagnosticRenderer, TerminalRenderer};

/// Gatery — a VHDL back-end for the Gatery hardware-description toolchain.
#[derive(Parser, Debug)]
#[command(name = "gatery", version, about = "Gatery VHDL back-end")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export a finalized circuit to VHDL.
    Export(ExportArgs),
    /// Replay a recorded simulation trace into a testbench entity.
    Testbench(TestbenchArgs),
    /// Write a default `gatery.toml` into a project directory.
    Init(InitArgs),
}

/// Arguments for the `gatery export` subcommand.
#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Path to a serialized circuit fixture (JSON).
    #[arg(long)]
    pub circuit: PathBuf,

    /// Path to a `gatery.toml` project configuration, or its containing
    /// directory. Defaults to the current directory.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Overrides `export.destination` from the loaded configuration.
    #[arg(long)]
    pub destination: Option<PathBuf>,
}

/// Arguments for the `gatery testbench` subcommand.
#[derive(Parser, Debug)]
pub struct TestbenchArgs {
    /// Path to a serialized circuit fixture (JSON).
    #[arg(long)]
    pub circuit: PathBuf,

    /// Path to a recorded simulation trace (JSON), replayed in order
    /// through the testbench recorder.
    #[arg(long)]
    pub trace: PathBuf,

    /// Path to a `gatery.toml` project configuration, or its containing
    /// directory. Defaults to the current directory.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the `gatery init` subcommand.
#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Directory to write `gatery.toml` into. Defaults to the current
    /// directory.
    #[arg(long)]
    pub path: Option<PathBuf>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => atty_is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
    };

    let result = match &cli.command {
        Command::Export(args) => export::run(args, &global),
        Command::Testbench(args) => testbench::run(args, &global),
        Command::Init(args) => init::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            let diag: gatery_diagnostics::Diagnostic = (&e).into();
            let renderer = TerminalRenderer::new(color);
            eprint!("{}", renderer.render(&diag));
            process::exit(1);
        }
    }
}

/// Rough terminal detection — checks if stdout is a terminal.
fn atty_is_terminal() -> bool {
    std::env::var("TERM").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_export_minimal() {
        let cli = Cli::parse_from(["gatery", "export", "--circuit", "circuit.json"]);
        match cli.command {
            Command::Export(ref args) => {
                assert_eq!(args.circuit, PathBuf::from("circuit.json"));
                assert!(args.config.is_none());
                assert!(args.destination.is_none());
            }
            _ => panic!("expected Export command"),
        }
    }

    #[test]
    fn parse_export_with_destination_and_config() {
        let cli = Cli::parse_from([
            "gatery",
            "export",
            "--circuit",
            "circuit.json",
            "--config",
            "gatery.toml",
            "--destination",
            "build/vhdl",
        ]);
        match cli.command {
            Command::Export(ref args) => {
                assert_eq!(args.config, Some(PathBuf::from("gatery.toml")));
                assert_eq!(args.destination, Some(PathBuf::from("build/vhdl")));
            }
            _ => panic!("expected Export command"),
        }
    }

    #[test]
    fn parse_testbench() {
        let cli = Cli::parse_from([
            "gatery",
            "testbench",
            "--circuit",
            "circuit.json",
            "--trace",
            "trace.json",
        ]);
        match cli.command {
            Command::Testbench(ref args) => {
                assert_eq!(args.circuit, PathBuf::from("circuit.json"));
                assert_eq!(args.trace, PathBuf::from("trace.json"));
            }
            _ => panic!("expected Testbench command"),
        }
    }

    #[test]
    fn parse_init_default() {
        let cli = Cli::parse_from(["gatery", "init"]);
        match cli.command {
            Command::Init(ref args) => assert!(args.path.is_none()),
            _ => panic!("expected Init command"),
        }
    }

    #[test]
    fn parse_init_with_path() {
        let cli = Cli::parse_from(["gatery", "init", "--path", "my_project"]);
        match cli.command {
            Command::Init(ref args) => assert_eq!(args.path, Some(PathBuf::from("my_project"))),
            _ => panic!("expected Init command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from([
            "gatery",
            "--quiet",
            "--color",
            "never",
            "init",
        ]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Never);
    }

    #[test]
    fn parse_verbose_flag() {
        let cli = Cli::parse_from(["gatery", "--verbose", "init"]);
        assert!(cli.verbose);
        assert!(!cli.quiet);
    }

    #[test]
    fn parse_color_always() {
        let cli = Cli::parse_from(["gatery", "--color", "always", "init"]);
        assert_eq!(cli.color, ColorChoice::Always);
    }
}
