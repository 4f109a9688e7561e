//! Configuration types deserialized from `gatery.toml`.
//!
//! This describes only how a circuit is *exported*: destination, write mode,
//! synthesis-adapter auxiliary files, and testbench recording — the HLIM
//! graph the circuit itself is built from is placed with an external
//! frontend, out of scope here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How `Ast::write_vhdl` lays entities and packages out on disk, mirroring
/// `gatery_vhdl::WriteMode`'s three variants in a serializable form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteModeConfig {
    /// Every package and entity concatenated into one file.
    #[default]
    SingleFile,
    /// One file per package/entity.
    FilePerEntity,
    /// Partitioned entities get their own file.
    FilePerPartition,
}

/// Which `CodeFormatter` implementation to use. Only `Default` exists
/// today; the variant set is kept open for a future vendor-specific
/// formatter, kept open for a future vendor-specific formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatterChoice {
    /// `gatery_vhdl::DefaultCodeFormatting`.
    #[default]
    Default,
}

/// Which `SynthesisTool` implementation to use. Only `Default` exists
/// today; a vendor-specific tool is future work, out of scope for now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthToolChoice {
    /// `gatery_synth_adapter::DefaultSynthesisTool`.
    #[default]
    Default,
}

/// How a circuit is exported to VHDL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory the export writes into.
    pub destination: PathBuf,
    /// Which of `Ast::write_vhdl`'s three modes to use.
    #[serde(default)]
    pub write_mode: WriteModeConfig,
    /// Which code formatter to render with.
    #[serde(default)]
    pub code_formatter: FormatterChoice,
    /// Overrides the root entity's desired name (otherwise taken from the
    /// circuit's root node group).
    #[serde(default)]
    pub entity_name: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            destination: PathBuf::from("export"),
            write_mode: WriteModeConfig::default(),
            code_formatter: FormatterChoice::default(),
            entity_name: None,
        }
    }
}

/// How the synthesis-tool adapter's auxiliary files are written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Which `SynthesisTool` to resolve attributes against.
    #[serde(default)]
    pub tool: SynthToolChoice,
    /// Whether to write the constraint file.
    #[serde(default)]
    pub write_constraints: bool,
    /// Whether to write the clocks file.
    #[serde(default)]
    pub write_clocks: bool,
    /// Whether to write the VHDL project script.
    #[serde(default)]
    pub write_project_script: bool,
}

/// How a recorded simulation trace is replayed into a testbench entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestbenchConfig {
    /// Whether testbench recording runs at all.
    #[serde(default)]
    pub enabled: bool,
    /// Overrides the generated testbench entity's name (otherwise
    /// `"<root>_tb"`).
    #[serde(default)]
    pub name: Option<String>,
    /// Where the testbench file is written. Defaults to
    /// `<export.destination>/testbench.vhd` when unset.
    #[serde(default)]
    pub output_path: Option<PathBuf>,
}

/// Where a [`GateryConfig`] was assembled from, recorded for diagnostics
/// and `gatery init`-style reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// No project file was found; every value came from built-in defaults,
    /// environment overrides, or explicit CLI flags.
    Defaults,
    /// A project file was loaded from this path (further overridden by
    /// environment variables and CLI flags, if any were given).
    File(PathBuf),
}

/// The root export configuration, composed from [`ExportConfig`],
/// [`SynthesisConfig`], and [`TestbenchConfig`], assembled by
/// [`crate::loader::load`]'s layered defaults/file/env/CLI resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateryConfig {
    /// Export destination and write mode.
    pub export: ExportConfig,
    /// Synthesis-adapter auxiliary file settings.
    pub synthesis: SynthesisConfig,
    /// Testbench recording settings.
    pub testbench: TestbenchConfig,
    /// Where this configuration was assembled from.
    pub source: ConfigSource,
}

impl Default for GateryConfig {
    fn default() -> Self {
        Self {
            export: ExportConfig::default(),
            synthesis: SynthesisConfig::default(),
            testbench: TestbenchConfig::default(),
            source: ConfigSource::Defaults,
        }
    }
}

/// The subset of [`GateryConfig`] that may appear in a `gatery.toml` file;
/// every field is optional so a project file can override only what it
/// cares about, the rest falling through to [`GateryConfig::default`].
#[derive(Debug, Default, Deserialize)]
pub struct GateryConfigFile {
    /// Export section, if present.
    #[serde(default)]
    pub export: Option<ExportConfigFile>,
    /// Synthesis section, if present.
    #[serde(default)]
    pub synthesis: Option<SynthesisConfig>,
    /// Testbench section, if present.
    #[serde(default)]
    pub testbench: Option<TestbenchConfig>,
}

/// The `[export]` section of a `gatery.toml` file, with every field
/// optional (unlike [`ExportConfig`] itself, whose `destination` is
/// required once resolved).
#[derive(Debug, Default, Deserialize)]
pub struct ExportConfigFile {
    /// Overrides the default export destination.
    pub destination: Option<PathBuf>,
    /// Overrides the default write mode.
    pub write_mode: Option<WriteModeConfig>,
    /// Overrides the default code formatter.
    pub code_formatter: Option<FormatterChoice>,
    /// Overrides the root entity name.
    pub entity_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_config_default_destination() {
        let config = ExportConfig::default();
        assert_eq!(config.destination, PathBuf::from("export"));
        assert_eq!(config.write_mode, WriteModeConfig::SingleFile);
    }

    #[test]
    fn gatery_config_default_source() {
        let config = GateryConfig::default();
        assert_eq!(config.source, ConfigSource::Defaults);
        assert!(!config.synthesis.write_constraints);
        assert!(!config.testbench.enabled);
    }

    #[test]
    fn write_mode_round_trips() {
        for mode in [
            WriteModeConfig::SingleFile,
            WriteModeConfig::FilePerEntity,
            WriteModeConfig::FilePerPartition,
        ] {
            let json = serde_json::to_string(&mode).unwrap();
            let back: WriteModeConfig = serde_json::from_str(&json).unwrap();
            assert_eq!(mode, back);
        }
    }
}
