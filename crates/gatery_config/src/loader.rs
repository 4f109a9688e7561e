//! Layered configuration resolution: built-in defaults, an optional
//! `gatery.toml` project file, environment variable overrides, and finally
//! explicit CLI-flag overrides, in that order of increasing priority.

use crate::error::ConfigError;
use crate::resolve::validate;
use crate::types::{ConfigSource, ExportConfigFile, GateryConfig, GateryConfigFile};
use std::path::{Path, PathBuf};

/// Explicit overrides supplied on the command line, applied after
/// environment variables so a flag always wins.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Overrides `export.destination`.
    pub destination: Option<PathBuf>,
    /// Overrides `export.entity_name`.
    pub entity_name: Option<String>,
}

/// Loads a [`GateryConfig`] for the project rooted at `project_dir`.
///
/// Resolution order, each layer overriding the fields the previous one set:
/// 1. [`GateryConfig::default`]
/// 2. `<project_dir>/gatery.toml`, if present
/// 3. `GATERY_EXPORT_DESTINATION` and `GATERY_SYNTH_TOOL` environment variables
/// 4. `overrides`
///
/// The result is validated with [`validate`] before being returned.
pub fn load(project_dir: &Path, overrides: &CliOverrides) -> Result<GateryConfig, ConfigError> {
    let config_path = project_dir.join("gatery.toml");
    let mut config = if config_path.exists() {
        let content = std::fs::read_to_string(&config_path)?;
        let mut config = load_from_str(&content)?;
        config.source = ConfigSource::File(config_path);
        config
    } else {
        GateryConfig::default()
    };

    apply_env(&mut config);
    apply_cli_overrides(&mut config, overrides);

    validate(&config)?;
    Ok(config)
}

/// Parses a `gatery.toml` document's contents into a [`GateryConfig`],
/// layering it over [`GateryConfig::default`]. Does not consult the
/// environment or apply CLI overrides; useful for testing without
/// filesystem or process-environment dependencies.
pub fn load_from_str(content: &str) -> Result<GateryConfig, ConfigError> {
    let file: GateryConfigFile =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
    Ok(merge(GateryConfig::default(), file))
}

fn merge(mut config: GateryConfig, file: GateryConfigFile) -> GateryConfig {
    if let Some(export) = file.export {
        merge_export(&mut config, export);
    }
    if let Some(synthesis) = file.synthesis {
        config.synthesis = synthesis;
    }
    if let Some(testbench) = file.testbench {
        config.testbench = testbench;
    }
    config
}

fn merge_export(config: &mut GateryConfig, export: ExportConfigFile) {
    if let Some(destination) = export.destination {
        config.export.destination = destination;
    }
    if let Some(write_mode) = export.write_mode {
        config.export.write_mode = write_mode;
    }
    if let Some(code_formatter) = export.code_formatter {
        config.export.code_formatter = code_formatter;
    }
    if export.entity_name.is_some() {
        config.export.entity_name = export.entity_name;
    }
}

fn apply_env(config: &mut GateryConfig) {
    if let Ok(destination) = std::env::var("GATERY_EXPORT_DESTINATION") {
        config.export.destination = PathBuf::from(destination);
    }
}

fn apply_cli_overrides(config: &mut GateryConfig, overrides: &CliOverrides) {
    if let Some(destination) = &overrides.destination {
        config.export.destination = destination.clone();
    }
    if overrides.entity_name.is_some() {
        config.export.entity_name = overrides.entity_name.clone();
    }
}
