//! Cross-field validation of an assembled [`crate::GateryConfig`].

use crate::error::ConfigError;
use crate::types::{GateryConfig, WriteModeConfig};

/// Validates a fully assembled [`GateryConfig`], after the layered
/// defaults/file/env/CLI resolution in [`crate::loader::load`] has produced
/// it.
///
/// `file_per_partition` writes one file per partitioned entity underneath
/// `destination`, so if either auxiliary writer is also enabled the
/// destination directory must exist or be creatable.
pub fn validate(config: &GateryConfig) -> Result<(), ConfigError> {
    if config.export.write_mode == WriteModeConfig::FilePerPartition
        && (config.synthesis.write_constraints || config.synthesis.write_clocks)
        && config.export.destination.as_os_str().is_empty()
    {
        return Err(ConfigError::Validation(
            "write_mode = file_per_partition with synthesis auxiliary files enabled requires a non-empty export destination".to_string(),
        ));
    }

    if config.testbench.enabled {
        if let Some(name) = &config.testbench.name {
            if name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "testbench.name must not be blank when set".to_string(),
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExportConfig, SynthesisConfig, TestbenchConfig};
    use std::path::PathBuf;

    #[test]
    fn default_config_is_valid() {
        assert!(validate(&GateryConfig::default()).is_ok());
    }

    #[test]
    fn file_per_partition_with_empty_destination_and_constraints_errors() {
        let config = GateryConfig {
            export: ExportConfig {
                destination: PathBuf::new(),
                write_mode: WriteModeConfig::FilePerPartition,
                ..ExportConfig::default()
            },
            synthesis: SynthesisConfig {
                write_constraints: true,
                ..SynthesisConfig::default()
            },
            ..GateryConfig::default()
        };
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn blank_testbench_name_errors() {
        let config = GateryConfig {
            testbench: TestbenchConfig {
                enabled: true,
                name: Some("  ".to_string()),
                output_path: None,
            },
            ..GateryConfig::default()
        };
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
