//! `gatery init` — writes a default `gatery.toml` into a project directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CliError, CliResult};
use crate::{GlobalArgs, InitArgs};

const DEFAULT_GATERY_TOML: &str = r#"[export]
destination = "export"
write_mode = "single_file"
code_formatter = "default"

[synthesis]
tool = "default"
write_constraints = false
write_clocks = false
write_project_script = false

[testbench]
enabled = false
"#;

/// Runs the `gatery init` command. Returns the process exit code on
/// success.
pub fn run(args: &InitArgs, global: &GlobalArgs) -> CliResult<i32> {
    let project_dir = args.path.clone().unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&project_dir).map_err(|source| CliError::Io {
        path: project_dir.clone(),
        source,
    })?;

    let config_path = project_dir.join("gatery.toml");
    if config_path.exists() {
        return Err(CliError::Fixture(format!(
            "{} already exists",
            config_path.display()
        )));
    }

    write_gatery_toml(&config_path)?;

    if !global.quiet {
        eprintln!("     Created {}", config_path.display());
    }

    Ok(0)
}

fn write_gatery_toml(path: &Path) -> CliResult<()> {
    fs::write(path, DEFAULT_GATERY_TOML).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn global() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
        }
    }

    #[test]
    fn writes_default_config() {
        let tmp = TempDir::new().unwrap();
        let args = InitArgs {
            path: Some(tmp.path().to_path_buf()),
        };
        run(&args, &global()).unwrap();

        let config_path = tmp.path().join("gatery.toml");
        assert!(config_path.exists());

        let parsed = gatery_config::load_from_str(&fs::read_to_string(&config_path).unwrap()).unwrap();
        assert_eq!(parsed.export.destination, PathBuf::from("export"));
        assert!(!parsed.synthesis.write_constraints);
    }

    #[test]
    fn refuses_to_overwrite_existing_config() {
        let tmp = TempDir::new().unwrap();
        let args = InitArgs {
            path: Some(tmp.path().to_path_buf()),
        };
        run(&args, &global()).unwrap();

        let err = run(&args, &global()).unwrap_err();
        assert!(matches!(err, CliError::Fixture(_)));
    }

    #[test]
    fn creates_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("nested").join("project");
        let args = InitArgs {
            path: Some(nested.clone()),
        };
        run(&args, &global()).unwrap();
        assert!(nested.join("gatery.toml").exists());
    }
}
