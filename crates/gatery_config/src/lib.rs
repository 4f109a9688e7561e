//! Parsing and validation of `gatery.toml` export configuration files.
//!
//! This crate reads the project configuration file and produces a strongly
//! typed [`GateryConfig`] via [`loader::load`]'s layered defaults, project
//! file, environment, and CLI-flag resolution.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::{ConfigError, ConfigResult};
pub use loader::{load, load_from_str, CliOverrides};
pub use resolve::validate;
pub use types::*;
