//! Configuration for the mesh streaming layer.
//!
//! Settings persist to disk as `config.ron` and can be overridden from the
//! command line. Sections missing from the file fall back to defaults, so
//! older files keep loading as fields are added.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{AssetsConfig, Config, DebugConfig, LodConfig, default_config_dir};
pub use error::ConfigError;
