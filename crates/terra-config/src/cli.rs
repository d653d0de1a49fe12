//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Mesh streaming command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "terra", about = "Geo-referenced mesh streaming")]
pub struct CliArgs {
    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Directory that relative asset paths resolve against.
    #[arg(long)]
    pub asset_dir: Option<PathBuf>,

    /// Map zoom level of the headless camera.
    #[arg(long, default_value_t = 18.0)]
    pub zoom: f64,

    /// Number of frames to run. The camera zooms out a little each frame.
    #[arg(long, default_value_t = 120)]
    pub frames: u32,

    /// Cull against the tighter debug border.
    #[arg(long)]
    pub visualize_culling: bool,

    /// OBJ files to register, relative to the asset directory.
    pub assets: Vec<String>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(ref dir) = args.asset_dir {
            self.assets.base_dir = dir.clone();
        }
        if args.visualize_culling {
            self.debug.visualize_frustum_culling = true;
        }
    }
}
