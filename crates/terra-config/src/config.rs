//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Asset fetching and retry settings.
    pub assets: AssetsConfig,
    /// Culling and level-of-detail settings.
    pub lod: LodConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Asset fetching configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetsConfig {
    /// Directory that relative file uris resolve against.
    pub base_dir: PathBuf,
    /// Reader threads for local files (0 = one per CPU).
    pub worker_threads: usize,
    /// Load attempts per asset, including the first.
    pub max_load_attempts: u32,
    /// Frames to wait after the first failure. Doubles per further failure.
    pub retry_backoff_ticks: u64,
    /// Upper bound for the retry delay in frames.
    pub max_backoff_ticks: u64,
}

/// Culling and level-of-detail configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LodConfig {
    /// Screen-contribution thresholds, strictly decreasing. One level each.
    pub thresholds: Vec<f64>,
    /// Clip-space border for frustum rejection.
    pub clip_border: f64,
    /// Border used while culling is visualized.
    pub debug_clip_border: f64,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Cull against the tighter debug border so rejection is visible.
    pub visualize_frustum_culling: bool,
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("assets"),
            worker_threads: 0,
            max_load_attempts: 5,
            retry_backoff_ticks: 30,
            max_backoff_ticks: 1800,
        }
    }
}

impl Default for LodConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![0.3, 0.1, 0.05, 0.03, 0.01, 0.005],
            clip_border: 1.0,
            debug_clip_border: 0.75,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            visualize_frustum_culling: false,
            log_level: "info".to_string(),
        }
    }
}

/// Platform config directory for this application, e.g. `~/.config/terra`.
/// Falls back to the working directory when the platform has none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("terra"))
        .unwrap_or_else(|| PathBuf::from("."))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let thresholds = &self.lod.thresholds;
        if thresholds.is_empty() || thresholds.len() > usize::from(u8::MAX) {
            return Err(ConfigError::InvalidValue {
                field: "lod.thresholds",
                reason: "must hold between 1 and 255 values",
            });
        }
        let positive = thresholds.iter().all(|&t| t.is_finite() && t > 0.0);
        if !positive || !thresholds.windows(2).all(|w| w[1] < w[0]) {
            return Err(ConfigError::InvalidValue {
                field: "lod.thresholds",
                reason: "must be positive and strictly decreasing",
            });
        }
        let borders = [self.lod.clip_border, self.lod.debug_clip_border];
        if borders.iter().any(|&b| !b.is_finite() || b <= 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "lod.clip_border",
                reason: "borders must be finite and positive",
            });
        }
        if self.assets.max_load_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "assets.max_load_attempts",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("max_load_attempts: 5"));
        assert!(ron_str.contains("debug_clip_border: 0.75"));
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(assets: (worker_threads: 2))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.assets.worker_threads, 2);
        assert_eq!(config.assets.max_load_attempts, 5);
        assert_eq!(config.lod, LodConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.assets.base_dir = PathBuf::from("/srv/meshes");
        config.lod.thresholds = vec![0.5, 0.2];
        config.debug.visualize_frustum_culling = true;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.lod.clip_border = 1.5;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().lod.clip_border, 1.5);
        assert!(modified.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_thresholds_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.ron"),
            "(lod: (thresholds: [0.1, 0.3]))",
        )
        .unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: "lod.thresholds",
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_ron_comments_preserved() {
        let ron_str = "// This is a comment\n(\n  // Another comment\n)";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_nan_values_rejected() {
        let mut config = Config::default();
        config.lod.thresholds = vec![0.3, f64::NAN, 0.01];
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.lod.clip_border = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.lod.debug_clip_border = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let mut config = Config::default();
        config.assets.max_load_attempts = 0;
        assert!(config.validate().is_err());
    }
}
