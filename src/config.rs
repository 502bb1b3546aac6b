use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::game::resources::ResourceType;
use crate::game::unlocks::{reference_thresholds, UnlockPolicy};

/// Environment variable that points at an explicit config file.
pub const CONFIG_PATH_ENV: &str = "CRYSTAL_CONFIG";

// ── Config tree ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Period of the idle production tick.
    pub tick_period_ms: u64,
    /// Period of the history sampler.
    pub history_period_ms: u64,
    /// How many history samples are kept.
    pub history_capacity: usize,
    /// Resource whose lifetime amount gates every unlock.
    pub base_resource: ResourceType,
    pub unlock_thresholds: BTreeMap<ResourceType, f64>,
    pub resonance: ResonanceConfig,
    pub server: ServerConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 100,
            history_period_ms: 5_000,
            history_capacity: 20,
            base_resource: ResourceType::Quartz,
            unlock_thresholds: reference_thresholds(),
            resonance: ResonanceConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// What happens to dialogue and multiplier when the alchemist cannot be
/// reached or answers with garbage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Show the consolation line and reset the multiplier to 1.0.
    Fallback,
    /// Leave dialogue and multiplier exactly as they were.
    Preserve,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResonanceConfig {
    pub timeout_ms: u64,
    pub min_multiplier: f64,
    pub max_multiplier: f64,
    /// Clamp returned multipliers into `[min_multiplier, max_multiplier]`.
    /// When off, only negative values are raised to 0.
    pub clamp: bool,
    pub failure_policy: FailurePolicy,
    pub model: String,
    pub endpoint: String,
    pub lore_capacity: usize,
}

impl Default for ResonanceConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            min_multiplier: 1.0,
            max_multiplier: 3.0,
            clamp: true,
            failure_policy: FailurePolicy::Fallback,
            model: "gemini-3-flash-preview".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            lore_capacity: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub ws_addr: String,
    pub http_addr: String,
    pub broadcast_period_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ws_addr: "127.0.0.1:9001".to_string(),
            http_addr: "127.0.0.1:9002".to_string(),
            broadcast_period_ms: 100,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
    #[error("threshold for {0} must be a finite, non-negative number")]
    InvalidThreshold(ResourceType),
    #[error("base resource {0} must have threshold 0 if listed")]
    BaseThresholdNotZero(ResourceType),
    #[error("multiplier range [{0}, {1}] is invalid")]
    InvalidMultiplierRange(f64, f64),
}

// ── Loading ─────────────────────────────────────────────────────────

impl GameConfig {
    /// Loads from `$CRYSTAL_CONFIG`, then from the per-user config dir,
    /// falling back to defaults when neither exists.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Self::load_from_file(Path::new(&path));
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from_file(&path),
            _ => {
                info!("No config file found, using built-in defaults");
                Self::default()
            }
        }
    }

    /// Load the config from a JSON file on disk.
    /// Falls back to defaults if the file is missing or malformed.
    pub fn load_from_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<GameConfig>(&contents) {
                Ok(config) => {
                    info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!(
                        "Failed to parse config at {}: {}. Using defaults.",
                        path.display(),
                        e
                    );
                    GameConfig::default()
                }
            },
            Err(e) => {
                warn!(
                    "Failed to read config at {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                GameConfig::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period_ms == 0 {
            return Err(ConfigError::ZeroValue("tick_period_ms"));
        }
        if self.history_period_ms == 0 {
            return Err(ConfigError::ZeroValue("history_period_ms"));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroValue("history_capacity"));
        }
        if self.server.broadcast_period_ms == 0 {
            return Err(ConfigError::ZeroValue("server.broadcast_period_ms"));
        }
        if self.resonance.timeout_ms == 0 {
            return Err(ConfigError::ZeroValue("resonance.timeout_ms"));
        }
        for (&resource, &threshold) in &self.unlock_thresholds {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(ConfigError::InvalidThreshold(resource));
            }
        }
        if let Some(&threshold) = self.unlock_thresholds.get(&self.base_resource) {
            if threshold != 0.0 {
                return Err(ConfigError::BaseThresholdNotZero(self.base_resource));
            }
        }
        let (min, max) = (self.resonance.min_multiplier, self.resonance.max_multiplier);
        if !(min.is_finite() && max.is_finite()) || min < 0.0 || min > max {
            return Err(ConfigError::InvalidMultiplierRange(min, max));
        }
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    pub fn history_period(&self) -> Duration {
        Duration::from_millis(self.history_period_ms)
    }

    pub fn broadcast_period(&self) -> Duration {
        Duration::from_millis(self.server.broadcast_period_ms)
    }

    pub fn unlock_policy(&self) -> UnlockPolicy {
        UnlockPolicy::new(self.base_resource, self.unlock_thresholds.clone())
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("crystal-alchemy").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behaviour() {
        let config = GameConfig::default();
        assert_eq!(config.tick_period(), Duration::from_millis(100));
        assert_eq!(config.history_period(), Duration::from_secs(5));
        assert_eq!(config.history_capacity, 20);
        assert_eq!(config.unlock_thresholds[&ResourceType::Ruby], 25_000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config: GameConfig = serde_json::from_str(
            r#"{ "tick_period_ms": 250, "resonance": { "failure_policy": "preserve" } }"#,
        )
        .unwrap();
        assert_eq!(config.tick_period_ms, 250);
        assert_eq!(config.resonance.failure_policy, FailurePolicy::Preserve);
        assert_eq!(config.resonance.max_multiplier, 3.0);
        assert_eq!(config.history_capacity, 20);
    }

    #[test]
    fn thresholds_deserialize_by_name() {
        let config: GameConfig = serde_json::from_str(
            r#"{ "unlock_thresholds": { "Quartz": 0, "Ruby": 10 } }"#,
        )
        .unwrap();
        let policy = config.unlock_policy();
        assert!(policy.is_unlocked(ResourceType::Ruby, 10.0));
        assert!(!policy.is_unlocked(ResourceType::Amethyst, 1e12));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = GameConfig::default();
        config.tick_period_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroValue("tick_period_ms")));

        let mut config = GameConfig::default();
        config.unlock_thresholds.insert(ResourceType::Quartz, 5.0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::BaseThresholdNotZero(ResourceType::Quartz))
        );

        let mut config = GameConfig::default();
        config.resonance.min_multiplier = 4.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMultiplierRange(..))
        ));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = GameConfig::load_from_file(Path::new("/definitely/not/here.json"));
        assert_eq!(config, GameConfig::default());
    }
}
