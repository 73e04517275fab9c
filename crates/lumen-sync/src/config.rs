//! # Sync Configuration
//!
//! Configuration for the offline queue engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     LUMEN_QUEUE_PATH=/var/lib/lumen/offline_queue.json                 │
//! │     LUMEN_REMOTE_TIMEOUT_SECS=10                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/lumen-pos/sync.toml (Linux)                              │
//! │     ~/Library/Application Support/com.lumen.pos/sync.toml (macOS)      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     Queue file in the platform data dir, 10 second remote timeout      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # sync.toml
//! [queue]
//! file_path = "/var/lib/lumen/offline_queue.json"
//!
//! [remote]
//! write_timeout_secs = 10
//! drain_on_reconnect = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Queue Settings
// =============================================================================

/// Settings for the local durable queue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueSettings {
    /// Path of the durable queue file. When absent, the platform data
    /// directory is used.
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

// =============================================================================
// Remote Settings
// =============================================================================

/// Settings for remote-store writes during drain and direct checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Per-write timeout (seconds). A write that exceeds this counts as a
    /// failure and the queued sale stays put.
    #[serde(default = "default_write_timeout")]
    pub write_timeout_secs: u64,

    /// Whether the agent drains automatically on the offline-to-online
    /// transition.
    #[serde(default = "default_true")]
    pub drain_on_reconnect: bool,
}

fn default_write_timeout() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings {
            write_timeout_secs: default_write_timeout(),
            drain_on_reconnect: default_true(),
        }
    }
}

// =============================================================================
// Main Sync Configuration
// =============================================================================

/// Complete configuration for the offline queue engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Local durable queue settings.
    #[serde(default)]
    pub queue: QueueSettings,

    /// Remote write settings.
    #[serde(default)]
    pub remote: RemoteSettings,
}

impl SyncConfig {
    /// Creates a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (sync.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading sync config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load sync config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Sync config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if self.remote.write_timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "write_timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("LUMEN_QUEUE_PATH") {
            debug!(path = %path, "Overriding queue path from environment");
            self.queue.file_path = Some(PathBuf::from(path));
        }

        if let Ok(timeout) = std::env::var("LUMEN_REMOTE_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse::<u64>() {
                debug!(secs, "Overriding remote timeout from environment");
                self.remote.write_timeout_secs = secs;
            }
        }

        if let Ok(drain) = std::env::var("LUMEN_DRAIN_ON_RECONNECT") {
            match drain.to_lowercase().as_str() {
                "true" | "1" => self.remote.drain_on_reconnect = true,
                "false" | "0" => self.remote.drain_on_reconnect = false,
                _ => warn!(value = %drain, "Unknown drain_on_reconnect in environment"),
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "lumen", "pos")
            .map(|dirs| dirs.config_dir().join("sync.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the durable queue file path, configured or platform default.
    pub fn queue_path(&self) -> Option<PathBuf> {
        self.queue.file_path.clone().or_else(|| {
            directories::ProjectDirs::from("com", "lumen", "pos")
                .map(|dirs| dirs.data_dir().join("offline_queue.json"))
        })
    }

    /// Returns the per-write remote timeout.
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.remote.write_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.remote.write_timeout_secs, 10);
        assert!(config.remote.drain_on_reconnect);
        assert!(config.queue.file_path.is_none());
    }

    #[test]
    fn test_config_validation() {
        let mut config = SyncConfig::default();
        assert!(config.validate().is_ok());

        config.remote.write_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = SyncConfig::default();
        config.queue.file_path = Some(PathBuf::from("/tmp/queue.json"));

        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[queue]"));
        assert!(toml_str.contains("[remote]"));

        let parsed: SyncConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.queue.file_path, config.queue.file_path);
        assert_eq!(parsed.remote.write_timeout_secs, 10);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: SyncConfig = toml::from_str("[remote]\nwrite_timeout_secs = 3\n").unwrap();
        assert_eq!(parsed.remote.write_timeout_secs, 3);
        assert!(parsed.remote.drain_on_reconnect);
        assert!(parsed.queue.file_path.is_none());
    }
}
