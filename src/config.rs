//! Autosave configuration
//!
//! Loaded from JSON (all fields optional) or built from defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_ACK_DISMISS_MS, DEFAULT_INTERVAL_MS, DEFAULT_KEY_PREFIX};

/// Storage keys for the four persisted values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    /// Serialized game state, written by the game itself
    pub save: String,
    /// Epoch-ms timestamp of the last autosave
    pub timestamp: String,
    /// Restore preference literal
    pub preference: String,
    /// `"true"` / `"false"` restart confirmation toggle
    pub restart_confirmation: String,
}

impl StorageKeys {
    /// Derive all keys from a shared prefix (`{prefix}_save`, ...)
    pub fn with_prefix(prefix: &str) -> Self {
        Self {
            save: format!("{prefix}_save"),
            timestamp: format!("{prefix}_autosave_timestamp"),
            preference: format!("{prefix}_autosave_preference"),
            restart_confirmation: format!("{prefix}_reset_prompt"),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_KEY_PREFIX)
    }
}

/// Autosave manager configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    /// Periodic autosave interval
    pub interval_ms: u64,
    /// How long the "settings saved" acknowledgment stays up
    pub ack_dismiss_ms: u64,
    pub keys: StorageKeys,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            ack_dismiss_ms: DEFAULT_ACK_DISMISS_MS,
            keys: StorageKeys::default(),
        }
    }
}

impl AutoSaveConfig {
    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Config whose keys all share `prefix`
    pub fn with_key_prefix(prefix: &str) -> Self {
        Self {
            keys: StorageKeys::with_prefix(prefix),
            ..Self::default()
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn ack_dismiss(&self) -> Duration {
        Duration::from_millis(self.ack_dismiss_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keys_match_legacy_layout() {
        let keys = StorageKeys::default();
        assert_eq!(keys.save, "oi_coach_save");
        assert_eq!(keys.timestamp, "oi_coach_autosave_timestamp");
        assert_eq!(keys.preference, "oi_coach_autosave_preference");
        assert_eq!(keys.restart_confirmation, "oi_coach_reset_prompt");
    }

    #[test]
    fn test_from_json_partial() {
        let config = AutoSaveConfig::from_json(r#"{ "interval_ms": 5000 }"#).unwrap();
        assert_eq!(config.interval(), Duration::from_secs(5));
        assert_eq!(config.ack_dismiss(), Duration::from_secs(2));
        assert_eq!(config.keys, StorageKeys::default());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(AutoSaveConfig::from_json("not json").is_err());
        assert!(AutoSaveConfig::from_json(r#"{ "interval_ms": "soon" }"#).is_err());
    }

    #[test]
    fn test_with_key_prefix() {
        let config = AutoSaveConfig::with_key_prefix("demo");
        assert_eq!(config.keys.save, "demo_save");
        assert_eq!(config.interval_ms, DEFAULT_INTERVAL_MS);
    }
}
