//! Auto-save configuration.

use serde::{Deserialize, Serialize};

/// Configuration for auto-save behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    /// Whether every accepted edit is written back to the source.
    pub enabled: bool,

    /// Quiet period after the last change before saving, in milliseconds.
    ///
    /// Zero saves right after each change.
    pub debounce_ms: u64,

    /// Maximum delay before forcing a save.
    ///
    /// If changes keep coming, save after this many milliseconds
    /// since the first unsaved change.
    pub max_delay_ms: u64,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            debounce_ms: 0,
            max_delay_ms: 30_000,
        }
    }
}

impl AutoSaveConfig {
    /// Auto-save on every change.
    pub fn immediate() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    /// Check if auto-save should trigger given the time since last change
    /// and time since first unsaved change.
    pub fn should_save(&self, since_last_change_ms: u64, since_first_unsaved_ms: u64) -> bool {
        if !self.enabled {
            return false;
        }

        since_last_change_ms >= self.debounce_ms || since_first_unsaved_ms >= self.max_delay_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_disabled() {
        let config = AutoSaveConfig::default();
        assert!(!config.enabled);
        assert!(!config.should_save(10_000, 60_000));
    }

    #[test]
    fn test_immediate_saves_at_once() {
        assert!(AutoSaveConfig::immediate().should_save(0, 0));
    }

    #[test]
    fn test_should_save_debounce_and_max_delay() {
        let config = AutoSaveConfig {
            enabled: true,
            debounce_ms: 2000,
            max_delay_ms: 30_000,
        };

        assert!(!config.should_save(1000, 1000));
        assert!(config.should_save(2500, 2500));
        assert!(!config.should_save(500, 25_000));
        assert!(config.should_save(500, 35_000));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AutoSaveConfig = serde_json::from_str(r#"{"enabled": true}"#).unwrap();
        assert!(config.enabled);
        assert_eq!(config.max_delay_ms, 30_000);
    }
}
