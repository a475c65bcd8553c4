//! Restore preference and restart-confirmation flag
//!
//! Both are persisted as plain strings, one key each. Reads never fail:
//! missing, unreadable or unrecognized values fall back to the defaults
//! (`AskRestore`, confirmation on).

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::StorageKeys;
use crate::platform::{KeyValueStore, StorageError};

/// What to do with an autosave when the game loads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RestorePreference {
    /// Restore without asking
    AutoRestore,
    /// Restore, then ask whether to keep auto-restoring
    #[default]
    AskRestore,
    /// Never restore (also stops autosaving)
    NoRestore,
}

impl RestorePreference {
    pub const ALL: [RestorePreference; 3] = [
        RestorePreference::AutoRestore,
        RestorePreference::AskRestore,
        RestorePreference::NoRestore,
    ];

    /// Persisted literal
    pub fn as_str(&self) -> &'static str {
        match self {
            RestorePreference::AutoRestore => "auto_restore",
            RestorePreference::AskRestore => "ask_restore",
            RestorePreference::NoRestore => "no_restore",
        }
    }

    /// Short label for settings surfaces
    pub fn label(&self) -> &'static str {
        match self {
            RestorePreference::AutoRestore => "Restore automatically",
            RestorePreference::AskRestore => "Restore and ask (recommended)",
            RestorePreference::NoRestore => "Don't restore",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RestorePreference::AutoRestore => {
                "Restore the last game on load without showing a prompt"
            }
            RestorePreference::AskRestore => {
                "Restore the last game, then ask whether to disable auto-restore"
            }
            RestorePreference::NoRestore => {
                "Disable auto-restore; a new game must be started manually"
            }
        }
    }

    /// Whether autosave triggers should write at all
    pub fn allows_autosave(&self) -> bool {
        *self != RestorePreference::NoRestore
    }
}

impl fmt::Display for RestorePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value that is not one of the three preference literals
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown restore preference `{0}`")]
pub struct InvalidPreference(pub String);

impl FromStr for RestorePreference {
    type Err = InvalidPreference;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RestorePreference::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| InvalidPreference(s.to_string()))
    }
}

/// Reads and writes the two persisted preference scalars
#[derive(Clone)]
pub struct PreferenceStore {
    storage: Rc<dyn KeyValueStore>,
    preference_key: String,
    restart_key: String,
}

impl PreferenceStore {
    pub fn new(storage: Rc<dyn KeyValueStore>, keys: &StorageKeys) -> Self {
        Self {
            storage,
            preference_key: keys.preference.clone(),
            restart_key: keys.restart_confirmation.clone(),
        }
    }

    /// Current restore preference (`AskRestore` when unset or unreadable)
    pub fn preference(&self) -> RestorePreference {
        match self.storage.get(&self.preference_key) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e: InvalidPreference| {
                log::debug!("{}, using default", e);
                RestorePreference::default()
            }),
            Ok(None) => RestorePreference::default(),
            Err(e) => {
                log::error!("Failed to read restore preference: {}", e);
                RestorePreference::default()
            }
        }
    }

    pub fn try_set_preference(&self, value: RestorePreference) -> Result<(), StorageError> {
        self.storage.set(&self.preference_key, value.as_str())
    }

    /// Persist a preference; false if the write failed
    pub fn set_preference(&self, value: RestorePreference) -> bool {
        match self.try_set_preference(value) {
            Ok(()) => {
                log::info!("Restore preference set to {}", value);
                true
            }
            Err(e) => {
                log::error!("Failed to save restore preference: {}", e);
                false
            }
        }
    }

    /// Persist a preference given as its literal. Unknown literals are
    /// rejected without touching storage.
    pub fn set_preference_str(&self, raw: &str) -> bool {
        match raw.parse() {
            Ok(value) => self.set_preference(value),
            Err(e) => {
                log::warn!("Rejected preference write: {}", e);
                false
            }
        }
    }

    /// Whether restarting should ask for confirmation (default true)
    pub fn restart_confirmation(&self) -> bool {
        match self.storage.get(&self.restart_key) {
            Ok(Some(raw)) => match raw.as_str() {
                "true" => true,
                "false" => false,
                _ => true,
            },
            Ok(None) => true,
            Err(e) => {
                log::error!("Failed to read restart confirmation preference: {}", e);
                true
            }
        }
    }

    pub fn try_set_restart_confirmation(&self, enabled: bool) -> Result<(), StorageError> {
        let raw = if enabled { "true" } else { "false" };
        self.storage.set(&self.restart_key, raw)
    }

    pub fn set_restart_confirmation(&self, enabled: bool) -> bool {
        match self.try_set_restart_confirmation(enabled) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to save restart confirmation preference: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MemoryStore;
    use proptest::prelude::*;

    fn store() -> (Rc<MemoryStore>, PreferenceStore) {
        let backend = Rc::new(MemoryStore::new());
        let prefs = PreferenceStore::new(backend.clone(), &StorageKeys::default());
        (backend, prefs)
    }

    #[test]
    fn test_defaults_on_fresh_storage() {
        let (_, prefs) = store();
        assert_eq!(prefs.preference(), RestorePreference::AskRestore);
        assert!(prefs.restart_confirmation());
    }

    #[test]
    fn test_unknown_literal_reads_as_default() {
        let (backend, prefs) = store();
        backend
            .set("oi_coach_autosave_preference", "sometimes")
            .unwrap();
        backend.set("oi_coach_reset_prompt", "maybe").unwrap();
        assert_eq!(prefs.preference(), RestorePreference::AskRestore);
        assert!(prefs.restart_confirmation());
    }

    #[test]
    fn test_read_failure_falls_back() {
        let (backend, prefs) = store();
        assert!(prefs.set_preference(RestorePreference::NoRestore));
        assert!(prefs.set_restart_confirmation(false));

        backend.set_fail_reads(true);
        assert_eq!(prefs.preference(), RestorePreference::AskRestore);
        assert!(prefs.restart_confirmation());
    }

    #[test]
    fn test_write_failure_returns_false() {
        let (backend, prefs) = store();
        backend.set_fail_writes(true);
        assert!(!prefs.set_preference(RestorePreference::AutoRestore));
        assert!(!prefs.set_restart_confirmation(false));
        assert!(matches!(
            prefs.try_set_preference(RestorePreference::AutoRestore),
            Err(StorageError::Write { .. })
        ));

        backend.set_fail_writes(false);
        assert_eq!(prefs.preference(), RestorePreference::AskRestore);
        assert!(prefs.restart_confirmation());
    }

    #[test]
    fn test_persisted_literals() {
        let (backend, prefs) = store();
        prefs.set_preference(RestorePreference::AutoRestore);
        prefs.set_restart_confirmation(false);
        assert_eq!(
            backend
                .get("oi_coach_autosave_preference")
                .unwrap()
                .as_deref(),
            Some("auto_restore")
        );
        assert_eq!(
            backend.get("oi_coach_reset_prompt").unwrap().as_deref(),
            Some("false")
        );
    }

    #[test]
    fn test_restart_confirmation_roundtrip() {
        let (_, prefs) = store();
        assert!(prefs.set_restart_confirmation(false));
        assert!(!prefs.restart_confirmation());
        assert!(prefs.set_restart_confirmation(true));
        assert!(prefs.restart_confirmation());
    }

    #[test]
    fn test_serde_uses_persisted_literals() {
        let json = serde_json::to_string(&RestorePreference::NoRestore).unwrap();
        assert_eq!(json, "\"no_restore\"");
    }

    fn any_preference() -> impl Strategy<Value = RestorePreference> {
        prop::sample::select(RestorePreference::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn test_valid_preference_roundtrips(first in any_preference(), second in any_preference()) {
            let (_, prefs) = store();
            prop_assert!(prefs.set_preference(first));
            prop_assert_eq!(prefs.preference(), first);
            prop_assert!(prefs.set_preference_str(second.as_str()));
            prop_assert_eq!(prefs.preference(), second);
        }

        #[test]
        fn test_invalid_literal_preserves_previous(
            prior in prop::option::of(any_preference()),
            raw in "\\PC*"
        ) {
            prop_assume!(raw.parse::<RestorePreference>().is_err());
            let (_, prefs) = store();
            if let Some(prior) = prior {
                prefs.set_preference(prior);
            }
            prop_assert!(!prefs.set_preference_str(&raw));
            prop_assert_eq!(prefs.preference(), prior.unwrap_or_default());
        }
    }
}
