//! Player-facing autosave settings
//!
//! Persisted as two independent keys through the `PreferenceStore`, not as a
//! single blob.

use std::rc::Rc;
use std::time::Duration;

use futures::channel::oneshot;
use serde::{Deserialize, Serialize};

use crate::preferences::{PreferenceStore, RestorePreference};

/// Acknowledgment text shown after a successful commit
pub const SETTINGS_SAVED_MESSAGE: &str = "Settings saved";

/// Snapshot of the settings dialog's values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Restore behavior on load
    pub restore: RestorePreference,
    /// Ask before restarting a game
    pub confirm_restart: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            restore: RestorePreference::AskRestore,
            confirm_restart: true,
        }
    }
}

impl Settings {
    /// Read both values (defaults on missing/unreadable data)
    pub fn load(prefs: &PreferenceStore) -> Self {
        Self {
            restore: prefs.preference(),
            confirm_restart: prefs.restart_confirmation(),
        }
    }

    /// Write both values. The second write is attempted even if the first
    /// fails; they are separate keys.
    pub fn save(&self, prefs: &PreferenceStore) -> SettingsOutcome {
        let restore_saved = prefs.set_preference(self.restore);
        let confirm_saved = prefs.set_restart_confirmation(self.confirm_restart);
        SettingsOutcome::Committed {
            restore_saved,
            confirm_saved,
        }
    }
}

/// Result of a settings interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsOutcome {
    /// Dialog dismissed; nothing written
    Cancelled,
    Committed {
        restore_saved: bool,
        confirm_saved: bool,
    },
}

impl SettingsOutcome {
    /// Both values were written
    pub fn is_saved(&self) -> bool {
        matches!(
            self,
            SettingsOutcome::Committed {
                restore_saved: true,
                confirm_saved: true,
            }
        )
    }
}

/// One-shot reply handle given to a `SettingsView`
///
/// Dropping it counts as cancel.
#[derive(Debug)]
pub struct SettingsResponder {
    tx: oneshot::Sender<Option<Settings>>,
}

impl SettingsResponder {
    pub fn confirm(self, settings: Settings) {
        let _ = self.tx.send(Some(settings));
    }

    pub fn cancel(self) {
        let _ = self.tx.send(None);
    }
}

/// Shows the settings dialog
pub trait SettingsView {
    /// Display `current` and resolve `responder` with the player's choice
    fn present(&self, current: Settings, responder: SettingsResponder);
}

/// Transient, self-dismissing notifications
pub trait Notifier {
    fn acknowledge(&self, message: &str, dismiss_after: Duration);
}

/// Connects the settings dialog to the preference store
pub struct SettingsAdapter {
    prefs: PreferenceStore,
    view: Rc<dyn SettingsView>,
    notifier: Rc<dyn Notifier>,
    ack_dismiss: Duration,
}

impl SettingsAdapter {
    pub fn new(
        prefs: PreferenceStore,
        view: Rc<dyn SettingsView>,
        notifier: Rc<dyn Notifier>,
        ack_dismiss: Duration,
    ) -> Self {
        Self {
            prefs,
            view,
            notifier,
            ack_dismiss,
        }
    }

    pub fn current(&self) -> Settings {
        Settings::load(&self.prefs)
    }

    /// Show the dialog and commit the player's selection
    pub async fn present_settings(&self) -> SettingsOutcome {
        let (tx, rx) = oneshot::channel();
        self.view.present(self.current(), SettingsResponder { tx });

        match rx.await {
            Ok(Some(settings)) => self.commit(settings),
            Ok(None) | Err(_) => {
                log::debug!("Settings dialog cancelled");
                SettingsOutcome::Cancelled
            }
        }
    }

    /// Persist `settings`; acknowledges only when both writes succeed
    pub fn commit(&self, settings: Settings) -> SettingsOutcome {
        let outcome = settings.save(&self.prefs);
        if outcome.is_saved() {
            log::info!(
                "Settings saved (restore: {}, confirm restart: {})",
                settings.restore,
                settings.confirm_restart
            );
            self.notifier
                .acknowledge(SETTINGS_SAVED_MESSAGE, self.ack_dismiss);
        } else {
            log::error!("Settings only partially saved: {:?}", outcome);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageKeys;
    use crate::platform::{KeyValueStore, MemoryStore, StorageError};
    use futures::executor::block_on;
    use std::cell::RefCell;

    /// Fails writes to a single key
    struct KeyFailStore {
        inner: MemoryStore,
        failing_key: String,
    }

    impl KeyValueStore for KeyFailStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == self.failing_key {
                return Err(StorageError::write(key, "quota exceeded"));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    struct FakeView {
        choice: Option<Settings>,
        seen: RefCell<Vec<Settings>>,
    }

    impl SettingsView for FakeView {
        fn present(&self, current: Settings, responder: SettingsResponder) {
            self.seen.borrow_mut().push(current);
            match self.choice {
                Some(settings) => responder.confirm(settings),
                None => responder.cancel(),
            }
        }
    }

    #[derive(Default)]
    struct FakeNotifier {
        shown: RefCell<Vec<(String, Duration)>>,
    }

    impl Notifier for FakeNotifier {
        fn acknowledge(&self, message: &str, dismiss_after: Duration) {
            self.shown
                .borrow_mut()
                .push((message.to_string(), dismiss_after));
        }
    }

    fn adapter(
        storage: Rc<dyn KeyValueStore>,
        choice: Option<Settings>,
    ) -> (
        SettingsAdapter,
        Rc<FakeView>,
        Rc<FakeNotifier>,
        PreferenceStore,
    ) {
        let prefs = PreferenceStore::new(storage, &StorageKeys::default());
        let view = Rc::new(FakeView {
            choice,
            seen: RefCell::new(Vec::new()),
        });
        let notifier = Rc::new(FakeNotifier::default());
        let adapter = SettingsAdapter::new(
            prefs.clone(),
            view.clone(),
            notifier.clone(),
            Duration::from_secs(2),
        );
        (adapter, view, notifier, prefs)
    }

    #[test]
    fn test_commit_ask_restore_without_confirmation() {
        let storage = Rc::new(MemoryStore::new());
        let choice = Settings {
            restore: RestorePreference::AskRestore,
            confirm_restart: false,
        };
        let (adapter, view, notifier, prefs) = adapter(storage, Some(choice));

        let outcome = block_on(adapter.present_settings());
        assert!(outcome.is_saved());
        assert_eq!(prefs.preference(), RestorePreference::AskRestore);
        assert!(!prefs.restart_confirmation());

        assert_eq!(*view.seen.borrow(), vec![Settings::default()]);
        assert_eq!(
            *notifier.shown.borrow(),
            vec![(SETTINGS_SAVED_MESSAGE.to_string(), Duration::from_secs(2))]
        );
    }

    #[test]
    fn test_dialog_shows_current_values() {
        let storage = Rc::new(MemoryStore::new());
        let (adapter, view, _, prefs) = adapter(storage, None);
        prefs.set_preference(RestorePreference::AutoRestore);
        prefs.set_restart_confirmation(false);

        block_on(adapter.present_settings());
        assert_eq!(
            view.seen.borrow()[0],
            Settings {
                restore: RestorePreference::AutoRestore,
                confirm_restart: false,
            }
        );
    }

    #[test]
    fn test_cancel_writes_nothing() {
        let storage = Rc::new(MemoryStore::new());
        let (adapter, _, notifier, _) = adapter(storage.clone(), None);

        assert_eq!(
            block_on(adapter.present_settings()),
            SettingsOutcome::Cancelled
        );
        assert!(storage.is_empty());
        assert!(notifier.shown.borrow().is_empty());
    }

    #[test]
    fn test_second_write_attempted_after_first_fails() {
        let keys = StorageKeys::default();
        let storage = Rc::new(KeyFailStore {
            inner: MemoryStore::new(),
            failing_key: keys.preference.clone(),
        });
        let choice = Settings {
            restore: RestorePreference::NoRestore,
            confirm_restart: false,
        };
        let (adapter, _, notifier, prefs) = adapter(storage, Some(choice));

        let outcome = block_on(adapter.present_settings());
        assert_eq!(
            outcome,
            SettingsOutcome::Committed {
                restore_saved: false,
                confirm_saved: true,
            }
        );
        assert_eq!(prefs.preference(), RestorePreference::AskRestore);
        assert!(!prefs.restart_confirmation());
        assert!(notifier.shown.borrow().is_empty());
    }

    #[test]
    fn test_settings_json_shape() {
        let json = serde_json::to_string(&Settings::default()).unwrap();
        assert_eq!(json, r#"{"restore":"ask_restore","confirm_restart":true}"#);
    }
}
