//! Autosave record bookkeeping
//!
//! The game owns the save blob format; the coordinator only checks whether a
//! blob exists, stamps autosave times, and routes restores to the load hook.

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use super::hooks::{GameHandle, GameHooks, SaveMode};
use crate::config::StorageKeys;
use crate::platform::{Clock, KeyValueStore, StorageError};

/// Why an autosave did not happen
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SaveError {
    /// No game attached yet; a wiring problem, not a player-facing error
    #[error("game state not attached")]
    NoGame,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Why a restore did not happen
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestoreError {
    #[error("no autosave data")]
    NoSaveData,
    #[error("no load hook wired")]
    NoLoadHook,
    #[error("load hook rejected the save data")]
    LoadRejected,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Sole writer of the autosave timestamp; remover of the save blob
pub struct SaveCoordinator {
    storage: Rc<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
    hooks: GameHooks,
    game: RefCell<Option<GameHandle>>,
    save_key: String,
    timestamp_key: String,
}

impl SaveCoordinator {
    pub fn new(
        storage: Rc<dyn KeyValueStore>,
        clock: Rc<dyn Clock>,
        hooks: GameHooks,
        keys: &StorageKeys,
    ) -> Self {
        Self {
            storage,
            clock,
            hooks,
            game: RefCell::new(None),
            save_key: keys.save.clone(),
            timestamp_key: keys.timestamp.clone(),
        }
    }

    /// Attach the live game; autosaving stays off until this is called
    pub fn attach_game(&self, game: GameHandle) {
        *self.game.borrow_mut() = Some(game);
    }

    pub fn detach_game(&self) -> Option<GameHandle> {
        self.game.borrow_mut().take()
    }

    pub fn has_game(&self) -> bool {
        self.game.borrow().is_some()
    }

    /// Stamp the autosave time. Returns the recorded timestamp.
    pub fn try_auto_save(&self) -> Result<i64, SaveError> {
        if !self.has_game() {
            return Err(SaveError::NoGame);
        }
        let now = self.clock.now_ms();
        self.storage.set(&self.timestamp_key, &now.to_string())?;
        Ok(now)
    }

    pub fn auto_save(&self) -> bool {
        match self.try_auto_save() {
            Ok(at) => {
                log::info!("Autosave recorded at {}", at);
                true
            }
            Err(SaveError::NoGame) => {
                log::warn!("Game state not attached, skipping autosave");
                false
            }
            Err(e) => {
                log::error!("Autosave failed: {}", e);
                false
            }
        }
    }

    /// Ask the game to write its blob without player feedback.
    /// False when no save hook is wired or the hook reports failure.
    pub fn silent_save(&self) -> bool {
        self.hooks.save(SaveMode::Silent).unwrap_or(false)
    }

    pub fn try_has_auto_save(&self) -> Result<bool, StorageError> {
        let blob = self.storage.get(&self.save_key)?;
        Ok(blob.is_some_and(|b| !b.is_empty()))
    }

    /// True iff a non-empty save blob exists
    pub fn has_auto_save(&self) -> bool {
        self.try_has_auto_save().unwrap_or_else(|e| {
            log::error!("Failed to check for autosave: {}", e);
            false
        })
    }

    /// Last autosave time in epoch ms; `None` if unset or not an integer
    pub fn auto_save_timestamp(&self) -> Option<i64> {
        match self.storage.get(&self.timestamp_key) {
            Ok(raw) => raw.and_then(|s| s.trim().parse().ok()),
            Err(e) => {
                log::error!("Failed to read autosave timestamp: {}", e);
                None
            }
        }
    }

    pub fn try_restore_auto_save(&self) -> Result<(), RestoreError> {
        if !self.try_has_auto_save()? {
            return Err(RestoreError::NoSaveData);
        }
        match self.hooks.load() {
            Some(true) => Ok(()),
            Some(false) => Err(RestoreError::LoadRejected),
            None => Err(RestoreError::NoLoadHook),
        }
    }

    /// Load the autosave through the game's load hook
    pub fn restore_auto_save(&self) -> bool {
        match self.try_restore_auto_save() {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to restore autosave: {}", e);
                false
            }
        }
    }

    /// Run the render hook if wired
    pub fn render(&self) -> bool {
        self.hooks.render()
    }

    /// Remove both the save blob and the timestamp. Both removals are always
    /// attempted; the first failure is reported.
    pub fn try_clear_auto_save(&self) -> Result<(), StorageError> {
        let blob = self.storage.remove(&self.save_key);
        let stamp = self.storage.remove(&self.timestamp_key);
        blob.and(stamp)
    }

    pub fn clear_auto_save(&self) -> bool {
        match self.try_clear_auto_save() {
            Ok(()) => {
                log::info!("Autosave data cleared");
                true
            }
            Err(e) => {
                log::error!("Failed to clear autosave data: {}", e);
                false
            }
        }
    }
}
