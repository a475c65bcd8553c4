//! Autosave Keeper - autosave and restore-on-load for browser games
//!
//! Core modules:
//! - `preferences`: Persisted restore preference and restart confirmation
//! - `persistence`: Game hooks and autosave record bookkeeping
//! - `restore`: Restore-on-load state machine and prompt channel
//! - `scheduler`: Periodic and on-exit autosave triggers
//! - `settings`: Settings dialog adapter
//! - `manager`: The context object tying it all together
//! - `platform`: Browser/native storage, clock and timers
//! - `ui`: Headless and DOM presenters

pub mod config;
pub mod manager;
pub mod persistence;
pub mod platform;
pub mod preferences;
pub mod restore;
pub mod scheduler;
pub mod settings;
pub mod ui;

#[cfg(target_arch = "wasm32")]
pub mod bindings;

pub use config::{AutoSaveConfig, StorageKeys};
pub use manager::{AutoSaveManager, Collaborators};
pub use persistence::{GameHandle, GameHooks, SaveMode};
pub use preferences::RestorePreference;
pub use restore::{RestoreDecision, RestoreState, SkipReason};
pub use scheduler::SaveTrigger;
pub use settings::{Settings, SettingsOutcome};

/// Default configuration constants
pub mod consts {
    /// Periodic autosave interval (30 seconds)
    pub const DEFAULT_INTERVAL_MS: u64 = 30_000;
    /// Settings acknowledgment lifetime (2 seconds)
    pub const DEFAULT_ACK_DISMISS_MS: u64 = 2_000;
    /// Storage key prefix shared with existing saves
    pub const DEFAULT_KEY_PREFIX: &str = "oi_coach";
}
