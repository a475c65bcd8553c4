//! Autosave persistence
//!
//! Features:
//! - Game hooks (save/load/render) wired at construction
//! - Autosave timestamp tracking
//! - Save presence checks and clearing
//! - Restores routed through the game's own load logic

pub mod coordinator;
pub mod hooks;

pub use coordinator::{RestoreError, SaveCoordinator, SaveError};
pub use hooks::{GameHandle, GameHooks, SaveMode};
