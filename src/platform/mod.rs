//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (LocalStorage on web, in-memory elsewhere)
//! - Time (wall clock, relative labels)
//! - Timers (intervals, before-exit hooks)

pub mod storage;
pub mod time;
pub mod timers;

pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use time::{Clock, ManualClock, SystemClock, format_age};
pub use timers::{ManualTimers, TimerHandle, TimerHost};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
#[cfg(target_arch = "wasm32")]
pub use timers::WebTimers;
