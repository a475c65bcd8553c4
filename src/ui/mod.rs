//! Prompt, settings and notification surfaces
//!
//! - `headless`: log-only / scripted implementations
//! - `dom`: browser overlays (WASM only)

pub mod headless;

#[cfg(target_arch = "wasm32")]
pub mod dom;

pub use headless::{FixedAnswerPrompt, LogNotifier, ScriptedSettingsView};

#[cfg(target_arch = "wasm32")]
pub use dom::{DomRestorePrompt, DomSettingsDialog, DomToast};
