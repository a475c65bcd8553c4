//! Restore-on-load decision flow
//!
//! At startup the orchestrator combines the persisted preference with the
//! presence of autosave data:
//!
//! ```text
//! Idle -> Evaluating -+-> Skipped(Disabled)       preference is NoRestore
//!                     +-> Skipped(NoSaveData)     nothing to restore
//!                     +-> Restoring -+-> Skipped(RestoreFailed)
//!                                    +-> Prompting -> Resolved   AskRestore, first time
//!                                    +-> Resolved                otherwise
//! ```
//!
//! The prompt is a single-shot request/response: the presenter receives a
//! `PromptResponder` and the orchestrator suspends until it is resolved.

use std::cell::Cell;
use std::rc::Rc;

use futures::channel::oneshot;

use crate::persistence::SaveCoordinator;
use crate::platform::{Clock, format_age};
use crate::preferences::{PreferenceStore, RestorePreference};

/// Information shown in the restore prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestorePrompt {
    /// Epoch-ms time of the restored autosave, if recorded
    pub saved_at: Option<i64>,
    /// Human-readable age of the save ("5 mins ago", "unknown time")
    pub saved_at_label: String,
}

/// The player's answer to the restore prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestoreDecision {
    /// Turn auto-restore off for future loads
    pub disable: bool,
}

impl RestoreDecision {
    pub const KEEP: RestoreDecision = RestoreDecision { disable: false };
    pub const DISABLE: RestoreDecision = RestoreDecision { disable: true };
}

/// One-shot reply handle given to a `PromptPresenter`
///
/// Dropping it without answering counts as "keep auto-restore".
#[derive(Debug)]
pub struct PromptResponder {
    tx: oneshot::Sender<RestoreDecision>,
}

impl PromptResponder {
    pub fn resolve(self, decision: RestoreDecision) {
        // Receiver gone means nobody is waiting any more
        let _ = self.tx.send(decision);
    }

    pub fn keep(self) {
        self.resolve(RestoreDecision::KEEP);
    }

    pub fn disable(self) {
        self.resolve(RestoreDecision::DISABLE);
    }
}

/// Shows the "game restored" prompt
pub trait PromptPresenter {
    /// Display the prompt and resolve `responder` once the player chooses.
    /// May resolve synchronously or from a later event handler.
    fn present(&self, prompt: RestorePrompt, responder: PromptResponder);
}

/// Why restoration was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Preference is `NoRestore`
    Disabled,
    /// No (non-empty) save blob
    NoSaveData,
    /// The load hook failed or is not wired
    RestoreFailed,
}

/// Restore flow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestoreState {
    #[default]
    Idle,
    Evaluating,
    Restoring,
    /// Waiting on the player
    Prompting,
    /// Restored (prompt answered or not needed)
    Resolved,
    Skipped(SkipReason),
}

/// Restore-on-load state machine
pub struct RestoreOrchestrator {
    prefs: PreferenceStore,
    coordinator: Rc<SaveCoordinator>,
    presenter: Rc<dyn PromptPresenter>,
    clock: Rc<dyn Clock>,
    state: Cell<RestoreState>,
    /// At most one prompt per process lifetime
    prompt_shown: Cell<bool>,
}

impl RestoreOrchestrator {
    pub fn new(
        prefs: PreferenceStore,
        coordinator: Rc<SaveCoordinator>,
        presenter: Rc<dyn PromptPresenter>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self {
            prefs,
            coordinator,
            presenter,
            clock,
            state: Cell::new(RestoreState::Idle),
            prompt_shown: Cell::new(false),
        }
    }

    pub fn state(&self) -> RestoreState {
        self.state.get()
    }

    pub fn prompt_shown(&self) -> bool {
        self.prompt_shown.get()
    }

    /// Run the restore flow. Resolves to whether the autosave was restored;
    /// the prompt answer (if any) is committed before this resolves but does
    /// not change the result.
    pub async fn handle_restore(&self) -> bool {
        self.state.set(RestoreState::Evaluating);

        let preference = self.prefs.preference();
        if preference == RestorePreference::NoRestore {
            log::info!("Auto-restore disabled");
            return self.skip(SkipReason::Disabled);
        }

        if !self.coordinator.has_auto_save() {
            log::info!("No autosave data found");
            return self.skip(SkipReason::NoSaveData);
        }

        self.state.set(RestoreState::Restoring);
        if !self.coordinator.restore_auto_save() {
            return self.skip(SkipReason::RestoreFailed);
        }
        self.coordinator.render();
        log::info!("Autosave restored");

        if preference == RestorePreference::AskRestore && !self.prompt_shown.replace(true) {
            self.state.set(RestoreState::Prompting);
            let decision = self.ask().await;
            if decision.disable && self.prefs.set_preference(RestorePreference::NoRestore) {
                log::info!("Auto-restore disabled from restore prompt");
            }
        }

        self.state.set(RestoreState::Resolved);
        true
    }

    /// Prompt contents for the current autosave
    pub fn prompt(&self) -> RestorePrompt {
        let saved_at = self.coordinator.auto_save_timestamp();
        let saved_at_label = saved_at
            .map(|at| format_age(at, self.clock.now_ms()))
            .unwrap_or_else(|| "unknown time".to_string());
        RestorePrompt {
            saved_at,
            saved_at_label,
        }
    }

    async fn ask(&self) -> RestoreDecision {
        let (tx, rx) = oneshot::channel();
        self.presenter
            .present(self.prompt(), PromptResponder { tx });
        rx.await.unwrap_or_else(|_| {
            log::debug!("Restore prompt closed without a choice");
            RestoreDecision::KEEP
        })
    }

    fn skip(&self, reason: SkipReason) -> bool {
        self.state.set(RestoreState::Skipped(reason));
        false
    }
}
