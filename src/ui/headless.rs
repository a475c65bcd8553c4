//! Presenters for hosts without a UI (native runs, automation)

use std::cell::RefCell;
use std::time::Duration;

use crate::restore::{PromptPresenter, PromptResponder, RestoreDecision, RestorePrompt};
use crate::settings::{Notifier, Settings, SettingsResponder, SettingsView};

/// Answers every restore prompt with a fixed decision
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedAnswerPrompt {
    pub decision: RestoreDecision,
}

impl FixedAnswerPrompt {
    pub fn new(decision: RestoreDecision) -> Self {
        Self { decision }
    }
}

impl PromptPresenter for FixedAnswerPrompt {
    fn present(&self, prompt: RestorePrompt, responder: PromptResponder) {
        log::info!(
            "Game restored (saved {}); disable auto-restore: {}",
            prompt.saved_at_label,
            self.decision.disable
        );
        responder.resolve(self.decision);
    }
}

/// Settings "dialog" that submits queued selections, cancelling when empty
#[derive(Debug, Default)]
pub struct ScriptedSettingsView {
    queue: RefCell<Vec<Settings>>,
}

impl ScriptedSettingsView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the selection the next dialog will submit
    pub fn push(&self, settings: Settings) {
        self.queue.borrow_mut().push(settings);
    }
}

impl SettingsView for ScriptedSettingsView {
    fn present(&self, current: Settings, responder: SettingsResponder) {
        log::debug!("Settings dialog opened with {:?}", current);
        let next = {
            let mut queue = self.queue.borrow_mut();
            if queue.is_empty() {
                None
            } else {
                Some(queue.remove(0))
            }
        };
        match next {
            Some(settings) => responder.confirm(settings),
            None => responder.cancel(),
        }
    }
}

/// Writes acknowledgments to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn acknowledge(&self, message: &str, dismiss_after: Duration) {
        log::info!("{} (dismisses after {:?})", message, dismiss_after);
    }
}
