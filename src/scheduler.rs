//! Autosave triggers
//!
//! Two independent triggers share one policy: a periodic tick and a
//! before-exit hook. Each one re-reads the preference when it fires, so a
//! `NoRestore` choice made mid-session stops autosaving immediately.

use std::rc::Rc;
use std::time::Duration;

use crate::persistence::SaveCoordinator;
use crate::platform::{TimerHandle, TimerHost};
use crate::preferences::PreferenceStore;

/// What fired an autosave attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveTrigger {
    Periodic,
    Exit,
}

/// Owns the periodic and exit timers
pub struct Scheduler {
    prefs: PreferenceStore,
    coordinator: Rc<SaveCoordinator>,
    interval: Duration,
    periodic: Option<TimerHandle>,
    exit: Option<TimerHandle>,
}

impl Scheduler {
    pub fn new(
        prefs: PreferenceStore,
        coordinator: Rc<SaveCoordinator>,
        interval: Duration,
    ) -> Self {
        Self {
            prefs,
            coordinator,
            interval,
            periodic: None,
            exit: None,
        }
    }

    /// Register both triggers. Calling again replaces the previous timers.
    pub fn init(&mut self, timers: &dyn TimerHost) {
        let (prefs, coordinator) = (self.prefs.clone(), Rc::clone(&self.coordinator));
        self.periodic = Some(timers.set_interval(
            self.interval,
            Box::new(move || {
                run_trigger(&prefs, &coordinator, SaveTrigger::Periodic);
            }),
        ));

        let (prefs, coordinator) = (self.prefs.clone(), Rc::clone(&self.coordinator));
        self.exit = Some(timers.on_exit(Box::new(move || {
            run_trigger(&prefs, &coordinator, SaveTrigger::Exit);
        })));

        log::info!(
            "Autosave manager initialized ({}s interval)",
            self.interval.as_secs()
        );
    }

    pub fn is_running(&self) -> bool {
        self.periodic.is_some() || self.exit.is_some()
    }

    /// Cancel both timers
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.periodic.take() {
            handle.cancel();
        }
        if let Some(handle) = self.exit.take() {
            handle.cancel();
        }
    }

    /// Run a trigger by hand (same policy as the timers)
    pub fn fire(&self, trigger: SaveTrigger) -> bool {
        run_trigger(&self.prefs, &self.coordinator, trigger)
    }
}

/// Silent game save followed by an autosave stamp, unless autosaving is
/// switched off or no game is attached. Returns whether the stamp was written.
fn run_trigger(
    prefs: &PreferenceStore,
    coordinator: &SaveCoordinator,
    trigger: SaveTrigger,
) -> bool {
    let preference = prefs.preference();
    if !preference.allows_autosave() {
        log::debug!(
            "{:?} autosave skipped: preference is {}",
            trigger,
            preference
        );
        return false;
    }
    if !coordinator.has_game() {
        log::debug!("{:?} autosave skipped: no game attached", trigger);
        return false;
    }

    coordinator.silent_save();
    coordinator.auto_save()
}
