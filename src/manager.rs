//! The autosave context object
//!
//! Built once at startup and shared (`Rc`) with whatever needs it. Bundles
//! the preference store, save coordinator, restore orchestrator, scheduler
//! and settings adapter over one storage backend.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::AutoSaveConfig;
use crate::persistence::{GameHandle, GameHooks, SaveCoordinator};
use crate::platform::{Clock, KeyValueStore, TimerHost};
use crate::preferences::{PreferenceStore, RestorePreference};
use crate::restore::{PromptPresenter, RestoreOrchestrator, RestoreState};
use crate::scheduler::{SaveTrigger, Scheduler};
use crate::settings::{Notifier, Settings, SettingsAdapter, SettingsOutcome, SettingsView};

/// Everything the manager talks to
pub struct Collaborators {
    pub storage: Rc<dyn KeyValueStore>,
    pub clock: Rc<dyn Clock>,
    pub hooks: GameHooks,
    pub prompt: Rc<dyn PromptPresenter>,
    pub settings_view: Rc<dyn SettingsView>,
    pub notifier: Rc<dyn Notifier>,
}

/// Autosave and restore lifecycle for one game
pub struct AutoSaveManager {
    prefs: PreferenceStore,
    coordinator: Rc<SaveCoordinator>,
    orchestrator: RestoreOrchestrator,
    settings: SettingsAdapter,
    scheduler: RefCell<Scheduler>,
}

impl AutoSaveManager {
    pub fn new(config: AutoSaveConfig, parts: Collaborators) -> Self {
        let prefs = PreferenceStore::new(Rc::clone(&parts.storage), &config.keys);
        let coordinator = Rc::new(SaveCoordinator::new(
            parts.storage,
            Rc::clone(&parts.clock),
            parts.hooks,
            &config.keys,
        ));
        let orchestrator = RestoreOrchestrator::new(
            prefs.clone(),
            Rc::clone(&coordinator),
            parts.prompt,
            parts.clock,
        );
        let settings = SettingsAdapter::new(
            prefs.clone(),
            parts.settings_view,
            parts.notifier,
            config.ack_dismiss(),
        );
        let scheduler = Scheduler::new(prefs.clone(), Rc::clone(&coordinator), config.interval());

        Self {
            prefs,
            coordinator,
            orchestrator,
            settings,
            scheduler: RefCell::new(scheduler),
        }
    }

    // === Preferences ===

    pub fn preference(&self) -> RestorePreference {
        self.prefs.preference()
    }

    pub fn set_preference(&self, value: RestorePreference) -> bool {
        self.prefs.set_preference(value)
    }

    /// Set the preference from its persisted literal; unknown values rejected
    pub fn set_preference_str(&self, raw: &str) -> bool {
        self.prefs.set_preference_str(raw)
    }

    /// Whether the game's restart button should ask first
    pub fn confirm_restart(&self) -> bool {
        self.prefs.restart_confirmation()
    }

    pub fn set_confirm_restart(&self, enabled: bool) -> bool {
        self.prefs.set_restart_confirmation(enabled)
    }

    // === Save data ===

    pub fn attach_game(&self, game: GameHandle) {
        self.coordinator.attach_game(game);
    }

    pub fn detach_game(&self) -> Option<GameHandle> {
        self.coordinator.detach_game()
    }

    pub fn auto_save(&self) -> bool {
        self.coordinator.auto_save()
    }

    pub fn has_auto_save(&self) -> bool {
        self.coordinator.has_auto_save()
    }

    pub fn auto_save_timestamp(&self) -> Option<i64> {
        self.coordinator.auto_save_timestamp()
    }

    pub fn restore_auto_save(&self) -> bool {
        self.coordinator.restore_auto_save()
    }

    pub fn clear_auto_save(&self) -> bool {
        self.coordinator.clear_auto_save()
    }

    // === Restore flow ===

    /// Startup restore; see `RestoreOrchestrator::handle_restore`
    pub async fn handle_restore(&self) -> bool {
        self.orchestrator.handle_restore().await
    }

    pub fn restore_state(&self) -> RestoreState {
        self.orchestrator.state()
    }

    // === Scheduling ===

    /// Start periodic and on-exit autosaving
    pub fn init(&self, timers: &dyn TimerHost) {
        self.scheduler.borrow_mut().init(timers);
    }

    pub fn shutdown(&self) {
        self.scheduler.borrow_mut().shutdown();
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.borrow().is_running()
    }

    /// Run an autosave trigger immediately
    pub fn fire(&self, trigger: SaveTrigger) -> bool {
        self.scheduler.borrow().fire(trigger)
    }

    // === Settings ===

    pub fn settings(&self) -> Settings {
        self.settings.current()
    }

    pub async fn present_settings(&self) -> SettingsOutcome {
        self.settings.present_settings().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{ManualClock, ManualTimers, MemoryStore};
    use crate::restore::{PromptResponder, RestoreDecision, RestorePrompt};
    use crate::settings::SettingsResponder;
    use futures::executor::block_on;
    use std::cell::Cell;
    use std::time::Duration;

    struct Disable;

    impl PromptPresenter for Disable {
        fn present(&self, _prompt: RestorePrompt, responder: PromptResponder) {
            responder.resolve(RestoreDecision::DISABLE);
        }
    }

    struct Choose(Settings);

    impl SettingsView for Choose {
        fn present(&self, _current: Settings, responder: SettingsResponder) {
            responder.confirm(self.0);
        }
    }

    struct Quiet;

    impl Notifier for Quiet {
        fn acknowledge(&self, _message: &str, _dismiss_after: Duration) {}
    }

    /// The game writes its own blob; the manager only stamps and restores
    struct Game {
        storage: Rc<MemoryStore>,
        level: Cell<u32>,
        loaded: Cell<bool>,
    }

    fn manager(storage: Rc<MemoryStore>, game: Rc<Game>, settings: Settings) -> AutoSaveManager {
        let (save_game, load_game) = (Rc::clone(&game), Rc::clone(&game));
        let hooks = GameHooks::new()
            .with_save(move |_mode| {
                let blob = save_game.level.get().to_string();
                save_game.storage.set("oi_coach_save", &blob).is_ok()
            })
            .with_load(move || {
                let blob = load_game.storage.get("oi_coach_save").ok().flatten();
                match blob.and_then(|b| b.parse().ok()) {
                    Some(level) => {
                        load_game.level.set(level);
                        load_game.loaded.set(true);
                        true
                    }
                    None => false,
                }
            });

        AutoSaveManager::new(
            AutoSaveConfig::default(),
            Collaborators {
                storage,
                clock: Rc::new(ManualClock::new(5_000)),
                hooks,
                prompt: Rc::new(Disable),
                settings_view: Rc::new(Choose(settings)),
                notifier: Rc::new(Quiet),
            },
        )
    }

    #[test]
    fn test_save_then_restore_across_sessions() {
        let storage = Rc::new(MemoryStore::new());
        let timers = ManualTimers::new();

        // Session one: play, autosave fires
        let game = Rc::new(Game {
            storage: Rc::clone(&storage),
            level: Cell::new(7),
            loaded: Cell::new(false),
        });
        let first = manager(Rc::clone(&storage), Rc::clone(&game), Settings::default());
        assert!(!block_on(first.handle_restore()));
        first.attach_game(GameHandle::new(Rc::clone(&game)));
        first.init(&timers);
        timers.advance(Duration::from_secs(30));
        assert!(first.has_auto_save());
        assert_eq!(first.auto_save_timestamp(), Some(5_000));
        first.shutdown();

        // Session two: fresh game restores level 7, player disables auto-restore
        let game = Rc::new(Game {
            storage: Rc::clone(&storage),
            level: Cell::new(1),
            loaded: Cell::new(false),
        });
        let second = manager(Rc::clone(&storage), Rc::clone(&game), Settings::default());
        assert!(block_on(second.handle_restore()));
        assert!(game.loaded.get());
        assert_eq!(game.level.get(), 7);
        assert_eq!(second.restore_state(), RestoreState::Resolved);
        assert_eq!(second.preference(), RestorePreference::NoRestore);

        // Autosave now off
        second.attach_game(GameHandle::new(Rc::clone(&game)));
        assert!(!second.fire(SaveTrigger::Periodic));
    }

    #[test]
    fn test_settings_roundtrip_through_manager() {
        let storage = Rc::new(MemoryStore::new());
        let game = Rc::new(Game {
            storage: Rc::clone(&storage),
            level: Cell::new(1),
            loaded: Cell::new(false),
        });
        let chosen = Settings {
            restore: RestorePreference::AutoRestore,
            confirm_restart: false,
        };
        let manager = manager(storage, game, chosen);

        assert!(block_on(manager.present_settings()).is_saved());
        assert_eq!(manager.settings(), chosen);
        assert!(!manager.confirm_restart());
        assert!(!manager.set_preference_str("always"));
        assert_eq!(manager.preference(), RestorePreference::AutoRestore);
    }

    #[test]
    fn test_clear_removes_save() {
        let storage = Rc::new(MemoryStore::new());
        let game = Rc::new(Game {
            storage: Rc::clone(&storage),
            level: Cell::new(3),
            loaded: Cell::new(false),
        });
        let manager = manager(Rc::clone(&storage), Rc::clone(&game), Settings::default());
        manager.attach_game(GameHandle::new(game));
        assert!(manager.fire(SaveTrigger::Exit));
        assert!(manager.has_auto_save());

        assert!(manager.clear_auto_save());
        assert!(!manager.has_auto_save());
        assert_eq!(manager.auto_save_timestamp(), None);
        assert!(!manager.restore_auto_save());
    }
}
