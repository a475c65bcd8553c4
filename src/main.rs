//! Autosave Keeper entry point
//!
//! The browser build is driven from JavaScript through `bindings::AutoSave`.
//! Natively this runs a simulated two-session lifecycle against in-memory
//! storage and virtual timers.

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use autosave_keeper::platform::{KeyValueStore, ManualClock, ManualTimers, MemoryStore};
    use autosave_keeper::ui::{FixedAnswerPrompt, LogNotifier, ScriptedSettingsView};
    use autosave_keeper::{
        AutoSaveConfig, AutoSaveManager, Collaborators, GameHandle, GameHooks, RestoreDecision,
        RestorePreference, Settings,
    };
    use futures::executor::block_on;
    use serde::{Deserialize, Serialize};

    /// Stand-in for the real game state
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    struct DemoGame {
        level: u32,
        score: u64,
    }

    fn hooks(game: Rc<RefCell<DemoGame>>, storage: Rc<MemoryStore>, save_key: String) -> GameHooks {
        let (save_game, save_storage, blob_key) =
            (Rc::clone(&game), Rc::clone(&storage), save_key.clone());
        GameHooks::new()
            .with_save(move |mode| {
                let Ok(json) = serde_json::to_string(&*save_game.borrow()) else {
                    return false;
                };
                if !mode.is_silent() {
                    log::info!("Game saved");
                }
                save_storage.set(&blob_key, &json).is_ok()
            })
            .with_load(move || {
                let Some(json) = storage.get(&save_key).ok().flatten() else {
                    return false;
                };
                match serde_json::from_str::<DemoGame>(&json) {
                    Ok(state) => {
                        *game.borrow_mut() = state;
                        true
                    }
                    Err(e) => {
                        log::error!("Corrupt save: {}", e);
                        false
                    }
                }
            })
            .with_render(|| log::info!("Board redrawn"))
    }

    fn session(
        storage: &Rc<MemoryStore>,
        clock: &Rc<ManualClock>,
        answer: RestoreDecision,
    ) -> (
        AutoSaveManager,
        Rc<RefCell<DemoGame>>,
        Rc<ScriptedSettingsView>,
    ) {
        let config = AutoSaveConfig::default();
        let game = Rc::new(RefCell::new(DemoGame::default()));
        let settings_view = Rc::new(ScriptedSettingsView::new());
        let manager = AutoSaveManager::new(
            config.clone(),
            Collaborators {
                storage: storage.clone(),
                clock: clock.clone(),
                hooks: hooks(
                    Rc::clone(&game),
                    Rc::clone(storage),
                    config.keys.save.clone(),
                ),
                prompt: Rc::new(FixedAnswerPrompt::new(answer)),
                settings_view: settings_view.clone(),
                notifier: Rc::new(LogNotifier),
            },
        );
        (manager, game, settings_view)
    }

    pub fn run() {
        let storage = Rc::new(MemoryStore::new());
        let clock = Rc::new(ManualClock::new(1_700_000_000_000));

        // Session one: fresh start, play for a minute, close the tab
        {
            let timers = ManualTimers::new();
            let (manager, game, _) = session(&storage, &clock, RestoreDecision::KEEP);
            let restored = block_on(manager.handle_restore());
            println!(
                "session 1: restored = {} ({:?})",
                restored,
                manager.restore_state()
            );

            manager.attach_game(GameHandle::new(Rc::clone(&game)));
            manager.init(&timers);
            for level in 1..=2 {
                {
                    let mut g = game.borrow_mut();
                    g.level = level;
                    g.score += 250;
                }
                clock.advance(30_000);
                timers.advance(Duration::from_secs(30));
            }
            game.borrow_mut().level = 3;
            timers.fire_exit();
            println!(
                "session 1: autosave at {:?}, has save = {}",
                manager.auto_save_timestamp(),
                manager.has_auto_save()
            );
        }

        // Session two: ten minutes later, restore and decline further prompts
        clock.advance(10 * 60 * 1000);
        {
            let (manager, game, settings_view) =
                session(&storage, &clock, RestoreDecision::DISABLE);
            let restored = block_on(manager.handle_restore());
            println!(
                "session 2: restored = {} ({:?}), game = {:?}",
                restored,
                manager.restore_state(),
                game.borrow()
            );
            println!("session 2: preference now {}", manager.preference());

            settings_view.push(Settings {
                restore: RestorePreference::AskRestore,
                confirm_restart: false,
            });
            let outcome = block_on(manager.present_settings());
            println!(
                "session 2: settings {:?} -> {:?}, confirm restart = {}",
                outcome,
                manager.preference(),
                manager.confirm_restart()
            );
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Autosave Keeper (native) starting...");
    log::info!("Native mode runs a simulated session - build for wasm32 to embed in a page");
    demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is bindings::start, this is just to satisfy the compiler
}
