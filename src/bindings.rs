//! JavaScript surface (WASM only)
//!
//! ```js
//! const autosave = new AutoSave(saveGame, loadGame, renderAll);
//! await autosave.handleRestore();
//! autosave.attachGame(game);
//! autosave.init();
//! ```
//!
//! Exceptions thrown by the game's callbacks count as failures.

use std::rc::Rc;

use js_sys::{Function, Promise};
use wasm_bindgen::prelude::*;

use crate::config::AutoSaveConfig;
use crate::manager::{AutoSaveManager, Collaborators};
use crate::persistence::{GameHandle, GameHooks, SaveMode};
use crate::platform::{KeyValueStore, LocalStorage, MemoryStore, SystemClock, WebTimers};
use crate::ui::{DomRestorePrompt, DomSettingsDialog, DomToast};

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).expect("Failed to init logger");
}

fn hooks_from_js(
    save: Option<Function>,
    load: Option<Function>,
    render: Option<Function>,
) -> GameHooks {
    let mut hooks = GameHooks::new();
    if let Some(save) = save {
        hooks = hooks.with_save(move |mode: SaveMode| {
            match save.call1(&JsValue::UNDEFINED, &JsValue::from_bool(mode.is_silent())) {
                // `undefined` (no explicit result) counts as success
                Ok(result) => result.as_bool().unwrap_or(true),
                Err(e) => {
                    log::error!("saveGame threw: {:?}", e);
                    false
                }
            }
        });
    }
    if let Some(load) = load {
        hooks = hooks.with_load(move || match load.call0(&JsValue::UNDEFINED) {
            Ok(result) => result.is_truthy(),
            Err(e) => {
                log::error!("loadGame threw: {:?}", e);
                false
            }
        });
    }
    if let Some(render) = render {
        hooks = hooks.with_render(move || {
            if let Err(e) = render.call0(&JsValue::UNDEFINED) {
                log::error!("renderAll threw: {:?}", e);
            }
        });
    }
    hooks
}

/// Autosave manager handle for the host page
#[wasm_bindgen]
pub struct AutoSave {
    inner: Rc<AutoSaveManager>,
}

#[wasm_bindgen]
impl AutoSave {
    /// `config` is optional JSON, e.g. `{"interval_ms": 30000}`
    #[wasm_bindgen(constructor)]
    pub fn new(
        save: Option<Function>,
        load: Option<Function>,
        render: Option<Function>,
        config: Option<String>,
    ) -> Result<AutoSave, JsValue> {
        let config = match config {
            Some(json) => {
                AutoSaveConfig::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?
            }
            None => AutoSaveConfig::default(),
        };

        let storage: Rc<dyn KeyValueStore> = match LocalStorage::open() {
            Ok(storage) => Rc::new(storage),
            Err(e) => {
                log::warn!("{}; autosave will not survive a reload", e);
                Rc::new(MemoryStore::new())
            }
        };

        let inner = AutoSaveManager::new(
            config,
            Collaborators {
                storage,
                clock: Rc::new(SystemClock),
                hooks: hooks_from_js(save, load, render),
                prompt: Rc::new(DomRestorePrompt),
                settings_view: Rc::new(DomSettingsDialog),
                notifier: Rc::new(DomToast),
            },
        );
        Ok(AutoSave {
            inner: Rc::new(inner),
        })
    }

    /// Pass `null` to detach
    #[wasm_bindgen(js_name = attachGame)]
    pub fn attach_game(&self, game: JsValue) {
        if game.is_null() || game.is_undefined() {
            self.inner.detach_game();
        } else {
            self.inner.attach_game(GameHandle::new(Rc::new(game)));
        }
    }

    #[wasm_bindgen(js_name = detachGame)]
    pub fn detach_game(&self) {
        self.inner.detach_game();
    }

    #[wasm_bindgen(js_name = getPreference)]
    pub fn get_preference(&self) -> String {
        self.inner.preference().as_str().to_string()
    }

    /// Rejects anything but `auto_restore`, `ask_restore`, `no_restore`
    #[wasm_bindgen(js_name = setPreference)]
    pub fn set_preference(&self, value: &str) -> bool {
        self.inner.set_preference_str(value)
    }

    #[wasm_bindgen(js_name = getRestartConfirmationPreference)]
    pub fn get_restart_confirmation_preference(&self) -> bool {
        self.inner.confirm_restart()
    }

    #[wasm_bindgen(js_name = setRestartConfirmationPreference)]
    pub fn set_restart_confirmation_preference(&self, enabled: bool) -> bool {
        self.inner.set_confirm_restart(enabled)
    }

    #[wasm_bindgen(js_name = autoSave)]
    pub fn auto_save(&self) -> bool {
        self.inner.auto_save()
    }

    #[wasm_bindgen(js_name = hasAutoSave)]
    pub fn has_auto_save(&self) -> bool {
        self.inner.has_auto_save()
    }

    #[wasm_bindgen(js_name = getAutoSaveTimestamp)]
    pub fn get_auto_save_timestamp(&self) -> Option<f64> {
        self.inner.auto_save_timestamp().map(|t| t as f64)
    }

    #[wasm_bindgen(js_name = restoreAutoSave)]
    pub fn restore_auto_save(&self) -> bool {
        self.inner.restore_auto_save()
    }

    #[wasm_bindgen(js_name = clearAutoSave)]
    pub fn clear_auto_save(&self) -> bool {
        self.inner.clear_auto_save()
    }

    /// Resolves to `true` when the autosave was restored
    #[wasm_bindgen(js_name = handleRestore)]
    pub fn handle_restore(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        wasm_bindgen_futures::future_to_promise(async move {
            Ok(JsValue::from_bool(inner.handle_restore().await))
        })
    }

    /// Start periodic autosaving and the `beforeunload` save
    pub fn init(&self) {
        self.inner.init(&WebTimers);
    }

    pub fn shutdown(&self) {
        self.inner.shutdown();
    }

    /// Resolves to `true` when both settings were saved
    #[wasm_bindgen(js_name = showSettingsDialog)]
    pub fn show_settings_dialog(&self) -> Promise {
        let inner = Rc::clone(&self.inner);
        wasm_bindgen_futures::future_to_promise(async move {
            Ok(JsValue::from_bool(
                inner.present_settings().await.is_saved(),
            ))
        })
    }
}
