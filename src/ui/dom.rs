//! DOM overlays for the restore prompt, settings dialog and toast
//!
//! Markup only carries class names; styling belongs to the host page.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlInputElement};

use crate::platform::timers::browser_delay_ms;
use crate::preferences::RestorePreference;
use crate::restore::{PromptPresenter, PromptResponder, RestoreDecision, RestorePrompt};
use crate::settings::{Notifier, Settings, SettingsResponder, SettingsView};

fn document() -> Option<Document> {
    web_sys::window()?.document()
}

/// Create `<div id=.. class="autosave-modal">` with `markup` and append it to `<body>`
fn mount_modal(document: &Document, id: &str, markup: &str) -> Result<Element, JsValue> {
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;
    let modal = document.create_element("div")?;
    modal.set_id(id);
    modal.set_class_name("autosave-modal");
    modal.set_inner_html(markup);
    body.append_child(&modal)?;
    Ok(modal)
}

fn on_click(modal: &Element, selector: &str, mut handler: impl FnMut() + 'static) {
    let Some(button) = modal.query_selector(selector).ok().flatten() else {
        log::warn!("Missing dialog button {}", selector);
        return;
    };
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| handler());
    let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
    closure.forget();
}

/// "Game restored - disable auto-restore?" overlay
#[derive(Debug, Default, Clone, Copy)]
pub struct DomRestorePrompt;

fn restore_markup(prompt: &RestorePrompt) -> String {
    format!(
        r#"<div class="autosave-dialog">
  <h3>Game restored</h3>
  <p>Found an autosave from your last session (saved {}).</p>
  <p>Disable auto-restore?</p>
  <div class="autosave-actions">
    <button class="autosave-keep">Keep enabled</button>
    <button class="autosave-disable">Disable auto-restore</button>
  </div>
</div>"#,
        prompt.saved_at_label
    )
}

impl PromptPresenter for DomRestorePrompt {
    fn present(&self, prompt: RestorePrompt, responder: PromptResponder) {
        let Some(document) = document() else {
            responder.keep();
            return;
        };
        let modal = match mount_modal(
            &document,
            "autosave-restore-modal",
            &restore_markup(&prompt),
        ) {
            Ok(modal) => modal,
            Err(e) => {
                log::error!("Failed to show restore prompt: {:?}", e);
                responder.keep();
                return;
            }
        };

        let responder = Rc::new(RefCell::new(Some(responder)));
        for (selector, decision) in [
            (".autosave-keep", RestoreDecision::KEEP),
            (".autosave-disable", RestoreDecision::DISABLE),
        ] {
            let modal_el = modal.clone();
            let responder = Rc::clone(&responder);
            on_click(&modal, selector, move || {
                modal_el.remove();
                if let Some(responder) = responder.borrow_mut().take() {
                    responder.resolve(decision);
                }
            });
        }
    }
}

/// Settings overlay: three restore options plus the restart toggle
#[derive(Debug, Default, Clone, Copy)]
pub struct DomSettingsDialog;

fn settings_markup(current: &Settings) -> String {
    let options: String = RestorePreference::ALL
        .iter()
        .map(|pref| {
            format!(
                r#"    <label class="autosave-option">
      <input type="radio" name="autosave-pref" value="{}"{}>
      <span>{}</span>
      <div class="autosave-hint">{}</div>
    </label>
"#,
                pref.as_str(),
                if *pref == current.restore {
                    " checked"
                } else {
                    ""
                },
                pref.label(),
                pref.description()
            )
        })
        .collect();

    format!(
        r#"<div class="autosave-dialog">
  <h3>Game settings</h3>
  <h4>Autosave</h4>
  <div class="autosave-group">
{}  </div>
  <h4>Restart</h4>
  <label class="autosave-option">
    <input type="checkbox" name="reset-prompt-pref"{}>
    <span>Confirm before restarting</span>
  </label>
  <div class="autosave-actions">
    <button class="autosave-cancel">Cancel</button>
    <button class="autosave-save">Save</button>
  </div>
</div>"#,
        options,
        if current.confirm_restart {
            " checked"
        } else {
            ""
        }
    )
}

fn read_selection(modal: &Element, current: Settings) -> Settings {
    let restore = modal
        .query_selector(r#"input[name="autosave-pref"]:checked"#)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        .and_then(|input| input.value().parse().ok())
        .unwrap_or(current.restore);
    let confirm_restart = modal
        .query_selector(r#"input[name="reset-prompt-pref"]"#)
        .ok()
        .flatten()
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        .map(|input| input.checked())
        .unwrap_or(current.confirm_restart);
    Settings {
        restore,
        confirm_restart,
    }
}

impl SettingsView for DomSettingsDialog {
    fn present(&self, current: Settings, responder: SettingsResponder) {
        let Some(document) = document() else {
            responder.cancel();
            return;
        };
        let modal = match mount_modal(
            &document,
            "autosave-settings-modal",
            &settings_markup(&current),
        ) {
            Ok(modal) => modal,
            Err(e) => {
                log::error!("Failed to show settings dialog: {:?}", e);
                responder.cancel();
                return;
            }
        };

        let responder = Rc::new(RefCell::new(Some(responder)));
        {
            let modal_el = modal.clone();
            let responder = Rc::clone(&responder);
            on_click(&modal, ".autosave-cancel", move || {
                modal_el.remove();
                if let Some(responder) = responder.borrow_mut().take() {
                    responder.cancel();
                }
            });
        }
        {
            let modal_el = modal.clone();
            on_click(&modal, ".autosave-save", move || {
                let selection = read_selection(&modal_el, current);
                modal_el.remove();
                if let Some(responder) = responder.borrow_mut().take() {
                    responder.confirm(selection);
                }
            });
        }
    }
}

/// Corner toast that removes itself after the given delay
#[derive(Debug, Default, Clone, Copy)]
pub struct DomToast;

impl Notifier for DomToast {
    fn acknowledge(&self, message: &str, dismiss_after: Duration) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };
        let Some(body) = document.body() else {
            return;
        };
        let Ok(toast) = document.create_element("div") else {
            return;
        };
        toast.set_class_name("autosave-toast");
        toast.set_text_content(Some(message));
        if body.append_child(&toast).is_err() {
            return;
        }

        let closure = Closure::once(move || toast.remove());
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            browser_delay_ms(dismiss_after),
        );
        closure.forget();
    }
}
