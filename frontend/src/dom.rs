//! Thin wrappers over the `window` APIs the pages need.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::BeforeUnloadEvent;

use crate::error::AppError;

pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

/// Blocking confirmation dialog. Anything but an explicit "OK" is a no.
pub fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

/// Full page navigation that keeps the current page in history.
pub fn navigate(url: &str) {
    if let Some(window) = web_sys::window() {
        if let Err(err) = window.location().set_href(url) {
            log::error!("navigation to {url} failed: {err:?}");
        }
    }
}

/// Full page navigation that replaces the current history entry.
pub fn redirect(url: &str) {
    if let Some(window) = web_sys::window() {
        if let Err(err) = window.location().replace(url) {
            log::error!("redirect to {url} failed: {err:?}");
        }
    }
}

pub fn current_path() -> String {
    web_sys::window()
        .and_then(|window| window.location().pathname().ok())
        .unwrap_or_default()
}

/// `location.search`, including the leading `?` when present.
pub fn current_search() -> String {
    web_sys::window()
        .and_then(|window| window.location().search().ok())
        .unwrap_or_default()
}

/// Swap the address bar URL without reloading.
pub fn replace_url(url: &str) -> Result<(), AppError> {
    let window = web_sys::window().ok_or_else(|| AppError::Browser("no window".to_string()))?;
    window
        .history()?
        .replace_state_with_url(&JsValue::NULL, "", Some(url))?;
    Ok(())
}

/// Keeps a `beforeunload` prompt installed for as long as it is alive.
pub struct UnsavedChangesGuard {
    listener: Closure<dyn FnMut(BeforeUnloadEvent)>,
}

impl UnsavedChangesGuard {
    pub fn install(message: &'static str) -> Option<Self> {
        let window = web_sys::window()?;
        let listener = Closure::wrap(Box::new(move |e: BeforeUnloadEvent| {
            e.prevent_default();
            e.set_return_value(message);
        }) as Box<dyn FnMut(BeforeUnloadEvent)>);
        window
            .add_event_listener_with_callback("beforeunload", listener.as_ref().unchecked_ref())
            .ok()?;
        Some(Self { listener })
    }
}

impl Drop for UnsavedChangesGuard {
    fn drop(&mut self) {
        if let Some(window) = web_sys::window() {
            let _ = window.remove_event_listener_with_callback(
                "beforeunload",
                self.listener.as_ref().unchecked_ref(),
            );
        }
    }
}
