//! Bootstrap 5 modal interop.
//!
//! The page ships Bootstrap's bundle; we only drive `bootstrap.Modal`.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Element};

pub const HIDDEN_EVENT: &str = "hidden.bs.modal";

#[wasm_bindgen]
extern "C" {
    pub type BsModal;

    #[wasm_bindgen(js_namespace = ["bootstrap", "Modal"], js_name = getOrCreateInstance, catch)]
    fn get_or_create_instance(el: &Element) -> Result<BsModal, JsValue>;

    #[wasm_bindgen(js_namespace = ["bootstrap", "Modal"], js_name = getInstance, catch)]
    fn get_instance(el: &Element) -> Result<Option<BsModal>, JsValue>;

    #[wasm_bindgen(method)]
    fn show(this: &BsModal);

    #[wasm_bindgen(method)]
    fn hide(this: &BsModal);
}

/// Show `el` as a Bootstrap modal.
pub fn show(el: &Element) -> Result<(), JsValue> {
    get_or_create_instance(el)?.show();
    Ok(())
}

/// Hide `el` if Bootstrap knows about it.
pub fn hide(el: &Element) {
    match get_instance(el) {
        Ok(Some(instance)) => instance.hide(),
        Ok(None) => {}
        Err(e) => gloo_console::warn!("bootstrap.Modal.getInstance failed", e),
    }
}

/// Run `f` once, the next time `el` finishes hiding.
pub fn on_hidden_once<F>(el: &Element, f: F)
where
    F: FnOnce() + 'static,
{
    let cb = Closure::once_into_js(f);
    let opts = AddEventListenerOptions::new();
    opts.set_once(true);
    if el
        .add_event_listener_with_callback_and_add_event_listener_options(
            HIDDEN_EVENT,
            cb.unchecked_ref(),
            &opts,
        )
        .is_err()
    {
        gloo_console::warn!("could not watch modal hide");
    }
}
