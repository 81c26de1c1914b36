//! Event binding.
//!
//! Wires the page-lifetime listeners. Fragments that get replaced (grid,
//! cart rows, product modal) bind through `Mounted` in their own modules.

use crate::cart_panel;
use crate::catalog;
use crate::dom;
use crate::forms;
use crate::modal;
use crate::mount::listen_forever;
use crate::search;
use crate::state::SessionRef;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event};

/// Bind all UI event listeners. Call once after init.
pub fn bind_events(session: &SessionRef) {
    // ── Cart ──
    cart_panel::render(session);
    cart_panel::bind(session);

    // ── Catalog ──
    catalog::bind(session);
    search::bind(session);

    // ── Template modals ──
    forms::bind(session);

    let s = session.clone();
    listen_forever(&dom::document(), "click", move |e: Event| {
        let Some(trigger) = e
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .and_then(|t| t.closest(modal::TRIGGER_SELECTOR).ok().flatten())
        else {
            return;
        };
        e.prevent_default();
        if let Some(name) = dom::data(&trigger, "type") {
            modal::open(&s, &name);
        }
    });
}
