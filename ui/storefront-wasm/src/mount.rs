//! Listener ownership for replaceable fragments.
//!
//! Markup swapped in through `innerHTML` (product grid, cart rows, product
//! modal) gets its handlers through a `Mounted`. Dropping it detaches every
//! listener, so the previous fragment's closures are freed before the next
//! one is bound.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, EventTarget};

struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

#[derive(Default)]
pub struct Mounted {
    listeners: Vec<Listener>,
}

impl Mounted {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `handler` to `target` for `event`; detached on drop.
    pub fn listen<F>(&mut self, target: &EventTarget, event: &'static str, handler: F)
    where
        F: FnMut(Event) + 'static,
    {
        let callback = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        if target
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .is_err()
        {
            gloo_console::warn!(format!("could not attach {} listener", event));
            return;
        }
        self.listeners.push(Listener {
            target: target.clone(),
            event,
            callback,
        });
    }
}

impl Drop for Mounted {
    fn drop(&mut self) {
        for l in self.listeners.drain(..) {
            let _ = l
                .target
                .remove_event_listener_with_callback(l.event, l.callback.as_ref().unchecked_ref());
        }
    }
}

/// Attach a listener for the lifetime of the page.
pub fn listen_forever<F>(target: &EventTarget, event: &str, handler: F)
where
    F: FnMut(Event) + 'static,
{
    let cb = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    if target
        .add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())
        .is_ok()
    {
        cb.forget();
    }
}
