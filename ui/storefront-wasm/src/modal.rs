//! Template-backed modals (login, register, ...).
//!
//! Markup lives in `<script type="text/template" id="tpl-modal-{name}">`
//! blocks under `#modal-template`. A closed modal is sanitized and cached so
//! the next open reuses it without the previous input.

use crate::bootstrap;
use crate::dom;
use crate::forms;
use crate::state::SessionRef;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, HtmlInputElement, HtmlTextAreaElement};
use zs_storefront_core::modal_registry::{OpenPlan, template_id};

pub const TRIGGER_SELECTOR: &str = ".btn-open-modal";
const VISIBLE_MODAL_SELECTOR: &str = ".modal.show";

pub fn open(session: &SessionRef, name: &str) {
    let visible = dom::query(VISIBLE_MODAL_SELECTOR);
    let plan = session
        .modals
        .borrow_mut()
        .request_open(name, visible.is_some());

    match (plan, visible) {
        (Some(OpenPlan::ShowNow(name)), _) => load_and_show(session, &name),
        (Some(OpenPlan::AfterHide(_)), Some(current)) => {
            let s = session.clone();
            bootstrap::on_hidden_once(&current, move || {
                let pending = s.modals.borrow_mut().take_pending();
                if let Some(name) = pending {
                    load_and_show(&s, &name);
                }
            });
            blur_active();
            bootstrap::hide(&current);
        }
        _ => {}
    }
}

fn load_and_show(session: &SessionRef, name: &str) {
    let markup = session
        .modals
        .borrow()
        .markup_for(name, |n| template(session, n));
    match markup {
        Some(html) => inject_and_show(session, name, &html),
        None => gloo_console::warn!(format!("no template for modal {}", name)),
    }
}

fn template(session: &SessionRef, name: &str) -> Option<String> {
    let templates = session.els.modal_templates.as_ref()?;
    let tpl = dom::query_within(templates, &format!("#{}", template_id(name)))?;
    Some(tpl.inner_html().trim().to_string())
}

fn inject_and_show(session: &SessionRef, name: &str, html: &str) {
    let container = &session.els.modal_container;
    container.set_inner_html(html);
    let Some(modal_el) = dom::query_within(container, ".modal") else {
        gloo_console::error!(format!("modal {} has no .modal element", name));
        return;
    };

    let s = session.clone();
    let name = name.to_owned();
    let el = modal_el.clone();
    bootstrap::on_hidden_once(&modal_el, move || {
        forms::forget_within(&s, &el);
        if let Some(clean) = sanitize(&el) {
            s.modals.borrow_mut().remember(&name, clean);
        }
        el.remove();
    });

    if let Err(e) = bootstrap::show(&modal_el) {
        gloo_console::error!("bootstrap.Modal show failed", e);
    }
}

/// Copy of the modal without entered values or validation state.
fn sanitize(modal_el: &Element) -> Option<String> {
    let clone = modal_el
        .clone_node_with_deep(true)
        .ok()?
        .dyn_into::<Element>()
        .ok()?;

    for field in dom::query_all_within(&clone, "input, textarea, select") {
        dom::remove_class(&field, "is-invalid");
        dom::remove_class(&field, "is-valid");
        let _ = field.remove_attribute("value");
        if let Some(input) = field.dyn_ref::<HtmlInputElement>() {
            input.set_value("");
            input.set_checked(false);
            let _ = input.remove_attribute("checked");
        } else if let Some(area) = field.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value("");
            area.set_text_content(None);
        }
    }
    for feedback in dom::query_all_within(&clone, ".invalid-feedback") {
        dom::set_text(&feedback, "");
    }

    Some(clone.outer_html())
}

fn blur_active() {
    if let Some(active) = dom::document()
        .active_element()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    {
        let _ = active.blur();
    }
}
