//! Account forms inside the template modals.
//!
//! Listeners sit on the document because the forms are injected and cached
//! by `modal`, so they come and go with every open.

use crate::dom;
use crate::mount::listen_forever;
use crate::state::SessionRef;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlFormElement, HtmlInputElement};
use zs_storefront_core::forms::{self, FieldCheck, FieldRole, FormKind, FormValues};

const FEEDBACK: &str = ".invalid-feedback";
const TOGGLE_ATTR: &str = "data-toggle-password";

fn input(form: &Element, role: FieldRole) -> Option<HtmlInputElement> {
    dom::query_within(form, role.selector()).and_then(|el| el.dyn_into().ok())
}

fn read_values(form: &Element) -> FormValues {
    FormValues {
        email: input(form, FieldRole::Email).map(|i| i.value()),
        password: input(form, FieldRole::Password).map(|i| i.value()),
        confirm_password: input(form, FieldRole::ConfirmPassword).map(|i| i.value()),
        terms_accepted: input(form, FieldRole::Terms).map(|i| i.checked()),
    }
}

fn feedback_of(field: &Element) -> Option<Element> {
    let parent = field.parent_element()?;
    dom::query_within(&parent, FEEDBACK)
}

fn mark(field: &Element, error: Option<&str>) {
    dom::remove_class(field, "is-valid");
    dom::toggle_class(field, "is-invalid", error.is_some());
    if let Some(feedback) = feedback_of(field) {
        dom::set_text(&feedback, error.unwrap_or_default());
    }
}

fn apply(form: &Element, checks: &[FieldCheck]) {
    for (role, result) in checks {
        let Some(field) = dom::query_within(form, role.selector()) else {
            continue;
        };
        let message = result.err().map(|e| e.to_string());
        mark(&field, message.as_deref());
    }
}

fn target_element(e: &Event) -> Option<Element> {
    e.target().and_then(|t| t.dyn_into::<Element>().ok())
}

fn on_submit(session: &SessionRef, e: &Event) {
    let Some(form) = e
        .target()
        .and_then(|t| t.dyn_into::<HtmlFormElement>().ok())
    else {
        return;
    };
    let Some(kind) = FormKind::from_form_id(&form.id()) else {
        return;
    };
    e.prevent_default();
    e.stop_propagation();

    let report = session.forms.borrow_mut().submit(kind, &read_values(&form));
    apply(&form, &report.checks);
    if report.is_valid() {
        // Programmatic submit does not fire `submit` again.
        if let Err(err) = form.submit() {
            gloo_console::error!("form submit failed", err);
        }
    }
}

/// Re-check an edited field. Checkboxes report on `change`, text on `input`.
fn on_edit(session: &SessionRef, e: &Event) {
    let Some(field) = target_element(e) else {
        return;
    };
    let Some(role) = FieldRole::from_input_id(&field.id()) else {
        return;
    };
    if (role == FieldRole::Terms) != (e.type_() == "change") {
        return;
    }
    let Some(form) = field.closest("form").ok().flatten() else {
        return;
    };
    let Some(kind) = FormKind::from_form_id(&form.id()) else {
        return;
    };
    let checks = session
        .forms
        .borrow()
        .revalidate(kind, role, &read_values(&form));
    apply(&form, &checks);
}

fn on_toggle_click(e: &Event) {
    let Some(button) = target_element(e)
        .and_then(|t| t.closest(&format!("[{}]", TOGGLE_ATTR)).ok().flatten())
    else {
        return;
    };
    let Some(field) = button
        .get_attribute(TOGGLE_ATTR)
        .and_then(|id| dom::by_id(&id))
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    else {
        return;
    };

    let next = forms::toggle_password(&field.type_());
    field.set_type(next.input_type);
    if let Some(icon) = dom::query_within(&button, "i") {
        dom::toggle_class(&icon, "fi-rr-eye", !next.crossed_eye);
        dom::toggle_class(&icon, "fi-rr-eye-crossed", next.crossed_eye);
    }
    let _ = button.set_attribute("aria-label", next.aria_label);
}

/// Forget submit attempts for the forms inside a closing modal, so the
/// cached copy starts quiet on its next open.
pub fn forget_within(session: &SessionRef, root: &Element) {
    let mut validator = session.forms.borrow_mut();
    for form in dom::query_all_within(root, "form") {
        if let Some(kind) = FormKind::from_form_id(&form.id()) {
            validator.reset(kind);
        }
    }
}

pub fn bind(session: &SessionRef) {
    let doc = dom::document();

    let s = session.clone();
    listen_forever(&doc, "submit", move |e: Event| on_submit(&s, &e));

    for event in ["input", "change"] {
        let s = session.clone();
        listen_forever(&doc, event, move |e: Event| on_edit(&s, &e));
    }

    listen_forever(&doc, "click", |e: Event| on_toggle_click(&e));
}
