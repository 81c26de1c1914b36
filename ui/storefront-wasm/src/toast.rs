//! Toast notifications.

use crate::dom;
use gloo_timers::callback::Timeout;
use web_sys::Element;

const LIFETIME_MS: u32 = 5000;
const MAX_VISIBLE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warn,
    Info,
}

impl ToastKind {
    fn class(self) -> &'static str {
        match self {
            ToastKind::Success => "toast-success",
            ToastKind::Error => "toast-error",
            ToastKind::Warn => "toast-warning",
            ToastKind::Info => "toast-info",
        }
    }

    fn icon(self) -> &'static str {
        match self {
            ToastKind::Success => "fi-rr-check-circle",
            ToastKind::Error => "fi-rr-exclamation",
            ToastKind::Warn => "fi-rr-warning",
            ToastKind::Info => "fi-rr-bell",
        }
    }

    fn position(self) -> &'static str {
        match self {
            ToastKind::Success | ToastKind::Error => "top-center",
            ToastKind::Warn | ToastKind::Info => "bottom-right",
        }
    }
}

pub fn success(msg: &str) {
    show(ToastKind::Success, msg);
}

pub fn error(msg: &str) {
    show(ToastKind::Error, msg);
}

pub fn warn(msg: &str) {
    show(ToastKind::Warn, msg);
}

pub fn info(msg: &str) {
    show(ToastKind::Info, msg);
}

pub fn show(kind: ToastKind, msg: &str) {
    let position = kind.position();
    let Some(container) = dom::get_or_create_container(&format!(".toast-container.{}", position))
    else {
        gloo_console::error!(format!("toast container missing: {}", msg));
        return;
    };
    let Some(toast) = build(kind, msg) else {
        return;
    };

    let is_bottom = position.starts_with("bottom");
    let attached = if is_bottom {
        container.append_with_node_1(&toast)
    } else {
        container.prepend_with_node_1(&toast)
    };
    if attached.is_err() {
        return;
    }

    // Newest sits at the front for top containers and at the back for bottom ones.
    let mut visible = dom::query_all_within(&container, ".toast");
    if is_bottom {
        visible.reverse();
    }
    for oldest in visible.iter().skip(MAX_VISIBLE) {
        remove(oldest);
    }

    Timeout::new(LIFETIME_MS, move || remove(&toast)).forget();
}

fn build(kind: ToastKind, msg: &str) -> Option<Element> {
    let doc = dom::document();
    let toast = doc.create_element("div").ok()?;
    toast.set_class_name(&format!("toast show {}", kind.class()));
    let _ = toast.set_attribute("role", "alert");
    let _ = toast.set_attribute("aria-live", "assertive");

    let body = doc.create_element("div").ok()?;
    body.set_class_name("toast-body d-flex align-items-center");

    let icon = doc.create_element("i").ok()?;
    icon.set_class_name(&format!("icon-base me-3 toast-icon {}", kind.icon()));

    let text = doc.create_element("p").ok()?;
    text.set_class_name("toast-desc mb-0 text-break");
    dom::set_text(&text, msg);

    body.append_with_node_2(&icon, &text).ok()?;
    toast.append_with_node_1(&body).ok()?;
    Some(toast)
}

fn remove(toast: &Element) {
    toast.remove();
}
