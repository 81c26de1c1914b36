//! Product modal binding.
//!
//! Fetches the server-rendered option sheet for a product, reads it into a
//! `ProductModal`, and mirrors the controller state back onto the markup
//! after every interaction.

use crate::bootstrap;
use crate::cart_panel;
use crate::dom;
use crate::mount::Mounted;
use crate::state::SessionRef;
use crate::toast;
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlImageElement, HtmlInputElement, HtmlTextAreaElement};
use zs_order_types::LineItem;
use zs_pricing::{format_price, parse_price};
use zs_storefront_core::fields::{FieldSink, ModalField};
use zs_storefront_core::options::OptionItem;
use zs_storefront_core::{
    ModalError, OptionGroup, OptionKind, ProductModal, ProductSheet, Submission,
};

const LOAD_FAILED: &str = "Không thể tải thông tin sản phẩm";
const ADDED: &str = "Đã thêm sản phẩm vào giỏ hàng";
const SAVE_FAILED: &str = "Không thể lưu giỏ hàng";
const LINE_GONE: &str = "Sản phẩm không còn trong giỏ hàng";

const SECTION: &str = ".product-modal__section";
const SECTION_TITLE: &str = ".product-modal__section-header span";
const SECTION_SUB: &str = ".product-modal__section-sub";
const OPTION_ITEM: &str = "[data-option-item]";
const CHECK: &str = ".option-row__check";

// ── Field access ──

fn field_el(modal_el: &Element, field: ModalField) -> Option<Element> {
    dom::query_within(modal_el, field.selector())
}

pub fn read_field(modal_el: &Element, field: ModalField) -> Option<String> {
    let el = field_el(modal_el, field)?;
    match field.sink() {
        FieldSink::Text => Some(dom::text_of(&el)),
        FieldSink::Value => el
            .dyn_ref::<HtmlTextAreaElement>()
            .map(|t| t.value())
            .or_else(|| el.dyn_ref::<HtmlInputElement>().map(|i| i.value())),
        FieldSink::ImageSource => el.dyn_ref::<HtmlImageElement>().map(|img| img.src()),
    }
}

pub fn write_field(modal_el: &Element, field: ModalField, value: &str) {
    let Some(el) = field_el(modal_el, field) else {
        return;
    };
    match field.sink() {
        FieldSink::Text => dom::set_text(&el, value),
        FieldSink::Value => {
            if let Some(t) = el.dyn_ref::<HtmlTextAreaElement>() {
                t.set_value(value);
            } else if let Some(i) = el.dyn_ref::<HtmlInputElement>() {
                i.set_value(value);
            }
        }
        FieldSink::ImageSource => {
            if let Some(img) = el.dyn_ref::<HtmlImageElement>() {
                img.set_src(value);
            }
        }
    }
}

// ── Markup → model ──

fn read_sheet(modal_el: &Element, slug: &str) -> ProductSheet {
    let base_price = read_field(modal_el, ModalField::Price)
        .map(|p| parse_price(&p))
        .unwrap_or(0);
    ProductSheet {
        slug: slug.to_owned(),
        name: read_field(modal_el, ModalField::Name).unwrap_or_default(),
        image: read_field(modal_el, ModalField::Image).unwrap_or_default(),
        base_price,
    }
}

fn read_groups(modal_el: &Element) -> Vec<OptionGroup> {
    let mut groups = Vec::new();
    for section in dom::query_all_within(modal_el, SECTION) {
        let items = dom::query_all_within(&section, OPTION_ITEM);
        let Some(first) = items.first() else {
            continue;
        };
        let Some(name) = dom::data(first, "option-group") else {
            continue;
        };
        let kind = dom::data(first, "option-type")
            .and_then(|t| OptionKind::from_attr(&t))
            .unwrap_or(OptionKind::Single);
        let title = dom::query_within(&section, SECTION_TITLE)
            .map(|el| dom::text_of(&el))
            .unwrap_or_default();
        let instructions = dom::query_within(&section, SECTION_SUB)
            .map(|el| dom::text_of(&el))
            .unwrap_or_default();

        let items = items
            .iter()
            .map(|item| OptionItem {
                label: dom::data(item, "option-value").unwrap_or_default(),
                price: parse_price(&dom::data(item, "option-price").unwrap_or_default()),
            })
            .collect();
        groups.push(OptionGroup::from_section(
            name,
            &title,
            kind,
            &instructions,
            items,
        ));
    }
    groups
}

// ── Model → markup ──

fn render_state(modal_el: &Element, modal: &ProductModal) {
    let board = modal.board();
    for section in dom::query_all_within(modal_el, SECTION) {
        let items = dom::query_all_within(&section, OPTION_ITEM);
        let Some(group) = items
            .first()
            .and_then(|first| dom::data(first, "option-group"))
            .and_then(|name| board.group_index(&name))
        else {
            continue;
        };

        for (i, item) in items.iter().enumerate() {
            let active = board.is_selected(group, i);
            dom::toggle_class(item, "is-active", active);
            dom::toggle_class(item, "is-disabled", board.is_disabled(group, i));
            if let Some(check) = dom::query_within(item, CHECK) {
                dom::toggle_class(&check, "is-active", active);
            }
        }

        if let Some(sub) = dom::query_within(&section, SECTION_SUB) {
            let dirty = board.selected_count(group) > 0;
            dom::toggle_class(&sub, "is-dirty", dirty);
            dom::toggle_class(&sub, "is-valid", dirty);
            dom::remove_class(&sub, "is-invalid");
        }
    }

    write_field(modal_el, ModalField::Quantity, &modal.quantity().to_string());
    write_field(modal_el, ModalField::Total, &format_price(modal.running_total()));
}

fn highlight_group(session: &SessionRef, modal_el: &Element, group: &str) {
    let Some(section) = dom::query_all_within(modal_el, SECTION)
        .into_iter()
        .find(|s| {
            dom::query_within(s, OPTION_ITEM)
                .and_then(|item| dom::data(&item, "option-group"))
                .is_some_and(|name| name == group)
        })
    else {
        return;
    };

    if let Some(sub) = dom::query_within(&section, SECTION_SUB) {
        dom::add_class(&sub, "is-invalid");
    }
    dom::scroll_into_view_center(&section);
    dom::add_class(&section, "flash-highlight");
    Timeout::new(session.config.flash_highlight_ms, move || {
        dom::remove_class(&section, "flash-highlight");
    })
    .forget();
}

// ── Entry points ──

/// Open the modal for a product card.
pub fn open(session: &SessionRef, slug: &str) {
    if !session.product_modal.borrow_mut().begin_loading(slug) {
        return;
    }
    spawn_load(session, slug);
}

/// Re-open a cart line in its product modal; submitting replaces the line.
pub fn open_for_edit(session: &SessionRef, index: usize, item: LineItem) {
    let Some(slug) = item.slug.clone().filter(|s| !s.is_empty()) else {
        gloo_console::warn!(format!("cart line {} has no product slug", index));
        toast::error(LOAD_FAILED);
        return;
    };
    if !session
        .product_modal
        .borrow_mut()
        .begin_edit(&slug, index, item)
    {
        return;
    }
    spawn_load(session, &slug);
}

fn spawn_load(session: &SessionRef, slug: &str) {
    let s = session.clone();
    let slug = slug.to_owned();
    wasm_bindgen_futures::spawn_local(async move {
        if let Err(msg) = load(&s, &slug).await {
            gloo_console::error!(format!("failed to load product modal {}: {}", slug, msg));
            s.product_modal.borrow_mut().fail();
            s.product_view.borrow_mut().take();
            toast::error(LOAD_FAILED);
        }
    });
}

async fn load(session: &SessionRef, slug: &str) -> Result<(), String> {
    let html = session
        .catalog
        .product_modal(slug)
        .await
        .map_err(|e| e.to_string())?;

    let container = &session.els.modal_container;
    // Old listeners point into markup we are about to replace.
    session.product_view.borrow_mut().take();
    container.set_inner_html(&html);
    let modal_el = dom::query_within(container, ".modal")
        .ok_or_else(|| "response has no .modal element".to_string())?;

    let sheet = read_sheet(&modal_el, slug);
    let groups = read_groups(&modal_el);
    {
        let mut modal = session.product_modal.borrow_mut();
        modal.open(sheet, groups).map_err(|e| e.to_string())?;
        write_field(&modal_el, ModalField::Note, modal.note());
        render_state(&modal_el, &modal);
    }

    let view = bind(session, &modal_el);
    *session.product_view.borrow_mut() = Some(view);

    let s = session.clone();
    let el = modal_el.clone();
    bootstrap::on_hidden_once(&modal_el, move || {
        s.product_modal.borrow_mut().close();
        s.product_view.borrow_mut().take();
        el.remove();
    });

    bootstrap::show(&modal_el).map_err(|e| format!("{:?}", e))
}

fn bind(session: &SessionRef, modal_el: &Element) -> Mounted {
    let mut view = Mounted::new();

    for item in dom::query_all_within(modal_el, OPTION_ITEM) {
        let s = session.clone();
        let el = modal_el.clone();
        let group = dom::data(&item, "option-group").unwrap_or_default();
        let label = dom::data(&item, "option-value").unwrap_or_default();
        view.listen(&item, "click", move |_| {
            let mut modal = s.product_modal.borrow_mut();
            match modal.toggle_option(&group, &label) {
                Ok(_) => render_state(&el, &modal),
                Err(e) => gloo_console::warn!(e.to_string()),
            }
        });
    }

    for (field, delta) in [("[data-modal-minus]", -1), ("[data-modal-plus]", 1)] {
        if let Some(btn) = dom::query_within(modal_el, field) {
            let s = session.clone();
            let el = modal_el.clone();
            view.listen(&btn, "click", move |_| {
                let mut modal = s.product_modal.borrow_mut();
                modal.step_quantity(delta);
                render_state(&el, &modal);
            });
        }
    }

    if let Some(note) = dom::query_within(modal_el, ModalField::Note.selector()) {
        let s = session.clone();
        let el = modal_el.clone();
        view.listen(&note, "input", move |_| {
            let text = read_field(&el, ModalField::Note).unwrap_or_default();
            s.product_modal.borrow_mut().set_note(&text);
        });
    }

    if let Some(action) = dom::query_within(modal_el, "[data-modal-action]") {
        let s = session.clone();
        let el = modal_el.clone();
        view.listen(&action, "click", move |_| submit(&s, &el));
    }

    view
}

fn submit(session: &SessionRef, modal_el: &Element) {
    let result = session.product_modal.borrow().submit();
    let submission = match result {
        Ok(submission) => submission,
        Err(err) if matches!(err, ModalError::MissingRequired { .. }) => {
            toast::error(&err.to_string());
            if let ModalError::MissingRequired { group, .. } = &err {
                highlight_group(session, modal_el, group);
            }
            return;
        }
        Err(err) => {
            gloo_console::warn!(err.to_string());
            return;
        }
    };

    let cart = session.cart();
    let saved = match submission {
        Submission::Append(item) => cart.append(item).map(|_| true),
        Submission::Replace { index, item } => cart.replace_at(index, item),
    };
    match saved {
        Ok(true) => {}
        Ok(false) => toast::warn(LINE_GONE),
        Err(e) => {
            gloo_console::error!(format!("could not save cart: {:#}", e));
            toast::error(SAVE_FAILED);
            return;
        }
    }

    cart_panel::refresh(session);
    bootstrap::hide(modal_el);
    toast::success(ADDED);
}
