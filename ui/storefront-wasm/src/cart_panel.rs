//! Cart panel rendering.
//!
//! The desktop panel and the mobile drawer render the same stored cart.
//! Rendering is imperative: every cart mutation calls `render` (or `refresh`
//! from inside a row handler) and nothing listens for storage changes.

use crate::dom;
use crate::mount::{Mounted, listen_forever};
use crate::product_modal;
use crate::state::{Session, SessionRef};
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlElement, KeyboardEvent};
use zs_order_types::LineItem;
use zs_pricing::format_price;
use zs_storage::StepOutcome;
use zs_storefront_core::cart_panel::{CartRow, CartSummary, EMPTY_CART_TEXT, rows};

const ROW_INDEX_ATTR: &str = "data-cart-item-index";

fn row_html(row: &CartRow) -> String {
    let meta: String = row
        .meta
        .iter()
        .map(|m| {
            format!(
                r#"<p class="mb-0{}"><span class="cart-meta__label">{}:</span> {}</p>"#,
                if m.is_note { " cart-note" } else { "" },
                dom::escape_html(&m.label),
                dom::escape_html(&m.value),
            )
        })
        .collect();
    let name = dom::escape_attr(&row.name);

    format!(
        r#"<div class="cart-item" {attr}="{i}">
  <img src="{img}" class="cart-thumb" alt="{name}" />
  <div class="flex-grow-1 d-flex gap-4">
    <div class="flex-grow-1">
      <div class="d-flex gap-1 align-items-start mb-0"><p class="cart-name">{name}</p></div>
      <div class="cart-meta">{meta}</div>
      <div class="cart-item__actions">
        <button class="cart-item__action-btn" type="button" data-cart-edit data-cart-index="{i}">
          <i class="fi fi-rr-pencil icon-base"></i><span>Sửa</span>
        </button>
        <button class="cart-item__action-btn" type="button" data-cart-remove data-cart-index="{i}">
          <i class="fi fi-rr-trash icon-base"></i><span>Xóa</span>
        </button>
      </div>
    </div>
    <div class="text-end">
      <div class="cart-price">{price}</div>
      <div class="cart-stepper" data-stepper>
        <button class="cart-stepper__btn" type="button" data-stepper-minus>
          <span class="icon-base"><i class="fi fi-rr-minus-small"></i></span>
        </button>
        <span class="cart-stepper__value" data-stepper-value contenteditable="true">{qty}</span>
        <button class="cart-stepper__btn" type="button" data-stepper-plus>
          <span class="icon-base"><i class="fi fi-rr-plus-small"></i></span>
        </button>
      </div>
    </div>
  </div>
</div>"#,
        attr = ROW_INDEX_ATTR,
        i = row.index,
        img = dom::escape_attr(&row.image),
        name = name,
        meta = meta,
        price = row.price_text,
        qty = row.quantity,
    )
}

fn empty_html() -> String {
    format!(
        r#"<div class="cart-empty">
  <div class="cart-empty__icon"><i class="fi fi-rr-shopping-cart icon-base"></i></div>
  <p class="cart-empty__text">{}</p>
</div>"#,
        EMPTY_CART_TEXT
    )
}

/// Rebuild both cart lists and their stepper bindings.
///
/// Must not run from inside a row handler; use `refresh` there.
pub fn render(session: &SessionRef) {
    let cart = session.cart().load();
    let is_empty = cart.is_empty();

    // Detach the old rows first.
    session.cart_rows.borrow_mut().take();

    let html = if is_empty {
        empty_html()
    } else {
        rows(&cart).iter().map(row_html).collect()
    };

    let mut mounted = Mounted::new();
    for list in session.els.cart_lists() {
        list.set_inner_html(&html);
        if is_empty {
            continue;
        }
        for row in dom::query_all_within(list, &format!("[{}]", ROW_INDEX_ATTR)) {
            let Some(index) = row
                .get_attribute(ROW_INDEX_ATTR)
                .and_then(|i| i.parse::<usize>().ok())
            else {
                continue;
            };
            if let Some(stepper) = dom::query_within(&row, "[data-stepper]") {
                bind_stepper(session, &mut mounted, &stepper, index);
            }
        }
    }
    *session.cart_rows.borrow_mut() = Some(mounted);

    let display = if is_empty { "none" } else { "" };
    for btn in dom::query_all("[data-view-cart]") {
        dom::set_display(&btn, display);
    }
    for summary in dom::query_all(".cart-summary") {
        dom::set_display(&summary, display);
    }

    update_summary(session, &cart);
}

/// `render` on the next tick, after the current handler has returned.
pub fn refresh(session: &SessionRef) {
    let s = session.clone();
    wasm_bindgen_futures::spawn_local(async move { render(&s) });
}

pub fn update_summary(session: &Session, cart: &[LineItem]) {
    let summary = CartSummary::compute(
        cart,
        session.els.loyalty_enabled(),
        session.config.loyalty_points,
    );

    for el in dom::query_all("[data-cart-total]") {
        dom::set_text(&el, &format_price(summary.total));
    }

    if let Some(subtotal) = dom::query(".mobile-cart-drawer [data-cart-subtotal]") {
        dom::set_text(&subtotal, &format_price(summary.subtotal));
        if let Some(label) = summary_row(&subtotal)
            .and_then(|r| dom::query_within(&r, "span:first-child"))
        {
            dom::set_text(&label, &summary.subtotal_label());
        }
    }

    if let Some(discount) = dom::query(".mobile-cart-drawer [data-cart-discount]") {
        let row = summary_row(&discount);
        match summary.discount_label() {
            Some(text) => {
                dom::set_text(&discount, &text);
                if let Some(r) = row {
                    dom::remove_class(&r, "d-none");
                }
            }
            None => {
                if let Some(r) = row {
                    dom::add_class(&r, "d-none");
                }
            }
        }
    }

    for count in dom::query_all(".cart-count") {
        dom::set_text(&count, &summary.count_label());
    }

    if let Some(badge) = dom::query("[data-cart-badge]") {
        match summary.badge_label() {
            Some(text) => {
                dom::set_text(&badge, &text);
                dom::set_display(&badge, "flex");
            }
            None => dom::set_display(&badge, "none"),
        }
    }
}

fn summary_row(el: &Element) -> Option<Element> {
    el.closest(".cart-summary__row").ok().flatten()
}

/// Write one line's quantity and price into every list showing it.
fn patch_row(session: &Session, index: usize, item: &LineItem) {
    let selector = format!("[{}=\"{}\"]", ROW_INDEX_ATTR, index);
    for list in session.els.cart_lists() {
        let Some(row) = dom::query_within(list, &selector) else {
            continue;
        };
        if let Some(value) = dom::query_within(&row, "[data-stepper-value]") {
            dom::set_text(&value, &item.quantity.to_string());
        }
        if let Some(price) = dom::query_within(&row, ".cart-price") {
            dom::set_text(&price, &format_price(item.total));
        }
    }
}

fn after_step(session: &SessionRef, index: usize, outcome: anyhow::Result<StepOutcome>) {
    match outcome {
        Ok(StepOutcome::Updated(item)) => {
            patch_row(session, index, &item);
            update_summary(session, &session.cart().load());
        }
        Ok(StepOutcome::Removed) | Ok(StepOutcome::Missing) => refresh(session),
        Err(e) => gloo_console::error!(format!("could not update cart: {:#}", e)),
    }
}

fn bind_stepper(session: &SessionRef, mounted: &mut Mounted, stepper: &Element, index: usize) {
    let (Some(minus), Some(plus), Some(value)) = (
        dom::query_within(stepper, "[data-stepper-minus]"),
        dom::query_within(stepper, "[data-stepper-plus]"),
        dom::query_within(stepper, "[data-stepper-value]"),
    ) else {
        return;
    };

    for (btn, delta) in [(minus, -1), (plus, 1)] {
        let s = session.clone();
        mounted.listen(&btn, "click", move |_| {
            let outcome = s.cart().step_quantity(index, delta);
            after_step(&s, index, outcome);
        });
    }

    {
        let s = session.clone();
        let el = value.clone();
        mounted.listen(&value, "blur", move |_| {
            let typed = el.text_content().unwrap_or_default();
            match s.cart().set_quantity(index, &typed) {
                Ok(Some(item)) => {
                    patch_row(&s, index, &item);
                    update_summary(&s, &s.cart().load());
                }
                Ok(None) => refresh(&s),
                Err(e) => gloo_console::error!(format!("could not update cart: {:#}", e)),
            }
        });
    }

    {
        let s = session.clone();
        let el = value.clone();
        mounted.listen(&value, "keydown", move |e: Event| {
            let Some(key) = e.dyn_ref::<KeyboardEvent>().map(|k| k.key()) else {
                return;
            };
            match key.as_str() {
                "Enter" => {
                    e.prevent_default();
                    blur(&el);
                }
                "Escape" => {
                    e.prevent_default();
                    if let Some(item) = s.cart().load().get(index) {
                        dom::set_text(&el, &item.quantity.to_string());
                    }
                    blur(&el);
                }
                _ => {}
            }
        });
    }
}

fn blur(el: &Element) {
    if let Some(html) = el.dyn_ref::<HtmlElement>() {
        let _ = html.blur();
    }
}

fn closest_index(target: &Element, selector: &str) -> Option<Option<usize>> {
    let btn = target.closest(selector).ok().flatten()?;
    Some(dom::data(&btn, "cart-index").and_then(|i| i.parse().ok()))
}

/// Page-lifetime cart bindings: remove/edit delegation, loyalty toggle, payment.
pub fn bind(session: &SessionRef) {
    let s = session.clone();
    listen_forever(&dom::document(), "click", move |e: Event| {
        let Some(target) = e.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };

        if let Some(index) = closest_index(&target, "[data-cart-remove]") {
            e.prevent_default();
            e.stop_propagation();
            let Some(index) = index else {
                return;
            };
            match s.cart().remove_at(index) {
                Ok(_) => render(&s),
                Err(err) => gloo_console::error!(format!("could not remove cart line: {:#}", err)),
            }
            return;
        }

        if target.closest("[data-stepper]").ok().flatten().is_some() {
            return;
        }

        if let Some(index) = closest_index(&target, "[data-cart-edit]") {
            e.prevent_default();
            e.stop_propagation();
            let Some(index) = index else {
                return;
            };
            if let Some(item) = s.cart().load().get(index).cloned() {
                product_modal::open_for_edit(&s, index, item);
            }
        }
    });

    if let Some(toggle) = &session.els.loyalty_toggle {
        let s = session.clone();
        listen_forever(toggle, "change", move |_| {
            update_summary(&s, &s.cart().load());
        });
    }

    if let Some(btn) = &session.els.payment_btn {
        let s = session.clone();
        listen_forever(btn, "click", move |_| log_checkout(&s));
    }
}

fn log_checkout(session: &Session) {
    let cart = session.cart().load();
    let summary = CartSummary::compute(
        &cart,
        session.els.loyalty_enabled(),
        session.config.loyalty_points,
    );
    let snapshot = summary.snapshot(&cart, js_sys::Date::now() as u64);
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => gloo_console::log!(json),
        Err(e) => gloo_console::error!(format!("could not serialize checkout: {}", e)),
    }
}
