//! DOM element bindings.
//!
//! Page-level elements are resolved once at startup. Most of them are
//! optional: the menu page has a search box and product grid, the checkout
//! page only a cart panel, and the bindings skip whatever is absent.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

// ── Helpers ──

pub fn document() -> Document {
    gloo_utils::document()
}

pub fn window() -> web_sys::Window {
    gloo_utils::window()
}

pub fn by_id(id: &str) -> Option<Element> {
    document().get_element_by_id(id)
}

pub fn query(selector: &str) -> Option<Element> {
    document().query_selector(selector).ok()?
}

pub fn query_typed<T: JsCast>(selector: &str) -> Option<T> {
    query(selector).and_then(|e| e.dyn_into::<T>().ok())
}

fn collect(list: Result<web_sys::NodeList, wasm_bindgen::JsValue>) -> Vec<Element> {
    let Ok(nl) = list else {
        return Vec::new();
    };
    let mut v = Vec::new();
    for i in 0..nl.length() {
        if let Some(el) = nl.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
            v.push(el);
        }
    }
    v
}

pub fn query_all(selector: &str) -> Vec<Element> {
    collect(document().query_selector_all(selector))
}

/// Query all matching elements within a parent element.
pub fn query_all_within(parent: &Element, selector: &str) -> Vec<Element> {
    collect(parent.query_selector_all(selector))
}

pub fn query_within(parent: &Element, selector: &str) -> Option<Element> {
    parent.query_selector(selector).ok()?
}

pub fn text_of(el: &Element) -> String {
    el.text_content().unwrap_or_default().trim().to_string()
}

pub fn set_text(el: &Element, text: &str) {
    el.set_text_content(Some(text));
}

pub fn data(el: &Element, name: &str) -> Option<String> {
    el.get_attribute(&format!("data-{}", name))
}

pub fn add_class(el: &Element, cls: &str) {
    let _ = el.class_list().add_1(cls);
}

pub fn remove_class(el: &Element, cls: &str) {
    let _ = el.class_list().remove_1(cls);
}

pub fn toggle_class(el: &Element, cls: &str, force: bool) {
    let _ = el.class_list().toggle_with_force(cls, force);
}

pub fn set_style(el: &Element, property: &str, value: &str) {
    if let Some(html) = el.dyn_ref::<HtmlElement>() {
        let _ = html.style().set_property(property, value);
    }
}

pub fn set_display(el: &Element, value: &str) {
    set_style(el, "display", value);
}

pub fn scroll_into_view_center(el: &Element) {
    let opts = web_sys::ScrollIntoViewOptions::new();
    opts.set_behavior(web_sys::ScrollBehavior::Smooth);
    opts.set_block(web_sys::ScrollLogicalPosition::Center);
    el.scroll_into_view_with_scroll_into_view_options(&opts);
}

pub fn scroll_into_view_inline(el: &Element) {
    let opts = web_sys::ScrollIntoViewOptions::new();
    opts.set_behavior(web_sys::ScrollBehavior::Smooth);
    opts.set_block(web_sys::ScrollLogicalPosition::Nearest);
    opts.set_inline(web_sys::ScrollLogicalPosition::Center);
    el.scroll_into_view_with_scroll_into_view_options(&opts);
}

/// Escape text for interpolation into HTML strings.
pub fn escape_html(raw: &str) -> String {
    match document().create_element("div") {
        Ok(div) => {
            div.set_text_content(Some(raw));
            div.inner_html()
        }
        Err(_) => String::new(),
    }
}

/// Escape text for a double-quoted attribute value.
pub fn escape_attr(raw: &str) -> String {
    escape_html(raw).replace('"', "&quot;")
}

/// Find `selector`, or create a `<div>` carrying its id/classes under `<body>`.
pub fn get_or_create_container(selector: &str) -> Option<Element> {
    if let Some(el) = query(selector) {
        return Some(el);
    }

    let el = document().create_element("div").ok()?;
    for token in selector.split(['#', '.']).filter(|t| !t.is_empty()) {
        let is_id = selector.contains(&format!("#{}", token));
        if is_id {
            el.set_id(token);
        } else {
            add_class(&el, token);
        }
    }
    gloo_utils::body().append_child(&el).ok()?;
    Some(el)
}

// ── Elements struct ──

/// Page elements used by the storefront.
/// Clone-friendly (all inner types are reference-counted via JS GC).
#[derive(Clone)]
pub struct Elements {
    // Modals
    pub modal_container: Element,
    pub modal_templates: Option<Element>,

    // Catalog
    pub product_grid: Option<Element>,
    pub category_items: Vec<Element>,
    pub category_title: Option<Element>,
    pub category_meta: Option<Element>,

    // Search
    pub search_input: Option<HtmlInputElement>,
    pub search_history: Option<Element>,
    pub history_list: Option<Element>,
    pub history_clear: Option<Element>,
    pub page_loader: Option<Element>,

    // Cart
    pub desktop_cart_list: Option<Element>,
    pub mobile_cart_list: Option<Element>,
    pub loyalty_toggle: Option<HtmlInputElement>,
    pub payment_btn: Option<Element>,
}

impl Elements {
    /// Resolve DOM references. Call once after the module starts.
    pub fn bind() -> Result<Elements, wasm_bindgen::JsValue> {
        Ok(Elements {
            modal_container: get_or_create_container("#modal-container")
                .ok_or_else(|| wasm_bindgen::JsValue::from_str("cannot create #modal-container"))?,
            modal_templates: by_id("modal-template"),

            product_grid: query("[data-product-grid]"),
            category_items: query_all("[data-category-item]"),
            category_title: query("[data-category-title]"),
            category_meta: query("[data-category-meta]"),

            search_input: query_typed::<HtmlInputElement>("[data-search-input]"),
            search_history: query("[data-search-history]"),
            history_list: query("[data-history-list]"),
            history_clear: query("[data-history-clear]"),
            page_loader: query("[data-page-loader]"),

            desktop_cart_list: query(".cart-panel [data-cart-list]"),
            mobile_cart_list: query(".mobile-cart-drawer [data-cart-list]"),
            loyalty_toggle: query_typed::<HtmlInputElement>("[data-loyalty-toggle]"),
            payment_btn: query("[data-cart-payment]"),
        })
    }

    pub fn cart_lists(&self) -> impl Iterator<Item = &Element> {
        self.desktop_cart_list
            .iter()
            .chain(self.mobile_cart_list.iter())
    }

    pub fn loyalty_enabled(&self) -> bool {
        self.loyalty_toggle.as_ref().is_some_and(|t| t.checked())
    }
}
