//! Category switching and the product grid.
//!
//! Every grid replacement goes through `swap_grid`, which drops the previous
//! cards' listeners, hydrates the new cards and mounts fresh handlers.

use crate::dom;
use crate::mount::{Mounted, listen_forever};
use crate::product_modal;
use crate::state::SessionRef;
use crate::toast;
use gloo_timers::future::TimeoutFuture;
use web_sys::{Element, Event};
use zs_catalog_client::{CatalogQuery, FetchError, GridUpdate, count_label};
use zs_storefront_core::card::{CardPricing, is_sold_out};

pub const CATEGORY_ACTIVE: &str = "is-active";
const PRODUCT_CARD: &str = "[data-product-card]";
const LOAD_FAILED: &str = "Không thể tải sản phẩm. Vui lòng thử lại.";

/// Pause before swapping a reloaded category in.
const RELOAD_SWAP_DELAY_MS: u32 = 100;

// ── Cards ──

/// Fill price texts and the promo badge from the card's `data-*` attributes.
pub fn hydrate_card(card: &Element) {
    let current = dom::data(card, "product-current-price")
        .or_else(|| dom::data(card, "product-price"))
        .unwrap_or_default();
    let original = dom::data(card, "product-original-price")
        .or_else(|| dom::data(card, "product-old-price"))
        .unwrap_or_default();
    let sold_out = is_sold_out(
        dom::data(card, "sold-out").as_deref(),
        dom::data(card, "availability-status").as_deref(),
    );
    let pricing = CardPricing::from_attrs(&current, &original, sold_out);

    if let Some(el) = dom::query_within(card, ".product-card__price-current") {
        dom::set_text(&el, &pricing.current_text());
    }

    let original_el = dom::query_within(card, ".product-card__price-original")
        .or_else(|| dom::query_within(card, ".product-card__price-old"));
    if let Some(el) = original_el {
        match pricing.original_text() {
            Some(text) => {
                dom::set_text(&el, &text);
                dom::set_display(&el, "inline");
            }
            None => dom::set_display(&el, "none"),
        }
    }

    if let Some(badge) = dom::query_within(card, ".product-card__badge") {
        if let Some(text_el) = dom::query_within(&badge, "p") {
            match pricing.badge().text() {
                Some(text) => {
                    dom::set_text(&text_el, &text);
                    dom::set_display(&badge, "block");
                }
                None => dom::set_display(&badge, "none"),
            }
        }
    }

    let _ = card.set_attribute("data-product-price", &pricing.current_text());
    let _ = card.set_attribute(
        "data-product-old-price",
        &pricing.original_text().unwrap_or_default(),
    );
}

fn mount_cards(session: &SessionRef, grid: &Element) -> Mounted {
    let mut mounted = Mounted::new();
    for card in dom::query_all_within(grid, PRODUCT_CARD) {
        hydrate_card(&card);

        let s = session.clone();
        let el = card.clone();
        mounted.listen(&card, "click", move |_| {
            let Some(slug) = dom::data(&el, "product-slug").filter(|s| !s.is_empty()) else {
                return;
            };
            if dom::data(&el, "sold-out").as_deref() == Some("true") {
                return;
            }
            product_modal::open(&s, &slug);
        });
    }
    mounted
}

/// Replace the grid markup and re-bind its cards.
pub fn swap_grid(session: &SessionRef, html: &str) {
    let Some(grid) = &session.els.product_grid else {
        return;
    };
    session.grid.borrow_mut().take();
    grid.set_inner_html(html);
    let mounted = mount_cards(session, grid);
    *session.grid.borrow_mut() = Some(mounted);
}

/// Mount the server-rendered grid present at page load.
pub fn mount_initial(session: &SessionRef) {
    let Some(grid) = &session.els.product_grid else {
        return;
    };
    let mounted = mount_cards(session, grid);
    *session.grid.borrow_mut() = Some(mounted);
}

pub fn card_count() -> usize {
    dom::query_all(PRODUCT_CARD).len()
}

// ── Categories ──

pub fn update_category_header(session: &SessionRef, category: &Element) {
    let Some(name) = dom::data(category, "category-name") else {
        return;
    };
    if let Some(title) = &session.els.category_title {
        dom::set_text(title, &name);
    }
    if let Some(meta) = &session.els.category_meta {
        dom::set_text(meta, &count_label(card_count()));
    }
}

pub fn clear_active(session: &SessionRef) {
    for item in &session.els.category_items {
        dom::remove_class(item, CATEGORY_ACTIVE);
    }
}

pub fn activate(session: &SessionRef, category: &Element) {
    clear_active(session);
    dom::add_class(category, CATEGORY_ACTIVE);
    update_category_header(session, category);
    if dom::query("[data-category-track]").is_some() {
        dom::scroll_into_view_inline(category);
    }
}

fn category_by_slug(session: &SessionRef, slug: &str) -> Option<Element> {
    session
        .els
        .category_items
        .iter()
        .find(|c| dom::data(c, "category-slug").as_deref() == Some(slug))
        .cloned()
}

async fn load_category(session: &SessionRef, slug: &str) -> Result<bool, FetchError> {
    match session
        .catalog
        .load(&CatalogQuery::Category(slug.to_owned()))
        .await?
    {
        GridUpdate::Replace(html) => {
            swap_grid(session, &html);
            Ok(true)
        }
        GridUpdate::Stale => Ok(false),
    }
}

/// Reload the first category, used when the search box is cleared.
pub async fn reload_default_category(session: &SessionRef) {
    let Some(first) = session.els.category_items.first().cloned() else {
        return;
    };
    let Some(slug) = dom::data(&first, "category-slug") else {
        return;
    };
    let grid = session.els.product_grid.clone();
    if let Some(grid) = &grid {
        dom::set_style(grid, "opacity", "0.5");
    }

    let result = session
        .catalog
        .load_with_delay(
            &CatalogQuery::Category(slug.clone()),
            TimeoutFuture::new(RELOAD_SWAP_DELAY_MS),
        )
        .await;
    match result {
        Ok(GridUpdate::Replace(html)) => {
            swap_grid(session, &html);
            activate(session, &first);
        }
        Ok(GridUpdate::Stale) => {}
        Err(e) => {
            gloo_console::error!(format!("failed to reload category {}: {}", slug, e));
            toast::error(LOAD_FAILED);
        }
    }

    if let Some(grid) = &grid {
        dom::set_style(grid, "opacity", "1");
    }
}

fn on_category_click(session: &SessionRef, category: &Element, e: &Event) {
    e.prevent_default();
    let Some(slug) = dom::data(category, "category-slug") else {
        return;
    };

    crate::search::reset_input(session);
    activate(session, category);

    let s = session.clone();
    let category = category.clone();
    wasm_bindgen_futures::spawn_local(async move {
        match load_category(&s, &slug).await {
            // The header count depends on the new grid.
            Ok(true) => update_category_header(&s, &category),
            Ok(false) => {}
            Err(e) => {
                gloo_console::error!(format!("failed to load category {}: {}", slug, e));
                toast::error(LOAD_FAILED);
            }
        }
    });
}

pub fn bind(session: &SessionRef) {
    mount_initial(session);

    // The grid is server-rendered for one category; mark it active.
    let default_slug = session
        .els
        .product_grid
        .as_ref()
        .and_then(|grid| dom::query_within(grid, "[data-product-id]"))
        .and_then(|first| dom::data(&first, "category-slug"));
    if let Some(category) = default_slug.and_then(|slug| category_by_slug(session, &slug)) {
        activate(session, &category);
    }

    for category in &session.els.category_items {
        let s = session.clone();
        let el = category.clone();
        listen_forever(category, "click", move |e: Event| {
            on_category_click(&s, &el, &e)
        });
    }
}
