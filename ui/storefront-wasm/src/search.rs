//! Product search box and its history dropdown.

use crate::catalog;
use crate::dom;
use crate::mount::listen_forever;
use crate::state::SessionRef;
use crate::toast;
use gloo_timers::callback::Timeout;
use gloo_timers::future::TimeoutFuture;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, KeyboardEvent, Node};
use zs_catalog_client::{CatalogQuery, GridUpdate, SearchAction, search_meta, search_title};

const VISIBLE: &str = "is-visible";
const LOADER_ACTIVE: &str = "is-active";
const SEARCH_FAILED: &str = "Không thể tìm kiếm sản phẩm. Vui lòng thử lại.";
const HISTORY_EMPTY: &str = "Không có lịch sử tìm kiếm";
const HISTORY_TERM_ATTR: &str = "data-history-term";

/// Pause before swapping search results in.
const RESULT_SWAP_DELAY_MS: u32 = 150;
/// Lets a click on a history entry land before the dropdown hides.
const BLUR_HIDE_DELAY_MS: u32 = 200;

fn input_value(session: &SessionRef) -> String {
    session
        .els
        .search_input
        .as_ref()
        .map(|i| i.value().trim().to_string())
        .unwrap_or_default()
}

// ── Loader ──

fn show_loader(session: &SessionRef) {
    if let Some(loader) = &session.els.page_loader {
        dom::add_class(loader, LOADER_ACTIVE);
        let _ = gloo_utils::body().style().set_property("overflow", "hidden");
    }
}

fn hide_loader(session: &SessionRef) {
    if let Some(loader) = &session.els.page_loader {
        dom::remove_class(loader, LOADER_ACTIVE);
        let _ = gloo_utils::body().style().set_property("overflow", "");
    }
}

// ── History dropdown ──

fn hide_history(session: &SessionRef) {
    if let Some(dropdown) = &session.els.search_history {
        dom::remove_class(dropdown, VISIBLE);
    }
}

fn show_history(session: &SessionRef) {
    let (Some(dropdown), Some(list)) = (&session.els.search_history, &session.els.history_list)
    else {
        return;
    };

    let entries = session.history().entries();
    let html: String = if entries.is_empty() {
        format!(
            r#"<li class="search-history__empty"><i class="fi fi-rr-time-past"></i><span>{}</span></li>"#,
            HISTORY_EMPTY
        )
    } else {
        entries
            .iter()
            .map(|term| {
                format!(
                    r#"<li class="search-history__item" {}="{}"><i class="fi fi-rr-search"></i><span class="search-history__text">{}</span></li>"#,
                    HISTORY_TERM_ATTR,
                    dom::escape_attr(term),
                    dom::escape_html(term),
                )
            })
            .collect()
    };
    list.set_inner_html(&html);
    dom::add_class(dropdown, VISIBLE);
}

/// Clear the box and close the dropdown (a category was picked).
pub fn reset_input(session: &SessionRef) {
    if let Some(input) = &session.els.search_input {
        input.set_value("");
    }
    session.search_debounce.cancel();
    hide_history(session);
}

// ── Searching ──

async fn perform_search(session: &SessionRef, term: &str) {
    show_loader(session);

    let result = session
        .catalog
        .load_with_delay(
            &CatalogQuery::Search(term.to_owned()),
            TimeoutFuture::new(RESULT_SWAP_DELAY_MS),
        )
        .await;
    match result {
        Ok(GridUpdate::Replace(html)) => {
            catalog::swap_grid(session, &html);
            if let Some(title) = &session.els.category_title {
                dom::set_text(title, &search_title(term));
            }
            if let Some(meta) = &session.els.category_meta {
                dom::set_text(meta, &search_meta(catalog::card_count()));
            }
            catalog::clear_active(session);
        }
        Ok(GridUpdate::Stale) => {}
        Err(e) => {
            gloo_console::error!(format!("search for {:?} failed: {}", term, e));
            toast::error(SEARCH_FAILED);
        }
    }

    // Category loads never count here, so the last search to finish hides it.
    if !session.catalog.is_searching() {
        hide_loader(session);
    }
}

async fn run_debounced(session: SessionRef, raw: String) {
    match SearchAction::for_input(&raw) {
        SearchAction::ReloadDefault => catalog::reload_default_category(&session).await,
        SearchAction::Search(term) => {
            perform_search(&session, &term).await;
            if let Err(e) = session.history().push(&term) {
                gloo_console::warn!(format!("could not save search history: {:#}", e));
            }
        }
    }
}

fn on_input(session: &SessionRef) {
    let term = input_value(session);
    if term.is_empty() {
        show_history(session);
    } else {
        hide_history(session);
    }

    let s = session.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let delay = TimeoutFuture::new(s.config.search_debounce_ms);
        if s.search_debounce.settle(delay).await {
            run_debounced(s, term).await;
        }
    });
}

pub fn bind(session: &SessionRef) {
    let Some(input) = session.els.search_input.clone() else {
        return;
    };

    for event in ["focus", "click"] {
        let s = session.clone();
        listen_forever(&input, event, move |_| {
            if input_value(&s).is_empty() {
                show_history(&s);
            }
        });
    }

    {
        let s = session.clone();
        listen_forever(&input, "blur", move |_| {
            let s = s.clone();
            Timeout::new(BLUR_HIDE_DELAY_MS, move || hide_history(&s)).forget();
        });
    }

    {
        let s = session.clone();
        listen_forever(&input, "input", move |_| on_input(&s));
    }

    {
        let el = input.clone();
        listen_forever(&input, "keydown", move |e: Event| {
            if e.dyn_ref::<KeyboardEvent>().is_some_and(|k| k.key() == "Enter") {
                e.prevent_default();
                let _ = el.blur();
            }
        });
    }

    if let Some(clear) = &session.els.history_clear {
        listen_forever(clear, "mousedown", |e: Event| e.prevent_default());
        let s = session.clone();
        listen_forever(clear, "click", move |e: Event| {
            e.stop_propagation();
            if let Err(err) = s.history().clear() {
                gloo_console::warn!(format!("could not clear search history: {:#}", err));
            }
            show_history(&s);
        });
    }

    if let Some(list) = &session.els.history_list {
        let s = session.clone();
        listen_forever(list, "mousedown", move |e: Event| {
            let Some(entry) = e
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|t| t.closest(&format!("[{}]", HISTORY_TERM_ATTR)).ok().flatten())
            else {
                return;
            };
            // Keep focus in the box.
            e.prevent_default();
            let Some(term) = entry.get_attribute(HISTORY_TERM_ATTR) else {
                return;
            };
            if let Some(input) = &s.els.search_input {
                input.set_value(&term);
            }
            hide_history(&s);
            s.search_debounce.cancel();
            let s = s.clone();
            wasm_bindgen_futures::spawn_local(async move { perform_search(&s, &term).await });
        });
    }

    // Outside clicks close the dropdown.
    let field = input.closest(".search-field").ok().flatten();
    if let Some(field) = field {
        let s = session.clone();
        listen_forever(&dom::document(), "click", move |e: Event| {
            let inside = e
                .target()
                .and_then(|t| t.dyn_into::<Node>().ok())
                .is_some_and(|node| field.contains(Some(&node)));
            if !inside {
                hide_history(&s);
            }
        });
    }
}
