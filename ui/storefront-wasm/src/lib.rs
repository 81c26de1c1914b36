//! Zero Star Cafe storefront, browser side.
//!
//! Rust + WASM replacement for the menu page scripts: cart panel, product
//! modal, category/search switching and template modals. Business rules live
//! in the `zs-*` crates; this crate maps them onto the DOM.

pub mod api;
pub mod bootstrap;
pub mod cart_panel;
pub mod catalog;
pub mod dom;
pub mod events;
pub mod forms;
pub mod modal;
pub mod mount;
pub mod product_modal;
pub mod search;
pub mod state;
pub mod toast;

use wasm_bindgen::prelude::*;

/// WASM entry point – called automatically when the module is instantiated.
#[wasm_bindgen(start)]
pub async fn start() -> Result<(), JsValue> {
    // Improve panic messages in the browser console
    console_error_panic_hook::set_once();

    let config = state::load_config();
    // `load_config` only hands back validated configs.
    let level = config.max_log_level().unwrap_or(tracing::Level::INFO);
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(level)
            .build(),
    );

    init(config).await
}

async fn init(config: zs_storefront_core::StorefrontConfig) -> Result<(), JsValue> {
    let els = dom::Elements::bind()?;
    let session = state::Session::new(els, config);

    events::bind_events(&session);
    Ok(())
}
