//! Per-page session state.
//!
//! One `Session` is created in `start()` and shared through `Rc` clones with
//! every handler. It owns the controllers, the search debounce and the mounted
//! fragments, and is dropped with the page.

use crate::api::BrowserFragments;
use crate::dom::Elements;
use crate::mount::Mounted;
use anyhow::anyhow;
use gloo_storage::{LocalStorage, Storage};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsValue;
use zs_catalog_client::{CatalogSwitcher, Debounce};
use zs_storage::{CartStore, KeyValueStore, SearchHistory};
use zs_storefront_core::forms::FormValidator;
use zs_storefront_core::modal_registry::ModalRegistry;
use zs_storefront_core::{ProductModal, StorefrontConfig};

const CONFIG_GLOBAL: &str = "__STOREFRONT_CONFIG__";

/// `localStorage` as a `KeyValueStore`.
#[derive(Clone, Copy, Default)]
pub struct BrowserStore;

impl KeyValueStore for BrowserStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        LocalStorage::raw()
            .get_item(key)
            .map_err(|e| anyhow!("localStorage get failed: {:?}", e))
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| anyhow!("localStorage set failed: {:?}", e))
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        LocalStorage::raw()
            .remove_item(key)
            .map_err(|e| anyhow!("localStorage remove failed: {:?}", e))
    }
}

pub struct Session {
    pub els: Elements,
    pub config: StorefrontConfig,
    pub catalog: CatalogSwitcher<BrowserFragments>,
    pub product_modal: RefCell<ProductModal>,
    pub modals: RefCell<ModalRegistry>,
    pub forms: RefCell<FormValidator>,
    pub search_debounce: Debounce,
    /// Listeners of the product cards currently in the grid.
    pub grid: RefCell<Option<Mounted>>,
    /// Listeners of the rendered cart rows.
    pub cart_rows: RefCell<Option<Mounted>>,
    /// Listeners of the open product modal.
    pub product_view: RefCell<Option<Mounted>>,
}

pub type SessionRef = Rc<Session>;

impl Session {
    pub fn new(els: Elements, config: StorefrontConfig) -> SessionRef {
        let catalog = CatalogSwitcher::new(BrowserFragments, config.endpoints.clone());
        Rc::new(Session {
            els,
            config,
            catalog,
            product_modal: RefCell::new(ProductModal::default()),
            modals: RefCell::new(ModalRegistry::default()),
            forms: RefCell::new(FormValidator::default()),
            search_debounce: Debounce::default(),
            grid: RefCell::new(None),
            cart_rows: RefCell::new(None),
            product_view: RefCell::new(None),
        })
    }

    pub fn cart(&self) -> CartStore<BrowserStore> {
        CartStore::with_key(BrowserStore, self.config.cart_key.clone())
    }

    pub fn history(&self) -> SearchHistory<BrowserStore> {
        SearchHistory::with_key(
            BrowserStore,
            self.config.search_history_key.clone(),
            self.config.search_history_limit,
        )
    }
}

/// Read `window.__STOREFRONT_CONFIG__`, falling back to defaults.
pub fn load_config() -> StorefrontConfig {
    let window: JsValue = crate::dom::window().into();
    let raw = js_sys::Reflect::get(&window, &JsValue::from_str(CONFIG_GLOBAL))
        .unwrap_or(JsValue::UNDEFINED);
    if raw.is_undefined() || raw.is_null() {
        return StorefrontConfig::default();
    }

    let parsed = serde_wasm_bindgen::from_value::<StorefrontConfig>(raw)
        .map_err(|e| e.to_string())
        .and_then(|config| config.validate().map(|_| config).map_err(|e| e.to_string()));

    match parsed {
        Ok(config) => config,
        Err(e) => {
            gloo_console::warn!(format!("ignoring {}: {}", CONFIG_GLOBAL, e));
            StorefrontConfig::default()
        }
    }
}
