//! Browser-independent storefront logic.
//!
//! Everything here is plain data and rules; the wasm crate reads the DOM into
//! these types and writes the results back.

pub mod card;
pub mod cart_panel;
pub mod config;
pub mod fields;
pub mod forms;
pub mod modal_registry;
pub mod options;
pub mod product_modal;

pub use config::{ConfigError, StorefrontConfig};
pub use options::{OptionBoard, OptionGroup, OptionItem, OptionKind, Toggle};
pub use product_modal::{ModalError, ModalPhase, ProductModal, ProductSheet, Submission};
