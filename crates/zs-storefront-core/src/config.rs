//! Page-level configuration.
//!
//! Every field has a default so a partial (or absent) config object works.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::Level;
use zs_catalog_client::Endpoints;
use zs_storage::{CART_KEY, SEARCH_HISTORY_KEY, SEARCH_HISTORY_LIMIT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorefrontConfig {
    pub endpoints: Endpoints,
    pub cart_key: String,
    pub search_history_key: String,
    pub search_debounce_ms: u32,
    pub search_history_limit: usize,
    pub loyalty_points: u64,
    pub flash_highlight_ms: u32,
    /// Most verbose `tracing` level forwarded to the browser console.
    pub log_level: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            cart_key: CART_KEY.to_owned(),
            search_history_key: SEARCH_HISTORY_KEY.to_owned(),
            search_debounce_ms: 600,
            search_history_limit: SEARCH_HISTORY_LIMIT,
            loyalty_points: 300,
            flash_highlight_ms: 1800,
            log_level: "info".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("endpoint `{0}` must not be empty")]
    EmptyEndpoint(&'static str),
    #[error("storage key `{0}` must not be empty")]
    EmptyKey(&'static str),
    #[error("search history limit must be at least 1")]
    ZeroHistoryLimit,
    #[error("unknown log level `{0}`")]
    UnknownLogLevel(String),
}

impl StorefrontConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoints = [
            ("productModal", &self.endpoints.product_modal),
            ("productsByCategory", &self.endpoints.products_by_category),
            ("productSearch", &self.endpoints.product_search),
        ];
        for (name, path) in endpoints {
            if path.trim().is_empty() {
                return Err(ConfigError::EmptyEndpoint(name));
            }
        }
        if self.cart_key.trim().is_empty() {
            return Err(ConfigError::EmptyKey("cartKey"));
        }
        if self.search_history_key.trim().is_empty() {
            return Err(ConfigError::EmptyKey("searchHistoryKey"));
        }
        if self.search_history_limit == 0 {
            return Err(ConfigError::ZeroHistoryLimit);
        }
        self.max_log_level()?;
        Ok(())
    }

    pub fn max_log_level(&self) -> Result<Level, ConfigError> {
        Level::from_str(self.log_level.trim())
            .map_err(|_| ConfigError::UnknownLogLevel(self.log_level.clone()))
    }

    /// Parse a JSON config, keeping defaults for anything omitted.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() -> anyhow::Result<()> {
        let config = StorefrontConfig::from_json(
            r#"{ "loyaltyPoints": 500, "endpoints": { "productSearch": "/api/search" } }"#,
        )?;
        assert_eq!(config.loyalty_points, 500);
        assert_eq!(config.endpoints.product_search, "/api/search");
        assert_eq!(config.endpoints.product_modal, "/zero_star_cafe/api/products");
        assert_eq!(config.search_debounce_ms, 600);
        assert_eq!(config.cart_key, "pos_cart");
        assert_eq!(config.max_log_level()?, Level::INFO);
        config.validate()?;
        Ok(())
    }

    #[test]
    fn rejects_unusable_values() {
        let mut config = StorefrontConfig::default();
        config.search_history_limit = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroHistoryLimit));

        let mut config = StorefrontConfig::default();
        config.endpoints.products_by_category = " ".into();
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyEndpoint("productsByCategory"))
        );

        let mut config = StorefrontConfig::default();
        config.log_level = "chatty".into();
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnknownLogLevel("chatty".into()))
        );
    }

    #[test]
    fn log_level_is_case_insensitive() -> anyhow::Result<()> {
        let config = StorefrontConfig::from_json(r#"{ "logLevel": "DEBUG" }"#)?;
        assert_eq!(config.max_log_level()?, Level::DEBUG);
        Ok(())
    }
}
