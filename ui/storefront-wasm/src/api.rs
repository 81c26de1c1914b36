//! HTML fragment fetching.
//!
//! The server renders every dynamic piece (product options, category grids,
//! search results) and the client only swaps markup. Requests are relative to
//! the page origin; configure the paths through `StorefrontConfig::endpoints`.

use async_trait::async_trait;
use gloo_net::http::Request;
use zs_catalog_client::{FetchError, FragmentSource};

/// `fetch` GET returning the body text, failing on non-2xx statuses.
pub async fn fetch_text(url: &str) -> Result<String, FetchError> {
    let resp = Request::get(url)
        .header("Accept", "text/html")
        .send()
        .await
        .map_err(|e| FetchError::Network(e.to_string()))?;

    if !resp.ok() {
        return Err(FetchError::Status {
            status: resp.status(),
            url: url.to_string(),
        });
    }

    resp.text()
        .await
        .map_err(|e| FetchError::Body(e.to_string()))
}

#[derive(Clone, Copy, Default)]
pub struct BrowserFragments;

#[async_trait(?Send)]
impl FragmentSource for BrowserFragments {
    async fn fetch_fragment(&self, url: &str) -> Result<String, FetchError> {
        fetch_text(url).await
    }
}
