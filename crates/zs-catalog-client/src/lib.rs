use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_PRODUCT_MODAL: &str = "/zero_star_cafe/api/products";
pub const DEFAULT_PRODUCTS_BY_CATEGORY: &str = "/zero_star_cafe/api/products/category";
pub const DEFAULT_PRODUCT_SEARCH: &str = "/zero_star_cafe/api/products/search";

/// Server paths that return HTML fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Endpoints {
    pub product_modal: String,
    pub products_by_category: String,
    pub product_search: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            product_modal: DEFAULT_PRODUCT_MODAL.to_owned(),
            products_by_category: DEFAULT_PRODUCTS_BY_CATEGORY.to_owned(),
            product_search: DEFAULT_PRODUCT_SEARCH.to_owned(),
        }
    }
}

impl Endpoints {
    pub fn product_modal_url(&self, slug: &str) -> String {
        format!("{}/{}", self.product_modal.trim_end_matches('/'), slug)
    }

    pub fn category_url(&self, slug: &str) -> String {
        format!("{}/{}", self.products_by_category.trim_end_matches('/'), slug)
    }

    pub fn search_url(&self, term: &str) -> String {
        format!("{}?q={}", self.product_search, urlencoding::encode(term))
    }

    pub fn url_for(&self, query: &CatalogQuery) -> String {
        match query {
            CatalogQuery::Category(slug) => self.category_url(slug),
            CatalogQuery::Search(term) => self.search_url(term),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogQuery {
    Category(String),
    Search(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("fetch failed: {0}")]
    Network(String),
    #[error("unreadable response body: {0}")]
    Body(String),
}

/// Source of server-rendered HTML fragments.
///
/// The browser implementation wraps `fetch`; tests use an in-memory map.
#[async_trait(?Send)]
pub trait FragmentSource {
    async fn fetch_fragment(&self, url: &str) -> Result<String, FetchError>;
}

/// Identifies one grid request; only the newest ticket may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

/// Orders overlapping grid requests and counts searches in flight.
///
/// Every `begin` bumps the generation, so a slow response for an older query
/// is recognised as stale when it lands. Only searches hold the page loader,
/// so category loads never keep it up.
#[derive(Debug, Default)]
pub struct SearchSequencer {
    generation: Cell<u64>,
    searches: Cell<usize>,
}

/// Marks one search as in flight until dropped.
#[must_use]
pub struct SearchInFlight<'a> {
    searches: &'a Cell<usize>,
}

impl Drop for SearchInFlight<'_> {
    fn drop(&mut self) {
        self.searches.set(self.searches.get().saturating_sub(1));
    }
}

impl SearchSequencer {
    pub fn begin(&self) -> SearchTicket {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        SearchTicket(next)
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        ticket.0 == self.generation.get()
    }

    pub fn track_search(&self) -> SearchInFlight<'_> {
        self.searches.set(self.searches.get() + 1);
        SearchInFlight {
            searches: &self.searches,
        }
    }

    pub fn is_searching(&self) -> bool {
        self.searches.get() > 0
    }

    /// Invalidate whatever is in flight.
    pub fn invalidate(&self) {
        self.generation.set(self.generation.get() + 1);
    }
}

/// Trailing-edge debounce for the search box.
///
/// Each `settle` supersedes the previous one; only the latest call resolves
/// to `true` once its delay has elapsed.
#[derive(Debug, Default)]
pub struct Debounce {
    latest: Cell<u64>,
}

impl Debounce {
    pub async fn settle<D>(&self, delay: D) -> bool
    where
        D: Future<Output = ()>,
    {
        let mine = self.latest.get() + 1;
        self.latest.set(mine);
        delay.await;
        self.latest.get() == mine
    }

    /// Drop the pending call, if any.
    pub fn cancel(&self) {
        self.latest.set(self.latest.get() + 1);
    }
}

/// What the search box asks for once typing settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchAction {
    Search(String),
    /// Box cleared: go back to the first category.
    ReloadDefault,
}

impl SearchAction {
    pub fn for_input(raw: &str) -> Self {
        match raw.trim() {
            "" => SearchAction::ReloadDefault,
            term => SearchAction::Search(term.to_owned()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridUpdate {
    /// Markup to swap into the product grid.
    Replace(String),
    /// A newer request superseded this one; leave the grid alone.
    Stale,
}

pub struct CatalogSwitcher<F> {
    source: F,
    endpoints: Endpoints,
    sequencer: SearchSequencer,
}

impl<F: FragmentSource> CatalogSwitcher<F> {
    pub fn new(source: F, endpoints: Endpoints) -> Self {
        Self {
            source,
            endpoints,
            sequencer: SearchSequencer::default(),
        }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn source(&self) -> &F {
        &self.source
    }

    /// True while a search request (not a category load) is pending.
    pub fn is_searching(&self) -> bool {
        self.sequencer.is_searching()
    }

    pub async fn product_modal(&self, slug: &str) -> Result<String, FetchError> {
        self.source
            .fetch_fragment(&self.endpoints.product_modal_url(slug))
            .await
    }

    /// Fetch the grid for `query` and apply it at once.
    pub async fn load(&self, query: &CatalogQuery) -> Result<GridUpdate, FetchError> {
        self.load_with_delay(query, std::future::ready(())).await
    }

    /// Fetch the grid for `query`, then wait on `swap_delay` before handing
    /// the markup back.
    ///
    /// Any load supersedes the ones started before it. Staleness is checked
    /// once the response lands and again after the delay, so an older
    /// response or failure never reaches the caller once a newer request
    /// has started.
    pub async fn load_with_delay<D>(
        &self,
        query: &CatalogQuery,
        swap_delay: D,
    ) -> Result<GridUpdate, FetchError>
    where
        D: Future<Output = ()>,
    {
        let ticket = self.sequencer.begin();
        let _loader =
            matches!(query, CatalogQuery::Search(_)).then(|| self.sequencer.track_search());
        let url = self.endpoints.url_for(query);
        debug!("loading catalog fragment {}", url);

        let result = self.source.fetch_fragment(&url).await;
        if !self.sequencer.is_current(ticket) {
            debug!("dropping stale catalog response for {}", url);
            return Ok(GridUpdate::Stale);
        }
        let html = result.inspect_err(|err| warn!("catalog fetch failed: {}", err))?;

        swap_delay.await;
        if !self.sequencer.is_current(ticket) {
            debug!("catalog response for {} superseded during swap delay", url);
            return Ok(GridUpdate::Stale);
        }
        Ok(GridUpdate::Replace(html))
    }
}

pub fn count_label(count: usize) -> String {
    format!("{} sản phẩm", count)
}

pub fn search_title(term: &str) -> String {
    format!("Kết quả tìm kiếm: \"{}\"", term)
}

pub fn search_meta(count: usize) -> String {
    if count == 0 {
        "Không tìm thấy sản phẩm".to_owned()
    } else {
        count_label(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeSource {
        pages: HashMap<String, Result<String, FetchError>>,
        /// Number of scheduler yields before answering, per URL.
        delays: HashMap<String, usize>,
        requested: RefCell<Vec<String>>,
    }

    impl FakeSource {
        fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_owned(), Ok(html.to_owned()));
            self
        }

        fn slow(mut self, url: &str, yields: usize) -> Self {
            self.delays.insert(url.to_owned(), yields);
            self
        }
    }

    #[async_trait(?Send)]
    impl FragmentSource for FakeSource {
        async fn fetch_fragment(&self, url: &str) -> Result<String, FetchError> {
            self.requested.borrow_mut().push(url.to_owned());
            for _ in 0..self.delays.get(url).copied().unwrap_or(0) {
                tokio::task::yield_now().await;
            }
            self.pages.get(url).cloned().unwrap_or(Err(FetchError::Status {
                status: 404,
                url: url.to_owned(),
            }))
        }
    }

    #[test]
    fn builds_endpoint_urls() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.product_modal_url("ca-phe-sua"),
            "/zero_star_cafe/api/products/ca-phe-sua"
        );
        assert_eq!(
            endpoints.category_url("tra"),
            "/zero_star_cafe/api/products/category/tra"
        );
        assert_eq!(
            endpoints.search_url("trà sữa & bánh"),
            "/zero_star_cafe/api/products/search?q=tr%C3%A0%20s%E1%BB%AFa%20%26%20b%C3%A1nh"
        );
    }

    #[test]
    fn header_texts() {
        assert_eq!(count_label(1), "1 sản phẩm");
        assert_eq!(search_meta(0), "Không tìm thấy sản phẩm");
        assert_eq!(search_meta(3), "3 sản phẩm");
        assert_eq!(search_title("latte"), "Kết quả tìm kiếm: \"latte\"");
    }

    #[tokio::test]
    async fn loads_category_fragment() -> anyhow::Result<()> {
        let endpoints = Endpoints::default();
        let source = FakeSource::default().page(&endpoints.category_url("tra"), "<div>tea</div>");
        let switcher = CatalogSwitcher::new(source, endpoints);

        let update = switcher.load(&CatalogQuery::Category("tra".into())).await?;
        assert_eq!(update, GridUpdate::Replace("<div>tea</div>".into()));
        assert!(!switcher.is_searching());
        Ok(())
    }

    #[tokio::test]
    async fn surfaces_http_errors() {
        let switcher = CatalogSwitcher::new(FakeSource::default(), Endpoints::default());
        let err = switcher
            .load(&CatalogQuery::Search("latte".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert!(!switcher.is_searching());
    }

    #[tokio::test]
    async fn stale_search_response_is_dropped() {
        let endpoints = Endpoints::default();
        let old_url = endpoints.search_url("la");
        let new_url = endpoints.search_url("latte");
        let source = FakeSource::default()
            .page(&old_url, "old")
            .slow(&old_url, 3)
            .page(&new_url, "new");
        let switcher = CatalogSwitcher::new(source, endpoints);

        let older = CatalogQuery::Search("la".into());
        let newer = CatalogQuery::Search("latte".into());
        let (first, second) = tokio::join!(switcher.load(&older), switcher.load(&newer));

        assert_eq!(first, Ok(GridUpdate::Stale));
        assert_eq!(second, Ok(GridUpdate::Replace("new".into())));
        assert_eq!(switcher.source().requested.borrow().len(), 2);
    }

    #[test]
    fn invalidate_marks_ticket_stale() {
        let sequencer = SearchSequencer::default();
        let ticket = sequencer.begin();
        let in_flight = sequencer.track_search();
        assert!(sequencer.is_searching());
        sequencer.invalidate();
        assert!(!sequencer.is_current(ticket));
        drop(in_flight);
        assert!(!sequencer.is_searching());
    }

    async fn yields(n: usize) {
        for _ in 0..n {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn category_click_during_swap_delay_wins() {
        let endpoints = Endpoints::default();
        let source = FakeSource::default()
            .page(&endpoints.search_url("latte"), "latte results")
            .page(&endpoints.category_url("tra"), "tea grid");
        let switcher = CatalogSwitcher::new(source, endpoints);

        let latte = CatalogQuery::Search("latte".into());
        let search = switcher.load_with_delay(&latte, yields(5));
        let click = async {
            // Lands while the search result waits out its delay.
            tokio::task::yield_now().await;
            switcher.load(&CatalogQuery::Category("tra".into())).await
        };
        let (search, click) = tokio::join!(search, click);

        assert_eq!(click, Ok(GridUpdate::Replace("tea grid".into())));
        assert_eq!(search, Ok(GridUpdate::Stale));
    }

    #[tokio::test]
    async fn delayed_result_applies_when_nothing_newer_started() {
        let endpoints = Endpoints::default();
        let source = FakeSource::default().page(&endpoints.search_url("mocha"), "mocha");
        let switcher = CatalogSwitcher::new(source, endpoints);

        let update = switcher
            .load_with_delay(&CatalogQuery::Search("mocha".into()), yields(3))
            .await;
        assert_eq!(update, Ok(GridUpdate::Replace("mocha".into())));
    }

    #[tokio::test]
    async fn superseded_failure_is_not_surfaced() {
        let endpoints = Endpoints::default();
        let broken = endpoints.search_url("la");
        let source = FakeSource::default()
            .slow(&broken, 3)
            .page(&endpoints.search_url("latte"), "new");
        let switcher = CatalogSwitcher::new(source, endpoints);

        let la = CatalogQuery::Search("la".into());
        let latte = CatalogQuery::Search("latte".into());
        let (first, second) = tokio::join!(switcher.load(&la), switcher.load(&latte));
        assert_eq!(first, Ok(GridUpdate::Stale));
        assert_eq!(second, Ok(GridUpdate::Replace("new".into())));
    }

    #[tokio::test]
    async fn only_searches_hold_the_loader() {
        let endpoints = Endpoints::default();
        let category = endpoints.category_url("tra");
        let source = FakeSource::default()
            .page(&category, "tea")
            .slow(&category, 5)
            .page(&endpoints.search_url("latte"), "latte");
        let switcher = CatalogSwitcher::new(source, endpoints);

        let tra = CatalogQuery::Category("tra".into());
        let slow_category = switcher.load(&tra);
        let search = async {
            tokio::task::yield_now().await;
            let update = switcher.load(&CatalogQuery::Search("latte".into())).await;
            (update, switcher.is_searching())
        };
        let (category, (search, searching_after)) = tokio::join!(slow_category, search);

        // The category load is still pending when the search ends.
        assert!(!searching_after);
        assert_eq!(search, Ok(GridUpdate::Replace("latte".into())));
        assert_eq!(category, Ok(GridUpdate::Stale));
    }

    #[tokio::test]
    async fn search_in_flight_reports_searching() {
        let endpoints = Endpoints::default();
        let url = endpoints.search_url("latte");
        let source = FakeSource::default().page(&url, "latte").slow(&url, 3);
        let switcher = CatalogSwitcher::new(source, endpoints);

        let latte = CatalogQuery::Search("latte".into());
        let (_, during) = tokio::join!(switcher.load(&latte), async { switcher.is_searching() });
        assert!(during);
        assert!(!switcher.is_searching());
    }

    #[tokio::test]
    async fn failed_search_releases_the_loader() {
        let switcher = CatalogSwitcher::new(FakeSource::default(), Endpoints::default());
        let delayed = switcher
            .load_with_delay(&CatalogQuery::Search("latte".into()), yields(2))
            .await;
        assert!(delayed.is_err());
        assert!(!switcher.is_searching());
    }

    #[tokio::test]
    async fn debounce_runs_only_the_last_keystroke() {
        let debounce = Debounce::default();
        let (first, second) = tokio::join!(debounce.settle(yields(3)), async {
            tokio::task::yield_now().await;
            debounce.settle(yields(3)).await
        });
        assert!(!first);
        assert!(second);
    }

    #[tokio::test]
    async fn cancel_drops_pending_debounce() {
        let debounce = Debounce::default();
        let (pending, ()) = tokio::join!(debounce.settle(yields(3)), async {
            tokio::task::yield_now().await;
            debounce.cancel();
        });
        assert!(!pending);
        assert!(debounce.settle(std::future::ready(())).await);
    }

    #[test]
    fn cleared_box_reloads_default_category() {
        assert_eq!(SearchAction::for_input("   "), SearchAction::ReloadDefault);
        assert_eq!(
            SearchAction::for_input(" latte "),
            SearchAction::Search("latte".into())
        );
    }
}
