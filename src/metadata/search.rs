//! Search entry points: strategy dispatch for movies, plus multi and
//! people search.

use tracing::{debug, warn};

use serde_json::Value;

use crate::metadata::client::{CachePolicy, QueryParams};
use crate::metadata::criteria::{page_from, query_value};
use crate::metadata::error::Result;
use crate::metadata::strategies::{
    select_strategy, AdvancedSearch, GenreFilteredSearch, SearchContext, SearchStrategy,
    SimpleSearch, StrategyKind,
};
use crate::metadata::types::{Filters, RawMovie, RawPage, SearchItem, SearchResult, MAX_PAGES};

#[derive(Debug, Clone)]
pub struct SearchService {
    ctx: SearchContext,
    simple: SimpleSearch,
    genre_filtered: GenreFilteredSearch,
    advanced: AdvancedSearch,
}

impl SearchService {
    pub fn new(ctx: SearchContext) -> Self {
        Self {
            simple: SimpleSearch::new(ctx.clone()),
            genre_filtered: GenreFilteredSearch::new(ctx.clone()),
            advanced: AdvancedSearch::new(ctx.clone()),
            ctx,
        }
    }

    pub fn strategy(&self, kind: StrategyKind) -> &dyn SearchStrategy {
        match kind {
            StrategyKind::Simple => &self.simple,
            StrategyKind::GenreFiltered => &self.genre_filtered,
            StrategyKind::Advanced => &self.advanced,
        }
    }

    pub async fn search_movies(&self, query: &str, page: u32, filters: &Filters) -> Result<SearchResult> {
        let kind = select_strategy(query, filters);
        debug!(query, page, strategy = %kind, "Searching movies");
        self.strategy(kind).search(query, page, filters).await
    }

    /// Discovery search driven entirely by `criteria`, which also carries
    /// the `query` and `page`.
    pub async fn advanced_search(&self, criteria: &Filters) -> Result<SearchResult> {
        let query = criteria
            .get("query")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let page = page_from(criteria);
        self.advanced.search(&query, page, criteria).await
    }

    /// Movies, TV shows and people. Movie hits are enriched, the rest pass
    /// through untouched.
    pub async fn search_multi(&self, query: &str, page: u32, filters: &Filters) -> Result<SearchResult> {
        let params = text_search_params(query, page, filters);
        let upstream: RawPage<Value> = self
            .ctx
            .client
            .get("/search/multi", &params, CachePolicy::Dynamic)
            .await?;

        let mut items = Vec::with_capacity(upstream.results.len());
        for item in &upstream.results {
            items.push(self.multi_item(item.clone()).await?);
        }

        Ok(SearchResult::from_page(&upstream, items, query, filters.clone()))
    }

    async fn multi_item(&self, item: Value) -> Result<SearchItem> {
        if item.get("media_type").and_then(Value::as_str) != Some("movie") {
            return Ok(SearchItem::Other(item));
        }

        match serde_json::from_value::<RawMovie>(item.clone()) {
            Ok(raw) => {
                let movie = self.ctx.processor.enricher().enrich(raw).await?;
                Ok(SearchItem::from(movie))
            }
            Err(e) => {
                warn!(error = %e, "Malformed movie in multi search, passing through");
                Ok(SearchItem::Other(item))
            }
        }
    }

    pub async fn search_people(&self, query: &str, page: u32, filters: &Filters) -> Result<SearchResult> {
        let params = text_search_params(query, page, filters);
        let mut upstream: RawPage<Value> = self
            .ctx
            .client
            .get("/search/person", &params, CachePolicy::Dynamic)
            .await?;

        let items = std::mem::take(&mut upstream.results)
            .into_iter()
            .map(SearchItem::Other)
            .collect();
        Ok(SearchResult::from_page(&upstream, items, query, filters.clone()))
    }
}

/// `{query, page, include_adult=false}` overlaid by `filters`, page clamped.
fn text_search_params(query: &str, page: u32, filters: &Filters) -> QueryParams {
    let mut params = QueryParams::new();
    params.insert("query".into(), query.trim().to_string());
    params.insert("page".into(), page.to_string());
    params.insert("include_adult".into(), "false".into());
    for (key, value) in filters {
        if let Some(value) = query_value(value) {
            params.insert(key.clone(), value);
        }
    }

    let page = params
        .get("page")
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_PAGES as i64);
    params.insert("page".into(), page.to_string());
    params
}
