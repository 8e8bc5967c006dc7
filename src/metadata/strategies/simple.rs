use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{clamp_page, SearchContext, SearchStrategy, StrategyKind, SEARCH_ENDPOINT};
use crate::metadata::client::{CachePolicy, QueryParams};
use crate::metadata::criteria::query_value;
use crate::metadata::error::Result;
use crate::metadata::types::{Filters, RawMovie, RawPage, SearchItem, SearchResult};

/// Direct text search. `sort_by` is applied client-side because the
/// endpoint ignores it.
#[derive(Debug, Clone)]
pub struct SimpleSearch {
    ctx: SearchContext,
}

impl SimpleSearch {
    pub fn new(ctx: SearchContext) -> Self {
        Self { ctx }
    }

    fn params(query: &str, page: u32, filters: &Filters) -> QueryParams {
        let mut params = QueryParams::new();
        params.insert("query".into(), query.trim().to_string());
        params.insert("include_adult".into(), "false".into());

        for (key, value) in filters {
            if key == "sort_by" {
                continue;
            }
            if let Some(value) = query_value(value) {
                params.insert(key.clone(), value);
            }
        }

        let page = params
            .get("page")
            .and_then(|p| p.parse::<u32>().ok())
            .unwrap_or(page);
        params.insert("page".into(), clamp_page(page).to_string());
        params
    }
}

#[async_trait]
impl SearchStrategy for SimpleSearch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Simple
    }

    async fn search(&self, query: &str, page: u32, filters: &Filters) -> Result<SearchResult> {
        let params = Self::params(query, page, filters);
        debug!(query, page, "Simple movie search");

        let mut upstream: RawPage<RawMovie> = self
            .ctx
            .client
            .get(SEARCH_ENDPOINT, &params, CachePolicy::Dynamic)
            .await?;

        let mut movies = self
            .ctx
            .processor
            .process(std::mem::take(&mut upstream.results))
            .await?;
        if let Some(sort_by) = filters.get("sort_by").and_then(Value::as_str) {
            movies = self.ctx.processor.sort(movies, sort_by);
        }

        Ok(SearchResult::from_page(
            &upstream,
            movies.into_iter().map(SearchItem::from).collect(),
            query,
            filters.clone(),
        ))
    }
}
