use async_trait::async_trait;
use tracing::debug;

use super::{clamp_page, SearchContext, SearchStrategy, StrategyKind, DISCOVER_ENDPOINT};
use crate::metadata::client::{CachePolicy, QueryParams};
use crate::metadata::criteria::query_value;
use crate::metadata::error::Result;
use crate::metadata::types::{Filters, RawMovie, RawPage, SearchItem, SearchResult};

/// Filters forwarded to the discovery endpoint.
const DISCOVER_KEYS: [&str; 11] = [
    "year",
    "with_genres",
    "vote_average.gte",
    "vote_count.gte",
    "release_date.gte",
    "release_date.lte",
    "with_runtime.gte",
    "with_runtime.lte",
    "with_original_language",
    "sort_by",
    "include_adult",
];

const DEFAULT_SORT: &str = "popularity.desc";

/// Filter-driven discovery with an optional text post-filter.
///
/// The discovery endpoint has no text parameter, so a query narrows the
/// fetched page in memory. The result then describes that filtered window:
/// `total_results` is the number of matches on the page and `page` echoes
/// the requested page.
#[derive(Debug, Clone)]
pub struct AdvancedSearch {
    ctx: SearchContext,
}

impl AdvancedSearch {
    pub fn new(ctx: SearchContext) -> Self {
        Self { ctx }
    }

    fn params(page: u32, filters: &Filters) -> QueryParams {
        let mut params: QueryParams = DISCOVER_KEYS
            .iter()
            .filter_map(|key| {
                let value = query_value(filters.get(*key)?)?;
                Some((key.to_string(), value))
            })
            .collect();

        params
            .entry("sort_by".to_string())
            .or_insert_with(|| DEFAULT_SORT.to_string());
        params.insert("page".into(), clamp_page(page).to_string());
        params
    }
}

#[async_trait]
impl SearchStrategy for AdvancedSearch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Advanced
    }

    async fn search(&self, query: &str, page: u32, filters: &Filters) -> Result<SearchResult> {
        let params = Self::params(page, filters);
        debug!(query, params = ?params, "Advanced movie search");

        let mut upstream: RawPage<RawMovie> = self
            .ctx
            .client
            .get(DISCOVER_ENDPOINT, &params, CachePolicy::Dynamic)
            .await?;

        let movies = self
            .ctx
            .processor
            .process(std::mem::take(&mut upstream.results))
            .await?;

        if query.trim().is_empty() {
            return Ok(SearchResult::from_page(
                &upstream,
                movies.into_iter().map(SearchItem::from).collect(),
                query,
                filters.clone(),
            ));
        }

        let filtered = self.ctx.processor.filter_by_text(movies, query);
        let window = self
            .ctx
            .processor
            .paginate(filtered, 1, self.ctx.config.results_per_page);

        Ok(SearchResult::new(
            clamp_page(page),
            window.total_pages as u64,
            window.total_results as u64,
            window.results.into_iter().map(SearchItem::from).collect(),
            query,
            filters.clone(),
        ))
    }
}
