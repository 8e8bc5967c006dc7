use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use super::{target_genre, SearchContext, SearchStrategy, StrategyKind, SEARCH_ENDPOINT};
use crate::metadata::client::{query_params, CachePolicy};
use crate::metadata::criteria::query_value;
use crate::metadata::error::{Result, TmdbError};
use crate::metadata::types::{Filters, MovieRecord, RawMovie, RawPage, SearchItem, SearchResult};

/// Text search restricted to one genre.
///
/// Scans up to `max_pages_per_query` upstream pages, keeping movies whose
/// `genre_ids` contain the target, and stops once upstream pagination runs
/// out or `max_scan_results` matches are collected. The matches are then
/// sorted and paginated in memory.
#[derive(Debug, Clone)]
pub struct GenreFilteredSearch {
    ctx: SearchContext,
}

impl GenreFilteredSearch {
    pub fn new(ctx: SearchContext) -> Self {
        Self { ctx }
    }

    async fn scan(&self, query: &str, genre_id: i64, filters: &Filters) -> Result<Vec<MovieRecord>> {
        let include_adult = filters
            .get("include_adult")
            .and_then(query_value)
            .unwrap_or_else(|| "false".to_string());

        let mut matches = Vec::new();
        for search_page in 1..=self.ctx.config.max_pages_per_query {
            let params = query_params([
                ("query", query.trim().to_string()),
                ("include_adult", include_adult.clone()),
                ("page", search_page.to_string()),
            ]);

            let upstream: RawPage<RawMovie> = self
                .ctx
                .client
                .get(SEARCH_ENDPOINT, &params, CachePolicy::Dynamic)
                .await?;

            let upstream_pages = upstream.total_pages.unwrap_or(1);
            let hits: Vec<RawMovie> = upstream
                .results
                .into_iter()
                .filter(|m| m.genre_ids.as_deref().unwrap_or_default().contains(&genre_id))
                .collect();

            debug!(
                search_page,
                upstream_pages,
                hits = hits.len(),
                "Scanned search page for genre"
            );
            matches.extend(self.ctx.processor.process(hits).await?);

            if i64::from(search_page) >= upstream_pages
                || matches.len() >= self.ctx.config.max_scan_results
            {
                break;
            }
        }

        Ok(matches)
    }
}

#[async_trait]
impl SearchStrategy for GenreFilteredSearch {
    fn kind(&self) -> StrategyKind {
        StrategyKind::GenreFiltered
    }

    async fn search(&self, query: &str, page: u32, filters: &Filters) -> Result<SearchResult> {
        let genre_id = target_genre(filters)
            .ok_or_else(|| TmdbError::validation("with_genres must contain a genre id"))?;

        let mut matches = self.scan(query, genre_id, filters).await?;
        info!(query, genre_id, matches = matches.len(), "Genre-filtered search");

        if let Some(sort_by) = filters.get("sort_by").and_then(Value::as_str) {
            matches = self.ctx.processor.sort(matches, sort_by);
        }

        let window = self.ctx.processor.paginate(
            matches,
            page as usize,
            self.ctx.config.results_per_page,
        );

        Ok(SearchResult::new(
            window.page as u32,
            window.total_pages as u64,
            window.total_results as u64,
            window.results.into_iter().map(SearchItem::from).collect(),
            query,
            filters.clone(),
        ))
    }
}
