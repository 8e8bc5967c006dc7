//! Movie search strategies and the rule that picks one.
//!
//! The text-search endpoint cannot filter by genre and the discovery
//! endpoint has no text parameter, so the combination requested decides
//! where the work happens:
//!
//! | filters                         | strategy        |
//! |---------------------------------|-----------------|
//! | genre + non-blank text          | GenreFiltered   |
//! | any discovery-only constraint   | Advanced        |
//! | genre without text              | Advanced        |
//! | otherwise                       | Simple          |

mod advanced;
mod genre_filtered;
mod simple;

pub use advanced::AdvancedSearch;
pub use genre_filtered::GenreFilteredSearch;
pub use simple::SimpleSearch;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::SearchConfig;
use crate::metadata::client::ApiClient;
use crate::metadata::collection::MovieCollectionProcessor;
use crate::metadata::error::Result;
use crate::metadata::types::{Filters, SearchResult, MAX_PAGES};

pub(crate) const SEARCH_ENDPOINT: &str = "/search/movie";
pub(crate) const DISCOVER_ENDPOINT: &str = "/discover/movie";

/// Filters only the discovery endpoint understands.
pub const ADVANCED_FILTER_KEYS: [&str; 8] = [
    "year",
    "vote_average.gte",
    "vote_count.gte",
    "release_date.gte",
    "release_date.lte",
    "with_runtime.gte",
    "with_runtime.lte",
    "with_original_language",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Simple,
    GenreFiltered,
    Advanced,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrategyKind::Simple => "simple",
            StrategyKind::GenreFiltered => "genre_filtered",
            StrategyKind::Advanced => "advanced",
        })
    }
}

#[async_trait]
pub trait SearchStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    async fn search(&self, query: &str, page: u32, filters: &Filters) -> Result<SearchResult>;
}

/// Shared collaborators of every strategy.
#[derive(Debug, Clone)]
pub struct SearchContext {
    pub client: Arc<ApiClient>,
    pub processor: Arc<MovieCollectionProcessor>,
    pub config: SearchConfig,
}

fn is_set(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

pub fn has_genre_filter(filters: &Filters) -> bool {
    is_set(filters.get("with_genres"))
}

pub fn has_advanced_filters(filters: &Filters) -> bool {
    ADVANCED_FILTER_KEYS
        .iter()
        .any(|key| is_set(filters.get(*key)))
}

/// Pick the strategy for a query and its filters.
pub fn select_strategy(query: &str, filters: &Filters) -> StrategyKind {
    let has_text = !query.trim().is_empty();
    let has_genre = has_genre_filter(filters);

    if has_genre && has_text {
        StrategyKind::GenreFiltered
    } else if has_advanced_filters(filters) || has_genre {
        StrategyKind::Advanced
    } else {
        StrategyKind::Simple
    }
}

/// The genre to match: a number, or the first id of a comma-separated list.
pub(crate) fn target_genre(filters: &Filters) -> Option<i64> {
    match filters.get("with_genres")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.split(',').next()?.trim().parse().ok(),
        Value::Array(items) => items.first()?.as_i64(),
        _ => None,
    }
}

pub(crate) fn clamp_page(page: u32) -> u32 {
    page.clamp(1, MAX_PAGES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filters(pairs: &[(&str, Value)]) -> Filters {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn genre_with_text_scans() {
        let f = filters(&[("with_genres", json!(28))]);
        assert_eq!(select_strategy("batman", &f), StrategyKind::GenreFiltered);
    }

    #[test]
    fn genre_with_text_beats_advanced_filters() {
        let f = filters(&[("with_genres", json!("28")), ("year", json!(2008))]);
        assert_eq!(select_strategy("batman", &f), StrategyKind::GenreFiltered);
    }

    #[test]
    fn genre_without_text_discovers() {
        let f = filters(&[("with_genres", json!(28))]);
        assert_eq!(select_strategy("  ", &f), StrategyKind::Advanced);
    }

    #[test]
    fn each_advanced_key_discovers() {
        for key in ADVANCED_FILTER_KEYS {
            let f = filters(&[(key, json!("x"))]);
            assert_eq!(select_strategy("q", &f), StrategyKind::Advanced, "{key}");
        }
    }

    #[test]
    fn plain_text_is_simple() {
        assert_eq!(select_strategy("matrix", &Filters::new()), StrategyKind::Simple);
        let f = filters(&[("sort_by", json!("title.asc")), ("include_adult", json!(true))]);
        assert_eq!(select_strategy("matrix", &f), StrategyKind::Simple);
    }

    #[test]
    fn null_and_blank_filters_are_ignored() {
        let f = filters(&[("year", Value::Null), ("with_genres", json!(""))]);
        assert_eq!(select_strategy("matrix", &f), StrategyKind::Simple);
    }

    #[test]
    fn target_genre_forms() {
        assert_eq!(target_genre(&filters(&[("with_genres", json!(28))])), Some(28));
        assert_eq!(
            target_genre(&filters(&[("with_genres", json!("35,28"))])),
            Some(35)
        );
        assert_eq!(
            target_genre(&filters(&[("with_genres", json!([12, 28]))])),
            Some(12)
        );
        assert_eq!(target_genre(&filters(&[("with_genres", json!("x"))])), None);
        assert_eq!(target_genre(&Filters::new()), None);
    }
}
