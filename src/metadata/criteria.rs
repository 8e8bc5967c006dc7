//! Fluent builder for search filters, keyed by upstream parameter names.

use serde_json::{json, Value};

use crate::metadata::client::QueryParams;
use crate::metadata::types::{Filters, MAX_PAGES};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    criteria: Filters,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(mut self, key: &str, value: Value) -> Self {
        self.criteria.insert(key.to_string(), value);
        self
    }

    pub fn with_query(self, query: &str) -> Self {
        self.set("query", json!(query.trim()))
    }

    /// Page number, clamped to the upstream range.
    pub fn with_page(self, page: i64) -> Self {
        self.set("page", json!(page.clamp(1, MAX_PAGES as i64)))
    }

    pub fn with_genre(self, genre_id: i64) -> Self {
        self.set("with_genres", json!(genre_id))
    }

    pub fn with_genres(self, genre_ids: &[i64]) -> Self {
        let joined = genre_ids
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        self.set("with_genres", json!(joined))
    }

    pub fn with_year(self, year: i32) -> Self {
        self.set("year", json!(year))
    }

    pub fn with_rating(self, min_rating: f64, min_votes: i64) -> Self {
        self.set("vote_average.gte", json!(min_rating))
            .set("vote_count.gte", json!(min_votes))
    }

    pub fn with_date_range(self, start: &str, end: &str) -> Self {
        self.set("release_date.gte", json!(start))
            .set("release_date.lte", json!(end))
    }

    pub fn with_sorting(self, sort_by: &str) -> Self {
        self.set("sort_by", json!(sort_by))
    }

    pub fn include_adult(self, include: bool) -> Self {
        self.set("include_adult", json!(include))
    }

    pub fn with_original_language(self, language: &str) -> Self {
        self.set("with_original_language", json!(language))
    }

    pub fn with_min_runtime(self, minutes: i64) -> Self {
        self.set("with_runtime.gte", json!(minutes))
    }

    pub fn with_max_runtime(self, minutes: i64) -> Self {
        self.set("with_runtime.lte", json!(minutes))
    }

    /// Merge arbitrary filters; later values win.
    pub fn with_custom_filters(mut self, filters: Filters) -> Self {
        self.criteria.extend(filters);
        self
    }

    pub fn build(self) -> Filters {
        self.criteria
    }
}

/// Render a filter value as a query-string value. `null` is dropped.
pub fn query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(query_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}

/// Translate filters into query parameters, skipping `null` values.
pub fn to_query_params(filters: &Filters) -> QueryParams {
    filters
        .iter()
        .filter_map(|(k, v)| query_value(v).map(|v| (k.clone(), v)))
        .collect()
}

/// Read the page from filters, defaulting to 1 and clamping to the
/// upstream range.
pub fn page_from(filters: &Filters) -> u32 {
    filters
        .get("page")
        .and_then(|v| v.as_i64().or_else(|| v.as_str()?.trim().parse().ok()))
        .unwrap_or(1)
        .clamp(1, MAX_PAGES as i64) as u32
}
