//! Genre catalogue lookups and genre reconciliation.
//!
//! Upstream payloads carry genres in one of two redundant shapes: listing
//! endpoints send `genre_ids`, detail endpoints send `genres` objects.
//! [`reconcile_genres`] decides which side wins and derives the other.

use std::collections::HashMap;
use std::sync::Arc;

use crate::metadata::client::{ApiClient, CachePolicy, QueryParams};
use crate::metadata::error::Result;
use crate::metadata::types::{GenreListResponse, GenreRecord, RawMovie};

/// Name used for ids missing from the catalogue.
pub const UNKNOWN_GENRE: &str = "Unknown";

const GENRE_LIST_ENDPOINT: &str = "/genre/movie/list";

/// Which genre representation a payload carries.
#[derive(Debug, Clone, PartialEq)]
enum GenreShape {
    /// `genre_ids` present (possibly empty), `genres` absent or empty.
    Ids(Vec<i64>),
    /// Non-empty `genres` objects; `genre_ids` may or may not be present.
    Objects(Vec<GenreRecord>, Option<Vec<i64>>),
    Neither,
}

fn classify(movie: &mut RawMovie) -> GenreShape {
    let ids = movie.genre_ids.take();
    let objects = movie.genres.take().filter(|g| !g.is_empty());

    match (ids, objects) {
        (ids, Some(objects)) => GenreShape::Objects(objects, ids),
        (Some(ids), None) => GenreShape::Ids(ids),
        (None, None) => GenreShape::Neither,
    }
}

/// Map ids to names; ids missing from `catalogue` become [`UNKNOWN_GENRE`].
pub fn map_ids_to_names(ids: &[i64], catalogue: &[GenreRecord]) -> Vec<String> {
    let names: HashMap<i64, &str> = catalogue.iter().map(|g| (g.id, g.name.as_str())).collect();
    ids.iter()
        .map(|id| names.get(id).copied().unwrap_or(UNKNOWN_GENRE).to_string())
        .collect()
}

fn resolve_ids(ids: &[i64], catalogue: &[GenreRecord]) -> Vec<GenreRecord> {
    let by_id: HashMap<i64, &GenreRecord> = catalogue.iter().map(|g| (g.id, g)).collect();
    ids.iter()
        .map(|id| match by_id.get(id) {
            Some(genre) => (*genre).clone(),
            None => GenreRecord {
                id: *id,
                name: UNKNOWN_GENRE.to_string(),
            },
        })
        .collect()
}

/// Fill `genre_ids`, `genres` and `genre_names` consistently.
///
/// - ids only: names and `genres` follow the ids in order, unresolved ids
///   becoming [`UNKNOWN_GENRE`] in both;
/// - non-empty objects: names come from the objects, ids are backfilled
///   only when absent or empty;
/// - neither: all three become empty.
pub fn reconcile_genres(mut movie: RawMovie, catalogue: &[GenreRecord]) -> RawMovie {
    match classify(&mut movie) {
        GenreShape::Ids(ids) => {
            let genres = resolve_ids(&ids, catalogue);
            movie.genre_names = Some(genres.iter().map(|g| g.name.clone()).collect());
            movie.genres = Some(genres);
            movie.genre_ids = Some(ids);
        }
        GenreShape::Objects(objects, ids) => {
            movie.genre_names = Some(objects.iter().map(|g| g.name.clone()).collect());
            movie.genre_ids = match ids {
                Some(ids) if !ids.is_empty() => Some(ids),
                _ => Some(objects.iter().map(|g| g.id).collect()),
            };
            movie.genres = Some(objects);
        }
        GenreShape::Neither => {
            movie.genre_names = Some(Vec::new());
            movie.genre_ids = Some(Vec::new());
            movie.genres = Some(Vec::new());
        }
    }
    movie
}

/// Whether reconciling `movie` needs the catalogue at all.
pub(crate) fn needs_catalogue(movie: &RawMovie) -> bool {
    movie.genre_ids.as_ref().is_some_and(|ids| !ids.is_empty())
        && movie.genres.as_ref().map_or(true, Vec::is_empty)
}

/// Cached access to the movie genre catalogue.
#[derive(Debug, Clone)]
pub struct GenreResolver {
    client: Arc<ApiClient>,
}

impl GenreResolver {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// The full catalogue, cached under the static TTL.
    pub async fn all_genres(&self) -> Result<Vec<GenreRecord>> {
        let response: GenreListResponse = self
            .client
            .get(GENRE_LIST_ENDPOINT, &QueryParams::new(), CachePolicy::Static)
            .await?;
        Ok(response.genres)
    }

    pub async fn genre_by_id(&self, id: i64) -> Result<Option<GenreRecord>> {
        Ok(self.all_genres().await?.into_iter().find(|g| g.id == id))
    }

    pub async fn map_ids_to_names(&self, ids: &[i64]) -> Result<Vec<String>> {
        Ok(map_ids_to_names(ids, &self.all_genres().await?))
    }

    /// Catalogue entries whose id is in `ids`, in catalogue order.
    pub async fn genres_by_ids(&self, ids: &[i64]) -> Result<Vec<GenreRecord>> {
        Ok(self
            .all_genres()
            .await?
            .into_iter()
            .filter(|g| ids.contains(&g.id))
            .collect())
    }

    /// Case-insensitive substring match over genre names.
    pub async fn search_by_name(&self, term: &str) -> Result<Vec<GenreRecord>> {
        let term = term.trim().to_lowercase();
        Ok(self
            .all_genres()
            .await?
            .into_iter()
            .filter(|g| g.name.to_lowercase().contains(&term))
            .collect())
    }

    /// Reconcile a single payload, fetching the catalogue only if needed.
    pub async fn enrich_with_genres(&self, movie: RawMovie) -> Result<RawMovie> {
        if needs_catalogue(&movie) {
            let catalogue = self.all_genres().await?;
            Ok(reconcile_genres(movie, &catalogue))
        } else {
            Ok(reconcile_genres(movie, &[]))
        }
    }
}
