//! The public facade and the seams it is composed from.
//!
//! [`Tmdb`] is the only entry point callers need. It holds its
//! collaborators behind [`MovieCatalog`], [`MovieSearch`] and
//! [`GenreCatalog`], validates caller input, and delegates.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::metadata::client::{ApiClient, MemoryCache, RateLimiter, ResponseCache};
use crate::metadata::collection::MovieCollectionProcessor;
use crate::metadata::enrichment::MovieDataEnricher;
use crate::metadata::error::{Result, TmdbError};
use crate::metadata::genres::GenreResolver;
use crate::metadata::images::ImageUrlBuilder;
use crate::metadata::movies::{ListingKind, MovieService, TimeWindow};
use crate::metadata::search::SearchService;
use crate::metadata::strategies::SearchContext;
use crate::metadata::types::{Filters, GenreRecord, MovieRecord, SearchResult};

/// Movie listings, details and discovery.
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    async fn listing(&self, kind: ListingKind, page: u32) -> Result<SearchResult>;

    async fn details(&self, movie_id: i64, append_to: &[&str]) -> Result<MovieRecord>;

    /// Never fails as a whole; ids that error are skipped.
    async fn by_ids(&self, movie_ids: &[i64], append_to: &[&str]) -> Vec<MovieRecord>;

    async fn discover(&self, filters: &Filters, page: u32) -> Result<SearchResult>;

    async fn by_genre(&self, genre_id: i64, page: u32, extra: &Filters) -> Result<SearchResult>;
}

/// Text and filter search.
#[async_trait]
pub trait MovieSearch: Send + Sync {
    async fn search_movies(&self, query: &str, page: u32, filters: &Filters) -> Result<SearchResult>;

    async fn search_multi(&self, query: &str, page: u32, filters: &Filters) -> Result<SearchResult>;

    async fn search_people(&self, query: &str, page: u32, filters: &Filters) -> Result<SearchResult>;

    async fn advanced_search(&self, criteria: &Filters) -> Result<SearchResult>;
}

/// Genre catalogue lookups.
#[async_trait]
pub trait GenreCatalog: Send + Sync {
    async fn all_genres(&self) -> Result<Vec<GenreRecord>>;

    async fn genre_by_id(&self, id: i64) -> Result<Option<GenreRecord>>;

    async fn map_ids_to_names(&self, ids: &[i64]) -> Result<Vec<String>>;

    async fn search_by_name(&self, term: &str) -> Result<Vec<GenreRecord>>;
}

#[async_trait]
impl MovieCatalog for MovieService {
    async fn listing(&self, kind: ListingKind, page: u32) -> Result<SearchResult> {
        MovieService::listing(self, kind, page).await
    }

    async fn details(&self, movie_id: i64, append_to: &[&str]) -> Result<MovieRecord> {
        MovieService::details(self, movie_id, append_to).await
    }

    async fn by_ids(&self, movie_ids: &[i64], append_to: &[&str]) -> Vec<MovieRecord> {
        MovieService::by_ids(self, movie_ids, append_to).await
    }

    async fn discover(&self, filters: &Filters, page: u32) -> Result<SearchResult> {
        MovieService::discover(self, filters, page).await
    }

    async fn by_genre(&self, genre_id: i64, page: u32, extra: &Filters) -> Result<SearchResult> {
        MovieService::by_genre(self, genre_id, page, extra).await
    }
}

#[async_trait]
impl MovieSearch for SearchService {
    async fn search_movies(&self, query: &str, page: u32, filters: &Filters) -> Result<SearchResult> {
        SearchService::search_movies(self, query, page, filters).await
    }

    async fn search_multi(&self, query: &str, page: u32, filters: &Filters) -> Result<SearchResult> {
        SearchService::search_multi(self, query, page, filters).await
    }

    async fn search_people(&self, query: &str, page: u32, filters: &Filters) -> Result<SearchResult> {
        SearchService::search_people(self, query, page, filters).await
    }

    async fn advanced_search(&self, criteria: &Filters) -> Result<SearchResult> {
        SearchService::advanced_search(self, criteria).await
    }
}

#[async_trait]
impl GenreCatalog for GenreResolver {
    async fn all_genres(&self) -> Result<Vec<GenreRecord>> {
        GenreResolver::all_genres(self).await
    }

    async fn genre_by_id(&self, id: i64) -> Result<Option<GenreRecord>> {
        GenreResolver::genre_by_id(self, id).await
    }

    async fn map_ids_to_names(&self, ids: &[i64]) -> Result<Vec<String>> {
        GenreResolver::map_ids_to_names(self, ids).await
    }

    async fn search_by_name(&self, term: &str) -> Result<Vec<GenreRecord>> {
        GenreResolver::search_by_name(self, term).await
    }
}

/// Concrete services wired over one shared client, for callers that need
/// the operations the facade does not expose.
#[derive(Debug, Clone)]
pub struct Services {
    pub client: Arc<ApiClient>,
    pub genres: GenreResolver,
    pub images: ImageUrlBuilder,
    pub movies: Arc<MovieService>,
    pub search: Arc<SearchService>,
}

impl Services {
    /// Wire every component over a single client, cache and rate limiter.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache: Arc<dyn ResponseCache> = Arc::new(MemoryCache::new());
        let limiter = Arc::new(RateLimiter::new(config.rate_limiting.delay()));
        Self::with_parts(config, cache, limiter)
    }

    pub fn with_parts(
        config: &Config,
        cache: Arc<dyn ResponseCache>,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self> {
        let client = Arc::new(ApiClient::with_parts(config, cache, limiter)?);
        let genres = GenreResolver::new(client.clone());
        let images = ImageUrlBuilder::new(&config.tmdb.image_base_url, config.images.clone());
        let enricher = Arc::new(MovieDataEnricher::new(genres.clone(), images.clone()));
        let processor = Arc::new(MovieCollectionProcessor::new(
            enricher,
            config.search.min_word_length,
        ));

        let movies = Arc::new(MovieService::new(client.clone(), processor.clone()));
        let search = Arc::new(SearchService::new(SearchContext {
            client: client.clone(),
            processor,
            config: config.search.clone(),
        }));

        Ok(Self {
            client,
            genres,
            images,
            movies,
            search,
        })
    }
}

pub struct Tmdb {
    movies: Arc<dyn MovieCatalog>,
    search: Arc<dyn MovieSearch>,
    genres: Arc<dyn GenreCatalog>,
    images: ImageUrlBuilder,
    max_batch_ids: usize,
}

impl Tmdb {
    pub fn new(
        movies: Arc<dyn MovieCatalog>,
        search: Arc<dyn MovieSearch>,
        genres: Arc<dyn GenreCatalog>,
        images: ImageUrlBuilder,
        max_batch_ids: usize,
    ) -> Self {
        Self {
            movies,
            search,
            genres,
            images,
            max_batch_ids,
        }
    }

    pub fn from_services(services: &Services, max_batch_ids: usize) -> Self {
        Self::new(
            services.movies.clone(),
            services.search.clone(),
            Arc::new(services.genres.clone()),
            services.images.clone(),
            max_batch_ids,
        )
    }

    /// Build the facade with default in-memory cache and a fresh limiter.
    pub fn from_config(config: &Config) -> Result<Self> {
        let services = Services::from_config(config)?;
        Ok(Self::from_services(&services, config.search.max_batch_ids))
    }

    pub fn images(&self) -> &ImageUrlBuilder {
        &self.images
    }

    fn require_query(query: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(TmdbError::validation("Search query must not be empty"));
        }
        Ok(())
    }

    pub async fn listing(&self, kind: ListingKind, page: u32) -> Result<SearchResult> {
        self.movies.listing(kind, page).await
    }

    pub async fn popular(&self, page: u32) -> Result<SearchResult> {
        self.listing(ListingKind::Popular, page).await
    }

    pub async fn now_playing(&self, page: u32) -> Result<SearchResult> {
        self.listing(ListingKind::NowPlaying, page).await
    }

    pub async fn top_rated(&self, page: u32) -> Result<SearchResult> {
        self.listing(ListingKind::TopRated, page).await
    }

    pub async fn upcoming(&self, page: u32) -> Result<SearchResult> {
        self.listing(ListingKind::Upcoming, page).await
    }

    pub async fn trending(&self, window: TimeWindow, page: u32) -> Result<SearchResult> {
        self.listing(ListingKind::Trending(window), page).await
    }

    pub async fn movie_details(&self, movie_id: i64, append_to: &[&str]) -> Result<MovieRecord> {
        self.movies.details(movie_id, append_to).await
    }

    pub async fn movies_by_ids(&self, movie_ids: &[i64], append_to: &[&str]) -> Result<Vec<MovieRecord>> {
        if movie_ids.len() > self.max_batch_ids {
            return Err(TmdbError::validation(format!(
                "At most {} movie ids may be requested at once, got {}",
                self.max_batch_ids,
                movie_ids.len()
            )));
        }
        Ok(self.movies.by_ids(movie_ids, append_to).await)
    }

    pub async fn discover(&self, filters: &Filters, page: u32) -> Result<SearchResult> {
        self.movies.discover(filters, page).await
    }

    pub async fn by_genre(&self, genre_id: i64, page: u32, extra: &Filters) -> Result<SearchResult> {
        self.movies.by_genre(genre_id, page, extra).await
    }

    pub async fn search_movies(&self, query: &str, page: u32, filters: &Filters) -> Result<SearchResult> {
        Self::require_query(query)?;
        self.search.search_movies(query, page, filters).await
    }

    pub async fn search_multi(&self, query: &str, page: u32, filters: &Filters) -> Result<SearchResult> {
        Self::require_query(query)?;
        self.search.search_multi(query, page, filters).await
    }

    pub async fn search_people(&self, query: &str, page: u32, filters: &Filters) -> Result<SearchResult> {
        Self::require_query(query)?;
        self.search.search_people(query, page, filters).await
    }

    pub async fn advanced_search(&self, criteria: &Filters) -> Result<SearchResult> {
        self.search.advanced_search(criteria).await
    }

    pub async fn genres(&self) -> Result<Vec<GenreRecord>> {
        self.genres.all_genres().await
    }

    pub async fn genre_by_id(&self, id: i64) -> Result<Option<GenreRecord>> {
        self.genres.genre_by_id(id).await
    }

    pub async fn map_genre_ids(&self, ids: &[i64]) -> Result<Vec<String>> {
        self.genres.map_ids_to_names(ids).await
    }

    pub async fn search_genres(&self, term: &str) -> Result<Vec<GenreRecord>> {
        self.genres.search_by_name(term).await
    }
}

impl std::fmt::Debug for Tmdb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tmdb")
            .field("images", &self.images)
            .field("max_batch_ids", &self.max_batch_ids)
            .finish_non_exhaustive()
    }
}
