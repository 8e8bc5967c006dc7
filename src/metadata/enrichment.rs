//! Raw payload to [`MovieRecord`]: genres, image URLs, field defaults.

use crate::metadata::error::Result;
use crate::metadata::genres::{needs_catalogue, reconcile_genres, GenreResolver};
use crate::metadata::images::ImageUrlBuilder;
use crate::metadata::types::{GenreRecord, MovieRecord, RawMovie};

#[derive(Debug, Clone)]
pub struct MovieDataEnricher {
    genres: GenreResolver,
    images: ImageUrlBuilder,
}

impl MovieDataEnricher {
    pub fn new(genres: GenreResolver, images: ImageUrlBuilder) -> Self {
        Self { genres, images }
    }

    pub fn genres(&self) -> &GenreResolver {
        &self.genres
    }

    pub fn images(&self) -> &ImageUrlBuilder {
        &self.images
    }

    /// Enrich against an already-fetched catalogue.
    ///
    /// Order matters: genres first, then image URLs, then scalar defaults.
    pub fn enrich_with(&self, movie: RawMovie, catalogue: &[GenreRecord]) -> RawMovie {
        let mut movie = reconcile_genres(movie, catalogue);
        movie.poster_url = self.images.poster_url(movie.poster_path.as_deref(), None);
        movie.backdrop_url = self.images.backdrop_url(movie.backdrop_path.as_deref(), None);
        normalize_fields(movie)
    }

    /// Enrich one payload, keeping its raw shape.
    pub async fn enrich_raw(&self, movie: RawMovie) -> Result<RawMovie> {
        let catalogue = if needs_catalogue(&movie) {
            self.genres.all_genres().await?
        } else {
            Vec::new()
        };
        Ok(self.enrich_with(movie, &catalogue))
    }

    pub async fn enrich(&self, movie: RawMovie) -> Result<MovieRecord> {
        Ok(MovieRecord::from_raw(self.enrich_raw(movie).await?))
    }

    /// Enrich a page of payloads with at most one catalogue lookup.
    pub async fn enrich_all(&self, movies: Vec<RawMovie>) -> Result<Vec<MovieRecord>> {
        let catalogue = if movies.iter().any(needs_catalogue) {
            self.genres.all_genres().await?
        } else {
            Vec::new()
        };

        Ok(movies
            .into_iter()
            .map(|m| MovieRecord::from_raw(self.enrich_with(m, &catalogue)))
            .collect())
    }
}

fn normalize_fields(mut movie: RawMovie) -> RawMovie {
    movie.overview = Some(movie.overview.unwrap_or_default());
    movie.vote_average = Some(movie.vote_average.unwrap_or(0.0));
    movie.vote_count = Some(movie.vote_count.unwrap_or(0));
    movie.adult = Some(movie.adult.unwrap_or(false));
    movie.video = Some(movie.video.unwrap_or(false));
    movie.popularity = Some(movie.popularity.unwrap_or(0.0));
    movie
}
