mod cache;
mod poster;
mod tmdb;

use async_trait::async_trait;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::retry;
use crate::session::MovieQueue;
use crate::types::{env_parse, env_string, Era, Genre, MovieRecord, ERAS, GENRES};

pub use cache::CachedCatalog;
pub use poster::{poster_or_placeholder, PosterImage, PosterStore};
pub use tmdb::{TmdbCatalog, TmdbPosterStore};

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur while talking to the movie catalog
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Response parsing failed: {0}")]
    ParseError(String),
}

/// One discovery query: popular movies of a genre released in a given year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MovieQuery {
    pub genre: Genre,
    pub year: i32,
}

/// A discovery result before it is assigned to a round
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogMovie {
    pub title: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    pub release_date: Option<String>,
}

impl CatalogMovie {
    /// Playable only with a title and a poster
    fn is_playable(&self) -> bool {
        let present = |s: &Option<String>| s.as_deref().is_some_and(|v| !v.trim().is_empty());
        present(&self.title) && present(&self.poster_path)
    }

    fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .and_then(|year| year.parse().ok())
    }

    fn into_record(self, genre: &Genre, era: &Era) -> Option<MovieRecord> {
        Some(MovieRecord {
            title: self.title?,
            overview: self.overview.unwrap_or_default(),
            genre_name: genre.name.to_string(),
            era: era.id.to_string(),
            poster_path: self.poster_path?,
            vote_count: self.vote_count,
        })
    }
}

/// Trait that all movie catalogs must implement
#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    /// Popular movies matching the query; may be empty
    async fn discover(&self, query: &MovieQuery) -> CatalogResult<Vec<CatalogMovie>>;

    /// Get the name of this catalog
    fn name(&self) -> &str;
}

/// Pick a random genre and a random year inside the era (or a random era)
pub fn random_query(era: Option<&'static Era>) -> (MovieQuery, &'static Era) {
    let mut rng = rand::rng();
    let era = match era {
        Some(era) => era,
        None => &ERAS[rng.random_range(0..ERAS.len())],
    };
    let genre = GENRES[rng.random_range(0..GENRES.len())];
    let year = rng.random_range(era.start_year..era.end_year);
    (MovieQuery { genre, year }, era)
}

fn pick_playable(results: Vec<CatalogMovie>) -> Option<CatalogMovie> {
    let playable: Vec<CatalogMovie> = results.into_iter().filter(|m| m.is_playable()).collect();
    playable.choose(&mut rand::rng()).cloned()
}

/// Fetch one random playable movie, resampling genre and year up to `attempts` times
pub async fn fetch_random_movie(
    fetcher: &dyn CatalogFetcher,
    era: Option<&'static Era>,
    attempts: u32,
) -> Option<MovieRecord> {
    let candidates = std::iter::repeat_with(move || random_query(era));

    let movie = retry::first_accepted(candidates, attempts as usize, |(query, era)| async move {
        match fetcher.discover(&query).await {
            Ok(results) => {
                let picked = pick_playable(results)?;
                picked.into_record(&query.genre, era)
            }
            Err(e) => {
                tracing::warn!(
                    "Catalog {} failed for {} {}: {}",
                    fetcher.name(),
                    query.genre.name,
                    query.year,
                    e
                );
                None
            }
        }
    })
    .await;

    if movie.is_none() {
        tracing::error!(
            "No movie found after {} attempts (era: {})",
            attempts,
            era.map(|e| e.id).unwrap_or("any")
        );
    }
    movie
}

/// Build the session's movie queue: eras spread evenly over the rounds, in random order.
///
/// Slots whose era yields nothing stay empty for the prefetcher to fill later.
pub async fn build_movie_queue(
    fetcher: &dyn CatalogFetcher,
    rounds: u32,
    attempts: u32,
) -> MovieQueue {
    let mut eras: Vec<&'static Era> = (0..rounds as usize)
        .map(|i| &ERAS[i % ERAS.len()])
        .collect();
    eras.shuffle(&mut rand::rng());

    let fetches = eras
        .into_iter()
        .map(|era| fetch_random_movie(fetcher, Some(era), attempts));
    let slots = futures::future::join_all(fetches).await;

    let queue = MovieQueue::from_slots(slots);
    let missing = queue.missing_slots();
    if !missing.is_empty() {
        tracing::warn!(
            "Movie queue built with {} empty slot(s): {:?}",
            missing.len(),
            missing
        );
    }
    queue
}

/// In-memory catalog, filtering a fixed movie list by genre and release year
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    movies: Vec<CatalogMovie>,
}

impl StaticCatalog {
    pub fn new(movies: Vec<CatalogMovie>) -> Self {
        Self { movies }
    }
}

#[async_trait]
impl CatalogFetcher for StaticCatalog {
    async fn discover(&self, query: &MovieQuery) -> CatalogResult<Vec<CatalogMovie>> {
        Ok(self
            .movies
            .iter()
            .filter(|m| m.genre_ids.contains(&query.genre.tmdb_id))
            .filter(|m| m.release_year() == Some(query.year))
            .cloned()
            .collect())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Configuration for the TMDB catalog and poster store
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// TMDB API key
    pub api_key: Option<String>,
    pub base_url: String,
    pub image_base_url: String,
    /// TMDB image size segment, e.g. "w200"
    pub poster_size: String,
    /// Skip obscure movies with fewer votes than this
    pub min_vote_count: u32,
    pub timeout: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p".to_string(),
            poster_size: "w200".to_string(),
            min_vote_count: 100,
            timeout: Duration::from_secs(8),
        }
    }
}

impl CatalogConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: env_string("TMDB_API_KEY"),
            base_url: env_string("TMDB_BASE_URL").unwrap_or(defaults.base_url),
            image_base_url: env_string("TMDB_IMAGE_BASE_URL").unwrap_or(defaults.image_base_url),
            poster_size: env_string("TMDB_POSTER_SIZE").unwrap_or(defaults.poster_size),
            min_vote_count: env_parse("TMDB_MIN_VOTE_COUNT").unwrap_or(defaults.min_vote_count),
            timeout: env_parse("TMDB_TIMEOUT")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }

    /// Build the cached TMDB catalog
    pub fn build_catalog(&self) -> CatalogResult<CachedCatalog<TmdbCatalog>> {
        let api_key = self.api_key.clone().ok_or_else(|| {
            CatalogError::ConfigError("No catalog configured. Set TMDB_API_KEY".to_string())
        })?;
        let catalog = TmdbCatalog::new(
            self.base_url.clone(),
            api_key,
            self.min_vote_count,
            self.timeout,
        )?;
        Ok(CachedCatalog::new(catalog))
    }

    pub fn build_poster_store(&self) -> CatalogResult<TmdbPosterStore> {
        TmdbPosterStore::new(self.image_base_url.clone(), self.timeout)
    }
}
