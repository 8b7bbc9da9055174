use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Opaque ID types for type safety
pub type SessionId = String;
pub type EraId = String;
pub type AssetId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Playing,
    RoundEnd,
    Finished,
}

/// Qualitative bucket for a scored guess
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Exact,
    Close,
    Wrong,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub max_rounds: u32,
    pub points_per_round: u32,
    /// How many random (genre, year) queries to try before giving up on a movie
    pub fetch_attempts: u32,
    pub prefetch_timeout: Duration,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_rounds: 8,
            points_per_round: 10,
            fetch_attempts: 5,
            prefetch_timeout: Duration::from_secs(8),
        }
    }
}

impl GameConfig {
    /// Load game settings from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_rounds = env_parse("MAX_ROUNDS")
            .filter(|n: &u32| *n > 0)
            .unwrap_or(defaults.max_rounds);
        let points_per_round = env_parse("POINTS_PER_ROUND").unwrap_or(defaults.points_per_round);
        let fetch_attempts = env_parse("FETCH_ATTEMPTS")
            .filter(|n: &u32| *n > 0)
            .unwrap_or(defaults.fetch_attempts);
        let prefetch_timeout = env_parse("PREFETCH_TIMEOUT")
            .map(Duration::from_secs)
            .unwrap_or(defaults.prefetch_timeout);

        Self {
            max_rounds,
            points_per_round,
            fetch_attempts,
            prefetch_timeout,
        }
    }
}

/// Read an env var, treating blank values as unset
pub(crate) fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

pub(crate) fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|s| s.parse().ok())
}

/// Metadata for the movie behind one round. Immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRecord {
    pub title: String,
    pub overview: String,
    pub genre_name: String,
    pub era: EraId,
    pub poster_path: String,
    pub vote_count: u64,
}

impl MovieRecord {
    /// Overview plus genre, shown to the player while guessing
    pub fn main_hint(&self) -> String {
        let overview = if self.overview.trim().is_empty() {
            "No description available"
        } else {
            self.overview.as_str()
        };
        format!("Overview: {} | Genre: {}", overview, self.genre_name)
    }
}

/// Outcome of one finished round, appended to the session history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundResult {
    pub round_number: u32,
    pub correct_title: String,
    pub guess_text: String,
    pub points_awarded: u32,
    pub points_max: u32,
    pub reaction_time_seconds: f64,
    pub difficulty: f64,
    pub era: EraId,
    pub poster_path: String,
    pub tier: Tier,
}

/// A named release-year bucket. `end_year` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Era {
    pub id: &'static str,
    pub start_year: i32,
    pub end_year: i32,
    /// Closing line when this era turns out to be the player's best
    pub tagline: &'static str,
}

pub const ERAS: &[Era] = &[
    Era {
        id: "1990s",
        start_year: 1990,
        end_year: 2000,
        tagline: "Your best era: the 1990s! Are you a dinosaur?",
    },
    Era {
        id: "2000s",
        start_year: 2000,
        end_year: 2010,
        tagline: "Your best era: the 2000s! See you on MSN.",
    },
    Era {
        id: "2010s",
        start_year: 2010,
        end_year: 2020,
        tagline: "Your best era: the 2010s! Did you watch all of these during lockdown?",
    },
    Era {
        id: "2020s",
        start_year: 2020,
        end_year: 2025,
        tagline: "Your best era: the 2020s! Movies are too long for you, stick to short videos.",
    },
];

pub fn find_era(id: &str) -> Option<&'static Era> {
    ERAS.iter().find(|era| era.id == id)
}

/// Catalog genre with its TMDB genre id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Genre {
    pub name: &'static str,
    pub tmdb_id: u32,
}

pub const GENRES: &[Genre] = &[
    Genre { name: "Action", tmdb_id: 28 },
    Genre { name: "Adventure", tmdb_id: 12 },
    Genre { name: "Animation", tmdb_id: 16 },
    Genre { name: "Comedy", tmdb_id: 35 },
    Genre { name: "Crime", tmdb_id: 80 },
    Genre { name: "Documentary", tmdb_id: 99 },
    Genre { name: "Drama", tmdb_id: 18 },
    Genre { name: "Family", tmdb_id: 10751 },
    Genre { name: "Fantasy", tmdb_id: 14 },
    Genre { name: "History", tmdb_id: 36 },
    Genre { name: "Horror", tmdb_id: 27 },
    Genre { name: "Music", tmdb_id: 10402 },
    Genre { name: "Mystery", tmdb_id: 9648 },
    Genre { name: "Romance", tmdb_id: 10749 },
    Genre { name: "Science Fiction", tmdb_id: 878 },
    Genre { name: "TV Movie", tmdb_id: 10770 },
    Genre { name: "Thriller", tmdb_id: 53 },
    Genre { name: "War", tmdb_id: 10752 },
    Genre { name: "Western", tmdb_id: 37 },
];
