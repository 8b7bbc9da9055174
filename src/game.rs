//! Game driver
//!
//! Owns one session plus the collaborators it needs (catalog, poster store,
//! prefetcher) and keeps them in step: loading posters when a round starts,
//! prefetching movies for empty queue slots, and replacing the session on replay.

use std::sync::Arc;

use crate::catalog::{
    build_movie_queue, fetch_random_movie, poster_or_placeholder, CatalogFetcher, PosterImage,
    PosterStore,
};
use crate::prefetch::{PendingMovie, Prefetcher};
use crate::session::{Session, SessionError, SubmitOutcome};
use crate::types::{GameConfig, Phase};

/// Everything needed to start a game, kept around to retry after a failed start
#[derive(Clone)]
pub struct GameSetup {
    pub config: GameConfig,
    pub catalog: Arc<dyn CatalogFetcher>,
    pub posters: Arc<dyn PosterStore>,
    pub poster_size: String,
}

impl GameSetup {
    pub async fn start(&self) -> Result<Game, SessionError> {
        Game::start(
            self.config.clone(),
            self.catalog.clone(),
            self.posters.clone(),
            self.poster_size.clone(),
        )
        .await
    }
}

pub struct Game {
    config: GameConfig,
    catalog: Arc<dyn CatalogFetcher>,
    posters: Arc<dyn PosterStore>,
    poster_size: String,
    prefetcher: Prefetcher,
    session: Session,
    poster: PosterImage,
    pending: Option<PendingMovie>,
}

impl Game {
    /// Build the movie queue and start the first round
    pub async fn start(
        config: GameConfig,
        catalog: Arc<dyn CatalogFetcher>,
        posters: Arc<dyn PosterStore>,
        poster_size: String,
    ) -> Result<Self, SessionError> {
        let session = new_session(&config, catalog.as_ref()).await?;
        let prefetcher = Prefetcher::new(catalog.clone(), config.fetch_attempts);

        let mut game = Self {
            config,
            catalog,
            posters,
            poster_size,
            prefetcher,
            session,
            poster: PosterImage::placeholder(),
            pending: None,
        };
        game.load_round().await;
        Ok(game)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Poster for the current round (the presentation layer obscures it while playing)
    pub fn poster(&self) -> &PosterImage {
        &self.poster
    }

    pub fn has_pending_prefetch(&self) -> bool {
        self.pending.is_some()
    }

    pub fn submit_guess(&mut self, text: &str) -> Result<SubmitOutcome, SessionError> {
        self.session.submit_guess(text)
    }

    /// Move past the round-end screen, making sure the next movie is loaded first
    pub async fn advance(&mut self) -> Result<Phase, SessionError> {
        if self.session.phase() == Phase::RoundEnd {
            if let Some(slot) = self.session.next_missing_slot() {
                self.ensure_slot(slot).await?;
            }
        }

        let phase = self.session.advance()?;
        if phase == Phase::Playing {
            self.load_round().await;
        }
        Ok(phase)
    }

    /// Throw the current session away and start a fresh one
    pub async fn replay(&mut self) -> Result<(), SessionError> {
        let session = new_session(&self.config, self.catalog.as_ref()).await?;
        tracing::info!(
            "Replacing session {} with {}",
            self.session.id(),
            session.id()
        );
        self.session = session;
        self.pending = None;
        self.load_round().await;
        Ok(())
    }

    async fn load_round(&mut self) {
        self.poster = match self.session.current_movie() {
            Some(movie) => {
                poster_or_placeholder(self.posters.as_ref(), &movie.poster_path, &self.poster_size)
                    .await
            }
            None => PosterImage::placeholder(),
        };
        self.schedule_prefetch();
        self.session.start_round_timer();
    }

    fn schedule_prefetch(&mut self) {
        if self.pending.is_some() {
            return;
        }
        if let Some(slot) = self.session.next_missing_slot() {
            self.pending = Some(self.prefetcher.spawn(slot, None));
        }
    }

    /// Fill `slot` from the prefetch if it delivers in time, else fetch right now
    async fn ensure_slot(&mut self, slot: usize) -> Result<(), SessionError> {
        let prefetched = match self.pending.take() {
            Some(pending) if pending.slot() == slot => {
                pending.wait(self.config.prefetch_timeout).await
            }
            other => {
                self.pending = other;
                None
            }
        };

        let movie = match prefetched {
            Some(movie) => Some(movie),
            None => {
                tracing::warn!("No prefetched movie for slot {}, fetching now", slot);
                self.prefetcher.fetch_now(None).await
            }
        };

        match movie {
            Some(movie) => {
                self.session.fill_slot(slot, movie);
                Ok(())
            }
            None => Err(SessionError::DataUnavailable(format!(
                "Could not load a movie for round {}",
                slot + 1
            ))),
        }
    }
}

async fn new_session(
    config: &GameConfig,
    catalog: &dyn CatalogFetcher,
) -> Result<Session, SessionError> {
    let mut queue = build_movie_queue(catalog, config.max_rounds, config.fetch_attempts).await;

    if config.max_rounds > 0 && !queue.is_filled(0) {
        let movie = fetch_random_movie(catalog, None, config.fetch_attempts)
            .await
            .ok_or_else(|| {
                SessionError::DataUnavailable(
                    "Could not load a movie for the first round".to_string(),
                )
            })?;
        queue.fill(0, movie);
    }

    Session::new(config.clone(), queue)
}
