mod queue;
mod round;
mod summary;

pub use queue::MovieQueue;
pub use round::SubmitOutcome;
pub use summary::{EraStats, SessionSummary, Verdict};

use crate::catalog::CatalogError;
use crate::types::*;
use std::time::Instant;

/// Errors surfaced by session transitions
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    /// Bad player input; re-prompt
    #[error("Invalid guess: {0}")]
    Validation(String),

    /// Catalog or poster data could not be fetched after retries
    #[error("Movie data unavailable: {0}")]
    DataUnavailable(String),

    /// Transition called in the wrong phase
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl From<CatalogError> for SessionError {
    fn from(err: CatalogError) -> Self {
        SessionError::DataUnavailable(err.to_string())
    }
}

/// One player's game: a fixed queue of movies played round by round.
///
/// Mutated only through `submit_guess`, `advance` and `fill_slot`.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    config: GameConfig,
    score: u32,
    current_round: u32,
    phase: Phase,
    history: Vec<RoundResult>,
    queue: MovieQueue,
    round_started: Instant,
    started_at: String,
}

impl Session {
    /// Start a session at round 1.
    ///
    /// The queue must hold one slot per round and the first slot must be filled.
    pub fn new(config: GameConfig, queue: MovieQueue) -> Result<Self, SessionError> {
        if queue.len() != config.max_rounds as usize {
            return Err(SessionError::InvalidOperation(format!(
                "Movie queue has {} slots but the game has {} rounds",
                queue.len(),
                config.max_rounds
            )));
        }
        if !queue.is_filled(0) {
            return Err(SessionError::DataUnavailable(
                "No movie available for the first round".to_string(),
            ));
        }

        let session = Self {
            id: ulid::Ulid::new().to_string(),
            config,
            score: 0,
            current_round: 1,
            phase: Phase::Playing,
            history: Vec::new(),
            queue,
            round_started: Instant::now(),
            started_at: chrono::Utc::now().to_rfc3339(),
        };

        tracing::info!(
            "Session {} started with {} rounds",
            session.id,
            session.config.max_rounds
        );
        Ok(session)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn max_rounds(&self) -> u32 {
        self.config.max_rounds
    }

    pub fn history(&self) -> &[RoundResult] {
        &self.history
    }

    pub fn queue(&self) -> &MovieQueue {
        &self.queue
    }

    /// ISO timestamp of session creation
    pub fn started_at(&self) -> &str {
        &self.started_at
    }

    /// Movie for the round currently on screen
    pub fn current_movie(&self) -> Option<&MovieRecord> {
        self.queue.get(self.current_round as usize - 1)
    }

    /// Result of the round just played, while its feedback is shown
    pub fn last_result(&self) -> Option<&RoundResult> {
        match self.phase {
            Phase::Playing => None,
            Phase::RoundEnd | Phase::Finished => self.history.last(),
        }
    }

    /// Queue index of the next round's slot if it still needs a movie
    pub fn next_missing_slot(&self) -> Option<usize> {
        if self.current_round >= self.config.max_rounds {
            return None;
        }
        let next = self.current_round as usize;
        (!self.queue.is_filled(next)).then_some(next)
    }
}
