use super::{Session, SessionError};
use crate::scoring;
use crate::types::*;
use std::time::{Duration, Instant};

/// What happened to a submitted guess
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The guess was scored and recorded
    Recorded(RoundResult),
    /// The round already has a guess (or the session is over); nothing changed
    Ignored,
}

impl Session {
    /// Submit a guess for the current round, timing it from the round start
    pub fn submit_guess(&mut self, text: &str) -> Result<SubmitOutcome, SessionError> {
        let reaction = self.round_started.elapsed();
        self.submit_guess_timed(text, reaction)
    }

    /// Submit a guess with an explicit reaction time
    pub fn submit_guess_timed(
        &mut self,
        text: &str,
        reaction: Duration,
    ) -> Result<SubmitOutcome, SessionError> {
        if self.phase != Phase::Playing {
            tracing::debug!(
                "Ignoring guess in {:?} phase for session {}",
                self.phase,
                self.id
            );
            return Ok(SubmitOutcome::Ignored);
        }

        let guess = text.trim();
        if guess.is_empty() {
            return Err(SessionError::Validation(
                "Please enter a guess before submitting".to_string(),
            ));
        }

        let movie = self.current_movie().cloned().ok_or_else(|| {
            SessionError::InvalidOperation(format!(
                "No movie loaded for round {}",
                self.current_round
            ))
        })?;

        let points_max = self.config.points_per_round;
        let score = scoring::score_guess(&movie.title, guess, points_max);
        let reaction_time_seconds = (reaction.as_secs_f64() * 100.0).round() / 100.0;

        let result = RoundResult {
            round_number: self.current_round,
            correct_title: movie.title,
            guess_text: guess.to_string(),
            points_awarded: score.points_awarded,
            points_max,
            reaction_time_seconds,
            difficulty: scoring::difficulty(movie.vote_count),
            era: movie.era,
            poster_path: movie.poster_path,
            tier: score.tier,
        };

        self.score += result.points_awarded;
        self.history.push(result.clone());
        self.phase = Phase::RoundEnd;

        tracing::info!(
            "Session {} round {}: {:?}, {}/{} points in {:.2}s",
            self.id,
            result.round_number,
            result.tier,
            result.points_awarded,
            points_max,
            reaction_time_seconds
        );

        Ok(SubmitOutcome::Recorded(result))
    }

    /// Leave the round-end screen: start the next round, or finish the session
    pub fn advance(&mut self) -> Result<Phase, SessionError> {
        match self.phase {
            Phase::Playing => {
                return Err(SessionError::InvalidOperation(
                    "Cannot advance before a guess is submitted".to_string(),
                ))
            }
            Phase::Finished => {
                return Err(SessionError::InvalidOperation(
                    "Session is already finished".to_string(),
                ))
            }
            Phase::RoundEnd => {}
        }

        if self.current_round >= self.config.max_rounds {
            self.phase = Phase::Finished;
            tracing::info!(
                "Session {} finished with score {}",
                self.id,
                self.score
            );
            return Ok(self.phase);
        }

        let next_index = self.current_round as usize;
        if !self.queue.is_filled(next_index) {
            return Err(SessionError::DataUnavailable(format!(
                "No movie loaded for round {}",
                self.current_round + 1
            )));
        }

        self.current_round += 1;
        self.phase = Phase::Playing;
        self.round_started = Instant::now();

        tracing::info!(
            "Session {} advanced to round {}/{}",
            self.id,
            self.current_round,
            self.config.max_rounds
        );
        Ok(self.phase)
    }

    /// Restart the reaction clock once the round is actually on screen
    pub(crate) fn start_round_timer(&mut self) {
        self.round_started = Instant::now();
    }

    /// Put a late-arriving movie into an empty queue slot.
    ///
    /// Only future rounds can be filled; returns false otherwise.
    pub fn fill_slot(&mut self, index: usize, movie: MovieRecord) -> bool {
        if self.phase == Phase::Finished || index < self.current_round as usize {
            return false;
        }
        self.queue.fill(index, movie)
    }
}
