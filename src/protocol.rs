use crate::game::Game;
use crate::scoring::{feedback_message, title_hint};
use crate::session::{EraStats, SessionSummary, Verdict};
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Path the end screen loads its reward image from
pub const REWARD_URL: &str = "/api/reward";

/// A guess submitted by the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuessRequest {
    pub text: String,
}

/// Everything the presentation layer needs to draw the current screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameView {
    pub session_id: SessionId,
    pub phase: Phase,
    pub round: u32,
    pub max_rounds: u32,
    pub score: u32,
    /// Points still up for grabs this round (0 once the guess is in)
    pub points_available: u32,
    pub main_hint: String,
    pub title_hint: String,
    pub poster_data_url: String,
    /// False while playing, when the poster should be shown obscured
    pub poster_revealed: bool,
    /// Result of the last guess, only on the round-end and finished screens
    pub feedback: Option<FeedbackView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackView {
    pub tier: Tier,
    pub message: String,
    pub correct_title: String,
    pub guess_text: String,
    pub points_awarded: u32,
    pub points_max: u32,
    pub reaction_time_seconds: f64,
}

impl From<&RoundResult> for FeedbackView {
    fn from(r: &RoundResult) -> Self {
        Self {
            tier: r.tier,
            message: feedback_message(r.tier, &r.correct_title),
            correct_title: r.correct_title.clone(),
            guess_text: r.guess_text.clone(),
            points_awarded: r.points_awarded,
            points_max: r.points_max,
            reaction_time_seconds: r.reaction_time_seconds,
        }
    }
}

impl From<&Game> for GameView {
    fn from(game: &Game) -> Self {
        let session = game.session();
        let phase = session.phase();
        let movie = session.current_movie();

        Self {
            session_id: session.id().to_string(),
            phase,
            round: session.current_round(),
            max_rounds: session.max_rounds(),
            score: session.score(),
            points_available: match phase {
                Phase::Playing => session.config().points_per_round,
                _ => 0,
            },
            main_hint: movie
                .map(|m| m.main_hint())
                .unwrap_or_else(|| "Loading...".to_string()),
            title_hint: movie.map(|m| title_hint(&m.title)).unwrap_or_default(),
            poster_data_url: game.poster().to_data_url(),
            poster_revealed: phase != Phase::Playing,
            feedback: session.last_result().map(FeedbackView::from),
        }
    }
}

/// End-of-session report
#[derive(Debug, Clone, Serialize)]
pub struct SummaryView {
    pub session_id: SessionId,
    pub started_at: String,
    pub total_score: u32,
    pub total_possible: u32,
    pub eras: Vec<EraStats>,
    pub best_era: Option<EraId>,
    pub verdict: Verdict,
    pub phrase: String,
    pub reward_asset_id: AssetId,
    pub reward_asset_url: String,
    /// One row per round, in play order
    pub history: Vec<RoundResult>,
}

impl SummaryView {
    pub fn new(game: &Game, summary: SessionSummary) -> Self {
        let session = game.session();
        Self {
            session_id: session.id().to_string(),
            started_at: session.started_at().to_string(),
            total_score: summary.total_score,
            total_possible: summary.total_possible,
            phrase: summary.verdict.phrase(),
            reward_asset_id: summary.verdict.asset_id().to_string(),
            reward_asset_url: REWARD_URL.to_string(),
            eras: summary.eras,
            best_era: summary.best_era,
            verdict: summary.verdict,
            history: session.history().to_vec(),
        }
    }
}

/// JSON body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub msg: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feedback_view_from_result() {
        let result = RoundResult {
            round_number: 2,
            correct_title: "Titanic".to_string(),
            guess_text: "Titanik".to_string(),
            points_awarded: 8,
            points_max: 10,
            reaction_time_seconds: 3.25,
            difficulty: 1.0,
            era: "1990s".to_string(),
            poster_path: "/titanic.jpg".to_string(),
            tier: Tier::Close,
        };

        let view = FeedbackView::from(&result);
        assert_eq!(view.message, "Almost! It was Titanic.");
        assert_eq!(view.points_awarded, 8);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["tier"], "close");
    }
}
