//! HTTP API endpoints for playing a session.
//!
//! One game per server. Every handler takes the game lock for its whole
//! duration, so operations on the session are strictly sequenced. Until a
//! session could be started, every endpoint answers 503 and replay retries.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::assets::AssetLookup;
use crate::game::{Game, GameSetup};
use crate::protocol::{ErrorResponse, GameView, GuessRequest, SummaryView};
use crate::session::{SessionError, SubmitOutcome};
use crate::types::env_string;

/// Shared application state
pub struct AppState {
    /// None until a session could be started
    pub game: Mutex<Option<Game>>,
    pub setup: GameSetup,
    pub assets: Arc<dyn AssetLookup>,
}

impl AppState {
    pub fn new(setup: GameSetup, assets: Arc<dyn AssetLookup>) -> Self {
        Self {
            game: Mutex::new(None),
            setup,
            assets,
        }
    }

    /// Start a session unless one is already running
    pub async fn start_game(&self) -> Result<(), SessionError> {
        let mut game = self.game.lock().await;
        if game.is_none() {
            let started = self.setup.start().await?;
            tracing::info!("Session {} started", started.session().id());
            *game = Some(started);
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory holding reward images named after their asset id
    pub assets_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            assets_dir: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let bind_addr = match env_string("BIND_ADDR") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!(
                    "Invalid BIND_ADDR {:?} ({}), using {}",
                    raw,
                    e,
                    defaults.bind_addr
                );
                defaults.bind_addr
            }),
            None => defaults.bind_addr,
        };

        Self {
            bind_addr,
            assets_dir: env_string("ASSETS_DIR").map(PathBuf::from),
        }
    }
}

/// Error returned by the API handlers
#[derive(Debug)]
pub enum ApiError {
    Session(SessionError),
    NotFound(String),
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        Self::Session(e)
    }
}

fn no_session() -> ApiError {
    ApiError::Session(SessionError::DataUnavailable(
        "No session running, the movie catalog could not be reached. Try replay".to_string(),
    ))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, msg) = match self {
            ApiError::Session(SessionError::Validation(msg)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation", msg)
            }
            ApiError::Session(SessionError::DataUnavailable(msg)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "data_unavailable", msg)
            }
            ApiError::Session(SessionError::InvalidOperation(msg)) => {
                (StatusCode::CONFLICT, "invalid_operation", msg)
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
        };

        let body = ErrorResponse {
            code: code.to_string(),
            msg,
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/game", get(get_game))
        .route("/api/guess", post(submit_guess))
        .route("/api/advance", post(advance))
        .route("/api/replay", post(replay))
        .route("/api/summary", get(get_summary))
        .route("/api/reward", get(get_reward))
        .with_state(state)
}

/// Current screen.
///
/// GET /api/game
pub async fn get_game(State(state): State<Arc<AppState>>) -> Result<Json<GameView>, ApiError> {
    let guard = state.game.lock().await;
    let game = guard.as_ref().ok_or_else(no_session)?;
    Ok(Json(GameView::from(game)))
}

/// Submit a guess for the current round.
///
/// POST /api/guess
///
/// A guess outside the playing phase is ignored and the unchanged view returned.
pub async fn submit_guess(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GuessRequest>,
) -> Result<Json<GameView>, ApiError> {
    let mut guard = state.game.lock().await;
    let game = guard.as_mut().ok_or_else(no_session)?;

    match game.submit_guess(&req.text)? {
        SubmitOutcome::Recorded(result) => tracing::info!(
            "Round {}: {:?} for {:?}, {} points",
            result.round_number,
            result.guess_text,
            result.correct_title,
            result.points_awarded
        ),
        SubmitOutcome::Ignored => tracing::debug!("Guess ignored outside of play"),
    }

    Ok(Json(GameView::from(&*game)))
}

/// Leave the round-end screen.
///
/// POST /api/advance
pub async fn advance(State(state): State<Arc<AppState>>) -> Result<Json<GameView>, ApiError> {
    let mut guard = state.game.lock().await;
    let game = guard.as_mut().ok_or_else(no_session)?;
    let phase = game.advance().await?;
    tracing::info!("Advanced to {:?}", phase);
    Ok(Json(GameView::from(&*game)))
}

/// Start a new session.
///
/// POST /api/replay
///
/// Also the way to recover when no session could be started before.
pub async fn replay(State(state): State<Arc<AppState>>) -> Result<Json<GameView>, ApiError> {
    let mut guard = state.game.lock().await;
    if let Some(game) = guard.as_mut() {
        game.replay().await?;
    } else {
        let started = state.setup.start().await?;
        tracing::info!("Session {} started on replay", started.session().id());
        *guard = Some(started);
    }

    let game = guard.as_ref().ok_or_else(no_session)?;
    Ok(Json(GameView::from(game)))
}

/// End-of-session report.
///
/// GET /api/summary
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SummaryView>, ApiError> {
    let guard = state.game.lock().await;
    let game = guard.as_ref().ok_or_else(no_session)?;
    let summary = game.session().summary()?;
    Ok(Json(SummaryView::new(game, summary)))
}

/// Reward image for the finished session.
///
/// GET /api/reward
pub async fn get_reward(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let asset_id = {
        let guard = state.game.lock().await;
        let game = guard.as_ref().ok_or_else(no_session)?;
        game.session().summary()?.verdict.asset_id().to_string()
    };

    let asset = state
        .assets
        .lookup(&asset_id)
        .ok_or_else(|| ApiError::NotFound(format!("No reward asset for {}", asset_id)))?;

    match tokio::fs::read(&asset.path).await {
        Ok(bytes) => Ok(([(header::CONTENT_TYPE, asset.content_type)], bytes).into_response()),
        Err(e) => {
            tracing::error!("Failed to read asset {}: {}", asset.path.display(), e);
            Err(ApiError::NotFound(format!(
                "Reward asset {} is unreadable",
                asset_id
            )))
        }
    }
}
