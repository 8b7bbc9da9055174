use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use moviematch::api::{self, AppState};
use moviematch::assets::{AssetLookup, DirAssetLookup, NoAssets};
use moviematch::catalog::{
    CatalogError, CatalogFetcher, CatalogMovie, CatalogResult, MovieQuery, PosterImage,
    PosterStore, StaticCatalog,
};
use moviematch::game::GameSetup;
use moviematch::types::{GameConfig, ERAS, GENRES};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

struct FakePosters;

#[async_trait]
impl PosterStore for FakePosters {
    async fn fetch(&self, path: &str, _size: &str) -> CatalogResult<PosterImage> {
        Ok(PosterImage {
            content_type: "image/jpeg".to_string(),
            bytes: path.as_bytes().to_vec(),
            is_placeholder: false,
        })
    }
}

/// A playable movie for every genre and year
fn catalog() -> StaticCatalog {
    let mut movies = Vec::new();
    for era in ERAS {
        for year in era.start_year..era.end_year {
            for genre in GENRES {
                movies.push(CatalogMovie {
                    title: Some(format!("{}: The {} Story", genre.name, year)),
                    overview: Some(format!("Something happens in {}.", year)),
                    poster_path: Some(format!("/{}-{}.jpg", genre.tmdb_id, year)),
                    vote_count: 4000,
                    genre_ids: vec![genre.tmdb_id],
                    release_date: Some(format!("{}-03-01", year)),
                });
            }
        }
    }
    StaticCatalog::new(movies)
}

/// Catalog that can be switched off to simulate an outage
struct FlakyCatalog {
    inner: StaticCatalog,
    online: AtomicBool,
}

#[async_trait]
impl CatalogFetcher for FlakyCatalog {
    async fn discover(&self, query: &MovieQuery) -> CatalogResult<Vec<CatalogMovie>> {
        if !self.online.load(Ordering::SeqCst) {
            return Err(CatalogError::ApiError("connection refused".to_string()));
        }
        self.inner.discover(query).await
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

fn game_setup(rounds: u32, catalog: Arc<dyn CatalogFetcher>) -> GameSetup {
    GameSetup {
        config: GameConfig {
            max_rounds: rounds,
            prefetch_timeout: Duration::from_secs(5),
            ..GameConfig::default()
        },
        catalog,
        posters: Arc::new(FakePosters),
        poster_size: "w200".to_string(),
    }
}

async fn setup(rounds: u32, assets: Arc<dyn AssetLookup>) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        game_setup(rounds, Arc::new(catalog())),
        assets,
    ));
    state.start_game().await.expect("Game should start");
    (api::router(state.clone()), state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn current_title(state: &AppState) -> String {
    let guard = state.game.lock().await;
    let game = guard.as_ref().expect("Session should be running");
    game.session()
        .current_movie()
        .expect("Current round should have a movie")
        .title
        .clone()
}

/// End-to-end test of a complete session through the HTTP API
#[tokio::test]
async fn test_full_session_flow() {
    let dir = tempfile::tempdir().unwrap();
    for era in ERAS {
        std::fs::write(dir.path().join(format!("{}.png", era.id)), era.id).unwrap();
    }
    let (app, state) = setup(4, Arc::new(DirAssetLookup::new(dir.path()))).await;

    // 1. Fresh session
    let (status, view) = send(&app, Method::GET, "/api/game", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["phase"], "PLAYING");
    assert_eq!(view["round"], 1);
    assert_eq!(view["max_rounds"], 4);
    assert_eq!(view["score"], 0);
    assert_eq!(view["points_available"], 10);
    assert_eq!(view["poster_revealed"], false);
    assert!(view["feedback"].is_null());
    assert!(view["main_hint"]
        .as_str()
        .unwrap()
        .starts_with("Overview: Something happens in"));
    assert!(view["poster_data_url"]
        .as_str()
        .unwrap()
        .starts_with("data:image/jpeg;base64,"));
    let session_id = view["session_id"].as_str().unwrap().to_string();

    // 2. Wrong-phase and invalid requests leave the session alone
    let (status, error) = send(&app, Method::POST, "/api/advance", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "invalid_operation");

    let (status, error) = send(&app, Method::POST, "/api/guess", Some(json!({"text": "   "}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["code"], "validation");

    let (status, _) = send(&app, Method::GET, "/api/summary", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, view) = send(&app, Method::GET, "/api/game", None).await;
    assert_eq!(view["phase"], "PLAYING");
    assert_eq!(view["round"], 1);

    // 3. Play every round with the exact title
    for round in 1..=4 {
        let title = current_title(&state).await;

        let (status, view) = send(&app, Method::POST, "/api/guess", Some(json!({"text": title}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["phase"], "ROUND_END");
        assert_eq!(view["score"], round * 10);
        assert_eq!(view["points_available"], 0);
        assert_eq!(view["poster_revealed"], true);
        assert_eq!(view["feedback"]["tier"], "exact");
        assert_eq!(view["feedback"]["correct_title"], title.as_str());
        assert_eq!(view["feedback"]["message"], format!("Correct! It was {}!", title));

        // A second guess on the round-end screen is ignored
        let (status, view) = send(&app, Method::POST, "/api/guess", Some(json!({"text": "again"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["score"], round * 10);
        assert_eq!(view["feedback"]["guess_text"], title.as_str());

        let (status, view) = send(&app, Method::POST, "/api/advance", None).await;
        assert_eq!(status, StatusCode::OK);
        if round < 4 {
            assert_eq!(view["phase"], "PLAYING");
            assert_eq!(view["round"], round + 1);
            assert!(view["feedback"].is_null());
        } else {
            assert_eq!(view["phase"], "FINISHED");
            assert_eq!(view["round"], 4);
        }
    }

    // 4. Summary
    let (status, summary) = send(&app, Method::GET, "/api/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["session_id"], session_id.as_str());
    assert_eq!(summary["total_score"], 40);
    assert_eq!(summary["total_possible"], 40);
    assert_eq!(summary["eras"].as_array().unwrap().len(), 4);
    assert_eq!(summary["history"].as_array().unwrap().len(), 4);
    assert_eq!(summary["verdict"]["kind"], "best_era");
    assert_eq!(summary["reward_asset_url"], "/api/reward");
    let best_era = summary["best_era"].as_str().unwrap().to_string();
    assert_eq!(summary["verdict"]["era"], best_era.as_str());
    assert_eq!(summary["reward_asset_id"], best_era.as_str());

    // 5. Reward image for the best era
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/reward")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], best_era.as_bytes());

    // 6. Advancing past the end is rejected
    let (status, _) = send(&app, Method::POST, "/api/advance", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    // 7. Replay starts over
    let (status, view) = send(&app, Method::POST, "/api/replay", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(view["session_id"], session_id.as_str());
    assert_eq!(view["phase"], "PLAYING");
    assert_eq!(view["round"], 1);
    assert_eq!(view["score"], 0);
}

#[tokio::test]
async fn test_struggling_session_without_assets() {
    let (app, _state) = setup(2, Arc::new(NoAssets)).await;

    for _ in 0..2 {
        let (status, view) = send(&app, Method::POST, "/api/guess", Some(json!({"text": "qqqqqqqqqqqqqqqqqqqqqqqqqqqqqq"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["feedback"]["tier"], "wrong");
        send(&app, Method::POST, "/api/advance", None).await;
    }

    let (status, summary) = send(&app, Method::GET, "/api/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["total_possible"], 20);
    assert_eq!(summary["verdict"]["kind"], "struggled");
    assert_eq!(summary["reward_asset_id"], "struggled");

    let (status, error) = send(&app, Method::GET, "/api/reward", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "not_found");
}

#[tokio::test]
async fn test_reward_requires_finished_session() {
    let (app, _state) = setup(2, Arc::new(NoAssets)).await;

    let (status, error) = send(&app, Method::GET, "/api/reward", None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "invalid_operation");
}

#[tokio::test]
async fn test_recovers_from_catalog_outage_at_startup() {
    let catalog = Arc::new(FlakyCatalog {
        inner: catalog(),
        online: AtomicBool::new(false),
    });
    let state = Arc::new(AppState::new(
        game_setup(2, catalog.clone()),
        Arc::new(NoAssets),
    ));
    assert!(state.start_game().await.is_err());
    let app = api::router(state.clone());

    // 1. No session yet: everything is unavailable, nothing crashes
    let (status, error) = send(&app, Method::GET, "/api/game", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error["code"], "data_unavailable");

    let (status, _) = send(&app, Method::POST, "/api/guess", Some(json!({"text": "Heat"}))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // 2. Replay while still offline keeps failing
    let (status, error) = send(&app, Method::POST, "/api/replay", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(error["code"], "data_unavailable");

    // 3. Catalog comes back: replay starts the session
    catalog.online.store(true, Ordering::SeqCst);
    let (status, view) = send(&app, Method::POST, "/api/replay", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["phase"], "PLAYING");
    assert_eq!(view["round"], 1);

    let (status, view) = send(&app, Method::GET, "/api/game", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["max_rounds"], 2);
}
