use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use moviematch::{
    api::{self, AppState, ServerConfig},
    assets::{AssetLookup, DirAssetLookup, NoAssets},
    catalog::CatalogConfig,
    game::GameSetup,
    types::GameConfig,
};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // A missing .env is fine
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moviematch=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting MovieMatch...");

    let game_config = GameConfig::from_env();
    let catalog_config = CatalogConfig::from_env();
    let server_config = ServerConfig::from_env();

    let catalog = match catalog_config.build_catalog() {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => {
            tracing::error!("Failed to initialize movie catalog: {}", e);
            std::process::exit(1);
        }
    };
    let posters = match catalog_config.build_poster_store() {
        Ok(posters) => Arc::new(posters),
        Err(e) => {
            tracing::error!("Failed to initialize poster store: {}", e);
            std::process::exit(1);
        }
    };

    let assets: Arc<dyn AssetLookup> = match &server_config.assets_dir {
        Some(dir) => {
            tracing::info!("Serving reward assets from {}", dir.display());
            Arc::new(DirAssetLookup::new(dir))
        }
        None => {
            tracing::warn!("ASSETS_DIR not set, reward images will not be available");
            Arc::new(NoAssets)
        }
    };

    let setup = GameSetup {
        config: game_config,
        catalog,
        posters,
        poster_size: catalog_config.poster_size.clone(),
    };
    let state = Arc::new(AppState::new(setup, assets));

    // A catalog outage at boot is not fatal; replay retries the start
    match state.start_game().await {
        Ok(()) => tracing::info!("First session ready"),
        Err(e) => tracing::warn!(
            "Failed to start the first session: {}. Serving 503 until a replay succeeds.",
            e
        ),
    }

    let app = api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    tracing::info!("Listening on http://{}", server_config.bind_addr);

    let listener = match tokio::net::TcpListener::bind(server_config.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", server_config.bind_addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
