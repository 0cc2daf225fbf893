use axum::{middleware, routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quizsync::{
    auth::{self, CohostAuth},
    catalog::{QuestionRepository, RoundCatalog},
    config::AppConfig,
    pulse,
    relay::AppState,
    state::GameStore,
    sync::Replica,
    ws,
};

fn load_catalog(config: &AppConfig) -> RoundCatalog {
    let Some(path) = &config.rounds_path else {
        return RoundCatalog::default();
    };
    match RoundCatalog::load(path) {
        Ok(catalog) => {
            tracing::info!("Loaded {} rounds from {}", catalog.len(), path.display());
            catalog
        }
        Err(e) => {
            tracing::warn!("{}. Using the built-in rounds.", e);
            RoundCatalog::default()
        }
    }
}

fn load_questions(config: &AppConfig) -> QuestionRepository {
    match QuestionRepository::load(&config.questions_path) {
        Ok(questions) => {
            tracing::info!(
                "Loaded content for {} rounds from {}",
                questions.round_count(),
                config.questions_path.display()
            );
            questions
        }
        Err(e) => {
            tracing::warn!("{}. Every round will be empty.", e);
            QuestionRepository::default()
        }
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env var reads)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist, only log if it's a different issue
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env file: {}", e);
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quizsync=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting quizsync...");

    let config = AppConfig::from_env();
    let auth_config = Arc::new(CohostAuth::new(config.cohost_token.clone()));

    let store = GameStore::new(
        Arc::new(load_catalog(&config)),
        Arc::new(load_questions(&config)),
        config.store.clone(),
    );
    let shadow = Replica::new(store);

    // The shadow counts down like a display so late joiners get a live timer
    pulse::spawn_timer_pulse(shadow.clone());

    let state = Arc::new(AppState::new(shadow));

    let ws_routes = Router::new()
        .route("/ws", get(ws::ws_handler))
        .layer(middleware::from_fn_with_state(
            auth_config,
            auth::cohost_ws_auth_middleware,
        ));

    let app = Router::new()
        .merge(ws_routes)
        .fallback_service(ServeDir::new(&config.static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on http://{}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}
