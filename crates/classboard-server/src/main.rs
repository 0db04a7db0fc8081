mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use classboard_api::session::{AppState, AppStateInner};
use classboard_api::summarizer::{GeminiClient, SummarizationService};
use classboard_api::{admin, messages, middleware::require_identity, session, summaries};

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "classboard=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = classboard_db::Database::open(&config.db_path)?;

    let summarizer = config.summarizer.as_ref().map(|c| {
        Arc::new(GeminiClient::new(c.api_key.clone(), c.model.clone()))
            as Arc<dyn SummarizationService>
    });
    if summarizer.is_none() {
        info!("No summarization credential configured; POST /api/summarize will report unavailable");
    }
    if config.admin_token.is_none() {
        info!("No admin token configured; POST /api/admin/clear is disabled");
    }

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        session_secret: config.session_secret.clone(),
        summarizer,
        admin_token: config.admin_token.clone(),
    });

    // Routes
    let public_routes = Router::new()
        .route("/api/session", post(session::join))
        .route("/api/messages", get(messages::list_messages))
        .route("/api/summaries/latest", get(summaries::latest))
        .route("/api/summaries/latest/download", get(summaries::download))
        .route("/api/admin/clear", post(admin::clear))
        .with_state(state.clone());

    let identity_routes = Router::new()
        .route("/api/messages", post(messages::create_message))
        .route("/api/messages/{id}", put(messages::update_message))
        .route("/api/messages/{id}", delete(messages::delete_message))
        .route("/api/summarize", post(summaries::summarize))
        .layer(middleware::from_fn_with_state(state.clone(), require_identity))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(identity_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Classboard listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
