use axum::Router;
use axum::http::{HeaderValue, Method};
use swipeline::{
    Config, PgStore, SwipeEngine, get_db_pool,
    handlers::{self, AppState},
    utils,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();

    let config = Config::from_env()?;
    let db_config = swipeline::db::DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    // Run migrations
    swipeline::db::migrations::run_migrations(&pool).await?;

    let engine = SwipeEngine::new(PgStore::new(pool), config.engine_settings());
    tracing::info!(
        "Swipe engine ready (timezone {}, compatibility cache {:?})",
        config.timezone,
        engine.compatibility_cache().policy()
    );

    let port = config.port;
    let state = AppState::new(engine).with_swipe_threshold(config.swipe_threshold_px);
    let app = create_router(state, &config);

    let listener = tokio::net::TcpListener::bind(&format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Server running on port {}", port);

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: AppState<PgStore>, config: &Config) -> Router {
    handlers::router(state)
        .layer(create_cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

fn create_cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(false);

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        // Permissive when nothing (valid) is configured, for development
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}
