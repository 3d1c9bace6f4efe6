pub mod compatibility;
pub mod gestures;
pub mod likes;
pub mod swipes;

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::{get, post},
};
use std::sync::Arc;

use crate::constants::DEFAULT_SWIPE_THRESHOLD_PX;
use crate::engine::{ActionResult, SwipeEngine};
use crate::error::EngineError;
use crate::models::Session;
use crate::store::SwipeStore;

pub struct AppState<S> {
    pub engine: Arc<SwipeEngine<S>>,
    pub swipe_threshold_px: f64,
}

impl<S> AppState<S> {
    pub fn new(engine: SwipeEngine<S>) -> Self {
        Self {
            engine: Arc::new(engine),
            swipe_threshold_px: DEFAULT_SWIPE_THRESHOLD_PX,
        }
    }

    pub fn with_swipe_threshold(mut self, px: f64) -> Self {
        self.swipe_threshold_px = px;
        self
    }
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            swipe_threshold_px: self.swipe_threshold_px,
        }
    }
}

pub type ApiError = (StatusCode, Json<ActionResult>);

/// Maps an engine failure onto a status code with a `{success: false, error}` body.
pub fn api_error(error: EngineError) -> ApiError {
    let status = match &error {
        EngineError::Unauthenticated => StatusCode::UNAUTHORIZED,
        EngineError::AlreadyLiked => StatusCode::CONFLICT,
        EngineError::InvalidTarget => StatusCode::BAD_REQUEST,
        EngineError::NothingToRewind => StatusCode::NOT_FOUND,
        EngineError::RewindLimitReached { .. } => StatusCode::TOO_MANY_REQUESTS,
        EngineError::Backend(e) => {
            tracing::error!("Backend failure: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    (status, Json(ActionResult::failed(&error)))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Resolves the caller from the `Authorization: Bearer` header.
pub async fn current_session<S: SwipeStore>(
    state: &AppState<S>,
    headers: &HeaderMap,
) -> Result<Option<Session>, ApiError> {
    state
        .engine
        .authenticate(bearer_token(headers))
        .await
        .map_err(api_error)
}

pub fn router<S: SwipeStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/gestures/classify", post(gestures::classify::<S>))
        .route("/api/swipes", post(swipes::swipe::<S>))
        .route("/api/swipes/last", get(swipes::last_swipe::<S>))
        .route("/api/swipes/{id}/rewound", post(swipes::mark_rewound::<S>))
        .route("/api/rewind", post(swipes::rewind::<S>))
        .route("/api/rewinds/today", get(swipes::today_rewind_count::<S>))
        .route(
            "/api/likes/{target_id}",
            post(likes::like::<S>).delete(likes::unlike::<S>),
        )
        .route("/api/matches", get(likes::matches::<S>))
        .route(
            "/api/compatibility/{target_id}",
            get(compatibility::compatibility::<S>),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);
        headers.insert(AUTHORIZATION, "Bearer abc ".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc"));
        headers.insert(AUTHORIZATION, "Basic abc".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _, _) = app();
        let response = call(&app, "GET", "/health", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_token_is_unauthorized() {
        let (app, _, _) = app();
        let response = call(&app, "GET", "/api/matches", Some("stale"), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Not authenticated");
    }
}
