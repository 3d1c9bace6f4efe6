use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiError, AppState, api_error, current_session};
use crate::error::EngineError;
use crate::models::{SwipeAction, SwipeRecord};
use crate::store::SwipeStore;

#[derive(Debug, Deserialize)]
pub struct SwipeRequest {
    pub target_profile_id: Uuid,
    pub action: SwipeAction,
}

#[derive(Debug, Serialize)]
pub struct SwipeResponse {
    pub success: bool,
    pub swipe: SwipeRecord,
    #[serde(rename = "match")]
    pub matched: bool,
    pub match_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct RewoundResponse {
    pub rewound: bool,
}

#[derive(Debug, Serialize)]
pub struct RewindCountResponse {
    pub count: i64,
}

pub async fn swipe<S: SwipeStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Json(req): Json<SwipeRequest>,
) -> Result<Json<SwipeResponse>, ApiError> {
    let session = current_session(&state, &headers).await?;

    let decision = state
        .engine
        .swipe(session.as_ref(), req.target_profile_id, req.action)
        .await
        .map_err(api_error)?;

    Ok(Json(SwipeResponse {
        success: true,
        matched: decision.matched.is_some(),
        match_id: decision.matched.map(|m| m.id),
        swipe: decision.swipe,
    }))
}

// The three rewind reads below keep the UI usable when the backend is down:
// failures are logged and answered with null / false / 0.

pub async fn last_swipe<S: SwipeStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<Json<Option<SwipeRecord>>, ApiError> {
    let session = current_session(&state, &headers).await?;

    match state.engine.get_last_swipe(session.as_ref()).await {
        Ok(swipe) => Ok(Json(swipe)),
        Err(EngineError::Backend(e)) => {
            tracing::warn!("Failed to load last swipe, reporting none: {:#}", e);
            Ok(Json(None))
        }
        Err(e) => Err(api_error(e)),
    }
}

pub async fn mark_rewound<S: SwipeStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(swipe_id): Path<Uuid>,
) -> Result<Json<RewoundResponse>, ApiError> {
    let session = current_session(&state, &headers).await?;

    match state.engine.mark_swipe_as_rewound(session.as_ref(), swipe_id).await {
        Ok(rewound) => Ok(Json(RewoundResponse { rewound })),
        Err(EngineError::Backend(e)) => {
            tracing::warn!("Failed to mark swipe {} as rewound: {:#}", swipe_id, e);
            Ok(Json(RewoundResponse { rewound: false }))
        }
        Err(e) => Err(api_error(e)),
    }
}

pub async fn today_rewind_count<S: SwipeStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<Json<RewindCountResponse>, ApiError> {
    let session = current_session(&state, &headers).await?;

    match state.engine.get_today_rewind_count(session.as_ref()).await {
        Ok(count) => Ok(Json(RewindCountResponse { count })),
        Err(EngineError::Backend(e)) => {
            tracing::warn!("Failed to count today's rewinds, reporting 0: {:#}", e);
            Ok(Json(RewindCountResponse { count: 0 }))
        }
        Err(e) => Err(api_error(e)),
    }
}

/// Rewinds the latest swipe, checked against the caller's plan allowance.
pub async fn rewind<S: SwipeStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<Json<SwipeRecord>, ApiError> {
    let session = current_session(&state, &headers).await?;
    let Some(session) = session else {
        return Err(api_error(EngineError::Unauthenticated));
    };

    let plan = state
        .engine
        .store()
        .user_plan(session.user_id)
        .await
        .map_err(|e| api_error(e.into()))?;

    let swipe = state
        .engine
        .rewind_last_swipe(Some(&session), plan)
        .await
        .map_err(api_error)?;

    Ok(Json(swipe))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use uuid::Uuid;

    use crate::models::Plan;

    #[tokio::test]
    async fn test_swipe_then_last_swipe() {
        let (app, _, _) = app();
        let target = Uuid::new_v4();

        let response = call(
            &app,
            "POST",
            "/api/swipes",
            Some(TOKEN),
            Some(json!({"target_profile_id": target, "action": "superlike"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["match"], false);
        assert_eq!(body["swipe"]["action"], "superlike");

        let last = json_body(call(&app, "GET", "/api/swipes/last", Some(TOKEN), None).await).await;
        assert_eq!(last["target_profile_id"], json!(target));
        assert_eq!(last["rewound"], false);
    }

    #[tokio::test]
    async fn test_swipe_without_token_is_rejected() {
        let (app, state, _) = app();
        let response = call(
            &app,
            "POST",
            "/api/swipes",
            None,
            Some(json!({"target_profile_id": Uuid::new_v4(), "action": "like"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(state.engine.store().swipes().is_empty());
    }

    #[tokio::test]
    async fn test_rewind_reads_fail_open() {
        let (app, state, _) = app();
        state.engine.store().set_unavailable(true);

        let last = call(&app, "GET", "/api/swipes/last", Some(TOKEN), None).await;
        assert_eq!(last.status(), StatusCode::OK);
        assert_eq!(json_body(last).await, json!(null));

        let count = call(&app, "GET", "/api/rewinds/today", Some(TOKEN), None).await;
        assert_eq!(json_body(count).await, json!({"count": 0}));

        let uri = format!("/api/swipes/{}/rewound", Uuid::new_v4());
        let marked = call(&app, "POST", &uri, Some(TOKEN), None).await;
        assert_eq!(json_body(marked).await, json!({"rewound": false}));
    }

    #[tokio::test]
    async fn test_rewind_uses_plan_limit() {
        let (app, state, user_id) = app();
        state.engine.store().set_plan(user_id, Plan::Free);
        for _ in 0..2 {
            call(
                &app,
                "POST",
                "/api/swipes",
                Some(TOKEN),
                Some(json!({"target_profile_id": Uuid::new_v4(), "action": "pass"})),
            )
            .await;
        }

        let first = call(&app, "POST", "/api/rewind", Some(TOKEN), None).await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(json_body(first).await["rewound"], true);

        let second = call(&app, "POST", "/api/rewind", Some(TOKEN), None).await;
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json_body(second).await["success"], false);

        let count = call(&app, "GET", "/api/rewinds/today", Some(TOKEN), None).await;
        assert_eq!(json_body(count).await, json!({"count": 1}));
    }
}
