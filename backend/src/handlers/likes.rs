use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
};
use uuid::Uuid;

use super::{ApiError, AppState, api_error, current_session};
use crate::engine::ActionResult;
use crate::models::MatchRecord;
use crate::store::SwipeStore;

pub async fn like<S: SwipeStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(target_id): Path<Uuid>,
) -> Result<Json<ActionResult>, ApiError> {
    let session = current_session(&state, &headers).await?;

    let matched = state
        .engine
        .like_profile(session.as_ref(), target_id)
        .await
        .map_err(api_error)?;

    Ok(Json(ActionResult::with_match(matched.is_some())))
}

pub async fn unlike<S: SwipeStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(target_id): Path<Uuid>,
) -> Result<Json<ActionResult>, ApiError> {
    let session = current_session(&state, &headers).await?;

    state
        .engine
        .unlike_profile(session.as_ref(), target_id)
        .await
        .map_err(api_error)?;

    Ok(Json(ActionResult::ok()))
}

pub async fn matches<S: SwipeStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Result<Json<Vec<MatchRecord>>, ApiError> {
    let session = current_session(&state, &headers).await?;

    let matches = state
        .engine
        .matches(session.as_ref())
        .await
        .map_err(api_error)?;

    Ok(Json(matches))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use uuid::Uuid;

    use crate::models::Session;

    #[tokio::test]
    async fn test_like_twice_conflicts() {
        let (app, _, _) = app();
        let uri = format!("/api/likes/{}", Uuid::new_v4());

        let first = call(&app, "POST", &uri, Some(TOKEN), None).await;
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(json_body(first).await, json!({"success": true, "match": false}));

        let second = call(&app, "POST", &uri, Some(TOKEN), None).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(
            json_body(second).await,
            json!({"success": false, "error": "Already liked this profile"})
        );
    }

    #[tokio::test]
    async fn test_reciprocal_like_reports_match() {
        let (app, state, user_id) = app();
        let other = Session::new(Uuid::new_v4());
        state.engine.like_profile(Some(&other), user_id).await.unwrap();

        let uri = format!("/api/likes/{}", other.user_id);
        let response = call(&app, "POST", &uri, Some(TOKEN), None).await;
        assert_eq!(json_body(response).await, json!({"success": true, "match": true}));

        let matches = json_body(call(&app, "GET", "/api/matches", Some(TOKEN), None).await).await;
        assert_eq!(matches.as_array().map(Vec::len), Some(1));

        // unliking leaves the match in place
        let unliked = call(&app, "DELETE", &uri, Some(TOKEN), None).await;
        assert_eq!(unliked.status(), StatusCode::OK);
        assert_eq!(state.engine.store().matches().len(), 1);
    }
}
