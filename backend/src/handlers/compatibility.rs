use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiError, AppState, api_error, current_session};
use crate::models::{CompatibilityMode, CompatibilityScore};
use crate::store::SwipeStore;

#[derive(Debug, Default, Deserialize)]
pub struct CompatibilityQuery {
    #[serde(default)]
    pub mode: CompatibilityMode,
}

pub async fn compatibility<S: SwipeStore>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
    Path(target_id): Path<Uuid>,
    Query(params): Query<CompatibilityQuery>,
) -> Result<Json<CompatibilityScore>, ApiError> {
    let session = current_session(&state, &headers).await?;

    let score = state
        .engine
        .calculate_compatibility(session.as_ref(), target_id, params.mode)
        .await
        .map_err(api_error)?;

    Ok(Json(score))
}
