use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::engine::{ActionResult, GestureOutcome, GestureState, GestureTracker, Point};
use crate::models::SwipeAction;
use crate::store::SwipeStore;

/// A recorded drag: the first point is the press, the last is the release.
#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub points: Vec<Point>,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    /// `None` when the drag was cancelled.
    pub action: Option<SwipeAction>,
    pub threshold: f64,
    /// Card state just before release.
    pub release_state: GestureState,
}

/// Replays a drag through the gesture tracker using the server's threshold.
pub async fn classify<S: SwipeStore>(
    State(state): State<AppState<S>>,
    Json(req): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let Some((first, rest)) = req.points.split_first() else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ActionResult {
                success: false,
                error: Some("A drag needs at least one point".to_string()),
                matched: None,
            }),
        ));
    };

    let mut tracker = GestureTracker::new(state.swipe_threshold_px);
    tracker.start(*first);
    let mut release_state = tracker.state();
    for point in rest {
        release_state = tracker.move_to(*point);
    }

    let action = match tracker.end() {
        GestureOutcome::Swiped(action) => Some(action),
        GestureOutcome::Cancelled => None,
    };

    Ok(Json(ClassifyResponse {
        action,
        threshold: state.swipe_threshold_px,
        release_state,
    }))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_classify_superlike_drag() {
        let (app, _, _) = app();
        let body = json!({"points": [{"x": 0.0, "y": 0.0}, {"x": 5.0, "y": -60.0}, {"x": 10.0, "y": -120.0}]});

        let response = call(&app, "POST", "/api/gestures/classify", None, Some(body)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["action"], "superlike");
        assert_eq!(body["release_state"]["drag_offset"], json!({"x": 10.0, "y": -120.0}));
    }

    #[tokio::test]
    async fn test_classify_short_drag_is_cancelled() {
        let (app, _, _) = app();
        let body = json!({"points": [{"x": 0.0, "y": 0.0}, {"x": 40.0, "y": 0.0}]});
        let body = json_body(call(&app, "POST", "/api/gestures/classify", None, Some(body)).await).await;
        assert_eq!(body["action"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_classify_needs_points() {
        let (app, _, _) = app();
        let response = call(&app, "POST", "/api/gestures/classify", None, Some(json!({"points": []}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
