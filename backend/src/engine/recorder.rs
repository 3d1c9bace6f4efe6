use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{SwipeEngine, require_user};
use crate::error::{EngineError, EngineResult};
use crate::models::{MatchRecord, Session, SwipeAction, SwipeRecord};
use crate::store::SwipeStore;

/// Wire form of an action's result: `{success: true}` or `{success: false, error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, rename = "match", skip_serializing_if = "Option::is_none")]
    pub matched: Option<bool>,
}

impl ActionResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            matched: None,
        }
    }

    pub fn with_match(matched: bool) -> Self {
        Self {
            matched: Some(matched),
            ..Self::ok()
        }
    }

    pub fn failed(error: &EngineError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            matched: None,
        }
    }
}

/// A recorded swipe plus the match it produced, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeDecision {
    pub swipe: SwipeRecord,
    pub matched: Option<MatchRecord>,
}

impl<S: SwipeStore> SwipeEngine<S> {
    /// Persist one swipe decision. Nothing else happens on this path.
    pub async fn record_swipe(
        &self,
        session: Option<&Session>,
        target_profile_id: Uuid,
        action: SwipeAction,
    ) -> EngineResult<SwipeRecord> {
        let user_id = require_user(session)?;
        if user_id == target_profile_id {
            return Err(EngineError::InvalidTarget);
        }

        let swipe = SwipeRecord::new(user_id, target_profile_id, action, self.now());
        self.store.insert_swipe(&swipe).await?;

        tracing::debug!("Recorded {} from {} on {}", action, user_id, target_profile_id);
        Ok(swipe)
    }

    /// Record a swipe and, for likes and superlikes, run the like/match protocol.
    ///
    /// A like that already exists does not fail the swipe.
    pub async fn swipe(
        &self,
        session: Option<&Session>,
        target_profile_id: Uuid,
        action: SwipeAction,
    ) -> EngineResult<SwipeDecision> {
        let swipe = self.record_swipe(session, target_profile_id, action).await?;

        let matched = if action.is_like() {
            match self.like_profile(session, target_profile_id).await {
                Ok(outcome) => outcome,
                Err(EngineError::AlreadyLiked) => {
                    tracing::debug!("{} already liked {}", swipe.user_id, target_profile_id);
                    None
                }
                Err(e) => return Err(e),
            }
        } else {
            None
        };

        Ok(SwipeDecision { swipe, matched })
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::Harness;
    use super::*;

    #[tokio::test]
    async fn record_swipe_requires_session() {
        let harness = Harness::default();
        let result = harness.engine.record_swipe(None, Uuid::new_v4(), SwipeAction::Like).await;
        assert!(matches!(result, Err(EngineError::Unauthenticated)));
        assert!(harness.store().swipes().is_empty());
    }

    #[tokio::test]
    async fn record_swipe_persists_one_record() {
        let harness = Harness::default();
        let target = Uuid::new_v4();

        let swipe = harness
            .engine
            .record_swipe(Some(&harness.user), target, SwipeAction::Superlike)
            .await
            .unwrap();

        let stored = harness.store().swipes();
        assert_eq!(stored, vec![swipe.clone()]);
        assert_eq!(swipe.action, SwipeAction::Superlike);
        assert!(!swipe.rewound);
        // recording alone never creates likes
        assert!(harness.store().likes().is_empty());
    }

    #[tokio::test]
    async fn record_swipe_rejects_own_profile() {
        let harness = Harness::default();
        let result = harness
            .engine
            .record_swipe(Some(&harness.user), harness.user.user_id, SwipeAction::Pass)
            .await;
        assert!(matches!(result, Err(EngineError::InvalidTarget)));
    }

    #[tokio::test]
    async fn backend_failure_is_reported_not_swallowed() {
        let harness = Harness::default();
        harness.store().set_unavailable(true);

        let result = harness
            .engine
            .record_swipe(Some(&harness.user), Uuid::new_v4(), SwipeAction::Pass)
            .await;
        let err = result.unwrap_err();
        assert!(matches!(err, EngineError::Backend(_)));
        assert!(!ActionResult::failed(&err).success);
    }

    #[tokio::test]
    async fn swipe_like_creates_like_and_match() {
        let harness = Harness::default();
        let other = Session::new(Uuid::new_v4());

        let first = harness
            .engine
            .swipe(Some(&other), harness.user.user_id, SwipeAction::Like)
            .await
            .unwrap();
        assert!(first.matched.is_none());

        let second = harness
            .engine
            .swipe(Some(&harness.user), other.user_id, SwipeAction::Superlike)
            .await
            .unwrap();
        assert!(second.matched.is_some());
        assert_eq!(harness.store().likes().len(), 2);
        assert_eq!(harness.store().matches().len(), 1);
    }

    #[tokio::test]
    async fn swipe_pass_creates_no_like() {
        let harness = Harness::default();
        let decision = harness
            .engine
            .swipe(Some(&harness.user), Uuid::new_v4(), SwipeAction::Pass)
            .await
            .unwrap();
        assert!(decision.matched.is_none());
        assert!(harness.store().likes().is_empty());
        assert_eq!(harness.store().swipes().len(), 1);
    }

    #[tokio::test]
    async fn swiping_like_twice_keeps_one_like() {
        let harness = Harness::default();
        let target = Uuid::new_v4();
        for _ in 0..2 {
            harness
                .engine
                .swipe(Some(&harness.user), target, SwipeAction::Like)
                .await
                .unwrap();
        }
        assert_eq!(harness.store().swipes().len(), 2);
        assert_eq!(harness.store().likes().len(), 1);
    }

    #[test]
    fn action_result_wire_shape() {
        assert_eq!(serde_json::to_value(ActionResult::ok()).unwrap(), serde_json::json!({"success": true}));
        assert_eq!(
            serde_json::to_value(ActionResult::with_match(true)).unwrap(),
            serde_json::json!({"success": true, "match": true})
        );
        assert_eq!(
            serde_json::to_value(ActionResult::failed(&EngineError::AlreadyLiked)).unwrap(),
            serde_json::json!({"success": false, "error": "Already liked this profile"})
        );
    }
}
