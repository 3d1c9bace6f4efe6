use uuid::Uuid;

use super::{SwipeEngine, require_user};
use crate::error::{EngineError, EngineResult};
use crate::models::{LikeOutcome, MatchRecord, Session};
use crate::store::SwipeStore;

impl<S: SwipeStore> SwipeEngine<S> {
    /// Like a profile and report the match it completes, if any.
    ///
    /// The duplicate check, the insert, the reciprocal lookup and the match
    /// insert run as one atomic store operation, so likes from both sides in
    /// either order end in exactly one match.
    pub async fn like_profile(
        &self,
        session: Option<&Session>,
        target_id: Uuid,
    ) -> EngineResult<Option<MatchRecord>> {
        let user_id = require_user(session)?;
        if user_id == target_id {
            return Err(EngineError::InvalidTarget);
        }

        match self.store.like_and_match(user_id, target_id, self.now()).await? {
            LikeOutcome::AlreadyLiked => Err(EngineError::AlreadyLiked),
            LikeOutcome::Liked { matched, .. } => {
                if let Some(record) = &matched {
                    tracing::info!("Match {} between {} and {}", record.id, record.user1_id, record.user2_id);
                }
                Ok(matched)
            }
        }
    }

    /// Remove the caller's like on `target_id`. A match that already exists stays.
    pub async fn unlike_profile(&self, session: Option<&Session>, target_id: Uuid) -> EngineResult<bool> {
        let user_id = require_user(session)?;
        Ok(self.store.delete_like(user_id, target_id).await?)
    }

    pub async fn has_liked(&self, session: Option<&Session>, target_id: Uuid) -> EngineResult<bool> {
        let user_id = require_user(session)?;
        Ok(self.store.find_like(user_id, target_id).await?.is_some())
    }

    /// The caller's matches, newest first.
    pub async fn matches(&self, session: Option<&Session>) -> EngineResult<Vec<MatchRecord>> {
        let user_id = require_user(session)?;
        Ok(self.store.list_matches(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::Harness;
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn like_twice_is_rejected_and_stored_once() {
        let harness = Harness::default();
        let target = Uuid::new_v4();

        let first = harness.engine.like_profile(Some(&harness.user), target).await.unwrap();
        assert!(first.is_none());

        let second = harness.engine.like_profile(Some(&harness.user), target).await;
        let err = second.unwrap_err();
        assert!(matches!(err, EngineError::AlreadyLiked));
        assert!(err.to_string().starts_with("Already liked"));

        let likes = harness.store().likes();
        assert_eq!(likes.len(), 1);
        assert_eq!(likes[0].liker_id, harness.user.user_id);
        assert_eq!(likes[0].likee_id, target);
    }

    #[tokio::test]
    async fn mutual_likes_match_once_in_either_order() {
        for reverse in [false, true] {
            let harness = Harness::default();
            let a = harness.user;
            let b = Session::new(Uuid::new_v4());
            let (first, second) = if reverse { (b, a) } else { (a, b) };

            assert!(harness.engine.like_profile(Some(&first), second.user_id).await.unwrap().is_none());
            let matched = harness
                .engine
                .like_profile(Some(&second), first.user_id)
                .await
                .unwrap()
                .expect("second like completes the match");

            let pair = [matched.user1_id, matched.user2_id];
            assert!(pair.contains(&a.user_id) && pair.contains(&b.user_id));
            assert_eq!(harness.store().matches().len(), 1);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_mutual_likes_produce_one_match() {
        for _ in 0..20 {
            let harness = Arc::new(Harness::default());
            harness.store().set_yielding(true);
            let a = harness.user;
            let b = Session::new(Uuid::new_v4());

            let left = {
                let harness = harness.clone();
                tokio::spawn(async move { harness.engine.like_profile(Some(&a), b.user_id).await.unwrap() })
            };
            let right = {
                let harness = harness.clone();
                tokio::spawn(async move { harness.engine.like_profile(Some(&b), a.user_id).await.unwrap() })
            };

            let results = [left.await.unwrap(), right.await.unwrap()];
            assert_eq!(results.iter().filter(|m| m.is_some()).count(), 1);
            assert_eq!(harness.store().matches().len(), 1);
            assert_eq!(harness.store().likes().len(), 2);
        }
    }

    #[tokio::test]
    async fn unlike_keeps_existing_match() {
        let harness = Harness::default();
        let other = Session::new(Uuid::new_v4());
        harness.engine.like_profile(Some(&harness.user), other.user_id).await.unwrap();
        harness.engine.like_profile(Some(&other), harness.user.user_id).await.unwrap();

        assert!(harness.engine.unlike_profile(Some(&harness.user), other.user_id).await.unwrap());
        assert!(!harness.engine.has_liked(Some(&harness.user), other.user_id).await.unwrap());
        assert_eq!(harness.store().matches().len(), 1);
        assert_eq!(harness.engine.matches(Some(&other)).await.unwrap().len(), 1);

        // nothing left to remove
        assert!(!harness.engine.unlike_profile(Some(&harness.user), other.user_id).await.unwrap());
    }

    #[tokio::test]
    async fn like_requires_session_and_other_profile() {
        let harness = Harness::default();
        assert!(matches!(
            harness.engine.like_profile(None, Uuid::new_v4()).await,
            Err(EngineError::Unauthenticated)
        ));
        assert!(matches!(
            harness.engine.like_profile(Some(&harness.user), harness.user.user_id).await,
            Err(EngineError::InvalidTarget)
        ));
        assert!(harness.store().likes().is_empty());
    }
}
