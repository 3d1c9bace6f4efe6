use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::SwipeStore;
use crate::db::{compatibility, likes, sessions, swipes};
use crate::models::{
    CompatibilityMode, LikeOutcome, LikeRecord, MatchRecord, Plan, RewindOutcome, SwipeAction,
    SwipeRecord,
};

/// [`SwipeStore`] over the Postgres schema in `migrations/`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl SwipeStore for PgStore {
    async fn resolve_session(&self, token: &str) -> Result<Option<Uuid>> {
        sessions::get_session_user(&self.pool, token).await
    }

    async fn user_plan(&self, user_id: Uuid) -> Result<Plan> {
        sessions::get_user_plan(&self.pool, user_id).await
    }

    async fn insert_swipe(&self, swipe: &SwipeRecord) -> Result<()> {
        swipes::insert_swipe(&self.pool, swipe).await
    }

    async fn latest_unrewound_swipe(&self, user_id: Uuid) -> Result<Option<SwipeRecord>> {
        swipes::get_latest_unrewound_swipe(&self.pool, user_id).await
    }

    async fn mark_swipe_rewound(&self, user_id: Uuid, swipe_id: Uuid) -> Result<bool> {
        swipes::mark_swipe_rewound(&self.pool, user_id, swipe_id).await
    }

    async fn count_rewound_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<i64> {
        swipes::count_rewound_since(&self.pool, user_id, since).await
    }

    async fn rewind_latest_swipe(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
        limit: Option<i64>,
    ) -> Result<RewindOutcome> {
        swipes::rewind_latest_swipe(&self.pool, user_id, since, limit).await
    }

    async fn count_swipes_since(
        &self,
        user_id: Uuid,
        action: SwipeAction,
        since: DateTime<Utc>,
    ) -> Result<i64> {
        swipes::count_swipes_since(&self.pool, user_id, action, since).await
    }

    async fn find_like(&self, liker_id: Uuid, likee_id: Uuid) -> Result<Option<LikeRecord>> {
        likes::get_like(&self.pool, liker_id, likee_id).await
    }

    async fn like_and_match(
        &self,
        liker_id: Uuid,
        likee_id: Uuid,
        liked_at: DateTime<Utc>,
    ) -> Result<LikeOutcome> {
        likes::like_and_match(&self.pool, liker_id, likee_id, liked_at).await
    }

    async fn delete_like(&self, liker_id: Uuid, likee_id: Uuid) -> Result<bool> {
        likes::delete_like(&self.pool, liker_id, likee_id).await
    }

    async fn list_matches(&self, user_id: Uuid) -> Result<Vec<MatchRecord>> {
        likes::get_matches_for_user(&self.pool, user_id).await
    }

    async fn compatibility_score(
        &self,
        viewer_id: Uuid,
        target_id: Uuid,
        mode: CompatibilityMode,
    ) -> Result<f64> {
        compatibility::calculate_compatibility(&self.pool, viewer_id, target_id, mode).await
    }
}
