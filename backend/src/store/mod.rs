//! Backend port for the swipe engine.
//!
//! The engine never talks to a database directly; everything it persists or
//! reads goes through [`SwipeStore`]. [`PgStore`] backs the server, and
//! [`MemoryStore`] runs the engine in-process for tests and simulation.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::future::Future;
use uuid::Uuid;

use crate::models::{
    CompatibilityMode, LikeOutcome, LikeRecord, MatchRecord, Plan, RewindOutcome, SwipeAction,
    SwipeRecord,
};

/// Record collections (`swipe_history`, `likes`, `matches`), the scoring
/// procedure and session lookup.
///
/// Implementations must be thread-safe. `like_and_match` must be atomic per
/// unordered pair: concurrent likes in both directions produce exactly one match.
/// `rewind_latest_swipe` must be atomic per user.
pub trait SwipeStore: Send + Sync {
    /// Resolve a bearer token to the user it was issued to.
    fn resolve_session(&self, token: &str) -> impl Future<Output = Result<Option<Uuid>>> + Send;

    fn user_plan(&self, user_id: Uuid) -> impl Future<Output = Result<Plan>> + Send;

    fn insert_swipe(&self, swipe: &SwipeRecord) -> impl Future<Output = Result<()>> + Send;

    /// Most recent swipe by `user_id` that has not been rewound.
    fn latest_unrewound_swipe(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Option<SwipeRecord>>> + Send;

    /// Flag a swipe as rewound. Only unrewound rows owned by `user_id` are
    /// touched; returns false when there was nothing to flag.
    fn mark_swipe_rewound(
        &self,
        user_id: Uuid,
        swipe_id: Uuid,
    ) -> impl Future<Output = Result<bool>> + Send;

    fn count_rewound_since(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<i64>> + Send;

    /// Atomically check the allowance (`limit` rewinds of swipes created since
    /// `since`), flag the latest unrewound swipe and, for a like or superlike
    /// with no other live like swipe on the same target, remove the like.
    ///
    /// Concurrent rewinds by one user are serialized.
    fn rewind_latest_swipe(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
        limit: Option<i64>,
    ) -> impl Future<Output = Result<RewindOutcome>> + Send;

    fn count_swipes_since(
        &self,
        user_id: Uuid,
        action: SwipeAction,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<i64>> + Send;

    fn find_like(
        &self,
        liker_id: Uuid,
        likee_id: Uuid,
    ) -> impl Future<Output = Result<Option<LikeRecord>>> + Send;

    /// Insert a directed like and create the match if the reverse like exists.
    fn like_and_match(
        &self,
        liker_id: Uuid,
        likee_id: Uuid,
        liked_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<LikeOutcome>> + Send;

    /// Remove a directed like. Existing matches are left alone.
    fn delete_like(&self, liker_id: Uuid, likee_id: Uuid) -> impl Future<Output = Result<bool>> + Send;

    fn list_matches(&self, user_id: Uuid) -> impl Future<Output = Result<Vec<MatchRecord>>> + Send;

    /// Raw output of the backend scoring procedure.
    fn compatibility_score(
        &self,
        viewer_id: Uuid,
        target_id: Uuid,
        mode: CompatibilityMode,
    ) -> impl Future<Output = Result<f64>> + Send;
}
