use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LikeRecord {
    pub id: Uuid,
    pub liker_id: Uuid,
    pub likee_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A mutual like. Stored with `user1_id < user2_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MatchRecord {
    pub id: Uuid,
    pub user1_id: Uuid,
    pub user2_id: Uuid,
    pub matched_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.user1_id == user_id || self.user2_id == user_id
    }
}

/// Orders a pair so both directions map to the same match row.
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a < b { (a, b) } else { (b, a) }
}

/// Result of the atomic like-then-check-reciprocal operation.
#[derive(Debug, Clone, PartialEq)]
pub enum LikeOutcome {
    AlreadyLiked,
    Liked {
        like: LikeRecord,
        matched: Option<MatchRecord>,
    },
}

impl LikeOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, LikeOutcome::Liked { matched: Some(_), .. })
    }
}
