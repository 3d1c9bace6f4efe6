//! In-memory store implementation for tests and local simulation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use super::SwipeStore;
use crate::constants::NEUTRAL_COMPATIBILITY_SCORE;
use crate::models::{
    CompatibilityMode, LikeOutcome, LikeRecord, MatchRecord, Plan, RewindOutcome, SwipeAction,
    SwipeRecord, likes::canonical_pair,
};

#[derive(Debug, Default)]
struct Tables {
    swipes: Vec<SwipeRecord>,
    likes: Vec<LikeRecord>,
    matches: Vec<MatchRecord>,
    sessions: HashMap<String, Uuid>,
    plans: HashMap<Uuid, Plan>,
    scores: HashMap<(Uuid, Uuid, CompatibilityMode), f64>,
}

impl Tables {
    // max_by_key keeps the last of equal timestamps, i.e. the latest insert
    fn latest_unrewound(&self, user_id: Uuid) -> Option<&SwipeRecord> {
        self.swipes
            .iter()
            .filter(|s| s.user_id == user_id && !s.rewound)
            .max_by_key(|s| s.created_at)
    }

    fn count_rewound_since(&self, user_id: Uuid, since: DateTime<Utc>) -> i64 {
        self.swipes
            .iter()
            .filter(|s| s.user_id == user_id && s.rewound && s.created_at >= since)
            .count() as i64
    }

    fn mark_rewound(&mut self, user_id: Uuid, swipe_id: Uuid) -> bool {
        match self
            .swipes
            .iter_mut()
            .find(|s| s.id == swipe_id && s.user_id == user_id && !s.rewound)
        {
            Some(swipe) => {
                swipe.rewound = true;
                true
            }
            None => false,
        }
    }
}

/// All tables sit behind one lock, which is what makes `like_and_match` atomic here.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: AtomicBool,
    scoring_unavailable: AtomicBool,
    yielding: AtomicBool,
    scoring_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_session(&self, token: impl Into<String>, user_id: Uuid) {
        self.tables.lock().sessions.insert(token.into(), user_id);
    }

    pub fn set_plan(&self, user_id: Uuid, plan: Plan) {
        self.tables.lock().plans.insert(user_id, plan);
    }

    pub fn set_score(&self, viewer_id: Uuid, target_id: Uuid, mode: CompatibilityMode, score: f64) {
        self.tables
            .lock()
            .scores
            .insert((viewer_id, target_id, mode), score);
    }

    /// Make every record operation fail, as an unreachable backend would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Make only the scoring procedure fail.
    pub fn set_scoring_unavailable(&self, unavailable: bool) {
        self.scoring_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of times the scoring procedure was invoked.
    pub fn scoring_calls(&self) -> usize {
        self.scoring_calls.load(Ordering::SeqCst)
    }

    pub fn swipes(&self) -> Vec<SwipeRecord> {
        self.tables.lock().swipes.clone()
    }

    pub fn likes(&self) -> Vec<LikeRecord> {
        self.tables.lock().likes.clone()
    }

    pub fn matches(&self) -> Vec<MatchRecord> {
        self.tables.lock().matches.clone()
    }

    /// Yield to the scheduler before every operation, so concurrent callers
    /// interleave between store calls as they would over a network.
    pub fn set_yielding(&self, yielding: bool) {
        self.yielding.store(yielding, Ordering::SeqCst);
    }

    async fn ready(&self) -> Result<()> {
        if self.yielding.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("backend unavailable");
        }
        Ok(())
    }
}

impl SwipeStore for MemoryStore {
    async fn resolve_session(&self, token: &str) -> Result<Option<Uuid>> {
        Ok(self.tables.lock().sessions.get(token).copied())
    }

    async fn user_plan(&self, user_id: Uuid) -> Result<Plan> {
        self.ready().await?;
        Ok(self
            .tables
            .lock()
            .plans
            .get(&user_id)
            .copied()
            .unwrap_or_default())
    }

    async fn insert_swipe(&self, swipe: &SwipeRecord) -> Result<()> {
        self.ready().await?;
        self.tables.lock().swipes.push(swipe.clone());
        Ok(())
    }

    async fn latest_unrewound_swipe(&self, user_id: Uuid) -> Result<Option<SwipeRecord>> {
        self.ready().await?;
        Ok(self.tables.lock().latest_unrewound(user_id).cloned())
    }

    async fn mark_swipe_rewound(&self, user_id: Uuid, swipe_id: Uuid) -> Result<bool> {
        self.ready().await?;
        Ok(self.tables.lock().mark_rewound(user_id, swipe_id))
    }

    async fn count_rewound_since(&self, user_id: Uuid, since: DateTime<Utc>) -> Result<i64> {
        self.ready().await?;
        Ok(self.tables.lock().count_rewound_since(user_id, since))
    }

    async fn rewind_latest_swipe(
        &self,
        user_id: Uuid,
        since: DateTime<Utc>,
        limit: Option<i64>,
    ) -> Result<RewindOutcome> {
        self.ready().await?;
        let mut tables = self.tables.lock();

        if let Some(limit) = limit {
            let used = tables.count_rewound_since(user_id, since);
            if used >= limit {
                return Ok(RewindOutcome::LimitReached { used, limit });
            }
        }

        let Some(mut swipe) = tables.latest_unrewound(user_id).cloned() else {
            return Ok(RewindOutcome::NothingToRewind);
        };
        tables.mark_rewound(user_id, swipe.id);
        swipe.rewound = true;

        let target = swipe.target_profile_id;
        let still_liked = tables.swipes.iter().any(|s| {
            s.user_id == user_id && s.target_profile_id == target && !s.rewound && s.action.is_like()
        });
        if swipe.action.is_like() && !still_liked {
            tables
                .likes
                .retain(|l| !(l.liker_id == user_id && l.likee_id == target));
        }

        Ok(RewindOutcome::Rewound(swipe))
    }

    async fn count_swipes_since(
        &self,
        user_id: Uuid,
        action: SwipeAction,
        since: DateTime<Utc>,
    ) -> Result<i64> {
        self.ready().await?;
        let count = self
            .tables
            .lock()
            .swipes
            .iter()
            .filter(|s| s.user_id == user_id && s.action == action && s.created_at >= since)
            .count();
        Ok(count as i64)
    }

    async fn find_like(&self, liker_id: Uuid, likee_id: Uuid) -> Result<Option<LikeRecord>> {
        self.ready().await?;
        Ok(self
            .tables
            .lock()
            .likes
            .iter()
            .find(|l| l.liker_id == liker_id && l.likee_id == likee_id)
            .cloned())
    }

    async fn like_and_match(
        &self,
        liker_id: Uuid,
        likee_id: Uuid,
        liked_at: DateTime<Utc>,
    ) -> Result<LikeOutcome> {
        self.ready().await?;
        let mut tables = self.tables.lock();

        let exists = |tables: &Tables, from: Uuid, to: Uuid| {
            tables
                .likes
                .iter()
                .any(|l| l.liker_id == from && l.likee_id == to)
        };

        if exists(&*tables, liker_id, likee_id) {
            return Ok(LikeOutcome::AlreadyLiked);
        }

        let like = LikeRecord {
            id: Uuid::new_v4(),
            liker_id,
            likee_id,
            created_at: liked_at,
        };
        tables.likes.push(like.clone());

        if !exists(&*tables, likee_id, liker_id) {
            return Ok(LikeOutcome::Liked { like, matched: None });
        }

        let (user1_id, user2_id) = canonical_pair(liker_id, likee_id);
        let existing = tables
            .matches
            .iter()
            .find(|m| m.user1_id == user1_id && m.user2_id == user2_id)
            .cloned();
        let matched = match existing {
            Some(record) => record,
            None => {
                let record = MatchRecord {
                    id: Uuid::new_v4(),
                    user1_id,
                    user2_id,
                    matched_at: liked_at,
                };
                tables.matches.push(record.clone());
                record
            }
        };

        Ok(LikeOutcome::Liked {
            like,
            matched: Some(matched),
        })
    }

    async fn delete_like(&self, liker_id: Uuid, likee_id: Uuid) -> Result<bool> {
        self.ready().await?;
        let mut tables = self.tables.lock();
        let before = tables.likes.len();
        tables
            .likes
            .retain(|l| !(l.liker_id == liker_id && l.likee_id == likee_id));
        Ok(tables.likes.len() < before)
    }

    async fn list_matches(&self, user_id: Uuid) -> Result<Vec<MatchRecord>> {
        self.ready().await?;
        let mut matches: Vec<MatchRecord> = self
            .tables
            .lock()
            .matches
            .iter()
            .filter(|m| m.involves(user_id))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.matched_at.cmp(&a.matched_at));
        Ok(matches)
    }

    async fn compatibility_score(
        &self,
        viewer_id: Uuid,
        target_id: Uuid,
        mode: CompatibilityMode,
    ) -> Result<f64> {
        self.scoring_calls.fetch_add(1, Ordering::SeqCst);
        if self.scoring_unavailable.load(Ordering::SeqCst) {
            bail!("calculate_compatibility failed");
        }
        self.ready().await?;
        Ok(self
            .tables
            .lock()
            .scores
            .get(&(viewer_id, target_id, mode))
            .copied()
            .unwrap_or(f64::from(NEUTRAL_COMPATIBILITY_SCORE)))
    }
}
