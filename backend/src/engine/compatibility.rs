//! Compatibility scores with a process-local cache in front of the backend.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

use super::{SwipeEngine, require_user};
use crate::constants::{MAX_COMPATIBILITY_SCORE, NEUTRAL_COMPATIBILITY_SCORE};
use crate::error::EngineResult;
use crate::models::{CompatibilityMode, CompatibilityScore, ScoreSource, Session};
use crate::store::SwipeStore;

/// How long a cached score stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Entries live until invalidated or the process exits.
    Unbounded,
    Ttl(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub viewer_id: Uuid,
    pub target_id: Uuid,
    pub mode: CompatibilityMode,
}

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    score: u8,
    computed_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct CompatibilityCache {
    policy: CachePolicy,
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl CompatibilityCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Cached score for `key`, unless it has expired by `now`.
    #[must_use]
    pub fn get(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<u8> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        self.is_fresh(entry, now).then_some(entry.score)
    }

    pub fn insert(&self, key: CacheKey, score: u8, now: DateTime<Utc>) {
        self.entries.write().insert(
            key,
            CacheEntry {
                score,
                computed_at: now,
            },
        );
    }

    /// Drop every mode cached for the pair.
    pub fn invalidate(&self, viewer_id: Uuid, target_id: Uuid) {
        self.entries
            .write()
            .retain(|key, _| !(key.viewer_id == viewer_id && key.target_id == target_id));
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Remove expired entries. Returns count removed.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| self.is_fresh(entry, now));
        before - entries.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_fresh(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        match self.policy {
            CachePolicy::Unbounded => true,
            CachePolicy::Ttl(ttl) => match chrono::Duration::from_std(ttl) {
                Ok(ttl) => now < entry.computed_at + ttl,
                // Larger than chrono can represent: never expires in practice
                Err(_) => true,
            },
        }
    }
}

/// Clamp a raw procedure result onto the 0-100 scale. Non-finite values are rejected.
pub fn normalize_score(raw: f64) -> Option<u8> {
    raw.is_finite()
        .then(|| raw.round().clamp(0.0, f64::from(MAX_COMPATIBILITY_SCORE)) as u8)
}

impl<S: SwipeStore> SwipeEngine<S> {
    /// Score between the caller and `target_id`, served from cache when possible.
    ///
    /// Backend failures yield the neutral score with [`ScoreSource::Fallback`];
    /// they are never cached, so the next call asks the backend again.
    pub async fn calculate_compatibility(
        &self,
        session: Option<&Session>,
        target_id: Uuid,
        mode: CompatibilityMode,
    ) -> EngineResult<CompatibilityScore> {
        let viewer_id = require_user(session)?;
        let key = CacheKey {
            viewer_id,
            target_id,
            mode,
        };

        if let Some(score) = self.compatibility.get(&key, self.now()) {
            return Ok(CompatibilityScore {
                score,
                source: ScoreSource::Cached,
            });
        }

        let computed = self
            .store
            .compatibility_score(viewer_id, target_id, mode)
            .await
            .and_then(|raw| {
                normalize_score(raw)
                    .ok_or_else(|| anyhow::anyhow!("calculate_compatibility returned {}", raw))
            });

        match computed {
            Ok(score) => {
                self.compatibility.insert(key, score, self.now());
                Ok(CompatibilityScore {
                    score,
                    source: ScoreSource::Computed,
                })
            }
            Err(e) => {
                tracing::warn!(
                    "Compatibility for {} -> {} ({}) unavailable, using neutral score: {}",
                    viewer_id,
                    target_id,
                    mode,
                    e
                );
                Ok(CompatibilityScore {
                    score: NEUTRAL_COMPATIBILITY_SCORE,
                    source: ScoreSource::Fallback,
                })
            }
        }
    }
}
