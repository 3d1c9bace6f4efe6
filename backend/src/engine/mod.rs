//! The swipe interaction engine.
//!
//! - [`gesture`] turns pointer movement into a classified swipe.
//! - [`recorder`] persists swipe decisions.
//! - [`likes`] runs the like/match protocol.
//! - [`rewind`] finds and reverts the latest swipe.
//! - [`compatibility`] caches backend compatibility scores.
//!
//! Every operation takes the caller's [`Session`] explicitly; `None` means the
//! request is unauthenticated and fails with [`EngineError::Unauthenticated`].

pub mod compatibility;
pub mod gesture;
pub mod likes;
pub mod recorder;
pub mod rewind;

pub use compatibility::{CachePolicy, CompatibilityCache};
pub use gesture::{GestureOutcome, GestureState, GestureTracker, Point};
pub use recorder::{ActionResult, SwipeDecision};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::constants::DEFAULT_COMPATIBILITY_CACHE_TTL_SECS;
use crate::error::{EngineError, EngineResult};
use crate::models::Session;
use crate::store::SwipeStore;
use crate::utils::clock::{Clock, SystemClock, local_midnight};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub cache_policy: CachePolicy,
    /// Zone whose midnight starts "today" for daily counts.
    pub timezone: Tz,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            cache_policy: CachePolicy::Ttl(Duration::from_secs(DEFAULT_COMPATIBILITY_CACHE_TTL_SECS)),
            timezone: chrono_tz::UTC,
        }
    }
}

pub struct SwipeEngine<S> {
    store: S,
    compatibility: CompatibilityCache,
    clock: Arc<dyn Clock>,
    timezone: Tz,
}

impl<S: SwipeStore> SwipeEngine<S> {
    pub fn new(store: S, settings: EngineSettings) -> Self {
        Self {
            store,
            compatibility: CompatibilityCache::new(settings.cache_policy),
            clock: Arc::new(SystemClock),
            timezone: settings.timezone,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn compatibility_cache(&self) -> &CompatibilityCache {
        &self.compatibility
    }

    /// Resolves a bearer token into a session. Unknown or missing tokens give `None`.
    pub async fn authenticate(&self, token: Option<&str>) -> EngineResult<Option<Session>> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        let user_id = self.store.resolve_session(token).await?;
        Ok(user_id.map(Session::new))
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn start_of_today(&self) -> DateTime<Utc> {
        local_midnight(self.now(), self.timezone)
    }
}

pub(crate) fn require_user(session: Option<&Session>) -> EngineResult<Uuid> {
    session
        .map(|s| s.user_id)
        .ok_or(EngineError::Unauthenticated)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::store::MemoryStore;
    use crate::utils::ManualClock;
    use chrono::TimeZone;

    pub(crate) struct Harness {
        pub engine: SwipeEngine<MemoryStore>,
        pub clock: Arc<ManualClock>,
        pub user: Session,
    }

    impl Harness {
        pub(crate) fn new(settings: EngineSettings) -> Self {
            let start = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
            let clock = Arc::new(ManualClock::new(start));
            let engine = SwipeEngine::new(MemoryStore::new(), settings).with_clock(clock.clone());
            Self {
                engine,
                clock,
                user: Session::new(Uuid::new_v4()),
            }
        }

        pub(crate) fn store(&self) -> &MemoryStore {
            self.engine.store()
        }
    }

    impl Default for Harness {
        fn default() -> Self {
            Self::new(EngineSettings::default())
        }
    }
}
