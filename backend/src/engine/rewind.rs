use uuid::Uuid;

use super::{SwipeEngine, require_user};
use crate::error::{EngineError, EngineResult};
use crate::models::{Plan, RewindOutcome, Session, SwipeAction, SwipeRecord};
use crate::store::SwipeStore;

impl<S: SwipeStore> SwipeEngine<S> {
    /// The caller's most recent swipe that has not been rewound.
    pub async fn get_last_swipe(&self, session: Option<&Session>) -> EngineResult<Option<SwipeRecord>> {
        let user_id = require_user(session)?;
        Ok(self.store.latest_unrewound_swipe(user_id).await?)
    }

    /// Flag one of the caller's swipes as rewound. Other users' swipes are never touched.
    pub async fn mark_swipe_as_rewound(&self, session: Option<&Session>, swipe_id: Uuid) -> EngineResult<bool> {
        let user_id = require_user(session)?;
        Ok(self.store.mark_swipe_rewound(user_id, swipe_id).await?)
    }

    /// Rewound swipes created since local midnight.
    ///
    /// Only reports the count; comparing it to a plan allowance is up to the caller
    /// (or [`rewind_last_swipe`](Self::rewind_last_swipe)).
    pub async fn get_today_rewind_count(&self, session: Option<&Session>) -> EngineResult<i64> {
        let user_id = require_user(session)?;
        Ok(self
            .store
            .count_rewound_since(user_id, self.start_of_today())
            .await?)
    }

    /// Superlikes sent since local midnight. Reporting only, no quota is enforced here.
    pub async fn get_today_superlike_count(&self, session: Option<&Session>) -> EngineResult<i64> {
        let user_id = require_user(session)?;
        Ok(self
            .store
            .count_swipes_since(user_id, SwipeAction::Superlike, self.start_of_today())
            .await?)
    }

    /// Undo the latest swipe within the plan's daily allowance.
    ///
    /// The allowance check, the flag flip and the like cleanup happen in one
    /// store operation, so concurrent rewinds cannot both spend the last
    /// allowance or rewind the same swipe. Rewinding a like or superlike
    /// removes the like it created unless another live like swipe on the same
    /// profile still backs it. A match that already exists is kept.
    pub async fn rewind_last_swipe(&self, session: Option<&Session>, plan: Plan) -> EngineResult<SwipeRecord> {
        let user_id = require_user(session)?;

        let outcome = self
            .store
            .rewind_latest_swipe(user_id, self.start_of_today(), plan.daily_rewind_limit())
            .await?;

        match outcome {
            RewindOutcome::Rewound(swipe) => {
                tracing::info!("{} rewound {} on {}", user_id, swipe.action, swipe.target_profile_id);
                Ok(swipe)
            }
            RewindOutcome::LimitReached { used, limit } => Err(EngineError::RewindLimitReached { used, limit }),
            RewindOutcome::NothingToRewind => Err(EngineError::NothingToRewind),
        }
    }
}
