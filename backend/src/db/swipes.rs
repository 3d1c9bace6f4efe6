use crate::models::{RewindOutcome, SwipeAction, SwipeRecord};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

pub async fn insert_swipe(pool: &PgPool, swipe: &SwipeRecord) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO swipe_history (id, user_id, target_profile_id, action, created_at, rewound)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(swipe.id)
    .bind(swipe.user_id)
    .bind(swipe.target_profile_id)
    .bind(swipe.action.as_str())
    .bind(swipe.created_at)
    .bind(swipe.rewound)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_latest_unrewound_swipe<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
) -> Result<Option<SwipeRecord>> {
    let swipe = sqlx::query_as::<_, SwipeRecord>(
        r#"
        SELECT id, user_id, target_profile_id, action, created_at, rewound
        FROM swipe_history
        WHERE user_id = $1 AND rewound = FALSE
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(swipe)
}

/// Flips `rewound` on an unrewound swipe owned by `user_id`.
/// Returns false when no such row exists or it was already rewound.
pub async fn mark_swipe_rewound<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    swipe_id: Uuid,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE swipe_history
        SET rewound = TRUE
        WHERE id = $1 AND user_id = $2 AND rewound = FALSE
        "#,
    )
    .bind(swipe_id)
    .bind(user_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count_rewound_since<'e>(
    executor: impl PgExecutor<'e>,
    user_id: Uuid,
    since: DateTime<Utc>,
) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM swipe_history
        WHERE user_id = $1 AND rewound = TRUE AND created_at >= $2
        "#,
    )
    .bind(user_id)
    .bind(since)
    .fetch_one(executor)
    .await?;

    Ok(count)
}

/// Rewinds the user's latest swipe in one transaction.
///
/// A per-user advisory lock serializes concurrent rewinds, so the allowance
/// check and the flag flip see each other's effects.
pub async fn rewind_latest_swipe(
    pool: &PgPool,
    user_id: Uuid,
    since: DateTime<Utc>,
    limit: Option<i64>,
) -> Result<RewindOutcome> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(format!("rewind:{}", user_id))
        .execute(&mut *tx)
        .await?;

    if let Some(limit) = limit {
        let used = count_rewound_since(&mut *tx, user_id, since).await?;
        if used >= limit {
            tx.rollback().await?;
            return Ok(RewindOutcome::LimitReached { used, limit });
        }
    }

    let Some(mut swipe) = get_latest_unrewound_swipe(&mut *tx, user_id).await? else {
        tx.rollback().await?;
        return Ok(RewindOutcome::NothingToRewind);
    };

    // mark_swipe_as_rewound runs outside the lock and may have flagged it first
    if !mark_swipe_rewound(&mut *tx, user_id, swipe.id).await? {
        tx.rollback().await?;
        return Ok(RewindOutcome::NothingToRewind);
    }
    swipe.rewound = true;

    if swipe.action.is_like() {
        sqlx::query(
            r#"
            DELETE FROM likes
            WHERE liker_id = $1 AND likee_id = $2
              AND NOT EXISTS (
                SELECT 1 FROM swipe_history
                WHERE user_id = $1 AND target_profile_id = $2
                  AND rewound = FALSE AND action IN ('like', 'superlike')
              )
            "#,
        )
        .bind(user_id)
        .bind(swipe.target_profile_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(RewindOutcome::Rewound(swipe))
}

pub async fn count_swipes_since(
    pool: &PgPool,
    user_id: Uuid,
    action: SwipeAction,
    since: DateTime<Utc>,
) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM swipe_history
        WHERE user_id = $1 AND action = $2 AND created_at >= $3
        "#,
    )
    .bind(user_id)
    .bind(action.as_str())
    .bind(since)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
