use crate::models::{LikeOutcome, LikeRecord, MatchRecord, likes::canonical_pair};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

pub async fn get_like(pool: &PgPool, liker_id: Uuid, likee_id: Uuid) -> Result<Option<LikeRecord>> {
    let like = sqlx::query_as::<_, LikeRecord>(
        r#"
        SELECT id, liker_id, likee_id, created_at
        FROM likes
        WHERE liker_id = $1 AND likee_id = $2
        "#,
    )
    .bind(liker_id)
    .bind(likee_id)
    .fetch_optional(pool)
    .await?;

    Ok(like)
}

/// Inserts the directed like and, if the reverse like exists, the match, in one transaction.
///
/// Both directions of a pair take the same advisory lock, so two users liking
/// each other at the same moment are serialized and the second one always sees
/// the first one's like.
pub async fn like_and_match(
    pool: &PgPool,
    liker_id: Uuid,
    likee_id: Uuid,
    liked_at: DateTime<Utc>,
) -> Result<LikeOutcome> {
    let (user1_id, user2_id) = canonical_pair(liker_id, likee_id);
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(format!("{}:{}", user1_id, user2_id))
        .execute(&mut *tx)
        .await?;

    let inserted = sqlx::query_as::<_, LikeRecord>(
        r#"
        INSERT INTO likes (id, liker_id, likee_id, created_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (liker_id, likee_id) DO NOTHING
        RETURNING id, liker_id, likee_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(liker_id)
    .bind(likee_id)
    .bind(liked_at)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(like) = inserted else {
        tx.rollback().await?;
        return Ok(LikeOutcome::AlreadyLiked);
    };

    let reciprocal = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM likes WHERE liker_id = $1 AND likee_id = $2)",
    )
    .bind(likee_id)
    .bind(liker_id)
    .fetch_one(&mut *tx)
    .await?;

    let matched = if reciprocal {
        let created = sqlx::query_as::<_, MatchRecord>(
            r#"
            INSERT INTO matches (id, user1_id, user2_id, matched_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user1_id, user2_id) DO NOTHING
            RETURNING id, user1_id, user2_id, matched_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user1_id)
        .bind(user2_id)
        .bind(liked_at)
        .fetch_optional(&mut *tx)
        .await?;

        match created {
            Some(record) => Some(record),
            // A like that was removed and re-added finds the old match still in place
            None => {
                sqlx::query_as::<_, MatchRecord>(
                    r#"
                    SELECT id, user1_id, user2_id, matched_at
                    FROM matches
                    WHERE user1_id = $1 AND user2_id = $2
                    "#,
                )
                .bind(user1_id)
                .bind(user2_id)
                .fetch_optional(&mut *tx)
                .await?
            }
        }
    } else {
        None
    };

    tx.commit().await?;

    Ok(LikeOutcome::Liked { like, matched })
}

pub async fn delete_like(pool: &PgPool, liker_id: Uuid, likee_id: Uuid) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM likes
        WHERE liker_id = $1 AND likee_id = $2
        "#,
    )
    .bind(liker_id)
    .bind(likee_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn get_matches_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<MatchRecord>> {
    let matches = sqlx::query_as::<_, MatchRecord>(
        r#"
        SELECT id, user1_id, user2_id, matched_at
        FROM matches
        WHERE user1_id = $1 OR user2_id = $1
        ORDER BY matched_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(matches)
}
