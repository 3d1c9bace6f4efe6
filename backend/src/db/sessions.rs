use crate::models::Plan;
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn get_session_user(pool: &PgPool, token: &str) -> Result<Option<Uuid>> {
    let user_id = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT user_id
        FROM sessions
        WHERE token = $1 AND expires_at > NOW()
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(user_id)
}

/// Users without a profile row, or with an unrecognised plan label, are on the free plan.
pub async fn get_user_plan(pool: &PgPool, user_id: Uuid) -> Result<Plan> {
    let label = sqlx::query_scalar::<_, String>("SELECT plan FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    let plan = match label {
        Some(label) => label.parse().unwrap_or_else(|e| {
            tracing::warn!("Profile {} has {}, treating as free", user_id, e);
            Plan::Free
        }),
        None => Plan::Free,
    };

    Ok(plan)
}
