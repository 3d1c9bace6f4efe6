use crate::models::CompatibilityMode;
use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Calls the `calculate_compatibility` procedure. The raw value is not clamped here.
pub async fn calculate_compatibility(
    pool: &PgPool,
    viewer_id: Uuid,
    target_id: Uuid,
    mode: CompatibilityMode,
) -> Result<f64> {
    let score = sqlx::query_scalar::<_, f64>("SELECT calculate_compatibility($1, $2, $3)::float8")
        .bind(viewer_id)
        .bind(target_id)
        .bind(mode.as_str())
        .fetch_one(pool)
        .await?;

    Ok(score)
}
