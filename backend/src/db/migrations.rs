use anyhow::Result;
use sqlx::{PgPool, migrate::Migrator};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Version and description of every migration compiled into the binary.
pub fn embedded_migrations() -> Vec<(i64, String)> {
    MIGRATOR
        .iter()
        .map(|m| (m.version, m.description.to_string()))
        .collect()
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    tracing::info!("Applying {} migrations", MIGRATOR.iter().count());
    MIGRATOR.run(pool).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swipe_schema_is_embedded() {
        let migrations = embedded_migrations();
        assert!(!migrations.is_empty());
        assert!(migrations.iter().any(|(_, description)| description.contains("swipe")));
    }
}
