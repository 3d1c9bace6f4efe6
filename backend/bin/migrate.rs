use swipeline::db::{DatabaseConfig, migrations};
use swipeline::{get_db_pool, utils};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();

    let db_config = DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    let embedded = migrations::embedded_migrations();
    println!("Running {} swipe engine migrations...", embedded.len());
    for (version, description) in &embedded {
        println!("  {} {}", version, description);
    }

    migrations::run_migrations(&pool).await?;
    println!("Schema ready: swipe_history, likes, matches, calculate_compatibility");

    Ok(())
}
