pub mod models;
pub mod db;
pub mod store;
pub mod engine;
pub mod handlers;
pub mod utils;
pub mod constants;
pub mod error;

pub use utils::config::Config;
pub use db::connection::get_db_pool;
pub use engine::{EngineSettings, SwipeEngine};
pub use error::{EngineError, EngineResult};
pub use store::{MemoryStore, PgStore, SwipeStore};

// Re-export common types
pub use sqlx::PgPool;
pub use anyhow::Result;
pub use uuid::Uuid;
pub use chrono::{DateTime, Utc};
