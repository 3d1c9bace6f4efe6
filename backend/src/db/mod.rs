pub mod compatibility;
pub mod connection;
pub mod likes;
pub mod migrations;
pub mod sessions;
pub mod swipes;

pub use connection::{get_db_pool, DatabaseConfig};
