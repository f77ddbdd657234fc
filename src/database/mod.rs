//! Database module
//!
//! This module holds the persistence gateway trait and its backends.

pub mod connection;
pub mod memory;
pub mod postgres;
pub mod store;

// Re-export commonly used database components
pub use connection::{create_pool, health_check, run_migrations, DatabasePool};
pub use memory::MemStore;
pub use postgres::PgStore;
pub use store::Store;
