//! hr-db: SQLite host adapter for the row engine.
//!
//! This crate provides SQLite-backed storage with connection pooling,
//! embedded migrations, typed models, and query modules for users, items,
//! favorites and playback state, plus [`library::SqliteLibrary`] which
//! exposes them to the engine.

pub mod library;
pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;

pub use library::SqliteLibrary;
pub use pool::{get_conn, init_memory_pool, init_pool, DbPool, PooledConnection};
