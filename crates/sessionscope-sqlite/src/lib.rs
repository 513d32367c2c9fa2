pub mod activity_impl;
pub mod backend;
pub mod queries;
pub mod schema;

pub use backend::SqliteBackend;

/// Re-export the `rusqlite` crate so consumers (especially tests) can use
/// `sessionscope_sqlite::rusqlite::params!` without an extra dependency.
pub use rusqlite;
