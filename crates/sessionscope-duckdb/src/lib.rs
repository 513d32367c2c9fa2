pub mod activity_impl;
pub mod backend;
pub mod queries;
pub mod schema;

pub use backend::DuckDbBackend;

/// Re-export the `duckdb` crate so consumers (especially tests) can use
/// `sessionscope_duckdb::duckdb::params!` without an extra dependency.
pub use duckdb;
