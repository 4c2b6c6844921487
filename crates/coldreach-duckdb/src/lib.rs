pub mod backend;
pub mod drafts;
pub mod metrics;
pub mod models;
pub mod schema;
pub mod store_impl;
pub mod templates;

pub use backend::DuckDbBackend;

/// Re-export the `duckdb` crate so tests can use `coldreach_duckdb::duckdb::params!`
/// without an extra dependency.
pub use duckdb;
