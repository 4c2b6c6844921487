pub mod analytics;
pub mod config;
pub mod content;
pub mod error;
pub mod store;
