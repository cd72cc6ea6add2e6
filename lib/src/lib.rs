pub mod browser;
pub mod config;
pub mod error;
pub mod export;
pub mod merge;
pub mod models;
pub mod pocket;
pub mod store;
pub mod utils;

// Re-export error types for convenience
pub use error::PocketmarkError;
