//! Storage for cached responses and saved results.

pub mod cache;
pub mod local;

// Re-export for convenience
pub use cache::Cache;
pub use local::LocalStorage;
