// src/pipeline/cache.rs

//! Cache maintenance.

use std::time::Duration;

use crate::error::Result;
use crate::models::Config;
use crate::storage::{Cache, LocalStorage};

/// Delete every cached response. Returns the number of entries removed.
///
/// Works even when caching is disabled, so stale entries from earlier runs
/// can still be cleared.
pub async fn run_clear_cache(config: &Config) -> Result<usize> {
    let cache = Cache::new(
        LocalStorage::new(&config.cache.dir),
        Duration::from_secs(config.cache.duration_secs),
    );
    let removed = cache.clear().await?;
    log::info!(
        "Removed {} cache entries from {}",
        removed,
        config.cache.dir.display()
    );
    Ok(removed)
}
