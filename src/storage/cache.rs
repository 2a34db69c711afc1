// src/storage/cache.rs

//! Timestamped response cache.
//!
//! Each entry is a JSON document `{"timestamp": <epoch seconds>, "value": ...}`
//! stored as `<key>.json`. Entries older than the configured duration are
//! deleted when read. Nothing here returns an error to a scraper: unreadable
//! entries are misses and failed writes are logged.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::Result;
use crate::models::CacheConfig;
use crate::storage::LocalStorage;

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    timestamp: f64,
    value: T,
}

/// File-backed cache with age-based expiry.
#[derive(Debug, Clone)]
pub struct Cache {
    storage: LocalStorage,
    duration: Duration,
}

impl Cache {
    pub fn new(storage: LocalStorage, duration: Duration) -> Self {
        Self { storage, duration }
    }

    /// Build the cache described by `config`, or `None` when caching is off.
    pub fn from_config(config: &CacheConfig) -> Option<Self> {
        config.enabled.then(|| {
            Self::new(
                LocalStorage::new(&config.dir),
                Duration::from_secs(config.duration_secs),
            )
        })
    }

    fn file_key(key: &str) -> String {
        format!("{key}.json")
    }

    /// Look up a fresh entry.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_at(key, now_secs()).await
    }

    /// Look up an entry as of `now` (epoch seconds).
    pub async fn get_at<T: DeserializeOwned>(&self, key: &str, now: f64) -> Option<T> {
        let file_key = Self::file_key(key);
        let entry: CacheEntry<T> = match self.storage.read_json(&file_key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Cache read error for {key}: {e}");
                return None;
            }
        };

        if now - entry.timestamp > self.duration.as_secs_f64() {
            log::debug!("Cache entry {key} expired");
            if let Err(e) = self.storage.remove(&file_key).await {
                log::warn!("Failed to remove expired cache entry {key}: {e}");
            }
            return None;
        }
        Some(entry.value)
    }

    /// Store `value` stamped with the current time.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) {
        self.set_at(key, value, now_secs()).await;
    }

    /// Store `value` stamped with `timestamp` (epoch seconds).
    pub async fn set_at<T: Serialize>(&self, key: &str, value: &T, timestamp: f64) {
        let entry = CacheEntry { timestamp, value };
        if let Err(e) = self.storage.write_json(&Self::file_key(key), &entry).await {
            log::warn!("Cache write error for {key}: {e}");
        }
    }

    /// Remove every entry. Returns the number removed.
    pub async fn clear(&self) -> Result<usize> {
        self.storage.remove_all("json").await
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }
}

fn now_secs() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductRecord;
    use tempfile::TempDir;

    fn cache(tmp: &TempDir) -> Cache {
        Cache::new(LocalStorage::new(tmp.path()), Duration::from_secs(3600))
    }

    fn records() -> Vec<ProductRecord> {
        vec![ProductRecord {
            brand: "Samsung".into(),
            website: "Best Buy".into(),
            title: "Samsung 65\" QLED".into(),
            price: "1299.99".into(),
            price_valid_till: String::new(),
            url: "https://www.bestbuy.ca/p/1".into(),
            regular_price: None,
            sku: None,
            availability: None,
        }]
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let tmp = TempDir::new().unwrap();
        let cache = cache(&tmp);

        cache.set("bestbuy_Samsung", &records()).await;
        let hit: Option<Vec<ProductRecord>> = cache.get("bestbuy_Samsung").await;
        assert_eq!(hit, Some(records()));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let tmp = TempDir::new().unwrap();
        let hit: Option<Vec<ProductRecord>> = cache(&tmp).get("nothing").await;
        assert!(hit.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_removed() {
        let tmp = TempDir::new().unwrap();
        let cache = cache(&tmp);

        cache.set_at("old", &records(), 1_000.0).await;
        assert!(cache.storage().path("old.json").exists());

        let fresh: Option<Vec<ProductRecord>> = cache.get_at("old", 1_000.0 + 3_599.0).await;
        assert!(fresh.is_some());

        let stale: Option<Vec<ProductRecord>> = cache.get_at("old", 1_000.0 + 3_601.0).await;
        assert!(stale.is_none());
        assert!(!cache.storage().path("old.json").exists());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let tmp = TempDir::new().unwrap();
        let cache = cache(&tmp);

        cache
            .storage()
            .write_bytes("broken.json", b"{not json")
            .await
            .unwrap();
        let hit: Option<Vec<ProductRecord>> = cache.get("broken").await;
        assert!(hit.is_none());
    }

    #[tokio::test]
    async fn test_entry_format() {
        let tmp = TempDir::new().unwrap();
        let cache = cache(&tmp);

        cache.set_at("k", &"v", 42.5).await;
        let raw: serde_json::Value = cache.storage().read_json("k.json").await.unwrap().unwrap();
        assert_eq!(raw["timestamp"], 42.5);
        assert_eq!(raw["value"], "v");
    }

    #[tokio::test]
    async fn test_clear() {
        let tmp = TempDir::new().unwrap();
        let cache = cache(&tmp);

        cache.set("a", &1).await;
        cache.set("b", &2).await;
        assert_eq!(cache.clear().await.unwrap(), 2);
        assert!(cache.get::<i32>("a").await.is_none());
    }

    #[tokio::test]
    async fn test_unwritable_directory_is_swallowed() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();

        let cache = Cache::new(LocalStorage::new(&blocker), Duration::from_secs(60));
        cache.set("k", &1).await;
        assert!(cache.get::<i32>("k").await.is_none());
    }

    #[test]
    fn test_disabled_config() {
        let config = CacheConfig {
            enabled: false,
            ..CacheConfig::default()
        };
        assert!(Cache::from_config(&config).is_none());
    }
}
