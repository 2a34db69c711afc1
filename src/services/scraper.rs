// src/services/scraper.rs

//! The retailer scraper contract and the context every scraper shares.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::Semaphore;

use crate::error::Result;
use crate::models::{Config, ProductRecord};
use crate::services::RateLimiter;
use crate::storage::Cache;
use crate::utils::http::{create_async_client, with_retries};
use crate::utils::normalize::{extract_brand, safe_filename};

/// A retailer that can be searched for one product.
#[async_trait]
pub trait SiteScraper: Send + Sync {
    /// Retailer id (cache scope and rate-limit key)
    fn id(&self) -> &str;

    /// Retailer display name
    fn name(&self) -> &str;

    /// Search for `product_name` and return at most one record.
    ///
    /// Failures are logged and reported as `None`.
    async fn scrape(&self, product_name: &str) -> Option<Vec<ProductRecord>>;
}

/// Cache key for a retailer/product pair.
pub fn cache_key(site_id: &str, product_name: &str) -> String {
    format!("{}_{}", site_id, safe_filename(product_name))
}

/// Shared HTTP client, cache, rate limiter and request policy.
pub struct ScrapeContext {
    client: Client,
    cache: Option<Cache>,
    limiter: Arc<RateLimiter>,
    permits: Semaphore,
    max_retries: u32,
    retry_delay: Duration,
    brands: Vec<String>,
}

impl ScrapeContext {
    /// Create a context with no retries and the default request bound.
    pub fn new(client: Client, cache: Option<Cache>, limiter: Arc<RateLimiter>) -> Self {
        let defaults = Config::default().scraper;
        Self {
            client,
            cache,
            limiter,
            permits: Semaphore::new(defaults.max_concurrent),
            max_retries: 0,
            retry_delay: Duration::ZERO,
            brands: defaults.brands,
        }
    }

    /// Build the context described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = create_async_client(config)?;
        let cache = Cache::from_config(&config.cache);
        let limiter = Arc::new(RateLimiter::new(config.rate_limits.clone()));

        Ok(Self::new(client, cache, limiter)
            .with_retries(
                config.scraper.max_retries,
                Duration::from_secs(config.scraper.retry_delay_secs),
            )
            .with_max_concurrent(config.scraper.max_concurrent)
            .with_brands(config.scraper.brands.clone()))
    }

    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.permits = Semaphore::new(max_concurrent.max(1));
        self
    }

    pub fn with_brands(mut self, brands: Vec<String>) -> Self {
        self.brands = brands;
        self
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn cache(&self) -> Option<&Cache> {
        self.cache.as_ref()
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Brand guessed from the product name.
    pub fn brand_for(&self, product_name: &str) -> String {
        extract_brand(product_name, &self.brands)
    }

    /// Issue one network request to `site`.
    ///
    /// Each attempt first waits on the site's rate limit and holds a request
    /// permit while in flight.
    pub async fn request<T, F, Fut>(&self, site: &str, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let limiter = &self.limiter;
        let permits = &self.permits;
        with_retries(self.max_retries, self.retry_delay, || {
            let attempt = operation();
            async move {
                limiter.wait(site).await;
                let _permit = permits.acquire().await.ok();
                attempt.await
            }
        })
        .await
    }

    /// Serve from cache, or run `search` and cache what it finds.
    ///
    /// A cache hit skips rate limiting and the network entirely. Errors from
    /// `search` are logged and become `None`.
    pub async fn read_through<F, Fut>(
        &self,
        site_id: &str,
        site_name: &str,
        product_name: &str,
        search: F,
    ) -> Option<Vec<ProductRecord>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<ProductRecord>>>,
    {
        let key = cache_key(site_id, product_name);

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get::<Vec<ProductRecord>>(&key).await {
                if !hit.is_empty() {
                    log::debug!("Cache hit for {product_name} at {site_name}");
                    return Some(hit);
                }
            }
        }

        match search().await {
            Ok(Some(record)) => {
                let result = vec![record];
                if let Some(cache) = &self.cache {
                    cache.set(&key, &result).await;
                }
                Some(result)
            }
            Ok(None) => {
                log::info!("No results found for {product_name} at {site_name}");
                None
            }
            Err(e) => {
                log::error!("Error in {site_name} scraper: {e}");
                None
            }
        }
    }
}
