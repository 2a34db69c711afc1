// src/services/rate_limiter.rs

//! Per-site sliding-window rate limiter.
//!
//! Each site owns a window of recent request instants behind its own async
//! mutex. Callers for the same site queue on that mutex; callers for other
//! sites never touch it. Waiting is a `tokio::time::sleep`, so a throttled
//! site only suspends its own tasks.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::models::{RateLimitConfig, RateTier};

#[derive(Debug)]
struct SiteWindow {
    tier: RateTier,
    requests: tokio::sync::Mutex<VecDeque<Instant>>,
}

impl SiteWindow {
    fn new(tier: RateTier) -> Self {
        Self {
            tier,
            requests: tokio::sync::Mutex::new(VecDeque::with_capacity(tier.requests)),
        }
    }
}

/// Sliding-window limiter shared by every scraper.
#[derive(Debug)]
pub struct RateLimiter {
    limits: RateLimitConfig,
    windows: Mutex<HashMap<String, Arc<SiteWindow>>>,
}

impl RateLimiter {
    /// Create a limiter with windows for the sites listed in `limits`.
    ///
    /// Other sites get a default-tier window on first use.
    pub fn new(limits: RateLimitConfig) -> Self {
        let windows = limits
            .sites
            .iter()
            .map(|(site, tier)| (site.clone(), Arc::new(SiteWindow::new(*tier))))
            .collect();
        Self {
            limits,
            windows: Mutex::new(windows),
        }
    }

    /// Quota that applies to `site`.
    pub fn tier(&self, site: &str) -> RateTier {
        self.limits.tier(site)
    }

    fn window(&self, site: &str) -> Arc<SiteWindow> {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        let window = windows
            .entry(site.to_string())
            .or_insert_with(|| Arc::new(SiteWindow::new(self.limits.tier(site))));
        Arc::clone(window)
    }

    /// Wait until one more request to `site` fits in its window, then record it.
    ///
    /// Returns how long the caller was held back.
    pub async fn wait(&self, site: &str) -> Duration {
        let window = self.window(site);
        let period = Duration::from_secs(window.tier.period);
        let mut requests = window.requests.lock().await;

        let now = Instant::now();
        prune(&mut requests, now, period);

        let mut waited = Duration::ZERO;
        if requests.len() >= window.tier.requests {
            if let Some(&oldest) = requests.front() {
                let ready_at = oldest + period;
                if ready_at > now {
                    waited = ready_at - now;
                    log::debug!(
                        "Rate limit reached for {site}, waiting {:.1}s",
                        waited.as_secs_f64()
                    );
                    tokio::time::sleep_until(ready_at).await;
                }
            }
            prune(&mut requests, Instant::now(), period);
        }

        requests.push_back(Instant::now());
        waited
    }
}

/// Drop instants that have left the window.
fn prune(requests: &mut VecDeque<Instant>, now: Instant, period: Duration) {
    while let Some(&front) = requests.front() {
        if now.duration_since(front) >= period {
            requests.pop_front();
        } else {
            break;
        }
    }
}
