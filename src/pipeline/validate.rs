// src/pipeline/validate.rs

//! Configuration validation.

use std::sync::Arc;

use crate::error::Result;
use crate::models::Config;
use crate::services::{ALL_RETAILERS, ScrapeContext, build_scrapers};

/// Counts reported by a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSummary {
    pub html_retailers: usize,
    pub graphql_retailers: usize,
    pub rate_tiers: usize,
}

/// Check configuration values, then build every scraper so that bad
/// selectors, headers and proxy settings surface before a run.
pub fn run_validate(config: &Config) -> Result<ValidationSummary> {
    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    log::info!("✓ Config values OK");
    log::info!("  User agent: {}", config.scraper.user_agent);
    log::info!("  Timeout: {}s", config.scraper.timeout_secs);
    log::info!("  Max concurrent requests: {}", config.scraper.max_concurrent);

    let ctx = Arc::new(ScrapeContext::from_config(config)?);
    if let Err(e) = build_scrapers(config, ALL_RETAILERS, ctx) {
        log::error!("Retailer setup failed: {}", e);
        return Err(e);
    }

    let graphql_retailers = config
        .retailers
        .iter()
        .filter(|r| r.graphql.is_some())
        .count();
    let summary = ValidationSummary {
        html_retailers: config.retailers.len() - graphql_retailers,
        graphql_retailers,
        rate_tiers: config.rate_limits.sites.len() + 1,
    };
    log::info!(
        "✓ Retailers OK ({} HTML, {} GraphQL)",
        summary.html_retailers,
        summary.graphql_retailers
    );
    log::info!("✓ Rate limits OK ({} tiers)", summary.rate_tiers);
    Ok(summary)
}
