// src/services/registry.rs

//! Builds scrapers for the configured retailers.

use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{Config, RetailerConfig};
use crate::services::graphql::GraphqlScraper;
use crate::services::html::HtmlScraper;
use crate::services::scraper::{ScrapeContext, SiteScraper};

/// Selection value meaning every configured retailer.
pub const ALL_RETAILERS: &str = "all";

/// Retailers matching `selection`: `"all"` or one retailer id.
pub fn select_retailers<'a>(config: &'a Config, selection: &str) -> Result<Vec<&'a RetailerConfig>> {
    if selection.eq_ignore_ascii_case(ALL_RETAILERS) {
        return Ok(config.retailers.iter().collect());
    }

    match config.retailer(selection) {
        Some(retailer) => Ok(vec![retailer]),
        None => {
            let mut options: Vec<&str> = config.retailers.iter().map(|r| r.id.as_str()).collect();
            options.push(ALL_RETAILERS);
            Err(AppError::UnknownRetailer {
                requested: selection.to_string(),
                available: options.join(", "),
            })
        }
    }
}

/// Build the scraper engine a retailer is configured for.
pub fn build_scraper(
    retailer: RetailerConfig,
    ctx: Arc<ScrapeContext>,
) -> Result<Arc<dyn SiteScraper>> {
    if retailer.graphql.is_some() {
        Ok(Arc::new(GraphqlScraper::new(retailer, ctx)?))
    } else {
        Ok(Arc::new(HtmlScraper::new(retailer, ctx)?))
    }
}

/// Build scrapers for `selection`, in configuration order.
pub fn build_scrapers(
    config: &Config,
    selection: &str,
    ctx: Arc<ScrapeContext>,
) -> Result<Vec<Arc<dyn SiteScraper>>> {
    select_retailers(config, selection)?
        .into_iter()
        .map(|retailer| build_scraper(retailer.clone(), Arc::clone(&ctx)))
        .collect()
}
