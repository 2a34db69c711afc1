//! Service layer for the price scraper.
//!
//! This module contains the business logic for:
//! - Per-site request throttling (`RateLimiter`)
//! - The retailer scraper contract and shared context (`SiteScraper`, `ScrapeContext`)
//! - HTML search page scraping (`HtmlScraper`)
//! - GraphQL product search (`GraphqlScraper`)
//! - Fan-out and grouping across retailers (`PriceScraper`)

pub mod graphql;
pub mod html;
mod price_scraper;
mod rate_limiter;
pub mod registry;
pub mod scraper;

pub use graphql::GraphqlScraper;
pub use html::HtmlScraper;
pub use price_scraper::PriceScraper;
pub use rate_limiter::RateLimiter;
pub use registry::{ALL_RETAILERS, build_scraper, build_scrapers, select_retailers};
pub use scraper::{ScrapeContext, SiteScraper, cache_key};
