// src/models/mod.rs

//! Domain models for the price scraper.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod product;
mod retailer;
mod validation;

// Re-export all public types
pub use config::{
    CacheConfig, Config, PathsConfig, ProxyConfig, RateLimitConfig, RateTier, ScraperConfig,
};
pub use product::{BrandGroup, ListingEntry, ProductQuery, ProductRecord};
pub use retailer::{GraphqlEndpoint, HtmlSelectors, QueryMode, RetailerConfig};
pub use validation::{ValidationError, validate_price, validate_record};
