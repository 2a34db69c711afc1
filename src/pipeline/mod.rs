//! Pipeline entry points for scraper operations.
//!
//! - `run_scrape`: Scrape prices for a product list and save the results
//! - `run_validate`: Check configuration and build every retailer scraper
//! - `run_clear_cache`: Delete cached responses
//! - `render_retailers`: Describe the configured retailers

pub mod cache;
pub mod retailers;
pub mod scrape;
pub mod validate;

pub use cache::run_clear_cache;
pub use retailers::render_retailers;
pub use scrape::{ScrapeOutcome, ScrapeRequest, load_products, run_scrape, run_scrape_with};
pub use validate::{ValidationSummary, run_validate};
