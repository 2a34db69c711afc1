// src/services/price_scraper.rs

//! Fans a product out to every selected retailer and groups the results.

use std::sync::Arc;

use futures::future::join_all;

use crate::error::Result;
use crate::models::{BrandGroup, Config, ProductQuery, ProductRecord, validate_record};
use crate::services::registry::{ALL_RETAILERS, build_scrapers};
use crate::services::scraper::{ScrapeContext, SiteScraper};

/// Runs retailer scrapers and aggregates their records.
pub struct PriceScraper {
    scrapers: Vec<Arc<dyn SiteScraper>>,
    validate: bool,
}

impl PriceScraper {
    pub fn new(scrapers: Vec<Arc<dyn SiteScraper>>) -> Self {
        Self {
            scrapers,
            validate: false,
        }
    }

    /// Build scrapers for `selection` (`"all"` or a retailer id).
    pub fn from_config(config: &Config, selection: &str) -> Result<Self> {
        let ctx = Arc::new(ScrapeContext::from_config(config)?);
        let scrapers = build_scrapers(config, selection, ctx)?;
        Ok(Self::new(scrapers).with_validation(config.scraper.validate_results))
    }

    /// Drop records that fail validation.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn scrapers(&self) -> &[Arc<dyn SiteScraper>] {
        &self.scrapers
    }

    /// Label for output file names: the retailer id, or `all`.
    pub fn selection_label(&self) -> &str {
        match self.scrapers.as_slice() {
            [only] => only.id(),
            _ => ALL_RETAILERS,
        }
    }

    /// Query every scraper concurrently for one product.
    ///
    /// Records come back in scraper order. A scraper that finds nothing,
    /// fails, or panics contributes nothing.
    pub async fn scrape_product(&self, product_name: &str) -> Vec<ProductRecord> {
        let handles: Vec<_> = self
            .scrapers
            .iter()
            .map(|scraper| {
                let scraper = Arc::clone(scraper);
                let name = product_name.to_string();
                tokio::spawn(async move { scraper.scrape(&name).await })
            })
            .collect();

        let mut results = Vec::new();
        for (scraper, outcome) in self.scrapers.iter().zip(join_all(handles).await) {
            match outcome {
                Ok(Some(records)) => results.extend(records),
                Ok(None) => {}
                Err(e) => log::error!("Error with {}: {}", scraper.name(), e),
            }
        }

        if self.validate {
            results.retain(|record| match validate_record(record) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Dropping record from {}: {}", record.website, e);
                    false
                }
            });
        }
        results
    }

    /// Scrape each product in turn and group the results by brand.
    ///
    /// Products with no records at all are left out.
    pub async fn scrape_prices(&self, products: &[ProductQuery]) -> Vec<BrandGroup> {
        let mut groups = Vec::new();
        for product in products {
            log::info!("Scraping prices for {}", product.name);
            let records = self.scrape_product(&product.name).await;
            match BrandGroup::from_records(&records) {
                Some(group) => groups.push(group),
                None => log::info!("No prices found for {}", product.name),
            }
        }
        groups
    }
}
