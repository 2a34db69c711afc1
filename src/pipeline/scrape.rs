// src/pipeline/scrape.rs

//! Price scraping pipeline: load products, scrape, report, save.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::error::{AppError, Result};
use crate::models::{BrandGroup, Config, ProductQuery};
use crate::services::PriceScraper;
use crate::storage::LocalStorage;

/// What to scrape and where the results go.
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    /// `"all"` or a retailer id
    pub retailer: String,
    pub products: Vec<ProductQuery>,
    /// Explicit output file; defaults to a timestamped file in the results dir
    pub output: Option<PathBuf>,
    pub save: bool,
}

/// Result of a scrape run.
#[derive(Debug, Default)]
pub struct ScrapeOutcome {
    pub groups: Vec<BrandGroup>,
    pub saved_to: Option<PathBuf>,
}

/// Parse a product list: a JSON array of objects with a `name` string.
pub fn parse_products(json: &str) -> Result<Vec<ProductQuery>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let Some(items) = value.as_array() else {
        return Err(AppError::config("Product file must contain a JSON array"));
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item.get("name").and_then(|n| n.as_str()) {
            Some(name) if !name.trim().is_empty() => Ok(ProductQuery::new(name.trim())),
            _ => Err(AppError::config(format!(
                "Product #{} has no 'name' field",
                i + 1
            ))),
        })
        .collect()
}

/// Read a product list from a JSON file.
pub async fn load_products(path: &Path) -> Result<Vec<ProductQuery>> {
    let content = tokio::fs::read_to_string(path).await?;
    parse_products(&content)
}

/// `<label>_prices_<YYYYmmdd_HHMMSS>.json`
pub fn results_file_name(label: &str, at: DateTime<Local>) -> String {
    format!("{}_prices_{}.json", label, at.format("%Y%m%d_%H%M%S"))
}

/// Write grouped results as pretty JSON to `path`.
pub async fn save_results(groups: &[BrandGroup], path: &Path) -> Result<()> {
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
        return Err(AppError::config(format!(
            "Invalid output path: {}",
            path.display()
        )));
    };
    let dir = path.parent().unwrap_or(Path::new("."));
    LocalStorage::new(dir).write_json(file_name, groups).await
}

/// Human-readable report of grouped results.
pub fn render_results(groups: &[BrandGroup]) -> String {
    let mut out = String::new();
    if groups.is_empty() {
        out.push_str("No prices found.\n");
        return out;
    }

    for group in groups {
        let _ = writeln!(out, "\nBrand: {}", group.brand);
        let _ = writeln!(out, "{}", "=".repeat(50));
        for entry in &group.products {
            let _ = writeln!(out, "\nWebsite: {}", entry.website);
            let _ = writeln!(out, "Title: {}", entry.title);
            let _ = writeln!(out, "Price: ${}", entry.price);
            if !entry.price_valid_till.is_empty() {
                let _ = writeln!(out, "Valid till: {}", entry.price_valid_till);
            }
            let _ = writeln!(out, "URL: {}", entry.url);
        }
    }
    out
}

/// Run a scrape with a prepared scraper.
pub async fn run_scrape_with(
    scraper: &PriceScraper,
    config: &Config,
    request: &ScrapeRequest,
) -> Result<ScrapeOutcome> {
    log::info!(
        "Scraping {} product(s) from {} retailer(s)",
        request.products.len(),
        scraper.scrapers().len()
    );

    let groups = scraper.scrape_prices(&request.products).await;
    let found: usize = groups.iter().map(|g| g.products.len()).sum();
    log::info!("Found {} price(s) for {} product(s)", found, groups.len());

    let mut outcome = ScrapeOutcome {
        groups,
        saved_to: None,
    };

    if request.save {
        let path = request.output.clone().unwrap_or_else(|| {
            config
                .paths
                .results_dir
                .join(results_file_name(scraper.selection_label(), Local::now()))
        });
        save_results(&outcome.groups, &path).await?;
        log::info!("Results saved to {}", path.display());
        outcome.saved_to = Some(path);
    }

    Ok(outcome)
}

/// Build scrapers for the request's retailer selection and run them.
pub async fn run_scrape(config: &Config, request: &ScrapeRequest) -> Result<ScrapeOutcome> {
    let scraper = PriceScraper::from_config(config, &request.retailer)?;
    run_scrape_with(&scraper, config, request).await
}
