// src/services/html.rs

//! Scraper for retailers with a server-rendered HTML search page.
//!
//! The first result item is located with the retailer's configured CSS
//! selectors. Title and price are read from inside that item; the product
//! link comes from the link selector or, when none is configured, from the
//! title element itself.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{HtmlSelectors, ProductRecord, QueryMode, RetailerConfig};
use crate::services::scraper::{ScrapeContext, SiteScraper};
use crate::utils::http::{fetch_text, header_map};
use crate::utils::normalize::{clean_price, extract_model_number, normalize_whitespace};
use crate::utils::{absolute_url, encode_query};

/// Compiled form of [`HtmlSelectors`].
#[derive(Debug)]
struct ListingSelectors {
    container: Selector,
    title: Selector,
    price: Selector,
    link: Option<Selector>,
    link_attr: String,
}

impl ListingSelectors {
    fn compile(selectors: &HtmlSelectors) -> Result<Self> {
        Ok(Self {
            container: parse_selector(&selectors.container)?,
            title: parse_selector(&selectors.title)?,
            price: parse_selector(&selectors.price)?,
            link: selectors.link.as_deref().map(parse_selector).transpose()?,
            link_attr: selectors.link_attr.clone(),
        })
    }
}

/// Config-driven HTML search scraper.
pub struct HtmlScraper {
    retailer: RetailerConfig,
    selectors: ListingSelectors,
    headers: HeaderMap,
    ctx: Arc<ScrapeContext>,
}

impl HtmlScraper {
    /// Compile the retailer's selectors and headers.
    pub fn new(retailer: RetailerConfig, ctx: Arc<ScrapeContext>) -> Result<Self> {
        let Some(selectors) = &retailer.selectors else {
            return Err(AppError::config(format!(
                "Retailer '{}' has no HTML selectors",
                retailer.id
            )));
        };
        let selectors = ListingSelectors::compile(selectors)?;
        let headers = header_map(&retailer.headers)?;

        Ok(Self {
            retailer,
            selectors,
            headers,
            ctx,
        })
    }

    pub fn retailer(&self) -> &RetailerConfig {
        &self.retailer
    }

    /// Text sent to the retailer's search page.
    pub fn query_for(&self, product_name: &str) -> String {
        match self.retailer.query {
            QueryMode::FullName => product_name.to_string(),
            QueryMode::ModelNumber => extract_model_number(product_name),
        }
    }

    pub fn search_url_for(&self, product_name: &str) -> String {
        self.retailer
            .search_url(&encode_query(&self.query_for(product_name)))
    }

    async fn search(&self, product_name: &str) -> Result<Option<ProductRecord>> {
        let search_url = self.search_url_for(product_name);
        log::debug!("Searching {} at {}", self.retailer.name, search_url);

        let client = self.ctx.client();
        let html = self
            .ctx
            .request(&self.retailer.id, || {
                fetch_text(client, &search_url, &self.headers)
            })
            .await?;

        let record = self.parse_listing(&html, product_name, &search_url);
        if record.is_none() {
            log::debug!("No listing matched on {search_url}");
        }
        Ok(record)
    }

    /// Extract the first search result from a page.
    ///
    /// Returns `None` when there is no result item, or it lacks a title or
    /// price. A missing link falls back to `search_url`.
    pub fn parse_listing(
        &self,
        html: &str,
        product_name: &str,
        search_url: &str,
    ) -> Option<ProductRecord> {
        let document = Html::parse_document(html);
        let item = document.select(&self.selectors.container).next()?;

        let title_elem = item.select(&self.selectors.title).next()?;
        let title = normalize_whitespace(&element_text(title_elem));
        if title.is_empty() {
            return None;
        }

        let price_elem = item.select(&self.selectors.price).next()?;
        let price = clean_price(&element_text(price_elem));

        let link_elem = match &self.selectors.link {
            Some(selector) => item.select(selector).next(),
            None => Some(title_elem),
        };
        let url = link_elem
            .and_then(|elem| elem.value().attr(&self.selectors.link_attr))
            .filter(|href| !href.trim().is_empty())
            .map(|href| absolute_url(&self.retailer.base_url, href))
            .unwrap_or_else(|| search_url.to_string());

        Some(ProductRecord {
            brand: self.brand_for(product_name),
            website: self.retailer.name.clone(),
            title,
            price,
            price_valid_till: String::new(),
            url,
            regular_price: None,
            sku: None,
            availability: None,
        })
    }

    fn brand_for(&self, product_name: &str) -> String {
        match &self.retailer.brand {
            Some(brand) => brand.clone(),
            None => self.ctx.brand_for(product_name),
        }
    }
}

#[async_trait]
impl SiteScraper for HtmlScraper {
    fn id(&self) -> &str {
        &self.retailer.id
    }

    fn name(&self) -> &str {
        &self.retailer.name
    }

    async fn scrape(&self, product_name: &str) -> Option<Vec<ProductRecord>> {
        self.ctx
            .read_through(&self.retailer.id, &self.retailer.name, product_name, || {
                self.search(product_name)
            })
            .await
    }
}

fn element_text(elem: ElementRef<'_>) -> String {
    elem.text().collect::<String>()
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
