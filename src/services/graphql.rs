// src/services/graphql.rs

//! Scraper for retailers searched through a Magento-style GraphQL API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, Result};
use crate::models::{GraphqlEndpoint, ProductRecord, QueryMode, RetailerConfig};
use crate::services::scraper::{ScrapeContext, SiteScraper};
use crate::utils::http::{header_map, post_json};
use crate::utils::normalize::{clean_price, extract_model_number, normalize_whitespace};
use crate::utils::{absolute_url, encode_query};

const PRODUCT_SEARCH_QUERY: &str = r#"
query ProductSearch($search: String!, $pageSize: Int!) {
  products(search: $search, pageSize: $pageSize) {
    items {
      name
      sku
      url_key
      stock_status
      price_range {
        minimum_price {
          regular_price { value currency }
          final_price { value currency }
        }
      }
    }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Option<SearchData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    products: Option<ProductPage>,
}

#[derive(Debug, Deserialize)]
struct ProductPage {
    #[serde(default)]
    items: Vec<ProductItem>,
}

#[derive(Debug, Deserialize)]
struct ProductItem {
    name: Option<String>,
    sku: Option<String>,
    url_key: Option<String>,
    stock_status: Option<String>,
    price_range: Option<PriceRange>,
}

#[derive(Debug, Deserialize)]
struct PriceRange {
    minimum_price: Option<MinimumPrice>,
}

#[derive(Debug, Deserialize)]
struct MinimumPrice {
    regular_price: Option<Money>,
    final_price: Option<Money>,
}

#[derive(Debug, Deserialize)]
struct Money {
    value: Option<serde_json::Number>,
}

impl Money {
    fn cleaned(&self) -> Option<String> {
        self.value
            .as_ref()
            .map(|v| clean_price(&v.to_string()))
            .filter(|p| !p.is_empty())
    }
}

/// GraphQL product search scraper.
pub struct GraphqlScraper {
    retailer: RetailerConfig,
    endpoint: GraphqlEndpoint,
    headers: HeaderMap,
    ctx: Arc<ScrapeContext>,
}

impl GraphqlScraper {
    pub fn new(retailer: RetailerConfig, ctx: Arc<ScrapeContext>) -> Result<Self> {
        let Some(endpoint) = retailer.graphql.clone() else {
            return Err(AppError::config(format!(
                "Retailer '{}' has no GraphQL endpoint",
                retailer.id
            )));
        };

        let mut headers = header_map(&retailer.headers)?;
        if let Some(store) = &endpoint.store {
            let value = HeaderValue::from_str(store)
                .map_err(|e| AppError::config(format!("Invalid store '{store}': {e}")))?;
            headers.insert(HeaderName::from_static("store"), value);
        }

        Ok(Self {
            retailer,
            endpoint,
            headers,
            ctx,
        })
    }

    pub fn retailer(&self) -> &RetailerConfig {
        &self.retailer
    }

    fn query_for(&self, product_name: &str) -> String {
        match self.retailer.query {
            QueryMode::FullName => product_name.to_string(),
            QueryMode::ModelNumber => extract_model_number(product_name),
        }
    }

    /// Human-facing search page, used when a product has no URL key.
    fn search_page_url(&self, query: &str) -> String {
        if self.retailer.search_path.is_empty() {
            return self.retailer.base_url.clone();
        }
        self.retailer.search_url(&encode_query(query))
    }

    async fn search(&self, product_name: &str) -> Result<Option<ProductRecord>> {
        let query = self.query_for(product_name);
        let body = json!({
            "query": PRODUCT_SEARCH_QUERY,
            "variables": { "search": query, "pageSize": 1 },
        });
        log::debug!("Querying {} for '{}'", self.endpoint.url, query);

        let client = self.ctx.client();
        let response = self
            .ctx
            .request(&self.retailer.id, || {
                post_json(client, &self.endpoint.url, &self.headers, &body)
            })
            .await?;

        self.parse_response(response, product_name, &self.search_page_url(&query))
    }

    /// Turn a search response into at most one record.
    ///
    /// GraphQL errors with no data are reported as parse errors; an empty
    /// item list or an item without name or final price is no result.
    pub fn parse_response(
        &self,
        response: serde_json::Value,
        product_name: &str,
        search_url: &str,
    ) -> Result<Option<ProductRecord>> {
        let response: SearchResponse = serde_json::from_value(response)
            .map_err(|e| AppError::parse(&self.retailer.id, e))?;

        let items = response
            .data
            .and_then(|d| d.products)
            .map(|p| p.items)
            .unwrap_or_default();

        if items.is_empty() && !response.errors.is_empty() {
            let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
            return Err(AppError::parse(&self.retailer.id, messages.join("; ")));
        }

        let Some(item) = items.into_iter().next() else {
            return Ok(None);
        };

        let title = normalize_whitespace(item.name.as_deref().unwrap_or_default());
        let prices = item.price_range.and_then(|r| r.minimum_price);
        let price = prices
            .as_ref()
            .and_then(|p| p.final_price.as_ref())
            .and_then(Money::cleaned);
        let Some(price) = price.filter(|_| !title.is_empty()) else {
            return Ok(None);
        };
        let regular_price = prices
            .as_ref()
            .and_then(|p| p.regular_price.as_ref())
            .and_then(Money::cleaned);

        let url = match item.url_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => absolute_url(
                &self.retailer.base_url,
                &self.endpoint.product_path.replace("{url_key}", key),
            ),
            None => search_url.to_string(),
        };

        Ok(Some(ProductRecord {
            brand: self.brand_for(product_name),
            website: self.retailer.name.clone(),
            title,
            price,
            price_valid_till: String::new(),
            url,
            regular_price,
            sku: item.sku,
            availability: item.stock_status.as_deref().map(availability_label),
        }))
    }

    fn brand_for(&self, product_name: &str) -> String {
        match &self.retailer.brand {
            Some(brand) => brand.clone(),
            None => self.ctx.brand_for(product_name),
        }
    }
}

#[async_trait]
impl SiteScraper for GraphqlScraper {
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

fn availability_label(stock_status: &str) -> String {
    match stock_status {
        "IN_STOCK" => "In Stock".to_string(),
        "OUT_OF_STOCK" => "Out of Stock".to_string(),
        other => other.to_string(),
    }
}
