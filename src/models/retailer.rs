// src/models/retailer.rs

//! Retailer definitions: search endpoints and CSS selectors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What to send as the search query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// The product name exactly as given
    #[default]
    FullName,

    /// Only the model number extracted from the product name
    ModelNumber,
}

/// A retailer and how to query it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetailerConfig {
    /// Stable identifier, used for selection, cache keys, and rate limits
    pub id: String,

    /// Display name written to `ProductRecord::website`
    pub name: String,

    /// Site root; relative product links are prefixed with it
    pub base_url: String,

    /// Search URL path relative to `base_url`, with a `{query}` placeholder
    #[serde(default)]
    pub search_path: String,

    /// Brand to report regardless of the product name (manufacturer stores)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,

    #[serde(default)]
    pub query: QueryMode,

    /// Headers sent in addition to the User-Agent
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    /// HTML search result selectors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectors: Option<HtmlSelectors>,

    /// GraphQL endpoint, for retailers searched through an API instead of HTML
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graphql: Option<GraphqlEndpoint>,
}

impl RetailerConfig {
    /// Search URL for an already percent-encoded query.
    pub fn search_url(&self, encoded_query: &str) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.search_path.replace("{query}", encoded_query)
        )
    }
}

/// CSS selectors for the first search result.
///
/// All selectors except `container` are evaluated inside the container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HtmlSelectors {
    /// One search result item
    pub container: String,

    pub title: String,

    pub price: String,

    /// Link element; the title element is used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,

    /// Attribute holding the product URL
    #[serde(default = "default_link_attr")]
    pub link_attr: String,
}

fn default_link_attr() -> String {
    "href".to_string()
}

impl HtmlSelectors {
    pub fn new(
        container: impl Into<String>,
        title: impl Into<String>,
        price: impl Into<String>,
        link: Option<&str>,
    ) -> Self {
        Self {
            container: container.into(),
            title: title.into(),
            price: price.into(),
            link: link.map(str::to_string),
            link_attr: default_link_attr(),
        }
    }
}

/// A GraphQL product search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphqlEndpoint {
    /// Endpoint URL
    pub url: String,

    /// Path appended to `base_url` to form a product URL; `{url_key}` placeholder
    #[serde(default = "default_product_path")]
    pub product_path: String,

    /// Store view header some Magento deployments require
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
}

fn default_product_path() -> String {
    "/{url_key}.html".to_string()
}
