// src/models/product.rs

//! Product queries, scraped records, and the brand-grouped listing.

use serde::{Deserialize, Serialize};

/// A product to look up, as read from an input file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductQuery {
    /// Free-text product name sent to every retailer's search
    pub name: String,
}

impl ProductQuery {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A normalized price record from one retailer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductRecord {
    /// Inferred brand, or "Unknown"
    pub brand: String,

    /// Retailer display name
    pub website: String,

    /// Product title as listed by the retailer
    pub title: String,

    /// Price with currency symbols and separators removed
    pub price: String,

    /// Promotion end date when the retailer exposes one
    #[serde(default)]
    pub price_valid_till: String,

    /// Absolute product URL, or the search URL when no link was found
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular_price: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
}

/// One line of the grouped listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListingEntry {
    #[serde(rename = "Website")]
    pub website: String,

    #[serde(rename = "Title")]
    pub title: String,

    #[serde(rename = "Price")]
    pub price: String,

    #[serde(rename = "PriceValidTill")]
    pub price_valid_till: String,

    #[serde(rename = "URL")]
    pub url: String,
}

impl From<&ProductRecord> for ListingEntry {
    fn from(record: &ProductRecord) -> Self {
        Self {
            website: record.website.clone(),
            title: record.title.clone(),
            price: record.price.clone(),
            price_valid_till: record.price_valid_till.clone(),
            url: record.url.clone(),
        }
    }
}

/// All retailer prices found for one product, keyed by brand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BrandGroup {
    #[serde(rename = "Brand")]
    pub brand: String,

    #[serde(rename = "Product")]
    pub products: Vec<ListingEntry>,
}

impl BrandGroup {
    /// Group records for one product under the brand of the first record.
    ///
    /// Returns `None` for an empty slice.
    pub fn from_records(records: &[ProductRecord]) -> Option<Self> {
        let first = records.first()?;
        Some(Self {
            brand: first.brand.clone(),
            products: records.iter().map(ListingEntry::from).collect(),
        })
    }
}
