// src/models/validation.rs

//! Sanity checks for scraped product records.
//!
//! Nothing in the scrape path calls these automatically; the orchestrator
//! applies them only when `scraper.validate_results` is set.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::ProductRecord;
use crate::utils::normalize::clean_price;

/// Upper bound (exclusive) for a plausible TV price.
const MAX_PRICE: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// A record that failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid price format or value: {price:?}")]
    InvalidPrice { price: String },
}

/// Whether `price` parses as a decimal in the open interval (0, 100000).
///
/// Currency symbols and separators are ignored; more than one decimal point
/// is malformed.
pub fn validate_price(price: &str) -> bool {
    let cleaned = clean_price(price);
    if cleaned.matches('.').count() > 1 {
        return false;
    }
    Decimal::from_str(cleaned.trim_end_matches('.'))
        .map(|value| value > Decimal::ZERO && value < MAX_PRICE)
        .unwrap_or(false)
}

/// Check required fields and the price range.
pub fn validate_record(record: &ProductRecord) -> Result<(), ValidationError> {
    let required = [
        ("brand", &record.brand),
        ("website", &record.website),
        ("title", &record.title),
        ("price", &record.price),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField { field });
        }
    }

    if !validate_price(&record.price) {
        return Err(ValidationError::InvalidPrice {
            price: record.price.clone(),
        });
    }
    Ok(())
}
