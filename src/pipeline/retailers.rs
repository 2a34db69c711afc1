// src/pipeline/retailers.rs

//! Retailer listing.

use std::fmt::Write as _;

use crate::models::{Config, QueryMode};

/// One line per configured retailer: id, name, engine, rate tier, API key.
pub fn render_retailers(config: &Config) -> String {
    let mut out = String::new();
    for retailer in &config.retailers {
        let engine = if retailer.graphql.is_some() {
            "graphql"
        } else {
            "html"
        };
        let query = match retailer.query {
            QueryMode::FullName => "full name",
            QueryMode::ModelNumber => "model number",
        };
        let tier = config.rate_limits.tier(&retailer.id);
        let key = if config.api_key(&retailer.id).is_some() {
            ", api key set"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "{:<14} {:<18} {:<8} query by {}, {} req/{}s{}",
            retailer.id, retailer.name, engine, query, tier.requests, tier.period, key
        );
    }
    out
}
