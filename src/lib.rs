// src/lib.rs

//! Price Scraper Library
//!
//! Searches retailer sites for TV models and collects the first listing's
//! title, price and link from each, grouped by brand.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
