//! End-to-end scrape runs against local mock retailers.
//!
//! Each test stands up a `wiremock` server playing one or more retailers and
//! runs the full pipeline: retailer selection, cache, rate limiting, fetch,
//! parse, grouping and saving.

use std::collections::BTreeMap;

use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use price_scraper::error::AppError;
use price_scraper::models::{
    Config, GraphqlEndpoint, HtmlSelectors, ProductQuery, QueryMode, RetailerConfig,
};
use price_scraper::pipeline::{ScrapeRequest, run_scrape};

const SAMSUNG: &str = "Samsung 65\" 4K TV - QN65Q60DAFXZC";

fn html_retailer(id: &str, name: &str, base_url: &str) -> RetailerConfig {
    RetailerConfig {
        id: id.to_string(),
        name: name.to_string(),
        base_url: base_url.to_string(),
        search_path: format!("/{id}/search?q={{query}}"),
        brand: None,
        query: QueryMode::FullName,
        headers: BTreeMap::new(),
        selectors: Some(HtmlSelectors::new(
            "div.result",
            "h2.title",
            "span.price",
            Some("a.link"),
        )),
        graphql: None,
    }
}

fn graphql_retailer(base_url: &str) -> RetailerConfig {
    RetailerConfig {
        id: "drugstore".to_string(),
        name: "Drug Store".to_string(),
        base_url: base_url.to_string(),
        search_path: "/search?q={query}".to_string(),
        brand: None,
        query: QueryMode::FullName,
        headers: BTreeMap::new(),
        selectors: None,
        graphql: Some(GraphqlEndpoint {
            url: format!("{base_url}/graphql"),
            product_path: "/{url_key}.html".to_string(),
            store: Some("default".to_string()),
        }),
    }
}

fn test_config(tmp: &TempDir, retailers: Vec<RetailerConfig>) -> Config {
    let mut config = Config::default();
    config.cache.dir = tmp.path().join("cache");
    config.paths.results_dir = tmp.path().join("results");
    config.scraper.max_retries = 0;
    config.scraper.timeout_secs = 5;
    config.retailers = retailers;
    config
}

fn request(retailer: &str, names: &[&str]) -> ScrapeRequest {
    ScrapeRequest {
        retailer: retailer.to_string(),
        products: names.iter().map(|n| ProductQuery::new(*n)).collect(),
        output: None,
        save: true,
    }
}

fn listing_page(title: &str, price: &str, href: &str) -> String {
    format!(
        r#"<html><body>
        <div class="result">
          <h2 class="title">{title}</h2>
          <span class="price">{price}</span>
          <a class="link" href="{href}">View</a>
        </div>
        </body></html>"#
    )
}

const EMPTY_PAGE: &str = "<html><body><p>Your search returned no results.</p></body></html>";

#[tokio::test]
async fn failing_retailers_are_left_out() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/alpha/search"))
        .and(query_param("q", SAMSUNG))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page("Samsung 65\" QLED 4K", "$1,299.99", "/p/qn65")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/beta/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = test_config(
        &tmp,
        vec![
            html_retailer("alpha", "Alpha", &server.uri()),
            html_retailer("beta", "Beta", &server.uri()),
            html_retailer("gamma", "Gamma", "http://127.0.0.1:1"),
        ],
    );

    let outcome = run_scrape(&config, &request("all", &[SAMSUNG])).await.unwrap();

    assert_eq!(outcome.groups.len(), 1);
    let group = &outcome.groups[0];
    assert_eq!(group.brand, "Samsung");
    assert_eq!(group.products.len(), 1);
    assert_eq!(group.products[0].website, "Alpha");
    assert_eq!(group.products[0].price, "1299.99");
    assert_eq!(group.products[0].url, format!("{}/p/qn65", server.uri()));

    let saved = outcome.saved_to.expect("results should be saved");
    let file_name = saved.file_name().unwrap().to_string_lossy().into_owned();
    assert!(file_name.starts_with("all_prices_"), "got {file_name}");
    let raw: serde_json::Value = serde_json::from_slice(&std::fs::read(&saved).unwrap()).unwrap();
    assert_eq!(raw[0]["Brand"], "Samsung");
    assert_eq!(raw[0]["Product"][0]["Website"], "Alpha");
    assert_eq!(raw[0]["Product"][0]["PriceValidTill"], "");
}

#[tokio::test]
async fn product_without_results_is_skipped() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/alpha/search"))
        .and(query_param("q", SAMSUNG))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page("Samsung 65\" QLED", "$999.99", "/p/1")),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/alpha/search"))
        .and(query_param("q", "Mystery TV"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_PAGE))
        .mount(&server)
        .await;

    let config = test_config(&tmp, vec![html_retailer("alpha", "Alpha", &server.uri())]);
    let outcome = run_scrape(&config, &request("alpha", &[SAMSUNG, "Mystery TV"]))
        .await
        .unwrap();

    assert_eq!(outcome.groups.len(), 1);
    assert_eq!(outcome.groups[0].products[0].price, "999.99");

    let saved = outcome.saved_to.unwrap();
    let file_name = saved.file_name().unwrap().to_string_lossy().into_owned();
    assert!(file_name.starts_with("alpha_prices_"), "got {file_name}");
}

#[tokio::test]
async fn second_run_is_served_from_cache() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/alpha/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page("Samsung 65\" QLED", "$1,099.00", "/p/2")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&tmp, vec![html_retailer("alpha", "Alpha", &server.uri())]);
    let mut req = request("alpha", &[SAMSUNG]);
    req.save = false;

    let first = run_scrape(&config, &req).await.unwrap();
    let second = run_scrape(&config, &req).await.unwrap();

    assert_eq!(first.groups, second.groups);
    assert_eq!(second.groups[0].products[0].price, "1099.00");
    assert!(second.saved_to.is_none());
    assert!(tmp.path().join("cache").read_dir().unwrap().count() >= 1);
}

#[tokio::test]
async fn graphql_retailer_returns_extras() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("store", "default"))
        .and(body_partial_json(
            json!({ "variables": { "search": "LG OLED65C1PUB", "pageSize": 1 } }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "products": { "items": [{
                "name": "LG 65\" OLED evo C1",
                "sku": "L7788",
                "url_key": "lg-65-oled-c1",
                "stock_status": "IN_STOCK",
                "price_range": { "minimum_price": {
                    "regular_price": { "value": 2999.99, "currency": "CAD" },
                    "final_price": { "value": 2499.99, "currency": "CAD" }
                }}
            }]}}
        })))
        .mount(&server)
        .await;

    let config = test_config(&tmp, vec![graphql_retailer(&server.uri())]);
    let mut req = request("drugstore", &["LG OLED65C1PUB"]);
    req.save = false;

    let outcome = run_scrape(&config, &req).await.unwrap();
    let entry = &outcome.groups[0].products[0];
    assert_eq!(outcome.groups[0].brand, "LG");
    assert_eq!(entry.website, "Drug Store");
    assert_eq!(entry.price, "2499.99");
    assert_eq!(entry.url, format!("{}/lg-65-oled-c1.html", server.uri()));
}

#[tokio::test]
async fn unknown_retailer_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let config = test_config(&tmp, vec![html_retailer("alpha", "Alpha", "http://127.0.0.1:9")]);

    let err = run_scrape(&config, &request("walmart", &[SAMSUNG])).await.unwrap_err();
    assert!(matches!(err, AppError::UnknownRetailer { .. }));
    assert!(err.to_string().contains("alpha, all"));
}

#[tokio::test]
async fn explicit_output_path_is_used() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/alpha/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EMPTY_PAGE))
        .mount(&server)
        .await;

    let config = test_config(&tmp, vec![html_retailer("alpha", "Alpha", &server.uri())]);
    let output = tmp.path().join("custom/out.json");
    let mut req = request("alpha", &[SAMSUNG]);
    req.output = Some(output.clone());

    let outcome = run_scrape(&config, &req).await.unwrap();
    assert!(outcome.groups.is_empty());
    assert_eq!(outcome.saved_to.as_deref(), Some(output.as_path()));
    assert_eq!(std::fs::read_to_string(&output).unwrap().trim(), "[]");
}
