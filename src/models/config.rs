//! Application configuration structures.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::RetailerConfig;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and scraping behavior settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Response cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Per-site request quotas
    #[serde(default)]
    pub rate_limits: RateLimitConfig,

    /// Outbound proxy
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Retailer API keys by retailer id
    #[serde(default)]
    pub api_keys: BTreeMap<String, String>,

    /// Retailer definitions, in registration order
    #[serde(default = "defaults::default_retailers")]
    pub retailers: Vec<RetailerConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            let mut config = Self::default();
            config.apply_env();
            config
        })
    }

    /// Pick up `<RETAILER>_API_KEY` environment variables.
    ///
    /// Environment values win over keys from the file.
    pub fn apply_env(&mut self) {
        for retailer in &self.retailers {
            let var = format!("{}_API_KEY", retailer.id.to_uppercase());
            if let Ok(key) = std::env::var(&var) {
                if !key.trim().is_empty() {
                    self.api_keys.insert(retailer.id.clone(), key);
                }
            }
        }
    }

    /// API key configured for a retailer, if any.
    pub fn api_key(&self, retailer_id: &str) -> Option<&str> {
        self.api_keys.get(retailer_id).map(String::as_str)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.user_agent.trim().is_empty() {
            return Err(AppError::config("scraper.user_agent is empty"));
        }
        if self.scraper.timeout_secs == 0 {
            return Err(AppError::config("scraper.timeout_secs must be > 0"));
        }
        if self.scraper.max_concurrent == 0 {
            return Err(AppError::config("scraper.max_concurrent must be > 0"));
        }
        if self.cache.duration_secs == 0 {
            return Err(AppError::config("cache.duration_secs must be > 0"));
        }
        if self.proxy.enabled && self.proxy.urls.is_empty() {
            return Err(AppError::config("proxy.enabled is set but proxy.urls is empty"));
        }

        let tiers = std::iter::once(("default", &self.rate_limits.default)).chain(
            self.rate_limits
                .sites
                .iter()
                .map(|(site, tier)| (site.as_str(), tier)),
        );
        for (site, tier) in tiers {
            if tier.requests == 0 || tier.period == 0 {
                return Err(AppError::config(format!(
                    "rate_limits.{site} needs requests > 0 and period > 0"
                )));
            }
        }

        if self.retailers.is_empty() {
            return Err(AppError::config("No retailers defined"));
        }
        let mut seen = HashSet::new();
        for retailer in &self.retailers {
            if !seen.insert(retailer.id.as_str()) {
                return Err(AppError::config(format!(
                    "Duplicate retailer id '{}'",
                    retailer.id
                )));
            }
            if retailer.id.eq_ignore_ascii_case("all") {
                return Err(AppError::config("Retailer id 'all' is reserved"));
            }
            match (&retailer.selectors, &retailer.graphql) {
                (Some(_), None) => {
                    if !retailer.search_path.contains("{query}") {
                        return Err(AppError::config(format!(
                            "Retailer '{}' search_path has no {{query}} placeholder",
                            retailer.id
                        )));
                    }
                }
                (None, Some(_)) => {}
                _ => {
                    return Err(AppError::config(format!(
                        "Retailer '{}' needs exactly one of selectors or graphql",
                        retailer.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Look up a retailer by id (case-insensitive).
    pub fn retailer(&self, id: &str) -> Option<&RetailerConfig> {
        self.retailers
            .iter()
            .find(|r| r.id.eq_ignore_ascii_case(id))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scraper: ScraperConfig::default(),
            cache: CacheConfig::default(),
            paths: PathsConfig::default(),
            rate_limits: RateLimitConfig::default(),
            proxy: ProxyConfig::default(),
            api_keys: BTreeMap::new(),
            retailers: defaults::default_retailers(),
        }
    }
}

/// HTTP client and scraping behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Extra attempts after a connect or timeout failure
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Delay between attempts in seconds
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_secs: u64,

    /// Maximum requests in flight across all retailers
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Brands recognised in product names, in priority order
    #[serde(default = "defaults::brands")]
    pub brands: Vec<String>,

    /// Drop records that fail price/field validation
    #[serde(default)]
    pub validate_results: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_retries: defaults::max_retries(),
            retry_delay_secs: defaults::retry_delay(),
            max_concurrent: defaults::max_concurrent(),
            brands: defaults::brands(),
            validate_results: false,
        }
    }
}

/// Response cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "defaults::cache_enabled")]
    pub enabled: bool,

    /// Entry lifetime in seconds
    #[serde(default = "defaults::cache_duration")]
    pub duration_secs: u64,

    /// Directory holding one JSON file per entry
    #[serde(default = "defaults::cache_dir")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::cache_enabled(),
            duration_secs: defaults::cache_duration(),
            dir: defaults::cache_dir(),
        }
    }
}

/// Output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory for saved result files
    #[serde(default = "defaults::results_dir")]
    pub results_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            results_dir: defaults::results_dir(),
        }
    }
}

/// Sliding-window quota for one site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTier {
    /// Requests allowed per window
    pub requests: usize,

    /// Window length in seconds
    pub period: u64,
}

impl RateTier {
    pub const fn new(requests: usize, period: u64) -> Self {
        Self { requests, period }
    }
}

/// Per-site rate limits with a fallback tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Tier for sites without their own entry
    #[serde(default = "defaults::default_tier")]
    pub default: RateTier,

    /// Tiers keyed by retailer id
    #[serde(flatten)]
    pub sites: BTreeMap<String, RateTier>,
}

impl RateLimitConfig {
    /// Tier for a site, falling back to the default tier.
    pub fn tier(&self, site: &str) -> RateTier {
        self.sites.get(site).copied().unwrap_or(self.default)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            default: defaults::default_tier(),
            sites: defaults::site_tiers(),
        }
    }
}

/// Outbound proxy settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Proxy URLs; the first one is used
    #[serde(default)]
    pub urls: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

mod defaults {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use super::RateTier;
    use crate::models::{GraphqlEndpoint, HtmlSelectors, QueryMode, RetailerConfig};

    // Scraper defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn max_retries() -> u32 {
        3
    }
    pub fn retry_delay() -> u64 {
        5
    }
    pub fn max_concurrent() -> usize {
        3
    }
    pub fn brands() -> Vec<String> {
        vec!["Samsung".into(), "LG".into(), "Hisense".into(), "SONY".into()]
    }

    // Cache defaults
    pub fn cache_enabled() -> bool {
        true
    }
    pub fn cache_duration() -> u64 {
        3600
    }
    pub fn cache_dir() -> PathBuf {
        PathBuf::from("data/cache")
    }

    // Path defaults
    pub fn results_dir() -> PathBuf {
        PathBuf::from("data/results")
    }

    // Rate limit defaults
    pub fn default_tier() -> RateTier {
        RateTier::new(5, 60)
    }
    pub fn site_tiers() -> BTreeMap<String, RateTier> {
        BTreeMap::from([
            ("bestbuy".to_string(), RateTier::new(10, 60)),
            ("amazon".to_string(), RateTier::new(5, 60)),
            ("costco".to_string(), RateTier::new(8, 60)),
        ])
    }

    fn html(
        id: &str,
        name: &str,
        base_url: &str,
        search_path: &str,
        selectors: HtmlSelectors,
    ) -> RetailerConfig {
        RetailerConfig {
            id: id.into(),
            name: name.into(),
            base_url: base_url.into(),
            search_path: search_path.into(),
            brand: None,
            query: QueryMode::FullName,
            headers: BTreeMap::new(),
            selectors: Some(selectors),
            graphql: None,
        }
    }

    // Retailer defaults
    pub fn default_retailers() -> Vec<RetailerConfig> {
        let visions = html(
            "visions",
            "Visions",
            "https://www.visions.ca",
            "/catalogsearch/result?q={query}",
            HtmlSelectors::new(
                "li.item.product.product-item",
                "a.product-item-link",
                "span.price",
                None,
            ),
        );

        let canadiantire = html(
            "canadiantire",
            "Canadian Tire",
            "https://www.canadiantire.ca",
            "/en/search-results?q={query}",
            HtmlSelectors::new(
                "div.product-tile",
                "h3.product-tile__title",
                "span.price__amount",
                Some("a.product-tile__link"),
            ),
        );

        let mut bestbuy = html(
            "bestbuy",
            "Best Buy",
            "https://www.bestbuy.ca",
            "/en-ca/search?search={query}",
            HtmlSelectors::new(
                "div.x-productListItem",
                "div.productItemName_3IZ3c",
                "span.price_FHDfG.large_3gQAp",
                Some("a.link_3hcyN"),
            ),
        );
        bestbuy.query = QueryMode::ModelNumber;

        let mut amazon = html(
            "amazon",
            "Amazon",
            "https://www.amazon.ca",
            "/s?k={query}",
            HtmlSelectors::new(
                r#"div[data-component-type="s-search-result"]"#,
                "h2.a-size-mini",
                "span.a-price-whole",
                Some("a.a-link-normal.s-no-outline"),
            ),
        );
        amazon.headers = BTreeMap::from([
            (
                "Accept".to_string(),
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                    .to_string(),
            ),
            ("Accept-Language".to_string(), "en-US,en;q=0.5".to_string()),
            ("Accept-Encoding".to_string(), "gzip, deflate, br".to_string()),
            ("DNT".to_string(), "1".to_string()),
            ("Connection".to_string(), "keep-alive".to_string()),
            ("Upgrade-Insecure-Requests".to_string(), "1".to_string()),
        ]);

        let londondrugs = RetailerConfig {
            id: "londondrugs".into(),
            name: "London Drugs".into(),
            base_url: "https://www.londondrugs.com".into(),
            search_path: "/search?q={query}".into(),
            brand: None,
            query: QueryMode::FullName,
            headers: BTreeMap::new(),
            selectors: None,
            graphql: Some(GraphqlEndpoint {
                url: "https://www.londondrugs.com/graphql".into(),
                product_path: "/{url_key}.html".into(),
                store: Some("default".into()),
            }),
        };

        let tanguay = html(
            "tanguay",
            "Tanguay",
            "https://www.tanguay.ca",
            "/en/search?q={query}",
            HtmlSelectors::new(
                "div.product-item",
                "h3.product-name",
                "span.price",
                Some("a.product-link"),
            ),
        );

        let mut lg = html(
            "lg",
            "LG",
            "https://www.lg.com/ca_en",
            "/search/search-all?search={query}",
            HtmlSelectors::new(
                "div.product-item",
                "h2.product-name",
                "span.price-new",
                Some("a.product-link"),
            ),
        );
        lg.brand = Some("LG".into());

        vec![
            visions,
            canadiantire,
            bestbuy,
            amazon,
            londondrugs,
            tanguay,
            lg,
        ]
    }
}
