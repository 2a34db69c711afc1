// src/utils/http.rs

//! HTTP client utilities.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::error::{AppError, Result};
use crate::models::Config;

/// Create the shared asynchronous HTTP client.
pub fn create_async_client(config: &Config) -> Result<Client> {
    let mut builder = Client::builder()
        .user_agent(&config.scraper.user_agent)
        .timeout(Duration::from_secs(config.scraper.timeout_secs));

    if config.proxy.enabled {
        if let Some(proxy_url) = config.proxy.urls.first() {
            let mut proxy = reqwest::Proxy::all(proxy_url)?;
            if let (Some(user), Some(pass)) = (&config.proxy.username, &config.proxy.password) {
                proxy = proxy.basic_auth(user, pass);
            }
            builder = builder.proxy(proxy);
        }
    }

    Ok(builder.build()?)
}

/// Build a header map from configured name/value pairs.
pub fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AppError::config(format!("Invalid header name '{name}': {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| AppError::config(format!("Invalid value for header '{name}': {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}

/// GET a page and return its body, failing on any status but 200.
pub async fn fetch_text(client: &Client, url: &str, headers: &HeaderMap) -> Result<String> {
    let response = client.get(url).headers(headers.clone()).send().await?;
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(AppError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(response.text().await?)
}

/// POST a JSON body and decode the JSON reply, failing on any status but 200.
pub async fn post_json(
    client: &Client,
    url: &str,
    headers: &HeaderMap,
    body: &serde_json::Value,
) -> Result<serde_json::Value> {
    let response = client
        .post(url)
        .headers(headers.clone())
        .json(body)
        .send()
        .await?;
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(AppError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Run `operation`, retrying connect and timeout failures after a fixed delay.
///
/// Status and parse errors are returned immediately.
pub async fn with_retries<T, F, Fut>(max_retries: u32, delay: Duration, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < max_retries => {
                attempt += 1;
                log::warn!(
                    "Request failed ({}), retry {}/{} in {}s",
                    err,
                    attempt,
                    max_retries,
                    delay.as_secs()
                );
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_header_map() {
        let headers = BTreeMap::from([
            ("DNT".to_string(), "1".to_string()),
            ("Accept-Language".to_string(), "en-US,en;q=0.5".to_string()),
        ]);
        let map = header_map(&headers).unwrap();
        assert_eq!(map.get("dnt").unwrap(), "1");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_header_map_rejects_bad_name() {
        let headers = BTreeMap::from([("bad header".to_string(), "1".to_string())]);
        assert!(header_map(&headers).is_err());
    }

    #[test]
    fn test_create_client_with_proxy() {
        let mut config = Config::default();
        config.proxy.enabled = true;
        config.proxy.urls = vec!["http://127.0.0.1:3128".into()];
        config.proxy.username = Some("user".into());
        config.proxy.password = Some("pass".into());
        assert!(create_async_client(&config).is_ok());
    }

    #[tokio::test]
    async fn test_with_retries_does_not_retry_status() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<()> = with_retries(3, Duration::ZERO, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(AppError::Status {
                    status: 503,
                    url: "https://example.com".into(),
                })
            }
        })
        .await;
        assert!(matches!(result, Err(AppError::Status { status: 503, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_retries_passes_value() {
        let result = with_retries(3, Duration::ZERO, || async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
