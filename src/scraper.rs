use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::utils::error::{AppError, Result};

/// Builds the HTTP client shared by page fetches and notifications.
pub fn build_client(config: &AppConfig) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

/// Downloads product pages.
///
/// No retries: a transport error is returned to the caller as-is. A non-2xx
/// status is logged and the body is still returned, since error pages are
/// scanned like any other page.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, url: &str, headers: &BTreeMap<String, String>) -> Result<String> {
        let start_time = Instant::now();

        let response = self
            .client
            .get(url)
            .headers(header_map(headers)?)
            .send()
            .await?;

        let status = response.status();
        let final_url = response.url().to_string();
        let body = response.bytes().await?;

        debug!(
            "Fetched {} ({} bytes, status {}) in {}ms",
            final_url,
            body.len(),
            status.as_u16(),
            start_time.elapsed().as_millis()
        );
        if !status.is_success() {
            warn!("{} returned status {}", url, status);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

fn header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| AppError::Validation(format!("Invalid header name {:?}: {}", name, e)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| AppError::Validation(format!("Invalid value for header {}: {}", name, e)))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
