use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::config::ApiConfig;
use crate::error::{PipelineError, ServerErrorKind};

/// Literal `next` value the catalog API uses on its last page.
pub const TERMINATION_SENTINEL: &str = "null";

/// One page of the product catalog.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct PageEnvelope {
    #[serde(rename = "objects", default)]
    pub items: Vec<Item>,
    #[serde(rename = "next", default)]
    pub next_page_reference: Option<String>,
}

impl PageEnvelope {
    /// Endpoint of the following page, or `None` once the catalog is exhausted.
    pub fn next_endpoint(&self) -> Option<&str> {
        self.next_page_reference
            .as_deref()
            .filter(|next| *next != TERMINATION_SENTINEL)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Item {
    // Other product fields ("title", "weight", ...) are ignored.
    pub category: String,
    // Kept raw: only items of the target category have their size parsed.
    #[serde(default)]
    pub size: Option<Value>,
}

/// Item measurements in centimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub height: f64,
    pub width: f64,
    pub length: f64,
}

impl Item {
    pub fn dimensions(&self) -> Result<Dimensions, PipelineError> {
        let size = self.size.as_ref().ok_or_else(|| {
            PipelineError::MalformedData(format!("{} item has no size", self.category))
        })?;
        Ok(Dimensions {
            height: measurement(size, "height")?,
            width: measurement(size, "width")?,
            length: measurement(size, "length")?,
        })
    }
}

fn measurement(size: &Value, field: &str) -> Result<f64, PipelineError> {
    let parsed = match size.get(field) {
        Some(Value::String(raw)) => raw.trim().parse::<f64>().ok(),
        Some(Value::Number(number)) => number.as_f64(),
        _ => None,
    };
    parsed
        .filter(|value| value.is_finite() && *value >= 0.0)
        .ok_or_else(|| {
            PipelineError::MalformedData(format!(
                "size.{} is not a non-negative number: {:?}",
                field,
                size.get(field)
            ))
        })
}

/// Source of catalog pages. The caller drives pagination.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, endpoint: &str) -> Result<PageEnvelope, PipelineError>;
}

/// HTTP implementation of [`PageFetcher`] backed by `reqwest`.
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(config: &ApiConfig) -> reqwest::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            format!("{}{}", self.base_url, endpoint)
        }
    }
}

#[async_trait]
impl PageFetcher for CatalogClient {
    async fn fetch(&self, endpoint: &str) -> Result<PageEnvelope, PipelineError> {
        let url = self.url_for(endpoint);
        log::debug!("Fetching catalog page: {}", url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Catalog page {} returned status {}", url, status);
            return Err(PipelineError::Server(ServerErrorKind::from_status(
                status.as_u16(),
            )));
        }

        let body = response.text().await?;
        let envelope: PageEnvelope = serde_json::from_str(&body)?;
        log::debug!(
            "Fetched {} products from {} (next: {:?})",
            envelope.items.len(),
            url,
            envelope.next_page_reference
        );
        Ok(envelope)
    }
}
