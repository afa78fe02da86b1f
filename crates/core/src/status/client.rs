//! HTTP client for the order-info endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER, USER_AGENT};
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::StatusConfig;
use crate::orders::OrderRecord;

use super::types::{OrderInfoResponse, OrderStatus};
use super::{StatusChecker, StatusError};

/// Browser user agent the endpoint expects.
pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/141.0.0.0 Safari/537.36";

/// Status checker backed by the photo-service order-info API.
pub struct HttpStatusClient {
    client: Client,
    base_url: String,
    config_id: String,
}

impl HttpStatusClient {
    /// Create a new client from the status configuration.
    pub fn new(config: &StatusConfig) -> Result<Self, StatusError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .default_headers(default_headers())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            config_id: config.config_id.clone(),
        })
    }

    /// Fetch the status for a full `shop-order` key.
    pub async fn fetch(&self, order_key: &str) -> Result<OrderStatus, StatusError> {
        debug!(order_key, "Requesting order status");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("config", self.config_id.as_str()), ("fullOrderId", order_key)])
            .send()
            .await
            .map_err(StatusError::from_send)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StatusError::Http {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        let info: OrderInfoResponse = response
            .json()
            .await
            .map_err(|e| StatusError::Parse(e.to_string()))?;

        let order_status = OrderStatus::from(info);
        if order_status.is_unmapped() {
            warn!(order_key, code = %order_status.code, "Unmapped status code");
        }
        debug!(order_key, code = %order_status.code, "Order status received");
        Ok(order_status)
    }
}

#[async_trait]
impl StatusChecker for HttpStatusClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn check(&self, record: &OrderRecord) -> Result<OrderStatus, StatusError> {
        self.fetch(&record.resolved_key()).await
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9,de-DE;q=0.8,de;q=0.7"),
    );
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ORIGIN, HeaderValue::from_static("https://www.fotoparadies.de"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.fotoparadies.de/"));
    headers
}
