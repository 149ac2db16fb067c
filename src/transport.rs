//! HTTP transport layer for delivering encoded batches

use crate::errors::{Result, ShipperError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

/// Delivery capability: one attempt to hand an encoded payload to `url`
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, url: &str, body: Vec<u8>) -> Result<()>;
}

/// reqwest-backed transport posting JSON documents
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(http_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(http_timeout)
            .user_agent(format!("log-shipper/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ShipperError::Http)?;

        Ok(Self { client })
    }

    async fn handle_response(&self, response: Response) -> Result<()> {
        let status = response.status();

        if status.is_success() {
            debug!("Batch accepted with status {}", status);
            return Ok(());
        }

        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let error_message = match status.as_u16() {
            400 => format!("Bad request: {}", error_body),
            401 => format!("Unauthorized: {}", error_body),
            403 => format!("Forbidden: {}", error_body),
            404 => format!("Endpoint not found: {}", error_body),
            413 => format!("Batch too large: {}", error_body),
            429 => format!("Rate limited: {}", error_body),
            500..=599 => format!("Server error {}: {}", status, error_body),
            _ => format!("Unexpected response {}: {}", status, error_body),
        };

        Err(ShipperError::Transport(error_message))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, url: &str, body: Vec<u8>) -> Result<()> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        self.handle_response(response).await
    }
}
