use crate::core::{ConfigProvider, RatePayload};
use crate::utils::error::{IngestError, Result};
use reqwest::Client;
use std::time::Duration;

/// Single GET against the rates API. No retries and no caching.
pub struct Fetcher {
    client: Client,
    endpoint: String,
    query: Vec<(String, String)>,
}

impl Fetcher {
    pub fn new(endpoint: impl Into<String>, query: Vec<(String, String)>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            query,
        }
    }

    pub fn with_timeout(
        endpoint: impl Into<String>,
        query: Vec<(String, String)>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| IngestError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            query,
        })
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let query = config.query_params().to_vec();
        match config.request_timeout() {
            Some(timeout) => Self::with_timeout(config.api_endpoint(), query, timeout),
            None => Ok(Self::new(config.api_endpoint(), query)),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn fetch(&self) -> Result<RatePayload> {
        tracing::debug!("Making API request to: {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query)
            .send()
            .await
            .map_err(|e| IngestError::upstream(format!("request failed: {}", e)))?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if !status.is_success() {
            return Err(IngestError::upstream(format!("upstream returned {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| IngestError::upstream(format!("failed to read response body: {}", e)))?;

        let value: serde_json::Value =
            serde_json::from_slice(&body).map_err(IngestError::MalformedResponse)?;

        tracing::debug!("Fetched {} byte payload", body.len());
        Ok(RatePayload(value))
    }
}
