#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "lambda")]
pub mod lambda;
pub mod toml_config;

use crate::core::writer::DEFAULT_RAW_PREFIX;
use crate::core::ConfigProvider;
use crate::utils::error::{IngestError, Result};
use crate::utils::validation::{self, Validate};
use std::time::Duration;

pub const DEFAULT_API_ENDPOINT: &str = "https://api.frankfurter.app/latest";
pub const DEFAULT_BASE_CURRENCY: &str = "USD";
/// Upper bound matches the longest Lambda invocation.
pub const MAX_TIMEOUT_SECS: u64 = 900;

/// Fully resolved source and layout settings for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_endpoint: String,
    pub query: Vec<(String, String)>,
    pub raw_prefix: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            query: vec![("from".to_string(), DEFAULT_BASE_CURRENCY.to_string())],
            raw_prefix: DEFAULT_RAW_PREFIX.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl ConfigProvider for Settings {
    fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }

    fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    fn raw_prefix(&self) -> &str {
        &self.raw_prefix
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_endpoint", &self.api_endpoint)?;
        validation::validate_object_prefix("raw_prefix", &self.raw_prefix)?;

        for (key, _) in &self.query {
            validation::validate_non_empty_string("query", key)?;
        }

        if let Some(secs) = self.request_timeout_secs {
            validation::validate_range("request_timeout_secs", secs, 1, MAX_TIMEOUT_SECS)?;
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}

/// Parses a single `key=value` query parameter.
pub fn parse_query_pair(pair: &str) -> Result<(String, String)> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(IngestError::InvalidConfigValueError {
            field: "query".to_string(),
            value: pair.to_string(),
            reason: "Expected key=value".to_string(),
        }),
    }
}

/// Parses a form-urlencoded query string such as `from=USD&to=EUR,GBP`.
pub fn parse_query_string(query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}
