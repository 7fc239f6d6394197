use crate::config::{parse_query_string, Settings};
use crate::utils::error::{IngestError, Result};
use crate::utils::validation::{self, Validate};
use std::env;

pub const DEFAULT_S3_REGION: &str = "ap-southeast-2";

#[derive(Debug, Clone, PartialEq)]
pub struct LambdaConfig {
    pub settings: Settings,
    pub s3_bucket: String,
    pub s3_region: String,
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any variable source, `from_env` being the usual one.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let request_timeout_secs = match lookup("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
                IngestError::InvalidConfigValueError {
                    field: "REQUEST_TIMEOUT_SECS".to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        let settings = Settings {
            api_endpoint: lookup("API_ENDPOINT").unwrap_or(defaults.api_endpoint),
            query: lookup("API_QUERY")
                .map(|q| parse_query_string(&q))
                .unwrap_or(defaults.query),
            raw_prefix: lookup("S3_PREFIX").unwrap_or(defaults.raw_prefix),
            request_timeout_secs,
        };

        Ok(Self {
            settings,
            s3_bucket: lookup("S3_BUCKET").ok_or_else(|| IngestError::MissingConfigError {
                field: "S3_BUCKET".to_string(),
            })?,
            s3_region: lookup("S3_REGION").unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
        })
    }
}

impl Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        self.settings.validate()?;
        validation::validate_s3_bucket_name("s3_bucket", &self.s3_bucket)?;
        validation::validate_aws_region("s3_region", &self.s3_region)?;

        tracing::debug!("Lambda configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::ErrorKind;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_bucket_is_required() {
        let err = LambdaConfig::from_lookup(lookup_from(&[])).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_defaults_with_bucket_only() {
        let config = LambdaConfig::from_lookup(lookup_from(&[("S3_BUCKET", "fx-raw")])).unwrap();

        assert_eq!(config.settings, Settings::default());
        assert_eq!(config.s3_region, DEFAULT_S3_REGION);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let config = LambdaConfig::from_lookup(lookup_from(&[
            ("S3_BUCKET", "fx-raw"),
            ("S3_PREFIX", "bronze/fx"),
            ("S3_REGION", "eu-west-1"),
            ("API_ENDPOINT", "https://rates.example/latest"),
            ("API_QUERY", "from=EUR&to=USD"),
            ("REQUEST_TIMEOUT_SECS", "25"),
        ]))
        .unwrap();

        assert_eq!(config.settings.raw_prefix, "bronze/fx");
        assert_eq!(config.settings.api_endpoint, "https://rates.example/latest");
        assert_eq!(config.settings.query.len(), 2);
        assert_eq!(config.settings.request_timeout_secs, Some(25));
        assert_eq!(config.s3_region, "eu-west-1");
    }

    #[test]
    fn test_bad_timeout_is_rejected() {
        let err = LambdaConfig::from_lookup(lookup_from(&[
            ("S3_BUCKET", "fx-raw"),
            ("REQUEST_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();

        assert!(matches!(err, IngestError::InvalidConfigValueError { .. }));
    }
}
