use crate::utils::error::{IngestError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional settings file. Every field may be omitted; command-line flags take
/// precedence over values found here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub endpoint: Option<String>,
    /// Kept in file order.
    pub query: Option<toml::Table>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub output_path: Option<String>,
    pub prefix: Option<String>,
}

impl FileConfig {
    /// Loads and parses a TOML settings file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| IngestError::ConfigError {
            message: format!("Cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| IngestError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Query parameters in the order they appear in the file. Numbers and
    /// booleans are accepted and sent in their TOML spelling.
    pub fn query_pairs(&self) -> Result<Option<Vec<(String, String)>>> {
        let Some(query) = &self.source.query else {
            return Ok(None);
        };

        query
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    toml::Value::String(s) => s.clone(),
                    toml::Value::Integer(_) | toml::Value::Float(_) | toml::Value::Boolean(_) => {
                        value.to_string()
                    }
                    other => {
                        return Err(IngestError::InvalidConfigValueError {
                            field: format!("source.query.{}", name),
                            value: other.to_string(),
                            reason: "query values must be strings, numbers or booleans"
                                .to_string(),
                        })
                    }
                };
                Ok((name.clone(), value))
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }
}

/// Replaces `${VAR}` with the variable's value; unknown variables are left as written.
fn substitute_env_vars(content: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| IngestError::ConfigError {
        message: format!("Invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.into_owned())
}
