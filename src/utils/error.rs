use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Upstream API unavailable: {message}")]
    UpstreamUnavailable { message: String },

    #[error("Upstream response is not valid JSON: {0}")]
    MalformedResponse(#[source] serde_json::Error),

    #[error("Unexpected payload shape: {message}")]
    UnexpectedPayloadShape { message: String },

    #[error("Storage unavailable for '{key}': {message}")]
    StorageUnavailable { key: String, message: String },

    #[error("Object already exists at '{key}'")]
    PathCollision { key: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Stored object '{key}' does not match the raw table schema: {source}")]
    RowDecodeError {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

/// Error kind reported to the caller of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    UpstreamUnavailable,
    MalformedResponse,
    UnexpectedPayloadShape,
    StorageUnavailable,
    PathCollision,
    Configuration,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UpstreamUnavailable => "UpstreamUnavailable",
            ErrorKind::MalformedResponse => "MalformedResponse",
            ErrorKind::UnexpectedPayloadShape => "UnexpectedPayloadShape",
            ErrorKind::StorageUnavailable => "StorageUnavailable",
            ErrorKind::PathCollision => "PathCollision",
            ErrorKind::Configuration => "Configuration",
            ErrorKind::Internal => "Internal",
        }
    }
}

impl ErrorKind {
    /// Transient failures are worth another scheduled run; the rest need a human.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ErrorKind::UpstreamUnavailable | ErrorKind::PathCollision => ErrorSeverity::Medium,
            ErrorKind::MalformedResponse
            | ErrorKind::UnexpectedPayloadShape
            | ErrorKind::Configuration => ErrorSeverity::High,
            ErrorKind::StorageUnavailable | ErrorKind::Internal => ErrorSeverity::Critical,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Upstream,
    Payload,
    Storage,
    Configuration,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// CLI exit code: 2 retryable, 1 needs attention, 3 broken host.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl IngestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestError::UpstreamUnavailable { .. } => ErrorKind::UpstreamUnavailable,
            IngestError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            IngestError::UnexpectedPayloadShape { .. } => ErrorKind::UnexpectedPayloadShape,
            IngestError::StorageUnavailable { .. } => ErrorKind::StorageUnavailable,
            IngestError::PathCollision { .. } => ErrorKind::PathCollision,
            IngestError::ConfigError { .. }
            | IngestError::InvalidConfigValueError { .. }
            | IngestError::MissingConfigError { .. } => ErrorKind::Configuration,
            IngestError::SerializationError(_) | IngestError::RowDecodeError { .. } => {
                ErrorKind::Internal
            }
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self.kind() {
            ErrorKind::UpstreamUnavailable | ErrorKind::MalformedResponse => ErrorCategory::Upstream,
            ErrorKind::UnexpectedPayloadShape => ErrorCategory::Payload,
            ErrorKind::StorageUnavailable | ErrorKind::PathCollision => ErrorCategory::Storage,
            ErrorKind::Configuration => ErrorCategory::Configuration,
            ErrorKind::Internal => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.kind().severity()
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.kind() {
            ErrorKind::UpstreamUnavailable => {
                "Check network access to the rates API; the next scheduled run will try again"
            }
            ErrorKind::MalformedResponse => {
                "Inspect the upstream response body; the endpoint may have changed or be returning an error page"
            }
            ErrorKind::UnexpectedPayloadShape => {
                "The upstream API no longer returns a JSON object; review the endpoint configuration"
            }
            ErrorKind::StorageUnavailable => {
                "Check storage credentials, permissions and quota for the raw data location"
            }
            ErrorKind::PathCollision => "Another invocation wrote the same key; re-run the ingestion",
            ErrorKind::Configuration => "Fix the configuration value and run again",
            ErrorKind::Internal => "Report this failure together with the logs",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            IngestError::UpstreamUnavailable { .. } => {
                "Could not fetch exchange rates from the upstream API".to_string()
            }
            IngestError::MalformedResponse(_) => {
                "The upstream API returned a response that is not JSON".to_string()
            }
            IngestError::UnexpectedPayloadShape { message } => {
                format!("The upstream payload cannot be ingested: {}", message)
            }
            IngestError::StorageUnavailable { key, .. } => {
                format!("Could not store the raw object '{}'", key)
            }
            IngestError::PathCollision { key } => {
                format!("A raw object already exists at '{}'", key)
            }
            other => other.to_string(),
        }
    }

    pub(crate) fn upstream(message: impl Into<String>) -> Self {
        IngestError::UpstreamUnavailable {
            message: message.into(),
        }
    }

    pub(crate) fn storage(key: impl Into<String>, message: impl std::fmt::Display) -> Self {
        IngestError::StorageUnavailable {
            key: key.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
