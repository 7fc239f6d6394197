pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliSettings;

#[cfg(feature = "lambda")]
pub use crate::adapters::storage::S3Storage;
#[cfg(feature = "lambda")]
pub use crate::config::lambda::LambdaConfig;

pub use crate::adapters::storage::LocalStorage;
pub use crate::config::Settings;
pub use crate::core::{
    etl::IngestEngine,
    pipeline::RatePipeline,
    trigger::{handle, Invocation, InvocationState, TriggerBody, TriggerResponse},
};
pub use crate::domain::model::{IngestedRecord, ObjectLocation, RatePayload, RawTableRow};
pub use crate::utils::error::{ErrorKind, IngestError, Result};
