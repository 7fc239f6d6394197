use crate::domain::model::{IngestedRecord, ObjectLocation, RatePayload};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Blob storage with create-only semantics.
pub trait Storage: Send + Sync {
    /// Creates `key` with `data`. Fails with `PathCollision` when the key
    /// exists and never leaves a partially written object behind.
    fn create_object(
        &self,
        key: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<ObjectLocation>> + Send;

    fn read_object(&self, key: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    /// Keys under `prefix`, sorted.
    fn list_objects(
        &self,
        prefix: &str,
    ) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn query_params(&self) -> &[(String, String)];
    fn raw_prefix(&self) -> &str;
    fn request_timeout(&self) -> Option<Duration>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<RatePayload>;
    async fn transform(&self, payload: RatePayload) -> Result<IngestedRecord>;
    async fn load(&self, record: IngestedRecord) -> Result<ObjectLocation>;
}
