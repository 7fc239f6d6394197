use crate::core::{ObjectLocation, Storage};
use crate::utils::error::{IngestError, Result};
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::Client as S3Client;

#[derive(Debug, Clone)]
pub struct S3Storage {
    client: S3Client,
    bucket: String,
}

impl S3Storage {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    fn uri(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }
}

/// S3 answers a failed `If-None-Match: *` with 412, or 409 when a concurrent
/// conditional write to the same key is still in flight.
fn is_conditional_conflict(status: Option<u16>, code: Option<&str>) -> bool {
    matches!(status, Some(412) | Some(409))
        || matches!(code, Some("PreconditionFailed") | Some("ConditionalRequestConflict"))
}

impl Storage for S3Storage {
    async fn create_object(&self, key: &str, data: &[u8]) -> Result<ObjectLocation> {
        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("application/json")
            .if_none_match("*")
            .body(data.to_vec().into())
            .send()
            .await;

        match result {
            Ok(_output) => Ok(ObjectLocation {
                key: key.to_string(),
                uri: self.uri(key),
            }),
            Err(err) => {
                let status = err.raw_response().map(|r| r.status().as_u16());
                let code = err.as_service_error().and_then(|e| e.code());
                if is_conditional_conflict(status, code) {
                    tracing::warn!("Object already exists at {}", self.uri(key));
                    return Err(IngestError::PathCollision {
                        key: key.to_string(),
                    });
                }
                Err(IngestError::storage(key, DisplayErrorContext(&err)))
            }
        }
    }

    async fn read_object(&self, key: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| IngestError::storage(key, DisplayErrorContext(&e)))?;

        let data = resp
            .body
            .collect()
            .await
            .map_err(|e| IngestError::storage(key, e))?;

        Ok(data.into_bytes().to_vec())
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| IngestError::storage(prefix, DisplayErrorContext(&e)))?;
            keys.extend(page.contents().iter().filter_map(|o| o.key().map(str::to_string)));
        }

        keys.sort();
        Ok(keys)
    }
}
