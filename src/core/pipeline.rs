use crate::core::enricher;
use crate::core::fetcher::Fetcher;
use crate::core::writer::Writer;
use crate::core::{
    ConfigProvider, IngestedRecord, ObjectLocation, Pipeline, RatePayload, Storage,
};
use crate::utils::error::Result;

/// Fetch, stamp and store one exchange-rate snapshot.
pub struct RatePipeline<S: Storage> {
    fetcher: Fetcher,
    writer: Writer<S>,
}

impl<S: Storage> RatePipeline<S> {
    pub fn new<C: ConfigProvider>(storage: S, config: &C) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::from_config(config)?,
            writer: Writer::new(storage, config.raw_prefix()),
        })
    }

    pub fn storage(&self) -> &S {
        self.writer.storage()
    }
}

#[async_trait::async_trait]
impl<S: Storage> Pipeline for RatePipeline<S> {
    async fn extract(&self) -> Result<RatePayload> {
        self.fetcher.fetch().await
    }

    async fn transform(&self, payload: RatePayload) -> Result<IngestedRecord> {
        enricher::enrich(payload)
    }

    async fn load(&self, record: IngestedRecord) -> Result<ObjectLocation> {
        self.writer.write(&record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::utils::error::{ErrorKind, IngestError};
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl Storage for MockStorage {
        async fn create_object(&self, key: &str, data: &[u8]) -> Result<ObjectLocation> {
            let mut files = self.files.lock().await;
            if files.contains_key(key) {
                return Err(IngestError::PathCollision {
                    key: key.to_string(),
                });
            }
            files.insert(key.to_string(), data.to_vec());
            Ok(ObjectLocation {
                key: key.to_string(),
                uri: format!("mem://{}", key),
            })
        }

        async fn read_object(&self, key: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files
                .get(key)
                .cloned()
                .ok_or_else(|| IngestError::storage(key, "not found"))
        }

        async fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
            let files = self.files.lock().await;
            let mut keys: Vec<String> =
                files.keys().filter(|k| k.starts_with(prefix)).cloned().collect();
            keys.sort();
            Ok(keys)
        }
    }

    fn settings(endpoint: String) -> Settings {
        Settings {
            api_endpoint: endpoint,
            ..Settings::default()
        }
    }

    #[tokio::test]
    async fn test_extract_passes_payload_through() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/latest").query_param("from", "USD");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"base": "USD", "rates": {"EUR": 0.91}}));
        });

        let pipeline =
            RatePipeline::new(MockStorage::default(), &settings(server.url("/latest"))).unwrap();
        let payload = pipeline.extract().await.unwrap();

        api_mock.assert();
        assert_eq!(payload.0["rates"]["EUR"], serde_json::json!(0.91));
    }

    #[tokio::test]
    async fn test_transform_then_load_uses_configured_prefix() {
        let storage = MockStorage::default();
        let config = Settings {
            raw_prefix: "bronze/fx".to_string(),
            ..settings("http://127.0.0.1:9/unused".to_string())
        };
        let pipeline = RatePipeline::new(storage.clone(), &config).unwrap();

        let record = pipeline
            .transform(RatePayload(serde_json::json!({"base": "USD"})))
            .await
            .unwrap();
        let location = pipeline.load(record).await.unwrap();

        assert!(location.key.starts_with("bronze/fx/"));
        assert!(location.key.ends_with("Z.json"));
        assert_eq!(storage.list_objects("bronze/fx/").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transform_surfaces_shape_errors() {
        let pipeline =
            RatePipeline::new(MockStorage::default(), &settings("http://test.com".to_string()))
                .unwrap();

        let err = pipeline
            .transform(RatePayload(serde_json::json!(["USD"])))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnexpectedPayloadShape);
    }
}
