use crate::core::{IngestedRecord, ObjectLocation, Storage};
use crate::domain::model::format_timestamp;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};

pub const DEFAULT_RAW_PREFIX: &str = "raw/exchange_rates";

/// Object key for a record ingested at `at`.
pub fn object_key(prefix: &str, at: &DateTime<Utc>) -> String {
    format!("{}/{}.json", prefix.trim_end_matches('/'), format_timestamp(at))
}

pub struct Writer<S: Storage> {
    storage: S,
    prefix: String,
}

impl<S: Storage> Writer<S> {
    pub fn new(storage: S, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            prefix: prefix.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn write(&self, record: &IngestedRecord) -> Result<ObjectLocation> {
        let key = object_key(&self.prefix, &record.ingested_at());
        let data = record.to_json_bytes()?;

        tracing::debug!("Writing {} bytes to {}", data.len(), key);
        let location = self.storage.create_object(&key, &data).await?;

        tracing::debug!("Object created at {}", location);
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::enricher::enrich_at;
    use crate::core::RatePayload;
    use crate::utils::error::{ErrorKind, IngestError};
    use chrono::TimeZone;
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    /// Bytes are staged first and only published once the whole body is
    /// accepted, like a single PutObject.
    #[derive(Clone, Default)]
    struct MockStorage {
        objects: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
        fail_after_bytes: Option<usize>,
    }

    impl MockStorage {
        fn failing_after(bytes: usize) -> Self {
            Self {
                fail_after_bytes: Some(bytes),
                ..Self::default()
            }
        }

        async fn get(&self, key: &str) -> Option<Vec<u8>> {
            self.objects.lock().await.get(key).cloned()
        }

        async fn len(&self) -> usize {
            self.objects.lock().await.len()
        }
    }

    impl Storage for MockStorage {
        async fn create_object(&self, key: &str, data: &[u8]) -> Result<ObjectLocation> {
            let mut objects = self.objects.lock().await;
            if objects.contains_key(key) {
                return Err(IngestError::PathCollision {
                    key: key.to_string(),
                });
            }

            let mut staged = Vec::new();
            for chunk in data.chunks(8) {
                if let Some(limit) = self.fail_after_bytes {
                    if staged.len() + chunk.len() > limit {
                        return Err(IngestError::storage(key, "connection reset mid-upload"));
                    }
                }
                staged.extend_from_slice(chunk);
            }

            objects.insert(key.to_string(), staged);
            Ok(ObjectLocation {
                key: key.to_string(),
                uri: format!("mem://{}", key),
            })
        }

        async fn read_object(&self, key: &str) -> Result<Vec<u8>> {
            self.get(key)
                .await
                .ok_or_else(|| IngestError::storage(key, "no such object"))
        }

        async fn list_objects(&self, prefix: &str) -> Result<Vec<String>> {
            let objects = self.objects.lock().await;
            Ok(objects
                .keys()
                .filter(|k| k.starts_with(prefix))
                .cloned()
                .collect())
        }
    }

    fn record_at(secs: u32, micros: u32) -> IngestedRecord {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, secs).unwrap()
            + chrono::Duration::microseconds(micros as i64);
        enrich_at(
            RatePayload(serde_json::json!({"base": "USD", "rates": {"EUR": 0.91}})),
            at,
        )
        .unwrap()
    }

    #[test]
    fn test_object_key_layout() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();

        assert_eq!(
            object_key(DEFAULT_RAW_PREFIX, &at),
            "raw/exchange_rates/2024-03-09T07:05:01.000000Z.json"
        );
        assert_eq!(
            object_key("bronze/fx/", &at),
            "bronze/fx/2024-03-09T07:05:01.000000Z.json"
        );
    }

    #[tokio::test]
    async fn test_write_stores_serialized_record() {
        let storage = MockStorage::default();
        let writer = Writer::new(storage.clone(), DEFAULT_RAW_PREFIX);
        let record = record_at(1, 0);

        let location = writer.write(&record).await.unwrap();

        assert_eq!(location.key, "raw/exchange_rates/2024-01-01T00:00:01.000000Z.json");
        let stored: serde_json::Value =
            serde_json::from_slice(&storage.get(&location.key).await.unwrap()).unwrap();
        assert_eq!(
            stored,
            serde_json::json!({
                "base": "USD",
                "rates": {"EUR": 0.91},
                "ingestion_timestamp": "2024-01-01T00:00:01.000000Z"
            })
        );
    }

    #[tokio::test]
    async fn test_same_instant_collides_instead_of_overwriting() {
        let storage = MockStorage::default();
        let writer = Writer::new(storage.clone(), DEFAULT_RAW_PREFIX);

        let first = writer.write(&record_at(1, 0)).await.unwrap();
        let before = storage.get(&first.key).await.unwrap();

        let mut second = record_at(1, 0);
        second
            .fields
            .insert("base".to_string(), serde_json::json!("EUR"));
        let err = writer.write(&second).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::PathCollision);
        assert_eq!(storage.get(&first.key).await.unwrap(), before);
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn test_same_second_distinct_micros_get_distinct_keys() {
        let storage = MockStorage::default();
        let writer = Writer::new(storage.clone(), DEFAULT_RAW_PREFIX);

        let a = writer.write(&record_at(1, 10)).await.unwrap();
        let b = writer.write(&record_at(1, 11)).await.unwrap();

        assert_ne!(a.key, b.key);
        assert_eq!(storage.len().await, 2);
    }

    #[tokio::test]
    async fn test_mid_write_failure_leaves_nothing_behind() {
        let storage = MockStorage::failing_after(16);
        let writer = Writer::new(storage.clone(), DEFAULT_RAW_PREFIX);
        let record = record_at(2, 0);

        let err = writer.write(&record).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
        let key = object_key(DEFAULT_RAW_PREFIX, &record.ingested_at());
        assert!(storage.get(&key).await.is_none());
        assert!(storage.list_objects("raw/").await.unwrap().is_empty());
    }
}
