use crate::core::{ObjectLocation, Pipeline};
use crate::utils::error::Result;

/// Runs the three pipeline stages in order; the first failure ends the run.
pub struct IngestEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> IngestEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self) -> Result<ObjectLocation> {
        tracing::info!("Starting ingestion");

        tracing::debug!("Fetching rates...");
        let payload = self.pipeline.extract().await?;

        tracing::debug!("Enriching payload...");
        let record = self.pipeline.transform(payload).await?;
        tracing::debug!("Record stamped at {}", record.ingested_at());

        tracing::debug!("Writing raw object...");
        let location = self.pipeline.load(record).await?;
        tracing::info!("Raw object saved to: {}", location);

        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{IngestedRecord, RatePayload};
    use crate::utils::error::{ErrorKind, IngestError};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingPipeline {
        fail_extract: bool,
        transforms: AtomicUsize,
        loads: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl Pipeline for CountingPipeline {
        async fn extract(&self) -> Result<RatePayload> {
            if self.fail_extract {
                return Err(IngestError::upstream("503 Service Unavailable"));
            }
            Ok(RatePayload(serde_json::json!({"base": "USD"})))
        }

        async fn transform(&self, payload: RatePayload) -> Result<IngestedRecord> {
            self.transforms.fetch_add(1, Ordering::SeqCst);
            crate::core::enricher::enrich(payload)
        }

        async fn load(&self, record: IngestedRecord) -> Result<ObjectLocation> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            let key = format!("raw/{}.json", record.ingested_at().timestamp_micros());
            Ok(ObjectLocation {
                uri: format!("mem://{}", key),
                key,
            })
        }
    }

    #[tokio::test]
    async fn test_run_executes_each_stage_once() {
        let engine = IngestEngine::new(CountingPipeline::default());

        let location = engine.run().await.unwrap();

        assert!(location.key.starts_with("raw/"));
        assert_eq!(engine.pipeline().transforms.load(Ordering::SeqCst), 1);
        assert_eq!(engine.pipeline().loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_stops_at_first_failure() {
        let engine = IngestEngine::new(CountingPipeline {
            fail_extract: true,
            ..CountingPipeline::default()
        });

        let err = engine.run().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert_eq!(engine.pipeline().transforms.load(Ordering::SeqCst), 0);
        assert_eq!(engine.pipeline().loads.load(Ordering::SeqCst), 0);
    }
}
