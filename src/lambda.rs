use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client as S3Client;
use fx_ingest::core::trigger::is_http_event;
use fx_ingest::utils::{logger, validation::Validate};
use fx_ingest::{IngestEngine, Invocation, LambdaConfig, RatePipeline, S3Storage, TriggerResponse};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;

/// Clients are built per invocation and dropped with it.
async fn ingest(config: &LambdaConfig) -> TriggerResponse {
    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .region(Region::new(config.s3_region.clone()))
        .build();
    let storage = S3Storage::new(S3Client::from_conf(s3_config), config.s3_bucket.clone());

    let pipeline = match RatePipeline::new(storage, &config.settings) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            tracing::error!("❌ Failed to build pipeline: {}", e);
            return TriggerResponse::failure(&e);
        }
    };

    Invocation::received().handle(&IngestEngine::new(pipeline)).await
}

async fn function_handler(event: LambdaEvent<Value>) -> Result<Value, Error> {
    let http = is_http_event(&event.payload);
    tracing::info!(
        request_id = %event.context.request_id,
        http,
        "Exchange-rate ingestion triggered"
    );

    let response = match LambdaConfig::from_env().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => ingest(&config).await,
        Err(e) => {
            tracing::error!("❌ Configuration error: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            TriggerResponse::failure(&e)
        }
    };

    if http {
        return Ok(response.to_proxy_response());
    }

    // Scheduler rules only see success or failure of the Lambda itself.
    if response.is_success() {
        Ok(response.body_json())
    } else {
        Err(format!("ingestion failed: {}", response.body_json()).into())
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();

    run(service_fn(function_handler)).await
}
