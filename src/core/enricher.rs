use crate::core::{IngestedRecord, RatePayload};
use crate::domain::model::{format_timestamp, INGESTION_TIMESTAMP_FIELD};
use crate::utils::error::{IngestError, Result};
use chrono::{DateTime, SubsecRound, Utc};
use serde_json::Value;

/// Stamps the payload with the current UTC time.
pub fn enrich(payload: RatePayload) -> Result<IngestedRecord> {
    enrich_at(payload, Utc::now())
}

/// Stamps the payload with `at`, truncated to microseconds so the stored field
/// and the object key render the same instant.
pub fn enrich_at(payload: RatePayload, at: DateTime<Utc>) -> Result<IngestedRecord> {
    let mut fields = match payload.into_inner() {
        Value::Object(fields) => fields,
        other => {
            return Err(IngestError::UnexpectedPayloadShape {
                message: format!("expected a JSON object, got {}", json_type_name(&other)),
            })
        }
    };

    if fields.contains_key(INGESTION_TIMESTAMP_FIELD) {
        return Err(IngestError::UnexpectedPayloadShape {
            message: format!("payload already contains '{}'", INGESTION_TIMESTAMP_FIELD),
        });
    }

    let ingested_at = at.trunc_subsecs(6);
    fields.insert(
        INGESTION_TIMESTAMP_FIELD.to_string(),
        Value::String(format_timestamp(&ingested_at)),
    );

    Ok(IngestedRecord {
        fields,
        ingested_at,
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
