use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field added to every ingested payload.
pub const INGESTION_TIMESTAMP_FIELD: &str = "ingestion_timestamp";

/// The upstream response body, kept as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct RatePayload(pub Value);

impl RatePayload {
    pub fn into_inner(self) -> Value {
        self.0
    }
}

/// Upstream object fields plus the ingestion timestamp.
///
/// `fields` always contains [`INGESTION_TIMESTAMP_FIELD`], rendered from
/// `ingested_at`; everything else is the upstream object untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedRecord {
    pub(crate) fields: Map<String, Value>,
    pub(crate) ingested_at: DateTime<Utc>,
}

impl IngestedRecord {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn ingested_at(&self) -> DateTime<Utc> {
        self.ingested_at
    }

    pub fn to_json_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.fields)
    }
}

/// Renders an instant the way it appears in records and object keys.
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectLocation {
    pub key: String,
    pub uri: String,
}

impl std::fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.uri)
    }
}

/// One row of the warehouse raw table, as the load job derives it from a
/// stored object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTableRow {
    pub ingestion_timestamp: DateTime<Utc>,
    #[serde(rename(deserialize = "base"))]
    pub base_currency: String,
    pub date: NaiveDate,
    pub rates: Value,
}
