use crate::core::{RawTableRow, Storage};
use crate::utils::error::{IngestError, Result};

/// A stored object together with the raw table row the load job derives from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedObject {
    pub key: String,
    pub row: RawTableRow,
}

pub fn decode_row(key: &str, data: &[u8]) -> Result<RawTableRow> {
    serde_json::from_slice(data).map_err(|source| IngestError::RowDecodeError {
        key: key.to_string(),
        source,
    })
}

/// Reads every `.json` object under `prefix` in key order. No deduplication:
/// one row per object, exactly as the bulk load sees them.
pub async fn scan_raw_prefix<S: Storage>(storage: &S, prefix: &str) -> Result<Vec<ScannedObject>> {
    let prefix = format!("{}/", prefix.trim_end_matches('/'));
    let keys = storage.list_objects(&prefix).await?;
    tracing::debug!("Found {} objects under {}", keys.len(), prefix);

    let mut scanned = Vec::with_capacity(keys.len());
    for key in keys.into_iter().filter(|k| k.ends_with(".json")) {
        let data = storage.read_object(&key).await?;
        let row = decode_row(&key, &data)?;
        scanned.push(ScannedObject { key, row });
    }

    Ok(scanned)
}
