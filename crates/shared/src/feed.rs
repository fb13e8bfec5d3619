//! Position feed adapter.
//!
//! Turns raw feed messages (`{"cow1": [x, y, status], ...}`) into
//! [`EntityRecord`]s and hands every batch to a [`RecordSink`].
use serde_json::Value;

use crate::models::{EntityRecord, GridPos, Status};

/// Why a whole feed message was dropped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FeedError {
    #[error("feed payload is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("feed payload is not an object")]
    NotAnObject,
}

/// Receiver of normalized batches.
pub trait RecordSink {
    fn accept(&mut self, records: Vec<EntityRecord>);
}

impl<F: FnMut(Vec<EntityRecord>)> RecordSink for F {
    fn accept(&mut self, records: Vec<EntityRecord>) {
        self(records)
    }
}

/// Integral numbers only; `3.0` counts, `3.5` does not. Values beyond
/// `i64` saturate.
fn integral(value: &Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    if value.as_u64().is_some() {
        return Some(i64::MAX);
    }
    let f = value.as_f64()?;
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

/// Out-of-domain positions are kept; only the `i32` range is enforced, by
/// saturation.
fn coordinate(value: &Value) -> Option<i32> {
    integral(value).map(|v| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
}

/// Normalize a single `id -> [x, y, status]` entry.
fn normalize_entry(id: &str, value: &Value) -> Option<EntityRecord> {
    let arr = value.as_array().filter(|a| a.len() >= 3)?;
    let x = coordinate(&arr[0])?;
    let y = coordinate(&arr[1])?;
    let code = integral(&arr[2])?;
    Some(EntityRecord {
        id: id.to_string(),
        position: GridPos::new(x, y),
        status: Status::from_code(code),
    })
}

/// Normalize a decoded feed message.
///
/// Malformed entries are logged and skipped; the rest of the batch survives.
pub fn normalize(raw: &Value) -> Result<Vec<EntityRecord>, FeedError> {
    let map = raw.as_object().ok_or(FeedError::NotAnObject)?;
    let mut records = Vec::with_capacity(map.len());
    for (id, value) in map {
        match normalize_entry(id, value) {
            Some(record) => {
                tracing::debug!(
                    id = %record.id,
                    x = record.position.x,
                    y = record.position.y,
                    status = %record.status,
                    "position update"
                );
                records.push(record);
            }
            None => tracing::warn!(id = %id, entry = %value, "dropping malformed feed entry"),
        }
    }
    Ok(records)
}

/// Feed adapter forwarding every normalized batch to its sink.
pub struct FeedAdapter<S> {
    latest: Vec<EntityRecord>,
    sink: S,
}

impl<S: RecordSink> FeedAdapter<S> {
    pub fn new(sink: S) -> Self {
        FeedAdapter {
            latest: Vec::new(),
            sink,
        }
    }

    /// The last batch forwarded downstream.
    pub fn latest(&self) -> &[EntityRecord] {
        &self.latest
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Ingest a decoded message. Returns the number of records forwarded.
    pub fn ingest(&mut self, raw: &Value) -> Result<usize, FeedError> {
        let records = normalize(raw).inspect_err(|e| tracing::warn!(error = %e, "dropping feed message"))?;
        tracing::info!(count = records.len(), "received feed batch");
        self.latest = records.clone();
        self.sink.accept(records);
        Ok(self.latest.len())
    }

    /// Ingest a raw message body as delivered by the transport.
    pub fn ingest_str(&mut self, body: &str) -> Result<usize, FeedError> {
        let value: Value = serde_json::from_str(body).map_err(|e| {
            tracing::error!(error = %e, "feed message JSON parsing failed");
            FeedError::InvalidJson(e.to_string())
        })?;
        self.ingest(&value)
    }
}
