//! Latest-wins relay for position messages.
//!
//! Publishers post raw JSON batches; readers only ever see the newest one.
//! Nothing is queued and nothing is persisted.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use paddock_shared::{feed, models::EntityRecord};
use tokio::sync::watch;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct FeedMessage {
    /// Fresh per publish, so identical payloads are still seen as new.
    pub id: Uuid,
    pub payload: serde_json::Value,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedStats {
    pub received: u64,
    pub rejected: u64,
    pub last_received_at: Option<DateTime<Utc>>,
}

pub struct FeedHub {
    topic: String,
    latest: watch::Sender<Option<Arc<FeedMessage>>>,
    received: AtomicU64,
    rejected: AtomicU64,
}

impl FeedHub {
    pub fn new(topic: impl Into<String>) -> Arc<Self> {
        let (latest, _) = watch::channel(None);
        Arc::new(FeedHub {
            topic: topic.into(),
            latest,
            received: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Parse and store a message body, superseding the previous message.
    pub fn publish(&self, body: &str) -> Result<Arc<FeedMessage>, String> {
        let payload: serde_json::Value = serde_json::from_str(body).map_err(|e| {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(topic = %self.topic, error = %e, "rejected feed message: invalid JSON");
            format!("Invalid JSON payload: {}", e)
        })?;
        if !payload.is_object() {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(topic = %self.topic, "rejected feed message: not a JSON object");
            return Err("Payload must be a JSON object of id -> [x, y, status]".to_string());
        }

        let message = Arc::new(FeedMessage {
            id: Uuid::new_v4(),
            payload,
            received_at: Utc::now(),
        });
        self.received.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            topic = %self.topic,
            id = %message.id,
            bytes = body.len(),
            "received feed message"
        );
        self.latest.send_replace(Some(message.clone()));
        Ok(message)
    }

    pub fn latest(&self) -> Option<Arc<FeedMessage>> {
        self.latest.borrow().clone()
    }

    /// Normalized view of the latest message, for introspection.
    pub fn latest_batch(&self) -> Vec<EntityRecord> {
        let Some(message) = self.latest() else {
            return Vec::new();
        };
        feed::normalize(&message.payload).unwrap_or_else(|e| {
            tracing::warn!(id = %message.id, error = %e, "latest message has no batch");
            Vec::new()
        })
    }

    pub fn stats(&self) -> FeedStats {
        FeedStats {
            received: self.received.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            last_received_at: self.latest().map(|m| m.received_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_shared::models::Status;

    #[test]
    fn test_publish_and_latest() {
        let hub = FeedHub::new("NoraPublish");
        assert!(hub.latest().is_none());
        let msg = hub.publish(r#"{"A":[1,1,0]}"#).unwrap();
        assert_eq!(hub.latest().unwrap().id, msg.id);
        assert_eq!(hub.stats().received, 1);
        assert!(hub.stats().last_received_at.is_some());
    }

    #[test]
    fn test_invalid_json_is_rejected_and_keeps_latest() {
        let hub = FeedHub::new("NoraPublish");
        let first = hub.publish(r#"{"A":[1,1,0]}"#).unwrap();
        assert!(hub.publish("{oops").is_err());
        assert_eq!(hub.latest().unwrap().id, first.id);
        let stats = hub.stats();
        assert_eq!(stats.received, 1);
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn test_identical_payloads_get_new_ids() {
        let hub = FeedHub::new("NoraPublish");
        let a = hub.publish(r#"{"A":[1,1,0]}"#).unwrap();
        let b = hub.publish(r#"{"A":[1,1,0]}"#).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_latest_batch_normalizes() {
        let hub = FeedHub::new("NoraPublish");
        hub.publish(r#"{"A":[1,1,0],"B":[-99,-99,1],"C":[1]}"#).unwrap();
        let batch = hub.latest_batch();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].status, Status::Contained);
        assert!(batch[1].location_unknown());
    }

    #[test]
    fn test_non_object_is_rejected_and_keeps_latest() {
        let hub = FeedHub::new("NoraPublish");
        let first = hub.publish(r#"{"A":[1,1,0]}"#).unwrap();
        assert!(hub.publish("[1,2,3]").is_err());
        assert!(hub.publish(r#""hello""#).is_err());
        assert_eq!(hub.latest().unwrap().id, first.id);
        let stats = hub.stats();
        assert_eq!(stats.received, 1);
        assert_eq!(stats.rejected, 2);
    }
}
