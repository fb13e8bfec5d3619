use std::rc::Rc;

use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use paddock_shared::feed::{FeedAdapter, RecordSink};

use crate::api::{self, FeedMessageData};
use crate::session::GridSession;

pub const POLL_PERIOD_MS: u32 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedConnection {
    Connecting,
    Connected,
    Reconnecting(String),
}

impl FeedConnection {
    pub fn label(&self) -> &'static str {
        match self {
            FeedConnection::Connecting => "Connecting",
            FeedConnection::Connected => "Connected",
            FeedConnection::Reconnecting(_) => "Reconnecting",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            FeedConnection::Connecting => "feed-chip connecting",
            FeedConnection::Connected => "feed-chip connected",
            FeedConnection::Reconnecting(_) => "feed-chip reconnecting",
        }
    }
}

/// Turns polled relay messages into adapter input, skipping messages that
/// were already delivered.
pub struct FeedPoller<S> {
    adapter: FeedAdapter<S>,
    last_id: Option<String>,
    applied: u64,
}

impl<S: RecordSink> FeedPoller<S> {
    pub fn new(sink: S) -> Self {
        FeedPoller {
            adapter: FeedAdapter::new(sink),
            last_id: None,
            applied: 0,
        }
    }

    /// Number of batches forwarded so far.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Returns true when `message` was new and its batch was forwarded.
    pub fn observe(&mut self, message: Option<FeedMessageData>) -> bool {
        let Some(message) = message else {
            return false;
        };
        if self.last_id.as_deref() == Some(message.id.as_str()) {
            return false;
        }
        self.last_id = Some(message.id.clone());

        match self.adapter.ingest_str(&message.payload) {
            Ok(count) => {
                tracing::debug!(id = %message.id, records = count, "applied feed batch");
                self.applied += 1;
                true
            }
            Err(e) => {
                tracing::warn!(id = %message.id, error = %e, "ignored feed message");
                false
            }
        }
    }
}

/// Poll the relay forever, pushing new batches into `session`. `applied`
/// follows the number of batches delivered.
pub async fn run(
    session: Rc<GridSession>,
    mut status: Signal<FeedConnection>,
    mut applied: Signal<u64>,
) {
    let mut poller = FeedPoller::new(session.sink());
    loop {
        let next = match api::fetch_latest_message().await {
            Ok(message) => {
                if poller.observe(message) {
                    applied.set(poller.applied());
                }
                FeedConnection::Connected
            }
            Err(e) => {
                tracing::warn!(error = %e, "feed poll failed");
                FeedConnection::Reconnecting(e)
            }
        };
        if *status.peek() != next {
            tracing::info!(state = next.label(), "feed connection changed");
            status.set(next);
        }
        TimeoutFuture::new(POLL_PERIOD_MS).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paddock_shared::models::EntityRecord;

    fn message(id: &str, payload: &str) -> Option<FeedMessageData> {
        Some(FeedMessageData {
            id: id.to_string(),
            payload: payload.to_string(),
            received_at: "2026-10-16T10:00:00+00:00".to_string(),
        })
    }

    fn poller() -> (FeedPoller<impl FnMut(Vec<EntityRecord>)>, Rc<std::cell::RefCell<Vec<Vec<EntityRecord>>>>) {
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink_seen = seen.clone();
        let poller = FeedPoller::new(move |batch: Vec<EntityRecord>| sink_seen.borrow_mut().push(batch));
        (poller, seen)
    }

    #[test]
    fn test_new_message_is_forwarded() {
        let (mut poller, seen) = poller();
        assert!(poller.observe(message("m1", r#"{"A":[1,1,0],"B":[-99,-99,1]}"#)));
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(seen.borrow()[0].len(), 2);
    }

    #[test]
    fn test_same_id_is_not_reapplied() {
        let (mut poller, seen) = poller();
        poller.observe(message("m1", r#"{"A":[1,1,0]}"#));
        assert!(!poller.observe(message("m1", r#"{"A":[1,1,0]}"#)));
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_applied_count_follows_forwarded_batches() {
        let (mut poller, _seen) = poller();
        assert_eq!(poller.applied(), 0);
        poller.observe(message("m1", r#"{"A":[1,1,0]}"#));
        poller.observe(message("m1", r#"{"A":[1,1,0]}"#));
        assert_eq!(poller.applied(), 1);
        poller.observe(message("m2", r#"{"A":[3,3,0]}"#));
        assert_eq!(poller.applied(), 2);
        poller.observe(message("m3", "[1,2,3]"));
        poller.observe(None);
        assert_eq!(poller.applied(), 2);
    }

    #[test]
    fn test_identical_payload_with_new_id_is_applied() {
        let (mut poller, seen) = poller();
        poller.observe(message("m1", r#"{"A":[1,1,0]}"#));
        assert!(poller.observe(message("m2", r#"{"A":[1,1,0]}"#)));
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_no_message_yet() {
        let (mut poller, seen) = poller();
        assert!(!poller.observe(None));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_non_object_payload_is_skipped_once() {
        let (mut poller, seen) = poller();
        assert!(!poller.observe(message("m1", "[1,2,3]")));
        assert!(!poller.observe(message("m1", "[1,2,3]")));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_connection_labels() {
        assert_eq!(FeedConnection::Connecting.label(), "Connecting");
        assert_eq!(FeedConnection::Connected.css_class(), "feed-chip connected");
        assert_eq!(
            FeedConnection::Reconnecting("timeout".into()).label(),
            "Reconnecting"
        );
    }
}
