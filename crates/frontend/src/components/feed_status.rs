use dioxus::prelude::*;

use crate::api;
use crate::feed::FeedConnection;

#[component]
pub fn FeedStatus(connection: Signal<FeedConnection>, applied: Signal<u64>) -> Element {
    // Refresh relay counters on every delivered batch and connection change.
    let relay = use_resource(move || {
        let _ = connection.read();
        let _ = applied.read();
        api::fetch_feed_status()
    });

    let state = connection.read().clone();
    let label = state.label();
    let class = state.css_class();
    let detail = match &state {
        FeedConnection::Reconnecting(e) => e.clone(),
        _ => String::new(),
    };

    rsx! {
        div { class: "feed-status",
            span { class: class, title: "{detail}", "{label}" }
            if let Some(Ok(status)) = &*relay.read() {
                span { class: "feed-topic", "/{status.topic}" }
                span { class: "feed-count",
                    "{status.messages_received} received, {status.messages_rejected} rejected"
                }
            }
        }
    }
}
