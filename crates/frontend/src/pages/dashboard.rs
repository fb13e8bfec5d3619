use dioxus::prelude::*;
use paddock_shared::models::LatLng;
use paddock_shared::render::Event as GridEvent;
use paddock_shared::viewport::{Viewport, DEFAULT_ZOOM};

use crate::api;
use crate::components::feed_status::FeedStatus;
use crate::components::grid_overlay::GridOverlay;
use crate::components::map_view::{MapView, MAP_HEIGHT, MAP_WIDTH};
use crate::feed::{self, FeedConnection};
use crate::session::{GridSession, CANVAS_ID, SURFACE};

/// Map centre used until the fence has loaded.
const FALLBACK_CENTER: LatLng = LatLng {
    lat: -33.919125,
    lng: 151.229565,
};

#[component]
pub fn Dashboard(paddock_name: Option<String>) -> Element {
    // Named fence, or the first configured one
    let paddock_resource = use_resource(move || {
        let paddock_name = paddock_name.clone();
        async move {
            match paddock_name {
                Some(name) => api::fetch_paddock(&name).await,
                None => api::fetch_paddocks().await.map(|p| p.into_iter().next()),
            }
        }
    });

    let session = use_hook(|| GridSession::new(SURFACE));
    let mut viewport =
        use_signal(|| Viewport::new(FALLBACK_CENTER, DEFAULT_ZOOM, MAP_WIDTH, MAP_HEIGHT));
    let mut overlay_open = use_signal(|| false);
    let mut surface_error = use_signal(|| None::<String>);
    let connection = use_signal(|| FeedConnection::Connecting);
    let applied = use_signal(|| 0_u64);

    // Centre the map on the fence once it arrives
    use_effect(move || {
        if let Some(Ok(Some(paddock))) = &*paddock_resource.read() {
            if let Some(center) = paddock.center() {
                viewport.write().center = center;
            }
        }
    });

    // The renderer tracks the map zoom
    let zoom_session = session.clone();
    use_effect(move || {
        let zoom = viewport.read().zoom;
        zoom_session.dispatch(GridEvent::ZoomChanged(zoom as f64));
    });

    let visibility_session = session.clone();
    use_effect(move || {
        let event = if *overlay_open.read() {
            GridEvent::Opened
        } else {
            GridEvent::Closed
        };
        visibility_session.dispatch(event);
    });

    let poll_session = session.clone();
    use_future(move || feed::run(poll_session.clone(), connection, applied));

    let attach_session = session.clone();
    let on_canvas_mounted = move |_: ()| {
        if let Err(e) = attach_session.attach(CANVAS_ID) {
            tracing::error!(error = %e, "grid surface unavailable");
            surface_error.set(Some(e));
        }
    };

    let paddock = match &*paddock_resource.read() {
        Some(Ok(p)) => p.clone(),
        _ => None,
    };
    let load_error = match &*paddock_resource.read() {
        Some(Err(e)) => Some(e.clone()),
        Some(Ok(None)) => Some("No paddock configured".to_string()),
        _ => None,
    };

    rsx! {
        div { class: "app",
            div { class: "header",
                h1 { "Paddock Monitor" }
                if let Some(p) = &paddock {
                    span { class: "paddock-name", "{p.name}" }
                    button {
                        class: "open-grid",
                        onclick: move |_| overlay_open.set(true),
                        "Open grid"
                    }
                }
                FeedStatus { connection, applied }
            }

            div { class: "main",
                if let Some(p) = paddock {
                    MapView {
                        paddock: p,
                        viewport,
                        on_open: move |_| overlay_open.set(true),
                    }
                } else if let Some(e) = load_error {
                    div { class: "load-error", "Failed to load paddock: {e}" }
                } else {
                    div { class: "loading", "Loading paddock…" }
                }

                GridOverlay {
                    open: overlay_open,
                    error: surface_error,
                    on_mounted: on_canvas_mounted,
                }
            }
        }
    }
}
