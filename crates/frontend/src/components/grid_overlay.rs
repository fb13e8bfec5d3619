use dioxus::prelude::*;

use crate::session::{CANVAS_ID, SURFACE};

/// The grid canvas stays mounted while closed so the session keeps its
/// surface; closing only hides it.
#[component]
pub fn GridOverlay(
    open: Signal<bool>,
    error: Signal<Option<String>>,
    on_mounted: EventHandler<()>,
) -> Element {
    let style = if *open.read() { "" } else { "display:none;" };
    let width = SURFACE.width;
    let height = SURFACE.height;

    rsx! {
        div { class: "grid-overlay", style: "{style}",
            div { class: "grid-overlay-header",
                h3 { "Paddock grid" }
                button {
                    class: "close-button",
                    onclick: move |_| open.set(false),
                    "×"
                }
            }
            if let Some(e) = &*error.read() {
                div { class: "grid-error", "Grid unavailable: {e}" }
            }
            canvas {
                id: CANVAS_ID,
                width: "{width}",
                height: "{height}",
                onmounted: move |_| on_mounted.call(()),
            }
        }
    }
}
