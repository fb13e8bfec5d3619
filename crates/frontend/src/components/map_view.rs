use dioxus::html::geometry::WheelDelta;
use dioxus::prelude::*;
use paddock_shared::models::Paddock;
use paddock_shared::viewport::{FenceLayer, Viewport};

pub const MAP_CONTAINER_ID: &str = "paddock-map-container";

pub const MAP_WIDTH: f64 = 960.0;
pub const MAP_HEIGHT: f64 = 600.0;

/// Accumulated wheel travel (pixels) per zoom level.
const WHEEL_STEP: f64 = 100.0;

const MARKER_RADIUS: f64 = 9.0;

/// Normalize a wheel delta to pixels.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

/// Fold a wheel delta into the running total. Returns the zoom steps to
/// apply (positive zooms in) and the remainder to carry over.
fn wheel_steps(accumulated: f64, delta_y: f64) -> (i32, f64) {
    let total = accumulated + delta_y;
    let steps = (total / WHEEL_STEP).trunc();
    // Scrolling up (negative delta) zooms in.
    (-(steps as i32), total - steps * WHEEL_STEP)
}

fn apply_zoom_steps(viewport: &mut Viewport, steps: i32) -> bool {
    let target = (viewport.zoom as i32 + steps).clamp(0, u8::MAX as i32) as u8;
    viewport.set_zoom(target)
}

/// SVG `points` attribute for the fence outline.
fn polygon_points(viewport: &Viewport, paddock: &Paddock) -> String {
    paddock
        .polygon
        .iter()
        .map(|&p| {
            let (x, y) = viewport.to_screen(p);
            format!("{:.1},{:.1}", x, y)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[component]
pub fn MapView(paddock: Paddock, viewport: Signal<Viewport>, on_open: EventHandler<()>) -> Element {
    let mut wheel_accum = use_signal(|| 0.0_f64);

    let vp = *viewport.read();
    let tiles = vp.visible_tiles();
    let show_polygon = vp.fence_layer() == FenceLayer::Polygon;
    let points = polygon_points(&vp, &paddock);
    let (marker_x, marker_y) = paddock
        .center()
        .map(|c| vp.to_screen(c))
        .unwrap_or((MAP_WIDTH / 2.0, MAP_HEIGHT / 2.0));
    let zoom_label = vp.zoom;

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "map-view",
            style: "width:{MAP_WIDTH}px;height:{MAP_HEIGHT}px;",

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();
                let delta_y = wheel_delta_y(evt.data().delta());
                let (steps, rest) = wheel_steps(*wheel_accum.peek(), delta_y);
                wheel_accum.set(rest);
                if steps != 0 {
                    apply_zoom_steps(&mut viewport.write(), steps);
                }
            },

            for tile in tiles {
                img {
                    key: "{tile.z}/{tile.x}/{tile.y}",
                    class: "map-tile",
                    src: tile.url(),
                    draggable: "false",
                    style: "left:{tile.left}px;top:{tile.top}px;width:{tile.size}px;height:{tile.size}px;",
                }
            }

            svg {
                class: "fence-layer",
                width: "{MAP_WIDTH}",
                height: "{MAP_HEIGHT}",
                if show_polygon {
                    polygon {
                        class: "fence-polygon",
                        points: "{points}",
                        onclick: move |_| on_open.call(()),
                    }
                } else {
                    circle {
                        class: "fence-marker",
                        cx: "{marker_x}",
                        cy: "{marker_y}",
                        r: "{MARKER_RADIUS}",
                        onclick: {
                            let fence = paddock.clone();
                            move |_| {
                                let fitted = viewport.write().fit(&fence);
                                tracing::debug!(fence = %fence.name, zoom_changed = fitted, "fitted map to fence");
                            }
                        },
                    }
                }
            }

            div { class: "zoom-controls",
                button {
                    onclick: move |_| {
                        viewport.write().zoom_in();
                    },
                    "+"
                }
                span { class: "zoom-level", "{zoom_label}" }
                button {
                    onclick: move |_| {
                        viewport.write().zoom_out();
                    },
                    "−"
                }
            }

            div { class: "attribution", "© OpenStreetMap contributors" }
        }
    }
}
