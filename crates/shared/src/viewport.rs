/// Map viewport around the paddock: Web Mercator math, tile coverage and
/// the zoom rule that swaps the fence polygon for a marker.
use std::f64::consts::PI;

use crate::models::{LatLng, Paddock};

pub const TILE_SIZE: f64 = 256.0;
pub const MIN_ZOOM: u8 = 13;
pub const MAX_ZOOM: u8 = 20;
pub const DEFAULT_ZOOM: u8 = 15;

/// At and above this zoom the fence is drawn as a polygon.
pub const FENCE_ZOOM: u8 = 18;

/// OpenStreetMap only serves tiles up to this level; deeper zooms upscale it.
pub const MAX_TILE_ZOOM: u8 = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceLayer {
    Polygon,
    Marker,
}

pub fn fence_layer(zoom: u8) -> FenceLayer {
    if zoom < FENCE_ZOOM {
        FenceLayer::Marker
    } else {
        FenceLayer::Polygon
    }
}

fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * 2f64.powi(zoom as i32)
}

/// Web Mercator world pixel coordinates at `zoom`.
pub fn project(p: LatLng, zoom: u8) -> (f64, f64) {
    let size = world_size(zoom);
    let x = (p.lng + 180.0) / 360.0 * size;
    let lat = p.lat.to_radians();
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub x: i64,
    pub y: i64,
    pub z: u8,
    /// Screen offset of the tile's top-left corner.
    pub left: f64,
    pub top: f64,
    /// Rendered edge length in screen pixels.
    pub size: f64,
}

impl Tile {
    pub fn url(&self) -> String {
        format!("https://tile.openstreetmap.org/{}/{}/{}.png", self.z, self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: u8,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: u8, width: f64, height: f64) -> Self {
        Viewport {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            width,
            height,
        }
    }

    /// Returns whether the zoom level changed.
    pub fn set_zoom(&mut self, zoom: u8) -> bool {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let changed = zoom != self.zoom;
        self.zoom = zoom;
        changed
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom.saturating_add(1))
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom.saturating_sub(1))
    }

    pub fn fence_layer(&self) -> FenceLayer {
        fence_layer(self.zoom)
    }

    /// Centre on the paddock at the deepest zoom where it still fits.
    pub fn fit(&mut self, paddock: &Paddock) -> bool {
        let Some(center) = paddock.center() else {
            return false;
        };
        self.center = center;
        let fitting = (MIN_ZOOM..=MAX_ZOOM)
            .rev()
            .find(|&z| {
                let (w, h) = bounds_px(&paddock.polygon, z);
                w <= self.width && h <= self.height
            })
            .unwrap_or(MIN_ZOOM);
        self.set_zoom(fitting)
    }

    /// Screen position of `p` relative to the viewport's top-left corner.
    pub fn to_screen(&self, p: LatLng) -> (f64, f64) {
        let (cx, cy) = project(self.center, self.zoom);
        let (px, py) = project(p, self.zoom);
        (px - cx + self.width / 2.0, py - cy + self.height / 2.0)
    }

    /// Tiles covering the viewport.
    pub fn visible_tiles(&self) -> Vec<Tile> {
        let z = self.zoom.min(MAX_TILE_ZOOM);
        let scale = 2f64.powi((self.zoom - z) as i32);
        let size = TILE_SIZE * scale;
        let (cx, cy) = project(self.center, self.zoom);
        let left_px = cx - self.width / 2.0;
        let top_px = cy - self.height / 2.0;
        let last = 2i64.pow(z as u32) - 1;

        let x0 = ((left_px / size).floor() as i64).max(0);
        let x1 = (((left_px + self.width) / size).floor() as i64).min(last);
        let y0 = ((top_px / size).floor() as i64).max(0);
        let y1 = (((top_px + self.height) / size).floor() as i64).min(last);

        let mut tiles = Vec::new();
        for y in y0..=y1 {
            for x in x0..=x1 {
                tiles.push(Tile {
                    x,
                    y,
                    z,
                    left: x as f64 * size - left_px,
                    top: y as f64 * size - top_px,
                    size,
                });
            }
        }
        tiles
    }
}

fn bounds_px(polygon: &[LatLng], zoom: u8) -> (f64, f64) {
    let points: Vec<(f64, f64)> = polygon.iter().map(|p| project(*p, zoom)).collect();
    let (min_x, max_x) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.0), hi.max(p.0)));
    let (min_y, max_y) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.1), hi.max(p.1)));
    if points.is_empty() {
        return (0.0, 0.0);
    }
    (max_x - min_x, max_y - min_y)
}
