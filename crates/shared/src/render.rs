//! Grid renderer: entity set, hover state machine and frame builder.
//!
//! Rendering is split in two. [`compute_frame`] is pure: it folds one input
//! event into the renderer state and returns the draw commands for the next
//! frame, if a redraw is needed. A painter on the drawing surface replays the
//! commands.
use std::f64::consts::PI;

use crate::grid::{self, GridTransform, Rect, BOUNDARY_MARKERS, RECEIVERS};
use crate::models::{EntityRecord, Status};

pub const DOT_RADIUS: f64 = 12.0;

/// Extra pixels around a dot that still count as hovering it.
pub const HIT_SLACK: f64 = 3.0;

pub const PANEL_WIDTH: f64 = 180.0;
const PANEL_MARGIN: f64 = 10.0;
const DETAIL_PANEL_HEIGHT: f64 = 100.0;
const ALERT_ROW_HEIGHT: f64 = 25.0;

const GRID_LINE_COLOR: &str = "#555";
const INNER_CELL_FILL: &str = "rgba(102,204,51,0.4)";
const CONTAINED_COLOR: &str = "#8B4513";
const ESCAPED_COLOR: &str = "#dd2222";
const HALO_COLOR: &str = "#ffffff";
const LABEL_BOX_FILL: &str = "rgba(255, 255, 255, 0.8)";
const BOUNDARY_COLOR: &str = "#800000";
const RECEIVER_COLOR: &str = "#2664ff";
const ALERT_FILL: &str = "rgba(255, 200, 200, 0.95)";
const ALERT_COLOR: &str = "#cc0000";
const PANEL_FILL: &str = "rgba(255,255,255,0.95)";
const PANEL_BORDER: &str = "#333";
const WHITE: &str = "#fff";
const BLACK: &str = "#000";

const FONT_CELL: &str = "12px sans-serif";
const FONT_DOT_LABEL: &str = "10px sans-serif";
const FONT_ALERT_TITLE: &str = "bold 14px sans-serif";
const FONT_PANEL: &str = "14px sans-serif";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    Top,
    Middle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        width: f64,
        height: f64,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        color: &'static str,
        width: f64,
    },
    FillRect {
        rect: Rect,
        color: &'static str,
    },
    StrokeRect {
        rect: Rect,
        color: &'static str,
        width: f64,
    },
    FillCircle {
        center: (f64, f64),
        radius: f64,
        color: &'static str,
    },
    StrokeArc {
        center: (f64, f64),
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        color: &'static str,
        width: f64,
    },
    Text {
        at: (f64, f64),
        text: String,
        font: &'static str,
        color: &'static str,
        align: TextAlign,
        baseline: TextBaseline,
    },
}

/// Per-frame projection of an entity onto the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDot {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: &'static str,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    FeedBatch(Vec<EntityRecord>),
    ZoomChanged(f64),
    PointerMoved { x: f64, y: f64 },
    PointerLeft,
    Opened,
    Closed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
    /// Set on the first frame only: the painter must attach pointer listeners.
    pub bind_pointer: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RendererState {
    surface: Surface,
    transform: GridTransform,
    entities: Vec<EntityRecord>,
    active: Option<String>,
    zoom: Option<f64>,
    visible: bool,
    listeners_bound: bool,
}

impl RendererState {
    pub fn new(surface: Surface) -> Self {
        RendererState {
            surface,
            transform: GridTransform::new(surface.width, surface.height),
            entities: Vec::new(),
            active: None,
            zoom: None,
            visible: false,
            listeners_bound: false,
        }
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn transform(&self) -> &GridTransform {
        &self.transform
    }

    pub fn entities(&self) -> &[EntityRecord] {
        &self.entities
    }

    pub fn active(&self) -> Option<&EntityRecord> {
        let id = self.active.as_deref()?;
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn zoom(&self) -> Option<f64> {
        self.zoom
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn listeners_bound(&self) -> bool {
        self.listeners_bound
    }

    /// Dots for every entity with a known location, in entity order.
    pub fn dots(&self) -> Vec<RenderedDot> {
        self.entities
            .iter()
            .filter(|e| !e.location_unknown())
            .map(|e| {
                let (x, y) = self.transform.project(e.position, e.status);
                RenderedDot {
                    id: e.id.clone(),
                    x,
                    y,
                    radius: DOT_RADIUS,
                    color: status_color(e.status),
                    label: e.id.clone(),
                }
            })
            .collect()
    }

    /// Entities whose collar reports the sentinel position.
    pub fn unavailable(&self) -> impl Iterator<Item = &EntityRecord> {
        self.entities.iter().filter(|e| e.location_unknown())
    }
}

fn status_color(status: Status) -> &'static str {
    match status {
        Status::Contained => CONTAINED_COLOR,
        Status::Escaped => ESCAPED_COLOR,
    }
}

/// First dot within hover tolerance of `pointer`. No nearest-neighbour
/// tie-break: iteration order decides.
pub fn hit_test(dots: &[RenderedDot], pointer: (f64, f64)) -> Option<&RenderedDot> {
    dots.iter()
        .find(|d| grid::distance((d.x, d.y), pointer) <= d.radius + HIT_SLACK)
}

/// Fold `event` into `state`. Returns the next state and, when the surface
/// is shown and something visible changed, the frame to paint.
pub fn compute_frame(state: &RendererState, event: Event) -> (RendererState, Option<Frame>) {
    let mut next = state.clone();
    let redraw = match event {
        Event::FeedBatch(records) => {
            next.entities = records;
            next.active = None;
            next.visible
        }
        Event::ZoomChanged(zoom) => {
            let changed = next.zoom != Some(zoom);
            next.zoom = Some(zoom);
            next.visible && changed
        }
        Event::PointerMoved { x, y } => {
            if !next.visible {
                return (next, None);
            }
            let dots = next.dots();
            next.active = hit_test(&dots, (x, y)).map(|d| d.id.clone());
            next.active != state.active
        }
        Event::PointerLeft => {
            next.active = None;
            next.visible
        }
        Event::Opened => {
            next.visible = true;
            true
        }
        Event::Closed => {
            next.visible = false;
            next.active = None;
            false
        }
    };

    if !redraw {
        return (next, None);
    }
    let frame = Frame {
        commands: build_frame(&next),
        bind_pointer: !next.listeners_bound,
    };
    next.listeners_bound = true;
    (next, Some(frame))
}

/// Build the full command list for one frame.
pub fn build_frame(state: &RendererState) -> Vec<DrawCommand> {
    let mut cmds = Vec::with_capacity(256);
    cmds.push(DrawCommand::Clear {
        width: state.surface.width,
        height: state.surface.height,
    });
    build_grid_lines(&mut cmds, &state.transform);
    build_inner_cells(&mut cmds, &state.transform);
    build_dots(&mut cmds, &state.dots());
    build_boundary_markers(&mut cmds, &state.transform);
    build_receivers(&mut cmds, &state.transform);
    let unavailable: Vec<&EntityRecord> = state.unavailable().collect();
    if !unavailable.is_empty() {
        build_alert_panel(&mut cmds, &unavailable);
    }
    if let Some(active) = state.active() {
        build_detail_panel(&mut cmds, active, state.surface.width);
    }
    cmds
}

fn build_grid_lines(cmds: &mut Vec<DrawCommand>, t: &GridTransform) {
    for col in grid::columns() {
        cmds.push(DrawCommand::Line {
            from: t.grid_point(col, grid::ROW_MIN),
            to: t.grid_point(col, grid::ROW_MAX),
            color: GRID_LINE_COLOR,
            width: 1.0,
        });
    }
    for row in grid::rows() {
        cmds.push(DrawCommand::Line {
            from: t.grid_point(grid::COL_MIN, row),
            to: t.grid_point(grid::COL_MAX, row),
            color: GRID_LINE_COLOR,
            width: 1.0,
        });
    }
}

fn build_inner_cells(cmds: &mut Vec<DrawCommand>, t: &GridTransform) {
    for cell in grid::inner_cells() {
        let rect = t.inner_cell(cell);
        cmds.push(DrawCommand::FillRect {
            rect,
            color: INNER_CELL_FILL,
        });
        cmds.push(DrawCommand::Text {
            at: rect.center(),
            text: format!("{}_{}", cell.x, cell.y),
            font: FONT_CELL,
            color: WHITE,
            align: TextAlign::Center,
            baseline: TextBaseline::Middle,
        });
    }
}

fn build_dots(cmds: &mut Vec<DrawCommand>, dots: &[RenderedDot]) {
    for dot in dots {
        let center = (dot.x, dot.y);
        cmds.push(DrawCommand::FillCircle {
            center,
            radius: dot.radius + 2.0,
            color: HALO_COLOR,
        });
        cmds.push(DrawCommand::FillCircle {
            center,
            radius: dot.radius,
            color: dot.color,
        });
        cmds.push(DrawCommand::FillRect {
            rect: Rect {
                x: dot.x - 15.0,
                y: dot.y + dot.radius + 8.0,
                w: 30.0,
                h: 14.0,
            },
            color: LABEL_BOX_FILL,
        });
        cmds.push(DrawCommand::Text {
            at: (dot.x, dot.y + dot.radius + 15.0),
            text: dot.label.clone(),
            font: FONT_DOT_LABEL,
            color: BLACK,
            align: TextAlign::Center,
            baseline: TextBaseline::Middle,
        });
    }
}

fn build_boundary_markers(cmds: &mut Vec<DrawCommand>, t: &GridTransform) {
    for &(col, row) in BOUNDARY_MARKERS.iter() {
        let (rx, ry) = t.grid_point(grid::remap_column(col), row);
        cmds.push(DrawCommand::FillCircle {
            center: (rx, ry),
            radius: 3.0,
            color: BOUNDARY_COLOR,
        });
        // Label keeps the surveyed column, not the remapped one
        cmds.push(DrawCommand::Text {
            at: (rx, ry + 8.0),
            text: format!("{}_{}", col, row),
            font: FONT_CELL,
            color: BOUNDARY_COLOR,
            align: TextAlign::Center,
            baseline: TextBaseline::Top,
        });
    }
}

fn build_receivers(cmds: &mut Vec<DrawCommand>, t: &GridTransform) {
    const W: f64 = 30.0;
    const H: f64 = 18.0;
    for &(col, row) in RECEIVERS.iter() {
        let (rx, ry) = t.grid_point(col, row);
        let rect = Rect {
            x: rx - W / 2.0,
            y: ry - H / 2.0,
            w: W,
            h: H,
        };
        cmds.push(DrawCommand::FillRect { rect, color: WHITE });
        cmds.push(DrawCommand::StrokeRect {
            rect,
            color: BLACK,
            width: 2.0,
        });
        for radius in [6.0, 9.0, 12.0] {
            cmds.push(DrawCommand::StrokeArc {
                center: (rx, ry - 12.0),
                radius,
                start_angle: PI,
                end_angle: 2.0 * PI,
                color: RECEIVER_COLOR,
                width: 2.0,
            });
        }
        cmds.push(DrawCommand::Text {
            at: (rx, ry + 10.0),
            text: format!("Receiver_{}_{}", row, col),
            font: FONT_CELL,
            color: RECEIVER_COLOR,
            align: TextAlign::Center,
            baseline: TextBaseline::Top,
        });
    }
}

fn build_alert_panel(cmds: &mut Vec<DrawCommand>, unavailable: &[&EntityRecord]) {
    let rect = Rect {
        x: PANEL_MARGIN,
        y: PANEL_MARGIN,
        w: PANEL_WIDTH,
        h: 20.0 + unavailable.len() as f64 * ALERT_ROW_HEIGHT,
    };
    cmds.push(DrawCommand::FillRect {
        rect,
        color: ALERT_FILL,
    });
    cmds.push(DrawCommand::StrokeRect {
        rect,
        color: ALERT_COLOR,
        width: 2.0,
    });
    cmds.push(DrawCommand::Text {
        at: (18.0, 18.0),
        text: "⚠️ Collar Dropped Alert".to_string(),
        font: FONT_ALERT_TITLE,
        color: ALERT_COLOR,
        align: TextAlign::Left,
        baseline: TextBaseline::Top,
    });
    for (i, record) in unavailable.iter().enumerate() {
        cmds.push(DrawCommand::Text {
            at: (18.0, 40.0 + i as f64 * ALERT_ROW_HEIGHT),
            text: alert_line(record),
            font: FONT_CELL,
            color: ALERT_COLOR,
            align: TextAlign::Left,
            baseline: TextBaseline::Top,
        });
    }
}

pub fn alert_line(record: &EntityRecord) -> String {
    format!("{}: Location Unknown", record.id)
}

fn build_detail_panel(cmds: &mut Vec<DrawCommand>, active: &EntityRecord, surface_w: f64) {
    let rect = Rect {
        x: surface_w - PANEL_WIDTH - PANEL_MARGIN,
        y: PANEL_MARGIN,
        w: PANEL_WIDTH,
        h: DETAIL_PANEL_HEIGHT,
    };
    cmds.push(DrawCommand::FillRect {
        rect,
        color: PANEL_FILL,
    });
    cmds.push(DrawCommand::StrokeRect {
        rect,
        color: PANEL_BORDER,
        width: 1.0,
    });
    let lines = [
        format!("ID: {}", active.id),
        format!("Grid: [{}, {}]", active.position.x, active.position.y),
        format!("Status: {}", active.status),
    ];
    for (i, text) in lines.into_iter().enumerate() {
        cmds.push(DrawCommand::Text {
            at: (rect.x + 8.0, rect.y + 8.0 + i as f64 * 20.0),
            text,
            font: FONT_PANEL,
            color: BLACK,
            align: TextAlign::Left,
            baseline: TextBaseline::Top,
        });
    }
}

/// Owns the renderer state for one dashboard session.
#[derive(Debug, Clone)]
pub struct Renderer {
    state: RendererState,
}

impl Renderer {
    pub fn new(surface: Surface) -> Self {
        Renderer {
            state: RendererState::new(surface),
        }
    }

    pub fn state(&self) -> &RendererState {
        &self.state
    }

    pub fn handle(&mut self, event: Event) -> Option<Frame> {
        let (next, frame) = compute_frame(&self.state, event);
        self.state = next;
        frame
    }

    /// Replace the entity set wholesale.
    pub fn apply_batch(&mut self, records: Vec<EntityRecord>) -> Option<Frame> {
        self.handle(Event::FeedBatch(records))
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) -> Option<Frame> {
        self.handle(Event::PointerMoved { x, y })
    }

    pub fn on_pointer_leave(&mut self) -> Option<Frame> {
        self.handle(Event::PointerLeft)
    }

    pub fn on_zoom_change(&mut self, zoom: f64) -> Option<Frame> {
        self.handle(Event::ZoomChanged(zoom))
    }

    pub fn open(&mut self) -> Option<Frame> {
        self.handle(Event::Opened)
    }

    pub fn close(&mut self) -> Option<Frame> {
        self.handle(Event::Closed)
    }
}
