/// Paddock grid system.
///
/// The paddock is surveyed as a logical grid with columns -2..=10 and rows
/// -2..=18 in steps of 2. Grid lines and receivers sit on even coordinates,
/// inner cells on odd ones. The schematic is drawn rotated 90 degrees so the
/// long side of the paddock runs horizontally on screen.
use crate::models::{GridPos, Status};

// Pixel layout of the unrotated grid
pub const CELL: f64 = 75.0;
pub const OFFSET_X: f64 = 180.0;
pub const OFFSET_Y: f64 = 30.0;

// Logical extents
pub const COL_MIN: i32 = -2;
pub const COL_MAX: i32 = 10;
pub const ROW_MIN: i32 = -2;
pub const ROW_MAX: i32 = 18;
pub const GRID_STEP: usize = 2;

// Inner cells: first coordinate selects the row band, second the column band
pub const INNER_ROW_MAX: i32 = 15;
pub const INNER_COL_MAX: i32 = 7;

/// Boundary markers carry column -3 in their labels but are drawn on column -2.
pub const OUTSIDE_COLUMN: i32 = -3;

/// Where entities with an unknown location are parked. Never drawn.
pub const OFF_SURFACE: (f64, f64) = (-100.0, -100.0);

/// Fixed boundary reference points as (column, row).
pub const BOUNDARY_MARKERS: [(i32, i32); 14] = [
    (-3, 0),
    (-3, 4),
    (-3, 8),
    (-3, 12),
    (-3, 16),
    (2, -2),
    (6, -2),
    (10, 0),
    (10, 4),
    (10, 8),
    (10, 12),
    (10, 16),
    (2, 18),
    (6, 18),
];

/// BLE receiver stations as (column, row).
pub const RECEIVERS: [(i32, i32); 6] = [(0, 0), (8, 0), (0, 8), (8, 8), (0, 16), (8, 16)];

pub fn columns() -> impl Iterator<Item = i32> {
    (COL_MIN..=COL_MAX).step_by(GRID_STEP)
}

pub fn rows() -> impl Iterator<Item = i32> {
    (ROW_MIN..=ROW_MAX).step_by(GRID_STEP)
}

/// All inner cells as (first, second) pairs, row band major.
pub fn inner_cells() -> impl Iterator<Item = GridPos> {
    (1..=INNER_COL_MAX)
        .step_by(GRID_STEP)
        .flat_map(|col| (1..=INNER_ROW_MAX).step_by(GRID_STEP).map(move |row| GridPos::new(row, col)))
}

/// Unrotated pixel x for a logical column.
pub fn unrotated_x(col: f64) -> f64 {
    OFFSET_X + (col + 2.0) / 2.0 * CELL
}

/// Unrotated pixel y for a logical row.
pub fn unrotated_y(row: f64) -> f64 {
    OFFSET_Y + (row + 2.0) / 2.0 * CELL
}

pub fn remap_column(col: i32) -> i32 {
    if col == OUTSIDE_COLUMN {
        COL_MIN
    } else {
        col
    }
}

/// Euclidean distance between two pixel positions.
pub fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = b.0 - a.0;
    let dy = b.1 - a.1;
    (dx * dx + dy * dy).sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn contains(&self, (px, py): (f64, f64)) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }
}

/// Grid-to-surface transform for a surface of fixed size.
///
/// The rotated grid is centred on the surface regardless of its dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridTransform {
    base_x: f64,
    base_y: f64,
}

impl GridTransform {
    pub fn new(surface_w: f64, surface_h: f64) -> Self {
        let rotated_w = Self::max_y() - Self::min_y();
        let rotated_h = Self::max_x() - Self::min_x();
        GridTransform {
            base_x: (surface_w - rotated_w) / 2.0,
            base_y: (surface_h - rotated_h) / 2.0,
        }
    }

    fn min_x() -> f64 {
        unrotated_x(COL_MIN as f64)
    }

    fn max_x() -> f64 {
        unrotated_x(COL_MAX as f64)
    }

    fn min_y() -> f64 {
        unrotated_y(ROW_MIN as f64)
    }

    fn max_y() -> f64 {
        unrotated_y(ROW_MAX as f64)
    }

    /// Rotate an unrotated pixel position 90 degrees onto the surface.
    pub fn rotate(&self, xp: f64, yp: f64) -> (f64, f64) {
        (self.base_x + (yp - Self::min_y()), self.base_y + (Self::max_x() - xp))
    }

    /// Surface position of a grid-line intersection.
    pub fn grid_point(&self, col: i32, row: i32) -> (f64, f64) {
        self.rotate(unrotated_x(col as f64), unrotated_y(row as f64))
    }

    /// Surface rectangle of the inner tile labelled `{first}_{second}`.
    ///
    /// Tiles are lifted by one full cell after rotation. That lift has no
    /// counterpart on the x axis; it is what lines the tiles up with the
    /// drawn fence and must stay as is.
    pub fn inner_cell(&self, pos: GridPos) -> Rect {
        let half = CELL / 2.0;
        let (rx, ry) = self.rotate(
            unrotated_x(pos.y as f64) - half,
            unrotated_y(pos.x as f64) - half,
        );
        Rect {
            x: rx,
            y: ry - CELL,
            w: CELL,
            h: CELL,
        }
    }

    /// Dot position for a contained animal: centre of its inner tile.
    pub fn inner_placement(&self, pos: GridPos) -> (f64, f64) {
        self.inner_cell(pos).center()
    }

    /// Dot position for an escaped animal: directly on the boundary point.
    pub fn outer_placement(&self, pos: GridPos) -> (f64, f64) {
        self.grid_point(remap_column(pos.x), pos.y)
    }

    pub fn project(&self, pos: GridPos, status: Status) -> (f64, f64) {
        if pos.is_sentinel() {
            return OFF_SURFACE;
        }
        match status {
            Status::Contained => self.inner_placement(pos),
            Status::Escaped => self.outer_placement(pos),
        }
    }

    /// Bounding box of the whole drawn grid; the fence line is its perimeter.
    pub fn outer_region(&self) -> Rect {
        let (x0, y0) = self.grid_point(COL_MAX, ROW_MIN);
        let (x1, y1) = self.grid_point(COL_MIN, ROW_MAX);
        Rect {
            x: x0.min(x1),
            y: y0.min(y1),
            w: (x1 - x0).abs(),
            h: (y1 - y0).abs(),
        }
    }

    /// Bounding box of all inner tiles.
    pub fn inner_region(&self) -> Rect {
        let a = self.inner_cell(GridPos::new(1, INNER_COL_MAX));
        let b = self.inner_cell(GridPos::new(INNER_ROW_MAX, 1));
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Rect {
            x,
            y,
            w: (a.x + a.w).max(b.x + b.w) - x,
            h: (a.y + a.h).max(b.y + b.h) - y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: f64 = 1100.0;
    const H: f64 = 640.0;

    fn close(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-9 && (a.1 - b.1).abs() < 1e-9
    }

    #[test]
    fn test_unrotated_extents() {
        assert!((unrotated_x(-2.0) - 180.0).abs() < 1e-9);
        assert!((unrotated_x(10.0) - 630.0).abs() < 1e-9);
        assert!((unrotated_y(-2.0) - 30.0).abs() < 1e-9);
        assert!((unrotated_y(18.0) - 780.0).abs() < 1e-9);
    }

    #[test]
    fn test_grid_is_centred() {
        let t = GridTransform::new(W, H);
        let outer = t.outer_region();
        assert!((outer.x - 175.0).abs() < 1e-9);
        assert!((outer.y - 95.0).abs() < 1e-9);
        assert!((outer.w - 750.0).abs() < 1e-9);
        assert!((outer.h - 450.0).abs() < 1e-9);
        let (cx, cy) = outer.center();
        assert!((cx - W / 2.0).abs() < 1e-9);
        assert!((cy - H / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_inner_placement_first_cell() {
        let t = GridTransform::new(W, H);
        assert!(close(t.inner_placement(GridPos::new(1, 1)), (287.5, 432.5)));
    }

    #[test]
    fn test_inner_placement_is_tile_centre() {
        let t = GridTransform::new(W, H);
        for cell in inner_cells() {
            assert!(close(t.inner_placement(cell), t.inner_cell(cell).center()));
        }
    }

    #[test]
    fn test_contained_positions_inside_inner_region() {
        let t = GridTransform::new(W, H);
        let inner = t.inner_region();
        for cell in inner_cells() {
            assert!(inner.contains(t.project(cell, Status::Contained)), "{cell:?}");
        }
        assert!((inner.x - 250.0).abs() < 1e-9);
        assert!((inner.y - 170.0).abs() < 1e-9);
        assert!((inner.w - 600.0).abs() < 1e-9);
        assert!((inner.h - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_escaped_positions_on_outer_band() {
        let t = GridTransform::new(W, H);
        let outer = t.outer_region();
        for &(col, row) in BOUNDARY_MARKERS.iter() {
            let (x, y) = t.project(GridPos::new(col, row), Status::Escaped);
            let on_vertical = (x - outer.x).abs() < 1e-9 || (x - outer.x - outer.w).abs() < 1e-9;
            let on_horizontal = (y - outer.y).abs() < 1e-9 || (y - outer.y - outer.h).abs() < 1e-9;
            assert!(outer.contains((x, y)));
            assert!(on_vertical || on_horizontal, "({col}, {row}) -> ({x}, {y})");
        }
    }

    #[test]
    fn test_outside_column_remap() {
        let t = GridTransform::new(W, H);
        let remapped = t.project(GridPos::new(-3, 4), Status::Escaped);
        let direct = t.project(GridPos::new(-2, 4), Status::Escaped);
        assert!(close(remapped, direct));
        assert!(close(direct, (400.0, 545.0)));
    }

    #[test]
    fn test_sentinel_is_off_surface() {
        let t = GridTransform::new(W, H);
        assert_eq!(t.project(GridPos::new(-99, -99), Status::Contained), OFF_SURFACE);
        assert_eq!(t.project(GridPos::new(-99, -99), Status::Escaped), OFF_SURFACE);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let a = GridTransform::new(W, H);
        let b = GridTransform::new(W, H);
        let pos = GridPos::new(7, 3);
        assert_eq!(a.project(pos, Status::Contained), b.project(pos, Status::Contained));
        assert_eq!(a.project(pos, Status::Escaped), a.project(pos, Status::Escaped));
    }

    #[test]
    fn test_out_of_domain_extrapolates() {
        let t = GridTransform::new(W, H);
        let (x, y) = t.project(GridPos::new(40, 40), Status::Contained);
        assert!(x.is_finite() && y.is_finite());
        assert!(!t.outer_region().contains((x, y)));
    }

    #[test]
    fn test_line_ranges() {
        assert_eq!(columns().collect::<Vec<_>>(), vec![-2, 0, 2, 4, 6, 8, 10]);
        assert_eq!(rows().count(), 11);
        assert_eq!(inner_cells().count(), 32);
    }

    #[test]
    fn test_distance() {
        assert!((distance((0.0, 0.0), (3.0, 4.0)) - 5.0).abs() < 1e-9);
    }
}
