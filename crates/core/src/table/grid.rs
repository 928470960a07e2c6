//! Cell construction from crossing points, and row/column grouping.
//!
//! Cells are the minimal closed rectangles of the crossing grid: for each
//! crossing taken as a top-left corner, the nearest crossing below and to
//! the right that closes all four sides with real rulings.

use itertools::Itertools;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::utils::Precision;

use super::intersections::{Intersections, find_intersections};
use super::regions::Polygon;
use super::types::{Cell, GridDims, KeyF64, LatticeSettings, Point, Ruling, key_f64};

/// Find the minimal cells bounded by the given rulings.
///
/// Rulings must be sorted (see [`super::rulings::sort_rulings`]). The result
/// is sorted by `(top, left)`.
pub fn find_cells(
    horizontal: &[Ruling],
    vertical: &[Ruling],
    settings: &LatticeSettings,
) -> Vec<Cell> {
    let intersections = find_intersections(horizontal, vertical, settings);
    intersections_to_cells(&intersections, settings)
}

/// Convert crossing points to cells.
pub fn intersections_to_cells(
    intersections: &Intersections,
    settings: &LatticeSettings,
) -> Vec<Cell> {
    let precision = settings.precision();
    let tol = settings.colinear_tolerance;
    let points = intersections.points_row_major();

    // Points are row-major, so each column comes out sorted by y and each
    // row sorted by x.
    let mut columns: FxHashMap<KeyF64, Vec<Point>> = FxHashMap::default();
    let mut rows: FxHashMap<KeyF64, Vec<Point>> = FxHashMap::default();
    for p in &points {
        columns.entry(key_f64(p.x)).or_default().push(*p);
        rows.entry(key_f64(p.y)).or_default().push(*p);
    }

    let mut cells: Vec<Cell> = points
        .iter()
        .filter_map(|top_left| {
            let column = columns.get(&key_f64(top_left.x))?;
            let row = rows.get(&key_f64(top_left.y))?;
            cell_at(*top_left, intersections, column, row, precision, tol)
        })
        .collect();
    cells.sort_by(Cell::position_cmp);
    tracing::debug!(
        crossings = points.len(),
        cells = cells.len(),
        "reconstructed cells"
    );
    cells
}

/// The first closed rectangle whose top-left corner is `top_left`.
///
/// Candidates are tried nearest first, so the rectangle found is minimal and
/// a crossing starts at most one cell.
fn cell_at(
    top_left: Point,
    intersections: &Intersections,
    column: &[Point],
    row: &[Point],
    precision: Precision,
    tol: f64,
) -> Option<Cell> {
    let crossing = intersections.get(&top_left)?;

    let below = &column[column.partition_point(|p| p.y <= top_left.y)..];
    let right: Vec<Point> = row[row.partition_point(|p| p.x <= top_left.x)..]
        .iter()
        .filter(|p| crossing.horizontal.colinear(**p, precision, tol))
        .copied()
        .collect();
    if right.is_empty() {
        return None;
    }

    for x_point in below {
        if !crossing.vertical.colinear(*x_point, precision, tol) {
            continue;
        }
        for y_point in &right {
            let bottom_right = Point::new(y_point.x, x_point.y);
            let Some(corner) = intersections.get(&bottom_right) else {
                continue;
            };
            if corner.horizontal.colinear(*x_point, precision, tol)
                && corner.vertical.colinear(*y_point, precision, tol)
            {
                return Some(Cell::from_points(top_left, bottom_right));
            }
        }
    }
    None
}

/// A contiguous tabular area: its outline and the cells inside it.
#[derive(Clone, Debug, Serialize)]
pub struct Spreadsheet {
    pub bounds: Polygon,
    pub cells: Vec<Cell>,
    #[serde(skip)]
    precision: Precision,
}

impl Spreadsheet {
    /// Assign each cell to the first polygon containing its center.
    ///
    /// Cells outside every polygon are dropped.
    pub fn from_regions(polygons: Vec<Polygon>, cells: &[Cell], precision: Precision) -> Vec<Self> {
        let mut members: Vec<Vec<Cell>> = vec![Vec::new(); polygons.len()];
        for cell in cells {
            let c = cell.center();
            let center = Point::rounded(c.x, c.y, precision);
            if let Some(idx) = polygons.iter().position(|poly| poly.contains(center)) {
                members[idx].push(*cell);
            }
        }
        polygons
            .into_iter()
            .zip(members)
            .map(|(bounds, mut cells)| {
                cells.sort_by(Cell::position_cmp);
                Self {
                    bounds,
                    cells,
                    precision,
                }
            })
            .collect()
    }

    /// Cells grouped by top edge, each row ordered left to right.
    pub fn rows(&self) -> Vec<Vec<Cell>> {
        self.group_by_axis(true)
    }

    /// Cells grouped by left edge, each column ordered top to bottom.
    pub fn cols(&self) -> Vec<Vec<Cell>> {
        self.group_by_axis(false)
    }

    pub fn dims(&self) -> GridDims {
        GridDims::new(self.rows().len(), self.cols().len())
    }

    fn group_by_axis(&self, rows: bool) -> Vec<Vec<Cell>> {
        let p = self.precision;
        let key = |c: &Cell| {
            if rows {
                (key_f64(p.round(c.top)), key_f64(p.round(c.left)))
            } else {
                (key_f64(p.round(c.left)), key_f64(p.round(c.top)))
            }
        };
        self.cells
            .iter()
            .copied()
            .sorted_by_key(key)
            .chunk_by(|c| key(c).0)
            .into_iter()
            .map(|(_, group)| group.collect())
            .collect()
    }
}
