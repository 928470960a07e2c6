//! Merging cell rectangles into region polygons.
//!
//! Corner cancellation over a union of axis-aligned rectangles: a corner
//! shared by an even number of rectangles is interior, one seen an odd
//! number of times is a vertex of the outline. Outline vertices pair up
//! along each row and each column, and walking those pairs alternately
//! horizontal/vertical traces every polygon. No boolean geometry needed.

use std::collections::BTreeMap;

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::error::{LatticeError, Result};
use crate::utils::Precision;

use super::types::{BBox, Cell, LatticeSettings, Point};

/// Closed outline of a contiguous group of cells.
///
/// Vertices alternate between horizontal and vertical edges; the edge from
/// the last vertex back to the first is implied.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Polygon {
    pub vertices: Vec<Point>,
}

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.vertices
            .iter()
            .copied()
            .zip(self.vertices.iter().copied().cycle().skip(1))
    }

    pub fn bbox(&self) -> BBox {
        let mut x0 = f64::INFINITY;
        let mut top = f64::INFINITY;
        let mut x1 = f64::NEG_INFINITY;
        let mut bottom = f64::NEG_INFINITY;
        for p in &self.vertices {
            x0 = x0.min(p.x);
            top = top.min(p.y);
            x1 = x1.max(p.x);
            bottom = bottom.max(p.y);
        }
        BBox {
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// Enclosed area (shoelace).
    pub fn area(&self) -> f64 {
        let twice: f64 = self.edges().map(|(a, b)| a.x * b.y - b.x * a.y).sum();
        twice.abs() / 2.0
    }

    /// Whether `point` lies inside the polygon or on its outline.
    pub fn contains(&self, point: Point) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            let (x_lo, x_hi) = (a.x.min(b.x), a.x.max(b.x));
            let (y_lo, y_hi) = (a.y.min(b.y), a.y.max(b.y));
            if point.x >= x_lo && point.x <= x_hi && point.y >= y_lo && point.y <= y_hi {
                return true;
            }
            // Ray cast to the right; only vertical edges can cross it.
            if a.x == b.x && a.x > point.x && point.y >= y_lo && point.y < y_hi {
                inside = !inside;
            }
        }
        inside
    }
}

/// Merge cells into the outlines of their contiguous areas.
///
/// Zero-size placeholders cancel their own corners and leave no trace.
/// Polygons come out ordered by their top-left vertex.
pub fn find_regions(cells: &[Cell], settings: &LatticeSettings) -> Result<Vec<Polygon>> {
    let precision = settings.precision();
    let mut corners: FxHashSet<Point> = FxHashSet::default();
    for cell in cells {
        if !cell.is_finite() {
            return Err(LatticeError::geometry(format!(
                "cell at ({}, {}) has non-finite geometry",
                cell.left, cell.top
            )));
        }
        for corner in cell.corners(precision) {
            // Shared vertex: remove it.
            if !corners.remove(&corner) {
                corners.insert(corner);
            }
        }
    }
    check_overlaps(cells, precision)?;

    let mut by_row: Vec<Point> = corners.into_iter().collect();
    by_row.sort();
    let mut by_col = by_row.clone();
    by_col.sort_by(Point::x_first_cmp);

    let edges_h = pair_runs(&by_row, |a, b| a.y == b.y, "horizontal")?;
    let edges_v = pair_runs(&by_col, |a, b| a.x == b.x, "vertical")?;
    let polygons = trace_polygons(edges_h, edges_v)?;
    tracing::debug!(
        cells = cells.len(),
        polygons = polygons.len(),
        "merged cells into regions"
    );
    Ok(polygons)
}

/// Cells may touch but never share interior area.
///
/// Corner toggling reads an overlap as a hole, so it has to be caught here.
/// Placeholders have no area and are skipped.
fn check_overlaps(cells: &[Cell], precision: Precision) -> Result<()> {
    let mut boxes: Vec<BBox> = cells
        .iter()
        .map(|c| BBox {
            x0: precision.round(c.left),
            top: precision.round(c.top),
            x1: precision.round(c.right()),
            bottom: precision.round(c.bottom()),
        })
        .filter(|b| b.x1 > b.x0 && b.bottom > b.top)
        .collect();
    boxes.sort_by(|a, b| a.x0.total_cmp(&b.x0));

    for (i, a) in boxes.iter().enumerate() {
        for b in boxes[i + 1..].iter().take_while(|b| b.x0 < a.x1) {
            if b.top < a.bottom && a.top < b.bottom {
                return Err(LatticeError::geometry(format!(
                    "cells at ({}, {}) and ({}, {}) overlap",
                    a.x0, a.top, b.x0, b.top
                )));
            }
        }
    }
    Ok(())
}

/// Link consecutive points two at a time within each run that shares a line.
fn pair_runs(
    sorted: &[Point],
    same_line: impl Fn(&Point, &Point) -> bool,
    axis: &str,
) -> Result<BTreeMap<Point, Point>> {
    let mut edges = BTreeMap::new();
    for run in sorted.chunk_by(|a, b| same_line(a, b)) {
        if run.len() % 2 != 0 {
            let p = run[0];
            return Err(LatticeError::geometry(format!(
                "odd number of vertices ({}) on {axis} line through ({}, {})",
                run.len(),
                p.x,
                p.y
            )));
        }
        for pair in run.chunks_exact(2) {
            edges.insert(pair[0], pair[1]);
            edges.insert(pair[1], pair[0]);
        }
    }
    Ok(edges)
}

/// Walk the edge maps into closed polygons, consuming them.
fn trace_polygons(
    mut edges_h: BTreeMap<Point, Point>,
    mut edges_v: BTreeMap<Point, Point>,
) -> Result<Vec<Polygon>> {
    let step_limit = edges_h.len() + edges_v.len() + 1;
    let mut polygons = Vec::new();

    while let Some((start, _)) = edges_h.pop_first() {
        let mut vertices = vec![start];
        let mut curr = start;
        // The start counts as reached along its horizontal edge.
        let mut via_horizontal = true;
        let mut steps = 0usize;
        loop {
            steps += 1;
            if steps > step_limit {
                return Err(LatticeError::geometry(format!(
                    "polygon walk from ({}, {}) did not close within {step_limit} steps",
                    start.x, start.y
                )));
            }
            let next = if via_horizontal {
                edges_v.remove(&curr)
            } else {
                edges_h.remove(&curr)
            };
            let Some(next) = next else {
                return Err(LatticeError::geometry(format!(
                    "vertex ({}, {}) has no {} partner",
                    curr.x,
                    curr.y,
                    if via_horizontal { "vertical" } else { "horizontal" }
                )));
            };
            via_horizontal = !via_horizontal;
            if next == start {
                if !via_horizontal {
                    return Err(LatticeError::geometry(format!(
                        "polygon walk re-entered ({}, {}) along a vertical edge",
                        start.x, start.y
                    )));
                }
                break;
            }
            vertices.push(next);
            curr = next;
        }

        for v in &vertices {
            edges_h.remove(v);
            edges_v.remove(v);
        }
        polygons.push(Polygon::new(vertices));
    }

    if let Some((p, _)) = edges_v.first_key_value() {
        return Err(LatticeError::geometry(format!(
            "vertical edge at ({}, {}) belongs to no polygon",
            p.x, p.y
        )));
    }
    Ok(polygons)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn l_shape_keeps_the_notch() {
        let cells = vec![
            Cell::new(0.0, 0.0, 10.0, 10.0),
            Cell::new(0.0, 10.0, 10.0, 10.0),
            Cell::new(10.0, 0.0, 10.0, 10.0),
        ];
        let polys = find_regions(&cells, &LatticeSettings::default()).unwrap();
        assert_eq!(polys.len(), 1);
        assert_eq!(
            polys[0].vertices,
            vec![
                pt(0.0, 0.0),
                pt(0.0, 20.0),
                pt(10.0, 20.0),
                pt(10.0, 10.0),
                pt(20.0, 10.0),
                pt(20.0, 0.0),
            ]
        );
        assert_eq!(polys[0].area(), 300.0);
    }

    #[test]
    fn placeholders_leave_no_vertices() {
        let cells = vec![
            Cell::new(0.0, 0.0, 20.0, 10.0),
            Cell::placeholder(0.0, 10.0, 0.0, 10.0),
            Cell::placeholder(5.0, 5.0, 0.0, 0.0),
        ];
        let polys = find_regions(&cells, &LatticeSettings::default()).unwrap();
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].len(), 4);
    }

    #[test]
    fn contains_is_boundary_inclusive() {
        let poly = Polygon::new(vec![
            pt(0.0, 0.0),
            pt(0.0, 20.0),
            pt(10.0, 20.0),
            pt(10.0, 10.0),
            pt(20.0, 10.0),
            pt(20.0, 0.0),
        ]);
        assert!(poly.contains(pt(5.0, 5.0)));
        assert!(poly.contains(pt(5.0, 15.0)));
        assert!(poly.contains(pt(0.0, 7.0)));
        assert!(poly.contains(pt(15.0, 10.0)));
        assert!(!poly.contains(pt(15.0, 15.0)));
        assert!(!poly.contains(pt(25.0, 5.0)));
    }

    #[test]
    fn missing_partner_is_an_inconsistency() {
        let mut edges_h = BTreeMap::new();
        edges_h.insert(pt(0.0, 0.0), pt(10.0, 0.0));
        edges_h.insert(pt(10.0, 0.0), pt(0.0, 0.0));
        let edges_v = BTreeMap::new();
        let err = trace_polygons(edges_h, edges_v).unwrap_err();
        assert!(err.is_geometry_inconsistency());
    }

    #[test]
    fn odd_run_is_an_inconsistency() {
        let pts = vec![pt(0.0, 0.0), pt(5.0, 0.0), pt(10.0, 0.0)];
        let err = pair_runs(&pts, |a, b| a.y == b.y, "horizontal").unwrap_err();
        assert!(err.is_geometry_inconsistency());
    }

    #[test]
    fn overlapping_cells_are_an_inconsistency() {
        // A ruling stopping mid-grid leaves a full-height cell and a
        // half-height cell covering the same right half.
        let cells = vec![
            Cell::new(0.0, 0.0, 20.0, 10.0),
            Cell::new(0.0, 10.0, 10.0, 5.0),
        ];
        let err = find_regions(&cells, &LatticeSettings::default()).unwrap_err();
        assert!(err.is_geometry_inconsistency());
    }

    #[test]
    fn touching_cells_and_placeholders_do_not_overlap() {
        let cells = vec![
            Cell::new(0.0, 0.0, 20.0, 10.0),
            Cell::new(0.0, 20.0, 10.0, 10.0),
            Cell::new(10.0, 0.0, 30.0, 10.0),
            Cell::placeholder(0.0, 10.0, 0.0, 10.0),
        ];
        assert!(check_overlaps(&cells, Precision::default()).is_ok());
    }

    #[test]
    fn non_finite_cell_is_rejected() {
        let cells = vec![Cell::new(0.0, f64::NAN, 10.0, 10.0)];
        assert!(matches!(
            find_regions(&cells, &LatticeSettings::default()),
            Err(LatticeError::GeometryInconsistency { .. })
        ));
    }
}
