//! Crossing points between horizontal and vertical rulings.
//!
//! Every crossing is stored with the pair of rulings that define it; the
//! cell reconstructor later uses those rulings to check that corners are
//! joined by unbroken edges.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use super::types::{KeyF64, LatticeSettings, Point, Ruling, key_f64};

/// The rulings that cross at an intersection point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crossing {
    pub horizontal: Ruling,
    pub vertical: Ruling,
}

/// Map from rounded crossing points to their defining rulings.
#[derive(Clone, Debug, Default)]
pub struct Intersections {
    map: IndexMap<Point, Crossing, FxBuildHasher>,
}

impl Intersections {
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, point: &Point) -> Option<&Crossing> {
        self.map.get(point)
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.map.contains_key(point)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Point, &Crossing)> {
        self.map.iter()
    }

    /// Crossing points sorted top-to-bottom, then left-to-right.
    pub fn points_row_major(&self) -> Vec<Point> {
        let mut points: Vec<Point> = self.map.keys().copied().collect();
        points.sort();
        points
    }

    /// Crossing points sorted left-to-right, then top-to-bottom.
    pub fn points_column_major(&self) -> Vec<Point> {
        let mut points: Vec<Point> = self.map.keys().copied().collect();
        points.sort_by(Point::x_first_cmp);
        points
    }
}

/// Find every point where a horizontal ruling crosses a vertical one.
///
/// Both inputs must already be sorted (see [`super::rulings::sort_rulings`]).
/// When several ruling pairs cross at the same rounded point, the pair seen
/// last wins.
pub fn find_intersections(
    horizontal: &[Ruling],
    vertical: &[Ruling],
    settings: &LatticeSettings,
) -> Intersections {
    let precision = settings.precision();
    let tol = settings.colinear_tolerance;

    // Vertical rulings bucketed by rounded x, so each horizontal only visits
    // the verticals inside its own extent.
    let mut by_x: BTreeMap<KeyF64, Vec<usize>> = BTreeMap::new();
    for (idx, v) in vertical.iter().enumerate() {
        by_x.entry(key_f64(precision.round(v.position)))
            .or_default()
            .push(idx);
    }

    let mut intersections = Intersections::default();
    for h in horizontal {
        let x_min = key_f64(precision.round(h.start) - tol);
        let x_max = key_f64(precision.round(h.end) + tol);
        if x_min > x_max {
            continue;
        }
        for (_x, v_indices) in by_x.range(x_min..=x_max) {
            for &v_idx in v_indices {
                let v = &vertical[v_idx];
                let point = Point::rounded(v.position, h.position, precision);
                if h.colinear(point, precision, tol) && v.colinear(point, precision, tol) {
                    intersections.map.insert(
                        point,
                        Crossing {
                            horizontal: *h,
                            vertical: *v,
                        },
                    );
                }
            }
        }
    }
    tracing::debug!(
        horizontal = horizontal.len(),
        vertical = vertical.len(),
        crossings = intersections.len(),
        "found ruling intersections"
    );
    intersections
}
