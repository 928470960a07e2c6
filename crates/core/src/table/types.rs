//! Table reconstruction types and settings.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{LatticeError, Result};
use crate::utils::{DEFAULT_PRECISION, MAX_PRECISION, Precision};

// Default constants
pub(crate) const DEFAULT_COLINEAR_TOLERANCE: f64 = 1.0;
pub(crate) const DEFAULT_SNAP_TOLERANCE: f64 = 0.0;
pub(crate) const DEFAULT_JOIN_TOLERANCE: f64 = 1.0;
pub(crate) const DEFAULT_MIN_RULING_LENGTH: f64 = 0.0;
pub(crate) const DEFAULT_HEURISTIC_THRESHOLD: f64 = 0.65;

// Key types for ordered float maps
pub(crate) type KeyF64 = OrderedFloat<f64>;

pub(crate) fn key_f64(v: f64) -> KeyF64 {
    OrderedFloat(v)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// A crossing location or polygon vertex.
///
/// Equality, hashing and the default ordering are row-major: `(y, x)`.
/// [`Point::x_first_cmp`] gives the column-major order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point with both coordinates rounded to `precision`.
    pub fn rounded(x: f64, y: f64, precision: Precision) -> Self {
        Self {
            x: precision.round(x),
            y: precision.round(y),
        }
    }

    fn key(&self) -> (KeyF64, KeyF64) {
        (key_f64(self.y), key_f64(self.x))
    }

    pub fn x_first_cmp(&self, other: &Point) -> Ordering {
        key_f64(self.x)
            .cmp(&key_f64(other.x))
            .then(key_f64(self.y).cmp(&key_f64(other.y)))
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// An axis-aligned ruling line.
///
/// `position` is the fixed coordinate (`top` of a horizontal ruling, `left`
/// of a vertical one); `[start, end]` is the extent along the other axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Ruling {
    pub orientation: Orientation,
    pub position: f64,
    pub start: f64,
    pub end: f64,
}

impl Ruling {
    pub fn horizontal(top: f64, left: f64, right: f64) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            position: top,
            start: left.min(right),
            end: left.max(right),
        }
    }

    pub fn vertical(left: f64, top: f64, bottom: f64) -> Self {
        Self {
            orientation: Orientation::Vertical,
            position: left,
            start: top.min(bottom),
            end: top.max(bottom),
        }
    }

    /// Classify a segment between two points.
    ///
    /// Returns `None` for oblique segments and for segments collapsed to a
    /// single point.
    pub fn from_segment(x0: f64, y0: f64, x1: f64, y1: f64) -> Option<Self> {
        let flat = (y0 - y1).abs() < f64::EPSILON;
        let upright = (x0 - x1).abs() < f64::EPSILON;
        match (flat, upright) {
            (true, false) => Some(Self::horizontal(y0, x0, x1)),
            (false, true) => Some(Self::vertical(x0, y0, y1)),
            _ => None,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        self.orientation == Orientation::Horizontal
    }

    pub fn is_vertical(&self) -> bool {
        self.orientation == Orientation::Vertical
    }

    pub fn top(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.position,
            Orientation::Vertical => self.start,
        }
    }

    pub fn bottom(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.position,
            Orientation::Vertical => self.end,
        }
    }

    pub fn left(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.start,
            Orientation::Vertical => self.position,
        }
    }

    pub fn right(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.end,
            Orientation::Vertical => self.position,
        }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.start.is_finite() && self.end.is_finite()
    }

    /// Whether `point` lies on this ruling.
    ///
    /// The point must sit exactly on the rounded fixed coordinate; along the
    /// extent it may overshoot either end by `tolerance`.
    pub fn colinear(&self, point: Point, precision: Precision, tolerance: f64) -> bool {
        let (fixed, varying) = match self.orientation {
            Orientation::Horizontal => (point.y, point.x),
            Orientation::Vertical => (point.x, point.y),
        };
        precision.eq(fixed, self.position)
            && precision.within(varying, self.start, self.end, tolerance)
    }

    /// Sort order required by the intersection finder: horizontal rulings
    /// top-to-bottom then left-to-right, vertical rulings left-to-right then
    /// top-to-bottom.
    pub fn sort_cmp(&self, other: &Ruling) -> Ordering {
        self.orientation
            .cmp(&other.orientation)
            .then(self.position.total_cmp(&other.position))
            .then(self.start.total_cmp(&other.start))
            .then(self.end.total_cmp(&other.end))
    }
}

/// A table cell rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Cell {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    /// The cell covers one or more internal ruling positions.
    pub spanning: bool,
    /// Zero-width and/or zero-height filler that keeps the grid regular.
    pub placeholder: bool,
}

impl Cell {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            left,
            width,
            height,
            spanning: false,
            placeholder: false,
        }
    }

    pub fn placeholder(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            placeholder: true,
            ..Self::new(top, left, width, height)
        }
    }

    pub fn from_points(top_left: Point, bottom_right: Point) -> Self {
        Self::new(
            top_left.y,
            top_left.x,
            bottom_right.x - top_left.x,
            bottom_right.y - top_left.y,
        )
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn bbox(&self) -> BBox {
        BBox {
            x0: self.left,
            top: self.top,
            x1: self.right(),
            bottom: self.bottom(),
        }
    }

    /// Corners as rounded points: top-left, top-right, bottom-left, bottom-right.
    pub fn corners(&self, precision: Precision) -> [Point; 4] {
        let (x0, x1) = (precision.round(self.left), precision.round(self.right()));
        let (y0, y1) = (precision.round(self.top), precision.round(self.bottom()));
        [
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x0, y1),
            Point::new(x1, y1),
        ]
    }

    pub fn is_finite(&self) -> bool {
        self.top.is_finite()
            && self.left.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }

    /// Reading order: top, then left.
    pub fn position_cmp(&self, other: &Cell) -> Ordering {
        self.top
            .total_cmp(&other.top)
            .then(self.left.total_cmp(&other.left))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Row and column counts of a grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    pub rows: usize,
    pub cols: usize,
}

impl GridDims {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LatticeSettings {
    /// Decimal digits kept before any coordinate comparison.
    pub precision: u32,
    /// How far a point may overshoot a ruling's extent and still lie on it.
    pub colinear_tolerance: f64,
    /// Rulings whose positions are this close are moved to their mean. 0 disables.
    pub snap_tolerance: f64,
    /// Colinear rulings separated by at most this gap are joined.
    pub join_tolerance: f64,
    pub min_ruling_length: f64,
    /// A region is tabular when `t < ratio < 1/t`.
    pub heuristic_threshold: f64,
    pub add_spanning_cells: bool,
}

impl Default for LatticeSettings {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            colinear_tolerance: DEFAULT_COLINEAR_TOLERANCE,
            snap_tolerance: DEFAULT_SNAP_TOLERANCE,
            join_tolerance: DEFAULT_JOIN_TOLERANCE,
            min_ruling_length: DEFAULT_MIN_RULING_LENGTH,
            heuristic_threshold: DEFAULT_HEURISTIC_THRESHOLD,
            add_spanning_cells: true,
        }
    }
}

impl LatticeSettings {
    pub fn precision(&self) -> Precision {
        Precision::new(self.precision)
    }

    pub fn validate(&self) -> Result<()> {
        if self.precision > MAX_PRECISION {
            return Err(LatticeError::settings(format!(
                "precision must be at most {MAX_PRECISION}, got {}",
                self.precision
            )));
        }
        let t = self.heuristic_threshold;
        if !(t > 0.0 && t < 1.0) {
            return Err(LatticeError::settings(format!(
                "heuristic_threshold must be in (0, 1), got {t}"
            )));
        }
        for (name, value) in [
            ("colinear_tolerance", self.colinear_tolerance),
            ("snap_tolerance", self.snap_tolerance),
            ("join_tolerance", self.join_tolerance),
            ("min_ruling_length", self.min_ruling_length),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(LatticeError::settings(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}
