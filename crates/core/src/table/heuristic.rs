//! Tabularity heuristic.
//!
//! Rulings also frame figures, boxed paragraphs and page borders. A region
//! is accepted as a table when the grid its rulings describe has roughly the
//! shape of the table guessed from text alone.

use super::finder::Region;
use super::types::GridDims;

/// Source of a line-free table estimate for a region, typically row and
/// column counts from clustering words.
pub trait TableEstimator {
    fn estimate(&self, region: &Region) -> Option<GridDims>;
}

/// A fixed estimate, already computed by the caller.
impl TableEstimator for GridDims {
    fn estimate(&self, _region: &Region) -> Option<GridDims> {
        Some(*self)
    }
}

impl TableEstimator for Option<GridDims> {
    fn estimate(&self, _region: &Region) -> Option<GridDims> {
        *self
    }
}

/// Mean of the row ratio and the column ratio between the ruling grid and
/// the estimate.
///
/// `None` when there is no estimate or the estimate has no rows or columns.
pub fn tabularity_ratio(lines: GridDims, estimate: Option<GridDims>) -> Option<f64> {
    let est = estimate?;
    if est.rows == 0 || est.cols == 0 {
        return None;
    }
    let rows = lines.rows as f64 / est.rows as f64;
    let cols = lines.cols as f64 / est.cols as f64;
    Some((rows + cols) / 2.0)
}

/// `threshold < ratio < 1 / threshold`; an undefined ratio is never tabular.
pub fn is_tabular_ratio(ratio: Option<f64>, threshold: f64) -> bool {
    match ratio {
        Some(r) => r > threshold && r < 1.0 / threshold,
        None => false,
    }
}
