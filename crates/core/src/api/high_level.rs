//! High-level reconstruction API
//!
//! - `reconstruct()` - full pipeline for one ruling set
//! - `reconstruct_many()` - independent ruling sets on a worker pool

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{LatticeError, Result};
use crate::table::{
    BBox, Cell, GridDims, LatticeSettings, Polygon, Region, Ruling, Spreadsheet,
    is_tabular_ratio, tabularity_ratio,
};

pub(crate) fn default_thread_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// `(fixed coordinate, extent start, extent end)`.
pub type Segment = (f64, f64, f64);

/// Rulings of one candidate region, as handed over by line detection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RulingSet {
    /// `(top, left, right)` per horizontal ruling.
    #[serde(default)]
    pub horizontal: Vec<Segment>,
    /// `(left, top, bottom)` per vertical ruling.
    #[serde(default)]
    pub vertical: Vec<Segment>,
    /// Crop rulings to this area first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<BBox>,
    /// Row/column counts guessed from text without looking at rulings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<GridDims>,
}

impl RulingSet {
    pub fn rulings(&self) -> Vec<Ruling> {
        self.horizontal
            .iter()
            .map(|&(top, left, right)| Ruling::horizontal(top, left, right))
            .chain(
                self.vertical
                    .iter()
                    .map(|&(left, top, bottom)| Ruling::vertical(left, top, bottom)),
            )
            .collect()
    }
}

/// Everything reconstructed for one region.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Reconstruction {
    /// Position of the ruling set in the batch.
    pub index: usize,
    /// Cells, placeholders included, in `(top, left)` order.
    pub cells: Vec<Cell>,
    pub regions: Vec<Polygon>,
    /// Grid shape of the first region.
    pub line_dims: Option<GridDims>,
    pub ratio: Option<f64>,
    pub tabular: bool,
}

/// Run the full pipeline on one ruling set.
pub fn reconstruct(set: &RulingSet, settings: &LatticeSettings) -> Result<Reconstruction> {
    reconstruct_indexed(0, set, settings)
}

fn reconstruct_indexed(
    index: usize,
    set: &RulingSet,
    settings: &LatticeSettings,
) -> Result<Reconstruction> {
    let mut region = Region::new(&set.rulings(), set.area, settings.clone())?;
    region.find_cells();
    if settings.add_spanning_cells {
        region.add_spanning_cells();
    }

    let sheets = region.spreadsheets()?;
    let line_dims = sheets.first().map(Spreadsheet::dims);
    let ratio = line_dims.and_then(|dims| tabularity_ratio(dims, set.estimate));
    let tabular = is_tabular_ratio(ratio, settings.heuristic_threshold);
    let regions = sheets.into_iter().map(|s| s.bounds).collect();

    let mut cells = region.into_cells();
    cells.sort_by(Cell::position_cmp);
    Ok(Reconstruction {
        index,
        cells,
        regions,
        line_dims,
        ratio,
        tabular,
    })
}

/// Reconstruct independent regions in parallel.
///
/// Output keeps input order. A region whose geometry cannot be merged is
/// logged with its rulings and left out; any other error aborts the batch.
pub fn reconstruct_many(
    sets: &[RulingSet],
    settings: &LatticeSettings,
    threads: Option<usize>,
) -> Result<Vec<Reconstruction>> {
    settings.validate()?;
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads.unwrap_or_else(default_thread_count))
        .build()
        .map_err(|e| LatticeError::ThreadPool {
            message: e.to_string(),
        })?;

    let results: Vec<Result<Reconstruction>> = pool.install(|| {
        sets.par_iter()
            .enumerate()
            .map(|(index, set)| reconstruct_indexed(index, set, settings))
            .collect()
    });

    let mut out = Vec::with_capacity(results.len());
    for (index, (set, result)) in sets.iter().zip(results).enumerate() {
        match result {
            Ok(r) => out.push(r),
            Err(e) if e.is_geometry_inconsistency() => {
                tracing::warn!(
                    index,
                    horizontal = ?set.horizontal,
                    vertical = ?set.vertical,
                    error = %e,
                    "dropping region"
                );
            }
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}
