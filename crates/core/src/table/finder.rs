//! Region: one candidate table area and its reconstruction state.
//!
//! A region owns its rulings and its cell list for the lifetime of one
//! reconstruction. The cell list is replaced by [`Region::find_cells`] and
//! grown in place by [`Region::add_spanning_cells`].

use crate::error::{LatticeError, Result};

use super::grid::{Spreadsheet, find_cells};
use super::heuristic::{TableEstimator, is_tabular_ratio, tabularity_ratio};
use super::regions::{Polygon, find_regions};
use super::rulings::{crop_rulings, normalize_rulings, sort_rulings};
use super::spanning::add_spanning_cells;
use super::types::{BBox, Cell, GridDims, LatticeSettings, Ruling};

#[derive(Clone, Debug)]
pub struct Region {
    horizontal: Vec<Ruling>,
    vertical: Vec<Ruling>,
    cells: Vec<Cell>,
    area: Option<BBox>,
    settings: LatticeSettings,
}

impl Region {
    /// Build a region from raw rulings of both orientations.
    ///
    /// Rulings are cropped to `area` when given, then snapped, joined and
    /// sorted according to `settings`.
    pub fn new(rulings: &[Ruling], area: Option<BBox>, settings: LatticeSettings) -> Result<Self> {
        settings.validate()?;
        check_finite(rulings)?;
        let cropped;
        let rulings = match area {
            Some(area) => {
                cropped = crop_rulings(rulings, area);
                cropped.as_slice()
            }
            None => rulings,
        };
        let (horizontal, vertical) = normalize_rulings(rulings, &settings);
        Ok(Self {
            horizontal,
            vertical,
            cells: Vec::new(),
            area,
            settings,
        })
    }

    /// Build a region from rulings that are already clean, skipping
    /// snapping and joining. Each set is still sorted.
    pub fn from_rulings(
        mut horizontal: Vec<Ruling>,
        mut vertical: Vec<Ruling>,
        settings: LatticeSettings,
    ) -> Result<Self> {
        settings.validate()?;
        if horizontal.iter().any(|r| !r.is_horizontal())
            || vertical.iter().any(|r| !r.is_vertical())
        {
            return Err(LatticeError::ruling("ruling set mixes orientations"));
        }
        check_finite(&horizontal)?;
        check_finite(&vertical)?;
        sort_rulings(&mut horizontal);
        sort_rulings(&mut vertical);
        Ok(Self {
            horizontal,
            vertical,
            cells: Vec::new(),
            area: None,
            settings,
        })
    }

    pub fn horizontal_rulings(&self) -> &[Ruling] {
        &self.horizontal
    }

    pub fn vertical_rulings(&self) -> &[Ruling] {
        &self.vertical
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }

    pub fn area(&self) -> Option<BBox> {
        self.area
    }

    pub fn settings(&self) -> &LatticeSettings {
        &self.settings
    }

    /// Replace the cell list with the minimal cells of the ruling grid.
    pub fn find_cells(&mut self) -> &[Cell] {
        self.cells = find_cells(&self.horizontal, &self.vertical, &self.settings);
        &self.cells
    }

    /// Flag spanning cells and append placeholders.
    pub fn add_spanning_cells(&mut self) {
        add_spanning_cells(
            &mut self.cells,
            &self.vertical,
            &self.horizontal,
            &self.settings,
        );
    }

    /// Outlines of the contiguous areas covered by the current cells.
    pub fn find_regions(&self) -> Result<Vec<Polygon>> {
        find_regions(&self.cells, &self.settings)
    }

    /// One spreadsheet per region polygon, holding the cells inside it.
    pub fn spreadsheets(&self) -> Result<Vec<Spreadsheet>> {
        let polygons = self.find_regions()?;
        Ok(Spreadsheet::from_regions(
            polygons,
            &self.cells,
            self.settings.precision(),
        ))
    }

    /// Row and column counts of the first spreadsheet.
    pub fn line_dims(&self) -> Result<Option<GridDims>> {
        Ok(self.spreadsheets()?.first().map(Spreadsheet::dims))
    }

    /// Ratio between the ruling grid and the estimator's guess.
    ///
    /// Uses the current cells, so call [`Region::find_cells`] first. A
    /// geometry inconsistency leaves the ratio undefined.
    pub fn heuristic_ratio<E: TableEstimator + ?Sized>(&self, estimator: &E) -> Option<f64> {
        let lines = match self.line_dims() {
            Ok(dims) => dims?,
            Err(e) => {
                tracing::warn!(error = %e, "no spreadsheet for heuristic ratio");
                return None;
            }
        };
        tabularity_ratio(lines, estimator.estimate(self))
    }

    pub fn is_tabular<E: TableEstimator + ?Sized>(&self, estimator: &E) -> bool {
        is_tabular_ratio(
            self.heuristic_ratio(estimator),
            self.settings.heuristic_threshold,
        )
    }
}

fn check_finite(rulings: &[Ruling]) -> Result<()> {
    match rulings.iter().find(|r| !r.is_finite()) {
        Some(bad) => Err(LatticeError::ruling(format!(
            "non-finite ruling {:?} at {}",
            bad.orientation, bad.position
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_rulings(xs: &[f64], ys: &[f64]) -> Vec<Ruling> {
        let (x0, x1) = (xs[0], xs[xs.len() - 1]);
        let (y0, y1) = (ys[0], ys[ys.len() - 1]);
        ys.iter()
            .map(|&y| Ruling::horizontal(y, x0, x1))
            .chain(xs.iter().map(|&x| Ruling::vertical(x, y0, y1)))
            .collect()
    }

    #[test]
    fn region_with_no_rulings_is_empty_and_not_tabular() {
        let mut region = Region::new(&[], None, LatticeSettings::default()).unwrap();
        assert!(region.find_cells().is_empty());
        assert!(region.find_regions().unwrap().is_empty());
        assert_eq!(region.heuristic_ratio(&GridDims::new(3, 3)), None);
        assert!(!region.is_tabular(&GridDims::new(3, 3)));
    }

    #[test]
    fn region_reports_its_grid_shape() {
        let rulings = grid_rulings(&[0.0, 10.0, 20.0, 30.0], &[0.0, 10.0, 20.0]);
        let mut region = Region::new(&rulings, None, LatticeSettings::default()).unwrap();
        assert_eq!(region.find_cells().len(), 6);
        assert_eq!(region.line_dims().unwrap(), Some(GridDims::new(2, 3)));
        assert_eq!(region.heuristic_ratio(&GridDims::new(2, 3)), Some(1.0));
        assert!(region.is_tabular(&GridDims::new(2, 3)));
        assert!(!region.is_tabular(&None::<GridDims>));
    }

    #[test]
    fn area_crops_rulings_before_reconstruction() {
        let rulings = grid_rulings(&[0.0, 10.0, 20.0, 30.0], &[0.0, 10.0, 20.0]);
        let area = BBox {
            x0: 0.0,
            top: 0.0,
            x1: 20.0,
            bottom: 20.0,
        };
        let mut region = Region::new(&rulings, Some(area), LatticeSettings::default()).unwrap();
        assert_eq!(region.vertical_rulings().len(), 3);
        assert_eq!(region.find_cells().len(), 4);
    }

    #[test]
    fn invalid_input_is_rejected() {
        let settings = LatticeSettings {
            heuristic_threshold: 0.0,
            ..Default::default()
        };
        assert!(Region::new(&[], None, settings).is_err());
        let nan = [Ruling::horizontal(f64::NAN, 0.0, 1.0)];
        assert!(matches!(
            Region::new(&nan, None, LatticeSettings::default()),
            Err(LatticeError::InvalidRuling { .. })
        ));
        assert!(
            Region::from_rulings(
                vec![Ruling::vertical(0.0, 0.0, 1.0)],
                vec![],
                LatticeSettings::default()
            )
            .is_err()
        );
    }

    #[test]
    fn clean_rulings_are_still_checked_for_finiteness() {
        let err = Region::from_rulings(
            vec![Ruling::horizontal(0.0, 0.0, f64::INFINITY)],
            vec![Ruling::vertical(0.0, 0.0, 10.0)],
            LatticeSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LatticeError::InvalidRuling { .. }));

        let err = Region::from_rulings(
            vec![],
            vec![Ruling::vertical(f64::NAN, 0.0, 10.0)],
            LatticeSettings::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LatticeError::InvalidRuling { .. }));
    }

    #[test]
    fn huge_coordinates_reconstruct_normally() {
        let rulings = grid_rulings(&[0.0, 1e304], &[0.0, 10.0]);
        let mut region = Region::new(&rulings, None, LatticeSettings::default()).unwrap();
        assert_eq!(region.find_cells().len(), 1);
        assert_eq!(region.cells()[0].width, 1e304);
        assert_eq!(region.find_regions().unwrap().len(), 1);
    }
}
