//! Table structure reconstruction from ruling lines.
//!
//! Pipeline: rulings → crossing points → minimal cells → spanning cells and
//! placeholders; independently, cells → region polygons. A heuristic then
//! compares the ruling grid with a text-based estimate to decide whether the
//! region is a table at all.

mod finder;
mod grid;
mod heuristic;
mod intersections;
mod regions;
mod rulings;
mod spanning;
mod types;

// Re-export public types
pub use finder::Region;
pub use grid::Spreadsheet;
pub use heuristic::TableEstimator;
pub use intersections::{Crossing, Intersections};
pub use regions::Polygon;
pub use types::{BBox, Cell, GridDims, LatticeSettings, Orientation, Point, Ruling};

// Re-export public API functions
pub use grid::{find_cells, intersections_to_cells};
pub use heuristic::{is_tabular_ratio, tabularity_ratio};
pub use intersections::find_intersections;
pub use regions::find_regions;
pub use rulings::{collapse_rulings, crop_rulings, normalize_rulings, snap_rulings, sort_rulings};
pub use spanning::add_spanning_cells;

#[cfg(test)]
mod table_reconstruction_tests {
    use super::*;

    fn settings() -> LatticeSettings {
        LatticeSettings::default()
    }

    #[test]
    fn two_separate_tables_give_two_regions() {
        let mut rulings = Vec::new();
        for offset in [0.0, 100.0] {
            for k in 0..3 {
                let at = offset + 10.0 * k as f64;
                rulings.push(Ruling::horizontal(at, offset, offset + 20.0));
                rulings.push(Ruling::vertical(at, offset, offset + 20.0));
            }
        }
        let (h, v) = normalize_rulings(&rulings, &settings());
        let cells = find_cells(&h, &v, &settings());
        assert_eq!(cells.len(), 8);

        let regions = find_regions(&cells, &settings()).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].bbox().x1, 20.0);
        assert_eq!(regions[1].bbox().x0, 100.0);
    }

    #[test]
    fn intersection_keys_sort_both_ways() {
        let h = vec![
            Ruling::horizontal(0.0, 0.0, 10.0),
            Ruling::horizontal(10.0, 0.0, 10.0),
        ];
        let v = vec![
            Ruling::vertical(0.0, 0.0, 10.0),
            Ruling::vertical(10.0, 0.0, 10.0),
        ];
        let intersections = find_intersections(&h, &v, &settings());
        let row_major = intersections.points_row_major();
        let col_major = intersections.points_column_major();
        assert_eq!(row_major[1], Point::new(10.0, 0.0));
        assert_eq!(col_major[1], Point::new(0.0, 10.0));
        let crossing = intersections.get(&Point::new(10.0, 10.0)).unwrap();
        assert_eq!(crossing.horizontal, h[1]);
        assert_eq!(crossing.vertical, v[1]);
    }

    #[test]
    fn spreadsheet_rows_include_placeholders() {
        // 2 x 2 grid whose bottom row is one merged cell
        let rulings = vec![
            Ruling::horizontal(0.0, 0.0, 20.0),
            Ruling::horizontal(10.0, 0.0, 20.0),
            Ruling::horizontal(20.0, 0.0, 20.0),
            Ruling::vertical(0.0, 0.0, 20.0),
            Ruling::vertical(10.0, 0.0, 10.0),
            Ruling::vertical(20.0, 0.0, 20.0),
        ];
        let mut region = Region::new(&rulings, None, settings()).unwrap();
        region.find_cells();
        assert_eq!(region.cells().len(), 3);
        region.add_spanning_cells();
        assert_eq!(region.cells().len(), 4);

        let sheets = region.spreadsheets().unwrap();
        assert_eq!(sheets.len(), 1);
        let rows = sheets[0].rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].len(), 2);
        assert!(rows[1][0].spanning);
        assert!(rows[1][1].placeholder);
        assert_eq!(sheets[0].dims(), GridDims::new(2, 2));
    }
}
