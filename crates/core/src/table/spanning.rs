//! Spanning cells and placeholder insertion.
//!
//! A cell that covers a ruling position it does not have as an edge is a
//! spanning cell (a row or column merge). For every position it covers, a
//! zero-size placeholder is appended so that row and column indices stay
//! regular for whoever lays the cells out as a grid:
//!
//! ```text
//! -----------------
//! | C | C  | C | C |
//! |----------------|
//! | C | SC   P | C |   SC spanning cell, holds the text
//! |---    +    ----|   P  placeholder, zero width or zero height
//! | C | P    DP | C |  DP double placeholder, zero width and height
//! -----------------
//! ```

use itertools::Itertools;

use super::types::{Cell, LatticeSettings, Ruling};

/// Flag spanning cells and append their placeholders to `cells`.
///
/// Only the cells present on entry are examined; nothing is removed or
/// resized.
pub fn add_spanning_cells(
    cells: &mut Vec<Cell>,
    vertical: &[Ruling],
    horizontal: &[Ruling],
    settings: &LatticeSettings,
) {
    let p = settings.precision();
    let vertical_locs = unique_positions(vertical, |x| p.round(x));
    let horizontal_locs = unique_positions(horizontal, |y| p.round(y));

    let mut placeholders: Vec<Cell> = Vec::new();
    for cell in cells.iter_mut() {
        let (left, right) = (p.round(cell.left), p.round(cell.right()));
        let (top, bottom) = (p.round(cell.top), p.round(cell.bottom()));
        let spanned_v: Vec<f64> = vertical_locs
            .iter()
            .copied()
            .filter(|&x| x > left && x < right)
            .collect();
        let spanned_h: Vec<f64> = horizontal_locs
            .iter()
            .copied()
            .filter(|&y| y > top && y < bottom)
            .collect();

        if !spanned_v.is_empty() {
            cell.spanning = true;
            placeholders.extend(
                spanned_v
                    .iter()
                    .map(|&x| Cell::placeholder(cell.top, x, 0.0, cell.height)),
            );
        }
        if !spanned_h.is_empty() {
            cell.spanning = true;
            placeholders.extend(
                spanned_h
                    .iter()
                    .map(|&y| Cell::placeholder(y, cell.left, cell.width, 0.0)),
            );
        }
        // A cell spanning rows and columns leaves interior grid points that
        // no other rectangle touches.
        placeholders.extend(
            spanned_v
                .iter()
                .cartesian_product(spanned_h.iter())
                .map(|(&x, &y)| Cell::placeholder(y, x, 0.0, 0.0)),
        );
    }

    tracing::debug!(
        cells = cells.len(),
        spanning = cells.iter().filter(|c| c.spanning).count(),
        placeholders = placeholders.len(),
        "resolved spanning cells"
    );
    cells.extend(placeholders);
}

fn unique_positions(rulings: &[Ruling], round: impl Fn(f64) -> f64) -> Vec<f64> {
    rulings
        .iter()
        .map(|r| round(r.position))
        .sorted_by(f64::total_cmp)
        .dedup()
        .collect()
}
