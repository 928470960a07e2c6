//! Ruling snapping, joining, cropping and ordering.
//!
//! Line detection hands over raw strokes: duplicated, broken into pieces,
//! slightly misaligned. This module turns them into the two sorted ruling
//! sets the intersection finder expects.

use std::collections::BTreeMap;

use crate::utils::Precision;

use super::types::{BBox, KeyF64, LatticeSettings, Orientation, Ruling, key_f64};

/// Split rulings by orientation, clean them up, and sort each set.
///
/// Returns `(horizontal, vertical)`.
pub fn normalize_rulings(
    rulings: &[Ruling],
    settings: &LatticeSettings,
) -> (Vec<Ruling>, Vec<Ruling>) {
    let precision = settings.precision();
    let (mut horizontal, mut vertical): (Vec<Ruling>, Vec<Ruling>) = rulings
        .iter()
        .filter(|r| r.length() >= settings.min_ruling_length)
        .partition(|r| r.is_horizontal());

    if settings.snap_tolerance > 0.0 {
        snap_rulings(&mut horizontal, settings.snap_tolerance);
        snap_rulings(&mut vertical, settings.snap_tolerance);
    }

    let mut horizontal = collapse_rulings(horizontal, settings.join_tolerance, precision);
    let mut vertical = collapse_rulings(vertical, settings.join_tolerance, precision);
    sort_rulings(&mut horizontal);
    sort_rulings(&mut vertical);
    (horizontal, vertical)
}

/// Sort rulings top-to-bottom then left-to-right (horizontal) or
/// left-to-right then top-to-bottom (vertical).
pub fn sort_rulings(rulings: &mut [Ruling]) {
    rulings.sort_by(Ruling::sort_cmp);
}

/// Cluster a list of positions; consecutive values within `tolerance` of
/// each other end up in the same group.
fn cluster_positions(mut xs: Vec<f64>, tolerance: f64) -> Vec<Vec<f64>> {
    xs.sort_by(f64::total_cmp);
    let mut groups: Vec<Vec<f64>> = Vec::new();
    for x in xs {
        match groups.last_mut() {
            Some(current) if current.last().is_some_and(|last| x <= last + tolerance) => {
                current.push(x)
            }
            _ => groups.push(vec![x]),
        }
    }
    groups
}

/// Move rulings of one orientation whose positions cluster within
/// `tolerance` to the cluster mean.
pub fn snap_rulings(rulings: &mut [Ruling], tolerance: f64) {
    let clusters = cluster_positions(rulings.iter().map(|r| r.position).collect(), tolerance);
    let mut snapped: BTreeMap<KeyF64, f64> = BTreeMap::new();
    for cluster in clusters {
        let avg = cluster.iter().sum::<f64>() / (cluster.len() as f64);
        for x in cluster {
            snapped.insert(key_f64(x), avg);
        }
    }
    for r in rulings.iter_mut() {
        if let Some(avg) = snapped.get(&key_f64(r.position)) {
            r.position = *avg;
        }
    }
}

/// Join rulings that share a position and overlap, touch, or leave a gap of
/// at most `tolerance`.
pub fn collapse_rulings(rulings: Vec<Ruling>, tolerance: f64, precision: Precision) -> Vec<Ruling> {
    // Group by orientation and rounded position
    let mut grouped: BTreeMap<(Orientation, KeyF64), Vec<Ruling>> = BTreeMap::new();
    for r in rulings {
        grouped
            .entry((r.orientation, key_f64(precision.round(r.position))))
            .or_default()
            .push(r);
    }

    let mut merged = Vec::new();
    for (_, group) in grouped {
        merged.extend(join_ruling_group(group, tolerance));
    }
    merged
}

fn join_ruling_group(mut group: Vec<Ruling>, tolerance: f64) -> Vec<Ruling> {
    group.sort_by(|a, b| a.start.total_cmp(&b.start));
    let mut joined: Vec<Ruling> = Vec::with_capacity(group.len());
    for r in group {
        match joined.last_mut() {
            Some(last) if r.start <= last.end + tolerance => {
                if r.end > last.end {
                    last.end = r.end;
                }
            }
            _ => joined.push(r),
        }
    }
    joined
}

/// Clip rulings to `area`, dropping those that fall outside it or shrink to
/// nothing.
pub fn crop_rulings(rulings: &[Ruling], area: BBox) -> Vec<Ruling> {
    rulings
        .iter()
        .filter_map(|r| {
            let (lo, hi, min, max) = match r.orientation {
                Orientation::Horizontal => (area.top, area.bottom, area.x0, area.x1),
                Orientation::Vertical => (area.x0, area.x1, area.top, area.bottom),
            };
            if r.position < lo || r.position > hi {
                return None;
            }
            let start = r.start.max(min);
            let end = r.end.min(max);
            if start >= end {
                return None;
            }
            Some(Ruling { start, end, ..*r })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_splits_and_sorts() {
        let rulings = vec![
            Ruling::vertical(20.0, 0.0, 10.0),
            Ruling::horizontal(10.0, 0.0, 20.0),
            Ruling::vertical(0.0, 0.0, 10.0),
            Ruling::horizontal(0.0, 0.0, 20.0),
        ];
        let (h, v) = normalize_rulings(&rulings, &LatticeSettings::default());
        assert_eq!(h.iter().map(|r| r.position).collect::<Vec<_>>(), vec![0.0, 10.0]);
        assert_eq!(v.iter().map(|r| r.position).collect::<Vec<_>>(), vec![0.0, 20.0]);
    }

    #[test]
    fn collapse_joins_overlapping_and_near_pieces() {
        let rulings = vec![
            Ruling::horizontal(5.0, 0.0, 4.0),
            Ruling::horizontal(5.0, 3.0, 8.0),
            Ruling::horizontal(5.0, 8.5, 12.0),
            Ruling::horizontal(5.0, 20.0, 30.0),
        ];
        let out = collapse_rulings(rulings, 1.0, Precision::default());
        assert_eq!(
            out,
            vec![
                Ruling::horizontal(5.0, 0.0, 12.0),
                Ruling::horizontal(5.0, 20.0, 30.0)
            ]
        );
    }

    #[test]
    fn snap_moves_close_positions_to_mean() {
        let mut rulings = vec![
            Ruling::vertical(10.0, 0.0, 5.0),
            Ruling::vertical(11.0, 5.0, 10.0),
            Ruling::vertical(40.0, 0.0, 10.0),
        ];
        snap_rulings(&mut rulings, 2.0);
        assert_eq!(rulings[0].position, 10.5);
        assert_eq!(rulings[1].position, 10.5);
        assert_eq!(rulings[2].position, 40.0);
    }

    #[test]
    fn min_length_filters_short_strokes() {
        let settings = LatticeSettings {
            min_ruling_length: 5.0,
            ..Default::default()
        };
        let rulings = vec![
            Ruling::horizontal(0.0, 0.0, 2.0),
            Ruling::horizontal(10.0, 0.0, 20.0),
        ];
        let (h, v) = normalize_rulings(&rulings, &settings);
        assert_eq!(h.len(), 1);
        assert!(v.is_empty());
    }

    #[test]
    fn crop_clips_to_area() {
        let area = BBox {
            x0: 0.0,
            top: 0.0,
            x1: 50.0,
            bottom: 50.0,
        };
        let rulings = vec![
            Ruling::horizontal(10.0, -20.0, 80.0),
            Ruling::horizontal(60.0, 0.0, 50.0),
            Ruling::vertical(25.0, 40.0, 90.0),
            Ruling::vertical(70.0, 0.0, 50.0),
        ];
        let out = crop_rulings(&rulings, area);
        assert_eq!(
            out,
            vec![
                Ruling::horizontal(10.0, 0.0, 50.0),
                Ruling::vertical(25.0, 40.0, 50.0)
            ]
        );
    }
}
