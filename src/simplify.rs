//! Douglas-Peucker line simplification.
//!
//! The tolerance is given in the elevation unit (feet or meters) and converted
//! to a fraction of the equator's length. That factor is compared directly
//! against the squared deviation in degrees. Ranges still to be examined are
//! kept on an explicit stack so very long tracks cannot exhaust the call stack.

use crate::measure::point_to_segment_distance;
use crate::{GeoPoint, UnitSystem};

/// Tolerance in feet (or meters) as a fraction of the equator's length.
pub fn tolerance_factor(tolerance: f64, units: UnitSystem) -> f64 {
    tolerance / units.equator_length()
}

/// Reduce `points` while keeping every removed point within `tolerance`
/// of the simplified path.
///
/// The first and last point are always kept. A tolerance at or below zero
/// returns the input unchanged.
///
/// # Example
/// ```
/// use trackmap::{GeoPoint, UnitSystem};
/// use trackmap::simplify::simplify;
///
/// let track = vec![
///     GeoPoint::new(-116.20, 43.60),
///     GeoPoint::new(-116.19, 43.60),
///     GeoPoint::new(-116.18, 43.60),
/// ];
/// let simplified = simplify(&track, 10.0, UnitSystem::Imperial);
/// assert_eq!(simplified.len(), 2);
/// ```
pub fn simplify(points: &[GeoPoint], tolerance: f64, units: UnitSystem) -> Vec<GeoPoint> {
    if tolerance <= 0.0 || !tolerance.is_finite() || points.len() < 3 {
        return points.to_vec();
    }

    let sq_tolerance = tolerance_factor(tolerance, units);

    let last_index = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last_index] = true;

    let mut ranges: Vec<(usize, usize)> = vec![(0, last_index)];

    while let Some((first, last)) = ranges.pop() {
        let mut max_distance = 0.0;
        let mut index = first;

        for i in (first + 1)..last {
            let d = point_to_segment_distance(&points[i], &points[first], &points[last]);
            if d > max_distance {
                index = i;
                max_distance = d;
            }
        }

        if max_distance > sq_tolerance {
            keep[index] = true;
            ranges.push((first, index));
            ranges.push((index, last));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(*p))
        .collect()
}
