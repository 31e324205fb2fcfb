//! Distance, speed and outlier measurements.
//!
//! Pure functions over [`GeoPoint`] slices. Every function that reports a
//! distance or speed takes the [`UnitSystem`] explicitly.
//!
//! # Example
//! ```
//! use trackmap::{GeoPoint, UnitSystem};
//! use trackmap::measure::distance;
//!
//! let a = GeoPoint::new(-122.0, 48.0);
//! let b = GeoPoint::new(-121.0, 49.0);
//! let miles = distance(&a, &b, UnitSystem::Imperial);
//! assert!(miles > 82.0 && miles < 83.0);
//! ```

use crate::{GeoPoint, UnitSystem};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Fence multiplier applied to the interquartile range.
pub const OUTLIER_DISTANCE: f64 = 3.0;

/// Great-circle distance between two points using the haversine formula.
///
/// Elevation is ignored. Points sharing latitude and longitude are 0 apart.
pub fn distance(p1: &GeoPoint, p2: &GeoPoint, units: UnitSystem) -> f64 {
    if p1.latitude == p2.latitude && p1.longitude == p2.longitude {
        return 0.0;
    }

    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let d_lat = (p2.latitude - p1.latitude).to_radians();
    let d_lon = (p2.longitude - p1.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    units.earth_radius() * c
}

/// Speed between two timed points in miles or kilometers per hour.
///
/// Returns 0 when either time is unknown, the points coincide or no time
/// elapsed between them.
pub fn speed(p1: &GeoPoint, p2: &GeoPoint, units: UnitSystem) -> f64 {
    if p1.time == 0 || p2.time == 0 {
        return 0.0;
    }
    let elapsed = (p2.time - p1.time).abs() as f64 / MILLIS_PER_HOUR;
    if elapsed == 0.0 {
        return 0.0;
    }
    let d = distance(p1, p2, units);
    if d == 0.0 {
        return 0.0;
    }
    d / elapsed
}

/// Total length along consecutive points.
pub fn line_length(points: &[GeoPoint], units: UnitSystem) -> f64 {
    points
        .windows(2)
        .map(|pair| distance(&pair[0], &pair[1], units))
        .sum()
}

/// Hours between the first and last timed point, in the order given.
///
/// Points with an unknown time (0) are skipped; fewer than two timed points
/// give 0.
pub fn line_duration(points: &[GeoPoint]) -> f64 {
    let mut timed = points.iter().filter(|p| p.time != 0);
    match (timed.next(), timed.last()) {
        (Some(first), Some(last)) => (last.time - first.time) as f64 / MILLIS_PER_HOUR,
        _ => 0.0,
    }
}

/// Squared planar distance from `p` to the segment `a`-`b`.
///
/// Longitude and latitude are treated as a local Cartesian plane, which is
/// accurate enough at simplification tolerances.
pub fn point_to_segment_distance(p: &GeoPoint, a: &GeoPoint, b: &GeoPoint) -> f64 {
    let mut x = a.longitude;
    let mut y = a.latitude;
    let mut dx = b.longitude - x;
    let mut dy = b.latitude - y;

    if dx != 0.0 || dy != 0.0 {
        let t = ((p.longitude - x) * dx + (p.latitude - y) * dy) / (dx * dx + dy * dy);
        if t > 1.0 {
            x = b.longitude;
            y = b.latitude;
        } else if t > 0.0 {
            x += dx * t;
            y += dy * t;
        }
    }

    dx = p.longitude - x;
    dy = p.latitude - y;
    dx * dx + dy * dy
}

/// Inclusive range of non-outlier values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fence {
    pub min: f64,
    pub max: f64,
}

impl Fence {
    /// Whether the value lies inside the fence (bounds included).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Median of sorted values. Even lengths average the two central values.
fn median(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Interquartile fence `[Q1 - 3 IQR, Q3 + 3 IQR]`.
///
/// Sorted values are split at the middle: the lower half holds the first
/// `n / 2` values and the upper half the rest. Returns `None` for no values.
pub fn iqr_fence(values: &[f64]) -> Option<Fence> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let half = sorted.len() / 2;
    let lower = if half == 0 { &sorted[..] } else { &sorted[..half] };
    let upper = &sorted[half..];

    let q1 = median(lower);
    let q3 = median(upper);
    let range = q3 - q1;

    Some(Fence {
        min: q1 - range * OUTLIER_DISTANCE,
        max: q3 + range * OUTLIER_DISTANCE,
    })
}

/// Flag each value lying outside the interquartile fence of the whole set.
pub fn find_outliers(values: &[f64]) -> Vec<bool> {
    match iqr_fence(values) {
        Some(fence) => values.iter().map(|v| !fence.contains(*v)).collect(),
        None => Vec::new(),
    }
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
