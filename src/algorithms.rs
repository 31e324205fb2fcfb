//! # Algorithm Toolbox
//!
//! Direct access to the numeric building blocks used by the readers, for
//! callers that hold coordinates already and need no document parsing.
//!
//! ## Measurement
//!
//! - **Haversine Distance**: Great-circle distance between two points
//! - **Speed**: Distance over elapsed time between two timed points
//! - **Line Length / Duration**: Totals along a point sequence
//! - **Point-to-Segment Distance**: Squared planar deviation
//! - **IQR Fence**: Outlier detection over timestamps
//!
//! ## Line Simplification
//!
//! - **Douglas-Peucker**: Iterative simplification with a tolerance in feet
//!
//! # Example
//!
//! ```rust
//! use trackmap::algorithms::{distance, douglas_peucker, GeoPoint, UnitSystem};
//!
//! let boise = GeoPoint::new(-116.2023, 43.6150);
//! let mccall = GeoPoint::new(-116.0987, 44.9110);
//! let miles = distance(&boise, &mccall, UnitSystem::Imperial);
//! println!("Boise to McCall: {:.0} miles", miles);
//!
//! let simplified = douglas_peucker(&[boise, mccall], 0.5, UnitSystem::Imperial);
//! assert_eq!(simplified.len(), 2);
//! ```

// =============================================================================
// Core Types (re-exported from lib)
// =============================================================================

pub use crate::{GeoPoint, Line, UnitSystem};

// =============================================================================
// Measurement
// =============================================================================

pub use crate::measure::{
    distance,
    find_outliers,
    iqr_fence,
    line_duration,
    line_length,
    point_to_segment_distance,
    speed,
    Fence,
};

// =============================================================================
// Line Simplification
// =============================================================================

/// Douglas-Peucker line simplification.
///
/// Reduces the number of points in a polyline while preserving shape. The
/// tolerance is in feet (imperial) or meters (metric); zero or less returns
/// the input unchanged.
pub use crate::simplify::simplify as douglas_peucker;

/// Tolerance conversion from feet or meters to a fraction of the equator.
pub use crate::simplify::tolerance_factor;
