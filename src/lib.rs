//! # Trackmap
//!
//! GPS track ingestion, measurement and simplification for photo-story maps.
//!
//! This library provides:
//! - GPX parsing of tracks, routes and waypoints with speed, distance and
//!   duration statistics
//! - KML placemark parsing, including GIS-exported description tables and
//!   per-source relabeling
//! - Douglas-Peucker simplification driven by a tolerance in feet or meters
//! - A privacy exclusion zone applied before any point reaches the output
//! - Assembly of tracks and photo markers into one GeoJSON `FeatureCollection`
//!
//! Every call is a pure transformation from text or records to a structure.
//! Fetching documents, caching and rendering belong to the caller.
//!
//! ## Features
//!
//! - **`parallel`** - Parse batches of independent documents with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use trackmap::{parse_gpx, post_map, MapConfig, Photo};
//!
//! let gpx = r#"<gpx><trk><name>Morning ride</name><trkseg>
//!     <trkpt lat="43.60" lon="-116.20"><time>2023-05-01T12:00:00Z</time></trkpt>
//!     <trkpt lat="43.61" lon="-116.21"><time>2023-05-01T12:10:00Z</time></trkpt>
//! </trkseg></trk></gpx>"#;
//!
//! let config = MapConfig::default();
//! let track = parse_gpx("morning-ride.gpx", gpx, &config).unwrap();
//!
//! let photos = vec![Photo::new(-116.205, 43.605, "Summit", "https://example.com/1.jpg")];
//! let map = post_map(Some(track), &photos, &config);
//! assert_eq!(map.len(), 2);
//! println!("{}", map.to_json().unwrap());
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, TrackMapError};

// Configuration snapshot passed into every call
pub mod config;
pub use config::{MapConfig, PrivacyZone, UnitSystem};

// GeoJSON feature model
pub mod features;
pub use features::{Feature, FeatureCollection, Geometry, Properties, PropertyValue};

// Distance, speed and outlier measurements
pub mod measure;

// Douglas-Peucker simplification
pub mod simplify;

// XML node accessors shared by the readers
pub mod xml;

// GPX tracks, routes and waypoints
pub mod gpx;
#[cfg(feature = "parallel")]
pub use gpx::parse_gpx_batch_parallel;
pub use gpx::{parse_gpx, parse_gpx_batch};

// KML placemarks and source-specific relabeling
pub mod kml;
pub use kml::{parse_kml, parse_kml_with};
pub mod sources;
pub use sources::{SourceRegistry, Transform};

// Per-post and site-wide feature collections
pub mod assemble;
pub use assemble::{first_photo_time, post_map, site_map, Photo};

// Marker overlay strings for static map images
pub mod static_map;
pub use static_map::marker_overlay;

// Algorithm toolbox - standalone access to the numeric functions
pub mod algorithms;

// ============================================================================
// Core Types
// ============================================================================

/// A track location: longitude, latitude, elevation, time and speed.
///
/// Serialized as the array `[lon, lat, ele, time, speed]`. Elevation is
/// rounded to whole feet (or meters), time is epoch milliseconds with 0 for
/// unknown, and speed is computed from the previous point of the same line.
///
/// # Example
/// ```
/// use trackmap::GeoPoint;
/// let point = GeoPoint::new(-116.2023, 43.6150); // Boise
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "(f64, f64, f64, i64, f64)",
    into = "(f64, f64, f64, i64, f64)"
)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
    pub elevation: f64,
    /// Epoch milliseconds, 0 when unknown
    pub time: i64,
    pub speed: f64,
}

impl GeoPoint {
    /// Create an untimed point at sea level.
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            elevation: 0.0,
            time: 0,
            speed: 0.0,
        }
    }

    /// Check if the point has valid WGS84 coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// `[longitude, latitude]` pair.
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

impl From<(f64, f64, f64, i64, f64)> for GeoPoint {
    fn from((longitude, latitude, elevation, time, speed): (f64, f64, f64, i64, f64)) -> Self {
        Self {
            longitude,
            latitude,
            elevation,
            time,
            speed,
        }
    }
}

impl From<GeoPoint> for (f64, f64, f64, i64, f64) {
    fn from(p: GeoPoint) -> Self {
        (p.longitude, p.latitude, p.elevation, p.time, p.speed)
    }
}

/// An ordered run of points; emitted lines are never empty.
pub type Line = Vec<GeoPoint>;

/// Bounding box of a feature collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

// ============================================================================
// Tests
// ============================================================================
