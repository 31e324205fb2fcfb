//! Map building configuration.
//!
//! A [`MapConfig`] is an immutable snapshot passed by reference into every
//! reader and assembler call. Two calls holding different configurations (for
//! example one imperial and one metric) never interfere with each other.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackMapError};
use crate::GeoPoint;

/// Feet per meter, used to convert GPX elevations.
pub const FEET_PER_METER: f64 = 3.28084;

/// Unit system for every distance, elevation and speed the crate reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Miles, feet and miles per hour
    #[default]
    Imperial,
    /// Kilometers, meters and kilometers per hour
    Metric,
}

impl UnitSystem {
    /// Earth radius in the long distance unit (miles or kilometers).
    pub fn earth_radius(&self) -> f64 {
        match self {
            UnitSystem::Imperial => 3958.756,
            UnitSystem::Metric => 6371.0,
        }
    }

    /// Multiplier converting meters into the elevation unit.
    pub fn elevation_factor(&self) -> f64 {
        match self {
            UnitSystem::Imperial => FEET_PER_METER,
            UnitSystem::Metric => 1.0,
        }
    }

    /// Length of the equator in the elevation unit (feet or meters).
    pub fn equator_length(&self) -> f64 {
        match self {
            UnitSystem::Imperial => 5280.0 * 24901.0,
            UnitSystem::Metric => 1000.0 * 40075.017,
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitSystem::Imperial => write!(f, "imperial"),
            UnitSystem::Metric => write!(f, "metric"),
        }
    }
}

impl FromStr for UnitSystem {
    type Err = TrackMapError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "imperial" | "english" | "miles" => Ok(UnitSystem::Imperial),
            "metric" | "kilometers" | "km" => Ok(UnitSystem::Metric),
            other => Err(TrackMapError::config(format!(
                "unknown unit system '{}'",
                other
            ))),
        }
    }
}

/// Circular region whose points are never emitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyZone {
    /// Zone center as `[longitude, latitude]`
    pub center: [f64; 2],
    /// Exclusion radius in miles, independent of the unit system
    pub radius_miles: f64,
}

impl PrivacyZone {
    pub fn new(longitude: f64, latitude: f64, radius_miles: f64) -> Self {
        Self {
            center: [longitude, latitude],
            radius_miles,
        }
    }

    /// True when the point lies strictly inside the radius.
    ///
    /// A point exactly `radius_miles` from the center is outside the zone.
    pub fn contains(&self, longitude: f64, latitude: f64) -> bool {
        let center = GeoPoint::new(self.center[0], self.center[1]);
        let point = GeoPoint::new(longitude, latitude);
        crate::measure::distance(&center, &point, UnitSystem::Imperial) < self.radius_miles
    }
}

/// Configuration for track parsing and map assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapConfig {
    /// Douglas-Peucker tolerance in the elevation unit (feet or meters).
    /// Zero or negative disables simplification. Default: 0.5
    pub simplify_tolerance: f64,

    /// Speeds at or above this value are treated as GPS noise and left out of
    /// the speed statistics. Zero disables the check. Default: 150.0 (mph)
    pub max_possible_speed: f64,

    /// Optional exclusion zone around a private location. Default: None
    pub privacy_zone: Option<PrivacyZone>,

    /// Maximum markers encoded into a static map overlay. Default: 70
    pub max_markers: usize,

    /// Units for all reported measurements. Default: imperial
    pub unit_system: UnitSystem,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            simplify_tolerance: 0.5,
            max_possible_speed: 150.0,
            privacy_zone: None,
            max_markers: 70,
            unit_system: UnitSystem::Imperial,
        }
    }
}

impl MapConfig {
    /// Load a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: MapConfig = serde_json::from_str(text)
            .map_err(|e| TrackMapError::config(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot be used.
    ///
    /// Simplification tolerance is deliberately unchecked: values at or below
    /// zero switch simplification off.
    pub fn validate(&self) -> Result<()> {
        if !self.max_possible_speed.is_finite() || self.max_possible_speed < 0.0 {
            return Err(TrackMapError::config(format!(
                "maxPossibleSpeed must be zero or positive, got {}",
                self.max_possible_speed
            )));
        }
        if let Some(zone) = &self.privacy_zone {
            if !zone.radius_miles.is_finite() || zone.radius_miles < 0.0 {
                return Err(TrackMapError::config(format!(
                    "privacy radius must be zero or positive, got {}",
                    zone.radius_miles
                )));
            }
            if !GeoPoint::new(zone.center[0], zone.center[1]).is_valid() {
                return Err(TrackMapError::config(format!(
                    "privacy center [{}, {}] is not a valid longitude/latitude",
                    zone.center[0], zone.center[1]
                )));
            }
        }
        Ok(())
    }

    /// Whether a raw location must be discarded for privacy.
    pub fn is_private(&self, longitude: f64, latitude: f64) -> bool {
        self.privacy_zone
            .map(|zone| zone.contains(longitude, latitude))
            .unwrap_or(false)
    }

    /// Speed values at or above the limit are noise; a zero limit accepts all.
    pub fn is_plausible_speed(&self, speed: f64) -> bool {
        self.max_possible_speed <= 0.0 || speed < self.max_possible_speed
    }
}
