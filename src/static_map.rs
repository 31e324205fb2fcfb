//! Marker overlay strings for static map images.
//!
//! Static map image services take markers inline in the request path, so the
//! count must stay bounded. Photos beyond `max_markers` are dropped by
//! uniform sampling.

use crate::assemble::Photo;
use crate::MapConfig;

/// Comma-separated `pin-s(<lon>,<lat>)` markers, or `None` when there is
/// nothing to draw.
///
/// # Example
/// ```
/// use trackmap::{marker_overlay, MapConfig, Photo};
///
/// let photos = vec![Photo::new(-116.2, 43.6, "River", "https://example.com/1.jpg")];
/// let overlay = marker_overlay(&photos, &MapConfig::default());
/// assert_eq!(overlay.as_deref(), Some("pin-s(-116.20000,43.60000)"));
/// ```
pub fn marker_overlay(photos: &[Photo], config: &MapConfig) -> Option<String> {
    let locations: Vec<[f64; 2]> = photos
        .iter()
        .filter(|photo| photo.is_mappable(config))
        .map(|photo| [photo.longitude, photo.latitude])
        .collect();

    let max = config.max_markers;
    if locations.is_empty() || max == 0 {
        return None;
    }

    // Limit to max markers if needed (uniform sampling)
    let sampled: Vec<[f64; 2]> = if locations.len() > max {
        let step = locations.len() as f64 / max as f64;
        (0..max)
            .map(|i| locations[(i as f64 * step) as usize])
            .collect()
    } else {
        locations
    };

    Some(
        sampled
            .iter()
            .map(|[lon, lat]| format!("pin-s({:.5},{:.5})", lon, lat))
            .collect::<Vec<_>>()
            .join(","),
    )
}
