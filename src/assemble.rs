//! Feature collection assembly for a single post or the whole site.
//!
//! Track features arrive already simplified from the GPX reader. Photos become
//! plain point features and are never simplified.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::features::{Feature, FeatureCollection, Properties};
use crate::measure::find_outliers;
use crate::{GeoPoint, MapConfig};

/// A geotagged photo harvested from the photo host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub longitude: f64,
    pub latitude: f64,
    pub title: String,
    pub preview_url: String,
    /// Sub-page of a multi-part story the photo belongs to; `None` for a
    /// single-part post
    #[serde(default)]
    pub part_key: Option<String>,
    /// Capture time in epoch milliseconds
    #[serde(default)]
    pub taken_at: Option<i64>,
}

impl Photo {
    pub fn new(longitude: f64, latitude: f64, title: &str, preview_url: &str) -> Self {
        Self {
            longitude,
            latitude,
            title: title.to_string(),
            preview_url: preview_url.to_string(),
            part_key: None,
            taken_at: None,
        }
    }

    pub fn with_part_key(mut self, part_key: &str) -> Self {
        self.part_key = Some(part_key.to_string());
        self
    }

    pub fn with_taken_at(mut self, taken_at: i64) -> Self {
        self.taken_at = Some(taken_at);
        self
    }

    /// Whether the photo can be placed on a map.
    ///
    /// A zero latitude means the host had no location for the photo.
    pub fn is_mappable(&self, config: &MapConfig) -> bool {
        self.latitude != 0.0
            && GeoPoint::new(self.longitude, self.latitude).is_valid()
            && !config.is_private(self.longitude, self.latitude)
    }
}

/// Map for one post: its track features followed by its photos.
///
/// Photos are emitted in the order given; multi-part stories pass the photos
/// of every part in part order, each carrying its `part_key`. `partKey` is
/// written only for photos that carry one, so single-part posts must leave
/// it unset.
pub fn post_map(
    track: Option<FeatureCollection>,
    photos: &[Photo],
    config: &MapConfig,
) -> FeatureCollection {
    let mut collection = track.unwrap_or_default();
    let track_features = collection.len();

    collection.features.extend(
        photos
            .iter()
            .filter(|photo| photo.is_mappable(config))
            .map(|photo| {
                let mut properties = Properties::new();
                properties.set_url(Some(photo.preview_url.clone()));
                properties.set_title(Some(photo.title.clone()));
                properties.set_part_key(photo.part_key.clone());
                Feature::point(photo.longitude, photo.latitude, properties)
            }),
    );

    debug!(
        "[Assemble] Post map: {} track features, {} of {} photos",
        track_features,
        collection.len() - track_features,
        photos.len()
    );
    collection
}

/// Map of every published photo; points carry only their preview URL.
pub fn site_map(photos: &[Photo], config: &MapConfig) -> FeatureCollection {
    let features: Vec<Feature> = photos
        .iter()
        .filter(|photo| photo.is_mappable(config))
        .map(|photo| {
            let mut properties = Properties::new();
            properties.set_url(Some(photo.preview_url.clone()));
            Feature::point(photo.longitude, photo.latitude, properties)
        })
        .collect();

    debug!("[Assemble] Site map: {} of {} photos", features.len(), photos.len());
    FeatureCollection::from(features)
}

/// Earliest capture time that is not a clock-skew outlier.
///
/// Cameras with an unset clock stamp photos years away from the rest of the
/// post; those times fall outside the interquartile fence and are ignored.
pub fn first_photo_time(photos: &[Photo]) -> Option<i64> {
    let times: Vec<i64> = photos.iter().filter_map(|p| p.taken_at).collect();
    let values: Vec<f64> = times.iter().map(|t| *t as f64).collect();

    times
        .iter()
        .zip(find_outliers(&values))
        .filter(|(_, outlier)| !outlier)
        .map(|(time, _)| *time)
        .min()
}
