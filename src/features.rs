//! GeoJSON-compatible feature model.
//!
//! Serializing a [`FeatureCollection`] with `serde_json` yields standard
//! GeoJSON (`{"type":"FeatureCollection","features":[...]}`) ready for a map
//! client.

use geo::{BoundingRect, MultiPoint, Point};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Bounds, GeoPoint, Line};

/// A property value: text or a plain JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

/// Keep only text with visible content.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Feature properties.
///
/// Well-known fields are explicit; anything else (for example columns read
/// from a KML description table) goes into `extra`, which keeps insertion
/// order. Absent values are never serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Properties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sym: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_key: Option<String>,
    /// Hours between first and last point
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Unsimplified length in miles or kilometers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_speed: Option<f64>,
    /// Source-specific fields
    #[serde(flatten)]
    pub extra: IndexMap<String, PropertyValue>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_name(&mut self, value: Option<String>) {
        self.name = non_empty(value);
    }

    pub fn set_description(&mut self, value: Option<String>) {
        self.description = non_empty(value);
    }

    pub fn set_url(&mut self, value: Option<String>) {
        self.url = non_empty(value);
    }

    pub fn set_title(&mut self, value: Option<String>) {
        self.title = non_empty(value);
    }

    pub fn set_part_key(&mut self, value: Option<String>) {
        self.part_key = non_empty(value);
    }

    /// Add an extension field; empty text is skipped.
    pub fn insert(&mut self, key: &str, value: impl Into<PropertyValue>) {
        let value = value.into();
        if key.trim().is_empty() {
            return;
        }
        if let PropertyValue::Text(text) = &value {
            if text.trim().is_empty() {
                return;
            }
        }
        self.extra.insert(key.to_string(), value);
    }

    /// Extension field by name.
    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.extra.get(key)
    }

    /// Remove an extension field, keeping the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        self.extra.shift_remove(key)
    }
}

/// Feature geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    /// `[longitude, latitude]`
    Point([f64; 2]),
    /// A single track segment or route
    LineString(Line),
    /// A track with several segments
    MultiLineString(Vec<Line>),
}

impl Geometry {
    /// Every `[longitude, latitude]` pair in the geometry.
    pub fn coordinates(&self) -> Vec<[f64; 2]> {
        match self {
            Geometry::Point(c) => vec![*c],
            Geometry::LineString(line) => line.iter().map(GeoPoint::lon_lat).collect(),
            Geometry::MultiLineString(lines) => lines
                .iter()
                .flat_map(|line| line.iter().map(GeoPoint::lon_lat))
                .collect(),
        }
    }
}

/// A GeoJSON feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub properties: Properties,
    pub geometry: Geometry,
}

impl Feature {
    pub fn point(longitude: f64, latitude: f64, properties: Properties) -> Self {
        Self {
            id: None,
            properties,
            geometry: Geometry::Point([longitude, latitude]),
        }
    }

    pub fn line(line: Line, properties: Properties) -> Self {
        Self {
            id: None,
            properties,
            geometry: Geometry::LineString(line),
        }
    }

    pub fn multi_line(lines: Vec<Line>, properties: Properties) -> Self {
        Self {
            id: None,
            properties,
            geometry: Geometry::MultiLineString(lines),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// The complete map payload for one story or for the whole site.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Bounding box over every coordinate, `None` for an empty collection.
    pub fn bounds(&self) -> Option<Bounds> {
        let points: Vec<Point<f64>> = self
            .features
            .iter()
            .flat_map(|f| f.geometry.coordinates())
            .map(|[lon, lat]| Point::new(lon, lat))
            .collect();

        let rect = MultiPoint::new(points).bounding_rect()?;
        Some(Bounds {
            min_lat: rect.min().y,
            max_lat: rect.max().y,
            min_lng: rect.min().x,
            max_lng: rect.max().x,
        })
    }

    /// Serialize as GeoJSON text.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<Vec<Feature>> for FeatureCollection {
    fn from(features: Vec<Feature>) -> Self {
        Self { features }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_point_feature_json() {
        let mut properties = Properties::new();
        properties.set_url(Some("https://example.com/p.jpg".to_string()));
        properties.set_title(Some("   ".to_string()));
        let feature = Feature::point(-116.2, 43.6, properties).with_id("photo-1");

        let value = serde_json::to_value(&feature).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "Feature",
                "id": "photo-1",
                "properties": { "url": "https://example.com/p.jpg" },
                "geometry": { "type": "Point", "coordinates": [-116.2, 43.6] }
            })
        );
    }

    #[test]
    fn test_line_feature_json() {
        let point = GeoPoint {
            longitude: -116.2,
            latitude: 43.6,
            elevation: 2700.0,
            time: 1_000,
            speed: 3.5,
        };
        let mut properties = Properties::new();
        properties.distance = Some(1.25);
        properties.top_speed = Some(3.5);
        let feature = Feature::line(vec![point], properties);

        let value = serde_json::to_value(&feature).unwrap();
        assert_eq!(value["geometry"]["type"], "LineString");
        assert_eq!(value["geometry"]["coordinates"][0], json!([-116.2, 43.6, 2700.0, 1000, 3.5]));
        assert_eq!(value["properties"], json!({ "distance": 1.25, "topSpeed": 3.5 }));
    }

    #[test]
    fn test_extra_properties_keep_order() {
        let mut properties = Properties::new();
        properties.insert("Zeta", "last letter");
        properties.insert("Alpha", "first letter");
        properties.insert("Empty", "");
        properties.insert("Acres", 12.5);

        let text = serde_json::to_string(&properties).unwrap();
        assert_eq!(
            text,
            r#"{"Zeta":"last letter","Alpha":"first letter","Acres":12.5}"#
        );
        assert!(properties.get("Empty").is_none());
    }

    #[test]
    fn test_collection_json_and_bounds() {
        let mut collection = FeatureCollection::new();
        assert!(collection.bounds().is_none());

        collection.push(Feature::point(-116.0, 43.0, Properties::new()));
        collection.push(Feature::multi_line(
            vec![
                vec![GeoPoint::new(-117.0, 44.0)],
                vec![GeoPoint::new(-115.5, 42.5)],
            ],
            Properties::new(),
        ));

        let bounds = collection.bounds().unwrap();
        assert_eq!(bounds.min_lng, -117.0);
        assert_eq!(bounds.max_lng, -115.5);
        assert_eq!(bounds.min_lat, 42.5);
        assert_eq!(bounds.max_lat, 44.0);

        let value: serde_json::Value =
            serde_json::from_str(&collection.to_json().unwrap()).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"].as_array().unwrap().len(), 2);
        assert_eq!(value["features"][1]["geometry"]["type"], "MultiLineString");
    }

    #[test]
    fn test_round_trip_through_json() {
        let mut properties = Properties::new();
        properties.set_name(Some("Owyhee Canyonlands".to_string()));
        properties.insert("Agency", "BLM");
        let collection = FeatureCollection::from(vec![Feature::point(-116.9, 42.6, properties)]);

        let text = collection.to_json().unwrap();
        let parsed: FeatureCollection = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, collection);
    }
}
