//! Pipeline integration tests.
//!
//! Tests the full path: GPX/KML text -> readers -> simplification -> assembled
//! GeoJSON, inspecting the serialized output the way a map client sees it.
//!
//! Run with: `cargo test --test pipeline`

use serde_json::Value;
use trackmap::measure::{distance, round_to};
use trackmap::{
    parse_gpx, parse_kml, post_map, site_map, FeatureCollection, GeoPoint, Geometry, MapConfig,
    Photo, PrivacyZone, UnitSystem,
};

/// Helper: parse GPX with simplification switched off.
fn parse_unsimplified(gpx: &str) -> FeatureCollection {
    let config = MapConfig {
        simplify_tolerance: 0.0,
        ..MapConfig::default()
    };
    parse_gpx("fixture.gpx", gpx, &config).expect("fixture should parse")
}

fn trkpt(lat: f64, lon: f64, time: &str) -> String {
    format!(
        r#"<trkpt lat="{}" lon="{}"><ele>900</ele><time>{}</time></trkpt>"#,
        lat, lon, time
    )
}

// ============================================================================
// Test: Multi-Segment Track With An Empty Segment
// ============================================================================

#[test]
fn test_empty_segment_dropped_from_multi_line() {
    let gpx = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
        <gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
            <trk>
                <name>Three Days</name>
                <trkseg>{}{}</trkseg>
                <trkseg><trkpt lat="43.5"/><trkpt lon="-116.5"/></trkseg>
                <trkseg>{}{}</trkseg>
            </trk>
        </gpx>"#,
        trkpt(43.0, -116.0, "2023-05-01T08:00:00Z"),
        trkpt(43.1, -116.0, "2023-05-01T09:00:00Z"),
        trkpt(44.0, -116.0, "2023-05-02T08:00:00Z"),
        trkpt(44.2, -116.0, "2023-05-02T10:00:00Z"),
    );

    let collection = parse_unsimplified(&gpx);
    assert_eq!(collection.len(), 1);

    let feature = &collection.features[0];
    let lines = match &feature.geometry {
        Geometry::MultiLineString(lines) => lines,
        other => panic!("expected MultiLineString, got {:?}", other),
    };
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0][0].latitude, 43.0);
    assert_eq!(lines[1][0].latitude, 44.0);

    let first = distance(&lines[0][0], &lines[0][1], UnitSystem::Imperial);
    let second = distance(&lines[1][0], &lines[1][1], UnitSystem::Imperial);
    let props = &feature.properties;
    assert!((props.distance.unwrap() - (first + second)).abs() < 0.01);
    assert!((props.duration.unwrap() - 3.0).abs() < 1e-9);
    assert_eq!(props.name.as_deref(), Some("Three Days"));
}

// ============================================================================
// Test: Two-Point Round Trip Through JSON
// ============================================================================

#[test]
fn test_two_point_track_json() {
    let gpx = format!(
        "<gpx><trk><trkseg>{}{}</trkseg></trk></gpx>",
        trkpt(43.60, -116.20, "2023-05-01T12:00:00Z"),
        trkpt(43.65, -116.25, "2023-05-01T12:30:00Z"),
    );
    let collection = parse_unsimplified(&gpx);
    let value: Value = serde_json::from_str(&collection.to_json().unwrap()).unwrap();

    let feature = &value["features"][0];
    assert_eq!(value["type"], "FeatureCollection");
    assert_eq!(feature["type"], "Feature");
    assert_eq!(feature["geometry"]["type"], "LineString");

    let coordinates = feature["geometry"]["coordinates"].as_array().unwrap();
    assert_eq!(coordinates.len(), 2);
    assert_eq!(coordinates[0].as_array().unwrap().len(), 5);
    assert_eq!(coordinates[0][2], 2953.0);
    assert_eq!(coordinates[0][3], 1_682_942_400_000i64);

    let a = GeoPoint::new(-116.20, 43.60);
    let b = GeoPoint::new(-116.25, 43.65);
    let miles = distance(&a, &b, UnitSystem::Imperial);
    let mph = miles / 0.5;

    let props = &feature["properties"];
    assert!((props["distance"].as_f64().unwrap() - miles).abs() < 0.01);
    assert!((props["duration"].as_f64().unwrap() - 0.5).abs() < 1e-9);
    assert_eq!(props["topSpeed"].as_f64().unwrap(), round_to(mph, 1));
    assert_eq!(props["avgSpeed"].as_f64().unwrap(), round_to(mph, 1));
    assert!(props.get("description").is_none());
}

// ============================================================================
// Test: Privacy Zone Boundary
// ============================================================================

#[test]
fn test_privacy_boundary_point_is_kept() {
    let center = GeoPoint::new(-116.2, 43.6);
    let boundary = GeoPoint::new(-116.2, 43.7);
    let radius = distance(&center, &boundary, UnitSystem::Imperial);

    let gpx = r#"<gpx><trk><trkseg>
        <trkpt lat="43.60" lon="-116.2"/>
        <trkpt lat="43.65" lon="-116.2"/>
        <trkpt lat="43.70" lon="-116.2"/>
        <trkpt lat="43.80" lon="-116.2"/>
    </trkseg></trk></gpx>"#;
    let config = MapConfig {
        simplify_tolerance: 0.0,
        privacy_zone: Some(PrivacyZone::new(-116.2, 43.6, radius)),
        ..MapConfig::default()
    };
    let collection = parse_gpx("home.gpx", gpx, &config).unwrap();

    let line = match &collection.features[0].geometry {
        Geometry::LineString(line) => line,
        other => panic!("expected LineString, got {:?}", other),
    };
    let latitudes: Vec<f64> = line.iter().map(|p| p.latitude).collect();
    assert_eq!(latitudes, vec![43.7, 43.8]);
}

#[test]
fn test_privacy_zone_covers_photos_and_waypoints() {
    let config = MapConfig {
        privacy_zone: Some(PrivacyZone::new(-116.2, 43.6, 2.0)),
        ..MapConfig::default()
    };
    let gpx = r#"<gpx><wpt lat="43.601" lon="-116.201"><name>Home</name></wpt></gpx>"#;
    let track = parse_gpx("home.gpx", gpx, &config).unwrap();
    assert!(track.is_empty());

    let photos = vec![
        Photo::new(-116.201, 43.601, "Porch", "https://example.com/porch.jpg"),
        Photo::new(-115.0, 44.0, "Lake", "https://example.com/lake.jpg"),
    ];
    let map = post_map(Some(track), &photos, &config);
    assert_eq!(map.len(), 1);
    assert_eq!(map.features[0].properties.title.as_deref(), Some("Lake"));
}

// ============================================================================
// Test: Post And Site Maps
// ============================================================================

#[test]
fn test_post_map_json_shape() {
    let gpx = format!(
        "<gpx><trk><name>Loop</name><trkseg>{}{}{}</trkseg></trk></gpx>",
        trkpt(43.60, -116.20, "2023-05-01T12:00:00Z"),
        trkpt(43.61, -116.21, "2023-05-01T12:10:00Z"),
        trkpt(43.62, -116.20, "2023-05-01T12:20:00Z"),
    );
    let config = MapConfig::default();
    let track = parse_gpx("loop.gpx", &gpx, &config).unwrap();

    let photos = vec![
        Photo::new(-116.205, 43.605, "Bridge", "https://example.com/bridge.jpg")
            .with_part_key("part-1"),
        Photo::new(-116.0, 0.0, "Lost", "https://example.com/lost.jpg"),
        Photo::new(-116.215, 43.615, "Summit", "https://example.com/summit.jpg")
            .with_part_key("part-2"),
    ];
    let map = post_map(Some(track), &photos, &config);
    let value: Value = serde_json::to_value(&map).unwrap();
    let features = value["features"].as_array().unwrap();

    assert_eq!(features.len(), 3);
    assert_eq!(features[0]["properties"]["name"], "Loop");
    assert_eq!(
        features[1]["properties"],
        serde_json::json!({
            "url": "https://example.com/bridge.jpg",
            "title": "Bridge",
            "partKey": "part-1"
        })
    );
    assert_eq!(features[2]["geometry"]["coordinates"], serde_json::json!([-116.215, 43.615]));

    let bounds = map.bounds().unwrap();
    assert_eq!(bounds.min_lat, 43.6);
    assert_eq!(bounds.max_lat, 43.62);
}

#[test]
fn test_site_map_skips_unlocated_photos() {
    let photos = vec![
        Photo::new(-116.2, 43.6, "One", "https://example.com/1.jpg"),
        Photo::new(0.0, 0.0, "Unknown", "https://example.com/2.jpg"),
        Photo::new(-200.0, 43.6, "Corrupt", "https://example.com/3.jpg"),
    ];
    let map = site_map(&photos, &MapConfig::default());
    assert_eq!(map.len(), 1);
    assert!(map.features[0].properties.title.is_none());
}

// ============================================================================
// Test: KML Layer
// ============================================================================

#[test]
fn test_kml_layer_to_json() {
    let kml = r#"<?xml version="1.0" encoding="UTF-8"?>
    <kml xmlns="http://www.opengis.net/kml/2.2">
        <Document>
            <Folder>
                <Placemark>
                    <name>Field Office</name>
                    <description><![CDATA[
                        <table><tr><td>
                            <table>
                                <tr><td>JURISDICTION</td><td>BUREAU OF LAND MANAGEMENT</td></tr>
                                <tr><td>District</td><td>Boise</td></tr>
                            </table>
                        </td></tr></table>
                    ]]></description>
                    <Point><coordinates>-116.25,43.58,0</coordinates></Point>
                </Placemark>
            </Folder>
        </Document>
    </kml>"#;
    let collection = parse_kml("jurisdiction", kml).unwrap();
    let value: Value = serde_json::to_value(&collection).unwrap();
    let props = &value["features"][0]["properties"];

    assert_eq!(props["name"], "Field Office");
    assert_eq!(props["District"], "Boise");
    assert_eq!(props["Jurisdiction"], "Bureau Of Land Management");
    assert!(props.get("description").is_none());
    assert!(props.get("JURISDICTION").is_none());
}

// ============================================================================
// Test: Configuration Loading
// ============================================================================

#[test]
fn test_config_json_drives_units() {
    let config = MapConfig::from_json(
        r#"{
            "simplifyTolerance": 0,
            "maxPossibleSpeed": 0,
            "unitSystem": "metric",
            "privacyZone": { "center": [-116.2, 43.6], "radiusMiles": 0.25 }
        }"#,
    )
    .unwrap();
    let gpx = format!(
        "<gpx><trk><trkseg>{}{}</trkseg></trk></gpx>",
        trkpt(43.0, -116.0, "2023-05-01T12:00:00Z"),
        trkpt(43.1, -116.0, "2023-05-01T13:00:00Z"),
    );
    let collection = parse_gpx("metric.gpx", &gpx, &config).unwrap();
    let props = &collection.features[0].properties;
    assert!((props.distance.unwrap() - 11.12).abs() < 0.01);
    assert_eq!(props.top_speed, Some(11.1));

    assert!(MapConfig::from_json(r#"{"unitSystem": "parsecs"}"#).is_err());
}
