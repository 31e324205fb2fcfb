//! GPX reader: tracks, routes and waypoints.
//!
//! Parsing is best effort. A document that is not XML fails as a whole, but a
//! point with a bad coordinate, an unreadable timestamp or a missing elevation
//! is skipped or left at its default, because recorded tracks routinely carry
//! a few corrupt points.
//!
//! ## Tracks
//! 1. Every `<trkseg>` becomes a candidate line; points inside the privacy
//!    zone never enter it
//! 2. Speed of each point is computed against the previous kept point
//! 3. Distance and duration are summed over the full point set
//! 4. Speeds at or above `max_possible_speed` are left out of the speed
//!    statistics (the points themselves stay)
//! 5. Each segment is simplified, empty segments are dropped
//! 6. One segment becomes a `LineString`, several a `MultiLineString`

use chrono::{DateTime, NaiveDateTime};
use log::{debug, warn};
use roxmltree::Node;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::Result;
use crate::features::{Feature, FeatureCollection, Properties};
use crate::measure::{line_duration, line_length, round_to, speed};
use crate::simplify::simplify;
use crate::xml::{
    child_text, children_named, first_child, node_text, number_attribute, parse_document,
};
use crate::{GeoPoint, Line, MapConfig};

/// Parse a GPX document into track, route and waypoint features.
///
/// Features are ordered tracks first, then routes, then waypoints.
///
/// # Example
/// ```
/// use trackmap::{parse_gpx, MapConfig};
///
/// let gpx = r#"<gpx><wpt lat="43.6" lon="-116.2"><name>Camp</name></wpt></gpx>"#;
/// let features = parse_gpx("camp.gpx", gpx, &MapConfig::default()).unwrap();
/// assert_eq!(features.len(), 1);
/// ```
pub fn parse_gpx(source: &str, text: &str, config: &MapConfig) -> Result<FeatureCollection> {
    let doc = parse_document(source, text)?;
    let root = doc.root_element();

    if root.tag_name().name() != "gpx" {
        warn!(
            "[Gpx] {} has root element <{}>, expected <gpx>",
            source,
            root.tag_name().name()
        );
    }

    let metadata = first_child(root, "metadata");
    let mut collection = FeatureCollection::new();

    let tracks: Vec<Feature> = children_named(root, "trk")
        .filter_map(|trk| track_feature(trk, metadata, config))
        .collect();
    let routes: Vec<Feature> = children_named(root, "rte")
        .filter_map(|rte| route_feature(rte, config))
        .collect();
    let waypoints: Vec<Feature> = children_named(root, "wpt")
        .filter_map(|wpt| waypoint_feature(wpt, config))
        .collect();

    debug!(
        "[Gpx] {}: {} tracks, {} routes, {} waypoints",
        source,
        tracks.len(),
        routes.len(),
        waypoints.len()
    );

    collection.features.extend(tracks);
    collection.features.extend(routes);
    collection.features.extend(waypoints);
    Ok(collection)
}

/// Parse several documents, one result per input in input order.
pub fn parse_gpx_batch(
    documents: &[(&str, &str)],
    config: &MapConfig,
) -> Vec<Result<FeatureCollection>> {
    documents
        .iter()
        .map(|(source, text)| parse_gpx(source, text, config))
        .collect()
}

/// Parallel version of [`parse_gpx_batch`].
#[cfg(feature = "parallel")]
pub fn parse_gpx_batch_parallel(
    documents: &[(&str, &str)],
    config: &MapConfig,
) -> Vec<Result<FeatureCollection>> {
    documents
        .par_iter()
        .map(|(source, text)| parse_gpx(source, text, config))
        .collect()
}

/// Epoch milliseconds of an ISO-8601 timestamp, 0 when unreadable.
///
/// Timestamps without an offset are taken as UTC.
pub fn parse_time(text: &str) -> i64 {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.timestamp_millis())
        .or_else(|_| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                .map(|t| t.and_utc().timestamp_millis())
        })
        .unwrap_or(0)
}

/// Read a `<trkpt>`, `<rtept>` or `<wpt>` element.
///
/// Returns `None` for an unusable coordinate or a point inside the privacy
/// zone. Speed is left at 0.
fn location(node: Node, config: &MapConfig) -> Option<GeoPoint> {
    let latitude = number_attribute(node, "lat");
    let longitude = number_attribute(node, "lon");
    let mut point = GeoPoint::new(longitude, latitude);

    if !point.is_valid() || config.is_private(longitude, latitude) {
        return None;
    }

    if let Some(meters) = child_text(node, "ele").and_then(|e| e.parse::<f64>().ok()) {
        point.elevation = (meters * config.unit_system.elevation_factor()).round();
    }
    if let Some(time) = child_text(node, "time") {
        point.time = parse_time(&time);
    }

    Some(point)
}

/// Ordered kept points of a segment or route, with speeds filled in.
fn line<'a, 'input: 'a>(
    nodes: impl Iterator<Item = Node<'a, 'input>>,
    config: &MapConfig,
) -> Line {
    let mut points: Line = nodes.filter_map(|n| location(n, config)).collect();

    for i in 1..points.len() {
        points[i].speed = speed(&points[i - 1], &points[i], config.unit_system);
    }

    points
}

/// `href` of the first `<link>`, or its text when the attribute is missing.
fn link_of(node: Node) -> Option<String> {
    let link = first_child(node, "link")?;
    link.attribute("href")
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
        .or_else(|| node_text(link))
}

/// Generic GPX metadata, falling back to `fallback` for missing fields.
fn metadata_properties(node: Node, fallback: Option<Node>) -> Properties {
    let read = |tag: &str| {
        child_text(node, tag).or_else(|| fallback.and_then(|f| child_text(f, tag)))
    };

    let mut properties = Properties::new();
    properties.set_name(read("name"));
    properties.set_description(read("desc"));
    properties.author = read("author");
    properties.copyright = read("copyright");
    properties.link = link_of(node).or_else(|| fallback.and_then(link_of));
    properties.time = read("time");
    properties.keywords = read("keywords");
    properties
}

/// Running totals for a track across its segments.
#[derive(Debug, Default)]
struct TrackStats {
    distance: f64,
    duration: f64,
    speeds: Vec<f64>,
}

impl TrackStats {
    fn add_segment(&mut self, points: &[GeoPoint], config: &MapConfig) {
        self.distance += line_length(points, config.unit_system);
        self.duration += line_duration(points);

        for pair in points.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            if previous.time == 0 || current.time == 0 {
                continue;
            }
            if config.is_plausible_speed(current.speed) {
                self.speeds.push(current.speed);
            }
        }
    }

    fn top_speed(&self) -> Option<f64> {
        self.speeds.iter().copied().reduce(f64::max)
    }

    fn avg_speed(&self) -> Option<f64> {
        if self.speeds.is_empty() {
            None
        } else {
            Some(self.speeds.iter().sum::<f64>() / self.speeds.len() as f64)
        }
    }
}

fn track_feature(node: Node, metadata: Option<Node>, config: &MapConfig) -> Option<Feature> {
    let mut stats = TrackStats::default();
    let mut lines: Vec<Line> = Vec::new();

    for segment in children_named(node, "trkseg") {
        let points = line(children_named(segment, "trkpt"), config);
        if points.is_empty() {
            continue;
        }
        stats.add_segment(&points, config);
        lines.push(simplify(
            &points,
            config.simplify_tolerance,
            config.unit_system,
        ));
    }

    if lines.is_empty() {
        return None;
    }

    let mut properties = metadata_properties(node, metadata);
    properties.top_speed = stats.top_speed().map(|s| round_to(s, 1));
    properties.avg_speed = stats.avg_speed().map(|s| round_to(s, 1));
    properties.duration = Some(stats.duration);
    properties.distance = Some(round_to(stats.distance, 2));

    Some(if lines.len() == 1 {
        Feature::line(lines.remove(0), properties)
    } else {
        Feature::multi_line(lines, properties)
    })
}

/// Routes are never simplified. A route left without valid points emits no
/// feature, since an emitted line is never empty.
fn route_feature(node: Node, config: &MapConfig) -> Option<Feature> {
    let points = line(children_named(node, "rtept"), config);
    if points.is_empty() {
        return None;
    }
    Some(Feature::line(points, metadata_properties(node, None)))
}

fn waypoint_feature(node: Node, config: &MapConfig) -> Option<Feature> {
    let point = location(node, config)?;
    let mut properties = metadata_properties(node, None);
    properties.sym = child_text(node, "sym");
    Some(Feature::point(point.longitude, point.latitude, properties))
}
