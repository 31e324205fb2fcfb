//! KML reader for placemark points.
//!
//! Only `<Placemark>` elements holding a `<Point>` are read, including a
//! `<Point>` wrapped in `<MultiGeometry>`. GIS exports often
//! pack their attribute columns into an HTML table inside `<description>`;
//! those rows are lifted into the feature properties, then the properties are
//! passed through the transform registered for the layer's source name.

use log::debug;
use roxmltree::Node;
use scraper::{ElementRef, Html, Selector};

use crate::error::Result;
use crate::features::{Feature, FeatureCollection, Properties};
use crate::sources::{SourceRegistry, DEFAULT_SOURCES};
use crate::xml::{
    child_text, children_named, first_child, first_descendant, node_text, parse_document,
};

/// Components of a KML `lon,lat[,elevation]` tuple; unreadable parts are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KmlLocation {
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub elevation: Option<f64>,
}

impl KmlLocation {
    /// Parse the first coordinate tuple of a `<coordinates>` text.
    pub fn parse(text: &str) -> Self {
        let tuple = text.split_whitespace().next().unwrap_or("");
        let mut parts = tuple.split(',').map(|part| part.trim().parse::<f64>().ok());

        Self {
            longitude: parts.next().flatten(),
            latitude: parts.next().flatten(),
            elevation: parts.next().flatten(),
        }
    }

    /// `[longitude, latitude]` when both parsed and lie in WGS84 range.
    pub fn lon_lat(&self) -> Option<[f64; 2]> {
        let point = crate::GeoPoint::new(self.longitude?, self.latitude?);
        point.is_valid().then(|| point.lon_lat())
    }
}

/// Parse a KML layer using the default source registry.
///
/// `source` names the data provider; it identifies the document in errors and
/// selects the relabeling transform.
///
/// # Example
/// ```
/// use trackmap::parse_kml;
///
/// let kml = r#"<kml><Document><Placemark>
///     <name>Trailhead</name>
///     <Point><coordinates>-116.1,43.7,1200</coordinates></Point>
/// </Placemark></Document></kml>"#;
/// let features = parse_kml("trailheads", kml).unwrap();
/// assert_eq!(features.len(), 1);
/// ```
pub fn parse_kml(source: &str, text: &str) -> Result<FeatureCollection> {
    parse_kml_with(source, text, &DEFAULT_SOURCES)
}

/// Parse a KML layer, relabeling properties through `registry`.
pub fn parse_kml_with(
    source: &str,
    text: &str,
    registry: &SourceRegistry,
) -> Result<FeatureCollection> {
    let doc = parse_document(source, text)?;

    let features: Vec<Feature> = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "Placemark")
        .filter_map(|placemark| placemark_feature(placemark, source, registry))
        .collect();

    debug!("[Kml] {}: {} placemarks", source, features.len());
    Ok(FeatureCollection::from(features))
}

fn placemark_feature(node: Node, source: &str, registry: &SourceRegistry) -> Option<Feature> {
    let coordinates = first_descendant(node, "Point")
        .and_then(|point| child_text(point, "coordinates"))
        .map(|text| KmlLocation::parse(&text))?;
    let [longitude, latitude] = coordinates.lon_lat()?;

    let mut properties = Properties::new();
    properties.set_name(child_text(node, "name"));
    properties.set_description(child_text(node, "description"));
    read_extended_data(node, &mut properties);
    expand_description(&mut properties);

    let properties = registry.relabel(source, properties);
    let feature = Feature::point(longitude, latitude, properties);

    Some(match node.attribute("id") {
        Some(id) if !id.trim().is_empty() => feature.with_id(id.trim()),
        _ => feature,
    })
}

/// Copy `<ExtendedData>` name/value pairs into the properties.
fn read_extended_data(node: Node, properties: &mut Properties) {
    let Some(extended) = first_child(node, "ExtendedData") else {
        return;
    };

    for data in children_named(extended, "Data") {
        if let (Some(name), Some(value)) = (data.attribute("name"), child_text(data, "value")) {
            properties.insert(name, value);
        }
    }
    for schema in children_named(extended, "SchemaData") {
        for data in children_named(schema, "SimpleData") {
            if let (Some(name), Some(value)) = (data.attribute("name"), node_text(data)) {
                properties.insert(name, value);
            }
        }
    }
}

/// Replace an HTML-table description with the table's label/value rows.
///
/// The description stays untouched when it is plain text or holds no usable
/// table row.
fn expand_description(properties: &mut Properties) {
    let Some(description) = properties.description.as_deref() else {
        return;
    };
    if !description.trim_start().starts_with('<') {
        return;
    }

    let pairs = description_table(description);
    if pairs.is_empty() {
        return;
    }
    for (key, value) in pairs {
        properties.insert(&key, value);
    }
    properties.description = None;
}

/// Label/value pairs from the largest table in an HTML fragment.
///
/// Size is the number of cells in rows owned by the table itself, so a
/// layout table wrapping the data table does not win.
pub fn description_table(html: &str) -> Vec<(String, String)> {
    let fragment = Html::parse_fragment(html);
    let Ok(selector) = Selector::parse("table") else {
        return Vec::new();
    };

    let mut largest: Option<(usize, Vec<ElementRef>)> = None;
    for table in fragment.select(&selector) {
        let rows = own_rows(table);
        let size: usize = rows.iter().map(|row| cells(*row).len()).sum();
        if largest.as_ref().map_or(true, |(best, _)| size > *best) {
            largest = Some((size, rows));
        }
    }

    let Some((_, rows)) = largest else {
        return Vec::new();
    };

    rows.into_iter()
        .filter_map(|row| {
            let cells = cells(row);
            if cells.len() < 2 {
                return None;
            }
            let key = cell_text(cells[0])?;
            let value = cell_text(cells[1])?;
            Some((key, value))
        })
        .collect()
}

fn element_children<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

/// Rows belonging directly to `table`, including those under its row groups.
fn own_rows(table: ElementRef) -> Vec<ElementRef> {
    let mut rows = Vec::new();
    for child in element_children(table) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => {
                rows.extend(element_children(child).filter(|r| r.value().name() == "tr"));
            }
            _ => {}
        }
    }
    rows
}

fn cells(row: ElementRef) -> Vec<ElementRef> {
    element_children(row)
        .filter(|c| matches!(c.value().name(), "td" | "th"))
        .collect()
}

fn cell_text(cell: ElementRef) -> Option<String> {
    let text = cell.text().collect::<Vec<_>>().join(" ");
    let merged = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!merged.is_empty()).then_some(merged)
}
