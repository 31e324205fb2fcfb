//! Source-specific property relabeling for KML map layers.
//!
//! GIS exports name their columns however the publishing agency likes. A
//! [`SourceRegistry`] maps a source name to a transform that turns those
//! columns into labels worth showing on a map. Unknown sources pass through
//! unchanged.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::features::{Properties, PropertyValue};

/// Rewrites the properties of one placemark.
pub type Transform = fn(Properties) -> Properties;

/// Registry of named property transforms.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    transforms: HashMap<String, Transform>,
}

/// Default registry, built once on first use.
pub static DEFAULT_SOURCES: Lazy<SourceRegistry> = Lazy::new(SourceRegistry::with_defaults);

impl SourceRegistry {
    /// An empty registry; every source passes through.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in transforms.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("mva", motor_vehicle_access);
        registry.register("jurisdiction", jurisdiction);
        registry
    }

    /// Add or replace the transform for `source`. Names are case-insensitive.
    pub fn register(&mut self, source: &str, transform: Transform) {
        self.transforms.insert(source.to_ascii_lowercase(), transform);
    }

    /// Apply the transform registered for `source`, if any.
    pub fn relabel(&self, source: &str, properties: Properties) -> Properties {
        match self.transforms.get(&source.to_ascii_lowercase()) {
            Some(transform) => transform(properties),
            None => properties,
        }
    }
}

/// Vehicle flag columns in motor-vehicle-use exports and their labels.
const VEHICLES: &[(&str, &str)] = &[
    ("ATV", "ATV"),
    ("AUTOMOBILE", "Automobile"),
    ("JEEP", "Jeep"),
    ("MOTORCYCLE", "Motorcycle"),
    ("UTV", "UTV"),
    ("OHV", "OHV"),
    ("SNOWMOBILE", "Snowmobile"),
];

/// Combine per-vehicle access flags into "<Vehicle> Allowed" entries.
///
/// `Y`/`YES`/`OPEN` read as "Yes", `N`/`NO`/`CLOSED` remove the vehicle, and
/// anything else (usually a seasonal date range) is kept as written.
pub fn motor_vehicle_access(mut properties: Properties) -> Properties {
    for (code, label) in VEHICLES {
        let key = properties
            .extra
            .keys()
            .find(|k| k.eq_ignore_ascii_case(code))
            .cloned();
        let Some(key) = key else {
            continue;
        };
        let Some(value) = properties.remove(&key) else {
            continue;
        };

        let text = match &value {
            PropertyValue::Text(text) => text.trim().to_string(),
            PropertyValue::Number(n) => n.to_string(),
        };
        let allowed = match text.to_ascii_uppercase().as_str() {
            "Y" | "YES" | "OPEN" => Some("Yes".to_string()),
            "N" | "NO" | "CLOSED" | "" => None,
            _ => Some(text),
        };

        if let Some(allowed) = allowed {
            properties.insert(&format!("{} Allowed", label), allowed);
        }
    }
    properties
}

/// Title-case the jurisdiction label ("BUREAU OF LAND MANAGEMENT").
pub fn jurisdiction(mut properties: Properties) -> Properties {
    let key = properties
        .extra
        .keys()
        .find(|k| k.eq_ignore_ascii_case("jurisdiction"))
        .cloned();

    if let Some(key) = key {
        if let Some(PropertyValue::Text(text)) = properties.remove(&key) {
            properties.insert("Jurisdiction", title_case(&text));
        }
    }
    properties
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
