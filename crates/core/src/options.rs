//! Per-layer options
//!
//! Every layer name maps onto one of three option records. The record is
//! picked from the name (`perimeter`, a way network, or an area category)
//! and deserialized with unknown keys rejected, so a typo such as `"widht"`
//! fails at load time instead of being silently ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{ensure_distance, Error, Result};

/// Name of the layer that bounds every map.
pub const PERIMETER: &str = "perimeter";

/// Layers fetched as way networks rather than as tagged features.
pub const NETWORK_LAYERS: [&str; 3] = ["streets", "railway", "waterway"];

/// Accepted values for one tag key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    /// `true` matches any value; `false` disables the key.
    Any(bool),
    One(String),
    Many(Vec<String>),
}

/// Which OSM features an area layer selects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagFilter {
    /// A bare key, shorthand for `{key: true}`.
    Key(String),
    Tags(BTreeMap<String, TagValue>),
}

impl Default for TagFilter {
    fn default() -> Self {
        TagFilter::Tags(BTreeMap::new())
    }
}

impl TagFilter {
    pub fn key(key: impl Into<String>) -> Self {
        TagFilter::Key(key.into())
    }

    /// Build a filter from `(key, value)` pairs.
    pub fn tags<K: Into<String>>(pairs: impl IntoIterator<Item = (K, TagValue)>) -> Self {
        TagFilter::Tags(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Normalized `(key, value)` pairs, with disabled keys dropped.
    pub fn entries(&self) -> Vec<(String, TagValue)> {
        match self {
            TagFilter::Key(key) => vec![(key.clone(), TagValue::Any(true))],
            TagFilter::Tags(tags) => tags
                .iter()
                .filter(|(_, v)| !matches!(v, TagValue::Any(false)))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Whether a feature with the given tag lookup matches any entry.
    pub fn matches<'a>(&self, tag: impl Fn(&str) -> Option<&'a str>) -> bool {
        self.entries().iter().any(|(key, value)| match (tag(key.as_str()), value) {
            (Some(_), TagValue::Any(true)) => true,
            (Some(v), TagValue::One(expected)) => v == expected,
            (Some(v), TagValue::Many(values)) => values.iter().any(|e| e == v),
            _ => false,
        })
    }
}

/// Street width: one value for every edge, or one per category label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WidthSpec {
    Uniform(f64),
    PerCategory(BTreeMap<String, f64>),
}

impl Default for WidthSpec {
    fn default() -> Self {
        WidthSpec::Uniform(6.0)
    }
}

impl WidthSpec {
    pub fn per_category<K: Into<String>>(pairs: impl IntoIterator<Item = (K, f64)>) -> Self {
        WidthSpec::PerCategory(pairs.into_iter().map(|(k, w)| (k.into(), w)).collect())
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            WidthSpec::Uniform(w) => ensure_distance("width", *w).map(|_| ()),
            WidthSpec::PerCategory(widths) => widths
                .values()
                .try_for_each(|w| ensure_distance("width", *w).map(|_| ())),
        }
    }
}

/// Options for the `perimeter` layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PerimeterOptions {
    /// Circular (true) or square (false) boundary around a point anchor.
    pub circle: bool,
    /// Outward buffer applied to the perimeter, in metres.
    pub dilate: f64,
}

impl Default for PerimeterOptions {
    fn default() -> Self {
        Self {
            circle: true,
            dilate: 0.0,
        }
    }
}

/// Options for areal feature layers (buildings, water, parks, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AreaOptions {
    pub tags: TagFilter,
    /// Extra margin (metres) around a perimeter anchor when fetching.
    /// The final clip still uses the unbuffered perimeter.
    pub perimeter_tolerance: f64,
    /// Merge all polygons into one geometry; otherwise keep each part.
    pub union: bool,
    pub circle: bool,
    pub dilate: f64,
}

impl Default for AreaOptions {
    fn default() -> Self {
        Self {
            tags: TagFilter::default(),
            perimeter_tolerance: 0.0,
            union: true,
            circle: true,
            dilate: 0.0,
        }
    }
}

impl AreaOptions {
    pub fn with_tags(tags: TagFilter) -> Self {
        Self {
            tags,
            ..Self::default()
        }
    }
}

/// Options for way-network layers (`streets`, `railway`, `waterway`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkOptions {
    pub width: WidthSpec,
    /// Overpass filter replacing the default `["<key>"]`, e.g.
    /// `["highway"~"motorway|primary"]`.
    pub custom_filter: Option<String>,
    pub circle: bool,
    pub dilate: f64,
}

impl Default for NetworkOptions {
    fn default() -> Self {
        Self {
            width: WidthSpec::default(),
            custom_filter: None,
            circle: true,
            dilate: 0.0,
        }
    }
}

impl NetworkOptions {
    pub fn with_width(width: WidthSpec) -> Self {
        Self {
            width,
            ..Self::default()
        }
    }
}

/// The category a layer name dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerCategory {
    Perimeter,
    Network,
    Area,
}

impl LayerCategory {
    pub fn of(name: &str) -> Self {
        if name == PERIMETER {
            LayerCategory::Perimeter
        } else if NETWORK_LAYERS.contains(&name) {
            LayerCategory::Network
        } else {
            LayerCategory::Area
        }
    }
}

/// Option record for one layer.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerOptions {
    Perimeter(PerimeterOptions),
    Area(AreaOptions),
    Network(NetworkOptions),
}

impl LayerOptions {
    pub fn category(&self) -> LayerCategory {
        match self {
            LayerOptions::Perimeter(_) => LayerCategory::Perimeter,
            LayerOptions::Area(_) => LayerCategory::Area,
            LayerOptions::Network(_) => LayerCategory::Network,
        }
    }

    pub fn circle(&self) -> bool {
        match self {
            LayerOptions::Perimeter(o) => o.circle,
            LayerOptions::Area(o) => o.circle,
            LayerOptions::Network(o) => o.circle,
        }
    }

    pub fn dilate(&self) -> f64 {
        match self {
            LayerOptions::Perimeter(o) => o.dilate,
            LayerOptions::Area(o) => o.dilate,
            LayerOptions::Network(o) => o.dilate,
        }
    }
}

/// A named layer and its options.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub name: String,
    pub options: LayerOptions,
}

impl LayerSpec {
    pub fn new(name: impl Into<String>, options: LayerOptions) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }

    /// A layer with the default options for its category.
    pub fn with_defaults(name: impl Into<String>) -> Self {
        let name = name.into();
        let options = match LayerCategory::of(&name) {
            LayerCategory::Perimeter => LayerOptions::Perimeter(PerimeterOptions::default()),
            LayerCategory::Network => LayerOptions::Network(NetworkOptions::default()),
            LayerCategory::Area => LayerOptions::Area(AreaOptions::default()),
        };
        Self { name, options }
    }

    pub fn perimeter(options: PerimeterOptions) -> Self {
        Self::new(PERIMETER, LayerOptions::Perimeter(options))
    }

    pub fn area(name: impl Into<String>, options: AreaOptions) -> Self {
        Self::new(name, LayerOptions::Area(options))
    }

    pub fn network(name: impl Into<String>, options: NetworkOptions) -> Self {
        Self::new(name, LayerOptions::Network(options))
    }

    /// Parse a layer from its JSON option object. `null` or `true` mean
    /// "defaults"; unknown keys are rejected.
    pub fn from_json(name: &str, value: &Value) -> Result<Self> {
        let value = match value {
            Value::Null | Value::Bool(true) => Value::Object(Default::default()),
            other => other.clone(),
        };
        let invalid = |e: serde_json::Error| Error::InvalidLayerOptions {
            layer: name.to_string(),
            reason: e.to_string(),
        };
        let options = match LayerCategory::of(name) {
            LayerCategory::Perimeter => {
                LayerOptions::Perimeter(serde_json::from_value(value).map_err(invalid)?)
            }
            LayerCategory::Network => {
                LayerOptions::Network(serde_json::from_value(value).map_err(invalid)?)
            }
            LayerCategory::Area => LayerOptions::Area(serde_json::from_value(value).map_err(invalid)?),
        };
        let spec = Self::new(name, options);
        spec.validate()?;
        Ok(spec)
    }

    /// Check names, distances and widths. Called by the pipeline before any
    /// fetch happens.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::UnsupportedLayer {
                name: self.name.clone(),
                reason: "layer name is empty".into(),
            });
        }
        let expected = LayerCategory::of(&self.name);
        if self.options.category() != expected {
            return Err(Error::UnsupportedLayer {
                name: self.name.clone(),
                reason: format!(
                    "{:?} options given to a {:?} layer",
                    self.options.category(),
                    expected
                ),
            });
        }
        ensure_distance("dilate", self.options.dilate())?;
        match &self.options {
            LayerOptions::Perimeter(_) => {}
            LayerOptions::Area(o) => {
                ensure_distance("perimeter_tolerance", o.perimeter_tolerance)?;
            }
            LayerOptions::Network(o) => o.width.validate()?,
        }
        Ok(())
    }
}

/// Ordered set of layers, as declared by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerSet {
    specs: Vec<LayerSpec>,
}

impl LayerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a layer. Names must be unique.
    pub fn push(&mut self, spec: LayerSpec) -> Result<()> {
        if self.contains(&spec.name) {
            return Err(Error::InvalidLayerOptions {
                layer: spec.name,
                reason: "layer declared twice".into(),
            });
        }
        self.specs.push(spec);
        Ok(())
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, spec: LayerSpec) -> Result<Self> {
        self.push(spec)?;
        Ok(self)
    }

    /// Parse `{"perimeter": {}, "streets": {"width": 6}, ...}`, keeping key order.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json).map_err(|e| Error::InvalidLayerOptions {
            layer: "<root>".into(),
            reason: e.to_string(),
        })?;
        Self::from_json(&value)
    }

    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| Error::InvalidLayerOptions {
            layer: "<root>".into(),
            reason: "expected an object mapping layer names to options".into(),
        })?;
        let mut set = Self::new();
        for (name, options) in object {
            set.push(LayerSpec::from_json(name, options)?)?;
        }
        Ok(set)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerSpec> {
        self.specs.iter()
    }

    pub fn get(&self, name: &str) -> Option<&LayerSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// A copy with a default `perimeter` layer prepended when missing.
    pub fn with_perimeter(&self) -> Self {
        if self.contains(PERIMETER) {
            return self.clone();
        }
        let mut specs = Vec::with_capacity(self.specs.len() + 1);
        specs.push(LayerSpec::perimeter(PerimeterOptions::default()));
        specs.extend(self.specs.iter().cloned());
        Self { specs }
    }

    /// Largest `dilate` across layers; renderers pad the plot extent by it.
    pub fn max_dilation(&self) -> f64 {
        self.specs
            .iter()
            .map(|s| s.options.dilate())
            .fold(0.0, f64::max)
    }
}

impl<'a> IntoIterator for &'a LayerSet {
    type Item = &'a LayerSpec;
    type IntoIter = std::slice::Iter<'a, LayerSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.specs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layer_category_dispatch() {
        assert_eq!(LayerCategory::of("perimeter"), LayerCategory::Perimeter);
        assert_eq!(LayerCategory::of("streets"), LayerCategory::Network);
        assert_eq!(LayerCategory::of("railway"), LayerCategory::Network);
        assert_eq!(LayerCategory::of("waterway"), LayerCategory::Network);
        assert_eq!(LayerCategory::of("building"), LayerCategory::Area);
    }

    #[test]
    fn test_width_scalar_or_mapping() {
        let uniform: WidthSpec = serde_json::from_value(json!(6)).unwrap();
        assert_eq!(uniform, WidthSpec::Uniform(6.0));

        let mapped: WidthSpec =
            serde_json::from_value(json!({"primary": 10, "residential": 4})).unwrap();
        assert_eq!(
            mapped,
            WidthSpec::per_category([("primary", 10.0), ("residential", 4.0)])
        );
    }

    #[test]
    fn test_tag_filter_bare_string_is_key() {
        let tags: TagFilter = serde_json::from_value(json!("building")).unwrap();
        assert_eq!(tags, TagFilter::key("building"));
        assert_eq!(
            tags.entries(),
            vec![("building".to_string(), TagValue::Any(true))]
        );
    }

    #[test]
    fn test_tag_filter_mapping() {
        let tags: TagFilter = serde_json::from_value(json!({
            "natural": ["water", "bay"],
            "leisure": "park",
            "landuse": true,
            "amenity": false
        }))
        .unwrap();
        let entries = tags.entries();
        assert_eq!(entries.len(), 3);
        assert!(tags.matches(|k| (k == "natural").then_some("bay")));
        assert!(tags.matches(|k| (k == "leisure").then_some("park")));
        assert!(!tags.matches(|k| (k == "leisure").then_some("garden")));
        assert!(!tags.matches(|k| (k == "amenity").then_some("bench")));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = LayerSpec::from_json("streets", &json!({"widht": 5})).unwrap_err();
        assert!(matches!(err, Error::InvalidLayerOptions { .. }));

        // Area-only key on a network layer
        let err = LayerSpec::from_json("streets", &json!({"union": false})).unwrap_err();
        assert!(matches!(err, Error::InvalidLayerOptions { .. }));
    }

    #[test]
    fn test_defaults_from_null_and_empty() {
        let spec = LayerSpec::from_json("perimeter", &Value::Null).unwrap();
        assert_eq!(spec.options, LayerOptions::Perimeter(PerimeterOptions::default()));

        let spec = LayerSpec::from_json("building", &json!({})).unwrap();
        match spec.options {
            LayerOptions::Area(o) => {
                assert!(o.union);
                assert!(o.circle);
                assert_eq!(o.dilate, 0.0);
            }
            other => panic!("expected area options, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_width_rejected() {
        let err = LayerSpec::from_json("streets", &json!({"width": {"primary": -1}})).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "width", .. }));
    }

    #[test]
    fn test_mismatched_options_unsupported() {
        let spec = LayerSpec::network("building", NetworkOptions::default());
        assert!(matches!(spec.validate(), Err(Error::UnsupportedLayer { .. })));

        let spec = LayerSpec::area("", AreaOptions::default());
        assert!(matches!(spec.validate(), Err(Error::UnsupportedLayer { .. })));
    }

    #[test]
    fn test_layer_set_preserves_order() {
        let set = LayerSet::from_json_str(
            r#"{"water": {"tags": "water"}, "perimeter": {}, "streets": {"width": 6}, "building": {}}"#,
        )
        .unwrap();
        let names: Vec<_> = set.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["water", "perimeter", "streets", "building"]);
    }

    #[test]
    fn test_with_perimeter_prepends_without_mutating() {
        let set = LayerSet::new()
            .with(LayerSpec::with_defaults("streets"))
            .unwrap();
        let full = set.with_perimeter();
        assert_eq!(set.len(), 1);
        let names: Vec<_> = full.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["perimeter", "streets"]);
    }

    #[test]
    fn test_duplicate_layers_rejected() {
        let set = LayerSet::new().with(LayerSpec::with_defaults("building")).unwrap();
        assert!(set.with(LayerSpec::with_defaults("building")).is_err());
    }

    #[test]
    fn test_max_dilation() {
        let set = LayerSet::from_json_str(
            r#"{"perimeter": {"dilate": 100}, "streets": {"dilate": 250}, "building": {}}"#,
        )
        .unwrap();
        assert_eq!(set.max_dilation(), 250.0);
    }
}
