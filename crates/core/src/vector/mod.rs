//! Raw features and way networks as delivered by a feature source
//!
//! Both carry the CRS their coordinates are in; sources deliver WGS84 and
//! the pipeline projects them itself.

use geo::{Geometry, LineString, Point};
use std::collections::{BTreeMap, HashMap};

use crate::crs::CRS;

/// OSM-style string tags
pub type Tags = BTreeMap<String, String>;

/// A geographic feature with geometry and tags
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry<f64>,
    pub tags: Tags,
    /// Optional feature ID, e.g. `way/123`
    pub id: Option<String>,
}

impl Feature {
    /// Create a new untagged feature
    pub fn new(geometry: impl Into<Geometry<f64>>) -> Self {
        Self {
            geometry: geometry.into(),
            tags: Tags::new(),
            id: None,
        }
    }

    /// Builder-style tag setter
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Get a tag value
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// Collection of features sharing one CRS
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
    pub crs: CRS,
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new(CRS::wgs84())
    }
}

impl FeatureCollection {
    pub fn new(crs: CRS) -> Self {
        Self {
            features: Vec::new(),
            crs,
        }
    }

    pub fn from_features(features: Vec<Feature>, crs: CRS) -> Self {
        Self { features, crs }
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

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}

/// One edge of a way network, from node `u` to node `v`
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkEdge {
    pub u: i64,
    pub v: i64,
    pub geometry: LineString<f64>,
    pub tags: Tags,
}

impl NetworkEdge {
    pub fn new(u: i64, v: i64, geometry: LineString<f64>) -> Self {
        Self {
            u,
            v,
            geometry,
            tags: Tags::new(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

/// A routable network: node positions plus edges with line geometry
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkGraph {
    pub nodes: HashMap<i64, Point<f64>>,
    pub edges: Vec<NetworkEdge>,
    pub crs: CRS,
}

impl Default for NetworkGraph {
    fn default() -> Self {
        Self::new(CRS::wgs84())
    }
}

impl NetworkGraph {
    pub fn new(crs: CRS) -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            crs,
        }
    }

    pub fn add_node(&mut self, id: i64, point: Point<f64>) {
        self.nodes.insert(id, point);
    }

    /// Add an edge; its end points are registered as nodes.
    pub fn add_edge(&mut self, edge: NetworkEdge) {
        if let (Some(first), Some(last)) = (edge.geometry.0.first(), edge.geometry.0.last()) {
            self.nodes.entry(edge.u).or_insert_with(|| Point::from(*first));
            self.nodes.entry(edge.v).or_insert_with(|| Point::from(*last));
        }
        self.edges.push(edge);
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;

    #[test]
    fn test_feature_tags() {
        let f = Feature::new(Point::new(1.0, 2.0))
            .with_tag("amenity", "cafe")
            .with_id("node/1");
        assert_eq!(f.tag("amenity"), Some("cafe"));
        assert_eq!(f.tag("shop"), None);
        assert_eq!(f.id.as_deref(), Some("node/1"));
    }

    #[test]
    fn test_graph_registers_endpoints() {
        let mut g = NetworkGraph::default();
        g.add_edge(
            NetworkEdge::new(1, 2, line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)])
                .with_tag("highway", "primary"),
        );
        g.add_edge(NetworkEdge::new(2, 3, line_string![(x: 1.0, y: 1.0), (x: 2.0, y: 1.0)]));
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.nodes[&3], Point::new(2.0, 1.0));
        assert_eq!(g.edges[0].tag("highway"), Some("primary"));
    }
}
