//! The feature-retrieval seam
//!
//! The pipeline needs four things from the outside world: a boundary for a
//! place name or OSM id, a point for a place name, tagged features in an
//! area, and a way network in an area. [`FeatureSource`] is that contract.
//! Everything it returns is in geographic coordinates.

use geo::{Coord, Distance, Euclidean, Geometry, Intersects, MapCoords, MultiPolygon, Point};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::crs::{UtmProjection, CRS};
use crate::error::{Error, Result};
use crate::options::TagFilter;
use crate::query::LatLon;
use crate::vector::{Feature, FeatureCollection, NetworkEdge, NetworkGraph};

/// Where a source should look.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchArea {
    /// Inside a geographic (multi)polygon.
    Polygon(MultiPolygon<f64>),
    /// Within `distance` metres of a point.
    Around { point: LatLon, distance: f64 },
}

/// Which ways make up a network layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkFilter {
    /// Category key, e.g. `highway` or `railway`.
    pub key: String,
    /// Raw Overpass filter overriding the default `["<key>"]`.
    pub custom: Option<String>,
}

impl NetworkFilter {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            custom: None,
        }
    }

    pub fn with_custom(mut self, custom: Option<String>) -> Self {
        self.custom = custom;
        self
    }

    /// Overpass filter clause selecting the network's ways.
    pub fn overpass_filter(&self) -> String {
        match &self.custom {
            Some(custom) => custom.clone(),
            None => format!("[\"{}\"]", self.key),
        }
    }
}

/// External feature retrieval. Implementations must be reentrant if the
/// caller runs pipelines on several threads.
pub trait FeatureSource {
    /// CRS of everything this source returns.
    fn crs(&self) -> CRS {
        CRS::wgs84()
    }

    /// Boundary polygon for a place name, or for an OSM id such as `R123`.
    fn geocode_boundary(&self, query: &str, by_osmid: bool) -> Result<MultiPolygon<f64>>;

    /// Reference point for a place name.
    fn geocode_point(&self, query: &str) -> Result<LatLon>;

    /// Features matching `tags` within `area`.
    fn features(&self, area: &SearchArea, tags: &TagFilter) -> Result<FeatureCollection>;

    /// Way network selected by `filter` within `area`.
    fn network(&self, area: &SearchArea, filter: &NetworkFilter) -> Result<NetworkGraph>;
}

impl<S: FeatureSource + ?Sized> FeatureSource for &S {
    fn crs(&self) -> CRS {
        (**self).crs()
    }

    fn geocode_boundary(&self, query: &str, by_osmid: bool) -> Result<MultiPolygon<f64>> {
        (**self).geocode_boundary(query, by_osmid)
    }

    fn geocode_point(&self, query: &str) -> Result<LatLon> {
        (**self).geocode_point(query)
    }

    fn features(&self, area: &SearchArea, tags: &TagFilter) -> Result<FeatureCollection> {
        (**self).features(area, tags)
    }

    fn network(&self, area: &SearchArea, filter: &NetworkFilter) -> Result<NetworkGraph> {
        (**self).network(area, filter)
    }
}

impl SearchArea {
    /// Whether a geographic geometry touches this area. For a point area the
    /// geometry is projected into the point's UTM zone and its planar
    /// distance to the point is compared with the range.
    pub fn touches(&self, geometry: &Geometry<f64>) -> bool {
        match self {
            SearchArea::Polygon(polygon) => geometry.intersects(polygon),
            SearchArea::Around { point, distance } => {
                let projection = UtmProjection::for_lonlat(point.lon, point.lat);
                let (x, y) = projection.forward(point.lon, point.lat);
                let projected = geometry.map_coords(|c| {
                    let (x, y) = projection.forward(c.x, c.y);
                    Coord { x, y }
                });
                Euclidean::distance(&Point::new(x, y), &projected) <= *distance
            }
        }
    }
}

/// A source answering from data held in memory.
///
/// Useful for offline runs over a prepared extract and for tests. Custom
/// network filters are not interpreted; ways are selected by key only.
#[derive(Debug, Default)]
pub struct MemorySource {
    features: Vec<Feature>,
    edges: Vec<NetworkEdge>,
    boundaries: HashMap<String, MultiPolygon<f64>>,
    points: HashMap<String, LatLon>,
    requests: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    pub fn with_edge(mut self, edge: NetworkEdge) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn with_boundary(mut self, query: impl Into<String>, boundary: MultiPolygon<f64>) -> Self {
        self.boundaries.insert(query.into(), boundary);
        self
    }

    pub fn with_point(mut self, query: impl Into<String>, point: LatLon) -> Self {
        self.points.insert(query.into(), point);
        self
    }

    /// Number of requests answered so far.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    fn count(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }
}

impl FeatureSource for MemorySource {
    fn geocode_boundary(&self, query: &str, _by_osmid: bool) -> Result<MultiPolygon<f64>> {
        self.count();
        self.boundaries
            .get(query)
            .cloned()
            .ok_or_else(|| Error::Other(format!("no boundary found for '{query}'")))
    }

    fn geocode_point(&self, query: &str) -> Result<LatLon> {
        self.count();
        self.points
            .get(query)
            .copied()
            .ok_or_else(|| Error::Other(format!("no location found for '{query}'")))
    }

    fn features(&self, area: &SearchArea, tags: &TagFilter) -> Result<FeatureCollection> {
        self.count();
        let features = self
            .features
            .iter()
            .filter(|f| tags.matches(|k| f.tag(k)))
            .filter(|f| area.touches(&f.geometry))
            .cloned()
            .collect();
        Ok(FeatureCollection::from_features(features, self.crs()))
    }

    fn network(&self, area: &SearchArea, filter: &NetworkFilter) -> Result<NetworkGraph> {
        self.count();
        let mut graph = NetworkGraph::new(self.crs());
        for edge in &self.edges {
            let geometry = Geometry::LineString(edge.geometry.clone());
            if edge.tag(&filter.key).is_some() && area.touches(&geometry) {
                graph.add_edge(edge.clone());
            }
        }
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point, polygon};

    #[test]
    fn test_network_filter_clause() {
        assert_eq!(NetworkFilter::new("highway").overpass_filter(), "[\"highway\"]");
        let custom = NetworkFilter::new("railway")
            .with_custom(Some("[\"railway\"~\"rail|tram\"]".into()));
        assert_eq!(custom.overpass_filter(), "[\"railway\"~\"rail|tram\"]");
    }

    fn around_city_hall(distance: f64) -> SearchArea {
        SearchArea::Around {
            point: LatLon::new(40.7128, -74.0060),
            distance,
        }
    }

    #[test]
    fn test_around_keeps_line_crossing_disk() {
        // Runs about 220 m north of the centre, both ends well over 1 km away
        let street = Geometry::LineString(line_string![
            (x: -74.0260, y: 40.7148),
            (x: -73.9860, y: 40.7148),
        ]);
        assert!(around_city_hall(500.0).touches(&street));
        assert!(!around_city_hall(200.0).touches(&street));
    }

    #[test]
    fn test_around_keeps_polygon_straddling_edge() {
        // Overlaps the east edge of a 500 m disk; every vertex is farther out
        let building = Geometry::Polygon(polygon![
            (x: -74.0005, y: 40.7080),
            (x: -73.9950, y: 40.7080),
            (x: -73.9950, y: 40.7176),
            (x: -74.0005, y: 40.7176),
        ]);
        assert!(around_city_hall(500.0).touches(&building));
        assert!(!around_city_hall(400.0).touches(&building));
    }

    #[test]
    fn test_around_contains_covering_polygon() {
        let block = Geometry::Polygon(polygon![
            (x: -74.1, y: 40.6), (x: -73.9, y: 40.6), (x: -73.9, y: 40.8), (x: -74.1, y: 40.8),
        ]);
        assert!(around_city_hall(10.0).touches(&block));
    }

    #[test]
    fn test_memory_source_filters_by_tag_and_area() {
        let near = Feature::new(point!(x: -74.0060, y: 40.7128)).with_tag("amenity", "cafe");
        let far = Feature::new(point!(x: -73.0, y: 40.7128)).with_tag("amenity", "cafe");
        let other = Feature::new(point!(x: -74.0060, y: 40.7128)).with_tag("shop", "bakery");
        let source = MemorySource::new()
            .with_feature(near.clone())
            .with_feature(far)
            .with_feature(other);

        let area = SearchArea::Around {
            point: LatLon::new(40.7128, -74.0060),
            distance: 1_000.0,
        };
        let found = source.features(&area, &TagFilter::key("amenity")).unwrap();
        assert_eq!(found.features, vec![near]);
        assert_eq!(found.crs, CRS::wgs84());
        assert_eq!(source.requests(), 1);
    }

    #[test]
    fn test_memory_source_network_by_key() {
        let source = MemorySource::new()
            .with_edge(
                NetworkEdge::new(1, 2, line_string![(x: 0.0, y: 0.0), (x: 0.001, y: 0.0)])
                    .with_tag("highway", "residential"),
            )
            .with_edge(
                NetworkEdge::new(3, 4, line_string![(x: 0.0, y: 0.0), (x: 0.0, y: 0.001)])
                    .with_tag("railway", "rail"),
            );
        let area = SearchArea::Polygon(MultiPolygon::new(vec![polygon![
            (x: -1.0, y: -1.0), (x: 1.0, y: -1.0), (x: 1.0, y: 1.0), (x: -1.0, y: 1.0),
        ]]));
        let graph = source.network(&area, &NetworkFilter::new("highway")).unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_memory_source_unknown_query() {
        let source = MemorySource::new();
        assert!(source.geocode_point("Atlantis").is_err());
        assert!(source.geocode_boundary("Atlantis", false).is_err());
    }
}
