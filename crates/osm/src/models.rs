//! Serde models for Nominatim and Overpass responses.
//!
//! Only the fields the pipeline reads are modelled; everything else in the
//! payloads is ignored.

use std::collections::BTreeMap;

use geo::{Coord, Geometry, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// GeoJSON (Nominatim `format=geojson`)
// ---------------------------------------------------------------------------

type Position = [f64; 2];

/// A GeoJSON geometry object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum GeoJsonGeometry {
    Point(Position),
    MultiPoint(Vec<Position>),
    LineString(Vec<Position>),
    MultiLineString(Vec<Vec<Position>>),
    Polygon(Vec<Vec<Position>>),
    MultiPolygon(Vec<Vec<Vec<Position>>>),
}

fn line(positions: &[Position]) -> LineString<f64> {
    positions.iter().map(|[x, y]| Coord { x: *x, y: *y }).collect()
}

fn polygon(rings: &[Vec<Position>]) -> Option<Polygon<f64>> {
    let (exterior, interiors) = rings.split_first()?;
    Some(Polygon::new(
        line(exterior),
        interiors.iter().map(|r| line(r)).collect(),
    ))
}

impl GeoJsonGeometry {
    pub fn to_geometry(&self) -> Option<Geometry<f64>> {
        Some(match self {
            GeoJsonGeometry::Point([x, y]) => Geometry::Point(Point::new(*x, *y)),
            GeoJsonGeometry::MultiPoint(points) => Geometry::MultiPoint(MultiPoint::new(
                points.iter().map(|[x, y]| Point::new(*x, *y)).collect(),
            )),
            GeoJsonGeometry::LineString(positions) => Geometry::LineString(line(positions)),
            GeoJsonGeometry::MultiLineString(lines) => Geometry::MultiLineString(
                MultiLineString::new(lines.iter().map(|l| line(l)).collect()),
            ),
            GeoJsonGeometry::Polygon(rings) => Geometry::Polygon(polygon(rings)?),
            GeoJsonGeometry::MultiPolygon(polygons) => Geometry::MultiPolygon(MultiPolygon::new(
                polygons.iter().filter_map(|p| polygon(p)).collect(),
            )),
        })
    }

    /// The areal part of this geometry, if it has one.
    pub fn to_multipolygon(&self) -> Option<MultiPolygon<f64>> {
        match self.to_geometry()? {
            Geometry::Polygon(p) => Some(MultiPolygon::new(vec![p])),
            Geometry::MultiPolygon(mp) if !mp.0.is_empty() => Some(mp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoJsonFeature {
    pub geometry: Option<GeoJsonGeometry>,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl GeoJsonFeature {
    pub fn display_name(&self) -> Option<&str> {
        self.properties.get("display_name").and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeoJsonFeatureCollection {
    #[serde(default)]
    pub features: Vec<GeoJsonFeature>,
}

// ---------------------------------------------------------------------------
// Nominatim `format=jsonv2`
// ---------------------------------------------------------------------------

/// One place from a `format=jsonv2` search. Coordinates come as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub osm_type: Option<String>,
    #[serde(default)]
    pub osm_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Overpass `[out:json]` with `out geom`
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeomPoint {
    pub lat: f64,
    pub lon: f64,
}

impl From<GeomPoint> for Coord<f64> {
    fn from(p: GeomPoint) -> Self {
        Coord { x: p.lon, y: p.lat }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RelationMember {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "ref")]
    pub reference: i64,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub geometry: Vec<GeomPoint>,
}

/// An OSM element as Overpass returns it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Node {
        id: i64,
        lat: f64,
        lon: f64,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
    Way {
        id: i64,
        #[serde(default)]
        nodes: Vec<i64>,
        #[serde(default)]
        geometry: Vec<GeomPoint>,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
    Relation {
        id: i64,
        #[serde(default)]
        members: Vec<RelationMember>,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<Element>,
    /// Set by the server when a query hit a runtime error such as a timeout.
    #[serde(default)]
    pub remark: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    #[test]
    fn test_parse_geojson_boundary() {
        let body = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"display_name": "Somewhere", "osm_type": "relation"},
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}
            }]
        }"#;
        let collection: GeoJsonFeatureCollection = serde_json::from_str(body).unwrap();
        let feature = &collection.features[0];
        assert_eq!(feature.display_name(), Some("Somewhere"));
        let mp = feature.geometry.as_ref().unwrap().to_multipolygon().unwrap();
        assert!((mp.unsigned_area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_point_is_not_a_boundary() {
        let geometry: GeoJsonGeometry =
            serde_json::from_str(r#"{"type": "Point", "coordinates": [2.35, 48.85]}"#).unwrap();
        assert!(geometry.to_multipolygon().is_none());
        assert_eq!(geometry.to_geometry(), Some(Geometry::Point(Point::new(2.35, 48.85))));
    }

    #[test]
    fn test_parse_overpass_elements() {
        let body = r#"{
            "version": 0.6,
            "elements": [
                {"type": "node", "id": 1, "lat": 40.0, "lon": -74.0, "tags": {"amenity": "cafe"}},
                {"type": "way", "id": 2, "nodes": [1, 3],
                 "geometry": [{"lat": 40.0, "lon": -74.0}, {"lat": 40.1, "lon": -74.0}],
                 "tags": {"highway": "primary"}},
                {"type": "relation", "id": 4, "members": [
                    {"type": "way", "ref": 2, "role": "outer", "geometry": []}
                 ], "tags": {"type": "multipolygon"}}
            ]
        }"#;
        let response: OverpassResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.elements.len(), 3);
        assert!(response.remark.is_none());
        match &response.elements[1] {
            Element::Way { nodes, geometry, .. } => {
                assert_eq!(nodes, &[1, 3]);
                assert_eq!(Coord::from(geometry[1]), Coord { x: -74.0, y: 40.1 });
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_parse_nominatim_place() {
        let body = r#"[{"lat": "40.7127281", "lon": "-74.0060152", "display_name": "New York"}]"#;
        let places: Vec<NominatimPlace> = serde_json::from_str(body).unwrap();
        assert_eq!(places[0].lat, "40.7127281");
        assert_eq!(places[0].display_name, "New York");
    }
}
