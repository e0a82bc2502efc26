//! Overpass elements to features and networks
//!
//! Nodes become points and open ways lines. Closed ways are areas unless
//! they are tagged as linear features. Multipolygon and boundary relations
//! are rebuilt from their member ways.

use std::collections::BTreeMap;

use geo::{Contains, Coord, Geometry, LineString, MultiPolygon, Point, Polygon};
use tracing::debug;
use vistamap_core::{Feature, FeatureCollection, NetworkEdge, NetworkGraph, CRS};

use crate::models::{Element, GeomPoint};

/// Keys whose closed ways are still lines (a roundabout, a fence).
const LINEAR_KEYS: [&str; 6] = ["highway", "barrier", "railway", "waterway", "power", "route"];

fn coords(points: &[GeomPoint]) -> Vec<Coord<f64>> {
    points.iter().map(|p| Coord::from(*p)).collect()
}

fn is_closed(coords: &[Coord<f64>]) -> bool {
    coords.len() >= 4 && coords.first() == coords.last()
}

/// Whether a closed way describes an area.
fn closed_way_is_area(tags: &BTreeMap<String, String>) -> bool {
    match tags.get("area").map(String::as_str) {
        Some("yes") => true,
        Some("no") => false,
        _ => !LINEAR_KEYS.iter().any(|k| tags.contains_key(*k)),
    }
}

fn way_geometry(points: &[GeomPoint], tags: &BTreeMap<String, String>) -> Option<Geometry<f64>> {
    let coords = coords(points);
    if coords.len() < 2 {
        return None;
    }
    if is_closed(&coords) && closed_way_is_area(tags) {
        Some(Geometry::Polygon(Polygon::new(LineString::new(coords), vec![])))
    } else {
        Some(Geometry::LineString(LineString::new(coords)))
    }
}

/// Join way segments end to end into closed rings. Segments that never
/// close are dropped.
pub fn assemble_rings(segments: Vec<Vec<Coord<f64>>>) -> Vec<LineString<f64>> {
    let mut rings = Vec::new();
    let mut open: Vec<Vec<Coord<f64>>> = Vec::new();
    for segment in segments {
        if segment.len() < 2 {
            continue;
        }
        if is_closed(&segment) {
            rings.push(LineString::new(segment));
        } else {
            open.push(segment);
        }
    }

    while let Some(mut current) = open.pop() {
        loop {
            if is_closed(&current) {
                rings.push(LineString::new(current));
                break;
            }
            let Some(&end) = current.last() else { break };
            let next = open
                .iter()
                .position(|s| s.first() == Some(&end) || s.last() == Some(&end));
            match next {
                Some(i) => {
                    let mut segment = open.swap_remove(i);
                    if segment.first() != Some(&end) {
                        segment.reverse();
                    }
                    current.extend(segment.into_iter().skip(1));
                }
                None => {
                    debug!("dropping unclosed ring of {} point(s)", current.len());
                    break;
                }
            }
        }
    }
    rings
}

/// Polygons from outer and inner rings; each inner ring goes to the first
/// outer ring that contains it.
fn rings_to_multipolygon(outers: Vec<LineString<f64>>, inners: Vec<LineString<f64>>) -> MultiPolygon<f64> {
    let mut polygons: Vec<(Polygon<f64>, Vec<LineString<f64>>)> = outers
        .into_iter()
        .map(|ring| (Polygon::new(ring, vec![]), Vec::new()))
        .collect();
    for inner in inners {
        let Some(&first) = inner.0.first() else { continue };
        if let Some((_, holes)) = polygons
            .iter_mut()
            .find(|(outer, _)| outer.contains(&Point::from(first)))
        {
            holes.push(inner);
        }
    }
    MultiPolygon::new(
        polygons
            .into_iter()
            .map(|(outer, holes)| Polygon::new(outer.exterior().clone(), holes))
            .collect(),
    )
}

fn relation_geometry(element: &Element) -> Option<Geometry<f64>> {
    let Element::Relation { members, tags, .. } = element else {
        return None;
    };
    if !matches!(tags.get("type").map(String::as_str), Some("multipolygon") | Some("boundary")) {
        return None;
    }
    let ways = members.iter().filter(|m| m.kind == "way");
    let (mut outer, mut inner) = (Vec::new(), Vec::new());
    for member in ways {
        let segment = coords(&member.geometry);
        if member.role == "inner" {
            inner.push(segment);
        } else {
            outer.push(segment);
        }
    }
    let polygons = rings_to_multipolygon(assemble_rings(outer), assemble_rings(inner));
    (!polygons.0.is_empty()).then_some(Geometry::MultiPolygon(polygons))
}

/// Convert Overpass elements into geographic features.
pub fn elements_to_features(elements: &[Element]) -> FeatureCollection {
    let mut features = FeatureCollection::new(CRS::wgs84());
    for element in elements {
        let (geometry, tags, id) = match element {
            Element::Node { id, lat, lon, tags } => {
                if tags.is_empty() {
                    continue;
                }
                (Some(Geometry::Point(Point::new(*lon, *lat))), tags, format!("node/{id}"))
            }
            Element::Way { id, geometry, tags, .. } => {
                (way_geometry(geometry, tags), tags, format!("way/{id}"))
            }
            Element::Relation { id, tags, .. } => {
                (relation_geometry(element), tags, format!("relation/{id}"))
            }
        };
        let Some(geometry) = geometry else { continue };
        let mut feature = Feature::new(geometry).with_id(id);
        feature.tags = tags.clone();
        features.push(feature);
    }
    features
}

/// Convert Overpass ways into a network graph, one edge per way.
pub fn elements_to_network(elements: &[Element]) -> NetworkGraph {
    let mut graph = NetworkGraph::new(CRS::wgs84());
    for element in elements {
        let Element::Way {
            nodes,
            geometry,
            tags,
            ..
        } = element
        else {
            continue;
        };
        if geometry.len() < 2 {
            continue;
        }
        if nodes.len() == geometry.len() {
            for (id, point) in nodes.iter().zip(geometry) {
                graph.add_node(*id, Point::from(Coord::from(*point)));
            }
        }
        let (u, v) = match (nodes.first(), nodes.last()) {
            (Some(u), Some(v)) => (*u, *v),
            _ => continue,
        };
        let mut edge = NetworkEdge::new(u, v, LineString::new(coords(geometry)));
        edge.tags = tags.clone();
        graph.add_edge(edge);
    }
    graph
}
