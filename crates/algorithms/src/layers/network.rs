//! Network layers: way networks widened into ribbons

use std::collections::BTreeMap;

use geo::{BooleanOps, Geometry, LineString, MultiPolygon};
use tracing::debug;
use vistamap_core::error::ensure_distance;
use vistamap_core::options::NetworkOptions;
use vistamap_core::{
    Anchor, FeatureSource, NetworkFilter, Result, SearchArea, UtmProjection, WidthSpec,
};

use crate::boundary::boundary_in;
use crate::vector::{
    buffer_lines, clip_to_perimeter, ensure_geographic, project_geometry, project_multipolygon,
    union_all, union_multi, BufferParams,
};

/// Segments per full circle for ribbon joints and caps.
pub const RIBBON_SEGMENTS: usize = 32;

/// OSM key whose ways make up the network for a layer name.
pub fn network_key(name: &str) -> &str {
    match name {
        "streets" => "highway",
        other => other,
    }
}

/// A network edge after projection and clipping.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedEdge {
    pub lines: Vec<LineString<f64>>,
    /// Value of the network key on the way, e.g. `residential`.
    pub category: Option<String>,
}

/// Widen edges into ribbons.
///
/// A uniform width buffers every edge; a per-category width buffers each
/// listed category by its own width and unions the ribbons. Edges whose
/// category is not listed are left out.
pub fn dilate_edges(edges: &[ProjectedEdge], width: &WidthSpec, segments: usize) -> MultiPolygon<f64> {
    match width {
        WidthSpec::Uniform(w) => buffer_lines(
            edges.iter().flat_map(|e| e.lines.iter()),
            &BufferParams {
                distance: *w,
                segments,
            },
        ),
        WidthSpec::PerCategory(widths) => {
            let mut groups: BTreeMap<&str, Vec<&LineString<f64>>> = BTreeMap::new();
            for edge in edges {
                if let Some(category) = edge.category.as_deref() {
                    if widths.contains_key(category) {
                        groups.entry(category).or_default().extend(edge.lines.iter());
                    }
                }
            }
            union_multi(groups.into_iter().map(|(category, lines)| {
                buffer_lines(
                    lines,
                    &BufferParams {
                        distance: widths[category],
                        segments,
                    },
                )
            }))
        }
    }
}

/// Fetch a network layer (`streets`, `railway`, `waterway`).
///
/// Edge geometries are projected and clipped to the perimeter, widened by
/// the width policy, and the ribbons clipped again so that joints and caps
/// stay inside the perimeter.
pub fn fetch_network_layer<S: FeatureSource + ?Sized>(
    source: &S,
    anchor: &Anchor,
    projection: UtmProjection,
    name: &str,
    options: &NetworkOptions,
) -> Result<Geometry<f64>> {
    let dilate = ensure_distance("dilate", options.dilate)?;
    options.width.validate()?;

    let key = network_key(name);
    let filter = NetworkFilter::new(key).with_custom(options.custom_filter.clone());

    let (graph, clip) = match anchor {
        Anchor::Perimeter(perimeter) => {
            let graph = source.network(&SearchArea::Polygon(perimeter.clone()), &filter)?;
            let clip = union_all(project_multipolygon(perimeter, projection).0);
            (graph, clip)
        }
        Anchor::Around { point, radius } => {
            let graph = source.network(&anchor.search_area(dilate), &filter)?;
            let clip = boundary_in(projection, *point, *radius, &graph.crs, options.circle, dilate)?;
            (graph, clip)
        }
    };
    ensure_geographic(&graph.crs)?;

    let edges: Vec<ProjectedEdge> = graph
        .edges
        .iter()
        .filter_map(|edge| {
            let projected = project_geometry(&Geometry::LineString(edge.geometry.clone()), projection);
            let lines = match clip_to_perimeter(&projected, &clip) {
                Geometry::MultiLineString(mls) => mls.0,
                _ => Vec::new(),
            };
            let lines: Vec<_> = lines.into_iter().filter(|l| l.0.len() >= 2).collect();
            (!lines.is_empty()).then(|| ProjectedEdge {
                lines,
                category: edge.tag(key).map(str::to_string),
            })
        })
        .collect();

    debug!(
        "{}: {} edge(s) fetched, {} inside the perimeter",
        name,
        graph.edge_count(),
        edges.len()
    );

    let ribbons = dilate_edges(&edges, &options.width, RIBBON_SEGMENTS);
    Ok(Geometry::MultiPolygon(ribbons.intersection(&clip)))
}
