//! Overpass QL building and the async Overpass client.

use geo::MultiPolygon;
use tracing::debug;
use vistamap_core::{FeatureCollection, NetworkFilter, NetworkGraph, SearchArea, TagFilter, TagValue};

use crate::cache::{RequestKey, Service, SharedCache};
use crate::convert::{elements_to_features, elements_to_network};
use crate::error::{OsmError, Result};
use crate::http::HttpClient;
use crate::models::OverpassResponse;

// ---------------------------------------------------------------------------
// Query language
// ---------------------------------------------------------------------------

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape regex metacharacters inside an Overpass `~` pattern.
fn escape_regex(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if "\\^$.|?*+()[]{}".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    escape(&out)
}

/// Tag clauses for a filter, one per key. Features matching any clause are
/// selected.
pub fn tag_clauses(tags: &TagFilter) -> Vec<String> {
    tags.entries()
        .into_iter()
        .map(|(key, value)| {
            let key = escape(&key);
            match value {
                TagValue::Any(_) => format!("[\"{key}\"]"),
                TagValue::One(v) => format!("[\"{key}\"=\"{}\"]", escape(&v)),
                TagValue::Many(values) => {
                    let alternatives: Vec<String> = values.iter().map(|v| escape_regex(v)).collect();
                    format!("[\"{key}\"~\"^({})$\"]", alternatives.join("|"))
                }
            }
        })
        .collect()
}

/// `poly:"lat lon ..."` clauses, one per polygon exterior.
fn poly_clauses(perimeter: &MultiPolygon<f64>) -> Vec<String> {
    perimeter
        .0
        .iter()
        .map(|polygon| {
            let coords: Vec<String> = polygon
                .exterior()
                .0
                .iter()
                .map(|c| format!("{:.7} {:.7}", c.y, c.x))
                .collect();
            format!("(poly:\"{}\")", coords.join(" "))
        })
        .collect()
}

/// Spatial filters for a search area. A multipolygon needs one per part.
pub fn area_clauses(area: &SearchArea) -> Vec<String> {
    match area {
        SearchArea::Polygon(perimeter) => poly_clauses(perimeter),
        SearchArea::Around { point, distance } => {
            vec![format!("(around:{:.1},{:.7},{:.7})", distance, point.lat, point.lon)]
        }
    }
}

fn wrap(statements: Vec<String>, timeout: u32) -> String {
    format!(
        "[out:json][timeout:{timeout}];\n(\n{}\n);\nout geom;",
        statements.join("\n")
    )
}

/// Query for nodes, ways and relations matching `tags` inside `area`.
pub fn features_query(area: &SearchArea, tags: &TagFilter, timeout: u32) -> String {
    let areas = area_clauses(area);
    let statements = tag_clauses(tags)
        .iter()
        .flat_map(|tag| areas.iter().map(move |a| format!("  nwr{tag}{a};")))
        .collect();
    wrap(statements, timeout)
}

/// Query for the ways of a network inside `area`.
pub fn network_query(area: &SearchArea, filter: &NetworkFilter, timeout: u32) -> String {
    let selector = filter.overpass_filter();
    let statements = area_clauses(area)
        .iter()
        .map(|a| format!("  way{selector}{a};"))
        .collect();
    wrap(statements, timeout)
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Async client for the Overpass API.
pub struct OverpassClient {
    http: HttpClient,
    url: String,
    /// Server-side query timeout, seconds.
    timeout: u32,
    cache: SharedCache,
}

impl OverpassClient {
    pub fn new(http: HttpClient, url: impl Into<String>, timeout: u32, cache: SharedCache) -> Self {
        Self {
            http,
            url: url.into(),
            timeout,
            cache,
        }
    }

    /// Run a raw Overpass QL query.
    pub async fn query(&self, ql: &str) -> Result<OverpassResponse> {
        let key = RequestKey::new(Service::Overpass, ql);
        let body = match self.cache.get(&key) {
            Some(body) => {
                debug!("overpass cache hit ({} bytes)", body.len());
                body
            }
            None => {
                debug!("overpass query:\n{}", ql);
                let body = self.http.post_form(&self.url, &[("data", ql)]).await?;
                self.cache.insert(key, body.clone());
                body
            }
        };

        let response: OverpassResponse =
            serde_json::from_str(&body).map_err(|e| OsmError::parse("Overpass response", e))?;
        if let Some(remark) = response.remark.as_deref() {
            if remark.contains("error") {
                return Err(OsmError::Network(format!("Overpass: {remark}")));
            }
        }
        Ok(response)
    }

    /// Features matching `tags` within `area`.
    pub async fn features(&self, area: &SearchArea, tags: &TagFilter) -> Result<FeatureCollection> {
        if tags.is_empty() {
            return Ok(FeatureCollection::default());
        }
        let response = self.query(&features_query(area, tags, self.timeout)).await?;
        let features = elements_to_features(&response.elements);
        debug!("overpass returned {} feature(s)", features.len());
        Ok(features)
    }

    /// Way network selected by `filter` within `area`.
    pub async fn network(&self, area: &SearchArea, filter: &NetworkFilter) -> Result<NetworkGraph> {
        let response = self.query(&network_query(area, filter, self.timeout)).await?;
        let graph = elements_to_network(&response.elements);
        debug!("overpass returned {} way(s)", graph.edge_count());
        Ok(graph)
    }
}
