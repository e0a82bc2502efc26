//! Place queries and their classification
//!
//! A query is whatever the caller hands the pipeline to say *where*: a
//! polygon, a coordinate pair, an OSM id such as `R2192363`, or free text.

use geo::{MultiPolygon, Polygon};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A geographic coordinate in degrees (WGS84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `(x, y)` order, i.e. `(lon, lat)`.
    pub fn to_xy(self) -> (f64, f64) {
        (self.lon, self.lat)
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// The place a pipeline run is built around.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// A boundary given directly, in geographic coordinates.
    Polygon(MultiPolygon<f64>),
    /// A `(lat, lon)` pair.
    Coordinates(LatLon),
    /// An OSM id or free-text address; see [`classify`].
    Text(String),
}

/// What kind of lookup a query needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    Polygon,
    Coordinates,
    OsmId,
    Address,
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QueryKind::Polygon => "polygon",
            QueryKind::Coordinates => "coordinates",
            QueryKind::OsmId => "osmid",
            QueryKind::Address => "address",
        };
        f.write_str(s)
    }
}

fn osm_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // One uppercase element-type letter (N, W, R) followed by the numeric id
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z][0-9]+$").expect("valid regex"))
}

/// Classify a query. Total and pure: text that is not an OSM id is an address.
///
/// The OSM id pattern must match the whole text, so `"R123 "` with a
/// trailing space or `"R123abc"` classify as addresses. [`Query::parse`]
/// trims its input first.
pub fn classify(query: &Query) -> QueryKind {
    match query {
        Query::Polygon(_) => QueryKind::Polygon,
        Query::Coordinates(_) => QueryKind::Coordinates,
        Query::Text(text) if osm_id_pattern().is_match(text) => QueryKind::OsmId,
        Query::Text(_) => QueryKind::Address,
    }
}

impl Query {
    pub fn coordinates(lat: f64, lon: f64) -> Self {
        Query::Coordinates(LatLon::new(lat, lon))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Query::Text(text.into())
    }

    /// Parse user input: `"lat,lon"` becomes coordinates, anything else text.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if let Some((lat, lon)) = trimmed.split_once(',') {
            if let (Ok(lat), Ok(lon)) = (lat.trim().parse::<f64>(), lon.trim().parse::<f64>()) {
                if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
                    return Query::coordinates(lat, lon);
                }
            }
        }
        Query::Text(trimmed.to_string())
    }

    pub fn kind(&self) -> QueryKind {
        classify(self)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Query::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<Polygon<f64>> for Query {
    fn from(polygon: Polygon<f64>) -> Self {
        Query::Polygon(MultiPolygon::new(vec![polygon]))
    }
}

impl From<MultiPolygon<f64>> for Query {
    fn from(polygon: MultiPolygon<f64>) -> Self {
        Query::Polygon(polygon)
    }
}

impl From<(f64, f64)> for Query {
    fn from((lat, lon): (f64, f64)) -> Self {
        Query::coordinates(lat, lon)
    }
}

impl From<&str> for Query {
    fn from(text: &str) -> Self {
        Query::text(text)
    }
}
