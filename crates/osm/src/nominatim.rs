//! Async Nominatim client: place names and OSM ids to boundaries and points.

use geo::MultiPolygon;
use tracing::{debug, info};
use vistamap_core::LatLon;

use crate::cache::{RequestKey, Service, SharedCache};
use crate::error::{OsmError, Result};
use crate::http::HttpClient;
use crate::models::{GeoJsonFeatureCollection, NominatimPlace};

/// Results requested per search; the first areal one is used.
const SEARCH_LIMIT: usize = 10;

/// Async client for a Nominatim instance.
pub struct NominatimClient {
    http: HttpClient,
    base_url: String,
    cache: SharedCache,
}

/// Boundary of the first areal result in a `format=geojson` body.
pub fn parse_boundary(body: &str, query: &str) -> Result<MultiPolygon<f64>> {
    let collection: GeoJsonFeatureCollection =
        serde_json::from_str(body).map_err(|e| OsmError::parse("Nominatim response", e))?;
    collection
        .features
        .iter()
        .find_map(|f| {
            let boundary = f.geometry.as_ref()?.to_multipolygon()?;
            debug!("boundary for '{}': {}", query, f.display_name().unwrap_or("?"));
            Some(boundary)
        })
        .ok_or_else(|| OsmError::NotFound(query.to_string()))
}

/// Location of the first result in a `format=jsonv2` body.
pub fn parse_point(body: &str, query: &str) -> Result<LatLon> {
    let places: Vec<NominatimPlace> =
        serde_json::from_str(body).map_err(|e| OsmError::parse("Nominatim response", e))?;
    let place = places
        .first()
        .ok_or_else(|| OsmError::NotFound(query.to_string()))?;
    let lat = place.lat.parse::<f64>().map_err(|e| OsmError::parse("latitude", e))?;
    let lon = place.lon.parse::<f64>().map_err(|e| OsmError::parse("longitude", e))?;
    debug!("'{}' located at {}, {} ({})", query, lat, lon, place.display_name);
    Ok(LatLon::new(lat, lon))
}

impl NominatimClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>, cache: SharedCache) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache,
        }
    }

    async fn get(&self, endpoint: &str, params: Vec<(&str, String)>) -> Result<String> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let request: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        let key = RequestKey::new(Service::Nominatim, format!("{url}?{}", request.join("&")));
        if let Some(body) = self.cache.get(&key) {
            debug!("nominatim cache hit for {}", key.request);
            return Ok(body);
        }
        let body = self.http.get(&url, &params).await?;
        self.cache.insert(key, body.clone());
        Ok(body)
    }

    /// Boundary polygon for a place name, or for an OSM id such as `R2404020`.
    pub async fn boundary(&self, query: &str, by_osmid: bool) -> Result<MultiPolygon<f64>> {
        info!("geocoding boundary for '{}'", query);
        let body = if by_osmid {
            self.get(
                "lookup",
                vec![
                    ("osm_ids", query.to_string()),
                    ("format", "geojson".into()),
                    ("polygon_geojson", "1".into()),
                ],
            )
            .await?
        } else {
            self.get(
                "search",
                vec![
                    ("q", query.to_string()),
                    ("format", "geojson".into()),
                    ("polygon_geojson", "1".into()),
                    ("limit", SEARCH_LIMIT.to_string()),
                ],
            )
            .await?
        };
        parse_boundary(&body, query)
    }

    /// Reference point for a place name.
    pub async fn point(&self, query: &str) -> Result<LatLon> {
        info!("geocoding point for '{}'", query);
        let body = self
            .get(
                "search",
                vec![
                    ("q", query.to_string()),
                    ("format", "jsonv2".into()),
                    ("limit", "1".into()),
                ],
            )
            .await?;
        parse_point(&body, query)
    }
}
