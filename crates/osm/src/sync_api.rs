//! Blocking `FeatureSource` backed by Nominatim and Overpass.
//!
//! Wraps the async clients with a Tokio runtime so the pipeline can stay
//! synchronous.

use std::time::Duration;

use geo::MultiPolygon;
use vistamap_core::{
    FeatureCollection, FeatureSource, LatLon, NetworkFilter, NetworkGraph, SearchArea, TagFilter,
};

use crate::cache::SharedCache;
use crate::error::{OsmError, Result};
use crate::http::HttpClient;
use crate::nominatim::NominatimClient;
use crate::overpass::OverpassClient;

/// Configuration for [`OsmSource`].
#[derive(Debug, Clone)]
pub struct OsmSourceOptions {
    /// Nominatim base URL (default the public instance).
    pub nominatim_url: String,
    /// Overpass interpreter URL (default the public instance).
    pub overpass_url: String,
    /// Sent with every request; the public instances reject anonymous clients.
    pub user_agent: String,
    /// Per-request timeout (default 180 s).
    pub request_timeout: Duration,
    /// Maximum retries on transient failures (default 3).
    pub max_retries: u32,
    /// Responses kept in the LRU cache (default 64).
    pub cache_capacity: usize,
    /// Server-side Overpass timeout in seconds (default 180).
    pub overpass_timeout: u32,
}

impl Default for OsmSourceOptions {
    fn default() -> Self {
        Self {
            nominatim_url: "https://nominatim.openstreetmap.org".to_string(),
            overpass_url: "https://overpass-api.de/api/interpreter".to_string(),
            user_agent: concat!("vistamap/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout: Duration::from_secs(180),
            max_retries: 3,
            cache_capacity: 64,
            overpass_timeout: 180,
        }
    }
}

/// Blocking OSM feature source.
///
/// Uses an internal single-threaded Tokio runtime. Responses are cached, so
/// rebuilding the same place is cheap.
pub struct OsmSource {
    rt: tokio::runtime::Runtime,
    nominatim: NominatimClient,
    overpass: OverpassClient,
    cache: SharedCache,
}

impl OsmSource {
    pub fn new(options: OsmSourceOptions) -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| OsmError::Network(e.to_string()))?;

        let http = HttpClient::new(&options.user_agent, options.request_timeout, options.max_retries)?;
        let cache = SharedCache::new(options.cache_capacity);
        let nominatim = NominatimClient::new(http.clone(), options.nominatim_url, cache.clone());
        let overpass = OverpassClient::new(
            http,
            options.overpass_url,
            options.overpass_timeout,
            cache.clone(),
        );

        Ok(Self {
            rt,
            nominatim,
            overpass,
            cache,
        })
    }

    /// Number of responses currently cached.
    pub fn cached_responses(&self) -> usize {
        self.cache.len()
    }
}

impl FeatureSource for OsmSource {
    fn geocode_boundary(&self, query: &str, by_osmid: bool) -> vistamap_core::Result<MultiPolygon<f64>> {
        Ok(self.rt.block_on(self.nominatim.boundary(query, by_osmid))?)
    }

    fn geocode_point(&self, query: &str) -> vistamap_core::Result<LatLon> {
        Ok(self.rt.block_on(self.nominatim.point(query))?)
    }

    fn features(&self, area: &SearchArea, tags: &TagFilter) -> vistamap_core::Result<FeatureCollection> {
        Ok(self.rt.block_on(self.overpass.features(area, tags))?)
    }

    fn network(&self, area: &SearchArea, filter: &NetworkFilter) -> vistamap_core::Result<NetworkGraph> {
        Ok(self.rt.block_on(self.overpass.network(area, filter))?)
    }
}
