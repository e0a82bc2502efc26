//! # vistamap OSM
//!
//! OpenStreetMap retrieval for the vistamap layer pipeline.
//!
//! - [`NominatimClient`]: place names and OSM ids to boundaries and points
//! - [`OverpassClient`]: tagged features and way networks in an area
//! - [`OsmSource`]: blocking [`vistamap_core::FeatureSource`] over both,
//!   with retry and an LRU response cache

pub mod cache;
pub mod convert;
pub mod error;
pub mod http;
pub mod models;
pub mod nominatim;
pub mod overpass;
pub mod sync_api;

pub use cache::{ResponseCache, SharedCache};
pub use error::{OsmError, Result};
pub use nominatim::NominatimClient;
pub use overpass::OverpassClient;
pub use sync_api::{OsmSource, OsmSourceOptions};
