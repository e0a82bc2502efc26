//! # vistamap Core
//!
//! Core types for the vistamap layer pipeline.
//!
//! This crate provides:
//! - `Query` and its classifier
//! - `Anchor`: the perimeter or point+radius every layer is fetched against
//! - Per-layer option records (`LayerSpec`, `LayerSet`)
//! - `LayerMap`: the ordered result handed to renderers
//! - `FeatureSource`: the seam to external feature retrieval
//! - `CRS` and the UTM projection used for metric geometry

pub mod anchor;
pub mod crs;
pub mod error;
pub mod layer;
pub mod options;
pub mod query;
pub mod source;
pub mod vector;

pub use anchor::Anchor;
pub use crs::{UtmProjection, CRS};
pub use error::{Error, Result};
pub use layer::LayerMap;
pub use options::{
    AreaOptions, LayerCategory, LayerOptions, LayerSet, LayerSpec, NetworkOptions,
    PerimeterOptions, TagFilter, TagValue, WidthSpec,
};
pub use query::{classify, LatLon, Query, QueryKind};
pub use source::{FeatureSource, MemorySource, NetworkFilter, SearchArea};
pub use vector::{Feature, FeatureCollection, NetworkEdge, NetworkGraph};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::anchor::Anchor;
    pub use crate::crs::{UtmProjection, CRS};
    pub use crate::error::{Error, Result};
    pub use crate::layer::LayerMap;
    pub use crate::options::{LayerOptions, LayerSet, LayerSpec, TagFilter, WidthSpec};
    pub use crate::query::{classify, LatLon, Query, QueryKind};
    pub use crate::source::{FeatureSource, SearchArea};
}
