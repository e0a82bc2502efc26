//! # vistamap Algorithms
//!
//! Geometry work for the vistamap layer pipeline.
//!
//! ## Modules
//!
//! - **boundary**: disk or square perimeter around a point
//! - **layers**: perimeter, area and network layer fetchers
//! - **pipeline**: query to `LayerMap`
//! - **transform**: translate, scale and rotate a whole map
//! - **vector**: buffer, union, clip, reprojection, measurements

pub mod boundary;
pub mod layers;
pub mod pipeline;
pub mod transform;
pub mod vector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::boundary::{boundary_in, resolve_boundary};
    pub use crate::layers::{
        dilate_edges, fetch_geometry_layer, fetch_layer, fetch_network_layer,
        fetch_perimeter_layer,
    };
    pub use crate::pipeline::{build_layers, resolve_anchor, PipelineOptions};
    pub use crate::transform::{apply_transform, TransformParams};
    pub use crate::vector::{buffer_geometry, clip_to_perimeter, union_all, BufferParams};
    pub use vistamap_core::prelude::*;
}
