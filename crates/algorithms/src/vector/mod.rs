//! Vector operations on projected geometries
//!
//! - Buffer: round-joined outward dilation
//! - Union: merge polygons into a minimal set
//! - Clip: restrict geometries to a perimeter
//! - Reproject: geographic to UTM and back
//! - Measurements: area, length, vertex count

mod buffer;
mod clip;
mod measurements;
mod reproject;
mod union;

pub use buffer::{
    buffer_geometry, buffer_lines, buffer_point, buffer_polygons, circle, BufferParams,
};
pub use clip::clip_to_perimeter;
pub use measurements::{area, length, LayerStats};
pub use reproject::{
    ensure_geographic, project_geometry, project_multipolygon, unproject_multipolygon,
};
pub use union::{explode_polygons, union_all, union_multi};
