//! Coordinate Reference System handling
//!
//! Feature sources deliver geographic WGS84 coordinates; everything the
//! pipeline buffers, clips or unions lives in a UTM zone picked per run.

mod utm;

pub use utm::{is_wgs84, parse_utm_epsg, UtmProjection};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate Reference System representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CRS {
    epsg: u32,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self { epsg: code }
    }

    /// WGS84 geographic CRS (EPSG:4326)
    pub fn wgs84() -> Self {
        Self::from_epsg(4326)
    }

    /// UTM zone CRS (EPSG 326xx north, 327xx south)
    pub fn utm(zone: u32, north: bool) -> Self {
        let base = if north { 32600 } else { 32700 };
        Self::from_epsg(base + zone)
    }

    /// Get EPSG code
    pub fn epsg(&self) -> u32 {
        self.epsg
    }

    /// Whether coordinates are longitude/latitude degrees
    pub fn is_geographic(&self) -> bool {
        is_wgs84(self.epsg)
    }

    /// Whether coordinates are in linear (metric) units
    pub fn is_projected(&self) -> bool {
        parse_utm_epsg(self.epsg).is_some()
    }

    /// Get a string identifier for this CRS
    pub fn identifier(&self) -> String {
        format!("EPSG:{}", self.epsg)
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}

impl Default for CRS {
    fn default() -> Self {
        Self::wgs84()
    }
}
