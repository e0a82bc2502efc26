//! The geometric reference a pipeline run fetches every layer against

use geo::{Centroid, MultiPolygon};

use crate::crs::UtmProjection;
use crate::error::{ensure_distance, Error, Result};
use crate::query::LatLon;
use crate::source::SearchArea;

/// Either a perimeter polygon or a point with a radius, never both.
///
/// Coordinates are geographic; the radius is in metres.
#[derive(Debug, Clone, PartialEq)]
pub enum Anchor {
    Perimeter(MultiPolygon<f64>),
    Around { point: LatLon, radius: f64 },
}

impl Anchor {
    pub fn perimeter(perimeter: impl Into<MultiPolygon<f64>>) -> Self {
        Anchor::Perimeter(perimeter.into())
    }

    pub fn around(point: LatLon, radius: f64) -> Result<Self> {
        let radius = ensure_distance("radius", radius)?;
        Ok(Anchor::Around { point, radius })
    }

    /// Build an anchor from loose parts, as a caller holding optional values would.
    pub fn from_parts(
        perimeter: Option<MultiPolygon<f64>>,
        point: Option<LatLon>,
        radius: Option<f64>,
    ) -> Result<Self> {
        match (perimeter, point, radius) {
            (Some(perimeter), None, None) => Ok(Anchor::Perimeter(perimeter)),
            (Some(_), _, _) => Err(Error::AmbiguousAnchor),
            (None, Some(point), Some(radius)) => Anchor::around(point, radius),
            _ => Err(Error::MissingAnchor),
        }
    }

    /// The reference coordinate: the point, or the perimeter centroid.
    pub fn center(&self) -> Result<LatLon> {
        match self {
            Anchor::Around { point, .. } => Ok(*point),
            Anchor::Perimeter(perimeter) => perimeter
                .centroid()
                .map(|c| LatLon::new(c.y(), c.x()))
                .ok_or_else(|| Error::InvalidParameter {
                    name: "perimeter",
                    value: "empty".into(),
                    reason: "perimeter has no area".into(),
                }),
        }
    }

    /// The UTM zone every layer of this run is projected into.
    pub fn projection(&self) -> Result<UtmProjection> {
        let center = self.center()?;
        Ok(UtmProjection::for_lonlat(center.lon, center.lat))
    }

    /// Area a feature source is asked to search, widened by `extra` metres
    /// for point anchors.
    pub fn search_area(&self, extra: f64) -> SearchArea {
        match self {
            Anchor::Perimeter(perimeter) => SearchArea::Polygon(perimeter.clone()),
            Anchor::Around { point, radius } => SearchArea::Around {
                point: *point,
                distance: radius + extra,
            },
        }
    }
}
