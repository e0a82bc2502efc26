//! Boundary resolver
//!
//! Turns a point and a radius into a projected perimeter: a disk or an
//! axis-aligned square, optionally dilated.

use geo::{Coord, MultiPolygon, Polygon, Rect};
use tracing::debug;
use vistamap_core::error::ensure_distance;
use vistamap_core::{LatLon, Result, UtmProjection, CRS};

use crate::vector::{buffer_polygons, circle, ensure_geographic, BufferParams};

/// Segments used to discretise perimeter disks (16 per quadrant).
pub const PERIMETER_SEGMENTS: usize = 64;

/// Perimeter around `point` in an explicit projection.
///
/// `point` is geographic in `crs`; the result is in `projection`'s CRS.
pub fn boundary_in(
    projection: UtmProjection,
    point: LatLon,
    radius: f64,
    crs: &CRS,
    circular: bool,
    dilate: f64,
) -> Result<MultiPolygon<f64>> {
    ensure_geographic(crs)?;
    let radius = ensure_distance("radius", radius)?;
    let dilate = ensure_distance("dilate", dilate)?;

    let (x, y) = projection.forward(point.lon, point.lat);
    let center = Coord { x, y };

    let boundary = if circular {
        // Dilating a disk is the same as widening its radius
        MultiPolygon::new(vec![circle(center, radius + dilate, PERIMETER_SEGMENTS)])
    } else {
        let square: Polygon<f64> = Rect::new(
            Coord { x: x - radius, y: y - radius },
            Coord { x: x + radius, y: y + radius },
        )
        .to_polygon();
        if dilate > 0.0 {
            buffer_polygons([&square], &BufferParams {
                distance: dilate,
                segments: PERIMETER_SEGMENTS,
            })
        } else {
            MultiPolygon::new(vec![square])
        }
    };

    debug!(
        "boundary around {} in {}: radius {} m, dilate {} m, {}",
        point,
        projection.crs(),
        radius,
        dilate,
        if circular { "circle" } else { "square" }
    );
    Ok(boundary)
}

/// Perimeter around `point`, projected into the UTM zone that contains it.
pub fn resolve_boundary(
    point: LatLon,
    radius: f64,
    crs: &CRS,
    circular: bool,
    dilate: f64,
) -> Result<MultiPolygon<f64>> {
    let projection = UtmProjection::for_lonlat(point.lon, point.lat);
    boundary_in(projection, point, radius, crs, circular, dilate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, BoundingRect, Contains, Point};
    use std::f64::consts::PI;
    use vistamap_core::Error;

    fn nyc() -> LatLon {
        LatLon::new(40.7128, -74.0060)
    }

    #[test]
    fn test_circle_area() {
        let disk = resolve_boundary(nyc(), 500.0, &CRS::wgs84(), true, 0.0).unwrap();
        let expected = PI * 500.0 * 500.0;
        let error = (disk.unsigned_area() - expected).abs() / expected;
        assert!(error < 0.002, "relative error {error}");
    }

    #[test]
    fn test_square_side() {
        let square = resolve_boundary(nyc(), 250.0, &CRS::wgs84(), false, 0.0).unwrap();
        let bounds = square.bounding_rect().unwrap();
        assert!((bounds.width() - 500.0).abs() < 1e-6);
        assert!((bounds.height() - 500.0).abs() < 1e-6);
        assert!((square.unsigned_area() - 250_000.0).abs() < 1e-3);
    }

    #[test]
    fn test_dilated_square_grows() {
        let square = resolve_boundary(nyc(), 100.0, &CRS::wgs84(), false, 10.0).unwrap();
        let bounds = square.bounding_rect().unwrap();
        assert!((bounds.width() - 220.0).abs() < 1e-6);
        let center = bounds.center();
        assert!(square.contains(&Point::new(center.x + 109.0, center.y)));
        // Rounded corner
        assert!(!square.contains(&Point::new(center.x + 109.0, center.y + 109.0)));
    }

    #[test]
    fn test_dilated_circle() {
        let disk = resolve_boundary(nyc(), 100.0, &CRS::wgs84(), true, 50.0).unwrap();
        let expected = PI * 150.0 * 150.0;
        assert!((disk.unsigned_area() - expected).abs() / expected < 0.002);
    }

    #[test]
    fn test_zone_follows_point() {
        let projection = UtmProjection::for_lonlat(nyc().lon, nyc().lat);
        assert_eq!(projection.crs().epsg(), 32618);
        let disk = boundary_in(projection, nyc(), 10.0, &CRS::wgs84(), true, 0.0).unwrap();
        let c = disk.bounding_rect().unwrap().center();
        let (x, y) = projection.forward(nyc().lon, nyc().lat);
        assert!((c.x - x).abs() < 1e-6 && (c.y - y).abs() < 1e-6);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        let err = resolve_boundary(nyc(), -1.0, &CRS::wgs84(), true, 0.0).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "radius", .. }));
        let err = resolve_boundary(nyc(), 10.0, &CRS::wgs84(), true, f64::NAN).unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "dilate", .. }));
        let err = resolve_boundary(nyc(), 10.0, &CRS::utm(18, true), true, 0.0).unwrap_err();
        assert!(matches!(err, Error::CrsMismatch(..)));
    }
}
