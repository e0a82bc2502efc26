//! The perimeter layer

use geo::{Geometry, MultiPolygon};
use tracing::debug;
use vistamap_core::error::ensure_distance;
use vistamap_core::options::PerimeterOptions;
use vistamap_core::{Anchor, FeatureSource, Result, UtmProjection};

use crate::boundary::boundary_in;
use crate::boundary::PERIMETER_SEGMENTS;
use crate::vector::{buffer_polygons, project_multipolygon, union_all, BufferParams};

/// Projected perimeter of an anchor, before any layer dilation.
///
/// Point anchors are resolved with `circle` and `dilate` as given; polygon
/// anchors are unioned and projected.
pub fn clip_perimeter<S: FeatureSource + ?Sized>(
    source: &S,
    anchor: &Anchor,
    projection: UtmProjection,
    circle: bool,
    dilate: f64,
) -> Result<MultiPolygon<f64>> {
    match anchor {
        Anchor::Perimeter(perimeter) => {
            let projected = project_multipolygon(perimeter, projection);
            Ok(union_all(projected.0))
        }
        Anchor::Around { point, radius } => {
            boundary_in(projection, *point, *radius, &source.crs(), circle, dilate)
        }
    }
}

/// Fetch the `perimeter` layer.
///
/// A polygon anchor is unioned, projected and then dilated; a point anchor
/// goes through the boundary resolver.
pub fn fetch_perimeter_layer<S: FeatureSource + ?Sized>(
    source: &S,
    anchor: &Anchor,
    projection: UtmProjection,
    options: &PerimeterOptions,
) -> Result<Geometry<f64>> {
    let dilate = ensure_distance("dilate", options.dilate)?;
    let perimeter = clip_perimeter(source, anchor, projection, options.circle, dilate)?;

    let perimeter = match anchor {
        Anchor::Perimeter(_) if dilate > 0.0 => buffer_polygons(
            &perimeter.0,
            &BufferParams {
                distance: dilate,
                segments: PERIMETER_SEGMENTS,
            },
        ),
        _ => perimeter,
    };

    debug!("perimeter: {} part(s) in {}", perimeter.0.len(), projection.crs());
    Ok(Geometry::MultiPolygon(perimeter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Area};
    use vistamap_core::{LatLon, MemorySource};

    fn block() -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: -74.01, y: 40.71), (x: -74.00, y: 40.71), (x: -74.00, y: 40.72), (x: -74.01, y: 40.72),
        ]])
    }

    #[test]
    fn test_polygon_anchor_projected() {
        let anchor = Anchor::perimeter(block());
        let projection = anchor.projection().unwrap();
        let layer = fetch_perimeter_layer(
            &MemorySource::new(),
            &anchor,
            projection,
            &PerimeterOptions::default(),
        )
        .unwrap();
        let area = layer.unsigned_area();
        assert!(area > 900_000.0 && area < 1_000_000.0, "area {area}");
    }

    #[test]
    fn test_polygon_anchor_dilated() {
        let anchor = Anchor::perimeter(block());
        let projection = anchor.projection().unwrap();
        let plain = clip_perimeter(&MemorySource::new(), &anchor, projection, true, 0.0).unwrap();
        let grown = fetch_perimeter_layer(
            &MemorySource::new(),
            &anchor,
            projection,
            &PerimeterOptions {
                circle: true,
                dilate: 20.0,
            },
        )
        .unwrap();
        assert!(grown.unsigned_area() > plain.unsigned_area());
    }

    #[test]
    fn test_point_anchor_uses_boundary() {
        let anchor = Anchor::around(LatLon::new(40.7128, -74.0060), 300.0).unwrap();
        let projection = anchor.projection().unwrap();
        let square = fetch_perimeter_layer(
            &MemorySource::new(),
            &anchor,
            projection,
            &PerimeterOptions {
                circle: false,
                dilate: 0.0,
            },
        )
        .unwrap();
        assert!((square.unsigned_area() - 360_000.0).abs() < 1e-3);
    }
}
