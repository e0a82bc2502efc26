//! Area layers: tagged features reduced to polygons inside the perimeter

use geo::{Geometry, MultiPolygon};
use tracing::debug;
use vistamap_core::error::ensure_distance;
use vistamap_core::options::AreaOptions;
use vistamap_core::{Anchor, FeatureSource, Result, SearchArea, TagFilter, UtmProjection};

use crate::boundary::{boundary_in, PERIMETER_SEGMENTS};
use crate::vector::{
    buffer_polygons, clip_to_perimeter, ensure_geographic, explode_polygons, project_geometry,
    project_multipolygon, union_all, unproject_multipolygon, BufferParams,
};

/// Fetch an area layer such as `building`, `water` or `green`.
///
/// An empty tag filter selects features carrying the layer name as a key.
/// Points and lines are dropped; an empty result is an empty multipolygon.
pub fn fetch_geometry_layer<S: FeatureSource + ?Sized>(
    source: &S,
    anchor: &Anchor,
    projection: UtmProjection,
    name: &str,
    options: &AreaOptions,
) -> Result<Geometry<f64>> {
    let tolerance = ensure_distance("perimeter_tolerance", options.perimeter_tolerance)?;
    let dilate = ensure_distance("dilate", options.dilate)?;

    let tags = if options.tags.is_empty() {
        TagFilter::key(name)
    } else {
        options.tags.clone()
    };

    let (features, clip) = match anchor {
        Anchor::Perimeter(perimeter) => {
            let projected = union_all(project_multipolygon(perimeter, projection).0);
            let search = if tolerance > 0.0 {
                let widened = buffer_polygons(
                    &projected.0,
                    &BufferParams {
                        distance: tolerance,
                        segments: PERIMETER_SEGMENTS,
                    },
                );
                unproject_multipolygon(&widened, projection)
            } else {
                perimeter.clone()
            };
            let features = source.features(&SearchArea::Polygon(search), &tags)?;
            (features, projected)
        }
        Anchor::Around { point, radius } => {
            let features = source.features(&anchor.search_area(dilate), &tags)?;
            let clip = boundary_in(projection, *point, *radius, &features.crs, options.circle, dilate)?;
            (features, clip)
        }
    };
    ensure_geographic(&features.crs)?;

    let mut polygons = Vec::new();
    for feature in features.iter() {
        let projected = project_geometry(&feature.geometry, projection);
        polygons.extend(explode_polygons(&clip_to_perimeter(&projected, &clip)));
    }

    debug!(
        "{}: {} feature(s), {} polygon(s) after clipping",
        name,
        features.len(),
        polygons.len()
    );

    let layer = if options.union {
        union_all(polygons)
    } else {
        MultiPolygon::new(polygons)
    };
    Ok(Geometry::MultiPolygon(layer))
}
