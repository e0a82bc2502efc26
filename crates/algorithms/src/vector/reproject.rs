//! Moving geometries between geographic coordinates and a UTM zone

use geo::{Coord, Geometry, MapCoords, MultiPolygon};
use vistamap_core::{Error, Result, UtmProjection, CRS};

/// Project a geographic `(lon, lat)` geometry into `projection`.
pub fn project_geometry(geom: &Geometry<f64>, projection: UtmProjection) -> Geometry<f64> {
    geom.map_coords(move |c| {
        let (x, y) = projection.forward(c.x, c.y);
        Coord { x, y }
    })
}

/// Project a geographic multipolygon into `projection`.
pub fn project_multipolygon(mp: &MultiPolygon<f64>, projection: UtmProjection) -> MultiPolygon<f64> {
    mp.map_coords(move |c| {
        let (x, y) = projection.forward(c.x, c.y);
        Coord { x, y }
    })
}

/// Bring a projected multipolygon back to geographic `(lon, lat)`.
pub fn unproject_multipolygon(mp: &MultiPolygon<f64>, projection: UtmProjection) -> MultiPolygon<f64> {
    mp.map_coords(move |c| {
        let (lon, lat) = projection.inverse(c.x, c.y);
        Coord { x: lon, y: lat }
    })
}

/// Check that data from a source is geographic before projecting it.
pub fn ensure_geographic(crs: &CRS) -> Result<()> {
    if crs.is_geographic() {
        Ok(())
    } else {
        Err(Error::CrsMismatch(
            crs.identifier(),
            CRS::wgs84().identifier(),
        ))
    }
}
