//! Geometric measurements: area, length, vertex count
//!
//! Results are in CRS units; project first for square metres and metres.

use geo::{Area, CoordsIter, Euclidean, Geometry, Length};

/// Unsigned area of the polygonal parts of a geometry.
pub fn area(geom: &Geometry<f64>) -> f64 {
    match geom {
        Geometry::Polygon(p) => p.unsigned_area(),
        Geometry::MultiPolygon(mp) => mp.unsigned_area(),
        Geometry::Rect(r) => r.unsigned_area(),
        Geometry::Triangle(t) => t.unsigned_area(),
        Geometry::GeometryCollection(gc) => gc.0.iter().map(area).sum(),
        _ => 0.0,
    }
}

/// Total length of the linear parts of a geometry.
pub fn length(geom: &Geometry<f64>) -> f64 {
    match geom {
        Geometry::LineString(ls) => ls.length::<Euclidean>(),
        Geometry::MultiLineString(mls) => mls.length::<Euclidean>(),
        Geometry::Line(l) => l.length::<Euclidean>(),
        Geometry::GeometryCollection(gc) => gc.0.iter().map(length).sum(),
        _ => 0.0,
    }
}

/// Summary of one layer, as printed by the command line tool.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayerStats {
    pub area: f64,
    pub length: f64,
    pub vertices: usize,
}

impl LayerStats {
    pub fn of(geom: &Geometry<f64>) -> Self {
        Self {
            area: area(geom),
            length: length(geom),
            vertices: geom.coords_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Coord, GeometryCollection, Line, LineString, MultiLineString, Polygon};

    fn square() -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0),
            ]),
            vec![],
        )
    }

    #[test]
    fn test_area_square() {
        let a = area(&Geometry::Polygon(square()));
        assert!((a - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_area_non_polygon() {
        let line = Geometry::LineString(LineString::from(vec![(0.0, 0.0), (10.0, 10.0)]));
        assert_eq!(area(&line), 0.0);
    }

    #[test]
    fn test_length_multiline() {
        let mls = Geometry::MultiLineString(MultiLineString::new(vec![
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0)]),
            LineString::from(vec![(0.0, 0.0), (0.0, 5.0)]),
        ]));
        assert!((length(&mls) - 15.0).abs() < 1e-10);
    }

    #[test]
    fn test_length_segment() {
        let line = Geometry::Line(Line::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 6.0, y: 8.0 }));
        assert!((length(&line) - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_stats_of_collection() {
        let gc = Geometry::GeometryCollection(GeometryCollection::new_from(vec![
            Geometry::Polygon(square()),
            Geometry::LineString(LineString::from(vec![(0.0, 0.0), (3.0, 4.0)])),
        ]));
        let stats = LayerStats::of(&gc);
        assert!((stats.area - 100.0).abs() < 1e-10);
        assert!((stats.length - 5.0).abs() < 1e-10);
        assert_eq!(stats.vertices, 7);
    }
}
