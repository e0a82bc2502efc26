//! Clipping to a perimeter
//!
//! Polygons are intersected with the perimeter, lines are cut where they
//! cross its boundary and points are kept when they fall inside.

use geo::{
    BooleanOps, Contains, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint,
    MultiPolygon, Polygon,
};

fn clip_polygons(polygons: Vec<Polygon<f64>>, perimeter: &MultiPolygon<f64>) -> Geometry<f64> {
    Geometry::MultiPolygon(MultiPolygon::new(polygons).intersection(perimeter))
}

fn clip_lines(lines: Vec<LineString<f64>>, perimeter: &MultiPolygon<f64>) -> Geometry<f64> {
    Geometry::MultiLineString(perimeter.clip(&MultiLineString::new(lines), false))
}

/// Restrict a geometry to the part inside `perimeter`.
///
/// The result keeps the dimension of the input: polygonal input gives a
/// `MultiPolygon`, linear input a `MultiLineString`, point input a
/// `MultiPoint`. Collections are clipped member by member.
pub fn clip_to_perimeter(geom: &Geometry<f64>, perimeter: &MultiPolygon<f64>) -> Geometry<f64> {
    match geom {
        Geometry::Polygon(p) => clip_polygons(vec![p.clone()], perimeter),
        Geometry::MultiPolygon(mp) => clip_polygons(mp.0.clone(), perimeter),
        Geometry::Rect(r) => clip_polygons(vec![r.to_polygon()], perimeter),
        Geometry::Triangle(t) => clip_polygons(vec![t.to_polygon()], perimeter),
        Geometry::LineString(ls) => clip_lines(vec![ls.clone()], perimeter),
        Geometry::MultiLineString(mls) => clip_lines(mls.0.clone(), perimeter),
        Geometry::Line(l) => clip_lines(vec![LineString::from(vec![l.start, l.end])], perimeter),
        Geometry::Point(p) => Geometry::MultiPoint(MultiPoint::new(
            perimeter.contains(p).then_some(*p).into_iter().collect(),
        )),
        Geometry::MultiPoint(mp) => Geometry::MultiPoint(MultiPoint::new(
            mp.0.iter().filter(|p| perimeter.contains(*p)).copied().collect(),
        )),
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection::new_from(
            gc.0.iter().map(|g| clip_to_perimeter(g, perimeter)).collect(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point, polygon, Area};

    fn square() -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 10.0), (x: 0.0, y: 10.0),
        ]])
    }

    #[test]
    fn test_clip_polygon_overlap() {
        let shifted = Geometry::Polygon(polygon![
            (x: 5.0, y: 5.0), (x: 15.0, y: 5.0), (x: 15.0, y: 15.0), (x: 5.0, y: 15.0),
        ]);
        match clip_to_perimeter(&shifted, &square()) {
            Geometry::MultiPolygon(mp) => assert!((mp.unsigned_area() - 25.0).abs() < 1e-9),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_clip_line_crossing_boundary() {
        let line = Geometry::LineString(line_string![(x: -5.0, y: 5.0), (x: 5.0, y: 5.0)]);
        match clip_to_perimeter(&line, &square()) {
            Geometry::MultiLineString(mls) => {
                assert_eq!(mls.0.len(), 1);
                let xs: Vec<f64> = mls.0[0].0.iter().map(|c| c.x).collect();
                assert!(xs.iter().all(|x| *x >= -1e-9));
                assert!(xs.iter().any(|x| (*x - 5.0).abs() < 1e-9));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_clip_points() {
        let points = Geometry::MultiPoint(MultiPoint::new(vec![
            point!(x: 1.0, y: 1.0),
            point!(x: 20.0, y: 1.0),
        ]));
        match clip_to_perimeter(&points, &square()) {
            Geometry::MultiPoint(mp) => assert_eq!(mp.0, vec![point!(x: 1.0, y: 1.0)]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_clip_outside_is_empty() {
        let far = Geometry::Polygon(polygon![
            (x: 50.0, y: 50.0), (x: 60.0, y: 50.0), (x: 60.0, y: 60.0),
        ]);
        match clip_to_perimeter(&far, &square()) {
            Geometry::MultiPolygon(mp) => assert!(mp.0.is_empty()),
            other => panic!("unexpected {other:?}"),
        }
    }
}
