//! Unary union and polygon extraction

use geo::{Area, BooleanOps, Geometry, MultiPolygon, Polygon};

/// Merge polygons into a minimal equivalent set (unary union).
///
/// Pairs are unioned level by level, so each boolean operation works on
/// inputs of similar size instead of growing one accumulator.
pub fn union_all(polygons: Vec<Polygon<f64>>) -> MultiPolygon<f64> {
    let mut parts: Vec<MultiPolygon<f64>> = polygons
        .into_iter()
        .filter(|p| p.unsigned_area() > 0.0)
        .map(|p| MultiPolygon::new(vec![p]))
        .collect();

    while parts.len() > 1 {
        let mut next = Vec::with_capacity(parts.len() / 2 + 1);
        let mut iter = parts.into_iter();
        while let Some(a) = iter.next() {
            match iter.next() {
                Some(b) => next.push(a.union(&b)),
                None => next.push(a),
            }
        }
        parts = next;
    }

    parts.pop().unwrap_or_else(|| MultiPolygon::new(vec![]))
}

/// Union the parts of several multipolygons.
pub fn union_multi(parts: impl IntoIterator<Item = MultiPolygon<f64>>) -> MultiPolygon<f64> {
    union_all(parts.into_iter().flat_map(|mp| mp.0).collect())
}

/// Polygons contained in a geometry, with multipolygons expanded and
/// non-areal parts dropped.
pub fn explode_polygons(geom: &Geometry<f64>) -> Vec<Polygon<f64>> {
    match geom {
        Geometry::Polygon(p) => vec![p.clone()],
        Geometry::MultiPolygon(mp) => mp.0.clone(),
        Geometry::Rect(r) => vec![r.to_polygon()],
        Geometry::Triangle(t) => vec![t.to_polygon()],
        Geometry::GeometryCollection(gc) => gc.0.iter().flat_map(explode_polygons).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{point, polygon};

    fn square(x: f64, y: f64, size: f64) -> Polygon<f64> {
        polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
        ]
    }

    #[test]
    fn test_overlapping_squares_merge() {
        let merged = union_all(vec![square(0.0, 0.0, 2.0), square(1.0, 1.0, 2.0)]);
        assert_eq!(merged.0.len(), 1);
        assert!((merged.unsigned_area() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_squares_stay_apart() {
        let squares: Vec<_> = (0..5).map(|i| square(i as f64 * 3.0, 0.0, 1.0)).collect();
        let merged = union_all(squares);
        assert_eq!(merged.0.len(), 5);
        assert!((merged.unsigned_area() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_and_degenerate_inputs() {
        assert!(union_all(vec![]).0.is_empty());
        let flat = polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 2.0, y: 0.0)];
        assert!(union_all(vec![flat]).0.is_empty());
    }

    #[test]
    fn test_explode_drops_non_areal() {
        let gc = Geometry::GeometryCollection(geo::GeometryCollection::new_from(vec![
            Geometry::Polygon(square(0.0, 0.0, 1.0)),
            Geometry::Point(point!(x: 5.0, y: 5.0)),
            Geometry::MultiPolygon(MultiPolygon::new(vec![
                square(2.0, 0.0, 1.0),
                square(4.0, 0.0, 1.0),
            ])),
        ]));
        assert_eq!(explode_polygons(&gc).len(), 3);
    }
}
