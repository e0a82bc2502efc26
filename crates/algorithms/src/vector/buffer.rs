//! Buffer operations
//!
//! Outward buffers (dilation) of projected geometries. Points become
//! discretised disks; a line becomes the union of one rectangle per segment
//! and one disk per vertex, which gives round joins and caps; a polygon is
//! unioned with the buffer of its rings. Distances are in CRS units and only
//! outward buffers are supported: zero or negative distances leave areal
//! geometries unchanged and turn points and lines into empty results.

use geo::{Coord, Geometry, LineString, MultiPolygon, Point, Polygon};
use std::f64::consts::PI;

use super::union::union_all;

/// Parameters for buffer operations
#[derive(Debug, Clone)]
pub struct BufferParams {
    /// Buffer distance
    pub distance: f64,
    /// Number of segments used to approximate a full circle (default: 64)
    pub segments: usize,
}

impl Default for BufferParams {
    fn default() -> Self {
        Self {
            distance: 1.0,
            segments: 64,
        }
    }
}

impl BufferParams {
    pub fn new(distance: f64) -> Self {
        Self {
            distance,
            ..Self::default()
        }
    }
}

/// Create a polygon approximating a circle.
///
/// Vertices lie on the circle, so the area is slightly below π·r²
/// (about 0.16 % with 64 segments).
pub fn circle(center: Coord<f64>, radius: f64, segments: usize) -> Polygon<f64> {
    let n = segments.max(4);
    let r = radius.abs();

    let mut coords = Vec::with_capacity(n + 1);
    for i in 0..n {
        let angle = 2.0 * PI * i as f64 / n as f64;
        coords.push((center.x + r * angle.cos(), center.y + r * angle.sin()));
    }
    // Close the ring
    coords.push(coords[0]);

    Polygon::new(LineString::from(coords), vec![])
}

/// Circular buffer around a point.
pub fn buffer_point(point: &Point<f64>, params: &BufferParams) -> MultiPolygon<f64> {
    if params.distance <= 0.0 {
        return MultiPolygon::new(vec![]);
    }
    MultiPolygon::new(vec![circle(point.0, params.distance, params.segments)])
}

/// Rectangles and joint disks whose union is the buffer of `line`.
fn line_pieces(line: &LineString<f64>, params: &BufferParams, out: &mut Vec<Polygon<f64>>) {
    let d = params.distance;
    for window in line.0.windows(2) {
        let (a, b) = (window[0], window[1]);
        let (dx, dy) = (b.x - a.x, b.y - a.y);
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            continue;
        }
        // Unit normal scaled to the buffer distance
        let (nx, ny) = (-dy / len * d, dx / len * d);
        out.push(Polygon::new(
            LineString::from(vec![
                (a.x + nx, a.y + ny),
                (a.x - nx, a.y - ny),
                (b.x - nx, b.y - ny),
                (b.x + nx, b.y + ny),
                (a.x + nx, a.y + ny),
            ]),
            vec![],
        ));
    }
    let mut last: Option<Coord<f64>> = None;
    for &c in &line.0 {
        if last != Some(c) {
            out.push(circle(c, d, params.segments));
        }
        last = Some(c);
    }
}

/// Buffer a set of lines into one dilated ribbon.
pub fn buffer_lines<'a>(
    lines: impl IntoIterator<Item = &'a LineString<f64>>,
    params: &BufferParams,
) -> MultiPolygon<f64> {
    if params.distance <= 0.0 {
        return MultiPolygon::new(vec![]);
    }
    let mut pieces = Vec::new();
    for line in lines {
        line_pieces(line, params, &mut pieces);
    }
    union_all(pieces)
}

/// Buffer polygons outward, filling holes narrower than twice the distance.
pub fn buffer_polygons<'a>(
    polygons: impl IntoIterator<Item = &'a Polygon<f64>>,
    params: &BufferParams,
) -> MultiPolygon<f64> {
    let mut pieces = Vec::new();
    for polygon in polygons {
        pieces.push(polygon.clone());
        if params.distance > 0.0 {
            line_pieces(polygon.exterior(), params, &mut pieces);
            for interior in polygon.interiors() {
                line_pieces(interior, params, &mut pieces);
            }
        }
    }
    union_all(pieces)
}

/// Buffer any geometry. The result is always polygonal.
pub fn buffer_geometry(geom: &Geometry<f64>, params: &BufferParams) -> MultiPolygon<f64> {
    match geom {
        Geometry::Point(p) => buffer_point(p, params),
        Geometry::MultiPoint(mp) => {
            if params.distance <= 0.0 {
                return MultiPolygon::new(vec![]);
            }
            union_all(
                mp.0.iter()
                    .map(|p| circle(p.0, params.distance, params.segments))
                    .collect(),
            )
        }
        Geometry::Line(l) => buffer_lines([&LineString::from(vec![l.start, l.end])], params),
        Geometry::LineString(ls) => buffer_lines([ls], params),
        Geometry::MultiLineString(mls) => buffer_lines(&mls.0, params),
        Geometry::Polygon(p) => buffer_polygons([p], params),
        Geometry::MultiPolygon(mp) => buffer_polygons(&mp.0, params),
        Geometry::Rect(r) => buffer_polygons([&r.to_polygon()], params),
        Geometry::Triangle(t) => buffer_polygons([&t.to_polygon()], params),
        Geometry::GeometryCollection(gc) => {
            let pieces = gc
                .0
                .iter()
                .flat_map(|g| buffer_geometry(g, params).0)
                .collect();
            union_all(pieces)
        }
    }
}
