//! Whole-map affine transform
//!
//! All layers are treated as one composite, so they move, stretch and turn
//! together and stay aligned.

use geo::{AffineOps, AffineTransform, BoundingRect, Centroid, GeometryCollection, Rect};
use tracing::debug;
use vistamap_core::LayerMap;

/// Placement of the map on a canvas. Absent fields are identities.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransformParams {
    /// Target x of the composite centroid.
    pub x: Option<f64>,
    /// Target y of the composite centroid.
    pub y: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    /// Degrees, counter-clockwise.
    pub rotation: Option<f64>,
}

impl TransformParams {
    pub fn is_identity(&self) -> bool {
        self.x.is_none()
            && self.y.is_none()
            && self.scale_x.is_none()
            && self.scale_y.is_none()
            && self.rotation.is_none()
    }
}

fn transform_rect(rect: Rect<f64>, t: &AffineTransform<f64>) -> Rect<f64> {
    Rect::new(t.apply(rect.min()), t.apply(rect.max()))
}

/// The affine steps `params` expand to for `map`, in application order.
///
/// Translation moves the centroid; scaling and rotation are about the
/// bounding-box centre as it stands after the previous step.
fn steps(map: &LayerMap, params: &TransformParams) -> Vec<AffineTransform<f64>> {
    let composite = GeometryCollection::new_from(map.iter().map(|(_, g)| g.clone()).collect());
    let Some(mut bounds) = composite.bounding_rect() else {
        return Vec::new();
    };
    let mut steps = Vec::new();
    let mut push = |step: AffineTransform<f64>, bounds: &mut Rect<f64>| {
        *bounds = transform_rect(*bounds, &step);
        steps.push(step);
    };

    if params.x.is_some() || params.y.is_some() {
        if let Some(centroid) = composite.centroid() {
            let dx = params.x.map_or(0.0, |x| x - centroid.x());
            let dy = params.y.map_or(0.0, |y| y - centroid.y());
            push(AffineTransform::translate(dx, dy), &mut bounds);
        }
    }
    if let Some(sx) = params.scale_x {
        push(AffineTransform::scale(sx, 1.0, bounds.center()), &mut bounds);
    }
    if let Some(sy) = params.scale_y {
        push(AffineTransform::scale(1.0, sy, bounds.center()), &mut bounds);
    }
    if let Some(degrees) = params.rotation {
        push(AffineTransform::rotate(degrees, bounds.center()), &mut bounds);
    }
    steps
}

/// Apply `params` to every layer of `map` as one composite.
pub fn apply_transform(map: &LayerMap, params: &TransformParams) -> LayerMap {
    if params.is_identity() {
        return map.clone();
    }
    let steps = steps(map, params);
    debug!("transform: {:?} ({} step(s))", params, steps.len());
    steps.iter().fold(map.clone(), |acc, step| {
        acc.map_geometries(|g| g.affine_transform(step))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use geo::{polygon, Geometry};
    use vistamap_core::CRS;

    fn unit_square() -> LayerMap {
        LayerMap::new(
            polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0), (x: 0.0, y: 1.0)],
            CRS::utm(18, true),
        )
    }

    fn bounds(map: &LayerMap) -> Rect<f64> {
        map.perimeter().bounding_rect().unwrap()
    }

    #[test]
    fn test_identity() {
        let map = unit_square();
        assert_eq!(apply_transform(&map, &TransformParams::default()), map);
    }

    #[test]
    fn test_scale_then_rotate() {
        let params = TransformParams {
            scale_x: Some(2.0),
            rotation: Some(90.0),
            ..TransformParams::default()
        };
        let b = bounds(&apply_transform(&unit_square(), &params));
        assert_abs_diff_eq!(b.min().x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b.max().x, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b.min().y, -0.5, epsilon = 1e-9);
        assert_abs_diff_eq!(b.max().y, 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_translate_moves_centroid() {
        let params = TransformParams {
            x: Some(10.0),
            y: Some(-4.0),
            ..TransformParams::default()
        };
        let moved = apply_transform(&unit_square(), &params);
        let c = moved.perimeter().centroid().unwrap();
        assert_abs_diff_eq!(c.x(), 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.y(), -4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_translate_single_axis() {
        let params = TransformParams {
            x: Some(3.5),
            ..TransformParams::default()
        };
        let b = bounds(&apply_transform(&unit_square(), &params));
        assert_abs_diff_eq!(b.min().x, 3.0, epsilon = 1e-9);
        assert_abs_diff_eq!(b.min().y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_layers_move_together() {
        let mut map = unit_square();
        map.insert(
            "building",
            Geometry::Polygon(polygon![(x: 3.0, y: 0.0), (x: 4.0, y: 0.0), (x: 4.0, y: 1.0), (x: 3.0, y: 1.0)]),
        );
        let params = TransformParams {
            scale_x: Some(0.5),
            ..TransformParams::default()
        };
        let scaled = apply_transform(&map, &params);
        // Composite spans x in [0, 4]; halving about x = 2 gives [1, 3]
        assert_abs_diff_eq!(bounds(&scaled).min().x, 1.0, epsilon = 1e-9);
        let building = scaled.get("building").unwrap().bounding_rect().unwrap();
        assert_abs_diff_eq!(building.max().x, 3.0, epsilon = 1e-9);
        assert_eq!(scaled.names().collect::<Vec<_>>(), ["perimeter", "building"]);
    }
}
