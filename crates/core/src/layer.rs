//! The ordered layer map a pipeline run produces

use geo::{BoundingRect, Geometry, Rect};
use indexmap::IndexMap;

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::options::PERIMETER;

/// Ordered mapping from layer name to projected geometry.
///
/// A `LayerMap` always holds a `perimeter` layer: it can only be created
/// around one and the perimeter cannot be removed. Iteration follows
/// declaration order, which renderers use as draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerMap {
    layers: IndexMap<String, Geometry<f64>>,
    crs: CRS,
}

impl LayerMap {
    /// Create a map holding only the perimeter.
    pub fn new(perimeter: impl Into<Geometry<f64>>, crs: CRS) -> Self {
        let mut layers = IndexMap::new();
        layers.insert(PERIMETER.to_string(), perimeter.into());
        Self { layers, crs }
    }

    /// Build from `(name, geometry)` pairs in order. Fails without a perimeter.
    pub fn from_layers<I, K>(layers: I, crs: CRS) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Geometry<f64>)>,
        K: Into<String>,
    {
        let layers: IndexMap<String, Geometry<f64>> =
            layers.into_iter().map(|(k, g)| (k.into(), g)).collect();
        if !layers.contains_key(PERIMETER) {
            return Err(Error::MissingPerimeter);
        }
        Ok(Self { layers, crs })
    }

    /// CRS of every geometry in the map.
    pub fn crs(&self) -> CRS {
        self.crs
    }

    pub fn perimeter(&self) -> &Geometry<f64> {
        // Present by construction
        &self.layers[PERIMETER]
    }

    pub fn get(&self, name: &str) -> Option<&Geometry<f64>> {
        self.layers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layers.contains_key(name)
    }

    /// Insert or replace a layer. A replaced layer keeps its position; a new
    /// one goes last.
    pub fn insert(&mut self, name: impl Into<String>, geometry: impl Into<Geometry<f64>>) {
        self.layers.insert(name.into(), geometry.into());
    }

    /// Remove a layer, keeping the order of the others. The perimeter stays.
    pub fn remove(&mut self, name: &str) -> Result<Option<Geometry<f64>>> {
        if name == PERIMETER {
            return Err(Error::MissingPerimeter);
        }
        Ok(self.layers.shift_remove(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Geometry<f64>)> {
        self.layers.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Never true; kept for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Apply `f` to every geometry, keeping names and order.
    pub fn map_geometries(&self, mut f: impl FnMut(&Geometry<f64>) -> Geometry<f64>) -> Self {
        Self {
            layers: self
                .layers
                .iter()
                .map(|(k, g)| (k.clone(), f(g)))
                .collect(),
            crs: self.crs,
        }
    }

    /// Canvas extent: the perimeter's bounds grown by the largest layer
    /// dilation. Bounds of `perimeter.buffer(d)` equal the perimeter bounds
    /// grown by `d`, so no buffering is needed.
    pub fn plot_extent(&self, max_dilation: f64) -> Option<Rect<f64>> {
        self.perimeter().bounding_rect().map(|r| {
            let d = max_dilation.max(0.0);
            Rect::new(
                (r.min().x - d, r.min().y - d),
                (r.max().x + d, r.max().y + d),
            )
        })
    }
}

impl<'a> IntoIterator for &'a LayerMap {
    type Item = (&'a String, &'a Geometry<f64>);
    type IntoIter = indexmap::map::Iter<'a, String, Geometry<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}
