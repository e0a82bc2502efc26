//! Layer fetchers
//!
//! Every layer is fetched against the same anchor and projected into the
//! same UTM zone. The options variant picks the fetcher:
//! - `perimeter`: the anchor's own outline
//! - area layers: tagged features reduced to polygons
//! - network layers: ways widened into ribbons

mod area;
mod network;
mod perimeter;

pub use area::fetch_geometry_layer;
pub use network::{dilate_edges, fetch_network_layer, network_key, ProjectedEdge, RIBBON_SEGMENTS};
pub use perimeter::{clip_perimeter, fetch_perimeter_layer};

use geo::Geometry;
use vistamap_core::{Anchor, FeatureSource, LayerOptions, LayerSpec, Result, UtmProjection};

/// Fetch one layer, after checking its options fit its name.
pub fn fetch_layer<S: FeatureSource + ?Sized>(
    source: &S,
    anchor: &Anchor,
    projection: UtmProjection,
    spec: &LayerSpec,
) -> Result<Geometry<f64>> {
    spec.validate()?;
    match &spec.options {
        LayerOptions::Perimeter(options) => fetch_perimeter_layer(source, anchor, projection, options),
        LayerOptions::Area(options) => {
            fetch_geometry_layer(source, anchor, projection, &spec.name, options)
        }
        LayerOptions::Network(options) => {
            fetch_network_layer(source, anchor, projection, &spec.name, options)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vistamap_core::options::NetworkOptions;
    use vistamap_core::{Error, LatLon, MemorySource};

    #[test]
    fn test_mismatched_options_fail_fast() {
        let source = MemorySource::new();
        let anchor = Anchor::around(LatLon::new(40.7128, -74.0060), 100.0).unwrap();
        let spec = LayerSpec::network("building", NetworkOptions::default());
        let err = fetch_layer(&source, &anchor, anchor.projection().unwrap(), &spec).unwrap_err();
        assert!(matches!(err, Error::UnsupportedLayer { ref name, .. } if name == "building"));
        assert_eq!(source.requests(), 0);
    }
}
