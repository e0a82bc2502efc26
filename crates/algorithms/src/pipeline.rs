//! Layer pipeline
//!
//! Query in, `LayerMap` out: resolve the anchor, fetch each declared layer
//! into one projected CRS, then place the map with the transform and hand
//! it to the caller's postprocessing.

use tracing::{debug, info};
use vistamap_core::{classify, Anchor, FeatureSource, LayerMap, LayerSet, Query, QueryKind, Result};

use crate::layers::fetch_layer;
use crate::transform::{apply_transform, TransformParams};

/// Caller hook run on the finished map.
pub type Postprocess<'a> = &'a dyn Fn(LayerMap) -> LayerMap;

/// Options for one pipeline run.
#[derive(Clone, Copy, Default)]
pub struct PipelineOptions<'a> {
    /// Build a point anchor with this radius (metres) instead of a perimeter.
    pub radius: Option<f64>,
    /// Reuse a previously built map instead of fetching.
    pub backup: Option<&'a LayerMap>,
    pub transform: TransformParams,
    pub postprocessing: Option<Postprocess<'a>>,
}

impl<'a> PipelineOptions<'a> {
    pub fn with_radius(radius: f64) -> Self {
        Self {
            radius: Some(radius),
            ..Self::default()
        }
    }

    pub fn with_backup(backup: &'a LayerMap) -> Self {
        Self {
            backup: Some(backup),
            ..Self::default()
        }
    }
}

impl std::fmt::Debug for PipelineOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("radius", &self.radius)
            .field("backup", &self.backup.map(|b| b.len()))
            .field("transform", &self.transform)
            .field("postprocessing", &self.postprocessing.is_some())
            .finish()
    }
}

/// Turn a query into the anchor every layer is fetched against.
///
/// With a radius the query names a point (geocoded unless it already is
/// one); without, it names a perimeter (given directly, or geocoded by
/// address or OSM id).
pub fn resolve_anchor<S: FeatureSource + ?Sized>(
    source: &S,
    query: &Query,
    radius: Option<f64>,
) -> Result<Anchor> {
    let kind = classify(query);
    debug!("query classified as {}", kind);

    let (perimeter, point) = match (query, radius) {
        (Query::Polygon(perimeter), _) => (Some(perimeter.clone()), None),
        (Query::Coordinates(point), _) => (None, Some(*point)),
        (Query::Text(text), Some(_)) => (None, Some(source.geocode_point(text)?)),
        (Query::Text(text), None) => {
            let perimeter = source.geocode_boundary(text, kind == QueryKind::OsmId)?;
            (Some(perimeter), None)
        }
    };
    Anchor::from_parts(perimeter, point, radius)
}

fn finish(map: LayerMap, options: &PipelineOptions<'_>) -> LayerMap {
    let map = apply_transform(&map, &options.transform);
    match options.postprocessing {
        Some(postprocess) => postprocess(map),
        None => map,
    }
}

/// Build the layers of `layers` around `query`.
///
/// `perimeter` is fetched first even when `layers` omits it. Every layer is
/// validated before the first request; the first failing fetch aborts the
/// run.
pub fn build_layers<S: FeatureSource + ?Sized>(
    source: &S,
    query: &Query,
    layers: &LayerSet,
    options: &PipelineOptions<'_>,
) -> Result<LayerMap> {
    if let Some(backup) = options.backup {
        info!("reusing {} backed-up layer(s)", backup.len());
        return Ok(finish(backup.clone(), options));
    }

    let specs = layers.with_perimeter();
    for spec in &specs {
        spec.validate()?;
    }

    let anchor = resolve_anchor(source, query, options.radius)?;
    let projection = anchor.projection()?;
    info!(
        "fetching {} layer(s) in {}",
        specs.len(),
        projection.crs()
    );

    let mut fetched = Vec::with_capacity(specs.len());
    for spec in &specs {
        debug!("fetching layer '{}'", spec.name);
        let geometry = fetch_layer(source, &anchor, projection, spec)?;
        fetched.push((spec.name.clone(), geometry));
    }
    let map = LayerMap::from_layers(fetched, projection.crs())?;
    info!("built {} layer(s)", map.len());

    Ok(finish(map, options))
}
