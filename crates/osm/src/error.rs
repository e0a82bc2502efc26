//! Error types for OpenStreetMap retrieval.

use thiserror::Error;

/// Errors produced while talking to Nominatim or Overpass.
#[derive(Error, Debug)]
pub enum OsmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to parse {what}: {reason}")]
    Parse { what: &'static str, reason: String },

    #[error("nothing found for '{0}'")]
    NotFound(String),

    #[error("invalid geometry: {0}")]
    Geometry(String),

    #[error("core error: {0}")]
    Core(#[from] vistamap_core::Error),
}

impl OsmError {
    pub(crate) fn parse(what: &'static str, err: impl std::fmt::Display) -> Self {
        OsmError::Parse {
            what,
            reason: err.to_string(),
        }
    }
}

/// Source failures cross into the pipeline boxed, so callers can still
/// downcast to [`OsmError`]. Core errors are unwrapped.
impl From<OsmError> for vistamap_core::Error {
    fn from(err: OsmError) -> Self {
        match err {
            OsmError::Core(inner) => inner,
            other => vistamap_core::Error::from_source(other),
        }
    }
}

/// Result alias for OSM operations.
pub type Result<T> = std::result::Result<T, OsmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_core_error_keeps_message() {
        let err: vistamap_core::Error = OsmError::NotFound("Atlantis".into()).into();
        assert_eq!(err.to_string(), "nothing found for 'Atlantis'");
        match err {
            vistamap_core::Error::Source(inner) => {
                assert!(inner.downcast_ref::<OsmError>().is_some());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_core_error_unwrapped() {
        let err: vistamap_core::Error = OsmError::Core(vistamap_core::Error::MissingAnchor).into();
        assert!(matches!(err, vistamap_core::Error::MissingAnchor));
    }
}
