//! Error types for vistamap

use thiserror::Error;

/// Main error type for vistamap operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("either a perimeter or a point and radius must be provided")]
    MissingAnchor,

    #[error("a perimeter and a point/radius were both provided; only one anchor is allowed")]
    AmbiguousAnchor,

    #[error("unsupported layer '{name}': {reason}")]
    UnsupportedLayer { name: String, reason: String },

    #[error("invalid options for layer '{layer}': {reason}")]
    InvalidLayerOptions { layer: String, reason: String },

    #[error("layer map has no 'perimeter' layer")]
    MissingPerimeter,

    #[error("CRS mismatch: {0} vs {1}")]
    CrsMismatch(String, String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Failure reported by a feature source, forwarded as-is.
    #[error(transparent)]
    Source(Box<dyn std::error::Error + Send + Sync>),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Wrap a feature-source failure without altering it.
    pub fn from_source<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::Source(Box::new(err))
    }

    pub(crate) fn invalid_parameter(name: &'static str, value: f64, reason: &str) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for vistamap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Check that a linear distance (radius, width, dilation) is finite and non-negative.
pub fn ensure_distance(name: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(Error::invalid_parameter(name, value, "must be finite"));
    }
    if value < 0.0 {
        return Err(Error::invalid_parameter(name, value, "must not be negative"));
    }
    Ok(value)
}
