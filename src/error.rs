//! Error types shared across the crate.
//!
//! Engine-side failures (`InvalidConfiguration`, `DimensionMismatch`) are
//! caller-input problems surfaced before any iteration runs. Stopping by
//! convergence or step limit is a normal terminal state, not an error.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// A routing parameter is outside its documented domain.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The luminance field does not match the coordinate space the nail
    /// layout was generated for.
    #[error("field is {field_w}x{field_h} but the layout space is {space_w}x{space_h}")]
    DimensionMismatch {
        field_w: usize,
        field_h: usize,
        space_w: usize,
        space_h: usize,
    },

    /// Decoding or encoding a raster image failed.
    #[error("image error for {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Reading or writing an artifact failed.
    #[error("i/o error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serializing a report failed.
    #[error("json serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl RouteError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
