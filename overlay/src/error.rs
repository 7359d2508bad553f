//! Render sink errors

use std::path::PathBuf;

use thiserror::Error;

/// Failures setting up or writing out the software surface
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to read atlas {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode atlas: {0}")]
    Decode(#[from] png::DecodingError),

    #[error("unsupported atlas pixel format {0:?}")]
    Format(png::ColorType),

    #[error("cannot allocate a {width}x{height} surface")]
    Allocation { width: u32, height: u32 },

    #[error("failed to encode frame: {0}")]
    Encode(#[from] png::EncodingError),
}
