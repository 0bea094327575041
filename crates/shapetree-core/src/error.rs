//! Error types for shapetree-core

use thiserror::Error;

/// Errors raised when constructing views or trees over a raster
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid image dimensions
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    /// Raster buffer does not match the declared dimensions
    #[error("raster size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, Error>;
