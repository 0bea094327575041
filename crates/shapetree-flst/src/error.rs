//! Error types for shapetree-flst

use thiserror::Error;

/// Errors that can occur while extracting a tree of shapes
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Core data-model error (bad dimensions or buffer size)
    #[error("core error: {0}")]
    Core(#[from] shapetree_core::Error),

    /// Area filter excludes every possible shape
    #[error("min area {min_area} exceeds the image area {image_area}")]
    MinAreaTooLarge { min_area: u32, image_area: usize },
}

/// Result type for extraction operations
pub type ExtractResult<T> = Result<T, ExtractError>;
