//! Top-down extraction entry points
//!
//! Both top-down variants start from the image-frame edgel `((0,0), SOUTH)`
//! with a parent level of -1, so the root is rebuilt as the upper level set
//! of the whole image: its recorded gray becomes the minimum over the
//! frame, which is what lets [`ShapeTree::build_image`] reproduce the
//! input exactly.
//!
//! The variants differ only in enumeration order - and therefore in the
//! arena layout they produce (pre-order: a shape's private pixels precede
//! its descendants'; post-order: they follow them). The trees are
//! identical up to sibling order.

use log::debug;
use shapetree_core::{Raster, ShapeTree};

use crate::error::ExtractResult;
use crate::postorder;
use crate::preorder;

/// Top-down extraction variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Recurse into a child only after the parent's private area is
    /// complete
    #[default]
    TdPre,
    /// Build each child's subtree immediately upon detection
    TdPost,
}

/// Options for top-down extraction
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Which enumeration order to use
    pub algorithm: Algorithm,
    /// Record each shape's level line as ordered edgel origins
    pub record_contours: bool,
}

impl ExtractOptions {
    /// Create options with default values (pre-order, no contours).
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the extraction variant.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Request level-line recording.
    pub fn with_contours(mut self, record: bool) -> Self {
        self.record_contours = record;
        self
    }
}

/// Decompose a grayscale raster into its tree of shapes.
///
/// # Arguments
///
/// * `gray` - row-major byte raster of size `width * height`
/// * `width`, `height` - image dimensions, positive
/// * `options` - variant selection and contour recording
///
/// # Errors
///
/// Returns an error if the dimensions are invalid or the buffer length
/// does not match them.
pub fn extract(
    gray: &[u8],
    width: i32,
    height: i32,
    options: &ExtractOptions,
) -> ExtractResult<ShapeTree> {
    let im = Raster::new(gray, width, height)?;
    let tree = ShapeTree::new(width, height)?;
    let mut tree = match options.algorithm {
        Algorithm::TdPre => preorder::run(&im, tree, options.record_contours),
        Algorithm::TdPost => postorder::run(&im, tree, options.record_contours),
    };
    tree.fill_boundary();
    debug!(
        "top-down {:?}: {} shapes from {}x{} image",
        options.algorithm,
        tree.len(),
        width,
        height
    );
    Ok(tree)
}
