//! shapetree - Fast Level Sets Transform
//!
//! Decomposes a grayscale image into its *tree of shapes*: the connected
//! components of upper and lower level sets, holes filled, ordered by
//! inclusion. The tree carries a pixel arena (each shape's pixels form a
//! contiguous slice covering its whole subtree) and a pixel-to-smallest-
//! shape index, making it a substrate for image simplification,
//! morphological filtering and shape-based descriptors.
//!
//! # Example
//!
//! ```
//! use shapetree::{Algorithm, ExtractOptions, extract};
//!
//! // 8x6 background with a 3x2 bright rectangle.
//! let (w, h) = (8, 6);
//! let mut gray = vec![40u8; (w * h) as usize];
//! for y in 2..4 {
//!     for x in 3..6 {
//!         gray[(y * w + x) as usize] = 200;
//!     }
//! }
//!
//! let tree = extract(&gray, w, h, &ExtractOptions::new()).unwrap();
//! assert_eq!(tree.len(), 2);
//!
//! // The rectangle is the smallest shape at its pixels.
//! let inner = tree.smallest_at(4, 2).unwrap();
//! assert_eq!(tree.shape(inner).area, 6);
//! assert_eq!(tree.shape(inner).gray, 200);
//!
//! // The tree reconstructs the image exactly.
//! assert_eq!(tree.build_image(), gray);
//!
//! // Both top-down variants agree.
//! let opts = ExtractOptions::new().with_algorithm(Algorithm::TdPost);
//! let tree2 = extract(&gray, w, h, &opts).unwrap();
//! assert_eq!(tree2.len(), tree.len());
//! ```

pub use shapetree_core::*;
pub use shapetree_flst::{
    Algorithm, Direction, Edgel, ExtractError, ExtractOptions, ExtractResult, extract,
    extract_classical,
};
