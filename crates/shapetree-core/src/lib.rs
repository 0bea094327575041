//! shapetree-core - Data model for the tree of shapes
//!
//! This crate provides the types shared by the level-set extractors:
//!
//! - **Raster view** - a borrowed, read-only grayscale image
//! - **Shape nodes** - connected components of level sets with holes filled
//! - **Shape tree** - the inclusion-ordered tree, its pixel arena and the
//!   pixel-to-smallest-shape index
//! - **Iterators** - pre/post-order walks that honor the per-shape ignore
//!   flag
//!
//! The extractors themselves live in `shapetree-flst`.
//!
//! # Examples
//!
//! ```
//! use shapetree_core::{Order, ShapeTree};
//!
//! let mut tree = ShapeTree::new(8, 8).unwrap();
//! let child = tree.add_child(ShapeTree::ROOT);
//! assert_eq!(tree.iter(Order::Pre).count(), 2);
//!
//! // Ignored shapes disappear from walks without changing the tree.
//! tree.shape_mut(child).ignore = true;
//! assert_eq!(tree.iter(Order::Pre).count(), 1);
//! ```

pub mod error;
pub mod iter;
pub mod point;
pub mod raster;
pub mod shape;
pub mod tree;

pub use error::{Error, Result};
pub use iter::{Order, TreeIter};
pub use point::Point;
pub use raster::Raster;
pub use shape::{Connectivity, LevelSetType, NodeId, Shape};
pub use tree::ShapeTree;
