//! shapetree-flst - Fast Level Sets Transform extractors
//!
//! Decomposes a grayscale raster into its tree of shapes (connected
//! components of upper/lower level sets with holes filled). Three
//! extractors produce the same tree:
//!
//! - **Top-down pre-order** - recursive descent from the image frame,
//!   each shape's private area completed before its children
//! - **Top-down post-order** - same locator, children built immediately
//!   upon detection
//! - **Classical bottom-up** - region growing from local extrema, with
//!   optional area filtering
//!
//! # Examples
//!
//! ```
//! use shapetree_flst::{ExtractOptions, extract};
//!
//! // A dark image with one bright pixel has two shapes.
//! let mut gray = vec![10u8; 25];
//! gray[12] = 200;
//! let tree = extract(&gray, 5, 5, &ExtractOptions::new()).unwrap();
//! assert_eq!(tree.len(), 2);
//! assert_eq!(tree.build_image(), gray);
//! ```

pub mod classical;
pub mod edgel;
pub mod error;
mod postorder;
mod preorder;
pub mod topdown;

pub use classical::extract_classical;
pub use edgel::{Direction, Edgel};
pub use error::{ExtractError, ExtractResult};
pub use topdown::{Algorithm, ExtractOptions, extract};
