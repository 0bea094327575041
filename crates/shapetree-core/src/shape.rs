//! Shape nodes of the tree
//!
//! A shape is a connected component of an upper or lower level set with its
//! holes filled. Lower (Inf) shapes are 4-connected and upper (Sup) shapes
//! are 8-connected, so that complementary regions always use the opposite
//! connectivity and any two shapes are either disjoint or nested.

use crate::point::Point;

/// Neighbor relation used by a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    /// 4-way connectivity (up, down, left, right)
    #[default]
    Four,
    /// 8-way connectivity (includes diagonals)
    Eight,
}

/// Orientation of the level set a shape comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelSetType {
    /// Lower level set `{p : gray(p) < level}` - dark shapes, 4-connected
    Inf,
    /// Upper level set `{p : gray(p) > level}` - bright shapes, 8-connected
    Sup,
}

impl LevelSetType {
    /// Connectivity used for shapes of this type.
    #[inline]
    pub fn connectivity(self) -> Connectivity {
        match self {
            LevelSetType::Inf => Connectivity::Four,
            LevelSetType::Sup => Connectivity::Eight,
        }
    }

    /// Strict membership of value `v` in a level set at `level`.
    ///
    /// `level` is widened to `i32` so that the sentinel parent level used
    /// when seeding the root (-1) compares correctly against any byte.
    #[inline]
    pub fn is_in(self, v: i32, level: i32) -> bool {
        match self {
            LevelSetType::Inf => v < level,
            LevelSetType::Sup => v > level,
        }
    }
}

/// Dense index of a shape inside its tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Create an id from a raw index.
    #[inline]
    pub fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    /// Position of the shape in the tree's node array.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One node of the tree of shapes
///
/// The pixel list lives in the tree's shared arena: this shape's pixels are
/// `arena[pixel_start .. pixel_start + area]`, contiguous with all of its
/// descendants' pixels. Non-structural fields are filled by the extractor
/// that builds the tree.
#[derive(Debug, Clone)]
pub struct Shape {
    /// Lower or upper level set
    pub level_set: LevelSetType,
    /// Gray level of the level line bounding the shape
    pub gray: u8,
    /// View-layer flag: skip this shape during iteration and lookup
    pub ignore: bool,
    /// Whether some pixel of the shape lies on the image frame
    pub boundary: bool,
    /// Number of pixels in the shape (descendants included)
    pub area: usize,
    /// Offset of the shape's pixel slice in the tree arena
    pub pixel_start: usize,
    /// Smallest containing shape; `None` only for the root
    pub parent: Option<NodeId>,
    /// Next child of the same parent
    pub sibling: Option<NodeId>,
    /// First child
    pub child: Option<NodeId>,
    /// Level line as ordered edgel origins, when recording was requested
    pub contour: Option<Vec<Point>>,
}

impl Shape {
    pub(crate) fn with_parent(parent: NodeId) -> Self {
        Shape {
            level_set: LevelSetType::Inf,
            gray: 0,
            ignore: false,
            boundary: false,
            area: 0,
            pixel_start: 0,
            parent: Some(parent),
            sibling: None,
            child: None,
            contour: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_duality() {
        assert_eq!(LevelSetType::Inf.connectivity(), Connectivity::Four);
        assert_eq!(LevelSetType::Sup.connectivity(), Connectivity::Eight);
    }

    #[test]
    fn test_strict_membership() {
        assert!(LevelSetType::Inf.is_in(10, 20));
        assert!(!LevelSetType::Inf.is_in(20, 20));
        assert!(LevelSetType::Sup.is_in(30, 20));
        assert!(!LevelSetType::Sup.is_in(20, 20));
        // Sentinel parent level: nothing is below -1, everything is above.
        assert!(!LevelSetType::Inf.is_in(0, -1));
        assert!(LevelSetType::Sup.is_in(0, -1));
    }
}
