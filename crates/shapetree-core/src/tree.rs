//! Tree of shapes
//!
//! The tree owns three parallel stores:
//!
//! - a node array with the root at index 0 (capacity reserved for the
//!   `width * height` worst case, one shape per pixel);
//! - a single pixel arena of `width * height` points, tree-linearized so
//!   that every shape's pixels - descendants included - form one
//!   contiguous slice;
//! - the pixel index, mapping each pixel to the smallest shape that
//!   contains it.
//!
//! Shapes are never inserted or removed after extraction; the only
//! post-construction mutation is flipping the per-shape `ignore` flag,
//! which iteration and lookup honor by tunneling to the nearest
//! non-ignored relative.

use crate::error::{Error, Result};
use crate::iter::{Order, TreeIter};
use crate::point::Point;
use crate::shape::{LevelSetType, NodeId, Shape};

/// The tree of shapes of a grayscale image
#[derive(Debug, Clone)]
pub struct ShapeTree {
    width: i32,
    height: i32,
    shapes: Vec<Shape>,
    arena: Vec<Point>,
    smallest: Vec<NodeId>,
}

impl ShapeTree {
    /// Id of the root shape.
    pub const ROOT: NodeId = NodeId(0);

    /// Create a tree holding only the root shape.
    ///
    /// The root starts as the whole image: lower type, gray 255, area
    /// `width * height`, on the image boundary. Extractors refine it and
    /// append the remaining shapes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if a dimension is not positive
    /// or exceeds `i16::MAX`.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 || width > i16::MAX as i32 || height > i16::MAX as i32 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let area = (width as usize) * (height as usize);
        let root = Shape {
            level_set: LevelSetType::Inf,
            gray: 255,
            ignore: false,
            boundary: true,
            area,
            pixel_start: 0,
            parent: None,
            sibling: None,
            child: None,
            contour: None,
        };
        let mut shapes = Vec::with_capacity(area);
        shapes.push(root);
        Ok(ShapeTree {
            width,
            height,
            shapes,
            arena: vec![Point::default(); area],
            smallest: vec![Self::ROOT; area],
        })
    }

    /// Image width in pixels.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Image height in pixels.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of shapes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    /// A tree always holds at least the root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// All shapes, root first, in allocation order.
    #[inline]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Shape by id.
    #[inline]
    pub fn shape(&self, id: NodeId) -> &Shape {
        &self.shapes[id.index()]
    }

    /// Mutable shape by id.
    #[inline]
    pub fn shape_mut(&mut self, id: NodeId) -> &mut Shape {
        &mut self.shapes[id.index()]
    }

    /// The pixel arena, tree-linearized.
    #[inline]
    pub fn arena(&self) -> &[Point] {
        &self.arena
    }

    /// Mutable access to the pixel arena, for extractors.
    #[inline]
    pub fn arena_mut(&mut self) -> &mut [Point] {
        &mut self.arena
    }

    /// Pixels of a shape, descendants included.
    #[inline]
    pub fn pixels_of(&self, id: NodeId) -> &[Point] {
        let s = self.shape(id);
        &self.arena[s.pixel_start..s.pixel_start + s.area]
    }

    /// The raw pixel index: smallest shape per pixel, ignore flags not
    /// applied.
    #[inline]
    pub fn smallest_index(&self) -> &[NodeId] {
        &self.smallest
    }

    /// Mutable access to the pixel index, for extractors.
    #[inline]
    pub fn smallest_index_mut(&mut self) -> &mut [NodeId] {
        &mut self.smallest
    }

    /// Append a new shape as the first child of `parent`.
    ///
    /// The previous first child becomes the new shape's sibling.
    /// Non-structural fields are defaulted; the caller fills them.
    pub fn add_child(&mut self, parent: NodeId) -> NodeId {
        debug_assert!(self.shapes.len() < self.arena.len());
        let id = NodeId::new(self.shapes.len());
        let mut shape = Shape::with_parent(parent);
        shape.sibling = self.shapes[parent.index()].child;
        self.shapes.push(shape);
        self.shapes[parent.index()].child = Some(id);
        id
    }

    /// Smallest non-ignored shape containing pixel `(x, y)`.
    ///
    /// Returns `None` only if every shape containing the pixel, the root
    /// included, is ignored.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the image.
    pub fn smallest_at(&self, x: i32, y: i32) -> Option<NodeId> {
        assert!(x >= 0 && x < self.width && y >= 0 && y < self.height);
        let id = self.smallest[(y as usize) * (self.width as usize) + x as usize];
        if self.shape(id).ignore {
            self.find_parent(id)
        } else {
            Some(id)
        }
    }

    /// Nearest non-ignored ancestor.
    pub fn find_parent(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = self.shape(id).parent;
        while let Some(p) = cur {
            if !self.shape(p).ignore {
                return Some(p);
            }
            cur = self.shape(p).parent;
        }
        None
    }

    /// First non-ignored shape in the subtree rooted at `id`, the root of
    /// the subtree included.
    fn shape_of_subtree(&self, id: NodeId) -> Option<NodeId> {
        if !self.shape(id).ignore {
            return Some(id);
        }
        let mut c = self.shape(id).child;
        while let Some(cid) = c {
            if let Some(found) = self.shape_of_subtree(cid) {
                return Some(found);
            }
            c = self.shape(cid).sibling;
        }
        None
    }

    /// First non-ignored child, descending into ignored subtrees.
    pub fn find_child(&self, id: NodeId) -> Option<NodeId> {
        let mut c = self.shape(id).child;
        while let Some(cid) = c {
            if let Some(found) = self.shape_of_subtree(cid) {
                return Some(found);
            }
            c = self.shape(cid).sibling;
        }
        None
    }

    /// Next non-ignored sibling.
    ///
    /// When the parent itself is ignored, the search continues among the
    /// parent's siblings, so children of an ignored shape surface as
    /// children of its nearest non-ignored ancestor.
    pub fn find_sibling(&self, id: NodeId) -> Option<NodeId> {
        let mut s = self.shape(id).sibling;
        while let Some(sid) = s {
            if let Some(found) = self.shape_of_subtree(sid) {
                return Some(found);
            }
            s = self.shape(sid).sibling;
        }
        match self.shape(id).parent {
            Some(p) if self.shape(p).ignore => self.find_sibling(p),
            _ => None,
        }
    }

    /// Previous non-ignored sibling. The shape itself must not be ignored.
    pub fn find_prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        debug_assert!(!self.shape(id).ignore);
        let parent = self.find_parent(id)?;
        let mut next = self.find_child(parent);
        let mut prev = None;
        while next != Some(id) {
            prev = next;
            next = self.find_sibling(next?);
        }
        prev
    }

    /// Walk the whole tree, skipping ignored subtrees.
    pub fn iter(&self, order: Order) -> TreeIter<'_> {
        self.subtree(Self::ROOT, order)
    }

    /// Walk the subtree rooted at `id`, skipping ignored subtrees.
    pub fn subtree(&self, id: NodeId, order: Order) -> TreeIter<'_> {
        TreeIter::new(self, id, order)
    }

    /// Reconstruct the image from the tree.
    ///
    /// Each pixel takes the gray of its smallest non-ignored shape, so
    /// flipping `ignore` flags yields a simplified image. On a freshly
    /// extracted tree this reproduces the input raster.
    pub fn build_image(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.smallest.len());
        for &id in &self.smallest {
            let mut s = id;
            while self.shape(s).ignore {
                match self.shape(s).parent {
                    Some(p) => s = p,
                    None => break,
                }
            }
            out.push(self.shape(s).gray);
        }
        out
    }

    /// Recompute every shape's boundary flag from the pixel index.
    ///
    /// Clears all flags, marks the smallest shape of each frame pixel,
    /// then propagates to parents in post-order. Idempotent.
    pub fn fill_boundary(&mut self) {
        let order: Vec<NodeId> = self.iter(Order::Post).collect();
        for &id in &order {
            self.shapes[id.index()].boundary = false;
        }
        let w = self.width as usize;
        let h = self.height as usize;
        for x in 0..w {
            let top = self.smallest[x];
            self.shapes[top.index()].boundary = true;
            let bottom = self.smallest[(h - 1) * w + x];
            self.shapes[bottom.index()].boundary = true;
        }
        for y in 1..h.saturating_sub(1) {
            let first = self.smallest[y * w];
            self.shapes[first.index()].boundary = true;
            let last = self.smallest[(y + 1) * w - 1];
            self.shapes[last.index()].boundary = true;
        }
        for &id in &order {
            if self.shapes[id.index()].boundary {
                if let Some(p) = self.shapes[id.index()].parent {
                    self.shapes[p.index()].boundary = true;
                }
            }
        }
    }

    /// Rebuild the pixel index from the arena layout.
    ///
    /// Because the arena is tree-linearized, a shape's private pixels lie
    /// in at most two runs at the ends of its slice, outside the span
    /// covered by its children; this holds for both the pre-order layout
    /// (private pixels first) and the post-order one (private pixels
    /// last).
    pub fn index_smallest(&mut self) {
        self.index_subtree(Self::ROOT);
    }

    fn index_subtree(&mut self, id: NodeId) {
        let mut c = self.shapes[id.index()].child;
        while let Some(cid) = c {
            self.index_subtree(cid);
            c = self.shapes[cid.index()].sibling;
        }
        let start = self.shapes[id.index()].pixel_start;
        let end = start + self.shapes[id.index()].area;
        let mut child_begin = end;
        let mut child_end = start;
        let mut c = self.shapes[id.index()].child;
        while let Some(cid) = c {
            let cs = &self.shapes[cid.index()];
            child_begin = child_begin.min(cs.pixel_start);
            child_end = child_end.max(cs.pixel_start + cs.area);
            c = cs.sibling;
        }
        let w = self.width as usize;
        for i in (start..child_begin).chain(child_end..end) {
            let p = self.arena[i];
            self.smallest[(p.y as usize) * w + p.x as usize] = id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_only_tree() {
        let tree = ShapeTree::new(6, 5).unwrap();
        assert_eq!(tree.len(), 1);
        let root = tree.shape(ShapeTree::ROOT);
        assert_eq!(root.level_set, LevelSetType::Inf);
        assert_eq!(root.gray, 255);
        assert_eq!(root.area, 30);
        assert!(root.boundary);
        assert!(root.parent.is_none());
        assert!(tree.smallest_index().iter().all(|&id| id == ShapeTree::ROOT));
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(ShapeTree::new(0, 5).is_err());
        assert!(ShapeTree::new(5, 0).is_err());
        assert!(ShapeTree::new(-3, 5).is_err());
    }

    #[test]
    fn test_add_child_links() {
        let mut tree = ShapeTree::new(4, 4).unwrap();
        let a = tree.add_child(ShapeTree::ROOT);
        let b = tree.add_child(ShapeTree::ROOT);
        // Newest child goes first; the old first child becomes its sibling.
        assert_eq!(tree.shape(ShapeTree::ROOT).child, Some(b));
        assert_eq!(tree.shape(b).sibling, Some(a));
        assert_eq!(tree.shape(a).sibling, None);
        assert_eq!(tree.shape(a).parent, Some(ShapeTree::ROOT));
        assert_eq!(tree.shape(b).parent, Some(ShapeTree::ROOT));
    }

    #[test]
    fn test_find_relatives_tunnel_ignored() {
        let mut tree = ShapeTree::new(4, 4).unwrap();
        let a = tree.add_child(ShapeTree::ROOT);
        let a1 = tree.add_child(a);
        let a2 = tree.add_child(a);
        // Ignoring the middle shape surfaces its children as children of
        // the root.
        tree.shape_mut(a).ignore = true;
        assert_eq!(tree.find_parent(a1), Some(ShapeTree::ROOT));
        let first = tree.find_child(ShapeTree::ROOT).unwrap();
        assert!(first == a1 || first == a2);
        assert_eq!(tree.find_sibling(a2), Some(a1));
        assert_eq!(tree.find_sibling(a1), None);
        assert_eq!(tree.find_prev_sibling(a1), Some(a2));
    }
}
