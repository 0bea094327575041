//! Top-down pre-order extraction
//!
//! Each shape is built in three steps: trace its outer level line to find
//! its gray and a seed pixel, grow the private area from that seed while
//! collecting one seed edgel per child, then recurse into the children.
//! A child's arena slice starts right after everything the parent has
//! claimed so far, so the resulting layout is pre-order linearized:
//! private pixels first, then the descendants' slices.
//!
//! While growing the private area, a detected child's level line is walked
//! immediately - not to build the child, but to mark its line pixels as
//! claimed (blocking re-entry) and to pick up private pixels sitting on
//! the child's immediate exterior.

use shapetree_core::{Connectivity, LevelSetType, NodeId, Raster, ShapeTree};

use crate::edgel::{Direction, Edgel};

struct PreOrder<'a> {
    im: Raster<'a>,
    tree: ShapeTree,
    /// Working pixel index; `None` marks unclaimed pixels
    smallest: Vec<Option<NodeId>>,
    record_contours: bool,
}

/// Whether the level line between an interior at gray `vi` and an
/// exterior at gray `ve` bounds an 8-connected shape, in which case the
/// diagonal neighbors across it also belong to the enumeration.
fn diagonal_link(vi: u8, ve: u8) -> bool {
    if vi == ve {
        return false;
    }
    let t = if vi < ve {
        LevelSetType::Inf
    } else {
        LevelSetType::Sup
    };
    t.connectivity() == Connectivity::Eight
}

impl PreOrder<'_> {
    /// Initialize shape `id` from boundary edgel `e`, `level` being the
    /// parent's gray. Records the shape's gray (the extreme value on the
    /// line) and one seed pixel of the private area.
    fn trace_shape(&mut self, id: NodeId, e: Edgel, level: i32) {
        let t = if (self.im.gray(e.pt) as i32) < level {
            LevelSetType::Inf
        } else {
            LevelSetType::Sup
        };
        let start = self.tree.shape(id).pixel_start;
        let parent = self.tree.shape(id).parent;
        {
            let s = self.tree.shape_mut(id);
            s.level_set = t;
            s.gray = match t {
                LevelSetType::Inf => 0,
                LevelSetType::Sup => 255,
            };
            s.ignore = false;
            s.boundary = false;
            s.area = 1;
            if self.record_contours {
                s.contour = Some(Vec::new());
            }
        }
        let mut cur = e;
        loop {
            if self.record_contours && !cur.dir.is_diagonal() {
                let origin = cur.origin();
                if let Some(c) = self.tree.shape_mut(id).contour.as_mut() {
                    c.push(origin);
                }
            }
            let j = self.im.index(cur.pt);
            let v = self.im.data()[j];
            if !t.is_in(v as i32, self.tree.shape(id).gray as i32) {
                self.tree.shape_mut(id).gray = v;
                self.tree.arena_mut()[start] = cur.pt;
            }
            debug_assert!(self.smallest[j].is_none() || self.smallest[j] == parent);
            self.smallest[j] = None;
            cur.next(&self.im, t, level);
            if cur == e {
                break;
            }
        }
        let seed = self.tree.arena()[start];
        self.smallest[self.im.index(seed)] = Some(id);
    }

    /// Append one pixel to the private area of shape `id`.
    fn push_pixel(&mut self, id: NodeId, p: shapetree_core::Point) {
        let slot = {
            let s = self.tree.shape(id);
            s.pixel_start + s.area
        };
        self.tree.arena_mut()[slot] = p;
        self.tree.shape_mut(id).area += 1;
    }

    /// Walk the level line of a child of `id` starting at `e`, claiming
    /// the line pixels for `id` so the boundary is not followed again,
    /// and absorbing exterior pixels at `id`'s gray into the private
    /// area. The child itself is built later.
    fn mark_child_line(&mut self, id: NodeId, e: Edgel) {
        let parent_gray = self.tree.shape(id).gray;
        let t = if self.im.gray(e.pt) < parent_gray {
            LevelSetType::Inf
        } else {
            LevelSetType::Sup
        };
        let mut cur = e;
        loop {
            let i = self.im.index(cur.pt);
            debug_assert!(t.is_in(self.im.data()[i] as i32, parent_gray as i32));
            debug_assert!(self.smallest[i].is_none() || self.smallest[i] == Some(id));
            self.smallest[i] = Some(id);
            if let Some(ext) = cur.exterior(&self.im) {
                let j = self.im.index(ext);
                if self.smallest[j].is_none() && self.im.data()[j] == parent_gray {
                    self.push_pixel(id, ext);
                    self.smallest[j] = Some(id);
                }
            }
            cur.next(&self.im, t, parent_gray as i32);
            if cur == e {
                break;
            }
        }
    }

    /// Consider the exterior pixel across edgel `e`. At the shape's gray
    /// it joins the private area; at any other gray it seeds a child
    /// whose line is marked right away. Returns whether the crossed edge
    /// continues diagonally.
    fn absorb_neighbor(&mut self, id: NodeId, mut e: Edgel, children: &mut Vec<Edgel>) -> bool {
        if !e.inverse(&self.im) {
            self.tree.shape_mut(id).boundary = true;
            return false;
        }
        let i = self.im.index(e.pt);
        let gray = self.tree.shape(id).gray;
        if self.smallest[i].is_none() {
            if self.im.data()[i] == gray {
                self.push_pixel(id, e.pt);
                self.smallest[i] = Some(id);
            } else {
                children.push(e);
                self.mark_child_line(id, e);
            }
        }
        diagonal_link(gray, self.im.data()[i])
    }

    /// Grow the private area of shape `id` and collect one seed edgel
    /// per child. The diagonal edges of a pixel are examined only when
    /// both incident cardinal edges qualified, which realizes the 4/8
    /// connectivity duality without branching on the shape type.
    fn grow_private(&mut self, id: NodeId, children: &mut Vec<Edgel>) {
        let mut i = 0;
        while i < self.tree.shape(id).area {
            let pt = self.tree.arena()[self.tree.shape(id).pixel_start + i];
            debug_assert_eq!(self.smallest[self.im.index(pt)], Some(id));

            let e = |dir| Edgel { pt, dir };
            let east = self.absorb_neighbor(id, e(Direction::East), children);
            let north = self.absorb_neighbor(id, e(Direction::North), children);
            let west = self.absorb_neighbor(id, e(Direction::West), children);
            let south = self.absorb_neighbor(id, e(Direction::South), children);

            if north && east {
                self.absorb_neighbor(id, e(Direction::NorthEast), children);
            }
            if north && west {
                self.absorb_neighbor(id, e(Direction::NorthWest), children);
            }
            if south && west {
                self.absorb_neighbor(id, e(Direction::SouthWest), children);
            }
            if south && east {
                self.absorb_neighbor(id, e(Direction::SouthEast), children);
            }
            i += 1;
        }
    }

    /// Build the subtree rooted at `id`, seeded by boundary edgel `e`;
    /// `level` is the parent's gray.
    fn build_subtree(&mut self, id: NodeId, e: Edgel, level: i32) {
        self.trace_shape(id, e, level);

        let mut children = Vec::new();
        self.grow_private(id, &mut children);

        for seed in children {
            let child = self.tree.add_child(id);
            self.tree.shape_mut(child).pixel_start =
                self.tree.shape(id).pixel_start + self.tree.shape(id).area;
            self.build_subtree(child, seed, self.tree.shape(id).gray as i32);
            let child_area = self.tree.shape(child).area;
            self.tree.shape_mut(id).area += child_area;
        }
    }
}

/// Run the pre-order extraction over `im`, filling `tree`.
pub(crate) fn run(im: &Raster<'_>, tree: ShapeTree, record_contours: bool) -> ShapeTree {
    let n = im.area();
    let mut ex = PreOrder {
        im: *im,
        tree,
        smallest: vec![None; n],
        record_contours,
    };
    ex.build_subtree(ShapeTree::ROOT, Edgel::new(0, 0, Direction::South), -1);
    debug_assert_eq!(ex.tree.shape(ShapeTree::ROOT).area, n);

    let PreOrder {
        mut tree, smallest, ..
    } = ex;
    for (dst, src) in tree.smallest_index_mut().iter_mut().zip(smallest) {
        *dst = src.expect("every pixel is claimed by the extraction");
    }
    tree
}
