//! Top-down post-order extraction
//!
//! Same locator as the pre-order variant, but each child's subtree is
//! built immediately upon detection, before more of the parent's private
//! pixels are committed. Two stacks drive the enumeration of the current
//! shape: candidate private pixels (same gray) and candidate child seed
//! edgels (any other gray). Private pixels are committed only as they pop,
//! with a three-state color grid (unseen / seen / committed) keeping each
//! pixel classified exactly once.
//!
//! The arena layout is therefore post-order linearized: a shape's private
//! pixels are written after all of its descendants' slices.

use shapetree_core::{LevelSetType, NodeId, Point, Raster, ShapeTree};

use crate::edgel::{Direction, Edgel};

const SEEN: u8 = 1;
const COMMITTED: u8 = 2;

struct PostOrder<'a> {
    im: Raster<'a>,
    tree: ShapeTree,
    /// Working pixel index; `None` marks unclaimed pixels
    smallest: Vec<Option<NodeId>>,
    /// Exploration state per pixel: 0, SEEN or COMMITTED
    color: Vec<u8>,
    record_contours: bool,
}

/// Replace a diagonal seed edgel by an equivalent cardinal one, so the
/// line trace cannot start on a transient state. `level` is strictly
/// between the gray levels of the interior and exterior pixels; whichever
/// diagonal neighbor is inside the level set becomes the interior.
fn fix_initial_edgel(im: &Raster<'_>, t: LevelSetType, e: &mut Edgel, level: i32) {
    debug_assert!(e.dir.is_diagonal());
    let ext = e
        .exterior(im)
        .expect("diagonal seed edgels always have an exterior");
    let diag1 = Point::new(e.pt.x, ext.y);
    let diag2 = Point::new(ext.x, e.pt.y);
    if t.is_in(im.gray(diag1) as i32, level) {
        e.pt = diag1;
        e.dir = if diag1.x < ext.x {
            Direction::North
        } else {
            Direction::South
        };
    } else if t.is_in(im.gray(diag2) as i32, level) {
        e.pt = diag2;
        e.dir = if diag2.y < ext.y {
            Direction::East
        } else {
            Direction::West
        };
    } else {
        e.dir = if e.pt.x < ext.x {
            Direction::North
        } else {
            Direction::South
        };
    }
}

impl PostOrder<'_> {
    /// Initialize shape `id` and trace its complete level line, starting
    /// from `e`; `level` is the parent's gray. Returns the line as a
    /// sequence of edgels. Pixel and family fields are left untouched.
    fn locate_line(&mut self, id: NodeId, mut e: Edgel, level: i32) -> Vec<Edgel> {
        let t = if (self.im.gray(e.pt) as i32) < level {
            LevelSetType::Inf
        } else {
            LevelSetType::Sup
        };
        {
            let s = self.tree.shape_mut(id);
            s.level_set = t;
            s.gray = match t {
                LevelSetType::Inf => 0,
                LevelSetType::Sup => 255,
            };
            s.ignore = false;
            s.boundary = false;
            if self.record_contours {
                s.contour = Some(Vec::new());
            }
        }
        if e.dir.is_diagonal() {
            fix_initial_edgel(&self.im, t, &mut e, level);
        }

        let mut boundary = Vec::new();
        let mut cur = e;
        loop {
            boundary.push(cur);
            if self.record_contours && !cur.dir.is_diagonal() {
                let origin = cur.origin();
                if let Some(c) = self.tree.shape_mut(id).contour.as_mut() {
                    c.push(origin);
                }
            }
            let v = self.im.gray(cur.pt);
            if !t.is_in(v as i32, self.tree.shape(id).gray as i32) {
                self.tree.shape_mut(id).gray = v;
            }
            cur.next(&self.im, t, level);
            if cur == e {
                break;
            }
        }
        boundary
    }

    /// Classify the exterior pixel of edgel `e` against gray `g`: same
    /// gray goes to the private stack, any other gray becomes a child
    /// seed. Pixels already seen are left alone.
    fn classify_exterior(
        &mut self,
        e: Edgel,
        g: u8,
        qp: &mut Vec<Point>,
        qc: &mut Vec<Edgel>,
    ) {
        let mut f = e;
        if !f.inverse(&self.im) {
            return;
        }
        let i = self.im.index(f.pt);
        if self.color[i] != 0 {
            return;
        }
        if self.im.data()[i] == g {
            qp.push(f.pt);
        } else {
            qc.push(f);
        }
        self.color[i] = SEEN;
    }

    /// Fill the subtree rooted at `id`, whose level line is `bound`.
    fn locate_all_children(&mut self, id: NodeId, bound: &[Edgel]) {
        self.tree.shape_mut(id).area = 0;
        if let Some(parent) = self.tree.shape(id).parent {
            // The slice starts after the elder siblings' subtrees.
            let mut end = self.tree.shape(parent).pixel_start;
            let mut c = self.tree.shape(id).sibling;
            while let Some(cid) = c {
                let cs = self.tree.shape(cid);
                end = end.max(cs.pixel_start + cs.area);
                c = cs.sibling;
            }
            self.tree.shape_mut(id).pixel_start = end;
        }
        let gray = self.tree.shape(id).gray;

        let mut qp: Vec<Point> = Vec::new();
        let mut qc: Vec<Edgel> = Vec::new();
        let mut private: Vec<Point> = Vec::new();
        for &be in bound {
            let bi = self.im.index(be.pt);
            if self.smallest[bi].is_some() {
                continue;
            }
            if self.im.data()[bi] == gray {
                qp.push(be.pt);
            } else {
                qc.push(be);
            }
            self.color[bi] = SEEN;
            while !(qp.is_empty() && qc.is_empty()) {
                if let Some(p) = qp.pop() {
                    let idx = self.im.index(p);
                    self.color[idx] = COMMITTED;
                    self.smallest[idx] = Some(id);
                    private.push(p);
                    for dir in [
                        Direction::East,
                        Direction::North,
                        Direction::West,
                        Direction::South,
                    ] {
                        self.classify_exterior(Edgel { pt: p, dir }, gray, &mut qp, &mut qc);
                    }
                }
                if let Some(e) = qc.pop() {
                    if self.color[self.im.index(e.pt)] == COMMITTED {
                        continue;
                    }
                    let child = self.tree.add_child(id);
                    let b = self.locate_line(child, e, gray as i32);
                    for &bc in &b {
                        self.color[self.im.index(bc.pt)] = COMMITTED;
                        self.classify_exterior(bc, gray, &mut qp, &mut qc);
                    }
                    self.locate_all_children(child, &b);
                    let child_area = self.tree.shape(child).area;
                    self.tree.shape_mut(id).area += child_area;
                }
            }
        }

        // Commit the private pixels after all the children's slices.
        let slot = self.tree.shape(id).pixel_start + self.tree.shape(id).area;
        for (k, &p) in private.iter().enumerate() {
            self.tree.arena_mut()[slot + k] = p;
        }
        self.tree.shape_mut(id).area += private.len();
    }
}

/// Run the post-order extraction over `im`, filling `tree`.
pub(crate) fn run(im: &Raster<'_>, tree: ShapeTree, record_contours: bool) -> ShapeTree {
    let n = im.area();
    let mut ex = PostOrder {
        im: *im,
        tree,
        smallest: vec![None; n],
        color: vec![0u8; n],
        record_contours,
    };
    let bound = ex.locate_line(ShapeTree::ROOT, Edgel::new(0, 0, Direction::South), -1);
    ex.locate_all_children(ShapeTree::ROOT, &bound);
    debug_assert_eq!(ex.tree.shape(ShapeTree::ROOT).area, n);

    let PostOrder {
        mut tree, smallest, ..
    } = ex;
    for (dst, src) in tree.smallest_index_mut().iter_mut().zip(smallest) {
        *dst = src.expect("every pixel is claimed by the extraction");
    }
    tree
}
