//! Classical bottom-up extraction
//!
//! Scans the image for untreated local extrema and grows a region from
//! each by accreting iso-level sets of its neighborhood, emitting a shape
//! every time the region becomes isolated (all neighbors strictly above,
//! or strictly below, the current level) while its frontier has a single
//! connected component. Minima seed 4-connected lower shapes, maxima seed
//! 8-connected upper shapes; stepping over a lower-valued neighbor while
//! growing from a maximum switches the region to 8-connectivity.
//!
//! The frontier is tracked per pixel as a byte of micro-edge bits, tagged
//! with an exploration epoch so stale entries from earlier seeds are
//! invisible without clearing the grid. Adding a pixel derives a local
//! configuration pattern; 256-entry tables give the resulting change in
//! the frontier's component count (in the connectivity opposite to the
//! region's) and in the boundary length.
//!
//! Only shapes with area inside `[min_area, max_area]` are kept, spliced
//! under the tree via a per-pixel largest-extracted-shape index. Growth
//! from one seed is abandoned once the region would exceed the working
//! area cap, or half the image once it has met the border - in the latter
//! case the root's gray is rewritten to the current level, which is what
//! an unfiltered extraction leaves in the root for reconstruction.

use log::{debug, trace};
use shapetree_core::{LevelSetType, NodeId, Point, Raster, ShapeTree};

use crate::error::{ExtractError, ExtractResult};

const UP: u8 = 1;
const UPLEFT: u8 = 2;
const LEFT: u8 = 4;
const LEFTDOWN: u8 = 8;
const DOWN: u8 = 16;
const DOWNRIGHT: u8 = 32;
const RIGHT: u8 = 64;
const RIGHTUP: u8 = 128;

const CARDINALS: u8 = UP | LEFT | DOWN | RIGHT;

/// Per-configuration updates of the frontier component count and length
///
/// The cardinal bits of a pattern say which frontier edges already touch
/// the added pixel; the diagonal bits say which complementary pieces meet
/// it corner-wise. `cc4` applies to 4-connected regions (8-connected
/// complement), `cc8` to 8-connected regions.
struct PatternTables {
    cc4: [i8; 256],
    cc8: [i8; 256],
    len: [i8; 256],
}

impl PatternTables {
    fn new() -> Self {
        let mut cc4 = [0i8; 256];
        let mut cc8 = [0i8; 256];
        let mut len = [0i8; 256];
        for i in 0..256usize {
            let p = i as u8;
            let card = p & CARDINALS;
            let diag = |d: u8| (p & d != 0) as i8;
            let d4 = diag(UPLEFT) + diag(LEFTDOWN) + diag(DOWNRIGHT) + diag(RIGHTUP);

            cc4[i] = if card == CARDINALS {
                -1 + d4
            } else if card == UP | LEFT | DOWN {
                diag(UPLEFT) + diag(LEFTDOWN)
            } else if card == LEFT | DOWN | RIGHT {
                diag(LEFTDOWN) + diag(DOWNRIGHT)
            } else if card == DOWN | RIGHT | UP {
                diag(DOWNRIGHT) + diag(RIGHTUP)
            } else if card == RIGHT | UP | LEFT {
                diag(RIGHTUP) + diag(UPLEFT)
            } else if card == UP | DOWN || card == RIGHT | LEFT {
                1
            } else if (card == UP | LEFT && p & UPLEFT != 0)
                || (card == LEFT | DOWN && p & LEFTDOWN != 0)
                || (card == DOWN | RIGHT && p & DOWNRIGHT != 0)
                || (card == RIGHT | UP && p & RIGHTUP != 0)
            {
                1
            } else {
                0
            };

            cc8[i] = if card == CARDINALS {
                -1
            } else if card == UP | DOWN || card == RIGHT | LEFT {
                1
            } else if card == LEFT {
                diag(DOWNRIGHT) + diag(RIGHTUP)
            } else if card == DOWN {
                diag(RIGHTUP) + diag(UPLEFT)
            } else if card == RIGHT {
                diag(UPLEFT) + diag(LEFTDOWN)
            } else if card == UP {
                diag(LEFTDOWN) + diag(DOWNRIGHT)
            } else if (card == UP | LEFT && p & DOWNRIGHT != 0)
                || (card == LEFT | DOWN && p & RIGHTUP != 0)
                || (card == DOWN | RIGHT && p & UPLEFT != 0)
                || (card == RIGHT | UP && p & LEFTDOWN != 0)
            {
                1
            } else if card == 0 {
                // Diagonal-only contact; d4 == 0 is the region's very
                // first pixel.
                if d4 == 0 { 0 } else { d4 - 1 }
            } else {
                0
            };

            len[i] = 4 - 2 * (diag(UP) + diag(LEFT) + diag(DOWN) + diag(RIGHT));
        }
        PatternTables { cc4, cc8, len }
    }
}

const NONE: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct Cell {
    point: Point,
    next: u32,
}

/// Bucketed multiset of the region's neighbor pixels, keyed by gray level
///
/// A pool of singly linked cells with a free stack; 256 head/tail indices
/// and occupation counts give constant-time access to any level's
/// neighbors. Reset between seeds without touching the pool.
struct Neighborhood {
    cells: Vec<Cell>,
    free: Vec<u32>,
    occupation: [u32; 256],
    first: [u32; 256],
    last: [u32; 256],
    min_gray: u8,
    max_gray: u8,
}

impl Neighborhood {
    fn new(capacity: usize) -> Self {
        Neighborhood {
            cells: Vec::with_capacity(capacity),
            free: Vec::new(),
            occupation: [0; 256],
            first: [NONE; 256],
            last: [NONE; 256],
            min_gray: 255,
            max_gray: 0,
        }
    }

    fn reinit(&mut self) {
        self.cells.clear();
        self.free.clear();
        self.occupation = [0; 256];
        self.min_gray = 255;
        self.max_gray = 0;
    }

    fn add(&mut self, p: Point, g: u8) {
        if g < self.min_gray {
            self.min_gray = g;
        }
        if g > self.max_gray {
            self.max_gray = g;
        }
        let cell = Cell { point: p, next: NONE };
        let idx = match self.free.pop() {
            Some(i) => {
                self.cells[i as usize] = cell;
                i
            }
            None => {
                self.cells.push(cell);
                (self.cells.len() - 1) as u32
            }
        };
        let gi = g as usize;
        if self.occupation[gi] == 0 {
            self.first[gi] = idx;
        } else {
            let tail = self.last[gi];
            self.cells[tail as usize].next = idx;
        }
        self.last[gi] = idx;
        self.occupation[gi] += 1;
    }

    /// Remove the first `count` cells of bucket `g`, returning them to
    /// the free stack.
    fn remove_first(&mut self, g: u8, count: u32) {
        let gi = g as usize;
        self.occupation[gi] -= count;
        let mut cur = self.first[gi];
        for _ in 0..count {
            self.free.push(cur);
            cur = self.cells[cur as usize].next;
        }
        if self.occupation[gi] != 0 {
            self.first[gi] = cur;
        } else {
            if g == self.min_gray {
                while self.min_gray < 255 && self.occupation[self.min_gray as usize] == 0 {
                    self.min_gray += 1;
                }
            }
            if g == self.max_gray {
                while self.max_gray > 0 && self.occupation[self.max_gray as usize] == 0 {
                    self.max_gray -= 1;
                }
            }
        }
    }

    #[inline]
    fn smallest(&self) -> u8 {
        self.min_gray
    }

    #[inline]
    fn largest(&self) -> u8 {
        self.max_gray
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct FrontierPixel {
    /// Last seed this entry was written for; stale entries are invisible
    epoch: u64,
    /// Micro-edges of the region boundary incident to this cell
    dirs: u8,
}

struct Classical {
    /// Working copy of the input; kept regions are leveled out in place
    work: Vec<u8>,
    width: i32,
    height: i32,
    min_area: usize,
    max_area: usize,
    max_area_work: usize,
    half_area: usize,
    tree: ShapeTree,
    /// Largest extracted shape containing each pixel
    largest: Vec<NodeId>,
    epoch: u64,
    visited: Vec<u64>,
    visited_front: Vec<u64>,
    frontier: Vec<FrontierPixel>,
    nb: Neighborhood,
    region: Vec<Point>,
    meets_border: bool,
    border_length: i32,
    tables: PatternTables,
}

impl Classical {
    #[inline]
    fn index_of(&self, x: i32, y: i32) -> usize {
        (y as usize) * (self.width as usize) + x as usize
    }

    #[inline]
    fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    fn is_local_min(&self, x: i32, y: i32, diag: bool) -> bool {
        let v = self.work[self.index_of(x, y)];
        let mut strict = false;
        let mut check = |nx: i32, ny: i32| -> bool {
            if !self.contains(nx, ny) {
                return true;
            }
            let nv = self.work[self.index_of(nx, ny)];
            if nv < v {
                return false;
            }
            if nv > v {
                strict = true;
            }
            true
        };
        let ok = check(x + 1, y)
            && check(x - 1, y)
            && check(x, y + 1)
            && check(x, y - 1)
            && (!diag
                || (check(x + 1, y - 1)
                    && check(x + 1, y + 1)
                    && check(x - 1, y + 1)
                    && check(x - 1, y - 1)));
        ok && strict
    }

    fn is_local_max(&self, x: i32, y: i32, diag: bool) -> bool {
        let v = self.work[self.index_of(x, y)];
        let mut strict = false;
        let mut check = |nx: i32, ny: i32| -> bool {
            if !self.contains(nx, ny) {
                return true;
            }
            let nv = self.work[self.index_of(nx, ny)];
            if nv > v {
                return false;
            }
            if nv < v {
                strict = true;
            }
            true
        };
        let ok = check(x + 1, y)
            && check(x - 1, y)
            && check(x, y + 1)
            && check(x, y - 1)
            && (!diag
                || (check(x + 1, y - 1)
                    && check(x + 1, y + 1)
                    && check(x - 1, y + 1)
                    && check(x - 1, y - 1)));
        ok && strict
    }

    /// Add pixel `(row, col)` to a 4-connected region: toggle the incident
    /// frontier edges, derive the local pattern and update the component
    /// count of the 8-connected complement frontier.
    fn add_point4(&mut self, row: i32, col: i32, ncc: &mut i32) {
        let w = self.width;
        let h = self.height;
        let wu = w as usize;
        let base = (row as usize) * wu + col as usize;
        let mut pattern: u8 = 0;
        if self.meets_border {
            if row == 0 {
                pattern |= LEFT;
            }
            if col == 0 {
                pattern |= DOWN;
            }
        }
        // This cell holds the edges toward its up and left neighbors.
        let fp = &mut self.frontier[base];
        if fp.epoch < self.epoch {
            fp.epoch = self.epoch;
            fp.dirs = 0;
            if col != 0 {
                fp.dirs |= UP;
            }
            if row != 0 {
                fp.dirs |= RIGHT;
            }
        } else {
            pattern |= fp.dirs & (LEFT | DOWN);
            if fp.dirs & LEFT != 0 {
                fp.dirs &= !LEFT;
            } else if row != 0 {
                fp.dirs |= RIGHT;
            }
            if fp.dirs & DOWN != 0 {
                fp.dirs &= !DOWN;
            } else if col != 0 {
                fp.dirs |= UP;
            }
        }
        // Next column: the edge between that cell and this pixel.
        if col == w - 1 {
            if self.meets_border {
                pattern |= UP;
            }
        } else {
            let fp = &mut self.frontier[base + 1];
            if fp.epoch < self.epoch {
                fp.epoch = self.epoch;
                fp.dirs = DOWN;
            } else {
                pattern |= fp.dirs & UP;
                if fp.dirs & RIGHT != 0 {
                    pattern |= UPLEFT;
                }
                if fp.dirs & UP != 0 {
                    fp.dirs &= !UP;
                } else {
                    fp.dirs |= DOWN;
                }
            }
        }
        // Next row.
        if row == h - 1 {
            if self.meets_border {
                pattern |= RIGHT;
            }
        } else {
            let fp = &mut self.frontier[base + wu];
            if fp.epoch < self.epoch {
                fp.epoch = self.epoch;
                fp.dirs = LEFT;
            } else {
                pattern |= fp.dirs & RIGHT;
                if fp.dirs & UP != 0 {
                    pattern |= DOWNRIGHT;
                }
                if fp.dirs & RIGHT != 0 {
                    fp.dirs &= !RIGHT;
                } else {
                    fp.dirs |= LEFT;
                }
            }
        }
        // Corner-wise complementary contacts.
        if col > 0 {
            let fp = &self.frontier[base - 1];
            if fp.epoch == self.epoch && fp.dirs & RIGHT != 0 {
                pattern |= LEFTDOWN;
            }
        }
        if row < h - 1 && col < w - 1 {
            let fp = &self.frontier[base + wu + 1];
            if fp.epoch == self.epoch && fp.dirs & DOWN != 0 {
                pattern |= RIGHTUP;
            }
        }
        *ncc += self.tables.cc4[pattern as usize] as i32;

        self.update_length(row, col, pattern);
        if col == 0 || col == w - 1 || row == 0 || row == h - 1 {
            self.meets_border = true;
        }
    }

    /// 8-connected counterpart of [`Classical::add_point4`]; the
    /// complement frontier is counted in 4-connectivity.
    fn add_point8(&mut self, row: i32, col: i32, ncc: &mut i32) {
        let w = self.width;
        let h = self.height;
        let wu = w as usize;
        let base = (row as usize) * wu + col as usize;
        let mut pattern: u8 = 0;
        if self.meets_border {
            if row == 0 {
                pattern |= LEFT;
            }
            if col == 0 {
                pattern |= DOWN;
            }
        }
        let fp = &mut self.frontier[base];
        if fp.epoch < self.epoch {
            fp.epoch = self.epoch;
            fp.dirs = 0;
            if col != 0 {
                fp.dirs |= UP;
            }
            if row != 0 {
                fp.dirs |= RIGHT;
            }
        } else {
            pattern |= fp.dirs & (LEFT | DOWN);
            if fp.dirs & LEFT != 0 {
                fp.dirs &= !LEFT;
            } else if row != 0 {
                fp.dirs |= RIGHT;
            }
            if fp.dirs & DOWN != 0 {
                fp.dirs &= !DOWN;
            } else if col != 0 {
                fp.dirs |= UP;
            }
        }
        if col == w - 1 {
            if self.meets_border {
                pattern |= UP;
            }
        } else {
            let fp = &mut self.frontier[base + 1];
            if fp.epoch < self.epoch {
                fp.epoch = self.epoch;
                fp.dirs = DOWN;
            } else {
                pattern |= fp.dirs & UP;
                if fp.dirs & LEFT != 0 {
                    pattern |= UPLEFT;
                }
                if fp.dirs & UP != 0 {
                    fp.dirs &= !UP;
                } else {
                    fp.dirs |= DOWN;
                }
            }
        }
        if row == h - 1 {
            if self.meets_border {
                pattern |= RIGHT;
            }
        } else {
            let fp = &mut self.frontier[base + wu];
            if fp.epoch < self.epoch {
                fp.epoch = self.epoch;
                fp.dirs = LEFT;
            } else {
                pattern |= fp.dirs & RIGHT;
                if fp.dirs & DOWN != 0 {
                    pattern |= DOWNRIGHT;
                }
                if fp.dirs & RIGHT != 0 {
                    fp.dirs &= !RIGHT;
                } else {
                    fp.dirs |= LEFT;
                }
            }
        }
        if col > 0 {
            let fp = &self.frontier[base - 1];
            if fp.epoch == self.epoch && fp.dirs & LEFT != 0 {
                pattern |= LEFTDOWN;
            }
        }
        if row < h - 1 && col < w - 1 {
            let fp = &self.frontier[base + wu + 1];
            if fp.epoch == self.epoch && fp.dirs & UP != 0 {
                pattern |= RIGHTUP;
            }
        }
        *ncc += self.tables.cc8[pattern as usize] as i32;

        self.update_length(row, col, pattern);
        if col == 0 || col == w - 1 || row == 0 || row == h - 1 {
            self.meets_border = true;
        }
    }

    /// Border-clipped boundary length update.
    fn update_length(&mut self, row: i32, col: i32, pattern: u8) {
        let mut pattern = pattern;
        if col == 0 {
            self.border_length -= 1;
            pattern &= !DOWN;
        } else if col == self.width - 1 {
            self.border_length -= 1;
            pattern &= !UP;
        }
        if row == 0 {
            self.border_length -= 1;
            pattern &= !LEFT;
        } else if row == self.height - 1 {
            self.border_length -= 1;
            pattern &= !RIGHT;
        }
        self.border_length += self.tables.len[pattern as usize] as i32;
    }

    /// Put `(x, y)` in the neighborhood, marked for this exploration.
    fn add_neighbor(&mut self, x: i32, y: i32) {
        let idx = self.index_of(x, y);
        self.visited_front[idx] = self.epoch;
        let g = self.work[idx];
        self.nb.add(Point::new(x as i16, y as i16), g);
    }

    fn try_add_neighbor(&mut self, x: i32, y: i32) {
        if self.contains(x, y) && self.visited_front[self.index_of(x, y)] < self.epoch {
            self.add_neighbor(x, y);
        }
    }

    /// Absorb every neighbor at level `g` into the region. Returns
    /// `false` when growth must stop: the region would exceed the working
    /// cap, or half the image once it has met the border - the latter
    /// rewrites the root's gray to the current level.
    fn absorb_iso_level(
        &mut self,
        g: u8,
        area: &mut usize,
        ncc: &mut i32,
        eight: &mut bool,
    ) -> bool {
        let iso = self.nb.occupation[g as usize] as usize;
        if *area + iso >= self.max_area_work {
            return false;
        }
        if self.meets_border && *area + iso > self.half_area {
            self.tree.shape_mut(ShapeTree::ROOT).gray = g;
            return false;
        }
        let mut cur = self.nb.first[g as usize];
        for _ in 0..iso {
            let p = self.nb.cells[cur as usize].point;
            cur = self.nb.cells[cur as usize].next;
            self.region.push(p);
            let (x, y) = (p.x as i32, p.y as i32);
            if *eight {
                self.add_point8(y, x, ncc);
            } else {
                self.add_point4(y, x, ncc);
            }
            let idx = self.index_of(x, y);
            self.visited[idx] = self.epoch;
            self.try_add_neighbor(x - 1, y);
            self.try_add_neighbor(x + 1, y);
            self.try_add_neighbor(x, y - 1);
            self.try_add_neighbor(x, y + 1);
            // A neighbor below the current level flips a region grown
            // from a maximum to 8-connectivity.
            if self.nb.smallest() < g {
                *eight = true;
            }
            if *eight {
                self.try_add_neighbor(x - 1, y - 1);
                self.try_add_neighbor(x + 1, y - 1);
                self.try_add_neighbor(x + 1, y + 1);
                self.try_add_neighbor(x - 1, y + 1);
            }
        }
        *area += iso;
        self.nb.remove_first(g, iso as u32);
        true
    }

    /// Append a shape for the current region under the root.
    fn create_shape(&mut self, area: usize, gray: u8, t: LevelSetType) {
        let id = self.tree.add_child(ShapeTree::ROOT);
        let meets_border = self.meets_border;
        let s = self.tree.shape_mut(id);
        s.level_set = t;
        s.gray = gray;
        s.boundary = meets_border;
        s.area = area;
        s.ignore = false;
        trace!(
            "shape {:?}: area {} at gray {}, boundary length {}",
            t, area, gray, self.border_length
        );
    }

    /// Detach `t` from its parent's child list.
    fn detach(&mut self, t: NodeId) {
        let parent = self.tree.shape(t).parent.expect("only the root has no parent");
        let sibling = self.tree.shape(t).sibling;
        if self.tree.shape(parent).child == Some(t) {
            self.tree.shape_mut(parent).child = sibling;
        } else {
            let mut c = self.tree.shape(parent).child;
            while let Some(cid) = c {
                if self.tree.shape(cid).sibling == Some(t) {
                    self.tree.shape_mut(cid).sibling = sibling;
                    break;
                }
                c = self.tree.shape(cid).sibling;
            }
        }
    }

    /// Re-parent everything the just-created shape covers: pixels whose
    /// largest shape was the root now index the new shape; previously
    /// extracted shapes inside it are spliced under it.
    fn update_indexes(&mut self, count: usize) {
        let new_id = NodeId::new(self.tree.len() - 1);
        for k in 0..count {
            let p = self.region[k];
            let idx = self.index_of(p.x as i32, p.y as i32);
            let t = self.largest[idx];
            if t == ShapeTree::ROOT {
                self.tree.smallest_index_mut()[idx] = new_id;
            } else if self.tree.shape(t).parent != Some(new_id) {
                self.detach(t);
                let old = self.tree.shape(new_id).child;
                self.tree.shape_mut(t).parent = Some(new_id);
                self.tree.shape_mut(t).sibling = old;
                self.tree.shape_mut(new_id).child = Some(t);
            }
            self.largest[idx] = new_id;
        }
    }

    /// Grow a region from the extremum at `(x, y)` and emit the nested
    /// level sets that qualify as shapes.
    fn grow_from(&mut self, x: i32, y: i32, eight_seed: bool) {
        let mut eight = eight_seed;
        let mut cur_area = 0usize;
        let mut prev_area = 0usize;
        // Components of the complement frontier: 1 + number of holes.
        let mut ncc: i32 = 1;
        let mut ambiguity = false;
        self.meets_border = false;
        self.border_length = 0;
        self.region.clear();
        let mut cur_gray = self.work[self.index_of(x, y)];
        self.nb.reinit();
        self.add_neighbor(x, y);
        loop {
            if !self.absorb_iso_level(cur_gray, &mut cur_area, &mut ncc, &mut eight) {
                break;
            }
            let gmin = self.nb.smallest();
            let gmax = self.nb.largest();
            if ambiguity && (gmin != cur_gray || gmax != cur_gray) {
                ambiguity = false;
                ncc = 1;
            }
            if gmin > cur_gray || gmax < cur_gray {
                // The region is isolated at the current level.
                if ncc > 1 {
                    // It surrounds a hole; the hole's content will be
                    // reached from another extremum.
                    break;
                }
                prev_area = cur_area;
                if self.min_area <= cur_area && cur_area <= self.max_area {
                    let t = if cur_gray < gmin {
                        LevelSetType::Inf
                    } else {
                        LevelSetType::Sup
                    };
                    self.create_shape(cur_area, cur_gray, t);
                    self.update_indexes(cur_area);
                }
                cur_gray = if gmin > cur_gray { gmin } else { gmax };
                if gmin == gmax {
                    // All neighbors sit at one level: connectivity is
                    // ambiguous until a strict inequality reappears.
                    eight = false;
                    ambiguity = true;
                }
            }
            if !(gmin >= cur_gray || gmax <= cur_gray) {
                break;
            }
        }
        // Level out the kept region in the working image.
        for k in 0..prev_area {
            let p = self.region[k];
            let idx = self.index_of(p.x as i32, p.y as i32);
            self.work[idx] = cur_gray;
        }
    }

    /// Row-major scan for untreated local extrema.
    fn scan(&mut self) {
        for y in 0..self.height {
            for x in 0..self.width {
                if self.visited[self.index_of(x, y)] != 0 {
                    continue;
                }
                if self.is_local_min(x, y, false) {
                    self.grow_from(x, y, false);
                    self.epoch += 1;
                } else if self.is_local_max(x, y, true) {
                    self.grow_from(x, y, true);
                    self.epoch += 1;
                }
            }
        }
    }

    /// Lay out the pixel arena in pre-order: each shape's private pixels,
    /// then its descendants' slices.
    fn layout_arena(&mut self) {
        let n = self.tree.len();
        // Private pixel counts: area minus the children's areas.
        let mut proper: Vec<usize> = (0..n).map(|i| self.tree.shapes()[i].area).collect();
        for i in (1..n).rev() {
            let parent = self.tree.shapes()[i]
                .parent
                .expect("non-root shapes have a parent");
            proper[parent.index()] -= self.tree.shapes()[i].area;
        }
        // Pre-order walk reserving each shape's slice.
        let mut stack: Vec<NodeId> = Vec::new();
        let mut cur = Some(ShapeTree::ROOT);
        let mut offset = 0usize;
        loop {
            match cur {
                Some(id) => {
                    self.tree.shape_mut(id).pixel_start = offset;
                    offset += proper[id.index()];
                    stack.push(id);
                    cur = self.tree.shape(id).child;
                }
                None => match stack.pop() {
                    Some(id) => cur = self.tree.shape(id).sibling,
                    None => break,
                },
            }
        }
        // Reverse raster scan drops each pixel into its owner's slice
        // back to front, leaving every slice in forward raster order.
        let w = self.width as usize;
        for idx in (0..self.visited.len()).rev() {
            let id = self.tree.smallest_index()[idx];
            proper[id.index()] -= 1;
            let slot = self.tree.shape(id).pixel_start + proper[id.index()];
            self.tree.arena_mut()[slot] = Point::new((idx % w) as i16, (idx / w) as i16);
        }
    }
}

/// Extract the tree of shapes with the classical bottom-up algorithm.
///
/// Only shapes with `area` in `[min_area, max_area]` are kept; `0` for
/// either bound means no constraint (1 and the image area respectively).
/// With `min_area > max_area` no shape qualifies and the tree holds only
/// the root (grain-filter mode). The input raster is not modified.
///
/// # Errors
///
/// Returns an error if the dimensions or buffer length are invalid, or if
/// `min_area` exceeds the image area.
pub fn extract_classical(
    gray: &[u8],
    width: i32,
    height: i32,
    min_area: u32,
    max_area: u32,
) -> ExtractResult<ShapeTree> {
    let im = Raster::new(gray, width, height)?;
    let n = im.area();
    let min_area_eff = if min_area == 0 { 1 } else { min_area as usize };
    if min_area_eff > n {
        return Err(ExtractError::MinAreaTooLarge {
            min_area,
            image_area: n,
        });
    }
    let max_area_eff = if max_area == 0 { n } else { max_area as usize };
    let max_area_work = min_area_eff.max(max_area_eff);
    let tree = ShapeTree::new(width, height)?;

    let mut ex = Classical {
        work: gray.to_vec(),
        width,
        height,
        min_area: min_area_eff,
        max_area: max_area_eff,
        max_area_work,
        half_area: n / 2,
        tree,
        largest: vec![ShapeTree::ROOT; n],
        epoch: 1,
        visited: vec![0; n],
        visited_front: vec![0; n],
        frontier: vec![FrontierPixel::default(); n],
        nb: Neighborhood::new((4 * (max_area_work + 1)).min(n)),
        region: Vec::with_capacity(max_area_work.min(n)),
        meets_border: false,
        border_length: 0,
        tables: PatternTables::new(),
    };
    ex.scan();
    ex.layout_arena();
    debug!(
        "classical: {} shapes from {}x{} image (area in [{}, {}])",
        ex.tree.len(),
        width,
        height,
        min_area_eff,
        max_area_eff
    );
    Ok(ex.tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_tables() {
        let t = PatternTables::new();
        // Surrounded on all four sides: the complement loses a component
        // unless diagonal pieces keep it split.
        assert_eq!(t.cc4[(UP | LEFT | DOWN | RIGHT) as usize], -1);
        assert_eq!(t.cc4[(UP | LEFT | DOWN | RIGHT | UPLEFT) as usize], 0);
        assert_eq!(t.cc8[(UP | LEFT | DOWN | RIGHT) as usize], -1);
        // Bridging two opposite edges splits the complement in two.
        assert_eq!(t.cc4[(UP | DOWN) as usize], 1);
        assert_eq!(t.cc8[(LEFT | RIGHT) as usize], 1);
        // First pixel of a region.
        assert_eq!(t.cc4[0], 0);
        assert_eq!(t.cc8[0], 0);
        // Diagonal-only contact in 8-connectivity merges components.
        assert_eq!(t.cc8[UPLEFT as usize], 0);
        assert_eq!(t.cc8[(UPLEFT | DOWNRIGHT) as usize], 1);
        // Length: each pre-existing frontier edge disappears, each free
        // side appears.
        assert_eq!(t.len[0], 4);
        assert_eq!(t.len[UP as usize], 2);
        assert_eq!(t.len[(UP | DOWN) as usize], 0);
        assert_eq!(t.len[(UP | LEFT | DOWN | RIGHT) as usize], -4);
    }

    #[test]
    fn test_neighborhood_buckets() {
        let mut nb = Neighborhood::new(16);
        nb.add(Point::new(0, 0), 10);
        nb.add(Point::new(1, 0), 200);
        nb.add(Point::new(2, 0), 10);
        assert_eq!(nb.smallest(), 10);
        assert_eq!(nb.largest(), 200);
        assert_eq!(nb.occupation[10], 2);

        // Removing bucket 10 in FIFO order frees its cells and moves the
        // minimum up.
        nb.remove_first(10, 2);
        assert_eq!(nb.occupation[10], 0);
        assert_eq!(nb.smallest(), 200);
        assert_eq!(nb.free.len(), 2);

        // Freed cells are reused before the pool grows.
        let pool = nb.cells.len();
        nb.add(Point::new(3, 0), 7);
        assert_eq!(nb.cells.len(), pool);
        assert_eq!(nb.smallest(), 7);

        nb.reinit();
        assert_eq!(nb.smallest(), 255);
        assert_eq!(nb.largest(), 0);
        assert!(nb.occupation.iter().all(|&o| o == 0));
    }

    #[test]
    fn test_local_extrema() {
        #[rustfmt::skip]
        let data = vec![
            5, 5, 5,
            5, 9, 5,
            5, 5, 1,
        ];
        let tree = ShapeTree::new(3, 3).unwrap();
        let ex = Classical {
            work: data,
            width: 3,
            height: 3,
            min_area: 1,
            max_area: 9,
            max_area_work: 9,
            half_area: 4,
            tree,
            largest: vec![ShapeTree::ROOT; 9],
            epoch: 1,
            visited: vec![0; 9],
            visited_front: vec![0; 9],
            frontier: vec![FrontierPixel::default(); 9],
            nb: Neighborhood::new(9),
            region: Vec::new(),
            meets_border: false,
            border_length: 0,
            tables: PatternTables::new(),
        };
        assert!(ex.is_local_max(1, 1, true));
        assert!(!ex.is_local_min(1, 1, false));
        assert!(ex.is_local_min(2, 2, false));
        // A flat pixel is no extremum.
        assert!(!ex.is_local_min(0, 0, false));
        assert!(!ex.is_local_max(0, 0, true));
    }
}
