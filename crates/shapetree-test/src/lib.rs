//! shapetree-test - Shared test support for the shapetree workspace
//!
//! Provides gray raster builders for scenario images and structural
//! checks over extracted trees. The checks return `Err` with a message
//! instead of panicking, so integration tests can report which invariant
//! broke on which input.

use shapetree_core::{LevelSetType, NodeId, ShapeTree};

/// Owned grayscale test image with drawing helpers
#[derive(Debug, Clone)]
pub struct GrayImage {
    width: i32,
    height: i32,
    data: Vec<u8>,
}

impl GrayImage {
    /// Create a `width x height` image filled with `background`.
    pub fn new(width: i32, height: i32, background: u8) -> Self {
        GrayImage {
            width,
            height,
            data: vec![background; (width * height) as usize],
        }
    }

    /// Image width in pixels.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Image height in pixels.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Raw pixel buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Set a single pixel.
    pub fn set(&mut self, x: i32, y: i32, v: u8) {
        self.data[(y * self.width + x) as usize] = v;
    }

    /// Fill the rectangle of top-left `(x0, y0)` and size `w x h`.
    pub fn fill_rect(&mut self, x0: i32, y0: i32, w: i32, h: i32, v: u8) {
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                self.set(x, y, v);
            }
        }
    }

    /// Draw the one-pixel-wide outline of a rectangle.
    pub fn draw_ring(&mut self, x0: i32, y0: i32, w: i32, h: i32, v: u8) {
        for x in x0..x0 + w {
            self.set(x, y0, v);
            self.set(x, y0 + h - 1, v);
        }
        for y in y0..y0 + h {
            self.set(x0, y, v);
            self.set(x0 + w - 1, y, v);
        }
    }
}

fn fail(msg: String) -> Result<(), String> {
    Err(msg)
}

/// Check the structural invariants of an extracted tree against its
/// input raster: arena partition and tiling, child nesting, index
/// soundness and boundary flags.
pub fn check_structure(tree: &ShapeTree, gray: &[u8]) -> Result<(), String> {
    let w = tree.width() as usize;
    let h = tree.height() as usize;
    let n = w * h;
    if gray.len() != n {
        return fail(format!("raster size {} does not match tree {}x{}", gray.len(), w, h));
    }

    // Root covers the whole arena.
    let root = tree.shape(ShapeTree::ROOT);
    if root.parent.is_some() || root.pixel_start != 0 || root.area != n {
        return fail("root must own the whole arena with no parent".into());
    }
    if !root.boundary {
        return fail("root must touch the image boundary".into());
    }

    // The arena is a permutation of all pixels.
    let mut seen = vec![false; n];
    for p in tree.arena() {
        let (x, y) = (p.x as i32, p.y as i32);
        if x < 0 || x as usize >= w || y < 0 || y as usize >= h {
            return fail(format!("arena point ({}, {}) outside the image", x, y));
        }
        let i = y as usize * w + x as usize;
        if seen[i] {
            return fail(format!("pixel ({}, {}) appears twice in the arena", x, y));
        }
        seen[i] = true;
    }

    // Arena position of every pixel, for containment checks.
    let mut pos = vec![0usize; n];
    for (k, p) in tree.arena().iter().enumerate() {
        pos[p.y as usize * w + p.x as usize] = k;
    }

    let mut private_total = 0usize;
    for (i, s) in tree.shapes().iter().enumerate() {
        let id = NodeId::new(i);
        if s.area == 0 {
            return fail(format!("shape {} has zero area", i));
        }
        let end = s.pixel_start + s.area;
        if end > n {
            return fail(format!("shape {} slice exceeds the arena", i));
        }
        // Children: nested in the parent slice, mutually disjoint.
        let mut child_area = 0usize;
        let mut spans: Vec<(usize, usize)> = Vec::new();
        let mut c = s.child;
        while let Some(cid) = c {
            let cs = tree.shape(cid);
            if cs.parent != Some(id) {
                return fail(format!("child {} does not point back to {}", cid.index(), i));
            }
            if cs.pixel_start < s.pixel_start || cs.pixel_start + cs.area > end {
                return fail(format!("child {} slice leaves parent {}", cid.index(), i));
            }
            child_area += cs.area;
            spans.push((cs.pixel_start, cs.pixel_start + cs.area));
            c = cs.sibling;
        }
        if child_area > s.area {
            return fail(format!("children of shape {} outgrow it", i));
        }
        private_total += s.area - child_area;
        spans.sort_unstable();
        for pair in spans.windows(2) {
            if pair[0].1 > pair[1].0 {
                return fail(format!("children of shape {} overlap", i));
            }
        }
    }
    if private_total != n {
        return fail(format!("private pixels sum to {} instead of {}", private_total, n));
    }

    // Index soundness: the indexed shape contains the pixel, no child of
    // it does, and the boundary flag says whether the shape reaches the
    // image frame.
    for i in 0..n {
        let id = tree.smallest_index()[i];
        let s = tree.shape(id);
        let k = pos[i];
        if k < s.pixel_start || k >= s.pixel_start + s.area {
            return fail(format!("pixel {} indexed by shape {} not containing it", i, id.index()));
        }
        let mut c = s.child;
        while let Some(cid) = c {
            let cs = tree.shape(cid);
            if k >= cs.pixel_start && k < cs.pixel_start + cs.area {
                return fail(format!("pixel {} belongs to a descendant of its indexed shape", i));
            }
            c = cs.sibling;
        }
    }
    for (i, s) in tree.shapes().iter().enumerate() {
        let touches = tree
            .pixels_of(NodeId::new(i))
            .iter()
            .any(|p| p.x == 0 || p.y == 0 || p.x as i32 == tree.width() - 1 || p.y as i32 == tree.height() - 1);
        if s.boundary != touches {
            return fail(format!("shape {} boundary flag is {} but frame contact is {}", i, s.boundary, touches));
        }
    }
    Ok(())
}

/// Check that every non-root shape's gray is strictly more extreme than
/// its parent's, on the side given by its level-set type. This holds for
/// the top-down extractors; the classical one keeps the synthetic root
/// and is excluded.
pub fn check_gray_monotone(tree: &ShapeTree) -> Result<(), String> {
    for (i, s) in tree.shapes().iter().enumerate() {
        let Some(parent) = s.parent else { continue };
        let pg = tree.shape(parent).gray;
        let ok = match s.level_set {
            LevelSetType::Inf => s.gray < pg,
            LevelSetType::Sup => s.gray > pg,
        };
        if !ok {
            return fail(format!(
                "shape {} ({:?}, gray {}) is not more extreme than its parent (gray {})",
                i, s.level_set, s.gray, pg
            ));
        }
    }
    Ok(())
}

/// Check that the tree reconstructs its input raster exactly.
pub fn check_reconstruction(tree: &ShapeTree, gray: &[u8]) -> Result<(), String> {
    let rebuilt = tree.build_image();
    if rebuilt != gray {
        let i = rebuilt
            .iter()
            .zip(gray)
            .position(|(a, b)| a != b)
            .unwrap_or(0);
        return fail(format!(
            "reconstruction differs at pixel {}: {} instead of {}",
            i, rebuilt[i], gray[i]
        ));
    }
    Ok(())
}

/// Identity of a shape independent of node numbering and sibling order:
/// smallest pixel in raster order plus area. Distinct shapes of one tree
/// never share both (nested shapes differ in area, disjoint ones in
/// pixels).
type ShapeKey = ((i16, i16), usize);

struct CanonShape {
    key: ShapeKey,
    level_set: LevelSetType,
    gray: u8,
    boundary: bool,
    pixels: Vec<(i16, i16)>,
    parent: Option<ShapeKey>,
}

fn canonical(tree: &ShapeTree) -> Vec<CanonShape> {
    let mut shapes: Vec<CanonShape> = (0..tree.len())
        .map(|i| {
            let id = NodeId::new(i);
            let s = tree.shape(id);
            let mut pixels: Vec<(i16, i16)> =
                tree.pixels_of(id).iter().map(|p| (p.y, p.x)).collect();
            pixels.sort_unstable();
            CanonShape {
                key: (pixels[0], pixels.len()),
                level_set: s.level_set,
                gray: s.gray,
                boundary: s.boundary,
                pixels,
                parent: None,
            }
        })
        .collect();
    let keys: Vec<ShapeKey> = shapes.iter().map(|s| s.key).collect();
    for i in 0..tree.len() {
        shapes[i].parent = tree.shapes()[i].parent.map(|p| keys[p.index()]);
    }
    shapes.sort_by_key(|s| s.key);
    shapes
}

/// Check that two trees describe the same decomposition: same shapes
/// (type, gray, boundary flag, exact pixel set) and an isomorphic parent
/// relation. Node numbering and sibling order may differ.
pub fn check_equivalent(a: &ShapeTree, b: &ShapeTree) -> Result<(), String> {
    if a.len() != b.len() {
        return fail(format!("shape counts differ: {} vs {}", a.len(), b.len()));
    }
    let ca = canonical(a);
    let cb = canonical(b);
    for (sa, sb) in ca.iter().zip(&cb) {
        if sa.key != sb.key || sa.pixels != sb.pixels {
            return fail(format!("no matching shape for key {:?}", sa.key));
        }
        if sa.level_set != sb.level_set || sa.gray != sb.gray || sa.boundary != sb.boundary {
            return fail(format!("shape {:?} differs in type, gray or boundary", sa.key));
        }
        if sa.parent != sb.parent {
            return fail(format!("shape {:?} has different parents", sa.key));
        }
    }
    Ok(())
}
