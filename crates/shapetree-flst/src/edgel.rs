//! Edgel: the directed boundary element between adjacent pixels
//!
//! An edgel is a unit-length oriented edge with an *interior* pixel on its
//! left. Tracing a shape's level line is repeated application of
//! [`Edgel::next`], which closes on itself: starting from any cardinal
//! edgel of the line, the trace returns to it after one full loop.
//!
//! The four diagonal directions are transient turn states, never a stable
//! edgel on a traced boundary: a turn that needs an intermediate step
//! parks the edgel on the corresponding diagonal and the following `next`
//! call completes the rotation. Which side uses the intermediate depends
//! on the connectivity: in 4-connectivity right turns do, in
//! 8-connectivity left turns do.

use shapetree_core::{Connectivity, LevelSetType, Point, Raster};

/// Direction of an edgel
///
/// Cardinal values are true oriented edges; diagonal values are the
/// intermediate states entered mid-turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Direction {
    East = 0,
    North = 1,
    West = 2,
    South = 3,
    NorthEast = 4,
    NorthWest = 5,
    SouthWest = 6,
    SouthEast = 7,
}

/// Offset to the exterior pixel, indexed by direction
const EXTERIOR: [(i16, i16); 8] = [
    (0, 1),   // East
    (1, 0),   // North
    (0, -1),  // West
    (-1, 0),  // South
    (1, 1),   // NorthEast
    (1, -1),  // NorthWest
    (-1, -1), // SouthWest
    (-1, 1),  // SouthEast
];

/// Offset of one straight step, indexed by (cardinal) direction
const STRAIGHT: [(i16, i16); 4] = [(1, 0), (0, -1), (-1, 0), (0, 1)];

impl Direction {
    #[inline]
    fn from_index(idx: u8) -> Self {
        match idx % 8 {
            0 => Direction::East,
            1 => Direction::North,
            2 => Direction::West,
            3 => Direction::South,
            4 => Direction::NorthEast,
            5 => Direction::NorthWest,
            6 => Direction::SouthWest,
            _ => Direction::SouthEast,
        }
    }

    /// Whether this is one of the transient diagonal states.
    #[inline]
    pub fn is_diagonal(self) -> bool {
        self as u8 >= 4
    }

    /// Direction rotated by 180°, staying in the same cardinal/diagonal
    /// group.
    #[inline]
    pub fn reversed(self) -> Self {
        let d = self as u8;
        if self.is_diagonal() {
            Direction::from_index(4 + (d % 4 + 2) % 4)
        } else {
            Direction::from_index((d + 2) % 4)
        }
    }
}

/// Directed unit boundary element with its interior pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edgel {
    /// Interior pixel, on the left of the travel direction
    pub pt: Point,
    /// Travel direction
    pub dir: Direction,
}

impl Edgel {
    /// Create an edgel at `(x, y)` heading `dir`.
    #[inline]
    pub fn new(x: i16, y: i16, dir: Direction) -> Self {
        Edgel {
            pt: Point::new(x, y),
            dir,
        }
    }

    /// Grid vertex the edgel starts from. Cardinal directions only.
    pub fn origin(&self) -> Point {
        debug_assert!(!self.dir.is_diagonal());
        let mut p = self.pt;
        if matches!(self.dir, Direction::East | Direction::North) {
            p.y += 1;
        }
        if matches!(self.dir, Direction::North | Direction::West) {
            p.x += 1;
        }
        p
    }

    /// The exterior pixel, or `None` for an image-frame edgel.
    pub fn exterior(&self, im: &Raster<'_>) -> Option<Point> {
        let (dx, dy) = EXTERIOR[self.dir as usize];
        let x = self.pt.x as i32 + dx as i32;
        let y = self.pt.y as i32 + dy as i32;
        if im.contains(x, y) {
            Some(Point::new(x as i16, y as i16))
        } else {
            None
        }
    }

    /// Swap interior and exterior, rotating 180°.
    ///
    /// Fails, leaving the edgel unchanged, when there is no exterior.
    pub fn inverse(&mut self, im: &Raster<'_>) -> bool {
        match self.exterior(im) {
            Some(ext) => {
                self.pt = ext;
                self.dir = self.dir.reversed();
                true
            }
            None => false,
        }
    }

    /// Advance the interior pixel one step along the direction.
    ///
    /// Cardinal directions only. Returns `false` when the step leaves the
    /// image; the pixel is advanced regardless and must not be read in
    /// that case.
    pub fn go_straight(&mut self, im: &Raster<'_>) -> bool {
        debug_assert!(!self.dir.is_diagonal());
        let (dx, dy) = STRAIGHT[self.dir as usize];
        self.pt.x += dx;
        self.pt.y += dy;
        im.contains(self.pt.x as i32, self.pt.y as i32)
    }

    /// Begin a left turn.
    fn turn_left(&mut self, conn: Connectivity) {
        let d = self.dir as u8;
        self.dir = match conn {
            Connectivity::Eight => Direction::from_index(d + 4),
            Connectivity::Four => Direction::from_index((d + 1) % 4),
        };
    }

    /// Begin a right turn.
    fn turn_right(&mut self, conn: Connectivity) {
        let d = self.dir as u8;
        self.dir = match conn {
            Connectivity::Eight => Direction::from_index((d + 3) % 4),
            Connectivity::Four => Direction::from_index(4 + (d + 3) % 4),
        };
    }

    /// Complete a turn parked on a diagonal state.
    fn finish_turn(&mut self, im: &Raster<'_>, conn: Connectivity) {
        let d = self.dir as u8 - 4;
        match conn {
            Connectivity::Four => {
                self.dir = Direction::from_index(d);
                self.go_straight(im);
            }
            Connectivity::Eight => {
                self.dir = Direction::from_index((d + 1) % 4);
            }
        }
    }

    /// Move to the next edgel along the level line of a shape of type
    /// `t` at threshold `level`.
    ///
    /// Membership is strict (`gray < level` for Inf, `gray > level` for
    /// Sup) and cells outside the image count as outside the shape.
    pub fn next(&mut self, im: &Raster<'_>, t: LevelSetType, level: i32) {
        let conn = t.connectivity();
        if self.dir.is_diagonal() {
            self.finish_turn(im, conn);
            return;
        }
        let mut left = *self;
        let mut right = *self;
        let mut left_in = left.go_straight(im);
        let mut right_in = false;
        if left_in {
            left_in = t.is_in(im.gray(left.pt) as i32, level);
            if let Some(ext) = left.exterior(im) {
                right.pt = ext;
                right_in = t.is_in(im.gray(ext) as i32, level);
            }
        }
        if left_in && !right_in {
            // The line continues straight ahead.
            *self = left;
        } else if !left_in && (!right_in || conn == Connectivity::Four) {
            // The line bends toward the exterior.
            self.turn_left(conn);
        } else {
            // The line bends toward the interior; the pivot cell is the
            // straight-ahead one in 4-connectivity, its exterior in 8.
            *self = if conn == Connectivity::Four { left } else { right };
            self.turn_right(conn);
        }
    }
}
