//! Pixel coordinates
//!
//! A pixel is addressed by a pair of 16-bit signed coordinates, top-left
//! origin, `x` growing right and `y` growing down. Raster constructors
//! reject dimensions that do not fit.

/// A pixel position in the image plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// Column index
    pub x: i16,
    /// Row index
    pub y: i16,
}

impl Point {
    /// Create a new point
    #[inline]
    pub fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }
}

impl From<(i16, i16)> for Point {
    fn from((x, y): (i16, i16)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_from_tuple() {
        let p: Point = (3, 7).into();
        assert_eq!(p, Point::new(3, 7));
    }
}
