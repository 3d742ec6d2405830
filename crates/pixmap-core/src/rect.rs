//! Rectangle and position types for region access.
//!
//! Coordinates follow the image convention: origin at the top-left corner,
//! X grows to the right, Y grows downward. Fields are signed so that
//! negative caller input reaches validation instead of wrapping.
//!
//! ```text
//! (0,0) ────────► X
//!   │
//!   │   ┌──────────┐
//!   │   │  region  │
//!   │   └──────────┘
//!   ▼
//!   Y
//! ```
//!
//! # Usage
//!
//! ```rust
//! use pixmap_core::{Rect, Size};
//!
//! let bounds = Size::new(100, 50);
//! let rect = Rect::new(10, 20, 30, 10);
//! assert!(rect.fits_within(bounds));
//! assert_eq!(rect.right(), 40);
//! assert!(!Rect::new(90, 0, 20, 10).fits_within(bounds));
//! ```

use crate::descriptor::Size;

/// A pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    /// Column
    pub x: i32,
    /// Row
    pub y: i32,
}

impl Position {
    /// Creates a position.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A rectangle defined by origin (x, y) and dimensions (width, height).
///
/// Left/top edges are inclusive, right/bottom edges exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// X coordinate of the left edge
    pub x: i32,
    /// Y coordinate of the top edge
    pub y: i32,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl Rect {
    /// Creates a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle covering a whole image of `size`.
    #[inline]
    pub const fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    /// X coordinate of the right edge (exclusive), widened to avoid overflow.
    #[inline]
    pub const fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Y coordinate of the bottom edge (exclusive), widened to avoid overflow.
    #[inline]
    pub const fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Top-left corner.
    #[inline]
    pub const fn origin(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Dimensions of the rectangle.
    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns `true` if either dimension is non-positive.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Returns `true` if the point lies inside the rectangle.
    #[inline]
    pub const fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && (px as i64) < self.right() && py >= self.y && (py as i64) < self.bottom()
    }

    /// Returns `true` if the rectangle is non-empty and lies entirely inside
    /// an image of `bounds`.
    pub const fn fits_within(&self, bounds: Size) -> bool {
        !self.is_empty()
            && self.x >= 0
            && self.y >= 0
            && self.right() <= bounds.width as i64
            && self.bottom() <= bounds.height as i64
    }

    /// Intersection with another rectangle, or `None` if they do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right <= x as i64 || bottom <= y as i64 {
            return None;
        }
        Some(Rect::new(x, y, (right - x as i64) as i32, (bottom - y as i64) as i32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let rect = Rect::new(10, 20, 100, 50);
        assert_eq!(rect.right(), 110);
        assert_eq!(rect.bottom(), 70);
        assert_eq!(rect.origin(), Position::new(10, 20));
        assert_eq!(rect.size(), Size::new(100, 50));
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10, 10, 100, 100);
        assert!(rect.contains(10, 10));
        assert!(rect.contains(109, 109));
        assert!(!rect.contains(110, 110));
        assert!(!rect.contains(9, 50));
    }

    #[test]
    fn test_fits_within() {
        let bounds = Size::new(3, 4);
        assert!(Rect::from_size(bounds).fits_within(bounds));
        assert!(Rect::new(1, 1, 2, 3).fits_within(bounds));
        assert!(!Rect::new(1, 1, 3, 3).fits_within(bounds));
        assert!(!Rect::new(-1, 0, 1, 1).fits_within(bounds));
        assert!(!Rect::new(0, 0, 0, 1).fits_within(bounds));
        assert!(!Rect::new(i32::MAX, 0, i32::MAX, 1).fits_within(bounds));
    }

    #[test]
    fn test_intersect() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 50, 100, 100);
        assert_eq!(a.intersect(&b), Some(Rect::new(50, 50, 50, 50)));
        assert_eq!(a.intersect(&Rect::new(200, 200, 10, 10)), None);
    }

    #[test]
    fn test_empty() {
        assert!(Rect::default().is_empty());
        assert!(Rect::new(0, 0, -1, 5).is_empty());
        assert!(!Rect::new(0, 0, 1, 1).is_empty());
    }
}
