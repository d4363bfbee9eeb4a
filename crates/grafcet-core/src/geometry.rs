//! Geometric primitives for diagram layout and positioning.
//!
//! This module provides the geometric types the layout compiler uses to place
//! steps, transitions and gates, and to route connections between them.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in diagram space
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular bounding box defined by minimum and maximum coordinates
//!
//! # Coordinate System
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! The origin is the top-left corner and Y grows downward, so a GRAFCET chart
//! reads from top to bottom with increasing `y`.

use serde::Serialize;

/// A 2D point representing a position in diagram coordinate space.
///
/// # Examples
///
/// ```
/// # use grafcet_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Creates a new point with the specified x-coordinate
    pub fn with_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    /// Creates a new point with the specified y-coordinate
    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

/// Width and height of a diagram element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    /// Creates a new size with the specified dimensions
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height
    pub fn height(self) -> f32 {
        self.height
    }
}

/// An axis-aligned rectangle given by its top-left and bottom-right corners.
///
/// # Examples
///
/// ```
/// # use grafcet_core::geometry::{Bounds, Point, Size};
/// let bounds = Bounds::from_position(Point::new(10.0, 20.0), Size::new(40.0, 30.0));
///
/// assert_eq!(bounds.center_x(), 30.0);
/// assert_eq!(bounds.max_y(), 50.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Bounds {
    min: Point,
    max: Point,
}

impl Bounds {
    /// Creates bounds from a top-left position and a size.
    pub fn from_position(position: Point, size: Size) -> Self {
        Self {
            min: position,
            max: Point::new(position.x() + size.width(), position.y() + size.height()),
        }
    }

    pub fn min_x(self) -> f32 {
        self.min.x
    }

    pub fn min_y(self) -> f32 {
        self.min.y
    }

    pub fn max_x(self) -> f32 {
        self.max.x
    }

    pub fn max_y(self) -> f32 {
        self.max.y
    }

    /// Horizontal center line of the rectangle.
    pub fn center_x(self) -> f32 {
        (self.min.x + self.max.x) / 2.0
    }

    /// Midpoint of the top edge, where incoming connections attach.
    pub fn top_center(self) -> Point {
        Point::new(self.center_x(), self.min.y)
    }

    /// Midpoint of the bottom edge, where outgoing connections leave.
    pub fn bottom_center(self) -> Point {
        Point::new(self.center_x(), self.max.y)
    }

    /// Returns the smallest bounds containing both `self` and `other`.
    pub fn merge(self, other: Bounds) -> Self {
        Self {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_point_with_coordinates() {
        let p = Point::new(1.0, 2.0).with_x(5.0).with_y(-3.0);
        assert_eq!(p, Point::new(5.0, -3.0));
    }

    #[test]
    fn test_bounds_edges() {
        let bounds = Bounds::from_position(Point::new(-20.0, 100.0), Size::new(40.0, 10.0));

        assert!(approx_eq!(f32, bounds.center_x(), 0.0));
        assert_eq!(bounds.top_center(), Point::new(0.0, 100.0));
        assert_eq!(bounds.bottom_center(), Point::new(0.0, 110.0));
    }

    #[test]
    fn test_bounds_merge() {
        let a = Bounds::from_position(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        let b = Bounds::from_position(Point::new(50.0, -5.0), Size::new(10.0, 10.0));
        let merged = a.merge(b);

        assert_eq!(merged.min_x(), 0.0);
        assert_eq!(merged.min_y(), -5.0);
        assert_eq!(merged.max_x(), 60.0);
        assert_eq!(merged.max_y(), 10.0);
    }

    proptest! {
        #[test]
        fn prop_merge_contains_both(
            ax in -1000.0f32..1000.0, ay in -1000.0f32..1000.0,
            bx in -1000.0f32..1000.0, by in -1000.0f32..1000.0,
            w in 0.0f32..100.0, h in 0.0f32..100.0,
        ) {
            let a = Bounds::from_position(Point::new(ax, ay), Size::new(w, h));
            let b = Bounds::from_position(Point::new(bx, by), Size::new(w, h));
            let merged = a.merge(b);

            prop_assert!(merged.min_x() <= a.min_x() && merged.min_x() <= b.min_x());
            prop_assert!(merged.max_y() >= a.max_y() && merged.max_y() >= b.max_y());
        }
    }
}
