//! Geometric primitives in device pixels: Point, Size, Rect.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::ops::{Add, Sub};

/// A 2D point with x and y coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Origin point (0, 0)
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate Euclidean distance to another point.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Angle of this point as seen from `center`, in radians.
    ///
    /// Canvas convention: y grows downward, so 0 is 3 o'clock and angles
    /// increase clockwise. 12 o'clock is `-π/2`.
    #[must_use]
    pub fn angle_from(&self, center: &Self) -> f64 {
        (self.y - center.y).atan2(self.x - center.x)
    }

    /// Point at `radius` and `angle` around this point.
    #[must_use]
    pub fn polar(&self, radius: f64, angle: f64) -> Self {
        Self::new(
            radius.mul_add(angle.cos(), self.x),
            radius.mul_add(angle.sin(), self.y),
        )
    }

    /// Scale both coordinates by a factor.
    #[must_use]
    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl Default for Point {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A 2D size with width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Size {
    /// Zero size
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Create a new size.
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Calculate area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Scale size by a factor.
    #[must_use]
    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::ZERO
    }
}

/// A rectangle defined by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X position of top-left corner
    pub x: f64,
    /// Y position of top-left corner
    pub y: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create from size at origin.
    #[must_use]
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Get the area.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Get center point.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if a point is inside the rectangle (inclusive).
    #[must_use]
    pub fn contains_point(&self, point: &Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Area shared with another rectangle (0 when disjoint or touching).
    #[must_use]
    pub fn intersection_area(&self, other: &Self) -> f64 {
        let w = self.right().min(other.right()) - self.x.max(other.x);
        let h = self.bottom().min(other.bottom()) - self.y.max(other.y);
        if w > 0.0 && h > 0.0 {
            w * h
        } else {
            0.0
        }
    }

    /// Create a new rectangle inset by the given amount on all sides.
    ///
    /// Width and height never go negative; an over-inset rectangle collapses
    /// onto its center line.
    #[must_use]
    pub fn inset(&self, amount: f64) -> Self {
        let width = 2.0f64.mul_add(-amount, self.width).max(0.0);
        let height = 2.0f64.mul_add(-amount, self.height).max(0.0);
        Self::new(
            self.x + (self.width - width) / 2.0,
            self.y + (self.height - height) / 2.0,
            width,
            height,
        )
    }

    /// Whether the rectangle covers at least one device pixel in each direction.
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        self.width >= 1.0 && self.height >= 1.0
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

/// Normalize an angle into `[reference, reference + 2π)`.
#[must_use]
pub fn normalize_angle(angle: f64, reference: f64) -> f64 {
    let mut a = (angle - reference).rem_euclid(TAU) + reference;
    if a >= reference + TAU {
        a -= TAU;
    }
    a
}
