//! Planar vectors and headings.
//!
//! [`Point`] is a plain 2D vector used for positions, velocities, offsets and
//! forces. [`Angle`] is a heading in degrees. A heading of zero points "up"
//! the screen, i.e. toward negative `y`, and positive angles turn clockwise.

use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use rand::Rng;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A 2D vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal component.
    pub x: f64,
    /// Vertical component (positive is "down").
    pub y: f64,
}

impl Point {
    /// The zero vector.
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    /// Construct a point from its components.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    #[inline]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Squared length, avoiding the square root.
    #[inline]
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Unit vector in the same direction. The zero vector stays zero.
    pub fn unit(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            Self::ZERO
        } else {
            self / len
        }
    }

    /// Dot product.
    #[inline]
    pub fn dot(self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (the `z` component of the 3D cross product).
    #[inline]
    pub fn cross(self, other: Point) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Whether both components are exactly zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Point {
    fn sub_assign(&mut self, rhs: Point) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Point> for f64 {
    type Output = Point;
    fn mul(self, rhs: Point) -> Point {
        rhs * self
    }
}

impl MulAssign<f64> for Point {
    fn mul_assign(&mut self, rhs: f64) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Div<f64> for Point {
    type Output = Point;
    fn div(self, rhs: f64) -> Point {
        Point::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

// ---------------------------------------------------------------------------
// Angle
// ---------------------------------------------------------------------------

/// A heading in degrees, normalized to `[-180, 180)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Angle(f64);

impl Angle {
    /// Construct a heading from degrees.
    pub fn from_degrees(degrees: f64) -> Self {
        Self(normalize(degrees))
    }

    /// A uniformly random heading.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_degrees(rng.gen_range(0.0..360.0))
    }

    /// The heading in degrees.
    #[inline]
    pub fn degrees(self) -> f64 {
        self.0
    }

    /// Unit vector pointing along this heading.
    pub fn unit(self) -> Point {
        let (sin, cos) = self.0.to_radians().sin_cos();
        Point::new(sin, -cos)
    }

    /// Rotate `point` by this heading. Rotating `(0, -1)` yields [`unit`](Self::unit).
    pub fn rotate(self, point: Point) -> Point {
        let (sin, cos) = self.0.to_radians().sin_cos();
        Point::new(point.x * cos - point.y * sin, point.x * sin + point.y * cos)
    }
}

impl Add<f64> for Angle {
    type Output = Angle;
    fn add(self, degrees: f64) -> Angle {
        Angle::from_degrees(self.0 + degrees)
    }
}

impl AddAssign<f64> for Angle {
    fn add_assign(&mut self, degrees: f64) {
        *self = *self + degrees;
    }
}

fn normalize(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
