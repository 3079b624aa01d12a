//! Points and vectors in screen space
//!
//! A `Point` is a location, a `Vector2` is a displacement. Both are plain
//! `Copy` values; mutation that must be observable or vetoable goes through
//! [`Guarded`](super::Guarded) instead of living inside the value.
//!
//! Angles are in degrees and follow the canvas convention (y grows down, so a
//! positive angle turns clockwise on screen).

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::to_radians;

/// A location in screen space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Move this point by a displacement
    pub fn offset_by(&mut self, vector: Vector2) -> &mut Self {
        self.x += vector.x;
        self.y += vector.y;
        self
    }

    /// Displacement from the origin to this point
    pub fn to_vector(self) -> Vector2 {
        Vector2::new(self.x, self.y)
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f32 {
        (other - self).length()
    }
}

impl Add<Vector2> for Point {
    type Output = Point;

    fn add(self, rhs: Vector2) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign<Vector2> for Point {
    fn add_assign(&mut self, rhs: Vector2) {
        self.offset_by(rhs);
    }
}

impl Sub for Point {
    type Output = Vector2;

    fn sub(self, rhs: Point) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A displacement in screen space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };
    /// Toward the top of the screen (canvas y grows down)
    pub const UP: Vector2 = Vector2 { x: 0.0, y: -1.0 };
    pub const RIGHT: Vector2 = Vector2 { x: 1.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Multiply both components by `factor`
    pub const fn scale(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Random vector with both components in [0, 1)
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::new(rng.random::<f32>(), rng.random::<f32>())
    }

    #[inline]
    pub fn length(self) -> f32 {
        Vec2::from(self).length()
    }

    /// Unit vector in the same direction.
    ///
    /// A zero-length vector yields NaN components; callers must not normalize
    /// degenerate vectors.
    pub fn normalized(self) -> Self {
        let length = self.length();
        Self::new(self.x / length, self.y / length)
    }

    #[inline]
    pub fn dot(self, other: Vector2) -> f32 {
        Vec2::from(self).dot(Vec2::from(other))
    }

    /// Rotate about the origin by `degrees`
    pub fn rotate(self, degrees: f32) -> Self {
        Vec2::from_angle(to_radians(degrees)).rotate(self.into()).into()
    }

    /// Component-wise product
    pub fn multiply_by(self, other: Vector2) -> Self {
        Self::new(self.x * other.x, self.y * other.y)
    }

    pub fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

impl From<Vector2> for Vec2 {
    fn from(v: Vector2) -> Self {
        Vec2::new(v.x, v.y)
    }
}

impl From<Vec2> for Vector2 {
    fn from(v: Vec2) -> Self {
        Vector2::new(v.x, v.y)
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vector2 {
    type Output = Vector2;

    fn mul(self, factor: f32) -> Vector2 {
        Vector2::new(self.x * factor, self.y * factor)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Vector2 {
        Vector2::new(-self.x, -self.y)
    }
}
