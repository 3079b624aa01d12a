//! Circular collision regions
//!
//! A collision is owned by exactly one entity and derives its center from the
//! owner's position. Pairwise dispatch lives in the scene; this is a naive
//! O(n²) scan that is only suited to small entity counts.

use serde::{Deserialize, Serialize};

use super::dimensions::Dimensions;
use super::vector::Point;

/// A circle attached to an entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    pub radius: f32,
    /// Fraction of the collision's bounding box placed at the owner position.
    /// (0.5, 0.5) shifts the circle up-left by one radius; (0, 0) centers it
    /// on the owner.
    pub pivot: Point,
}

impl Collision {
    pub const DEFAULT_PIVOT: Point = Point::new(0.5, 0.5);

    pub fn new(radius: f32) -> Self {
        Self {
            radius,
            pivot: Self::DEFAULT_PIVOT,
        }
    }

    /// Collision circle centered exactly on its owner
    pub fn centered(radius: f32) -> Self {
        Self {
            radius,
            pivot: Point::ORIGIN,
        }
    }

    /// Bounding box of the circle
    pub fn bounds(&self) -> Dimensions {
        Dimensions::new(self.radius * 2.0, self.radius * 2.0)
    }

    /// Circle center for an owner at `position`
    pub fn center(&self, position: Point) -> Point {
        position + -self.bounds().end().multiply_by(self.pivot.to_vector())
    }
}

/// Whether two collision circles overlap.
///
/// Strict: circles whose centers are exactly `r1 + r2` apart do not collide.
pub fn circles_overlap(a: &Collision, a_pos: Point, b: &Collision, b_pos: Point) -> bool {
    a.center(a_pos).distance(b.center(b_pos)) < a.radius + b.radius
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_pivot() {
        let owner = Point::new(100.0, 100.0);
        assert_eq!(Collision::centered(10.0).center(owner), owner);
        assert_eq!(Collision::new(10.0).center(owner), Point::new(90.0, 90.0));
    }

    #[test]
    fn test_touching_circles_do_not_collide() {
        let a = Collision::centered(10.0);
        let b = Collision::centered(15.0);
        let pa = Point::new(0.0, 0.0);

        assert!(!circles_overlap(&a, pa, &b, Point::new(25.0, 0.0)));
        assert!(circles_overlap(&a, pa, &b, Point::new(25.0 - 1e-3, 0.0)));
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = Collision::new(8.0);
        let b = Collision::centered(4.0);
        let pa = Point::new(3.0, 7.0);
        let pb = Point::new(-2.0, 1.0);
        assert_eq!(
            circles_overlap(&a, pa, &b, pb),
            circles_overlap(&b, pb, &a, pa)
        );
    }
}
