//! Size pairs and vetoable value cells

use std::fmt;

use serde::{Deserialize, Serialize};

use super::vector::{Point, Vector2};

/// A width/height pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f32,
    pub height: f32,
}

impl Dimensions {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Vector from the top-left corner to the bottom-right corner
    pub fn end(&self) -> Vector2 {
        Vector2::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Area in pixels
    pub fn pixels(&self) -> f32 {
        self.width * self.height
    }

    /// Whether a point lies inside these bounds grown by `margin` on every side
    pub fn contains_with_margin(&self, point: Point, margin: f32) -> bool {
        point.x > -margin
            && point.x < self.width + margin
            && point.y > -margin
            && point.y < self.height + margin
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Observer deciding whether a proposed value is accepted
pub type Validator<T> = Box<dyn Fn(&T) -> bool>;

/// A value whose updates pass through a validator.
///
/// `update` reports whether the value changed; a rejected update leaves the
/// stored value untouched.
pub struct Guarded<T> {
    value: T,
    validator: Validator<T>,
}

impl<T: Copy + PartialEq> Guarded<T> {
    /// Cell that consults `validator` before each update
    pub fn with_validator(value: T, validator: impl Fn(&T) -> bool + 'static) -> Self {
        Self {
            value,
            validator: Box::new(validator),
        }
    }

    pub fn get(&self) -> T {
        self.value
    }

    /// Propose a new value. Returns true if the stored value is now `value`.
    pub fn update(&mut self, value: T) -> bool {
        if self.value == value {
            return true;
        }
        if !(self.validator)(&value) {
            return false;
        }
        self.value = value;
        true
    }
}

impl<T: fmt::Debug> fmt::Debug for Guarded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Guarded")
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}
