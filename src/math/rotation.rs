use crate::math::Vector2;
use std::fmt;
use std::ops::{Add, AddAssign};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A planar rotation stored as the sine and cosine of its angle.
///
/// Composing rotations multiplies the underlying unit complex numbers, so
/// the angle never has to be wrapped. `normalize` restores unit length after
/// long sequences of small compositions.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Rotation {
    /// Sine of the angle
    pub sin: f32,

    /// Cosine of the angle
    pub cos: f32,
}

impl Rotation {
    /// Creates a rotation from an angle in radians
    #[inline]
    pub fn new(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self { sin, cos }
    }

    #[inline]
    pub const fn identity() -> Self {
        Self { sin: 0.0, cos: 1.0 }
    }

    /// Builds a rotation from raw sine/cosine values, normalizing them
    pub fn from_sin_cos(sin: f32, cos: f32) -> Self {
        let mut rotation = Self { sin, cos };
        rotation.normalize();
        rotation
    }

    /// Angle in `[-PI, PI]`
    #[inline]
    pub fn angle(&self) -> f32 {
        self.sin.atan2(self.cos)
    }

    /// World direction of the local x axis
    #[inline]
    pub fn x_axis(&self) -> Vector2 {
        Vector2::new(self.cos, self.sin)
    }

    /// World direction of the local y axis
    #[inline]
    pub fn y_axis(&self) -> Vector2 {
        Vector2::new(-self.sin, self.cos)
    }

    /// Returns the composition `self` followed by `other`
    #[inline]
    pub fn compose(&self, other: &Rotation) -> Self {
        Self {
            sin: self.sin * other.cos + self.cos * other.sin,
            cos: self.cos * other.cos - self.sin * other.sin,
        }
    }

    #[inline]
    pub fn inverse(&self) -> Self {
        Self { sin: -self.sin, cos: self.cos }
    }

    /// Rescales (sin, cos) back onto the unit circle
    pub fn normalize(&mut self) {
        let length = (self.sin * self.sin + self.cos * self.cos).sqrt();
        if length > crate::math::EPSILON {
            self.sin /= length;
            self.cos /= length;
        } else {
            *self = Self::identity();
        }
    }

    /// Rotates a vector from local into world orientation
    #[inline]
    pub fn rotate(&self, v: &Vector2) -> Vector2 {
        Vector2::new(self.cos * v.x - self.sin * v.y, self.sin * v.x + self.cos * v.y)
    }

    /// Rotates a vector from world into local orientation
    #[inline]
    pub fn inverse_rotate(&self, v: &Vector2) -> Vector2 {
        Vector2::new(self.cos * v.x + self.sin * v.y, -self.sin * v.x + self.cos * v.y)
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Add for Rotation {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        self.compose(&rhs)
    }
}

/// Advances the rotation by an angle in radians
impl AddAssign<f32> for Rotation {
    #[inline]
    fn add_assign(&mut self, angle: f32) {
        *self = self.compose(&Rotation::new(angle));
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} rad", self.angle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn composition_adds_angles() {
        let r = Rotation::new(0.4) + Rotation::new(0.5);
        assert_relative_eq!(r.angle(), 0.9, epsilon = 1e-6);
    }

    #[test]
    fn axes_are_orthonormal() {
        let r = Rotation::new(1.2);
        assert_relative_eq!(r.x_axis().dot(&r.y_axis()), 0.0, epsilon = 1e-6);
        assert_relative_eq!(r.x_axis().length(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn normalize_keeps_unit_length_after_many_increments() {
        let mut r = Rotation::identity();
        for _ in 0..10_000 {
            r += 0.001;
        }
        r.normalize();
        assert_relative_eq!(r.sin * r.sin + r.cos * r.cos, 1.0, epsilon = 1e-6);
        assert_relative_eq!(r.angle(), 10.0 - 4.0 * std::f32::consts::PI, epsilon = 1e-2);
    }
}
