use crate::math::{Rotation, Vector2};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Position and orientation of a body in the plane
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Transform {
    /// Position of the body origin
    pub position: Vector2,

    /// Orientation around the body origin
    pub rotation: Rotation,
}

impl Transform {
    #[inline]
    pub fn new(position: Vector2, rotation: Rotation) -> Self {
        Self { position, rotation }
    }

    #[inline]
    pub fn identity() -> Self {
        Self::default()
    }

    #[inline]
    pub fn from_position(position: Vector2) -> Self {
        Self { position, rotation: Rotation::identity() }
    }

    /// Maps a body-local point to world space
    #[inline]
    pub fn transform_point(&self, local: &Vector2) -> Vector2 {
        self.rotation.rotate(local) + self.position
    }

    /// Maps a world point into body-local space
    #[inline]
    pub fn inverse_transform_point(&self, world: &Vector2) -> Vector2 {
        let d = *world - self.position;
        Vector2::new(self.rotation.x_axis().dot(&d), self.rotation.y_axis().dot(&d))
    }

    #[inline]
    pub fn transform_direction(&self, local: &Vector2) -> Vector2 {
        self.rotation.rotate(local)
    }

    #[inline]
    pub fn inverse_transform_direction(&self, world: &Vector2) -> Vector2 {
        self.rotation.inverse_rotate(world)
    }

    /// Returns `self` applied after `other`
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            position: self.transform_point(&other.position),
            rotation: self.rotation.compose(&other.rotation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn local_world_roundtrip() {
        let t = Transform::new(Vector2::new(3.0, -1.0), Rotation::new(0.7));
        let p = Vector2::new(0.25, 2.0);
        let back = t.inverse_transform_point(&t.transform_point(&p));
        assert_relative_eq!(back.x, p.x, epsilon = 1e-5);
        assert_relative_eq!(back.y, p.y, epsilon = 1e-5);
    }
}
