use crate::core::BodyHandle;
use crate::math::Vector2;

/// One contact point between two overlapping bodies.
///
/// `normal` is a unit vector pointing from `body_a` toward `body_b`.
/// `start` is the deepest point of B's boundary (inside A) and `end` the
/// deepest point of A's boundary (inside B), so `end - start == normal * depth`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Body the normal points away from
    pub body_a: BodyHandle,

    /// Body the normal points toward
    pub body_b: BodyHandle,

    /// Deepest point of B's boundary, in world space
    pub start: Vector2,

    /// Deepest point of A's boundary, in world space
    pub end: Vector2,

    /// Unit contact normal from A toward B
    pub normal: Vector2,

    /// Penetration depth, non-negative
    pub depth: f32,
}

impl Contact {
    /// Midpoint between the two surface points
    pub fn midpoint(&self) -> Vector2 {
        self.start.lerp(&self.end, 0.5)
    }
}
