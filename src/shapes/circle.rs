#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// A circle centered on the body origin
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CircleShape {
    radius: f32,
}

impl CircleShape {
    /// Creates a circle; negative radii are clamped to zero
    pub fn new(radius: f32) -> Self {
        Self { radius: radius.max(0.0) }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f32) {
        self.radius = radius.max(0.0);
    }

    /// Moment of inertia per unit mass, `r² / 2`
    pub fn moment_of_inertia(&self) -> f32 {
        0.5 * self.radius * self.radius
    }
}
