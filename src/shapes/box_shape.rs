use crate::shapes::PolygonShape;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// An axis-aligned (in body space) rectangle, handled as a four-vertex polygon
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct BoxShape {
    width: f32,
    height: f32,
    polygon: PolygonShape,
}

impl BoxShape {
    /// Creates a box of the given full dimensions, centered on the body origin
    pub fn new(width: f32, height: f32) -> Self {
        let width = width.max(0.0);
        let height = height.max(0.0);
        Self {
            width,
            height,
            polygon: PolygonShape::rectangle(width, height),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// The polygon used by collision detection
    pub fn polygon(&self) -> &PolygonShape {
        &self.polygon
    }

    pub(crate) fn polygon_mut(&mut self) -> &mut PolygonShape {
        &mut self.polygon
    }

    /// `(w² + h²) / 12`
    pub fn moment_of_inertia(&self) -> f32 {
        (self.width * self.width + self.height * self.height) / 12.0
    }
}
