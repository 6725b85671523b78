use bitflags::bitflags;

use crate::math::{Aabb, Transform, Vector2};

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// RGBA color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Builds an opaque color from `0xRRGGBB`
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::new(channel(16), channel(8), channel(0))
    }

    /// Fill for static bodies (#ffb86c)
    pub fn static_body() -> Self {
        Self::from_hex(0xffb86c)
    }

    /// Fill for dynamic bodies (#8be9fd)
    pub fn dynamic_body() -> Self {
        Self::from_hex(0x8be9fd)
    }

    pub const AABB: Color = Color::new(0.9, 0.3, 0.9);

    /// Joint segments (#ff79c6)
    pub fn joint() -> Self {
        Self::from_hex(0xff79c6)
    }

    /// Broad-phase tree node color, fading from green to red with depth
    pub fn tree_depth(depth: usize) -> Self {
        let t = (depth as f32 * 0.1).min(1.0);
        Self::new(t, 1.0 - t, 0.0)
    }
}

bitflags! {
    /// Selects what [`crate::core::PhysicsWorld::debug_draw`] emits
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DrawFlags: u32 {
        /// Filled body shapes
        const SHAPE = 0x01;

        /// Polygon outlines with spokes from the centroid
        const MESH = 0x02;

        /// Tight body bounds
        const AABB = 0x04;

        /// Broad-phase internal volumes
        const AABB_TREE = 0x08;

        /// Body frames
        const TRANSFORM = 0x10;

        const JOINT = 0x20;
    }
}

impl Default for DrawFlags {
    fn default() -> Self {
        DrawFlags::SHAPE | DrawFlags::JOINT
    }
}

/// Rendering backend for world visualization.
///
/// The engine only describes primitives; an application implements this
/// trait for whatever canvas it has.
pub trait DebugDraw {
    /// What the world should emit
    fn flags(&self) -> DrawFlags;

    /// Closed outline through `vertices`
    fn draw_polygon(&mut self, vertices: &[Vector2], color: Color);

    fn draw_solid_polygon(&mut self, vertices: &[Vector2], color: Color);

    fn draw_circle(&mut self, center: Vector2, radius: f32, color: Color);

    /// Filled circle; `axis` marks the body's rotation
    fn draw_solid_circle(&mut self, center: Vector2, radius: f32, axis: Vector2, color: Color);

    fn draw_segment(&mut self, p1: Vector2, p2: Vector2, color: Color);

    /// Local axes at the transform's origin
    fn draw_transform(&mut self, transform: &Transform);
}

/// Corners of a box in counter-clockwise order
pub(crate) fn aabb_corners(aabb: &Aabb) -> [Vector2; 4] {
    [
        aabb.min,
        Vector2::new(aabb.max.x, aabb.min.y),
        aabb.max,
        Vector2::new(aabb.min.x, aabb.max.y),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hex_colors() {
        let c = Color::from_hex(0xff8000);
        assert_relative_eq!(c.r, 1.0);
        assert_relative_eq!(c.g, 128.0 / 255.0);
        assert_relative_eq!(c.b, 0.0);
    }

    #[test]
    fn tree_colors_saturate() {
        assert_eq!(Color::tree_depth(0), Color::new(0.0, 1.0, 0.0));
        assert_eq!(Color::tree_depth(25), Color::new(1.0, 0.0, 0.0));
    }
}
