use crate::math::{Aabb, Transform, Vector2};
use crate::shapes::{BoxShape, CircleShape, PolygonShape};
use crate::Result;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Kind tag of a [`Shape`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ShapeType {
    Circle,
    Polygon,
    Box,
}

/// Collision geometry attached to a body.
///
/// Cloning a shape deep-copies its vertex buffers, so every body owns an
/// independent copy of the geometry it was created with.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Shape {
    Circle(CircleShape),
    Polygon(PolygonShape),
    Box(BoxShape),
}

impl Shape {
    pub fn circle(radius: f32) -> Self {
        Shape::Circle(CircleShape::new(radius))
    }

    /// Convex polygon from counter-clockwise vertices; fails with fewer than 3
    pub fn polygon(vertices: Vec<Vector2>) -> Result<Self> {
        Ok(Shape::Polygon(PolygonShape::new(vertices)?))
    }

    pub fn rectangle(width: f32, height: f32) -> Self {
        Shape::Box(BoxShape::new(width, height))
    }

    pub fn shape_type(&self) -> ShapeType {
        match self {
            Shape::Circle(_) => ShapeType::Circle,
            Shape::Polygon(_) => ShapeType::Polygon,
            Shape::Box(_) => ShapeType::Box,
        }
    }

    /// Moment of inertia per unit mass
    pub fn moment_of_inertia(&self) -> f32 {
        match self {
            Shape::Circle(circle) => circle.moment_of_inertia(),
            Shape::Polygon(polygon) => polygon.moment_of_inertia(),
            Shape::Box(b) => b.moment_of_inertia(),
        }
    }

    /// Refreshes cached world vertices; a no-op for circles
    pub fn update_vertices(&mut self, transform: &Transform) {
        match self {
            Shape::Circle(_) => {}
            Shape::Polygon(polygon) => polygon.update_vertices(transform),
            Shape::Box(b) => b.polygon_mut().update_vertices(transform),
        }
    }

    /// Tight world bounds; polygon bounds rely on up-to-date world vertices
    pub fn compute_aabb(&self, transform: &Transform) -> Aabb {
        match self {
            Shape::Circle(circle) => {
                let r = circle.radius();
                Aabb::from_center_half_extents(transform.position, Vector2::new(r, r))
            }
            _ => self
                .as_polygon()
                .and_then(|polygon| Aabb::from_points(polygon.world_vertices()))
                .unwrap_or_else(|| Aabb::new(transform.position, transform.position)),
        }
    }

    pub fn as_circle(&self) -> Option<&CircleShape> {
        match self {
            Shape::Circle(circle) => Some(circle),
            _ => None,
        }
    }

    /// Polygon view of polygon and box shapes
    pub fn as_polygon(&self) -> Option<&PolygonShape> {
        match self {
            Shape::Circle(_) => None,
            Shape::Polygon(polygon) => Some(polygon),
            Shape::Box(b) => Some(b.polygon()),
        }
    }

    pub fn is_polygon(&self) -> bool {
        self.as_polygon().is_some()
    }
}

impl From<CircleShape> for Shape {
    fn from(circle: CircleShape) -> Self {
        Shape::Circle(circle)
    }
}

impl From<PolygonShape> for Shape {
    fn from(polygon: PolygonShape) -> Self {
        Shape::Polygon(polygon)
    }
}

impl From<BoxShape> for Shape {
    fn from(b: BoxShape) -> Self {
        Shape::Box(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Rotation;
    use approx::assert_relative_eq;

    #[test]
    fn inertia_formulas() {
        assert_relative_eq!(Shape::circle(2.0).moment_of_inertia(), 2.0);
        assert_relative_eq!(Shape::rectangle(3.0, 4.0).moment_of_inertia(), 25.0 / 12.0);
    }

    #[test]
    fn clone_is_independent() {
        let original = Shape::rectangle(1.0, 1.0);
        let mut copy = original.clone();
        copy.update_vertices(&Transform::from_position(Vector2::new(10.0, 0.0)));
        assert_eq!(original.as_polygon().map(|p| p.world_vertices()[0]), Some(Vector2::new(-0.5, -0.5)));
        assert_eq!(copy.as_polygon().map(|p| p.world_vertices()[0]), Some(Vector2::new(9.5, -0.5)));
    }

    #[test]
    fn rotated_box_bounds() {
        let mut shape = Shape::rectangle(2.0, 2.0);
        let transform = Transform::new(Vector2::zero(), Rotation::new(std::f32::consts::FRAC_PI_4));
        shape.update_vertices(&transform);
        let aabb = shape.compute_aabb(&transform);
        assert_relative_eq!(aabb.max.x, 2.0_f32.sqrt(), epsilon = 1e-5);
        assert_relative_eq!(aabb.min.y, -(2.0_f32.sqrt()), epsilon = 1e-5);
    }
}
