use crate::math::Vector2;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Axis-aligned bounding box in world space
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Lower-left corner
    pub min: Vector2,

    /// Upper-right corner
    pub max: Vector2,
}

impl Aabb {
    #[inline]
    pub fn new(min: Vector2, max: Vector2) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn from_center_half_extents(center: Vector2, half_extents: Vector2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Smallest box enclosing all points, or `None` for an empty slice
    pub fn from_points(points: &[Vector2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Self::new(*first, *first);
        for point in rest {
            aabb.min = aabb.min.min(point);
            aabb.max = aabb.max.max(point);
        }
        Some(aabb)
    }

    #[inline]
    pub fn center(&self) -> Vector2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn extents(&self) -> Vector2 {
        self.max - self.min
    }

    #[inline]
    pub fn half_extents(&self) -> Vector2 {
        self.extents() * 0.5
    }

    /// Perimeter of the box, used as the tree insertion cost
    #[inline]
    pub fn perimeter(&self) -> f32 {
        let e = self.extents();
        2.0 * (e.x + e.y)
    }

    #[inline]
    pub fn area(&self) -> f32 {
        let e = self.extents();
        e.x * e.y
    }

    /// Inclusive point containment test
    #[inline]
    pub fn contains_point(&self, point: &Vector2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y
    }

    /// Checks if this box fully contains `other`
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        self.min.x <= other.min.x && self.max.x >= other.max.x &&
        self.min.y <= other.min.y && self.max.y >= other.max.y
    }

    /// Overlap test; touching boxes count as overlapping
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y
    }

    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(&other.min),
            max: self.max.max(&other.max),
        }
    }

    /// Grows the box by `margin` on every side
    #[inline]
    pub fn expand(&self, margin: f32) -> Self {
        let m = Vector2::new(margin, margin);
        Self {
            min: self.min - m,
            max: self.max + m,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_boxes_intersect() {
        let a = Aabb::new(Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0));
        let b = Aabb::new(Vector2::new(1.0, 0.0), Vector2::new(2.0, 1.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&b.expand(-0.1)));
    }

    #[test]
    fn perimeter_of_union() {
        let a = Aabb::new(Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0));
        let b = Aabb::new(Vector2::new(2.0, 0.0), Vector2::new(3.0, 1.0));
        assert_eq!(a.union(&b).perimeter(), 8.0);
        assert!(a.union(&b).contains(&a));
    }
}
