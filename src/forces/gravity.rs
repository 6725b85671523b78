use crate::bodies::RigidBody;
use crate::core::{BodyHandle, BodyStorage};
use crate::forces::ForceGenerator;
use crate::math::{clamp, Vector2};

/// Newtonian attraction exerted on `a` by `b`.
///
/// The squared distance is clamped to `[min_distance_sq, max_distance_sq]`
/// to keep close encounters finite and far ones noticeable.
pub fn gravitational_attraction(a: &RigidBody, b: &RigidBody, g: f32, min_distance_sq: f32, max_distance_sq: f32) -> Vector2 {
    let d = b.get_position() - a.get_position();
    let distance_sq = clamp(d.length_squared(), min_distance_sq, max_distance_sq);
    if distance_sq <= 0.0 {
        return Vector2::zero();
    }
    let magnitude = g * (a.get_mass() * b.get_mass()) / distance_sq;
    d.normalize() * magnitude
}

/// Mutual attraction between every pair of a set of bodies
#[derive(Debug, Clone)]
pub struct GravitationalAttraction {
    g: f32,
    min_distance_sq: f32,
    max_distance_sq: f32,
    affected_bodies: Vec<BodyHandle>,
}

impl GravitationalAttraction {
    pub fn new(g: f32, min_distance_sq: f32, max_distance_sq: f32) -> Self {
        Self {
            g,
            min_distance_sq,
            max_distance_sq: max_distance_sq.max(min_distance_sq),
            affected_bodies: Vec::new(),
        }
    }

    pub fn add_body(&mut self, body: BodyHandle) {
        if !self.affected_bodies.contains(&body) {
            self.affected_bodies.push(body);
        }
    }
}

impl ForceGenerator for GravitationalAttraction {
    fn generator_type(&self) -> &'static str {
        "GravitationalAttraction"
    }

    fn apply_forces(&self, bodies: &mut BodyStorage<RigidBody>, _dt: f32) {
        for (i, &ha) in self.affected_bodies.iter().enumerate() {
            for &hb in &self.affected_bodies[i + 1..] {
                let Ok((a, b)) = bodies.get2_mut(ha, hb) else {
                    continue;
                };
                let force = gravitational_attraction(a, b, self.g, self.min_distance_sq, self.max_distance_sq);
                a.add_force(force);
                b.add_force(-force);
            }
        }
    }

    fn get_affected_bodies(&self) -> &[BodyHandle] {
        &self.affected_bodies
    }

    fn remove_body(&mut self, body: BodyHandle) {
        self.affected_bodies.retain(|&b| b != body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Storage;
    use crate::shapes::Shape;
    use approx::assert_relative_eq;

    #[test]
    fn attraction_points_toward_other_body() {
        let a = RigidBody::new(&Shape::circle(1.0), Vector2::zero(), 2.0);
        let b = RigidBody::new(&Shape::circle(1.0), Vector2::new(2.0, 0.0), 3.0);
        let force = gravitational_attraction(&a, &b, 1.0, 1.0, 100.0);
        assert_relative_eq!(force.x, 6.0 / 4.0);
        assert_relative_eq!(force.y, 0.0);
    }

    #[test]
    fn distance_is_clamped() {
        let a = RigidBody::new(&Shape::circle(1.0), Vector2::zero(), 1.0);
        let b = RigidBody::new(&Shape::circle(1.0), Vector2::new(0.1, 0.0), 1.0);
        let force = gravitational_attraction(&a, &b, 1.0, 4.0, 100.0);
        assert_relative_eq!(force.x, 0.25);
    }

    #[test]
    fn generator_applies_equal_and_opposite_forces() {
        let mut bodies = BodyStorage::new();
        let a = bodies.add(RigidBody::new(&Shape::circle(1.0), Vector2::zero(), 1.0));
        let b = bodies.add(RigidBody::new(&Shape::circle(1.0), Vector2::new(0.0, 3.0), 1.0));
        let mut generator = GravitationalAttraction::new(9.0, 1.0, 1000.0);
        generator.add_body(a);
        generator.add_body(b);
        generator.apply_forces(&mut bodies, 1.0 / 60.0);
        assert_relative_eq!(bodies.get(a).unwrap().get_accumulated_force().y, 1.0);
        assert_relative_eq!(bodies.get(b).unwrap().get_accumulated_force().y, -1.0);
    }
}
