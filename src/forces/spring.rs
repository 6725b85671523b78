use crate::bodies::RigidBody;
use crate::core::{BodyHandle, BodyStorage, Storage};
use crate::forces::ForceGenerator;
use crate::math::Vector2;

/// Hooke spring between a body and a fixed world point.
///
/// Pulls the body back toward `rest_length` from `anchor`.
pub fn spring(body: &RigidBody, anchor: Vector2, rest_length: f32, k: f32) -> Vector2 {
    let d = body.get_position() - anchor;
    let displacement = d.length() - rest_length;
    d.normalize() * (-k * displacement)
}

/// What the far end of a [`SpringForce`] is attached to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpringAnchor {
    /// A fixed world point
    Point(Vector2),

    /// Another body's origin; it receives the opposite force
    Body(BodyHandle),
}

/// A damperless spring attached to one body
#[derive(Debug, Clone)]
pub struct SpringForce {
    anchor: SpringAnchor,
    rest_length: f32,
    stiffness: f32,
    /// The attached body, followed by the anchor body if there is one
    affected_bodies: Vec<BodyHandle>,
}

impl SpringForce {
    pub fn new(body: BodyHandle, anchor: SpringAnchor, rest_length: f32, stiffness: f32) -> Self {
        let mut affected_bodies = vec![body];
        if let SpringAnchor::Body(other) = anchor {
            affected_bodies.push(other);
        }
        Self {
            anchor,
            rest_length: rest_length.max(0.0),
            stiffness: stiffness.max(0.0),
            affected_bodies,
        }
    }

    pub fn get_rest_length(&self) -> f32 {
        self.rest_length
    }

    pub fn get_stiffness(&self) -> f32 {
        self.stiffness
    }
}

impl ForceGenerator for SpringForce {
    fn generator_type(&self) -> &'static str {
        "Spring"
    }

    fn apply_forces(&self, bodies: &mut BodyStorage<RigidBody>, _dt: f32) {
        let Some(&body) = self.affected_bodies.first() else {
            return;
        };
        match self.anchor {
            SpringAnchor::Point(anchor) => {
                if let Some(body) = bodies.get_mut(body) {
                    let force = spring(body, anchor, self.rest_length, self.stiffness);
                    body.add_force(force);
                }
            }
            SpringAnchor::Body(other) => {
                if let Ok((a, b)) = bodies.get2_mut(body, other) {
                    let force = spring(a, b.get_position(), self.rest_length, self.stiffness);
                    a.add_force(force);
                    b.add_force(-force);
                }
            }
        }
    }

    fn get_affected_bodies(&self) -> &[BodyHandle] {
        &self.affected_bodies
    }

    fn remove_body(&mut self, body: BodyHandle) {
        // either end going away disables the spring
        if self.affected_bodies.contains(&body) {
            self.affected_bodies.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Shape;
    use approx::assert_relative_eq;

    #[test]
    fn stretched_spring_pulls_back() {
        let body = RigidBody::new(&Shape::circle(1.0), Vector2::new(3.0, 0.0), 1.0);
        let force = spring(&body, Vector2::zero(), 1.0, 10.0);
        assert_relative_eq!(force.x, -20.0);
    }

    #[test]
    fn compressed_spring_pushes_out() {
        let body = RigidBody::new(&Shape::circle(1.0), Vector2::new(0.0, 0.5), 1.0);
        let force = spring(&body, Vector2::zero(), 1.0, 10.0);
        assert_relative_eq!(force.y, 5.0);
    }

    #[test]
    fn body_to_body_spring_is_symmetric() {
        let mut bodies = BodyStorage::new();
        let a = bodies.add(RigidBody::new(&Shape::circle(1.0), Vector2::zero(), 1.0));
        let b = bodies.add(RigidBody::new(&Shape::circle(1.0), Vector2::new(4.0, 0.0), 1.0));
        let mut generator = SpringForce::new(a, SpringAnchor::Body(b), 2.0, 1.0);
        generator.apply_forces(&mut bodies, 1.0 / 60.0);
        assert_relative_eq!(bodies.get(a).unwrap().get_accumulated_force().x, 2.0);
        assert_relative_eq!(bodies.get(b).unwrap().get_accumulated_force().x, -2.0);

        generator.remove_body(b);
        assert!(generator.get_affected_bodies().is_empty());
    }
}
