use crate::bodies::RigidBody;
use crate::core::{BodyHandle, BodyStorage, Storage};
use crate::forces::ForceGenerator;
use crate::math::Vector2;

/// Quadratic air drag, `-v̂ · k|v|²`. Zero for a body at rest.
pub fn drag(body: &RigidBody, k: f32) -> Vector2 {
    let velocity = body.get_linear_velocity();
    let speed_sq = velocity.length_squared();
    if speed_sq <= 0.0 {
        return Vector2::zero();
    }
    -velocity.normalize() * (k * speed_sq)
}

/// Constant-magnitude kinetic friction, `-v̂ · k`. Zero for a body at rest.
pub fn friction(body: &RigidBody, k: f32) -> Vector2 {
    -body.get_linear_velocity().normalize() * k
}

/// A force generator that simulates drag (air resistance)
#[derive(Debug, Clone)]
pub struct DragForce {
    coefficient: f32,
    affected_bodies: Vec<BodyHandle>,
}

impl DragForce {
    pub fn new(coefficient: f32) -> Self {
        Self {
            coefficient: coefficient.max(0.0),
            affected_bodies: Vec::new(),
        }
    }

    pub fn get_coefficient(&self) -> f32 {
        self.coefficient
    }

    pub fn add_body(&mut self, body: BodyHandle) {
        if !self.affected_bodies.contains(&body) {
            self.affected_bodies.push(body);
        }
    }
}

impl ForceGenerator for DragForce {
    fn generator_type(&self) -> &'static str {
        "Drag"
    }

    fn apply_forces(&self, bodies: &mut BodyStorage<RigidBody>, _dt: f32) {
        for handle in &self.affected_bodies {
            if let Some(body) = bodies.get_mut(*handle) {
                let force = drag(body, self.coefficient);
                body.add_force(force);
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

/// A force generator applying sliding friction against the motion
#[derive(Debug, Clone)]
pub struct FrictionForce {
    coefficient: f32,
    affected_bodies: Vec<BodyHandle>,
}

impl FrictionForce {
    pub fn new(coefficient: f32) -> Self {
        Self {
            coefficient: coefficient.max(0.0),
            affected_bodies: Vec::new(),
        }
    }

    pub fn add_body(&mut self, body: BodyHandle) {
        if !self.affected_bodies.contains(&body) {
            self.affected_bodies.push(body);
        }
    }
}

impl ForceGenerator for FrictionForce {
    fn generator_type(&self) -> &'static str {
        "Friction"
    }

    fn apply_forces(&self, bodies: &mut BodyStorage<RigidBody>, _dt: f32) {
        for handle in &self.affected_bodies {
            if let Some(body) = bodies.get_mut(*handle) {
                let force = friction(body, self.coefficient);
                body.add_force(force);
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
    use crate::shapes::Shape;
    use approx::assert_relative_eq;

    #[test]
    fn drag_opposes_motion_quadratically() {
        let mut body = RigidBody::new(&Shape::circle(1.0), Vector2::zero(), 1.0);
        assert_eq!(drag(&body, 0.5), Vector2::zero());
        body.set_linear_velocity(Vector2::new(2.0, 0.0));
        let force = drag(&body, 0.5);
        assert_relative_eq!(force.x, -2.0);
        assert_relative_eq!(force.y, 0.0);
    }

    #[test]
    fn friction_has_constant_magnitude() {
        let mut body = RigidBody::new(&Shape::circle(1.0), Vector2::zero(), 1.0);
        assert_eq!(friction(&body, 3.0), Vector2::zero());
        body.set_linear_velocity(Vector2::new(0.0, -10.0));
        let force = friction(&body, 3.0);
        assert_relative_eq!(force.y, 3.0);
    }

    #[test]
    fn generator_accumulates_on_registered_bodies() {
        let mut bodies = BodyStorage::new();
        let moving = bodies.add(RigidBody::new(&Shape::circle(1.0), Vector2::zero(), 1.0));
        let other = bodies.add(RigidBody::new(&Shape::circle(1.0), Vector2::zero(), 1.0));
        for handle in [moving, other] {
            bodies.get_mut(handle).unwrap().set_linear_velocity(Vector2::new(1.0, 0.0));
        }

        let mut generator = DragForce::new(1.0);
        generator.add_body(moving);
        generator.apply_forces(&mut bodies, 1.0 / 60.0);
        assert_relative_eq!(bodies.get(moving).unwrap().get_accumulated_force().x, -1.0);
        assert_eq!(bodies.get(other).unwrap().get_accumulated_force(), Vector2::zero());

        generator.remove_body(moving);
        assert!(!generator.affects_body(moving));
    }
}
