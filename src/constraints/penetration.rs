use std::any::Any;

use crate::bodies::RigidBody;
use crate::collision::Contact;
use crate::constraints::constraint::{apply_pair_impulses, pair_inverse_mass, pair_velocities};
use crate::constraints::Constraint;
use crate::core::{BodyHandle, BodyStorage};
use crate::math::{gauss_seidel, Jacobian, Lambda, Vector2};

/// Default Baumgarte factor for contacts
pub const CONTACT_BETA: f32 = 1.0;

/// Default penetration tolerated without positional correction
pub const CONTACT_SLOP: f32 = 0.01;

/// Non-penetration and friction for one contact point.
///
/// Row 0 keeps the bodies from approaching along the contact normal, row 1
/// bounds sliding along the tangent by `friction * normal impulse`. Built
/// fresh from each step's contacts.
#[derive(Debug, Clone)]
pub struct PenetrationConstraint {
    bodies: [BodyHandle; 2],

    /// Contact start in A's local space
    point_a: Vector2,

    /// Contact end in B's local space
    point_b: Vector2,

    /// Contact normal as a direction in A's local space
    normal: Vector2,

    jacobian: Jacobian<2>,

    cached_lambda: Lambda<2>,

    bias: f32,

    /// Larger of the two bodies' friction coefficients
    friction: f32,

    beta: f32,

    slop: f32,
}

impl PenetrationConstraint {
    pub fn new(contact: &Contact, a: &RigidBody, b: &RigidBody) -> Self {
        Self {
            bodies: [contact.body_a, contact.body_b],
            point_a: a.world_to_local(&contact.start),
            point_b: b.world_to_local(&contact.end),
            normal: a.world_direction_to_local(&contact.normal),
            jacobian: Jacobian::zeros(),
            cached_lambda: Lambda::zeros(),
            bias: 0.0,
            friction: 0.0,
            beta: CONTACT_BETA,
            slop: CONTACT_SLOP,
        }
    }

    pub fn with_stabilization(mut self, beta: f32, slop: f32) -> Self {
        self.beta = beta;
        self.slop = slop;
        self
    }

    /// Accumulated normal impulse, never negative
    pub fn normal_impulse(&self) -> f32 {
        self.cached_lambda[0]
    }

    /// Accumulated friction impulse
    pub fn tangent_impulse(&self) -> f32 {
        self.cached_lambda[1]
    }

    pub fn friction(&self) -> f32 {
        self.friction
    }
}

impl Constraint for PenetrationConstraint {
    fn constraint_type(&self) -> &'static str {
        "Penetration"
    }

    fn get_bodies(&self) -> &[BodyHandle] {
        &self.bodies
    }

    fn pre_solve(&mut self, bodies: &mut BodyStorage<RigidBody>, dt: f32) {
        let Ok((a, b)) = bodies.get2_mut(self.bodies[0], self.bodies[1]) else {
            return;
        };

        let pa = a.local_to_world(&self.point_a);
        let pb = b.local_to_world(&self.point_b);
        let n = a.local_direction_to_world(&self.normal);
        let ra = pa - a.get_position();
        let rb = pb - b.get_position();

        self.jacobian = Jacobian::zeros();
        self.jacobian.set_row(0, &Jacobian::<1>::from_row_slice(&[-n.x, -n.y, -ra.cross(&n), n.x, n.y, rb.cross(&n)]));

        self.friction = a.get_friction().max(b.get_friction());
        if self.friction > 0.0 {
            let t = n.normal();
            self.jacobian.set_row(1, &Jacobian::<1>::from_row_slice(&[-t.x, -t.y, -ra.cross(&t), t.x, t.y, rb.cross(&t)]));
        }

        let warm_start = self.jacobian.transpose() * self.cached_lambda;
        apply_pair_impulses(a, b, &warm_start);

        // negative while the surfaces overlap by more than the slop
        let error = ((pb - pa).dot(&-n) + self.slop).min(0.0);
        self.bias = (self.beta / dt) * error;
    }

    fn solve(&mut self, bodies: &mut BodyStorage<RigidBody>) {
        let Ok((a, b)) = bodies.get2_mut(self.bodies[0], self.bodies[1]) else {
            return;
        };

        let velocities = pair_velocities(a, b);
        let inv_mass = pair_inverse_mass(a, b);
        let jt = self.jacobian.transpose();

        let lhs = self.jacobian * inv_mass * jt;
        let mut rhs = -(self.jacobian * velocities);
        rhs[0] -= self.bias;

        let mut lambda = gauss_seidel(&lhs, &rhs);

        let previous = self.cached_lambda;
        self.cached_lambda += lambda;
        self.cached_lambda[0] = self.cached_lambda[0].max(0.0);
        if self.friction > 0.0 {
            // no normal impulse, no friction; also keeps `0 * inf` out of the bound
            let max_friction = if self.cached_lambda[0] > 0.0 { self.cached_lambda[0] * self.friction } else { 0.0 };
            self.cached_lambda[1] = self.cached_lambda[1].clamp(-max_friction, max_friction);
        }
        lambda = self.cached_lambda - previous;

        apply_pair_impulses(a, b, &(jt * lambda));
    }

    fn post_solve(&mut self) {}

    fn world_anchors(&self, bodies: &BodyStorage<RigidBody>) -> Option<(Vector2, Vector2)> {
        let a = bodies.fetch(self.bodies[0]).ok()?;
        let b = bodies.fetch(self.bodies[1]).ok()?;
        Some((a.local_to_world(&self.point_a), b.local_to_world(&self.point_b)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::collide_circles;
    use crate::core::Storage;
    use crate::shapes::Shape;
    use approx::assert_relative_eq;

    fn colliding_circles(mass_a: f32, velocity_b: Vector2) -> (BodyStorage<RigidBody>, PenetrationConstraint) {
        let mut bodies = BodyStorage::new();
        let ha = bodies.add(RigidBody::new(&Shape::circle(1.0), Vector2::zero(), mass_a));
        let hb = bodies.add(RigidBody::new(&Shape::circle(1.0), Vector2::new(1.995, 0.0), 1.0));
        bodies.get_mut(hb).unwrap().set_linear_velocity(velocity_b);

        let (a, b) = (bodies.get(ha).unwrap(), bodies.get(hb).unwrap());
        let contact = collide_circles(
            ha,
            a.get_position(),
            a.get_shape().as_circle().unwrap(),
            hb,
            b.get_position(),
            b.get_shape().as_circle().unwrap(),
        )
        .unwrap();
        let constraint = PenetrationConstraint::new(&contact, a, b);
        (bodies, constraint)
    }

    #[test]
    fn stops_approach_along_normal() {
        let (mut bodies, mut c) = colliding_circles(0.0, Vector2::new(-3.0, 0.0));
        let hb = c.get_bodies()[1];
        c.pre_solve(&mut bodies, 1.0 / 60.0);
        for _ in 0..5 {
            c.solve(&mut bodies);
        }
        let v = bodies.get(hb).unwrap().get_linear_velocity();
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-4);
        assert!(c.normal_impulse() > 0.0);
    }

    #[test]
    fn never_pulls_separating_bodies() {
        let (mut bodies, mut c) = colliding_circles(0.0, Vector2::new(3.0, 0.0));
        let hb = c.get_bodies()[1];
        c.pre_solve(&mut bodies, 1.0 / 60.0);
        c.solve(&mut bodies);
        assert_eq!(c.normal_impulse(), 0.0);
        assert_relative_eq!(bodies.get(hb).unwrap().get_linear_velocity().x, 3.0);
    }

    #[test]
    fn friction_is_bounded_by_normal_impulse() {
        let (mut bodies, mut c) = colliding_circles(0.0, Vector2::new(-1.0, 5.0));
        c.pre_solve(&mut bodies, 1.0 / 60.0);
        for _ in 0..10 {
            c.solve(&mut bodies);
        }
        assert_relative_eq!(c.friction(), 0.7);
        assert!(c.tangent_impulse().abs() <= c.normal_impulse() * c.friction() + 1e-5);
    }

    #[test]
    fn unbounded_friction_without_normal_impulse_applies_nothing() {
        let (mut bodies, mut c) = colliding_circles(0.0, Vector2::new(3.0, 5.0));
        let (ha, hb) = (c.get_bodies()[0], c.get_bodies()[1]);
        bodies.get_mut(ha).unwrap().set_friction(f32::INFINITY);
        bodies.get_mut(hb).unwrap().set_friction(f32::INFINITY);

        c.pre_solve(&mut bodies, 1.0 / 60.0);
        c.solve(&mut bodies);

        assert_eq!(c.normal_impulse(), 0.0);
        assert_eq!(c.tangent_impulse(), 0.0);
        let v = bodies.get(hb).unwrap().get_linear_velocity();
        assert_relative_eq!(v.x, 3.0);
        assert_relative_eq!(v.y, 5.0);
    }
}
