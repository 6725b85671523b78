use std::any::Any;

use crate::bodies::RigidBody;
use crate::constraints::constraint::{apply_pair_impulses, pair_inverse_mass, pair_velocities};
use crate::constraints::Constraint;
use crate::core::{BodyHandle, BodyStorage};
use crate::math::{gauss_seidel, Jacobian, Lambda, Vector2};

/// Default Baumgarte factor for joints
pub const JOINT_BETA: f32 = 0.02;

/// Default squared-distance tolerance for joints
pub const JOINT_SLOP: f32 = 0.01;

/// Default bound on the carried-over joint impulse
pub const MAX_WARM_START_IMPULSE: f32 = 10000.0;

/// Pins a point of body A to a point of body B.
///
/// Both anchors start at the same world point. The solver works on the
/// scalar `C = |pb - pa|²`, so it removes relative anchor velocity along the
/// separation and slowly pulls drifted anchors back together.
#[derive(Debug, Clone)]
pub struct JointConstraint {
    bodies: [BodyHandle; 2],

    /// Anchor in A's local space
    anchor_a: Vector2,

    /// Anchor in B's local space
    anchor_b: Vector2,

    jacobian: Jacobian<1>,

    /// Impulse accumulated over the step, reused to warm start the next one
    cached_lambda: Lambda<1>,

    bias: f32,

    beta: f32,

    slop: f32,

    max_warm_start: f32,
}

impl JointConstraint {
    /// Joins `a` and `b` at the world point `anchor`
    pub fn new(handle_a: BodyHandle, a: &RigidBody, handle_b: BodyHandle, b: &RigidBody, anchor: Vector2) -> Self {
        Self {
            bodies: [handle_a, handle_b],
            anchor_a: a.world_to_local(&anchor),
            anchor_b: b.world_to_local(&anchor),
            jacobian: Jacobian::zeros(),
            cached_lambda: Lambda::zeros(),
            bias: 0.0,
            beta: JOINT_BETA,
            slop: JOINT_SLOP,
            max_warm_start: MAX_WARM_START_IMPULSE,
        }
    }

    /// Overrides the drift correction factor and tolerance
    pub fn with_stabilization(mut self, beta: f32, slop: f32) -> Self {
        self.beta = beta;
        self.slop = slop;
        self
    }

    pub fn with_max_warm_start(mut self, max_impulse: f32) -> Self {
        self.max_warm_start = max_impulse.abs();
        self
    }

    pub fn local_anchor_a(&self) -> Vector2 {
        self.anchor_a
    }

    pub fn local_anchor_b(&self) -> Vector2 {
        self.anchor_b
    }

    /// Impulse carried into the next step
    pub fn accumulated_impulse(&self) -> f32 {
        self.cached_lambda[0]
    }
}

impl Constraint for JointConstraint {
    fn constraint_type(&self) -> &'static str {
        "Joint"
    }

    fn get_bodies(&self) -> &[BodyHandle] {
        &self.bodies
    }

    fn pre_solve(&mut self, bodies: &mut BodyStorage<RigidBody>, dt: f32) {
        let Ok((a, b)) = bodies.get2_mut(self.bodies[0], self.bodies[1]) else {
            return;
        };

        let pa = a.local_to_world(&self.anchor_a);
        let pb = b.local_to_world(&self.anchor_b);
        let ra = pa - a.get_position();
        let rb = pb - b.get_position();
        let ab = pa - pb;
        let ba = pb - pa;

        self.jacobian = Jacobian::<1>::from_row_slice(&[
            2.0 * ab.x,
            2.0 * ab.y,
            2.0 * ra.cross(&ab),
            2.0 * ba.x,
            2.0 * ba.y,
            2.0 * rb.cross(&ba),
        ]);

        let warm_start = self.jacobian.transpose() * self.cached_lambda;
        apply_pair_impulses(a, b, &warm_start);

        let error = (ba.dot(&ba) - self.slop).max(0.0);
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

        let lambda = gauss_seidel(&lhs, &rhs);
        self.cached_lambda += lambda;

        apply_pair_impulses(a, b, &(jt * lambda));
    }

    fn post_solve(&mut self) {
        let max = self.max_warm_start;
        self.cached_lambda[0] = self.cached_lambda[0].clamp(-max, max);
    }

    fn world_anchors(&self, bodies: &BodyStorage<RigidBody>) -> Option<(Vector2, Vector2)> {
        let a = bodies.fetch(self.bodies[0]).ok()?;
        let b = bodies.fetch(self.bodies[1]).ok()?;
        Some((a.local_to_world(&self.anchor_a), b.local_to_world(&self.anchor_b)))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Storage;
    use crate::shapes::Shape;
    use approx::assert_relative_eq;

    fn hanging_pair() -> (BodyStorage<RigidBody>, JointConstraint) {
        let mut bodies = BodyStorage::new();
        let ha = bodies.add(RigidBody::new(&Shape::circle(0.5), Vector2::zero(), 0.0));
        let hb = bodies.add(RigidBody::new(&Shape::circle(0.5), Vector2::new(0.0, -1.0), 1.0));
        let joint = JointConstraint::new(ha, bodies.get(ha).unwrap(), hb, bodies.get(hb).unwrap(), Vector2::new(0.0, -1.0));
        (bodies, joint)
    }

    #[test]
    fn anchors_start_coincident() {
        let (bodies, joint) = hanging_pair();
        let (pa, pb) = joint.world_anchors(&bodies).unwrap();
        assert_relative_eq!(pa.distance(&pb), 0.0, epsilon = 1e-6);
        assert_eq!(joint.local_anchor_a(), Vector2::new(0.0, -1.0));
        assert_eq!(joint.local_anchor_b(), Vector2::zero());
    }

    #[test]
    fn removes_separating_velocity_once_drifted() {
        let (mut bodies, mut joint) = hanging_pair();
        let hb = joint.get_bodies()[1];
        bodies.get_mut(hb).unwrap().set_position(Vector2::new(0.0, -1.05));
        bodies.get_mut(hb).unwrap().set_linear_velocity(Vector2::new(0.0, -2.0));

        joint.pre_solve(&mut bodies, 1.0 / 60.0);
        joint.solve(&mut bodies);
        assert_relative_eq!(bodies.get(hb).unwrap().get_linear_velocity().y, 0.0, epsilon = 1e-4);
        assert!(joint.accumulated_impulse() != 0.0);
    }

    #[test]
    fn post_solve_clamps_carried_impulse() {
        let (_, mut joint) = hanging_pair();
        let mut joint_small = joint.clone().with_max_warm_start(1.0);
        joint_small.cached_lambda[0] = -50.0;
        joint_small.post_solve();
        assert_eq!(joint_small.accumulated_impulse(), -1.0);

        joint.cached_lambda[0] = 5.0e5;
        joint.post_solve();
        assert_eq!(joint.accumulated_impulse(), MAX_WARM_START_IMPULSE);
    }
}
