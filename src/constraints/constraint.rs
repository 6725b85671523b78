use std::any::Any;

use crate::bodies::RigidBody;
use crate::core::{BodyHandle, BodyStorage};
use crate::math::{inverse_mass_matrix, pack_velocities, InverseMass, Vector2, Velocities};

/// Base trait for physics constraints.
///
/// A step drives every constraint through `pre_solve` once, `solve` once per
/// solver iteration, then `post_solve` once.
pub trait Constraint: Send + Sync + 'static {
    /// Returns the type name of the constraint
    fn constraint_type(&self) -> &'static str;

    /// Returns the two bodies involved in the constraint
    fn get_bodies(&self) -> &[BodyHandle];

    /// Checks if the constraint involves a specific body
    fn involves_body(&self, body: BodyHandle) -> bool {
        self.get_bodies().contains(&body)
    }

    /// Builds the Jacobian and bias for this step and applies the warm-start impulse
    fn pre_solve(&mut self, bodies: &mut BodyStorage<RigidBody>, dt: f32);

    /// One Gauss-Seidel pass: computes and applies a corrective impulse
    fn solve(&mut self, bodies: &mut BodyStorage<RigidBody>);

    /// End-of-step bookkeeping on the accumulated impulse
    fn post_solve(&mut self);

    /// Current world positions of the attachment points on A and B
    fn world_anchors(&self, bodies: &BodyStorage<RigidBody>) -> Option<(Vector2, Vector2)>;

    /// Returns a dynamic reference to any for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// Solver inverse mass matrix of a body pair
pub(crate) fn pair_inverse_mass(a: &RigidBody, b: &RigidBody) -> InverseMass {
    inverse_mass_matrix(
        a.get_solver_inverse_mass(),
        a.get_solver_inverse_inertia(),
        b.get_solver_inverse_mass(),
        b.get_solver_inverse_inertia(),
    )
}

pub(crate) fn pair_velocities(a: &RigidBody, b: &RigidBody) -> Velocities {
    pack_velocities(
        a.get_linear_velocity(),
        a.get_angular_velocity(),
        b.get_linear_velocity(),
        b.get_angular_velocity(),
    )
}

/// Applies a generalized impulse `Jᵀλ` to both bodies
pub(crate) fn apply_pair_impulses(a: &mut RigidBody, b: &mut RigidBody, impulses: &Velocities) {
    a.apply_impulse_linear(Vector2::new(impulses[0], impulses[1]));
    a.apply_impulse_angular(impulses[2]);
    b.apply_impulse_linear(Vector2::new(impulses[3], impulses[4]));
    b.apply_impulse_angular(impulses[5]);
}
