use crate::bodies::RigidBody;
use crate::core::{BodyHandle, BodyStorage};

/// Base trait for force generators that can apply forces to bodies.
///
/// Registered generators run at the start of every step, before gravity is
/// added and forces are integrated.
pub trait ForceGenerator: Send + Sync + std::fmt::Debug + 'static {
    /// Returns the type name of the force generator
    fn generator_type(&self) -> &'static str;

    /// Accumulates this generator's forces on the affected bodies
    fn apply_forces(&self, bodies: &mut BodyStorage<RigidBody>, dt: f32);

    /// Returns the bodies affected by this force generator
    fn get_affected_bodies(&self) -> &[BodyHandle];

    /// Returns true if the force generator affects the given body
    fn affects_body(&self, body: BodyHandle) -> bool {
        self.get_affected_bodies().contains(&body)
    }

    /// Forgets a body that is leaving the world
    fn remove_body(&mut self, body: BodyHandle);
}
