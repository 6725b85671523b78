#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Type of rigid body, determining how it behaves in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum RigidBodyType {
    /// Fully simulated: integrates forces and responds to impulses
    Dynamic,

    /// Infinite mass; never moves on its own and ignores impulses
    Static,
}

impl RigidBodyType {
    /// Classifies a body by its mass. Zero, negative and non-finite masses are static.
    pub fn from_mass(mass: f32) -> Self {
        if mass.is_finite() && mass > 0.0 {
            RigidBodyType::Dynamic
        } else {
            RigidBodyType::Static
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_mass() {
        assert_eq!(RigidBodyType::from_mass(1.0), RigidBodyType::Dynamic);
        assert_eq!(RigidBodyType::from_mass(0.0), RigidBodyType::Static);
        assert_eq!(RigidBodyType::from_mass(-3.0), RigidBodyType::Static);
        assert_eq!(RigidBodyType::from_mass(f32::INFINITY), RigidBodyType::Static);
        assert_eq!(RigidBodyType::from_mass(f32::NAN), RigidBodyType::Static);
    }
}
