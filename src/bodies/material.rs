#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Surface properties of a body
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Material {
    /// Coefficient of restitution (bounciness), 0-1
    pub restitution: f32,

    /// Coulomb friction coefficient. A contact uses the larger of the two bodies' values.
    pub friction: f32,
}

impl Material {
    pub fn new(friction: f32, restitution: f32) -> Self {
        Self { friction, restitution }
    }

    /// Frictionless and inelastic
    pub fn frictionless() -> Self {
        Self { friction: 0.0, restitution: 0.0 }
    }

    pub fn ice() -> Self {
        Self { friction: 0.05, restitution: 0.4 }
    }

    pub fn rubber() -> Self {
        Self { friction: 0.8, restitution: 0.7 }
    }

    pub fn wood() -> Self {
        Self { friction: 0.6, restitution: 0.2 }
    }

    pub fn metal() -> Self {
        Self { friction: 0.4, restitution: 0.5 }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            restitution: 0.6,
            friction: 0.7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_bouncy_and_grippy() {
        let material = Material::default();
        assert_eq!(material.restitution, 0.6);
        assert_eq!(material.friction, 0.7);
    }

    #[test]
    fn presets_stay_in_range() {
        for material in [Material::frictionless(), Material::ice(), Material::rubber(), Material::wood(), Material::metal()] {
            assert!((0.0..=1.0).contains(&material.restitution));
            assert!(material.friction >= 0.0);
        }
        assert!(Material::ice().friction < Material::rubber().friction);
    }
}
