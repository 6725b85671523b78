use crate::math::Vector2;

#[cfg(feature = "serialize")]
use serde::{Serialize, Deserialize};

/// Broad-phase implementation used by a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum BroadPhaseKind {
    /// Incremental dynamic AABB tree
    #[default]
    AabbTree,

    /// Tests every pair; useful as a reference
    BruteForce,
}

/// Configuration parameters for the physics simulation
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SimulationConfig {
    /// Gravitational acceleration, applied as given (y-up, so usually negative y)
    pub gravity: Vector2,

    /// Solver sweeps per step over every joint and contact
    pub position_iterations: u32,

    /// Scale from world units to meters used when applying gravity
    pub pixels_per_meter: f32,

    pub broad_phase: BroadPhaseKind,

    /// Fat-AABB margin for tree leaves
    pub broad_phase_margin: f32,

    /// Baumgarte factor for joint drift correction
    pub joint_beta: f32,

    /// Squared-distance error a joint tolerates before correcting
    pub joint_slop: f32,

    /// Baumgarte factor for penetration correction
    pub contact_beta: f32,

    /// Penetration depth tolerated without positional correction
    pub contact_slop: f32,

    /// Bound on a joint's accumulated impulse carried between steps
    pub max_warm_start_impulse: f32,
}

impl SimulationConfig {
    /// Default configuration with a different gravity vector
    pub fn with_gravity(gravity: Vector2) -> Self {
        Self { gravity, ..Self::default() }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: Vector2::new(0.0, -9.81),
            position_iterations: 10,
            pixels_per_meter: 1.0,
            broad_phase: BroadPhaseKind::AabbTree,
            broad_phase_margin: 2.0,
            joint_beta: 0.02,
            joint_slop: 0.01,
            contact_beta: 1.0,
            contact_slop: 0.01,
            max_warm_start_impulse: 10000.0,
        }
    }
}
