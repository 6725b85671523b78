pub mod world;
pub mod config;
pub mod storage;
pub mod debug_draw;

pub use self::world::PhysicsWorld;
pub use self::config::{BroadPhaseKind, SimulationConfig};
pub use self::storage::{BodyStorage, ConstraintStorage, Pool, PoolHandle, Storage};
pub use self::debug_draw::{Color, DebugDraw, DrawFlags};

use std::fmt;

/// A unique identifier for a body in the physics world.
///
/// Handles stay valid until the body is destroyed; a destroyed body's handle
/// never resolves again, even if its slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// A unique identifier for a persistent constraint (joint) in the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintHandle {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl PoolHandle for BodyHandle {
    fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn generation(&self) -> u32 {
        self.generation
    }
}

impl PoolHandle for ConstraintHandle {
    fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    fn index(&self) -> u32 {
        self.index
    }

    fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "body#{}v{}", self.index, self.generation)
    }
}

impl fmt::Display for ConstraintHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "constraint#{}v{}", self.index, self.generation)
    }
}
