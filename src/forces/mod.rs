mod force_generator;
mod drag;
mod gravity;
mod spring;

pub use self::force_generator::ForceGenerator;
pub use self::drag::{drag, friction, DragForce, FrictionForce};
pub use self::gravity::{gravitational_attraction, GravitationalAttraction};
pub use self::spring::{spring, SpringAnchor, SpringForce};
