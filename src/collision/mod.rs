mod contact;
mod broad_phase;
mod aabb_tree;
mod narrow_phase;

pub use self::contact::Contact;
pub use self::broad_phase::{new_broad_phase, BroadPhase, BruteForceBroadPhase, CollisionPair, ProxyId};
pub use self::aabb_tree::{AabbTree, DEFAULT_MARGIN};
pub use self::narrow_phase::{collide_circles, collide_polygon_circle, collide_polygons, is_colliding, NarrowPhase, SatNarrowPhase};
