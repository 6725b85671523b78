mod constraint;
mod joint;
mod penetration;

pub use self::constraint::Constraint;
pub use self::joint::{JointConstraint, JOINT_BETA, JOINT_SLOP, MAX_WARM_START_IMPULSE};
pub use self::penetration::{PenetrationConstraint, CONTACT_BETA, CONTACT_SLOP};
