mod rigid_body;
mod material;
mod body_type;

pub use self::rigid_body::RigidBody;
pub use self::material::Material;
pub use self::body_type::RigidBodyType;
pub use self::body_flags::BodyFlags;

/// Flags for controlling body behavior
pub mod body_flags {
    use bitflags::bitflags;

    bitflags! {
        /// Per-body state bits
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct BodyFlags: u32 {
            /// Body takes part in integration and responds to impulses
            const AWAKE = 0x01;

            /// Body is drawn by the debug renderer
            const VISIBLE = 0x02;
        }
    }

    impl Default for BodyFlags {
        fn default() -> Self {
            BodyFlags::AWAKE | BodyFlags::VISIBLE
        }
    }
}
