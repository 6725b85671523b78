mod shape;
mod circle;
mod polygon;
mod box_shape;

pub use shape::{Shape, ShapeType};
pub use circle::CircleShape;
pub use polygon::{PolygonShape, Separation};
pub use box_shape::BoxShape;
