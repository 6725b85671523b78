mod vector;
mod matrix;
mod transform;
mod rotation;
mod aabb;

pub use vector::Vector2;
pub use matrix::{gauss_seidel, inverse_mass_matrix, pack_velocities, InverseMass, Jacobian, Lambda, Velocities};
pub use transform::Transform;
pub use rotation::Rotation;
pub use aabb::Aabb;

/// Constant for a very small number, used for comparisons
pub const EPSILON: f32 = 1.0e-6;

/// Returns true if the value is approximately zero
#[inline]
pub fn approx_zero(a: f32) -> bool {
    a.abs() < EPSILON
}

#[inline]
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}
