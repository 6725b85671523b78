use nalgebra as na;

use crate::math::Vector2;

/// Stacked generalized velocity of a body pair: `[va.x, va.y, wa, vb.x, vb.y, wb]`
pub type Velocities = na::SVector<f32, 6>;

/// Diagonal inverse mass matrix of a body pair
pub type InverseMass = na::SMatrix<f32, 6, 6>;

/// Constraint Jacobian with `R` rows over the six pair velocities
pub type Jacobian<const R: usize> = na::SMatrix<f32, R, 6>;

/// Impulse magnitudes, one per Jacobian row
pub type Lambda<const R: usize> = na::SVector<f32, R>;

/// Packs both bodies' linear and angular velocities into one vector
#[inline]
pub fn pack_velocities(va: Vector2, wa: f32, vb: Vector2, wb: f32) -> Velocities {
    Velocities::from_column_slice(&[va.x, va.y, wa, vb.x, vb.y, wb])
}

/// Builds `diag(1/ma, 1/ma, 1/Ia, 1/mb, 1/mb, 1/Ib)`
#[inline]
pub fn inverse_mass_matrix(inv_mass_a: f32, inv_inertia_a: f32, inv_mass_b: f32, inv_inertia_b: f32) -> InverseMass {
    InverseMass::from_diagonal(&Velocities::from_column_slice(&[
        inv_mass_a,
        inv_mass_a,
        inv_inertia_a,
        inv_mass_b,
        inv_mass_b,
        inv_inertia_b,
    ]))
}

/// Solves `a * x = b` with Gauss-Seidel relaxation starting from zero.
///
/// Runs `N` sweeps. Updates whose value is not finite are skipped, leaving
/// that component unchanged. A zero diagonal (degenerate Jacobian row, or two
/// bodies without solver mass) yields NaN for a zero right-hand side and ±inf
/// for a nonzero bias; both are dropped, since an infinite impulse would be
/// carried in the warm-start cache and turn into NaN once scaled by a zero
/// inverse mass.
pub fn gauss_seidel<const N: usize>(a: &na::SMatrix<f32, N, N>, b: &na::SVector<f32, N>) -> na::SVector<f32, N> {
    let mut x = na::SVector::<f32, N>::zeros();
    for _ in 0..N {
        for i in 0..N {
            let diagonal = a[(i, i)];
            let mut ax = 0.0;
            for j in 0..N {
                ax += a[(i, j)] * x[j];
            }
            let dx = (b[i] / diagonal) - (ax / diagonal);
            if dx.is_finite() {
                x[i] += dx;
            }
        }
    }
    x
}
