//! Linear least-squares solver.
//!
//! Every damped Gauss-Newton step needs the minimizer of
//!
//! ```text
//! ‖A δ - b‖²
//! ```
//!
//! where `A` is tall: the Jacobian with the damping rows stacked underneath.
//! The solve goes through the SVD so that rank deficiency degrades
//! gracefully. Singular values below a size-scaled multiple of machine
//! epsilon carry no usable information about `δ`; those directions are
//! treated as null space and dropped rather than amplified into a garbage
//! step. With only 3 parameters the SVD cost is negligible.

use nalgebra::{DMatrix, DVector};

/// Solve a least-squares problem using SVD with a relative rank cutoff.
///
/// Returns `None` when the system carries no information at all (zero or
/// non-finite singular values) or the solve produces non-finite entries.
pub fn solve_least_squares(a: &DMatrix<f64>, b: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = a.clone().svd(true, true);

    let sigma_max = svd.singular_values.max();
    if !(sigma_max > 0.0 && sigma_max.is_finite()) {
        return None;
    }
    let cutoff = sigma_max * a.nrows().max(a.ncols()) as f64 * f64::EPSILON;

    let delta = svd.solve(b, cutoff).ok()?;
    delta.iter().all(|v| v.is_finite()).then_some(delta)
}
