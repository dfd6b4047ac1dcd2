//! Least squares solvers.
//!
//! The forecaster repeatedly solves small linear regression problems of the form:
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2 + Σ_j λ_j β_j^2
//! ```
//!
//! The ridge term is applied by appending one synthetic row per penalized
//! column (`sqrt(λ_j)` on the diagonal, target 0) and solving the augmented
//! system as ordinary least squares. Unpenalized columns (`λ_j = 0`) get no row.
//!
//! We use SVD so tall and rank-deficient systems are handled without panicking
//! (nalgebra's `QR::solve` is intended for square systems).

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve a ridge-penalized least squares problem.
///
/// `penalties[j]` is the ridge weight for column `j`; it must have one entry
/// per column of `x`.
pub fn solve_ridge(x: &DMatrix<f64>, y: &DVector<f64>, penalties: &[f64]) -> Option<DVector<f64>> {
    if penalties.len() != x.ncols() || x.nrows() != y.len() {
        return None;
    }

    let penalized: Vec<(usize, f64)> = penalties
        .iter()
        .copied()
        .enumerate()
        .filter(|&(_, lambda)| lambda > 0.0 && lambda.is_finite())
        .collect();

    if penalized.is_empty() {
        return solve_least_squares(x, y);
    }

    let n = x.nrows();
    let rows = n + penalized.len();
    let mut xa = DMatrix::<f64>::zeros(rows, x.ncols());
    let mut ya = DVector::<f64>::zeros(rows);

    xa.rows_mut(0, n).copy_from(x);
    ya.rows_mut(0, n).copy_from(y);

    for (k, &(col, lambda)) in penalized.iter().enumerate() {
        xa[(n + k, col)] = lambda.sqrt();
    }

    solve_least_squares(&xa, &ya)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn zero_penalties_match_plain_least_squares() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_ridge(&x, &y, &[0.0, 0.0]).unwrap();
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn ridge_shrinks_penalized_coefficient() {
        // Single column, y = 2x: ridge solution is Σxy / (Σx² + λ).
        let x = DMatrix::from_row_slice(2, 1, &[1.0, 1.0]);
        let y = DVector::from_row_slice(&[2.0, 2.0]);

        let beta = solve_ridge(&x, &y, &[2.0]).unwrap();
        assert!((beta[0] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn ridge_rejects_mismatched_penalties() {
        let x = DMatrix::from_row_slice(2, 1, &[1.0, 1.0]);
        let y = DVector::from_row_slice(&[2.0, 2.0]);
        assert!(solve_ridge(&x, &y, &[1.0, 1.0]).is_none());
    }
}
