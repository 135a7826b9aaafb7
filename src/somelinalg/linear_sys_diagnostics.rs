use log::warn;
use nalgebra::{DMatrix, DVector};

/// Numerical rank read off the diagonal of a triangular factor (R of a QR or U of an LU
/// decomposition). A diagonal entry counts towards the rank when its magnitude exceeds
/// `threshold` times the largest diagonal magnitude. A zero or non-finite diagonal gives rank 0.
pub fn rank_from_diagonal(diag: &DVector<f64>, threshold: f64) -> usize {
    if diag.iter().any(|d| !d.is_finite()) {
        return 0;
    }
    let max_abs = diag.iter().fold(0.0f64, |acc, d| acc.max(d.abs()));
    if max_abs == 0.0 {
        return 0;
    }
    diag.iter().filter(|d| d.abs() > threshold * max_abs).count()
}

/// The condition number of a matrix is the ratio of its largest singular value to its smallest one,
/// it measures how much a relative perturbation of b is amplified in the solution of Ax = b.
/// Returns infinity for a matrix with a zero singular value.
pub fn condition_number(A: &DMatrix<f64>) -> f64 {
    if A.is_empty() {
        return 1.0;
    }
    let singular_values = A.singular_values();
    let max_sigma = singular_values.max();
    let min_sigma = singular_values.min();
    if min_sigma == 0.0 {
        return f64::INFINITY;
    }
    max_sigma / min_sigma
}

pub fn poorly_conditioned(A: &DMatrix<f64>, threshold: f64) -> bool {
    let condition_number = condition_number(A);
    let poorly_conditioned = condition_number > threshold;
    if poorly_conditioned {
        warn!(
            "The system of linear equations is poorly conditioned. Condition number = {:.3e}",
            condition_number
        );
    }
    poorly_conditioned
}

/// famous example of ill-conditioned matrix
#[cfg(test)]
pub(crate) fn hilbert_matrix(n: usize) -> DMatrix<f64> {
    DMatrix::from_fn(n, n, |i, j| 1.0 / (i as f64 + j as f64 + 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_from_diagonal() {
        let diag = DVector::from_vec(vec![4.0, -2.0, 1e-3]);
        assert_eq!(rank_from_diagonal(&diag, 1e-12), 3);
        let diag = DVector::from_vec(vec![4.0, -2.0, 1e-15]);
        assert_eq!(rank_from_diagonal(&diag, 1e-12), 2);
        let diag = DVector::from_vec(vec![0.0, 0.0]);
        assert_eq!(rank_from_diagonal(&diag, 1e-12), 0);
        let diag = DVector::from_vec(vec![f64::NAN, 1.0]);
        assert_eq!(rank_from_diagonal(&diag, 1e-12), 0);
    }

    #[test]
    fn test_poorly_conditioned() {
        let A = DMatrix::from_vec(2, 2, vec![1.0, 1.0, 1.00001, 1.0]);
        let threshold = 1e5;
        assert!(poorly_conditioned(&A, threshold));
    }

    #[test]
    fn test_poorly_conditioned_hilbert() {
        let A = hilbert_matrix(6);
        assert!(poorly_conditioned(&A, 1e5));
    }

    #[test]
    fn test_identity_is_well_conditioned() {
        let A = DMatrix::<f64>::identity(4, 4);
        assert!((condition_number(&A) - 1.0).abs() < 1e-12);
        assert!(!poorly_conditioned(&A, 10.0));
    }

    #[test]
    fn test_zero_matrix_condition_is_infinite() {
        let A = DMatrix::<f64>::zeros(3, 3);
        assert!(condition_number(&A).is_infinite());
    }
}
