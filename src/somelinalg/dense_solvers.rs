//! Dense solvers for the Newton step J*w = F(x).
//!
//! Two strategies are available:
//! - QR with column pivoting (default): more robust when J is close to singular or badly scaled
//! - LU with partial pivoting: cheaper, fine for well-conditioned J
//!
//! Both refuse to return a solution when the numerical rank of J, estimated from the diagonal of
//! the triangular factor, is lower than the dimension of the system.
use crate::somelinalg::linear_sys_diagnostics::rank_from_diagonal;
use log::debug;
use nalgebra::{DMatrix, DVector};
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, EnumIter, Display)]
pub enum LinearSolverStrategy {
    #[default]
    #[strum(serialize = "qr", ascii_case_insensitive)]
    QR,
    #[strum(serialize = "lu", ascii_case_insensitive)]
    LU,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LinearSolverError {
    /// matrix is not square or right-hand side has the wrong length
    DimensionMismatch { rows: usize, cols: usize, rhs: usize },
    /// numerical rank of the matrix is lower than its dimension
    Singular { rank: usize, dimension: usize },
}

impl fmt::Display for LinearSolverError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LinearSolverError::DimensionMismatch { rows, cols, rhs } => write!(
                f,
                "cannot solve a {}x{} system with a right-hand side of length {}",
                rows, cols, rhs
            ),
            LinearSolverError::Singular { rank, dimension } => write!(
                f,
                "matrix is numerically singular: rank {} < dimension {}",
                rank, dimension
            ),
        }
    }
}

impl std::error::Error for LinearSolverError {}

/// solve A*x = b with the chosen strategy.
/// `rank_threshold` is relative to the largest diagonal entry of the triangular factor.
pub fn solve_linear_system(
    strategy: LinearSolverStrategy,
    A: &DMatrix<f64>,
    b: &DVector<f64>,
    rank_threshold: f64,
) -> Result<DVector<f64>, LinearSolverError> {
    let (rows, cols) = A.shape();
    if rows != cols || b.len() != rows {
        return Err(LinearSolverError::DimensionMismatch {
            rows,
            cols,
            rhs: b.len(),
        });
    }
    let dimension = rows;
    match strategy {
        LinearSolverStrategy::QR => {
            let qr = A.clone().col_piv_qr();
            let rank = rank_from_diagonal(&qr.r().diagonal(), rank_threshold);
            debug!("QR: numerical rank {} of {}", rank, dimension);
            if rank < dimension {
                return Err(LinearSolverError::Singular { rank, dimension });
            }
            qr.solve(b)
                .filter(|x| x.iter().all(|v| v.is_finite()))
                .ok_or(LinearSolverError::Singular { rank, dimension })
        }
        LinearSolverStrategy::LU => {
            let lu = A.clone().lu();
            let rank = rank_from_diagonal(&lu.u().diagonal(), rank_threshold);
            debug!("LU: numerical rank {} of {}", rank, dimension);
            if rank < dimension {
                return Err(LinearSolverError::Singular { rank, dimension });
            }
            lu.solve(b)
                .filter(|x| x.iter().all(|v| v.is_finite()))
                .ok_or(LinearSolverError::Singular { rank, dimension })
        }
    }
}
