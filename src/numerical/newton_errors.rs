//! Outcome types of a Newton-Raphson solve.
//!
//! Structural problems (empty initial guess, residual function of the wrong dimension, bad
//! configuration) are returned as `Err(NewtonError)`. Numerical outcomes are never errors at
//! that level: the solver returns a [`NewtonReport`] whose [`TerminationStatus`] says how the
//! iteration ended, together with the last iterate, residual and Jacobian.
//! [`NewtonReport::into_result`] turns a non-converged report into the matching error for
//! callers that only want a root.
use crate::somelinalg::dense_solvers::LinearSolverError;
use nalgebra::{DMatrix, DVector};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationStatus {
    /// ||F(x)|| <= tolerance
    Converged,
    /// iteration counter reached max_iterations, the last iterate is still returned
    MaxItersExceeded,
    /// the linear solver found J numerically singular
    SingularJacobian { rank: usize },
    /// F(x) or J(x) contained NaN or Inf, the last finite iterate is returned
    NonFiniteResidual,
    /// the cancellation flag was raised between two iterations
    Cancelled,
}

impl TerminationStatus {
    pub fn is_converged(&self) -> bool {
        matches!(self, TerminationStatus::Converged)
    }
}

impl fmt::Display for TerminationStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TerminationStatus::Converged => write!(f, "converged"),
            TerminationStatus::MaxItersExceeded => write!(f, "maximum number of iterations exceeded"),
            TerminationStatus::SingularJacobian { rank } => {
                write!(f, "singular Jacobian (numerical rank {})", rank)
            }
            TerminationStatus::NonFiniteResidual => write!(f, "non-finite residual"),
            TerminationStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// everything known about the solve when it stopped
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonReport {
    /// last iterate
    pub x: DVector<f64>,
    /// F(x) at the last iterate
    pub residual: DVector<f64>,
    /// J(x) at the last iterate
    pub jacobian: DMatrix<f64>,
    /// last Newton step computed (also when it led to a non-finite residual), None before the first
    pub step: Option<DVector<f64>>,
    pub residual_norm: f64,
    pub iterations: usize,
    pub status: TerminationStatus,
    pub jacobian_evaluations: usize,
    pub linear_solves: usize,
}

impl NewtonReport {
    pub fn is_converged(&self) -> bool {
        self.status.is_converged()
    }

    pub fn into_result(self) -> Result<NewtonReport, NewtonError> {
        match self.status {
            TerminationStatus::Converged => Ok(self),
            TerminationStatus::MaxItersExceeded => Err(NewtonError::NonConvergence {
                iterations: self.iterations,
                residual_norm: self.residual_norm,
            }),
            TerminationStatus::SingularJacobian { rank } => Err(NewtonError::SingularJacobian {
                iteration: self.iterations,
                rank,
                dimension: self.x.len(),
            }),
            TerminationStatus::NonFiniteResidual => Err(NewtonError::NonFiniteResidual {
                iteration: self.iterations,
            }),
            TerminationStatus::Cancelled => Err(NewtonError::Cancelled {
                iteration: self.iterations,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NewtonError {
    EmptyInitialGuess,
    /// residual function output or Jacobian shape disagrees with the length of x
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    SingularJacobian {
        iteration: usize,
        rank: usize,
        dimension: usize,
    },
    NonFiniteResidual {
        iteration: usize,
    },
    NonConvergence {
        iterations: usize,
        residual_norm: f64,
    },
    Cancelled {
        iteration: usize,
    },
    InvalidConfig(String),
}

impl fmt::Display for NewtonError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NewtonError::EmptyInitialGuess => write!(f, "initial guess should not be empty"),
            NewtonError::DimensionMismatch {
                what,
                expected,
                found,
            } => write!(
                f,
                "dimension mismatch: {} has length {}, expected {}",
                what, found, expected
            ),
            NewtonError::SingularJacobian {
                iteration,
                rank,
                dimension,
            } => write!(
                f,
                "singular Jacobian at iteration {}: rank {} < dimension {}",
                iteration, rank, dimension
            ),
            NewtonError::NonFiniteResidual { iteration } => {
                write!(f, "residual is not finite at iteration {}", iteration)
            }
            NewtonError::NonConvergence {
                iterations,
                residual_norm,
            } => write!(
                f,
                "no convergence after {} iterations, residual norm {:e}",
                iterations, residual_norm
            ),
            NewtonError::Cancelled { iteration } => {
                write!(f, "solve cancelled at iteration {}", iteration)
            }
            NewtonError::InvalidConfig(msg) => write!(f, "invalid solver configuration: {}", msg),
        }
    }
}

impl std::error::Error for NewtonError {}

impl From<LinearSolverError> for NewtonError {
    fn from(e: LinearSolverError) -> Self {
        match e {
            LinearSolverError::Singular { rank, dimension } => NewtonError::SingularJacobian {
                iteration: 0,
                rank,
                dimension,
            },
            LinearSolverError::DimensionMismatch { rows, cols, rhs } => {
                if rows != cols {
                    NewtonError::DimensionMismatch {
                        what: "jacobian rows",
                        expected: cols,
                        found: rows,
                    }
                } else {
                    NewtonError::DimensionMismatch {
                        what: "residual",
                        expected: rows,
                        found: rhs,
                    }
                }
            }
        }
    }
}
