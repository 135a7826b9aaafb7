//! One-call entry points around [`NewtonSolver`].
//!
//! - [`solve_simple_jacobian`]: a single Jacobian probe at x0 and the Newton step from both linear
//!   solvers, no iteration (diagnostics and tests)
//! - [`solve_newton`]: full Newton-Raphson solve with the given tolerance and iteration bound
//! - [`solve_multistart`]: independent solves from several starting points, run in parallel
//!
//! All vectors and matrices handed back are plain `f64` containers; derivative parts of dual
//! numbers never leave `jacobian_AD`.
use crate::numerical::NR_AD::NewtonSolver;
use crate::numerical::jacobian_AD::evaluate;
use crate::numerical::newton_errors::{NewtonError, NewtonReport};
use crate::numerical::residual_functions::ResidualFunction;
use crate::numerical::solver_config::SolverConfig;
use crate::somelinalg::dense_solvers::{LinearSolverStrategy, solve_linear_system};
use log::info;
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

/// Jacobian, residual and both Newton steps at one point
#[derive(Debug, Clone, PartialEq)]
pub struct JacobianProbe {
    pub jacobian: DMatrix<f64>,
    pub fout: DVector<f64>,
    /// J*w = F(x0) solved with column-pivoted QR
    pub qr: DVector<f64>,
    /// J*w = F(x0) solved with partially pivoted LU
    pub lu_partial: DVector<f64>,
}

pub fn solve_simple_jacobian<F: ResidualFunction>(
    f: &F,
    x0: &DVector<f64>,
) -> Result<JacobianProbe, NewtonError> {
    if x0.is_empty() {
        return Err(NewtonError::EmptyInitialGuess);
    }
    let rank_threshold = SolverConfig::default().rank_threshold;
    let ev = evaluate(f, x0);
    if ev.residual.len() != x0.len() {
        return Err(NewtonError::DimensionMismatch {
            what: "residual",
            expected: x0.len(),
            found: ev.residual.len(),
        });
    }
    if !ev.is_finite() {
        return Err(NewtonError::NonFiniteResidual { iteration: 0 });
    }
    let qr = solve_linear_system(LinearSolverStrategy::QR, &ev.jacobian, &ev.residual, rank_threshold)?;
    let lu_partial =
        solve_linear_system(LinearSolverStrategy::LU, &ev.jacobian, &ev.residual, rank_threshold)?;
    Ok(JacobianProbe {
        jacobian: ev.jacobian,
        fout: ev.residual,
        qr,
        lu_partial,
    })
}

/// Newton-Raphson with default settings apart from tolerance and iteration bound; logging is
/// left to the caller.
///
/// ```
/// use RustedNewtonAD::numerical::NR_AD_api::solve_newton;
/// use RustedNewtonAD::numerical::residual_functions::ReferenceSystem;
/// use nalgebra::DVector;
/// let report = solve_newton(ReferenceSystem::ShiftedLinear, DVector::from_vec(vec![2.0, 7.0]), 1e-12, 10).unwrap();
/// assert!(report.is_converged());
/// assert_eq!(report.iterations, 1);
/// ```
pub fn solve_newton<F: ResidualFunction>(
    f: F,
    x0: DVector<f64>,
    tolerance: f64,
    max_iterations: usize,
) -> Result<NewtonReport, NewtonError> {
    let config = SolverConfig::new(tolerance, max_iterations)?;
    let mut solver = NewtonSolver::new(f, config);
    solver.main_loop(x0)
}

/// Solves from every starting point independently and in parallel. Results come back in the
/// order of `starts`.
pub fn solve_multistart<F: ResidualFunction + Sync>(
    f: &F,
    starts: Vec<DVector<f64>>,
    config: &SolverConfig,
) -> Vec<Result<NewtonReport, NewtonError>> {
    info!("multistart solve of {} from {} points", f.name(), starts.len());
    starts
        .into_par_iter()
        .map(|x0| {
            let mut solver = NewtonSolver::new(f, config.clone());
            solver.main_loop(x0)
        })
        .collect()
}

/// the converged report with the smallest residual norm, if any start converged
pub fn best_of(results: &[Result<NewtonReport, NewtonError>]) -> Option<&NewtonReport> {
    results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .filter(|report| report.is_converged())
        .min_by(|a, b| a.residual_norm.total_cmp(&b.residual_norm))
}
