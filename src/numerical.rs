//! Newton-Raphson solver for square nonlinear systems F(x) = 0 with the Jacobian computed
//! exactly by forward-mode automatic differentiation.

/// residual function trait, dual-number helpers and a set of reference systems
///  Example
/// ```
/// use RustedNewtonAD::numerical::residual_functions::{DualScalar, ResidualFunction};
/// use nalgebra::DVector;
/// // x^2 + y^2 - 10 = 0, x - y - 4 = 0
/// struct TwoCurves;
/// impl ResidualFunction for TwoCurves {
///     fn eval<D: DualScalar>(&self, x: &DVector<D>) -> DVector<D> {
///         DVector::from_vec(vec![
///             x[0].powi(2) + x[1].powi(2) - 10.0,
///             x[0].clone() - x[1].clone() - 4.0,
///         ])
///     }
/// }
/// let fx = TwoCurves.eval(&DVector::from_vec(vec![3.0, -1.0]));
/// assert_eq!(fx, DVector::from_vec(vec![0.0, 0.0]));
/// ```
pub mod residual_functions;
/// F(x) and J(x) in one dual-number sweep, real parts extraction
pub mod jacobian_AD;
/// termination status, final report and error type
pub mod newton_errors;
/// tolerance, iteration bound, linear solver choice and logging settings
pub mod solver_config;
/// Newton-Raphson iteration
///  Example
/// ```
/// use RustedNewtonAD::numerical::NR_AD::NewtonSolver;
/// use RustedNewtonAD::numerical::residual_functions::ReferenceSystem;
/// use RustedNewtonAD::numerical::solver_config::SolverConfig;
/// use RustedNewtonAD::somelinalg::dense_solvers::LinearSolverStrategy;
/// use nalgebra::DVector;
/// let config = SolverConfig::new(1e-10, 50)
///     .unwrap()
///     .with_linear_solver(LinearSolverStrategy::LU)
///     .with_loglevel(Some("off"))
///     .unwrap();
/// let mut NR_instanse = NewtonSolver::new(ReferenceSystem::ShiftedLinear, config);
/// let report = NR_instanse.main_loop(DVector::from_vec(vec![3.0, -5.0, 0.5])).unwrap();
/// assert!(report.is_converged());
/// println!("result = {:?} \n", NR_instanse.get_result().unwrap());
/// ```
pub mod NR_AD;
/// one-call entry points: Jacobian probe, plain solve, parallel multistart
pub mod NR_AD_api;
mod NR_AD_tests;
