//!  Newton-Raphson driver with an exact Jacobian from forward-mode automatic differentiation
//!
//!  Example
//! ```
//!  use RustedNewtonAD::numerical::NR_AD::NewtonSolver;
//!  use RustedNewtonAD::numerical::residual_functions::ReferenceSystem;
//!  use RustedNewtonAD::numerical::solver_config::SolverConfig;
//!  use nalgebra::DVector;
//!
//!  let config = SolverConfig::default().with_loglevel(Some("off")).unwrap();
//!  let mut NR_instanse = NewtonSolver::new(ReferenceSystem::Wikipedia2D, config);
//!  let report = NR_instanse.solve(DVector::from_vec(vec![1.0, 1.0])).unwrap();
//!  assert!(report.is_converged());
//!  assert!((report.x[0] - 0.567).abs() < 1e-3);
//!  assert!((report.x[1] + 0.309).abs() < 1e-3);
//!  ```
//!
//! Each pass evaluates (F, J) at the current iterate in one dual-number sweep, tests
//! ||F(x)|| against the tolerance, solves J*w = F(x) and updates x <- x - w. The residual
//! checked for convergence is therefore always the residual of the iterate that is returned.
use crate::Utils::logger::init_logger;
use crate::Utils::timer::{SolverTimer, elapsed_time};
use crate::numerical::jacobian_AD::{JacobianEvaluation, evaluate};
use crate::numerical::newton_errors::{NewtonError, NewtonReport, TerminationStatus};
use crate::numerical::residual_functions::ResidualFunction;
use crate::numerical::solver_config::SolverConfig;
use crate::somelinalg::dense_solvers::{LinearSolverError, solve_linear_system};
use crate::somelinalg::linear_sys_diagnostics::poorly_conditioned;
use log::{debug, error, info, warn};
use nalgebra::DVector;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tabled::{builder::Builder, settings::Style};

const JAC_EVALS: &str = "number of jacobian evaluations";
const LINEAR_SOLVES: &str = "number of solving linear systems";

/// Receives (iteration counter, ||F(x)||) once per completed iteration.
/// Any `FnMut(usize, f64)` closure is an observer.
pub trait IterationObserver {
    fn on_iteration(&mut self, iteration: usize, residual_norm: f64);
}

impl<T: FnMut(usize, f64)> IterationObserver for T {
    fn on_iteration(&mut self, iteration: usize, residual_norm: f64) {
        self(iteration, residual_norm)
    }
}

pub struct NewtonSolver<F: ResidualFunction> {
    pub fun: F,               // residual function F(x)
    pub config: SolverConfig, // tolerance, max iterations, linear solver...
    pub i: usize,             // iteration counter
    pub result: Option<NewtonReport>,
    pub custom_timer: SolverTimer,
    observer: Option<Box<dyn IterationObserver>>,
    cancel_flag: Option<Arc<AtomicBool>>,
    calc_statistics: HashMap<String, usize>,
}

impl<F: ResidualFunction> NewtonSolver<F> {
    pub fn new(fun: F, config: SolverConfig) -> NewtonSolver<F> {
        NewtonSolver {
            fun,
            config,
            i: 0,
            result: None,
            custom_timer: SolverTimer::new(),
            observer: None,
            cancel_flag: None,
            calc_statistics: HashMap::new(),
        }
    }

    pub fn with_defaults(fun: F) -> NewtonSolver<F> {
        NewtonSolver::new(fun, SolverConfig::default())
    }
    ////////////////////////////SETTERS///////////////////////////////////////////////////////////////////
    pub fn set_observer<O: IterationObserver + 'static>(&mut self, observer: O) {
        self.observer = Some(Box::new(observer));
    }

    /// the flag is checked between iterations; once it is true the solve stops with `Cancelled`
    pub fn set_cancel_flag(&mut self, flag: Arc<AtomicBool>) {
        self.cancel_flag = Some(flag);
    }

    pub fn set_solver_params(
        &mut self,
        loglevel: Option<String>,
        linear_sys_method: Option<String>,
    ) -> Result<(), NewtonError> {
        let mut config = self.config.clone();
        if let Some(level) = loglevel {
            config = config.with_loglevel(Some(level.as_str()))?;
        }
        if let Some(method) = linear_sys_method {
            let strategy = method.parse().map_err(|_| {
                NewtonError::InvalidConfig(format!("linear_sys_method must be qr or lu, got {}", method))
            })?;
            config = config.with_linear_solver(strategy);
        }
        self.config = config;
        Ok(())
    }
    /////////////////////////////////////////////////////////////////////////////////////////////
    //                ITERATIONS
    /////////////////////////////////////////////////////////////////////////////////////////////
    fn evaluate_at(&mut self, x: &DVector<f64>) -> JacobianEvaluation {
        self.custom_timer.jac_tic();
        let ev = evaluate(&self.fun, x);
        self.custom_timer.jac_tac();
        *self.calc_statistics.entry(JAC_EVALS.to_string()).or_insert(0) += 1;
        ev
    }

    /// Newton step w from J*w = F(x)
    fn linear_step(&mut self, ev: &JacobianEvaluation) -> Result<DVector<f64>, LinearSolverError> {
        if let Some(threshold) = self.config.condition_warning {
            poorly_conditioned(&ev.jacobian, threshold);
        }
        self.custom_timer.linear_system_tic();
        let res = solve_linear_system(
            self.config.linear_solver,
            &ev.jacobian,
            &ev.residual,
            self.config.rank_threshold,
        );
        self.custom_timer.linear_system_tac();
        *self.calc_statistics.entry(LINEAR_SOLVES.to_string()).or_insert(0) += 1;
        res
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .map(|flag| flag.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    /// Runs the iteration from `initial_guess` to a terminal state.
    /// Errors only on structural problems; every numerical outcome comes back as a report.
    pub fn main_loop(&mut self, initial_guess: DVector<f64>) -> Result<NewtonReport, NewtonError> {
        self.config.validate()?;
        let n = initial_guess.len();
        if n == 0 {
            return Err(NewtonError::EmptyInitialGuess);
        }
        self.i = 0;
        self.result = None;
        self.calc_statistics.clear();
        let tolerance = self.config.tolerance;
        let max_iterations = self.config.max_iterations;
        info!(
            "solving {} with {} unknowns, linear solver = {}, tolerance = {:e}",
            self.fun.name(),
            n,
            self.config.linear_solver,
            tolerance
        );

        let mut x = initial_guess;
        let mut current = self.evaluate_at(&x);
        if current.residual.len() != n {
            error!(
                "residual function returned {} values for {} unknowns",
                current.residual.len(),
                n
            );
            return Err(NewtonError::DimensionMismatch {
                what: "residual",
                expected: n,
                found: current.residual.len(),
            });
        }
        let mut step: Option<DVector<f64>> = None;

        let status = loop {
            if !current.is_finite() {
                error!("F(x) or J(x) is not finite at iteration {}", self.i);
                break TerminationStatus::NonFiniteResidual;
            }
            let residual_norm = current.residual.norm();
            if residual_norm <= tolerance {
                info!("converged after {} iterations, ||F|| = {:e}", self.i, residual_norm);
                break TerminationStatus::Converged;
            }
            if self.i >= max_iterations {
                error!("Maximum number of iterations reached. No solution found.");
                break TerminationStatus::MaxItersExceeded;
            }
            if self.is_cancelled() {
                warn!("solve cancelled at iteration {}", self.i);
                break TerminationStatus::Cancelled;
            }

            let w = match self.linear_step(&current) {
                Ok(w) => w,
                Err(LinearSolverError::Singular { rank, dimension }) => {
                    error!(
                        "Jacobian is singular at iteration {}: rank {} < {}",
                        self.i, rank, dimension
                    );
                    break TerminationStatus::SingularJacobian { rank };
                }
                Err(e) => return Err(e.into()),
            };
            let new_x = &x - &w;
            self.i += 1;
            let next = self.evaluate_at(&new_x);
            if !next.is_finite() {
                error!(
                    "F(x) is not finite after iteration {}, keeping the last finite iterate",
                    self.i
                );
                step = Some(w);
                break TerminationStatus::NonFiniteResidual;
            }
            let new_norm = next.residual.norm();
            if new_norm > residual_norm {
                warn!("Residual is increasing: {:e} -> {:e}", residual_norm, new_norm);
            }
            debug!("iteration = {}, ||F|| = {:e}", self.i, new_norm);
            if let Some(observer) = self.observer.as_mut() {
                observer.on_iteration(self.i, new_norm);
            }
            x = new_x;
            current = next;
            step = Some(w);
        };

        let residual_norm = current.residual.norm();
        let report = NewtonReport {
            x,
            residual: current.residual,
            jacobian: current.jacobian,
            step,
            residual_norm,
            iterations: self.i,
            status,
            jacobian_evaluations: self.statistic(JAC_EVALS),
            linear_solves: self.statistic(LINEAR_SOLVES),
        };
        self.result = Some(report.clone());
        Ok(report)
    }
    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
    //                                       main functions to start the solver and caclulate statistics
    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
    pub fn solver(&mut self, initial_guess: DVector<f64>) -> Result<NewtonReport, NewtonError> {
        self.custom_timer.start();
        let begin = Instant::now();
        let res = self.main_loop(initial_guess);
        self.custom_timer.get_all();
        elapsed_time(begin.elapsed());
        if let Ok(report) = &res {
            self.calc_statistics(report);
        }
        res
    }

    /// wrapper around solver function to implement logging
    pub fn solve(&mut self, initial_guess: DVector<f64>) -> Result<NewtonReport, NewtonError> {
        if self.config.logging_enabled() {
            let loglevel = self.config.loglevel.clone().unwrap_or_else(|| "info".to_string());
            init_logger(&loglevel, self.config.log_to_file);
        }
        let res = self.solver(initial_guess);
        info!("Program ended");
        res
    }

    /// root of the last solve, only when it converged
    pub fn get_result(&self) -> Option<DVector<f64>> {
        self.result
            .as_ref()
            .filter(|report| report.is_converged())
            .map(|report| report.x.clone())
    }

    pub fn get_report(&self) -> Option<&NewtonReport> {
        self.result.as_ref()
    }

    fn statistic(&self, key: &str) -> usize {
        self.calc_statistics.get(key).copied().unwrap_or(0)
    }

    fn calc_statistics(&self, report: &NewtonReport) {
        let mut stats: HashMap<String, String> = self
            .calc_statistics
            .iter()
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect();
        stats.insert("length of x vector".to_string(), report.x.len().to_string());
        stats.insert("number of iterations".to_string(), report.iterations.to_string());
        stats.insert("residual norm".to_string(), format!("{:e}", report.residual_norm));
        stats.insert("status".to_string(), report.status.to_string());
        let mut table = Builder::from(stats).build();
        table.with(Style::modern_rounded());
        info!("\n \n CALC STATISTICS \n \n {}", table.to_string());
    }
}
