#[cfg(test)]
mod tests {
    use crate::numerical::NR_AD::NewtonSolver;
    use crate::numerical::NR_AD_api::{best_of, solve_multistart, solve_newton, solve_simple_jacobian};
    use crate::numerical::newton_errors::{NewtonError, TerminationStatus};
    use crate::numerical::residual_functions::{DualScalar, ReferenceSystem, ResidualFunction};
    use crate::numerical::solver_config::SolverConfig;
    use crate::somelinalg::dense_solvers::LinearSolverStrategy;
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, DVector};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use strum::IntoEnumIterator;

    /// maps R^n to R^(n+1)
    struct MismatchedOutput;

    impl ResidualFunction for MismatchedOutput {
        fn eval<D: DualScalar>(&self, x: &DVector<D>) -> DVector<D> {
            DVector::from_fn(x.len() + 1, |i, _| x[i % x.len()].clone() * 2.0)
        }
    }

    /// x^2 - 2 componentwise, roots at +-sqrt(2)
    struct Squares;

    impl ResidualFunction for Squares {
        fn eval<D: DualScalar>(&self, x: &DVector<D>) -> DVector<D> {
            x.map(|xi| xi.powi(2) - 2.0)
        }
    }

    fn quiet_config() -> SolverConfig {
        SolverConfig::default().with_loglevel(Some("off")).unwrap()
    }

    #[test]
    fn test_simple_jacobian_probe() {
        let x = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let probe = solve_simple_jacobian(&ReferenceSystem::VectorScaledBySum, &x).unwrap();
        let expected = DMatrix::from_fn(5, 5, |i, j| if i == j { 15.0 + x[i] } else { x[i] });
        assert_relative_eq!(probe.jacobian, expected, epsilon = 1e-12);
        assert_eq!(probe.fout, &x * 15.0);
        // both strategies solve J*w = F(x)
        assert_relative_eq!(&probe.jacobian * &probe.qr, probe.fout, epsilon = 1e-10);
        assert_relative_eq!(probe.qr, probe.lu_partial, max_relative = 1e-8);
    }

    #[test]
    fn test_root_recovery_wikipedia_2d() {
        let report = solve_newton(ReferenceSystem::Wikipedia2D, DVector::from_vec(vec![1.0, 1.0]), 1e-9, 100)
            .unwrap();
        assert_eq!(report.status, TerminationStatus::Converged);
        assert!(report.residual_norm <= 1e-9);
        assert!(report.iterations < 20, "took {} iterations", report.iterations);
        assert_relative_eq!(report.x[0], 0.567, epsilon = 1e-3);
        assert_relative_eq!(report.x[1], -0.309, epsilon = 1e-3);
        // the reported residual belongs to the reported iterate
        let fx = ReferenceSystem::Wikipedia2D.eval(&report.x);
        assert_relative_eq!(fx, report.residual, epsilon = 1e-15);
        assert_relative_eq!(report.residual_norm, fx.norm(), epsilon = 1e-15);
        assert_eq!(report.linear_solves, report.iterations);
        assert_eq!(report.jacobian_evaluations, report.iterations + 1);
        assert!(report.step.is_some());
    }

    #[test]
    fn test_lu_strategy_converges_to_same_root() {
        let x0 = DVector::from_vec(vec![1.0, 1.0]);
        let mut qr_solver = NewtonSolver::new(ReferenceSystem::Wikipedia2D, quiet_config());
        let mut lu_solver = NewtonSolver::new(
            ReferenceSystem::Wikipedia2D,
            quiet_config().with_linear_solver(LinearSolverStrategy::LU),
        );
        let qr = qr_solver.main_loop(x0.clone()).unwrap();
        let lu = lu_solver.main_loop(x0).unwrap();
        assert!(qr.is_converged() && lu.is_converged());
        assert_relative_eq!(qr.x, lu.x, epsilon = 1e-9);
    }

    #[test]
    fn test_immediate_convergence() {
        let root = ReferenceSystem::ShiftedLinear.exact_root().unwrap();
        let mut solver = NewtonSolver::new(ReferenceSystem::ShiftedLinear, quiet_config());
        let report = solver.main_loop(root.clone()).unwrap();
        assert_eq!(report.status, TerminationStatus::Converged);
        assert_eq!(report.iterations, 0);
        assert_eq!(report.linear_solves, 0);
        assert_eq!(report.step, None);
        assert_eq!(report.x, root);
        assert_eq!(solver.get_result(), Some(root));
    }

    #[test]
    fn test_linear_system_converges_in_one_step() {
        let report = solve_newton(
            ReferenceSystem::ShiftedLinear,
            ReferenceSystem::ShiftedLinear.initial_guess(),
            1e-12,
            10,
        )
        .unwrap();
        assert!(report.is_converged());
        assert_eq!(report.iterations, 1);
        assert_relative_eq!(report.x, DVector::from_element(3, -1.0), epsilon = 1e-14);
    }

    #[test]
    fn test_max_iterations_reported() {
        let mut solver = NewtonSolver::new(
            ReferenceSystem::Wikipedia2D,
            quiet_config().with_max_iterations(1).unwrap(),
        );
        let report = solver.main_loop(DVector::from_vec(vec![1.0, 1.0])).unwrap();
        assert_eq!(report.status, TerminationStatus::MaxItersExceeded);
        assert_eq!(report.iterations, 1);
        assert!(report.residual_norm > 1e-9);
        assert_eq!(report.x.len(), 2);
        assert_eq!(solver.get_result(), None);
        assert!(solver.get_report().is_some());
        assert!(matches!(
            report.into_result(),
            Err(NewtonError::NonConvergence { iterations: 1, .. })
        ));
    }

    #[test]
    fn test_singular_jacobian_reported() {
        for strategy in LinearSolverStrategy::iter() {
            let mut solver = NewtonSolver::new(
                ReferenceSystem::SingularLinear,
                quiet_config().with_linear_solver(strategy),
            );
            let x0 = ReferenceSystem::SingularLinear.initial_guess();
            let report = solver.main_loop(x0.clone()).unwrap();
            assert_eq!(report.status, TerminationStatus::SingularJacobian { rank: 1 });
            assert_eq!(report.iterations, 0);
            assert_eq!(report.x, x0);
            assert_eq!(report.linear_solves, 1);
        }
    }

    #[test]
    fn test_non_finite_residual_keeps_last_finite_iterate() {
        let x0 = ReferenceSystem::LogarithmicBlowup.initial_guess();
        let mut solver = NewtonSolver::new(ReferenceSystem::LogarithmicBlowup, quiet_config());
        let report = solver.main_loop(x0.clone()).unwrap();
        assert_eq!(report.status, TerminationStatus::NonFiniteResidual);
        assert_eq!(report.iterations, 1);
        assert_eq!(report.x, x0);
        assert!(report.residual_norm.is_finite());
        // the rejected step: 3*ln(3)
        let step = report.step.unwrap();
        assert_relative_eq!(step[0], 3.0 * 3.0f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn test_non_finite_at_initial_guess() {
        let mut solver = NewtonSolver::new(ReferenceSystem::LogarithmicBlowup, quiet_config());
        let report = solver.main_loop(DVector::from_vec(vec![-2.0])).unwrap();
        assert_eq!(report.status, TerminationStatus::NonFiniteResidual);
        assert_eq!(report.iterations, 0);
        assert_eq!(report.linear_solves, 0);
    }

    #[test]
    fn test_logarithm_converges_from_close_start() {
        let report = solve_newton(ReferenceSystem::LogarithmicBlowup, DVector::from_vec(vec![1.5]), 1e-12, 50)
            .unwrap();
        assert!(report.is_converged());
        assert_relative_eq!(report.x[0], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut solver = NewtonSolver::new(MismatchedOutput, quiet_config());
        let res = solver.main_loop(DVector::from_vec(vec![1.0, 2.0]));
        assert_eq!(
            res,
            Err(NewtonError::DimensionMismatch {
                what: "residual",
                expected: 2,
                found: 3
            })
        );
        assert!(matches!(
            solve_simple_jacobian(&MismatchedOutput, &DVector::from_vec(vec![1.0])),
            Err(NewtonError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_initial_guess() {
        let mut solver = NewtonSolver::new(Squares, quiet_config());
        assert_eq!(solver.main_loop(DVector::zeros(0)), Err(NewtonError::EmptyInitialGuess));
        assert_eq!(
            solve_simple_jacobian(&Squares, &DVector::zeros(0)),
            Err(NewtonError::EmptyInitialGuess)
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = quiet_config();
        config.tolerance = -1.0;
        let mut solver = NewtonSolver::new(Squares, config);
        assert!(matches!(
            solver.main_loop(DVector::from_vec(vec![1.0])),
            Err(NewtonError::InvalidConfig(_))
        ));
        assert!(solve_newton(Squares, DVector::from_vec(vec![1.0]), 1e-9, 0).is_err());
    }

    #[test]
    fn test_set_solver_params() {
        let mut solver = NewtonSolver::new(Squares, quiet_config());
        solver
            .set_solver_params(Some("warn".to_string()), Some("LU".to_string()))
            .unwrap();
        assert_eq!(solver.config.linear_solver, LinearSolverStrategy::LU);
        assert_eq!(solver.config.loglevel.as_deref(), Some("warn"));
        assert!(solver.set_solver_params(None, Some("inv".to_string())).is_err());
        assert!(solver.set_solver_params(Some("chatty".to_string()), None).is_err());
        assert_eq!(solver.config.linear_solver, LinearSolverStrategy::LU);
    }

    #[test]
    fn test_observer_sees_every_iteration() {
        let seen: Arc<Mutex<Vec<(usize, f64)>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut solver = NewtonSolver::new(ReferenceSystem::Wikipedia2D, quiet_config());
        solver.set_observer(move |i: usize, norm: f64| sink.lock().unwrap().push((i, norm)));
        let report = solver.main_loop(DVector::from_vec(vec![1.0, 1.0])).unwrap();
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), report.iterations);
        let counters: Vec<usize> = seen.iter().map(|(i, _)| *i).collect();
        assert_eq!(counters, (1..=report.iterations).collect::<Vec<_>>());
        let (_, last_norm) = seen[seen.len() - 1];
        assert_eq!(last_norm, report.residual_norm);
    }

    #[test]
    fn test_cancellation_between_iterations() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut solver = NewtonSolver::new(ReferenceSystem::Wikipedia2D, quiet_config());
        solver.set_cancel_flag(Arc::clone(&flag));
        let trigger = Arc::clone(&flag);
        solver.set_observer(move |i: usize, _norm: f64| {
            if i == 2 {
                trigger.store(true, Ordering::Relaxed);
            }
        });
        let report = solver.main_loop(DVector::from_vec(vec![1.0, 1.0])).unwrap();
        assert_eq!(report.status, TerminationStatus::Cancelled);
        assert_eq!(report.iterations, 2);
        assert_eq!(report.into_result(), Err(NewtonError::Cancelled { iteration: 2 }));
    }

    #[test]
    fn test_solve_with_statistics() {
        let config = SolverConfig::default()
            .with_loglevel(Some("off"))
            .unwrap()
            .with_condition_warning(Some(1e12));
        let mut solver = NewtonSolver::new(ReferenceSystem::Wikipedia2D, config);
        let report = solver.solve(DVector::from_vec(vec![1.0, 1.0])).unwrap();
        assert!(report.is_converged());
        assert_eq!(solver.get_result(), Some(report.x));
    }

    #[test]
    fn test_multistart_finds_both_roots() {
        let starts = vec![
            DVector::from_vec(vec![1.0]),
            DVector::from_vec(vec![-3.0]),
            DVector::from_vec(vec![0.0]),
            DVector::zeros(0),
        ];
        let results = solve_multistart(&Squares, starts, &quiet_config());
        assert_eq!(results.len(), 4);
        let first = results[0].as_ref().unwrap();
        let second = results[1].as_ref().unwrap();
        assert!(first.is_converged() && second.is_converged());
        assert_relative_eq!(first.x[0], 2.0f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(second.x[0], -(2.0f64.sqrt()), epsilon = 1e-9);
        // J = 2x vanishes at the origin
        assert_eq!(
            results[2].as_ref().unwrap().status,
            TerminationStatus::SingularJacobian { rank: 0 }
        );
        assert_eq!(results[3], Err(NewtonError::EmptyInitialGuess));
        assert!(best_of(&results).unwrap().residual_norm <= 1e-9);
    }

    #[test]
    fn test_every_reference_system_terminates() {
        for system in ReferenceSystem::iter() {
            let mut solver = NewtonSolver::new(system, quiet_config());
            let report = solver.main_loop(system.initial_guess()).unwrap();
            assert!(report.iterations <= 100, "{}: {}", system, report.status);
            if report.is_converged() {
                assert!(report.residual_norm <= 1e-9);
                // x*sum(x) has a singular Jacobian at its root, convergence there is only linear
                if let Some(root) = system.exact_root() {
                    assert_relative_eq!(report.x, root, epsilon = 1e-3);
                }
            }
        }
    }
}
