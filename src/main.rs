#![allow(non_snake_case)]
use RustedNewtonAD::numerical::NR_AD::NewtonSolver;
use RustedNewtonAD::numerical::NR_AD_api::{best_of, solve_multistart, solve_simple_jacobian};
use RustedNewtonAD::numerical::residual_functions::ReferenceSystem;
use RustedNewtonAD::numerical::solver_config::SolverConfig;
use RustedNewtonAD::somelinalg::dense_solvers::LinearSolverStrategy;
use nalgebra::DVector;
use strum::IntoEnumIterator;

fn main() {
    let example = 0;
    match example {
        0 => {
            // Newton-Raphson with logging and statistics
            let mut NR_instanse = NewtonSolver::with_defaults(ReferenceSystem::Wikipedia2D);
            match NR_instanse.solve(ReferenceSystem::Wikipedia2D.initial_guess()) {
                Ok(report) => println!("status = {}, result = {:?} \n", report.status, report.x),
                Err(e) => println!("error: {}", e),
            }
        }
        1 => {
            // Jacobian at the initial guess and the first Newton step by QR and LU
            let x0 = ReferenceSystem::VectorScaledBySum.initial_guess();
            match solve_simple_jacobian(&ReferenceSystem::VectorScaledBySum, &x0) {
                Ok(probe) => {
                    println!("jacobian = {} \n", probe.jacobian);
                    println!("F(x0) = {} \n", probe.fout);
                    println!("qr step = {}, lu step = {} \n", probe.qr, probe.lu_partial);
                }
                Err(e) => println!("error: {}", e),
            }
        }
        2 => {
            // every reference system with both linear solvers
            for system in ReferenceSystem::iter() {
                for strategy in LinearSolverStrategy::iter() {
                    let config = SolverConfig::default().with_linear_solver(strategy);
                    let mut NR_instanse = NewtonSolver::new(system, config);
                    match NR_instanse.main_loop(system.initial_guess()) {
                        Ok(report) => println!(
                            "{} ({}): {} after {} iterations, ||F|| = {:e}",
                            system, strategy, report.status, report.iterations, report.residual_norm
                        ),
                        Err(e) => println!("{} ({}): error: {}", system, strategy, e),
                    }
                }
            }
        }
        3 => {
            // several starting points solved in parallel
            let starts: Vec<DVector<f64>> = (0..8)
                .map(|k| DVector::from_vec(vec![-2.0 + 0.5 * k as f64, 1.0]))
                .collect();
            let results = solve_multistart(&ReferenceSystem::Wikipedia2D, starts, &SolverConfig::default());
            if let Some(best) = best_of(&results) {
                println!("best root = {:?}, ||F|| = {:e}", best.x, best.residual_norm);
            }
        }
        _ => println!("no such example"),
    }
}
