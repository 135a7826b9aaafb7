//! Residual functions F: R^n -> R^n written once and evaluated over plain reals or dual numbers.
//!
//! A residual function is any type implementing [`ResidualFunction`]. The single method is generic
//! over [`DualScalar`], so the same body is evaluated with `f64` (residual only) and with
//! `num_dual` dual numbers (residual together with exact partial derivatives).
//!
//! Example
//! ```
//! use RustedNewtonAD::numerical::residual_functions::{DualScalar, ResidualFunction};
//! use nalgebra::DVector;
//! struct Circle;
//! impl ResidualFunction for Circle {
//!     fn eval<D: DualScalar>(&self, x: &DVector<D>) -> DVector<D> {
//!         DVector::from_vec(vec![
//!             x[0].powi(2) + x[1].powi(2) - 10.0,
//!             x[0].clone() - x[1].clone() - 4.0,
//!         ])
//!     }
//! }
//! let f = Circle.eval(&DVector::from_vec(vec![3.0, -1.0]));
//! assert_eq!(f, DVector::from_vec(vec![0.0, 0.0]));
//! ```
use nalgebra::{DVector, Scalar};
use num_dual::DualNum;
use num_traits::Zero;
use strum_macros::{Display, EnumIter};

/// Numeric value a residual function may be evaluated over: `f64`, `Dual64`, `DualDVec64`, ...
pub trait DualScalar: DualNum<f64> + Scalar {}

impl<D> DualScalar for D where D: DualNum<f64> + Scalar {}

/// Pure mapping from a vector of unknowns to a vector of residuals.
///
/// Implementations must not keep state between calls and must only use operations
/// available on [`DualScalar`] (arithmetic, `powi`, `sin`, `exp`, ...), otherwise the
/// derivative information carried by dual inputs is lost.
pub trait ResidualFunction {
    fn eval<D: DualScalar>(&self, x: &DVector<D>) -> DVector<D>;

    /// name used in log messages
    fn name(&self) -> &str {
        "unnamed system"
    }
}

impl<T: ResidualFunction> ResidualFunction for &T {
    fn eval<D: DualScalar>(&self, x: &DVector<D>) -> DVector<D> {
        (**self).eval(x)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// sum of all components, kept generic so it propagates derivatives
pub fn dual_sum<D: DualScalar>(x: &DVector<D>) -> D {
    x.iter().fold(D::zero(), |acc, xi| acc + xi.clone())
}

/// Euclidean norm over dual values
pub fn dual_norm<D: DualScalar>(x: &DVector<D>) -> D {
    x.iter()
        .fold(D::zero(), |acc, xi| acc + xi.powi(2))
        .sqrt()
}

/// x scaled by the sum of its own components, F_i = x_i * sum(x)
pub fn vector_scaled_by_sum<D: DualScalar>(x: &DVector<D>) -> DVector<D> {
    let s = dual_sum(x);
    x.map(|xi| xi * s.clone())
}

// 2D system from the Newton's method article on Wikipedia
//  5*x1^2 + x1*x2^2 + sin^2(2*x2) = 2
//  exp(2*x1 - x2) + 4*x2 = 3
//  root (0.567..., -0.309...)
pub fn wikipedia_2d<D: DualScalar>(x: &DVector<D>) -> DVector<D> {
    let x1 = x[0].clone();
    let x2 = x[1].clone();
    let eq1 = x1.powi(2) * 5.0 + x1.clone() * x2.powi(2) + (x2.clone() * 2.0).sin().powi(2) - 2.0;
    let eq2 = (x1 * 2.0 - x2.clone()).exp() + x2 * 4.0 - 3.0;
    DVector::from_vec(vec![eq1, eq2])
}

/// a collection of systems with known behaviour for testing and benchmarking the solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, Display)]
pub enum ReferenceSystem {
    /// F(x) = x * sum(x), used to check the Jacobian, root at the origin
    VectorScaledBySum,
    /// the 2D Wikipedia example
    Wikipedia2D,
    /// F(x) = x + 1, linear, Newton lands on the root in one step
    ShiftedLinear,
    /// F_i(x) = sum(x) - (i+1), every row of J is (1, ..., 1)
    SingularLinear,
    /// F(x) = ln(x), Newton from x0 = 3 overshoots into x < 0
    LogarithmicBlowup,
}

impl ReferenceSystem {
    pub fn initial_guess(&self) -> DVector<f64> {
        match self {
            ReferenceSystem::VectorScaledBySum => DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            ReferenceSystem::Wikipedia2D => DVector::from_vec(vec![1.0, 1.0]),
            ReferenceSystem::ShiftedLinear => DVector::from_vec(vec![3.0, -5.0, 0.5]),
            ReferenceSystem::SingularLinear => DVector::from_vec(vec![0.0, 0.0]),
            ReferenceSystem::LogarithmicBlowup => DVector::from_vec(vec![3.0]),
        }
    }

    /// exact root for the dimension of `initial_guess`, where one exists and is known in closed form
    pub fn exact_root(&self) -> Option<DVector<f64>> {
        let n = self.initial_guess().len();
        match self {
            ReferenceSystem::VectorScaledBySum => Some(DVector::zeros(n)),
            ReferenceSystem::ShiftedLinear => Some(DVector::from_element(n, -1.0)),
            ReferenceSystem::LogarithmicBlowup => Some(DVector::from_element(n, 1.0)),
            ReferenceSystem::Wikipedia2D | ReferenceSystem::SingularLinear => None,
        }
    }
}

impl ResidualFunction for ReferenceSystem {
    fn eval<D: DualScalar>(&self, x: &DVector<D>) -> DVector<D> {
        match self {
            ReferenceSystem::VectorScaledBySum => vector_scaled_by_sum(x),
            ReferenceSystem::Wikipedia2D => wikipedia_2d(x),
            ReferenceSystem::ShiftedLinear => x.map(|xi| xi + 1.0),
            ReferenceSystem::SingularLinear => {
                let s = dual_sum(x);
                DVector::from_fn(x.len(), |i, _| s.clone() - (i + 1) as f64)
            }
            ReferenceSystem::LogarithmicBlowup => x.map(|xi| xi.ln()),
        }
    }

    fn name(&self) -> &str {
        match self {
            ReferenceSystem::VectorScaledBySum => "x * sum(x)",
            ReferenceSystem::Wikipedia2D => "wikipedia 2D system",
            ReferenceSystem::ShiftedLinear => "x + 1",
            ReferenceSystem::SingularLinear => "rank-one linear system",
            ReferenceSystem::LogarithmicBlowup => "ln(x)",
        }
    }
}
