//! Jacobian evaluation by forward-mode automatic differentiation.
//!
//! One call of [`evaluate`] seeds a vector of dual numbers (one derivative direction per unknown),
//! evaluates the residual function once and returns both the primal residual F(x) and the full
//! Jacobian dF/dx. No finite differences are involved, so the Jacobian is exact up to rounding.
//! NaN or Inf produced by the residual function are passed through unchanged; detecting them is
//! the job of the caller.
use crate::numerical::residual_functions::{DualScalar, ResidualFunction};
use nalgebra::{DMatrix, DVector};
use num_dual::{Dual64, DualDVec64, jacobian};

/// residual and Jacobian at one point
#[derive(Debug, Clone, PartialEq)]
pub struct JacobianEvaluation {
    pub residual: DVector<f64>,
    pub jacobian: DMatrix<f64>,
}

impl JacobianEvaluation {
    pub fn is_finite(&self) -> bool {
        all_finite(self.residual.iter()) && all_finite(self.jacobian.iter())
    }
}

/// F(x) and J(x) in one dual-number pass
pub fn evaluate<F: ResidualFunction>(f: &F, x: &DVector<f64>) -> JacobianEvaluation {
    let (residual, jacobian) = jacobian(|x_dual: DVector<DualDVec64>| f.eval(&x_dual), x.clone());
    JacobianEvaluation { residual, jacobian }
}

/// F(x) only, evaluated over plain reals
pub fn evaluate_residual<F: ResidualFunction>(f: &F, x: &DVector<f64>) -> DVector<f64> {
    f.eval(x)
}

/// F(x) and the Jacobian-vector product J(x)*v, with a single-direction dual number
pub fn directional_derivative<F: ResidualFunction>(
    f: &F,
    x: &DVector<f64>,
    v: &DVector<f64>,
) -> (DVector<f64>, DVector<f64>) {
    assert_eq!(x.len(), v.len(), "direction must have the dimension of x");
    let x_dual: DVector<Dual64> = x.zip_map(v, |xi, vi| Dual64::new(xi, vi));
    let out = f.eval(&x_dual);
    (to_real(&out), out.map(|d| d.eps))
}

/// primal values of a dual-valued vector; derivative parts are dropped
pub fn to_real<D: DualScalar>(v: &DVector<D>) -> DVector<f64> {
    v.map(|d| d.re())
}

/// primal values of a dual-valued matrix, element order preserved
pub fn to_real_matrix<D: DualScalar>(m: &DMatrix<D>) -> DMatrix<f64> {
    m.map(|d| d.re())
}

pub fn all_finite<'a>(values: impl IntoIterator<Item = &'a f64>) -> bool {
    values.into_iter().all(|v| v.is_finite())
}
