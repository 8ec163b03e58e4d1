//! The Rössler vector field.
//!
//! ```text
//! dx/dt = -y - z
//! dy/dt = x + a y
//! dz/dt = b + (x - c) z
//! ```
//!
//! The system is autonomous; the time argument is accepted for the solver
//! interface and ignored.

use crate::traits::{DynamicalSystem, Scalar};
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// A point `(x, y, z)` in phase space.
pub type State = Vector3<f64>;

/// Coefficients `(a, b, c)` of the vector field. `a` and `b` are usually held
/// fixed while `c` acts as the bifurcation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            a: 0.25,
            b: 1.0,
            c: 2.4,
        }
    }
}

impl Parameters {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Self { a, b, c }
    }

    pub fn with_c(self, c: f64) -> Self {
        Self { c, ..self }
    }

    pub fn is_finite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite() && self.c.is_finite()
    }
}

/// Derivative of the flow at `state`. Overflow is not trapped.
pub fn derivative(state: &State, _t: f64, params: &Parameters) -> State {
    Vector3::new(
        -state.y - state.z,
        state.x + params.a * state.y,
        params.b + (state.x - params.c) * state.z,
    )
}

/// Jacobian of the vector field at `state`.
#[rustfmt::skip]
pub fn jacobian(state: &State, params: &Parameters) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -1.0, -1.0,
        1.0, params.a, 0.0,
        state.z, 0.0, state.x - params.c,
    )
}

/// The vector field bound to a parameter set, usable by the generic steppers.
#[derive(Debug, Clone, Copy)]
pub struct Roessler<T> {
    pub a: T,
    pub b: T,
    pub c: T,
}

impl<T: Scalar> Roessler<T> {
    pub fn new(params: &Parameters) -> Option<Self> {
        Some(Self {
            a: T::from_f64(params.a)?,
            b: T::from_f64(params.b)?,
            c: T::from_f64(params.c)?,
        })
    }
}

impl<T: Scalar> DynamicalSystem<T> for Roessler<T> {
    fn dimension(&self) -> usize {
        3
    }

    fn apply(&self, _t: T, x: &[T], out: &mut [T]) {
        out[0] = -x[1] - x[2];
        out[1] = x[0] + self.a * x[1];
        out[2] = self.b + (x[0] - self.c) * x[2];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivative_matches_closed_form() {
        let params = Parameters::new(0.2, 0.3, 5.7);
        let state = Vector3::new(1.0, -2.0, 0.5);
        let d = derivative(&state, 0.0, &params);
        assert!((d.x - 1.5).abs() < 1e-15);
        assert!((d.y - 0.6).abs() < 1e-15);
        assert!((d.z - (0.3 + (1.0 - 5.7) * 0.5)).abs() < 1e-15);
    }

    #[test]
    fn derivative_ignores_time() {
        let params = Parameters::default();
        let state = Vector3::new(0.0, 1.0, 0.5);
        assert_eq!(
            derivative(&state, 0.0, &params),
            derivative(&state, 123.0, &params)
        );
    }

    #[test]
    fn generic_system_agrees_with_vector_form() {
        let params = Parameters::default();
        let system = Roessler::<f64>::new(&params).expect("finite parameters");
        let state = Vector3::new(0.3, -1.1, 2.0);
        let mut out = [0.0; 3];
        system.apply(7.0, state.as_slice(), &mut out);
        let expected = derivative(&state, 7.0, &params);
        for i in 0..3 {
            assert_eq!(out[i], expected[i]);
        }
        assert_eq!(system.dimension(), 3);
    }

    #[test]
    fn jacobian_matches_finite_differences() {
        let params = Parameters::default();
        let state = Vector3::new(0.7, -0.4, 1.3);
        let jac = jacobian(&state, &params);
        let h = 1e-6;
        for j in 0..3 {
            let mut plus = state;
            let mut minus = state;
            plus[j] += h;
            minus[j] -= h;
            let column = (derivative(&plus, 0.0, &params) - derivative(&minus, 0.0, &params))
                / (2.0 * h);
            for i in 0..3 {
                assert!((jac[(i, j)] - column[i]).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn large_states_overflow_without_panicking() {
        let params = Parameters::default();
        let state = Vector3::new(f64::MAX, 0.0, f64::MAX);
        let d = derivative(&state, 0.0, &params);
        assert!(!d.z.is_finite());
    }
}
