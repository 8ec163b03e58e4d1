use crate::error::FixedPointError;
use crate::system::{jacobian, Parameters, State};
use nalgebra::Vector3;
use num_complex::Complex;
use serde::{Deserialize, Serialize};

/// Real parts closer to zero than this are treated as zero.
const HYPERBOLIC_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComplexNumber {
    pub re: f64,
    pub im: f64,
}

impl From<Complex<f64>> for ComplexNumber {
    fn from(value: Complex<f64>) -> Self {
        Self {
            re: value.re,
            im: value.im,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    /// Every eigenvalue has a negative real part.
    Stable,
    /// Every eigenvalue has a positive real part.
    Unstable,
    /// Mixed signs with a complex pair.
    SaddleFocus,
    /// Mixed signs, all eigenvalues real.
    Saddle,
    /// Some eigenvalue lies on the imaginary axis.
    NonHyperbolic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Linearization {
    /// Row-major 3x3 Jacobian.
    pub jacobian: Vec<f64>,
    pub eigenvalues: Vec<ComplexNumber>,
    pub stability: Stability,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixedPoint {
    pub state: State,
    pub linearization: Linearization,
}

/// The equilibrium `x* = (c - sqrt(c^2 - 4ab)) / 2`, `y* = -x*/a`, `z* = x*/a`.
///
/// A negative discriminant is reported instead of producing a NaN triple.
pub fn fixed_point(params: &Parameters) -> Result<State, FixedPointError> {
    if !params.is_finite() {
        return Err(FixedPointError::NonFinite);
    }
    if params.a == 0.0 {
        return Err(FixedPointError::DegenerateParameter);
    }
    let discriminant = params.c * params.c - 4.0 * params.a * params.b;
    if !discriminant.is_finite() {
        return Err(FixedPointError::NonFinite);
    }
    if discriminant < 0.0 {
        return Err(FixedPointError::NegativeDiscriminant { discriminant });
    }

    let x = (params.c - discriminant.sqrt()) / 2.0;
    Ok(Vector3::new(x, -x / params.a, x / params.a))
}

pub fn linearize(params: &Parameters, state: &State) -> Linearization {
    let matrix = jacobian(state, params);
    let eigenvalues = matrix.complex_eigenvalues();
    let stability = classify(eigenvalues.as_slice());

    let mut row_major = Vec::with_capacity(9);
    for i in 0..3 {
        for j in 0..3 {
            row_major.push(matrix[(i, j)]);
        }
    }

    Linearization {
        jacobian: row_major,
        eigenvalues: eigenvalues.iter().copied().map(ComplexNumber::from).collect(),
        stability,
    }
}

/// Fixed point together with its linearization.
pub fn solve_fixed_point(params: &Parameters) -> Result<FixedPoint, FixedPointError> {
    let state = fixed_point(params)?;
    let linearization = linearize(params, &state);
    Ok(FixedPoint {
        state,
        linearization,
    })
}

fn classify(eigenvalues: &[Complex<f64>]) -> Stability {
    if eigenvalues
        .iter()
        .any(|l| l.re.abs() <= HYPERBOLIC_TOLERANCE)
    {
        return Stability::NonHyperbolic;
    }
    let unstable = eigenvalues.iter().filter(|l| l.re > 0.0).count();
    if unstable == 0 {
        Stability::Stable
    } else if unstable == eigenvalues.len() {
        Stability::Unstable
    } else if eigenvalues.iter().any(|l| l.im != 0.0) {
        Stability::SaddleFocus
    } else {
        Stability::Saddle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::derivative;

    #[test]
    fn fixed_point_zeroes_the_vector_field() {
        let cases = [
            Parameters::new(0.25, 1.0, 2.4),
            Parameters::new(0.25, 1.0, 5.0),
            Parameters::new(0.2, 0.2, 5.7),
            Parameters::new(0.25, 1.0, 1.0),
        ];
        for params in cases {
            let state = fixed_point(&params).expect("real fixed point");
            for t in [0.0, 3.5, -10.0] {
                let d = derivative(&state, t, &params);
                assert!(d.norm() < 1e-12, "residual {:?} for {:?}", d, params);
            }
        }
    }

    #[test]
    fn negative_discriminant_is_reported() {
        let params = Parameters::new(0.25, 1.0, 0.5);
        match fixed_point(&params) {
            Err(FixedPointError::NegativeDiscriminant { discriminant }) => {
                assert!((discriminant + 0.75).abs() < 1e-15);
            }
            other => panic!("expected discriminant error, got {other:?}"),
        }
        let err = solve_fixed_point(&params).expect_err("no real fixed point");
        assert!(err.to_string().contains("no real fixed point"));
    }

    #[test]
    fn zero_discriminant_gives_double_root() {
        // c^2 = 4ab
        let params = Parameters::new(0.25, 1.0, 1.0);
        let state = fixed_point(&params).expect("double root");
        assert!((state.x - 0.5).abs() < 1e-15);
        assert!((state.y + 2.0).abs() < 1e-15);
        assert!((state.z - 2.0).abs() < 1e-15);
    }

    #[test]
    fn degenerate_and_non_finite_parameters_are_rejected() {
        assert_eq!(
            fixed_point(&Parameters::new(0.0, 1.0, 2.4)),
            Err(FixedPointError::DegenerateParameter)
        );
        assert_eq!(
            fixed_point(&Parameters::new(0.25, f64::NAN, 2.4)),
            Err(FixedPointError::NonFinite)
        );
        assert_eq!(
            fixed_point(&Parameters::new(0.25, 1.0, 1e300)),
            Err(FixedPointError::NonFinite)
        );
    }

    #[test]
    fn default_fixed_point_is_a_saddle_focus() {
        let fixed = solve_fixed_point(&Parameters::default()).expect("real fixed point");
        let lin = &fixed.linearization;
        assert_eq!(lin.jacobian.len(), 9);
        assert_eq!(lin.eigenvalues.len(), 3);
        assert_eq!(lin.stability, Stability::SaddleFocus);
        assert_eq!(lin.jacobian[1], -1.0);
        assert_eq!(lin.jacobian[3], 1.0);
        assert!((lin.jacobian[6] - fixed.state.z).abs() < 1e-15);
    }

    #[test]
    fn eigenvalue_trace_matches_jacobian_trace() {
        let params = Parameters::new(0.2, 0.2, 5.7);
        let fixed = solve_fixed_point(&params).expect("real fixed point");
        let lin = fixed.linearization;
        let trace = lin.jacobian[0] + lin.jacobian[4] + lin.jacobian[8];
        let sum_re: f64 = lin.eigenvalues.iter().map(|l| l.re).sum();
        let sum_im: f64 = lin.eigenvalues.iter().map(|l| l.im).sum();
        assert!((trace - sum_re).abs() < 1e-9);
        assert!(sum_im.abs() < 1e-9);
    }

    #[test]
    fn classify_covers_each_case() {
        let c = |re: f64, im: f64| Complex::new(re, im);
        assert_eq!(
            classify(&[c(-1.0, 0.0), c(-2.0, 1.0), c(-2.0, -1.0)]),
            Stability::Stable
        );
        assert_eq!(
            classify(&[c(1.0, 0.0), c(2.0, 0.0), c(3.0, 0.0)]),
            Stability::Unstable
        );
        assert_eq!(
            classify(&[c(-1.0, 0.0), c(0.5, 2.0), c(0.5, -2.0)]),
            Stability::SaddleFocus
        );
        assert_eq!(
            classify(&[c(-1.0, 0.0), c(0.5, 0.0), c(2.0, 0.0)]),
            Stability::Saddle
        );
        assert_eq!(
            classify(&[c(0.0, 1.0), c(0.0, -1.0), c(-1.0, 0.0)]),
            Stability::NonHyperbolic
        );
    }
}
