//! Plain-data rendering of a pipeline run for the JS side.

use roessler_core::equilibrium::{ComplexNumber, FixedPoint, Stability};
use roessler_core::pipeline::Exploration;
use roessler_core::system::State;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixedPointView {
    pub state: [f64; 3],
    /// Row-major 3x3 Jacobian at the fixed point.
    pub jacobian: Vec<f64>,
    pub eigenvalues: Vec<ComplexNumber>,
    pub stability: Stability,
}

impl From<&FixedPoint> for FixedPointView {
    fn from(fixed: &FixedPoint) -> Self {
        Self {
            state: components(&fixed.state),
            jacobian: fixed.linearization.jacobian.clone(),
            eigenvalues: fixed.linearization.eigenvalues.clone(),
            stability: fixed.linearization.stability,
        }
    }
}

/// Column-wise trajectory and section, ready for plotting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplorationView {
    pub times: Vec<f64>,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub zs: Vec<f64>,
    pub section_xs: Vec<f64>,
    pub section_ys: Vec<f64>,
    pub section_zs: Vec<f64>,
    pub warmup_end: [f64; 3],
    pub fixed_point: Option<FixedPointView>,
    /// Set instead of `fixed_point` when no real equilibrium exists.
    pub fixed_point_error: Option<String>,
}

impl From<&Exploration> for ExplorationView {
    fn from(run: &Exploration) -> Self {
        let states = run.trajectory.states();
        let (fixed_point, fixed_point_error) = match &run.fixed_point {
            Ok(fixed) => (Some(FixedPointView::from(fixed)), None),
            Err(err) => (None, Some(err.to_string())),
        };

        Self {
            times: run.trajectory.times().to_vec(),
            xs: states.iter().map(|s| s.x).collect(),
            ys: states.iter().map(|s| s.y).collect(),
            zs: states.iter().map(|s| s.z).collect(),
            section_xs: run.section.iter().map(|s| s.x).collect(),
            section_ys: run.section.iter().map(|s| s.y).collect(),
            section_zs: run.section.iter().map(|s| s.z).collect(),
            warmup_end: components(&run.warmup_end),
            fixed_point,
            fixed_point_error,
        }
    }
}

/// Interleaved `t, x, y, z` per sample.
pub fn interleaved_samples(run: &Exploration) -> Vec<f64> {
    let mut flat = Vec::with_capacity(run.trajectory.len() * 4);
    for (t, state) in run.trajectory.samples() {
        flat.extend_from_slice(&[t, state.x, state.y, state.z]);
    }
    flat
}

fn components(state: &State) -> [f64; 3] {
    [state.x, state.y, state.z]
}
