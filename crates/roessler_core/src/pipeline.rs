//! The recomputation pipeline run on every parameter change.
//!
//! 1. Integrate from the initial state over the warm-up time and keep only
//!    the final state.
//! 2. Integrate from there over the observation time with the full sample
//!    count.
//! 3. Extract the Poincaré section of that trajectory.
//! 4. Solve the fixed point for the current parameters.
//!
//! Every run starts over from the initial state; nothing is carried between
//! runs.

use crate::equilibrium::{solve_fixed_point, FixedPoint};
use crate::error::{ConfigError, FixedPointError};
use crate::integrator::{advance, integrate, IntegratorSettings, Trajectory};
use crate::poincare::SectionMode;
use crate::system::{Parameters, State};
use log::debug;
use serde::{Deserialize, Serialize};

/// Upper bound on the warm-up grid, reached only when `t1` is tiny next to `t0`.
pub const MAX_WARMUP_SAMPLES: usize = 10_000_000;

/// How many samples the warm-up integration uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmupSampling {
    /// `floor(t0 / t1 * n) + 1`, so the warm-up grid is as dense as the
    /// observation grid.
    #[default]
    Proportional,
    /// The full sample count regardless of the warm-up length.
    Full,
}

impl WarmupSampling {
    pub fn samples(self, warmup: f64, duration: f64, samples: usize) -> usize {
        match self {
            WarmupSampling::Proportional => {
                let scaled = (warmup / duration * samples as f64).floor() as usize;
                scaled.saturating_add(1).min(MAX_WARMUP_SAMPLES)
            }
            WarmupSampling::Full => samples,
        }
    }
}

/// Inputs of one run, captured at call time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub initial_state: State,
    pub parameters: Parameters,
    /// Warm-up time `t0`, discarded.
    pub warmup: f64,
    /// Observation time `t1`.
    pub duration: f64,
    pub samples: usize,
}

impl RunRequest {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_state.iter().all(|v| v.is_finite()) {
            return Err(ConfigError::NonFinite {
                field: "initial state",
            });
        }
        if !self.parameters.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "parameters",
            });
        }
        if !self.warmup.is_finite() {
            return Err(ConfigError::NonFinite { field: "warm-up" });
        }
        if self.warmup < 0.0 {
            return Err(ConfigError::NegativeWarmup(self.warmup));
        }
        if !self.duration.is_finite() {
            return Err(ConfigError::NonFinite { field: "duration" });
        }
        if self.duration <= 0.0 {
            return Err(ConfigError::NonPositiveDuration(self.duration));
        }
        if self.samples < 2 {
            return Err(ConfigError::TooFewSamples(self.samples));
        }
        Ok(())
    }
}

/// Knobs that select between the pipeline variants.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineOptions {
    #[serde(default)]
    pub section: SectionMode,
    #[serde(default)]
    pub warmup_sampling: WarmupSampling,
    #[serde(default)]
    pub integrator: IntegratorSettings,
}

impl PipelineOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.section.validate()?;
        Ok(self.integrator.validate()?)
    }
}

/// Everything the presentation layer draws after a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Exploration {
    /// State reached at the end of the warm-up.
    pub warmup_end: State,
    pub trajectory: Trajectory,
    pub section: Vec<State>,
    /// A missing real fixed point does not invalidate the rest.
    pub fixed_point: Result<FixedPoint, FixedPointError>,
}

pub fn explore(request: &RunRequest, options: &PipelineOptions) -> Result<Exploration, ConfigError> {
    request.validate()?;
    options.validate()?;

    let warmup_samples =
        options
            .warmup_sampling
            .samples(request.warmup, request.duration, request.samples);
    let warmup_end = advance(
        &request.initial_state,
        &request.parameters,
        request.warmup,
        warmup_samples,
        &options.integrator,
    )?;

    let trajectory = integrate(
        &warmup_end,
        &request.parameters,
        request.duration,
        request.samples,
        &options.integrator,
    )?;

    let section = options.section.extract(trajectory.states());
    let fixed_point = solve_fixed_point(&request.parameters);

    debug!(
        "explored a={} b={} c={} t0={} ({} warm-up samples) t1={} n={}: {} section points, fixed point {}",
        request.parameters.a,
        request.parameters.b,
        request.parameters.c,
        request.warmup,
        warmup_samples,
        request.duration,
        request.samples,
        section.len(),
        match &fixed_point {
            Ok(_) => "found".to_string(),
            Err(err) => err.to_string(),
        }
    );

    Ok(Exploration {
        warmup_end,
        trajectory,
        section,
        fixed_point,
    })
}
