//! Sampling a solution of the Rössler system on a uniform time grid.
//!
//! The grid has `samples` points spread evenly over `[0, duration]`; with a
//! single sample the grid is just `[0]`. The stepper is forced to land on
//! every grid time, so a sample is the state at exactly that time rather than
//! an interpolant.
//!
//! A solution that blows up is not an error. Once the state turns non-finite
//! (or the adaptive step collapses) the current and every later sample are
//! NaN, and a warning is logged. The step budget applies to each grid
//! interval separately, so a long grid never runs out of steps by itself.

use crate::error::IntegrationError;
use crate::solvers::{Tolerances, Tsit5, RK4};
use crate::system::{Parameters, Roessler, State};
use crate::traits::{AdaptiveSteppable, Steppable};
use log::warn;
use serde::{Deserialize, Serialize};

/// Fixed-step schemes available through [`IntegrationMethod::Fixed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixedScheme {
    Rk4,
    Tsit5,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntegrationMethod {
    /// Tsitouras 5(4) with error control.
    Tsit5Adaptive,
    /// `substeps` equal steps per grid interval.
    Fixed { scheme: FixedScheme, substeps: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntegratorSettings {
    pub method: IntegrationMethod,
    pub rtol: f64,
    pub atol: f64,
    pub initial_step: f64,
    pub min_step: f64,
    /// Step budget for each grid interval.
    pub max_steps: usize,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            method: IntegrationMethod::Tsit5Adaptive,
            rtol: 1.49012e-8,
            atol: 1.49012e-8,
            initial_step: 1e-3,
            min_step: 1e-12,
            max_steps: 100_000,
        }
    }
}

impl IntegratorSettings {
    pub fn validate(&self) -> Result<(), IntegrationError> {
        if !(self.rtol.is_finite() && self.rtol > 0.0) {
            return Err(IntegrationError::InvalidSettings("rtol must be positive"));
        }
        if !(self.atol.is_finite() && self.atol > 0.0) {
            return Err(IntegrationError::InvalidSettings("atol must be positive"));
        }
        if !(self.initial_step.is_finite() && self.initial_step > 0.0) {
            return Err(IntegrationError::InvalidSettings(
                "initial_step must be positive",
            ));
        }
        if !(self.min_step > 0.0 && self.min_step <= self.initial_step) {
            return Err(IntegrationError::InvalidSettings(
                "min_step must be positive and not exceed initial_step",
            ));
        }
        if self.max_steps == 0 {
            return Err(IntegrationError::InvalidSettings(
                "max_steps must be greater than zero",
            ));
        }
        if let IntegrationMethod::Fixed { substeps, .. } = self.method {
            if substeps == 0 {
                return Err(IntegrationError::InvalidSettings(
                    "substeps must be greater than zero",
                ));
            }
            if substeps > self.max_steps {
                return Err(IntegrationError::InvalidSettings(
                    "substeps must not exceed max_steps",
                ));
            }
        }
        Ok(())
    }
}

/// States sampled on a uniform time grid, in time order.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    times: Vec<f64>,
    states: Vec<State>,
}

impl Trajectory {
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn samples(&self) -> impl Iterator<Item = (f64, &State)> + '_ {
        self.times.iter().copied().zip(self.states.iter())
    }

    pub fn final_state(&self) -> Option<&State> {
        self.states.last()
    }

    /// Index of the first sample with a NaN or infinite component.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.states
            .iter()
            .position(|s| !s.iter().all(|v| v.is_finite()))
    }
}

/// Time of grid point `index`.
pub fn grid_time(duration: f64, samples: usize, index: usize) -> f64 {
    if samples <= 1 {
        0.0
    } else {
        duration * index as f64 / (samples - 1) as f64
    }
}

pub fn time_grid(duration: f64, samples: usize) -> Vec<f64> {
    (0..samples)
        .map(|i| grid_time(duration, samples, i))
        .collect()
}

/// Integrates from `initial` over `[0, duration]` and records `samples` states.
pub fn integrate(
    initial: &State,
    params: &Parameters,
    duration: f64,
    samples: usize,
    settings: &IntegratorSettings,
) -> Result<Trajectory, IntegrationError> {
    let mut times = Vec::with_capacity(samples);
    let mut states = Vec::with_capacity(samples);
    walk_grid(
        initial,
        params,
        duration,
        samples,
        settings,
        Landing::EverySample,
        |t, state| {
            times.push(t);
            states.push(*state);
        },
    )?;
    Ok(Trajectory { times, states })
}

/// State at the end of the grid, without keeping the samples.
///
/// The fixed-step methods walk the same grid as [`integrate`] and reproduce
/// its last sample exactly. The adaptive method steps straight to `duration`
/// with the budget of all grid intervals combined, so it agrees with
/// [`integrate`] to within the tolerances and its cost does not grow with
/// `samples`.
pub fn advance(
    initial: &State,
    params: &Parameters,
    duration: f64,
    samples: usize,
    settings: &IntegratorSettings,
) -> Result<State, IntegrationError> {
    let mut last = *initial;
    walk_grid(
        initial,
        params,
        duration,
        samples,
        settings,
        Landing::FinalOnly,
        |_, state| {
            last = *state;
        },
    )?;
    Ok(last)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Landing {
    EverySample,
    FinalOnly,
}

fn walk_grid<F>(
    initial: &State,
    params: &Parameters,
    duration: f64,
    samples: usize,
    settings: &IntegratorSettings,
    landing: Landing,
    mut visit: F,
) -> Result<(), IntegrationError>
where
    F: FnMut(f64, &State),
{
    if samples == 0 {
        return Err(IntegrationError::NoSamples);
    }
    if !(duration.is_finite() && duration >= 0.0) {
        return Err(IntegrationError::InvalidDuration(duration));
    }
    settings.validate()?;

    visit(0.0, initial);
    if samples == 1 {
        return Ok(());
    }

    let Some(system) = Roessler::<f64>::new(params) else {
        return Err(IntegrationError::InvalidSettings(
            "parameters are not representable",
        ));
    };
    let mut marcher = Marcher::new(settings);
    let mut t = 0.0;
    let mut y = [initial.x, initial.y, initial.z];

    if landing == Landing::FinalOnly && marcher.is_adaptive() {
        let end = grid_time(duration, samples, samples - 1);
        let budget = settings.max_steps.saturating_mul(samples - 1);
        match marcher.march(&system, &mut t, &mut y, end, budget) {
            Ok(()) => visit(end, &State::from(y)),
            Err(divergence) => {
                warn!(
                    "integration diverged at t = {:.6} ({}); final state set to NaN",
                    divergence.t, divergence.reason
                );
                visit(end, &State::from_element(f64::NAN));
            }
        }
        return Ok(());
    }

    for index in 1..samples {
        let target = grid_time(duration, samples, index);
        let marched = marcher.march(&system, &mut t, &mut y, target, settings.max_steps);
        if let Err(divergence) = marched {
            let remaining = samples - index;
            warn!(
                "integration diverged at t = {:.6} ({}); {} of {} samples set to NaN",
                divergence.t,
                divergence.reason,
                remaining,
                samples
            );
            let nan = State::from_element(f64::NAN);
            for rest in index..samples {
                visit(grid_time(duration, samples, rest), &nan);
            }
            return Ok(());
        }
        visit(target, &State::from(y));
    }
    Ok(())
}

struct Divergence {
    t: f64,
    reason: &'static str,
}

enum Marcher {
    Adaptive {
        solver: Tsit5,
        dt: f64,
        min_step: f64,
    },
    Rk4 {
        stepper: RK4<f64>,
        substeps: usize,
    },
    Tsit5 {
        stepper: Tsit5,
        substeps: usize,
    },
}

impl Marcher {
    fn new(settings: &IntegratorSettings) -> Self {
        let tolerances = Tolerances {
            rtol: settings.rtol,
            atol: settings.atol,
        };
        match settings.method {
            IntegrationMethod::Tsit5Adaptive => Marcher::Adaptive {
                solver: Tsit5::new(3, tolerances),
                dt: settings.initial_step,
                min_step: settings.min_step,
            },
            IntegrationMethod::Fixed {
                scheme: FixedScheme::Rk4,
                substeps,
            } => Marcher::Rk4 {
                stepper: RK4::new(3),
                substeps,
            },
            IntegrationMethod::Fixed {
                scheme: FixedScheme::Tsit5,
                substeps,
            } => Marcher::Tsit5 {
                stepper: Tsit5::new(3, tolerances),
                substeps,
            },
        }
    }

    fn is_adaptive(&self) -> bool {
        matches!(self, Marcher::Adaptive { .. })
    }

    /// Advances `(t, y)` to exactly `target` in at most `max_steps` attempts.
    fn march(
        &mut self,
        system: &Roessler<f64>,
        t: &mut f64,
        y: &mut [f64; 3],
        target: f64,
        max_steps: usize,
    ) -> Result<(), Divergence> {
        match self {
            Marcher::Adaptive {
                solver,
                dt,
                min_step,
            } => {
                let mut candidate = [0.0; 3];
                let mut steps = 0usize;
                while *t < target {
                    let remaining = target - *t;
                    let clipped = *dt >= remaining;
                    let h = if clipped { remaining } else { *dt };

                    steps += 1;
                    if steps > max_steps {
                        return Err(Divergence {
                            t: *t,
                            reason: "maximum step count exceeded",
                        });
                    }

                    let attempt = solver.try_step(system, *t, &y[..], h, &mut candidate);
                    if attempt.error <= 1.0 {
                        if !candidate.iter().all(|v| v.is_finite()) {
                            return Err(Divergence {
                                t: *t,
                                reason: "state became non-finite",
                            });
                        }
                        *y = candidate;
                        if clipped {
                            *t = target;
                            // A landing step says little about the free step size.
                            *dt = dt.max(attempt.next_dt);
                        } else {
                            *t += h;
                            *dt = attempt.next_dt;
                        }
                    } else {
                        *dt = attempt.next_dt.min(h);
                        if *dt < *min_step {
                            return Err(Divergence {
                                t: *t,
                                reason: "step size fell below the minimum",
                            });
                        }
                    }
                }
                Ok(())
            }
            // `validate` keeps `substeps <= max_steps`.
            Marcher::Rk4 { stepper, substeps } => {
                fixed_march(stepper, *substeps, system, t, y, target)
            }
            Marcher::Tsit5 { stepper, substeps } => {
                fixed_march(stepper, *substeps, system, t, y, target)
            }
        }
    }
}

fn fixed_march(
    stepper: &mut impl Steppable<f64>,
    substeps: usize,
    system: &Roessler<f64>,
    t: &mut f64,
    y: &mut [f64; 3],
    target: f64,
) -> Result<(), Divergence> {
    let h = (target - *t) / substeps as f64;
    for _ in 0..substeps {
        stepper.step(system, t, &mut y[..], h);
    }
    *t = target;
    if y.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(Divergence {
            t: target,
            reason: "state became non-finite",
        })
    }
}
