//! Slider state and the interactive session driven by a front end.
//!
//! The front end owns rendering and events; it forwards slider moves, reset
//! and terminate here and draws whatever [`Session::update`] returns.

use crate::error::{ConfigError, SessionError};
use crate::pipeline::{explore, Exploration, PipelineOptions, RunRequest};
use crate::system::{Parameters, State};
use log::debug;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// A slider: values are clamped into `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl ControlRange {
    pub const fn new(min: f64, max: f64, default: f64) -> Self {
        Self { min, max, default }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        let ordered = self.min.is_finite()
            && self.max.is_finite()
            && self.min <= self.max
            && self.default >= self.min
            && self.default <= self.max;
        if ordered {
            Ok(())
        } else {
            Err(ConfigError::InvalidRange {
                field,
                min: self.min,
                max: self.max,
                default: self.default,
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// `a` and `b` stay fixed; `c` is replaced by the slider value.
    pub parameters: Parameters,
    pub initial_state: State,
    pub c_range: ControlRange,
    pub warmup_range: ControlRange,
    pub duration_range: ControlRange,
    /// Sample count as a power of ten.
    pub log_samples_range: ControlRange,
    pub pipeline: PipelineOptions,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            parameters: Parameters::default(),
            initial_state: Vector3::new(0.0, 1.0, 0.5),
            c_range: ControlRange::new(2.0, 5.0, 2.4),
            warmup_range: ControlRange::new(0.0, 10_000.0, 0.0),
            duration_range: ControlRange::new(0.0, 10_000.0, 100.0),
            log_samples_range: ControlRange::new(2.0, 6.0, 4.0),
            pipeline: PipelineOptions::default(),
        }
    }
}

impl ExplorerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.c_range.validate("c")?;
        self.warmup_range.validate("t0")?;
        self.duration_range.validate("t1")?;
        self.log_samples_range.validate("log10(n)")?;
        if self.warmup_range.min < 0.0 {
            return Err(ConfigError::NegativeWarmup(self.warmup_range.min));
        }
        if self.log_samples_range.min < 0.0 || self.log_samples_range.max > 9.0 {
            return Err(ConfigError::InvalidRange {
                field: "log10(n)",
                min: self.log_samples_range.min,
                max: self.log_samples_range.max,
                default: self.log_samples_range.default,
            });
        }
        if !self.parameters.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "parameters",
            });
        }
        if !self.initial_state.iter().all(|v| v.is_finite()) {
            return Err(ConfigError::NonFinite {
                field: "initial state",
            });
        }
        self.pipeline.validate()
    }
}

/// Current slider positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlPanel {
    pub c: f64,
    pub warmup: f64,
    pub duration: f64,
    pub log_samples: f64,
}

impl ControlPanel {
    pub fn from_defaults(config: &ExplorerConfig) -> Self {
        Self {
            c: config.c_range.default,
            warmup: config.warmup_range.default,
            duration: config.duration_range.default,
            log_samples: config.log_samples_range.default,
        }
    }

    /// Sample count `floor(10^log_samples)`.
    pub fn samples(&self) -> usize {
        10f64.powf(self.log_samples).floor() as usize
    }

    pub fn set_c(&mut self, config: &ExplorerConfig, value: f64) -> Result<f64, ConfigError> {
        assign(&mut self.c, config.c_range, "c", value)
    }

    pub fn set_warmup(&mut self, config: &ExplorerConfig, value: f64) -> Result<f64, ConfigError> {
        assign(&mut self.warmup, config.warmup_range, "t0", value)
    }

    pub fn set_duration(&mut self, config: &ExplorerConfig, value: f64) -> Result<f64, ConfigError> {
        assign(&mut self.duration, config.duration_range, "t1", value)
    }

    pub fn set_log_samples(
        &mut self,
        config: &ExplorerConfig,
        value: f64,
    ) -> Result<f64, ConfigError> {
        assign(&mut self.log_samples, config.log_samples_range, "log10(n)", value)
    }

    pub fn reset(&mut self, config: &ExplorerConfig) {
        *self = Self::from_defaults(config);
    }

    pub fn request(&self, config: &ExplorerConfig) -> Result<RunRequest, ConfigError> {
        let request = RunRequest {
            initial_state: config.initial_state,
            parameters: config.parameters.with_c(self.c),
            warmup: self.warmup,
            duration: self.duration,
            samples: self.samples(),
        };
        request.validate()?;
        Ok(request)
    }
}

/// One interactive session: configuration, slider state and lifecycle.
#[derive(Debug, Clone)]
pub struct Session {
    config: ExplorerConfig,
    panel: ControlPanel,
    terminated: bool,
}

impl Session {
    pub fn new(config: ExplorerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            panel: ControlPanel::from_defaults(&config),
            config,
            terminated: false,
        })
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn set_c(&mut self, value: f64) -> Result<f64, SessionError> {
        self.ensure_running()?;
        Ok(self.panel.set_c(&self.config, value)?)
    }

    pub fn set_warmup(&mut self, value: f64) -> Result<f64, SessionError> {
        self.ensure_running()?;
        Ok(self.panel.set_warmup(&self.config, value)?)
    }

    pub fn set_duration(&mut self, value: f64) -> Result<f64, SessionError> {
        self.ensure_running()?;
        Ok(self.panel.set_duration(&self.config, value)?)
    }

    pub fn set_log_samples(&mut self, value: f64) -> Result<f64, SessionError> {
        self.ensure_running()?;
        Ok(self.panel.set_log_samples(&self.config, value)?)
    }

    /// Restores every slider to its default and recomputes.
    pub fn reset(&mut self) -> Result<Exploration, SessionError> {
        self.ensure_running()?;
        self.panel.reset(&self.config);
        debug!("controls reset to defaults");
        self.update()
    }

    /// Recomputes from the initial state with the current slider values.
    pub fn update(&mut self) -> Result<Exploration, SessionError> {
        self.ensure_running()?;
        let request = self.panel.request(&self.config)?;
        Ok(explore(&request, &self.config.pipeline)?)
    }

    pub fn terminate(&mut self) {
        if !self.terminated {
            debug!("session terminated");
        }
        self.terminated = true;
    }

    fn ensure_running(&self) -> Result<(), SessionError> {
        if self.terminated {
            Err(SessionError::Terminated)
        } else {
            Ok(())
        }
    }
}

/// Clamps `value` into `range` and stores it. NaN leaves `slot` untouched.
fn assign(
    slot: &mut f64,
    range: ControlRange,
    field: &'static str,
    value: f64,
) -> Result<f64, ConfigError> {
    if value.is_nan() {
        return Err(ConfigError::NonFinite { field });
    }
    *slot = range.clamp(value);
    Ok(*slot)
}
