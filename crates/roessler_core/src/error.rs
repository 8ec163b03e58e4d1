use thiserror::Error;

/// Rejected run configuration. Nothing is integrated when this is returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("sample count must be at least 2, got {0}")]
    TooFewSamples(usize),

    #[error("observation duration must be positive, got {0}")]
    NonPositiveDuration(f64),

    #[error("warm-up duration must be non-negative, got {0}")]
    NegativeWarmup(f64),

    #[error("{field} must be finite")]
    NonFinite { field: &'static str },

    #[error("invalid range for {field}: [{min}, {max}] with default {default}")]
    InvalidRange {
        field: &'static str,
        min: f64,
        max: f64,
        default: f64,
    },

    #[error("section half-width must be positive, got {0}")]
    InvalidSectionWidth(f64),

    #[error("section plane normal must be non-zero")]
    ZeroNormal,

    #[error(transparent)]
    Integrator(#[from] IntegrationError),
}

/// The analytic equilibrium does not exist or is not isolated.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum FixedPointError {
    #[error("no real fixed point for these parameters (c^2 - 4ab = {discriminant})")]
    NegativeDiscriminant { discriminant: f64 },

    #[error("fixed point is undefined for a = 0")]
    DegenerateParameter,

    #[error("parameters must be finite")]
    NonFinite,
}

/// Misuse of the integrator API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrationError {
    #[error("at least one sample is required")]
    NoSamples,

    #[error("duration must be finite and non-negative, got {0}")]
    InvalidDuration(f64),

    #[error("integrator settings rejected: {0}")]
    InvalidSettings(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("session has been terminated")]
    Terminated,

    #[error(transparent)]
    Config(#[from] ConfigError),
}
