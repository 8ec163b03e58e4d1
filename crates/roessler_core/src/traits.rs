use num_traits::{Float, FromPrimitive};
use std::fmt::Debug;

/// Numeric types the vector field and steppers can run on.
pub trait Scalar: Float + FromPrimitive + Debug + 'static {}

impl<T: Float + FromPrimitive + Debug + 'static> Scalar for T {}

/// An autonomous or time-dependent flow `dx/dt = f(t, x)`.
pub trait DynamicalSystem<T: Scalar> {
    /// Dimension of the phase space.
    fn dimension(&self) -> usize;

    /// Writes `f(t, x)` into `out`.
    fn apply(&self, t: T, x: &[T], out: &mut [T]);
}

/// Fixed-step solvers.
pub trait Steppable<T: Scalar> {
    /// Advances `state` by one step of size `dt`, updating `t`.
    fn step(&mut self, system: &impl DynamicalSystem<T>, t: &mut T, state: &mut [T], dt: T);
}

/// Outcome of one attempted adaptive step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepAttempt<T> {
    /// Scaled error estimate; the step is acceptable when this is `<= 1`.
    pub error: T,
    /// Proposed size for the next attempt.
    pub next_dt: T,
}

/// Embedded-pair solvers with error control.
///
/// `try_step` writes the candidate solution into `out` and never touches
/// `state`, so a rejected attempt can simply be retried with a smaller `dt`.
pub trait AdaptiveSteppable<T: Scalar> {
    fn try_step(
        &mut self,
        system: &impl DynamicalSystem<T>,
        t: T,
        state: &[T],
        dt: T,
        out: &mut [T],
    ) -> StepAttempt<T>;
}
