/// The `roessler_core` crate is the numerical engine behind the Rössler explorer.
/// It integrates the Rössler system, extracts Poincaré sections, and solves
/// the analytic fixed point together with its linearization.
///
/// Key components:
/// - **System**: the Rössler vector field and its Jacobian.
/// - **Solvers**: stepping schemes (RK4, Tsit5) and the Tsit5 embedded error estimate.
/// - **Integrator**: sampling a trajectory on a uniform time grid.
/// - **Poincaré**: plane crossings and threshold bands of a sampled trajectory.
/// - **Equilibrium**: the closed-form fixed point, eigenvalues and stability.
/// - **Pipeline** and **Controls**: one recomputation per slider change, and the session around it.
pub mod controls;
pub mod equilibrium;
pub mod error;
pub mod integrator;
pub mod pipeline;
pub mod poincare;
pub mod solvers;
pub mod system;
pub mod traits;
