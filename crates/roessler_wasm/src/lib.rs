//! WebAssembly bindings for the Rössler explorer.
//!
//! The browser owns the sliders and the 3D/section plots; it forwards knob
//! changes to [`WasmExplorer`] and draws the returned [`ExplorationView`].

mod explorer;
mod view;

pub use explorer::WasmExplorer;
pub use view::{interleaved_samples, ExplorationView, FixedPointView};
