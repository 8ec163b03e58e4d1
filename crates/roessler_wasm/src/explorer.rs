//! Interactive session exposed to the browser front end.

use crate::view::{interleaved_samples, ExplorationView};
use anyhow::Context;
use js_sys::Float64Array;
use log::warn;
use roessler_core::controls::{ExplorerConfig, Session};
use roessler_core::error::SessionError;
use roessler_core::pipeline::Exploration;
use serde_wasm_bindgen::{from_value, to_value};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmExplorer {
    session: Session,
    last: Option<Exploration>,
}

#[wasm_bindgen]
impl WasmExplorer {
    /// `config` may be `undefined` or `null` for the stock setup.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WasmExplorer, JsValue> {
        console_error_panic_hook::set_once();

        let config = if config.is_undefined() || config.is_null() {
            ExplorerConfig::default()
        } else {
            from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid explorer config: {}", e)))?
        };
        Self::from_config(config).map_err(to_js_error)
    }

    pub fn set_c(&mut self, value: f64) -> Result<f64, JsValue> {
        self.session
            .set_c(value)
            .context("Failed to set c")
            .map_err(to_js_error)
    }

    pub fn set_warmup(&mut self, value: f64) -> Result<f64, JsValue> {
        self.session
            .set_warmup(value)
            .context("Failed to set t0")
            .map_err(to_js_error)
    }

    pub fn set_duration(&mut self, value: f64) -> Result<f64, JsValue> {
        self.session
            .set_duration(value)
            .context("Failed to set t1")
            .map_err(to_js_error)
    }

    pub fn set_log_samples(&mut self, value: f64) -> Result<f64, JsValue> {
        self.session
            .set_log_samples(value)
            .context("Failed to set log10(n)")
            .map_err(to_js_error)
    }

    pub fn samples(&self) -> u32 {
        u32::try_from(self.session.panel().samples()).unwrap_or(u32::MAX)
    }

    pub fn update(&mut self) -> Result<JsValue, JsValue> {
        let view = self.recompute(false).map_err(to_js_error)?;
        to_value(&view).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    pub fn reset(&mut self) -> Result<JsValue, JsValue> {
        let view = self.recompute(true).map_err(to_js_error)?;
        to_value(&view).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
    }

    /// Interleaved `t, x, y, z` of the most recent run, or an error when the
    /// latest `update`/`reset` failed.
    pub fn trajectory_buffer(&self) -> Result<Float64Array, JsValue> {
        let run = self
            .last
            .as_ref()
            .ok_or_else(|| JsValue::from_str("No trajectory computed yet."))?;
        Ok(Float64Array::from(interleaved_samples(run).as_slice()))
    }

    pub fn terminate(&mut self) {
        self.session.terminate();
        self.last = None;
    }

    pub fn is_terminated(&self) -> bool {
        self.session.is_terminated()
    }
}

impl WasmExplorer {
    pub(crate) fn from_config(config: ExplorerConfig) -> anyhow::Result<Self> {
        let session = Session::new(config).context("Invalid explorer config")?;
        Ok(Self {
            session,
            last: None,
        })
    }

    pub(crate) fn recompute(&mut self, reset: bool) -> anyhow::Result<ExplorationView> {
        let run = if reset {
            self.session.reset()
        } else {
            self.session.update()
        };
        let run = match run {
            Ok(run) => run,
            Err(err) => {
                // A failed run leaves no trajectory behind for `trajectory_buffer`.
                self.last = None;
                return Err(match err {
                    SessionError::Terminated => anyhow::Error::new(err),
                    SessionError::Config(_) => {
                        warn!("recomputation rejected: {}", err);
                        anyhow::Error::new(err).context("Recomputation rejected")
                    }
                });
            }
        };
        let view = ExplorationView::from(&run);
        self.last = Some(run);
        Ok(view)
    }
}

fn to_js_error(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", err))
}
