// stardust_orbital_wasm/src/lib.rs
// Browser-facing wrapper: the host posts protocol JSON and pulls position snapshots.

use wasm_bindgen::prelude::*;
use stardust_orbital::analysis::PeripheralPolicy;
use stardust_orbital::engine::OrbitalEngine;
use stardust_orbital::protocol::{decode_command, Event};
use stardust_orbital::utils::{OrbitalConstants, OrbitalError, RepulsionMode};

fn to_js(e: OrbitalError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Caller-driven engine: the page decides when to tick, typically once per animation frame.
#[wasm_bindgen]
pub struct WasmOrbitalEngine {
    engine: OrbitalEngine,
}

#[wasm_bindgen]
impl WasmOrbitalEngine {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Result<WasmOrbitalEngine, JsValue> {
        let seed = (js_sys::Math::random() * u32::MAX as f64) as u64;
        Self::with_seed(width, height, seed)
    }

    /// Same as the constructor, with reproducible node placement.
    #[wasm_bindgen]
    pub fn with_seed(width: f64, height: f64, seed: u64) -> Result<WasmOrbitalEngine, JsValue> {
        let mut engine = OrbitalEngine::uninitialized()
            .with_repulsion(RepulsionMode::BarnesHut)
            .with_seed(seed);
        engine.init(width, height, OrbitalConstants::default()).map_err(to_js)?;
        Ok(Self { engine })
    }

    /// Applies one inbound protocol message. Returns `false` for unknown message types.
    #[wasm_bindgen]
    pub fn post_message(&mut self, json: &str) -> Result<bool, JsValue> {
        match decode_command(json).map_err(to_js)? {
            Some(command) => {
                self.engine.apply(command).map_err(to_js)?;
                Ok(true)
            }
            None => {
                web_sys::console::warn_1(&JsValue::from_str("stardust: ignoring unknown message type"));
                Ok(false)
            }
        }
    }

    /// Advances `steps` ticks and returns the resulting `POSITIONS_UPDATE` message.
    #[wasm_bindgen]
    pub fn tick(&mut self, steps: u32) -> Result<String, JsValue> {
        self.engine.simulate(steps as usize).map_err(to_js)?;
        Event::PositionsUpdate(self.engine.positions()).to_json().map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn state(&self) -> String {
        self.engine.state().name().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn node_count(&self) -> usize {
        self.engine.nodes().len()
    }

    #[wasm_bindgen]
    pub fn kinetic_energy(&self) -> f64 {
        self.engine.kinetic_energy()
    }

    #[wasm_bindgen]
    pub fn is_settled(&self, speed_threshold: f64) -> bool {
        self.engine.is_settled(speed_threshold)
    }

    /// Full node state (mass, radius, velocity included) as a JSON array.
    #[wasm_bindgen]
    pub fn nodes_json(&self) -> Result<String, JsValue> {
        to_json(self.engine.nodes())
    }

    #[wasm_bindgen]
    pub fn clusters_json(&self, threshold: f64) -> Result<String, JsValue> {
        to_json(&self.engine.clusters(threshold))
    }

    #[wasm_bindgen]
    pub fn bridges_json(&self, threshold: f64, top_n: usize) -> Result<String, JsValue> {
        let clusters = self.engine.clusters(threshold);
        to_json(&self.engine.bridges(&clusters, top_n))
    }

    #[wasm_bindgen]
    pub fn peripheral_json(&self, mass_threshold: f64) -> Result<String, JsValue> {
        let ids = self.engine
            .peripheral(PeripheralPolicy::AbsoluteThreshold(mass_threshold))
            .map_err(to_js)?;
        to_json(&ids)
    }

    #[wasm_bindgen]
    pub fn peripheral_percentile_json(&self, fraction: f64) -> Result<String, JsValue> {
        let ids = self.engine
            .peripheral(PeripheralPolicy::Percentile(fraction))
            .map_err(to_js)?;
        to_json(&ids)
    }
}
