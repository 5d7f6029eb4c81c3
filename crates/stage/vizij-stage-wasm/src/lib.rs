use js_sys::JSON;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use vizij_stage_core::{
    parse_deck_json, CarouselItem, Config, Inputs, Method, Outputs, Screen, Stage, Viewport,
};

#[wasm_bindgen]
pub struct VizijStage {
    core: Stage,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

/// Stringify a JS value so the core JSON parsers can be reused.
fn stringify(v: &JsValue, what: &str) -> Result<String, JsError> {
    JSON::stringify(v)
        .map_err(|e| JsError::new(&format!("{what} stringify error: {:?}", e)))?
        .as_string()
        .ok_or_else(|| JsError::new(&format!("{what}: stringify produced non-string")))
}

#[wasm_bindgen]
impl VizijStage {
    /// Create a stage on the splash screen.
    /// `config` is a (partial) Config object or undefined/null for defaults;
    /// `cards` is an array of `{ img, title, subtitle, href? }`.
    /// Example:
    ///   new VizijStage({ carousel: { scrub: 0.5 } }, cards, innerWidth, innerHeight)
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, cards: JsValue, width: f32, height: f32) -> Result<VizijStage, JsError> {
        console_error_panic_hook::set_once();

        let cfg: Config = if jsvalue_is_undefined_or_null(&config) {
            Config::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        let items: Vec<CarouselItem> = if jsvalue_is_undefined_or_null(&cards) {
            Vec::new()
        } else {
            let s = stringify(&cards, "cards")?;
            parse_deck_json(&s).map_err(|e| JsError::new(&format!("cards parse error: {e}")))?
        };

        Ok(VizijStage {
            core: Stage::new(cfg, Viewport::new(width, height), items),
        })
    }

    /// Step by dt (seconds) with this frame's inputs JSON. Returns Outputs JSON.
    #[wasm_bindgen]
    pub fn update(&mut self, dt: f32, inputs_json: JsValue) -> Result<JsValue, JsError> {
        let inputs: Inputs = if jsvalue_is_undefined_or_null(&inputs_json) {
            Inputs::default()
        } else {
            swb::from_value(inputs_json).map_err(|e| JsError::new(&format!("inputs error: {e}")))?
        };
        let out: &Outputs = self.core.update(dt, &inputs);
        swb::to_value(out).map_err(|e| JsError::new(&format!("outputs error: {e}")))
    }

    /// Request a screen change by name ("home", "chapters", ...). `method` defaults to "bubble".
    /// Returns false when the request was dropped because a transition is running.
    #[wasm_bindgen]
    pub fn navigate(&mut self, screen: String, method: Option<String>) -> Result<bool, JsError> {
        let target: Screen = screen
            .parse()
            .map_err(|e| JsError::new(&format!("navigate: {e}")))?;
        let method: Method = match method {
            Some(m) => m.parse().map_err(|e| JsError::new(&format!("navigate: {e}")))?,
            None => Method::default(),
        };
        Ok(!self.core.navigate(target, method).is_dropped())
    }

    #[wasm_bindgen]
    pub fn screen(&self) -> String {
        self.core.screen().to_string()
    }

    #[wasm_bindgen(js_name = is_transitioning)]
    pub fn is_transitioning(&self) -> bool {
        self.core.is_transitioning()
    }

    /// Centered card index, or undefined when the carousel is not mounted.
    #[wasm_bindgen(js_name = centered_index)]
    pub fn centered_index(&self) -> Option<u32> {
        self.core.carousel().map(|c| c.centered_index() as u32)
    }

    /// Current carousel geometry as JSON, or undefined when not mounted.
    #[wasm_bindgen]
    pub fn geometry(&self) -> Result<JsValue, JsError> {
        match self.core.carousel() {
            Some(c) => swb::to_value(c.geometry())
                .map_err(|e| JsError::new(&format!("geometry error: {e}"))),
            None => Ok(JsValue::UNDEFINED),
        }
    }
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
