// ============================================================================
// SLOT MACHINE: WASM Port
// WebAssembly bindings for the slot engine
// The page owns the render loop, audio and DOM; the engine owns the money
// ============================================================================

use serde::Serialize;
use slot_engine::{
    GameSession, OutcomeGenerator, Presenter, ReelFrame, ReelStripTable, SessionStatus,
    SlotConfig, SlotError, SlotMachine, SlotResult, SoundCue, SymbolCatalog,
};
use wasm_bindgen::prelude::*;

// ============================================================================
// INITIALIZATION
// ============================================================================

#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    console_log::init_with_level(log::Level::Debug).ok();
    log::info!("[Slot WASM] Initialized");
}

// ============================================================================
// HELPERS
// ============================================================================

/// Empty input means defaults
fn parse_config(json: &str) -> SlotResult<SlotConfig> {
    if json.trim().is_empty() {
        Ok(SlotConfig::default())
    } else {
        SlotConfig::from_json(json)
    }
}

fn parse_catalog(json: Option<String>) -> SlotResult<SymbolCatalog> {
    match json {
        Some(json) if !json.trim().is_empty() => SymbolCatalog::from_json(&json),
        _ => Ok(SymbolCatalog::classic()),
    }
}

/// JS numbers to a bet request; fractions round down, NaN asks for the minimum
fn bet_from_js(amount: f64) -> i64 {
    if amount.is_nan() {
        return 1;
    }
    amount.floor() as i64
}

fn status_label(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Idle => "idle",
        SessionStatus::Spinning => "spinning",
        SessionStatus::Win => "win",
        SessionStatus::Lose => "lose",
    }
}

fn to_js_error(err: SlotError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

// ============================================================================
// PRESENTER (JS callbacks)
// ============================================================================

#[derive(Default)]
struct JsPresenter {
    on_sound: Option<js_sys::Function>,
    on_render: Option<js_sys::Function>,
    on_insufficient_funds: Option<js_sys::Function>,
}

impl JsPresenter {
    fn invoke(callback: Option<&js_sys::Function>, arg: &JsValue, what: &str) {
        if let Some(callback) = callback {
            if let Err(err) = callback.call1(&JsValue::NULL, arg) {
                log::warn!("[Slot WASM] {} callback threw: {:?}", what, err);
            }
        }
    }
}

impl Presenter for JsPresenter {
    fn play_sound(&mut self, cue: SoundCue) {
        Self::invoke(self.on_sound.as_ref(), &JsValue::from_str(&cue.name()), "sound");
    }

    fn render_reel(&mut self, frame: &ReelFrame) {
        let Some(callback) = self.on_render.as_ref() else {
            return;
        };
        match to_js_value(frame) {
            Ok(value) => Self::invoke(Some(callback), &value, "render"),
            Err(err) => log::warn!("[Slot WASM] Reel {} frame dropped: {:?}", frame.reel_index, err),
        }
    }

    fn show_insufficient_funds(&mut self) {
        Self::invoke(
            self.on_insufficient_funds.as_ref(),
            &JsValue::UNDEFINED,
            "insufficient funds",
        );
    }
}

// ============================================================================
// MACHINE (JS-visible)
// ============================================================================

#[wasm_bindgen]
pub struct WebSlotMachine {
    machine: SlotMachine<JsPresenter>,
}

#[wasm_bindgen]
impl WebSlotMachine {
    /// Default configuration, generated strips, random seed
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WebSlotMachine, JsValue> {
        Self::with_seed(rand::random())
    }

    /// Default configuration with a reproducible seed
    #[wasm_bindgen]
    pub fn with_seed(seed: u64) -> Result<WebSlotMachine, JsValue> {
        Self::from_config_json("", seed)
    }

    /// Configuration from JSON, generated strips
    #[wasm_bindgen]
    pub fn from_config_json(config_json: &str, seed: u64) -> Result<WebSlotMachine, JsValue> {
        let config = parse_config(config_json).map_err(to_js_error)?;
        let machine =
            SlotMachine::generated(config, seed, JsPresenter::default()).map_err(to_js_error)?;
        log::info!("[Slot WASM] Machine ready with generated strips (seed {})", seed);
        Ok(Self { machine })
    }

    /// Configuration, strip table and optional symbol catalog from JSON
    #[wasm_bindgen]
    pub fn from_strip_json(
        config_json: &str,
        strips_json: &str,
        catalog_json: Option<String>,
        seed: u64,
    ) -> Result<WebSlotMachine, JsValue> {
        let config = parse_config(config_json).map_err(to_js_error)?;
        let catalog = parse_catalog(catalog_json).map_err(to_js_error)?;
        let strips = ReelStripTable::from_json(strips_json).map_err(to_js_error)?;
        let reels = strips.reel_count();

        let session = GameSession::new(config, catalog, strips, OutcomeGenerator::seeded(seed))
            .map_err(to_js_error)?;
        log::info!("[Slot WASM] Machine ready with {} loaded strips", reels);
        Ok(Self {
            machine: SlotMachine::new(session, JsPresenter::default()),
        })
    }

    // ─── Callbacks ───────────────────────────────────────────────────────────

    /// `(cueName: string) => void`
    #[wasm_bindgen]
    pub fn set_sound_callback(&mut self, callback: js_sys::Function) {
        self.machine.presenter_mut().on_sound = Some(callback);
    }

    /// `(frame: ReelFrame) => void`, once per reel per frame
    #[wasm_bindgen]
    pub fn set_render_callback(&mut self, callback: js_sys::Function) {
        self.machine.presenter_mut().on_render = Some(callback);
    }

    #[wasm_bindgen]
    pub fn set_insufficient_funds_callback(&mut self, callback: js_sys::Function) {
        self.machine.presenter_mut().on_insufficient_funds = Some(callback);
    }

    // ─── Input ───────────────────────────────────────────────────────────────

    /// Spin button. False if the spin was refused.
    #[wasm_bindgen]
    pub fn spin(&mut self, now_ms: f64) -> bool {
        match self.machine.press_spin(now_ms) {
            Ok(request) => {
                log::debug!("[Slot WASM] Spin {} started", request.spin_id);
                true
            }
            Err(err) => {
                log::debug!("[Slot WASM] Spin refused: {}", err);
                false
            }
        }
    }

    #[wasm_bindgen]
    pub fn set_bet(&mut self, amount: f64) -> Result<f64, JsValue> {
        self.machine
            .set_bet(bet_from_js(amount))
            .map(|bet| bet as f64)
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn adjust_bet(&mut self, delta: f64) -> Result<f64, JsValue> {
        self.machine
            .adjust_bet(bet_from_js(delta))
            .map(|bet| bet as f64)
            .map_err(to_js_error)
    }

    /// Advance one animation frame. Returns the settlement object on the
    /// frame the last reel lands, `null` otherwise.
    #[wasm_bindgen]
    pub fn frame(&mut self, now_ms: f64) -> Result<JsValue, JsValue> {
        match self.machine.frame(now_ms) {
            Some(settlement) => to_js_value(&settlement),
            None => Ok(JsValue::NULL),
        }
    }

    // ─── State ───────────────────────────────────────────────────────────────

    #[wasm_bindgen(getter)]
    pub fn balance(&self) -> f64 {
        self.machine.session().balance()
    }

    #[wasm_bindgen(getter)]
    pub fn bet(&self) -> f64 {
        self.machine.session().bet() as f64
    }

    #[wasm_bindgen(getter)]
    pub fn status(&self) -> String {
        status_label(self.machine.session().status()).to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn win_amount(&self) -> f64 {
        self.machine.session().win_amount()
    }

    #[wasm_bindgen(getter)]
    pub fn is_bonus_pending(&self) -> bool {
        self.machine.session().is_bonus_pending()
    }

    #[wasm_bindgen(getter)]
    pub fn is_bonus_spin(&self) -> bool {
        self.machine.session().is_bonus_spin()
    }

    #[wasm_bindgen(getter)]
    pub fn is_spinning(&self) -> bool {
        self.machine.reels().is_spinning()
    }

    #[wasm_bindgen]
    pub fn can_spin(&self) -> bool {
        self.machine.session().can_spin()
    }

    /// Row offsets that paid on the last spin
    #[wasm_bindgen]
    pub fn winning_rows(&self) -> Vec<u32> {
        self.machine
            .session()
            .winning_rows()
            .iter()
            .map(|&row| row as u32)
            .collect()
    }

    #[wasm_bindgen]
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.machine.session().snapshot())
    }

    #[wasm_bindgen]
    pub fn stats_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.machine.session().stats())
            .map_err(|e| JsValue::from_str(&format!("JSON error: {}", e)))
    }
}

// ============================================================================
// UTILITY EXPORTS
// ============================================================================

/// Get slot engine version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// `performance.now()`, or 0 outside a window
#[wasm_bindgen]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

// ============================================================================
// TESTS
// ============================================================================
