//! Slot machine configuration

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::timing::ReelTiming;
use crate::Credits;

/// Machine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    /// Number of reels
    pub reel_count: usize,
    /// Nominal strip length (segments around each drum)
    pub symbols_per_reel: usize,
    /// Balance a new session starts with
    pub starting_balance: Credits,
    /// Bet a new session starts with
    pub default_bet: u64,
    /// Win-to-bet ratio at or above which a win counts as a big win
    pub big_win_ratio: f64,
    /// Rows handed to the renderer around the payline
    pub visible_rows: usize,
    /// Settle losing spins into `Lose` instead of `Idle`
    pub surface_losses: bool,
    /// Reel timing
    pub timing: ReelTiming,
}

impl SlotConfig {
    /// Short spins, for demos and tests
    pub fn studio() -> Self {
        Self {
            timing: ReelTiming::studio(),
            ..Self::default()
        }
    }

    /// Check the invariants the engine relies on
    pub fn validate(&self) -> SlotResult<()> {
        if self.reel_count == 0 {
            return Err(SlotError::Config("reel_count must be at least 1".into()));
        }
        if self.symbols_per_reel == 0 {
            return Err(SlotError::Config(
                "symbols_per_reel must be at least 1".into(),
            ));
        }
        if self.default_bet == 0 {
            return Err(SlotError::Config("default_bet must be at least 1".into()));
        }
        if !(self.big_win_ratio >= 0.0) {
            return Err(SlotError::Config(
                "big_win_ratio must be non-negative".into(),
            ));
        }
        if self.visible_rows > self.symbols_per_reel {
            return Err(SlotError::Config(format!(
                "visible_rows {} exceeds symbols_per_reel {}",
                self.visible_rows, self.symbols_per_reel
            )));
        }
        if !(self.starting_balance >= 0.0) {
            return Err(SlotError::Config(
                "starting_balance must be non-negative".into(),
            ));
        }
        if !(self.timing.reel_spin_duration_ms >= 0.0) {
            return Err(SlotError::Config(
                "reel_spin_duration_ms must be non-negative".into(),
            ));
        }
        // The last reel must be the unique last to land.
        if self.reel_count > 1 && !(self.timing.reel_stop_interval_ms > 0.0) {
            return Err(SlotError::Config(
                "reel_stop_interval_ms must be positive with more than one reel".into(),
            ));
        }
        Ok(())
    }

    /// Import config from JSON
    pub fn from_json(json: &str) -> SlotResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SlotError::Config(format!("JSON parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Import config from YAML
    pub fn from_yaml(yaml: &str) -> SlotResult<Self> {
        let config: Self = serde_yml::from_str(yaml)
            .map_err(|e| SlotError::Config(format!("YAML parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Export config as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            reel_count: 5,
            symbols_per_reel: 50,
            starting_balance: 1000.0,
            default_bet: 10,
            big_win_ratio: 10.0,
            visible_rows: 3,
            surface_losses: false,
            timing: ReelTiming::normal(),
        }
    }
}
