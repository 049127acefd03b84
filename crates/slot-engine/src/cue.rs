//! Presentation hooks: sound cues and per-frame reel output
//!
//! The engine never renders or plays audio itself. It calls a `Presenter`
//! at fixed trigger points and lets the host decide what to do.

use serde::{Deserialize, Serialize};

use crate::paytable::WinTier;

/// Fire-and-forget sound triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SoundCue {
    /// Spin accepted, reels starting
    SpinStart,
    /// A reel settled on its stop
    ReelStop { reel_index: usize },
    /// Win below the big-win ratio
    Win,
    /// Win at or above the big-win ratio
    BigWin,
    /// Bonus symbol landed on the payline
    BonusTriggered,
    /// Bet buttons and other UI interactions
    Button,
    /// Spin refused for lack of credits
    InsufficientFunds,
}

impl SoundCue {
    /// Win cue for a settled tier
    pub fn for_win(tier: WinTier) -> Option<Self> {
        match tier {
            WinTier::None => None,
            WinTier::Normal => Some(Self::Win),
            WinTier::Big => Some(Self::BigWin),
        }
    }

    /// Stable name for audio routing tables
    pub fn name(&self) -> String {
        match self {
            Self::SpinStart => "SPIN_START".into(),
            Self::ReelStop { reel_index } => format!("REEL_STOP_{}", reel_index),
            Self::Win => "WIN".into(),
            Self::BigWin => "BIG_WIN".into(),
            Self::BonusTriggered => "BONUS_TRIGGERED".into(),
            Self::Button => "BUTTON".into(),
            Self::InsufficientFunds => "INSUFFICIENT_FUNDS".into(),
        }
    }
}

/// One reel's render state for a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelFrame {
    pub reel_index: usize,
    /// Accumulated drum angle (radians)
    pub angle: f64,
    /// Panel facing the payline
    pub front_index: usize,
    /// Ids around the payline, top to bottom
    pub visible: Vec<Option<String>>,
    pub spinning: bool,
}

/// Host side of the game: audio, rendering, user-facing notices
pub trait Presenter {
    fn play_sound(&mut self, cue: SoundCue);

    fn render_reel(&mut self, frame: &ReelFrame);

    fn show_insufficient_funds(&mut self);
}

/// Presenter that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn play_sound(&mut self, _cue: SoundCue) {}

    fn render_reel(&mut self, _frame: &ReelFrame) {}

    fn show_insufficient_funds(&mut self) {}
}
