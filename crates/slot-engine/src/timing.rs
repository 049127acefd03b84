//! Reel timing profiles

use serde::{Deserialize, Serialize};

/// Timing profile for reel animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimingProfile {
    /// Normal gameplay timing
    Normal,
    /// Fast/Turbo mode
    Turbo,
    /// Studio mode (short spins for demos and recording)
    Studio,
    /// Custom timing (scaled or hand-edited)
    Custom,
}

impl Default for TimingProfile {
    fn default() -> Self {
        Self::Normal
    }
}

/// Per-reel spin timing
///
/// Reel `i` spins for `reel_spin_duration_ms + i * reel_stop_interval_ms`,
/// so reels land left to right and the highest index always lands last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelTiming {
    /// Profile type
    pub profile: TimingProfile,

    /// Spin duration of the first reel (ms)
    pub reel_spin_duration_ms: f64,

    /// Extra spin time added per reel index (ms)
    pub reel_stop_interval_ms: f64,

    /// Full turns every reel makes before settling on its stop
    pub min_full_rotations: u32,
}

impl ReelTiming {
    /// Normal gameplay timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            reel_spin_duration_ms: 3000.0,
            reel_stop_interval_ms: 500.0,
            min_full_rotations: 5,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            reel_spin_duration_ms: 1200.0,
            reel_stop_interval_ms: 200.0,
            min_full_rotations: 3,
        }
    }

    /// Studio mode
    pub fn studio() -> Self {
        Self {
            profile: TimingProfile::Studio,
            reel_spin_duration_ms: 600.0,
            reel_stop_interval_ms: 350.0,
            min_full_rotations: 2,
        }
    }

    /// Get timing for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Studio => Self::studio(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale durations by factor (< 1.0 = faster). Rotation count is kept.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            profile: TimingProfile::Custom,
            reel_spin_duration_ms: self.reel_spin_duration_ms * factor,
            reel_stop_interval_ms: self.reel_stop_interval_ms * factor,
            min_full_rotations: self.min_full_rotations,
        }
    }

    /// Spin duration for one reel
    pub fn reel_duration(&self, reel_index: usize) -> f64 {
        self.reel_spin_duration_ms + reel_index as f64 * self.reel_stop_interval_ms
    }

    /// Calculate total spin duration (all reels stopped)
    pub fn total_spin_duration(&self, reel_count: usize) -> f64 {
        self.reel_duration(reel_count.saturating_sub(1))
    }
}

impl Default for ReelTiming {
    fn default() -> Self {
        Self::normal()
    }
}
