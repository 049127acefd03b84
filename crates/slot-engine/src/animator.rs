//! Reel animation: eased continuous rotation onto a target stop
//!
//! Each reel is a drum of `symbols_per_reel` panels; panel `k` faces the
//! payline when the drum angle is `k × step (mod 2π)`. A spin rotates the
//! drum forward by at least `min_full_rotations` turns and lands exactly on
//! the requested panel. Sampling is a pure function of
//! (start angle, target angle, elapsed), so no real clock is needed.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

use crate::outcome::SpinRequest;
use crate::symbols::ReelStrip;
use crate::timing::ReelTiming;

/// Angle tolerance when matching a stop
const ANGLE_EPSILON: f64 = 1e-9;

/// `1 − (1 − x)³`, clamped to `[0, 1]`
pub fn ease_out_cubic(x: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    1.0 - (1.0 - x).powi(3)
}

/// Angle between adjacent panels
pub fn angular_step(symbols_per_reel: usize) -> f64 {
    TAU / symbols_per_reel.max(1) as f64
}

/// Smallest angle `≥ current + min_full_rotations × 2π` that shows `stop_index`
pub fn target_angle(current: f64, stop_index: usize, step: f64, min_full_rotations: u32) -> f64 {
    let floor = current + min_full_rotations as f64 * TAU;
    let wanted = (stop_index as f64 * step).rem_euclid(TAU);
    let mut delta = (wanted - floor.rem_euclid(TAU)).rem_euclid(TAU);
    if TAU - delta < ANGLE_EPSILON {
        delta = 0.0;
    }
    floor + delta
}

/// Eased angle `elapsed` ms into a spin of `duration` ms
pub fn sample_angle(start: f64, target: f64, elapsed: f64, duration: f64) -> f64 {
    if duration <= 0.0 || elapsed >= duration {
        return target;
    }
    start + (target - start) * ease_out_cubic(elapsed / duration)
}

/// Panel index facing the payline at `angle`
pub fn front_index(angle: f64, symbols_per_reel: usize) -> usize {
    let n = symbols_per_reel.max(1);
    let steps = (angle.rem_euclid(TAU) / angular_step(n)).round() as usize;
    steps % n
}

/// What one reel did during a frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ReelTick {
    /// Not animating
    Idle { angle: f64 },
    /// Still rotating
    Spinning { angle: f64 },
    /// Reached its target this frame
    Landed { angle: f64, stop_index: usize },
}

impl ReelTick {
    pub fn angle(&self) -> f64 {
        match *self {
            Self::Idle { angle } | Self::Spinning { angle } | Self::Landed { angle, .. } => angle,
        }
    }
}

/// Rotation state of a single reel
#[derive(Debug, Clone)]
pub struct ReelAnimator {
    reel_index: usize,
    symbols_per_reel: usize,
    min_full_rotations: u32,
    /// Spin duration for this reel (ms)
    duration_ms: f64,
    is_animating: bool,
    /// Accumulated angle; never decreases
    angle: f64,
    start_angle: f64,
    target_angle: f64,
    start_time_ms: f64,
    stop_index: usize,
    /// Spin this reel last started for
    spin_id: Option<u64>,
}

impl ReelAnimator {
    pub fn new(reel_index: usize, symbols_per_reel: usize, timing: &ReelTiming) -> Self {
        Self {
            reel_index,
            symbols_per_reel: symbols_per_reel.max(1),
            min_full_rotations: timing.min_full_rotations,
            duration_ms: timing.reel_duration(reel_index),
            is_animating: false,
            angle: 0.0,
            start_angle: 0.0,
            target_angle: 0.0,
            start_time_ms: 0.0,
            stop_index: 0,
            spin_id: None,
        }
    }

    /// Start rotating toward `stop_index`. Ignored if already started for `spin_id`.
    pub fn begin(&mut self, spin_id: u64, stop_index: usize, now_ms: f64) -> bool {
        if self.spin_id == Some(spin_id) {
            return false;
        }
        let stop_index = stop_index % self.symbols_per_reel;

        self.spin_id = Some(spin_id);
        self.stop_index = stop_index;
        self.start_angle = self.angle;
        self.target_angle = target_angle(
            self.angle,
            stop_index,
            angular_step(self.symbols_per_reel),
            self.min_full_rotations,
        );
        self.start_time_ms = now_ms;
        self.is_animating = true;
        true
    }

    /// Advance to `now_ms`
    pub fn tick(&mut self, now_ms: f64) -> ReelTick {
        if !self.is_animating {
            return ReelTick::Idle { angle: self.angle };
        }

        let elapsed = (now_ms - self.start_time_ms).max(0.0);
        if elapsed < self.duration_ms {
            self.angle = sample_angle(self.start_angle, self.target_angle, elapsed, self.duration_ms);
            ReelTick::Spinning { angle: self.angle }
        } else {
            self.angle = self.target_angle;
            self.is_animating = false;
            ReelTick::Landed {
                angle: self.angle,
                stop_index: self.stop_index,
            }
        }
    }

    pub fn reel_index(&self) -> usize {
        self.reel_index
    }

    pub fn is_animating(&self) -> bool {
        self.is_animating
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn target_angle(&self) -> f64 {
        self.target_angle
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Stop of the current (or last) spin
    pub fn stop_index(&self) -> usize {
        self.stop_index
    }

    /// Panel facing the payline right now
    pub fn front_index(&self) -> usize {
        front_index(self.angle, self.symbols_per_reel)
    }

    /// Ids of `rows` panels centred on the payline, top to bottom
    pub fn visible_symbols(&self, strip: Option<&ReelStrip>, rows: usize) -> Vec<Option<String>> {
        let n = self.symbols_per_reel;
        let front = self.front_index();
        let above = rows / 2;

        (0..rows)
            .map(|row| {
                let panel = (front + n * (above / n + 1) + row - above) % n;
                strip.and_then(|s| s.symbol_at(panel)).map(str::to_string)
            })
            .collect()
    }
}

/// Result of ticking every reel once
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// One entry per reel, in index order
    pub ticks: Vec<ReelTick>,
    /// Reels that landed this frame
    pub landed: Vec<usize>,
    /// Set on the frame the designated last reel lands
    pub completed_spin: Option<u64>,
}

/// All reels plus the completion barrier
///
/// Completion fires once per spin, when the reel with the longest duration
/// lands. Durations strictly increase with index, so that is always the
/// highest index.
#[derive(Debug, Clone)]
pub struct ReelSet {
    reels: Vec<ReelAnimator>,
    last_reel: usize,
    active_spin: Option<u64>,
    completion_fired: bool,
}

impl ReelSet {
    pub fn new(reel_count: usize, symbols_per_reel: usize, timing: &ReelTiming) -> Self {
        let reels: Vec<ReelAnimator> = (0..reel_count)
            .map(|i| ReelAnimator::new(i, symbols_per_reel, timing))
            .collect();
        let last_reel = reels
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.duration_ms.total_cmp(&b.duration_ms))
            .map(|(i, _)| i)
            .unwrap_or(0);

        Self {
            reels,
            last_reel,
            active_spin: None,
            completion_fired: false,
        }
    }

    /// Hand every reel its target for a new spin
    pub fn start(&mut self, request: &SpinRequest, now_ms: f64) {
        if self.active_spin == Some(request.spin_id) {
            return;
        }
        self.active_spin = Some(request.spin_id);
        self.completion_fired = false;

        for (reel, &stop) in self.reels.iter_mut().zip(&request.targets) {
            reel.begin(request.spin_id, stop, now_ms);
        }
        if request.targets.len() != self.reels.len() {
            log::warn!(
                "spin {} has {} targets for {} reels",
                request.spin_id,
                request.targets.len(),
                self.reels.len()
            );
        }
    }

    /// Advance every reel to `now_ms`
    pub fn tick(&mut self, now_ms: f64) -> FrameReport {
        let mut report = FrameReport {
            ticks: Vec::with_capacity(self.reels.len()),
            ..FrameReport::default()
        };

        for reel in &mut self.reels {
            let tick = reel.tick(now_ms);
            if let ReelTick::Landed { .. } = tick {
                report.landed.push(reel.reel_index);
                log::debug!("reel {} landed on {}", reel.reel_index, reel.stop_index);
            }
            report.ticks.push(tick);
        }

        if !self.completion_fired && report.landed.contains(&self.last_reel) {
            self.completion_fired = true;
            report.completed_spin = self.active_spin;
        }
        report
    }

    pub fn is_spinning(&self) -> bool {
        self.reels.iter().any(|r| r.is_animating)
    }

    pub fn reels(&self) -> &[ReelAnimator] {
        &self.reels
    }

    pub fn reel(&self, index: usize) -> Option<&ReelAnimator> {
        self.reels.get(index)
    }

    /// Index whose landing completes a spin
    pub fn last_reel(&self) -> usize {
        self.last_reel
    }
}
