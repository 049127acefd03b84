//! Game session: balance ledger and spin state machine
//!
//! ```text
//!   Idle | Win | Lose ──spin()──▶ Spinning ──complete_spin()──▶ Win  (win > 0)
//!                                                         └──▶ Idle (win == 0, or Lose)
//! ```
//!
//! The bet is charged when the spin starts and the win is credited when it
//! completes, so one full cycle moves the balance by exactly `win − bet`.

use serde::{Deserialize, Serialize};

use crate::config::SlotConfig;
use crate::error::{SlotError, SlotResult};
use crate::outcome::{OutcomeGenerator, SpinRequest};
use crate::paytable::{row_symbols, PayoutEvaluator, RowWin, WinTier};
use crate::symbols::{ReelStripTable, SymbolCatalog};
use crate::Credits;

/// Session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionStatus {
    Idle,
    Spinning,
    Win,
    /// Only used when `SlotConfig::surface_losses` is set
    Lose,
}

impl SessionStatus {
    /// Can a new spin start from here?
    pub fn accepts_spin(&self) -> bool {
        !matches!(self, Self::Spinning)
    }
}

/// Outcome of one completed spin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub spin_id: u64,
    pub bet: u64,
    pub win: Credits,
    pub tier: WinTier,
    /// Payline symbols, `None` where a reel had no strip data
    pub payline: Vec<Option<String>>,
    /// A bonus symbol landed on the payline; the next spin is a bonus spin
    pub bonus_triggered: bool,
    /// Every row was evaluated as a payline
    pub swept: bool,
    pub row_wins: Vec<RowWin>,
    pub winning_rows: Vec<usize>,
}

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub total_bet: Credits,
    pub total_win: Credits,
    pub wins: u64,
    pub losses: u64,
    pub big_wins: u64,
    pub bonus_triggers: u64,
    pub bonus_spins: u64,
    pub max_win_ratio: f64,
}

impl SessionStats {
    /// Calculate RTP
    pub fn rtp(&self) -> f64 {
        if self.total_bet > 0.0 {
            (self.total_win / self.total_bet) * 100.0
        } else {
            0.0
        }
    }

    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.wins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Read-only view for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub balance: Credits,
    pub bet: u64,
    pub status: SessionStatus,
    pub win_amount: Credits,
    pub is_bonus_pending: bool,
    pub is_bonus_spin: bool,
    pub winning_rows: Vec<usize>,
    pub targets: Vec<usize>,
}

/// Owns the balance, bet, status and bonus flags
#[derive(Debug)]
pub struct GameSession {
    config: SlotConfig,
    evaluator: PayoutEvaluator,
    strips: ReelStripTable,
    generator: OutcomeGenerator,
    balance: Credits,
    bet: u64,
    status: SessionStatus,
    win_amount: Credits,
    is_bonus_pending: bool,
    is_bonus_spin: bool,
    winning_rows: Vec<usize>,
    request: Option<SpinRequest>,
    spin_count: u64,
    stats: SessionStats,
}

impl GameSession {
    /// Create a session. Strip irregularities are logged, not rejected.
    pub fn new(
        config: SlotConfig,
        catalog: SymbolCatalog,
        strips: ReelStripTable,
        generator: OutcomeGenerator,
    ) -> SlotResult<Self> {
        config.validate()?;

        let issues = strips.validate(&catalog, config.symbols_per_reel);
        if strips.reel_count() != config.reel_count {
            log::warn!(
                "strip table has {} reels, config expects {}",
                strips.reel_count(),
                config.reel_count
            );
        }
        log::info!(
            "session ready: {} reels × {} symbols, balance {}, bet {} ({} strip issues)",
            config.reel_count,
            config.symbols_per_reel,
            config.starting_balance,
            config.default_bet,
            issues.len()
        );

        Ok(Self {
            balance: config.starting_balance,
            bet: config.default_bet,
            evaluator: PayoutEvaluator::new(catalog),
            strips,
            generator,
            config,
            status: SessionStatus::Idle,
            win_amount: 0.0,
            is_bonus_pending: false,
            is_bonus_spin: false,
            winning_rows: Vec::new(),
            request: None,
            spin_count: 0,
            stats: SessionStats::default(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // TRANSITIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Start a spin: charge the bet, arm any pending bonus, draw new stops
    pub fn spin(&mut self) -> SlotResult<SpinRequest> {
        if !self.status.accepts_spin() {
            log::debug!("spin rejected: already spinning");
            return Err(SlotError::SpinInProgress);
        }
        if self.balance < self.bet as f64 {
            log::warn!(
                "spin rejected: balance {} below bet {}",
                self.balance,
                self.bet
            );
            return Err(SlotError::InsufficientFunds {
                balance: self.balance,
                bet: self.bet,
            });
        }

        let targets = self
            .generator
            .generate(self.config.reel_count, self.config.symbols_per_reel);

        self.spin_count += 1;
        self.balance -= self.bet as f64;
        self.win_amount = 0.0;
        self.is_bonus_spin = self.is_bonus_pending;
        self.is_bonus_pending = false;
        self.status = SessionStatus::Spinning;

        let request = SpinRequest {
            spin_id: self.spin_count,
            targets,
        };
        log::debug!(
            "spin {} started: targets {:?}, bet {}, bonus spin {}",
            request.spin_id,
            request.targets,
            self.bet,
            self.is_bonus_spin
        );
        self.request = Some(request.clone());
        Ok(request)
    }

    /// Evaluate and settle the in-flight spin
    ///
    /// Returns `None` unless a spin is in flight, so a second call cannot pay
    /// twice. A bonus symbol on the payline of a bonus spin suppresses the
    /// sweep for this spin and arms the next one instead.
    pub fn complete_spin(&mut self) -> Option<Settlement> {
        if self.status != SessionStatus::Spinning {
            log::debug!("complete_spin ignored: status {:?}", self.status);
            return None;
        }
        let request = self.request.as_ref()?;
        let targets = &request.targets;
        let bet = self.bet;

        let payline = row_symbols(targets, &self.strips, 0);
        let triggered = self.evaluator.bonus_triggered(&payline);
        let swept = !triggered && self.is_bonus_spin;

        let (win, row_wins) = if swept {
            let sweep = self.evaluator.bonus_sweep_win(
                targets,
                &self.strips,
                self.config.symbols_per_reel,
                bet,
            );
            (sweep.total, sweep.row_wins)
        } else {
            let row_win = self.evaluator.evaluate_row(&payline, 0, bet);
            let win = row_win.as_ref().map(|w| w.amount).unwrap_or(0.0);
            (win, row_win.into_iter().collect())
        };
        let winning_rows: Vec<usize> = row_wins.iter().map(|w| w.row_offset).collect();
        let payline: Vec<Option<String>> = payline
            .into_iter()
            .map(|cell| cell.map(str::to_string))
            .collect();
        let spin_id = request.spin_id;

        self.balance += win;
        self.win_amount = win;
        self.is_bonus_pending = triggered;
        self.winning_rows = winning_rows.clone();
        self.status = if win > 0.0 {
            SessionStatus::Win
        } else if self.config.surface_losses {
            SessionStatus::Lose
        } else {
            SessionStatus::Idle
        };

        let tier = WinTier::classify(win, bet, self.config.big_win_ratio);
        self.update_stats(bet, win, tier, triggered);

        log::debug!(
            "spin {} settled: win {} ({:?}), rows {:?}, swept {}, bonus armed {}",
            spin_id,
            win,
            tier,
            winning_rows,
            swept,
            triggered
        );

        Some(Settlement {
            spin_id,
            bet,
            win,
            tier,
            payline,
            bonus_triggered: triggered,
            swept,
            row_wins,
            winning_rows,
        })
    }

    /// Set the bet, clamped to at least 1. Locked while spinning.
    pub fn set_bet(&mut self, amount: i64) -> SlotResult<u64> {
        if self.status == SessionStatus::Spinning {
            log::warn!("bet change to {} rejected while spinning", amount);
            return Err(SlotError::BetLocked);
        }
        let clamped = amount.max(1) as u64;
        if clamped as i64 != amount {
            log::debug!("bet {} clamped to {}", amount, clamped);
        }
        self.bet = clamped;
        Ok(clamped)
    }

    fn update_stats(&mut self, bet: u64, win: Credits, tier: WinTier, triggered: bool) {
        let stats = &mut self.stats;
        stats.total_spins += 1;
        stats.total_bet += bet as f64;
        stats.total_win += win;

        if win > 0.0 {
            stats.wins += 1;
        } else {
            stats.losses += 1;
        }
        if tier == WinTier::Big {
            stats.big_wins += 1;
        }
        if triggered {
            stats.bonus_triggers += 1;
        }
        if self.is_bonus_spin {
            stats.bonus_spins += 1;
        }

        let ratio = win / bet as f64;
        if ratio > stats.max_win_ratio {
            stats.max_win_ratio = ratio;
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn balance(&self) -> Credits {
        self.balance
    }

    pub fn bet(&self) -> u64 {
        self.bet
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Last settlement, reset to 0 when a spin starts
    pub fn win_amount(&self) -> Credits {
        self.win_amount
    }

    pub fn is_bonus_pending(&self) -> bool {
        self.is_bonus_pending
    }

    /// Kept through Win/Idle until the next spin starts
    pub fn is_bonus_spin(&self) -> bool {
        self.is_bonus_spin
    }

    pub fn winning_rows(&self) -> &[usize] {
        &self.winning_rows
    }

    /// Stops of the current (or last) spin
    pub fn request(&self) -> Option<&SpinRequest> {
        self.request.as_ref()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn config(&self) -> &SlotConfig {
        &self.config
    }

    pub fn catalog(&self) -> &SymbolCatalog {
        self.evaluator.catalog()
    }

    pub fn strips(&self) -> &ReelStripTable {
        &self.strips
    }

    /// Would a spin be accepted right now?
    pub fn can_spin(&self) -> bool {
        self.status.accepts_spin() && self.balance >= self.bet as f64
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            balance: self.balance,
            bet: self.bet,
            status: self.status,
            win_amount: self.win_amount,
            is_bonus_pending: self.is_bonus_pending,
            is_bonus_spin: self.is_bonus_spin,
            winning_rows: self.winning_rows.clone(),
            targets: self
                .request
                .as_ref()
                .map(|r| r.targets.clone())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::ScriptedSource;

    // Row r of every reel holds ROWS[r], so targets pick rows directly.
    const ROWS: [[&str; 5]; 6] = [
        ["cherry", "cherry", "cherry", "lemon", "grape"], // 3× cherry
        ["lemon", "grape", "bell", "cherry", "seven"],    // nothing
        ["bonus", "lemon", "grape", "bell", "seven"],     // bonus trigger
        ["seven", "seven", "seven", "seven", "seven"],    // 5× seven
        ["bell", "bell", "bell", "bonus", "grape"],       // 3× bell
        ["grape", "grape", "lemon", "lemon", "lemon"],    // nothing
    ];

    fn strips() -> ReelStripTable {
        ReelStripTable::from_reels(
            (0..5)
                .map(|reel| ROWS.iter().map(|row| row[reel].to_string()).collect())
                .collect(),
        )
        .unwrap()
    }

    fn session_with(spins: &[&[usize]], config: SlotConfig) -> GameSession {
        GameSession::new(
            config,
            SymbolCatalog::classic(),
            strips(),
            OutcomeGenerator::new(Box::new(ScriptedSource::from_spins(spins))),
        )
        .unwrap()
    }

    fn config() -> SlotConfig {
        SlotConfig {
            symbols_per_reel: 6,
            ..SlotConfig::default()
        }
    }

    fn session(spins: &[&[usize]]) -> GameSession {
        session_with(spins, config())
    }

    #[test]
    fn test_initial_state() {
        let s = session(&[&[0; 5]]);
        assert_eq!(s.status(), SessionStatus::Idle);
        assert_eq!(s.balance(), 1000.0);
        assert_eq!(s.bet(), 10);
        assert!(!s.is_bonus_pending());
        assert!(!s.is_bonus_spin());
        assert!(s.request().is_none());
    }

    #[test]
    fn test_spin_charges_bet() {
        let mut s = session(&[&[0; 5]]);
        let request = s.spin().unwrap();
        assert_eq!(request.targets, vec![0; 5]);
        assert_eq!(request.spin_id, 1);
        assert_eq!(s.balance(), 990.0);
        assert_eq!(s.status(), SessionStatus::Spinning);
        assert_eq!(s.win_amount(), 0.0);
    }

    #[test]
    fn test_winning_cycle_balance() {
        let mut s = session(&[&[0; 5]]);
        s.spin().unwrap();
        let settlement = s.complete_spin().unwrap();

        // 10 × 2 × (3 − 2)
        assert_eq!(settlement.win, 20.0);
        assert_eq!(s.balance(), 1000.0 - 10.0 + 20.0);
        assert_eq!(s.status(), SessionStatus::Win);
        assert_eq!(s.winning_rows(), &[0]);
        assert_eq!(settlement.tier, WinTier::Normal);
        assert!(!settlement.swept);
    }

    #[test]
    fn test_losing_cycle_returns_to_idle() {
        let mut s = session(&[&[1; 5]]);
        s.spin().unwrap();
        let settlement = s.complete_spin().unwrap();

        assert_eq!(settlement.win, 0.0);
        assert_eq!(settlement.tier, WinTier::None);
        assert_eq!(s.balance(), 990.0);
        assert_eq!(s.status(), SessionStatus::Idle);
        assert!(s.winning_rows().is_empty());
    }

    #[test]
    fn test_surface_losses() {
        let config = SlotConfig {
            surface_losses: true,
            ..config()
        };
        let mut s = session_with(&[&[1; 5]], config);
        s.spin().unwrap();
        s.complete_spin().unwrap();
        assert_eq!(s.status(), SessionStatus::Lose);
        assert!(s.spin().is_ok());
    }

    #[test]
    fn test_big_win_tier() {
        let mut s = session(&[&[3; 5]]);
        s.spin().unwrap();
        let settlement = s.complete_spin().unwrap();
        // 10 × 50 × 3
        assert_eq!(settlement.win, 1500.0);
        assert_eq!(settlement.tier, WinTier::Big);
        assert_eq!(s.stats().big_wins, 1);
    }

    #[test]
    fn test_insufficient_funds_leaves_state_untouched() {
        let config = SlotConfig {
            starting_balance: 5.0,
            ..config()
        };
        let mut s = session_with(&[&[0; 5]], config);
        let before = s.snapshot();

        let err = s.spin().unwrap_err();
        assert_eq!(
            err,
            SlotError::InsufficientFunds {
                balance: 5.0,
                bet: 10
            }
        );
        assert_eq!(s.snapshot(), before);
        assert!(s.request().is_none());
        assert!(!s.can_spin());
    }

    #[test]
    fn test_exact_balance_can_spin() {
        let config = SlotConfig {
            starting_balance: 10.0,
            ..config()
        };
        let mut s = session_with(&[&[1; 5]], config);
        s.spin().unwrap();
        assert_eq!(s.balance(), 0.0);
        s.complete_spin().unwrap();
        assert!(matches!(s.spin(), Err(SlotError::InsufficientFunds { .. })));
    }

    #[test]
    fn test_reentrant_spin_rejected() {
        let mut s = session(&[&[0; 5], &[3; 5]]);
        let first = s.spin().unwrap();
        assert_eq!(s.spin(), Err(SlotError::SpinInProgress));
        assert_eq!(s.balance(), 990.0);
        assert_eq!(s.request(), Some(&first));
    }

    #[test]
    fn test_complete_spin_is_idempotent() {
        let mut s = session(&[&[0; 5]]);
        assert!(s.complete_spin().is_none());

        s.spin().unwrap();
        assert!(s.complete_spin().is_some());
        let balance = s.balance();
        assert!(s.complete_spin().is_none());
        assert_eq!(s.balance(), balance);
        assert_eq!(s.stats().total_spins, 1);
    }

    #[test]
    fn test_set_bet() {
        let mut s = session(&[&[0; 5]]);
        assert_eq!(s.set_bet(25), Ok(25));
        assert_eq!(s.set_bet(0), Ok(1));
        assert_eq!(s.set_bet(-7), Ok(1));
        assert_eq!(s.bet(), 1);

        s.spin().unwrap();
        assert_eq!(s.set_bet(50), Err(SlotError::BetLocked));
        assert_eq!(s.bet(), 1);

        s.complete_spin().unwrap();
        assert_eq!(s.set_bet(50), Ok(50));
    }

    #[test]
    fn test_bonus_trigger_then_sweep() {
        let mut s = session(&[&[2; 5], &[0; 5]]);

        s.spin().unwrap();
        let trigger = s.complete_spin().unwrap();
        assert!(trigger.bonus_triggered);
        assert!(!trigger.swept);
        assert_eq!(trigger.win, 0.0);
        assert!(s.is_bonus_pending());
        assert!(!s.is_bonus_spin());

        s.spin().unwrap();
        assert!(s.is_bonus_spin());
        assert!(!s.is_bonus_pending());

        let bonus = s.complete_spin().unwrap();
        assert!(bonus.swept);
        // Rows 0 (cherry ×3), 3 (seven ×5) and 4 (bell ×3) pay
        assert_eq!(bonus.winning_rows, vec![0, 3, 4]);
        assert_eq!(bonus.win, 20.0 + 1500.0 + 100.0);
        assert_eq!(s.winning_rows(), &[0, 3, 4]);
        // Bonus visuals persist until the next spin starts
        assert!(s.is_bonus_spin());
        assert!(!s.is_bonus_pending());
    }

    #[test]
    fn test_retrigger_on_bonus_spin_skips_sweep() {
        // Spin 2 is a bonus spin, but its payline shows a bonus symbol again.
        let mut s = session(&[&[2; 5], &[2; 5], &[1; 5]]);

        s.spin().unwrap();
        s.complete_spin().unwrap();

        s.spin().unwrap();
        assert!(s.is_bonus_spin());
        let retrigger = s.complete_spin().unwrap();
        assert!(retrigger.bonus_triggered);
        assert!(!retrigger.swept);
        assert_eq!(retrigger.win, 0.0);
        // Settled re-trigger: the active flag stays for presentation, the next spin is armed
        assert!(s.is_bonus_spin() && s.is_bonus_pending());

        // Third spin consumes the re-armed bonus
        s.spin().unwrap();
        assert!(s.is_bonus_spin());
        assert!(!s.is_bonus_pending());
        assert!(s.complete_spin().unwrap().swept);
    }

    #[test]
    fn test_bonus_spin_flag_cleared_by_plain_spin() {
        let mut s = session(&[&[2; 5], &[1; 5], &[1; 5]]);
        s.spin().unwrap();
        s.complete_spin().unwrap();
        s.spin().unwrap();
        s.complete_spin().unwrap();
        assert!(s.is_bonus_spin());

        s.spin().unwrap();
        assert!(!s.is_bonus_spin());
        assert!(!s.is_bonus_pending());
    }

    #[test]
    fn test_bonus_flags_exclusive_at_spin_start() {
        let mut s = session(&[&[2; 5], &[2; 5], &[0; 5], &[1; 5], &[3; 5]]);
        for _ in 0..5 {
            s.spin().unwrap();
            assert!(!(s.is_bonus_pending() && s.is_bonus_spin()));
            s.complete_spin().unwrap();
        }
    }

    #[test]
    fn test_stats() {
        let mut s = session(&[&[0; 5], &[1; 5], &[2; 5], &[0; 5]]);
        for _ in 0..4 {
            s.spin().unwrap();
            s.complete_spin().unwrap();
        }
        let stats = s.stats();
        assert_eq!(stats.total_spins, 4);
        assert_eq!(stats.total_bet, 40.0);
        assert_eq!(stats.wins, 1 + 1);
        assert_eq!(stats.losses, 2);
        assert_eq!(stats.bonus_triggers, 1);
        assert_eq!(stats.bonus_spins, 1);
        assert!((stats.hit_rate() - 50.0).abs() < 1e-9);
        assert!(stats.rtp() > 0.0);
    }
}
