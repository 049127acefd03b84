//! Frame-driven slot machine: session + reels + presenter
//!
//! The host calls `frame(now_ms)` once per render tick. Everything else
//! (spin start, reel landing, settlement) happens from inside these calls,
//! on the caller's thread.

use crate::animator::{ReelSet, ReelTick};
use crate::config::SlotConfig;
use crate::cue::{Presenter, ReelFrame, SoundCue};
use crate::error::{SlotError, SlotResult};
use crate::outcome::{OutcomeGenerator, RngSource, SpinRequest};
use crate::session::{GameSession, Settlement};
use crate::symbols::{ReelStripTable, SymbolCatalog, GENERATED_FILL_IDS};

/// Number of bonus symbols per generated strip
const GENERATED_BONUS_PER_REEL: usize = 5;

/// Complete machine
pub struct SlotMachine<P: Presenter> {
    session: GameSession,
    reels: ReelSet,
    presenter: P,
}

impl<P: Presenter> SlotMachine<P> {
    /// Wrap an existing session
    pub fn new(session: GameSession, presenter: P) -> Self {
        let config = session.config();
        let reels = ReelSet::new(config.reel_count, config.symbols_per_reel, &config.timing);
        Self {
            session,
            reels,
            presenter,
        }
    }

    /// Build from config and a strip table
    pub fn with_strips(
        config: SlotConfig,
        catalog: SymbolCatalog,
        strips: ReelStripTable,
        generator: OutcomeGenerator,
        presenter: P,
    ) -> SlotResult<Self> {
        let session = GameSession::new(config, catalog, strips, generator)?;
        Ok(Self::new(session, presenter))
    }

    /// Build with a freshly generated strip table
    pub fn generated(config: SlotConfig, seed: u64, presenter: P) -> SlotResult<Self> {
        let catalog = SymbolCatalog::classic();
        let mut source = RngSource::seeded(seed);
        let strips = ReelStripTable::generate(
            &catalog,
            &GENERATED_FILL_IDS,
            config.reel_count,
            config.symbols_per_reel,
            GENERATED_BONUS_PER_REEL,
            source.rng_mut(),
        );
        let generator = OutcomeGenerator::new(Box::new(source));
        Self::with_strips(config, catalog, strips, generator, presenter)
    }

    /// Spin button
    pub fn press_spin(&mut self, now_ms: f64) -> SlotResult<SpinRequest> {
        match self.session.spin() {
            Ok(request) => {
                self.reels.start(&request, now_ms);
                self.presenter.play_sound(SoundCue::SpinStart);
                Ok(request)
            }
            Err(err) => {
                if let SlotError::InsufficientFunds { .. } = err {
                    self.presenter.play_sound(SoundCue::InsufficientFunds);
                    self.presenter.show_insufficient_funds();
                }
                Err(err)
            }
        }
    }

    /// Bet input
    pub fn set_bet(&mut self, amount: i64) -> SlotResult<u64> {
        let bet = self.session.set_bet(amount)?;
        self.presenter.play_sound(SoundCue::Button);
        Ok(bet)
    }

    /// Bet +/- buttons
    pub fn adjust_bet(&mut self, delta: i64) -> SlotResult<u64> {
        let current = i64::try_from(self.session.bet()).unwrap_or(i64::MAX);
        self.set_bet(current.saturating_add(delta))
    }

    /// Advance one render frame. Returns the settlement on the frame the
    /// last reel lands.
    pub fn frame(&mut self, now_ms: f64) -> Option<Settlement> {
        let report = self.reels.tick(now_ms);
        let rows = self.session.config().visible_rows;

        for (reel, tick) in self.reels.reels().iter().zip(&report.ticks) {
            let strip = self.session.strips().strip(reel.reel_index());
            let frame = ReelFrame {
                reel_index: reel.reel_index(),
                angle: tick.angle(),
                front_index: reel.front_index(),
                visible: reel.visible_symbols(strip, rows),
                spinning: matches!(tick, ReelTick::Spinning { .. }),
            };
            self.presenter.render_reel(&frame);
        }

        for &reel_index in &report.landed {
            self.presenter.play_sound(SoundCue::ReelStop { reel_index });
        }

        let spin_id = report.completed_spin?;
        let settlement = self.session.complete_spin()?;
        if settlement.spin_id != spin_id {
            log::warn!(
                "reels completed spin {} but session settled spin {}",
                spin_id,
                settlement.spin_id
            );
        }

        if let Some(cue) = SoundCue::for_win(settlement.tier) {
            self.presenter.play_sound(cue);
        }
        if settlement.bonus_triggered {
            self.presenter.play_sound(SoundCue::BonusTriggered);
        }
        Some(settlement)
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn reels(&self) -> &ReelSet {
        &self.reels
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }
}
