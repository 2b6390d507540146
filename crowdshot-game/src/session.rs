//! High-level session binding progression, the live run, and RNG streams.
//!
//! The session is the single owner of the mutable [`ProgressionRecord`];
//! every mutation flows through an explicit intent method, which keeps the
//! simulation deterministic under test and leaves persistence timing to the
//! engine wrapper.

use crate::events::EngineEvent;
use crate::progression::{EconomyError, ProgressionRecord, UpgradeKind};
use crate::rng::RngBundle;
use crate::run::{Lane, RunPhase, RunState, StepOutcome};
use crate::towers::{self, AssignDelta, WaveReport};
use std::rc::Rc;

/// One player's live game: kingdom record, current run, and event buffer.
#[derive(Debug)]
pub struct GameSession {
    progress: ProgressionRecord,
    best_distance: f64,
    run: RunState,
    rng: Rc<RngBundle>,
    events: Vec<EngineEvent>,
    seed: u64,
}

impl GameSession {
    /// Construct a session from loaded state, normalizing whatever arrived.
    #[must_use]
    pub fn new(progress: Option<ProgressionRecord>, best_distance: f64, seed: u64) -> Self {
        let mut progress = progress.unwrap_or_default();
        progress.normalize();
        let best_distance = if best_distance.is_finite() {
            best_distance.max(0.0)
        } else {
            0.0
        };
        Self {
            progress,
            best_distance,
            run: RunState::new(),
            rng: Rc::new(RngBundle::from_user_seed(seed)),
            events: Vec::new(),
            seed,
        }
    }

    /// Borrow the progression record.
    #[must_use]
    pub const fn progress(&self) -> &ProgressionRecord {
        &self.progress
    }

    /// Apply a closure to the mutable progression record.
    pub fn with_progress_mut<R>(&mut self, f: impl FnOnce(&mut ProgressionRecord) -> R) -> R {
        f(&mut self.progress)
    }

    /// Borrow the current run state.
    #[must_use]
    pub const fn run(&self) -> &RunState {
        &self.run
    }

    #[must_use]
    pub const fn best_distance(&self) -> f64 {
        self.best_distance
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Deterministically reseed the RNG streams.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Rc::new(RngBundle::from_user_seed(seed));
    }

    /// Drain buffered presentation events.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Run intents -------------------------------------------------------

    pub fn set_lane(&mut self, lane: Lane) {
        self.run.set_lane(lane);
    }

    /// Begin a fresh run, discarding any previous one.
    pub fn start_run(&mut self, practice: bool) {
        self.run.begin(&self.progress, practice);
        self.progress.stats.runs += 1;
    }

    pub fn toggle_pause(&mut self) -> RunPhase {
        self.run.toggle_pause()
    }

    /// Discard all in-flight entities and return the run to Idle.
    pub fn restart(&mut self) {
        self.run.reset();
    }

    /// Step the simulation; a no-op unless a run is in the Running phase.
    pub fn advance(&mut self, dt: f64) -> StepOutcome {
        self.run.advance(
            dt,
            &mut self.progress,
            &mut self.best_distance,
            &self.rng,
            &mut self.events,
        )
    }

    // --- Kingdom intents ---------------------------------------------------

    /// Buy the next level of an upgrade track.
    ///
    /// # Errors
    ///
    /// Rejections leave the record untouched.
    pub fn buy_upgrade(&mut self, kind: UpgradeKind) -> Result<u32, EconomyError> {
        let level = self.progress.buy_upgrade(kind)?;
        self.events.push(EngineEvent::UpgradePurchased {
            upgrade: kind,
            level,
        });
        Ok(level)
    }

    /// Build an additional tower slot.
    ///
    /// # Errors
    ///
    /// Rejections leave the record untouched.
    pub fn buy_tower_slot(&mut self) -> Result<u32, EconomyError> {
        let slots = towers::buy_tower_slot(&mut self.progress)?;
        self.events.push(EngineEvent::TowerSlotBuilt { slots });
        Ok(slots)
    }

    /// Raise one tower's level.
    ///
    /// # Errors
    ///
    /// Rejections leave the record untouched.
    pub fn upgrade_tower(&mut self, tower: usize) -> Result<u32, EconomyError> {
        let level = towers::upgrade_tower(&mut self.progress, tower)?;
        self.events.push(EngineEvent::TowerUpgraded { tower, level });
        Ok(level)
    }

    /// Move soldiers between the bank and one tower.
    ///
    /// # Errors
    ///
    /// Rejections leave both pools untouched.
    pub fn assign_soldiers(
        &mut self,
        tower: usize,
        delta: &AssignDelta,
    ) -> Result<(), EconomyError> {
        towers::assign_soldiers(&mut self.progress, tower, delta)?;
        self.events.push(EngineEvent::SoldiersMoved { tower });
        Ok(())
    }

    /// Resolve the current defense wave.
    pub fn fight_wave(&mut self) -> WaveReport {
        let report = towers::resolve_wave(&mut self.progress, &mut *self.rng.wave());
        self.events.push(EngineEvent::WaveResolved {
            report: report.clone(),
        });
        report
    }

    /// Restore the default record. Best distance survives as a historical
    /// score; everything else is wiped.
    pub fn reset_progress(&mut self) {
        self.progress = ProgressionRecord::default();
        self.run.reset();
        self.events.push(EngineEvent::ProgressReset);
    }
}
