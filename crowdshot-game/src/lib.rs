//! Crowdshot Game Engine
//!
//! Platform-agnostic core game logic for the Crowdshot lane-runner/idle
//! hybrid. This crate provides the procedural encounter engine, the
//! arbitrary-precision progression economy, and the defense wave resolver
//! without UI or platform-specific dependencies; rendering, input, and the
//! actual storage backend live in the embedding shell.

pub mod bignum;
pub mod constants;
pub mod encounters;
pub mod events;
pub mod numbers;
pub mod progression;
pub mod rng;
pub mod run;
pub mod session;
pub mod towers;

// Re-export commonly used types
pub use encounters::{
    EncounterSpec, GateRoll, RollContext, SingleCard, SpawnKind, compose_row, maybe_purify,
    mult_cap, roll_encounter, roll_gate, roll_spawn_kind, roll_threat,
};
pub use events::{EngineEvent, ResolutionOutcome, RunSummary};
pub use progression::{
    DerivedStats, EconomyError, LifetimeStats, ProgressionRecord, UpgradeKind, UpgradeLevels,
};
pub use rng::{CountingRng, RngBundle};
pub use run::{Entity, Lane, RunPhase, RunState, StepOutcome, softened_mult_permille};
pub use session::GameSession;
pub use towers::{
    AssignDelta, TowerState, WaveOutcome, WaveReport, defense_power, distribute_proportional,
    resolve_wave, tower_level_cost, tower_multiplier_permille, tower_slot_cost,
};

/// Trait for abstracting progression persistence.
/// Platform-specific implementations should provide this.
///
/// Adapters are expected to treat malformed stored data as absent rather
/// than failing the load; the core re-normalizes whatever arrives.
pub trait ProgressStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the progression record, `None` when nothing usable is stored.
    ///
    /// # Errors
    ///
    /// Returns an error only for genuine I/O failures.
    fn load_progress(&self) -> Result<Option<ProgressionRecord>, Self::Error>;

    /// Persist the progression record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn save_progress(&self, record: &ProgressionRecord) -> Result<(), Self::Error>;

    /// Load the best-distance record; zero when nothing usable is stored.
    ///
    /// # Errors
    ///
    /// Returns an error only for genuine I/O failures.
    fn load_best_distance(&self) -> Result<f64, Self::Error>;

    /// Persist the best-distance record.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    fn save_best_distance(&self, value: f64) -> Result<(), Self::Error>;
}

/// Main engine binding a [`GameSession`] to write-through persistence.
///
/// Every mutating intent saves synchronously after it applies; storage is
/// assumed local and fast, and there is no concurrent mutator.
#[derive(Debug)]
pub struct GameEngine<S>
where
    S: ProgressStore,
{
    store: S,
    session: GameSession,
}

impl<S> GameEngine<S>
where
    S: ProgressStore,
{
    /// Create an engine from stored state, falling back to defaults when
    /// nothing usable is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage adapter fails outright.
    pub fn new(store: S, seed: u64) -> Result<Self, S::Error> {
        let progress = store.load_progress()?;
        let best = store.load_best_distance()?;
        Ok(Self {
            store,
            session: GameSession::new(progress, best, seed),
        })
    }

    /// Borrow the live session.
    #[must_use]
    pub const fn session(&self) -> &GameSession {
        &self.session
    }

    /// Borrow the live session mutably.
    pub const fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    fn persist(&self) -> Result<(), S::Error> {
        self.store.save_progress(self.session.progress())?;
        self.store.save_best_distance(self.session.best_distance())
    }

    /// Replace the live session with freshly loaded state, keeping the seed.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage adapter fails outright.
    pub fn reload(&mut self) -> Result<(), anyhow::Error>
    where
        S::Error: Into<anyhow::Error>,
    {
        let progress = self.store.load_progress().map_err(Into::into)?;
        let best = self.store.load_best_distance().map_err(Into::into)?;
        self.session = GameSession::new(progress, best, self.session.seed());
        Ok(())
    }

    /// Drain buffered presentation events.
    pub fn take_events(&mut self) -> Vec<EngineEvent> {
        self.session.take_events()
    }

    pub fn set_lane(&mut self, lane: Lane) {
        self.session.set_lane(lane);
    }

    pub fn toggle_pause(&mut self) -> RunPhase {
        self.session.toggle_pause()
    }

    pub fn restart(&mut self) {
        self.session.restart();
    }

    /// Begin a run and persist the updated lifetime stats.
    ///
    /// # Errors
    ///
    /// Returns an error if the save fails.
    pub fn start_run(&mut self, practice: bool) -> Result<(), S::Error> {
        self.session.start_run(practice);
        self.persist()
    }

    /// Step the simulation and persist the mutated record.
    ///
    /// # Errors
    ///
    /// Returns an error if the save fails.
    pub fn advance(&mut self, dt: f64) -> Result<StepOutcome, S::Error> {
        let outcome = self.session.advance(dt);
        self.persist()?;
        Ok(outcome)
    }

    /// Buy an upgrade; the inner result is the economy's accept/reject.
    ///
    /// # Errors
    ///
    /// The outer error is a storage failure.
    pub fn buy_upgrade(
        &mut self,
        kind: UpgradeKind,
    ) -> Result<Result<u32, EconomyError>, S::Error> {
        let outcome = self.session.buy_upgrade(kind);
        if outcome.is_ok() {
            self.persist()?;
        }
        Ok(outcome)
    }

    /// Build a tower slot; the inner result is the economy's accept/reject.
    ///
    /// # Errors
    ///
    /// The outer error is a storage failure.
    pub fn buy_tower_slot(&mut self) -> Result<Result<u32, EconomyError>, S::Error> {
        let outcome = self.session.buy_tower_slot();
        if outcome.is_ok() {
            self.persist()?;
        }
        Ok(outcome)
    }

    /// Raise a tower level; the inner result is the economy's accept/reject.
    ///
    /// # Errors
    ///
    /// The outer error is a storage failure.
    pub fn upgrade_tower(&mut self, tower: usize) -> Result<Result<u32, EconomyError>, S::Error> {
        let outcome = self.session.upgrade_tower(tower);
        if outcome.is_ok() {
            self.persist()?;
        }
        Ok(outcome)
    }

    /// Move soldiers; the inner result is the economy's accept/reject.
    ///
    /// # Errors
    ///
    /// The outer error is a storage failure.
    pub fn assign_soldiers(
        &mut self,
        tower: usize,
        delta: &AssignDelta,
    ) -> Result<Result<(), EconomyError>, S::Error> {
        let outcome = self.session.assign_soldiers(tower, delta);
        if outcome.is_ok() {
            self.persist()?;
        }
        Ok(outcome)
    }

    /// Resolve the current defense wave and persist the outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the save fails.
    pub fn fight_wave(&mut self) -> Result<WaveReport, S::Error> {
        let report = self.session.fight_wave();
        self.persist()?;
        Ok(report)
    }

    /// Wipe progression (best distance survives) and persist the wipe.
    ///
    /// # Errors
    ///
    /// Returns an error if the save fails.
    pub fn reset_progress(&mut self) -> Result<(), S::Error> {
        self.session.reset_progress();
        self.persist()
    }
}
