//! Per-run simulation: distance, spawning, collision, and effect application.
//!
//! The loop is a pure function of elapsed time plus internal state; the
//! shell calls [`RunState::advance`] once per display frame with whatever
//! `dt` it measured. Entities resolve exactly once, in creation order, when
//! they cross the collision band, and a depleted crowd ends the run
//! mid-step without processing the remainder.

use crate::bignum::{digit_count, scale};
use crate::constants::{
    BASE_SPEED, BASE_SPEED_PRACTICE, CLASH_GOLD_BASE, CLASH_GOLD_DIST_RATE, CLASH_GOLD_SPREAD,
    CLASH_LOSS_MAX_PERMILLE, CLASH_LOSS_MIN_PERMILLE, CLASH_SOLDIER_MAX_PERMILLE,
    CLASH_SOLDIER_MIN_PERMILLE, COLLISION_BAND_START, COLLISION_BAND_WIDTH, DEBUG_ENV_VAR,
    DESPAWN_Y, DISTANCE_SCALE, FIRST_SPAWN_DELAY, FP_DENOM, MAX_STEP_SECONDS, MULT_MIN,
    MULT_SOFT_CAP_DIGITS, MULT_SOFTEN_PERMILLE_PER_DIGIT, PROGRESS_DIVISOR, PROGRESS_MAX,
    SPAWN_INTERVAL_BASE, SPAWN_INTERVAL_BASE_PRACTICE, SPAWN_JITTER, SPAWN_TIGHTEN_DIVISOR,
    SPAWN_TIGHTEN_MAX, SPAWN_TIGHTEN_RATE, SPAWN_Y, SPEED_RAMP_BASE, SPEED_RAMP_DIVISOR,
    SPEED_RAMP_EXTRA, TRICKLE_BASE, TRICKLE_DIST_RATE,
};
use crate::encounters::{self, EncounterSpec, GateRoll, RollContext, SingleCard};
use crate::events::{EngineEvent, ResolutionOutcome, RunSummary};
use crate::numbers::{floor_f64_to_i64, i64_to_f64, permille};
use crate::progression::ProgressionRecord;
use crate::rng::RngBundle;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

#[cfg(debug_assertions)]
fn debug_log_enabled() -> bool {
    matches!(std::env::var(DEBUG_ENV_VAR), Ok(val) if val != "0")
}

#[cfg(not(debug_assertions))]
const fn debug_log_enabled() -> bool {
    false
}

/// Which of the two lanes the player occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    #[default]
    Left,
    Right,
}

impl Lane {
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

/// Run lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    Running,
    Paused,
    Ended,
}

/// One spawned encounter traveling down the playfield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u64,
    /// Position along the travel axis; grows toward the player.
    pub y: f64,
    pub resolved: bool,
    pub spec: EncounterSpec,
}

/// Result of one simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub ended: bool,
}

enum Resolution {
    Gate(GateRoll),
    Single(SingleCard),
}

/// Ephemeral per-run state; created on run start, discarded on restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub phase: RunPhase,
    pub practice: bool,
    pub lane: Lane,
    #[serde(with = "crate::bignum::serde_decimal")]
    pub crowd: BigInt,
    pub shields: i64,
    /// Distance traveled, in meters.
    pub distance: f64,
    pub speed: f64,
    base_speed: f64,
    pub elapsed: f64,
    next_spawn: f64,
    next_entity_id: u64,
    pub entities: SmallVec<[Entity; 8]>,
    pub gold_earned: f64,
    #[serde(with = "crate::bignum::serde_decimal")]
    pub soldiers_earned: BigInt,
    #[serde(with = "crate::bignum::serde_decimal")]
    pub peak_crowd: BigInt,
    pub win_streak: u32,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    /// Fresh idle state with nothing in flight.
    #[must_use]
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Idle,
            practice: false,
            lane: Lane::Left,
            crowd: BigInt::zero(),
            shields: 0,
            distance: 0.0,
            speed: 0.0,
            base_speed: BASE_SPEED,
            elapsed: 0.0,
            next_spawn: FIRST_SPAWN_DELAY,
            next_entity_id: 1,
            entities: SmallVec::new(),
            gold_earned: 0.0,
            soldiers_earned: BigInt::zero(),
            peak_crowd: BigInt::zero(),
            win_streak: 0,
        }
    }

    /// Reset everything and enter the Running phase.
    pub fn begin(&mut self, progress: &ProgressionRecord, practice: bool) {
        let derived = progress.derived();
        let crowd = BigInt::from(derived.start_crowd);
        *self = Self {
            phase: RunPhase::Running,
            practice,
            base_speed: if practice {
                BASE_SPEED_PRACTICE
            } else {
                BASE_SPEED
            },
            speed: if practice {
                BASE_SPEED_PRACTICE
            } else {
                BASE_SPEED
            },
            shields: derived.shield_charges.max(0),
            peak_crowd: crowd.clone(),
            crowd,
            ..Self::new()
        };
    }

    /// Discard all in-flight entities and return to Idle.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Flip between Running and Paused; other phases are untouched.
    pub fn toggle_pause(&mut self) -> RunPhase {
        self.phase = match self.phase {
            RunPhase::Running => RunPhase::Paused,
            RunPhase::Paused => RunPhase::Running,
            other => other,
        };
        self.phase
    }

    pub fn set_lane(&mut self, lane: Lane) {
        self.lane = lane;
    }

    /// Normalized progress factor fed to the encounter roller.
    #[must_use]
    pub fn progress_factor(&self) -> f64 {
        (self.distance / PROGRESS_DIVISOR).clamp(0.0, PROGRESS_MAX)
    }

    fn track_peak(&mut self) {
        if self.crowd > self.peak_crowd {
            self.peak_crowd = self.crowd.clone();
        }
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// No-op outside the Running phase. `dt` is clamped to one frame's worth
    /// of time so a backgrounded tab cannot teleport entities through the
    /// collision band.
    pub fn advance(
        &mut self,
        dt: f64,
        progress: &mut ProgressionRecord,
        best_distance: &mut f64,
        rng: &RngBundle,
        events: &mut Vec<EngineEvent>,
    ) -> StepOutcome {
        if self.phase != RunPhase::Running || !dt.is_finite() || dt <= 0.0 {
            return StepOutcome { ended: false };
        }
        let dt = dt.min(MAX_STEP_SECONDS);
        self.elapsed += dt;

        let prog = self.distance / SPEED_RAMP_DIVISOR;
        self.speed = self.base_speed
            + prog * SPEED_RAMP_BASE
            + if self.practice {
                0.0
            } else {
                prog * SPEED_RAMP_EXTRA
            };
        self.distance += self.speed * dt * DISTANCE_SCALE;
        if self.distance > *best_distance {
            *best_distance = self.distance;
        }

        self.next_spawn -= dt;
        if self.next_spawn <= 0.0 {
            self.spawn_entity(progress, rng, events);
        }

        let step = self.speed * dt;
        let mut ended = false;
        for idx in 0..self.entities.len() {
            let (id, resolution) = {
                let lane = self.lane;
                let entity = &mut self.entities[idx];
                entity.y += step;
                if entity.resolved
                    || entity.y < COLLISION_BAND_START
                    || entity.y > COLLISION_BAND_START + COLLISION_BAND_WIDTH
                {
                    continue;
                }
                match &entity.spec {
                    EncounterSpec::Row { left, right } => {
                        entity.resolved = true;
                        let card = if lane == Lane::Left { *left } else { *right };
                        (entity.id, Resolution::Gate(card))
                    }
                    EncounterSpec::Single { lane: bound, card } => {
                        if *bound != lane {
                            continue;
                        }
                        entity.resolved = true;
                        (entity.id, Resolution::Single(card.clone()))
                    }
                }
            };

            let outcome = match resolution {
                Resolution::Gate(card) => self.apply_gate(card, progress),
                Resolution::Single(card) => self.apply_single(&card, progress, rng),
            };
            events.push(EngineEvent::EntityResolved { id, outcome });

            if !self.crowd.is_positive() {
                ended = true;
                break;
            }
        }

        self.entities.retain(|entity| entity.y <= DESPAWN_Y);

        if !ended && !self.practice {
            let drip =
                dt * (TRICKLE_BASE + self.distance * TRICKLE_DIST_RATE) * progress.derived().gold_mult;
            progress.earn_gold(drip);
            self.gold_earned += drip;
        }

        if ended {
            self.finish(progress, *best_distance, events);
        }
        StepOutcome { ended }
    }

    fn spawn_entity(
        &mut self,
        progress: &ProgressionRecord,
        rng: &RngBundle,
        events: &mut Vec<EngineEvent>,
    ) {
        let derived = progress.derived();
        let spec = {
            let ctx = RollContext {
                t: self.progress_factor(),
                luck: derived.luck,
                purify_chance: derived.purify_chance,
                crowd: &self.crowd,
                win_streak: self.win_streak,
            };
            let mut gate_rng = rng.gate();
            encounters::roll_encounter(&ctx, &mut *gate_rng)
        };

        let id = self.next_entity_id;
        self.next_entity_id += 1;
        if debug_log_enabled() {
            println!(
                "Spawn | dist:{:.0} t:{:.2} id:{id} {spec:?}",
                self.distance,
                self.progress_factor()
            );
        }
        events.push(EngineEvent::EntitySpawned {
            id,
            spec: spec.clone(),
        });
        self.entities.push(Entity {
            id,
            y: SPAWN_Y,
            resolved: false,
            spec,
        });

        let base = if self.practice {
            SPAWN_INTERVAL_BASE_PRACTICE
        } else {
            SPAWN_INTERVAL_BASE
        };
        let tighten = (SPAWN_TIGHTEN_RATE * (self.distance / SPAWN_TIGHTEN_DIVISOR))
            .clamp(0.0, SPAWN_TIGHTEN_MAX);
        self.next_spawn = base - tighten + rng.spawn().gen_range(0.0..SPAWN_JITTER);
    }

    fn apply_gate(&mut self, card: GateRoll, progress: &mut ProgressionRecord) -> ResolutionOutcome {
        let derived = progress.derived();
        match card {
            GateRoll::Gold(g) => {
                let gain = i64_to_f64(floor_f64_to_i64(i64_to_f64(g) * derived.gold_mult));
                progress.earn_gold(gain);
                self.gold_earned += gain;
                ResolutionOutcome::LootedGold {
                    amount: floor_f64_to_i64(gain),
                }
            }
            GateRoll::Soldiers(s) => {
                let amount = BigInt::from(s.max(0));
                progress.earn_soldiers(&amount);
                self.soldiers_earned += &amount;
                ResolutionOutcome::DraftedSoldiers { count: s.max(0) }
            }
            GateRoll::Shield(s) => {
                self.shields += s.max(0);
                ResolutionOutcome::GainedShields {
                    charges: s.max(0),
                    total: self.shields,
                }
            }
            GateRoll::Plus(n) => {
                self.crowd += n.max(0);
                self.track_peak();
                ResolutionOutcome::Recruited {
                    added: n.max(0),
                    crowd: self.crowd.clone(),
                }
            }
            GateRoll::Mult(m) => {
                let factor = softened_mult_permille(m, digit_count(&self.crowd));
                self.crowd = scale(&self.crowd, factor, FP_DENOM);
                self.track_peak();
                ResolutionOutcome::Rallied {
                    multiplier_permille: factor,
                    crowd: self.crowd.clone(),
                }
            }
            GateRoll::Risk(n) => {
                if self.shields > 0 {
                    self.shields -= 1;
                    return ResolutionOutcome::TrapBlocked {
                        shields_left: self.shields,
                    };
                }
                self.crowd -= n.max(0);
                if self.crowd.is_negative() {
                    self.crowd = BigInt::zero();
                }
                ResolutionOutcome::Ambushed {
                    lost: n.max(0),
                    crowd: self.crowd.clone(),
                }
            }
        }
    }

    fn apply_single(
        &mut self,
        card: &SingleCard,
        progress: &mut ProgressionRecord,
        rng: &RngBundle,
    ) -> ResolutionOutcome {
        let derived = progress.derived();
        match card {
            SingleCard::Enemy { threat } => {
                let effective = scale(threat, FP_DENOM - permille(derived.mitigation), FP_DENOM);
                if self.crowd > effective {
                    let mut clash = rng.clash();
                    let loss_share =
                        clash.gen_range(CLASH_LOSS_MIN_PERMILLE..=CLASH_LOSS_MAX_PERMILLE);
                    let losses = scale(&effective, loss_share, FP_DENOM);
                    self.crowd -= &losses;

                    let gold_base = CLASH_GOLD_BASE
                        + clash.gen_range(0.0..CLASH_GOLD_SPREAD)
                        + self.distance * CLASH_GOLD_DIST_RATE;
                    let gold = i64_to_f64(floor_f64_to_i64(gold_base * derived.gold_mult));
                    progress.earn_gold(gold);
                    self.gold_earned += gold;

                    let soldier_share =
                        clash.gen_range(CLASH_SOLDIER_MIN_PERMILLE..=CLASH_SOLDIER_MAX_PERMILLE);
                    let soldiers = scale(&effective, soldier_share, FP_DENOM) + 1;
                    progress.earn_soldiers(&soldiers);
                    self.soldiers_earned += &soldiers;

                    self.win_streak += 1;
                    progress.stats.clash_wins += 1;
                    ResolutionOutcome::ClashWon {
                        losses,
                        gold: floor_f64_to_i64(gold),
                        soldiers,
                    }
                } else {
                    self.crowd = BigInt::zero();
                    self.win_streak = 0;
                    progress.stats.clash_losses += 1;
                    ResolutionOutcome::ClashLost {
                        effective_threat: effective,
                    }
                }
            }
            SingleCard::Coin { gold } => {
                let gain = i64_to_f64(floor_f64_to_i64(i64_to_f64(*gold) * derived.gold_mult));
                progress.earn_gold(gain);
                self.gold_earned += gain;
                ResolutionOutcome::LootedGold {
                    amount: floor_f64_to_i64(gain),
                }
            }
            SingleCard::Soldiers { count } => {
                let amount = BigInt::from((*count).max(0));
                progress.earn_soldiers(&amount);
                self.soldiers_earned += &amount;
                ResolutionOutcome::DraftedSoldiers {
                    count: (*count).max(0),
                }
            }
            SingleCard::Shield { charges } => {
                self.shields += (*charges).max(0);
                ResolutionOutcome::GainedShields {
                    charges: (*charges).max(0),
                    total: self.shields,
                }
            }
        }
    }

    fn finish(
        &mut self,
        progress: &mut ProgressionRecord,
        best_distance: f64,
        events: &mut Vec<EngineEvent>,
    ) {
        self.phase = RunPhase::Ended;
        if debug_log_enabled() {
            println!(
                "Run ended | dist:{:.0} gold:{:.0} streak:{}",
                self.distance, self.gold_earned, self.win_streak
            );
        }
        if self.peak_crowd > progress.stats.best_crowd {
            progress.stats.best_crowd = self.peak_crowd.clone();
        }
        events.push(EngineEvent::RunEnded {
            summary: RunSummary {
                distance: self.distance,
                gold_earned: self.gold_earned,
                soldiers_earned: self.soldiers_earned.clone(),
                peak_crowd: self.peak_crowd.clone(),
                best_distance,
                practice: self.practice,
            },
        });
    }
}

/// Effective multiplier in permille after the anti-snowball soften.
///
/// Each decimal digit of crowd past the soft-cap threshold shaves a fixed
/// permille slice off the applied multiplier, floored at the minimum.
#[must_use]
pub fn softened_mult_permille(m: i64, digits: u32) -> i64 {
    let over = i64::from(digits.saturating_sub(MULT_SOFT_CAP_DIGITS));
    (m * FP_DENOM - over * MULT_SOFTEN_PERMILLE_PER_DIGIT).max(MULT_MIN * FP_DENOM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FLOAT_EPSILON;
    use crate::progression::UpgradeLevels;

    fn running_state(progress: &ProgressionRecord) -> RunState {
        let mut run = RunState::new();
        run.begin(progress, false);
        run
    }

    #[test]
    fn begin_derives_crowd_and_shields_from_progression() {
        let mut progress = ProgressionRecord::default();
        progress.upgrades = UpgradeLevels {
            barracks: 2,
            shields: 3,
            ..UpgradeLevels::default()
        };
        let run = running_state(&progress);
        assert_eq!(run.phase, RunPhase::Running);
        assert_eq!(run.crowd, BigInt::from(16));
        assert_eq!(run.shields, 3);
        assert!(run.entities.is_empty());
    }

    #[test]
    fn pause_only_toggles_between_running_states() {
        let progress = ProgressionRecord::default();
        let mut run = running_state(&progress);
        assert_eq!(run.toggle_pause(), RunPhase::Paused);
        assert_eq!(run.toggle_pause(), RunPhase::Running);
        run.phase = RunPhase::Ended;
        assert_eq!(run.toggle_pause(), RunPhase::Ended);
    }

    #[test]
    fn paused_run_does_not_advance() {
        let mut progress = ProgressionRecord::default();
        let mut run = running_state(&progress);
        run.toggle_pause();
        let rng = RngBundle::from_user_seed(1);
        let mut best = 0.0;
        let mut events = Vec::new();
        let outcome = run.advance(0.016, &mut progress, &mut best, &rng, &mut events);
        assert!(!outcome.ended);
        assert!((run.distance - 0.0).abs() < f64::EPSILON);
        assert!(events.is_empty());
    }

    #[test]
    fn plus_then_mult_then_clash_matches_hand_arithmetic() {
        let mut progress = ProgressionRecord::default();
        let mut run = running_state(&progress);
        assert_eq!(run.crowd, BigInt::from(10));

        let outcome = run.apply_gate(GateRoll::Plus(12), &mut progress);
        assert_eq!(run.crowd, BigInt::from(22));
        assert!(matches!(outcome, ResolutionOutcome::Recruited { added: 12, .. }));

        // Two digits: no soften, x3 applies exactly.
        let outcome = run.apply_gate(GateRoll::Mult(3), &mut progress);
        assert_eq!(run.crowd, BigInt::from(66));
        assert!(matches!(
            outcome,
            ResolutionOutcome::Rallied {
                multiplier_permille: 3_000,
                ..
            }
        ));

        let rng = RngBundle::from_user_seed(11);
        let card = SingleCard::Enemy {
            threat: BigInt::from(40),
        };
        let outcome = run.apply_single(&card, &mut progress, &rng);
        let ResolutionOutcome::ClashWon { losses, gold, soldiers } = outcome else {
            panic!("66 vs 40 must win");
        };
        // Loss fraction is drawn from [0.12, 0.26] of the effective threat.
        assert!(losses >= BigInt::from(4) && losses <= BigInt::from(10));
        assert_eq!(run.crowd, BigInt::from(66) - &losses);
        assert!(gold >= 25);
        assert!(soldiers >= BigInt::from(3) && soldiers <= BigInt::from(6));
        assert_eq!(run.win_streak, 1);
        assert_eq!(progress.stats.clash_wins, 1);
    }

    #[test]
    fn clash_loss_zeroes_crowd_exactly() {
        let mut progress = ProgressionRecord::default();
        let mut run = running_state(&progress);
        run.crowd = BigInt::from(30);
        run.win_streak = 4;
        let rng = RngBundle::from_user_seed(2);
        let card = SingleCard::Enemy {
            threat: BigInt::from(30),
        };
        let outcome = run.apply_single(&card, &mut progress, &rng);
        assert!(matches!(outcome, ResolutionOutcome::ClashLost { .. }));
        assert_eq!(run.crowd, BigInt::zero());
        assert_eq!(run.win_streak, 0);
        assert_eq!(progress.stats.clash_losses, 1);
    }

    #[test]
    fn mitigation_shrinks_effective_threat() {
        let mut progress = ProgressionRecord::default();
        progress.upgrades.archer = 5; // 30% mitigation
        let mut run = running_state(&progress);
        run.crowd = BigInt::from(75);
        let rng = RngBundle::from_user_seed(3);
        // Raw threat 100 would defeat 75; mitigated to 70 it loses.
        let card = SingleCard::Enemy {
            threat: BigInt::from(100),
        };
        let outcome = run.apply_single(&card, &mut progress, &rng);
        let ResolutionOutcome::ClashWon { .. } = outcome else {
            panic!("mitigated threat of 70 must lose to 75");
        };
    }

    #[test]
    fn shields_block_risk_gates() {
        let mut progress = ProgressionRecord::default();
        let mut run = running_state(&progress);
        run.shields = 1;
        let outcome = run.apply_gate(GateRoll::Risk(9), &mut progress);
        assert_eq!(outcome, ResolutionOutcome::TrapBlocked { shields_left: 0 });
        assert_eq!(run.crowd, BigInt::from(10));

        let outcome = run.apply_gate(GateRoll::Risk(9), &mut progress);
        assert!(matches!(outcome, ResolutionOutcome::Ambushed { lost: 9, .. }));
        assert_eq!(run.crowd, BigInt::from(1));

        let outcome = run.apply_gate(GateRoll::Risk(9), &mut progress);
        assert!(matches!(outcome, ResolutionOutcome::Ambushed { .. }));
        assert_eq!(run.crowd, BigInt::zero(), "crowd floors at zero");
    }

    #[test]
    fn soften_reduces_large_crowd_multipliers() {
        assert_eq!(softened_mult_permille(3, 2), 3_000);
        assert_eq!(softened_mult_permille(3, 6), 3_000);
        assert_eq!(softened_mult_permille(3, 8), 2_820);
        assert_eq!(softened_mult_permille(3, 30), 2_000, "floors at x2");
    }

    #[test]
    fn gold_gates_respect_steward_multiplier() {
        let mut progress = ProgressionRecord::default();
        progress.upgrades.steward = 5; // x1.4
        let mut run = running_state(&progress);
        let outcome = run.apply_gate(GateRoll::Gold(10), &mut progress);
        assert_eq!(outcome, ResolutionOutcome::LootedGold { amount: 14 });
        assert!((progress.gold_bank - 14.0).abs() < FLOAT_EPSILON);
        assert!((progress.stats.gold_earned - 14.0).abs() < FLOAT_EPSILON);
    }

    #[test]
    fn advancing_spawns_resolves_and_trickles() {
        let mut progress = ProgressionRecord::default();
        let mut run = running_state(&progress);
        let rng = RngBundle::from_user_seed(42);
        let mut best = 0.0;
        let mut events = Vec::new();

        let mut steps = 0u32;
        while run.phase == RunPhase::Running && steps < 60_000 {
            run.advance(0.016, &mut progress, &mut best, &rng, &mut events);
            steps += 1;
        }

        assert!(run.distance > 0.0);
        assert!(best >= run.distance - 1e-9);
        assert!(
            events
                .iter()
                .any(|event| matches!(event, EngineEvent::EntitySpawned { .. })),
            "spawns must be reported"
        );
        assert!(!run.crowd.is_negative());
        assert!(progress.gold_bank > 0.0, "trickle accrues outside practice");
        if run.phase == RunPhase::Ended {
            assert!(
                events
                    .iter()
                    .any(|event| matches!(event, EngineEvent::RunEnded { .. })),
                "run end must be reported"
            );
        }
    }

    #[test]
    fn entities_past_the_far_bound_are_discarded() {
        let mut progress = ProgressionRecord::default();
        let mut run = running_state(&progress);
        run.entities.push(Entity {
            id: 99,
            y: DESPAWN_Y + 1.0,
            resolved: false,
            spec: EncounterSpec::Row {
                left: GateRoll::Plus(1),
                right: GateRoll::Plus(1),
            },
        });
        let rng = RngBundle::from_user_seed(5);
        let mut best = 0.0;
        let mut events = Vec::new();
        run.advance(0.001, &mut progress, &mut best, &rng, &mut events);
        assert!(
            !run.entities.iter().any(|entity| entity.id == 99),
            "stale entity must be discarded unresolved"
        );
        assert!(
            !events
                .iter()
                .any(|event| matches!(event, EngineEvent::EntityResolved { id: 99, .. })),
            "discarded entities never resolve"
        );
    }

    #[test]
    fn practice_mode_skips_the_trickle() {
        let mut progress = ProgressionRecord::default();
        let mut run = RunState::new();
        run.begin(&progress, true);
        let rng = RngBundle::from_user_seed(6);
        let mut best = 0.0;
        let mut events = Vec::new();
        for _ in 0..20 {
            run.advance(0.016, &mut progress, &mut best, &rng, &mut events);
        }
        assert!((progress.gold_bank - 0.0).abs() < f64::EPSILON);
    }
}
