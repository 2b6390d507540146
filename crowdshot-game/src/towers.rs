//! Tower assignments and the defense wave resolver.
//!
//! Wave resolution is a pure computation: defense power versus a rolled
//! enemy army, followed by proportional casualty distribution. Any animated
//! playback belongs to the presentation layer and replays an outcome that
//! was already decided here.

use crate::bignum::{self, scale};
use crate::constants::{
    ARMY_FLAT_PER_WAVE, ARMY_JITTER_MAX_PERMILLE, ARMY_JITTER_MIN_PERMILLE, ARMY_PCT_BASE_PERMILLE,
    ARMY_PCT_MAX_PERMILLE, ARMY_PCT_STEP_PERMILLE, BONUS_ARCHER_PERMILLE,
    BONUS_BARRACKS_PERMILLE, CASUALTY_BASE_PERMILLE, CASUALTY_MAX_PERMILLE,
    CASUALTY_STEP_PERMILLE, DEFEAT_LOSS_BASE_PERMILLE, DEFEAT_LOSS_MAX_PERMILLE,
    DEFEAT_LOSS_STEP_PERMILLE, FP_DENOM, REPAIR_COST_BASE, REPAIR_COST_PER_WAVE,
    TOWER_LEVEL_COST_BASE, TOWER_LEVEL_COST_GROWTH, TOWER_SLOT_COST_BASE, TOWER_SLOT_COST_GROWTH,
    TOWER_SLOT_MAX, TOWER_STEP_PERMILLE, WAVE_GOLD_BASE, WAVE_GOLD_PER_WAVE,
    WAVE_SOLDIER_REWARD_FLAT, WAVE_SOLDIER_REWARD_PERMILLE,
};
use crate::numbers::{floor_f64_to_i64, i64_to_f64};
use crate::progression::{EconomyError, ProgressionRecord};
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use rand::Rng;
use serde::{Deserialize, Serialize};

fn default_level() -> u32 {
    1
}

/// One defense tower slot: a damage multiplier plus its soldier garrison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TowerState {
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default, with = "bignum::serde_decimal")]
    pub assigned: BigInt,
}

impl Default for TowerState {
    fn default() -> Self {
        Self {
            level: default_level(),
            assigned: BigInt::zero(),
        }
    }
}

/// Requested soldier movement between the bank and one tower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "direction", content = "amount")]
pub enum AssignDelta {
    /// Move soldiers from the bank onto the tower.
    Deposit(#[serde(with = "bignum::serde_decimal")] BigInt),
    /// Move soldiers from the tower back to the bank.
    Withdraw(#[serde(with = "bignum::serde_decimal")] BigInt),
}

/// Outcome of a single defense wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveOutcome {
    Victory,
    Defeat,
}

/// Full accounting of one resolved wave.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveReport {
    /// The wave that was fought (pre-advance).
    pub wave: u32,
    pub outcome: WaveOutcome,
    #[serde(with = "bignum::serde_decimal")]
    pub defense_power: BigInt,
    #[serde(with = "bignum::serde_decimal")]
    pub enemy_army: BigInt,
    /// Per-tower soldier losses, index-aligned with tower slots.
    #[serde(with = "bignum::serde_decimal_vec")]
    pub casualties: Vec<BigInt>,
    /// Gold reward (positive) or repair cost (negative).
    pub gold_delta: f64,
    #[serde(with = "bignum::serde_decimal")]
    pub soldier_reward: BigInt,
}

/// Damage multiplier of a tower at `level`, in permille.
#[must_use]
pub const fn tower_multiplier_permille(level: u32) -> i64 {
    FP_DENOM + TOWER_STEP_PERMILLE * (level.saturating_sub(1) as i64)
}

/// Kingdom-wide defense bonus in permille, from archer and barracks levels.
#[must_use]
pub fn global_bonus_permille(record: &ProgressionRecord) -> i64 {
    let archer = FP_DENOM + BONUS_ARCHER_PERMILLE * i64::from(record.upgrades.archer);
    let barracks = FP_DENOM + BONUS_BARRACKS_PERMILLE * i64::from(record.upgrades.barracks);
    archer * barracks / FP_DENOM
}

/// Total defense power across all towers, fixed-point throughout.
#[must_use]
pub fn defense_power(record: &ProgressionRecord) -> BigInt {
    let bonus = global_bonus_permille(record);
    let mut power = BigInt::zero();
    for tower in &record.towers {
        let boosted = scale(&tower.assigned, tower_multiplier_permille(tower.level), FP_DENOM);
        power += scale(&boosted, bonus, FP_DENOM);
    }
    power
}

/// Roll the attacking army for `wave`: a wave-scaled share of everything the
/// player owns plus a flat per-wave component, with ±10% jitter.
pub fn roll_enemy_army<R: Rng>(wave: u32, total_owned: &BigInt, rng: &mut R) -> BigInt {
    let pct = (ARMY_PCT_BASE_PERMILLE + ARMY_PCT_STEP_PERMILLE * i64::from(wave.saturating_sub(1)))
        .min(ARMY_PCT_MAX_PERMILLE);
    let base = scale(total_owned, pct, FP_DENOM) + ARMY_FLAT_PER_WAVE * i64::from(wave);
    let jitter = rng.gen_range(ARMY_JITTER_MIN_PERMILLE..=ARMY_JITTER_MAX_PERMILLE);
    scale(&base, jitter, FP_DENOM)
}

/// Split `total` losses across stakes proportionally.
///
/// Truncating shares are computed first; the remainder is swept across
/// stakes in order, bounded by each stake's remaining headroom, so the
/// returned shares sum exactly to `min(total, sum(stakes))`.
#[must_use]
pub fn distribute_proportional(stakes: &[BigInt], total: &BigInt) -> Vec<BigInt> {
    let pool: BigInt = stakes.iter().sum();
    let mut shares = vec![BigInt::zero(); stakes.len()];
    if pool.is_zero() || !total.is_positive() {
        return shares;
    }
    let capped = if total > &pool { pool.clone() } else { total.clone() };

    let mut allocated = BigInt::zero();
    for (share, stake) in shares.iter_mut().zip(stakes) {
        *share = (&capped * stake) / &pool;
        allocated += &*share;
    }

    let mut remainder = &capped - &allocated;
    for (share, stake) in shares.iter_mut().zip(stakes) {
        if remainder.is_zero() {
            break;
        }
        let headroom = stake - &*share;
        let take = if remainder > headroom {
            headroom
        } else {
            remainder.clone()
        };
        *share += &take;
        remainder -= take;
    }

    shares
}

/// Resolve the current wave against the record's towers.
///
/// Victory advances the wave counter and pays gold and soldier rewards;
/// defeat charges a capped repair cost and leaves the counter in place.
/// Either way casualties are deducted proportionally per tower.
pub fn resolve_wave<R: Rng>(record: &mut ProgressionRecord, rng: &mut R) -> WaveReport {
    record.normalize();
    let wave = record.wave;
    let power = defense_power(record);
    let total_owned = record.total_owned_soldiers();
    let army = roll_enemy_army(wave, &total_owned, rng);

    let stakes: Vec<BigInt> = record.towers.iter().map(|t| t.assigned.clone()).collect();
    let assigned_total: BigInt = stakes.iter().sum();

    if power >= army {
        let casualty_pct = (CASUALTY_BASE_PERMILLE + CASUALTY_STEP_PERMILLE * i64::from(wave))
            .min(CASUALTY_MAX_PERMILLE);
        let mut casualties_total = scale(&army, casualty_pct, FP_DENOM);
        if casualties_total > assigned_total {
            casualties_total = assigned_total;
        }
        let shares = distribute_proportional(&stakes, &casualties_total);
        for (tower, share) in record.towers.iter_mut().zip(&shares) {
            tower.assigned -= share;
        }

        let gold_reward = i64_to_f64(floor_f64_to_i64(
            (WAVE_GOLD_BASE + WAVE_GOLD_PER_WAVE * f64::from(wave)) * record.derived().gold_mult,
        ));
        record.earn_gold(gold_reward);
        let soldier_reward =
            scale(&army, WAVE_SOLDIER_REWARD_PERMILLE, FP_DENOM) + WAVE_SOLDIER_REWARD_FLAT;
        record.earn_soldiers(&soldier_reward);

        record.wave = wave.saturating_add(1);
        record.stats.best_wave = record.stats.best_wave.max(wave);

        WaveReport {
            wave,
            outcome: WaveOutcome::Victory,
            defense_power: power,
            enemy_army: army,
            casualties: shares,
            gold_delta: gold_reward,
            soldier_reward,
        }
    } else {
        let loss_pct = (DEFEAT_LOSS_BASE_PERMILLE + DEFEAT_LOSS_STEP_PERMILLE * i64::from(wave))
            .min(DEFEAT_LOSS_MAX_PERMILLE);
        let losses_total = scale(&assigned_total, loss_pct, FP_DENOM);
        let shares = distribute_proportional(&stakes, &losses_total);
        for (tower, share) in record.towers.iter_mut().zip(&shares) {
            tower.assigned -= share;
        }

        let repair = (REPAIR_COST_BASE + REPAIR_COST_PER_WAVE * f64::from(wave))
            .min(record.gold_bank.max(0.0));
        record.gold_bank -= repair;

        WaveReport {
            wave,
            outcome: WaveOutcome::Defeat,
            defense_power: power,
            enemy_army: army,
            casualties: shares,
            gold_delta: -repair,
            soldier_reward: BigInt::zero(),
        }
    }
}

/// Gold price for building the next tower slot when `slots` exist.
#[must_use]
pub fn tower_slot_cost(slots: u32) -> i64 {
    #[allow(clippy::cast_possible_wrap)]
    let exponent = slots.saturating_sub(1).min(i32::MAX as u32) as i32;
    floor_f64_to_i64(TOWER_SLOT_COST_BASE * TOWER_SLOT_COST_GROWTH.powi(exponent))
}

/// Gold price for raising a tower from `level` to `level + 1`.
#[must_use]
pub fn tower_level_cost(level: u32) -> i64 {
    #[allow(clippy::cast_possible_wrap)]
    let exponent = level.saturating_sub(1).min(i32::MAX as u32) as i32;
    floor_f64_to_i64(TOWER_LEVEL_COST_BASE * TOWER_LEVEL_COST_GROWTH.powi(exponent))
}

/// Build an additional tower slot.
///
/// # Errors
///
/// Rejects when all slots exist or the gold bank is short.
pub fn buy_tower_slot(record: &mut ProgressionRecord) -> Result<u32, EconomyError> {
    if record.tower_slots >= TOWER_SLOT_MAX {
        return Err(EconomyError::TowerSlotsFull);
    }
    record.try_spend_gold(tower_slot_cost(record.tower_slots))?;
    record.tower_slots += 1;
    record.towers.push(TowerState::default());
    Ok(record.tower_slots)
}

/// Raise one tower's level, returning the new level.
///
/// # Errors
///
/// Rejects unknown tower indices and short gold banks.
pub fn upgrade_tower(record: &mut ProgressionRecord, tower: usize) -> Result<u32, EconomyError> {
    let level = record
        .towers
        .get(tower)
        .ok_or(EconomyError::UnknownTower { tower })?
        .level;
    record.try_spend_gold(tower_level_cost(level))?;
    let slot = &mut record.towers[tower];
    slot.level = level.saturating_add(1);
    Ok(slot.level)
}

/// Move soldiers between the unassigned bank and one tower.
///
/// Non-positive amounts are accepted as no-ops.
///
/// # Errors
///
/// Rejects unknown tower indices and movements beyond availability,
/// leaving both pools untouched.
pub fn assign_soldiers(
    record: &mut ProgressionRecord,
    tower: usize,
    delta: &AssignDelta,
) -> Result<(), EconomyError> {
    if record.towers.get(tower).is_none() {
        return Err(EconomyError::UnknownTower { tower });
    }
    match delta {
        AssignDelta::Deposit(amount) => {
            if !amount.is_positive() {
                return Ok(());
            }
            if *amount > record.soldier_bank {
                return Err(EconomyError::InsufficientSoldiers);
            }
            record.soldier_bank -= amount;
            record.towers[tower].assigned += amount;
        }
        AssignDelta::Withdraw(amount) => {
            if !amount.is_positive() {
                return Ok(());
            }
            if *amount > record.towers[tower].assigned {
                return Err(EconomyError::InsufficientAssigned { tower });
            }
            record.towers[tower].assigned -= amount;
            record.soldier_bank += amount;
        }
    }
    Ok(())
}
