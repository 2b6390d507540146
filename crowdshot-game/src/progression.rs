//! Persisted kingdom progression and the derived gameplay model.
//!
//! A single [`ProgressionRecord`] carries everything that survives between
//! runs: banks, upgrade levels, tower state, the defense wave counter, and
//! lifetime stats. Derived values are pure functions of upgrade levels so
//! the record stays a flat, serializable source of truth.

use crate::bignum;
use crate::constants::{
    GOLD_MULT_PER_LEVEL, LUCK_PCT_PER_LEVEL, MITIGATION_MAX, MITIGATION_PER_LEVEL, PURIFY_MAX,
    PURIFY_PER_LEVEL, START_CROWD_BASE, START_CROWD_PER_LEVEL, TOWER_SLOT_MAX,
};
use crate::numbers::floor_f64_to_i64;
use crate::towers::TowerState;
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Rejection reasons for kingdom economy transactions.
///
/// Every rejected operation leaves the record untouched; none of these
/// conditions is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EconomyError {
    #[error("insufficient gold: need {required}, have {available}")]
    InsufficientGold { required: i64, available: i64 },
    #[error("soldier bank cannot cover the requested amount")]
    InsufficientSoldiers,
    #[error("tower {tower} does not have that many soldiers assigned")]
    InsufficientAssigned { tower: usize },
    #[error("no tower at index {tower}")]
    UnknownTower { tower: usize },
    #[error("all tower slots are already built")]
    TowerSlotsFull,
}

/// The six purchasable kingdom upgrades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeKind {
    /// Larger starting crowd.
    Barracks,
    /// Better gate quality.
    Scribes,
    /// Starting shield charges.
    Shields,
    /// Enemy damage mitigation.
    Archer,
    /// Gold income multiplier.
    Steward,
    /// Risk-gate purification chance.
    Mage,
}

impl UpgradeKind {
    pub const ALL: [Self; 6] = [
        Self::Barracks,
        Self::Scribes,
        Self::Shields,
        Self::Archer,
        Self::Steward,
        Self::Mage,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Barracks => "barracks",
            Self::Scribes => "scribes",
            Self::Shields => "shields",
            Self::Archer => "archer",
            Self::Steward => "steward",
            Self::Mage => "mage",
        }
    }

    /// Gold price for buying the next level from `level`.
    #[must_use]
    pub const fn cost(self, level: u32) -> i64 {
        let level = level as i64;
        match self {
            Self::Barracks => 70 + level * 90,
            Self::Scribes => 90 + level * 120,
            Self::Shields => 110 + level * 140,
            Self::Archer => 130 + level * 170,
            Self::Steward => 120 + level * 160,
            Self::Mage => 140 + level * 190,
        }
    }
}

impl fmt::Display for UpgradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UpgradeKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "barracks" => Ok(Self::Barracks),
            "scribes" => Ok(Self::Scribes),
            "shields" => Ok(Self::Shields),
            "archer" => Ok(Self::Archer),
            "steward" => Ok(Self::Steward),
            "mage" => Ok(Self::Mage),
            _ => Err(()),
        }
    }
}

/// Current level of each upgrade track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct UpgradeLevels {
    #[serde(default)]
    pub barracks: u32,
    #[serde(default)]
    pub scribes: u32,
    #[serde(default)]
    pub shields: u32,
    #[serde(default)]
    pub archer: u32,
    #[serde(default)]
    pub steward: u32,
    #[serde(default)]
    pub mage: u32,
}

impl UpgradeLevels {
    #[must_use]
    pub const fn level(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::Barracks => self.barracks,
            UpgradeKind::Scribes => self.scribes,
            UpgradeKind::Shields => self.shields,
            UpgradeKind::Archer => self.archer,
            UpgradeKind::Steward => self.steward,
            UpgradeKind::Mage => self.mage,
        }
    }

    fn bump(&mut self, kind: UpgradeKind) -> u32 {
        let slot = match kind {
            UpgradeKind::Barracks => &mut self.barracks,
            UpgradeKind::Scribes => &mut self.scribes,
            UpgradeKind::Shields => &mut self.shields,
            UpgradeKind::Archer => &mut self.archer,
            UpgradeKind::Steward => &mut self.steward,
            UpgradeKind::Mage => &mut self.mage,
        };
        *slot = slot.saturating_add(1);
        *slot
    }
}

/// Gameplay constants derived from upgrade levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedStats {
    pub start_crowd: i64,
    /// Luck as a fraction in [0, 1).
    pub luck: f64,
    pub shield_charges: i64,
    /// Multiplicative enemy threat reduction in [0, 0.35].
    pub mitigation: f64,
    pub gold_mult: f64,
    /// Risk-to-reward conversion chance in [0, 0.30].
    pub purify_chance: f64,
}

/// Cumulative lifetime statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LifetimeStats {
    #[serde(default)]
    pub runs: u64,
    #[serde(default)]
    pub clash_wins: u64,
    #[serde(default)]
    pub clash_losses: u64,
    #[serde(default)]
    pub gold_earned: f64,
    #[serde(default, with = "bignum::serde_decimal")]
    pub soldiers_earned: BigInt,
    #[serde(default, with = "bignum::serde_decimal")]
    pub best_crowd: BigInt,
    #[serde(default)]
    pub best_wave: u32,
}

fn default_tower_slots() -> u32 {
    1
}

fn default_towers() -> Vec<TowerState> {
    vec![TowerState::default()]
}

fn default_wave() -> u32 {
    1
}

/// The persisted progression record. Exactly one instance exists per save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionRecord {
    /// Gold balance; fractional because of the distance trickle.
    #[serde(default)]
    pub gold_bank: f64,
    /// Unassigned soldiers available for tower duty.
    #[serde(default, with = "bignum::serde_decimal")]
    pub soldier_bank: BigInt,
    #[serde(default)]
    pub upgrades: UpgradeLevels,
    #[serde(default = "default_tower_slots")]
    pub tower_slots: u32,
    #[serde(default = "default_towers")]
    pub towers: Vec<TowerState>,
    /// Next defense wave to fight; one-based.
    #[serde(default = "default_wave")]
    pub wave: u32,
    #[serde(default)]
    pub stats: LifetimeStats,
}

impl Default for ProgressionRecord {
    fn default() -> Self {
        Self {
            gold_bank: 0.0,
            soldier_bank: BigInt::zero(),
            upgrades: UpgradeLevels::default(),
            tower_slots: default_tower_slots(),
            towers: default_towers(),
            wave: default_wave(),
            stats: LifetimeStats::default(),
        }
    }
}

impl ProgressionRecord {
    /// Repair structural invariants after a load or before a save.
    ///
    /// Loaded data may come from older or hand-edited saves; shapes are
    /// padded/truncated to the expected form instead of being rejected.
    pub fn normalize(&mut self) {
        self.tower_slots = self.tower_slots.clamp(1, TOWER_SLOT_MAX);
        self.towers
            .resize_with(self.tower_slots as usize, TowerState::default);
        for tower in &mut self.towers {
            tower.level = tower.level.max(1);
            if tower.assigned.is_negative() {
                tower.assigned = BigInt::zero();
            }
        }
        if self.soldier_bank.is_negative() {
            self.soldier_bank = BigInt::zero();
        }
        self.wave = self.wave.max(1);
        if !self.gold_bank.is_finite() || self.gold_bank < 0.0 {
            self.gold_bank = 0.0;
        }
        if self.stats.soldiers_earned.is_negative() {
            self.stats.soldiers_earned = BigInt::zero();
        }
        if self.stats.best_crowd.is_negative() {
            self.stats.best_crowd = BigInt::zero();
        }
        if !self.stats.gold_earned.is_finite() || self.stats.gold_earned < 0.0 {
            self.stats.gold_earned = 0.0;
        }
    }

    /// Compute the derived gameplay model from current upgrade levels.
    #[must_use]
    pub fn derived(&self) -> DerivedStats {
        let levels = &self.upgrades;
        DerivedStats {
            start_crowd: START_CROWD_BASE + START_CROWD_PER_LEVEL * i64::from(levels.barracks),
            luck: f64::from(levels.scribes) * LUCK_PCT_PER_LEVEL / 100.0,
            shield_charges: i64::from(levels.shields),
            mitigation: (f64::from(levels.archer) * MITIGATION_PER_LEVEL)
                .clamp(0.0, MITIGATION_MAX),
            gold_mult: 1.0 + f64::from(levels.steward) * GOLD_MULT_PER_LEVEL,
            purify_chance: (f64::from(levels.mage) * PURIFY_PER_LEVEL).clamp(0.0, PURIFY_MAX),
        }
    }

    /// Bank plus every tower assignment.
    #[must_use]
    pub fn total_owned_soldiers(&self) -> BigInt {
        let mut total = self.soldier_bank.clone();
        for tower in &self.towers {
            total += &tower.assigned;
        }
        total
    }

    /// Whole-gold balance used for purchase checks and display.
    #[must_use]
    pub fn gold_floor(&self) -> i64 {
        floor_f64_to_i64(self.gold_bank)
    }

    /// Deduct `cost` gold, rejecting the transaction if the bank is short.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InsufficientGold`] without mutating state.
    pub fn try_spend_gold(&mut self, cost: i64) -> Result<(), EconomyError> {
        let available = self.gold_floor();
        if available < cost {
            return Err(EconomyError::InsufficientGold {
                required: cost,
                available,
            });
        }
        self.gold_bank -= crate::numbers::i64_to_f64(cost);
        Ok(())
    }

    /// Buy the next level of `kind`, returning the new level.
    ///
    /// # Errors
    ///
    /// Returns [`EconomyError::InsufficientGold`] when the bank is short.
    pub fn buy_upgrade(&mut self, kind: UpgradeKind) -> Result<u32, EconomyError> {
        let cost = kind.cost(self.upgrades.level(kind));
        self.try_spend_gold(cost)?;
        Ok(self.upgrades.bump(kind))
    }

    /// Credit gold earned during play, tracking the lifetime total.
    pub fn earn_gold(&mut self, amount: f64) {
        if amount.is_finite() && amount > 0.0 {
            self.gold_bank += amount;
            self.stats.gold_earned += amount;
        }
    }

    /// Credit drafted soldiers, tracking the lifetime total.
    pub fn earn_soldiers(&mut self, amount: &BigInt) {
        if amount.is_positive() {
            self.soldier_bank += amount;
            self.stats.soldiers_earned += amount;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_stats_follow_upgrade_table() {
        let mut record = ProgressionRecord::default();
        record.upgrades = UpgradeLevels {
            barracks: 4,
            scribes: 5,
            shields: 3,
            archer: 10,
            steward: 2,
            mage: 7,
        };
        let derived = record.derived();
        assert_eq!(derived.start_crowd, 22);
        assert!((derived.luck - 0.20).abs() < 1e-9);
        assert_eq!(derived.shield_charges, 3);
        assert!((derived.mitigation - 0.35).abs() < 1e-9, "mitigation caps at 0.35");
        assert!((derived.gold_mult - 1.16).abs() < 1e-9);
        assert!((derived.purify_chance - 0.30).abs() < 1e-9, "purify caps at 0.30");
    }

    #[test]
    fn upgrade_costs_are_linear_per_track() {
        assert_eq!(UpgradeKind::Barracks.cost(0), 70);
        assert_eq!(UpgradeKind::Barracks.cost(3), 340);
        assert_eq!(UpgradeKind::Mage.cost(0), 140);
        assert_eq!(UpgradeKind::Mage.cost(2), 520);
    }

    #[test]
    fn buy_upgrade_rejects_when_poor() {
        let mut record = ProgressionRecord::default();
        record.gold_bank = 69.9;
        let err = record.buy_upgrade(UpgradeKind::Barracks).unwrap_err();
        assert_eq!(
            err,
            EconomyError::InsufficientGold {
                required: 70,
                available: 69,
            }
        );
        assert_eq!(record.upgrades.barracks, 0);
        assert!((record.gold_bank - 69.9).abs() < 1e-9, "rejection must not spend");
    }

    #[test]
    fn buy_upgrade_spends_and_levels() {
        let mut record = ProgressionRecord::default();
        record.gold_bank = 200.0;
        let level = record.buy_upgrade(UpgradeKind::Barracks).expect("affordable");
        assert_eq!(level, 1);
        assert!((record.gold_bank - 130.0).abs() < 1e-9);
        assert_eq!(record.derived().start_crowd, 13);
    }

    #[test]
    fn normalize_heals_structural_damage() {
        let mut record = ProgressionRecord {
            tower_slots: 9,
            towers: Vec::new(),
            wave: 0,
            gold_bank: f64::NAN,
            soldier_bank: BigInt::from(-5),
            ..ProgressionRecord::default()
        };
        record.normalize();
        assert_eq!(record.tower_slots, TOWER_SLOT_MAX);
        assert_eq!(record.towers.len(), TOWER_SLOT_MAX as usize);
        assert_eq!(record.wave, 1);
        assert!((record.gold_bank - 0.0).abs() < f64::EPSILON);
        assert_eq!(record.soldier_bank, BigInt::zero());
    }

    #[test]
    fn empty_json_deserializes_to_defaults() {
        let record: ProgressionRecord = serde_json::from_str("{}").expect("tolerant load");
        assert_eq!(record, ProgressionRecord::default());
    }

    #[test]
    fn big_banks_round_trip_as_decimal_strings() {
        let mut record = ProgressionRecord::default();
        record.soldier_bank = BigInt::from(10).pow(40) + 7;
        let json = serde_json::to_string(&record).expect("serialize");
        assert!(json.contains(&record.soldier_bank.to_string()));
        let restored: ProgressionRecord = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.soldier_bank, record.soldier_bank);
    }

    #[test]
    fn upgrade_keys_round_trip() {
        for kind in UpgradeKind::ALL {
            assert_eq!(kind.as_str().parse::<UpgradeKind>(), Ok(kind));
        }
        assert!("warlord".parse::<UpgradeKind>().is_err());
    }
}
