//! Structured engine events consumed by the presentation layer.
//!
//! The core never renders or animates; it reports what happened through
//! these payloads and lets the shell decide how to show them. Big-integer
//! fields serialize as decimal strings like everything else that crosses
//! the process boundary.

use crate::bignum;
use crate::encounters::EncounterSpec;
use crate::progression::UpgradeKind;
use crate::towers::WaveReport;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// Effect applied when an entity resolved against the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "effect")]
pub enum ResolutionOutcome {
    Recruited {
        added: i64,
        #[serde(with = "bignum::serde_decimal")]
        crowd: BigInt,
    },
    Rallied {
        multiplier_permille: i64,
        #[serde(with = "bignum::serde_decimal")]
        crowd: BigInt,
    },
    Ambushed {
        lost: i64,
        #[serde(with = "bignum::serde_decimal")]
        crowd: BigInt,
    },
    TrapBlocked {
        shields_left: i64,
    },
    LootedGold {
        amount: i64,
    },
    DraftedSoldiers {
        count: i64,
    },
    GainedShields {
        charges: i64,
        total: i64,
    },
    ClashWon {
        #[serde(with = "bignum::serde_decimal")]
        losses: BigInt,
        gold: i64,
        #[serde(with = "bignum::serde_decimal")]
        soldiers: BigInt,
    },
    ClashLost {
        #[serde(with = "bignum::serde_decimal")]
        effective_threat: BigInt,
    },
}

/// Summary emitted when a run ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Distance traveled, in meters.
    pub distance: f64,
    pub gold_earned: f64,
    #[serde(with = "bignum::serde_decimal")]
    pub soldiers_earned: BigInt,
    #[serde(with = "bignum::serde_decimal")]
    pub peak_crowd: BigInt,
    pub best_distance: f64,
    pub practice: bool,
}

/// Discrete notifications the shell renders; drained via
/// [`crate::session::GameSession::take_events`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum EngineEvent {
    EntitySpawned { id: u64, spec: EncounterSpec },
    EntityResolved { id: u64, outcome: ResolutionOutcome },
    RunEnded { summary: RunSummary },
    WaveResolved { report: WaveReport },
    UpgradePurchased { upgrade: UpgradeKind, level: u32 },
    TowerSlotBuilt { slots: u32 },
    TowerUpgraded { tower: usize, level: u32 },
    SoldiersMoved { tower: usize },
    ProgressReset,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encounters::GateRoll;

    #[test]
    fn events_round_trip_through_json() {
        let event = EngineEvent::EntitySpawned {
            id: 3,
            spec: EncounterSpec::Row {
                left: GateRoll::Plus(12),
                right: GateRoll::Risk(7),
            },
        };
        let json = serde_json::to_string(&event).expect("serialize");
        let restored: EngineEvent = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, event);
    }

    #[test]
    fn clash_outcomes_keep_decimal_precision() {
        let outcome = ResolutionOutcome::ClashWon {
            losses: BigInt::from(10).pow(30),
            gold: 77,
            soldiers: BigInt::from(42),
        };
        let json = serde_json::to_string(&outcome).expect("serialize");
        assert!(json.contains(&BigInt::from(10).pow(30).to_string()));
        let restored: ResolutionOutcome = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, outcome);
    }
}
