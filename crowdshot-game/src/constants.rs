//! Centralized balance and tuning constants for Crowdshot game logic.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control, rather than through external
//! JSON assets.

// Logging keys -------------------------------------------------------------
pub(crate) const DEBUG_ENV_VAR: &str = "CROWDSHOT_DEBUG_LOGS";

// Fixed point --------------------------------------------------------------
/// Denominator for permille fixed-point factors applied to big integers.
pub(crate) const FP_DENOM: i64 = 1_000;

// Progression model ---------------------------------------------------------
pub(crate) const START_CROWD_BASE: i64 = 10;
pub(crate) const START_CROWD_PER_LEVEL: i64 = 3;
pub(crate) const LUCK_PCT_PER_LEVEL: f64 = 4.0;
pub(crate) const MITIGATION_PER_LEVEL: f64 = 0.06;
pub(crate) const MITIGATION_MAX: f64 = 0.35;
pub(crate) const GOLD_MULT_PER_LEVEL: f64 = 0.08;
pub(crate) const PURIFY_PER_LEVEL: f64 = 0.06;
pub(crate) const PURIFY_MAX: f64 = 0.30;

// Travel tuning ------------------------------------------------------------
pub(crate) const BASE_SPEED: f64 = 330.0;
pub(crate) const BASE_SPEED_PRACTICE: f64 = 260.0;
pub(crate) const SPEED_RAMP_DIVISOR: f64 = 600.0;
pub(crate) const SPEED_RAMP_BASE: f64 = 18.0;
pub(crate) const SPEED_RAMP_EXTRA: f64 = 7.0;
pub(crate) const DISTANCE_SCALE: f64 = 0.06;
pub(crate) const MAX_STEP_SECONDS: f64 = 0.033;

// Spawn cadence ------------------------------------------------------------
pub(crate) const FIRST_SPAWN_DELAY: f64 = 0.35;
pub(crate) const SPAWN_INTERVAL_BASE: f64 = 0.92;
pub(crate) const SPAWN_INTERVAL_BASE_PRACTICE: f64 = 1.05;
pub(crate) const SPAWN_TIGHTEN_RATE: f64 = 0.22;
pub(crate) const SPAWN_TIGHTEN_DIVISOR: f64 = 700.0;
pub(crate) const SPAWN_TIGHTEN_MAX: f64 = 0.42;
pub(crate) const SPAWN_JITTER: f64 = 0.18;
pub(crate) const PROGRESS_DIVISOR: f64 = 450.0;
pub(crate) const PROGRESS_MAX: f64 = 2.6;

// Playfield geometry (travel-axis units) ------------------------------------
pub(crate) const SPAWN_Y: f64 = -140.0;
pub(crate) const COLLISION_BAND_START: f64 = 620.0;
pub(crate) const COLLISION_BAND_WIDTH: f64 = 40.0;
pub(crate) const DESPAWN_Y: f64 = 1_010.0;

// Gate tuning --------------------------------------------------------------
pub(crate) const RISK_BASE: f64 = 0.10;
pub(crate) const RISK_RAMP: f64 = 0.11;
pub(crate) const RISK_BASE_MAX: f64 = 0.38;
pub(crate) const RISK_LUCK_DAMP: f64 = 0.85;
pub(crate) const RISK_FLOOR: f64 = 0.05;
pub(crate) const RISK_CEILING: f64 = 0.40;
pub(crate) const MULT_BIAS_BASE: f64 = 0.20;
pub(crate) const MULT_BIAS_RAMP: f64 = 0.25;
pub(crate) const MULT_BIAS_MAX: f64 = 0.55;
pub(crate) const PLUS_BIAS_BASE: f64 = 0.70;
pub(crate) const PLUS_BIAS_RAMP: f64 = 0.20;
pub(crate) const PLUS_BIAS_MIN: f64 = 0.35;
pub(crate) const PLUS_BIAS_MAX: f64 = 0.75;
pub(crate) const PLUS_MAG_BASE: f64 = 8.0;
pub(crate) const PLUS_MAG_RAMP: f64 = 6.0;
pub(crate) const PLUS_SPREAD_BASE: f64 = 10.0;
pub(crate) const PLUS_SPREAD_RAMP: f64 = 10.0;
pub(crate) const PLUS_LUCK_SCALE: f64 = 0.6;
pub(crate) const RISK_MAG_BASE: f64 = 6.0;
pub(crate) const RISK_MAG_RAMP: f64 = 6.0;
pub(crate) const RISK_SPREAD_BASE: f64 = 10.0;
pub(crate) const RISK_SPREAD_RAMP: f64 = 10.0;
pub(crate) const MULT_LUCK_BUMP_CHANCE: f64 = 0.55;
pub(crate) const MULT_MIN: i64 = 2;
pub(crate) const MULT_CAP: i64 = 8;
/// Crowd digit count above which the multiplier cap starts shrinking.
pub(crate) const MULT_SOFT_CAP_DIGITS: u32 = 6;
/// Permille shaved off an applied multiplier per digit past the soft cap.
pub(crate) const MULT_SOFTEN_PERMILLE_PER_DIGIT: i64 = 90;

// Purification -------------------------------------------------------------
pub(crate) const PURIFY_GOLD_WEIGHT: f64 = 0.55;
pub(crate) const PURIFY_SHIELD_WEIGHT: f64 = 0.27;
pub(crate) const PURIFY_SOLDIER_WEIGHT: f64 = 0.18;
pub(crate) const PURIFY_GOLD_BASE: f64 = 25.0;
pub(crate) const PURIFY_GOLD_SPREAD: f64 = 40.0;
pub(crate) const PURIFY_SOLDIER_BASE: f64 = 6.0;
pub(crate) const PURIFY_SOLDIER_SPREAD: f64 = 10.0;

// Row composition ----------------------------------------------------------
pub(crate) const ROW_BUFF_BASE_CHANCE: f64 = 0.35;
pub(crate) const ROW_BUFF_LUCK_SCALE: f64 = 0.25;
pub(crate) const ROW_BUFF_PLUS_FACTOR: f64 = 1.18;
pub(crate) const ROW_BUFF_PLUS_LUCK: f64 = 0.25;
pub(crate) const ROW_BUFF_RISK_FACTOR: f64 = 0.75;
pub(crate) const TEMPTATION_BASE_CHANCE: f64 = 0.06;
pub(crate) const TEMPTATION_LUCK_SCALE: f64 = 0.06;
pub(crate) const TEMPTATION_GOLD_WEIGHT: f64 = 0.70;
pub(crate) const TEMPTATION_SOLDIER_WEIGHT: f64 = 0.30;
pub(crate) const TEMPTATION_GOLD_BASE: f64 = 30.0;
pub(crate) const TEMPTATION_GOLD_SPREAD: f64 = 60.0;
pub(crate) const TEMPTATION_GOLD_RAMP: f64 = 0.4;
pub(crate) const TEMPTATION_SOLDIER_BASE: f64 = 10.0;
pub(crate) const TEMPTATION_SOLDIER_SPREAD: f64 = 18.0;
pub(crate) const TEMPTATION_SOLDIER_RAMP: f64 = 0.3;

// Spawn mix ----------------------------------------------------------------
pub(crate) const ENEMY_CHANCE_BASE: f64 = 0.18;
pub(crate) const ENEMY_CHANCE_RAMP: f64 = 0.10;
pub(crate) const ENEMY_CHANCE_MAX: f64 = 0.42;
pub(crate) const COIN_CHANCE_BASE: f64 = 0.16;
pub(crate) const COIN_CHANCE_RAMP: f64 = 0.06;
pub(crate) const COIN_CHANCE_MAX: f64 = 0.30;
pub(crate) const SOLDIER_CHANCE_BASE: f64 = 0.05;
pub(crate) const SOLDIER_CHANCE_RAMP: f64 = 0.02;
pub(crate) const SOLDIER_CHANCE_LUCK: f64 = 0.02;
pub(crate) const SOLDIER_CHANCE_MAX: f64 = 0.12;
pub(crate) const SHIELD_CHANCE_BASE: f64 = 0.05;
pub(crate) const SHIELD_CHANCE_RAMP: f64 = 0.02;
pub(crate) const SHIELD_CHANCE_LUCK: f64 = 0.03;
pub(crate) const SHIELD_CHANCE_MAX: f64 = 0.16;
pub(crate) const SINGLES_SHARE_MIN: f64 = 0.30;
pub(crate) const SINGLES_SHARE_MAX: f64 = 0.72;
pub(crate) const COIN_MAG_BASE: f64 = 18.0;
pub(crate) const COIN_MAG_SPREAD: f64 = 30.0;
pub(crate) const COIN_MAG_RAMP: f64 = 0.35;
pub(crate) const SOLDIER_MAG_BASE: f64 = 4.0;
pub(crate) const SOLDIER_MAG_SPREAD: f64 = 8.0;
pub(crate) const SOLDIER_MAG_RAMP: f64 = 0.3;

// Enemy tuning -------------------------------------------------------------
pub(crate) const THREAT_RATIO_MIN_PERMILLE: i64 = 480;
pub(crate) const THREAT_RATIO_MAX_PERMILLE: i64 = 1_320;
pub(crate) const THREAT_FLAT_BASE: f64 = 8.0;
pub(crate) const THREAT_FLAT_RAMP: f64 = 10.0;
pub(crate) const THREAT_FLAT_PER_STREAK: i64 = 2;
pub(crate) const CLASH_LOSS_MIN_PERMILLE: i64 = 120;
pub(crate) const CLASH_LOSS_MAX_PERMILLE: i64 = 260;
pub(crate) const CLASH_GOLD_BASE: f64 = 25.0;
pub(crate) const CLASH_GOLD_SPREAD: f64 = 30.0;
pub(crate) const CLASH_GOLD_DIST_RATE: f64 = 0.03;
pub(crate) const CLASH_SOLDIER_MIN_PERMILLE: i64 = 60;
pub(crate) const CLASH_SOLDIER_MAX_PERMILLE: i64 = 140;

// Gold trickle -------------------------------------------------------------
pub(crate) const TRICKLE_BASE: f64 = 0.22;
pub(crate) const TRICKLE_DIST_RATE: f64 = 0.000_12;

// Defense tuning -----------------------------------------------------------
pub(crate) const TOWER_SLOT_MAX: u32 = 6;
pub(crate) const TOWER_STEP_PERMILLE: i64 = 250;
pub(crate) const BONUS_ARCHER_PERMILLE: i64 = 40;
pub(crate) const BONUS_BARRACKS_PERMILLE: i64 = 30;
pub(crate) const ARMY_PCT_BASE_PERMILLE: i64 = 350;
pub(crate) const ARMY_PCT_STEP_PERMILLE: i64 = 30;
pub(crate) const ARMY_PCT_MAX_PERMILLE: i64 = 850;
pub(crate) const ARMY_FLAT_PER_WAVE: i64 = 250;
pub(crate) const ARMY_JITTER_MIN_PERMILLE: i64 = 900;
pub(crate) const ARMY_JITTER_MAX_PERMILLE: i64 = 1_100;
pub(crate) const CASUALTY_BASE_PERMILLE: i64 = 100;
pub(crate) const CASUALTY_STEP_PERMILLE: i64 = 10;
pub(crate) const CASUALTY_MAX_PERMILLE: i64 = 350;
pub(crate) const DEFEAT_LOSS_BASE_PERMILLE: i64 = 60;
pub(crate) const DEFEAT_LOSS_STEP_PERMILLE: i64 = 6;
pub(crate) const DEFEAT_LOSS_MAX_PERMILLE: i64 = 240;
pub(crate) const WAVE_GOLD_BASE: f64 = 60.0;
pub(crate) const WAVE_GOLD_PER_WAVE: f64 = 25.0;
pub(crate) const WAVE_SOLDIER_REWARD_PERMILLE: i64 = 80;
pub(crate) const WAVE_SOLDIER_REWARD_FLAT: i64 = 5;
pub(crate) const REPAIR_COST_BASE: f64 = 40.0;
pub(crate) const REPAIR_COST_PER_WAVE: f64 = 15.0;

// Kingdom economy ----------------------------------------------------------
pub(crate) const TOWER_SLOT_COST_BASE: f64 = 350.0;
pub(crate) const TOWER_SLOT_COST_GROWTH: f64 = 2.2;
pub(crate) const TOWER_LEVEL_COST_BASE: f64 = 120.0;
pub(crate) const TOWER_LEVEL_COST_GROWTH: f64 = 1.6;

#[cfg(test)]
pub(crate) const FLOAT_EPSILON: f64 = 1e-6;
