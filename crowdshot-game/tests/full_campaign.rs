//! End-to-end campaign flows: runs, purchases, assignments, and waves.

use crowdshot_game::{
    AssignDelta, EngineEvent, GameSession, ProgressionRecord, RunPhase, TowerState, UpgradeKind,
    WaveOutcome, resolve_wave,
};
use num_bigint::BigInt;
use num_traits::Signed;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

const FRAME: f64 = 1.0 / 60.0;

fn play_until_ended(session: &mut GameSession, max_steps: u32) -> bool {
    let mut steps = 0;
    while session.run().phase == RunPhase::Running && steps < max_steps {
        session.advance(FRAME);
        steps += 1;
    }
    session.run().phase == RunPhase::Ended
}

#[test]
fn campaign_preserves_core_invariants() {
    let mut session = GameSession::new(None, 0.0, 0x5EED);
    let mut waves_won = 0u32;

    for _ in 0..4 {
        session.start_run(false);
        play_until_ended(&mut session, 600_000);

        let progress = session.progress();
        assert!(!session.run().crowd.is_negative(), "crowd must never go negative");
        assert!(!progress.soldier_bank.is_negative(), "bank must never go negative");
        assert!(progress.gold_bank >= 0.0);

        // Spend what the runs brought in.
        while session.buy_upgrade(UpgradeKind::Scribes).is_ok() {}
        let bank = session.progress().soldier_bank.clone();
        if bank.is_positive() {
            session
                .assign_soldiers(0, &AssignDelta::Deposit(bank))
                .expect("full bank deposit is always covered");
        }

        let before = session.progress().wave;
        let report = session.fight_wave();
        let lost: BigInt = report.casualties.iter().sum();
        let progress = session.progress();
        match report.outcome {
            WaveOutcome::Victory => {
                assert_eq!(progress.wave, before + 1);
                assert!(report.gold_delta >= 0.0);
                waves_won += 1;
            }
            WaveOutcome::Defeat => {
                assert_eq!(progress.wave, before);
                assert!(report.gold_delta <= 0.0);
            }
        }
        assert!(!lost.is_negative());
        for tower in &progress.towers {
            assert!(!tower.assigned.is_negative());
        }
    }

    let events = session.take_events();
    assert!(events.iter().any(|e| matches!(e, EngineEvent::EntitySpawned { .. })));
    assert!(events.iter().any(|e| matches!(e, EngineEvent::WaveResolved { .. })));
    assert!(session.progress().stats.runs == 4);
    // With four runs of income the early waves are usually beatable, but the
    // invariant checks above are the contract; the win count is informational.
    let _ = waves_won;
}

#[test]
fn outmatched_garrison_loses_wave_one() {
    // 500 banked plus 500 assigned at level 1: power 500 against an army of
    // at least 540 after jitter, so wave one is always a defeat.
    let mut record = ProgressionRecord {
        soldier_bank: BigInt::from(500),
        gold_bank: 200.0,
        ..ProgressionRecord::default()
    };
    record.towers[0] = TowerState {
        level: 1,
        assigned: BigInt::from(500),
    };

    let mut rng = ChaCha20Rng::from_seed([21u8; 32]);
    for _ in 0..100 {
        let mut attempt = record.clone();
        let report = resolve_wave(&mut attempt, &mut rng);
        assert_eq!(report.outcome, WaveOutcome::Defeat);
        assert_eq!(attempt.wave, 1);
        assert!(attempt.towers[0].assigned < BigInt::from(500));
        assert!(attempt.gold_bank < 200.0, "repair cost must be charged");
        assert_eq!(report.casualties.len(), 1);
        let lost: BigInt = report.casualties.iter().sum();
        assert!(lost <= BigInt::from(500));
    }
}

#[test]
fn garrisoned_kingdom_clears_early_waves() {
    let mut record = ProgressionRecord {
        soldier_bank: BigInt::from(50_000),
        ..ProgressionRecord::default()
    };
    record.towers[0] = TowerState {
        level: 4,
        assigned: BigInt::from(200_000),
    };

    let mut rng = ChaCha20Rng::from_seed([22u8; 32]);
    let report = resolve_wave(&mut record, &mut rng);
    assert_eq!(report.outcome, WaveOutcome::Victory);
    assert_eq!(record.wave, 2);
    assert!(record.stats.best_wave >= 1);
    assert!(report.soldier_reward.is_positive());
    let lost: BigInt = report.casualties.iter().sum();
    assert!(lost <= BigInt::from(200_000));
}

#[test]
fn casualties_split_proportionally_across_towers() {
    let mut record = ProgressionRecord {
        tower_slots: 3,
        towers: vec![
            TowerState {
                level: 5,
                assigned: BigInt::from(600_000),
            },
            TowerState {
                level: 5,
                assigned: BigInt::from(300_000),
            },
            TowerState {
                level: 5,
                assigned: BigInt::from(100_000),
            },
        ],
        ..ProgressionRecord::default()
    };

    let mut rng = ChaCha20Rng::from_seed([23u8; 32]);
    let report = resolve_wave(&mut record, &mut rng);
    assert_eq!(report.outcome, WaveOutcome::Victory);

    let lost: BigInt = report.casualties.iter().sum();
    assert!(lost.is_positive());
    // The largest garrison absorbs the largest share, and the ledger is
    // exact: per-tower deductions sum to the reported total.
    assert!(report.casualties[0] >= report.casualties[1]);
    assert!(report.casualties[1] >= report.casualties[2]);
    let remaining: BigInt = record.towers.iter().map(|t| t.assigned.clone()).sum();
    assert_eq!(remaining + lost, BigInt::from(1_000_000));
}

#[test]
fn practice_runs_earn_no_trickle_but_keep_gates() {
    let mut session = GameSession::new(None, 0.0, 0xF00D);
    session.start_run(true);
    for _ in 0..2_000 {
        session.advance(FRAME);
        if session.run().phase != RunPhase::Running {
            break;
        }
    }
    // Whatever gold exists came from gates and clashes, not the trickle;
    // with no steward levels it is always whole.
    let bank = session.progress().gold_bank;
    assert!((bank - bank.floor()).abs() < 1e-9);
}
