//! Local Predictor Tests.
//!
//! Verifies cold-start behaviour, counter training, aliasing between
//! branches that share a counter, and the saturation-bounded retrain cost.

use bpred_core::config::LocalConfig;
use bpred_core::direction::{DirectionPredictor, LocalPredictor};

use super::{cold_history, step, train};

fn small() -> LocalPredictor {
    LocalPredictor::new(
        &LocalConfig {
            predictor_size: 4,
            ctr_bits: 2,
        },
        2,
    )
}

// ══════════════════════════════════════════════════════════
// 1. Cold start and learning
// ══════════════════════════════════════════════════════════

/// Cold counters predict not-taken (weakly).
#[test]
fn cold_predicts_not_taken() {
    let p = small();
    let lookup = p.predict(0, 0, cold_history());
    assert!(!lookup.taken, "counter starts at 1 (weak not-taken)");
}

/// A branch taken 3 times then not-taken once: predictions follow
/// [NT, T, T, T] and the counter ends one decrement below saturation.
#[test]
fn taken_thrice_then_not_taken() {
    let mut p = small();
    let hist = cold_history();

    let mut preds = Vec::new();
    for taken in [true, true, true, false] {
        preds.push(step(&mut p, 0, hist, taken));
    }
    assert_eq!(preds, vec![false, true, true, true]);
    assert_eq!(p.counter_value(0), 2, "3 → 2 after the single decrement");
}

/// Extensive retraining flips a saturated counter.
#[test]
fn retrains_after_saturation() {
    let mut p = small();
    let hist = cold_history();
    train(&mut p, 0x10, hist, true, 10);
    assert!(step(&mut p, 0x10, hist, false));
    train(&mut p, 0x10, hist, false, 3);
    let lookup = p.predict(0, 0x10, hist);
    assert!(!lookup.taken, "saturation bounds the retrain cost");
}

// ══════════════════════════════════════════════════════════
// 2. Aliasing
// ══════════════════════════════════════════════════════════

/// With 4 counters and a 2-bit shift, PCs 16 apart share a counter.
#[test]
fn aliased_branches_share_a_counter() {
    let mut p = small();
    let hist = cold_history();
    train(&mut p, 0x0, hist, true, 4);
    let lookup = p.predict(0, 0x40, hist);
    assert!(
        lookup.taken,
        "0x40 folds onto 0x0's counter in a 4-entry table"
    );
}

/// PCs in distinct slots train independently.
#[test]
fn distinct_slots_independent() {
    let mut p = small();
    let hist = cold_history();
    train(&mut p, 0x0, hist, true, 4);
    let lookup = p.predict(0, 0x4, hist);
    assert!(!lookup.taken, "neighbouring slot stays cold");
}
