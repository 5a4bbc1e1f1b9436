//! BiMode Predictor Tests.
//!
//! Verifies bias-table selection, learning, and the partial choice-update
//! rule that protects a working selection from a single noisy outcome.

use bpred_core::config::BiModeConfig;
use bpred_core::direction::{BiModePredictor, DirectionInfo, DirectionPredictor};
use bpred_core::history::HistoryView;

use super::{cold_history, step, train};

fn small() -> BiModePredictor {
    BiModePredictor::new(
        &BiModeConfig {
            global_predictor_size: 16,
            global_ctr_bits: 2,
            choice_predictor_size: 16,
            choice_ctr_bits: 2,
        },
        2,
    )
}

fn used_taken_table(p: &BiModePredictor, pc: u64) -> bool {
    match p.predict(0, pc, cold_history()).info {
        DirectionInfo::BiMode(info) => info.used_taken_table,
        _ => unreachable!("bimode predictor must produce bimode info"),
    }
}

// ══════════════════════════════════════════════════════════
// 1. Cold start and learning
// ══════════════════════════════════════════════════════════

/// Cold choice selects the not-taken-biased table, which votes not-taken.
#[test]
fn cold_predicts_not_taken() {
    let p = small();
    assert!(!p.predict(0, 0x100, cold_history()).taken);
    assert!(!used_taken_table(&p, 0x100));
}

#[test]
fn learns_taken() {
    let mut p = small();
    train(&mut p, 0x100, cold_history(), true, 10);
    assert!(p.predict(0, 0x100, cold_history()).taken);
}

/// A taken-biased branch migrates to the taken-biased table.
#[test]
fn taken_branch_migrates_to_taken_table() {
    let mut p = small();
    train(&mut p, 0x100, cold_history(), true, 10);
    assert!(used_taken_table(&p, 0x100));
}

#[test]
fn learns_not_taken_after_retrain() {
    let mut p = small();
    let hist = cold_history();
    train(&mut p, 0x100, hist, true, 10);
    train(&mut p, 0x100, hist, false, 20);
    assert!(!p.predict(0, 0x100, hist).taken);
}

// ══════════════════════════════════════════════════════════
// 2. Partial choice update
// ══════════════════════════════════════════════════════════

/// A correct prediction from the selected table shields the choice entry
/// when the outcome disagrees with the choice's own vote: a mostly-taken
/// branch with a rare not-taken outcome, correctly predicted by the
/// taken-biased table, must stay assigned to that table.
#[test]
fn correct_selection_is_shielded() {
    let mut p = small();
    let hist = cold_history();
    let hist2 = HistoryView { ghr: 1, path: 0 };
    let pc = 0x100;

    // Settle the branch firmly into the taken-biased table.
    train(&mut p, pc, hist, true, 10);
    assert!(used_taken_table(&p, pc));

    // One wrong round in a second history context: the selected table
    // mispredicts there, so the choice entry takes a single legitimate
    // step — but stays on the taken side.
    let _ = step(&mut p, pc, hist2, false);
    assert!(used_taken_table(&p, pc));

    // The taken-biased table now predicts this context not-taken and keeps
    // being right. The choice vote disagrees with every outcome, yet the
    // shield must hold the working selection in place.
    for _ in 0..4 {
        let pred = step(&mut p, pc, hist2, false);
        assert!(!pred, "selected table predicts the rare direction");
        assert!(
            used_taken_table(&p, pc),
            "correct selection must not be evicted by outcome-only drift"
        );
    }

    // The original context is untouched.
    assert!(p.predict(0, pc, hist).taken);
}

/// Without the shield (selected table wrong), the choice entry does follow
/// the outcome and eventually re-partitions the branch.
#[test]
fn wrong_selection_repartitions() {
    let mut p = small();
    let hist = cold_history();
    let pc = 0x100;

    train(&mut p, pc, hist, true, 10);
    assert!(used_taken_table(&p, pc));

    // Sustained not-taken outcomes that the taken-biased table keeps
    // getting wrong walk the choice entry over to the not-taken table.
    train(&mut p, pc, hist, false, 10);
    assert!(!used_taken_table(&p, pc));
}
