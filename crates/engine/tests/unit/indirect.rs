//! Indirect Target Predictor Tests.
//!
//! Verifies tag-matched lookup, token-pinned update, round-robin
//! replacement, and the history/path sensitivity of the hash.

use bpred_core::config::IndirectConfig;
use bpred_core::indirect::IndirectPredictor;

fn config(hash_ghr: bool, hash_targets: bool) -> IndirectConfig {
    IndirectConfig {
        enabled: true,
        hash_ghr,
        hash_targets,
        sets: 16,
        ways: 2,
        tag_bits: 16,
        path_length: 3,
    }
}

fn predictor(hash_ghr: bool, hash_targets: bool) -> IndirectPredictor {
    IndirectPredictor::new(&config(hash_ghr, hash_targets), 2, 2)
}

// ══════════════════════════════════════════════════════════
// 1. Basic lookup/update
// ══════════════════════════════════════════════════════════

#[test]
fn cold_lookup_misses() {
    let p = predictor(false, false);
    let token = p.token(0, 0x1000, 0);
    assert_eq!(p.lookup(token), None);
}

#[test]
fn update_then_hit() {
    let mut p = predictor(false, false);
    let token = p.token(0, 0x1000, 0);
    p.update(token, 0xBEEF);
    assert_eq!(p.lookup(token), Some(0xBEEF));
}

#[test]
fn update_overwrites_matching_way() {
    let mut p = predictor(false, false);
    let token = p.token(0, 0x1000, 0);
    p.update(token, 0xA000);
    p.update(token, 0xB000);
    assert_eq!(p.lookup(token), Some(0xB000), "same tag reuses its way");
}

/// Two tags coexist in one set's ways without evicting each other.
#[test]
fn set_holds_multiple_ways() {
    let mut p = predictor(true, false);
    // Same PC under different histories produces different tags in
    // (usually) the same set; force distinct tokens via the GHR.
    let t1 = p.token(0, 0x1000, 0x0000);
    let t2 = p.token(0, 0x1000, 0x1111);
    assert_ne!(t1, t2, "history must differentiate the hash");
    p.update(t1, 0xA);
    p.update(t2, 0xB);
    assert_eq!(p.lookup(t1), Some(0xA));
    assert_eq!(p.lookup(t2), Some(0xB));
}

// ══════════════════════════════════════════════════════════
// 2. Hash sensitivity
// ══════════════════════════════════════════════════════════

#[test]
fn ghr_hashing_differentiates_contexts() {
    let p = predictor(true, false);
    let t1 = p.token(0, 0x2000, 0b0101);
    let t2 = p.token(0, 0x2000, 0b1010);
    assert_ne!(t1, t2);
}

#[test]
fn ghr_hashing_disabled_ignores_history() {
    let p = predictor(false, false);
    let t1 = p.token(0, 0x2000, 0b0101);
    let t2 = p.token(0, 0x2000, 0b1010);
    assert_eq!(t1, t2, "with hash_ghr off the GHR must not matter");
}

#[test]
fn threads_hash_apart() {
    let p = predictor(false, false);
    let t0 = p.token(0, 0x2000, 0);
    let t1 = p.token(1, 0x2000, 0);
    assert_ne!(t0, t1, "thread id folds into the hash");
}

/// Committed targets steer the hash when target-path hashing is on.
#[test]
fn target_path_history_differentiates() {
    let mut p = predictor(false, true);
    let before = p.token(0, 0x3000, 0);
    p.record_target(0, 0x9000);
    let after = p.token(0, 0x3000, 0);
    assert_ne!(before, after, "a committed target changes the path hash");
}

/// The path window is bounded: only the most recent targets matter.
#[test]
fn target_path_window_is_bounded() {
    let mut p = predictor(false, true);
    p.record_target(0, 0x1111);
    p.record_target(0, 0x2222);
    p.record_target(0, 0x3333);
    let full_window = p.token(0, 0x3000, 0);

    let mut q = predictor(false, true);
    q.record_target(0, 0xDEAD); // will fall out of the window
    q.record_target(0, 0x1111);
    q.record_target(0, 0x2222);
    q.record_target(0, 0x3333);
    let same_window = q.token(0, 0x3000, 0);

    assert_eq!(full_window, same_window, "path_length=3 keeps three targets");
}

/// A lookup token pins the hash even after the path history moves on,
/// so resolution-time updates land where the lookup probed.
#[test]
fn token_pins_hash_across_path_movement() {
    let mut p = predictor(false, true);
    let token = p.token(0, 0x4000, 0);
    p.record_target(0, 0x7777);
    p.update(token, 0xCAFE);
    assert_eq!(p.lookup(token), Some(0xCAFE));
}
