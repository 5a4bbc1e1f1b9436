//! Saturating Counter Tests.
//!
//! Verifies clamp behaviour at both ends of the range, the vote thresholds,
//! and width-parameterized saturation for the unsigned and signed flavours.

use bpred_core::counter::{SatCounter, SignedCounter};
use proptest::prelude::*;
use rstest::rstest;

// ══════════════════════════════════════════════════════════
// 1. Unsigned clamp behaviour
// ══════════════════════════════════════════════════════════

/// Incrementing at the maximum leaves the value unchanged.
#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(8)]
fn increment_clamps_at_max(#[case] bits: u32) {
    let mut c = SatCounter::new(bits);
    for _ in 0..(1u32 << bits) + 10 {
        c.increment();
    }
    assert_eq!(c.value(), c.max());
    c.increment();
    assert_eq!(c.value(), c.max(), "increment at max must be a no-op");
}

/// Decrementing at zero leaves the value unchanged.
#[rstest]
#[case(1)]
#[case(2)]
#[case(8)]
fn decrement_clamps_at_zero(#[case] bits: u32) {
    let mut c = SatCounter::new(bits);
    c.decrement();
    assert_eq!(c.value(), 0, "decrement at zero must be a no-op");
}

/// The vote flips exactly at the top half of the range.
#[test]
fn vote_threshold_two_bits() {
    let mut c = SatCounter::new(2);
    assert!(!c.is_taken(), "0 votes not-taken");
    c.increment();
    assert!(!c.is_taken(), "1 votes not-taken");
    c.increment();
    assert!(c.is_taken(), "2 votes taken");
    c.increment();
    assert!(c.is_taken(), "3 votes taken");
}

/// Weakly-not-taken sits one below the vote threshold.
#[test]
fn weakly_not_taken_flips_after_one_taken() {
    let mut c = SatCounter::weakly_not_taken(2);
    assert_eq!(c.value(), 1);
    assert!(!c.is_taken());
    c.train(true);
    assert!(c.is_taken(), "a single taken outcome flips the cold vote");
}

/// Halving walks the value toward zero without wrapping.
#[test]
fn halve_decays() {
    let mut c = SatCounter::with_initial(2, 3);
    c.halve();
    assert_eq!(c.value(), 1);
    c.halve();
    assert_eq!(c.value(), 0);
    c.halve();
    assert_eq!(c.value(), 0);
}

// ══════════════════════════════════════════════════════════
// 2. Signed clamp behaviour
// ══════════════════════════════════════════════════════════

/// Signed counters clamp at both ends of the two's-complement range.
#[rstest]
#[case(2, -2, 1)]
#[case(3, -4, 3)]
#[case(4, -8, 7)]
fn signed_range(#[case] bits: u32, #[case] min: i32, #[case] max: i32) {
    let mut c = SignedCounter::new(bits);
    assert_eq!((c.min(), c.max()), (min, max));
    for _ in 0..64 {
        c.increment();
    }
    assert_eq!(c.value(), max);
    for _ in 0..64 {
        c.decrement();
    }
    assert_eq!(c.value(), min);
    c.decrement();
    assert_eq!(c.value(), min, "decrement at min must be a no-op");
}

/// The signed vote convention is `>= 0`.
#[test]
fn signed_vote_threshold() {
    let mut c = SignedCounter::new(3);
    assert!(c.is_taken(), "zero votes taken");
    c.decrement();
    assert!(!c.is_taken(), "-1 votes not-taken");
}

/// Fresh allocations seed weakly toward the observed outcome.
#[test]
fn signed_seed_is_weak() {
    let mut c = SignedCounter::new(3);
    c.seed(true);
    assert_eq!(c.value(), 0);
    assert!(c.is_weak());
    c.seed(false);
    assert_eq!(c.value(), -1);
    assert!(c.is_weak());
}

// ══════════════════════════════════════════════════════════
// 3. Properties
// ══════════════════════════════════════════════════════════

proptest! {
    /// Any train sequence keeps an unsigned counter inside its range.
    #[test]
    fn unsigned_never_escapes_range(bits in 1u32..=8, outcomes in prop::collection::vec(any::<bool>(), 0..256)) {
        let mut c = SatCounter::new(bits);
        for taken in outcomes {
            c.train(taken);
            prop_assert!(c.value() <= c.max());
        }
    }

    /// Any train sequence keeps a signed counter inside its range.
    #[test]
    fn signed_never_escapes_range(bits in 2u32..=8, outcomes in prop::collection::vec(any::<bool>(), 0..256)) {
        let mut c = SignedCounter::new(bits);
        for taken in outcomes {
            c.train(taken);
            prop_assert!(c.value() >= c.min() && c.value() <= c.max());
        }
    }
}
