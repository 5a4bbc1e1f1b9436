//! Speculative History Tracker Tests.
//!
//! Verifies checkpoint LIFO restore semantics, out-of-order commit,
//! capacity enforcement, register shifting, and per-thread isolation.

use bpred_core::error::EngineError;
use bpred_core::history::HistoryTracker;

fn tracker(threads: usize, capacity: usize) -> HistoryTracker {
    HistoryTracker::new(threads, 16, 8, 2, capacity)
}

// ══════════════════════════════════════════════════════════
// 1. Register shifting
// ══════════════════════════════════════════════════════════

#[test]
fn update_shifts_direction_bits() {
    let mut h = tracker(1, 8);
    h.update(0, true, 0);
    h.update(0, false, 0);
    h.update(0, true, 0);
    assert_eq!(h.view(0).ghr, 0b101, "newest outcome lands in bit 0");
}

#[test]
fn ghr_is_masked_to_width() {
    let mut h = tracker(1, 8);
    for _ in 0..32 {
        h.update(0, true, 0);
    }
    assert_eq!(h.view(0).ghr, 0xFFFF, "history clamps at 16 bits");
}

#[test]
fn path_folds_target_bits() {
    let mut h = tracker(1, 8);
    h.update(0, true, 0x4); // bit 2 of the target, above the shift
    assert_eq!(h.view(0).path, 1);
}

// ══════════════════════════════════════════════════════════
// 2. Checkpoint LIFO property
// ══════════════════════════════════════════════════════════

/// Restoring checkpoint `ck` invalidates every younger checkpoint and
/// rewinds the registers to their state immediately before `ck`'s lookup.
#[test]
fn restore_discards_younger_checkpoints() {
    let mut h = tracker(1, 8);

    h.update(0, true, 0);
    let ghr_before_c2 = h.view(0).ghr;

    let _c1 = h.checkpoint(0).unwrap();
    h.update(0, true, 0);
    let c2 = h.checkpoint(0).unwrap();
    h.update(0, false, 0);
    let c3 = h.checkpoint(0).unwrap();
    h.update(0, true, 0);
    let c4 = h.checkpoint(0).unwrap();
    h.update(0, true, 0);
    assert_eq!(h.outstanding(0), 4);

    // c2's snapshot was taken after c1's speculative update.
    h.restore(0, c2).unwrap();
    assert_eq!(h.view(0).ghr, ghr_before_c2 << 1 | 1);
    assert_eq!(h.outstanding(0), 1, "only c1 survives");

    // c3 and c4 died with the restore.
    assert_eq!(
        h.restore(0, c3),
        Err(EngineError::StaleCheckpoint { thread: 0, seq: c3 })
    );
    assert_eq!(
        h.commit(0, c4),
        Err(EngineError::StaleCheckpoint { thread: 0, seq: c4 })
    );
}

#[test]
fn restore_youngest_is_safe_for_older() {
    let mut h = tracker(1, 8);
    let c1 = h.checkpoint(0).unwrap();
    h.update(0, true, 0);
    let c2 = h.checkpoint(0).unwrap();
    h.update(0, true, 0);

    h.restore(0, c2).unwrap();
    assert_eq!(h.view(0).ghr, 1, "c1's speculative bit survives");
    h.restore(0, c1).unwrap();
    assert_eq!(h.view(0).ghr, 0);
}

// ══════════════════════════════════════════════════════════
// 3. Commit bookkeeping
// ══════════════════════════════════════════════════════════

#[test]
fn commit_leaves_registers_alone() {
    let mut h = tracker(1, 8);
    let c1 = h.checkpoint(0).unwrap();
    h.update(0, true, 0);
    h.commit(0, c1).unwrap();
    assert_eq!(h.view(0).ghr, 1);
    assert_eq!(h.outstanding(0), 0);
}

/// Commits can arrive out of program order.
#[test]
fn out_of_order_commit() {
    let mut h = tracker(1, 8);
    let c1 = h.checkpoint(0).unwrap();
    h.update(0, true, 0);
    let c2 = h.checkpoint(0).unwrap();
    h.update(0, false, 0);

    h.commit(0, c2).unwrap();
    h.commit(0, c1).unwrap();
    assert_eq!(h.outstanding(0), 0);
}

#[test]
fn double_commit_is_reported() {
    let mut h = tracker(1, 8);
    let c1 = h.checkpoint(0).unwrap();
    h.commit(0, c1).unwrap();
    assert!(matches!(
        h.commit(0, c1),
        Err(EngineError::StaleCheckpoint { .. })
    ));
}

// ══════════════════════════════════════════════════════════
// 4. Capacity
// ══════════════════════════════════════════════════════════

/// Exceeding the speculation depth is a hard error, not a silent drop.
#[test]
fn capacity_exhaustion_is_fatal() {
    let mut h = tracker(1, 2);
    let _ = h.checkpoint(0).unwrap();
    let _ = h.checkpoint(0).unwrap();
    assert_eq!(
        h.checkpoint(0),
        Err(EngineError::CheckpointCapacity {
            thread: 0,
            capacity: 2
        })
    );
}

#[test]
fn commit_frees_capacity() {
    let mut h = tracker(1, 1);
    let c1 = h.checkpoint(0).unwrap();
    h.commit(0, c1).unwrap();
    assert!(h.checkpoint(0).is_ok());
}

// ══════════════════════════════════════════════════════════
// 5. Thread isolation
// ══════════════════════════════════════════════════════════

#[test]
fn threads_have_independent_histories() {
    let mut h = tracker(2, 8);
    h.update(0, true, 0);
    h.update(1, false, 0);
    assert_eq!(h.view(0).ghr, 1);
    assert_eq!(h.view(1).ghr, 0);
}

#[test]
fn threads_have_independent_capacity() {
    let mut h = tracker(2, 1);
    let _ = h.checkpoint(0).unwrap();
    assert!(h.checkpoint(1).is_ok(), "thread 1's ring is its own");
}
