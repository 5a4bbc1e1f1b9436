//! Branch Target Buffer Tests.
//!
//! Verifies lookup/update semantics, tag matching, thread separation,
//! aliasing eviction, and last-writer-wins replacement.

use bpred_core::btb::Btb;

// ══════════════════════════════════════════════════════════
// 1. Basic lookup/update
// ══════════════════════════════════════════════════════════

#[test]
fn lookup_empty_returns_none() {
    let btb = Btb::new(16, 16, 2);
    assert_eq!(btb.lookup(0, 0x1000), None);
}

#[test]
fn update_then_lookup() {
    let mut btb = Btb::new(16, 16, 2);
    btb.update(0, 0x1000, 0x2000);
    assert_eq!(btb.lookup(0, 0x1000), Some(0x2000));
}

/// A never-updated address misses until exactly one update installs it.
#[test]
fn miss_until_installed_then_hit() {
    let mut btb = Btb::new(64, 16, 2);
    for _ in 0..4 {
        assert_eq!(btb.lookup(0, 0x4000), None, "cold lookups stay misses");
    }
    btb.update(0, 0x4000, 0xBEE0);
    for _ in 0..4 {
        assert_eq!(btb.lookup(0, 0x4000), Some(0xBEE0));
    }
}

#[test]
fn update_overwrites_previous_target() {
    let mut btb = Btb::new(16, 16, 2);
    btb.update(0, 0x1000, 0x2000);
    btb.update(0, 0x1000, 0x3000);
    assert_eq!(btb.lookup(0, 0x1000), Some(0x3000), "Latest update should win");
}

// ══════════════════════════════════════════════════════════
// 2. Tag and thread mismatch
// ══════════════════════════════════════════════════════════

#[test]
fn lookup_wrong_pc_returns_none() {
    let mut btb = Btb::new(16, 16, 2);
    btb.update(0, 0x1000, 0x2000);
    assert_eq!(btb.lookup(0, 0x1004), None, "Different PC should not match");
}

#[test]
fn lookup_wrong_thread_returns_none() {
    let mut btb = Btb::new(16, 16, 2);
    btb.update(0, 0x1000, 0x2000);
    assert_eq!(
        btb.lookup(1, 0x1000),
        None,
        "Another thread's entry must not leak"
    );
}

#[test]
fn aliasing_eviction() {
    // Two PCs sharing an index (16 entries → index bits pc[2..6]) but with
    // different tags; the second update evicts the first.
    let mut btb = Btb::new(16, 16, 2);
    let pc_a = 0x1000;
    let pc_b = 0x1000 + (16 << 2);
    btb.update(0, pc_a, 0xAAAA);
    btb.update(0, pc_b, 0xBBBB);
    assert_eq!(btb.lookup(0, pc_a), None, "pc_a evicted by pc_b (same index)");
    assert_eq!(btb.lookup(0, pc_b), Some(0xBBBB));
}

// ══════════════════════════════════════════════════════════
// 3. Capacity and edge cases
// ══════════════════════════════════════════════════════════

#[test]
fn fill_entire_btb() {
    let size = 32u64;
    let mut btb = Btb::new(size as usize, 16, 2);
    for i in 0..size {
        btb.update(0, i * 4, 0xF000 + i);
    }
    for i in 0..size {
        assert_eq!(btb.lookup(0, i * 4), Some(0xF000 + i));
    }
}

#[test]
fn target_zero_is_valid() {
    let mut btb = Btb::new(16, 16, 2);
    btb.update(0, 0x1000, 0);
    assert_eq!(btb.lookup(0, 0x1000), Some(0), "Target address 0 is valid");
}

#[test]
fn high_addresses() {
    let mut btb = Btb::new(16, 16, 2);
    let high_pc = 0x8000_0000_0000_0000;
    btb.update(0, high_pc, u64::MAX);
    assert_eq!(btb.lookup(0, high_pc), Some(u64::MAX));
}
