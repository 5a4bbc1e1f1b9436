//! Speculative global history tracking.
//!
//! Each thread owns a direction-history register (GHR) and a path-history
//! register, both speculatively updated at lookup time. Every lookup takes a
//! checkpoint into a bounded ring keyed by a per-thread sequence number:
//! 1. **`checkpoint`** snapshots the registers before the speculative shift.
//! 2. **`restore`** rolls the registers back to a snapshot and discards it
//!    together with every younger snapshot (LIFO repair).
//! 3. **`commit`** drops a snapshot's bookkeeping irreversibly; commits may
//!    arrive out of program order.
//!
//! Restore is an index reset into the ring, not a data copy, so squash stays
//! cheap regardless of history width.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Read-only view of one thread's registers, handed to direction predictors
/// at predict time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryView {
    /// Global direction history, newest outcome in bit 0.
    pub ghr: u64,
    /// Path history, folded target bits, newest in bit 0.
    pub path: u64,
}

/// One ring entry: the register state immediately before a lookup.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
struct Checkpoint {
    seq: u64,
    ghr: u64,
    path: u64,
}

/// Per-thread register pair plus its live checkpoint ring.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct ThreadHistory {
    ghr: u64,
    path: u64,
    next_seq: u64,
    live: VecDeque<Checkpoint>,
}

impl ThreadHistory {
    fn new(capacity: usize) -> Self {
        Self {
            ghr: 0,
            path: 0,
            next_seq: 0,
            live: VecDeque::with_capacity(capacity),
        }
    }
}

/// Speculative history registers for all threads.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryTracker {
    threads: Vec<ThreadHistory>,
    ghr_mask: u64,
    path_mask: u64,
    inst_shift: u32,
    capacity: usize,
}

impl HistoryTracker {
    /// Creates a tracker for `num_threads` threads with registers of
    /// `ghr_bits`/`path_bits` width and `capacity` outstanding checkpoints
    /// per thread.
    pub fn new(
        num_threads: usize,
        ghr_bits: u32,
        path_bits: u32,
        inst_shift: u32,
        capacity: usize,
    ) -> Self {
        Self {
            threads: (0..num_threads)
                .map(|_| ThreadHistory::new(capacity))
                .collect(),
            ghr_mask: width_mask(ghr_bits),
            path_mask: width_mask(path_bits),
            inst_shift,
            capacity,
        }
    }

    /// Current register values for a thread.
    pub fn view(&self, tid: usize) -> HistoryView {
        let t = &self.threads[tid];
        HistoryView {
            ghr: t.ghr,
            path: t.path,
        }
    }

    /// Number of outstanding checkpoints for a thread.
    pub fn outstanding(&self, tid: usize) -> usize {
        self.threads[tid].live.len()
    }

    /// Snapshots the registers and returns the checkpoint's sequence number.
    ///
    /// Fails with a capacity error when the thread already has
    /// `max_in_flight` outstanding checkpoints — a hard simulator limit,
    /// not a normal runtime condition.
    pub fn checkpoint(&mut self, tid: usize) -> Result<u64, EngineError> {
        let capacity = self.capacity;
        let t = &mut self.threads[tid];
        if t.live.len() >= capacity {
            return Err(EngineError::CheckpointCapacity {
                thread: tid,
                capacity,
            });
        }
        let seq = t.next_seq;
        t.next_seq += 1;
        t.live.push_back(Checkpoint {
            seq,
            ghr: t.ghr,
            path: t.path,
        });
        Ok(seq)
    }

    /// Restores the registers to their state immediately before the lookup
    /// that produced `seq`, discarding that checkpoint and every younger one.
    pub fn restore(&mut self, tid: usize, seq: u64) -> Result<(), EngineError> {
        let t = &mut self.threads[tid];
        let pos = t
            .live
            .iter()
            .position(|c| c.seq == seq)
            .ok_or(EngineError::StaleCheckpoint { thread: tid, seq })?;
        let cp = t.live[pos];
        t.ghr = cp.ghr;
        t.path = cp.path;
        t.live.truncate(pos);
        Ok(())
    }

    /// Drops a checkpoint's bookkeeping without touching the registers.
    ///
    /// Commits may arrive out of program order for still-in-flight branches;
    /// the entry is removed wherever it sits in the ring.
    pub fn commit(&mut self, tid: usize, seq: u64) -> Result<(), EngineError> {
        let t = &mut self.threads[tid];
        let pos = t
            .live
            .iter()
            .position(|c| c.seq == seq)
            .ok_or(EngineError::StaleCheckpoint { thread: tid, seq })?;
        let _ = t.live.remove(pos);
        Ok(())
    }

    /// Shifts an outcome into the direction history and folds the target
    /// into the path history.
    pub fn update(&mut self, tid: usize, taken: bool, target: u64) {
        let shift = self.inst_shift;
        let t = &mut self.threads[tid];
        t.ghr = ((t.ghr << 1) | u64::from(taken)) & self.ghr_mask;
        t.path = ((t.path << 1) ^ ((target >> shift) & 1)) & self.path_mask;
    }
}

fn width_mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}
