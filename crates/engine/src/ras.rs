//! Return Address Stack (RAS).
//!
//! Bounded circular stack of speculative return addresses, one per thread.
//! Calls push the fall-through address, returns pop the predicted target.
//! Because both operations happen speculatively at lookup time, every
//! mutation is paired with a checkpoint that records exactly what the
//! operation clobbers, so a squash can undo pushes and pops in reverse
//! chronological order.

use serde::{Deserialize, Serialize};

/// Undo record for one push or pop.
///
/// Captured *before* the operation: the top-of-stack pointer, the current
/// depth, and the slot a push would overwrite. Restoring writes the slot
/// back and resets the pointers, exactly reversing either operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasCheckpoint {
    tos: usize,
    depth: usize,
    clobber_slot: usize,
    clobber_value: u64,
}

/// Return Address Stack structure.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ras {
    stack: Vec<u64>,
    /// Index of the current top entry; meaningful only when `depth > 0`.
    tos: usize,
    /// Number of live entries, saturating at the stack capacity.
    depth: usize,
}

impl Ras {
    /// Creates a stack with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            stack: vec![0; capacity],
            tos: 0,
            depth: 0,
        }
    }

    /// Current number of live entries.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Snapshots the state a subsequent push or pop would disturb.
    pub fn checkpoint(&self) -> RasCheckpoint {
        let next = (self.tos + 1) % self.stack.len();
        RasCheckpoint {
            tos: self.tos,
            depth: self.depth,
            clobber_slot: next,
            clobber_value: self.stack[next],
        }
    }

    /// Restores a previously-taken checkpoint, undoing the one operation
    /// performed after it.
    pub fn restore(&mut self, cp: RasCheckpoint) {
        self.stack[cp.clobber_slot] = cp.clobber_value;
        self.tos = cp.tos;
        self.depth = cp.depth;
    }

    /// Pushes a return address, wrapping over the oldest entry when full.
    pub fn push(&mut self, addr: u64) {
        self.tos = (self.tos + 1) % self.stack.len();
        self.stack[self.tos] = addr;
        if self.depth < self.stack.len() {
            self.depth += 1;
        }
    }

    /// Pops the predicted return address, or `None` when empty.
    pub fn pop(&mut self) -> Option<u64> {
        if self.depth == 0 {
            return None;
        }
        let addr = self.stack[self.tos];
        self.tos = if self.tos == 0 {
            self.stack.len() - 1
        } else {
            self.tos - 1
        };
        self.depth -= 1;
        Some(addr)
    }

    /// Peeks at the top entry without modifying the stack.
    pub fn top(&self) -> Option<u64> {
        if self.depth == 0 {
            None
        } else {
            Some(self.stack[self.tos])
        }
    }
}
