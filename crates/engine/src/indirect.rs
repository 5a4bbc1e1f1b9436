//! Indirect target predictor.
//!
//! Indirect branches (virtual calls, switch tables) have target
//! distributions that correlate with the recent control-flow path rather
//! than with the branch address alone. This predictor is a set-associative
//! tagged cache keyed by a hash of the branch address with, per
//! configuration, the global direction history and the last few committed
//! indirect targets, plus the thread id. Replacement is round-robin among
//! ways; eviction order is not load-bearing.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::config::IndirectConfig;

/// The set/tag pair computed for one lookup.
///
/// Recorded in the in-flight branch record so the commit-time update
/// installs the resolved target under the same hash the lookup used, even
/// though the live history has moved on since.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndirectToken {
    set: usize,
    tag: u64,
}

/// One way of one set.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
struct IndirectEntry {
    tag: u64,
    target: u64,
    valid: bool,
}

/// Set-associative indirect target cache.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndirectPredictor {
    /// `sets * ways` entries, way-major within each set.
    table: Vec<IndirectEntry>,
    /// Round-robin replacement pointer per set.
    next_way: Vec<u8>,
    /// Last committed indirect targets per thread, newest at the front.
    paths: Vec<VecDeque<u64>>,
    sets: usize,
    ways: usize,
    tag_mask: u64,
    path_length: usize,
    hash_ghr: bool,
    hash_targets: bool,
    inst_shift: u32,
}

impl IndirectPredictor {
    /// Creates a predictor from validated configuration.
    pub fn new(config: &IndirectConfig, num_threads: usize, inst_shift: u32) -> Self {
        Self {
            table: vec![IndirectEntry::default(); config.sets * config.ways],
            next_way: vec![0; config.sets],
            paths: vec![VecDeque::with_capacity(config.path_length); num_threads],
            sets: config.sets,
            ways: config.ways,
            tag_mask: if config.tag_bits >= 64 {
                u64::MAX
            } else {
                (1u64 << config.tag_bits) - 1
            },
            path_length: config.path_length,
            hash_ghr: config.hash_ghr,
            hash_targets: config.hash_targets,
            inst_shift,
        }
    }

    /// Computes the set/tag token for a lookup.
    ///
    /// The same token must be used for the matching update so speculative
    /// history movement between lookup and resolution cannot skew the hash.
    pub fn token(&self, tid: usize, pc: u64, ghr: u64) -> IndirectToken {
        let mut h = pc >> self.inst_shift;
        if self.hash_ghr {
            h ^= ghr;
        }
        if self.hash_targets {
            for (i, t) in self.paths[tid].iter().enumerate() {
                h ^= (t >> self.inst_shift).rotate_left((i as u32 + 1) * 7);
            }
        }
        h ^= (tid as u64) << 5;
        IndirectToken {
            set: (h as usize) & (self.sets - 1),
            tag: (h >> self.sets.trailing_zeros()) & self.tag_mask,
        }
    }

    /// Searches the token's set for a matching tag.
    pub fn lookup(&self, token: IndirectToken) -> Option<u64> {
        let base = token.set * self.ways;
        self.table[base..base + self.ways]
            .iter()
            .find(|e| e.valid && e.tag == token.tag)
            .map(|e| e.target)
    }

    /// Installs the resolved target under the token, overwriting a matching
    /// way or evicting round-robin.
    pub fn update(&mut self, token: IndirectToken, target: u64) {
        let base = token.set * self.ways;
        for e in &mut self.table[base..base + self.ways] {
            if e.valid && e.tag == token.tag {
                e.target = target;
                return;
            }
        }
        let way = self.next_way[token.set] as usize % self.ways;
        self.next_way[token.set] = ((way + 1) % self.ways) as u8;
        self.table[base + way] = IndirectEntry {
            tag: token.tag,
            target,
            valid: true,
        };
    }

    /// Shifts a committed indirect target into the thread's path history.
    pub fn record_target(&mut self, tid: usize, target: u64) {
        if self.path_length == 0 {
            return;
        }
        let path = &mut self.paths[tid];
        path.push_front(target);
        path.truncate(self.path_length);
    }
}
