//! Local branch predictor.
//!
//! One table of saturating counters indexed by the shifted branch address.
//! The simplest variant in the family: no history correlation, so two
//! branches only interfere when their addresses alias.

use serde::{Deserialize, Serialize};

use super::{DirectionInfo, DirectionLookup, DirectionPredictor};
use crate::config::LocalConfig;
use crate::counter::SatCounter;
use crate::history::HistoryView;

/// Per-lookup state: the counter index touched.
#[derive(Clone, Copy, Debug)]
pub struct LocalInfo {
    /// Index of the counter that voted.
    pub index: usize,
}

/// Local predictor structure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocalPredictor {
    ctrs: Vec<SatCounter>,
    idx_mask: usize,
    inst_shift: u32,
}

impl LocalPredictor {
    /// Creates a predictor from validated configuration.
    ///
    /// Counters start weakly-not-taken so a cold branch predicts not-taken
    /// and a single taken outcome flips the vote.
    pub fn new(config: &LocalConfig, inst_shift: u32) -> Self {
        Self {
            ctrs: vec![SatCounter::weakly_not_taken(config.ctr_bits); config.predictor_size],
            idx_mask: config.predictor_size - 1,
            inst_shift,
        }
    }

    fn index(&self, pc: u64) -> usize {
        ((pc >> self.inst_shift) as usize) & self.idx_mask
    }

    /// Raw counter value at the index serving `pc`, for diagnostics.
    pub fn counter_value(&self, pc: u64) -> u32 {
        self.ctrs[self.index(pc)].value()
    }
}

impl DirectionPredictor for LocalPredictor {
    fn predict(&self, _tid: usize, pc: u64, _hist: HistoryView) -> DirectionLookup {
        let index = self.index(pc);
        DirectionLookup {
            taken: self.ctrs[index].is_taken(),
            info: DirectionInfo::Local(LocalInfo { index }),
        }
    }

    fn update(&mut self, _tid: usize, _pc: u64, info: &DirectionInfo, taken: bool) {
        let DirectionInfo::Local(info) = info else {
            return;
        };
        self.ctrs[info.index].train(taken);
    }
}
