//! BiMode branch predictor.
//!
//! Two global-history-indexed direction tables — one biased toward taken,
//! one toward not-taken — selected by a choice table indexed by the branch
//! address. Partitioning branches by bias keeps mostly-taken and
//! mostly-not-taken branches out of each other's counters, cutting the
//! destructive aliasing a single shared global table suffers.

use serde::{Deserialize, Serialize};

use super::{DirectionInfo, DirectionLookup, DirectionPredictor};
use crate::config::BiModeConfig;
use crate::counter::SatCounter;
use crate::history::HistoryView;

/// Per-lookup state: indices and votes of the three tables.
#[derive(Clone, Copy, Debug)]
pub struct BiModeInfo {
    /// Index into the choice table.
    pub choice_index: usize,
    /// Index into the selected direction table.
    pub direction_index: usize,
    /// Whether the taken-biased table was selected.
    pub used_taken_table: bool,
    /// The choice table's vote.
    pub choice_pred: bool,
    /// The selected direction table's vote (the final prediction).
    pub direction_pred: bool,
}

/// BiMode predictor structure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BiModePredictor {
    taken_ctrs: Vec<SatCounter>,
    not_taken_ctrs: Vec<SatCounter>,
    choice_ctrs: Vec<SatCounter>,
    global_mask: usize,
    choice_mask: usize,
    inst_shift: u32,
}

impl BiModePredictor {
    /// Creates a predictor from validated configuration.
    ///
    /// The biased tables start leaning their own way (weakly taken and
    /// weakly not-taken respectively), which is what gives the scheme its
    /// cold-start partitioning.
    pub fn new(config: &BiModeConfig, inst_shift: u32) -> Self {
        let half = 1u32 << (config.global_ctr_bits - 1);
        Self {
            taken_ctrs: vec![
                SatCounter::with_initial(config.global_ctr_bits, half);
                config.global_predictor_size
            ],
            not_taken_ctrs: vec![
                SatCounter::with_initial(config.global_ctr_bits, half - 1);
                config.global_predictor_size
            ],
            choice_ctrs: vec![
                SatCounter::weakly_not_taken(config.choice_ctr_bits);
                config.choice_predictor_size
            ],
            global_mask: config.global_predictor_size - 1,
            choice_mask: config.choice_predictor_size - 1,
            inst_shift,
        }
    }

    fn indices(&self, pc: u64, hist: HistoryView) -> BiModeInfo {
        let shifted = pc >> self.inst_shift;
        let choice_index = (shifted as usize) & self.choice_mask;
        let direction_index = ((hist.ghr ^ shifted) as usize) & self.global_mask;
        let choice_pred = self.choice_ctrs[choice_index].is_taken();
        let direction_pred = if choice_pred {
            self.taken_ctrs[direction_index].is_taken()
        } else {
            self.not_taken_ctrs[direction_index].is_taken()
        };
        BiModeInfo {
            choice_index,
            direction_index,
            used_taken_table: choice_pred,
            choice_pred,
            direction_pred,
        }
    }
}

impl DirectionPredictor for BiModePredictor {
    fn predict(&self, _tid: usize, pc: u64, hist: HistoryView) -> DirectionLookup {
        let info = self.indices(pc, hist);
        DirectionLookup {
            taken: info.direction_pred,
            info: DirectionInfo::BiMode(info),
        }
    }

    fn update(&mut self, _tid: usize, _pc: u64, info: &DirectionInfo, taken: bool) {
        let DirectionInfo::BiMode(info) = info else {
            return;
        };

        // Partial update rule: the choice table follows the outcome unless
        // the selected direction table was right while the choice's own
        // vote disagreed with the outcome — overriding a working selection
        // would evict the branch from the table that understands it.
        let chosen_correct = info.direction_pred == taken;
        if !(chosen_correct && info.choice_pred != taken) {
            self.choice_ctrs[info.choice_index].train(taken);
        }

        if info.used_taken_table {
            self.taken_ctrs[info.direction_index].train(taken);
        } else {
            self.not_taken_ctrs[info.direction_index].train(taken);
        }
    }
}
