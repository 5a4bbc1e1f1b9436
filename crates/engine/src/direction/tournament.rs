//! Tournament branch predictor.
//!
//! A hybrid that runs a per-address local component and a global-history
//! component side by side, with a choice table (indexed by global history)
//! voting between them. Branches with strong per-address bias settle on the
//! local component; history-correlated branches migrate to the global one.

use serde::{Deserialize, Serialize};

use super::{DirectionInfo, DirectionLookup, DirectionPredictor};
use crate::config::TournamentConfig;
use crate::counter::SatCounter;
use crate::history::HistoryView;

/// Per-lookup state: every index touched plus both component votes.
#[derive(Clone, Copy, Debug)]
pub struct TournamentInfo {
    /// Index into the local history table.
    pub local_history_index: usize,
    /// Index into the local counter table (derived from the local history).
    pub local_index: usize,
    /// Index into the global counter table.
    pub global_index: usize,
    /// Index into the choice table.
    pub choice_index: usize,
    /// The local component's vote.
    pub local_pred: bool,
    /// The global component's vote.
    pub global_pred: bool,
    /// Whether the choice table selected the global component.
    pub chose_global: bool,
}

/// Tournament predictor structure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TournamentPredictor {
    /// Per-address history patterns feeding the local counter table.
    local_history: Vec<u64>,
    local_ctrs: Vec<SatCounter>,
    global_ctrs: Vec<SatCounter>,
    choice_ctrs: Vec<SatCounter>,
    local_history_mask: usize,
    local_mask: usize,
    global_mask: usize,
    choice_mask: usize,
    inst_shift: u32,
}

impl TournamentPredictor {
    /// Creates a predictor from validated configuration.
    pub fn new(config: &TournamentConfig, inst_shift: u32) -> Self {
        Self {
            local_history: vec![0; config.local_history_table_size],
            local_ctrs: vec![
                SatCounter::weakly_not_taken(config.local_ctr_bits);
                config.local_predictor_size
            ],
            global_ctrs: vec![
                SatCounter::weakly_not_taken(config.global_ctr_bits);
                config.global_predictor_size
            ],
            choice_ctrs: vec![
                SatCounter::weakly_not_taken(config.choice_ctr_bits);
                config.choice_predictor_size
            ],
            local_history_mask: config.local_history_table_size - 1,
            local_mask: config.local_predictor_size - 1,
            global_mask: config.global_predictor_size - 1,
            choice_mask: config.choice_predictor_size - 1,
            inst_shift,
        }
    }

    fn indices(&self, pc: u64, hist: HistoryView) -> TournamentInfo {
        let local_history_index = ((pc >> self.inst_shift) as usize) & self.local_history_mask;
        let local_index = (self.local_history[local_history_index] as usize) & self.local_mask;
        let global_index = (hist.ghr as usize) & self.global_mask;
        let choice_index = (hist.ghr as usize) & self.choice_mask;
        TournamentInfo {
            local_history_index,
            local_index,
            global_index,
            choice_index,
            local_pred: self.local_ctrs[local_index].is_taken(),
            global_pred: self.global_ctrs[global_index].is_taken(),
            chose_global: self.choice_ctrs[choice_index].is_taken(),
        }
    }
}

impl DirectionPredictor for TournamentPredictor {
    fn predict(&self, _tid: usize, pc: u64, hist: HistoryView) -> DirectionLookup {
        let info = self.indices(pc, hist);
        let taken = if info.chose_global {
            info.global_pred
        } else {
            info.local_pred
        };
        DirectionLookup {
            taken,
            info: DirectionInfo::Tournament(info),
        }
    }

    fn update(&mut self, _tid: usize, _pc: u64, info: &DirectionInfo, taken: bool) {
        let DirectionInfo::Tournament(info) = info else {
            return;
        };

        // The choice table learns only from disagreement; when both
        // components agree there is nothing to select between.
        if info.local_pred != info.global_pred {
            self.choice_ctrs[info.choice_index].train(info.global_pred == taken);
        }

        // Both components always train toward the outcome, chosen or not.
        self.local_ctrs[info.local_index].train(taken);
        self.global_ctrs[info.global_index].train(taken);

        let pattern = self.local_history[info.local_history_index];
        self.local_history[info.local_history_index] =
            ((pattern << 1) | u64::from(taken)) & (self.local_mask as u64);
    }
}
