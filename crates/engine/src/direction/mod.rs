//! Direction predictor variants.
//!
//! All variants expose one contract: `predict` computes a taken/not-taken
//! vote plus a per-lookup [`DirectionInfo`] record, and `update` is called
//! exactly once per branch with that record and the resolved outcome. The
//! record captures every index and intermediate vote computed at predict
//! time, so update never re-reads the live (already moved-on) history.
//!
//! The engine is written against the [`DirectionPredictor`] trait and the
//! [`DirectionKind`] enum wrapper; enum dispatch keeps the hot lookup path
//! free of vtable indirection.

pub use self::bimode::{BiModeInfo, BiModePredictor};
pub use self::local::{LocalInfo, LocalPredictor};
pub use self::tage::{TageInfo, TagePredictor};
pub use self::tournament::{TournamentInfo, TournamentPredictor};

/// Taken/not-taken biased two-table hybrid.
pub mod bimode;
/// Per-address saturating-counter table.
pub mod local;
/// Tagged geometric-history-length predictor with a loop predictor.
pub mod tage;
/// Hybrid local/global predictor with a choice selector.
pub mod tournament;

use serde::{Deserialize, Serialize};

use crate::config::{DirectionVariant, PredictorConfig};
use crate::history::HistoryView;
use crate::stats::DirectionProvider;

/// The result of one direction prediction.
#[derive(Clone, Debug)]
pub struct DirectionLookup {
    /// The speculative direction vote.
    pub taken: bool,
    /// Per-lookup state threaded through to the matching `update`.
    pub info: DirectionInfo,
}

/// Per-lookup state of whichever variant is installed.
///
/// Owned by the in-flight branch record until resolution or squash.
#[derive(Clone, Debug)]
pub enum DirectionInfo {
    /// Local predictor state.
    Local(LocalInfo),
    /// Tournament predictor state.
    Tournament(TournamentInfo),
    /// BiMode predictor state.
    BiMode(BiModeInfo),
    /// TAGE predictor state (boxed: it carries per-table indices).
    Tage(Box<TageInfo>),
}

impl DirectionInfo {
    /// Which structure produced the final vote, for telemetry attribution.
    pub fn provider(&self) -> DirectionProvider {
        match self {
            Self::Local(_) => DirectionProvider::Local,
            Self::Tournament(info) => {
                if info.chose_global {
                    DirectionProvider::TournamentGlobal
                } else {
                    DirectionProvider::TournamentLocal
                }
            }
            Self::BiMode(info) => {
                if info.used_taken_table {
                    DirectionProvider::BiModeTaken
                } else {
                    DirectionProvider::BiModeNotTaken
                }
            }
            Self::Tage(info) => info.provider(),
        }
    }
}

/// Shared contract of all direction predictor variants.
///
/// `predict` is called before resolution, `update` exactly once afterwards,
/// in that order, per branch.
pub trait DirectionPredictor {
    /// Computes the speculative direction vote for a branch.
    fn predict(&self, tid: usize, pc: u64, hist: HistoryView) -> DirectionLookup;

    /// Trains the predictor with the resolved outcome, using the state
    /// captured by the matching `predict`.
    fn update(&mut self, tid: usize, pc: u64, info: &DirectionInfo, taken: bool);
}

/// Enum wrapper for static dispatch over the variant selected at
/// construction. The engine never inspects the concrete variant.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum DirectionKind {
    /// Per-address counter table.
    Local(LocalPredictor),
    /// Local/global hybrid with choice selector.
    Tournament(TournamentPredictor),
    /// Bias-partitioned global tables.
    BiMode(BiModePredictor),
    /// Tagged geometric tables with loop predictor.
    Tage(TagePredictor),
}

impl DirectionKind {
    /// Builds the configured variant from a validated configuration.
    pub fn new(config: &PredictorConfig) -> Self {
        match config.variant {
            DirectionVariant::Local => {
                Self::Local(LocalPredictor::new(&config.local, config.inst_shift_amt))
            }
            DirectionVariant::Tournament => Self::Tournament(TournamentPredictor::new(
                &config.tournament,
                config.inst_shift_amt,
            )),
            DirectionVariant::BiMode => {
                Self::BiMode(BiModePredictor::new(&config.bimode, config.inst_shift_amt))
            }
            DirectionVariant::Tage => {
                Self::Tage(TagePredictor::new(&config.tage, config.inst_shift_amt))
            }
        }
    }
}

impl DirectionPredictor for DirectionKind {
    #[inline]
    fn predict(&self, tid: usize, pc: u64, hist: HistoryView) -> DirectionLookup {
        match self {
            Self::Local(p) => p.predict(tid, pc, hist),
            Self::Tournament(p) => p.predict(tid, pc, hist),
            Self::BiMode(p) => p.predict(tid, pc, hist),
            Self::Tage(p) => p.predict(tid, pc, hist),
        }
    }

    #[inline]
    fn update(&mut self, tid: usize, pc: u64, info: &DirectionInfo, taken: bool) {
        match self {
            Self::Local(p) => p.update(tid, pc, info, taken),
            Self::Tournament(p) => p.update(tid, pc, info, taken),
            Self::BiMode(p) => p.update(tid, pc, info, taken),
            Self::Tage(p) => p.update(tid, pc, info, taken),
        }
    }
}
