//! Prediction statistics collection and reporting.
//!
//! This module tracks outcome counters for the engine. It provides:
//! 1. **`PredictorStats`:** flat counters for lookups, commits, squashes,
//!    direction/target correctness, and per-structure hit rates.
//! 2. **Derived metrics:** direction accuracy and BTB/indirect hit rates.
//! 3. **`StatsSink`:** a hook trait invoked after every update and squash,
//!    consumed by external telemetry.

use serde::Serialize;

/// Which structure produced a direction vote.
///
/// Reported with every resolution so telemetry can attribute correctness
/// per table and per variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DirectionProvider {
    /// The local counter table.
    Local,
    /// Tournament: the local component, selected by the choice table.
    TournamentLocal,
    /// Tournament: the global component, selected by the choice table.
    TournamentGlobal,
    /// BiMode: the taken-biased table.
    BiModeTaken,
    /// BiMode: the not-taken-biased table.
    BiModeNotTaken,
    /// TAGE: the bimodal base table (full tag miss).
    TageBase,
    /// TAGE: the tagged table with the given index (0 = shortest history).
    TageTable(u8),
    /// TAGE: the loop predictor override.
    Loop,
    /// No direction vote was consulted (unconditional branch).
    Unconditional,
}

/// What happened to one in-flight branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Resolved with a real outcome; learning tables were trained.
    Committed {
        /// Whether the predicted direction matched the outcome.
        direction_correct: bool,
        /// Whether the predicted target matched (trivially true for
        /// not-taken resolutions).
        target_correct: bool,
    },
    /// Discarded as wrong-path speculation; no tables were trained.
    Squashed,
}

/// One terminal event, delivered to the [`StatsSink`] after every update or
/// squash (including branches released by a cascade squash).
#[derive(Clone, Copy, Debug)]
pub struct PredictionEvent {
    /// Hardware thread of the branch.
    pub thread: usize,
    /// Program counter of the branch.
    pub pc: u64,
    /// Terminal outcome.
    pub kind: EventKind,
    /// Which structure voted the direction at lookup time.
    pub provider: DirectionProvider,
}

/// External telemetry hook.
///
/// Installed with `PredictionEngine::set_stats_sink`; invoked synchronously
/// from the event-driven caller, so implementations must not block.
pub trait StatsSink {
    /// Receives one terminal event.
    fn record(&mut self, event: &PredictionEvent);
}

/// Outcome counters for one engine instance.
///
/// All fields are public and monotonically increasing; rates are derived on
/// demand.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PredictorStats {
    /// Total lookups issued.
    pub lookups: u64,
    /// Lookups that consulted the direction predictor.
    pub conditional_lookups: u64,
    /// Branches resolved through `update`.
    pub commits: u64,
    /// Branches discarded through `squash` (including cascades).
    pub squashes: u64,
    /// Resolved conditional branches whose direction was correct.
    pub direction_correct: u64,
    /// Resolved conditional branches whose direction was wrong.
    pub direction_mispredicts: u64,
    /// Resolved taken branches whose predicted target was wrong or absent.
    pub target_mispredicts: u64,
    /// BTB probes made while predicting targets.
    pub btb_lookups: u64,
    /// BTB probes that hit.
    pub btb_hits: u64,
    /// Return lookups served from the RAS.
    pub ras_predictions: u64,
    /// Indirect-cache probes.
    pub indirect_lookups: u64,
    /// Indirect-cache probes that hit.
    pub indirect_hits: u64,
    /// Times the loop predictor overrode the TAGE vote.
    pub loop_overrides: u64,
}

impl PredictorStats {
    /// Fraction of resolved conditional branches predicted correctly.
    pub fn direction_accuracy(&self) -> f64 {
        ratio(
            self.direction_correct,
            self.direction_correct + self.direction_mispredicts,
        )
    }

    /// Fraction of BTB probes that hit.
    pub fn btb_hit_rate(&self) -> f64 {
        ratio(self.btb_hits, self.btb_lookups)
    }

    /// Fraction of indirect-cache probes that hit.
    pub fn indirect_hit_rate(&self) -> f64 {
        ratio(self.indirect_hits, self.indirect_lookups)
    }
}

fn ratio(num: u64, denom: u64) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}
