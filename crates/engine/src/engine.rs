//! Prediction engine façade.
//!
//! Orchestrates the direction predictor, BTB, RAS, indirect predictor, and
//! history tracker behind three calls:
//! 1. **`lookup`** — produce a speculative direction and target for a
//!    fetched branch, checkpoint all speculative state, and hand back an
//!    opaque [`BranchHandle`].
//! 2. **`update`** — resolve a handle with the real outcome: train every
//!    touched table, repair the history on a misprediction, commit the
//!    checkpoint.
//! 3. **`squash`** — discard a handle (and every younger in-flight branch
//!    on its thread) as wrong-path speculation, restoring history and RAS
//!    without training anything.
//!
//! Per-branch state lives in a slot arena with generation-tagged handles and
//! a free list, so steady-state operation allocates nothing per branch. A
//! handle must receive exactly one terminal call; anything else is a
//! reported contract violation.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::btb::Btb;
use crate::config::PredictorConfig;
use crate::direction::{DirectionInfo, DirectionKind, DirectionPredictor};
use crate::error::{ConfigError, EngineError};
use crate::history::HistoryTracker;
use crate::indirect::{IndirectPredictor, IndirectToken};
use crate::ras::{Ras, RasCheckpoint};
use crate::stats::{
    DirectionProvider, EventKind, PredictionEvent, PredictorStats, StatsSink,
};

/// Static classification of a branch, supplied by decode (or predecode
/// bits) with each lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchClass {
    /// Conditional direct branch; the direction predictor votes.
    Conditional,
    /// Unconditional direct jump.
    DirectJump,
    /// Unconditional direct call; pushes the fall-through on the RAS.
    DirectCall,
    /// Register-indirect jump; consults the indirect predictor.
    IndirectJump,
    /// Register-indirect call; indirect predictor plus RAS push.
    IndirectCall,
    /// Function return; pops the RAS for its target.
    Return,
}

impl BranchClass {
    /// Whether the direction predictor is consulted.
    pub fn is_conditional(self) -> bool {
        self == Self::Conditional
    }

    /// Whether the branch pushes a return address.
    pub fn is_call(self) -> bool {
        matches!(self, Self::DirectCall | Self::IndirectCall)
    }

    /// Whether the branch pops the RAS for its target.
    pub fn is_return(self) -> bool {
        self == Self::Return
    }

    /// Whether the target comes from the indirect predictor.
    pub fn is_indirect(self) -> bool {
        matches!(self, Self::IndirectJump | Self::IndirectCall)
    }
}

/// Opaque handle to one in-flight branch.
///
/// Owned by the pipeline until exactly one of `update` or `squash` consumes
/// it; generation tagging detects reuse of stale handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BranchHandle {
    slot: u32,
    generation: u32,
}

impl fmt::Display for BranchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "branch#{}.{}", self.slot, self.generation)
    }
}

/// The speculative answer to one lookup.
#[derive(Clone, Copy, Debug)]
pub struct Prediction {
    /// Speculative direction.
    pub taken: bool,
    /// Speculative target; `None` means fall through to the sequential PC.
    pub target: Option<u64>,
    /// Handle for the mandatory terminal call.
    pub handle: BranchHandle,
}

/// What `update` concluded about a resolved branch.
#[derive(Clone, Copy, Debug)]
pub struct Resolution {
    /// Whether the predicted direction matched the outcome.
    pub direction_correct: bool,
    /// Whether the predicted target matched (trivially true when the branch
    /// resolved not-taken).
    pub target_correct: bool,
    /// In-flight branches discarded by the misprediction cascade.
    pub squashed_younger: usize,
}

/// Everything recorded about one in-flight branch at lookup time.
#[derive(Clone, Debug)]
struct InFlight {
    tid: usize,
    pc: u64,
    class: BranchClass,
    seq: u64,
    pred_taken: bool,
    pred_target: Option<u64>,
    dir_info: Option<DirectionInfo>,
    ras_checkpoint: Option<RasCheckpoint>,
    indirect_token: Option<IndirectToken>,
}

/// One arena slot: a generation counter plus the live record, if any.
#[derive(Clone, Debug, Default)]
struct Slot {
    generation: u32,
    info: Option<InFlight>,
}

/// Serializable snapshot of all persistent predictor state.
///
/// Excludes in-flight branches, which are transient by definition; the
/// engine refuses to snapshot or restore while any are outstanding.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineState {
    /// Branch target buffer contents.
    pub btb: Btb,
    /// Per-thread return address stacks.
    pub ras: Vec<Ras>,
    /// Indirect predictor contents, when enabled.
    pub indirect: Option<IndirectPredictor>,
    /// Direction predictor tables.
    pub direction: DirectionKind,
    /// History registers and checkpoint rings.
    pub history: HistoryTracker,
}

/// The prediction engine.
pub struct PredictionEngine {
    direction: DirectionKind,
    btb: Btb,
    ras: Vec<Ras>,
    indirect: Option<IndirectPredictor>,
    history: HistoryTracker,

    slots: Vec<Slot>,
    free: Vec<u32>,
    /// Per-thread in-flight slots in fetch order, oldest at the front.
    inflight: Vec<VecDeque<u32>>,

    stats: PredictorStats,
    sink: Option<Box<dyn StatsSink>>,

    num_threads: usize,
    inst_shift: u32,
}

impl fmt::Debug for PredictionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictionEngine")
            .field("num_threads", &self.num_threads)
            .field("in_flight", &self.inflight.iter().map(VecDeque::len).sum::<usize>())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl PredictionEngine {
    /// Validates the configuration and builds every table.
    ///
    /// All sizing is fixed here; only table contents mutate afterwards.
    pub fn new(config: &PredictorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let num_threads = config.num_threads;
        Ok(Self {
            direction: DirectionKind::new(config),
            btb: Btb::new(config.btb.entries, config.btb.tag_bits, config.inst_shift_amt),
            ras: (0..num_threads).map(|_| Ras::new(config.ras.size)).collect(),
            indirect: config.indirect.enabled.then(|| {
                IndirectPredictor::new(&config.indirect, num_threads, config.inst_shift_amt)
            }),
            history: HistoryTracker::new(
                num_threads,
                config.ghr_bits,
                config.path_bits,
                config.inst_shift_amt,
                config.max_in_flight,
            ),
            slots: Vec::new(),
            free: Vec::new(),
            inflight: (0..num_threads).map(|_| VecDeque::new()).collect(),
            stats: PredictorStats::default(),
            sink: None,
            num_threads,
            inst_shift: config.inst_shift_amt,
        })
    }

    /// Installs the external telemetry hook.
    pub fn set_stats_sink(&mut self, sink: Box<dyn StatsSink>) {
        self.sink = Some(sink);
    }

    /// Outcome counters accumulated so far.
    pub fn stats(&self) -> &PredictorStats {
        &self.stats
    }

    /// Number of in-flight branches on one thread.
    pub fn in_flight(&self, tid: usize) -> usize {
        self.inflight[tid].len()
    }

    /// BTB-only target query for early pipeline stages.
    pub fn btb_target(&self, tid: usize, pc: u64) -> Option<u64> {
        self.btb.lookup(tid, pc)
    }

    /// RAS-only top-of-stack query for early pipeline stages.
    pub fn ras_top(&self, tid: usize) -> Option<u64> {
        self.ras[tid].top()
    }

    /// Current speculative global history register, for diagnostics and
    /// host-side hashing.
    pub fn ghr(&self, tid: usize) -> u64 {
        self.history.view(tid).ghr
    }

    /// Produces a speculative prediction for a fetched branch.
    ///
    /// Checkpoints the history, performs any RAS push/pop, resolves a
    /// target from the RAS, indirect predictor, or BTB, and speculatively
    /// shifts the predicted outcome into the history registers.
    pub fn lookup(
        &mut self,
        tid: usize,
        pc: u64,
        class: BranchClass,
    ) -> Result<Prediction, EngineError> {
        if tid >= self.num_threads {
            return Err(EngineError::ThreadOutOfRange {
                thread: tid,
                num_threads: self.num_threads,
            });
        }
        let seq = self.history.checkpoint(tid)?;
        let view = self.history.view(tid);

        let (taken, dir_info) = if class.is_conditional() {
            self.stats.conditional_lookups += 1;
            let lookup = self.direction.predict(tid, pc, view);
            (lookup.taken, Some(lookup.info))
        } else {
            (true, None)
        };

        let mut ras_checkpoint = None;
        let mut indirect_token = None;
        let mut target = None;

        if taken {
            if class.is_return() {
                ras_checkpoint = Some(self.ras[tid].checkpoint());
                target = self.ras[tid].pop();
                if target.is_some() {
                    self.stats.ras_predictions += 1;
                }
            } else {
                if class.is_indirect() {
                    if let Some(ind) = &self.indirect {
                        let token = ind.token(tid, pc, view.ghr);
                        indirect_token = Some(token);
                        self.stats.indirect_lookups += 1;
                        if let Some(t) = ind.lookup(token) {
                            self.stats.indirect_hits += 1;
                            target = Some(t);
                        }
                    }
                }
                if target.is_none() {
                    self.stats.btb_lookups += 1;
                    if let Some(t) = self.btb.lookup(tid, pc) {
                        self.stats.btb_hits += 1;
                        target = Some(t);
                    }
                }
            }
        }

        let fall_through = pc + (1u64 << self.inst_shift);
        if class.is_call() {
            ras_checkpoint = Some(self.ras[tid].checkpoint());
            self.ras[tid].push(fall_through);
        }

        self.history
            .update(tid, taken, target.unwrap_or(fall_through));

        let slot = self.allocate(InFlight {
            tid,
            pc,
            class,
            seq,
            pred_taken: taken,
            pred_target: target,
            dir_info,
            ras_checkpoint,
            indirect_token,
        });
        self.inflight[tid].push_back(slot);
        self.stats.lookups += 1;

        trace!(tid, pc, taken, ?target, ?class, "lookup");

        Ok(Prediction {
            taken,
            target,
            handle: BranchHandle {
                slot,
                generation: self.slots[slot as usize].generation,
            },
        })
    }

    /// Resolves an in-flight branch with its real outcome (terminal COMMIT).
    ///
    /// On a misprediction, every younger in-flight branch on the thread is
    /// squashed first (they fetched down the wrong path), the history
    /// checkpoint is restored, and the actual outcome replaces the
    /// speculative one. All touched tables then train on the real outcome.
    pub fn update(
        &mut self,
        handle: BranchHandle,
        taken: bool,
        target: u64,
    ) -> Result<Resolution, EngineError> {
        let slot = self.resolve(handle)?;
        let info = self.slots[slot as usize]
            .info
            .clone()
            .ok_or(EngineError::UnknownHandle {
                slot: handle.slot,
                generation: handle.generation,
            })?;
        let tid = info.tid;

        let direction_correct = info.pred_taken == taken;
        let target_correct = !taken || info.pred_target == Some(target);
        let mispredicted = !direction_correct || !target_correct;

        let mut squashed_younger = 0;
        if mispredicted {
            let mut oldest_younger_seq = None;
            while let Some(&back) = self.inflight[tid].back() {
                if back == slot {
                    break;
                }
                let _ = self.inflight[tid].pop_back();
                oldest_younger_seq = Some(self.discard(back));
                squashed_younger += 1;
            }
            if !direction_correct {
                // The speculative history bit was wrong: rewind through this
                // branch's own checkpoint and shift in the real outcome.
                self.history.restore(tid, info.seq)?;
                self.history.update(tid, taken, target);
            } else if let Some(seq) = oldest_younger_seq {
                // Direction was right, so this branch's own history bit
                // stands; only the wrong-path branches after it unwind.
                self.history.restore(tid, seq)?;
                self.history.commit(tid, info.seq)?;
            } else {
                self.history.commit(tid, info.seq)?;
            }
            debug!(
                tid,
                pc = info.pc,
                taken,
                target,
                direction_correct,
                squashed_younger,
                "misprediction"
            );
        } else {
            self.history.commit(tid, info.seq)?;
        }

        if let Some(dir_info) = &info.dir_info {
            self.direction.update(tid, info.pc, dir_info, taken);
        }
        if taken {
            self.btb.update(tid, info.pc, target);
        }
        if info.class.is_indirect() && taken {
            if let Some(ind) = &mut self.indirect {
                if let Some(token) = info.indirect_token {
                    ind.update(token, target);
                }
                ind.record_target(tid, target);
            }
        }

        self.stats.commits += 1;
        if info.class.is_conditional() {
            if direction_correct {
                self.stats.direction_correct += 1;
            } else {
                self.stats.direction_mispredicts += 1;
            }
        }
        if !target_correct {
            self.stats.target_mispredicts += 1;
        }
        if let Some(dir_info) = &info.dir_info {
            if matches!(dir_info.provider(), DirectionProvider::Loop) {
                self.stats.loop_overrides += 1;
            }
        }

        self.remove_in_flight(tid, slot);
        self.release(slot);
        self.emit(PredictionEvent {
            thread: tid,
            pc: info.pc,
            kind: EventKind::Committed {
                direction_correct,
                target_correct,
            },
            provider: info
                .dir_info
                .as_ref()
                .map_or(DirectionProvider::Unconditional, DirectionInfo::provider),
        });

        Ok(Resolution {
            direction_correct,
            target_correct,
            squashed_younger,
        })
    }

    /// Discards an in-flight branch as wrong-path speculation (terminal
    /// SQUASH).
    ///
    /// The named branch and every younger in-flight branch on its thread
    /// are rolled back LIFO: RAS checkpoints restore in reverse
    /// chronological order, the named branch's history checkpoint restores
    /// the registers, and no learning table is touched — a squashed
    /// branch's outcome is unknown and must not train the predictors.
    pub fn squash(&mut self, handle: BranchHandle) -> Result<(), EngineError> {
        let slot = self.resolve(handle)?;
        let tid = match &self.slots[slot as usize].info {
            Some(info) => info.tid,
            None => {
                return Err(EngineError::UnknownHandle {
                    slot: handle.slot,
                    generation: handle.generation,
                })
            }
        };

        let seq = loop {
            let Some(&back) = self.inflight[tid].back() else {
                return Err(EngineError::UnknownHandle {
                    slot: handle.slot,
                    generation: handle.generation,
                });
            };
            let _ = self.inflight[tid].pop_back();
            let seq = self.discard(back);
            if back == slot {
                break seq;
            }
        };
        self.history.restore(tid, seq)?;

        trace!(tid, handle = %handle, "squash");
        Ok(())
    }

    /// Externalizes all persistent predictor state.
    ///
    /// Fails while branches are in flight: speculative state is transient
    /// and cannot be meaningfully restored.
    pub fn snapshot(&self) -> Result<EngineState, EngineError> {
        self.ensure_quiescent()?;
        Ok(EngineState {
            btb: self.btb.clone(),
            ras: self.ras.clone(),
            indirect: self.indirect.clone(),
            direction: self.direction.clone(),
            history: self.history.clone(),
        })
    }

    /// Replaces all persistent predictor state from a snapshot.
    ///
    /// The snapshot must come from an identically-configured engine; shape
    /// compatibility is the host's responsibility, as with any generic
    /// state-serialization mechanism.
    pub fn restore_state(&mut self, state: EngineState) -> Result<(), EngineError> {
        self.ensure_quiescent()?;
        self.btb = state.btb;
        self.ras = state.ras;
        self.indirect = state.indirect;
        self.direction = state.direction;
        self.history = state.history;
        Ok(())
    }

    fn ensure_quiescent(&self) -> Result<(), EngineError> {
        let in_flight = self.inflight.iter().map(VecDeque::len).sum::<usize>();
        if in_flight > 0 {
            return Err(EngineError::InFlightState { in_flight });
        }
        Ok(())
    }

    /// Maps a handle to its slot, rejecting stale or foreign handles.
    fn resolve(&self, handle: BranchHandle) -> Result<u32, EngineError> {
        let idx = handle.slot as usize;
        let live = self
            .slots
            .get(idx)
            .is_some_and(|s| s.info.is_some() && s.generation == handle.generation);
        if live {
            Ok(handle.slot)
        } else {
            Err(EngineError::UnknownHandle {
                slot: handle.slot,
                generation: handle.generation,
            })
        }
    }

    fn allocate(&mut self, info: InFlight) -> u32 {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot as usize].info = Some(info);
                slot
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    info: Some(info),
                });
                (self.slots.len() - 1) as u32
            }
        }
    }

    /// Frees a slot after its terminal call, bumping the generation so any
    /// retained handle turns stale.
    fn release(&mut self, slot: u32) {
        let s = &mut self.slots[slot as usize];
        s.info = None;
        s.generation = s.generation.wrapping_add(1);
        self.free.push(slot);
    }

    /// Rolls back and frees one squashed branch, returning its sequence
    /// number. The caller owns the history restore.
    fn discard(&mut self, slot: u32) -> u64 {
        let info = self.slots[slot as usize]
            .info
            .take()
            .unwrap_or_else(|| unreachable!("in-flight queue held a freed slot"));
        if let Some(cp) = info.ras_checkpoint {
            self.ras[info.tid].restore(cp);
        }
        let s = &mut self.slots[slot as usize];
        s.generation = s.generation.wrapping_add(1);
        self.free.push(slot);
        self.stats.squashes += 1;
        self.emit(PredictionEvent {
            thread: info.tid,
            pc: info.pc,
            kind: EventKind::Squashed,
            provider: info
                .dir_info
                .as_ref()
                .map_or(DirectionProvider::Unconditional, DirectionInfo::provider),
        });
        info.seq
    }

    fn remove_in_flight(&mut self, tid: usize, slot: u32) {
        if let Some(pos) = self.inflight[tid].iter().position(|&s| s == slot) {
            let _ = self.inflight[tid].remove(pos);
        }
    }

    fn emit(&mut self, event: PredictionEvent) {
        if let Some(sink) = &mut self.sink {
            sink.record(&event);
        }
    }
}
