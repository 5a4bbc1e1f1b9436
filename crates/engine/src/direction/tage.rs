//! TAGE (Tagged Geometric History Length) branch predictor with a loop
//! predictor.
//!
//! A bimodal base table backed by `n` tagged tables, each indexed and
//! tagged by a hash of the branch address with a geometrically longer slice
//! of global history. The prediction comes from the longest-history table
//! whose tag matches; a full miss falls back to the base. Two arbitration
//! counters refine the raw scheme:
//! 1. **use-alt-on-NA** — a newly allocated provider entry is still noise;
//!    while this counter votes so, the next-shorter match predicts instead.
//! 2. **with-loop** — the loop predictor tracks branches with a stable
//!    iteration count and overrides the geometric vote once confident.
//!
//! # Performance
//!
//! - **Time Complexity:** `predict()` and `update()` are O(T) in the number
//!   of tagged tables (the periodic usefulness sweep amortizes to O(1)).
//! - **Best Case:** branches correlated with history at any single length.
//! - **Worst Case:** uncorrelated branches, which cost tagged-table
//!   allocations without ever earning usefulness.

use serde::{Deserialize, Serialize};

use super::{DirectionInfo, DirectionLookup, DirectionPredictor};
use crate::config::TageConfig;
use crate::counter::{SatCounter, SignedCounter};
use crate::history::HistoryView;
use crate::stats::DirectionProvider;

/// An entry in a tagged table.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct TaggedEntry {
    /// Hash of address and history; a match is required to vote.
    tag: u16,
    /// Signed prediction counter.
    ctr: SignedCounter,
    /// Usefulness, consulted by the allocation policy.
    useful: SatCounter,
}

/// An entry in the loop predictor table.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct LoopEntry {
    /// Address tag.
    tag: u16,
    /// Taken iterations observed in the current trip.
    count: u16,
    /// Confirmed taken iterations per trip.
    trip: u16,
    /// Confidence that `trip` is stable.
    conf: SatCounter,
    /// Replacement age.
    age: SatCounter,
    /// The direction repeated `trip` times before the exit flips it.
    dir: bool,
}

/// Per-lookup state: every index and tag computed, plus the intermediate
/// votes the update rules need.
#[derive(Clone, Debug)]
pub struct TageInfo {
    /// Index into each tagged table, shortest history first.
    pub indices: Vec<u32>,
    /// Tag computed for each tagged table.
    pub tags: Vec<u16>,
    /// Index into the bimodal base table.
    pub base_index: usize,
    /// Longest-history table that hit, if any.
    pub provider: Option<usize>,
    /// Next-longest table that hit, if any.
    pub alt: Option<usize>,
    /// The provider's vote.
    pub provider_pred: bool,
    /// The alternate vote (next-longest hit, or the base table).
    pub alt_pred: bool,
    /// Whether the provider looked newly allocated (weak counter, zero
    /// usefulness).
    pub provider_weak: bool,
    /// Whether the alternate vote was used instead of the provider's.
    pub used_alt: bool,
    /// The overall TAGE vote, before any loop override.
    pub tage_pred: bool,
    /// Loop table set probed for this branch.
    pub loop_set: usize,
    /// Loop tag computed for this branch.
    pub loop_tag: u16,
    /// Way that tag-matched in the loop set, if any.
    pub loop_way: Option<usize>,
    /// The loop predictor's confident vote, if it had one.
    pub loop_pred: Option<bool>,
    /// Whether the loop vote overrode TAGE.
    pub loop_used: bool,
}

impl TageInfo {
    /// Which structure produced the final vote.
    pub fn provider(&self) -> DirectionProvider {
        if self.loop_used {
            return DirectionProvider::Loop;
        }
        let source = if self.used_alt { self.alt } else { self.provider };
        match source {
            Some(i) => DirectionProvider::TageTable(i as u8),
            None => DirectionProvider::TageBase,
        }
    }
}

/// TAGE predictor structure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TagePredictor {
    /// Bimodal base table, the full-miss fallback.
    base: Vec<SignedCounter>,
    /// Tagged tables, shortest history first.
    tables: Vec<Vec<TaggedEntry>>,
    /// Geometric history length per tagged table.
    hist_lengths: Vec<u32>,
    /// Tag width per tagged table.
    tag_widths: Vec<u32>,
    /// Log2 size per tagged table.
    log_sizes: Vec<u32>,
    base_mask: usize,

    /// Arbitration for newly allocated providers; `>= 0` trusts the
    /// alternate.
    use_alt_on_na: SignedCounter,
    /// Arbitration for the loop override; `>= 0` trusts the loop.
    with_loop: SignedCounter,

    /// Loop predictor, `loop_sets × loop_ways` entries.
    loops: Vec<LoopEntry>,
    loop_sets: usize,
    loop_ways: usize,
    loop_tag_mask: u16,
    loop_iter_mask: u16,

    /// Update counter driving the periodic usefulness sweep.
    tick: u64,
    tick_mask: u64,
    inst_shift: u32,
}

impl TagePredictor {
    /// Creates a predictor from validated configuration.
    ///
    /// History lengths are computed once here as the geometric series
    /// `L(i) = round(min_hist * (max_hist / min_hist)^(i / (n - 1)))`.
    pub fn new(config: &TageConfig, inst_shift: u32) -> Self {
        let n = config.n_history_tables;
        let hist_lengths = geometric_lengths(n, config.min_hist, config.max_hist);

        let tables = config
            .log_table_sizes
            .iter()
            .map(|&log_size| {
                vec![
                    TaggedEntry {
                        tag: 0,
                        ctr: SignedCounter::new(config.tag_ctr_bits),
                        useful: SatCounter::new(config.u_bits),
                    };
                    1 << log_size
                ]
            })
            .collect();

        let loop_ways = 1usize << config.log_loop_assoc;
        let loop_sets = (1usize << config.log_loop_size) / loop_ways;

        Self {
            base: vec![SignedCounter::new(2); 1 << config.log_base_size],
            tables,
            hist_lengths,
            tag_widths: config.tag_widths.clone(),
            log_sizes: config.log_table_sizes.clone(),
            base_mask: (1 << config.log_base_size) - 1,
            use_alt_on_na: SignedCounter::new(config.use_alt_on_na_bits),
            with_loop: SignedCounter::new(config.with_loop_bits),
            loops: vec![
                LoopEntry {
                    tag: 0,
                    count: 0,
                    trip: 0,
                    conf: SatCounter::new(config.loop_conf_bits),
                    age: SatCounter::new(config.loop_age_bits),
                    dir: false,
                };
                loop_sets * loop_ways
            ],
            loop_sets,
            loop_ways,
            loop_tag_mask: ((1u32 << config.loop_tag_bits) - 1) as u16,
            loop_iter_mask: if config.loop_iter_bits >= 16 {
                u16::MAX
            } else {
                ((1u32 << config.loop_iter_bits) - 1) as u16
            },
            tick: 0,
            tick_mask: (1u64 << config.log_u_reset_period) - 1,
            inst_shift,
        }
    }

    /// The geometric history lengths chosen at construction.
    pub fn history_lengths(&self) -> &[u32] {
        &self.hist_lengths
    }

    fn table_index(&self, pc: u64, hist: HistoryView, i: usize) -> u32 {
        let bits = self.log_sizes[i];
        let len = self.hist_lengths[i];
        let shifted = pc >> self.inst_shift;
        let h = fold(hist.ghr, len, bits);
        let p = fold(hist.path, len.min(16), bits);
        ((shifted ^ (shifted >> bits) ^ h ^ (p << 1)) as u32) & ((1u32 << bits) - 1)
    }

    fn table_tag(&self, pc: u64, hist: HistoryView, i: usize) -> u16 {
        let width = self.tag_widths[i];
        let len = self.hist_lengths[i];
        let shifted = pc >> self.inst_shift;
        let h = fold(hist.ghr, len, width);
        let h2 = fold(hist.ghr, len, width.saturating_sub(1));
        ((shifted ^ h ^ (h2 << 1)) as u16) & (((1u32 << width) - 1) as u16)
    }

    fn loop_set(&self, pc: u64) -> usize {
        ((pc >> self.inst_shift) as usize) & (self.loop_sets - 1)
    }

    fn loop_tag(&self, pc: u64) -> u16 {
        let shifted = pc >> self.inst_shift;
        ((shifted >> self.loop_sets.trailing_zeros()) as u16) & self.loop_tag_mask
    }

    /// A confident loop entry votes its learned direction until the trip
    /// count is reached, then votes the exit.
    fn loop_vote(&self, set: usize, way: usize) -> Option<bool> {
        let e = &self.loops[set * self.loop_ways + way];
        if e.conf.value() == e.conf.max() {
            if e.count < e.trip {
                Some(e.dir)
            } else {
                Some(!e.dir)
            }
        } else {
            None
        }
    }

    fn update_loop(&mut self, info: &TageInfo, taken: bool) {
        if let Some(way) = info.loop_way {
            let e = &mut self.loops[info.loop_set * self.loop_ways + way];
            e.age.increment();
            if info.loop_pred.is_some_and(|lp| lp != taken) {
                // A confident entry mispredicted: the learned trip count no
                // longer holds, so drop confidence and relearn it.
                e.conf.reset();
                e.trip = 0;
                e.count = 0;
                e.age.reset();
            } else if taken == e.dir {
                e.count = (e.count + 1) & self.loop_iter_mask;
            } else {
                if e.count == e.trip {
                    // The trip count repeated; grow confidence.
                    e.conf.increment();
                } else {
                    // Iteration count changed; relearn from scratch.
                    e.trip = e.count;
                    e.conf.reset();
                    e.age.reset();
                }
                e.count = 0;
            }
            if let Some(lp) = info.loop_pred {
                if lp != info.tage_pred {
                    self.with_loop.train(lp == taken);
                }
            }
        } else {
            // No entry for this branch: allocate into an aged-out way, or
            // age the whole set while we wait for one.
            let base = info.loop_set * self.loop_ways;
            let set = &mut self.loops[base..base + self.loop_ways];
            if let Some(e) = set.iter_mut().find(|e| e.age.value() == 0) {
                e.tag = info.loop_tag;
                e.count = 0;
                e.trip = 0;
                e.conf.reset();
                e.age.saturate();
                e.dir = taken;
            } else {
                for e in set {
                    e.age.decrement();
                }
            }
        }
    }
}

impl DirectionPredictor for TagePredictor {
    /// Probes all tagged tables; the longest-history tag match provides the
    /// vote, arbitration counters permitting.
    fn predict(&self, _tid: usize, pc: u64, hist: HistoryView) -> DirectionLookup {
        let n = self.tables.len();
        let mut indices = vec![0u32; n];
        let mut tags = vec![0u16; n];
        for i in 0..n {
            indices[i] = self.table_index(pc, hist, i);
            tags[i] = self.table_tag(pc, hist, i);
        }

        let mut provider = None;
        let mut alt = None;
        for i in (0..n).rev() {
            if self.tables[i][indices[i] as usize].tag == tags[i] {
                if provider.is_none() {
                    provider = Some(i);
                } else {
                    alt = Some(i);
                    break;
                }
            }
        }

        let base_index = ((pc >> self.inst_shift) as usize) & self.base_mask;
        let base_pred = self.base[base_index].is_taken();

        let provider_pred = provider
            .map(|i| self.tables[i][indices[i] as usize].ctr.is_taken())
            .unwrap_or(base_pred);
        let alt_pred = alt
            .map(|i| self.tables[i][indices[i] as usize].ctr.is_taken())
            .unwrap_or(base_pred);

        let provider_weak = provider
            .map(|i| {
                let e = &self.tables[i][indices[i] as usize];
                e.ctr.is_weak() && e.useful.value() == 0
            })
            .unwrap_or(false);

        let used_alt = provider.is_some() && provider_weak && self.use_alt_on_na.is_taken();
        let tage_pred = match provider {
            Some(_) if used_alt => alt_pred,
            Some(_) => provider_pred,
            None => base_pred,
        };

        let loop_set = self.loop_set(pc);
        let loop_tag = self.loop_tag(pc);
        let loop_way = (0..self.loop_ways)
            .find(|&w| self.loops[loop_set * self.loop_ways + w].tag == loop_tag);
        let loop_pred = loop_way.and_then(|w| self.loop_vote(loop_set, w));
        let loop_used = loop_pred.is_some() && self.with_loop.is_taken();

        let taken = if loop_used {
            loop_pred.unwrap_or(tage_pred)
        } else {
            tage_pred
        };

        DirectionLookup {
            taken,
            info: DirectionInfo::Tage(Box::new(TageInfo {
                indices,
                tags,
                base_index,
                provider,
                alt,
                provider_pred,
                alt_pred,
                provider_weak,
                used_alt,
                tage_pred,
                loop_set,
                loop_tag,
                loop_way,
                loop_pred,
                loop_used,
            })),
        }
    }

    fn update(&mut self, _tid: usize, _pc: u64, info: &DirectionInfo, taken: bool) {
        let DirectionInfo::Tage(info) = info else {
            return;
        };

        self.tick = self.tick.wrapping_add(1);
        if self.tick & self.tick_mask == 0 {
            // Periodic decay: otherwise long-lived entries hold their slots
            // after the program has moved on.
            for table in &mut self.tables {
                for e in table {
                    e.useful.halve();
                }
            }
        }

        self.update_loop(info, taken);

        // A newly allocated provider that disagreed with the alternate
        // trains the arbitration counter toward whichever was right.
        if info.provider.is_some() && info.provider_weak && info.provider_pred != info.alt_pred {
            self.use_alt_on_na.train(info.alt_pred == taken);
        }

        match info.provider {
            Some(p) => {
                let e = &mut self.tables[p][info.indices[p] as usize];
                e.ctr.train(taken);
                if info.provider_pred != info.alt_pred {
                    if info.provider_pred == taken {
                        e.useful.increment();
                    } else {
                        e.useful.decrement();
                    }
                }
            }
            None => {
                self.base[info.base_index].train(taken);
            }
        }

        // Misprediction: claim an entry in a longer-history table, taking
        // the first with zero usefulness and paying down the others' u bits
        // when none is free.
        if info.tage_pred != taken {
            let start = info.provider.map_or(0, |p| p + 1);
            let n = self.tables.len();
            if start < n {
                let mut allocated = false;
                for i in start..n {
                    let e = &mut self.tables[i][info.indices[i] as usize];
                    if e.useful.value() == 0 {
                        e.tag = info.tags[i];
                        e.ctr.seed(taken);
                        allocated = true;
                        break;
                    }
                }
                if !allocated {
                    for i in start..n {
                        self.tables[i][info.indices[i] as usize].useful.decrement();
                    }
                }
            }
        }
    }
}

/// Computes the geometric series of history lengths.
fn geometric_lengths(n: usize, min_hist: usize, max_hist: usize) -> Vec<u32> {
    if n == 1 {
        return vec![min_hist as u32];
    }
    (0..n)
        .map(|i| {
            let exponent = i as f64 / (n - 1) as f64;
            let len = min_hist as f64 * (max_hist as f64 / min_hist as f64).powf(exponent);
            (len + 0.5) as u32
        })
        .collect()
}

/// Folds the low `len` bits of a history register into `bits` bits by
/// chunked XOR.
fn fold(hist: u64, len: u32, bits: u32) -> u64 {
    if bits == 0 || len == 0 {
        return 0;
    }
    let mut v = if len >= 64 {
        hist
    } else {
        hist & ((1u64 << len) - 1)
    };
    let chunk = (1u64 << bits) - 1;
    let mut folded = 0u64;
    while v != 0 {
        folded ^= v & chunk;
        v >>= bits;
    }
    folded
}
