//! Saturating counters.
//!
//! Every table in the engine votes through a bounded counter that clamps
//! instead of wrapping. Two flavours exist:
//! 1. **`SatCounter`** — unsigned, clamps at `0` and `2^bits - 1`; the vote
//!    is the top half of the range.
//! 2. **`SignedCounter`** — two's-complement, clamps at `-2^(bits-1)` and
//!    `2^(bits-1) - 1`; the vote is `>= 0`. Used by the tagged tables and
//!    the bimodal base, which learn faster around a centred zero.

use serde::{Deserialize, Serialize};

/// Unsigned saturating counter of a configurable bit width.
///
/// Incrementing at the maximum leaves the value unchanged; decrementing at
/// zero leaves it unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatCounter {
    bits: u32,
    value: u32,
}

impl SatCounter {
    /// Creates a counter of `bits` width initialized to zero.
    ///
    /// Widths outside `1..=16` are a configuration error caught by
    /// `PredictorConfig::validate`; this constructor assumes a valid width.
    pub fn new(bits: u32) -> Self {
        Self { bits, value: 0 }
    }

    /// Creates a counter with an explicit initial value, clamped to range.
    pub fn with_initial(bits: u32, value: u32) -> Self {
        let max = (1u32 << bits) - 1;
        Self {
            bits,
            value: value.min(max),
        }
    }

    /// Creates a counter initialized to weakly-not-taken (midpoint minus one).
    ///
    /// A cold 2-bit counter sits at 1, so a single taken outcome flips the
    /// vote — the cold-start used by the direction tables.
    pub fn weakly_not_taken(bits: u32) -> Self {
        Self {
            bits,
            value: (1u32 << (bits - 1)) - 1,
        }
    }

    /// Maximum representable value for this width.
    pub fn max(&self) -> u32 {
        (1u32 << self.bits) - 1
    }

    /// Current raw value.
    pub fn value(&self) -> u32 {
        self.value
    }

    /// The taken/not-taken vote: true when the value is in the top half of
    /// the range.
    pub fn is_taken(&self) -> bool {
        self.value >= (1u32 << (self.bits - 1))
    }

    /// True when the counter sits at either clamp point.
    pub fn is_saturated(&self) -> bool {
        self.value == 0 || self.value == self.max()
    }

    /// Increments toward taken, clamping at the maximum.
    pub fn increment(&mut self) {
        if self.value < self.max() {
            self.value += 1;
        }
    }

    /// Decrements toward not-taken, clamping at zero.
    pub fn decrement(&mut self) {
        if self.value > 0 {
            self.value -= 1;
        }
    }

    /// Moves the counter one step toward the given outcome.
    pub fn train(&mut self, taken: bool) {
        if taken {
            self.increment();
        } else {
            self.decrement();
        }
    }

    /// Resets the counter to zero.
    pub fn reset(&mut self) {
        self.value = 0;
    }

    /// Jumps the counter to its maximum value.
    pub fn saturate(&mut self) {
        self.value = self.max();
    }

    /// Halves the value, the usefulness-ageing primitive of the tagged
    /// tables.
    pub fn halve(&mut self) {
        self.value >>= 1;
    }
}

/// Signed saturating counter of a configurable bit width.
///
/// Clamps at `-2^(bits-1)` and `2^(bits-1) - 1`. The vote convention is
/// `value >= 0` — a freshly-zeroed counter votes taken, matching the
/// allocation policy of the tagged tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCounter {
    bits: u32,
    value: i32,
}

impl SignedCounter {
    /// Creates a counter of `bits` width initialized to zero.
    pub fn new(bits: u32) -> Self {
        Self { bits, value: 0 }
    }

    /// Creates a counter with an explicit initial value, clamped to range.
    pub fn with_initial(bits: u32, value: i32) -> Self {
        let mut c = Self { bits, value: 0 };
        c.value = value.clamp(c.min(), c.max());
        c
    }

    /// Minimum representable value for this width.
    pub fn min(&self) -> i32 {
        -(1i32 << (self.bits - 1))
    }

    /// Maximum representable value for this width.
    pub fn max(&self) -> i32 {
        (1i32 << (self.bits - 1)) - 1
    }

    /// Current raw value.
    pub fn value(&self) -> i32 {
        self.value
    }

    /// The taken/not-taken vote.
    pub fn is_taken(&self) -> bool {
        self.value >= 0
    }

    /// True when the counter holds one of the two weakest values (`0` or
    /// `-1`), the state a newly allocated entry starts in.
    pub fn is_weak(&self) -> bool {
        self.value == 0 || self.value == -1
    }

    /// Increments toward taken, clamping at the maximum.
    pub fn increment(&mut self) {
        if self.value < self.max() {
            self.value += 1;
        }
    }

    /// Decrements toward not-taken, clamping at the minimum.
    pub fn decrement(&mut self) {
        if self.value > self.min() {
            self.value -= 1;
        }
    }

    /// Moves the counter one step toward the given outcome.
    pub fn train(&mut self, taken: bool) {
        if taken {
            self.increment();
        } else {
            self.decrement();
        }
    }

    /// Seeds the counter for a fresh allocation: weakly agreeing with the
    /// observed outcome (`0` for taken, `-1` for not-taken).
    pub fn seed(&mut self, taken: bool) {
        self.value = if taken { 0 } else { -1 };
    }
}
