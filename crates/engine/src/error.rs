//! Error taxonomy for the prediction engine.
//!
//! Three fatal categories exist, all diagnosable and none retryable:
//! 1. **`ConfigError`** — invalid parameter combinations, rejected at
//!    construction rather than deferred into lookup.
//! 2. **`EngineError::UnknownHandle`** — caller-contract violations
//!    (double update/squash, stale or foreign handles). Silently accepting
//!    these would corrupt the history checkpoints, so they are reported.
//! 3. **`EngineError::CheckpointCapacity`** — the caller's pipeline model
//!    carries more in-flight branches than the configured speculation depth.
//!
//! Benign misses (BTB, indirect, TAGE tag miss, empty RAS) are `Option`s in
//! the component APIs, never errors.

use thiserror::Error;

/// A parameter combination rejected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A table size that must be a power of two is not.
    #[error("{field} must be a power of two, got {value}")]
    NotPowerOfTwo {
        /// Offending configuration field.
        field: &'static str,
        /// Rejected value.
        value: usize,
    },

    /// A size or width that must be non-zero is zero.
    #[error("{field} must be non-zero")]
    Zero {
        /// Offending configuration field.
        field: &'static str,
    },

    /// A per-table vector whose length disagrees with the table count.
    #[error("{field} must have {expected} entries, got {actual}")]
    LengthMismatch {
        /// Offending configuration field.
        field: &'static str,
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// A value outside its permitted range.
    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        /// Offending configuration field.
        field: &'static str,
        /// Rejected value.
        value: usize,
        /// Smallest permitted value.
        min: usize,
        /// Largest permitted value.
        max: usize,
    },

    /// The geometric history range is degenerate.
    #[error("min_hist ({min_hist}) must be strictly less than max_hist ({max_hist})")]
    HistoryRange {
        /// Shortest configured history length.
        min_hist: usize,
        /// Longest configured history length.
        max_hist: usize,
    },
}

/// A runtime failure of the engine's call contract or capacity limits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The handle does not name a live in-flight branch: it was already
    /// resolved (possibly by a cascade squash), or never issued.
    #[error("unknown or already-resolved branch handle (slot {slot}, generation {generation})")]
    UnknownHandle {
        /// Arena slot the handle pointed at.
        slot: u32,
        /// Generation the handle carried.
        generation: u32,
    },

    /// More outstanding checkpoints than the configured speculation depth.
    ///
    /// This is a hard simulator limit: the surrounding pipeline model is
    /// keeping more branches in flight than `max_in_flight` allows.
    #[error("thread {thread} exceeded the speculation depth of {capacity} in-flight branches")]
    CheckpointCapacity {
        /// Thread whose checkpoint ring is full.
        thread: usize,
        /// Configured ring capacity.
        capacity: usize,
    },

    /// A history checkpoint that is no longer live (already committed or
    /// discarded by an earlier restore).
    #[error("checkpoint {seq} on thread {thread} is not live")]
    StaleCheckpoint {
        /// Thread whose ring was searched.
        thread: usize,
        /// Sequence number that failed to resolve.
        seq: u64,
    },

    /// A thread id at or beyond the configured `num_threads`.
    #[error("thread {thread} out of range (configured threads: {num_threads})")]
    ThreadOutOfRange {
        /// Rejected thread id.
        thread: usize,
        /// Configured thread count.
        num_threads: usize,
    },

    /// A state snapshot was requested or restored while branches are still
    /// in flight; speculative state is transient and cannot be externalized.
    #[error("cannot snapshot or restore state with {in_flight} branches in flight")]
    InFlightState {
        /// Number of outstanding branches across all threads.
        in_flight: usize,
    },
}
