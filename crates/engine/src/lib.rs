//! Cycle-level branch prediction engine for CPU pipeline simulators.
//!
//! This crate implements a speculative branch prediction engine with the following:
//! 1. **Engine:** `lookup`/`update`/`squash` façade with opaque per-branch
//!    handles, misprediction repair, and LIFO squash cascades.
//! 2. **Direction predictors:** Local, Tournament, BiMode, and TAGE+loop
//!    variants behind one pluggable contract.
//! 3. **Target predictors:** branch target buffer, per-thread return
//!    address stacks, and a path-hashed indirect target cache.
//! 4. **History:** per-thread speculative direction/path registers with a
//!    checkpoint ring for cheap rollback under out-of-order resolution.
//! 5. **Ambient:** serde-based configuration with construction-time
//!    validation, error taxonomy, statistics with a telemetry hook, and
//!    whole-state snapshots.

/// Branch Target Buffer.
pub mod btb;
/// Engine configuration (defaults, per-variant sections, validation).
pub mod config;
/// Saturating counter primitives.
pub mod counter;
/// Direction predictor variants and their shared contract.
pub mod direction;
/// Prediction engine façade (lookup/update/squash).
pub mod engine;
/// Error taxonomy (configuration errors, contract violations, capacity).
pub mod error;
/// Speculative global/path history with checkpoint ring.
pub mod history;
/// Indirect target predictor.
pub mod indirect;
/// Return Address Stack.
pub mod ras;
/// Statistics collection and the telemetry hook.
pub mod stats;

/// Root configuration type; build with `PredictorConfig::default()` or
/// deserialize from host-supplied JSON.
pub use crate::config::PredictorConfig;
/// Main engine type; construct with `PredictionEngine::new`.
pub use crate::engine::{BranchClass, BranchHandle, Prediction, PredictionEngine, Resolution};
/// Error types surfaced by construction and the runtime contract.
pub use crate::error::{ConfigError, EngineError};
