//! Configuration surface for the prediction engine.
//!
//! This module defines every construction-time parameter. It provides:
//! 1. **Defaults:** baseline sizing constants for all tables and histories.
//! 2. **Structures:** hierarchical config for the shared structures (BTB,
//!    RAS, indirect predictor, history tracker) and per-variant direction
//!    predictor sections.
//! 3. **Validation:** `PredictorConfig::validate`, run by the engine
//!    constructor, which rejects invalid parameter combinations up front.
//!
//! Configuration is supplied as JSON by the host simulator or built with
//! `PredictorConfig::default()`; all parameters are immutable after
//! construction.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default sizing constants for the engine.
///
/// These values define the baseline predictor geometry when not explicitly
/// overridden by the host's configuration.
mod defaults {
    /// Default hardware thread count.
    pub const NUM_THREADS: usize = 1;

    /// Default instruction shift: low PC bits carrying no information
    /// (4-byte instructions).
    pub const INST_SHIFT_AMT: u32 = 2;

    /// Default speculation depth: outstanding checkpoints per thread.
    pub const MAX_IN_FLIGHT: usize = 64;

    /// Default global direction-history width in bits.
    pub const GHR_BITS: u32 = 64;

    /// Default path-history width in bits.
    pub const PATH_BITS: u32 = 16;

    /// Default Branch Target Buffer entry count.
    pub const BTB_ENTRIES: usize = 4096;

    /// Default BTB tag width in bits.
    pub const BTB_TAG_BITS: u32 = 16;

    /// Default Return Address Stack depth.
    pub const RAS_SIZE: usize = 16;

    /// Default indirect-predictor set count.
    pub const INDIRECT_SETS: usize = 256;

    /// Default indirect-predictor associativity.
    pub const INDIRECT_WAYS: usize = 2;

    /// Default indirect-predictor tag width in bits.
    pub const INDIRECT_TAG_BITS: u32 = 16;

    /// Default number of previous indirect targets folded into the
    /// indirect hash.
    pub const INDIRECT_PATH_LENGTH: usize = 3;

    /// Default local predictor table size.
    pub const LOCAL_PREDICTOR_SIZE: usize = 2048;

    /// Default local counter width in bits.
    pub const LOCAL_CTR_BITS: u32 = 2;

    /// Default tournament local history table size.
    pub const LOCAL_HISTORY_TABLE_SIZE: usize = 2048;

    /// Default tournament/bimode global predictor table size.
    pub const GLOBAL_PREDICTOR_SIZE: usize = 8192;

    /// Default global counter width in bits.
    pub const GLOBAL_CTR_BITS: u32 = 2;

    /// Default tournament/bimode choice predictor table size.
    pub const CHOICE_PREDICTOR_SIZE: usize = 8192;

    /// Default choice counter width in bits.
    pub const CHOICE_CTR_BITS: u32 = 2;

    /// Default number of TAGE tagged tables.
    pub const TAGE_HISTORY_TABLES: usize = 12;

    /// Default shortest TAGE history length.
    pub const TAGE_MIN_HIST: usize = 4;

    /// Default longest TAGE history length (bounded by the GHR width).
    pub const TAGE_MAX_HIST: usize = 64;

    /// Default log2 size of the TAGE bimodal base table.
    pub const TAGE_LOG_BASE_SIZE: u32 = 14;

    /// Default TAGE tagged-table counter width in bits.
    pub const TAGE_CTR_BITS: u32 = 3;

    /// Default TAGE usefulness-counter width in bits.
    pub const TAGE_U_BITS: u32 = 2;

    /// Default log2 period (in updates) for ageing all usefulness bits.
    pub const TAGE_LOG_U_RESET_PERIOD: u32 = 19;

    /// Default width of the use-alt-on-newly-allocated counter.
    pub const TAGE_USE_ALT_BITS: u32 = 4;

    /// Default width of the loop-predictor arbitration counter.
    pub const TAGE_WITH_LOOP_BITS: u32 = 7;

    /// Default log2 size of the loop predictor table.
    pub const LOOP_LOG_SIZE: u32 = 8;

    /// Default log2 associativity of the loop predictor.
    pub const LOOP_LOG_ASSOC: u32 = 2;

    /// Default loop-entry confidence width in bits.
    pub const LOOP_CONF_BITS: u32 = 2;

    /// Default loop-entry age width in bits.
    pub const LOOP_AGE_BITS: u32 = 8;

    /// Default loop-entry tag width in bits.
    pub const LOOP_TAG_BITS: u32 = 14;

    /// Default loop-entry iteration-count width in bits.
    pub const LOOP_ITER_BITS: u32 = 14;

    /// Default log2 sizes of the TAGE tagged tables, shortest history first.
    pub fn tage_log_table_sizes() -> Vec<u32> {
        vec![10, 10, 11, 11, 11, 11, 10, 10, 10, 10, 9, 9]
    }

    /// Default TAGE tag widths, shortest history first.
    pub fn tage_tag_widths() -> Vec<u32> {
        vec![7, 7, 8, 8, 9, 10, 11, 12, 12, 13, 14, 15]
    }
}

/// Direction-prediction algorithm selector.
///
/// Chosen once at construction; the engine never inspects the concrete
/// variant afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum DirectionVariant {
    /// Per-address saturating-counter table.
    #[default]
    Local,
    /// Hybrid local/global with a choice selector.
    Tournament,
    /// Taken/not-taken biased global tables selected per address.
    BiMode,
    /// Tagged geometric-history-length tables with a loop predictor.
    #[serde(alias = "TAGE")]
    Tage,
}

/// Root configuration for a prediction engine instance.
///
/// # Examples
///
/// Deserializing from JSON (typical host usage):
///
/// ```
/// use bpred_core::config::{DirectionVariant, PredictorConfig};
///
/// let json = r#"{
///     "num_threads": 2,
///     "btb": { "entries": 1024, "tag_bits": 12 },
///     "ras": { "size": 8 },
///     "variant": "Tournament"
/// }"#;
///
/// let config: PredictorConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.num_threads, 2);
/// assert_eq!(config.btb.entries, 1024);
/// assert_eq!(config.variant, DirectionVariant::Tournament);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Number of hardware threads sharing the engine.
    #[serde(default = "PredictorConfig::default_num_threads")]
    pub num_threads: usize,

    /// Low PC bits carrying no information, shifted off before indexing.
    #[serde(default = "PredictorConfig::default_inst_shift_amt")]
    pub inst_shift_amt: u32,

    /// Maximum outstanding speculative branches per thread.
    #[serde(default = "PredictorConfig::default_max_in_flight")]
    pub max_in_flight: usize,

    /// Global direction-history register width in bits (at most 64).
    #[serde(default = "PredictorConfig::default_ghr_bits")]
    pub ghr_bits: u32,

    /// Path-history register width in bits (at most 64).
    #[serde(default = "PredictorConfig::default_path_bits")]
    pub path_bits: u32,

    /// Branch Target Buffer geometry.
    #[serde(default)]
    pub btb: BtbConfig,

    /// Return Address Stack geometry.
    #[serde(default)]
    pub ras: RasConfig,

    /// Indirect target predictor geometry and hashing flags.
    #[serde(default)]
    pub indirect: IndirectConfig,

    /// Direction predictor variant selector.
    #[serde(default)]
    pub variant: DirectionVariant,

    /// Local predictor parameters.
    #[serde(default)]
    pub local: LocalConfig,

    /// Tournament predictor parameters.
    #[serde(default)]
    pub tournament: TournamentConfig,

    /// BiMode predictor parameters.
    #[serde(default)]
    pub bimode: BiModeConfig,

    /// TAGE + loop predictor parameters.
    #[serde(default)]
    pub tage: TageConfig,
}

impl PredictorConfig {
    fn default_num_threads() -> usize {
        defaults::NUM_THREADS
    }

    fn default_inst_shift_amt() -> u32 {
        defaults::INST_SHIFT_AMT
    }

    fn default_max_in_flight() -> usize {
        defaults::MAX_IN_FLIGHT
    }

    fn default_ghr_bits() -> u32 {
        defaults::GHR_BITS
    }

    fn default_path_bits() -> u32 {
        defaults::PATH_BITS
    }

    /// Checks every parameter combination, returning the first violation.
    ///
    /// Run by `PredictionEngine::new`; a failed validation is fatal and the
    /// engine is never constructed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_threads == 0 {
            return Err(ConfigError::Zero {
                field: "num_threads",
            });
        }
        if self.max_in_flight == 0 {
            return Err(ConfigError::Zero {
                field: "max_in_flight",
            });
        }
        range(self.inst_shift_amt as usize, "inst_shift_amt", 0, 4)?;
        range(self.ghr_bits as usize, "ghr_bits", 1, 64)?;
        range(self.path_bits as usize, "path_bits", 1, 64)?;

        power_of_two(self.btb.entries, "btb.entries")?;
        range(self.btb.tag_bits as usize, "btb.tag_bits", 1, 48)?;
        if self.ras.size == 0 {
            return Err(ConfigError::Zero { field: "ras.size" });
        }

        if self.indirect.enabled {
            power_of_two(self.indirect.sets, "indirect.sets")?;
            range(self.indirect.ways, "indirect.ways", 1, 64)?;
            range(self.indirect.tag_bits as usize, "indirect.tag_bits", 1, 48)?;
            range(self.indirect.path_length, "indirect.path_length", 0, 16)?;
        }

        match self.variant {
            DirectionVariant::Local => self.local.validate(),
            DirectionVariant::Tournament => self.tournament.validate(),
            DirectionVariant::BiMode => self.bimode.validate(),
            DirectionVariant::Tage => self.tage.validate(self.ghr_bits),
        }
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            num_threads: defaults::NUM_THREADS,
            inst_shift_amt: defaults::INST_SHIFT_AMT,
            max_in_flight: defaults::MAX_IN_FLIGHT,
            ghr_bits: defaults::GHR_BITS,
            path_bits: defaults::PATH_BITS,
            btb: BtbConfig::default(),
            ras: RasConfig::default(),
            indirect: IndirectConfig::default(),
            variant: DirectionVariant::default(),
            local: LocalConfig::default(),
            tournament: TournamentConfig::default(),
            bimode: BiModeConfig::default(),
            tage: TageConfig::default(),
        }
    }
}

/// Branch Target Buffer geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BtbConfig {
    /// Number of entries; must be a power of two.
    #[serde(default = "BtbConfig::default_entries")]
    pub entries: usize,

    /// Tag width in bits, taken from the PC above the index bits.
    #[serde(default = "BtbConfig::default_tag_bits")]
    pub tag_bits: u32,
}

impl BtbConfig {
    fn default_entries() -> usize {
        defaults::BTB_ENTRIES
    }

    fn default_tag_bits() -> u32 {
        defaults::BTB_TAG_BITS
    }
}

impl Default for BtbConfig {
    fn default() -> Self {
        Self {
            entries: defaults::BTB_ENTRIES,
            tag_bits: defaults::BTB_TAG_BITS,
        }
    }
}

/// Return Address Stack geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RasConfig {
    /// Stack depth per thread.
    #[serde(default = "RasConfig::default_size")]
    pub size: usize,
}

impl RasConfig {
    fn default_size() -> usize {
        defaults::RAS_SIZE
    }
}

impl Default for RasConfig {
    fn default() -> Self {
        Self {
            size: defaults::RAS_SIZE,
        }
    }
}

/// Indirect target predictor geometry and hashing flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndirectConfig {
    /// Whether the indirect predictor is present at all.
    #[serde(default = "IndirectConfig::default_enabled")]
    pub enabled: bool,

    /// Fold the global direction history into the hash.
    #[serde(default = "IndirectConfig::default_hash_ghr")]
    pub hash_ghr: bool,

    /// Fold recent committed indirect targets into the hash.
    #[serde(default = "IndirectConfig::default_hash_targets")]
    pub hash_targets: bool,

    /// Set count; must be a power of two.
    #[serde(default = "IndirectConfig::default_sets")]
    pub sets: usize,

    /// Ways per set.
    #[serde(default = "IndirectConfig::default_ways")]
    pub ways: usize,

    /// Tag width in bits.
    #[serde(default = "IndirectConfig::default_tag_bits")]
    pub tag_bits: u32,

    /// How many previous indirect targets feed the path hash.
    #[serde(default = "IndirectConfig::default_path_length")]
    pub path_length: usize,
}

impl IndirectConfig {
    fn default_enabled() -> bool {
        true
    }

    fn default_hash_ghr() -> bool {
        true
    }

    fn default_hash_targets() -> bool {
        true
    }

    fn default_sets() -> usize {
        defaults::INDIRECT_SETS
    }

    fn default_ways() -> usize {
        defaults::INDIRECT_WAYS
    }

    fn default_tag_bits() -> u32 {
        defaults::INDIRECT_TAG_BITS
    }

    fn default_path_length() -> usize {
        defaults::INDIRECT_PATH_LENGTH
    }
}

impl Default for IndirectConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hash_ghr: true,
            hash_targets: true,
            sets: defaults::INDIRECT_SETS,
            ways: defaults::INDIRECT_WAYS,
            tag_bits: defaults::INDIRECT_TAG_BITS,
            path_length: defaults::INDIRECT_PATH_LENGTH,
        }
    }
}

/// Local predictor parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    /// Counter table size; must be a power of two.
    #[serde(default = "LocalConfig::default_predictor_size")]
    pub predictor_size: usize,

    /// Counter width in bits.
    #[serde(default = "LocalConfig::default_ctr_bits")]
    pub ctr_bits: u32,
}

impl LocalConfig {
    fn default_predictor_size() -> usize {
        defaults::LOCAL_PREDICTOR_SIZE
    }

    fn default_ctr_bits() -> u32 {
        defaults::LOCAL_CTR_BITS
    }

    fn validate(&self) -> Result<(), ConfigError> {
        power_of_two(self.predictor_size, "local.predictor_size")?;
        range(self.ctr_bits as usize, "local.ctr_bits", 1, 8)
    }
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            predictor_size: defaults::LOCAL_PREDICTOR_SIZE,
            ctr_bits: defaults::LOCAL_CTR_BITS,
        }
    }
}

/// Tournament predictor parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Local counter table size; must be a power of two.
    #[serde(default = "TournamentConfig::default_local_predictor_size")]
    pub local_predictor_size: usize,

    /// Local counter width in bits.
    #[serde(default = "TournamentConfig::default_local_ctr_bits")]
    pub local_ctr_bits: u32,

    /// Per-address local history table size; must be a power of two.
    #[serde(default = "TournamentConfig::default_local_history_table_size")]
    pub local_history_table_size: usize,

    /// Global counter table size; must be a power of two.
    #[serde(default = "TournamentConfig::default_global_predictor_size")]
    pub global_predictor_size: usize,

    /// Global counter width in bits.
    #[serde(default = "TournamentConfig::default_global_ctr_bits")]
    pub global_ctr_bits: u32,

    /// Choice table size; must be a power of two.
    #[serde(default = "TournamentConfig::default_choice_predictor_size")]
    pub choice_predictor_size: usize,

    /// Choice counter width in bits.
    #[serde(default = "TournamentConfig::default_choice_ctr_bits")]
    pub choice_ctr_bits: u32,
}

impl TournamentConfig {
    fn default_local_predictor_size() -> usize {
        defaults::LOCAL_PREDICTOR_SIZE
    }

    fn default_local_ctr_bits() -> u32 {
        defaults::LOCAL_CTR_BITS
    }

    fn default_local_history_table_size() -> usize {
        defaults::LOCAL_HISTORY_TABLE_SIZE
    }

    fn default_global_predictor_size() -> usize {
        defaults::GLOBAL_PREDICTOR_SIZE
    }

    fn default_global_ctr_bits() -> u32 {
        defaults::GLOBAL_CTR_BITS
    }

    fn default_choice_predictor_size() -> usize {
        defaults::CHOICE_PREDICTOR_SIZE
    }

    fn default_choice_ctr_bits() -> u32 {
        defaults::CHOICE_CTR_BITS
    }

    fn validate(&self) -> Result<(), ConfigError> {
        power_of_two(self.local_predictor_size, "tournament.local_predictor_size")?;
        power_of_two(
            self.local_history_table_size,
            "tournament.local_history_table_size",
        )?;
        power_of_two(
            self.global_predictor_size,
            "tournament.global_predictor_size",
        )?;
        power_of_two(
            self.choice_predictor_size,
            "tournament.choice_predictor_size",
        )?;
        range(self.local_ctr_bits as usize, "tournament.local_ctr_bits", 1, 8)?;
        range(
            self.global_ctr_bits as usize,
            "tournament.global_ctr_bits",
            1,
            8,
        )?;
        range(
            self.choice_ctr_bits as usize,
            "tournament.choice_ctr_bits",
            1,
            8,
        )
    }
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            local_predictor_size: defaults::LOCAL_PREDICTOR_SIZE,
            local_ctr_bits: defaults::LOCAL_CTR_BITS,
            local_history_table_size: defaults::LOCAL_HISTORY_TABLE_SIZE,
            global_predictor_size: defaults::GLOBAL_PREDICTOR_SIZE,
            global_ctr_bits: defaults::GLOBAL_CTR_BITS,
            choice_predictor_size: defaults::CHOICE_PREDICTOR_SIZE,
            choice_ctr_bits: defaults::CHOICE_CTR_BITS,
        }
    }
}

/// BiMode predictor parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiModeConfig {
    /// Size of each biased global table; must be a power of two.
    #[serde(default = "BiModeConfig::default_global_predictor_size")]
    pub global_predictor_size: usize,

    /// Global counter width in bits.
    #[serde(default = "BiModeConfig::default_global_ctr_bits")]
    pub global_ctr_bits: u32,

    /// Choice table size; must be a power of two.
    #[serde(default = "BiModeConfig::default_choice_predictor_size")]
    pub choice_predictor_size: usize,

    /// Choice counter width in bits.
    #[serde(default = "BiModeConfig::default_choice_ctr_bits")]
    pub choice_ctr_bits: u32,
}

impl BiModeConfig {
    fn default_global_predictor_size() -> usize {
        defaults::GLOBAL_PREDICTOR_SIZE
    }

    fn default_global_ctr_bits() -> u32 {
        defaults::GLOBAL_CTR_BITS
    }

    fn default_choice_predictor_size() -> usize {
        defaults::CHOICE_PREDICTOR_SIZE
    }

    fn default_choice_ctr_bits() -> u32 {
        defaults::CHOICE_CTR_BITS
    }

    fn validate(&self) -> Result<(), ConfigError> {
        power_of_two(self.global_predictor_size, "bimode.global_predictor_size")?;
        power_of_two(self.choice_predictor_size, "bimode.choice_predictor_size")?;
        range(self.global_ctr_bits as usize, "bimode.global_ctr_bits", 1, 8)?;
        range(self.choice_ctr_bits as usize, "bimode.choice_ctr_bits", 1, 8)
    }
}

impl Default for BiModeConfig {
    fn default() -> Self {
        Self {
            global_predictor_size: defaults::GLOBAL_PREDICTOR_SIZE,
            global_ctr_bits: defaults::GLOBAL_CTR_BITS,
            choice_predictor_size: defaults::CHOICE_PREDICTOR_SIZE,
            choice_ctr_bits: defaults::CHOICE_CTR_BITS,
        }
    }
}

/// TAGE + loop predictor parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TageConfig {
    /// Number of tagged history tables.
    #[serde(default = "TageConfig::default_n_history_tables")]
    pub n_history_tables: usize,

    /// Shortest history length of the geometric series.
    #[serde(default = "TageConfig::default_min_hist")]
    pub min_hist: usize,

    /// Longest history length of the geometric series.
    #[serde(default = "TageConfig::default_max_hist")]
    pub max_hist: usize,

    /// Log2 size of the bimodal base table.
    #[serde(default = "TageConfig::default_log_base_size")]
    pub log_base_size: u32,

    /// Log2 sizes of the tagged tables, shortest history first.
    #[serde(default = "TageConfig::default_log_table_sizes")]
    pub log_table_sizes: Vec<u32>,

    /// Tag widths of the tagged tables, shortest history first.
    #[serde(default = "TageConfig::default_tag_widths")]
    pub tag_widths: Vec<u32>,

    /// Tagged-table counter width in bits.
    #[serde(default = "TageConfig::default_tag_ctr_bits")]
    pub tag_ctr_bits: u32,

    /// Usefulness counter width in bits.
    #[serde(default = "TageConfig::default_u_bits")]
    pub u_bits: u32,

    /// Log2 period (in updates) between usefulness-ageing sweeps.
    #[serde(default = "TageConfig::default_log_u_reset_period")]
    pub log_u_reset_period: u32,

    /// Width of the use-alt-on-newly-allocated arbitration counter.
    #[serde(default = "TageConfig::default_use_alt_on_na_bits")]
    pub use_alt_on_na_bits: u32,

    /// Width of the loop-predictor arbitration counter.
    #[serde(default = "TageConfig::default_with_loop_bits")]
    pub with_loop_bits: u32,

    /// Log2 size of the loop predictor table.
    #[serde(default = "TageConfig::default_log_loop_size")]
    pub log_loop_size: u32,

    /// Log2 associativity of the loop predictor.
    #[serde(default = "TageConfig::default_log_loop_assoc")]
    pub log_loop_assoc: u32,

    /// Loop-entry confidence width in bits.
    #[serde(default = "TageConfig::default_loop_conf_bits")]
    pub loop_conf_bits: u32,

    /// Loop-entry age width in bits.
    #[serde(default = "TageConfig::default_loop_age_bits")]
    pub loop_age_bits: u32,

    /// Loop-entry tag width in bits.
    #[serde(default = "TageConfig::default_loop_tag_bits")]
    pub loop_tag_bits: u32,

    /// Loop-entry iteration-count width in bits.
    #[serde(default = "TageConfig::default_loop_iter_bits")]
    pub loop_iter_bits: u32,
}

impl TageConfig {
    fn default_n_history_tables() -> usize {
        defaults::TAGE_HISTORY_TABLES
    }

    fn default_min_hist() -> usize {
        defaults::TAGE_MIN_HIST
    }

    fn default_max_hist() -> usize {
        defaults::TAGE_MAX_HIST
    }

    fn default_log_base_size() -> u32 {
        defaults::TAGE_LOG_BASE_SIZE
    }

    fn default_log_table_sizes() -> Vec<u32> {
        defaults::tage_log_table_sizes()
    }

    fn default_tag_widths() -> Vec<u32> {
        defaults::tage_tag_widths()
    }

    fn default_tag_ctr_bits() -> u32 {
        defaults::TAGE_CTR_BITS
    }

    fn default_u_bits() -> u32 {
        defaults::TAGE_U_BITS
    }

    fn default_log_u_reset_period() -> u32 {
        defaults::TAGE_LOG_U_RESET_PERIOD
    }

    fn default_use_alt_on_na_bits() -> u32 {
        defaults::TAGE_USE_ALT_BITS
    }

    fn default_with_loop_bits() -> u32 {
        defaults::TAGE_WITH_LOOP_BITS
    }

    fn default_log_loop_size() -> u32 {
        defaults::LOOP_LOG_SIZE
    }

    fn default_log_loop_assoc() -> u32 {
        defaults::LOOP_LOG_ASSOC
    }

    fn default_loop_conf_bits() -> u32 {
        defaults::LOOP_CONF_BITS
    }

    fn default_loop_age_bits() -> u32 {
        defaults::LOOP_AGE_BITS
    }

    fn default_loop_tag_bits() -> u32 {
        defaults::LOOP_TAG_BITS
    }

    fn default_loop_iter_bits() -> u32 {
        defaults::LOOP_ITER_BITS
    }

    fn validate(&self, ghr_bits: u32) -> Result<(), ConfigError> {
        if self.n_history_tables == 0 {
            return Err(ConfigError::Zero {
                field: "tage.n_history_tables",
            });
        }
        if self.log_table_sizes.len() != self.n_history_tables {
            return Err(ConfigError::LengthMismatch {
                field: "tage.log_table_sizes",
                expected: self.n_history_tables,
                actual: self.log_table_sizes.len(),
            });
        }
        if self.tag_widths.len() != self.n_history_tables {
            return Err(ConfigError::LengthMismatch {
                field: "tage.tag_widths",
                expected: self.n_history_tables,
                actual: self.tag_widths.len(),
            });
        }
        if self.min_hist == 0 {
            return Err(ConfigError::Zero {
                field: "tage.min_hist",
            });
        }
        if self.min_hist >= self.max_hist {
            return Err(ConfigError::HistoryRange {
                min_hist: self.min_hist,
                max_hist: self.max_hist,
            });
        }
        range(self.max_hist, "tage.max_hist", 2, ghr_bits as usize)?;
        range(self.log_base_size as usize, "tage.log_base_size", 1, 24)?;
        for &log_size in &self.log_table_sizes {
            range(log_size as usize, "tage.log_table_sizes[i]", 1, 24)?;
        }
        for &width in &self.tag_widths {
            range(width as usize, "tage.tag_widths[i]", 1, 16)?;
        }
        range(self.tag_ctr_bits as usize, "tage.tag_ctr_bits", 2, 8)?;
        range(self.u_bits as usize, "tage.u_bits", 1, 8)?;
        range(
            self.log_u_reset_period as usize,
            "tage.log_u_reset_period",
            1,
            30,
        )?;
        range(
            self.use_alt_on_na_bits as usize,
            "tage.use_alt_on_na_bits",
            1,
            8,
        )?;
        range(self.with_loop_bits as usize, "tage.with_loop_bits", 1, 8)?;
        range(self.log_loop_size as usize, "tage.log_loop_size", 1, 16)?;
        if self.log_loop_assoc > self.log_loop_size {
            return Err(ConfigError::OutOfRange {
                field: "tage.log_loop_assoc",
                value: self.log_loop_assoc as usize,
                min: 0,
                max: self.log_loop_size as usize,
            });
        }
        range(self.loop_conf_bits as usize, "tage.loop_conf_bits", 1, 8)?;
        range(self.loop_age_bits as usize, "tage.loop_age_bits", 1, 8)?;
        range(self.loop_tag_bits as usize, "tage.loop_tag_bits", 1, 16)?;
        range(self.loop_iter_bits as usize, "tage.loop_iter_bits", 1, 16)
    }
}

impl Default for TageConfig {
    fn default() -> Self {
        Self {
            n_history_tables: defaults::TAGE_HISTORY_TABLES,
            min_hist: defaults::TAGE_MIN_HIST,
            max_hist: defaults::TAGE_MAX_HIST,
            log_base_size: defaults::TAGE_LOG_BASE_SIZE,
            log_table_sizes: defaults::tage_log_table_sizes(),
            tag_widths: defaults::tage_tag_widths(),
            tag_ctr_bits: defaults::TAGE_CTR_BITS,
            u_bits: defaults::TAGE_U_BITS,
            log_u_reset_period: defaults::TAGE_LOG_U_RESET_PERIOD,
            use_alt_on_na_bits: defaults::TAGE_USE_ALT_BITS,
            with_loop_bits: defaults::TAGE_WITH_LOOP_BITS,
            log_loop_size: defaults::LOOP_LOG_SIZE,
            log_loop_assoc: defaults::LOOP_LOG_ASSOC,
            loop_conf_bits: defaults::LOOP_CONF_BITS,
            loop_age_bits: defaults::LOOP_AGE_BITS,
            loop_tag_bits: defaults::LOOP_TAG_BITS,
            loop_iter_bits: defaults::LOOP_ITER_BITS,
        }
    }
}

fn power_of_two(value: usize, field: &'static str) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::Zero { field });
    }
    if !value.is_power_of_two() {
        return Err(ConfigError::NotPowerOfTwo { field, value });
    }
    Ok(())
}

fn range(value: usize, field: &'static str, min: usize, max: usize) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}
