//! Branch Target Buffer (BTB).
//!
//! Direct-mapped cache mapping a branch address to its last-seen target, so
//! early pipeline stages can redirect fetch before the instruction is even
//! decoded. Entries carry a truncated tag from the PC bits above the index
//! plus the owning thread id; replacement is last-writer-wins with no aging.

use serde::{Deserialize, Serialize};

/// An entry in the Branch Target Buffer.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
struct BtbEntry {
    /// Tag bits from the PC above the index, truncated to the tag width.
    tag: u64,
    /// Last-seen target address.
    target: u64,
    /// Owning hardware thread.
    tid: usize,
    /// Whether this entry holds data.
    valid: bool,
}

/// Branch Target Buffer structure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Btb {
    table: Vec<BtbEntry>,
    idx_mask: u64,
    tag_mask: u64,
    log_entries: u32,
    inst_shift: u32,
}

impl Btb {
    /// Creates a BTB with `entries` slots (a validated power of two) and
    /// tags of `tag_bits` width taken above `inst_shift` + index bits.
    pub fn new(entries: usize, tag_bits: u32, inst_shift: u32) -> Self {
        Self {
            table: vec![BtbEntry::default(); entries],
            idx_mask: entries as u64 - 1,
            tag_mask: if tag_bits >= 64 {
                u64::MAX
            } else {
                (1u64 << tag_bits) - 1
            },
            log_entries: entries.trailing_zeros(),
            inst_shift,
        }
    }

    fn index(&self, pc: u64) -> usize {
        (((pc >> self.inst_shift) & self.idx_mask) as usize) & (self.table.len() - 1)
    }

    fn tag(&self, pc: u64) -> u64 {
        (pc >> (self.inst_shift + self.log_entries)) & self.tag_mask
    }

    /// Looks up the target for `pc`.
    ///
    /// A miss means no BTB-sourced target is available and the caller falls
    /// back to the sequential PC or another predictor's target.
    pub fn lookup(&self, tid: usize, pc: u64) -> Option<u64> {
        let e = self.table[self.index(pc)];
        if e.valid && e.tid == tid && e.tag == self.tag(pc) {
            Some(e.target)
        } else {
            None
        }
    }

    /// Inserts or overwrites the entry for `pc` with a resolved target.
    pub fn update(&mut self, tid: usize, pc: u64, target: u64) {
        let idx = self.index(pc);
        self.table[idx] = BtbEntry {
            tag: self.tag(pc),
            target,
            tid,
            valid: true,
        };
    }
}
