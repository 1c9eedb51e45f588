//! Scoring model for pairwise alignment
//!
//! Holds the alphabet, the dense substitution table, affine gap costs,
//! end-free flags, the local/global mode switch and the tie-break policy.
//! The substitution table is indexed directly by raw byte values so the
//! DP inner loop stays branch-free.

use crate::error::{AlignError, Result};

/// Default nucleotide alphabet: the four canonical bases plus the IUPAC
/// ambiguity codes. Validation is case-insensitive.
pub const IUPAC_NUCL_ALPHABET: &[u8] = b"ACGTRYSWKMBDHVN";

/// Sentinel for infeasible DP states. Half of `i32::MIN` so that adding
/// further gap penalties cannot wrap around.
pub const NEG_INF: i32 = i32::MIN / 2;

/// Policy applied whenever two or more DP moves tie.
///
/// The winner is selected scanning diagonal, then horizontal, then
/// vertical. `PreferLaterGap` lets an equal later candidate displace the
/// incumbent; `PreferEarlierGap` keeps the first one seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    #[default]
    PreferEarlierGap,
    PreferLaterGap,
}

/// Which leading/trailing end gaps are free of penalty.
///
/// `a_leading` waives the cost of a gap run in sequence A at the start of
/// the alignment (i.e. an unaligned B prefix), and so on. Used for
/// semi-global alignment where one sequence is expected to overlap or be
/// contained in the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EndFree {
    pub a_leading: bool,
    pub a_trailing: bool,
    pub b_leading: bool,
    pub b_trailing: bool,
}

impl EndFree {
    pub const NONE: EndFree = EndFree {
        a_leading: false,
        a_trailing: false,
        b_leading: false,
        b_trailing: false,
    };

    pub const ALL: EndFree = EndFree {
        a_leading: true,
        a_trailing: true,
        b_leading: true,
        b_trailing: true,
    };
}

/// Scoring model: alphabet, substitution table, gap costs and mode flags.
///
/// Mutating any of the four cost fields invalidates the substitution
/// table; `run()` refuses to start until it is rebuilt (or an explicit
/// matrix is installed).
#[derive(Debug, Clone)]
pub struct ScoringModel {
    alphabet: Vec<u8>,
    /// Dense 256x256 table indexed by `(a << 8) | b`.
    table: Vec<i32>,
    table_valid: bool,
    match_weight: i32,
    mismatch_weight: i32,
    gap_open: i32,
    gap_extend: i32,
    end_free: EndFree,
    local: bool,
    tie_break: TieBreak,
}

impl Default for ScoringModel {
    fn default() -> Self {
        let mut model = Self {
            alphabet: IUPAC_NUCL_ALPHABET.to_vec(),
            table: Vec::new(),
            table_valid: false,
            match_weight: 1,
            mismatch_weight: -1,
            gap_open: -2,
            gap_extend: -1,
            end_free: EndFree::NONE,
            local: false,
            tie_break: TieBreak::default(),
        };
        model.rebuild_table();
        model
    }
}

impl ScoringModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the match weight. Invalidates the substitution table.
    pub fn set_match_weight(&mut self, weight: i32) {
        self.match_weight = weight;
        self.table_valid = false;
    }

    /// Set the mismatch weight. Invalidates the substitution table.
    pub fn set_mismatch_weight(&mut self, weight: i32) {
        self.mismatch_weight = weight;
        self.table_valid = false;
    }

    /// Set the gap-open weight (non-positive by convention).
    /// Invalidates the substitution table.
    pub fn set_gap_open(&mut self, weight: i32) {
        self.gap_open = weight;
        self.table_valid = false;
    }

    /// Set the gap-extend weight (non-positive by convention).
    /// Invalidates the substitution table.
    pub fn set_gap_extend(&mut self, weight: i32) {
        self.gap_extend = weight;
        self.table_valid = false;
    }

    /// Rebuild the default IUPAC nucleotide table from the current
    /// match/mismatch weights: only case-insensitive identity pairs of
    /// the four canonical bases score the match weight; every other byte
    /// pair, ambiguity codes included, scores the mismatch weight.
    pub fn rebuild_table(&mut self) {
        let mut table = vec![self.mismatch_weight; 256 * 256];
        for &base in b"ACGT" {
            for a in [base, base.to_ascii_lowercase()] {
                for b in [base, base.to_ascii_lowercase()] {
                    table[(a as usize) << 8 | b as usize] = self.match_weight;
                }
            }
        }
        self.table = table;
        self.table_valid = true;
    }

    /// Install an explicit substitution table (256x256, indexed by
    /// `(a << 8) | b`). Marks the table valid.
    pub fn set_substitution_table(&mut self, table: Vec<i32>) -> Result<()> {
        if table.len() != 256 * 256 {
            return Err(AlignError::BadParameter(format!(
                "substitution table must have 65536 entries, got {}",
                table.len()
            )));
        }
        self.table = table;
        self.table_valid = true;
        Ok(())
    }

    /// Set the four end-free flags.
    ///
    /// Fails in local mode, where all four flags are forced true.
    pub fn set_end_free(&mut self, end_free: EndFree) -> Result<()> {
        if self.local && end_free != EndFree::ALL {
            return Err(AlignError::BadParameter(
                "local mode requires all end gaps free".into(),
            ));
        }
        self.end_free = end_free;
        Ok(())
    }

    /// Switch between local (Smith-Waterman) and global alignment.
    ///
    /// Enabling local mode forces all four end-free flags true: local
    /// alignment is fully-free-ended alignment with an additional zero
    /// floor.
    pub fn set_local(&mut self, local: bool) {
        self.local = local;
        if local {
            self.end_free = EndFree::ALL;
        }
    }

    pub fn set_tie_break(&mut self, tie_break: TieBreak) {
        self.tie_break = tie_break;
    }

    /// Validate a sequence against the alphabet (case-insensitive).
    /// Returns the index of the first disallowed byte, or `None` if every
    /// byte is allowed.
    pub fn first_invalid(&self, seq: &[u8]) -> Option<usize> {
        seq.iter()
            .position(|&b| !self.alphabet.contains(&b.to_ascii_uppercase()))
    }

    /// Validate a sequence, surfacing `InvalidCharacter` on failure.
    pub fn validate(&self, seq: &[u8]) -> Result<()> {
        match self.first_invalid(seq) {
            Some(index) => Err(AlignError::InvalidCharacter {
                index,
                byte: seq[index],
            }),
            None => Ok(()),
        }
    }

    /// Substitution score for a residue pair.
    #[inline(always)]
    pub fn substitution(&self, a: u8, b: u8) -> i32 {
        self.table[(a as usize) << 8 | b as usize]
    }

    pub fn alphabet(&self) -> &[u8] {
        &self.alphabet
    }

    pub fn table_valid(&self) -> bool {
        self.table_valid
    }

    pub fn match_weight(&self) -> i32 {
        self.match_weight
    }

    pub fn mismatch_weight(&self) -> i32 {
        self.mismatch_weight
    }

    pub fn gap_open(&self) -> i32 {
        self.gap_open
    }

    pub fn gap_extend(&self) -> i32 {
        self.gap_extend
    }

    pub fn end_free(&self) -> EndFree {
        self.end_free
    }

    pub fn is_local(&self) -> bool {
        self.local
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }
}
