//! Alignment transcript
//!
//! The decoded, oldest-operation-first sequence of edit operations, plus
//! the score recomputation that serves as the single source of truth for
//! "what does this transcript cost". The recomputation is used both as a
//! post-decode consistency check and as the official score when segments
//! are concatenated, because guide regions are never scored by the DP
//! engine.

use crate::error::{AlignError, Result};
use crate::scoring::{EndFree, ScoringModel};

/// One edit operation of an alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    /// Identical residues aligned (diagonal move).
    Match,
    /// Different residues aligned (diagonal move).
    Mismatch,
    /// Gap in A consuming one B residue.
    Ins,
    /// Gap in B consuming one A residue.
    Del,
}

impl EditOp {
    /// One-character rendering: M, R, I, D.
    pub fn symbol(self) -> char {
        match self {
            EditOp::Match => 'M',
            EditOp::Mismatch => 'R',
            EditOp::Ins => 'I',
            EditOp::Del => 'D',
        }
    }
}

/// Counts derived from a transcript.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranscriptStats {
    pub matches: usize,
    pub mismatches: usize,
    pub gap_opens: usize,
    pub gap_letters: usize,
    pub alignment_len: usize,
}

impl TranscriptStats {
    /// Percent identity over alignment columns.
    pub fn identity(&self) -> f64 {
        if self.alignment_len == 0 {
            return 0.0;
        }
        100.0 * self.matches as f64 / self.alignment_len as f64
    }
}

/// An ordered edit script, oldest operation first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    ops: Vec<EditOp>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ops(ops: Vec<EditOp>) -> Self {
        Self { ops }
    }

    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn push(&mut self, op: EditOp) {
        self.ops.push(op);
    }

    /// Append a run of `len` matches (used for assumed-exact guide
    /// regions, which are never re-verified at schedule time).
    pub fn push_match_run(&mut self, len: usize) {
        self.ops.extend(std::iter::repeat(EditOp::Match).take(len));
    }

    /// Append another transcript (segment concatenation).
    pub fn append(&mut self, other: &Transcript) {
        self.ops.extend_from_slice(&other.ops);
    }

    /// Number of A residues consumed by this transcript.
    pub fn a_len(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, EditOp::Match | EditOp::Mismatch | EditOp::Del))
            .count()
    }

    /// Number of B residues consumed by this transcript.
    pub fn b_len(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, EditOp::Match | EditOp::Mismatch | EditOp::Ins))
            .count()
    }

    /// Compute counts in a single pass.
    pub fn stats(&self) -> TranscriptStats {
        let mut stats = TranscriptStats::default();
        let mut prev: Option<EditOp> = None;
        for &op in &self.ops {
            match op {
                EditOp::Match => stats.matches += 1,
                EditOp::Mismatch => stats.mismatches += 1,
                EditOp::Ins => {
                    if prev != Some(EditOp::Ins) {
                        stats.gap_opens += 1;
                    }
                    stats.gap_letters += 1;
                }
                EditOp::Del => {
                    if prev != Some(EditOp::Del) {
                        stats.gap_opens += 1;
                    }
                    stats.gap_letters += 1;
                }
            }
            prev = Some(op);
        }
        stats.alignment_len = self.ops.len();
        stats
    }

    /// Compact one-character-per-operation string from the stored
    /// operations.
    pub fn render(&self) -> String {
        self.ops.iter().map(|op| op.symbol()).collect()
    }

    /// Compact rendering with diagonal operations re-resolved against the
    /// live sequences. A transcript may have been produced independently
    /// of sequence identity (e.g. reconstructed), so the stored
    /// match/mismatch distinction is not trusted here.
    pub fn render_resolved(&self, a: &[u8], b: &[u8], a_offset: usize, b_offset: usize) -> String {
        let mut out = String::with_capacity(self.ops.len());
        let mut i = a_offset;
        let mut j = b_offset;
        for &op in &self.ops {
            match op {
                EditOp::Match | EditOp::Mismatch => {
                    let same = i < a.len()
                        && j < b.len()
                        && a[i].eq_ignore_ascii_case(&b[j]);
                    out.push(if same { 'M' } else { 'R' });
                    i += 1;
                    j += 1;
                }
                EditOp::Ins => {
                    out.push('I');
                    j += 1;
                }
                EditOp::Del => {
                    out.push('D');
                    i += 1;
                }
            }
        }
        out
    }
}

/// Recompute the score of a transcript from the scoring model and the
/// live sequences, independent of any DP grid.
///
/// Substitution and affine gap costs are summed exactly as the DP engine
/// charges them; then the waived cost of any leading/trailing gap run
/// whose end-free flag is set is subtracted back out. `end_free` is
/// passed explicitly because a sub-problem's flags differ from the
/// caller's (interior sub-problem boundaries are never free). Local-mode
/// transcripts carry no end gaps, so callers pass `EndFree::NONE` there.
pub fn score_from_transcript(
    model: &ScoringModel,
    a: &[u8],
    b: &[u8],
    a_offset: usize,
    b_offset: usize,
    end_free: EndFree,
    transcript: &Transcript,
) -> Result<i32> {
    let ops = transcript.ops();
    let mut i = a_offset;
    let mut j = b_offset;
    let mut total: i64 = 0;
    let mut prev: Option<EditOp> = None;

    for &op in ops {
        match op {
            EditOp::Match | EditOp::Mismatch => {
                if i >= a.len() || j >= b.len() {
                    return Err(AlignError::BadParameter(
                        "transcript walks past the end of a sequence".into(),
                    ));
                }
                total += model.substitution(a[i], b[j]) as i64;
                i += 1;
                j += 1;
            }
            EditOp::Ins => {
                if j >= b.len() {
                    return Err(AlignError::BadParameter(
                        "transcript walks past the end of sequence B".into(),
                    ));
                }
                if prev != Some(EditOp::Ins) {
                    total += model.gap_open() as i64;
                }
                total += model.gap_extend() as i64;
                j += 1;
            }
            EditOp::Del => {
                if i >= a.len() {
                    return Err(AlignError::BadParameter(
                        "transcript walks past the end of sequence A".into(),
                    ));
                }
                if prev != Some(EditOp::Del) {
                    total += model.gap_open() as i64;
                }
                total += model.gap_extend() as i64;
                i += 1;
            }
        }
        prev = Some(op);
    }

    // Waive end gap runs whose flag is set. The leading run is inspected
    // first; the trailing run is only considered over the remainder so a
    // transcript that is one single gap run is never waived twice.
    let leading = gap_run_len(ops.iter().copied());
    if leading > 0 {
        let free = match ops[0] {
            EditOp::Ins => end_free.a_leading,
            EditOp::Del => end_free.b_leading,
            _ => unreachable!(),
        };
        if free {
            total -= (model.gap_open() + leading as i32 * model.gap_extend()) as i64;
        }
    }
    let trailing = gap_run_len(ops[leading..].iter().rev().copied());
    if trailing > 0 {
        let free = match ops[ops.len() - 1] {
            EditOp::Ins => end_free.a_trailing,
            EditOp::Del => end_free.b_trailing,
            _ => unreachable!(),
        };
        if free {
            total -= (model.gap_open() + trailing as i32 * model.gap_extend()) as i64;
        }
    }

    Ok(total as i32)
}

/// Length of the homogeneous gap run at the front of `ops` (zero when the
/// first operation is diagonal).
fn gap_run_len(mut ops: impl Iterator<Item = EditOp>) -> usize {
    match ops.next() {
        Some(first @ (EditOp::Ins | EditOp::Del)) => {
            1 + ops.take_while(|&op| op == first).count()
        }
        _ => 0,
    }
}
