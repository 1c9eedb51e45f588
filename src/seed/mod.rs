//! Anchors (guides) for partitioned alignment
//!
//! A guide pins a region assumed to align diagonally, gap-free, between
//! the two sequences. Guides are trusted as exact matches and are never
//! re-verified at schedule time; callers supplying guides from noisy
//! sources will silently corrupt the transcript's claimed identity.

mod guide_finder;

pub use guide_finder::{find_guides, GuideFinderConfig};

use crate::error::{AlignError, Result};

/// An assumed-exact diagonal region shared by both sequences.
/// Ranges are half-open and must have equal length on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guide {
    pub a_start: usize,
    pub a_end: usize,
    pub b_start: usize,
    pub b_end: usize,
}

impl Guide {
    pub fn new(a_start: usize, a_end: usize, b_start: usize, b_end: usize) -> Self {
        Self {
            a_start,
            a_end,
            b_start,
            b_end,
        }
    }

    pub fn len(&self) -> usize {
        self.a_end - self.a_start
    }

    pub fn is_empty(&self) -> bool {
        self.a_end == self.a_start
    }
}

/// Check a guide list against the data-model invariants: non-empty
/// equal-length regions, fully inside both sequences, strictly increasing
/// and non-overlapping on both axes.
pub fn validate_guides(guides: &[Guide], len_a: usize, len_b: usize) -> Result<()> {
    let mut prev_a_end = 0usize;
    let mut prev_b_end = 0usize;
    for (idx, g) in guides.iter().enumerate() {
        if g.a_end <= g.a_start || g.b_end <= g.b_start {
            return Err(AlignError::BadParameter(format!(
                "guide {} is empty or reversed",
                idx
            )));
        }
        if g.a_end - g.a_start != g.b_end - g.b_start {
            return Err(AlignError::BadParameter(format!(
                "guide {} has unequal region lengths ({} vs {})",
                idx,
                g.a_end - g.a_start,
                g.b_end - g.b_start
            )));
        }
        if g.a_end > len_a || g.b_end > len_b {
            return Err(AlignError::BadParameter(format!(
                "guide {} extends past a sequence end",
                idx
            )));
        }
        if g.a_start < prev_a_end || g.b_start < prev_b_end {
            return Err(AlignError::BadParameter(format!(
                "guide {} overlaps or reorders the previous guide",
                idx
            )));
        }
        prev_a_end = g.a_end;
        prev_b_end = g.b_end;
    }
    Ok(())
}
