//! Guide finder
//!
//! Locates sparse exact-match anchors between two long sequences so the
//! scheduler can avoid filling one huge DP grid. Sequence A is cut into
//! consecutive non-overlapping fixed-width windows; each window gets a
//! small rolling fingerprint built by shifting in 2 bits per canonical
//! base. The fingerprint keeps only the last few symbols, so it is a
//! cheap pre-filter: every fingerprint hit against the B scan is
//! confirmed byte-for-byte before it becomes a candidate anchor.

use log::debug;
use rustc_hash::FxHashMap;

use super::{validate_guides, Guide};
use crate::error::Result;

/// 2-bit code for a canonical nucleotide; `None` for anything else
/// (ambiguity codes never participate in anchors).
#[inline]
fn base_code(base: u8) -> Option<u64> {
    match base {
        b'T' | b't' | b'U' | b'u' => Some(0),
        b'C' | b'c' => Some(1),
        b'A' | b'a' => Some(2),
        b'G' | b'g' => Some(3),
        _ => None,
    }
}

/// Tuning for the guide finder.
#[derive(Debug, Clone, Copy)]
pub struct GuideFinderConfig {
    /// Width of the non-overlapping windows cut from sequence A.
    pub window: usize,
    /// Width each merged anchor is re-centered to.
    pub core: usize,
    /// Fingerprint width in bits; at 2 bits per symbol it distinguishes
    /// only the last `bits / 2` symbols of a window.
    pub fingerprint_bits: u32,
}

impl Default for GuideFinderConfig {
    fn default() -> Self {
        Self {
            window: 32,
            core: 16,
            fingerprint_bits: 16,
        }
    }
}

impl GuideFinderConfig {
    /// Fingerprint mask, clamped to the 64 bits a fingerprint can hold.
    fn mask(&self) -> u64 {
        match self.fingerprint_bits {
            0..=63 => (1u64 << self.fingerprint_bits) - 1,
            _ => u64::MAX,
        }
    }
}

/// A confirmed, not-yet-merged anchor candidate.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    a_start: usize,
    b_start: usize,
    len: usize,
}

/// Fingerprint of one full window, or `None` if it contains a
/// disallowed byte.
fn window_fingerprint(seq: &[u8], start: usize, width: usize, mask: u64) -> Option<u64> {
    let mut fp = 0u64;
    for &base in &seq[start..start + width] {
        fp = (fp << 2 | base_code(base)?) & mask;
    }
    Some(fp)
}

/// Find exact, equal-length, non-overlapping anchors between `a` and `b`.
///
/// Guides violating the data-model invariants are never emitted; if the
/// scan somehow produces an inconsistent list, this fails rather than
/// silently dropping the invariant.
pub fn find_guides(a: &[u8], b: &[u8], config: &GuideFinderConfig) -> Result<Vec<Guide>> {
    let w = config.window;
    if w == 0 || a.len() < w || b.len() < w {
        return Ok(Vec::new());
    }
    let mask = config.mask();

    // Fingerprint every clean window of A.
    let mut lookup: FxHashMap<u64, Vec<u32>> = FxHashMap::default();
    for window_idx in 0..a.len() / w {
        if let Some(fp) = window_fingerprint(a, window_idx * w, w, mask) {
            lookup.entry(fp).or_default().push(window_idx as u32);
        }
    }
    if lookup.is_empty() {
        return Ok(Vec::new());
    }

    // Scan B left to right with a rolling fingerprint. `clean_run` counts
    // consecutive canonical bases, so a window is only eligible once the
    // whole window is clean.
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut fp = 0u64;
    let mut clean_run = 0usize;
    let mut next_a = 0usize;
    let mut next_b = 0usize;
    for (j, &base) in b.iter().enumerate() {
        match base_code(base) {
            Some(code) => {
                fp = (fp << 2 | code) & mask;
                clean_run += 1;
            }
            None => {
                clean_run = 0;
                continue;
            }
        }
        if clean_run < w {
            continue;
        }
        let b_start = j + 1 - w;
        if b_start < next_b {
            continue;
        }
        let Some(windows) = lookup.get(&fp) else {
            continue;
        };
        for &window_idx in windows {
            let a_start = window_idx as usize * w;
            if a_start < next_a {
                continue;
            }
            // Fingerprint collisions are expected; confirm byte-for-byte.
            if !a[a_start..a_start + w].eq_ignore_ascii_case(&b[b_start..b_start + w]) {
                continue;
            }
            candidates.push(Candidate {
                a_start,
                b_start,
                len: w,
            });
            next_a = a_start + w;
            next_b = b_start + w;
            break;
        }
    }

    // Merge adjacent candidates that continue the same diagonal,
    // contiguously or within one residue on both sequences.
    let mut merged: Vec<Candidate> = Vec::new();
    for cand in candidates {
        if let Some(prev) = merged.last_mut() {
            let a_gap = cand.a_start - (prev.a_start + prev.len);
            let b_gap = cand.b_start - (prev.b_start + prev.len);
            if a_gap == b_gap && a_gap <= 1 {
                prev.len = cand.a_start + cand.len - prev.a_start;
                continue;
            }
        }
        merged.push(cand);
    }

    // Re-center each merged anchor to a fixed symmetric core around its
    // midpoint; anchors narrower than the core are kept whole.
    let guides: Vec<Guide> = merged
        .iter()
        .map(|anchor| {
            let core = config.core.min(anchor.len).max(1);
            let shift = (anchor.len - core) / 2;
            Guide::new(
                anchor.a_start + shift,
                anchor.a_start + shift + core,
                anchor.b_start + shift,
                anchor.b_start + shift + core,
            )
        })
        .collect();

    validate_guides(&guides, a.len(), b.len())?;
    debug!(
        "guide finder: {} candidate windows merged into {} guides",
        merged.len(),
        guides.len()
    );
    Ok(guides)
}
