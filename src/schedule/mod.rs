//! Segment scheduler
//!
//! Splits the two sequences at guide boundaries into independently
//! solvable sub-problems, runs the DP engine once per sub-problem
//! (spawning workers for the large ones when the thread budget grants a
//! slot), then glues the partial transcripts back together, interleaved
//! with the guides' assumed match runs. The final score is recomputed
//! from the assembled transcript because guide regions were never scored
//! by the DP engine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use log::debug;

use crate::align::{align_segment, ProgressFn, SegmentAlignment, SubProblem, Transcript};
use crate::align::transcript::score_from_transcript;
use crate::error::{AlignError, Result};
use crate::scoring::{EndFree, ScoringModel};
use crate::seed::Guide;

/// Thread-budget admission point, consulted once per large sub-problem
/// before a worker is spawned. Implementations must be safe to call
/// concurrently from multiple scheduler instances process-wide. Injected
/// rather than global so tests can simulate admission refusal.
pub trait ThreadBudget: Send + Sync {
    /// Try to claim a worker slot; `max_threads` is the caller's ceiling.
    fn request_slot(&self, max_threads: usize) -> bool;
    /// Return a slot claimed by `request_slot`.
    fn release_slot(&self);
}

/// Default budget: a process-wide style atomic slot counter.
#[derive(Debug, Default)]
pub struct SlotBudget {
    in_use: AtomicUsize,
}

impl SlotBudget {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ThreadBudget for SlotBudget {
    fn request_slot(&self, max_threads: usize) -> bool {
        self.in_use
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max_threads).then_some(n + 1)
            })
            .is_ok()
    }

    fn release_slot(&self) {
        self.in_use.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Scheduler tuning.
#[derive(Debug, Clone, Copy)]
pub struct ScheduleConfig {
    /// Worker ceiling passed to the thread budget; 0 means one slot per
    /// logical CPU.
    pub max_threads: usize,
    /// Sub-problems with at most this many grid cells always run on the
    /// scheduling thread.
    pub parallel_cells: usize,
    /// Ceiling on any single sub-problem's packed backtrace, in bytes.
    pub max_backtrace_bytes: usize,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            max_threads: 0,
            parallel_cells: 1 << 22,
            max_backtrace_bytes: 1 << 30,
        }
    }
}

impl ScheduleConfig {
    pub fn effective_threads(&self) -> usize {
        if self.max_threads == 0 {
            num_cpus::get()
        } else {
            self.max_threads
        }
    }
}

/// Split the sequences at the guide boundaries into `guides.len() + 1`
/// sub-problems in sequence order. Only the sub-problem touching a true
/// sequence start/end inherits that axis's free-end flag; interior
/// boundaries are never free.
pub fn partition(
    len_a: usize,
    len_b: usize,
    guides: &[Guide],
    end_free: EndFree,
) -> Vec<SubProblem> {
    let mut subs = Vec::with_capacity(guides.len() + 1);
    let mut a_cursor = 0usize;
    let mut b_cursor = 0usize;
    let last = guides.len();
    for (idx, g) in guides.iter().enumerate() {
        subs.push(SubProblem {
            a_offset: a_cursor,
            a_len: g.a_start - a_cursor,
            b_offset: b_cursor,
            b_len: g.b_start - b_cursor,
            end_free: EndFree {
                a_leading: idx == 0 && end_free.a_leading,
                b_leading: idx == 0 && end_free.b_leading,
                a_trailing: false,
                b_trailing: false,
            },
        });
        a_cursor = g.a_end;
        b_cursor = g.b_end;
    }
    subs.push(SubProblem {
        a_offset: a_cursor,
        a_len: len_a - a_cursor,
        b_offset: b_cursor,
        b_len: len_b - b_cursor,
        end_free: EndFree {
            a_leading: last == 0 && end_free.a_leading,
            b_leading: last == 0 && end_free.b_leading,
            a_trailing: end_free.a_trailing,
            b_trailing: end_free.b_trailing,
        },
    });
    subs
}

/// Fail fast if any sub-problem's packed backtrace would exceed the
/// configured ceiling. A heuristic early scan, not a guarantee against
/// transient overcommit from concurrent sub-problems.
fn preflight_memory(subs: &[SubProblem], limit: usize) -> Result<()> {
    for sub in subs {
        let required = crate::align::PackedBacktrace::estimate_bytes(sub.a_len + 1, sub.b_len + 1);
        if required > limit {
            return Err(AlignError::MemoryLimit { required, limit });
        }
    }
    Ok(())
}

/// Run every sub-problem, concatenate the partial transcripts with the
/// guides' match runs, and recompute the aggregate score from the
/// assembled transcript.
pub fn run_schedule(
    model: &ScoringModel,
    a: &[u8],
    b: &[u8],
    guides: &[Guide],
    config: &ScheduleConfig,
    budget: &dyn ThreadBudget,
    progress: Option<&ProgressFn>,
) -> Result<SegmentAlignment> {
    let subs = partition(a.len(), b.len(), guides, model.end_free());
    preflight_memory(&subs, config.max_backtrace_bytes)?;

    // Largest estimated work first, so big grids start before the small
    // ones fill the scheduling thread.
    let mut order: Vec<usize> = (0..subs.len()).collect();
    order.sort_by_key(|&idx| std::cmp::Reverse(subs[idx].cells()));

    let max_threads = config.effective_threads();
    let mut results: Vec<Option<Result<SegmentAlignment>>> =
        (0..subs.len()).map(|_| None).collect();

    thread::scope(|scope| {
        let mut handles = Vec::new();
        for &idx in &order {
            let sub = &subs[idx];
            let admitted = max_threads > 1
                && sub.cells() > config.parallel_cells
                && budget.request_slot(max_threads);
            if admitted {
                debug!(
                    "segment {} ({} cells) admitted to a worker thread",
                    idx,
                    sub.cells()
                );
                handles.push((
                    idx,
                    scope.spawn(move || {
                        let out = align_segment(model, a, b, sub, progress);
                        budget.release_slot();
                        out
                    }),
                ));
            } else {
                results[idx] = Some(align_segment(model, a, b, sub, progress));
            }
        }
        // Every worker is joined; failures are captured, not dropped.
        for (idx, handle) in handles {
            results[idx] = Some(handle.join().unwrap_or_else(|_| {
                Err(AlignError::InternalError("alignment worker panicked".into()))
            }));
        }
    });

    // Re-raise only the first captured failure, in sequence order.
    let mut segments: Vec<SegmentAlignment> = Vec::with_capacity(results.len());
    let mut first_failure = None;
    for outcome in results {
        match outcome.expect("every sub-problem was scheduled") {
            Ok(segment) => segments.push(segment),
            Err(err) => {
                if first_failure.is_none() {
                    first_failure = Some(err);
                }
            }
        }
    }
    if let Some(err) = first_failure {
        return Err(err);
    }

    if guides.is_empty() {
        // Degenerate single-segment schedule; local mode always lands
        // here because guides are rejected with a local model.
        return Ok(segments.remove(0));
    }

    // Concatenate in sequence order, interleaving each sub-problem's
    // transcript with its following guide's assumed match run.
    let mut transcript = Transcript::new();
    for (idx, segment) in segments.iter().enumerate() {
        transcript.append(&segment.transcript);
        if let Some(g) = guides.get(idx) {
            transcript.push_match_run(g.len());
        }
    }
    let score = score_from_transcript(model, a, b, 0, 0, model.end_free(), &transcript)?;
    debug!(
        "assembled {} segments and {} guides into a {}-op transcript, score {}",
        segments.len(),
        guides.len(),
        transcript.len(),
        score
    );
    Ok(SegmentAlignment {
        score,
        transcript,
        a_range: 0..a.len(),
        b_range: 0..b.len(),
    })
}
