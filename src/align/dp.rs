//! Gotoh affine-gap dynamic programming engine
//!
//! Fills one DP grid for one (sub-)problem using three rolling score
//! vectors of width `len_b + 1` (previous/current row for the diagonal
//! state and a reused row for the vertical-gap state), records every
//! cell's winning move in a packed backtrace store, and decodes the store
//! into a transcript. Working memory beyond the store itself is
//! O(len_b).

use log::trace;

use super::backtrace::{
    PackedBacktrace, HORIZ_EXTEND, MOVE_DIAG, MOVE_HORIZ, MOVE_MASK, MOVE_VERT, VERT_EXTEND,
};
use super::transcript::{score_from_transcript, EditOp, Transcript};
use crate::error::{AlignError, Result};
use crate::scoring::{EndFree, ScoringModel, TieBreak, NEG_INF};

/// Progress callback: `(cells done, cells total)`, invoked at most once
/// per completed grid row. Returning `true` requests cooperative
/// cancellation; the engine checks only at row boundaries.
pub type ProgressFn = dyn Fn(u64, u64) -> bool + Send + Sync;

/// One independently solvable alignment sub-problem: an offset/length
/// window into each sequence plus the end-free flags applicable to this
/// window. Only a window touching a true sequence end may carry that
/// axis's free flag; interior boundaries are never free.
#[derive(Debug, Clone, Copy)]
pub struct SubProblem {
    pub a_offset: usize,
    pub a_len: usize,
    pub b_offset: usize,
    pub b_len: usize,
    pub end_free: EndFree,
}

impl SubProblem {
    /// Full-sequence problem inheriting the model's flags.
    pub fn whole(a: &[u8], b: &[u8], end_free: EndFree) -> Self {
        Self {
            a_offset: 0,
            a_len: a.len(),
            b_offset: 0,
            b_len: b.len(),
            end_free,
        }
    }

    /// Grid cell count, the work estimate used for scheduling order and
    /// the memory pre-flight.
    pub fn cells(&self) -> usize {
        (self.a_len + 1) * (self.b_len + 1)
    }
}

/// Result of aligning one sub-problem.
#[derive(Debug, Clone)]
pub struct SegmentAlignment {
    pub score: i32,
    pub transcript: Transcript,
    /// Absolute half-open range of A covered by the transcript.
    pub a_range: std::ops::Range<usize>,
    /// Absolute half-open range of B covered by the transcript.
    pub b_range: std::ops::Range<usize>,
}

/// Pick the winning move among diagonal, horizontal and vertical
/// candidates, honoring the tie-break policy. Candidates are scanned in
/// that order; `PreferLaterGap` lets an equal later candidate win.
#[inline(always)]
fn select_winner(d: i32, e: i32, f: i32, tie: TieBreak) -> (i32, u8) {
    let later_wins = tie == TieBreak::PreferLaterGap;
    let mut best = d;
    let mut code = MOVE_DIAG;
    if e > best || (later_wins && e == best) {
        best = e;
        code = MOVE_HORIZ;
    }
    if f > best || (later_wins && f == best) {
        best = f;
        code = MOVE_VERT;
    }
    (best, code)
}

/// Fill the grid for `sub` and decode the optimal path.
///
/// Returns the optimal score and transcript; in local mode the transcript
/// covers only the best-scoring region and the score is never negative.
pub fn align_segment(
    model: &ScoringModel,
    a: &[u8],
    b: &[u8],
    sub: &SubProblem,
    progress: Option<&ProgressFn>,
) -> Result<SegmentAlignment> {
    let (backtrace, grid_score) = fill(model, a, b, sub, progress)?;
    let outcome = decode(model, a, b, sub, &backtrace)?;

    // Consistency check: the grid's own optimum, the decoded path's score
    // and the transcript recomputation must all agree. Local-mode
    // transcripts carry no end gaps, so no waiver applies there.
    let check_flags = if model.is_local() {
        EndFree::NONE
    } else {
        sub.end_free
    };
    let recomputed = score_from_transcript(
        model,
        a,
        b,
        outcome.a_range.start,
        outcome.b_range.start,
        check_flags,
        &outcome.transcript,
    )?;
    if recomputed != outcome.score || outcome.score != grid_score {
        return Err(AlignError::InternalError(format!(
            "transcript recomputes to {} but DP reported {} (grid optimum {})",
            recomputed, outcome.score, grid_score
        )));
    }
    Ok(outcome)
}

/// Grid fill. Visits backtrace cells in strictly increasing index order.
/// Returns the store together with the grid's optimal score (the final
/// cell in global mode, the running best in local mode).
fn fill(
    model: &ScoringModel,
    a: &[u8],
    b: &[u8],
    sub: &SubProblem,
    progress: Option<&ProgressFn>,
) -> Result<(PackedBacktrace, i32)> {
    let m = sub.a_len;
    let n = sub.b_len;
    let rows = m + 1;
    let cols = n + 1;
    let local = model.is_local();
    let tie = model.tie_break();
    let (wg, ws) = (model.gap_open(), model.gap_extend());

    let mut bt = PackedBacktrace::new(rows, cols);
    let total_cells = (rows * cols) as u64;
    let mut done_cells = 0u64;

    let mut prev_row = vec![0i32; cols];
    let mut cur_row = vec![0i32; cols];
    // F state per column, carried across rows.
    let mut f_row = vec![NEG_INF; cols];

    // Leading row: all horizontal moves (gap in A consuming a B prefix).
    let (lead_open, lead_ext) = if sub.end_free.a_leading || local {
        (0, 0)
    } else {
        (wg, ws)
    };
    bt.push(MOVE_DIAG); // origin, never read back
    for j in 1..cols {
        prev_row[j] = lead_open + j as i32 * lead_ext;
        bt.push(MOVE_HORIZ | if j > 1 { HORIZ_EXTEND } else { 0 });
    }
    done_cells += cols as u64;
    if let Some(cb) = progress {
        if cb(done_cells, total_cells) {
            return Err(AlignError::Cancelled);
        }
    }

    let mut best_seen = 0i32;

    for i in 1..rows {
        let a_res = a[sub.a_offset + i - 1];
        let last_row = i == rows - 1;
        // Free trailing gap on A: horizontal moves in the final row cost
        // nothing (global mode only; local relies on the zero floor).
        let (e_open_cost, e_ext_cost) = if !local && last_row && sub.end_free.a_trailing {
            (0, 0)
        } else {
            (wg, ws)
        };
        let (col_open, col_ext) = if sub.end_free.b_leading || local {
            (0, 0)
        } else {
            (wg, ws)
        };

        // Leading column cell: a vertical move.
        cur_row[0] = col_open + i as i32 * col_ext;
        if local {
            cur_row[0] = cur_row[0].max(0);
        }
        bt.push(MOVE_VERT | if i > 1 { VERT_EXTEND } else { 0 });

        let mut e = NEG_INF;
        for j in 1..cols {
            let b_res = b[sub.b_offset + j - 1];
            let last_col = j == cols - 1;
            let (f_open_cost, f_ext_cost) = if !local && last_col && sub.end_free.b_trailing {
                (0, 0)
            } else {
                (wg, ws)
            };

            // Horizontal gap state: extend wins cost ties so a free or
            // zero-cost gap never splits into two runs.
            let e_open = cur_row[j - 1] + e_open_cost;
            let e_ext = e;
            let e_extended = e_ext >= e_open;
            e = e_ext.max(e_open) + e_ext_cost;

            // Vertical gap state, same convention.
            let f_open = prev_row[j] + f_open_cost;
            let f_ext = f_row[j];
            let f_extended = f_ext >= f_open;
            let f = f_ext.max(f_open) + f_ext_cost;
            f_row[j] = f;

            let d = prev_row[j - 1] + model.substitution(a_res, b_res);

            let (mut score, mut code) = select_winner(d, e, f, tie);
            if e_extended {
                code |= HORIZ_EXTEND;
            }
            if f_extended {
                code |= VERT_EXTEND;
            }
            if local {
                score = score.max(0);
                if score > best_seen {
                    best_seen = score;
                    bt.record_best(i * cols + j, score);
                }
            }
            cur_row[j] = score;
            bt.push(code);
        }

        std::mem::swap(&mut prev_row, &mut cur_row);
        done_cells += cols as u64;
        if let Some(cb) = progress {
            if cb(done_cells, total_cells) {
                return Err(AlignError::Cancelled);
            }
        }
    }

    let grid_score = if local { best_seen } else { prev_row[n] };
    trace!(
        "filled {}x{} grid (a_offset={}, b_offset={}), grid optimum {}",
        rows,
        cols,
        sub.a_offset,
        sub.b_offset,
        grid_score
    );
    debug_assert_eq!(bt.len(), rows * cols);
    Ok((bt, grid_score))
}

/// Replay the recorded moves from the optimal endpoint back to the start
/// of the path.
fn decode(
    model: &ScoringModel,
    a: &[u8],
    b: &[u8],
    sub: &SubProblem,
    bt: &PackedBacktrace,
) -> Result<SegmentAlignment> {
    if model.is_local() {
        decode_local(model, a, b, sub, bt)
    } else {
        decode_global(model, a, b, sub, bt)
    }
}

fn decode_global(
    model: &ScoringModel,
    a: &[u8],
    b: &[u8],
    sub: &SubProblem,
    bt: &PackedBacktrace,
) -> Result<SegmentAlignment> {
    let cols = bt.cols();
    let mut i = bt.rows() - 1;
    let mut j = cols - 1;
    let mut ops: Vec<EditOp> = Vec::with_capacity(i + j);

    while i > 0 || j > 0 {
        let code = bt.get(i * cols + j);
        match code & MOVE_MASK {
            MOVE_DIAG => {
                if i == 0 || j == 0 {
                    return Err(AlignError::InternalError(
                        "diagonal move recorded on a grid boundary".into(),
                    ));
                }
                let a_res = a[sub.a_offset + i - 1];
                let b_res = b[sub.b_offset + j - 1];
                ops.push(if a_res.eq_ignore_ascii_case(&b_res) {
                    EditOp::Match
                } else {
                    EditOp::Mismatch
                });
                i -= 1;
                j -= 1;
            }
            MOVE_HORIZ => loop {
                if j == 0 {
                    return Err(AlignError::InternalError(
                        "horizontal move recorded in column 0".into(),
                    ));
                }
                let extended = bt.get(i * cols + j) & HORIZ_EXTEND != 0;
                ops.push(EditOp::Ins);
                j -= 1;
                if !extended {
                    break;
                }
            },
            MOVE_VERT => loop {
                if i == 0 {
                    return Err(AlignError::InternalError(
                        "vertical move recorded in row 0".into(),
                    ));
                }
                let extended = bt.get(i * cols + j) & VERT_EXTEND != 0;
                ops.push(EditOp::Del);
                i -= 1;
                if !extended {
                    break;
                }
            },
            _ => {
                return Err(AlignError::InternalError(format!(
                    "unrecognized backtrace code {:#x}",
                    code
                )))
            }
        }
    }
    ops.reverse();

    let transcript = Transcript::from_ops(ops);
    let score = score_from_transcript(
        model,
        a,
        b,
        sub.a_offset,
        sub.b_offset,
        sub.end_free,
        &transcript,
    )?;
    Ok(SegmentAlignment {
        score,
        transcript,
        a_range: sub.a_offset..sub.a_offset + sub.a_len,
        b_range: sub.b_offset..sub.b_offset + sub.b_len,
    })
}

/// Local-mode decode: start at the recorded best cell and subtract each
/// emitted operation's contribution from a running copy of the best
/// score, stopping exactly when it reaches zero. Reaching the grid
/// boundary with a non-zero remainder is an internal-consistency error.
fn decode_local(
    model: &ScoringModel,
    a: &[u8],
    b: &[u8],
    sub: &SubProblem,
    bt: &PackedBacktrace,
) -> Result<SegmentAlignment> {
    let Some((best_k, best_score)) = bt.best() else {
        // Nothing scored above the floor: the empty alignment.
        return Ok(SegmentAlignment {
            score: 0,
            transcript: Transcript::new(),
            a_range: sub.a_offset..sub.a_offset,
            b_range: sub.b_offset..sub.b_offset,
        });
    };

    let cols = bt.cols();
    let mut i = best_k / cols;
    let mut j = best_k % cols;
    let (end_i, end_j) = (i, j);
    let (wg, ws) = (model.gap_open(), model.gap_extend());
    let mut remaining = best_score;
    let mut ops: Vec<EditOp> = Vec::new();

    while remaining > 0 {
        if i == 0 || j == 0 {
            return Err(AlignError::InternalError(format!(
                "local backtrace hit the grid boundary with {} left",
                remaining
            )));
        }
        let code = bt.get(i * cols + j);
        match code & MOVE_MASK {
            MOVE_DIAG => {
                let a_res = a[sub.a_offset + i - 1];
                let b_res = b[sub.b_offset + j - 1];
                remaining -= model.substitution(a_res, b_res);
                ops.push(if a_res.eq_ignore_ascii_case(&b_res) {
                    EditOp::Match
                } else {
                    EditOp::Mismatch
                });
                i -= 1;
                j -= 1;
            }
            MOVE_HORIZ => loop {
                if j == 0 {
                    return Err(AlignError::InternalError(
                        "horizontal move recorded in column 0".into(),
                    ));
                }
                let extended = bt.get(i * cols + j) & HORIZ_EXTEND != 0;
                remaining -= ws + if extended { 0 } else { wg };
                ops.push(EditOp::Ins);
                j -= 1;
                if !extended || remaining <= 0 {
                    break;
                }
            },
            MOVE_VERT => loop {
                if i == 0 {
                    return Err(AlignError::InternalError(
                        "vertical move recorded in row 0".into(),
                    ));
                }
                let extended = bt.get(i * cols + j) & VERT_EXTEND != 0;
                remaining -= ws + if extended { 0 } else { wg };
                ops.push(EditOp::Del);
                i -= 1;
                if !extended || remaining <= 0 {
                    break;
                }
            },
            _ => {
                return Err(AlignError::InternalError(format!(
                    "unrecognized backtrace code {:#x}",
                    code
                )))
            }
        }
    }
    if remaining != 0 {
        return Err(AlignError::InternalError(format!(
            "local backtrace overshot zero by {}",
            -remaining
        )));
    }
    ops.reverse();

    Ok(SegmentAlignment {
        score: best_score,
        transcript: Transcript::from_ops(ops),
        a_range: sub.a_offset + i..sub.a_offset + end_i,
        b_range: sub.b_offset + j..sub.b_offset + end_j,
    })
}
