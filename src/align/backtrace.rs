//! Packed backtrace store
//!
//! Records, per DP cell, which predecessor move was optimal. Cells are
//! 4 bits wide and packed two to a byte; the store is append-mostly and
//! filled in strictly increasing cell-index order (`k = i * cols + j`),
//! one fresh store per DP invocation.

/// Two-bit winner field of a cell code.
pub const MOVE_MASK: u8 = 0b0011;
/// Diagonal move (substitution).
pub const MOVE_DIAG: u8 = 0b00;
/// Horizontal move: gap in A consuming one B residue.
pub const MOVE_HORIZ: u8 = 0b01;
/// Vertical move: gap in B consuming one A residue.
pub const MOVE_VERT: u8 = 0b10;
/// The horizontal gap score arrived by extension rather than a fresh open.
pub const HORIZ_EXTEND: u8 = 0b0100;
/// The vertical gap score arrived by extension rather than a fresh open.
pub const VERT_EXTEND: u8 = 0b1000;

/// 4-bit-per-cell backtrace grid for one (sub-)problem.
pub struct PackedBacktrace {
    data: Vec<u8>,
    len: usize,
    rows: usize,
    cols: usize,
    /// Best cell index and score; meaningful only in local mode.
    best: Option<(usize, i32)>,
}

impl PackedBacktrace {
    /// Allocate an empty store for a `rows x cols` grid
    /// (`rows = len_a + 1`, `cols = len_b + 1`).
    pub fn new(rows: usize, cols: usize) -> Self {
        let cells = rows * cols;
        Self {
            data: Vec::with_capacity(cells.div_ceil(2)),
            len: 0,
            rows,
            cols,
            best: None,
        }
    }

    /// Worst-case size in bytes of the packed grid for a sub-problem,
    /// used by the scheduler's memory pre-flight.
    pub fn estimate_bytes(rows: usize, cols: usize) -> usize {
        (rows * cols).div_ceil(2)
    }

    /// Append the next cell's code. Cells must be pushed in strictly
    /// increasing `k` order.
    #[inline(always)]
    pub fn push(&mut self, code: u8) {
        debug_assert!(code < 16);
        if self.len % 2 == 0 {
            self.data.push(code);
        } else {
            *self.data.last_mut().unwrap() |= code << 4;
        }
        self.len += 1;
    }

    /// Code of cell `k`.
    #[inline(always)]
    pub fn get(&self, k: usize) -> u8 {
        let byte = self.data[k / 2];
        if k % 2 == 0 {
            byte & 0x0f
        } else {
            byte >> 4
        }
    }

    /// Record the running best cell (local mode).
    #[inline(always)]
    pub fn record_best(&mut self, k: usize, score: i32) {
        self.best = Some((k, score));
    }

    pub fn best(&self) -> Option<(usize, i32)> {
        self.best
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}
