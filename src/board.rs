//! The packed board representation.
//!
//! Each cell is two bits: `BLACK` and `WHITE` are the two colors a solved
//! cell can take, `UNKNOWN` means both remain possible, and `CONFLICT` (both
//! bits clear) means neither does — a board reaching that state is
//! contradictory.

use serde::{Deserialize, Serialize};

use crate::bitops::{self, LineWord};
use crate::workqueue::WorkQueue;

/// Largest puzzle side this engine supports; bounds the fixed-size arrays
/// that make [`Board`] trivially copyable.
pub const MAX_N: usize = 25;

/// A cell that is definitely filled.
pub const BLACK: LineWord = 0b01;
/// A cell that is definitely empty.
pub const WHITE: LineWord = 0b10;
/// A cell whose color is not yet determined.
pub const UNKNOWN: LineWord = 0b11;
/// The illegal state: neither color remains possible.
pub const CONFLICT: LineWord = 0b00;

/// A square Nonogram board of side `n` (`n <= MAX_N`), packed two bits per
/// cell into fixed-size word arrays.
///
/// Plain data, `Copy`: snapshotting a board for a probe trial is a
/// structure copy, not a heap walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    n: usize,
    col: [LineWord; MAX_N],
    row: [LineWord; MAX_N],
    determined: u32,
}

impl Board {
    /// Builds a board of side `n` with every cell `UNKNOWN`.
    pub fn new(n: usize) -> Self {
        assert!(n > 0 && n <= MAX_N, "n must be in 1..=MAX_N");
        let full = bitops::line_mask(n);
        Board {
            n,
            col: [full; MAX_N],
            row: [full; MAX_N],
            determined: 0,
        }
    }

    /// Builds a board of side `n` with every cell forced `WHITE`, used as
    /// the placeholder solution for a puzzle that never got solved.
    pub fn all_white(n: usize) -> Self {
        assert!(n > 0 && n <= MAX_N, "n must be in 1..=MAX_N");
        let word = (0..n).fold(0, |acc, t| acc | (WHITE << (2 * t)));
        Board {
            n,
            col: [word; MAX_N],
            row: [word; MAX_N],
            determined: (n * n) as u32,
        }
    }

    /// Puzzle side length.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of cells fixed to `BLACK` or `WHITE`.
    #[inline]
    pub fn determined(&self) -> u32 {
        self.determined
    }

    /// Total cell count, `n * n`.
    #[inline]
    pub fn size(&self) -> u32 {
        (self.n * self.n) as u32
    }

    #[inline]
    pub fn is_solved(&self) -> bool {
        self.determined == self.size()
    }

    /// Raw packed word for column `i`.
    #[inline]
    pub fn col_word(&self, i: usize) -> LineWord {
        self.col[i]
    }

    /// Raw packed word for row `j`.
    #[inline]
    pub fn row_word(&self, j: usize) -> LineWord {
        self.row[j]
    }

    /// Replaces column `i`'s packed word wholesale (used by the line-solver
    /// driver once a line has been fully settled).
    #[inline]
    pub fn set_col_word(&mut self, i: usize, word: LineWord) {
        self.col[i] = word;
    }

    /// Replaces row `j`'s packed word wholesale.
    #[inline]
    pub fn set_row_word(&mut self, j: usize, word: LineWord) {
        self.row[j] = word;
    }

    /// Two-bit state of cell `(i, j)` (column `i`, row `j`).
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> LineWord {
        (self.row[j] >> (2 * i)) & 0b11
    }

    /// Clears the opposite-color bit at `(i, j)` from both `col[i]` and
    /// `row[j]`, collapsing `UNKNOWN` toward `color`. Does not touch
    /// `determined` or the work queue; used only by the line-solver's
    /// bit-diff application loop, which accounts for newly-fixed cells
    /// itself as it walks the diff.
    #[inline]
    pub fn set_unflagged(&mut self, i: usize, j: usize, color: LineWord) {
        let opposite = color ^ UNKNOWN;
        self.col[i] &= !bitops::shift_left(opposite, j, self.n);
        self.row[j] &= !bitops::shift_left(opposite, i, self.n);
    }

    /// Forces cell `(i, j)` to `color`, incrementing `determined` if this
    /// is the first time the cell is fixed, and pushes both its column and
    /// row onto `queue` for re-propagation. This is the only mutation the
    /// prober and search layers are allowed to use.
    pub fn set_and_flag(&mut self, i: usize, j: usize, color: LineWord, queue: &mut WorkQueue) {
        let was_unknown = self.get(i, j) == UNKNOWN;
        self.set_unflagged(i, j, color);
        if was_unknown {
            self.determined += 1;
        }
        queue.push(i);
        queue.push(self.n + j);
    }

    /// Intersects another board's committed bits into `self`: wherever
    /// `self` holds a bit not present in `other`, clears it. Used by the
    /// prober to merge two trial boards when neither alone reaches a
    /// verdict. Returns `true` if anything changed.
    pub fn intersect_from(&mut self, other: &Board, queue: &mut WorkQueue) -> bool {
        let mut changed = false;
        for i in 0..self.n {
            let merged = self.col[i] & other.col[i];
            if merged != self.col[i] {
                changed = true;
                self.col[i] = merged;
                queue.push(i);
            }
        }
        for j in 0..self.n {
            let merged = self.row[j] & other.row[j];
            if merged != self.row[j] {
                changed = true;
                self.row[j] = merged;
                queue.push(self.n + j);
            }
        }
        changed
    }

    /// Unions two trial boards' words line-by-line into `self`: anything
    /// forbidden in *both* trials is globally forbidden, so `self` keeps
    /// only bits present in `a | b`. Re-derives `determined` from the
    /// resulting rows rather than tracking it incrementally, since a union
    /// can newly-fix a cell that neither single bit flip made obvious.
    pub fn union_from_two(&mut self, a: &Board, b: &Board, queue: &mut WorkQueue) -> bool {
        let mut changed = false;
        for i in 0..self.n {
            let merged = a.col[i] | b.col[i];
            if merged != self.col[i] {
                changed = true;
                self.col[i] &= merged;
                queue.push(i);
            }
        }
        for j in 0..self.n {
            let merged = a.row[j] | b.row[j];
            if merged != self.row[j] {
                changed = true;
                self.row[j] &= merged;
                queue.push(self.n + j);
            }
        }
        if changed {
            self.recount_determined();
        }
        changed
    }

    fn recount_determined(&mut self) {
        let mut count = 0u32;
        for j in 0..self.n {
            for i in 0..self.n {
                let cell = (self.row[j] >> (2 * i)) & 0b11;
                if cell == BLACK || cell == WHITE {
                    count += 1;
                }
            }
        }
        self.determined = count;
    }

    /// Commits a freshly-settled line word from the line solver: replaces
    /// `col[line_idx]` (or `row[line_idx]` if `!is_col`) with `settled`,
    /// and for every cell whose bits changed, clears the same diff from
    /// the perpendicular line, bumps `determined`, and pushes that
    /// perpendicular line onto `queue`.
    pub fn apply_settled_line(
        &mut self,
        is_col: bool,
        line_idx: usize,
        settled: LineWord,
        queue: &mut WorkQueue,
    ) {
        let old = if is_col {
            self.col[line_idx]
        } else {
            self.row[line_idx]
        };
        let diff = old ^ settled;
        if is_col {
            self.col[line_idx] = settled;
        } else {
            self.row[line_idx] = settled;
        }
        for p in 0..self.n {
            let bits = (diff >> (2 * p)) & 0b11;
            if bits != 0 {
                self.determined += 1;
                if is_col {
                    self.row[p] &= !bitops::shift_left(bits, line_idx, self.n);
                    queue.push(self.n + p);
                } else {
                    self.col[p] &= !bitops::shift_left(bits, line_idx, self.n);
                    queue.push(p);
                }
            }
        }
    }

    /// Does every cell report the same state through both its row and its
    /// column view? Should always hold; exposed for tests.
    pub fn is_coherent(&self) -> bool {
        for i in 0..self.n {
            for j in 0..self.n {
                let from_row = self.get(i, j);
                let from_col = (self.col[i] >> (2 * j)) & 0b11;
                if from_row != from_col {
                    return false;
                }
            }
        }
        true
    }

    /// Row states as a slice, for solution-equality comparisons.
    pub fn rows(&self) -> &[LineWord] {
        &self.row[..self.n]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workqueue::WorkQueue;

    #[test]
    fn new_board_is_all_unknown() {
        let b = Board::new(5);
        assert_eq!(b.determined(), 0);
        for i in 0..5 {
            for j in 0..5 {
                assert_eq!(b.get(i, j), UNKNOWN);
            }
        }
    }

    #[test]
    fn set_and_flag_collapses_to_color_and_counts_once() {
        let mut b = Board::new(5);
        let mut q = WorkQueue::new(5);
        b.set_and_flag(1, 2, BLACK, &mut q);
        assert_eq!(b.get(1, 2), BLACK);
        assert_eq!(b.determined(), 1);
        // setting again with the same color must not double-count
        b.set_and_flag(1, 2, BLACK, &mut q);
        assert_eq!(b.determined(), 1);
    }

    #[test]
    fn row_col_views_stay_coherent() {
        let mut b = Board::new(5);
        let mut q = WorkQueue::new(5);
        b.set_and_flag(3, 4, WHITE, &mut q);
        b.set_and_flag(0, 0, BLACK, &mut q);
        assert!(b.is_coherent());
    }

    #[test]
    fn opposite_color_cleared_leaves_chosen_color() {
        let mut b = Board::new(5);
        b.set_unflagged(0, 0, BLACK);
        assert_eq!(b.get(0, 0), BLACK);
    }

    #[test]
    fn no_cell_ever_goes_conflict_from_a_single_set() {
        let mut b = Board::new(5);
        b.set_unflagged(2, 2, WHITE);
        assert_eq!(b.get(2, 2), WHITE);
        assert_ne!(b.get(2, 2), CONFLICT);
    }

    #[test]
    fn apply_settled_line_updates_perpendicular_lines() {
        let mut b = Board::new(5);
        let mut q = WorkQueue::new(5);
        // settle row 0 to all BLACK: 0b01 repeated 5 times
        let all_black: LineWord = 0b01_01_01_01_01;
        b.apply_settled_line(false, 0, all_black, &mut q);
        for i in 0..5 {
            assert_eq!(b.get(i, 0), BLACK);
        }
        assert_eq!(b.determined(), 5);
        assert!(b.is_coherent());
    }
}
