//! The per-line dynamic-programming propagator.
//!
//! Decides, for a single row or column, which cells must be `BLACK`, which
//! must be `WHITE`, and which remain `UNKNOWN`, given the line's clue and
//! its currently-permitted bits. Results are memoized in a [`LineCache`]
//! keyed by the clue's Zobrist fingerprint and the line's current word.

use crate::bitops::{self, LineWord};
use crate::board::{self, Board};
use crate::cache::LineCache;
use crate::clue::{Clue, Puzzle};
use crate::engine::Engine;
use crate::status::Status;

/// Mask of `k` packed `BLACK` cells (`0b01` repeated `k` times), matching
/// the original's precomputed `block_mask` table.
fn block_run_mask(k: usize) -> LineWord {
    (0..k).fold(0, |acc, t| acc | (board::BLACK << (2 * t)))
}

/// Reachability + forced-bit derivation for a single line, the recursive
/// `solve(i, j, out)` from the design: can the first `j` runs be placed
/// inside the first `i` cells consistent with `word`, and if so, which
/// bits are forced along every such placement.
///
/// Both placement options (ending the next run here, or leaving this cell
/// white) are tried at every node whenever they're individually feasible —
/// not just the first that succeeds — so `out` ends up holding the union of
/// every color a cell takes across all top-reachable completions. A cell
/// forced to one color only ever receives that color's bit; a cell that's
/// genuinely ambiguous receives both, reproducing `UNKNOWN`.
fn solve_line(clue: &Clue, word: LineWord, n: usize) -> Option<LineWord> {
    let m = clue.count();
    // memo[i][j], i offset by 1 to store the i == -1 base case at index 0.
    let mut memo: Vec<Vec<Option<bool>>> = vec![vec![None; m + 1]; n + 2];
    let mut settle: LineWord = 0;

    fn go(
        clue: &Clue,
        word: LineWord,
        n: usize,
        i: i64,
        j: usize,
        memo: &mut Vec<Vec<Option<bool>>>,
        settle: &mut LineWord,
    ) -> bool {
        if j == 0 && (i == -1 || i == 0) {
            return true;
        }
        if i < 0 {
            return false;
        }
        let ui = i as usize;
        if i == 0 {
            memo[0][j] = Some(false);
            return false;
        }
        if let Some(v) = memo[ui + 1][j] {
            return v;
        }

        let now = bitops::shift_right(word, ui - 1, n) & 0b11;
        let mut is_valid = false;

        if j > 0 {
            let run_len = clue.run(j);
            let pos = i - run_len as i64;
            if pos < 0 {
                memo[ui + 1][j] = Some(false);
                return false;
            }
            let pos = pos as usize;
            let mut this_mask = bitops::shift_left(block_run_mask(run_len), pos, n);
            if pos > 0 {
                this_mask |= bitops::shift_left(board::WHITE, pos - 1, n);
            }
            let fits = this_mask & !word == 0;
            if now != board::WHITE
                && fits
                && go(clue, word, n, pos as i64 - 1, j - 1, memo, settle)
            {
                *settle |= this_mask;
                is_valid = true;
            }
        }

        if now != board::BLACK && ui > clue.sum(j) {
            if go(clue, word, n, i - 1, j, memo, settle) {
                *settle |= bitops::shift_left(board::WHITE, ui - 1, n);
                is_valid = true;
            }
        }

        memo[ui + 1][j] = Some(is_valid);
        is_valid
    }

    let ok = go(clue, word, n, n as i64, m, &mut memo, &mut settle);
    if ok {
        Some(settle)
    } else {
        None
    }
}

/// Settles a single line, consulting and populating `cache`.
fn settle_line(clue: &Clue, word: LineWord, n: usize, cache: &mut LineCache) -> Option<LineWord> {
    if let Some(hit) = cache.get(clue.hash_key(), word) {
        return Some(hit);
    }
    let settled = solve_line(clue, word, n)?;
    cache.insert(clue.hash_key(), word, settled);
    Some(settled)
}

/// Drains the engine's work queue, settling every line it contains and
/// propagating each settlement's diff into the perpendicular lines (which
/// re-enter the queue if they changed). Returns `Conflict` the moment any
/// line proves infeasible, `Solved` once every cell is determined, else
/// `Unsolved`.
pub fn run_driver(board: &mut Board, puzzle: &Puzzle, engine: &mut Engine) -> Status {
    let n = board.n();

    while let Some(idx) = engine.queue.pop() {
        engine.deps.mark_touched(idx);

        let is_col = idx < n;
        let line_idx = if is_col { idx } else { idx - n };
        let word = if is_col {
            board.col_word(line_idx)
        } else {
            board.row_word(line_idx)
        };
        let clue = puzzle.line_clue(idx);

        let settled = match settle_line(clue, word, n, &mut engine.cache) {
            Some(w) => w,
            None => {
                debug!("line {} has no valid placement, conflict", idx);
                engine.queue.clear();
                return Status::Conflict;
            }
        };

        if settled != word {
            board.apply_settled_line(is_col, line_idx, settled, &mut engine.queue);
        }
    }

    if board.is_solved() {
        Status::Solved
    } else {
        Status::Unsolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clue::Clue;

    #[test]
    fn empty_clue_forces_all_white() {
        let clue = Clue::new(vec![]);
        let word = bitops::line_mask(5);
        let settled = solve_line(&clue, word, 5).unwrap();
        for p in 0..5 {
            assert_eq!((settled >> (2 * p)) & 0b11, board::WHITE);
        }
    }

    #[test]
    fn full_run_forces_all_black() {
        let clue = Clue::new(vec![5]);
        let word = bitops::line_mask(5);
        let settled = solve_line(&clue, word, 5).unwrap();
        for p in 0..5 {
            assert_eq!((settled >> (2 * p)) & 0b11, board::BLACK);
        }
    }

    #[test]
    fn run_of_three_in_five_forces_middle_cell() {
        let clue = Clue::new(vec![3]);
        let word = bitops::line_mask(5);
        let settled = solve_line(&clue, word, 5).unwrap();
        // position 2 (0-indexed middle) must be black in every placement of a
        // run of 3 within 5 cells (positions 0-2, 1-3, or 2-4 all include it).
        assert_eq!((settled >> 4) & 0b11, board::BLACK);
    }

    #[test]
    fn incompatible_existing_word_yields_conflict() {
        // force cell 0 white, but require a run of 5 in a line of 5
        let clue = Clue::new(vec![5]);
        let mut word = bitops::line_mask(5);
        word &= !bitops::shift_left(board::BLACK, 0, 5);
        assert!(solve_line(&clue, word, 5).is_none());
    }

    #[test]
    fn driver_settles_forced_row_and_propagates_to_columns() {
        use crate::clue::Puzzle;
        use crate::engine::Engine;

        let n = 5;
        let col_clues = vec![Clue::new(vec![5]); n];
        let row_clues = vec![Clue::new(vec![5]); n];
        let puzzle = Puzzle::new(col_clues, row_clues);

        let mut board = Board::new(n);
        let mut engine = Engine::new(n);
        engine.queue.push_all(n);

        let status = run_driver(&mut board, &puzzle, &mut engine);
        assert_eq!(status, Status::Solved);
        assert_eq!(board.determined(), (n * n) as u32);
    }

    #[test]
    fn driver_detects_conflict() {
        use crate::clue::Puzzle;
        use crate::engine::Engine;

        let n = 2;
        // column 0 wants a run of 2 (all black), row 0 wants empty (all white):
        // cell (0,0) can't be both.
        let col_clues = vec![Clue::new(vec![2]), Clue::new(vec![])];
        let row_clues = vec![Clue::new(vec![]), Clue::new(vec![2])];
        let puzzle = Puzzle::new(col_clues, row_clues);

        let mut board = Board::new(n);
        let mut engine = Engine::new(n);
        engine.queue.push_all(n);

        let status = run_driver(&mut board, &puzzle, &mut engine);
        assert_eq!(status, Status::Conflict);
    }
}
