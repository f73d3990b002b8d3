//! Renders a solved (or partial) [`Board`] back out: the tab-separated
//! TAAI format for solution files, and a glyph form for debug logging.

use std::fmt::Write as _;

use crate::board::{Board, BLACK, CONFLICT, UNKNOWN, WHITE};

/// Renders `board` in TAAI format: `n` lines of `n` tab-separated
/// integers, `1` for `BLACK`, `0` for `WHITE`, `-1` for `UNKNOWN` (should
/// not occur in a solved board), `-2` for the illegal `CONFLICT` state.
pub fn render_taai(board: &Board) -> String {
    let n = board.n();
    let mut out = String::with_capacity(n * (n * 2));
    for j in 0..n {
        for i in 0..n {
            let token = match board.get(i, j) {
                BLACK => "1",
                WHITE => "0",
                UNKNOWN => "-1",
                CONFLICT => "-2",
                _ => unreachable!("a cell is always one of the four packed states"),
            };
            out.push_str(token);
            if i != n - 1 {
                out.push('\t');
            }
        }
        out.push('\n');
    }
    out
}

/// Renders `board` with a glyph per cell for debug logs: `#` for `BLACK`,
/// `.` for `WHITE`, `?` for `UNKNOWN`, `X` for `CONFLICT`.
pub fn render_debug(board: &Board) -> String {
    let n = board.n();
    let mut out = String::with_capacity(n * (n + 1));
    for j in 0..n {
        for i in 0..n {
            let glyph = match board.get(i, j) {
                BLACK => '#',
                WHITE => '.',
                UNKNOWN => '?',
                CONFLICT => 'X',
                _ => unreachable!("a cell is always one of the four packed states"),
            };
            let _ = write!(out, "{}", glyph);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workqueue::WorkQueue;

    #[test]
    fn all_white_board_renders_as_zeros() {
        let mut board = Board::new(3);
        let mut q = WorkQueue::new(3);
        for i in 0..3 {
            for j in 0..3 {
                board.set_and_flag(i, j, WHITE, &mut q);
            }
        }
        let rendered = render_taai(&board);
        assert_eq!(rendered, "0\t0\t0\n0\t0\t0\n0\t0\t0\n");
    }

    #[test]
    fn unknown_cells_render_as_minus_one() {
        let board = Board::new(2);
        let rendered = render_taai(&board);
        assert_eq!(rendered, "-1\t-1\n-1\t-1\n");
    }

    #[test]
    fn debug_render_uses_glyphs() {
        let board = Board::new(2);
        let rendered = render_debug(&board);
        assert_eq!(rendered, "??\n??\n");
    }
}
