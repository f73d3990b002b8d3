//! The 2-SAT-style probing layer: trials both colors on every unknown
//! cell, commits whichever color the other contradicts, and intersects the
//! two trial boards when neither alone settles anything.

use serde::{Deserialize, Serialize};

use crate::board::{Board, BLACK, UNKNOWN, WHITE};
use crate::clue::Puzzle;
use crate::engine::Engine;
use crate::solver::line::run_driver;
use crate::status::Status;

/// The two boards a DFS branch would commit to if probing stalls.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SquareToGo {
    pub first_go: Board,
    pub second_go: Board,
}

/// Per-cell trial boards from the most recent time each cell was probed,
/// kept around so the branching heuristic can score every still-ambiguous
/// cell once a sweep makes no further progress.
struct GuessBoards {
    black: Vec<Vec<Board>>,
    white: Vec<Vec<Board>>,
}

impl GuessBoards {
    fn new(n: usize) -> Self {
        let blank = Board::new(n);
        GuessBoards {
            black: vec![vec![blank; n]; n],
            white: vec![vec![blank; n]; n],
        }
    }
}

/// `min(black.determined, white.determined) + 1.85 * ln(1 + |black.determined - white.determined|)`
fn branch_score(black_determined: u32, white_determined: u32) -> f64 {
    let b = black_determined as f64;
    let w = white_determined as f64;
    b.min(w) + 1.85 * (1.0 + (b - w).abs()).ln()
}

fn pick_branch_cell(board: &Board, guesses: &GuessBoards) -> Option<(usize, usize)> {
    let n = board.n();
    let mut best: Option<(usize, usize)> = None;
    let mut best_score = -1.0f64;
    for j in 0..n {
        for i in 0..n {
            if board.get(i, j) != UNKNOWN {
                continue;
            }
            let score = branch_score(
                guesses.black[i][j].determined(),
                guesses.white[i][j].determined(),
            );
            if score > best_score {
                best_score = score;
                best = Some((i, j));
            }
        }
    }
    best
}

/// Outcome of a single cell's two-color trial.
enum CellOutcome {
    Solved,
    Conflict,
    /// Cell remains ambiguous; `guesses` has been updated for it.
    Unsolved,
}

/// Trials `WHITE` then `BLACK` (or vice versa on a white conflict) at cell
/// `(i, j)`, committing a color the moment the other is disproven, and
/// intersecting the two trial boards into `board` when both remain
/// unsolved. Mirrors `solve_one_two_sat` in spirit.
fn solve_one_two_sat(
    board: &mut Board,
    puzzle: &Puzzle,
    engine: &mut Engine,
    i: usize,
    j: usize,
    guesses: &mut GuessBoards,
) -> CellOutcome {
    let resume = *board;

    board.set_and_flag(i, j, WHITE, &mut engine.queue);
    let state_white = run_driver(board, puzzle, engine);

    match state_white {
        Status::Solved => return CellOutcome::Solved,
        Status::Conflict => {
            *board = resume;
            board.set_and_flag(i, j, BLACK, &mut engine.queue);
            let state_black = run_driver(board, puzzle, engine);
            match state_black {
                Status::Solved => CellOutcome::Solved,
                Status::Conflict => CellOutcome::Conflict,
                Status::Unsolved => {
                    // committed to black: white was disproven outright.
                    engine.deps.mark_progress();
                    CellOutcome::Unsolved
                }
            }
        }
        Status::Unsolved => {
            guesses.white[i][j] = *board;
            *board = resume;
            board.set_and_flag(i, j, BLACK, &mut engine.queue);
            let state_black = run_driver(board, puzzle, engine);
            match state_black {
                Status::Solved => CellOutcome::Solved,
                Status::Conflict => {
                    // committed to white: black was disproven outright.
                    *board = guesses.white[i][j];
                    engine.deps.mark_progress();
                    CellOutcome::Unsolved
                }
                Status::Unsolved => {
                    guesses.black[i][j] = *board;
                    *board = resume;
                    let changed = {
                        let (black, white) = (guesses.black[i][j], guesses.white[i][j]);
                        board.union_from_two(&black, &white, &mut engine.queue)
                    };
                    if changed {
                        engine.deps.mark_progress();
                        match run_driver(board, puzzle, engine) {
                            Status::Solved => return CellOutcome::Solved,
                            Status::Conflict => return CellOutcome::Conflict,
                            Status::Unsolved => {}
                        }
                    }
                    CellOutcome::Unsolved
                }
            }
        }
    }
}

/// What a full probing round concluded with.
pub enum ProbeOutcome {
    Solved,
    Conflict,
    Stalled(SquareToGo),
}

/// Sweeps the board's unknown cells to a fixpoint: repeatedly probes every
/// cell the [`crate::solver::dependency::DependencyMap`] filter still
/// considers interesting, committing or intersecting as it goes, until a
/// sweep makes no further progress — at which point it selects a branching
/// cell by the scoring heuristic — or the board is fully solved or
/// contradictory.
pub fn propagate(board: &mut Board, puzzle: &Puzzle, engine: &mut Engine) -> ProbeOutcome {
    let n = board.n();
    let mut guesses = GuessBoards::new(n);
    engine.deps.reset_update();

    loop {
        engine.deps.begin_sweep();

        for j in 0..n {
            for i in 0..n {
                if board.get(i, j) != UNKNOWN || !engine.deps.should_probe(i, j) {
                    continue;
                }
                engine.deps.begin_cell();
                let outcome = solve_one_two_sat(board, puzzle, engine, i, j, &mut guesses);
                engine.deps.end_cell(i, j);
                match outcome {
                    CellOutcome::Solved => return ProbeOutcome::Solved,
                    CellOutcome::Conflict => return ProbeOutcome::Conflict,
                    CellOutcome::Unsolved => {}
                }
            }
        }

        engine.deps.end_sweep();
        if engine.deps.sweep_was_idle() {
            return match pick_branch_cell(board, &guesses) {
                Some((i, j)) => ProbeOutcome::Stalled(SquareToGo {
                    first_go: guesses.white[i][j],
                    second_go: guesses.black[i][j],
                }),
                // No unknown cell left to branch on means every cell was
                // in fact determined — the board is solved.
                None => ProbeOutcome::Solved,
            };
        }
    }
}

/// Outcome of a single cell's two-color trial in verification mode: unlike
/// [`solve_one_two_sat`], both colors are always pursued so a
/// simultaneously-solved pair can be detected as two distinct solutions.
enum CellVerifyOutcome {
    Solved,
    Conflict,
    ManySolution,
    Unsolved,
}

#[allow(clippy::too_many_arguments)]
fn solve_one_two_sat_verify(
    board: &mut Board,
    puzzle: &Puzzle,
    engine: &mut Engine,
    recorded: &mut Option<Board>,
    i: usize,
    j: usize,
    guesses: &mut GuessBoards,
) -> CellVerifyOutcome {
    let resume = *board;

    board.set_and_flag(i, j, WHITE, &mut engine.queue);
    let state_white = run_driver(board, puzzle, engine);
    guesses.white[i][j] = *board;

    *board = resume;
    board.set_and_flag(i, j, BLACK, &mut engine.queue);
    let state_black = run_driver(board, puzzle, engine);
    guesses.black[i][j] = *board;

    *board = resume;

    match (state_white, state_black) {
        (Status::Solved, Status::Solved) => {
            *board = guesses.white[i][j];
            CellVerifyOutcome::ManySolution
        }
        (Status::Conflict, Status::Conflict) => CellVerifyOutcome::Conflict,
        (Status::Conflict, _) => {
            // committed to black: white was disproven outright.
            *board = guesses.black[i][j];
            engine.deps.mark_progress();
            if state_black == Status::Solved {
                record_or_detect(board, recorded)
            } else {
                CellVerifyOutcome::Unsolved
            }
        }
        (_, Status::Conflict) => {
            // committed to white: black was disproven outright.
            *board = guesses.white[i][j];
            engine.deps.mark_progress();
            if state_white == Status::Solved {
                record_or_detect(board, recorded)
            } else {
                CellVerifyOutcome::Unsolved
            }
        }
        (Status::Solved, Status::Unsolved) => {
            *board = guesses.white[i][j];
            engine.deps.mark_progress();
            record_or_detect(board, recorded)
        }
        (Status::Unsolved, Status::Solved) => {
            *board = guesses.black[i][j];
            engine.deps.mark_progress();
            record_or_detect(board, recorded)
        }
        (Status::Unsolved, Status::Unsolved) => {
            let changed = {
                let (black, white) = (guesses.black[i][j], guesses.white[i][j]);
                board.union_from_two(&black, &white, &mut engine.queue)
            };
            if changed {
                engine.deps.mark_progress();
                match run_driver(board, puzzle, engine) {
                    Status::Solved => return record_or_detect(board, recorded),
                    Status::Conflict => return CellVerifyOutcome::Conflict,
                    Status::Unsolved => {}
                }
            }
            CellVerifyOutcome::Unsolved
        }
    }
}

/// A `Solved` board surfaced during verification: the first one found is
/// simply recorded; any later one is compared row-by-row against it.
fn record_or_detect(board: &Board, recorded: &mut Option<Board>) -> CellVerifyOutcome {
    match recorded {
        None => {
            *recorded = Some(*board);
            CellVerifyOutcome::Unsolved
        }
        Some(first) => {
            if first.rows() == board.rows() {
                CellVerifyOutcome::Solved
            } else {
                CellVerifyOutcome::ManySolution
            }
        }
    }
}

pub enum VerifyOutcome {
    Solved,
    Conflict,
    ManySolution,
    Stalled(SquareToGo),
}

/// The verification-mode counterpart to [`propagate`]: sweeps to a
/// fixpoint, but treats a simultaneously-solved white/black trial as proof
/// of multiple solutions rather than committing either.
pub fn propagate_verify(
    board: &mut Board,
    puzzle: &Puzzle,
    engine: &mut Engine,
    recorded: &mut Option<Board>,
) -> VerifyOutcome {
    if board.is_solved() {
        return match record_or_detect(board, recorded) {
            CellVerifyOutcome::Solved => VerifyOutcome::Solved,
            CellVerifyOutcome::ManySolution => VerifyOutcome::ManySolution,
            _ => VerifyOutcome::Solved,
        };
    }

    let n = board.n();
    let mut guesses = GuessBoards::new(n);
    engine.deps.reset_update();

    loop {
        engine.deps.begin_sweep();

        for j in 0..n {
            for i in 0..n {
                if board.get(i, j) != UNKNOWN || !engine.deps.should_probe(i, j) {
                    continue;
                }
                engine.deps.begin_cell();
                let outcome =
                    solve_one_two_sat_verify(board, puzzle, engine, recorded, i, j, &mut guesses);
                engine.deps.end_cell(i, j);
                match outcome {
                    CellVerifyOutcome::Solved => {
                        return match record_or_detect(board, recorded) {
                            CellVerifyOutcome::ManySolution => VerifyOutcome::ManySolution,
                            _ => VerifyOutcome::Solved,
                        }
                    }
                    CellVerifyOutcome::Conflict => return VerifyOutcome::Conflict,
                    CellVerifyOutcome::ManySolution => return VerifyOutcome::ManySolution,
                    CellVerifyOutcome::Unsolved => {}
                }
            }
        }

        engine.deps.end_sweep();
        if engine.deps.sweep_was_idle() {
            return match pick_branch_cell(board, &guesses) {
                Some((i, j)) => VerifyOutcome::Stalled(SquareToGo {
                    first_go: guesses.white[i][j],
                    second_go: guesses.black[i][j],
                }),
                None => VerifyOutcome::Solved,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clue::Clue;
    use crate::engine::Engine;

    #[test]
    fn branch_score_prefers_balanced_progress() {
        let balanced = branch_score(10, 10);
        let lopsided = branch_score(20, 0);
        assert!(balanced > lopsided);
    }

    #[test]
    fn propagate_solves_a_trivially_forced_board() {
        let n = 5;
        let col_clues = vec![Clue::new(vec![5]); n];
        let row_clues = vec![Clue::new(vec![5]); n];
        let puzzle = Puzzle::new(col_clues, row_clues);
        let mut board = Board::new(n);
        let mut engine = Engine::new(n);
        engine.queue.push_all(n);
        assert_eq!(run_driver(&mut board, &puzzle, &mut engine), Status::Solved);
    }

    #[test]
    fn propagate_stalls_on_a_puzzle_that_needs_real_branching() {
        // One mark per row and one per column: no line overlap ever forces a
        // cell, and probing either color at any cell only pins down that
        // cell's own row and column, never enough to resolve the rest of the
        // grid. Genuinely requires backtracking.
        let n = 4;
        let col_clues = vec![Clue::new(vec![1]); n];
        let row_clues = vec![Clue::new(vec![1]); n];
        let puzzle = Puzzle::new(col_clues, row_clues);
        let mut board = Board::new(n);
        let mut engine = Engine::new(n);
        engine.queue.push_all(n);
        let first_pass = run_driver(&mut board, &puzzle, &mut engine);
        assert_eq!(first_pass, Status::Unsolved);

        match propagate(&mut board, &puzzle, &mut engine) {
            ProbeOutcome::Stalled(_) => {}
            ProbeOutcome::Solved => panic!("a permutation-matrix puzzle has many solutions, not one"),
            ProbeOutcome::Conflict => panic!("puzzle is solvable"),
        }
    }
}
