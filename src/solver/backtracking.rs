//! Depth-first branch-and-bound search over whatever the probing layer
//! leaves ambiguous: [`find_one`] for "does this puzzle have a solution",
//! [`verify`] for "does it have exactly one".

use crate::board::Board;
use crate::clue::Puzzle;
use crate::engine::Engine;
use crate::solver::probing::{propagate, propagate_verify, ProbeOutcome, VerifyOutcome};
use crate::solver::line::run_driver;
use crate::status::Status;

/// Finds any one solution. Native recursion is safe here: depth is bounded
/// by `2 * n^2` branch points, 1250 frames at `n = 25`, well inside the
/// default stack. [`crate::solver::resumable::ResumableSearch`] is the
/// explicit-stack variant for callers that need a hard bound instead.
pub fn find_one(board: &mut Board, puzzle: &Puzzle, engine: &mut Engine, node_count: &mut u64) -> Status {
    *node_count += 1;
    match propagate(board, puzzle, engine) {
        ProbeOutcome::Solved => {
            info!("search found a solution after {} nodes", node_count);
            Status::Solved
        }
        ProbeOutcome::Conflict => Status::Conflict,
        ProbeOutcome::Stalled(branch) => {
            *board = branch.first_go;
            if find_one(board, puzzle, engine, node_count) == Status::Solved {
                return Status::Solved;
            }
            *board = branch.second_go;
            find_one(board, puzzle, engine, node_count)
        }
    }
}

/// Runs the line solver once, then [`find_one`] if that alone didn't
/// decide the puzzle. Returns the final status and the node count spent.
pub fn search_one_solution(board: &mut Board, puzzle: &Puzzle, engine: &mut Engine) -> (Status, u64) {
    engine.queue.push_all(board.n());
    let mut node_count = 0u64;
    let status = match run_driver(board, puzzle, engine) {
        Status::Solved => Status::Solved,
        Status::Conflict => Status::Conflict,
        Status::Unsolved => find_one(board, puzzle, engine, &mut node_count),
    };
    (status, node_count)
}

/// The two-solution counterpart of [`find_one`]: keeps searching past the
/// first solution, comparing every subsequent one against it, and returns
/// `ManySolution` the moment two differ.
pub fn verify(
    board: &mut Board,
    puzzle: &Puzzle,
    engine: &mut Engine,
    recorded: &mut Option<Board>,
    node_count: &mut u64,
) -> Status {
    *node_count += 1;
    match propagate_verify(board, puzzle, engine, recorded) {
        VerifyOutcome::Solved => Status::Solved,
        VerifyOutcome::Conflict => Status::Conflict,
        VerifyOutcome::ManySolution => {
            warn!("puzzle has multiple solutions");
            Status::ManySolution
        }
        VerifyOutcome::Stalled(branch) => {
            *board = branch.first_go;
            let r1 = verify(board, puzzle, engine, recorded, node_count);
            if r1 == Status::ManySolution {
                return Status::ManySolution;
            }
            *board = branch.second_go;
            let r2 = verify(board, puzzle, engine, recorded, node_count);
            if r2 == Status::ManySolution {
                return Status::ManySolution;
            }
            if r1 == Status::Conflict && r2 == Status::Conflict {
                Status::Conflict
            } else if r1 == Status::Solved && r2 == Status::Solved {
                Status::ManySolution
            } else {
                Status::Solved
            }
        }
    }
}

/// Runs the line solver once, then [`verify`] if that alone didn't decide
/// uniqueness. Returns the final status and the node count spent.
pub fn search_two_solutions(board: &mut Board, puzzle: &Puzzle, engine: &mut Engine) -> (Status, u64) {
    engine.queue.push_all(board.n());
    let mut node_count = 0u64;
    let status = match run_driver(board, puzzle, engine) {
        Status::Solved => Status::Solved,
        Status::Conflict => Status::Conflict,
        Status::Unsolved => {
            let mut recorded = None;
            verify(board, puzzle, engine, &mut recorded, &mut node_count)
        }
    };
    (status, node_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clue::Clue;

    fn engine_and_puzzle(n: usize, col: Vec<Vec<usize>>, row: Vec<Vec<usize>>) -> (Board, Puzzle, Engine) {
        let col_clues = col.into_iter().map(Clue::new).collect();
        let row_clues = row.into_iter().map(Clue::new).collect();
        (Board::new(n), Puzzle::new(col_clues, row_clues), Engine::new(n))
    }

    #[test]
    fn all_empty_clues_solve_in_one_pass() {
        let (mut board, puzzle, mut engine) = engine_and_puzzle(5, vec![vec![]; 5], vec![vec![]; 5]);
        let (status, nodes) = search_one_solution(&mut board, &puzzle, &mut engine);
        assert_eq!(status, Status::Solved);
        assert_eq!(nodes, 0);
        assert_eq!(board.determined(), 25);
    }

    #[test]
    fn full_board_solves_in_one_pass() {
        let (mut board, puzzle, mut engine) =
            engine_and_puzzle(5, vec![vec![5]; 5], vec![vec![5]; 5]);
        let (status, _) = search_one_solution(&mut board, &puzzle, &mut engine);
        assert_eq!(status, Status::Solved);
        for i in 0..5 {
            for j in 0..5 {
                assert_eq!(board.get(i, j), crate::board::BLACK);
            }
        }
    }

    #[test]
    fn unsolvable_two_by_two_is_conflict() {
        let (mut board, puzzle, mut engine) = engine_and_puzzle(
            2,
            vec![vec![2], vec![]],
            vec![vec![], vec![2]],
        );
        let (status, _) = search_one_solution(&mut board, &puzzle, &mut engine);
        assert_eq!(status, Status::Conflict);
    }

    #[test]
    fn ambiguous_two_by_two_has_many_solutions() {
        let (mut board, puzzle, mut engine) =
            engine_and_puzzle(2, vec![vec![1], vec![1]], vec![vec![1], vec![1]]);
        let (status, _) = search_two_solutions(&mut board, &puzzle, &mut engine);
        assert_eq!(status, Status::ManySolution);
    }

    #[test]
    fn unique_solution_is_reported_solved() {
        let (mut board, puzzle, mut engine) =
            engine_and_puzzle(5, vec![vec![5]; 5], vec![vec![5]; 5]);
        let (status, _) = search_two_solutions(&mut board, &puzzle, &mut engine);
        assert_eq!(status, Status::Solved);
    }
}
